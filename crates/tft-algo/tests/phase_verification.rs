//! CT phase verification scenarios

use tft_algo::{
    expected_secondary, normalize_angle, phasor_coordinates, sequence_check, verification_table,
    PhaseVerifier, SecondaryReference, DYN1_PHASE_SHIFT_DEG,
};
use tft_core::{parse_phase_order, PhaseAngles, TftError};

fn angles(a: f64, b: f64, c: f64) -> PhaseAngles {
    PhaseAngles::new(a, b, c).unwrap()
}

#[test]
fn normalization_is_idempotent_and_bounded() {
    let mut angle = -1_080.0;
    while angle <= 1_080.0 {
        let once = normalize_angle(angle);
        assert!(once > -180.0 && once <= 180.0, "{angle} -> {once}");
        assert_eq!(normalize_angle(once), once);
        angle += 7.5;
    }
}

#[test]
fn both_secondary_conventions() {
    let primary = angles(0.0, -120.0, 120.0);

    let direct = PhaseVerifier::new().with_reference(SecondaryReference::Direct);
    let reversed = PhaseVerifier::new().with_reference(SecondaryReference::Reversed);

    assert_eq!(
        direct.expected_secondary(&primary).unwrap().to_array(),
        [-30.0, -150.0, 90.0]
    );
    assert_eq!(
        reversed.expected_secondary(&primary).unwrap().to_array(),
        [150.0, 30.0, -90.0]
    );
    assert_eq!(
        reversed.expected_secondary(&primary).unwrap(),
        expected_secondary(&primary, DYN1_PHASE_SHIFT_DEG, 180.0).unwrap()
    );
}

#[test]
fn conventions_differ_by_half_turn() {
    let primary = angles(12.0, -108.0, 132.0);
    let direct = expected_secondary(&primary, DYN1_PHASE_SHIFT_DEG, 0.0).unwrap();
    let reversed = expected_secondary(&primary, DYN1_PHASE_SHIFT_DEG, 180.0).unwrap();
    for ((_, d), (_, r)) in direct.iter().zip(reversed.iter()) {
        let gap = normalize_angle(r.value() - d.value());
        assert_eq!(gap, 180.0);
    }
}

#[test]
fn custom_phase_shift() {
    let primary = angles(0.0, -120.0, 120.0);
    let result = PhaseVerifier::new()
        .with_phase_shift(30.0)
        .verify(&primary, None)
        .unwrap();
    assert_eq!(
        result.expected_secondary_angles.to_array(),
        [30.0, -90.0, 150.0]
    );
    assert_eq!(result.phase_shift_deg, 30.0);
}

#[test]
fn sequence_check_scenarios() {
    assert!(sequence_check(&angles(0.0, -120.0, 120.0), 10.0));
    assert!(!sequence_check(&angles(0.0, -100.0, 120.0), 10.0));
    // negative sequence is still 120° apart
    assert!(sequence_check(&angles(0.0, 120.0, -120.0), 10.0));
}

#[test]
fn swapped_secondary_leads_is_reported() {
    let observed = parse_phase_order("Ia,Ic,Ib").unwrap();
    let primary = angles(0.0, -120.0, 120.0);
    let result = PhaseVerifier::new()
        .verify(&primary, Some(&observed))
        .unwrap();

    assert!(result.sequence_ok);
    assert_eq!(result.wiring_match(), Some(false));
    let messages: Vec<String> = result.mismatches().iter().map(|m| m.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "phase Ic appears where Ib was expected",
            "phase Ib appears where Ic was expected",
        ]
    );
}

#[test]
fn table_and_phasors_line_up() {
    let result = PhaseVerifier::new()
        .verify(&angles(0.0, -120.0, 120.0), None)
        .unwrap();
    let table = verification_table(&result);
    let coords = phasor_coordinates(&result.expected_secondary_angles, 1.0).unwrap();

    for (row, (x, y)) in table.iter().zip(coords) {
        let angle = y.atan2(x).to_degrees();
        assert!((normalize_angle(angle) - row.expected_angle_deg).abs() < 1e-9);
    }
}

#[test]
fn non_finite_values_are_errors() {
    assert!(matches!(
        PhaseAngles::new(f64::NAN, 0.0, 0.0),
        Err(TftError::ArithmeticDomain { .. })
    ));

    let primary = angles(0.0, -120.0, 120.0);
    assert!(matches!(
        expected_secondary(&primary, f64::NAN, 0.0),
        Err(TftError::ArithmeticDomain { .. })
    ));
    assert!(matches!(
        phasor_coordinates(&primary, f64::INFINITY),
        Err(TftError::ArithmeticDomain { .. })
    ));
}
