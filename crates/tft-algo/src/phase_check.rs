//! # CT Wiring Phase Verification
//!
//! During commissioning the operator reads the three primary current angles
//! of a Dyn1 transformer and checks that the secondary CTs are wired so their
//! currents land where the vector group says they should.
//!
//! ## Expected Secondary Angles
//!
//! ```text
//! θ_sec[i] = normalize(θ_prim[i] + shift + extra)
//! shift    = -30°             (Dyn1, 1 o'clock)
//! extra    =   0°  Direct     (secondary reference taken as-is)
//!          = 180°  Reversed   (secondary reference inverted by CT polarity)
//! ```
//!
//! Field practice uses both secondary conventions, so the extra rotation is
//! an explicit [`SecondaryReference`] choice; neither is assumed silently.
//!
//! ## Sequence Sanity Check
//!
//! A healthy three-phase set has its phasors 120° apart regardless of the
//! absolute reference. The three angles are sorted and the circular gaps
//! compared against 120° within a tolerance (10° by default).
//!
//! ## Wiring Check
//!
//! The observed secondary assignment is compared position by position with
//! Ia–Ib–Ic. Each difference becomes a [`Mismatch`] that the caller can turn
//! into a remediation message.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tft_core::{Degrees, Phase, PhaseAngles, PhaseOrder, TftError, TftResult, EXPECTED_ORDER};
use tracing::debug;

/// Dyn1 primary-to-secondary displacement
pub const DYN1_PHASE_SHIFT_DEG: f64 = -30.0;
/// Default allowed deviation from 120° between consecutive phases
pub const DEFAULT_SEQUENCE_TOLERANCE_DEG: f64 = 10.0;

/// Convention for the secondary current reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondaryReference {
    /// No extra rotation
    #[default]
    Direct,
    /// Secondary reference rotated a further 180°
    Reversed,
}

impl SecondaryReference {
    pub fn extra_rotation_deg(self) -> f64 {
        match self {
            SecondaryReference::Direct => 0.0,
            SecondaryReference::Reversed => 180.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SecondaryReference::Direct => "direct",
            SecondaryReference::Reversed => "reversed",
        }
    }
}

impl fmt::Display for SecondaryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecondaryReference {
    type Err = TftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" | "0" => Ok(SecondaryReference::Direct),
            "reversed" | "inverted" | "180" => Ok(SecondaryReference::Reversed),
            other => Err(TftError::Parse(format!(
                "unknown secondary reference '{other}' (expected direct or reversed)"
            ))),
        }
    }
}

/// Shift each primary angle by the vector-group displacement plus an extra rotation.
///
/// A non-finite shift or rotation is an arithmetic domain error.
pub fn expected_secondary(
    primary: &PhaseAngles,
    phase_shift_deg: f64,
    extra_rotation_deg: f64,
) -> TftResult<PhaseAngles> {
    if !phase_shift_deg.is_finite() {
        return Err(TftError::arithmetic_domain("phase_shift_deg", phase_shift_deg));
    }
    if !extra_rotation_deg.is_finite() {
        return Err(TftError::arithmetic_domain("extra_rotation_deg", extra_rotation_deg));
    }
    primary.map(|angle| angle + Degrees(phase_shift_deg) + Degrees(extra_rotation_deg))
}

/// True when the three angles are mutually ~120° apart.
pub fn sequence_check(angles: &PhaseAngles, tolerance_deg: f64) -> bool {
    let mut sorted = angles.to_array();
    sorted.sort_by(f64::total_cmp);
    let gaps = [
        sorted[1] - sorted[0],
        sorted[2] - sorted[1],
        360.0 - (sorted[2] - sorted[0]),
    ];
    gaps.iter().all(|gap| (gap - 120.0).abs() <= tolerance_deg)
}

/// An observed phase found where a different phase was expected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub expected_position: Phase,
    pub found_phase: Phase,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "phase {} appears where {} was expected",
            self.found_phase.secondary_label(),
            self.expected_position.secondary_label()
        )
    }
}

/// Result of comparing an observed secondary assignment with the expected one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WiringCheck {
    pub observed_order: PhaseOrder,
    pub wiring_match: bool,
    pub mismatches: Vec<Mismatch>,
}

/// Element-wise comparison of an observed order against the expected order.
pub fn verify_wiring(expected_order: &PhaseOrder, observed_order: &PhaseOrder) -> WiringCheck {
    let mismatches: Vec<Mismatch> = expected_order
        .iter()
        .zip(observed_order.iter())
        .filter(|(expected, found)| expected != found)
        .map(|(&expected_position, &found_phase)| Mismatch {
            expected_position,
            found_phase,
        })
        .collect();
    WiringCheck {
        observed_order: *observed_order,
        wiring_match: mismatches.is_empty(),
        mismatches,
    }
}

/// Outcome of one CT verification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseVerificationResult {
    pub primary_angles: PhaseAngles,
    pub expected_secondary_angles: PhaseAngles,
    pub phase_shift_deg: f64,
    pub secondary_reference: Option<SecondaryReference>,
    pub extra_rotation_deg: f64,
    pub sequence_ok: bool,
    /// Absent when no observed secondary assignment was supplied
    pub wiring: Option<WiringCheck>,
}

impl PhaseVerificationResult {
    /// `Some(true)` only when an observed order was given and matched
    pub fn wiring_match(&self) -> Option<bool> {
        self.wiring.as_ref().map(|w| w.wiring_match)
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        self.wiring
            .as_ref()
            .map(|w| w.mismatches.as_slice())
            .unwrap_or(&[])
    }
}

/// One row of the CT verification table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtCheckRow {
    pub primary_phase: &'static str,
    pub primary_angle_deg: f64,
    pub secondary_phase: &'static str,
    pub expected_angle_deg: f64,
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Primary and expected secondary angles side by side, rounded to 0.1°.
pub fn verification_table(result: &PhaseVerificationResult) -> Vec<CtCheckRow> {
    Phase::ALL
        .iter()
        .map(|&phase| CtCheckRow {
            primary_phase: phase.primary_label(),
            primary_angle_deg: round_tenth(result.primary_angles[phase].value()),
            secondary_phase: phase.secondary_label(),
            expected_angle_deg: round_tenth(result.expected_secondary_angles[phase].value()),
        })
        .collect()
}

/// CT verification settings.
///
/// ```
/// use tft_algo::phase_check::{PhaseVerifier, SecondaryReference};
/// use tft_core::PhaseAngles;
///
/// let verifier = PhaseVerifier::new().with_reference(SecondaryReference::Reversed);
/// let primary = PhaseAngles::new(0.0, -120.0, 120.0)?;
/// let result = verifier.verify(&primary, None)?;
/// assert_eq!(result.expected_secondary_angles.to_array(), [150.0, 30.0, -90.0]);
/// assert!(result.sequence_ok);
/// # Ok::<(), tft_core::TftError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseVerifier {
    pub phase_shift_deg: f64,
    /// Named convention; `None` when a raw rotation was supplied
    pub reference: Option<SecondaryReference>,
    pub extra_rotation_deg: f64,
    pub tolerance_deg: f64,
    pub expected_order: PhaseOrder,
}

impl Default for PhaseVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseVerifier {
    /// Dyn1, direct secondary reference, 10° sequence tolerance
    pub fn new() -> Self {
        Self {
            phase_shift_deg: DYN1_PHASE_SHIFT_DEG,
            reference: Some(SecondaryReference::Direct),
            extra_rotation_deg: 0.0,
            tolerance_deg: DEFAULT_SEQUENCE_TOLERANCE_DEG,
            expected_order: EXPECTED_ORDER,
        }
    }

    pub fn with_phase_shift(mut self, degrees: f64) -> Self {
        self.phase_shift_deg = degrees;
        self
    }

    pub fn with_reference(mut self, reference: SecondaryReference) -> Self {
        self.reference = Some(reference);
        self.extra_rotation_deg = reference.extra_rotation_deg();
        self
    }

    /// Use an arbitrary extra rotation instead of a named convention
    pub fn with_extra_rotation(mut self, degrees: f64) -> Self {
        self.reference = match degrees {
            d if d == 0.0 => Some(SecondaryReference::Direct),
            d if d == 180.0 => Some(SecondaryReference::Reversed),
            _ => None,
        };
        self.extra_rotation_deg = degrees;
        self
    }

    pub fn with_tolerance(mut self, degrees: f64) -> Self {
        self.tolerance_deg = degrees;
        self
    }

    pub fn expected_secondary(&self, primary: &PhaseAngles) -> TftResult<PhaseAngles> {
        expected_secondary(primary, self.phase_shift_deg, self.extra_rotation_deg)
    }

    /// Run the full check. Wiring is only evaluated when `observed` is given.
    ///
    /// Fails on a non-finite shift or rotation, or a tolerance that is not a
    /// finite non-negative angle.
    pub fn verify(
        &self,
        primary: &PhaseAngles,
        observed: Option<&PhaseOrder>,
    ) -> TftResult<PhaseVerificationResult> {
        if !self.tolerance_deg.is_finite() {
            return Err(TftError::arithmetic_domain("tolerance_deg", self.tolerance_deg));
        }
        if self.tolerance_deg < 0.0 {
            return Err(TftError::invalid_input(
                "tolerance_deg",
                format!("must not be negative, got {}", self.tolerance_deg),
            ));
        }
        let expected_secondary_angles = self.expected_secondary(primary)?;
        let sequence_ok = sequence_check(primary, self.tolerance_deg);
        let wiring = observed.map(|order| verify_wiring(&self.expected_order, order));

        debug!(
            primary = ?primary.to_array(),
            secondary = ?expected_secondary_angles.to_array(),
            sequence_ok,
            wiring_match = ?wiring.as_ref().map(|w| w.wiring_match),
            "CT phase verification computed"
        );

        Ok(PhaseVerificationResult {
            primary_angles: *primary,
            expected_secondary_angles,
            phase_shift_deg: self.phase_shift_deg,
            secondary_reference: self.reference,
            extra_rotation_deg: self.extra_rotation_deg,
            sequence_ok,
            wiring,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angles(a: f64, b: f64, c: f64) -> PhaseAngles {
        PhaseAngles::new(a, b, c).unwrap()
    }

    #[test]
    fn test_expected_secondary_direct() {
        let primary = angles(0.0, -120.0, 120.0);
        let sec = expected_secondary(&primary, DYN1_PHASE_SHIFT_DEG, 0.0).unwrap();
        assert_eq!(sec.to_array(), [-30.0, -150.0, 90.0]);
    }

    #[test]
    fn test_expected_secondary_reversed() {
        let primary = angles(0.0, -120.0, 120.0);
        let sec = expected_secondary(&primary, DYN1_PHASE_SHIFT_DEG, 180.0).unwrap();
        assert_eq!(sec.to_array(), [150.0, 30.0, -90.0]);
    }

    #[test]
    fn test_expected_secondary_wraps_to_upper_bound() {
        let primary = angles(-150.0, 90.0, -30.0);
        let sec = expected_secondary(&primary, DYN1_PHASE_SHIFT_DEG, 0.0).unwrap();
        assert_eq!(sec.to_array(), [180.0, 60.0, -60.0]);
    }

    #[test]
    fn test_sequence_boundary() {
        assert!(sequence_check(&angles(0.0, -120.0, 120.0), 10.0));
        assert!(!sequence_check(&angles(0.0, -100.0, 120.0), 10.0));
    }

    #[test]
    fn test_sequence_independent_of_reference() {
        assert!(sequence_check(&angles(95.0, -25.0, -145.0), 10.0));
        assert!(sequence_check(&angles(175.0, 55.0, -65.0), 10.0));
    }

    #[test]
    fn test_sequence_tolerance_edge() {
        let skewed = angles(0.0, -110.0, 120.0);
        assert!(sequence_check(&skewed, 10.0));
        assert!(!sequence_check(&skewed, 9.0));
    }

    #[test]
    fn test_sequence_rejects_coincident_phases() {
        assert!(!sequence_check(&angles(0.0, 0.0, 0.0), 10.0));
    }

    #[test]
    fn test_wiring_match() {
        let check = verify_wiring(&EXPECTED_ORDER, &[Phase::A, Phase::B, Phase::C]);
        assert!(check.wiring_match);
        assert!(check.mismatches.is_empty());
    }

    #[test]
    fn test_wiring_swap_reports_both_positions() {
        let check = verify_wiring(&EXPECTED_ORDER, &[Phase::B, Phase::A, Phase::C]);
        assert!(!check.wiring_match);
        assert_eq!(
            check.mismatches,
            vec![
                Mismatch {
                    expected_position: Phase::A,
                    found_phase: Phase::B
                },
                Mismatch {
                    expected_position: Phase::B,
                    found_phase: Phase::A
                },
            ]
        );
        assert_eq!(
            check.mismatches[0].to_string(),
            "phase Ib appears where Ia was expected"
        );
    }

    #[test]
    fn test_reference_parsing() {
        assert_eq!(
            "Reversed".parse::<SecondaryReference>().unwrap(),
            SecondaryReference::Reversed
        );
        assert_eq!(
            "0".parse::<SecondaryReference>().unwrap(),
            SecondaryReference::Direct
        );
        assert!("sideways".parse::<SecondaryReference>().is_err());
    }

    #[test]
    fn test_verifier_raw_rotation() {
        let v = PhaseVerifier::new().with_extra_rotation(90.0);
        assert_eq!(v.reference, None);
        let v = PhaseVerifier::new().with_extra_rotation(180.0);
        assert_eq!(v.reference, Some(SecondaryReference::Reversed));
    }

    #[test]
    fn test_verify_without_observation() {
        let result = PhaseVerifier::new()
            .verify(&angles(0.0, -120.0, 120.0), None)
            .unwrap();
        assert!(result.sequence_ok);
        assert_eq!(result.wiring_match(), None);
        assert!(result.mismatches().is_empty());
    }

    #[test]
    fn test_verify_with_observation() {
        let observed = [Phase::A, Phase::C, Phase::B];
        let result = PhaseVerifier::new()
            .verify(&angles(0.0, -120.0, 120.0), Some(&observed))
            .unwrap();
        assert_eq!(result.wiring_match(), Some(false));
        assert_eq!(result.mismatches().len(), 2);
    }

    #[test]
    fn test_verification_table_rounding() {
        let result = PhaseVerifier::new()
            .verify(&angles(0.04, -119.96, 120.26), None)
            .unwrap();
        let table = verification_table(&result);
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].primary_phase, "IA");
        assert_eq!(table[0].secondary_phase, "Ia");
        assert_eq!(table[0].primary_angle_deg, 0.0);
        assert_eq!(table[1].primary_angle_deg, -120.0);
        assert_eq!(table[2].primary_angle_deg, 120.3);
        assert_eq!(table[2].expected_angle_deg, 90.3);
    }

    #[test]
    fn test_expected_secondary_rejects_non_finite_shift() {
        let primary = angles(0.0, -120.0, 120.0);
        let err = expected_secondary(&primary, f64::NAN, 0.0).unwrap_err();
        assert!(matches!(
            err,
            TftError::ArithmeticDomain {
                step: "phase_shift_deg",
                ..
            }
        ));
        let err =
            expected_secondary(&primary, DYN1_PHASE_SHIFT_DEG, f64::INFINITY).unwrap_err();
        assert!(matches!(
            err,
            TftError::ArithmeticDomain {
                step: "extra_rotation_deg",
                ..
            }
        ));
    }

    #[test]
    fn test_verify_rejects_bad_settings() {
        let primary = angles(0.0, -120.0, 120.0);
        assert!(PhaseVerifier::new()
            .with_phase_shift(f64::NAN)
            .verify(&primary, None)
            .is_err());
        assert!(PhaseVerifier::new()
            .with_extra_rotation(f64::NEG_INFINITY)
            .verify(&primary, None)
            .is_err());
        let err = PhaseVerifier::new()
            .with_tolerance(-1.0)
            .verify(&primary, None)
            .unwrap_err();
        assert!(matches!(
            err,
            TftError::InvalidInput {
                field: "tolerance_deg",
                ..
            }
        ));
        let err = PhaseVerifier::new()
            .with_tolerance(f64::NAN)
            .verify(&primary, None)
            .unwrap_err();
        assert!(matches!(err, TftError::ArithmeticDomain { .. }));
    }
}
