//! # Transformer Short-Circuit Test
//!
//! With the secondary terminals shorted, a reduced voltage applied to the
//! tested winding drives a current limited only by the transformer's series
//! impedance. Knowing the nameplate impedance, the test current and the power
//! the test set must deliver follow directly from per-unit arithmetic.
//!
//! ## Per-Unit Model
//!
//! ```text
//! Z_pu   = Z% / 100
//! V_base = V_rated(tested side) × 1000                [V]
//! V_pu   = V_test / V_base
//! I_pu   = V_pu / Z_pu
//! I_base = S_rated / (√3 × V_base)                    [A, line]
//! I_line = I_pu × I_base
//! I_phase = I_line / √3   (HV side, delta)
//!         = I_line        (LV side, star)
//! S_test = √3 × V_test × I_line / 1000                [kVA]
//! ```
//!
//! The base is always the nameplate voltage of the tested side. Setting
//! `V_test = Z_pu × V_base` drives rated current, at which point the active
//! part of `S_test` equals the full-load copper losses.
//!
//! ## Failure Modes
//!
//! A zero divisor is reported as [`TftError::DivisionByZero`] and any
//! non-finite intermediate as [`TftError::ArithmeticDomain`], both naming the
//! step. Nothing is partially returned.

use serde::Serialize;
use tft_core::{
    Amperes, KilovoltAmperes, PerUnit, TestedSide, TftError, TftResult, TransformerTestInput,
    Volts, WindingConnection, SQRT_3,
};
use tracing::debug;

/// Quantities derived from one short-circuit test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShortCircuitTestResult {
    pub tested_side: TestedSide,
    /// Connection assumed when deriving the phase current
    pub connection: WindingConnection,
    pub impedance_pu: PerUnit,
    pub voltage_pu: PerUnit,
    pub current_pu: PerUnit,
    pub rated_power_va: f64,
    pub base_voltage_v: Volts,
    pub base_current_a: Amperes,
    pub line_current_a: Amperes,
    pub phase_current_a: Amperes,
    /// Apparent power drawn from the test set (not the transformer rating)
    pub apparent_power_kva: KilovoltAmperes,
    pub test_voltage_v: Volts,
    /// Test voltage that would drive exactly rated current
    pub rated_current_test_voltage_v: Volts,
}

fn finite(step: &'static str, value: f64) -> TftResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TftError::arithmetic_domain(step, value))
    }
}

fn checked_div(step: &'static str, numerator: f64, denominator: f64) -> TftResult<f64> {
    if denominator == 0.0 {
        return Err(TftError::division_by_zero(step));
    }
    finite(step, numerator / denominator)
}

/// Short-circuit test calculator.
///
/// Stateless; the connection policy (HV delta, LV star) is fixed by
/// [`TestedSide::connection`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortCircuitTestEngine;

impl ShortCircuitTestEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run the per-unit model for one validated input.
    pub fn compute(&self, input: &TransformerTestInput) -> TftResult<ShortCircuitTestResult> {
        let impedance_pu = input.impedance_percent().to_per_unit().value();
        let rated_power_va = input.rated_power_mva().to_volt_amperes();
        let base_voltage_v = input.rated_voltage_side_kv().to_volts().value();
        let test_voltage_v = input.test_voltage_v().value();

        let voltage_pu = checked_div("voltage_pu", test_voltage_v, base_voltage_v)?;
        let current_pu = checked_div("current_pu", voltage_pu, impedance_pu)?;
        let base_current_a =
            checked_div("base_current_a", rated_power_va, SQRT_3 * base_voltage_v)?;
        let line_current_a = finite("line_current_a", current_pu * base_current_a)?;

        let connection = input.tested_side().connection();
        let phase_current_a = match connection {
            WindingConnection::Delta => line_current_a / SQRT_3,
            WindingConnection::Star => line_current_a,
        };

        let apparent_power_kva = finite(
            "apparent_power_kva",
            SQRT_3 * test_voltage_v * line_current_a / 1000.0,
        )?;
        let rated_current_test_voltage_v = finite(
            "rated_current_test_voltage_v",
            impedance_pu * base_voltage_v,
        )?;

        debug!(
            side = %input.tested_side(),
            voltage_pu,
            current_pu,
            base_current_a,
            line_current_a,
            phase_current_a,
            apparent_power_kva,
            "short-circuit test computed"
        );

        Ok(ShortCircuitTestResult {
            tested_side: input.tested_side(),
            connection,
            impedance_pu: PerUnit(impedance_pu),
            voltage_pu: PerUnit(voltage_pu),
            current_pu: PerUnit(current_pu),
            rated_power_va,
            base_voltage_v: Volts(base_voltage_v),
            base_current_a: Amperes(base_current_a),
            line_current_a: Amperes(line_current_a),
            phase_current_a: Amperes(phase_current_a),
            apparent_power_kva: KilovoltAmperes(apparent_power_kva),
            test_voltage_v: Volts(test_voltage_v),
            rated_current_test_voltage_v: Volts(rated_current_test_voltage_v),
        })
    }
}

/// Convenience wrapper around [`ShortCircuitTestEngine::compute`].
pub fn compute_short_circuit(input: &TransformerTestInput) -> TftResult<ShortCircuitTestResult> {
    ShortCircuitTestEngine::new().compute(input)
}

/// Test voltage that drives rated current through the tested winding.
pub fn rated_current_test_voltage(input: &TransformerTestInput) -> Volts {
    let impedance_pu = input.impedance_percent().to_per_unit().value();
    Volts(impedance_pu * input.rated_voltage_side_kv().to_volts().value())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64, tol: f64) -> bool {
        (actual - expected).abs() <= tol
    }

    fn reference_input(side: TestedSide) -> TransformerTestInput {
        TransformerTestInput::new(5.0, 10.0, 1000.0, 13.8, side).unwrap()
    }

    #[test]
    fn test_reference_case_high_side() {
        let r = compute_short_circuit(&reference_input(TestedSide::High)).unwrap();

        assert_eq!(r.impedance_pu.value(), 0.05);
        assert_eq!(r.base_voltage_v.value(), 13_800.0);
        assert!(close(r.voltage_pu.value(), 0.072_464, 1e-6));
        assert!(close(r.current_pu.value(), 1.449_275, 1e-6));
        assert!(close(r.base_current_a.value(), 418.37, 0.01));
        assert!(close(r.line_current_a.value(), 606.33, 0.01));
        assert!(close(r.phase_current_a.value(), 350.07, 0.01));
        assert_eq!(r.connection, WindingConnection::Delta);
    }

    #[test]
    fn test_apparent_power_is_test_power() {
        let r = compute_short_circuit(&reference_input(TestedSide::High)).unwrap();
        let expected = SQRT_3 * 1000.0 * r.line_current_a.value() / 1000.0;
        assert_eq!(r.apparent_power_kva.value(), expected);
        assert!(close(r.apparent_power_kva.value(), 1050.20, 0.01));
    }

    #[test]
    fn test_low_side_phase_equals_line() {
        let input = TransformerTestInput::new(5.0, 10.0, 20.0, 0.38, TestedSide::Low).unwrap();
        let r = compute_short_circuit(&input).unwrap();
        assert_eq!(r.phase_current_a, r.line_current_a);
        assert_eq!(r.connection, WindingConnection::Star);
    }

    #[test]
    fn test_rated_current_voltage() {
        let input = reference_input(TestedSide::High);
        let v = rated_current_test_voltage(&input);
        assert!(close(v.value(), 690.0, 1e-9));

        let at_rated =
            TransformerTestInput::new(5.0, 10.0, v.value(), 13.8, TestedSide::High).unwrap();
        let r = compute_short_circuit(&at_rated).unwrap();
        assert!(close(r.current_pu.value(), 1.0, 1e-12));
        assert!(close(r.line_current_a.value(), r.base_current_a.value(), 1e-9));
    }

    #[test]
    fn test_checked_div_reports_step() {
        let err = checked_div("voltage_pu", 1.0, 0.0).unwrap_err();
        assert!(matches!(err, TftError::DivisionByZero { step: "voltage_pu" }));
    }

    #[test]
    fn test_finite_rejects_nan() {
        let err = finite("base_current_a", f64::NAN).unwrap_err();
        assert!(matches!(
            err,
            TftError::ArithmeticDomain {
                step: "base_current_a",
                ..
            }
        ));
        assert!(finite("x", f64::INFINITY).is_err());
    }
}
