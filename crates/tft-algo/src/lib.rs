//! # tft-algo: Transformer Field-Test Calculations
//!
//! Pure calculation engines for two commissioning checks, plus the report
//! record that combines their outputs.
//!
//! ## Short-Circuit Test
//!
//! [`ShortCircuitTestEngine`] turns nameplate data and the applied test
//! voltage into per-unit impedance, test current (line and phase) and the
//! apparent power drawn from the test set. See [`short_circuit`] for the
//! per-unit model.
//!
//! ## CT Phase Verification
//!
//! [`PhaseVerifier`] shifts measured primary angles by the Dyn1 displacement,
//! checks that the primary set is a valid three-phase sequence, and compares
//! an observed secondary assignment with Ia–Ib–Ic. See [`phase_check`].
//!
//! | Convention | Extra rotation | Reference order result for [0, -120, 120] |
//! |------------|----------------|-------------------------------------------|
//! | [`SecondaryReference::Direct`]   | 0°   | [-30, -150, 90] |
//! | [`SecondaryReference::Reversed`] | 180° | [150, 30, -90]  |
//!
//! ## Example
//!
//! ```
//! use tft_algo::{compute_short_circuit, PhaseVerifier, ReportBuilder};
//! use tft_core::{PhaseAngles, TestedSide, TransformerTestInput};
//!
//! let input = TransformerTestInput::new(5.0, 10.0, 1000.0, 13.8, TestedSide::High)?;
//! let sc = compute_short_circuit(&input)?;
//! assert!((sc.line_current_a.value() - 606.33).abs() < 0.01);
//!
//! let ct = PhaseVerifier::new().verify(&PhaseAngles::new(0.0, -120.0, 120.0)?, None)?;
//! assert!(ct.sequence_ok);
//!
//! let report = ReportBuilder::new("operator")
//!     .short_circuit(input, sc)
//!     .ct_check(ct, 1.0)
//!     .build()?;
//! assert!(!report.fields().is_empty());
//! # Ok::<(), tft_core::TftError>(())
//! ```

pub mod phase_check;
pub mod phasor;
pub mod report;
pub mod short_circuit;

pub use phase_check::{
    expected_secondary, sequence_check, verification_table, verify_wiring, CtCheckRow, Mismatch,
    PhaseVerificationResult, PhaseVerifier, SecondaryReference, WiringCheck,
    DEFAULT_SEQUENCE_TOLERANCE_DEG, DYN1_PHASE_SHIFT_DEG,
};
pub use phasor::{
    line_to_line, magnitude_angle, normalize_angle, phasor_coordinates, Phasor, PhasorPoint,
    PhasorTrace, Winding,
};
pub use report::{ReportBuilder, ReportField, ReportValue, TestReport, COPPER_LOSS_NOTE};
pub use short_circuit::{
    compute_short_circuit, rated_current_test_voltage, ShortCircuitTestEngine,
    ShortCircuitTestResult,
};
