//! # tft-core: Transformer Field-Test Data Model
//!
//! Shared types for the transformer field-test toolkit: unit newtypes, the
//! error type, readiness diagnostics, and the input values consumed by the
//! calculation engines in `tft-algo`.
//!
//! ## Design Philosophy
//!
//! Operator input is validated once, at the boundary:
//!
//! - [`TransformerTestDraft`] holds whatever the operator has filled in so far
//! - [`TransformerTestDraft::readiness`] separates "not ready yet" from "wrong"
//! - [`TransformerTestInput`] can only be built from complete, in-range data
//!
//! The engines therefore never guess defaults for missing fields.
//!
//! ## Quick Start
//!
//! ```
//! use tft_core::{Readiness, TestedSide, TransformerTestDraft};
//!
//! let draft = TransformerTestDraft::new()
//!     .with_impedance_percent(5.0)
//!     .with_rated_power_mva(10.0)
//!     .with_test_voltage_v(1000.0)
//!     .with_hv_rated_kv(13.8)
//!     .with_tested_side(TestedSide::High);
//!
//! match draft.readiness()? {
//!     Readiness::Ready(input) => assert_eq!(input.test_voltage_v().value(), 1000.0),
//!     Readiness::Incomplete { missing } => panic!("still missing {missing:?}"),
//! }
//! # Ok::<(), tft_core::TftError>(())
//! ```
//!
//! ## Module Overview
//!
//! - [`units`]: newtypes for volts, kilovolts, amperes, MVA, kVA, per-unit, angles
//! - [`transformer`]: short-circuit test input, draft and readiness
//! - [`phase`]: phase labels, phase orders and angle triples
//! - [`diagnostics`]: missing/out-of-range reporting for the boundary layer
//! - [`error`]: [`TftError`] and [`TftResult`]

pub mod diagnostics;
pub mod error;
pub mod phase;
pub mod transformer;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{TftError, TftResult};
pub use phase::{parse_phase_order, Phase, PhaseAngles, PhaseOrder, EXPECTED_ORDER};
pub use transformer::{
    Readiness, TestedSide, TransformerTestDraft, TransformerTestInput, WindingConnection,
};
pub use units::{
    Amperes, Degrees, KilovoltAmperes, Kilovolts, MegavoltAmperes, PerUnit, Percent, Radians,
    Volts,
};

/// √3, the line/phase ratio of a balanced three-phase system
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;
