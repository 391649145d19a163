//! Short-circuit test input model.
//!
//! Operator data enters as a [`TransformerTestDraft`], where any field may
//! still be empty. A draft becomes a [`TransformerTestInput`] only once every
//! required field is present and inside its documented range; the engines
//! never see a partial input.
//!
//! ```text
//! Draft ──readiness()──► Incomplete { missing }     (not ready, nothing runs)
//!                    └─► Ready(TransformerTestInput) (engine may run)
//!       ──validate()───► Err(InvalidInput)           (out of range or missing)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::diagnostics::Diagnostics;
use crate::error::{TftError, TftResult};
use crate::units::{Kilovolts, MegavoltAmperes, Percent, Volts};

/// Upper bound of the nameplate impedance, in percent
pub const MAX_IMPEDANCE_PERCENT: f64 = 100.0;
/// Upper bound of the nameplate rating, in MVA
pub const MAX_RATED_POWER_MVA: f64 = 1000.0;
/// Upper bound of the applied test voltage, in volts
pub const MAX_TEST_VOLTAGE_V: f64 = 50_000.0;
/// Upper bound of a nameplate line-to-line voltage, in kV
pub const MAX_RATED_VOLTAGE_KV: f64 = 50_000.0;

/// Winding on which the short-circuit test was performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestedSide {
    High,
    Low,
}

/// Winding connection assumed for each side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindingConnection {
    /// Phase current = line current / √3
    Delta,
    /// Phase current = line current
    Star,
}

impl TestedSide {
    /// Fixed policy: the high-voltage winding is delta, the low-voltage winding is star.
    pub fn connection(self) -> WindingConnection {
        match self {
            TestedSide::High => WindingConnection::Delta,
            TestedSide::Low => WindingConnection::Star,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TestedSide::High => "high",
            TestedSide::Low => "low",
        }
    }
}

impl fmt::Display for TestedSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestedSide {
    type Err = TftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "hv" | "at" => Ok(TestedSide::High),
            "low" | "lv" | "bt" => Ok(TestedSide::Low),
            other => Err(TftError::Parse(format!(
                "unknown tested side '{other}' (expected high or low)"
            ))),
        }
    }
}

impl fmt::Display for WindingConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindingConnection::Delta => f.write_str("delta"),
            WindingConnection::Star => f.write_str("star"),
        }
    }
}

fn check_range(field: &'static str, value: f64, max: f64) -> TftResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(TftError::invalid_input(
            field,
            format!("must be greater than zero, got {value}"),
        ));
    }
    if value > max {
        return Err(TftError::invalid_input(
            field,
            format!("must not exceed {max}, got {value}"),
        ));
    }
    Ok(())
}

/// Fully populated, range-checked short-circuit test input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformerTestInput {
    impedance_percent: Percent,
    rated_power_mva: MegavoltAmperes,
    test_voltage_v: Volts,
    rated_voltage_side_kv: Kilovolts,
    tested_side: TestedSide,
}

impl TransformerTestInput {
    /// Build a validated input.
    ///
    /// `rated_voltage_side_kv` is the nameplate line-to-line voltage of the
    /// tested winding, not of the other side.
    pub fn new(
        impedance_percent: f64,
        rated_power_mva: f64,
        test_voltage_v: f64,
        rated_voltage_side_kv: f64,
        tested_side: TestedSide,
    ) -> TftResult<Self> {
        check_range("impedance_percent", impedance_percent, MAX_IMPEDANCE_PERCENT)?;
        check_range("rated_power_mva", rated_power_mva, MAX_RATED_POWER_MVA)?;
        check_range("test_voltage_v", test_voltage_v, MAX_TEST_VOLTAGE_V)?;
        check_range(
            "rated_voltage_side_kv",
            rated_voltage_side_kv,
            MAX_RATED_VOLTAGE_KV,
        )?;
        Ok(Self {
            impedance_percent: Percent(impedance_percent),
            rated_power_mva: MegavoltAmperes(rated_power_mva),
            test_voltage_v: Volts(test_voltage_v),
            rated_voltage_side_kv: Kilovolts(rated_voltage_side_kv),
            tested_side,
        })
    }

    pub fn impedance_percent(&self) -> Percent {
        self.impedance_percent
    }

    pub fn rated_power_mva(&self) -> MegavoltAmperes {
        self.rated_power_mva
    }

    pub fn test_voltage_v(&self) -> Volts {
        self.test_voltage_v
    }

    pub fn rated_voltage_side_kv(&self) -> Kilovolts {
        self.rated_voltage_side_kv
    }

    pub fn tested_side(&self) -> TestedSide {
        self.tested_side
    }
}

/// Outcome of checking a draft for completeness
#[derive(Debug, Clone, PartialEq)]
pub enum Readiness {
    /// One or more required fields are empty or zero
    Incomplete { missing: Vec<&'static str> },
    Ready(TransformerTestInput),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready(_))
    }
}

/// Form-side short-circuit test data; every field may still be empty.
///
/// Both nameplate voltages are collected, but only the one belonging to the
/// selected [`TestedSide`] is required. Zero counts as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformerTestDraft {
    #[serde(default)]
    pub impedance_percent: Option<f64>,
    #[serde(default)]
    pub rated_power_mva: Option<f64>,
    #[serde(default)]
    pub test_voltage_v: Option<f64>,
    #[serde(default)]
    pub hv_rated_kv: Option<f64>,
    #[serde(default)]
    pub lv_rated_kv: Option<f64>,
    #[serde(default)]
    pub tested_side: Option<TestedSide>,
}

fn filled(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

impl TransformerTestDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_impedance_percent(mut self, value: f64) -> Self {
        self.impedance_percent = Some(value);
        self
    }

    pub fn with_rated_power_mva(mut self, value: f64) -> Self {
        self.rated_power_mva = Some(value);
        self
    }

    pub fn with_test_voltage_v(mut self, value: f64) -> Self {
        self.test_voltage_v = Some(value);
        self
    }

    pub fn with_hv_rated_kv(mut self, value: f64) -> Self {
        self.hv_rated_kv = Some(value);
        self
    }

    pub fn with_lv_rated_kv(mut self, value: f64) -> Self {
        self.lv_rated_kv = Some(value);
        self
    }

    pub fn with_tested_side(mut self, side: TestedSide) -> Self {
        self.tested_side = Some(side);
        self
    }

    /// Nameplate voltage field that applies to the selected side
    fn side_voltage(&self) -> Option<(&'static str, Option<f64>)> {
        self.tested_side.map(|side| match side {
            TestedSide::High => ("hv_rated_kv", self.hv_rated_kv),
            TestedSide::Low => ("lv_rated_kv", self.lv_rated_kv),
        })
    }

    /// Required fields that are still empty, in form order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let scalars = [
            ("impedance_percent", self.impedance_percent),
            ("rated_power_mva", self.rated_power_mva),
            ("test_voltage_v", self.test_voltage_v),
        ];
        for (field, value) in scalars {
            if filled(value).is_none() {
                missing.push(field);
            }
        }
        match self.side_voltage() {
            None => missing.push("tested_side"),
            Some((field, value)) => {
                if filled(value).is_none() {
                    missing.push(field);
                }
            }
        }
        missing
    }

    /// Check completeness first, then ranges.
    ///
    /// An incomplete draft is not an error; an out-of-range value is.
    pub fn readiness(&self) -> TftResult<Readiness> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Ok(Readiness::Incomplete { missing });
        }
        let (side, voltage_field, voltage) = match (self.tested_side, self.side_voltage()) {
            (Some(side), Some((field, Some(kv)))) => (side, field, kv),
            _ => {
                return Ok(Readiness::Incomplete {
                    missing: vec!["tested_side"],
                })
            }
        };
        let input = TransformerTestInput::new(
            self.impedance_percent.unwrap_or_default(),
            self.rated_power_mva.unwrap_or_default(),
            self.test_voltage_v.unwrap_or_default(),
            voltage,
            side,
        )
        .map_err(|err| match err {
            TftError::InvalidInput { field, reason } if field == "rated_voltage_side_kv" => {
                TftError::InvalidInput {
                    field: voltage_field,
                    reason,
                }
            }
            other => other,
        })?;
        Ok(Readiness::Ready(input))
    }

    /// Require a complete, in-range draft.
    pub fn validate(&self) -> TftResult<TransformerTestInput> {
        match self.readiness()? {
            Readiness::Ready(input) => Ok(input),
            Readiness::Incomplete { missing } => Err(TftError::invalid_input(
                missing.first().copied().unwrap_or("tested_side"),
                "value required",
            )),
        }
    }

    /// Every missing field as a warning and every out-of-range value as an error.
    ///
    /// The voltage of the untested side is range-checked when present even
    /// though it is not required.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diag = Diagnostics::new();
        for field in self.missing_fields() {
            diag.add_missing(field);
        }
        let ranged = [
            ("impedance_percent", self.impedance_percent, MAX_IMPEDANCE_PERCENT),
            ("rated_power_mva", self.rated_power_mva, MAX_RATED_POWER_MVA),
            ("test_voltage_v", self.test_voltage_v, MAX_TEST_VOLTAGE_V),
            ("hv_rated_kv", self.hv_rated_kv, MAX_RATED_VOLTAGE_KV),
            ("lv_rated_kv", self.lv_rated_kv, MAX_RATED_VOLTAGE_KV),
        ];
        for (field, value, max) in ranged {
            if let Some(v) = filled(value) {
                if let Err(TftError::InvalidInput { reason, .. }) = check_range(field, v, max) {
                    diag.add_out_of_range(field, &reason);
                }
            }
        }
        diag
    }
}
