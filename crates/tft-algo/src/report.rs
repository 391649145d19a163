//! Report assembly.
//!
//! A [`TestReport`] bundles already-computed results with a timestamp and the
//! operator identifier. Nothing here recomputes anything: callers pass the
//! result values in explicitly, and the report is either complete or not
//! built at all.
//!
//! For tabular renderers, [`TestReport::fields`] flattens the report into
//! typed label/value pairs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tft_core::{
    Amperes, Degrees, KilovoltAmperes, Kilovolts, MegavoltAmperes, PerUnit, Percent, TftError,
    TftResult, TransformerTestInput, Volts,
};

use crate::phase_check::{verification_table, CtCheckRow, PhaseVerificationResult};
use crate::phasor::{PhasorTrace, Winding};
use crate::short_circuit::ShortCircuitTestResult;

/// Operator note printed under the short-circuit results
pub const COPPER_LOSS_NOTE: &str = "If the test voltage is set so that the test current equals \
rated current, the test power corresponds to full-load copper losses. Without separating R% and \
X%, the active component can only be estimated through the power factor.";

#[derive(Debug, Clone, Serialize)]
pub struct ShortCircuitSection {
    pub input: TransformerTestInput,
    pub result: ShortCircuitTestResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct CtCheckSection {
    pub verification: PhaseVerificationResult,
    pub table: Vec<CtCheckRow>,
    pub phasor_magnitude: f64,
    pub primary_phasors: PhasorTrace,
    pub secondary_phasors: PhasorTrace,
}

impl CtCheckSection {
    /// Tabulate the verification and trace both windings at `phasor_magnitude`,
    /// which must be finite and greater than zero.
    pub fn new(verification: PhaseVerificationResult, phasor_magnitude: f64) -> TftResult<Self> {
        if phasor_magnitude <= 0.0 {
            return Err(TftError::invalid_input(
                "phasor_magnitude",
                format!("must be greater than zero, got {phasor_magnitude}"),
            ));
        }
        let primary_phasors = PhasorTrace::new(
            Winding::Primary,
            &verification.primary_angles,
            phasor_magnitude,
        )?;
        let secondary_phasors = PhasorTrace::new(
            Winding::Secondary,
            &verification.expected_secondary_angles,
            phasor_magnitude,
        )?;
        Ok(Self {
            table: verification_table(&verification),
            verification,
            phasor_magnitude,
            primary_phasors,
            secondary_phasors,
        })
    }
}

/// Value of a flattened report field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl std::fmt::Display for ReportValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportValue::Number(v) => write!(f, "{v:.2}"),
            ReportValue::Text(s) => f.write_str(s),
            ReportValue::Flag(true) => f.write_str("yes"),
            ReportValue::Flag(false) => f.write_str("no"),
        }
    }
}

/// One label/value pair of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportField {
    pub section: &'static str,
    pub label: String,
    pub value: ReportValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
}

impl ReportField {
    fn number(section: &'static str, label: &str, value: f64, unit: &'static str) -> Self {
        Self {
            section,
            label: label.to_string(),
            value: ReportValue::Number(value),
            unit: Some(unit),
        }
    }

    fn text(section: &'static str, label: &str, value: impl Into<String>) -> Self {
        Self {
            section,
            label: label.to_string(),
            value: ReportValue::Text(value.into()),
            unit: None,
        }
    }

    fn flag(section: &'static str, label: &str, value: bool) -> Self {
        Self {
            section,
            label: label.to_string(),
            value: ReportValue::Flag(value),
            unit: None,
        }
    }
}

/// Printable record of one test session
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub generated_at: DateTime<Utc>,
    pub operator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_circuit: Option<ShortCircuitSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ct_check: Option<CtCheckSection>,
}

pub const SECTION_SHORT_CIRCUIT: &str = "short_circuit";
pub const SECTION_CT_CHECK: &str = "ct_check";

/// Flatten a short-circuit result into label/value pairs.
pub fn short_circuit_fields(
    input: &TransformerTestInput,
    r: &ShortCircuitTestResult,
) -> Vec<ReportField> {
    let s = SECTION_SHORT_CIRCUIT;
    let side = format!("{} ({})", r.tested_side, r.connection);
    vec![
        ReportField::number(s, "Impedance", input.impedance_percent().value(), Percent::UNIT),
        ReportField::number(
            s,
            "Rated power",
            input.rated_power_mva().value(),
            MegavoltAmperes::UNIT,
        ),
        ReportField::number(
            s,
            "Rated voltage (tested side)",
            input.rated_voltage_side_kv().value(),
            Kilovolts::UNIT,
        ),
        ReportField::text(s, "Tested side", side),
        ReportField::number(s, "Applied test voltage", r.test_voltage_v.value(), Volts::UNIT),
        ReportField::number(s, "Impedance (pu)", r.impedance_pu.value(), PerUnit::UNIT),
        ReportField::number(s, "Test voltage (pu)", r.voltage_pu.value(), PerUnit::UNIT),
        ReportField::number(s, "Test current (pu)", r.current_pu.value(), PerUnit::UNIT),
        ReportField::number(s, "Base current", r.base_current_a.value(), Amperes::UNIT),
        ReportField::number(s, "Line current", r.line_current_a.value(), Amperes::UNIT),
        ReportField::number(s, "Phase current", r.phase_current_a.value(), Amperes::UNIT),
        ReportField::number(
            s,
            "Test apparent power",
            r.apparent_power_kva.value(),
            KilovoltAmperes::UNIT,
        ),
        ReportField::number(
            s,
            "Voltage for rated current",
            r.rated_current_test_voltage_v.value(),
            Volts::UNIT,
        ),
    ]
}

/// Flatten a CT verification into label/value pairs.
pub fn ct_check_fields(section: &CtCheckSection) -> Vec<ReportField> {
    let s = SECTION_CT_CHECK;
    let v = &section.verification;
    let mut fields: Vec<ReportField> = section
        .table
        .iter()
        .flat_map(|row| {
            [
                ReportField::number(s, row.primary_phase, row.primary_angle_deg, Degrees::UNIT),
                ReportField::number(
                    s,
                    row.secondary_phase,
                    row.expected_angle_deg,
                    Degrees::UNIT,
                ),
            ]
        })
        .collect();
    let deg = Degrees::UNIT;
    fields.push(ReportField::number(s, "Phase shift", v.phase_shift_deg, deg));
    fields.push(ReportField::number(s, "Extra rotation", v.extra_rotation_deg, deg));
    fields.push(ReportField::flag(s, "Sequence ok", v.sequence_ok));
    if let Some(wiring) = &v.wiring {
        fields.push(ReportField::flag(s, "Wiring match", wiring.wiring_match));
        for mismatch in &wiring.mismatches {
            fields.push(ReportField::text(s, "Mismatch", mismatch.to_string()));
        }
    }
    fields
}

impl TestReport {
    pub fn fields(&self) -> Vec<ReportField> {
        let mut fields = vec![
            ReportField::text("report", "Generated at", self.generated_at.to_rfc3339()),
            ReportField::text("report", "Operator", self.operator.clone()),
        ];
        if let Some(sc) = &self.short_circuit {
            fields.extend(short_circuit_fields(&sc.input, &sc.result));
        }
        if let Some(ct) = &self.ct_check {
            fields.extend(ct_check_fields(ct));
        }
        if let Some(note) = &self.note {
            fields.push(ReportField::text("report", "Note", note.clone()));
        }
        fields
    }
}

/// Collects finished results into a [`TestReport`]
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    operator: String,
    generated_at: Option<DateTime<Utc>>,
    note: Option<String>,
    short_circuit: Option<ShortCircuitSection>,
    ct_check: Option<(PhaseVerificationResult, f64)>,
}

impl ReportBuilder {
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            ..Self::default()
        }
    }

    /// Fix the timestamp; defaults to the time of [`ReportBuilder::build`]
    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn short_circuit(
        mut self,
        input: TransformerTestInput,
        result: ShortCircuitTestResult,
    ) -> Self {
        self.short_circuit = Some(ShortCircuitSection { input, result });
        self
    }

    /// The CT section is tabulated and traced by [`ReportBuilder::build`]
    pub fn ct_check(
        mut self,
        verification: PhaseVerificationResult,
        phasor_magnitude: f64,
    ) -> Self {
        self.ct_check = Some((verification, phasor_magnitude));
        self
    }

    pub fn build(self) -> TftResult<TestReport> {
        let operator = self.operator.trim().to_string();
        if operator.is_empty() {
            return Err(TftError::invalid_input(
                "operator",
                "operator identifier required",
            ));
        }
        if self.short_circuit.is_none() && self.ct_check.is_none() {
            return Err(TftError::invalid_input(
                "report",
                "needs a short-circuit result or a CT verification",
            ));
        }
        let ct_check = self
            .ct_check
            .map(|(verification, magnitude)| CtCheckSection::new(verification, magnitude))
            .transpose()?;
        Ok(TestReport {
            generated_at: self.generated_at.unwrap_or_else(Utc::now),
            operator,
            note: self.note,
            short_circuit: self.short_circuit,
            ct_check,
        })
    }
}
