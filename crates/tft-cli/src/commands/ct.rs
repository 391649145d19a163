use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use tft_algo::report::CtCheckSection;
use tft_algo::{verification_table, PhaseVerificationResult, PhaseVerifier, Winding};
use tft_cli::cli::{AngleArgs, CtCommands, PhaseCheckArgs};
use tft_cli::common::{write_csv, write_json, write_table, OutputFormat};
use tft_cli::config::TftConfig;
use tft_core::{parse_phase_order, PhaseAngles};
use tracing::{info, warn};

pub fn handle(command: &CtCommands, config: &TftConfig) -> Result<()> {
    match command {
        CtCommands::Verify {
            angles,
            observed,
            check,
            format,
        } => {
            let verifier = build_verifier(check, config)?;
            let result = verify(angles, observed.as_deref(), &verifier)?;
            write_verification(&result, *format)
        }
        CtCommands::Phasors {
            angles,
            magnitude,
            check,
            format,
        } => {
            let verifier = build_verifier(check, config)?;
            let magnitude = phasor_magnitude(*magnitude, config);
            let result = verify(angles, None, &verifier)?;
            let section =
                CtCheckSection::new(result, magnitude).context("invalid phasor magnitude")?;
            write_phasors(&section, *format)
        }
    }
}

/// Verifier from the `[phase_check]` config section with CLI overrides applied.
///
/// Shift and tolerance values are checked by [`PhaseVerifier::verify`].
pub fn build_verifier(check: &PhaseCheckArgs, config: &TftConfig) -> Result<PhaseVerifier> {
    let section = &config.phase_check;
    let reference = match check.reference {
        Some(reference) => reference.into(),
        None => section.reference()?,
    };
    Ok(PhaseVerifier::new()
        .with_phase_shift(check.phase_shift_deg.unwrap_or(section.phase_shift_deg))
        .with_reference(reference)
        .with_tolerance(check.tolerance_deg.unwrap_or(section.tolerance_deg)))
}

pub fn phasor_magnitude(flag: Option<f64>, config: &TftConfig) -> f64 {
    flag.unwrap_or(config.report.phasor_magnitude)
}

/// Validate measured angles and the optional observed order, then verify.
pub fn verify(
    angles: &AngleArgs,
    observed: Option<&str>,
    verifier: &PhaseVerifier,
) -> Result<PhaseVerificationResult> {
    let primary =
        PhaseAngles::measured(angles.ia, angles.ib, angles.ic).context("invalid primary angle")?;
    let observed = observed
        .map(parse_phase_order)
        .transpose()
        .context("invalid --observed phase order")?;
    let result = verifier
        .verify(&primary, observed.as_ref())
        .context("invalid phase check settings")?;

    if !result.sequence_ok {
        warn!(angles = ?primary.to_array(), "primary angles are not a 120° sequence");
    }
    if let Some(false) = result.wiring_match() {
        warn!(mismatches = result.mismatches().len(), "CT secondary wiring mismatch");
    }
    info!(
        reference = %verifier.reference.map(|r| r.as_str()).unwrap_or("custom"),
        sequence_ok = result.sequence_ok,
        "CT phase verification computed"
    );
    Ok(result)
}

fn write_verification(result: &PhaseVerificationResult, format: OutputFormat) -> Result<()> {
    let table = verification_table(result);
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Json => {
            let data = json!({ "verification": result, "table": table });
            write_json(&data, &mut out, true)?;
        }
        OutputFormat::Csv => write_csv(&table, &mut out)?,
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = table
                .iter()
                .map(|row| {
                    vec![
                        row.primary_phase.to_string(),
                        format!("{:.1}", row.primary_angle_deg),
                        row.secondary_phase.to_string(),
                        format!("{:.1}", row.expected_angle_deg),
                    ]
                })
                .collect();
            write_table(&["PRIMARY", "ANGLE", "SECONDARY", "EXPECTED"], &rows, &mut out)?;
            writeln!(out)?;
            let reference = result
                .secondary_reference
                .map(|r| r.to_string())
                .unwrap_or_else(|| format!("{}° extra", result.extra_rotation_deg));
            writeln!(
                out,
                "Phase shift: {:.1}° (reference: {reference})",
                result.phase_shift_deg
            )?;
            let sequence = if result.sequence_ok { "ok" } else { "NOT ok" };
            writeln!(out, "Sequence: {sequence}")?;
            match &result.wiring {
                None => writeln!(out, "Wiring: not checked")?,
                Some(wiring) if wiring.wiring_match => writeln!(out, "Wiring: match")?,
                Some(wiring) => {
                    writeln!(out, "Wiring: mismatch")?;
                    for mismatch in &wiring.mismatches {
                        writeln!(out, "  - {mismatch}")?;
                    }
                }
            }
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct PhasorRow {
    winding: Winding,
    label: &'static str,
    angle_deg: f64,
    x: f64,
    y: f64,
}

fn phasor_rows(section: &CtCheckSection) -> Vec<PhasorRow> {
    [&section.primary_phasors, &section.secondary_phasors]
        .into_iter()
        .flat_map(|trace| {
            trace.points.iter().map(move |p| PhasorRow {
                winding: trace.winding,
                label: p.label,
                angle_deg: p.angle_deg,
                x: p.x,
                y: p.y,
            })
        })
        .collect()
}

fn write_phasors(section: &CtCheckSection, format: OutputFormat) -> Result<()> {
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Json => {
            let data = json!({
                "magnitude": section.phasor_magnitude,
                "primary": section.primary_phasors,
                "secondary": section.secondary_phasors,
            });
            write_json(&data, &mut out, true)?;
        }
        OutputFormat::Csv => write_csv(&phasor_rows(section), &mut out)?,
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = phasor_rows(section)
                .into_iter()
                .map(|row| {
                    vec![
                        row.label.to_string(),
                        format!("{:.1}", row.angle_deg),
                        format!("{:.4}", row.x),
                        format!("{:.4}", row.y),
                    ]
                })
                .collect();
            write_table(&["PHASOR", "ANGLE", "X", "Y"], &rows, &mut out)?;
        }
    }
    Ok(())
}
