use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use tft_algo::report::{short_circuit_fields, ShortCircuitSection};
use tft_algo::{compute_short_circuit, ShortCircuitTestResult, COPPER_LOSS_NOTE};
use tft_cli::cli::ShortCircuitArgs;
use tft_cli::common::{write_fields, write_json, OutputFormat};
use tft_core::TransformerTestInput;
use tracing::info;

pub fn handle(args: &ShortCircuitArgs, format: OutputFormat) -> Result<()> {
    let (input, result) = run(args)?;
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Json => {
            write_json(&ShortCircuitSection { input, result }, &mut out, true)?;
        }
        OutputFormat::Csv => {
            write_fields(&short_circuit_fields(&input, &result), format, &mut out)?;
        }
        OutputFormat::Table => {
            write_fields(&short_circuit_fields(&input, &result), format, &mut out)?;
            writeln!(out)?;
            writeln!(out, "Note: {COPPER_LOSS_NOTE}")?;
        }
    }
    Ok(())
}

/// Check the draft and run the engine.
///
/// An incomplete or out-of-range draft prints every diagnostic to stderr and
/// fails without computing anything.
pub fn run(args: &ShortCircuitArgs) -> Result<(TransformerTestInput, ShortCircuitTestResult)> {
    let draft = args.to_draft();
    let diagnostics = draft.diagnostics();
    if !diagnostics.is_ready() {
        eprint!("{diagnostics}");
        bail!("short-circuit input not ready: {}", diagnostics.summary());
    }

    let input = draft.validate().context("short-circuit input rejected")?;
    let result = compute_short_circuit(&input).context("short-circuit calculation failed")?;
    info!(
        side = %input.tested_side(),
        line_current_a = result.line_current_a.value(),
        apparent_power_kva = result.apparent_power_kva.value(),
        "short-circuit test computed"
    );
    Ok((input, result))
}
