use std::io::Write;

use anyhow::{anyhow, bail, Context, Result};
use tft_algo::ReportBuilder;
use tft_cli::cli::ReportArgs;
use tft_cli::common::{write_json, OutputDest};
use tft_cli::config::TftConfig;
use tracing::info;

use crate::commands::{ct, short_circuit};

pub fn handle(args: &ReportArgs, config: &TftConfig) -> Result<()> {
    let angles = args.angles().map_err(|msg| anyhow!(msg))?;
    if args.short_circuit.is_empty() && angles.is_none() {
        bail!("nothing to report: give short-circuit inputs, CT angles, or both");
    }

    let operator = args
        .operator
        .clone()
        .unwrap_or_else(|| config.report.operator.clone());
    let note = args.note.clone().unwrap_or_else(|| config.report.note.clone());

    let mut builder = ReportBuilder::new(operator);
    if !note.trim().is_empty() {
        builder = builder.note(note);
    }
    if !args.short_circuit.is_empty() {
        let (input, result) = short_circuit::run(&args.short_circuit)?;
        builder = builder.short_circuit(input, result);
    }
    if let Some(angles) = angles {
        let verifier = ct::build_verifier(&args.check, config)?;
        let magnitude = ct::phasor_magnitude(args.magnitude, config);
        let result = ct::verify(&angles, args.observed.as_deref(), &verifier)?;
        builder = builder.ct_check(result, magnitude);
    }

    let report = builder.build().context("report incomplete")?;
    let dest = OutputDest::parse(&args.out);
    let mut out = dest.open()?;
    write_json(&report, &mut out, true)?;
    out.flush()?;

    if let OutputDest::File(path) = &dest {
        info!("Report written to {}", path.display());
    }
    Ok(())
}
