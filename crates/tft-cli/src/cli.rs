use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;
use tft_algo::SecondaryReference;
use tft_core::{TestedSide, TransformerTestDraft};

use crate::common::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "tft",
    author,
    version,
    about = "Transformer field-test calculations",
    long_about = None
)]
pub struct Cli {
    /// Set the logging level (defaults to the config file, then info)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Path to tft.toml (defaults to the user config directory)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Short-circuit test: test current and test-set power
    ShortCircuit {
        #[command(flatten)]
        args: ShortCircuitArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// CT phase verification for Dyn1 transformers
    Ct {
        #[command(subcommand)]
        command: CtCommands,
    },
    /// Build a test report (JSON) from short-circuit and/or CT inputs
    Report {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CtCommands {
    /// Expected secondary angles, sequence check and wiring check
    Verify {
        #[command(flatten)]
        angles: AngleArgs,
        /// Observed secondary assignment, e.g. "Ia,Ic,Ib"
        #[arg(long)]
        observed: Option<String>,
        #[command(flatten)]
        check: PhaseCheckArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Phasor coordinates for the primary and expected secondary sets
    Phasors {
        #[command(flatten)]
        angles: AngleArgs,
        /// Phasor diagram radius
        #[arg(long)]
        magnitude: Option<f64>,
        #[command(flatten)]
        check: PhaseCheckArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

/// Inputs for `tft report`. Either section may be left out, but not both.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Operator identifier (defaults to report.operator in the config)
    #[arg(long)]
    pub operator: Option<String>,
    /// Free-text note (defaults to report.note in the config)
    #[arg(long)]
    pub note: Option<String>,
    #[command(flatten)]
    pub short_circuit: ShortCircuitArgs,
    /// Measured IA angle [deg]
    #[arg(long, allow_negative_numbers = true)]
    pub ia: Option<f64>,
    /// Measured IB angle [deg]
    #[arg(long, allow_negative_numbers = true)]
    pub ib: Option<f64>,
    /// Measured IC angle [deg]
    #[arg(long, allow_negative_numbers = true)]
    pub ic: Option<f64>,
    /// Observed secondary assignment, e.g. "Ia,Ic,Ib"
    #[arg(long)]
    pub observed: Option<String>,
    #[command(flatten)]
    pub check: PhaseCheckArgs,
    /// Phasor diagram radius
    #[arg(long)]
    pub magnitude: Option<f64>,
    /// Output file ("-" for stdout)
    #[arg(short, long, default_value = "-", value_hint = ValueHint::FilePath)]
    pub out: String,
}

impl ReportArgs {
    /// Measured angles when all three were given, `None` when none were.
    pub fn angles(&self) -> Result<Option<AngleArgs>, String> {
        match (self.ia, self.ib, self.ic) {
            (Some(ia), Some(ib), Some(ic)) => Ok(Some(AngleArgs { ia, ib, ic })),
            (None, None, None) => Ok(None),
            _ => Err("the CT check needs all of --ia, --ib and --ic".to_string()),
        }
    }
}

/// Nameplate data and applied voltage for the short-circuit test.
///
/// Every field is optional on the command line so that an incomplete entry
/// can be reported field by field instead of failing in the parser.
#[derive(Args, Debug, Clone, Default)]
pub struct ShortCircuitArgs {
    /// Nameplate short-circuit impedance [%]
    #[arg(long)]
    pub impedance_percent: Option<f64>,
    /// Rated apparent power [MVA]
    #[arg(long)]
    pub rated_power_mva: Option<f64>,
    /// Applied test voltage, line-to-line [V]
    #[arg(long)]
    pub test_voltage_v: Option<f64>,
    /// HV rated voltage [kV]
    #[arg(long)]
    pub hv_kv: Option<f64>,
    /// LV rated voltage [kV]
    #[arg(long)]
    pub lv_kv: Option<f64>,
    /// Winding the test voltage is applied to
    #[arg(long, value_enum)]
    pub side: Option<SideArg>,
}

impl ShortCircuitArgs {
    /// True when no short-circuit flag was given at all
    pub fn is_empty(&self) -> bool {
        self.impedance_percent.is_none()
            && self.rated_power_mva.is_none()
            && self.test_voltage_v.is_none()
            && self.hv_kv.is_none()
            && self.lv_kv.is_none()
            && self.side.is_none()
    }

    pub fn to_draft(&self) -> TransformerTestDraft {
        TransformerTestDraft {
            impedance_percent: self.impedance_percent,
            rated_power_mva: self.rated_power_mva,
            test_voltage_v: self.test_voltage_v,
            hv_rated_kv: self.hv_kv,
            lv_rated_kv: self.lv_kv,
            tested_side: self.side.map(TestedSide::from),
        }
    }
}

/// Measured primary current angles
#[derive(Args, Debug, Clone, Copy)]
pub struct AngleArgs {
    /// Measured IA angle [deg]
    #[arg(long, allow_negative_numbers = true)]
    pub ia: f64,
    /// Measured IB angle [deg]
    #[arg(long, allow_negative_numbers = true)]
    pub ib: f64,
    /// Measured IC angle [deg]
    #[arg(long, allow_negative_numbers = true)]
    pub ic: f64,
}

/// Overrides for the `[phase_check]` config section
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PhaseCheckArgs {
    /// Secondary current reference convention
    #[arg(long, value_enum)]
    pub reference: Option<ReferenceArg>,
    /// Vector-group displacement [deg]
    #[arg(long, allow_negative_numbers = true)]
    pub phase_shift_deg: Option<f64>,
    /// Allowed deviation from 120° in the sequence check [deg]
    #[arg(long)]
    pub tolerance_deg: Option<f64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideArg {
    /// High-voltage winding (delta)
    #[value(alias = "hv")]
    High,
    /// Low-voltage winding (star)
    #[value(alias = "lv")]
    Low,
}

impl From<SideArg> for TestedSide {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::High => TestedSide::High,
            SideArg::Low => TestedSide::Low,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceArg {
    /// Secondary follows the primary shifted by the vector group only
    Direct,
    /// Secondary reference rotated a further 180°
    Reversed,
}

impl From<ReferenceArg> for SecondaryReference {
    fn from(reference: ReferenceArg) -> Self {
        match reference {
            ReferenceArg::Direct => SecondaryReference::Direct,
            ReferenceArg::Reversed => SecondaryReference::Reversed,
        }
    }
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn test_short_circuit_args_to_draft() {
        let cli = Cli::try_parse_from([
            "tft",
            "short-circuit",
            "--impedance-percent",
            "5",
            "--rated-power-mva",
            "10",
            "--test-voltage-v",
            "1000",
            "--hv-kv",
            "13.8",
            "--side",
            "hv",
        ])
        .unwrap();
        let Some(Commands::ShortCircuit { args, format }) = cli.command else {
            panic!("expected short-circuit");
        };
        assert_eq!(format, OutputFormat::Table);
        let draft = args.to_draft();
        assert_eq!(draft.tested_side, Some(TestedSide::High));
        assert_eq!(draft.hv_rated_kv, Some(13.8));
        assert_eq!(draft.lv_rated_kv, None);
        assert!(draft.missing_fields().is_empty());
    }

    #[test]
    fn test_negative_angles_parse() {
        let cli = Cli::try_parse_from([
            "tft", "ct", "verify", "--ia", "0", "--ib", "-120", "--ic", "120",
        ])
        .unwrap();
        let Some(Commands::Ct {
            command: CtCommands::Verify { angles, .. },
        }) = cli.command
        else {
            panic!("expected ct verify");
        };
        assert_eq!(angles.ib, -120.0);
    }

    #[test]
    fn test_empty_short_circuit_args() {
        assert!(ShortCircuitArgs::default().is_empty());
        let args = ShortCircuitArgs {
            lv_kv: Some(0.4),
            ..ShortCircuitArgs::default()
        };
        assert!(!args.is_empty());
    }
}
