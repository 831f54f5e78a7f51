pub mod export;
pub mod kinds;
pub mod settings;
pub mod show;

use std::io::Read;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::artifact::ExportFormat;
use crate::engine::{build_from_json, ReportContext, ReportKind};
use crate::error::Result;
use crate::report::Report;
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Turn sales, inventory and commission data into reports and exports."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a report in the terminal.
    Show {
        /// Report kind
        #[arg(value_enum)]
        kind: ReportKind,
        /// JSON payload file, or '-' for stdin
        input: String,
        /// Period label shown in the header (default: taken from the payload)
        #[arg(long)]
        period: Option<String>,
    },
    /// Export a report as CSV, HTML or PDF.
    Export {
        /// Report kind
        #[arg(value_enum)]
        kind: ReportKind,
        /// JSON payload file, or '-' for stdin
        input: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output file or directory (default: <export_dir>/<kind>-report-YYYY-MM-DD.<ext>)
        #[arg(long)]
        output: Option<String>,
        /// Period label shown in the header (default: taken from the payload)
        #[arg(long)]
        period: Option<String>,
    },
    /// List report kinds and their export file prefixes.
    Kinds,
    /// Show or update settings.
    Settings {
        /// Company name printed on every report
        #[arg(long)]
        company: Option<String>,
        /// Currency prefix for money values, e.g. KES
        #[arg(long)]
        currency: Option<String>,
        /// Default directory for exports
        #[arg(long = "export-dir")]
        export_dir: Option<String>,
    },
}

/// Read a payload from a file path, or stdin for `-`.
pub(crate) fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

pub(crate) fn context(settings: &Settings, period: Option<String>) -> ReportContext {
    let mut ctx = ReportContext::new(chrono::Local::now().naive_local(), &settings.currency_prefix);
    ctx.company = settings.company_name.clone();
    ctx.period = period;
    ctx
}

/// Decode `input` and build the report of `kind`.
pub(crate) fn load_report(kind: ReportKind, input: &str, ctx: &ReportContext) -> Result<Report> {
    let json = read_input(input)?;
    debug!(kind = %kind, input, bytes = json.len(), "payload read");
    build_from_json(kind, &json, ctx)
}
