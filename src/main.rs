mod artifact;
mod cli;
mod domains;
mod engine;
mod error;
mod export;
mod fmt;
mod metrics;
mod numeric;
mod recommend;
mod report;
mod settings;
mod thresholds;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Show {
            kind,
            input,
            period,
        } => cli::show::run(kind, &input, period),
        Commands::Export {
            kind,
            input,
            format,
            output,
            period,
        } => cli::export::run(kind, &input, format, output, period).map(|_| ()),
        Commands::Kinds => cli::kinds::run(),
        Commands::Settings {
            company,
            currency,
            export_dir,
        } => cli::settings::run(company, currency, export_dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
