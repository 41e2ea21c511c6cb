//! suitup: compiles a directory of Suit templates.

mod bundle;
mod cli;
mod config;
mod files;
mod orchestrator;
mod output;

use clap::Parser;
use cli::Args;
use miette::{IntoDiagnostic, Result};
use output::Formatter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("SUIT_LOG")
                .unwrap_or_else(|_| "suitup=info,suit_compiler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let summary = orchestrator::run(&args).into_diagnostic()?;

    let report = Formatter::new(args.output).format(&summary.failures);
    if !report.is_empty() {
        print!("{report}");
    }

    if !summary.failures.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
