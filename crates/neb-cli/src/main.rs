mod cli;
mod error;
mod logging;
mod progress;

use crate::cli::Cli;
use crate::error::Result;
use crate::progress::CliProgressHandler;
use clap::Parser;
use nebgen::progress::ProgressReporter;
use nebgen::workflows::generate;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("nebgen v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let report = match generate::run(&cli.dir, &reporter) {
        Ok(report) => report,
        Err(e) => {
            error!("Image generation failed: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "Generation complete: {} images, {} intermediate file(s) written.",
        report.image_count,
        report.written.len()
    );
    println!(
        "Wrote {} intermediate POSCAR file(s) for a chain of {} images.",
        report.written.len(),
        report.image_count
    );

    Ok(())
}
