//! Drivetrain Event Pipeline - Main Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use pipeline::cli::Cli;
use pipeline::settings::load_settings;
use pipeline::{init_logging, CsvDirectorySink, OutputSink, Pipeline, PipelineParams};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level(), cli.log_json).context("failed to initialize logging")?;

    info!("=== Drivetrain Events v{} ===", env!("CARGO_PKG_VERSION"));

    let raw = load_settings(cli.config.as_deref(), &cli.overrides())
        .context("failed to load configuration")?;
    let (params, warnings) = PipelineParams::resolve(&raw);

    let pipeline = Pipeline::new(params)?.with_warnings(warnings);
    let output = pipeline
        .run_path(&cli.input)
        .with_context(|| format!("failed to process {}", cli.input.display()))?;

    let mut sink = CsvDirectorySink::new(&cli.output_dir, pipeline.params().delimiter)
        .with_raw(cli.write_raw);
    sink.publish(&output)
        .with_context(|| format!("failed to write results to {}", cli.output_dir.display()))?;

    info!(
        "{} differential-load events, {} slip events -> {}",
        output.summary.events.differential,
        output.summary.events.slip,
        sink.dir().display()
    );
    Ok(())
}
