use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use geoshrink::cli::{self, Args, CliConfig, CliUtils};
use geoshrink::{GeoshrinkError, MapshaperCli, RunSummary, StatusPrinter};

fn main() -> Result<()> {
    let args = Args::parse();

    let cli_config = match CliConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    init_logging(cli_config.log_filter());

    match execute(&cli_config) {
        Ok(summary) if summary.has_failures() => Err(anyhow::anyhow!(
            "{} of {} files could not be processed",
            summary.totals.failed,
            summary.totals.found
        )),
        Ok(_) => Ok(()),
        Err(e) => exit_with(&e),
    }
}

fn execute(cli_config: &CliConfig) -> Result<RunSummary, GeoshrinkError> {
    let config = &cli_config.run_config;
    let mapshaper = MapshaperCli::new(&cli_config.args.mapshaper);

    if !config.dry_run {
        let version = mapshaper.probe()?;
        tracing::debug!(version = %version, "found mapshaper");
    }

    let status = StatusPrinter::new(cli_config.is_quiet()).with_progress();
    let summary = geoshrink::run(config, &mapshaper, &status)?;

    if !cli_config.is_quiet() {
        println!(
            "\n{} in {}",
            summary.summary(),
            CliUtils::format_duration(summary.duration())
        );
    }

    if let Some(report_path) = &cli_config.args.report {
        summary.write_json(report_path)?;
        if !cli_config.is_quiet() {
            println!("Report written to {}", report_path.display());
        }
    }

    Ok(summary)
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_with(error: &GeoshrinkError) -> ! {
    cli::handle_error(error);
    std::process::exit(1);
}
