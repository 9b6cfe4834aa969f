use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use syscov::cli::{Cli, OutputFormat};
use syscov::config::RunConfig;
use syscov::html_output::HtmlChartOutput;
use syscov::json_output::FigureDescription;
use syscov::{pipeline, report};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let mut config = RunConfig::from_cli(&args)?;

    // No files on the command line: read one path per line until EOF
    if config.files.is_empty() {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            eprintln!("Enter filenames, CTRL+D to continue");
        }
        config.files =
            pipeline::read_file_list(stdin.lock()).context("Failed to read file list")?;
    }

    let report = pipeline::run_config(&config)?;

    // Keep stdout a single CSV document
    if config.format == OutputFormat::Csv {
        report::write_summary(&mut io::stderr().lock(), &report)
            .context("Failed to write summary")?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_report(&mut out, &report, config.format).context("Failed to write report")?;
    out.flush()?;

    if let Some(path) = &config.figure {
        FigureDescription::from_table(&report.table, &report.program_labels).write_to(path)?;
        eprintln!("Chart description saved to {}", path.display());
    }

    if let Some(path) = &config.chart_html {
        HtmlChartOutput::new(&report).write_to(path)?;
        eprintln!("Chart saved to {}", path.display());
    }

    Ok(())
}
