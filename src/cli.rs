//! CLI argument parsing for syscov

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// Output format for the unresolved syscall table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable aligned table (default)
    #[default]
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV table for spreadsheet analysis; summary lines go to stderr
    Csv,
}

/// Where syscall names for unresolved numbers come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// Run an external resolver program (scmp_sys_resolver by default)
    #[default]
    Command,
    /// Use the built-in x86_64 syscall table
    Builtin,
    /// Keep raw numbers
    None,
}

/// What to do with a trace that has no entries besides syscall errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyTracePolicy {
    /// Report both percentages as N/A and continue
    #[default]
    #[value(name = "na")]
    #[serde(rename = "na")]
    NotApplicable,
    /// Stop the run with an error
    Abort,
}

#[derive(Parser, Debug)]
#[command(name = "syscov")]
#[command(version)]
#[command(
    about = "Syscall coverage statistics and unresolved-call ranking for trace files",
    long_about = None
)]
pub struct Cli {
    /// Trace files to analyze; read from stdin (one per line) when omitted
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Number of unresolved syscalls to rank (default: 10)
    #[arg(short = 'n', long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Syscall name resolver for unresolved numbers
    #[arg(long = "resolver", value_enum)]
    pub resolver: Option<ResolverKind>,

    /// External resolver program (default: /usr/bin/scmp_sys_resolver)
    #[arg(long = "resolver-path", value_name = "PATH")]
    pub resolver_path: Option<PathBuf>,

    /// Output format for the ranked table
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Path of the persisted chart description (default: figure.json)
    #[arg(long = "figure", value_name = "PATH")]
    pub figure: Option<PathBuf>,

    /// Do not write the chart description
    #[arg(long = "no-figure", conflicts_with = "figure")]
    pub no_figure: bool,

    /// Render the chart as a self-contained HTML page
    #[arg(long = "chart-html", value_name = "PATH")]
    pub chart_html: Option<PathBuf>,

    /// Handling of traces without any non-error entries
    #[arg(long = "empty-policy", value_enum)]
    pub empty_policy: Option<EmptyTracePolicy>,

    /// Display label override for a program (e.g., --label vlc=VLC)
    #[arg(long = "label", value_name = "PROGRAM=LABEL", value_parser = parse_label)]
    pub labels: Vec<(String, String)>,

    /// TOML configuration file
    #[arg(short = 'C', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

/// Parse a `PROGRAM=LABEL` pair
fn parse_label(raw: &str) -> Result<(String, String), String> {
    let (program, label) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid label '{raw}': expected PROGRAM=LABEL"))?;
    let (program, label) = (program.trim(), label.trim());
    if program.is_empty() || label.is_empty() {
        return Err(format!("invalid label '{raw}': program and label must be non-empty"));
    }
    Ok((program.to_string(), label.to_string()))
}
