//! JSON output: the machine-readable run report and the persisted chart
//! description
//!
//! The chart description uses Plotly's figure schema (a list of bar traces
//! plus a layout), so it can be loaded by any Plotly front end.

use crate::coverage::CoverageStats;
use crate::pipeline::RunReport;
use crate::rank::RankedTable;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Coverage figures for one input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonFileCoverage {
    pub file: String,
    pub program: String,
    /// Absent for empty traces reported as N/A
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_percent: Option<f64>,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_coverage_percent: Option<f64>,
    pub unique_total: u64,
    /// Distinct syscall numbers the capture layer could not name
    pub unique_unresolved: u64,
    pub syscall_errors: u64,
}

/// One ranked unresolved syscall
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonUnresolvedRow {
    pub id: u64,
    /// Resolved name, or the number when resolution failed
    pub label: String,
    pub resolved: bool,
    /// Counts in the order of `JsonUnresolvedTable::programs`
    pub counts: Vec<u64>,
    pub total: u64,
}

/// Ranked table of unresolved syscalls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonUnresolvedTable {
    /// Program display labels
    pub programs: Vec<String>,
    /// Distinct unresolved syscalls before truncation
    pub distinct: usize,
    pub rows: Vec<JsonUnresolvedRow>,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    pub files: Vec<JsonFileCoverage>,
    pub unresolved: JsonUnresolvedTable,
}

impl JsonOutput {
    pub fn from_report(report: &RunReport) -> Self {
        let files = report
            .files
            .iter()
            .map(|file| {
                let stats = file.coverage.as_ref();
                JsonFileCoverage {
                    file: file.path.display().to_string(),
                    program: file.program.clone(),
                    coverage_percent: stats.map(|s| s.coverage_percent),
                    total: stats.map_or(0, |s| s.total),
                    unique_coverage_percent: stats.map(|s| s.unique_coverage_percent),
                    unique_total: stats.map_or(0, |s| s.unique_total),
                    unique_unresolved: stats.map_or(0, CoverageStats::unique_unresolved),
                    syscall_errors: stats.map_or(0, |s| s.syscall_errors),
                }
            })
            .collect();

        let rows = report
            .table
            .rows
            .iter()
            .map(|row| JsonUnresolvedRow {
                id: row.id,
                label: row.label().into_owned(),
                resolved: row.name.is_some(),
                counts: row.counts.clone(),
                total: row.total(),
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "syscov-json-v1".to_string(),
            files,
            unresolved: JsonUnresolvedTable {
                programs: report.program_labels.clone(),
                distinct: report.distinct_unresolved,
                rows,
            },
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Axis or legend title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureTitle {
    pub text: String,
}

impl FigureTitle {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

/// One bar series: the counts of a single program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureTrace {
    #[serde(rename = "type")]
    pub kind: String,
    /// Program display label
    pub name: String,
    /// Syscall labels
    pub x: Vec<String>,
    pub y: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureAxis {
    pub title: FigureTitle,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureLegend {
    pub title: FigureTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureLayout {
    pub barmode: String,
    pub xaxis: FigureAxis,
    pub yaxis: FigureAxis,
    pub legend: FigureLegend,
}

/// Grouped bar chart of per-program counts, log-scaled count axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureDescription {
    pub data: Vec<FigureTrace>,
    pub layout: FigureLayout,
}

impl FigureDescription {
    pub fn from_table(table: &RankedTable, program_labels: &[String]) -> Self {
        let x: Vec<String> = table.rows.iter().map(|row| row.label().into_owned()).collect();

        let data = program_labels
            .iter()
            .enumerate()
            .map(|(column, label)| FigureTrace {
                kind: "bar".to_string(),
                name: label.clone(),
                x: x.clone(),
                y: table
                    .rows
                    .iter()
                    .map(|row| row.counts.get(column).copied().unwrap_or(0))
                    .collect(),
            })
            .collect();

        Self {
            data,
            layout: FigureLayout {
                barmode: "group".to_string(),
                xaxis: FigureAxis {
                    title: FigureTitle::new("Syscall"),
                    scale: None,
                },
                yaxis: FigureAxis {
                    title: FigureTitle::new("Call count"),
                    scale: Some("log".to_string()),
                },
                legend: FigureLegend {
                    title: FigureTitle::new("Program"),
                },
            },
        }
    }

    /// Persist the description as JSON
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize chart")?;
        fs::write(path.as_ref(), json).with_context(|| {
            format!("Failed to write chart description: {}", path.as_ref().display())
        })
    }
}
