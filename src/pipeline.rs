//! End-to-end coverage run
//!
//! Loads every trace in input order, folds it into the run's aggregate,
//! ranks the unresolved syscalls and names them. Every file is processed
//! before anything is reported, so a bad file aborts the run without
//! partial output.

use crate::aggregate::UnresolvedAggregate;
use crate::cli::EmptyTracePolicy;
use crate::config::RunConfig;
use crate::coverage::{self, CoverageStats};
use crate::error::{CoverageError, Result};
use crate::rank::RankedTable;
use crate::resolver::{self, NameResolver};
use crate::trace::{self, Trace};
use std::collections::HashMap;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Coverage result for one input file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    /// Path as given on input
    pub path: PathBuf,
    /// Program name derived from the path
    pub program: String,
    /// `None` when the trace was empty and reported as N/A
    pub coverage: Option<CoverageStats>,
}

/// Everything a coverage run produces
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Per-file results, in input order
    pub files: Vec<FileReport>,
    /// Display labels for the table's program columns
    pub program_labels: Vec<String>,
    /// Top-N unresolved syscalls
    pub table: RankedTable,
    /// Distinct unresolved syscalls across the run, before truncation
    pub distinct_unresolved: usize,
}

/// Options that shape a run independently of where the traces come from
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub top_n: usize,
    pub empty_policy: EmptyTracePolicy,
    pub labels: HashMap<String, String>,
}

impl From<&RunConfig> for RunOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            top_n: config.top_n,
            empty_policy: config.empty_policy,
            labels: config.labels.clone(),
        }
    }
}

/// Compute coverage for one trace, applying the empty-trace policy
fn process_trace(
    path: &Path,
    trace: &Trace,
    aggregate: &mut UnresolvedAggregate,
    policy: EmptyTracePolicy,
) -> Result<FileReport> {
    let coverage = match coverage::analyze(trace, aggregate) {
        Ok(stats) => Some(stats),
        Err(CoverageError::EmptyTrace { program }) if policy == EmptyTracePolicy::NotApplicable => {
            warn!(program = %program, "trace has no syscalls besides errors, reporting N/A");
            None
        }
        Err(e) => return Err(e),
    };

    Ok(FileReport {
        path: path.to_path_buf(),
        program: trace.program().to_string(),
        coverage,
    })
}

/// Run the coverage analysis over trace files
///
/// `resolver` names the ranked rows; `None` keeps raw numbers.
pub fn run<P: AsRef<Path>>(
    paths: &[P],
    options: &RunOptions,
    resolver: Option<&dyn NameResolver>,
) -> Result<RunReport> {
    if paths.is_empty() {
        return Err(CoverageError::NoInput);
    }

    // The full program list fixes the aggregate's columns up front
    let programs = paths
        .iter()
        .map(|path| trace::program_name(path.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let mut aggregate = UnresolvedAggregate::new(programs.iter().cloned())?;

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let trace = Trace::load(path)?;
        files.push(process_trace(
            path.as_ref(),
            &trace,
            &mut aggregate,
            options.empty_policy,
        )?);
    }

    let mut table = RankedTable::top_n(&aggregate, options.top_n);
    if let Some(resolver) = resolver {
        let fallbacks = resolver::resolve_rows(&mut table, resolver);
        if fallbacks > 0 {
            warn!(fallbacks, "some syscalls kept their numeric label");
        }
    }

    info!(
        files = files.len(),
        distinct_unresolved = aggregate.len(),
        ranked = table.len(),
        "coverage run complete"
    );

    let program_labels = programs
        .iter()
        .map(|program| trace::display_label(program, &options.labels))
        .collect();

    Ok(RunReport {
        files,
        program_labels,
        table,
        distinct_unresolved: aggregate.len(),
    })
}

/// Read trace paths, one per line, until end of input
///
/// Surrounding whitespace is trimmed and blank lines are skipped.
pub fn read_file_list<R: BufRead>(reader: R) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            files.push(PathBuf::from(trimmed));
        }
    }
    Ok(files)
}

/// Run the analysis described by a full configuration
pub fn run_config(config: &RunConfig) -> Result<RunReport> {
    let resolver = config.name_resolver();
    run(config.files.as_slice(), &RunOptions::from(config), resolver.as_deref())
}
