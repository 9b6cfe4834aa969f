//! Cross-program aggregation of unresolved syscalls
//!
//! The aggregate is a dense table: one row per unresolved syscall number,
//! one column per program of the run. Columns are fixed when the aggregate
//! is built, so every row carries a count for every program, zero when the
//! program never made that call. Rows keep the order in which their number
//! was first seen across the input.

use crate::error::{CoverageError, Result};
use crate::trace::{Trace, TraceEntry};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Occurrence counts of one unresolved syscall number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedRow {
    /// Raw syscall number
    pub id: u64,
    /// Occurrences per program, in the aggregate's program order
    pub counts: Vec<u64>,
}

impl UnresolvedRow {
    fn zeroed(id: u64, programs: usize) -> Self {
        Self {
            id,
            counts: vec![0; programs],
        }
    }

    /// Occurrences across all programs
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Unresolved syscall counts for every program of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedAggregate {
    programs: Vec<String>,
    program_index: HashMap<String, usize>,
    rows: Vec<UnresolvedRow>,
    row_index: HashMap<u64, usize>,
}

impl UnresolvedAggregate {
    /// Create an empty aggregate over the full program list of a run
    ///
    /// # Errors
    /// Returns [`CoverageError::DuplicateProgram`] if a program name repeats,
    /// since two traces would otherwise be merged into one column.
    pub fn new<I, S>(programs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        let mut program_index = HashMap::new();

        for program in programs {
            let program = program.into();
            if program_index.contains_key(&program) {
                return Err(CoverageError::DuplicateProgram { program });
            }
            program_index.insert(program.clone(), names.len());
            names.push(program);
        }

        Ok(Self {
            programs: names,
            program_index,
            rows: Vec::new(),
            row_index: HashMap::new(),
        })
    }

    /// Program names, in column order
    pub fn programs(&self) -> &[String] {
        &self.programs
    }

    /// Rows in first-seen order
    pub fn rows(&self) -> &[UnresolvedRow] {
        &self.rows
    }

    /// Number of distinct unresolved syscall numbers seen
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, program: &str) -> Result<usize> {
        self.program_index
            .get(program)
            .copied()
            .ok_or_else(|| CoverageError::UnknownProgram {
                program: program.to_string(),
            })
    }

    fn increment(&mut self, column: usize, id: u64) {
        let index = match self.row_index.get(&id) {
            Some(&index) => index,
            None => {
                let index = self.rows.len();
                self.rows
                    .push(UnresolvedRow::zeroed(id, self.programs.len()));
                self.row_index.insert(id, index);
                index
            }
        };
        self.rows[index].counts[column] += 1;
    }

    /// Record one occurrence of `id` for `program`
    pub fn record(&mut self, program: &str, id: u64) -> Result<()> {
        let column = self.column(program)?;
        self.increment(column, id);
        Ok(())
    }

    /// Record every unresolved entry of a trace under its program
    ///
    /// Returns the number of occurrences recorded. Fails before touching
    /// the table if the trace's program is not part of the run.
    pub fn record_trace(&mut self, trace: &Trace) -> Result<u64> {
        let column = self.column(trace.program())?;
        let mut recorded = 0;

        for entry in trace.entries() {
            if let TraceEntry::Unresolved { id, .. } = entry {
                self.increment(column, *id);
                recorded += 1;
            }
        }

        debug!(
            program = trace.program(),
            recorded,
            distinct = self.rows.len(),
            "aggregated unresolved calls"
        );
        Ok(recorded)
    }

    /// Row for a syscall number
    pub fn row(&self, id: u64) -> Option<&UnresolvedRow> {
        self.row_index.get(&id).map(|&index| &self.rows[index])
    }
}
