//! Top-N ranking of unresolved syscalls

use crate::aggregate::UnresolvedAggregate;
use serde::Serialize;
use std::borrow::Cow;

/// Number of rows kept when no limit is configured
pub const DEFAULT_TOP_N: usize = 10;

/// One ranked unresolved syscall
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedRow {
    /// Raw syscall number
    pub id: u64,
    /// Resolved name, if a resolver produced one
    pub name: Option<String>,
    /// Occurrences per program, in the table's program order
    pub counts: Vec<u64>,
}

impl RankedRow {
    /// Occurrences across all programs
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Display label: the resolved name, or the raw number
    pub fn label(&self) -> Cow<'_, str> {
        match &self.name {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(self.id.to_string()),
        }
    }
}

/// Ranked rows together with their program columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedTable {
    pub programs: Vec<String>,
    pub rows: Vec<RankedRow>,
}

impl RankedTable {
    /// Select the `n` most frequent unresolved syscalls
    ///
    /// Rows are ordered by descending total; equal totals keep the order in
    /// which their number was first seen. Fewer than `n` rows is not an error.
    pub fn top_n(aggregate: &UnresolvedAggregate, n: usize) -> Self {
        let mut rows: Vec<RankedRow> = aggregate
            .rows()
            .iter()
            .map(|row| RankedRow {
                id: row.id,
                name: None,
                counts: row.counts.clone(),
            })
            .collect();

        // sort_by_key is stable, so ties stay in first-seen order
        rows.sort_by_key(|row| std::cmp::Reverse(row.total()));
        rows.truncate(n);

        Self {
            programs: aggregate.programs().to_vec(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
