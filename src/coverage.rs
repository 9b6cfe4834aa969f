//! Per-trace coverage statistics
//!
//! Two ratios are computed for every trace:
//! - coverage of all calls: share of non-error entries that are known calls
//! - coverage of unique calls: share of distinct call identities that are named
//!
//! A syscall called 1000 times counts once towards the unique total.

use crate::aggregate::UnresolvedAggregate;
use crate::error::{CoverageError, Result};
use crate::trace::{Trace, TraceEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Identity of a call for uniqueness counting
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallIdentity {
    /// Syscall named at capture time
    Named(String),
    /// Syscall known only by number
    Unresolved(u64),
}

impl CallIdentity {
    /// Identity of an entry, `None` for syscall error markers
    pub fn of(entry: &TraceEntry) -> Option<Self> {
        match entry {
            TraceEntry::Known { name, .. } => Some(CallIdentity::Named(name.clone())),
            TraceEntry::Unresolved { id, .. } => Some(CallIdentity::Unresolved(*id)),
            TraceEntry::SyscallError { .. } => None,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, CallIdentity::Named(_))
    }
}

/// Coverage statistics for one trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Entries excluding syscall error markers
    pub total: u64,
    /// Known calls among `total`
    pub known: u64,
    /// Unresolved calls among `total`
    pub unresolved: u64,
    /// Syscall error markers left out of every other count
    pub syscall_errors: u64,
    /// Percentage of `total` that are known calls
    pub coverage_percent: f64,
    /// Distinct call identities
    pub unique_total: u64,
    /// Distinct identities that are named
    pub unique_known: u64,
    /// Percentage of `unique_total` that are named
    pub unique_coverage_percent: f64,
}

/// Raw counts gathered in a single pass over a trace
#[derive(Debug, Default)]
struct EntryCounts {
    known: u64,
    unresolved: u64,
    syscall_errors: u64,
    identities: HashSet<CallIdentity>,
}

impl EntryCounts {
    fn tally(entries: &[TraceEntry]) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            match entry {
                TraceEntry::Known { .. } => counts.known += 1,
                TraceEntry::Unresolved { .. } => counts.unresolved += 1,
                TraceEntry::SyscallError { .. } => {
                    counts.syscall_errors += 1;
                    continue;
                }
            }
            if let Some(identity) = CallIdentity::of(entry) {
                counts.identities.insert(identity);
            }
        }
        counts
    }
}

/// Percentage of `part` in `whole`; callers guarantee `whole > 0`
fn percent(part: u64, whole: u64) -> f64 {
    part as f64 / whole as f64 * 100.0
}

impl CoverageStats {
    /// Compute coverage for a trace
    ///
    /// Fails with [`CoverageError::EmptyTrace`] when the trace holds no
    /// entries besides syscall error markers, since both ratios are undefined.
    pub fn compute(trace: &Trace) -> Result<Self> {
        let counts = EntryCounts::tally(trace.entries());
        let total = counts.known + counts.unresolved;

        if total == 0 {
            return Err(CoverageError::EmptyTrace {
                program: trace.program().to_string(),
            });
        }

        let unique_total = counts.identities.len() as u64;
        let unique_known = counts
            .identities
            .iter()
            .filter(|identity| identity.is_named())
            .count() as u64;

        let stats = Self {
            total,
            known: counts.known,
            unresolved: counts.unresolved,
            syscall_errors: counts.syscall_errors,
            coverage_percent: percent(counts.known, total),
            unique_total,
            unique_known,
            unique_coverage_percent: percent(unique_known, unique_total),
        };

        debug!(
            program = trace.program(),
            total = stats.total,
            coverage = stats.coverage_percent,
            unique_total = stats.unique_total,
            unique_coverage = stats.unique_coverage_percent,
            "computed coverage"
        );
        Ok(stats)
    }

    /// Distinct unresolved identities
    pub fn unique_unresolved(&self) -> u64 {
        self.unique_total - self.unique_known
    }
}

/// Fold a trace into the run's aggregate and compute its coverage
///
/// The aggregate is updated even when the trace turns out to be empty
/// (there is nothing to record in that case).
pub fn analyze(trace: &Trace, aggregate: &mut UnresolvedAggregate) -> Result<CoverageStats> {
    aggregate.record_trace(trace)?;
    CoverageStats::compute(trace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace_of(entries: Vec<TraceEntry>) -> Trace {
        Trace::new("test", entries)
    }

    #[test]
    fn test_mixed_trace() {
        // 7 known calls over 3 names, 3 calls of a single unresolved id
        let mut entries = Vec::new();
        for name in ["read", "read", "read", "write", "write", "close", "close"] {
            entries.push(TraceEntry::known(name));
        }
        for _ in 0..3 {
            entries.push(TraceEntry::unresolved(302));
        }

        let stats = CoverageStats::compute(&trace_of(entries)).unwrap();
        assert_eq!(stats.total, 10);
        assert_eq!(stats.known, 7);
        assert_eq!(stats.unresolved, 3);
        assert_eq!(format!("{:.2}", stats.coverage_percent), "70.00");
        assert_eq!(stats.unique_total, 4);
        assert_eq!(stats.unique_known, 3);
        assert_eq!(stats.unique_unresolved(), 1);
        assert_eq!(format!("{:.2}", stats.unique_coverage_percent), "75.00");
    }

    #[test]
    fn test_syscall_errors_are_excluded() {
        let entries = vec![
            TraceEntry::known("read"),
            TraceEntry::syscall_error("ESRCH"),
            TraceEntry::unresolved(7),
            TraceEntry::syscall_error("EPERM"),
        ];
        let stats = CoverageStats::compute(&trace_of(entries)).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.syscall_errors, 2);
        assert_eq!(stats.coverage_percent, 50.0);
        assert_eq!(stats.unique_total, 2);
        assert_eq!(stats.unique_coverage_percent, 50.0);
    }

    #[test]
    fn test_only_syscall_errors_is_empty_trace() {
        let entries = vec![
            TraceEntry::syscall_error("a"),
            TraceEntry::syscall_error("b"),
        ];
        let err = CoverageStats::compute(&trace_of(entries)).unwrap_err();
        assert!(matches!(err, CoverageError::EmptyTrace { ref program } if program == "test"));
    }

    #[test]
    fn test_no_entries_is_empty_trace() {
        let err = CoverageStats::compute(&trace_of(vec![])).unwrap_err();
        assert!(matches!(err, CoverageError::EmptyTrace { .. }));
    }

    #[test]
    fn test_all_known() {
        let entries = vec![TraceEntry::known("read"), TraceEntry::known("read")];
        let stats = CoverageStats::compute(&trace_of(entries)).unwrap();
        assert_eq!(stats.coverage_percent, 100.0);
        assert_eq!(stats.unique_total, 1);
        assert_eq!(stats.unique_coverage_percent, 100.0);
    }

    #[test]
    fn test_all_unresolved() {
        let entries = vec![
            TraceEntry::unresolved(1),
            TraceEntry::unresolved(2),
            TraceEntry::unresolved(1),
        ];
        let stats = CoverageStats::compute(&trace_of(entries)).unwrap();
        assert_eq!(stats.coverage_percent, 0.0);
        assert_eq!(stats.unique_total, 2);
        assert_eq!(stats.unique_coverage_percent, 0.0);
    }

    #[test]
    fn test_name_and_number_are_distinct_identities() {
        // "read" and syscall 0 are the same call, but a name and a number
        // are never merged
        let entries = vec![TraceEntry::known("read"), TraceEntry::unresolved(0)];
        let stats = CoverageStats::compute(&trace_of(entries)).unwrap();
        assert_eq!(stats.unique_total, 2);
    }

    #[test]
    fn test_repeated_call_counts_once_towards_unique_total() {
        let entries = vec![TraceEntry::known("futex"); 1000];
        let stats = CoverageStats::compute(&trace_of(entries)).unwrap();
        assert_eq!(stats.total, 1000);
        assert_eq!(stats.unique_total, 1);
    }

    #[test]
    fn test_analyze_updates_aggregate() {
        let mut aggregate = UnresolvedAggregate::new(["test", "other"]).unwrap();
        let trace = trace_of(vec![
            TraceEntry::known("read"),
            TraceEntry::unresolved(42),
            TraceEntry::unresolved(42),
        ]);

        let stats = analyze(&trace, &mut aggregate).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(aggregate.row(42).unwrap().counts, vec![2, 0]);
    }

    #[test]
    fn test_call_identity_of_entries() {
        assert_eq!(
            CallIdentity::of(&TraceEntry::known("read")),
            Some(CallIdentity::Named("read".to_string()))
        );
        assert_eq!(
            CallIdentity::of(&TraceEntry::unresolved(9)),
            Some(CallIdentity::Unresolved(9))
        );
        assert_eq!(CallIdentity::of(&TraceEntry::syscall_error("x")), None);
    }
}
