//! syscov - Syscall coverage statistics for captured trace files
//!
//! This library measures how many of the syscalls in a set of captured
//! traces the capture layer was able to name, and ranks the unresolved
//! syscall numbers across programs so the most common gaps stand out.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod coverage;
pub mod csv_output;
pub mod error;
pub mod html_output;
pub mod json_output;
pub mod pipeline;
pub mod rank;
pub mod report;
pub mod resolver;
pub mod syscalls;
pub mod trace;

pub use aggregate::{UnresolvedAggregate, UnresolvedRow};
pub use coverage::{CallIdentity, CoverageStats};
pub use error::CoverageError;
pub use rank::{RankedRow, RankedTable};
pub use trace::{Trace, TraceEntry};
