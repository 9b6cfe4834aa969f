//! Syscall number to name resolution for ranked rows
//!
//! The default resolver shells out to libseccomp's `scmp_sys_resolver`,
//! once per ranked number. A failed or empty lookup is never fatal: the
//! row keeps its raw number as its label.

use crate::rank::RankedTable;
use crate::syscalls;
use std::collections::HashMap;
use std::ffi::OsString;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, warn};

/// Default external resolver
pub const DEFAULT_RESOLVER_PATH: &str = "/usr/bin/scmp_sys_resolver";

/// Reasons a single lookup produced no name
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("failed to run resolver '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("resolver exited with {status} for syscall {id}")]
    Failed {
        id: u64,
        status: std::process::ExitStatus,
    },

    #[error("resolver returned no name for syscall {id}")]
    Empty { id: u64 },
}

/// Maps a raw syscall number to a display name
pub trait NameResolver {
    fn resolve(&self, id: u64) -> Result<String, ResolverError>;
}

/// Runs an external program with the number as its only argument and
/// reads the name from its standard output
#[derive(Debug, Clone)]
pub struct CommandResolver {
    program: OsString,
}

impl CommandResolver {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandResolver {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLVER_PATH)
    }
}

impl NameResolver for CommandResolver {
    fn resolve(&self, id: u64) -> Result<String, ResolverError> {
        let output = Command::new(&self.program)
            .arg(id.to_string())
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| ResolverError::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;

        if !output.status.success() {
            return Err(ResolverError::Failed {
                id,
                status: output.status,
            });
        }

        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if name.is_empty() {
            return Err(ResolverError::Empty { id });
        }
        Ok(name)
    }
}

/// In-process lookup in the built-in x86_64 table
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinResolver;

impl NameResolver for BuiltinResolver {
    fn resolve(&self, id: u64) -> Result<String, ResolverError> {
        syscalls::syscall_name(id)
            .map(str::to_string)
            .ok_or(ResolverError::Empty { id })
    }
}

/// Lookup in a fixed table
#[derive(Debug, Clone, Default)]
pub struct TableResolver {
    names: HashMap<u64, String>,
}

impl TableResolver {
    pub fn new(names: HashMap<u64, String>) -> Self {
        Self { names }
    }
}

impl FromIterator<(u64, String)> for TableResolver {
    fn from_iter<I: IntoIterator<Item = (u64, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl NameResolver for TableResolver {
    fn resolve(&self, id: u64) -> Result<String, ResolverError> {
        self.names
            .get(&id)
            .filter(|name| !name.trim().is_empty())
            .map(|name| name.trim().to_string())
            .ok_or(ResolverError::Empty { id })
    }
}

/// Name every ranked row, one lookup per row
///
/// Returns the number of rows left with their numeric fallback label.
pub fn resolve_rows(table: &mut RankedTable, resolver: &dyn NameResolver) -> usize {
    let mut unresolved = 0;
    for row in &mut table.rows {
        match resolver.resolve(row.id) {
            Ok(name) => {
                debug!(id = row.id, name = %name, "resolved syscall");
                row.name = Some(name);
            }
            Err(e) => {
                warn!(id = row.id, "keeping numeric label: {}", e);
                row.name = None;
                unresolved += 1;
            }
        }
    }
    unresolved
}
