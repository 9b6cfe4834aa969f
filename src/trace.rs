//! Trace file loading
//!
//! A trace file is a JSON array with one object per captured syscall:
//!
//! ```json
//! [
//!   { "openat": { "dirfd": -100, "pathname": [47, 101, 116, 99] } },
//!   { "unknown": { "id": 302, "args": [0, 0, 0, 0, 0, 0], "return_value": 0 } },
//!   { "syscall_error": "error 'ESRCH' on syscall Read" }
//! ]
//! ```

use crate::error::{CoverageError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Key marking a syscall the capture layer could not name
pub const UNKNOWN_KEY: &str = "unknown";

/// Key marking a capture-time error record
pub const SYSCALL_ERROR_KEY: &str = "syscall_error";

/// Reasons a JSON object is not a valid trace entry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntryShapeError {
    #[error("trace entry is an empty object")]
    EmptyObject,

    #[error("trace entry has more than one key: {0:?}")]
    MultipleKeys(Vec<String>),

    #[error("'unknown' entry must be an object, found {0}")]
    UnknownNotObject(Value),

    #[error("'unknown' entry has no 'id' field")]
    MissingId,

    #[error("'unknown' entry id must be an unsigned integer, found {0}")]
    InvalidId(Value),
}

/// One decoded record of a trace file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub enum TraceEntry {
    /// A syscall resolved to a name at capture time
    Known { name: String, metadata: Value },
    /// A syscall identified only by its number
    Unresolved {
        id: u64,
        metadata: Map<String, Value>,
    },
    /// A capture-time error, not a real syscall
    SyscallError { detail: Value },
}

impl TraceEntry {
    /// Known call with empty metadata
    pub fn known(name: impl Into<String>) -> Self {
        TraceEntry::Known {
            name: name.into(),
            metadata: Value::Object(Map::new()),
        }
    }

    /// Unresolved call with only an id
    pub fn unresolved(id: u64) -> Self {
        let mut metadata = Map::new();
        metadata.insert("id".to_string(), Value::from(id));
        TraceEntry::Unresolved { id, metadata }
    }

    /// Syscall error marker with a textual detail
    pub fn syscall_error(detail: impl Into<String>) -> Self {
        TraceEntry::SyscallError {
            detail: Value::String(detail.into()),
        }
    }

    pub fn is_syscall_error(&self) -> bool {
        matches!(self, TraceEntry::SyscallError { .. })
    }
}

impl TryFrom<Map<String, Value>> for TraceEntry {
    type Error = EntryShapeError;

    fn try_from(mut map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        // An error marker wins regardless of what else the record carries
        if let Some(detail) = map.remove(SYSCALL_ERROR_KEY) {
            return Ok(TraceEntry::SyscallError { detail });
        }

        if map.len() > 1 {
            return Err(EntryShapeError::MultipleKeys(map.keys().cloned().collect()));
        }

        let (key, value) = map
            .into_iter()
            .next()
            .ok_or(EntryShapeError::EmptyObject)?;

        if key != UNKNOWN_KEY {
            return Ok(TraceEntry::Known {
                name: key,
                metadata: value,
            });
        }

        let metadata = match value {
            Value::Object(obj) => obj,
            other => return Err(EntryShapeError::UnknownNotObject(other)),
        };
        let id = match metadata.get("id") {
            None => return Err(EntryShapeError::MissingId),
            Some(raw) => raw
                .as_u64()
                .ok_or_else(|| EntryShapeError::InvalidId(raw.clone()))?,
        };

        Ok(TraceEntry::Unresolved { id, metadata })
    }
}

impl From<TraceEntry> for Map<String, Value> {
    fn from(entry: TraceEntry) -> Self {
        let mut map = Map::new();
        match entry {
            TraceEntry::Known { name, metadata } => {
                map.insert(name, metadata);
            }
            TraceEntry::Unresolved { id, mut metadata } => {
                metadata.insert("id".to_string(), Value::from(id));
                map.insert(UNKNOWN_KEY.to_string(), Value::Object(metadata));
            }
            TraceEntry::SyscallError { detail } => {
                map.insert(SYSCALL_ERROR_KEY.to_string(), detail);
            }
        }
        map
    }
}

/// The entries captured for one program
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    program: String,
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new(program: impl Into<String>, entries: Vec<TraceEntry>) -> Self {
        Self {
            program: program.into(),
            entries,
        }
    }

    /// Load a trace file, naming the program after the file stem
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let program = program_name(path)?;

        let file = File::open(path).map_err(|source| CoverageError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let trace = Self::from_reader(program, BufReader::new(file)).map_err(|source| {
            CoverageError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;

        debug!(
            path = %path.display(),
            program = trace.program(),
            entries = trace.entries.len(),
            "loaded trace"
        );
        Ok(trace)
    }

    /// Parse a trace from any reader
    pub fn from_reader<R: Read>(program: impl Into<String>, reader: R) -> serde_json::Result<Self> {
        let entries: Vec<TraceEntry> = serde_json::from_reader(reader)?;
        Ok(Self::new(program, entries))
    }

    /// Parse a trace from a JSON string
    pub fn parse(program: impl Into<String>, json: &str) -> serde_json::Result<Self> {
        let entries: Vec<TraceEntry> = serde_json::from_str(json)?;
        Ok(Self::new(program, entries))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Program name of a trace file: the base name without directory or extension
pub fn program_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CoverageError::InvalidProgramName {
            path: PathBuf::from(path),
        })
}

/// Display label for a program: an explicit override, otherwise the name
/// with its first character upper-cased and the rest lower-cased
pub fn display_label(program: &str, overrides: &HashMap<String, String>) -> String {
    if let Some(label) = overrides.get(program) {
        return label.clone();
    }

    let mut chars = program.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
