//! Run configuration: CLI flags layered over an optional TOML file
//!
//! # Example TOML
//! ```toml
//! top = 10
//! resolver = "command"
//! resolver_path = "/usr/bin/scmp_sys_resolver"
//! format = "text"
//! figure = "figure.json"
//! chart_html = "unresolved.html"
//! empty_policy = "na"
//!
//! [labels]
//! vlc = "VLC"
//! ```

use crate::cli::{Cli, EmptyTracePolicy, OutputFormat, ResolverKind};
use crate::rank::DEFAULT_TOP_N;
use crate::resolver::{BuiltinResolver, CommandResolver, NameResolver, DEFAULT_RESOLVER_PATH};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default path of the persisted chart description
pub const DEFAULT_FIGURE_PATH: &str = "figure.json";

/// Settings read from a TOML configuration file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub top: Option<usize>,
    pub resolver: Option<ResolverKind>,
    pub resolver_path: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub figure: Option<PathBuf>,
    pub chart_html: Option<PathBuf>,
    pub empty_policy: Option<EmptyTracePolicy>,
    pub labels: HashMap<String, String>,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Trace files, in input order
    pub files: Vec<PathBuf>,
    /// Rows kept in the ranked table
    pub top_n: usize,
    pub resolver: ResolverKind,
    pub resolver_path: PathBuf,
    pub format: OutputFormat,
    /// Chart description output; `None` disables it
    pub figure: Option<PathBuf>,
    /// Rendered HTML chart output
    pub chart_html: Option<PathBuf>,
    pub empty_policy: EmptyTracePolicy,
    /// Program display label overrides
    pub labels: HashMap<String, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            top_n: DEFAULT_TOP_N,
            resolver: ResolverKind::default(),
            resolver_path: PathBuf::from(DEFAULT_RESOLVER_PATH),
            format: OutputFormat::default(),
            figure: Some(PathBuf::from(DEFAULT_FIGURE_PATH)),
            chart_html: None,
            empty_policy: EmptyTracePolicy::default(),
            labels: HashMap::new(),
        }
    }
}

impl RunConfig {
    /// Layer CLI flags over file settings over defaults
    pub fn merge(cli: &Cli, file: FileConfig) -> Self {
        let defaults = Self::default();

        let figure = if cli.no_figure {
            None
        } else {
            cli.figure.clone().or(file.figure).or(defaults.figure)
        };

        let mut labels = file.labels;
        labels.extend(cli.labels.iter().cloned());

        Self {
            files: cli.files.clone(),
            top_n: cli.top.or(file.top).unwrap_or(defaults.top_n),
            resolver: cli.resolver.or(file.resolver).unwrap_or(defaults.resolver),
            resolver_path: cli
                .resolver_path
                .clone()
                .or(file.resolver_path)
                .unwrap_or(defaults.resolver_path),
            format: cli.format.or(file.format).unwrap_or(defaults.format),
            figure,
            chart_html: cli.chart_html.clone().or(file.chart_html),
            empty_policy: cli
                .empty_policy
                .or(file.empty_policy)
                .unwrap_or(defaults.empty_policy),
            labels,
        }
    }

    /// Build the run configuration from parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_toml(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(cli, file))
    }

    /// Name resolver for this run; `None` keeps raw numbers
    pub fn name_resolver(&self) -> Option<Box<dyn NameResolver>> {
        match self.resolver {
            ResolverKind::Command => Some(Box::new(CommandResolver::new(
                self.resolver_path.as_os_str(),
            ))),
            ResolverKind::Builtin => Some(Box::new(BuiltinResolver)),
            ResolverKind::None => None,
        }
    }
}
