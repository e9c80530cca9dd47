//! # Configuration — TOML File, CLI Overrides, Validation
//!
//! A run is driven by four settings: how results are reported, how the
//! search space is divided, how many workers run, and the inclusive
//! search limit. They come from a TOML file (default `primesweep.toml`)
//! with per-field command-line overrides; validation happens once,
//! after merging, and every failure names the offending field.
//!
//! ```toml
//! [search]
//! print_mode = "aggregate"          # "immediate" | "aggregate"
//! division_mode = "static-range"    # "static-range" | "dynamic-elimination"
//! worker_count = 4
//! search_limit = 1000
//! ```

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// When discoveries are reported: the instant they are found, or once
/// at the end of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PrintMode {
    Immediate,
    Aggregate,
}

impl std::fmt::Display for PrintMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrintMode::Immediate => write!(f, "immediate"),
            PrintMode::Aggregate => write!(f, "aggregate"),
        }
    }
}

/// How the search space is partitioned across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DivisionMode {
    /// Each worker scans one fixed contiguous chunk of `[1, limit]`.
    StaticRange,
    /// Workers eliminate multiples of discovered divisors in a shared sieve.
    DynamicElimination,
}

impl std::fmt::Display for DivisionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DivisionMode::StaticRange => write!(f, "static-range"),
            DivisionMode::DynamicElimination => write!(f, "dynamic-elimination"),
        }
    }
}

/// The four resolved settings. Immutable once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub print_mode: PrintMode,
    pub division_mode: DivisionMode,
    pub worker_count: usize,
    pub search_limit: u32,
}

/// Top-level TOML document: a single `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    search: SearchConfig,
}

/// Per-field command-line overrides applied on top of the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub print_mode: Option<PrintMode>,
    pub division_mode: Option<DivisionMode>,
    pub worker_count: Option<usize>,
    pub search_limit: Option<u32>,
}

impl Overrides {
    /// All four settings supplied — the file is not needed.
    fn complete(&self) -> Option<SearchConfig> {
        Some(SearchConfig {
            print_mode: self.print_mode?,
            division_mode: self.division_mode?,
            worker_count: self.worker_count?,
            search_limit: self.search_limit?,
        })
    }

    fn apply(&self, mut config: SearchConfig) -> SearchConfig {
        if let Some(mode) = self.print_mode {
            config.print_mode = mode;
        }
        if let Some(mode) = self.division_mode {
            config.division_mode = mode;
        }
        if let Some(count) = self.worker_count {
            config.worker_count = count;
        }
        if let Some(limit) = self.search_limit {
            config.search_limit = limit;
        }
        config
    }
}

/// Parse a configuration from a TOML string. Does not validate.
pub fn parse_toml(content: &str) -> Result<SearchConfig> {
    let file: ConfigFile = toml::from_str(content)?;
    Ok(file.search)
}

/// Resolve the effective configuration: read the file (unless all four
/// values were given on the command line), apply overrides, validate.
pub fn resolve(path: &Path, overrides: Overrides) -> Result<SearchConfig> {
    let config = if !path.exists() {
        overrides.complete().with_context(|| {
            format!(
                "configuration file {} not found and not all settings were given on the command line",
                path.display()
            )
        })?
    } else {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {}", path.display()))?;
        let from_file = parse_toml(&content)
            .with_context(|| format!("parsing configuration file {}", path.display()))?;
        overrides.apply(from_file)
    };
    validate(&config)?;
    Ok(config)
}

/// Check the four settings for consistency. Every message names the
/// field it rejects.
pub fn validate(config: &SearchConfig) -> Result<()> {
    if config.worker_count == 0 {
        bail!("worker_count must be greater than 0");
    }
    if config.search_limit == 0 {
        bail!("search_limit must be greater than 0");
    }
    if config.search_limit > i32::MAX as u32 {
        bail!("search_limit must not exceed {}", i32::MAX);
    }
    if config.worker_count as u64 > u64::from(config.search_limit) {
        bail!(
            "worker_count ({}) must be less than or equal to search_limit ({})",
            config.worker_count,
            config.search_limit
        );
    }
    Ok(())
}
