//! Configuration loading from `udf-bench.toml`.
//!
//! Every key has a default, so a missing default file is the same as an empty
//! one. Command-line selections are layered on top by [`BenchConfig::settings`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::catalog::CatalogFilter;
use crate::engine::EngineId;
use crate::error::{ConfigError, MAX_RETRIES};
use crate::harness::TrialPlan;
use crate::schema::ConfigSnapshot;

pub const DEFAULT_CONFIG_FILE: &str = "udf-bench.toml";

/// Dataset file name inside `data_dir`.
pub const DATA_FILE_NAME: &str = "bench_data.parquet";

/// Longest accepted per-query timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BenchConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    /// Keyed by engine name; unknown names are rejected when settings are built.
    #[serde(default)]
    pub systems: BTreeMap<String, SystemConfig>,
    #[serde(default)]
    pub udfs: UdfSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Rows in the dataset. Informational only.
    #[serde(default)]
    pub row_count: Option<u64>,
    /// Seed the dataset was generated with. Informational only.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_warmup_runs")]
    pub warmup_runs: u32,
    #[serde(default = "default_bench_runs")]
    pub bench_runs: u32,
    /// Per execute call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default)]
    pub primary: Option<EngineId>,
    #[serde(default)]
    pub parallel_engines: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            row_count: None,
            seed: None,
            data_dir: default_data_dir(),
            results_dir: default_results_dir(),
            warmup_runs: default_warmup_runs(),
            bench_runs: default_bench_runs(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            primary: None,
            parallel_engines: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}
fn default_warmup_runs() -> u32 {
    1
}
fn default_bench_runs() -> u32 {
    3
}
fn default_timeout_secs() -> f64 {
    300.0
}
fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Path or name resolved through `PATH`; defaults per engine.
    #[serde(default)]
    pub binary: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            binary: None,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UdfSelection {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Selections given on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionOverrides {
    pub udfs: Vec<String>,
    pub categories: Vec<String>,
    /// When non-empty, exactly these engines run regardless of `enabled`.
    pub engines: Vec<EngineId>,
    pub primary: Option<EngineId>,
    pub output: Option<PathBuf>,
    pub parallel_engines: bool,
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub row_count: Option<u64>,
    pub data_path: PathBuf,
    pub results_dir: PathBuf,
    /// Explicit JSON output path; the CSV lands beside it.
    pub output: Option<PathBuf>,
    pub plan: TrialPlan,
    pub timeout: Duration,
    pub primary: Option<EngineId>,
    pub parallel_engines: bool,
    /// Requested engines with their binaries, in [`EngineId::ALL`] order.
    pub engines: Vec<(EngineId, String)>,
    pub filter: CatalogFilter,
}

impl RunSettings {
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            row_count: self.row_count,
            data_path: self.data_path.clone(),
            warmup_runs: self.plan.warmup,
            bench_runs: self.plan.measured,
            max_retries: self.plan.max_retries,
            timeout_secs: self.timeout.as_secs_f64(),
            primary: self.primary,
            parallel_engines: self.parallel_engines,
            binaries: self.engines.iter().cloned().collect(),
            filter: self.filter.clone(),
            fingerprint: String::new(),
        }
        .sealed()
    }
}

impl BenchConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads `path` if given, else [`DEFAULT_CONFIG_FILE`] when it exists,
    /// else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => {
                debug!("no {DEFAULT_CONFIG_FILE}, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validates the file and merges command-line selections into it.
    pub fn settings(&self, overrides: &SelectionOverrides) -> Result<RunSettings, ConfigError> {
        let general = &self.general;
        if general.bench_runs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bench_runs",
                reason: "must be at least 1".to_string(),
            });
        }
        if !general.timeout_secs.is_finite() || general.timeout_secs <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: format!("must be a positive number of seconds, got {}", general.timeout_secs),
            });
        }
        let timeout = Duration::try_from_secs_f64(general.timeout_secs)
            .ok()
            .filter(|t| *t <= MAX_TIMEOUT)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: format!(
                    "must be at most {} seconds, got {}",
                    MAX_TIMEOUT.as_secs(),
                    general.timeout_secs
                ),
            })?;
        if general.max_retries > MAX_RETRIES {
            return Err(ConfigError::TooManyRetries(general.max_retries));
        }

        let mut systems = BTreeMap::new();
        for (name, system) in &self.systems {
            systems.insert(name.parse::<EngineId>()?, system);
        }

        let engines: Vec<(EngineId, String)> = EngineId::ALL
            .iter()
            .filter_map(|&id| {
                let system = systems.get(&id);
                let active = if overrides.engines.is_empty() {
                    system.map_or(true, |s| s.enabled)
                } else {
                    overrides.engines.contains(&id)
                };
                let binary = system
                    .and_then(|s| s.binary.clone())
                    .unwrap_or_else(|| id.default_binary().to_string());
                active.then_some((id, binary))
            })
            .collect();
        if engines.is_empty() {
            return Err(ConfigError::NoEngines);
        }

        let udfs = &self.udfs;
        let filter = CatalogFilter::from_lists(&udfs.categories, &udfs.include, &udfs.exclude)?
            .narrow(CatalogFilter::from_lists(
                &overrides.categories,
                &overrides.udfs,
                &[],
            )?);

        Ok(RunSettings {
            row_count: general.row_count,
            data_path: general.data_dir.join(DATA_FILE_NAME),
            results_dir: general.results_dir.clone(),
            output: overrides.output.clone(),
            plan: TrialPlan::new(general.warmup_runs, general.bench_runs)
                .with_retries(general.max_retries),
            timeout,
            primary: overrides.primary.or(general.primary),
            parallel_engines: overrides.parallel_engines || general.parallel_engines,
            engines,
            filter,
        })
    }
}
