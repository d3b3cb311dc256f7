use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::catalog::{Category, CatalogFilter};
use crate::engine::{EngineId, Execution};
use crate::error::ExecutionError;

/// Bumped whenever the persisted layout changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialPhase {
    Warmup,
    Measured,
}

impl TrialPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialPhase::Warmup => "warmup",
            TrialPhase::Measured => "measured",
        }
    }
}

/// One execution attempt of one query on one engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub function: String,
    pub engine: EngineId,
    pub phase: TrialPhase,
    /// Zero-based position within its phase.
    pub index: u32,
    /// Executions spent on this trial, including retries.
    pub attempts: u32,
    /// Wall-clock seconds; present only on success.
    pub duration_s: Option<f64>,
    pub success: bool,
    pub error: Option<ExecutionError>,
    pub timestamp: DateTime<Utc>,
}

impl TrialResult {
    pub fn from_execution(
        function: &str,
        engine: EngineId,
        phase: TrialPhase,
        index: u32,
        attempts: u32,
        execution: Execution,
    ) -> Self {
        let (duration_s, error) = match execution.result {
            Ok(()) => (Some(execution.elapsed.as_secs_f64()), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            function: function.to_string(),
            engine,
            phase,
            index,
            attempts,
            duration_s,
            success: error.is_none(),
            error,
            timestamp: Utc::now(),
        }
    }

    pub fn is_measured(&self) -> bool {
        self.phase == TrialPhase::Measured
    }

    /// Duration of a successful trial.
    pub fn duration(&self) -> Option<f64> {
        if self.success {
            self.duration_s
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRef {
    pub name: String,
    pub category: Category,
}

/// A pair never executed because the engine has no query for the function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkippedPair {
    pub function: String,
    pub engine: EngineId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub git_sha: Option<String>,
    /// Set when the run was interrupted before every pair executed.
    pub cancelled: bool,
}

impl RunMeta {
    pub fn start() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            bench_version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
            finished_at: None,
            git_sha: git_sha_short(),
            cancelled: false,
        }
    }
}

fn git_sha_short() -> Option<String> {
    // Best-effort: read from environment set by CI/build scripts.
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

/// Settings a run was executed with, fingerprinted so runs with identical
/// settings can be grouped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub row_count: Option<u64>,
    pub data_path: PathBuf,
    pub warmup_runs: u32,
    pub bench_runs: u32,
    pub max_retries: u32,
    pub timeout_secs: f64,
    pub primary: Option<EngineId>,
    pub parallel_engines: bool,
    pub binaries: BTreeMap<EngineId, String>,
    pub filter: CatalogFilter,
    #[serde(default)]
    pub fingerprint: String,
}

impl ConfigSnapshot {
    /// Fills in `fingerprint`: hex SHA-256 over the snapshot's JSON form.
    pub fn sealed(mut self) -> Self {
        self.fingerprint = String::new();
        let bytes = serde_json::to_vec(&self).unwrap_or_default();
        self.fingerprint = Sha256::digest(&bytes)
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        self
    }
}

/// Everything one benchmark invocation produced. Grows by appending only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub meta: RunMeta,
    pub config: ConfigSnapshot,
    pub engines: Vec<EngineId>,
    pub functions: Vec<FunctionRef>,
    pub skipped: Vec<SkippedPair>,
    pub trials: Vec<TrialResult>,
}

impl RunRecord {
    pub fn new(config: ConfigSnapshot, engines: Vec<EngineId>, functions: Vec<FunctionRef>) -> Self {
        Self {
            meta: RunMeta::start(),
            config,
            engines,
            functions,
            skipped: Vec::new(),
            trials: Vec::new(),
        }
    }

    pub fn record_skip(&mut self, function: &str, engine: EngineId) {
        self.skipped.push(SkippedPair {
            function: function.to_string(),
            engine,
        });
    }

    pub fn record_trials(&mut self, trials: impl IntoIterator<Item = TrialResult>) {
        self.trials.extend(trials);
    }

    pub fn finish(&mut self, cancelled: bool) {
        self.meta.finished_at = Some(Utc::now());
        self.meta.cancelled = cancelled;
    }

    pub fn is_skipped(&self, function: &str, engine: EngineId) -> bool {
        self.skipped
            .iter()
            .any(|s| s.engine == engine && s.function == function)
    }

    pub fn category_of(&self, function: &str) -> Option<Category> {
        self.functions
            .iter()
            .find(|f| f.name == function)
            .map(|f| f.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn snapshot() -> ConfigSnapshot {
        ConfigSnapshot {
            row_count: Some(1_000),
            data_path: PathBuf::from("data/bench_data.parquet"),
            warmup_runs: 1,
            bench_runs: 3,
            max_retries: 0,
            timeout_secs: 300.0,
            primary: Some(EngineId::DataFusion),
            parallel_engines: false,
            binaries: BTreeMap::from([(EngineId::DataFusion, "datafusion-cli".to_string())]),
            filter: CatalogFilter::default(),
            fingerprint: String::new(),
        }
    }

    #[test]
    fn test_fingerprint_is_stable_and_sensitive() {
        let a = snapshot().sealed();
        let b = snapshot().sealed();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.fingerprint.len(), 64);

        let mut changed = snapshot();
        changed.bench_runs = 5;
        assert_ne!(changed.sealed().fingerprint, a.fingerprint);
        // Resealing ignores the previous fingerprint.
        assert_eq!(a.clone().sealed().fingerprint, a.fingerprint);
    }

    #[test]
    fn test_failed_trial_has_no_duration() {
        let t = TrialResult::from_execution(
            "sin",
            EngineId::ClickHouse,
            TrialPhase::Measured,
            0,
            1,
            Execution::failed(Duration::from_millis(5), ExecutionError::Cancelled),
        );
        assert!(!t.success);
        assert_eq!(t.duration(), None);
        assert_eq!(t.duration_s, None);
        assert_eq!(t.error, Some(ExecutionError::Cancelled));
    }

    #[test]
    fn test_successful_trial_keeps_duration() {
        let t = TrialResult::from_execution(
            "sin",
            EngineId::DuckDb,
            TrialPhase::Measured,
            2,
            1,
            Execution::ok(Duration::from_millis(250)),
        );
        assert!(t.success);
        assert_eq!(t.duration(), Some(0.25));
    }
}
