//! Error kinds.
//!
//! Only [`ConfigError`] is fatal to a run. Execution failures are captured as
//! data on the trial they belong to, and persistence failures are downgraded
//! to warnings once the comparison table exists.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::Category;
use crate::engine::EngineId;

/// Upper bound on automatic re-attempts of a failed measured trial.
pub const MAX_RETRIES: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    #[error("duplicate catalog entry: {0}")]
    DuplicateFunction(String),

    #[error("function {function} ({category}) has no query for any engine")]
    EmptyFunction { function: String, category: Category },

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("max_retries = {0} exceeds the limit of {max}", max = MAX_RETRIES)]
    TooManyRetries(u32),

    #[error("data file not found: {0}")]
    MissingDataFile(PathBuf),

    #[error("{engine} binary '{binary}' unusable: {reason}")]
    BinaryUnavailable {
        engine: EngineId,
        binary: String,
        reason: String,
    },

    #[error("no engines available")]
    NoEngines,

    #[error("no functions selected")]
    NoFunctions,
}

/// Why a single execute call did not produce a usable measurement.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ExecutionError {
    #[error("exit status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("malformed output: {0}")]
    MalformedOutput(String),

    #[error("timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("failed to spawn: {0}")]
    Spawn(String),

    #[error("cancelled")]
    Cancelled,
}

impl ExecutionError {
    pub fn timeout(after: Duration) -> Self {
        ExecutionError::Timeout {
            millis: after.as_millis() as u64,
        }
    }

    /// Same as the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionError::NonZeroExit { .. } => "non_zero_exit",
            ExecutionError::MalformedOutput(_) => "malformed_output",
            ExecutionError::Timeout { .. } => "timeout",
            ExecutionError::Spawn(_) => "spawn",
            ExecutionError::Cancelled => "cancelled",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecutionError::Timeout { .. })
    }

    /// Retrying a cancelled call would defeat the cancellation.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ExecutionError::Cancelled)
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level error surfaced by the binary.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_serializes_with_kind_tag() {
        let err = ExecutionError::timeout(Duration::from_millis(1500));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "timeout");
        assert_eq!(err.kind(), "timeout");
        assert_eq!(json["detail"]["millis"], 1500);

        let back: ExecutionError = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
        assert!(back.is_timeout());
    }

    #[test]
    fn test_every_variant_round_trips() {
        let all = [
            ExecutionError::NonZeroExit {
                code: None,
                stderr: "killed by signal 9".to_string(),
            },
            ExecutionError::MalformedOutput("Error: bad".to_string()),
            ExecutionError::timeout(Duration::from_secs(300)),
            ExecutionError::Spawn("No such file or directory".to_string()),
            ExecutionError::Cancelled,
        ];
        for err in all {
            let json = serde_json::to_string(&err).unwrap();
            let back: ExecutionError = serde_json::from_str(&json).unwrap();
            assert_eq!(back, err);
            assert!(json.contains(err.kind()));
        }
    }

    #[test]
    fn test_cancelled_is_not_retryable() {
        assert!(!ExecutionError::Cancelled.is_retryable());
        assert!(ExecutionError::MalformedOutput("x".into()).is_retryable());
        assert!(ExecutionError::timeout(Duration::from_secs(1)).is_retryable());
    }
}
