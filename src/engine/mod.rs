//! Engine adapters.
//!
//! An adapter turns one SQL string into one timed execution of an external
//! engine. Everything engine specific (argument conventions, how results are
//! discarded, what an error looks like) lives behind [`EngineAdapter`] so the
//! trial runner never needs to know which engine it is driving.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, ExecutionError};

pub mod cli;
pub mod process;

pub use cli::CliEngine;
pub use process::CancelToken;

/// Supported engines. Declaration order is the default column order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum EngineId {
    /// DataFusion CLI.
    #[value(name = "datafusion")]
    DataFusion,
    /// DuckDB CLI.
    #[value(name = "duckdb")]
    DuckDb,
    /// ClickHouse in `local` mode.
    #[value(name = "clickhouse")]
    ClickHouse,
}

impl EngineId {
    pub const ALL: [EngineId; 3] = [EngineId::DataFusion, EngineId::DuckDb, EngineId::ClickHouse];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineId::DataFusion => "datafusion",
            EngineId::DuckDb => "duckdb",
            EngineId::ClickHouse => "clickhouse",
        }
    }

    /// Two-letter label used in ratio column headers.
    pub fn short(&self) -> &'static str {
        match self {
            EngineId::DataFusion => "DF",
            EngineId::DuckDb => "DK",
            EngineId::ClickHouse => "CH",
        }
    }

    /// Binary name used when the config does not name one.
    pub fn default_binary(&self) -> &'static str {
        match self {
            EngineId::DataFusion => "datafusion-cli",
            EngineId::DuckDb => "duckdb",
            EngineId::ClickHouse => "clickhouse",
        }
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EngineId::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownEngine(s.to_string()))
    }
}

/// Outcome of one execute call.
///
/// `elapsed` covers only the external process, from spawn to exit.
#[derive(Clone, Debug, PartialEq)]
pub struct Execution {
    pub elapsed: Duration,
    pub result: Result<(), ExecutionError>,
}

impl Execution {
    pub fn ok(elapsed: Duration) -> Self {
        Self {
            elapsed,
            result: Ok(()),
        }
    }

    pub fn failed(elapsed: Duration, err: ExecutionError) -> Self {
        Self {
            elapsed,
            result: Err(err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// One engine, able to run a single query and report how long it took.
///
/// `execute` blocks until the query finishes, fails, times out or is
/// cancelled. Implementations hold no mutable state, so one adapter may be
/// shared with a worker thread.
pub trait EngineAdapter: Send + Sync {
    fn id(&self) -> EngineId;

    /// SQL fragment naming the benchmark dataset for this engine.
    fn table_ref(&self) -> String;

    fn execute(&self, sql: &str) -> Execution;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_id_parse_and_display() {
        for e in EngineId::ALL {
            assert_eq!(e.to_string().parse::<EngineId>().unwrap(), e);
        }
        assert!(matches!(
            "postgres".parse::<EngineId>(),
            Err(ConfigError::UnknownEngine(s)) if s == "postgres"
        ));
    }

    #[test]
    fn test_engine_id_serde_names_match_display() {
        for e in EngineId::ALL {
            let json = serde_json::to_string(&e).unwrap();
            assert_eq!(json, format!("\"{e}\""));
        }
    }

    #[test]
    fn test_engine_id_value_enum_names() {
        let parsed = <EngineId as ValueEnum>::from_str("duckdb", false).unwrap();
        assert_eq!(parsed, EngineId::DuckDb);
    }
}
