//! Cross-engine latency benchmarks for SQL functions.
//!
//! Each function in the [`catalog`] is executed through an engine's
//! command-line binary ([`engine`]), warmed up and timed by the [`harness`],
//! reduced to medians and ratios by [`stats`], and rendered and persisted by
//! [`report`]. The [`orchestrator`] drives a whole run.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod harness;
pub mod orchestrator;
pub mod report;
pub mod schema;
pub mod stats;

pub use catalog::{Catalog, CatalogFilter, Category, FunctionSpec};
pub use config::{BenchConfig, RunSettings, SelectionOverrides};
pub use engine::{CancelToken, EngineAdapter, EngineId, Execution};
pub use error::{BenchError, ConfigError, ExecutionError, PersistError};
pub use orchestrator::{Orchestrator, RunOutcome, RunState};
pub use schema::{RunRecord, TrialResult};
