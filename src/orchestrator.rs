//! Benchmark orchestration.
//!
//! A run moves through `Idle → Loading → Executing → Aggregating → Reporting
//! → Done`. Only configuration problems found while loading end in `Failed`;
//! once execution starts every pair outcome, failures included, is data.

use rayon::prelude::*;
use std::collections::HashSet;
use std::fmt;

use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, FunctionSpec};
use crate::config::RunSettings;
use crate::engine::{cli, CancelToken, EngineAdapter, EngineId};
use crate::error::ConfigError;
use crate::harness::{run_pair, PairRun, TrialPlan};
use crate::report::{self, format_time, Persisted};
use crate::schema::{FunctionRef, RunRecord};
use crate::stats::{self, Aggregation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loading,
    Executing,
    Aggregating,
    Reporting,
    Done,
    Failed,
}

impl RunState {
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, Loading)
                | (Loading, Executing)
                | (Loading, Failed)
                | (Executing, Aggregating)
                | (Aggregating, Reporting)
                | (Reporting, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Verifies the dataset and resolves a CLI adapter per requested engine.
pub fn prepare_engines(
    settings: &RunSettings,
    cancel: &CancelToken,
) -> Result<Vec<Box<dyn EngineAdapter>>, ConfigError> {
    if !settings.data_path.is_file() {
        return Err(ConfigError::MissingDataFile(settings.data_path.clone()));
    }
    let engines = cli::resolve(
        &settings.engines,
        &settings.data_path,
        settings.timeout,
        cancel,
    );
    if engines.is_empty() {
        return Err(ConfigError::NoEngines);
    }
    Ok(engines
        .into_iter()
        .map(|e| Box::new(e) as Box<dyn EngineAdapter>)
        .collect())
}

enum PairOutcome {
    /// The engine has no query for the function.
    Skipped,
    Ran(PairRun),
}

fn execute_pair(engine: &dyn EngineAdapter, spec: &FunctionSpec, plan: &TrialPlan) -> PairOutcome {
    let Some(sql) = spec.render_query(engine.id(), &engine.table_ref()) else {
        debug!(function = %spec.name, engine = %engine.id(), "skipped: no query");
        return PairOutcome::Skipped;
    };
    let run = run_pair(engine, &spec.name, &sql, plan);
    match stats::summarize(&spec.name, engine.id(), &run.measured) {
        Ok(s) => info!(
            function = %spec.name,
            engine = %engine.id(),
            failures = s.failures,
            "{}",
            format_time(s.median_s)
        ),
        Err(u) => warn!(
            function = %spec.name,
            engine = %engine.id(),
            "unavailable: {}",
            u.detail.as_deref().unwrap_or("no trials")
        ),
    }
    PairOutcome::Ran(run)
}

pub struct RunOutcome {
    pub record: RunRecord,
    pub aggregation: Aggregation,
    /// `None` when persistence failed; the failure is logged.
    pub persisted: Option<Persisted>,
}

pub struct Orchestrator<'a> {
    catalog: &'a Catalog,
    settings: &'a RunSettings,
    engines: Vec<Box<dyn EngineAdapter>>,
    cancel: CancelToken,
    state: RunState,
}

impl<'a> Orchestrator<'a> {
    /// Engines run in the given order; a repeated engine id keeps its first adapter.
    pub fn new(
        catalog: &'a Catalog,
        settings: &'a RunSettings,
        engines: Vec<Box<dyn EngineAdapter>>,
        cancel: CancelToken,
    ) -> Self {
        let mut seen = HashSet::new();
        let engines = engines
            .into_iter()
            .filter(|e| {
                let first = seen.insert(e.id());
                if !first {
                    warn!(engine = %e.id(), "duplicate engine ignored");
                }
                first
            })
            .collect();
        Self {
            catalog,
            settings,
            engines,
            cancel,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {} -> {next}",
            self.state
        );
        debug!(from = %self.state, to = %next, "run state");
        self.state = next;
    }

    fn fail(&mut self, err: ConfigError) -> ConfigError {
        error!("{err}");
        self.transition(RunState::Failed);
        err
    }

    /// Executes the run. `present` receives the aggregation before anything is
    /// persisted, so a failed write never hides the table.
    pub fn run(
        &mut self,
        present: impl FnOnce(&Aggregation),
    ) -> Result<RunOutcome, ConfigError> {
        self.transition(RunState::Loading);
        let catalog = self.catalog;
        let functions = match catalog.lookup(&self.settings.filter) {
            Ok(f) if f.is_empty() => return Err(self.fail(ConfigError::NoFunctions)),
            Ok(f) => f,
            Err(e) => return Err(self.fail(e)),
        };
        if self.engines.is_empty() {
            return Err(self.fail(ConfigError::NoEngines));
        }
        let engine_ids: Vec<EngineId> = self.engines.iter().map(|e| e.id()).collect();
        let primary = stats::pick_primary(&engine_ids, self.settings.primary);
        if let Some(requested) = self.settings.primary.filter(|p| !engine_ids.contains(p)) {
            if let Some(p) = primary {
                warn!("primary engine {requested} is not active, comparing against {p}");
            }
        }
        info!(
            engines = ?engine_ids.iter().map(EngineId::as_str).collect::<Vec<_>>(),
            functions = functions.len(),
            warmup = self.settings.plan.warmup,
            runs = self.settings.plan.measured,
            "starting benchmark"
        );

        let mut record = RunRecord::new(
            self.settings.snapshot(),
            engine_ids,
            functions
                .iter()
                .map(|f| FunctionRef {
                    name: f.name.clone(),
                    category: f.category,
                })
                .collect(),
        );

        self.transition(RunState::Executing);
        if self.settings.parallel_engines && self.engines.len() > 1 {
            self.execute_parallel(&functions, &mut record);
        } else {
            self.execute_sequential(&functions, &mut record);
        }
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            warn!("run cancelled; reporting partial results");
        }
        record.finish(cancelled);

        self.transition(RunState::Aggregating);
        let aggregation = stats::aggregate(&record, primary);

        self.transition(RunState::Reporting);
        present(&aggregation);
        let persisted = match report::persist(
            &record,
            &self.settings.results_dir,
            self.settings.output.as_deref(),
        ) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("failed to persist results: {e}");
                None
            }
        };

        self.transition(RunState::Done);
        Ok(RunOutcome {
            record,
            aggregation,
            persisted,
        })
    }

    fn execute_sequential(&self, functions: &[&FunctionSpec], record: &mut RunRecord) {
        let plan = self.settings.plan;
        'functions: for (i, spec) in functions.iter().enumerate() {
            info!("[{}/{}] {} ({})", i + 1, functions.len(), spec.name, spec.category);
            for engine in &self.engines {
                if self.cancel.is_cancelled() {
                    break 'functions;
                }
                let outcome = execute_pair(engine.as_ref(), spec, &plan);
                append(record, spec, engine.id(), outcome);
            }
        }
    }

    /// One sequential worker per engine. Outcomes are appended afterwards in
    /// the same function-major order as a sequential run.
    fn execute_parallel(&self, functions: &[&FunctionSpec], record: &mut RunRecord) {
        let plan = self.settings.plan;
        let cancel = &self.cancel;
        let per_engine: Vec<Vec<PairOutcome>> = self
            .engines
            .par_iter()
            .map(|engine| {
                functions
                    .iter()
                    .map_while(|spec| {
                        (!cancel.is_cancelled())
                            .then(|| execute_pair(engine.as_ref(), spec, &plan))
                    })
                    .collect()
            })
            .collect();

        let mut per_engine: Vec<_> = per_engine.into_iter().map(Vec::into_iter).collect();
        for spec in functions {
            for (engine, outcomes) in self.engines.iter().zip(per_engine.iter_mut()) {
                if let Some(outcome) = outcomes.next() {
                    append(record, spec, engine.id(), outcome);
                }
            }
        }
    }
}

fn append(record: &mut RunRecord, spec: &FunctionSpec, engine: EngineId, outcome: PairOutcome) {
    match outcome {
        PairOutcome::Skipped => record.record_skip(&spec.name, engine),
        PairOutcome::Ran(run) => record.record_trials(run.into_trials()),
    }
}
