//! Trial runner: warmup then measured executions of one query on one engine.

use tracing::debug;

use crate::engine::{EngineAdapter, Execution};
use crate::error::MAX_RETRIES;
use crate::schema::{TrialPhase, TrialResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrialPlan {
    pub warmup: u32,
    pub measured: u32,
    /// Extra attempts for a failed measured trial; clamped to [`MAX_RETRIES`].
    pub max_retries: u32,
}

impl TrialPlan {
    pub fn new(warmup: u32, measured: u32) -> Self {
        Self {
            warmup,
            measured,
            max_retries: 0,
        }
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.min(MAX_RETRIES);
        self
    }
}

/// Trials produced for one (function, engine) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairRun {
    /// Exactly one entry per executed measured trial, in order.
    pub measured: Vec<TrialResult>,
    /// The warmup trial that aborted the pair, if any.
    pub warmup_failure: Option<TrialResult>,
}

impl PairRun {
    pub fn successes(&self) -> usize {
        self.measured.iter().filter(|t| t.success).count()
    }

    pub fn failures(&self) -> usize {
        self.measured.len() - self.successes()
    }

    /// All trials worth persisting, warmup failure first.
    pub fn into_trials(self) -> impl Iterator<Item = TrialResult> {
        self.warmup_failure.into_iter().chain(self.measured)
    }
}

/// Runs `plan.warmup` untimed executions, then `plan.measured` timed ones.
///
/// A warmup failure aborts the pair with no measured trials. A failed
/// measured trial is recorded and the remaining ones still run; only
/// cancellation stops the measured loop early.
pub fn run_pair(
    engine: &dyn EngineAdapter,
    function: &str,
    sql: &str,
    plan: &TrialPlan,
) -> PairRun {
    let id = engine.id();

    for index in 0..plan.warmup {
        let execution = engine.execute(sql);
        if execution.is_ok() {
            continue;
        }
        debug!(function, engine = %id, index, "warmup failed");
        return PairRun {
            measured: Vec::new(),
            warmup_failure: Some(TrialResult::from_execution(
                function,
                id,
                TrialPhase::Warmup,
                index,
                1,
                execution,
            )),
        };
    }

    let mut measured = Vec::with_capacity(plan.measured as usize);
    for index in 0..plan.measured {
        let (execution, attempts) = execute_with_retries(engine, sql, plan.max_retries);
        let cancelled = matches!(&execution.result, Err(e) if !e.is_retryable());
        let trial =
            TrialResult::from_execution(function, id, TrialPhase::Measured, index, attempts, execution);
        debug!(
            function,
            engine = %id,
            index,
            attempts,
            duration_s = ?trial.duration_s,
            "measured trial"
        );
        measured.push(trial);
        if cancelled {
            break;
        }
    }

    PairRun {
        measured,
        warmup_failure: None,
    }
}

fn execute_with_retries(engine: &dyn EngineAdapter, sql: &str, max_retries: u32) -> (Execution, u32) {
    let mut attempts = 1;
    loop {
        let execution = engine.execute(sql);
        let retry = match &execution.result {
            Ok(()) => false,
            Err(e) => e.is_retryable() && attempts <= max_retries.min(MAX_RETRIES),
        };
        if !retry {
            return (execution, attempts);
        }
        attempts += 1;
    }
}
