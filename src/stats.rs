//! Statistics aggregation.
//!
//! Per-pair estimates use the median of successful measured trials; process
//! level timings are long-tailed and a mean would follow the tail. Ratios are
//! primary median over other median, so a ratio above 1.0 means the primary
//! engine is slower.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::catalog::Category;
use crate::engine::EngineId;
use crate::schema::{RunRecord, TrialResult};

/// Median of `samples`, always one of the samples.
///
/// Even-sized inputs take the upper of the two middle values so the estimate
/// is an observed duration rather than an interpolation.
pub fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted[sorted.len() / 2])
}

/// Estimate for one (function, engine) pair with at least one success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionEngineSummary {
    pub function: String,
    pub engine: EngineId,
    pub median_s: f64,
    pub min_s: f64,
    pub max_s: f64,
    pub successes: u32,
    pub failures: u32,
}

/// A pair that was attempted but produced no successful measured trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unavailable {
    pub function: String,
    pub engine: EngineId,
    pub failures: u32,
    /// Most recent failure, including a warmup failure.
    pub detail: Option<String>,
    /// A warmup trial failed, so no measured trial was attempted.
    #[serde(default)]
    pub warmup_failed: bool,
}

impl Unavailable {
    /// False for a pair that produced no trials at all, e.g. after cancellation.
    pub fn was_run(&self) -> bool {
        self.failures > 0 || self.warmup_failed || self.detail.is_some()
    }
}

/// Folds the trials of one pair. Trials belonging to other pairs are ignored,
/// and only measured trials count toward the estimate.
pub fn summarize<'a, I>(
    function: &str,
    engine: EngineId,
    trials: I,
) -> Result<FunctionEngineSummary, Unavailable>
where
    I: IntoIterator<Item = &'a TrialResult>,
{
    let mut durations = Vec::new();
    let mut failures = 0u32;
    let mut detail = None;
    let mut warmup_failed = false;

    for t in trials
        .into_iter()
        .filter(|t| t.engine == engine && t.function == function)
    {
        if let Some(err) = &t.error {
            detail = Some(format!("{} {}: {err}", t.phase.as_str(), t.index));
        }
        if !t.is_measured() {
            warmup_failed |= t.error.is_some();
            continue;
        }
        match t.duration() {
            Some(d) => durations.push(d),
            None => failures += 1,
        }
    }

    let Some(median_s) = median(&durations) else {
        return Err(Unavailable {
            function: function.to_string(),
            engine,
            failures,
            detail,
            warmup_failed,
        });
    };
    Ok(FunctionEngineSummary {
        function: function.to_string(),
        engine,
        median_s,
        min_s: durations.iter().copied().fold(f64::INFINITY, f64::min),
        max_s: durations.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        successes: durations.len() as u32,
        failures,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EngineCell {
    Measured(FunctionEngineSummary),
    Unavailable(Unavailable),
    /// The engine has no query for this function.
    Skipped,
}

impl EngineCell {
    pub fn median(&self) -> Option<f64> {
        match self {
            EngineCell::Measured(s) => Some(s.median_s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub function: String,
    pub category: Category,
    pub primary: Option<EngineId>,
    pub cells: Vec<(EngineId, EngineCell)>,
    /// One entry per non-primary engine; `None` when either side lacks a median,
    /// or when the other median is zero and the quotient would not be finite.
    pub ratios: Vec<(EngineId, Option<f64>)>,
}

impl ComparisonRow {
    pub fn cell(&self, engine: EngineId) -> Option<&EngineCell> {
        self.cells.iter().find(|(e, _)| *e == engine).map(|(_, c)| c)
    }

    pub fn ratio(&self, engine: EngineId) -> Option<f64> {
        self.ratios
            .iter()
            .find(|(e, _)| *e == engine)
            .and_then(|(_, r)| *r)
    }
}

/// `requested` if it is among `engines`, otherwise the first engine.
pub fn pick_primary(engines: &[EngineId], requested: Option<EngineId>) -> Option<EngineId> {
    requested
        .filter(|p| engines.contains(p))
        .or_else(|| engines.first().copied())
}

/// Builds the comparison row for one function from its per-engine cells.
pub fn compare(
    function: &str,
    category: Category,
    cells: Vec<(EngineId, EngineCell)>,
    primary: Option<EngineId>,
) -> ComparisonRow {
    let engines: Vec<EngineId> = cells.iter().map(|(e, _)| *e).collect();
    let primary = pick_primary(&engines, primary);
    let primary_median = primary
        .and_then(|p| cells.iter().find(|(e, _)| *e == p))
        .and_then(|(_, c)| c.median());

    let ratios = cells
        .iter()
        .filter(|(e, _)| Some(*e) != primary)
        .map(|(e, cell)| {
            let ratio = match (primary_median, cell.median()) {
                (Some(p), Some(o)) if o > 0.0 => Some(p / o),
                (Some(_), Some(o)) => {
                    warn!(function, engine = %e, median_s = o, "non-positive median, ratio undefined");
                    None
                }
                _ => None,
            };
            (*e, ratio)
        })
        .collect();

    ComparisonRow {
        function: function.to_string(),
        category,
        primary,
        cells,
        ratios,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineTotal {
    pub engine: EngineId,
    pub total_s: f64,
    /// Functions with an available median on this engine.
    pub functions: u32,
}

/// Totals restricted to functions available on every engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonTotal {
    pub functions: u32,
    pub per_engine: Vec<(EngineId, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub per_engine: Vec<EngineTotal>,
    pub common: CommonTotal,
}

/// Sums medians per engine. Unavailable and skipped functions are left out
/// of an engine's total rather than counted as zero.
pub fn totals(rows: &[ComparisonRow], engines: &[EngineId]) -> Totals {
    let per_engine = engines
        .iter()
        .map(|&engine| {
            let medians: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.cell(engine).and_then(EngineCell::median))
                .collect();
            EngineTotal {
                engine,
                total_s: medians.iter().sum(),
                functions: medians.len() as u32,
            }
        })
        .collect();

    let common_rows: Vec<&ComparisonRow> = rows
        .iter()
        .filter(|r| {
            engines
                .iter()
                .all(|&e| r.cell(e).and_then(EngineCell::median).is_some())
        })
        .collect();
    let common = CommonTotal {
        functions: common_rows.len() as u32,
        per_engine: engines
            .iter()
            .map(|&e| {
                let sum = common_rows
                    .iter()
                    .filter_map(|r| r.cell(e).and_then(EngineCell::median))
                    .sum();
                (e, sum)
            })
            .collect(),
    };

    Totals { per_engine, common }
}

/// Full aggregation state consumed by the reporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub primary: Option<EngineId>,
    pub engines: Vec<EngineId>,
    pub rows: Vec<ComparisonRow>,
    pub totals: Totals,
}

impl Aggregation {
    pub fn unavailable(&self) -> impl Iterator<Item = &Unavailable> {
        self.rows.iter().flat_map(|r| {
            r.cells.iter().filter_map(|(_, c)| match c {
                EngineCell::Unavailable(u) => Some(u),
                _ => None,
            })
        })
    }
}

/// Aggregates a whole run, one row per function in record order.
pub fn aggregate(record: &RunRecord, primary: Option<EngineId>) -> Aggregation {
    let mut by_pair: HashMap<(&str, EngineId), Vec<&TrialResult>> = HashMap::new();
    for t in &record.trials {
        by_pair
            .entry((t.function.as_str(), t.engine))
            .or_default()
            .push(t);
    }

    let primary = pick_primary(&record.engines, primary);
    let rows: Vec<ComparisonRow> = record
        .functions
        .iter()
        .map(|f| {
            let cells = record
                .engines
                .iter()
                .map(|&engine| {
                    let cell = if record.is_skipped(&f.name, engine) {
                        EngineCell::Skipped
                    } else {
                        let trials = by_pair
                            .get(&(f.name.as_str(), engine))
                            .map(Vec::as_slice)
                            .unwrap_or_default();
                        match summarize(&f.name, engine, trials.iter().copied()) {
                            Ok(summary) => EngineCell::Measured(summary),
                            Err(unavailable) => EngineCell::Unavailable(unavailable),
                        }
                    };
                    (engine, cell)
                })
                .collect();
            compare(&f.name, f.category, cells, primary)
        })
        .collect();

    let totals = totals(&rows, &record.engines);
    Aggregation {
        primary,
        engines: record.engines.clone(),
        rows,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Execution;
    use crate::error::ExecutionError;
    use crate::schema::TrialPhase;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::Duration;

    fn trial(function: &str, engine: EngineId, index: u32, ms: Option<u64>) -> TrialResult {
        let execution = match ms {
            Some(ms) => Execution::ok(Duration::from_millis(ms)),
            None => Execution::failed(
                Duration::ZERO,
                ExecutionError::MalformedOutput("bad".to_string()),
            ),
        };
        TrialResult::from_execution(function, engine, TrialPhase::Measured, index, 1, execution)
    }

    fn measured(ms: f64, engine: EngineId) -> EngineCell {
        EngineCell::Measured(FunctionEngineSummary {
            function: "f".to_string(),
            engine,
            median_s: ms / 1000.0,
            min_s: ms / 1000.0,
            max_s: ms / 1000.0,
            successes: 3,
            failures: 0,
        })
    }

    fn unavailable(engine: EngineId) -> EngineCell {
        EngineCell::Unavailable(Unavailable {
            function: "f".to_string(),
            engine,
            failures: 3,
            detail: None,
            warmup_failed: false,
        })
    }

    #[test]
    fn test_median_is_observed_value() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(3.0));
        assert_eq!(median(&[7.5]), Some(7.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_median_is_not_mean() {
        // One long-tail outlier must not drag the estimate.
        assert_eq!(median(&[0.010, 0.011, 5.0]), Some(0.011));
    }

    #[test]
    fn test_summary_invariant_under_reordering() {
        let mut trials: Vec<TrialResult> = [12, 9, 31, 10, 11, 250, 10]
            .iter()
            .enumerate()
            .map(|(i, &ms)| trial("upper", EngineId::DuckDb, i as u32, Some(ms)))
            .collect();
        let expected = summarize("upper", EngineId::DuckDb, &trials).unwrap();
        let observed: Vec<f64> = trials.iter().filter_map(|t| t.duration()).collect();
        assert!(observed.contains(&expected.median_s));

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            trials.shuffle(&mut rng);
            let s = summarize("upper", EngineId::DuckDb, &trials).unwrap();
            assert_eq!(s, expected);
        }
    }

    #[test]
    fn test_one_failed_of_three() {
        let trials = vec![
            trial("sin", EngineId::DuckDb, 0, Some(30)),
            trial("sin", EngineId::DuckDb, 1, None),
            trial("sin", EngineId::DuckDb, 2, Some(10)),
        ];
        let s = summarize("sin", EngineId::DuckDb, &trials).unwrap();
        assert_eq!(s.successes, 2);
        assert_eq!(s.failures, 1);
        // Upper median of {0.010, 0.030}.
        assert_eq!(s.median_s, 0.03);
        assert_eq!(s.min_s, 0.01);
        assert_eq!(s.max_s, 0.03);
    }

    #[test]
    fn test_all_failed_is_unavailable() {
        let trials: Vec<TrialResult> = (0..3)
            .map(|i| trial("sin", EngineId::ClickHouse, i, None))
            .collect();
        let u = summarize("sin", EngineId::ClickHouse, &trials).unwrap_err();
        assert_eq!(u.failures, 3);
        assert_eq!(u.detail.as_deref(), Some("measured 2: malformed output: bad"));
    }

    #[test]
    fn test_warmup_failure_alone_is_unavailable_but_run() {
        let mut warm = trial("sin", EngineId::DuckDb, 0, None);
        warm.phase = TrialPhase::Warmup;
        let u = summarize("sin", EngineId::DuckDb, [&warm]).unwrap_err();
        assert_eq!(u.failures, 0);
        assert!(u.warmup_failed);
        assert!(u.was_run());
        assert_eq!(u.detail.as_deref(), Some("warmup 0: malformed output: bad"));
    }

    #[test]
    fn test_summarize_ignores_other_pairs_and_warmups() {
        let mut warm = trial("sin", EngineId::DuckDb, 0, Some(1));
        warm.phase = TrialPhase::Warmup;
        let trials = vec![
            warm,
            trial("sin", EngineId::DuckDb, 0, Some(20)),
            trial("cos", EngineId::DuckDb, 0, Some(99)),
            trial("sin", EngineId::ClickHouse, 0, Some(99)),
        ];
        let s = summarize("sin", EngineId::DuckDb, &trials).unwrap();
        assert_eq!(s.successes, 1);
        assert_eq!(s.median_s, 0.02);
    }

    #[test]
    fn test_ratio_primary_over_other() {
        let row = compare(
            "upper",
            Category::String,
            vec![
                (EngineId::DataFusion, measured(10.0, EngineId::DataFusion)),
                (EngineId::DuckDb, measured(20.0, EngineId::DuckDb)),
            ],
            Some(EngineId::DataFusion),
        );
        assert_eq!(row.primary, Some(EngineId::DataFusion));
        assert_eq!(row.ratios, vec![(EngineId::DuckDb, Some(0.5))]);
    }

    #[test]
    fn test_primary_defaults_to_first_engine() {
        let row = compare(
            "upper",
            Category::String,
            vec![
                (EngineId::DuckDb, measured(30.0, EngineId::DuckDb)),
                (EngineId::ClickHouse, measured(10.0, EngineId::ClickHouse)),
            ],
            None,
        );
        assert_eq!(row.primary, Some(EngineId::DuckDb));
        let r = row.ratio(EngineId::ClickHouse).unwrap();
        assert!((r - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_other_median_has_undefined_ratio() {
        let row = compare(
            "f",
            Category::Math,
            vec![
                (EngineId::DataFusion, measured(10.0, EngineId::DataFusion)),
                (EngineId::DuckDb, measured(0.0, EngineId::DuckDb)),
            ],
            Some(EngineId::DataFusion),
        );
        assert_eq!(row.ratios, vec![(EngineId::DuckDb, None)]);
        assert_eq!(row.cell(EngineId::DuckDb).and_then(EngineCell::median), Some(0.0));
    }

    #[test]
    fn test_skipped_other_has_undefined_ratio() {
        let row = compare(
            "corr",
            Category::AggUngrouped,
            vec![
                (EngineId::DataFusion, measured(10.0, EngineId::DataFusion)),
                (EngineId::DuckDb, EngineCell::Skipped),
            ],
            Some(EngineId::DataFusion),
        );
        assert_eq!(row.cell(EngineId::DuckDb), Some(&EngineCell::Skipped));
        assert_eq!(row.ratios, vec![(EngineId::DuckDb, None)]);
    }

    #[test]
    fn test_unavailable_primary_undefines_all_ratios() {
        let row = compare(
            "sin",
            Category::Trig,
            vec![
                (EngineId::DataFusion, unavailable(EngineId::DataFusion)),
                (EngineId::DuckDb, measured(10.0, EngineId::DuckDb)),
                (EngineId::ClickHouse, measured(5.0, EngineId::ClickHouse)),
            ],
            Some(EngineId::DataFusion),
        );
        assert!(row.ratios.iter().all(|(_, r)| r.is_none()));
        assert_eq!(row.ratios.len(), 2);
    }

    #[test]
    fn test_totals_exclude_unavailable() {
        let rows = vec![
            compare(
                "upper",
                Category::String,
                vec![
                    (EngineId::DataFusion, measured(10.0, EngineId::DataFusion)),
                    (EngineId::ClickHouse, measured(20.0, EngineId::ClickHouse)),
                ],
                None,
            ),
            compare(
                "sin",
                Category::Trig,
                vec![
                    (EngineId::DataFusion, measured(30.0, EngineId::DataFusion)),
                    (EngineId::ClickHouse, unavailable(EngineId::ClickHouse)),
                ],
                None,
            ),
        ];
        let t = totals(&rows, &[EngineId::DataFusion, EngineId::ClickHouse]);

        assert_eq!(t.per_engine[0].functions, 2);
        assert!((t.per_engine[0].total_s - 0.040).abs() < 1e-12);
        assert_eq!(t.per_engine[1].functions, 1);
        assert!((t.per_engine[1].total_s - 0.020).abs() < 1e-12);

        assert_eq!(t.common.functions, 1);
        assert!((t.common.per_engine[0].1 - 0.010).abs() < 1e-12);
        assert!((t.common.per_engine[1].1 - 0.020).abs() < 1e-12);
    }

    #[test]
    fn test_pick_primary_falls_back_when_absent() {
        let engines = [EngineId::DuckDb, EngineId::ClickHouse];
        assert_eq!(pick_primary(&engines, Some(EngineId::ClickHouse)), Some(EngineId::ClickHouse));
        assert_eq!(pick_primary(&engines, Some(EngineId::DataFusion)), Some(EngineId::DuckDb));
        assert_eq!(pick_primary(&[], Some(EngineId::DataFusion)), None);
    }
}
