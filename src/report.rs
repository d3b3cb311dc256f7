//! Rendering and persistence of benchmark results.
//!
//! Rendering is a pure function of an [`Aggregation`]. Persistence writes a
//! pretty JSON [`RunRecord`] plus a flat per-trial CSV next to it, and never
//! replaces an existing file.

use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::catalog::FunctionSpec;
use crate::engine::EngineId;
use crate::error::PersistError;
use crate::schema::{RunRecord, TrialResult};
use crate::stats::{Aggregation, EngineCell};

/// Shown wherever a ratio is undefined.
pub const UNDEFINED: &str = "—";

/// Suffixes tried after the preferred file name is taken.
const MAX_COLLISIONS: u32 = 1000;

/// `5.0ms` below 10ms, `0.123s` otherwise.
pub fn format_time(seconds: f64) -> String {
    if seconds < 0.01 {
        format!("{:.1}ms", seconds * 1000.0)
    } else {
        format!("{seconds:.3}s")
    }
}

pub fn format_ratio(ratio: f64) -> String {
    format!("{ratio:.2}x")
}

fn cell_text(cell: Option<&EngineCell>) -> String {
    match cell {
        Some(EngineCell::Measured(s)) => format_time(s.median_s),
        Some(EngineCell::Unavailable(u)) if u.was_run() => "unavailable".to_string(),
        Some(EngineCell::Unavailable(_)) | None => "not run".to_string(),
        Some(EngineCell::Skipped) => "skipped".to_string(),
    }
}

/// Left-aligned columns joined by ` | ` with a `-+-` rule under the header.
fn write_table(out: &mut String, header: &[String], rows: &[Vec<String>]) {
    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let _ = writeln!(out, "{}", line(header));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in rows {
        let _ = writeln!(out, "{}", line(row.as_slice()));
    }
}

/// Comparison table, per-engine totals and the list of unavailable pairs.
pub fn render(agg: &Aggregation) -> String {
    let others: Vec<EngineId> = match agg.primary {
        Some(p) => agg.engines.iter().copied().filter(|e| *e != p).collect(),
        None => Vec::new(),
    };

    let mut header = vec!["UDF".to_string(), "Category".to_string()];
    header.extend(agg.engines.iter().map(|e| e.to_string()));
    if let Some(p) = agg.primary {
        header.extend(others.iter().map(|e| format!("{}/{e}", p.short())));
    }

    let rows: Vec<Vec<String>> = agg
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.function.clone(), row.category.to_string()];
            cells.extend(agg.engines.iter().map(|&e| cell_text(row.cell(e))));
            cells.extend(others.iter().map(|&e| match row.ratio(e) {
                Some(r) => format_ratio(r),
                None => UNDEFINED.to_string(),
            }));
            cells
        })
        .collect();

    let mut out = String::new();
    write_table(&mut out, &header, &rows);

    let _ = writeln!(out, "\nTotal (sum of medians over available functions):");
    for t in &agg.totals.per_engine {
        let _ = writeln!(
            out,
            "  {:<12} {:>10}  ({} functions)",
            t.engine.as_str(),
            format_time(t.total_s),
            t.functions
        );
    }
    if agg.engines.len() > 1 {
        let common = &agg.totals.common;
        let _ = writeln!(
            out,
            "\nTotal over the {} functions available on every engine:",
            common.functions
        );
        for (engine, total) in &common.per_engine {
            let _ = writeln!(out, "  {:<12} {:>10}", engine.as_str(), format_time(*total));
        }
    }

    let unavailable: Vec<_> = agg.unavailable().collect();
    if !unavailable.is_empty() {
        let _ = writeln!(out, "\nUnavailable:");
        for u in unavailable {
            let _ = write!(out, "  {} on {}: ", u.function, u.engine);
            match &u.detail {
                _ if !u.was_run() => {
                    let _ = writeln!(out, "not run");
                }
                Some(detail) if u.warmup_failed && u.failures == 0 => {
                    let _ = writeln!(out, "warmup failed ({detail})");
                }
                Some(detail) => {
                    let _ = writeln!(out, "{} failed ({detail})", u.failures);
                }
                None => {
                    let _ = writeln!(out, "{} failed", u.failures);
                }
            }
        }
    }
    out
}

/// The selected functions with their per-engine support.
pub fn render_catalog(specs: &[&FunctionSpec], engines: &[EngineId]) -> String {
    let mut header = vec!["UDF".to_string(), "Category".to_string()];
    header.extend(engines.iter().map(|e| e.to_string()));
    header.push("Description".to_string());

    let rows: Vec<Vec<String>> = specs
        .iter()
        .map(|spec| {
            let mut cells = vec![spec.name.clone(), spec.category.to_string()];
            cells.extend(
                engines
                    .iter()
                    .map(|&e| if spec.supports(e) { "yes" } else { "-" }.to_string()),
            );
            cells.push(spec.description.clone());
            cells
        })
        .collect();

    let mut out = String::new();
    write_table(&mut out, &header, &rows);
    let _ = writeln!(out, "\n{} functions", specs.len());
    out
}

/// Where a run was persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persisted {
    pub json: PathBuf,
    pub csv: PathBuf,
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> PersistError + '_ {
    move |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// `dir/stem_N.ext` for N >= 1.
fn with_suffix(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{n}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{n}"),
    };
    path.with_file_name(name)
}

/// Creates `path`, or the first free `stem_N` variant of it.
fn create_unique(path: &Path) -> Result<(File, PathBuf), PersistError> {
    for n in 0..MAX_COLLISIONS {
        let candidate = if n == 0 {
            path.to_path_buf()
        } else {
            with_suffix(path, n)
        };
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, candidate)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(io_err(&candidate)(e)),
        }
    }
    Err(io_err(path)(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "no free file name",
    )))
}

/// Default JSON path: `udf_bench_<started_at>.json` under `results_dir`.
pub fn default_output(record: &RunRecord, results_dir: &Path) -> PathBuf {
    results_dir.join(format!(
        "udf_bench_{}.json",
        record.meta.started_at.format("%Y%m%d_%H%M%S")
    ))
}

/// Writes the record as JSON and its trials as CSV. Existing files are never
/// touched; a numeric suffix is added instead.
pub fn persist(
    record: &RunRecord,
    results_dir: &Path,
    output: Option<&Path>,
) -> Result<Persisted, PersistError> {
    let preferred = match output {
        Some(p) => p.to_path_buf(),
        None => default_output(record, results_dir),
    };
    if let Some(parent) = preferred.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let (file, json) = create_unique(&preferred)?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, record)?;
    w.write_all(b"\n")
        .and_then(|()| w.flush())
        .map_err(io_err(&json))?;

    let stem = json
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (file, csv) = create_unique(&json.with_file_name(format!("{stem}_trials.csv")))?;
    let mut w = BufWriter::new(file);
    write_trials_csv(&mut w, record)
        .and_then(|()| w.flush())
        .map_err(io_err(&csv))?;

    info!(json = %json.display(), csv = %csv.display(), trials = record.trials.len(), "results saved");
    Ok(Persisted { json, csv })
}

pub fn load(path: impl AsRef<Path>) -> Result<RunRecord, PersistError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(io_err(path))?;
    Ok(serde_json::from_str(&content)?)
}

pub const CSV_HEADER: &str =
    "function,category,engine,phase,index,attempts,success,duration_s,error_kind,error,timestamp";

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_row(record: &RunRecord, t: &TrialResult) -> String {
    let category = record
        .category_of(&t.function)
        .map(|c| c.as_str())
        .unwrap_or_default();
    let fields = [
        csv_field(&t.function),
        category.to_string(),
        t.engine.as_str().to_string(),
        t.phase.as_str().to_string(),
        t.index.to_string(),
        t.attempts.to_string(),
        t.success.to_string(),
        t.duration_s.map(|d| d.to_string()).unwrap_or_default(),
        t.error.as_ref().map(|e| e.kind()).unwrap_or_default().to_string(),
        csv_field(&t.error.as_ref().map(|e| e.to_string()).unwrap_or_default()),
        t.timestamp.to_rfc3339(),
    ];
    fields.join(",")
}

/// One line per trial, in record order.
pub fn write_trials_csv(w: &mut impl Write, record: &RunRecord) -> io::Result<()> {
    writeln!(w, "{CSV_HEADER}")?;
    for t in &record.trials {
        writeln!(w, "{}", csv_row(record, t))?;
    }
    Ok(())
}
