//! Command-line engine adapters.
//!
//! Each engine is pinned to a single thread so measurements compare function
//! implementations rather than parallel scheduling.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tracing::{info, warn};

use super::process::{self, Captured};
use super::{CancelToken, EngineAdapter, EngineId, Execution};
use crate::error::{ConfigError, ExecutionError};

/// Version probes are cheap; anything slower means the binary is unusable.
const VERSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Stderr kept on a failed trial.
const ERROR_DETAIL_CHARS: usize = 200;

/// An engine reachable through its command-line binary.
#[derive(Clone, Debug)]
pub struct CliEngine {
    id: EngineId,
    binary: String,
    data_path: PathBuf,
    timeout: Duration,
    cancel: CancelToken,
}

impl CliEngine {
    pub fn new(
        id: EngineId,
        binary: impl Into<String>,
        data_path: impl Into<PathBuf>,
        timeout: Duration,
        cancel: CancelToken,
    ) -> Self {
        Self {
            id,
            binary: binary.into(),
            data_path: data_path.into(),
            timeout,
            cancel,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Runs the engine's version command; returns its first output line.
    pub fn verify(&self) -> Result<String, ConfigError> {
        let unusable = |reason: String| ConfigError::BinaryUnavailable {
            engine: self.id,
            binary: self.binary.clone(),
            reason,
        };

        let out = process::run(self.version_command(), VERSION_TIMEOUT, &self.cancel)
            .map_err(|e| unusable(e.to_string()))?;
        if !out.status.success() {
            return Err(unusable(truncate(out.stderr.trim(), ERROR_DETAIL_CHARS)));
        }
        Ok(out.stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    fn version_command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        match self.id {
            EngineId::DataFusion | EngineId::DuckDb => {
                cmd.arg("--version");
            }
            EngineId::ClickHouse => {
                cmd.args(["local", "--version"]);
            }
        }
        cmd
    }

    fn query_command(&self, sql: &str) -> Command {
        let mut cmd = Command::new(&self.binary);
        match self.id {
            EngineId::DataFusion => {
                let sql = format!("SET datafusion.execution.target_partitions = 1; {sql}");
                cmd.args(["--quiet", "-c"]).arg(sql);
            }
            EngineId::DuckDb => {
                let sql = format!("SET threads = 1; {sql}");
                cmd.args(["-noheader", "-csv", "-c"]).arg(sql);
            }
            EngineId::ClickHouse => {
                cmd.args(["local", "--max_threads=1", "--format=Null", "--query"])
                    .arg(sql);
            }
        }
        cmd
    }

    /// Some CLIs report query errors on a zero exit status.
    fn error_line<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.lines().map(str::trim).find(|line| match self.id {
            EngineId::DataFusion | EngineId::DuckDb => line.contains("Error:"),
            EngineId::ClickHouse => line.contains("DB::Exception"),
        })
    }

    fn check(&self, out: &Captured) -> Result<(), ExecutionError> {
        if !out.status.success() {
            let detail = match out.signal() {
                Some(sig) if out.stderr.trim().is_empty() => format!("killed by signal {sig}"),
                _ => truncate(out.stderr.trim(), ERROR_DETAIL_CHARS),
            };
            return Err(ExecutionError::NonZeroExit {
                code: out.code(),
                stderr: detail,
            });
        }
        match self
            .error_line(&out.stderr)
            .or_else(|| self.error_line(&out.stdout))
        {
            Some(line) => Err(ExecutionError::MalformedOutput(truncate(
                line,
                ERROR_DETAIL_CHARS,
            ))),
            None => Ok(()),
        }
    }
}

impl EngineAdapter for CliEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    fn table_ref(&self) -> String {
        let path = self.data_path.display();
        match self.id {
            EngineId::DataFusion | EngineId::DuckDb => format!("'{path}'"),
            EngineId::ClickHouse => format!("file('{path}', Parquet)"),
        }
    }

    fn execute(&self, sql: &str) -> Execution {
        match process::run(self.query_command(sql), self.timeout, &self.cancel) {
            Ok(out) => {
                let elapsed = out.elapsed;
                match self.check(&out) {
                    Ok(()) => Execution::ok(elapsed),
                    Err(e) => Execution::failed(elapsed, e),
                }
            }
            Err(ExecutionError::Timeout { millis }) => {
                Execution::failed(self.timeout, ExecutionError::Timeout { millis })
            }
            Err(e) => Execution::failed(Duration::ZERO, e),
        }
    }
}

/// Builds and verifies an adapter per requested engine.
///
/// Engines whose binary cannot be verified are dropped with a warning; the
/// caller decides whether an empty result is fatal.
pub fn resolve(
    requests: &[(EngineId, String)],
    data_path: &Path,
    timeout: Duration,
    cancel: &CancelToken,
) -> Vec<CliEngine> {
    requests
        .iter()
        .filter_map(|(id, binary)| {
            let engine = CliEngine::new(*id, binary.clone(), data_path, timeout, cancel.clone());
            match engine.verify() {
                Ok(version) => {
                    info!(engine = %id, %binary, %version, "engine ready");
                    Some(engine)
                }
                Err(e) => {
                    warn!("skipping {id}: {e}");
                    None
                }
            }
        })
        .collect()
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Writing an executable while another test forks can fail exec with
    // ETXTBSY, so script creation and use are serialized.
    static SCRIPTS: Mutex<()> = Mutex::new(());

    const FAKE_ENGINE: &str = r#"#!/bin/sh
case "$*" in
  *--version*) echo "fake-engine 1.2.3"; exit 0 ;;
  *BROKEN*) echo "Catalog Error: no such function" >&2; exit 1 ;;
  *SILENT_ERROR*) echo "Binder Error: quietly wrong"; exit 0 ;;
  *CH_EXCEPTION*) echo "Code: 46. DB::Exception: Unknown function" >&2; exit 0 ;;
  *SLOW*) sleep 30 ;;
  *) exit 0 ;;
esac
"#;

    fn fake_engine(dir: &TempDir, body: &str) -> String {
        let path = dir.path().join("fake-engine");
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn engine(id: EngineId, binary: &str, timeout: Duration) -> CliEngine {
        CliEngine::new(id, binary, "/data/bench.parquet", timeout, CancelToken::new())
    }

    #[test]
    fn test_successful_query() {
        let _guard = SCRIPTS.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let bin = fake_engine(&dir, FAKE_ENGINE);
        let e = engine(EngineId::DuckDb, &bin, Duration::from_secs(10));

        assert_eq!(e.verify().unwrap(), "fake-engine 1.2.3");
        let exec = e.execute("SELECT 1");
        assert!(exec.is_ok(), "{exec:?}");
    }

    #[test]
    fn test_non_zero_exit_is_failure() {
        let _guard = SCRIPTS.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let bin = fake_engine(&dir, FAKE_ENGINE);
        let e = engine(EngineId::DuckDb, &bin, Duration::from_secs(10));

        let exec = e.execute("SELECT BROKEN");
        assert_eq!(
            exec.result,
            Err(ExecutionError::NonZeroExit {
                code: Some(1),
                stderr: "Catalog Error: no such function".to_string(),
            })
        );
    }

    #[test]
    fn test_error_text_on_success_exit_is_malformed() {
        let _guard = SCRIPTS.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let bin = fake_engine(&dir, FAKE_ENGINE);

        let duck = engine(EngineId::DuckDb, &bin, Duration::from_secs(10));
        assert!(matches!(
            duck.execute("SELECT SILENT_ERROR").result,
            Err(ExecutionError::MalformedOutput(line)) if line == "Binder Error: quietly wrong"
        ));

        let ch = engine(EngineId::ClickHouse, &bin, Duration::from_secs(10));
        assert!(matches!(
            ch.execute("SELECT CH_EXCEPTION").result,
            Err(ExecutionError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_timeout_is_distinct_failure() {
        let _guard = SCRIPTS.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let bin = fake_engine(&dir, FAKE_ENGINE);
        let e = engine(EngineId::DataFusion, &bin, Duration::from_millis(200));

        let exec = e.execute("SELECT SLOW");
        assert!(matches!(&exec.result, Err(err) if err.is_timeout()));
    }

    #[test]
    fn test_verify_rejects_missing_binary() {
        let e = engine(
            EngineId::ClickHouse,
            "/nonexistent/clickhouse",
            Duration::from_secs(1),
        );
        assert!(matches!(
            e.verify(),
            Err(ConfigError::BinaryUnavailable { engine: EngineId::ClickHouse, .. })
        ));
    }

    #[test]
    fn test_resolve_drops_unusable_engines() {
        let _guard = SCRIPTS.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let bin = fake_engine(&dir, FAKE_ENGINE);
        let requests = vec![
            (EngineId::DataFusion, bin.clone()),
            (EngineId::DuckDb, "/nonexistent/duckdb".to_string()),
        ];
        let engines = resolve(
            &requests,
            Path::new("/data/bench.parquet"),
            Duration::from_secs(5),
            &CancelToken::new(),
        );
        assert_eq!(engines.len(), 1);
        assert_eq!(engines[0].id(), EngineId::DataFusion);
        assert_eq!(engines[0].binary(), bin);
    }

    #[test]
    fn test_query_commands_are_engine_specific() {
        let args = |id| {
            let cmd = engine(id, "bin", Duration::from_secs(1)).query_command("SELECT 1");
            cmd.get_args()
                .map(|a| a.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
        };
        assert_eq!(
            args(EngineId::DataFusion),
            ["--quiet", "-c", "SET datafusion.execution.target_partitions = 1; SELECT 1"]
        );
        assert_eq!(
            args(EngineId::DuckDb),
            ["-noheader", "-csv", "-c", "SET threads = 1; SELECT 1"]
        );
        assert_eq!(
            args(EngineId::ClickHouse),
            ["local", "--max_threads=1", "--format=Null", "--query", "SELECT 1"]
        );
    }

    #[test]
    fn test_table_refs() {
        let df = engine(EngineId::DataFusion, "bin", Duration::from_secs(1));
        let ch = engine(EngineId::ClickHouse, "bin", Duration::from_secs(1));
        assert_eq!(df.table_ref(), "'/data/bench.parquet'");
        assert_eq!(ch.table_ref(), "file('/data/bench.parquet', Parquet)");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
