//! Timed execution of one external process.
//!
//! The child runs in its own process group so a timeout or cancellation can
//! take down anything it spawned. Exit time is stamped by a dedicated waiter
//! thread, so the timeout/cancel polling interval never leaks into the
//! measured duration.

use std::io::Read;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::ExecutionError;

/// How often a waiting call re-checks its deadline and the cancel flag.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long to wait for a killed child to be reaped.
const KILL_GRACE: Duration = Duration::from_secs(5);

/// How long to wait for output pipes to close after the child exits.
const OUTPUT_GRACE: Duration = Duration::from_secs(1);

/// Bytes of each output stream retained for diagnostics; the rest is read
/// and dropped.
pub const MAX_CAPTURE: usize = 64 * 1024;

/// Shared cancellation flag. Cloning yields a handle to the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A process that ran to completion (with any exit status).
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub elapsed: Duration,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn signal(&self) -> Option<i32> {
        self.status.signal()
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut stream) = stream {
        thread::spawn(move || {
            let mut kept = Vec::new();
            let mut buf = [0u8; 8192];
            loop {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        let room = MAX_CAPTURE.saturating_sub(kept.len());
                        kept.extend_from_slice(&buf[..n.min(room)]);
                    }
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&kept).into_owned());
        });
    }
    rx
}

fn collect(rx: Receiver<String>) -> String {
    rx.recv_timeout(OUTPUT_GRACE).unwrap_or_default()
}

/// SIGKILL the whole process group led by `pid`.
fn kill_group(pid: u32) {
    let ret = unsafe { libc::kill(-(pid as libc::pid_t), libc::SIGKILL) };
    if ret == -1 {
        debug!(pid, error = %std::io::Error::last_os_error(), "kill failed");
    }
}

type WaitResult = (std::io::Result<ExitStatus>, Instant);

fn finished(
    (status, ended): WaitResult,
    start: Instant,
    stdout: Receiver<String>,
    stderr: Receiver<String>,
) -> Result<Captured, ExecutionError> {
    match status {
        Ok(status) => Ok(Captured {
            status,
            elapsed: ended.duration_since(start),
            stdout: collect(stdout),
            stderr: collect(stderr),
        }),
        Err(e) => Err(ExecutionError::Spawn(e.to_string())),
    }
}

/// Runs `command` to completion, bounded by `timeout` and `cancel`.
///
/// Stdin is closed; stdout and stderr are captured up to [`MAX_CAPTURE`]
/// bytes each. A non-zero exit is *not* an error here; callers decide what
/// an exit status means.
pub fn run(
    mut command: Command,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<Captured, ExecutionError> {
    if cancel.is_cancelled() {
        return Err(ExecutionError::Cancelled);
    }

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0);

    let start = Instant::now();
    let mut child = command
        .spawn()
        .map_err(|e| ExecutionError::Spawn(e.to_string()))?;
    let pid = child.id();
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let (tx, rx) = mpsc::channel::<WaitResult>();
    thread::spawn(move || {
        let status = child.wait();
        let _ = tx.send((status, Instant::now()));
    });

    // A timeout too large to represent as an instant never fires.
    let deadline = start.checked_add(timeout);

    loop {
        let now = Instant::now();
        let interrupt = if cancel.is_cancelled() {
            Some(ExecutionError::Cancelled)
        } else if deadline.is_some_and(|d| now >= d) {
            Some(ExecutionError::timeout(timeout))
        } else {
            None
        };

        if let Some(err) = interrupt {
            // The child may have exited between the last poll and now.
            if let Ok(done) = rx.try_recv() {
                return finished(done, start, stdout, stderr);
            }
            kill_group(pid);
            if rx.recv_timeout(KILL_GRACE).is_err() {
                warn!(pid, "engine process did not exit after SIGKILL");
            }
            return Err(err);
        }

        let wait = deadline.map_or(POLL_INTERVAL, |d| (d - now).min(POLL_INTERVAL));
        match rx.recv_timeout(wait) {
            Ok(done) => return finished(done, start, stdout, stderr),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                return Err(ExecutionError::Spawn("waiter thread exited".to_string()))
            }
        }
    }
}
