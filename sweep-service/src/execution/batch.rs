// Batch Runner
// Bounded-concurrency execution of generated command lines

use crate::execution::events::{EventSender, ExecutionEvent, ProgressSender};
use crate::execution::space::ArgumentVector;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;

/// Where child process output goes.
///
/// The scheduler never reads child output; the exit code is the only signal
/// it consumes.
#[derive(Debug, Clone, Default)]
pub enum OutputSink {
    /// Drop child stdout/stderr entirely
    #[default]
    Discard,
    /// Let children write through to the driver's own stdout/stderr
    Inherit,
    /// Write each run's stdout and stderr to `run-NNNN.log` in a directory
    LogDir(PathBuf),
}

impl OutputSink {
    fn stdio_pair(&self, index: usize) -> io::Result<(Stdio, Stdio)> {
        match self {
            OutputSink::Discard => Ok((Stdio::null(), Stdio::null())),
            OutputSink::Inherit => Ok((Stdio::inherit(), Stdio::inherit())),
            OutputSink::LogDir(dir) => {
                fs::create_dir_all(dir)?;
                let file = fs::File::create(dir.join(format!("run-{:04}.log", index)))?;
                let stderr = file.try_clone()?;
                Ok((Stdio::from(file), Stdio::from(stderr)))
            }
        }
    }
}

/// Terminal state of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Process exited with code 0
    Succeeded,
    /// Process ran and exited non-zero; `None` means killed by a signal
    ExitFailure { code: Option<i32> },
    /// Process could not be started at all
    LaunchFailure { message: String },
    /// Batch was cancelled before or while this run executed
    Cancelled,
}

/// The recorded result of executing one argument vector
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Submission index within the batch
    pub index: usize,
    /// The command line that was attempted
    pub argv: ArgumentVector,
    pub status: RunStatus,
    pub duration: Duration,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        matches!(self.status, RunStatus::Succeeded)
    }

    /// Human-readable reason when the run did not succeed
    pub fn failure_reason(&self) -> Option<String> {
        match &self.status {
            RunStatus::Succeeded => None,
            RunStatus::ExitFailure { code: Some(code) } => Some(format!("exit code {}", code)),
            RunStatus::ExitFailure { code: None } => Some("killed by signal".to_string()),
            RunStatus::LaunchFailure { message } => Some(format!("launch failed: {}", message)),
            RunStatus::Cancelled => Some("cancelled".to_string()),
        }
    }
}

/// Configuration for batch execution
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum number of simultaneously running processes (minimum 1)
    pub concurrency: usize,
    /// Where child stdout/stderr goes
    pub output: OutputSink,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            output: OutputSink::Discard,
        }
    }
}

/// Cloneable handle for cancelling a running batch.
///
/// Queued runs never start after cancellation; in-flight children are killed
/// and reaped before their outcome is reported.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Request cancellation of every batch holding a clone of this token
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once `cancel` has been called (immediately if it already was)
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Executes every argument vector of a batch through a bounded pool of
/// workers, one child process per worker slot.
///
/// A run's failure is recorded in its [`RunOutcome`] and never aborts the
/// batch; [`BatchRunner::run`] always returns one outcome per input vector,
/// in submission order.
pub struct BatchRunner {
    config: BatchConfig,
    event_tx: Option<ProgressSender>,
    cancel: CancelToken,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            event_tx: None,
            cancel: CancelToken::new(),
        }
    }

    /// Set progress event sender
    pub fn with_progress(mut self, tx: ProgressSender) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Use a caller-supplied cancellation token
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// A token that cancels this runner's batches
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run every vector to a terminal state.
    ///
    /// Vectors are consumed lazily as worker slots free up, so the input may
    /// be an enumerator that never materializes the full product. Results
    /// are returned in submission order regardless of completion order.
    pub async fn run<I>(&self, vectors: I) -> Vec<RunOutcome>
    where
        I: IntoIterator<Item = ArgumentVector>,
    {
        let start = Instant::now();
        let concurrency = self.config.concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(concurrency));

        let mut vectors = vectors.into_iter();
        let (lower, upper) = vectors.size_hint();
        let total = upper.filter(|&u| u == lower);

        self.event_tx
            .send_event(ExecutionEvent::batch_started(total, concurrency));

        let mut handles: Vec<(ArgumentVector, JoinHandle<RunOutcome>)> = Vec::new();
        let mut cancelled_tail: Vec<ArgumentVector> = Vec::new();
        let mut index = 0usize;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            let Some(argv) = vectors.next() else { break };

            // Wait for a worker slot, unless the batch is cancelled first.
            let permit = tokio::select! {
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                _ = self.cancel.cancelled() => {
                    cancelled_tail.push(argv);
                    break;
                }
            };

            let sink = self.config.output.clone();
            let cancel = self.cancel.clone();
            let event_tx = self.event_tx.clone();
            let task_argv = argv.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit; // Hold the slot until the child is reaped
                let outcome = run_one(task_argv, index, sink, cancel, event_tx.clone()).await;
                event_tx.send_event(ExecutionEvent::run_completed(
                    outcome.index,
                    outcome.argv.to_string(),
                    outcome.status.clone(),
                    outcome.duration,
                ));
                outcome
            });

            handles.push((argv, handle));
            index += 1;
        }

        // Whatever is still in the input after a cancellation never starts.
        cancelled_tail.extend(vectors);

        let mut outcomes = Vec::with_capacity(handles.len() + cancelled_tail.len());
        for (argv, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    let outcome = RunOutcome {
                        index: outcomes.len(),
                        argv,
                        status: RunStatus::LaunchFailure {
                            message: format!("worker task failed: {}", e),
                        },
                        duration: Duration::ZERO,
                    };
                    self.event_tx.send_event(ExecutionEvent::run_completed(
                        outcome.index,
                        outcome.argv.to_string(),
                        outcome.status.clone(),
                        outcome.duration,
                    ));
                    outcomes.push(outcome);
                }
            }
        }

        for argv in cancelled_tail {
            let outcome = RunOutcome {
                index: outcomes.len(),
                argv,
                status: RunStatus::Cancelled,
                duration: Duration::ZERO,
            };
            self.event_tx.send_event(ExecutionEvent::run_completed(
                outcome.index,
                outcome.argv.to_string(),
                outcome.status.clone(),
                outcome.duration,
            ));
            outcomes.push(outcome);
        }

        let failed = outcomes.iter().filter(|o| !o.success()).count();
        self.event_tx.send_event(ExecutionEvent::batch_completed(
            outcomes.len(),
            failed,
            self.cancel.is_cancelled(),
            start.elapsed(),
        ));

        outcomes
    }
}

/// Spawn one child process and wait it to a terminal state.
async fn run_one(
    argv: ArgumentVector,
    index: usize,
    sink: OutputSink,
    cancel: CancelToken,
    event_tx: Option<ProgressSender>,
) -> RunOutcome {
    let start = Instant::now();

    // The batch may have been cancelled between submission and this worker
    // getting scheduled.
    if cancel.is_cancelled() {
        return RunOutcome {
            index,
            argv,
            status: RunStatus::Cancelled,
            duration: Duration::ZERO,
        };
    }

    let (stdout, stderr) = match sink.stdio_pair(index) {
        Ok(pair) => pair,
        Err(e) => {
            return RunOutcome {
                index,
                argv,
                status: RunStatus::LaunchFailure {
                    message: format!("failed to open output sink: {}", e),
                },
                duration: start.elapsed(),
            };
        }
    };

    let mut cmd = Command::new(argv.program());
    cmd.args(argv.args());
    cmd.stdin(Stdio::null());
    cmd.stdout(stdout);
    cmd.stderr(stderr);
    // A dropped runner must not leave children behind
    cmd.kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return RunOutcome {
                index,
                argv,
                status: RunStatus::LaunchFailure {
                    message: e.to_string(),
                },
                duration: start.elapsed(),
            };
        }
    };

    event_tx.send_event(ExecutionEvent::run_started(index, argv.to_string()));

    let status = tokio::select! {
        result = child.wait() => match result {
            Ok(exit) if exit.success() => RunStatus::Succeeded,
            Ok(exit) => RunStatus::ExitFailure { code: exit.code() },
            Err(e) => RunStatus::LaunchFailure { message: e.to_string() },
        },
        _ = cancel.cancelled() => {
            // Kill and reap before reporting, so no child outlives the batch
            let _ = child.kill().await;
            RunStatus::Cancelled
        }
    };

    RunOutcome {
        index,
        argv,
        status,
        duration: start.elapsed(),
    }
}
