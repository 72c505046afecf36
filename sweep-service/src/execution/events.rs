// Execution Events
// Progress reporting and event types for batch execution

use crate::execution::batch::RunStatus;

use std::time::Duration;
use tokio::sync::mpsc;

/// Sender for execution progress events
pub type ProgressSender = mpsc::UnboundedSender<ExecutionEvent>;

/// Receiver for execution progress events
pub type ProgressReceiver = mpsc::UnboundedReceiver<ExecutionEvent>;

/// Create a new progress channel
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// Events emitted during batch execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    /// Batch execution started
    BatchStarted {
        /// Total run count, when the input sequence reports an exact size
        total: Option<usize>,
        concurrency: usize,
    },

    /// A run's process was spawned
    RunStarted { index: usize, command: String },

    /// A run reached a terminal state
    RunCompleted {
        index: usize,
        command: String,
        status: RunStatus,
        duration: Duration,
    },

    /// Batch execution completed (or was cancelled)
    BatchCompleted {
        total: usize,
        failed: usize,
        cancelled: bool,
        duration: Duration,
    },
}

impl ExecutionEvent {
    /// Create a batch started event
    pub fn batch_started(total: Option<usize>, concurrency: usize) -> Self {
        Self::BatchStarted { total, concurrency }
    }

    /// Create a run started event
    pub fn run_started(index: usize, command: impl Into<String>) -> Self {
        Self::RunStarted {
            index,
            command: command.into(),
        }
    }

    /// Create a run completed event
    pub fn run_completed(
        index: usize,
        command: impl Into<String>,
        status: RunStatus,
        duration: Duration,
    ) -> Self {
        Self::RunCompleted {
            index,
            command: command.into(),
            status,
            duration,
        }
    }

    /// Create a batch completed event
    pub fn batch_completed(total: usize, failed: usize, cancelled: bool, duration: Duration) -> Self {
        Self::BatchCompleted {
            total,
            failed,
            cancelled,
            duration,
        }
    }
}

/// Helper trait for sending events, ignoring errors (fire-and-forget)
pub trait EventSender {
    fn send_event(&self, event: ExecutionEvent);
}

impl EventSender for ProgressSender {
    fn send_event(&self, event: ExecutionEvent) {
        let _ = self.send(event);
    }
}

impl EventSender for Option<ProgressSender> {
    fn send_event(&self, event: ExecutionEvent) {
        if let Some(sender) = self {
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_progress_channel() {
        let (tx, mut rx) = progress_channel();

        tx.send_event(ExecutionEvent::batch_started(Some(4), 2));
        tx.send_event(ExecutionEvent::run_started(0, "prog -a 1"));

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(event1, ExecutionEvent::BatchStarted { .. }));

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(event2, ExecutionEvent::RunStarted { .. }));
    }

    #[test]
    fn test_event_construction() {
        let event =
            ExecutionEvent::run_completed(3, "prog -a 1", RunStatus::Succeeded, Duration::from_secs(2));

        if let ExecutionEvent::RunCompleted {
            index,
            command,
            status,
            duration,
        } = event
        {
            assert_eq!(index, 3);
            assert_eq!(command, "prog -a 1");
            assert_eq!(status, RunStatus::Succeeded);
            assert_eq!(duration, Duration::from_secs(2));
        } else {
            panic!("wrong event type");
        }
    }

    #[test]
    fn test_optional_sender() {
        let sender: Option<ProgressSender> = None;
        // Should not panic
        sender.send_event(ExecutionEvent::batch_started(None, 1));
    }
}
