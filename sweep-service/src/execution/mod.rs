// Execution Engine Module
// Handles combination enumeration and bounded-concurrency batch execution

pub mod batch;
pub mod events;
pub mod space;

// Re-export key types
pub use batch::{BatchConfig, BatchRunner, CancelToken, OutputSink, RunOutcome, RunStatus};
pub use events::{progress_channel, ExecutionEvent, ProgressReceiver, ProgressSender};
pub use space::{ArgumentVector, Combination, Combinations, Parameter, ParameterSpace, SpaceBuilder};
