// Sweep Service Library
// Core library for parameter-sweep enumeration and batch execution

pub mod discover;
pub mod error;
pub mod execution;
pub mod parser;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use error::{SetupError, SetupResult};

// Re-export parser types
pub use parser::{ParseError, SweepDefinition, SweepParameter, SweepParser, ValueSource};

// Re-export execution types
pub use execution::{
    progress_channel, ArgumentVector, BatchConfig, BatchRunner, CancelToken, Combination,
    Combinations, ExecutionEvent, OutputSink, Parameter, ParameterSpace, ProgressReceiver,
    ProgressSender, RunOutcome, RunStatus, SpaceBuilder,
};

// Re-export reporting types
pub use report::{BatchSummary, FailedRun, ReportFormat, SummaryReporter};
