// Batch Summary Reporting
// Aggregates run outcomes into a summary renderable as text or JSON

use crate::execution::batch::{RunOutcome, RunStatus};

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Output format for batch summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable terminal output
    Terminal,
    /// Machine-readable JSON
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Terminal => write!(f, "terminal"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" | "text" | "console" => Ok(ReportFormat::Terminal),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!(
                "Unknown report format '{}'. Valid formats: terminal, json",
                s
            )),
        }
    }
}

/// Identity of one run that did not succeed
#[derive(Debug, Clone, Serialize)]
pub struct FailedRun {
    pub index: usize,
    pub command: String,
    pub reason: String,
}

/// Aggregated result of one batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    #[serde(serialize_with = "as_secs")]
    pub duration: Duration,
    pub failures: Vec<FailedRun>,
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl BatchSummary {
    /// Build a summary from the outcomes of one batch
    pub fn from_outcomes(outcomes: &[RunOutcome], duration: Duration) -> Self {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut cancelled = 0;
        let mut failures = Vec::new();

        for outcome in outcomes {
            match &outcome.status {
                RunStatus::Succeeded => succeeded += 1,
                RunStatus::Cancelled => cancelled += 1,
                _ => failed += 1,
            }
            if let Some(reason) = outcome.failure_reason() {
                failures.push(FailedRun {
                    index: outcome.index,
                    command: outcome.argv.to_string(),
                    reason,
                });
            }
        }

        Self {
            total: outcomes.len(),
            succeeded,
            failed,
            cancelled,
            duration,
            failures,
        }
    }

    /// Whether every run in the batch succeeded
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled > 0
    }
}

/// Renders batch summaries in the supported formats
pub struct SummaryReporter;

impl SummaryReporter {
    /// Generate a report in the specified format
    pub fn report(summary: &BatchSummary, format: ReportFormat) -> String {
        match format {
            ReportFormat::Terminal => Self::to_terminal(summary),
            ReportFormat::Json => Self::to_json(summary),
        }
    }

    fn to_terminal(summary: &BatchSummary) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{} runs: {} succeeded, {} failed, {} cancelled ({:.2}s)\n",
            summary.total,
            summary.succeeded,
            summary.failed,
            summary.cancelled,
            summary.duration.as_secs_f64(),
        ));
        for failure in &summary.failures {
            out.push_str(&format!(
                "  [{}] {} ({})\n",
                failure.index, failure.command, failure.reason
            ));
        }
        out
    }

    fn to_json(summary: &BatchSummary) -> String {
        serde_json::to_string_pretty(summary).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::space::ArgumentVector;

    fn outcome(index: usize, status: RunStatus) -> RunOutcome {
        RunOutcome {
            index,
            argv: ArgumentVector::from_tokens(vec![
                "prog".to_string(),
                "-a".to_string(),
                index.to_string(),
            ]),
            status,
            duration: Duration::from_millis(100),
        }
    }

    fn mixed_outcomes() -> Vec<RunOutcome> {
        vec![
            outcome(0, RunStatus::Succeeded),
            outcome(1, RunStatus::ExitFailure { code: Some(7) }),
            outcome(
                2,
                RunStatus::LaunchFailure {
                    message: "no such file".to_string(),
                },
            ),
            outcome(3, RunStatus::Cancelled),
        ]
    }

    #[test]
    fn test_summary_counts() {
        let summary = BatchSummary::from_outcomes(&mixed_outcomes(), Duration::from_secs(2));

        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.failures.len(), 3);
        assert!(!summary.all_succeeded());
        assert!(summary.was_cancelled());
    }

    #[test]
    fn test_failure_identities() {
        let summary = BatchSummary::from_outcomes(&mixed_outcomes(), Duration::from_secs(2));

        assert_eq!(summary.failures[0].index, 1);
        assert_eq!(summary.failures[0].command, "prog -a 1");
        assert_eq!(summary.failures[0].reason, "exit code 7");
        assert_eq!(summary.failures[1].reason, "launch failed: no such file");
        assert_eq!(summary.failures[2].reason, "cancelled");
    }

    #[test]
    fn test_terminal_report() {
        let summary = BatchSummary::from_outcomes(&mixed_outcomes(), Duration::from_secs(2));
        let report = SummaryReporter::report(&summary, ReportFormat::Terminal);

        assert!(report.starts_with("4 runs: 1 succeeded, 2 failed, 1 cancelled"));
        assert!(report.contains("[1] prog -a 1 (exit code 7)"));
    }

    #[test]
    fn test_json_report() {
        let summary = BatchSummary::from_outcomes(&mixed_outcomes(), Duration::from_secs(2));
        let report = SummaryReporter::report(&summary, ReportFormat::Json);

        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["total"], 4);
        assert_eq!(value["succeeded"], 1);
        assert_eq!(value["failures"][0]["reason"], "exit code 7");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!(
            "Terminal".parse::<ReportFormat>().unwrap(),
            ReportFormat::Terminal
        );
        assert!("xml".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_empty_batch_summary() {
        let summary = BatchSummary::from_outcomes(&[], Duration::ZERO);
        assert_eq!(summary.total, 0);
        assert!(summary.all_succeeded());
        assert!(!summary.was_cancelled());
    }
}
