use crate::output;

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use color_eyre::Result;

use sweep_service::utils::resolve_program;
use sweep_service::{
    progress_channel, BatchConfig, BatchRunner, BatchSummary, ExecutionEvent, OutputSink,
    ReportFormat, RunStatus, SummaryReporter, SweepParser,
};

/// Run every parameter combination in a sweep file
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the sweep YAML file
    pub sweep: PathBuf,

    /// Number of simultaneous runs (overrides the sweep file)
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Write each run's output to its own file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Let runs write through to the terminal instead of discarding output
    #[arg(long)]
    pub show_output: bool,

    /// Summary format printed after the batch: terminal, json
    #[arg(long, short = 's', default_value = "terminal")]
    pub summary: String,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let format: ReportFormat = args
        .summary
        .parse()
        .map_err(|e: String| color_eyre::eyre::eyre!("{}", e))?;

    // Setup phase: any failure here aborts before a single run starts
    output::status("Loading", &format!("{}", args.sweep.display()));
    let definition = SweepParser::from_file(&args.sweep)?;
    let program = resolve_program(&definition.program)?;
    let space = definition.resolve_space()?;

    let campaign = definition.name.clone().unwrap_or_else(|| {
        args.sweep
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("sweep")
            .to_string()
    });

    let total = space.combination_count();
    output::info(&format!(
        "Sweep '{}': {} parameters, {} runs",
        campaign,
        space.len(),
        total
    ));

    let concurrency = args.jobs.unwrap_or(definition.concurrency).max(1);
    let sink = if args.show_output {
        OutputSink::Inherit
    } else if let Some(dir) = args.log_dir.or(definition.log_dir.clone()) {
        OutputSink::LogDir(dir)
    } else {
        OutputSink::Discard
    };

    // Create progress channel and runner
    let (tx, mut rx) = progress_channel();
    let runner = BatchRunner::new(BatchConfig {
        concurrency,
        output: sink,
    })
    .with_progress(tx);

    // Ctrl-c cancels the batch: queued runs never start, in-flight runs are
    // killed and reaped
    let cancel = runner.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    // Spawn execution in the background, render events in the foreground
    let start = Instant::now();
    let program = program.to_string_lossy().to_string();
    let exec_handle =
        tokio::spawn(async move { runner.run(space.argument_vectors(&program)).await });

    while let Some(event) = rx.recv().await {
        match event {
            ExecutionEvent::BatchStarted { concurrency, .. } => {
                output::header(&format!("{} runs, {} workers", total, concurrency));
            }

            ExecutionEvent::RunStarted { index, command } => {
                eprintln!("  [{}/{}] {}", index + 1, total, command);
            }

            ExecutionEvent::RunCompleted {
                index,
                command,
                status,
                duration,
            } => match status {
                RunStatus::Succeeded => output::dim_success(&format!(
                    "  [{}/{}] OK ({:.2}s)",
                    index + 1,
                    total,
                    duration.as_secs_f64()
                )),
                RunStatus::ExitFailure { code } => output::dim_failure(&format!(
                    "  [{}/{}] FAIL (exit code: {:?}, {:.2}s)",
                    index + 1,
                    total,
                    code,
                    duration.as_secs_f64()
                )),
                RunStatus::LaunchFailure { message } => output::dim_failure(&format!(
                    "  [{}/{}] FAIL ({}: {})",
                    index + 1,
                    total,
                    command,
                    message
                )),
                RunStatus::Cancelled => {
                    output::warning(&format!("  [{}/{}] cancelled", index + 1, total))
                }
            },

            ExecutionEvent::BatchCompleted {
                total,
                failed,
                cancelled,
                duration,
            } => {
                if cancelled {
                    output::warning(&format!(
                        "Sweep cancelled after {:.2}s",
                        duration.as_secs_f64()
                    ));
                } else if failed == 0 {
                    output::success(&format!(
                        "All {} runs completed in {:.2}s",
                        total,
                        duration.as_secs_f64()
                    ));
                } else {
                    output::failure(&format!(
                        "{} of {} runs failed ({:.2}s)",
                        failed,
                        total,
                        duration.as_secs_f64()
                    ));
                }
            }
        }
    }

    let outcomes = exec_handle.await?;
    let summary = BatchSummary::from_outcomes(&outcomes, start.elapsed());
    let report = SummaryReporter::report(&summary, format);
    println!("{}", report.trim_end());

    // Individual run failures do not fail the driver; only setup errors and
    // cancellation produce a non-zero exit
    if summary.was_cancelled() {
        std::process::exit(130);
    }

    Ok(())
}
