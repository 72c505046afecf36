use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use sweep_service::utils::resolve_program;
use sweep_service::SweepParser;

/// Validate a sweep file without running anything
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the sweep YAML file
    pub sweep: PathBuf,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    let sweep_path = &args.sweep;

    if !sweep_path.exists() {
        color_eyre::eyre::bail!("Sweep file not found: {}", sweep_path.display());
    }

    // Step 1: Parse the sweep file
    output::status("Validating", &format!("{}", sweep_path.display()));

    let definition = match SweepParser::from_file(sweep_path) {
        Ok(definition) => definition,
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    output::check("sweep file parses");

    let mut problems = 0;

    // Step 2: Resolve the target executable
    match resolve_program(&definition.program) {
        Ok(resolved) => output::check(&format!(
            "program '{}' resolves to {}",
            definition.program,
            resolved.display()
        )),
        Err(e) => {
            output::error(&e.to_string());
            problems += 1;
        }
    }

    // Step 3: Resolve glob sources and build the parameter space
    match definition.resolve_space() {
        Ok(space) => {
            for param in space.params() {
                if param.values.is_empty() {
                    output::warning(&format!(
                        "parameter '{}' has no candidate values; the sweep enumerates nothing",
                        param.name
                    ));
                }
            }
            output::check(&format!(
                "{} parameters, {} combinations",
                space.len(),
                space.combination_count()
            ));
        }
        Err(e) => {
            output::error(&e.to_string());
            problems += 1;
        }
    }

    if problems > 0 {
        std::process::exit(1);
    }

    output::success("sweep is runnable");
    Ok(())
}
