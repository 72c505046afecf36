use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use sweep_service::SweepParser;

/// Print the command lines a sweep would execute, in enumeration order
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Path to the sweep YAML file
    pub sweep: PathBuf,

    /// Print only the number of combinations
    #[arg(long)]
    pub count: bool,
}

pub fn execute(args: ListArgs) -> Result<()> {
    let definition = SweepParser::from_file(&args.sweep)?;
    let space = definition.resolve_space()?;

    if args.count {
        println!("{}", space.combination_count());
        return Ok(());
    }

    for vector in space.argument_vectors(&definition.program) {
        println!("{}", vector);
    }

    output::info(&format!("{} combinations", space.combination_count()));
    Ok(())
}
