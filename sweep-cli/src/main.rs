mod commands;
mod output;

use clap::{Parser, Subcommand};
use color_eyre::Result;

#[derive(Parser, Debug)]
#[command(
    name = "sweeprun",
    version,
    about = "Run parameter-sweep experiment campaigns"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every parameter combination in a sweep file
    Run(commands::run::RunArgs),
    /// Print the command lines a sweep would execute
    List(commands::list::ListArgs),
    /// Validate a sweep file without running anything
    Validate(commands::validate::ValidateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => commands::run::execute(args).await,
        Command::List(args) => commands::list::execute(args),
        Command::Validate(args) => commands::validate::execute(args),
    }
}
