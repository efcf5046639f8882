//! link-deps CLI
//!
//! Installs locally developed dependencies into `node_modules` as packed
//! copies and keeps them current.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::{Context, TAG};
use error::Result;
use logging::init_logging;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", format!("{}[ERROR]", TAG).red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = std::env::current_dir()?;
    let command = cli.command.unwrap_or(Commands::Sync);
    // sync and watch act on the enclosing project; init and add edit the
    // package.json in the working directory
    let discover = matches!(command, Commands::Sync | Commands::Watch);
    let context = Context::load(&cwd, discover, cli.client.as_deref())?;

    match command {
        Commands::Sync => commands::run_sync(&context),
        Commands::Watch => commands::run_watch(&context),
        Commands::Init => commands::run_init(&context, &cli.script),
        Commands::Add { paths } => commands::run_add(&context, &paths, cli.dev, &cli.script),
    }
}
