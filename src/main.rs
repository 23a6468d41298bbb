mod checkout;
mod cli;
mod error;
mod maven;
mod scm;
mod workflow;
mod xml;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use std::process;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        unsafe {
            std::env::set_var("MVNSCM_VERBOSE", "1");
        }
    }

    let result = match cli.command {
        Commands::Checkout(args) => workflow::execute_checkout(&cli.path, args),
        Commands::Resolve(args) => workflow::execute_resolve(&cli.path, args),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
