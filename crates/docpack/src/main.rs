//! docpack CLI - single-file documentation bundler.
//!
//! Provides commands for:
//! - `build`: Compile a multilingual markdown tree into one HTML file
//! - `check`: Compile in memory and replay the result through the runtime model

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CheckArgs};
use output::Output;

/// docpack - single-file documentation bundler.
#[derive(Parser)]
#[command(name = "docpack", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the documentation bundle.
    Build(BuildArgs),
    /// Verify that every page, anchor and search entry resolves.
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Build(args) => args.source.verbose,
        Commands::Check(args) => args.source.verbose,
    };

    // --verbose enables INFO level, otherwise RUST_LOG (default WARN)
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Check(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_flags_parse() {
        let cli = Cli::try_parse_from([
            "docpack",
            "build",
            "--root",
            "docs",
            "--output",
            "out/index.html",
            "--languages",
            "en",
            "ru",
            "--strict",
            "-v",
        ])
        .unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert!(args.source.verbose);
        assert_eq!(args.output, Some(PathBuf::from("out/index.html")));
    }

    #[test]
    fn test_check_rejects_output_flag() {
        assert!(Cli::try_parse_from(["docpack", "check", "--output", "x.html"]).is_err());
    }
}
