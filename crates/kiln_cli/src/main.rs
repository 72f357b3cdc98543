//! kiln CLI: the command-line interface for the kiln incremental build engine.
//!
//! Provides `kiln build` to bring a target's executable up to date, `kiln
//! status` to show what a build would do, `kiln test` to build and run test
//! files, and `kiln clean` to remove a target's outputs and cache.

#![warn(missing_docs)]

mod build;
mod clean;
mod project;
mod status;
mod test;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use kiln_engine::EngineError;

/// kiln: an incremental build engine for C-like projects.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "kiln incremental build engine")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show per-stage detail.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `kiln.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile what changed and relink.
    Build(TargetArgs),
    /// Show what a build would do without doing it.
    Status(TargetArgs),
    /// Build, then link and run every test file.
    Test(TestArgs),
    /// Remove a target's build directory and cache.
    Clean(TargetArgs),
}

/// Target selection shared by every subcommand.
#[derive(Parser, Debug)]
pub struct TargetArgs {
    /// Target name from `kiln.toml`. Optional when there is only one.
    #[arg(short, long)]
    pub target: Option<String>,
}

/// Arguments for the `kiln test` subcommand.
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Target name from `kiln.toml`. Optional when there is only one.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Only run tests whose file name contains this string.
    #[arg(long)]
    pub filter: Option<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when standard error is a terminal.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print per-stage detail.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to `kiln.toml` or its directory.
    pub config: Option<String>,
}

fn main() {
    project::init_tracing();
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Status(ref args) => status::run(args, &global),
        Command::Test(ref args) => test::run(args, &global),
        Command::Clean(ref args) => clean::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            if e.downcast_ref::<EngineError>().is_some_and(EngineError::is_internal) {
                eprintln!("{e}");
                process::abort();
            }
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_build_default() {
        let cli = Cli::parse_from(["kiln", "build"]);
        match cli.command {
            Command::Build(ref args) => assert!(args.target.is_none()),
            _ => panic!("expected Build command"),
        }
        assert!(!cli.quiet);
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kiln", "status", "--target", "app", "-v", "--config", "x/kiln.toml"]);
        match cli.command {
            Command::Status(ref args) => assert_eq!(args.target.as_deref(), Some("app")),
            _ => panic!("expected Status command"),
        }
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("x/kiln.toml"));
    }

    #[test]
    fn parse_test_with_filter() {
        let cli = Cli::parse_from(["kiln", "test", "--filter", "math", "-t", "app"]);
        match cli.command {
            Command::Test(ref args) => {
                assert_eq!(args.filter.as_deref(), Some("math"));
                assert_eq!(args.target.as_deref(), Some("app"));
            }
            _ => panic!("expected Test command"),
        }
    }

    #[test]
    fn parse_clean_quiet() {
        let cli = Cli::parse_from(["kiln", "-q", "clean"]);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Command::Clean(_)));
    }
}
