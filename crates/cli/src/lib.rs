//! Command line front end for the API surface compiler.
//!
//! `apisurf generate` writes artifacts, `apisurf check` verifies that
//! committed artifacts match what would be generated, and
//! `apisurf generators` lists the registered generators.

mod commands;
pub mod config;
pub mod error;

use apisurf_core::GeneratorRegistry;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub use config::{ApisurfConfig, OutputConfig};
pub use error::CliError;

#[derive(Parser, Debug)]
#[command(
    name = "apisurf",
    version,
    about = "Compile an introspection IR into Zod, TypeScript, OpenAPI and contract artifacts"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate artifacts from an IR document
    Generate(commands::generate::GenerateArgs),
    /// Fail if generated artifacts differ from the files on disk
    Check(commands::check::CheckArgs),
    /// List available generators
    Generators,
}

/// Parse `args` (including the program name) and run the selected command
/// against the built-in generators.
pub fn run_cli(args: Vec<String>) -> i32 {
    let registry = GeneratorRegistry::builtin();
    run_cli_with(args, &registry)
}

/// Like [`run_cli`], with a caller-supplied registry.
pub fn run_cli_with(args: Vec<String>, registry: &GeneratorRegistry) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => commands::generate::run(&args, registry),
            Some(Commands::Check(args)) => commands::check::run(&args, registry),
            Some(Commands::Generators) => commands::generators::run(registry),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Install the stderr tracing subscriber.
///
/// `APISURF_LOG` takes a plain level ("debug", "info", ...) applied to the
/// apisurf crates, or a full filter spec such as `apisurf_core=trace`.
pub fn init_tracing() {
    let filter = match std::env::var("APISURF_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("apisurf_cli={level},apisurf_core={level}")
        }
        Ok(spec) => spec,
        Err(_) => "apisurf_cli=warn,apisurf_core=warn".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_levels() {
        assert!(is_plain_level("debug"));
        assert!(is_plain_level("WARN"));
        assert!(!is_plain_level("apisurf_core=debug"));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_conflicts_with_single_output_flags() {
        let err = Cli::try_parse_from(["apisurf", "generate", "--config", "a.toml", "-g", "zod"])
            .err()
            .map(|e| e.kind());
        assert_eq!(err, Some(clap::error::ErrorKind::ArgumentConflict));
    }
}
