//! `apisurf generate`: write each artifact to its file, or to stdout.

use std::fs;
use std::path::Path;

use apisurf_core::GeneratorRegistry;
use clap::Args;
use tracing::info;

use super::{TargetArgs, render, run_command};
use crate::error::CliError;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub fn run(args: &GenerateArgs, registry: &GeneratorRegistry) -> i32 {
    run_command(|| run_inner(args, registry))
}

fn run_inner(args: &GenerateArgs, registry: &GeneratorRegistry) -> Result<i32, CliError> {
    let jobs = args.target.jobs()?;
    for rendered in render(registry, jobs)? {
        let content = &rendered.generated.content;
        match &rendered.job.out {
            Some(path) => {
                write_output(path, content)?;
                info!(
                    generator = rendered.generated.generator,
                    out = %path.display(),
                    "Wrote output."
                );
                println!("generated {}", path.display());
            }
            None => print!("{content}"),
        }
    }
    Ok(0)
}

fn write_output(path: &Path, content: &str) -> Result<(), CliError> {
    let write_err = |source| CliError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, content).map_err(write_err)
}
