//! `apisurf check`: regenerate in memory and compare with the files on disk.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use apisurf_core::GeneratorRegistry;
use clap::Args;
use console::style;
use similar::{ChangeTag, TextDiff};
use tracing::debug;

use super::{TargetArgs, render, run_command};
use crate::error::CliError;

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub fn run(args: &CheckArgs, registry: &GeneratorRegistry) -> i32 {
    run_command(|| run_inner(args, registry))
}

fn run_inner(args: &CheckArgs, registry: &GeneratorRegistry) -> Result<i32, CliError> {
    let jobs = args.target.jobs()?;
    if jobs.iter().any(|job| job.out.is_none()) {
        return Err(CliError::MissingOption("out"));
    }

    let mut stale = 0usize;
    for rendered in render(registry, jobs)? {
        let Some(path) = rendered.job.out.as_deref() else {
            continue;
        };
        let expected = &rendered.generated.content;
        match read_existing(path)? {
            Some(current) if current == *expected => {
                debug!(out = %path.display(), "Output up to date.");
            }
            Some(current) => {
                stale += 1;
                print!("{}", unified_diff(&path.display().to_string(), &current, expected));
            }
            None => {
                stale += 1;
                println!("{} {}", style("missing").red().bold(), path.display());
            }
        }
    }

    if stale > 0 {
        eprintln!("{stale} output(s) out of date; run `apisurf generate` to update them");
        return Ok(1);
    }
    println!("up to date");
    Ok(0)
}

fn read_existing(path: &Path) -> Result<Option<String>, CliError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CliError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Unified diff of `current` against `expected` with three lines of context.
pub fn unified_diff(label: &str, current: &str, expected: &str) -> String {
    let diff = TextDiff::from_lines(current, expected);
    let mut output = String::new();

    let _ = writeln!(output, "{}", style(format!("--- {label} (current)")).bold());
    let _ = writeln!(output, "{}", style(format!("+++ {label} (generated)")).bold());

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let mut line = String::from(change.value());
                if change.missing_newline() {
                    line.push('\n');
                }
                let (sign, line) = match change.tag() {
                    ChangeTag::Delete => ("-", style(line).red()),
                    ChangeTag::Insert => ("+", style(line).green()),
                    ChangeTag::Equal => (" ", style(line)),
                };
                let _ = write!(output, "{sign}{line}");
            }
        }
    }
    output
}
