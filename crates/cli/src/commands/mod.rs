//! Subcommand implementations and the option handling they share.

pub mod check;
pub mod generate;
pub mod generators;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};

use apisurf_core::{
    GenerateOptions, Generated, GeneratorRegistry, Introspection, IrFormat, Orchestrator,
};
use clap::Args;
use tracing::{debug, warn};

use crate::config::{ApisurfConfig, CONFIG_FILENAME};
use crate::error::CliError;

/// Selects what to generate: either a config file or a single output.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["ir", "generator", "target_version", "key_format", "format", "out"],
        help = "Run every output declared in a config file. Defaults to ./apisurf.toml when no --ir is given"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Introspection IR document (.json, .yaml or .yml)")]
    pub ir: Option<PathBuf>,

    #[arg(short = 'g', long, value_name = "NAME", help = "Generator to run (see `apisurf generators`)")]
    pub generator: Option<String>,

    #[arg(
        id = "target_version",
        long = "version",
        value_name = "VERSION",
        help = "Target version; defaults to the generator's newest"
    )]
    pub version: Option<String>,

    #[arg(long, value_name = "FORMAT", help = "Property key format: keep, camel, underscore or kebab")]
    pub key_format: Option<String>,

    #[arg(long, value_name = "FORMAT", help = "Document format: json or yaml")]
    pub format: Option<String>,

    #[arg(short = 'o', long, value_name = "FILE", help = "Output file")]
    pub out: Option<PathBuf>,
}

/// One output to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub ir: PathBuf,
    pub options: GenerateOptions,
    /// `None` means stdout.
    pub out: Option<PathBuf>,
}

/// A job together with its generated text.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub job: Job,
    pub generated: Generated,
}

impl TargetArgs {
    /// Expand the arguments into jobs, reading the config file if one applies.
    pub fn jobs(&self) -> Result<Vec<Job>, CliError> {
        let config = match (&self.config, &self.ir) {
            (Some(path), _) => Some(path.clone()),
            (None, None) if Path::new(CONFIG_FILENAME).is_file() => {
                Some(PathBuf::from(CONFIG_FILENAME))
            }
            _ => None,
        };

        if let Some(path) = config {
            let config = ApisurfConfig::load(&path)?;
            return Ok(config
                .outputs
                .iter()
                .map(|output| Job {
                    ir: config.ir.clone(),
                    options: output.options(),
                    out: Some(output.path.clone()),
                })
                .collect());
        }

        let ir = self.ir.clone().ok_or(CliError::MissingOption("ir"))?;
        let generator = self
            .generator
            .clone()
            .ok_or(CliError::MissingOption("generator"))?;
        Ok(vec![Job {
            ir,
            options: GenerateOptions {
                generator,
                version: self.version.clone(),
                key_format: self.key_format.clone(),
                format: self.format.clone(),
            },
            out: self.out.clone(),
        }])
    }
}

/// Validate every job's options, then load each IR once and run the jobs.
pub fn render(registry: &GeneratorRegistry, jobs: Vec<Job>) -> Result<Vec<Rendered>, CliError> {
    let orchestrator = Orchestrator::new(registry);
    let plans = jobs
        .iter()
        .map(|job| orchestrator.plan(&job.options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut loaded: HashMap<PathBuf, Introspection> = HashMap::new();
    let mut rendered = Vec::with_capacity(jobs.len());
    for (job, plan) in jobs.into_iter().zip(plans) {
        let ir = match loaded.entry(job.ir.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(load_ir(&job.ir)?),
        };
        let generated = plan.run(ir)?;
        rendered.push(Rendered { job, generated });
    }
    Ok(rendered)
}

fn load_ir(path: &Path) -> Result<Introspection, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let format = IrFormat::from_extension(path.extension().and_then(|ext| ext.to_str()));
    let ir = Introspection::parse(&text, format).map_err(|source| CliError::Ir {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        ir = %path.display(),
        resources = ir.resources.len(),
        "Loaded IR."
    );
    Ok(ir)
}

/// Report a command's error on stderr and turn the outcome into an exit code.
pub fn run_command<F>(f: F) -> i32
where
    F: FnOnce() -> Result<i32, CliError>,
{
    match f() {
        Ok(code) => code,
        Err(err) => {
            if err.is_configuration() {
                warn!(error = %err, "Invalid configuration.");
            }
            eprintln!("{err}");
            1
        }
    }
}
