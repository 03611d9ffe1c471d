//! Generation entry point: validate options, then resolve → sort → map → serialize.

use tracing::{debug, info};

use crate::analysis::sort;
use crate::error::{ConfigError, GenerateError};
use crate::ir::Introspection;
use crate::mapper::{Generator, MapOptions, OutputFormat, check_key_collisions};
use crate::naming::KeyFormat;
use crate::registry::GeneratorRegistry;
use crate::surface::resolve;

/// User-facing generation options, as given on the command line or in config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Registered generator name.
    pub generator: String,
    /// Defaults to the generator's first supported version.
    pub version: Option<String>,
    /// `keep` (default), `camel`, `underscore` or `kebab`.
    pub key_format: Option<String>,
    /// `json` or `yaml`; only document generators accept one.
    pub format: Option<String>,
}

impl GenerateOptions {
    /// Options for `generator` with every other setting defaulted.
    pub fn new(generator: impl Into<String>) -> Self {
        Self {
            generator: generator.into(),
            ..Self::default()
        }
    }

    /// Request a specific version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Request a key format by name.
    pub fn with_key_format(mut self, key_format: impl Into<String>) -> Self {
        self.key_format = Some(key_format.into());
        self
    }

    /// Request an output format by name.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Validated options bound to a registered generator.
#[derive(Debug, Clone, Copy)]
pub struct Plan<'r> {
    /// Generator to run.
    pub generator: &'r dyn Generator,
    /// Validated map options.
    pub options: MapOptions,
    /// Serialisation format.
    pub format: OutputFormat,
}

/// Serialized output of one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Name of the generator that ran.
    pub generator: &'static str,
    /// Version it targeted.
    pub version: &'static str,
    /// Format `content` is in.
    pub format: OutputFormat,
    /// Serialised artifact.
    pub content: String,
}

/// Runs generators from a registry.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator<'r> {
    registry: &'r GeneratorRegistry,
}

impl<'r> Orchestrator<'r> {
    /// Orchestrator over `registry`.
    pub fn new(registry: &'r GeneratorRegistry) -> Self {
        Self { registry }
    }

    /// Validate `options` against the registry without looking at any IR.
    pub fn plan(&self, options: &GenerateOptions) -> Result<Plan<'r>, ConfigError> {
        let generator = self.registry.get(&options.generator)?;
        let name = generator.name();

        let versions = generator.versions();
        let version = match options.version.as_deref() {
            Some(requested) => versions.iter().copied().find(|v| *v == requested),
            None => versions.first().copied(),
        }
        .ok_or_else(|| ConfigError::UnsupportedVersion {
            generator: name.to_string(),
            version: options.version.clone().unwrap_or_default(),
            supported: versions.iter().map(|v| (*v).to_string()).collect(),
        })?;

        let key_format = match options.key_format.as_deref() {
            Some(value) => value.parse::<KeyFormat>()?,
            None => KeyFormat::default(),
        };

        let formats = generator.formats();
        let format = match options.format.as_deref() {
            Some(requested) => OutputFormat::from_name(requested)
                .filter(|format| formats.contains(format)),
            None => formats.first().copied(),
        }
        .ok_or_else(|| ConfigError::UnsupportedFormat {
            generator: name.to_string(),
            format: options.format.clone().unwrap_or_default(),
            supported: formats.iter().map(|f| f.as_str().to_string()).collect(),
        })?;

        Ok(Plan {
            generator,
            options: MapOptions {
                version,
                key_format,
            },
            format,
        })
    }

    /// Validate `options`, then run the whole pipeline over `ir`.
    pub fn generate(
        &self,
        ir: &Introspection,
        options: &GenerateOptions,
    ) -> Result<Generated, GenerateError> {
        self.plan(options)?.run(ir)
    }
}

impl Plan<'_> {
    /// Resolve, sort, map and serialise `ir`.
    pub fn run(&self, ir: &Introspection) -> Result<Generated, GenerateError> {
        let name = self.generator.name();
        debug!(
            generator = name,
            version = self.options.version,
            key_format = %self.options.key_format,
            format = %self.format,
            "Starting generation."
        );

        let surface = resolve(ir)?;
        let sorted = sort(&surface);
        check_key_collisions(ir, &sorted, self.options.key_format)?;
        let artifact = self.generator.map(ir, &sorted, &self.options)?;
        let content = artifact.render(name, self.format)?;

        info!(
            generator = name,
            types = sorted.types.len(),
            enums = sorted.enums.len(),
            bytes = content.len(),
            "Generated output."
        );
        Ok(Generated {
            generator: name,
            version: self.options.version,
            format: self.format,
            content,
        })
    }
}
