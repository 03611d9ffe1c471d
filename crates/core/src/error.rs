//! Error types for loading the IR and running generation.

use std::fmt;

use thiserror::Error;

use crate::naming::KeyFormat;

/// Failure to load an IR document.
#[derive(Debug, Error)]
pub enum IrError {
    /// The document is not valid JSON for the IR schema.
    #[error("failed to parse IR document as JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The document is not valid YAML for the IR schema.
    #[error("failed to parse IR document as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Invalid generation options, raised before the IR is traversed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No generator is registered under `name`.
    #[error("unknown generator '{name}'; available generators: {}", .available.join(", "))]
    UnknownGenerator {
        /// Requested name.
        name: String,
        /// Registered generator names, sorted.
        available: Vec<String>,
    },
    /// The generator does not accept the requested version.
    #[error(
        "generator '{generator}' does not support version '{version}'; supported versions: {}",
        .supported.join(", ")
    )]
    UnsupportedVersion {
        /// Generator name.
        generator: String,
        /// Requested version.
        version: String,
        /// Accepted versions, default first.
        supported: Vec<String>,
    },
    /// The generator cannot serialise to the requested format.
    #[error(
        "generator '{generator}' cannot emit '{format}'; supported formats: {}",
        .supported.join(", ")
    )]
    UnsupportedFormat {
        /// Generator name.
        generator: String,
        /// Requested format.
        format: String,
        /// Accepted formats, default first.
        supported: Vec<String>,
    },
    /// The key format is not one of the known names.
    #[error("unknown key format '{value}'; expected one of: {}", .expected.join(", "))]
    UnknownKeyFormat {
        /// Requested value.
        value: String,
        /// Accepted key format names.
        expected: Vec<String>,
    },
}

/// What kind of definition an [`GenerateError::IrDefect`] is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    /// A named type.
    Type,
    /// A named enum.
    Enum,
    /// An entry of `error_codes`.
    ErrorCode,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Type => f.write_str("type"),
            DefinitionKind::Enum => f.write_str("enum"),
            DefinitionKind::ErrorCode => f.write_str("error code"),
        }
    }
}

/// Failure while running the resolve → sort → map → serialize pipeline.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Invalid options, reported before the IR is read.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A reachable definition names something the IR does not declare.
    #[error("IR defect: {referenced_by} references undeclared {kind} '{name}'")]
    IrDefect {
        /// What is missing.
        kind: DefinitionKind,
        /// Undeclared name.
        name: String,
        /// Type name or action site holding the reference.
        referenced_by: String,
    },

    /// Two keys of one shape render to the same name under the key format.
    #[error("key format '{key_format}' maps both '{first}' and '{second}' in {owner} to '{key}'")]
    KeyCollision {
        /// Format that produced the collision.
        key_format: KeyFormat,
        /// Type name or action site owning the shape.
        owner: String,
        /// First IR key, in declaration order.
        first: String,
        /// Second IR key.
        second: String,
        /// Rendered key both map to.
        key: String,
    },

    /// The artifact could not be serialised.
    #[error("failed to serialize {generator} output: {message}")]
    Serialize {
        /// Generator whose artifact failed.
        generator: &'static str,
        /// Serialiser error text.
        message: String,
    },
}

impl GenerateError {
    /// Whether the options, not the IR, are at fault.
    pub fn is_config(&self) -> bool {
        matches!(self, GenerateError::Config(_))
    }
}
