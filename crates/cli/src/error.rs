//! CLI error type.

use std::io;
use std::path::PathBuf;

use apisurf_core::{ConfigError, GenerateError, IrError};
use thiserror::Error;

/// Failure of a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// An output file or its directory could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The config file is not valid TOML for [`crate::ApisurfConfig`].
    #[error("invalid config file {}: {source}", .path.display())]
    Config {
        /// Config file.
        path: PathBuf,
        /// Parse error.
        source: Box<toml::de::Error>,
    },

    /// The config file lists no `[[outputs]]`.
    #[error("config file {} declares no outputs", .path.display())]
    NoOutputs {
        /// Config file.
        path: PathBuf,
    },

    /// The IR document failed to parse.
    #[error("failed to load IR {}: {source}", .path.display())]
    Ir {
        /// IR document.
        path: PathBuf,
        /// Parse error.
        source: IrError,
    },

    /// A required flag was missing and no config file applied.
    #[error("missing required option --{0} (or pass --config)")]
    MissingOption(&'static str),

    /// Generator, version, key format or format was rejected.
    #[error(transparent)]
    Options(#[from] ConfigError),

    /// The pipeline failed on the IR.
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl CliError {
    /// Errors caused by invalid options or configuration rather than by the IR.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Config { .. } | Self::NoOutputs { .. } | Self::MissingOption(_) => true,
            Self::Options(_) => true,
            Self::Generate(err) => err.is_config(),
            Self::Read { .. } | Self::Write { .. } | Self::Ir { .. } => false,
        }
    }
}
