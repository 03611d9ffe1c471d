//! `apisurf.toml` project configuration.
//!
//! ```toml
//! ir = "introspection.json"
//!
//! [[outputs]]
//! generator = "zod"
//! key_format = "camel"
//! path = "ui/lib/schemas.ts"
//!
//! [[outputs]]
//! generator = "openapi"
//! version = "3.0.3"
//! format = "yaml"
//! path = "openapi.yaml"
//! ```
//!
//! Relative paths resolve against the directory holding the config file.

use std::fs;
use std::path::{Path, PathBuf};

use apisurf_core::GenerateOptions;
use serde::Deserialize;
use tracing::debug;

use crate::error::CliError;

/// Default config file name.
pub const CONFIG_FILENAME: &str = "apisurf.toml";

/// Parsed `apisurf.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApisurfConfig {
    /// IR document (JSON, or YAML by extension).
    pub ir: PathBuf,
    /// Files to generate, in order.
    #[serde(default)]
    pub outputs: Vec<OutputConfig>,
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Registered generator name.
    pub generator: String,
    /// Target version; the generator's newest when absent.
    #[serde(default)]
    pub version: Option<String>,
    /// Property key format.
    #[serde(default)]
    pub key_format: Option<String>,
    /// Document format, for generators that offer more than one.
    #[serde(default)]
    pub format: Option<String>,
    /// Destination file.
    pub path: PathBuf,
}

impl OutputConfig {
    /// Generation options for this output.
    pub fn options(&self) -> GenerateOptions {
        GenerateOptions {
            generator: self.generator.clone(),
            version: self.version.clone(),
            key_format: self.key_format.clone(),
            format: self.format.clone(),
        }
    }
}

impl ApisurfConfig {
    /// Load a config file and resolve its paths against the file's directory.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let contents = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&contents).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        if config.outputs.is_empty() {
            return Err(CliError::NoOutputs {
                path: path.to_path_buf(),
            });
        }

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_paths(base);
        debug!(
            config = %path.display(),
            outputs = config.outputs.len(),
            "Loaded config."
        );
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        self.ir = base.join(&self.ir);
        for output in &mut self.outputs {
            output.path = base.join(&output.path);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outputs() {
        let config: ApisurfConfig = toml::from_str(
            r#"
ir = "introspection.json"

[[outputs]]
generator = "zod"
key_format = "camel"
path = "ui/lib/schemas.ts"

[[outputs]]
generator = "openapi"
version = "3.0.3"
format = "yaml"
path = "openapi.yaml"
"#,
        )
        .unwrap();
        assert_eq!(config.outputs.len(), 2);
        assert_eq!(config.outputs[0].options().key_format.as_deref(), Some("camel"));
        assert_eq!(config.outputs[1].options().version.as_deref(), Some("3.0.3"));
        assert_eq!(config.outputs[1].options().format.as_deref(), Some("yaml"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = toml::from_str::<ApisurfConfig>(
            r#"
ir = "introspection.json"

[[outputs]]
generator = "zod"
path = "schemas.ts"
casing = "camel"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown field `casing`"), "{err}");
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let mut config: ApisurfConfig = toml::from_str(
            r#"
ir = "api/introspection.json"

[[outputs]]
generator = "typescript"
path = "ui/types.ts"
"#,
        )
        .unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.ir, PathBuf::from("/project/api/introspection.json"));
        assert_eq!(config.outputs[0].path, PathBuf::from("/project/ui/types.ts"));
    }
}
