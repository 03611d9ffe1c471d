//! Registry of generators.
//!
//! The registry is an explicit value: build it once with
//! [`GeneratorRegistry::builtin`] (optionally [`register`] more) and pass it by
//! reference into the [`Orchestrator`](crate::orchestrator::Orchestrator).
//! Lookup is by exact name.
//!
//! [`register`]: GeneratorRegistry::register

use indexmap::IndexMap;
use tracing::warn;

use crate::error::ConfigError;
use crate::mapper::Generator;
use crate::mapper::contract::ContractGenerator;
use crate::mapper::openapi::OpenApiGenerator;
use crate::mapper::typescript::TypeScriptGenerator;
use crate::mapper::zod::ZodGenerator;

/// Generators keyed by name, in registration order.
#[derive(Debug, Default)]
pub struct GeneratorRegistry {
    generators: IndexMap<&'static str, Box<dyn Generator>>,
}

impl GeneratorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in generator.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ZodGenerator));
        registry.register(Box::new(TypeScriptGenerator));
        registry.register(Box::new(OpenApiGenerator));
        registry.register(Box::new(ContractGenerator));
        registry
    }

    /// Add a generator; a generator with the same name is replaced.
    pub fn register(&mut self, generator: Box<dyn Generator>) {
        let name = generator.name();
        if self.generators.insert(name, generator).is_some() {
            warn!(generator = name, "Replaced registered generator.");
        }
    }

    /// Look up a generator by name.
    pub fn get(&self, name: &str) -> Result<&dyn Generator, ConfigError> {
        self.generators
            .get(name)
            .map(|generator| &**generator)
            .ok_or_else(|| ConfigError::UnknownGenerator {
                name: name.to_string(),
                available: self.names().into_iter().map(str::to_string).collect(),
            })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.generators.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Generators in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Generator> {
        self.generators.values().map(|generator| &**generator)
    }

    /// Number of registered generators.
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Whether no generator is registered.
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::analysis::SortedSurface;
    use crate::error::GenerateError;
    use crate::ir::Introspection;
    use crate::mapper::{Artifact, MapOptions};

    #[derive(Debug)]
    struct Echo;

    impl Generator for Echo {
        fn name(&self) -> &'static str {
            "zod"
        }

        fn description(&self) -> &'static str {
            "echo"
        }

        fn versions(&self) -> &'static [&'static str] {
            &["1"]
        }

        fn map(
            &self,
            _ir: &Introspection,
            _surface: &SortedSurface<'_>,
            _options: &MapOptions,
        ) -> Result<Artifact, GenerateError> {
            Ok(Artifact::Source(String::new()))
        }
    }

    #[test]
    fn test_builtin_generators() {
        let registry = GeneratorRegistry::builtin();
        assert_eq!(registry.names(), vec!["contract", "openapi", "typescript", "zod"]);
        assert_eq!(registry.get("openapi").unwrap().versions(), &["3.1.0", "3.0.3"]);
        assert_eq!(registry.get("zod").unwrap().versions()[0], "4");
    }

    #[test]
    fn test_unknown_generator_lists_alternatives() {
        let registry = GeneratorRegistry::builtin();
        let err = registry.get("graphql").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown generator 'graphql'; available generators: contract, openapi, typescript, zod"
        );
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut registry = GeneratorRegistry::builtin();
        registry.register(Box::new(Echo));
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("zod").unwrap().description(), "echo");
    }
}
