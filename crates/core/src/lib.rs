//! API surface compiler.
//!
//! Turns an introspection IR (resources, actions, named types, named enums)
//! into target artifacts: a Zod runtime-validation module, a TypeScript
//! static-types module, an OpenAPI 3.0/3.1 document and a typed contract
//! module.
//!
//! The pipeline is the same for every target:
//!
//! 1. [`surface::resolve`] collects the types and enums reachable from actions.
//! 2. [`analysis::sort`] orders them by dependency and marks cyclic ones as deferred.
//! 3. A [`Generator`] maps the ordered surface into an [`Artifact`].
//! 4. The artifact is serialized to TypeScript, JSON or YAML.
//!
//! [`Orchestrator`] wires these steps together after validating options
//! against a [`GeneratorRegistry`].
//!
//! ```no_run
//! use apisurf_core::{GenerateOptions, GeneratorRegistry, Introspection, Orchestrator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ir = Introspection::from_json(r#"{ "resources": {} }"#)?;
//! let registry = GeneratorRegistry::builtin();
//! let generated = Orchestrator::new(&registry)
//!     .generate(&ir, &GenerateOptions::new("zod").with_key_format("camel"))?;
//! print!("{}", generated.content);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod error;
pub mod ir;
pub mod mapper;
pub mod naming;
pub mod orchestrator;
pub mod registry;
pub mod surface;
pub mod ts;

pub use error::{ConfigError, DefinitionKind, GenerateError, IrError};
pub use ir::{Introspection, IrFormat};
pub use mapper::{Artifact, Generator, MapOptions, OutputFormat};
pub use naming::KeyFormat;
pub use orchestrator::{GenerateOptions, Generated, Orchestrator, Plan};
pub use registry::GeneratorRegistry;
