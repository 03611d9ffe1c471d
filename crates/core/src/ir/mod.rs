//! Introspection IR consumed by the surface compiler.
//!
//! The IR is produced by the authoring/introspection layer and is treated as
//! immutable for the duration of a generation call. All maps are [`IndexMap`]s
//! so declaration order survives deserialisation; the resolver depends on it
//! for deterministic traversal.
//!
//! ## Module Structure
//!
//! - `field`: Field sum type, named types, named enums
//! - `resource`: Resource tree, actions, path helpers

mod field;
mod resource;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::IrError;

pub use field::{
    EnumAttr, EnumDef, Field, FieldKind, InvalidField, ObjectType, Primitive, PrimitiveKind,
    Shape, TypeDef, Union, UnionType, Variant, sorted_values,
};
pub use resource::{
    Action, HttpMethod, Request, Resource, Response, join_path, path_params, to_openapi_path,
};

/// Root of the Introspection IR.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Introspection {
    /// API metadata for OpenAPI `info` and `servers`.
    pub info: Option<ApiInfo>,
    /// Error codes actions can raise, keyed by code.
    pub error_codes: IndexMap<String, ErrorCode>,
    /// Top-level resources.
    pub resources: IndexMap<String, Resource>,
    /// Named types.
    pub types: IndexMap<String, TypeDef>,
    /// Named enums.
    pub enums: IndexMap<String, EnumDef>,
}

/// API metadata, surfaced in the OpenAPI `info`/`servers` sections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ApiInfo {
    /// API title.
    pub title: Option<String>,
    /// API version, not the OpenAPI version.
    pub version: Option<String>,
    /// API description.
    pub description: Option<String>,
    /// Server entries.
    pub servers: Vec<Server>,
}

/// A server URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Server {
    /// Base URL.
    pub url: String,
    /// Server description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A registered error code an action may raise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorCode {
    /// HTTP status the error is reported with.
    pub status: u16,
    /// Response description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Source format of an IR document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrFormat {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl IrFormat {
    /// Guess the format from a file extension; anything but yaml/yml is JSON.
    pub fn from_extension(extension: Option<&str>) -> Self {
        match extension {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// An action together with its position in the resource tree.
#[derive(Debug, Clone)]
pub struct ActionSite<'ir> {
    /// Identifiers of the owning resource chain, root first.
    pub identifiers: Vec<&'ir str>,
    /// Keys of the owning resource chain, root first.
    pub resource_keys: Vec<&'ir str>,
    /// Action key within its resource.
    pub name: &'ir str,
    /// The action itself.
    pub action: &'ir Action,
    /// Full colon-style path.
    pub path: String,
}

impl Introspection {
    /// Parse an IR document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, IrError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse an IR document from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, IrError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse `text` in the given format.
    pub fn parse(text: &str, format: IrFormat) -> Result<Self, IrError> {
        match format {
            IrFormat::Json => Self::from_json(text),
            IrFormat::Yaml => Self::from_yaml(text),
        }
    }

    /// Every action in the resource tree, in declaration order.
    ///
    /// A resource's own actions come before its nested resources.
    pub fn actions(&self) -> Vec<ActionSite<'_>> {
        let mut sites = Vec::new();
        for (key, resource) in &self.resources {
            collect_actions(key, resource, &mut Vec::new(), &mut sites);
        }
        sites
    }
}

struct ChainLink<'ir> {
    key: &'ir str,
    identifier: &'ir str,
    path: String,
}

fn collect_actions<'ir>(
    key: &'ir str,
    resource: &'ir Resource,
    chain: &mut Vec<ChainLink<'ir>>,
    sites: &mut Vec<ActionSite<'ir>>,
) {
    chain.push(ChainLink {
        key,
        identifier: resource.identifier.as_deref().unwrap_or(key),
        path: resource.path.clone().unwrap_or_else(|| format!("/{key}")),
    });

    for (name, action) in &resource.actions {
        let path = join_path(
            chain
                .iter()
                .map(|link| link.path.as_str())
                .chain(std::iter::once(action.path.as_str())),
        );
        sites.push(ActionSite {
            identifiers: chain.iter().map(|link| link.identifier).collect(),
            resource_keys: chain.iter().map(|link| link.key).collect(),
            name,
            action,
            path,
        });
    }

    for (child_key, child) in &resource.resources {
        collect_actions(child_key, child, chain, sites);
    }

    chain.pop();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const NESTED_IR: &str = r#"{
        "resources": {
            "accounts": {
                "path": "/accounts/:account_id",
                "actions": {
                    "show": { "method": "GET" }
                },
                "resources": {
                    "invoices": {
                        "identifier": "invoice",
                        "actions": {
                            "index": { "method": "GET" },
                            "show": { "method": "GET", "path": "/:id" }
                        }
                    }
                }
            },
            "health": {
                "path": "/",
                "actions": { "ping": {} }
            }
        }
    }"#;

    #[test]
    fn test_actions_walk_declaration_order() {
        let ir = Introspection::from_json(NESTED_IR).unwrap();
        let sites = ir.actions();
        let summary: Vec<_> = sites
            .iter()
            .map(|s| (s.identifiers.join("."), s.name, s.path.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("accounts".to_string(), "show", "/accounts/:account_id"),
                (
                    "accounts.invoice".to_string(),
                    "index",
                    "/accounts/:account_id/invoices"
                ),
                (
                    "accounts.invoice".to_string(),
                    "show",
                    "/accounts/:account_id/invoices/:id"
                ),
                ("health".to_string(), "ping", "/"),
            ]
        );
        assert_eq!(sites[1].resource_keys, vec!["accounts", "invoices"]);
        assert_eq!(sites[3].action.method, HttpMethod::Get);
    }

    #[test]
    fn test_yaml_and_json_agree() {
        let yaml = r#"
resources:
  invoices:
    actions:
      show:
        path: /:id
        response:
          body: { type: reference, to: invoice }
types:
  invoice:
    type: object
    shape:
      number: { type: string }
"#;
        let json = r#"{
            "resources": { "invoices": { "actions": { "show": {
                "path": "/:id",
                "response": { "body": { "type": "reference", "to": "invoice" } }
            } } } },
            "types": { "invoice": { "type": "object", "shape": { "number": { "type": "string" } } } }
        }"#;
        assert_eq!(
            Introspection::parse(yaml, IrFormat::Yaml).unwrap(),
            Introspection::parse(json, IrFormat::Json).unwrap()
        );
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(IrFormat::from_extension(Some("yml")), IrFormat::Yaml);
        assert_eq!(IrFormat::from_extension(Some("YAML")), IrFormat::Yaml);
        assert_eq!(IrFormat::from_extension(Some("json")), IrFormat::Json);
        assert_eq!(IrFormat::from_extension(None), IrFormat::Json);
    }

    #[test]
    fn test_invalid_document_reports_parse_error() {
        let err = Introspection::from_json(r#"{ "types": { "a": { "type": "set" } } }"#)
            .unwrap_err();
        assert!(matches!(err, IrError::Json(_)), "{err}");
    }
}
