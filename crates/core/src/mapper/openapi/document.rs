//! OpenAPI document structs for serde serialisation.
//!
//! Field declaration order is serialisation order, so the top-level keys come
//! out as `openapi, info, servers, paths, components`. Maps are [`IndexMap`]s
//! filled in a deterministic order by the mapper.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Root OpenAPI document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenApiDocument {
    /// OpenAPI version string, e.g. `3.1.0`.
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Server entries; omitted when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Path items keyed by OpenAPI-style path.
    pub paths: IndexMap<String, PathItem>,
    /// Component schemas.
    pub components: Components,
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Base URL the API is served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Server {
    /// Base URL.
    pub url: String,
    /// Server description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations of one path, keyed by lowercase HTTP method.
pub type PathItem = IndexMap<String, Operation>;

/// One method under a path item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Unique, camelCase identifier.
    pub operation_id: String,
    /// One-line summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Grouping tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Marked as deprecated.
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
    /// Path parameters first, then query parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// JSON request body, when the action takes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    pub responses: IndexMap<String, Response>,
}

/// A path or query parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Serialised as `in`.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Always true for path parameters.
    pub required: bool,
    /// Parameter description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Marked as deprecated.
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
    /// Value schema.
    pub schema: Schema,
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Path segment.
    Path,
    /// Query string.
    Query,
}

/// JSON request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    /// Whether a body must be sent.
    pub required: bool,
    /// Keyed by media type; only `application/json` is emitted.
    pub content: IndexMap<String, MediaType>,
}

/// Response for one status code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Response description.
    pub description: String,
    /// Absent for responses without a body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// Schema for one media type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaType {
    /// Schema of the payload.
    pub schema: Schema,
}

/// Named schemas referenced through `#/components/schemas/...`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Components {
    /// Schemas keyed by IR name, sorted.
    pub schemas: IndexMap<String, Schema>,
}

/// JSON Schema object as used in OpenAPI 3.0 and 3.1.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Reference to a component schema.
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    /// Single type, or a type array for 3.1 nullability.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    /// Format hint such as `date-time` or `uuid`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Documentation text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Marked as deprecated.
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,

    /// 3.0 only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Allowed values.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    /// Constant value (3.1 only).
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    /// Object properties, sorted by rendered key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,

    /// Required property names, sorted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Array element schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// Composition used for `extends` and injected tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,

    /// Alternatives of a union.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,

    /// Tag property of a discriminated `oneOf`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    /// Inclusive numeric lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,

    /// Inclusive numeric upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,

    /// Minimum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<Value>,

    /// Maximum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<Value>,

    /// Example value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Schema {
    /// `$ref` to `ref_path` and nothing else.
    pub fn reference(ref_path: String) -> Self {
        Self {
            ref_path: Some(ref_path),
            ..Self::default()
        }
    }

    /// A schema with only `type` set.
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(SchemaType::Single(schema_type.to_string())),
            ..Self::default()
        }
    }
}

/// `type`: a single name, or a list in 3.1 when null is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// One type name.
    Single(String),
    /// Type names, e.g. `["string", "null"]`.
    Multiple(Vec<String>),
}

/// Tag property and tag-to-`$ref` mapping of a `oneOf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    /// Property carrying the tag.
    pub property_name: String,
    /// Tag value to component `$ref`, for variants whose component declares the tag.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub mapping: IndexMap<String, String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}
