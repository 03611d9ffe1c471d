//! Resource tree, actions and path handling.

use indexmap::IndexMap;
use serde::Deserialize;

use super::field::{Field, Shape};

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Lowercase form, as used for OpenAPI path item keys.
    pub fn as_lower_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

/// A node of the resource tree.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Resource {
    /// Identifier used in generated names; defaults to the resource key.
    pub identifier: Option<String>,
    /// Path segment(s); defaults to `/<key>`.
    pub path: Option<String>,
    /// Actions keyed by name, in declaration order.
    pub actions: IndexMap<String, Action>,
    /// Nested resources.
    pub resources: IndexMap<String, Resource>,
}

/// An action owned by a resource.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Action {
    /// HTTP method; `GET` when absent.
    pub method: HttpMethod,
    /// Colon-style path relative to the resource, e.g. `/:id`.
    pub path: String,
    /// One-line summary.
    pub summary: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Marked as deprecated.
    pub deprecated: bool,
    /// OpenAPI tags.
    pub tags: Vec<String>,
    /// Request query and body.
    pub request: Request,
    /// Response body.
    pub response: Response,
    /// Error codes this action may raise.
    pub raises: Vec<String>,
}

/// Request query and body fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Request {
    /// Query string parameters.
    pub query: Shape,
    /// JSON body properties.
    pub body: Shape,
}

impl Request {
    /// Whether the request carries neither query nor body.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.body.is_empty()
    }
}

/// Response body, or the no-content marker.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Response {
    /// Response body; absent for actions that return nothing.
    pub body: Option<Field>,
    /// Forces a 204 even when a body is declared.
    pub no_content: bool,
}

impl Response {
    /// The body that will actually be rendered; no-content wins over a body.
    pub fn rendered_body(&self) -> Option<&Field> {
        if self.no_content {
            None
        } else {
            self.body.as_ref()
        }
    }
}

/// Join path pieces into a normalised absolute path.
///
/// Duplicate slashes collapse and trailing slashes are dropped; the empty path is `/`.
pub fn join_path<'a>(pieces: impl IntoIterator<Item = &'a str>) -> String {
    let segments: Vec<&str> = pieces
        .into_iter()
        .flat_map(|piece| piece.split('/'))
        .filter(|segment| !segment.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// Names of the `:param` segments of a colon-style path, in order.
pub fn path_params(path: &str) -> Vec<&str> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix(':'))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Rewrite `:param` segments to OpenAPI `{param}` syntax.
pub fn to_openapi_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if !name.is_empty() => format!("{{{name}}}"),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
