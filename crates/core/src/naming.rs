//! Declaration naming and key casing.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::ir::ActionSite;
use crate::ts::utils::sanitize_identifier;

/// Transform applied to every object key and query parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyFormat {
    /// Keys as written in the IR.
    #[default]
    Keep,
    /// `createdAt`
    Camel,
    /// `created_at`
    Underscore,
    /// `created-at`
    Kebab,
}

impl KeyFormat {
    /// Every format, in the order listed in errors.
    pub const ALL: [Self; 4] = [Self::Keep, Self::Camel, Self::Underscore, Self::Kebab];

    /// Option value naming the format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Camel => "camel",
            Self::Underscore => "underscore",
            Self::Kebab => "kebab",
        }
    }

    /// Render an IR property key.
    pub fn apply(self, key: &str) -> String {
        match self {
            Self::Keep => key.to_string(),
            Self::Camel => camel_case(key),
            Self::Underscore => snake_case(key),
            Self::Kebab => kebab_case(key),
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKeyFormat {
                value: s.to_string(),
                expected: Self::ALL.iter().map(|f| f.as_str().to_string()).collect(),
            })
    }
}

/// Split an identifier into words at separators and case boundaries.
///
/// `invoice_status`, `invoice-status`, `invoiceStatus` and `InvoiceStatus`
/// all split into `["invoice"|"Invoice", "status"|"Status"]`; an acronym run
/// such as `HTTPServer` splits before its last capital.
pub fn words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// `invoice_status` → `InvoiceStatus`.
pub fn pascal_case(s: &str) -> String {
    words(s).iter().map(|w| capitalize_first(w)).collect()
}

/// `invoice_status` → `invoiceStatus`.
pub fn camel_case(s: &str) -> String {
    let words = words(s);
    let mut result = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            result.push_str(&word.to_lowercase());
        } else {
            result.push_str(&capitalize_first(word));
        }
    }
    result
}

/// `invoiceStatus` → `invoice_status`.
pub fn snake_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// `invoiceStatus` → `invoice-status`.
pub fn kebab_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Declared name of a named type or enum: `invoice_status` → `InvoiceStatus`.
pub fn type_name(ir_name: &str) -> String {
    sanitize_identifier(&pascal_case(ir_name))
}

/// Runtime-validation schema name: `invoice_status` → `InvoiceStatusSchema`.
pub fn schema_name(ir_name: &str) -> String {
    format!("{}Schema", type_name(ir_name))
}

/// Kind of per-action declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSuffix {
    /// Query object.
    RequestQuery,
    /// Body object.
    RequestBody,
    /// Query and body together.
    Request,
    /// Response body type.
    ResponseBody,
    /// Body wrapper; `never` when the action returns nothing.
    Response,
}

impl ActionSuffix {
    /// Suffix appended to action declaration names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequestQuery => "RequestQuery",
            Self::RequestBody => "RequestBody",
            Self::Request => "Request",
            Self::ResponseBody => "ResponseBody",
            Self::Response => "Response",
        }
    }
}

/// Parent identifiers, resource identifier and action name, in PascalCase.
fn action_stem(site: &ActionSite<'_>) -> String {
    site.identifiers
        .iter()
        .copied()
        .chain(std::iter::once(site.name))
        .map(pascal_case)
        .collect()
}

/// `accounts` → `invoice` → `show` + `Response` → `AccountsInvoiceShowResponse`.
pub fn action_type_name(site: &ActionSite<'_>, suffix: ActionSuffix) -> String {
    sanitize_identifier(&format!("{}{}", action_stem(site), suffix.as_str()))
}

/// Schema constant name of an action declaration: `<TypeName>Schema`.
pub fn action_schema_name(site: &ActionSite<'_>, suffix: ActionSuffix) -> String {
    format!("{}Schema", action_type_name(site, suffix))
}

/// OpenAPI `operationId`: camelCase of the resource chain and action name.
pub fn operation_id(site: &ActionSite<'_>) -> String {
    let stem = action_stem(site);
    sanitize_identifier(&camel_case(&stem))
}
