//! String helpers for emitted TypeScript: key quoting, escaping, identifiers.

use serde_json::Value;

use super::types::TsLiteral;

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Whether `name` is a plain identifier that can be used as an unquoted key.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| is_identifier_char(first) && !first.is_ascii_digit())
        && chars.all(is_identifier_char)
}

/// Escape a string for use in a double-quoted JavaScript/TypeScript literal.
pub fn escape_js_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Object key as written in source: bare when it is an identifier, quoted otherwise.
pub fn quote_if_needed(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", escape_js_string(name))
    }
}

/// Make a declaration name a valid identifier.
///
/// Characters outside `[A-Za-z0-9_$]` are dropped and a leading digit gets a
/// `_` prefix.
pub fn sanitize_identifier(name: &str) -> String {
    let mut result: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    if result.is_empty() {
        return "_empty".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

/// Convert a JSON scalar to a TypeScript literal; arrays and objects have no
/// literal form and yield `None`.
pub fn literal_from_value(value: &Value) -> Option<TsLiteral> {
    match value {
        Value::String(s) => Some(TsLiteral::String(s.clone())),
        Value::Bool(b) => Some(TsLiteral::Bool(*b)),
        Value::Null => Some(TsLiteral::Null),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(TsLiteral::Int(i)),
            None => n.as_f64().map(TsLiteral::Number),
        },
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_keys() {
        for name in ["total", "_links", "$ref", "createdAt", "line2"] {
            assert!(is_identifier(name), "{name}");
        }
        for name in ["", "2fa", "created-at", "a.b", "due date"] {
            assert!(!is_identifier(name), "{name}");
        }
    }

    #[test]
    fn test_escape_and_quote() {
        assert_eq!(escape_js_string(r#"C:\tmp "x""#), r#"C:\\tmp \"x\""#);
        assert_eq!(escape_js_string("two\nlines"), "two\\nlines");
        assert_eq!(quote_if_needed("total"), "total");
        assert_eq!(quote_if_needed("created-at"), r#""created-at""#);
        assert_eq!(quote_if_needed("123"), r#""123""#);
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("Invoice"), "Invoice");
        assert_eq!(sanitize_identifier("3dModel"), "_3dModel");
        assert_eq!(sanitize_identifier("Line.Item"), "LineItem");
        assert_eq!(sanitize_identifier("--"), "_empty");
    }

    #[test]
    fn test_literal_from_value() {
        assert_eq!(
            literal_from_value(&Value::from("invoice")),
            Some(TsLiteral::String("invoice".into()))
        );
        assert_eq!(literal_from_value(&Value::from(3)), Some(TsLiteral::Int(3)));
        assert_eq!(literal_from_value(&Value::from(1.5)), Some(TsLiteral::Number(1.5)));
        assert_eq!(literal_from_value(&Value::Null), Some(TsLiteral::Null));
        assert_eq!(literal_from_value(&serde_json::json!([1])), None);
    }
}
