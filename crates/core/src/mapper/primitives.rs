//! Primitive-kind tables for every target.
//!
//! Each table is a total match over [`PrimitiveKind`]; unknown kinds were
//! already folded into `PrimitiveKind::Unknown` when the IR was loaded, so
//! every lookup yields valid target syntax.

use serde_json::Value;

use crate::ir::{Primitive, PrimitiveKind};
use crate::ts::{TsExpr, TsLiteral, TsPrimitive};

/// Zod dialect selected by the generator version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZodVersion {
    /// Zod 3: string formats are methods, e.g. `z.string().uuid()`.
    V3,
    /// Zod 4: top-level format schemas, e.g. `z.uuid()`.
    V4,
}

impl ZodVersion {
    /// Versions accepted by Zod-backed generators, default first.
    pub const SUPPORTED: &'static [&'static str] = &["4", "3"];

    /// Map a validated version string; anything but `3` is treated as `4`.
    pub fn from_version(version: &str) -> Self {
        if version == "3" { Self::V3 } else { Self::V4 }
    }
}

/// What a primitive's `min`/`max` bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// String length.
    Length,
    /// Numeric value.
    Value,
}

/// Bounds a primitive kind supports, if any.
pub fn bound_of(kind: PrimitiveKind) -> Option<Bound> {
    match kind {
        PrimitiveKind::String | PrimitiveKind::Binary => Some(Bound::Length),
        PrimitiveKind::Integer | PrimitiveKind::Number | PrimitiveKind::Decimal => {
            Some(Bound::Value)
        }
        PrimitiveKind::Boolean
        | PrimitiveKind::Date
        | PrimitiveKind::DateTime
        | PrimitiveKind::Time
        | PrimitiveKind::Uuid
        | PrimitiveKind::Unknown => None,
    }
}

/// Integral bounds print without a fractional part.
pub fn number_literal(n: f64) -> TsLiteral {
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        TsLiteral::Int(n as i64)
    } else {
        TsLiteral::Number(n)
    }
}

/// JSON number for a bound, integral when the value has no fraction.
pub fn number_value(n: f64) -> Value {
    match number_literal(n) {
        TsLiteral::Int(i) => Value::from(i),
        _ => Value::from(n),
    }
}

// =============================================================================
// Zod
// =============================================================================

fn zod_string_format(format: Option<&str>, version: ZodVersion) -> TsExpr {
    let string = || TsExpr::call("z.string", vec![]);
    match (format, version) {
        (Some("email"), ZodVersion::V4) => TsExpr::call("z.email", vec![]),
        (Some("email"), ZodVersion::V3) => string().method("email", vec![]),
        (Some("url" | "uri"), ZodVersion::V4) => TsExpr::call("z.url", vec![]),
        (Some("url" | "uri"), ZodVersion::V3) => string().method("url", vec![]),
        _ => string(),
    }
}

/// Zod schema expression for a primitive, bounds included.
pub fn zod_primitive(primitive: &Primitive, version: ZodVersion) -> TsExpr {
    let v4 = version == ZodVersion::V4;
    let string = || TsExpr::call("z.string", vec![]);
    let base = match primitive.kind {
        PrimitiveKind::String => zod_string_format(primitive.format.as_deref(), version),
        PrimitiveKind::Integer if v4 => TsExpr::call("z.int", vec![]),
        PrimitiveKind::Integer => TsExpr::call("z.number", vec![]).method("int", vec![]),
        PrimitiveKind::Number | PrimitiveKind::Decimal => TsExpr::call("z.number", vec![]),
        PrimitiveKind::Boolean => TsExpr::call("z.boolean", vec![]),
        PrimitiveKind::Date if v4 => TsExpr::call("z.iso.date", vec![]),
        PrimitiveKind::Date => string().method("date", vec![]),
        PrimitiveKind::DateTime if v4 => TsExpr::call("z.iso.datetime", vec![]),
        PrimitiveKind::DateTime => string().method("datetime", vec![]),
        PrimitiveKind::Time if v4 => TsExpr::call("z.iso.time", vec![]),
        PrimitiveKind::Time => string().method("time", vec![]),
        PrimitiveKind::Uuid if v4 => TsExpr::call("z.uuid", vec![]),
        PrimitiveKind::Uuid => string().method("uuid", vec![]),
        PrimitiveKind::Binary if v4 => TsExpr::call("z.base64", vec![]),
        PrimitiveKind::Binary => string(),
        PrimitiveKind::Unknown => TsExpr::call("z.unknown", vec![]),
    };

    if bound_of(primitive.kind).is_none() {
        return base;
    }
    let mut expr = base;
    if let Some(min) = primitive.min {
        expr = expr.method("min", vec![TsExpr::Literal(number_literal(min))]);
    }
    if let Some(max) = primitive.max {
        expr = expr.method("max", vec![TsExpr::Literal(number_literal(max))]);
    }
    expr
}

// =============================================================================
// TypeScript
// =============================================================================

/// Static type of a primitive kind.
pub fn ts_primitive(kind: PrimitiveKind) -> TsPrimitive {
    match kind {
        PrimitiveKind::String
        | PrimitiveKind::Date
        | PrimitiveKind::DateTime
        | PrimitiveKind::Time
        | PrimitiveKind::Uuid
        | PrimitiveKind::Binary => TsPrimitive::String,
        PrimitiveKind::Integer | PrimitiveKind::Number | PrimitiveKind::Decimal => {
            TsPrimitive::Number
        }
        PrimitiveKind::Boolean => TsPrimitive::Boolean,
        PrimitiveKind::Unknown => TsPrimitive::Unknown,
    }
}

// =============================================================================
// OpenAPI
// =============================================================================

/// OpenAPI `type`/`format` pair; `unknown` has neither and renders as `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenApiPrimitive {
    /// JSON Schema `type`; `None` leaves the schema unconstrained.
    pub schema_type: Option<&'static str>,
    /// JSON Schema `format` hint.
    pub format: Option<&'static str>,
}

/// OpenAPI `type` and `format` of a primitive kind.
pub fn openapi_primitive(kind: PrimitiveKind) -> OpenApiPrimitive {
    let (schema_type, format) = match kind {
        PrimitiveKind::String => (Some("string"), None),
        PrimitiveKind::Integer => (Some("integer"), None),
        PrimitiveKind::Number => (Some("number"), None),
        PrimitiveKind::Decimal => (Some("number"), Some("double")),
        PrimitiveKind::Boolean => (Some("boolean"), None),
        PrimitiveKind::Date => (Some("string"), Some("date")),
        PrimitiveKind::DateTime => (Some("string"), Some("date-time")),
        PrimitiveKind::Time => (Some("string"), Some("time")),
        PrimitiveKind::Uuid => (Some("string"), Some("uuid")),
        PrimitiveKind::Binary => (Some("string"), Some("binary")),
        PrimitiveKind::Unknown => (None, None),
    };
    OpenApiPrimitive {
        schema_type,
        format,
    }
}
