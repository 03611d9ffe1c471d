//! Field, named type and named enum model.
//!
//! A [`Field`] is a closed sum over the shapes an action or type can mention.
//! Every consumer matches on [`FieldKind`] exhaustively, so adding a kind is a
//! compile error in each mapper rather than a silent fallthrough.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Ordered mapping of field name to field, in declaration order.
pub type Shape = IndexMap<String, Field>;

/// A single field of an object shape, request, or response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawField")]
pub struct Field {
    /// What the field holds.
    pub kind: FieldKind,
    /// Allows `null` as a value.
    pub nullable: bool,
    /// May be absent from the enclosing shape.
    pub optional: bool,
    /// Enum attribute, either inline values or a named-enum reference.
    pub enum_attr: Option<EnumAttr>,
    /// Documentation text.
    pub description: Option<String>,
    /// Marked as deprecated.
    pub deprecated: bool,
    /// Example value, copied into OpenAPI output.
    pub example: Option<Value>,
}

/// The shape carried by a [`Field`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Scalar with optional format and bounds.
    Primitive(Primitive),
    /// Reference to a named type.
    Reference(String),
    /// Homogeneous array.
    ArrayOf(Box<Field>),
    /// Inline object shape.
    Object(Shape),
    /// Inline union.
    UnionOf(Union),
    /// Single constant value.
    Literal(Value),
}

/// A primitive with optional format hint and bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    /// Primitive kind.
    pub kind: PrimitiveKind,
    /// Free-form format hint such as `email` or `uri`.
    pub format: Option<String>,
    /// Lower bound: value for numbers, length for strings.
    pub min: Option<f64>,
    /// Upper bound, same rules as `min`.
    pub max: Option<f64>,
}

/// Built-in primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Text.
    String,
    /// Whole number.
    Integer,
    /// Floating-point number.
    Number,
    /// Arbitrary-precision number, carried as a string.
    Decimal,
    /// `true` or `false`.
    Boolean,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// RFC 3339 timestamp.
    DateTime,
    /// Time of day.
    Time,
    /// UUID string.
    Uuid,
    /// Base64 payload.
    Binary,
    /// Anything; also the fallback for unrecognised kinds.
    Unknown,
}

impl PrimitiveKind {
    /// Every primitive kind, in table order.
    pub const ALL: [Self; 11] = [
        Self::String,
        Self::Integer,
        Self::Number,
        Self::Decimal,
        Self::Boolean,
        Self::Date,
        Self::DateTime,
        Self::Time,
        Self::Uuid,
        Self::Binary,
        Self::Unknown,
    ];

    /// Look up a primitive kind by its IR name.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "string" => Self::String,
            "integer" => Self::Integer,
            "number" | "float" => Self::Number,
            "decimal" => Self::Decimal,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "time" => Self::Time,
            "uuid" => Self::Uuid,
            "binary" => Self::Binary,
            "unknown" => Self::Unknown,
            _ => return None,
        };
        Some(kind)
    }

    /// IR spelling of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Uuid => "uuid",
            Self::Binary => "binary",
            Self::Unknown => "unknown",
        }
    }
}

/// Enum attribute on a field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnumAttr {
    /// Inline literal value list.
    Inline(Vec<String>),
    /// Reference to a named enum.
    Named(String),
}

/// A union: optional discriminator plus ordered variants.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Union {
    /// Property whose literal value selects a variant.
    #[serde(default)]
    pub discriminator: Option<String>,
    /// Alternatives, in declaration order.
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// One tagged alternative of a union.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Variant {
    /// Discriminator value selecting this variant.
    #[serde(default)]
    pub tag: Option<String>,
    /// Payload field of this variant.
    #[serde(flatten)]
    pub field: Field,
}

/// A named type declared in the IR.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypeDef {
    /// Object shape with optional supertypes.
    Object(ObjectType),
    /// Named union.
    Union(UnionType),
}

impl TypeDef {
    /// Documentation text of the type.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Object(object) => object.description.as_deref(),
            Self::Union(union) => union.description.as_deref(),
        }
    }
}

/// Named object type.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ObjectType {
    /// Own properties, not including those of `extends`.
    #[serde(default)]
    pub shape: Shape,
    /// Supertype names, in declaration order.
    #[serde(default)]
    pub extends: Vec<String>,
    /// Documentation text.
    #[serde(default)]
    pub description: Option<String>,
}

/// Named union type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnionType {
    /// Discriminator and variants.
    #[serde(flatten)]
    pub union: Union,
    /// Documentation text.
    #[serde(default)]
    pub description: Option<String>,
}

/// Named enum: ordered string values plus documentation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct EnumDef {
    /// Declared values; duplicates are dropped on emission.
    pub values: Vec<String>,
    /// Documentation text.
    #[serde(default)]
    pub description: Option<String>,
    /// Marked as deprecated.
    #[serde(default)]
    pub deprecated: bool,
}

impl EnumDef {
    /// Values in emission order.
    pub fn sorted_values(&self) -> Vec<&str> {
        sorted_values(&self.values)
    }
}

/// Sort and deduplicate enum values for emission.
pub fn sorted_values(values: &[String]) -> Vec<&str> {
    let mut sorted: Vec<&str> = values.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

impl Field {
    /// A required, non-nullable field of the given kind.
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            nullable: false,
            optional: false,
            enum_attr: None,
            description: None,
            deprecated: false,
            example: None,
        }
    }

    /// A required field of a bare primitive kind.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(FieldKind::Primitive(Primitive {
            kind,
            format: None,
            min: None,
            max: None,
        }))
    }

    /// A required reference to a named type.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(FieldKind::Reference(name.into()))
    }

    /// A required array of `element`.
    pub fn array_of(element: Self) -> Self {
        Self::new(FieldKind::ArrayOf(Box::new(element)))
    }

    /// A required constant.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(FieldKind::Literal(value.into()))
    }

    /// Mark as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Reason a field document could not be turned into a [`Field`].
#[derive(Debug, thiserror::Error)]
#[error("invalid `{kind}` field: {reason}")]
pub struct InvalidField {
    /// The field's `type` value.
    pub kind: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

/// Wire form of a field, flattened over every kind's keys.
#[derive(Debug, Deserialize)]
struct RawField {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    nullable: bool,
    #[serde(default)]
    optional: bool,
    #[serde(default, rename = "enum")]
    enum_attr: Option<EnumAttr>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    deprecated: bool,
    #[serde(default)]
    example: Option<Value>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    of: Option<Box<Field>>,
    #[serde(default)]
    shape: Option<Shape>,
    #[serde(default)]
    discriminator: Option<String>,
    #[serde(default)]
    variants: Option<Vec<Variant>>,
    #[serde(default)]
    value: Option<Value>,
}

impl TryFrom<RawField> for Field {
    type Error = InvalidField;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        let invalid = |reason| InvalidField {
            kind: raw.kind.clone(),
            reason,
        };

        let kind = match raw.kind.as_str() {
            "reference" => {
                FieldKind::Reference(raw.to.clone().ok_or_else(|| invalid("missing `to`"))?)
            }
            "array" => FieldKind::ArrayOf(raw.of.ok_or_else(|| invalid("missing `of`"))?),
            "object" => FieldKind::Object(raw.shape.unwrap_or_default()),
            "union" => FieldKind::UnionOf(Union {
                discriminator: raw.discriminator,
                variants: raw.variants.ok_or_else(|| invalid("missing `variants`"))?,
            }),
            "literal" => FieldKind::Literal(raw.value.unwrap_or(Value::Null)),
            other => FieldKind::Primitive(Primitive {
                // Unrecognised kinds degrade to `unknown`.
                kind: PrimitiveKind::from_name(other).unwrap_or(PrimitiveKind::Unknown),
                format: raw.format,
                min: raw.min,
                max: raw.max,
            }),
        };

        Ok(Self {
            kind,
            nullable: raw.nullable,
            optional: raw.optional,
            enum_attr: raw.enum_attr,
            description: raw.description,
            deprecated: raw.deprecated,
            example: raw.example,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_modifiers_parse() {
        let field: Field = serde_json::from_str(
            r#"{ "type": "string", "nullable": true, "optional": true, "min": 1, "max": 40 }"#,
        )
        .unwrap();
        assert!(field.nullable);
        assert!(field.optional);
        let FieldKind::Primitive(primitive) = field.kind else {
            panic!("expected primitive");
        };
        assert_eq!(primitive.kind, PrimitiveKind::String);
        assert_eq!(primitive.min, Some(1.0));
        assert_eq!(primitive.max, Some(40.0));
    }

    #[test]
    fn test_unknown_kind_degrades_to_unknown() {
        let field: Field = serde_json::from_str(r#"{ "type": "geometry" }"#).unwrap();
        assert!(matches!(
            field.kind,
            FieldKind::Primitive(Primitive {
                kind: PrimitiveKind::Unknown,
                ..
            })
        ));
    }

    #[test]
    fn test_reference_requires_target() {
        let err = serde_json::from_str::<Field>(r#"{ "type": "reference" }"#).unwrap_err();
        assert!(err.to_string().contains("missing `to`"), "{err}");
    }

    #[test]
    fn test_enum_attr_inline_and_named() {
        let inline: Field =
            serde_json::from_str(r#"{ "type": "string", "enum": ["b", "a"] }"#).unwrap();
        assert_eq!(
            inline.enum_attr,
            Some(EnumAttr::Inline(vec!["b".into(), "a".into()]))
        );

        let named: Field =
            serde_json::from_str(r#"{ "type": "string", "enum": "invoice_status" }"#).unwrap();
        assert_eq!(named.enum_attr, Some(EnumAttr::Named("invoice_status".into())));
    }

    #[test]
    fn test_union_variants_carry_tags() {
        let field: Field = serde_json::from_str(
            r#"{
                "type": "union",
                "discriminator": "kind",
                "variants": [
                    { "tag": "invoice", "type": "reference", "to": "invoice" },
                    { "tag": "note", "type": "object", "shape": { "text": { "type": "string" } } }
                ]
            }"#,
        )
        .unwrap();
        let FieldKind::UnionOf(union) = field.kind else {
            panic!("expected union");
        };
        assert_eq!(union.discriminator.as_deref(), Some("kind"));
        assert_eq!(union.variants[0].tag.as_deref(), Some("invoice"));
        assert_eq!(union.variants[0].field, Field::reference("invoice"));
        assert!(matches!(union.variants[1].field.kind, FieldKind::Object(_)));
    }

    #[test]
    fn test_named_type_parse() {
        let def: TypeDef = serde_json::from_str(
            r#"{ "type": "object", "extends": ["base"], "shape": { "b": { "type": "string" }, "a": { "type": "integer" } } }"#,
        )
        .unwrap();
        let TypeDef::Object(object) = def else {
            panic!("expected object");
        };
        assert_eq!(object.extends, vec!["base".to_string()]);
        let keys: Vec<_> = object.shape.keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"], "declaration order is preserved");
    }

    #[test]
    fn test_sorted_values() {
        let def = EnumDef {
            values: vec!["sent".into(), "draft".into(), "paid".into(), "draft".into()],
            ..EnumDef::default()
        };
        assert_eq!(def.sorted_values(), vec!["draft", "paid", "sent"]);
    }
}
