//! Target mappers and the contract they share.
//!
//! A [`Generator`] is what the registry hands out: a named, versioned target
//! that turns the ordered reachable surface into an [`Artifact`]. Every
//! built-in generator renders its named declarations through a [`Mapper`],
//! whose single [`Mapper::render_deferred`] hook receives every type that
//! TypeAnalysis marked as deferred; no mapper detects cycles on its own.
//!
//! ## Module Structure
//!
//! - `primitives`: primitive-kind tables for every target
//! - `zod`: runtime-validation module (Zod)
//! - `typescript`: static-types module
//! - `openapi`: OpenAPI 3.0 / 3.1 document
//! - `contract`: typed contract-surface module

pub mod contract;
pub mod openapi;
pub mod primitives;
pub mod typescript;
pub mod zod;

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::analysis::{DeferReason, Emission, SortedSurface};
use crate::error::GenerateError;
use crate::ir::{EnumDef, Field, FieldKind, Introspection, Shape, TypeDef, Union, Variant};
use crate::naming::KeyFormat;

use self::openapi::OpenApiDocument;

/// Serialised form of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// TypeScript source.
    TypeScript,
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl OutputFormat {
    /// Canonical name, also the file extension.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "ts",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Match a user-supplied format name, accepting common aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ts" | "typescript" => Some(Self::TypeScript),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated options a generator maps with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapOptions {
    /// Target version, already validated against the generator.
    pub version: &'static str,
    /// Property key format.
    pub key_format: KeyFormat,
}

/// What a generator produces before serialisation.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// Finished source text.
    Source(String),
    /// Structured document, serialised to JSON or YAML on demand.
    Document(Box<OpenApiDocument>),
}

impl Artifact {
    /// Serialise into `format`. `generator` only labels errors.
    pub fn render(&self, generator: &'static str, format: OutputFormat) -> Result<String, GenerateError> {
        let serialize_error = |message: String| GenerateError::Serialize { generator, message };
        match (self, format) {
            (Artifact::Source(text), _) => Ok(text.clone()),
            (Artifact::Document(document), OutputFormat::Json) => {
                let mut text = serde_json::to_string_pretty(document)
                    .map_err(|e| serialize_error(e.to_string()))?;
                text.push('\n');
                Ok(text)
            }
            (Artifact::Document(document), OutputFormat::Yaml) => {
                serde_yaml::to_string(document).map_err(|e| serialize_error(e.to_string()))
            }
            (Artifact::Document(_), OutputFormat::TypeScript) => Err(serialize_error(
                "documents serialise to json or yaml only".to_string(),
            )),
        }
    }
}

/// A named target the registry can run.
pub trait Generator: fmt::Debug + Send + Sync {
    /// Short name used to select the generator.
    fn name(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str;

    /// Accepted versions; the first is the default.
    fn versions(&self) -> &'static [&'static str];

    /// Accepted output formats; the first is the default.
    fn formats(&self) -> &'static [OutputFormat] {
        &[OutputFormat::TypeScript]
    }

    /// Map the ordered surface into an artifact. Options are already validated.
    fn map(
        &self,
        ir: &Introspection,
        surface: &SortedSurface<'_>,
        options: &MapOptions,
    ) -> Result<Artifact, GenerateError>;
}

/// Per-target rendering of named declarations.
pub trait Mapper {
    /// One rendered declaration (a target may emit several items per name).
    type Decl;

    /// Render a named enum.
    fn render_enum(&self, name: &str, def: &EnumDef) -> Self::Decl;

    /// Render a type that can be declared in place.
    fn render_type(&self, name: &str, def: &TypeDef) -> Self::Decl;

    /// Render a type TypeAnalysis marked as deferred, using the target's
    /// forward-reference-safe construct.
    fn render_deferred(&self, name: &str, def: &TypeDef, reason: DeferReason) -> Self::Decl;
}

/// Render every enum (by name) and then every type (in analysis order).
pub fn render_surface<'ir, M: Mapper>(
    mapper: &M,
    surface: &SortedSurface<'ir>,
) -> Vec<(&'ir str, M::Decl)> {
    let mut rendered = Vec::with_capacity(surface.enums.len() + surface.types.len());
    for (name, def) in &surface.enums {
        rendered.push((*name, mapper.render_enum(name, def)));
    }
    for ty in &surface.types {
        let decl = match ty.emission {
            Emission::Direct => mapper.render_type(ty.name, ty.def),
            Emission::Deferred(reason) => mapper.render_deferred(ty.name, ty.def, reason),
        };
        rendered.push((ty.name, decl));
    }
    rendered
}

/// Shape entries keyed by their rendered key, sorted by that key.
pub fn ordered_shape<'a>(shape: &'a Shape, key_format: KeyFormat) -> Vec<(String, &'a Field)> {
    let mut entries: Vec<(String, &Field)> = shape
        .iter()
        .map(|(key, field)| (key_format.apply(key), field))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

/// Reject any reachable shape whose keys collide once `key_format` is
/// applied, e.g. `created_at` and `createdAt` under `camel`.
pub fn check_key_collisions(
    ir: &Introspection,
    surface: &SortedSurface<'_>,
    key_format: KeyFormat,
) -> Result<(), GenerateError> {
    if key_format == KeyFormat::Keep {
        return Ok(());
    }
    for ty in &surface.types {
        match ty.def {
            TypeDef::Object(object) => check_shape(&object.shape, key_format, ty.name)?,
            TypeDef::Union(union) => check_union(&union.union, key_format, ty.name)?,
        }
    }
    for site in ir.actions() {
        let owner = |part: &str| format!("{}#{} {part}", site.resource_keys.join("."), site.name);
        let request = &site.action.request;
        check_shape(&request.query, key_format, &owner("request query"))?;
        check_shape(&request.body, key_format, &owner("request body"))?;
        if let Some(body) = site.action.response.rendered_body() {
            check_field(body, key_format, &owner("response body"))?;
        }
    }
    Ok(())
}

fn check_shape(shape: &Shape, key_format: KeyFormat, owner: &str) -> Result<(), GenerateError> {
    let mut seen: HashMap<String, &String> = HashMap::with_capacity(shape.len());
    for (key, field) in shape {
        let rendered = key_format.apply(key);
        if let Some(first) = seen.insert(rendered.clone(), key) {
            return Err(GenerateError::KeyCollision {
                key_format,
                owner: owner.to_string(),
                first: first.clone(),
                second: key.clone(),
                key: rendered,
            });
        }
        check_field(field, key_format, owner)?;
    }
    Ok(())
}

fn check_union(union: &Union, key_format: KeyFormat, owner: &str) -> Result<(), GenerateError> {
    union
        .variants
        .iter()
        .try_for_each(|variant| check_field(&variant.field, key_format, owner))
}

fn check_field(field: &Field, key_format: KeyFormat, owner: &str) -> Result<(), GenerateError> {
    match &field.kind {
        FieldKind::ArrayOf(element) => check_field(element, key_format, owner),
        FieldKind::Object(shape) => check_shape(shape, key_format, owner),
        FieldKind::UnionOf(union) => check_union(union, key_format, owner),
        FieldKind::Primitive(_) | FieldKind::Reference(_) | FieldKind::Literal(_) => Ok(()),
    }
}

/// Types that compose as plain objects: object types accepted by `admit`
/// whose every supertype does too, transitively. A type on an `extends`
/// cycle never qualifies.
pub fn object_chains<'ir>(
    surface: &SortedSurface<'ir>,
    admit: impl Fn(&str) -> bool,
) -> HashSet<&'ir str> {
    let mut memo = HashMap::new();
    for ty in &surface.types {
        object_chain(surface, ty.name, &admit, &mut memo);
    }
    memo.into_iter()
        .filter_map(|(name, composes)| composes.then_some(name))
        .collect()
}

fn object_chain<'ir>(
    surface: &SortedSurface<'ir>,
    name: &'ir str,
    admit: &impl Fn(&str) -> bool,
    memo: &mut HashMap<&'ir str, bool>,
) -> bool {
    if let Some(composes) = memo.get(name) {
        return *composes;
    }
    memo.insert(name, false);
    let composes = match surface.type_def(name) {
        Some(TypeDef::Object(object)) if admit(name) => object
            .extends
            .iter()
            .all(|parent| object_chain(surface, parent.as_str(), admit, memo)),
        _ => false,
    };
    memo.insert(name, composes);
    composes
}

/// Variant emission order.
///
/// Discriminated unions with every variant tagged are sorted by tag; other
/// unions keep declaration order, since their first matching variant wins.
pub fn ordered_variants(union: &Union) -> Vec<&Variant> {
    let mut variants: Vec<&Variant> = union.variants.iter().collect();
    if union.discriminator.is_some() && variants.iter().all(|v| v.tag.is_some()) {
        variants.sort_by(|a, b| a.tag.cmp(&b.tag));
    }
    variants
}

/// A discriminator literal to synthesise at a variant's reference site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Injection<'a> {
    /// IR name of the discriminator property.
    pub property: &'a str,
    /// Tag value to synthesise.
    pub tag: &'a str,
}

/// The literal a variant needs when its shape lacks the union's discriminator.
///
/// Applies to tagged variants of discriminated unions whose field is a
/// reference or an inline object. The referenced declaration is never
/// touched; mappers compose the literal in at the use site.
pub fn discriminator_injection<'a>(
    surface: &SortedSurface<'_>,
    union: &'a Union,
    variant: &'a Variant,
) -> Option<Injection<'a>> {
    let property = union.discriminator.as_deref()?;
    let tag = variant.tag.as_deref()?;
    let declared = match &variant.field.kind {
        FieldKind::Reference(name) => type_declares(surface, name, property, &mut HashSet::new()),
        FieldKind::Object(shape) => declares_tag(shape, property),
        FieldKind::Primitive(_)
        | FieldKind::ArrayOf(_)
        | FieldKind::UnionOf(_)
        | FieldKind::Literal(_) => return None,
    };
    (!declared).then_some(Injection { property, tag })
}

/// Whether the named type declares `property` as a tag itself or through a
/// supertype. A union declares it when every variant does.
fn type_declares<'ir>(
    surface: &SortedSurface<'ir>,
    name: &str,
    property: &str,
    visiting: &mut HashSet<String>,
) -> bool {
    if !visiting.insert(name.to_string()) {
        return false;
    }
    let Some(def) = surface.type_def(name) else {
        return false;
    };
    match def {
        TypeDef::Object(object) => {
            declares_tag(&object.shape, property)
                || object
                    .extends
                    .iter()
                    .any(|parent| type_declares(surface, parent, property, visiting))
        }
        TypeDef::Union(union) => {
            !union.union.variants.is_empty()
                && union.union.variants.iter().all(|variant| match &variant.field.kind {
                    FieldKind::Reference(target) => {
                        type_declares(surface, target, property, &mut visiting.clone())
                    }
                    FieldKind::Object(shape) => declares_tag(shape, property),
                    _ => false,
                })
        }
    }
}

/// A shape carries the tag only when the property is a required,
/// non-nullable literal or enum; a plain `string` cannot discriminate.
fn declares_tag(shape: &Shape, property: &str) -> bool {
    shape.get(property).is_some_and(|field| {
        !field.optional
            && !field.nullable
            && (matches!(field.kind, FieldKind::Literal(_)) || field.enum_attr.is_some())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::analysis::sort;
    use crate::surface::resolve;

    const IR: &str = r#"{
        "resources": { "feed": { "actions": { "index": {
            "response": { "body": { "type": "reference", "to": "entry" } }
        } } } },
        "types": {
            "entry": { "type": "union", "discriminator": "kind", "variants": [
                { "tag": "note", "type": "object", "shape": { "text": { "type": "string" } } },
                { "tag": "invoice", "type": "reference", "to": "invoice" },
                { "tag": "payment", "type": "reference", "to": "payment" }
            ] },
            "invoice": { "type": "object", "shape": { "number": { "type": "string" } } },
            "base_payment": { "type": "object", "shape": { "kind": { "type": "literal", "value": "payment" } } },
            "payment": { "type": "object", "extends": ["base_payment"], "shape": {} }
        }
    }"#;

    #[test]
    fn test_injection_only_where_discriminator_is_missing() {
        let ir = Introspection::from_json(IR).unwrap();
        let surface = resolve(&ir).unwrap();
        let sorted = sort(&surface);
        let TypeDef::Union(entry) = &ir.types["entry"] else {
            panic!("expected union");
        };
        let union = &entry.union;

        let injected: Vec<_> = union
            .variants
            .iter()
            .map(|v| discriminator_injection(&sorted, union, v).map(|i| i.tag))
            .collect();
        assert_eq!(injected, vec![Some("note"), Some("invoice"), None]);
    }

    #[test]
    fn test_only_literal_or_enum_keys_count_as_declared() {
        let ir = Introspection::from_json(
            r#"{
                "resources": { "feed": { "actions": { "index": {
                    "response": { "body": { "type": "reference", "to": "entry" } }
                } } } },
                "types": {
                    "entry": { "type": "union", "discriminator": "kind", "variants": [
                        { "tag": "plain", "type": "reference", "to": "plain" },
                        { "tag": "listed", "type": "reference", "to": "listed" },
                        { "tag": "loose", "type": "object", "shape": {
                            "kind": { "type": "literal", "value": "loose", "optional": true }
                        } }
                    ] },
                    "plain": { "type": "object", "shape": { "kind": { "type": "string" } } },
                    "listed": { "type": "object", "shape": { "kind": { "type": "string", "enum": ["listed"] } } }
                }
            }"#,
        )
        .unwrap();
        let surface = resolve(&ir).unwrap();
        let sorted = sort(&surface);
        let TypeDef::Union(entry) = &ir.types["entry"] else {
            panic!("expected union");
        };
        let union = &entry.union;

        let injected: Vec<_> = union
            .variants
            .iter()
            .map(|v| discriminator_injection(&sorted, union, v).map(|i| i.tag))
            .collect();
        assert_eq!(injected, vec![Some("plain"), None, Some("loose")]);
    }

    #[test]
    fn test_key_collisions_are_reported_with_owner() {
        let ir = Introspection::from_json(
            r#"{
                "resources": { "things": { "actions": {
                    "show": { "response": { "body": { "type": "reference", "to": "thing" } } },
                    "search": { "request": { "query": { "page-size": { "type": "integer" } } } }
                } } },
                "types": { "thing": { "type": "object", "shape": {
                    "meta": { "type": "object", "shape": {
                        "created_at": { "type": "datetime" },
                        "createdAt": { "type": "integer" }
                    } }
                } } }
            }"#,
        )
        .unwrap();
        let surface = resolve(&ir).unwrap();
        let sorted = sort(&surface);

        check_key_collisions(&ir, &sorted, KeyFormat::Keep).unwrap();

        let err = check_key_collisions(&ir, &sorted, KeyFormat::Camel).unwrap_err();
        assert_eq!(
            err.to_string(),
            "key format 'camel' maps both 'created_at' and 'createdAt' in thing to 'createdAt'"
        );
        let err = check_key_collisions(&ir, &sorted, KeyFormat::Kebab).unwrap_err();
        assert!(err.to_string().ends_with("to 'created-at'"), "{err}");
    }

    #[test]
    fn test_discriminated_variants_sort_by_tag() {
        let ir = Introspection::from_json(IR).unwrap();
        let TypeDef::Union(entry) = &ir.types["entry"] else {
            panic!("expected union");
        };
        let tags: Vec<_> = ordered_variants(&entry.union)
            .iter()
            .map(|v| v.tag.as_deref().unwrap())
            .collect();
        assert_eq!(tags, vec!["invoice", "note", "payment"]);
    }

    #[test]
    fn test_ordered_shape_sorts_rendered_keys() {
        let shape: Shape = serde_json::from_str(
            r#"{ "b": { "type": "string" }, "a": { "type": "integer" }, "created_at": { "type": "datetime" } }"#,
        )
        .unwrap();
        let keys: Vec<_> = ordered_shape(&shape, KeyFormat::Camel)
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["a", "b", "createdAt"]);
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::from_name("YML"), Some(OutputFormat::Yaml));
        assert_eq!(OutputFormat::from_name("typescript"), Some(OutputFormat::TypeScript));
        assert_eq!(OutputFormat::from_name("xml"), None);
    }
}
