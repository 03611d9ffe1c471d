//! Static-types module: TypeScript interfaces and type aliases only.
//!
//! Every declaration (enums, types, per-action request/response types) is
//! sorted alphabetically by declared name. Interfaces are already
//! forward-reference safe, so deferred types differ only in always being
//! declared as interfaces rather than aliases.

use std::collections::HashSet;

use tracing::debug;

use crate::analysis::{DeferReason, SortedSurface};
use crate::error::GenerateError;
use crate::ir::{
    ActionSite, EnumAttr, EnumDef, Field, FieldKind, Introspection, ObjectType, Shape, TypeDef,
    Union, Variant, sorted_values,
};
use crate::naming::{ActionSuffix, KeyFormat, action_type_name, type_name};
use crate::ts::utils::literal_from_value;
use crate::ts::{
    Emit, JsDoc, TsItem, TsLiteral, TsModule, TsPrimitive, TsProp, TsType, TsTypeDef, TypeDefKind,
};

use super::primitives::ts_primitive;
use super::{
    Artifact, Generator, MapOptions, Mapper, discriminator_injection, object_chains,
    ordered_shape, ordered_variants, render_surface,
};

/// Generator for the static-types module.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptGenerator;

impl Generator for TypeScriptGenerator {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn description(&self) -> &'static str {
        "TypeScript interfaces and type aliases"
    }

    fn versions(&self) -> &'static [&'static str] {
        &["5"]
    }

    fn map(
        &self,
        ir: &Introspection,
        surface: &SortedSurface<'_>,
        options: &MapOptions,
    ) -> Result<Artifact, GenerateError> {
        let mapper = TypeScriptMapper::new(surface, options.key_format);

        let mut items: Vec<TsItem> = render_surface(&mapper, surface)
            .into_iter()
            .map(|(_, decl)| TsItem::Type(decl))
            .collect();
        for site in ir.actions() {
            items.extend(mapper.action_declarations(&site).into_iter().map(TsItem::Type));
        }
        items.sort_by(|a, b| a.name().cmp(b.name()));

        debug!(declarations = items.len(), "Rendered TypeScript declarations.");
        let module = TsModule {
            imports: Vec::new(),
            items,
        };
        Ok(Artifact::Source(module.emit()))
    }
}

/// Renders IR fields and declarations as TypeScript types.
#[derive(Debug, Clone)]
pub struct TypeScriptMapper<'a, 'ir> {
    surface: &'a SortedSurface<'ir>,
    key_format: KeyFormat,
    /// Types an interface may extend: no union anywhere up their chain.
    extendable: HashSet<&'ir str>,
}

impl<'a, 'ir> TypeScriptMapper<'a, 'ir> {
    /// Mapper over `surface`, rendering keys with `key_format`.
    pub fn new(surface: &'a SortedSurface<'ir>, key_format: KeyFormat) -> Self {
        Self {
            surface,
            key_format,
            extendable: object_chains(surface, |_| true),
        }
    }

    /// Type of a field, `| null` included; optionality belongs to the property.
    pub fn field_type(&self, field: &Field) -> TsType {
        let ty = self.kind_type(field);
        if field.nullable { ty.or_null() } else { ty }
    }

    fn kind_type(&self, field: &Field) -> TsType {
        match &field.kind {
            FieldKind::Primitive(primitive) => match &field.enum_attr {
                Some(EnumAttr::Inline(values)) => literal_union(values),
                Some(EnumAttr::Named(name)) => TsType::named(type_name(name)),
                None => TsType::Primitive(ts_primitive(primitive.kind)),
            },
            FieldKind::Reference(name) => TsType::named(type_name(name)),
            FieldKind::ArrayOf(element) => TsType::Array(Box::new(self.field_type(element))),
            FieldKind::Object(shape) => TsType::Object(self.props(shape)),
            FieldKind::UnionOf(union) => self.union_type(union),
            FieldKind::Literal(value) => match literal_from_value(value) {
                Some(TsLiteral::Null) => TsType::Primitive(TsPrimitive::Null),
                Some(literal) => TsType::Literal(literal),
                None => TsType::Primitive(TsPrimitive::Unknown),
            },
        }
    }

    /// Properties of a shape, sorted by rendered key.
    pub fn props(&self, shape: &Shape) -> Vec<TsProp> {
        ordered_shape(shape, self.key_format)
            .into_iter()
            .map(|(name, field)| TsProp {
                name,
                ty: self.field_type(field),
                optional: field.optional,
                doc: JsDoc::new(field.description.as_deref(), field.deprecated),
            })
            .collect()
    }

    fn union_type(&self, union: &Union) -> TsType {
        let mut members: Vec<TsType> = ordered_variants(union)
            .into_iter()
            .map(|variant| self.variant_type(union, variant))
            .collect();
        match members.len() {
            0 => TsType::Primitive(TsPrimitive::Never),
            1 => members.remove(0),
            _ => TsType::Union(members),
        }
    }

    fn variant_type(&self, union: &Union, variant: &Variant) -> TsType {
        let Some(injection) = discriminator_injection(self.surface, union, variant) else {
            return self.field_type(&variant.field);
        };
        let tag = TsProp {
            name: self.key_format.apply(injection.property),
            ty: TsType::Literal(TsLiteral::String(injection.tag.to_string())),
            optional: false,
            doc: JsDoc::default(),
        };
        let ty = match &variant.field.kind {
            FieldKind::Object(shape) => {
                let mut props = self.props(shape);
                props.retain(|prop| prop.name != tag.name);
                props.push(tag);
                props.sort_by(|a, b| a.name.cmp(&b.name));
                TsType::Object(props)
            }
            _ => TsType::Intersection(vec![self.kind_type(&variant.field), TsType::Object(vec![tag])]),
        };
        if variant.field.nullable { ty.or_null() } else { ty }
    }

    /// Declaration for a named type; `interface_only` keeps even an empty
    /// own shape as an interface.
    pub fn declaration(&self, name: &str, def: &TypeDef, interface_only: bool) -> TsTypeDef {
        let kind = match def {
            TypeDef::Object(object) => self.object_kind(object, interface_only),
            TypeDef::Union(union) => TypeDefKind::TypeAlias {
                ty: self.union_type(&union.union),
            },
        };
        TsTypeDef {
            name: type_name(name),
            doc: JsDoc::new(def.description(), false),
            kind,
        }
    }

    fn object_kind(&self, object: &ObjectType, interface_only: bool) -> TypeDefKind {
        let properties = self.props(&object.shape);
        let parents: Vec<String> = object.extends.iter().map(|p| type_name(p)).collect();

        // Interfaces can only extend object types.
        let extends_unions = object
            .extends
            .iter()
            .any(|parent| !self.extendable.contains(parent.as_str()));
        if extends_unions {
            let mut parts: Vec<TsType> = parents.into_iter().map(TsType::Ref).collect();
            if !properties.is_empty() {
                parts.push(TsType::Object(properties));
            }
            return TypeDefKind::TypeAlias {
                ty: TsType::Intersection(parts),
            };
        }

        if properties.is_empty() && !parents.is_empty() && !interface_only {
            let ty = match parents.as_slice() {
                [single] => TsType::named(single.clone()),
                _ => TsType::Intersection(parents.into_iter().map(TsType::Ref).collect()),
            };
            return TypeDefKind::TypeAlias { ty };
        }

        TypeDefKind::Interface {
            extends: parents,
            properties,
        }
    }

    /// RequestQuery, RequestBody, Request, ResponseBody and Response types.
    pub fn action_declarations(&self, site: &ActionSite<'_>) -> Vec<TsTypeDef> {
        let action = site.action;
        let doc = JsDoc::new(
            action.summary.as_deref().or(action.description.as_deref()),
            action.deprecated,
        );
        let declare = |suffix: ActionSuffix, kind: TypeDefKind| TsTypeDef {
            name: action_type_name(site, suffix),
            doc: doc.clone(),
            kind,
        };
        let member = |name: &str, suffix: ActionSuffix| TsProp {
            name: name.to_string(),
            ty: TsType::named(action_type_name(site, suffix)),
            optional: false,
            doc: JsDoc::default(),
        };

        let mut decls = Vec::new();
        let mut request = Vec::new();
        if !action.request.query.is_empty() {
            decls.push(declare(
                ActionSuffix::RequestQuery,
                TypeDefKind::Interface {
                    extends: Vec::new(),
                    properties: self.props(&action.request.query),
                },
            ));
            request.push(member("query", ActionSuffix::RequestQuery));
        }
        if !action.request.body.is_empty() {
            decls.push(declare(
                ActionSuffix::RequestBody,
                TypeDefKind::Interface {
                    extends: Vec::new(),
                    properties: self.props(&action.request.body),
                },
            ));
            request.push(member("body", ActionSuffix::RequestBody));
        }
        if !request.is_empty() {
            decls.push(declare(
                ActionSuffix::Request,
                TypeDefKind::Interface {
                    extends: Vec::new(),
                    properties: request,
                },
            ));
        }

        match action.response.rendered_body() {
            Some(body) => {
                decls.push(declare(
                    ActionSuffix::ResponseBody,
                    TypeDefKind::TypeAlias {
                        ty: self.field_type(body),
                    },
                ));
                decls.push(declare(
                    ActionSuffix::Response,
                    TypeDefKind::Interface {
                        extends: Vec::new(),
                        properties: vec![member("body", ActionSuffix::ResponseBody)],
                    },
                ));
            }
            None => decls.push(declare(
                ActionSuffix::Response,
                TypeDefKind::TypeAlias {
                    ty: TsType::Primitive(TsPrimitive::Never),
                },
            )),
        }
        decls
    }
}

impl Mapper for TypeScriptMapper<'_, '_> {
    type Decl = TsTypeDef;

    fn render_enum(&self, name: &str, def: &EnumDef) -> TsTypeDef {
        TsTypeDef {
            name: type_name(name),
            doc: JsDoc::new(def.description.as_deref(), def.deprecated),
            kind: TypeDefKind::TypeAlias {
                ty: literal_union(&def.values),
            },
        }
    }

    fn render_type(&self, name: &str, def: &TypeDef) -> TsTypeDef {
        self.declaration(name, def, false)
    }

    fn render_deferred(&self, name: &str, def: &TypeDef, _reason: DeferReason) -> TsTypeDef {
        self.declaration(name, def, true)
    }
}

/// Sorted string-literal union for an enum value set.
fn literal_union(values: &[String]) -> TsType {
    let mut members: Vec<TsType> = sorted_values(values)
        .into_iter()
        .map(|value| TsType::Literal(TsLiteral::String(value.to_string())))
        .collect();
    match members.len() {
        0 => TsType::Primitive(TsPrimitive::Never),
        1 => members.remove(0),
        _ => TsType::Union(members),
    }
}
