//! Runtime-validation module: Zod schemas plus inferred types.
//!
//! Output layout: the `zod` import, one schema per enum (sorted by name), one
//! per named type (analysis order), then the per-action request/response
//! schemas in resource-tree order. Deferred types are declared through
//! `z.lazy` with an explicit `z.ZodType<T>` annotation and a companion
//! TypeScript declaration, since `z.infer` cannot see through the cycle.

use std::collections::HashSet;

use tracing::debug;

use crate::analysis::{DeferReason, SortedSurface};
use crate::error::GenerateError;
use crate::ir::{
    ActionSite, EnumAttr, EnumDef, Field, FieldKind, Introspection, ObjectType, Shape, TypeDef,
    Union, Variant, sorted_values,
};
use crate::naming::{
    ActionSuffix, KeyFormat, action_schema_name, action_type_name, schema_name, type_name,
};
use crate::ts::utils::literal_from_value;
use crate::ts::{
    Emit, JsDoc, TsConst, TsExpr, TsImport, TsItem, TsLiteral, TsModule, TsType, TsTypeDef, TypeDefKind,
};

use super::primitives::{ZodVersion, zod_primitive};
use super::typescript::TypeScriptMapper;
use super::{
    Artifact, Generator, MapOptions, Mapper, discriminator_injection, object_chains,
    ordered_shape, ordered_variants, render_surface,
};

/// Generator for the Zod runtime-validation module.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZodGenerator;

impl Generator for ZodGenerator {
    fn name(&self) -> &'static str {
        "zod"
    }

    fn description(&self) -> &'static str {
        "Zod schemas with inferred TypeScript types"
    }

    fn versions(&self) -> &'static [&'static str] {
        ZodVersion::SUPPORTED
    }

    fn map(
        &self,
        ir: &Introspection,
        surface: &SortedSurface<'_>,
        options: &MapOptions,
    ) -> Result<Artifact, GenerateError> {
        let mapper = ZodMapper::new(surface, options);
        let mut module = mapper.module();
        for site in ir.actions() {
            module.items.extend(mapper.action_declarations(&site));
        }
        debug!(
            version = options.version,
            declarations = module.items.len(),
            "Rendered Zod module."
        );
        Ok(Artifact::Source(module.emit()))
    }
}

/// Renders IR fields and declarations as Zod schema expressions.
#[derive(Debug, Clone)]
pub struct ZodMapper<'a, 'ir> {
    surface: &'a SortedSurface<'ir>,
    version: ZodVersion,
    key_format: KeyFormat,
    /// Types rendered as plain `z.object` schemas.
    objects: HashSet<&'ir str>,
    companion: TypeScriptMapper<'a, 'ir>,
}

impl<'a, 'ir> ZodMapper<'a, 'ir> {
    /// Mapper over `surface` with validated options.
    pub fn new(surface: &'a SortedSurface<'ir>, options: &MapOptions) -> Self {
        Self {
            surface,
            version: ZodVersion::from_version(options.version),
            key_format: options.key_format,
            objects: object_chains(surface, |name| !surface.is_deferred(name)),
            companion: TypeScriptMapper::new(surface, options.key_format),
        }
    }

    /// The `zod` import plus every enum and type declaration.
    pub fn module(&self) -> TsModule {
        let items = render_surface(self, self.surface)
            .into_iter()
            .flat_map(|(_, decl)| decl)
            .collect();
        TsModule {
            imports: vec![TsImport::named("z", "zod")],
            items,
        }
    }

    /// Schema for a field, with `.nullable()` then `.optional()` applied.
    pub fn field(&self, field: &Field) -> TsExpr {
        let mut expr = self.kind(field);
        if field.nullable {
            expr = expr.method("nullable", vec![]);
        }
        if field.optional {
            expr = expr.method("optional", vec![]);
        }
        expr
    }

    fn kind(&self, field: &Field) -> TsExpr {
        match &field.kind {
            FieldKind::Primitive(primitive) => match &field.enum_attr {
                Some(EnumAttr::Inline(values)) => enum_schema(values),
                Some(EnumAttr::Named(name)) => TsExpr::ident(schema_name(name)),
                None => zod_primitive(primitive, self.version),
            },
            FieldKind::Reference(name) => TsExpr::ident(schema_name(name)),
            FieldKind::ArrayOf(element) => TsExpr::call("z.array", vec![self.field(element)]),
            FieldKind::Object(shape) => self.object(shape),
            FieldKind::UnionOf(union) => self.union(union),
            FieldKind::Literal(value) => literal_schema(value),
        }
    }

    /// `z.object({...})` with keys sorted.
    pub fn object(&self, shape: &Shape) -> TsExpr {
        TsExpr::call("z.object", vec![TsExpr::Object(self.entries(shape))])
    }

    fn entries(&self, shape: &Shape) -> Vec<(String, TsExpr)> {
        ordered_shape(shape, self.key_format)
            .into_iter()
            .map(|(key, field)| (key, self.field(field)))
            .collect()
    }

    /// Whether the named type renders as a plain Zod object schema, i.e.
    /// supports `.extend`/`.merge`. Lazy schemas and intersections do not.
    fn is_object_schema(&self, name: &str) -> bool {
        self.objects.contains(name)
    }

    fn union(&self, union: &Union) -> TsExpr {
        let mut all_objects = true;
        let mut members: Vec<TsExpr> = Vec::with_capacity(union.variants.len());
        for variant in ordered_variants(union) {
            let (expr, is_object) = self.variant(union, variant);
            all_objects &= is_object;
            members.push(expr);
        }

        match (members.len(), union.discriminator.as_deref()) {
            (0, _) => TsExpr::call("z.never", vec![]),
            (1, _) => members.remove(0),
            (_, Some(discriminator)) if all_objects => TsExpr::call(
                "z.discriminatedUnion",
                vec![
                    TsExpr::string(self.key_format.apply(discriminator)),
                    TsExpr::Array(members),
                ],
            ),
            _ => TsExpr::call("z.union", vec![TsExpr::Array(members)]),
        }
    }

    /// A variant's schema and whether it is an object schema.
    fn variant(&self, union: &Union, variant: &Variant) -> (TsExpr, bool) {
        let field = &variant.field;
        let modified = field.nullable || field.optional;

        let Some(injection) = discriminator_injection(self.surface, union, variant) else {
            let is_object = !modified
                && match &field.kind {
                    FieldKind::Object(_) => true,
                    FieldKind::Reference(name) => self.is_object_schema(name),
                    _ => false,
                };
            return (self.field(field), is_object);
        };

        let key = self.key_format.apply(injection.property);
        let literal = TsExpr::call("z.literal", vec![TsExpr::string(injection.tag)]);
        let (mut expr, is_object) = match &field.kind {
            FieldKind::Object(shape) => {
                let mut entries = self.entries(shape);
                entries.retain(|(existing, _)| *existing != key);
                entries.push((key, literal));
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                (TsExpr::call("z.object", vec![TsExpr::Object(entries)]), true)
            }
            FieldKind::Reference(name) if self.is_object_schema(name) => (
                TsExpr::ident(schema_name(name))
                    .method("extend", vec![TsExpr::Object(vec![(key, literal)])]),
                true,
            ),
            _ => (
                TsExpr::call(
                    "z.intersection",
                    vec![
                        self.kind(field),
                        TsExpr::call("z.object", vec![TsExpr::Object(vec![(key, literal)])]),
                    ],
                ),
                false,
            ),
        };
        if field.nullable {
            expr = expr.method("nullable", vec![]);
        }
        if field.optional {
            expr = expr.method("optional", vec![]);
        }
        (expr, is_object && !modified)
    }

    /// Schema expression for a named type's definition.
    fn definition(&self, def: &TypeDef) -> TsExpr {
        match def {
            TypeDef::Object(object) => self.object_type(object),
            TypeDef::Union(union) => self.union(&union.union),
        }
    }

    fn object_type(&self, object: &ObjectType) -> TsExpr {
        let own = self.entries(&object.shape);
        let Some((first, rest)) = object.extends.split_first() else {
            return TsExpr::call("z.object", vec![TsExpr::Object(own)]);
        };

        if object.extends.iter().all(|parent| self.is_object_schema(parent)) {
            let mut expr = TsExpr::ident(schema_name(first));
            for parent in rest {
                expr = expr.method("merge", vec![TsExpr::ident(schema_name(parent))]);
            }
            if !own.is_empty() {
                expr = expr.method("extend", vec![TsExpr::Object(own)]);
            }
            return expr;
        }

        // Deferred, union or intersected supertypes have no object API; intersect pairwise.
        let mut parts: Vec<TsExpr> = object
            .extends
            .iter()
            .map(|parent| TsExpr::ident(schema_name(parent)))
            .collect();
        if !own.is_empty() {
            parts.push(TsExpr::call("z.object", vec![TsExpr::Object(own)]));
        }
        let mut parts = parts.into_iter();
        let mut expr = parts
            .next()
            .unwrap_or_else(|| TsExpr::call("z.object", vec![TsExpr::Object(Vec::new())]));
        for part in parts {
            expr = TsExpr::call("z.intersection", vec![expr, part]);
        }
        expr
    }

    /// Per-action request/response schemas with their inferred types.
    pub fn action_declarations(&self, site: &ActionSite<'_>) -> Vec<TsItem> {
        let action = site.action;
        let doc = JsDoc::new(
            action.summary.as_deref().or(action.description.as_deref()),
            action.deprecated,
        );
        let mut items = Vec::new();
        let mut declare = |suffix: ActionSuffix, init: TsExpr| {
            items.extend(schema_pair(
                action_schema_name(site, suffix),
                action_type_name(site, suffix),
                init,
                doc.clone(),
            ));
        };

        let mut request = Vec::new();
        if !action.request.query.is_empty() {
            declare(ActionSuffix::RequestQuery, self.object(&action.request.query));
            request.push((
                "query".to_string(),
                TsExpr::ident(action_schema_name(site, ActionSuffix::RequestQuery)),
            ));
        }
        if !action.request.body.is_empty() {
            declare(ActionSuffix::RequestBody, self.object(&action.request.body));
            request.push((
                "body".to_string(),
                TsExpr::ident(action_schema_name(site, ActionSuffix::RequestBody)),
            ));
        }
        if !request.is_empty() {
            declare(
                ActionSuffix::Request,
                TsExpr::call("z.object", vec![TsExpr::Object(request)]),
            );
        }

        match action.response.rendered_body() {
            Some(body) => {
                declare(ActionSuffix::ResponseBody, self.field(body));
                let body_schema = TsExpr::ident(action_schema_name(site, ActionSuffix::ResponseBody));
                declare(
                    ActionSuffix::Response,
                    TsExpr::call(
                        "z.object",
                        vec![TsExpr::Object(vec![("body".to_string(), body_schema)])],
                    ),
                );
            }
            None => declare(ActionSuffix::Response, TsExpr::call("z.never", vec![])),
        }
        items
    }
}

impl Mapper for ZodMapper<'_, '_> {
    type Decl = Vec<TsItem>;

    fn render_enum(&self, name: &str, def: &EnumDef) -> Vec<TsItem> {
        schema_pair(
            schema_name(name),
            type_name(name),
            enum_schema(&def.values),
            JsDoc::new(def.description.as_deref(), def.deprecated),
        )
    }

    fn render_type(&self, name: &str, def: &TypeDef) -> Vec<TsItem> {
        schema_pair(
            schema_name(name),
            type_name(name),
            self.definition(def),
            JsDoc::new(def.description(), false),
        )
    }

    fn render_deferred(&self, name: &str, def: &TypeDef, reason: DeferReason) -> Vec<TsItem> {
        debug!(type_name = name, ?reason, "Declaring lazy Zod schema.");
        let companion = self.companion.declaration(name, def, true);
        let schema = TsConst {
            name: schema_name(name),
            doc: JsDoc::default(),
            ty: Some(TsType::Generic {
                name: "z.ZodType".to_string(),
                args: vec![TsType::named(type_name(name))],
            }),
            init: TsExpr::call("z.lazy", vec![TsExpr::arrow(self.definition(def))]),
        };
        vec![TsItem::Type(companion), TsItem::Const(schema)]
    }
}

/// `export const XSchema = ...;` followed by `export type X = z.infer<typeof XSchema>;`.
fn schema_pair(schema: String, ty: String, init: TsExpr, doc: JsDoc) -> Vec<TsItem> {
    let inferred = TsType::Generic {
        name: "z.infer".to_string(),
        args: vec![TsType::TypeOf(schema.clone())],
    };
    vec![
        TsItem::Const(TsConst {
            name: schema,
            doc,
            ty: None,
            init,
        }),
        TsItem::Type(TsTypeDef {
            name: ty,
            doc: JsDoc::default(),
            kind: TypeDefKind::TypeAlias { ty: inferred },
        }),
    ]
}

fn enum_schema(values: &[String]) -> TsExpr {
    let values = sorted_values(values);
    if values.is_empty() {
        return TsExpr::call("z.never", vec![]);
    }
    TsExpr::call(
        "z.enum",
        vec![TsExpr::Array(values.into_iter().map(TsExpr::string).collect())],
    )
}

fn literal_schema(value: &serde_json::Value) -> TsExpr {
    match literal_from_value(value) {
        Some(TsLiteral::Null) => TsExpr::call("z.null", vec![]),
        Some(literal) => TsExpr::call("z.literal", vec![TsExpr::Literal(literal)]),
        None => TsExpr::call("z.unknown", vec![]),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::analysis::sort;
    use crate::surface::resolve;

    fn generate(json: &str, version: &'static str) -> String {
        let ir = Introspection::from_json(json).unwrap();
        let surface = resolve(&ir).unwrap();
        let sorted = sort(&surface);
        let options = MapOptions {
            version,
            key_format: KeyFormat::Keep,
        };
        match ZodGenerator.map(&ir, &sorted, &options).unwrap() {
            Artifact::Source(text) => text,
            Artifact::Document(_) => panic!("expected source"),
        }
    }

    const INVOICES: &str = r#"{
        "resources": { "invoices": { "actions": {
            "show": {
                "path": "/:id",
                "response": { "body": { "type": "reference", "to": "invoice" } }
            },
            "destroy": { "method": "DELETE", "path": "/:id", "response": { "no_content": true } }
        } } },
        "types": {
            "invoice": { "type": "object", "description": "A billed invoice.", "shape": {
                "number": { "type": "string" },
                "id": { "type": "uuid" },
                "status": { "type": "string", "enum": "invoice_status" },
                "note": { "type": "string", "nullable": true, "optional": true }
            } }
        },
        "enums": {
            "invoice_status": { "values": ["sent", "draft", "paid"] },
            "orphan_enum": { "values": ["unused"] }
        }
    }"#;

    #[test]
    fn test_module_layout() {
        let out = generate(INVOICES, "4");
        assert!(out.starts_with("import { z } from \"zod\";\n\n"), "{out}");
        assert!(out.contains(
            "export const InvoiceStatusSchema = z.enum([\"draft\", \"paid\", \"sent\"]);\n\nexport type InvoiceStatus = z.infer<typeof InvoiceStatusSchema>;"
        ));
        assert!(out.contains(
            "/** A billed invoice. */\nexport const InvoiceSchema = z.object({\n  id: z.uuid(),\n  note: z.string().nullable().optional(),\n  number: z.string(),\n  status: InvoiceStatusSchema,\n});"
        ));
        assert!(!out.contains("Orphan"));

        let enum_at = out.find("InvoiceStatusSchema =").unwrap();
        let type_at = out.find("InvoiceSchema =").unwrap();
        let action_at = out.find("InvoicesShowResponseBodySchema =").unwrap();
        assert!(enum_at < type_at && type_at < action_at);
    }

    #[test]
    fn test_action_declarations() {
        let out = generate(INVOICES, "4");
        assert!(out.contains("export const InvoicesShowResponseBodySchema = InvoiceSchema;"));
        assert!(out.contains(
            "export const InvoicesShowResponseSchema = z.object({\n  body: InvoicesShowResponseBodySchema,\n});"
        ));
        assert!(out.contains("export const InvoicesDestroyResponseSchema = z.never();"));
        assert!(out.contains(
            "export type InvoicesDestroyResponse = z.infer<typeof InvoicesDestroyResponseSchema>;"
        ));
        assert!(!out.contains("InvoicesShowRequest"));
    }

    #[test]
    fn test_version_three_formats() {
        let out = generate(INVOICES, "3");
        assert!(out.contains("  id: z.string().uuid(),"), "{out}");
    }

    #[test]
    fn test_self_reference_is_lazy() {
        let out = generate(
            r#"{
                "resources": { "nodes": { "actions": { "show": {
                    "response": { "body": { "type": "reference", "to": "node" } }
                } } } },
                "types": { "node": { "type": "object", "shape": {
                    "value": { "type": "string" },
                    "children": { "type": "array", "of": { "type": "reference", "to": "node" } }
                } } }
            }"#,
            "4",
        );
        assert!(
            out.contains("export interface Node {\n  children: Node[];\n  value: string;\n}\n\nexport const NodeSchema: z.ZodType<Node> = z.lazy(() => z.object({\n  children: z.array(NodeSchema),\n  value: z.string(),\n}));"),
            "{out}"
        );
        assert!(!out.contains("z.infer<typeof NodeSchema>"));
    }

    #[test]
    fn test_mutual_cycle_is_lazy_on_both_sides() {
        let out = generate(
            r#"{
                "resources": { "people": { "actions": { "show": {
                    "response": { "body": { "type": "reference", "to": "person" } }
                } } } },
                "types": {
                    "person": { "type": "object", "shape": { "employer": { "type": "reference", "to": "company", "nullable": true } } },
                    "company": { "type": "object", "shape": { "ceo": { "type": "reference", "to": "person" } } }
                }
            }"#,
            "4",
        );
        assert!(out.contains("export const PersonSchema: z.ZodType<Person> = z.lazy("), "{out}");
        assert!(out.contains("export const CompanySchema: z.ZodType<Company> = z.lazy("));
        assert!(out.contains("  employer: CompanySchema.nullable(),"));
        assert!(out.contains("export interface Person {\n  employer: Company | null;\n}"));
    }

    #[test]
    fn test_discriminator_injection_extends_reference_site() {
        let out = generate(
            r#"{
                "resources": { "feed": { "actions": { "index": {
                    "response": { "body": { "type": "array", "of": { "type": "reference", "to": "entry" } } }
                } } } },
                "types": {
                    "entry": { "type": "union", "discriminator": "kind", "variants": [
                        { "tag": "note", "type": "object", "shape": { "text": { "type": "string" } } },
                        { "tag": "invoice", "type": "reference", "to": "invoice" }
                    ] },
                    "invoice": { "type": "object", "shape": { "number": { "type": "string" } } }
                }
            }"#,
            "4",
        );
        assert!(
            out.contains("export const InvoiceSchema = z.object({\n  number: z.string(),\n});"),
            "{out}"
        );
        assert!(out.contains(
            "export const EntrySchema = z.discriminatedUnion(\"kind\", [\n  InvoiceSchema.extend({\n    kind: z.literal(\"invoice\"),\n  }),\n  z.object({\n    kind: z.literal(\"note\"),\n    text: z.string(),\n  }),\n]);"
        ));
        assert!(out.contains("export const FeedIndexResponseBodySchema = z.array(EntrySchema);"));
    }

    #[test]
    fn test_extends_composition() {
        let out = generate(
            r#"{
                "resources": { "things": { "actions": { "show": {
                    "response": { "body": { "type": "union", "variants": [
                        { "type": "reference", "to": "alias" },
                        { "type": "reference", "to": "single" },
                        { "type": "reference", "to": "both" }
                    ] } }
                } } } },
                "types": {
                    "base": { "type": "object", "shape": { "id": { "type": "uuid" } } },
                    "audit": { "type": "object", "shape": { "at": { "type": "datetime" } } },
                    "alias": { "type": "object", "extends": ["base"], "shape": {} },
                    "single": { "type": "object", "extends": ["base"], "shape": { "name": { "type": "string" } } },
                    "both": { "type": "object", "extends": ["base", "audit"], "shape": { "name": { "type": "string" } } }
                }
            }"#,
            "4",
        );
        assert!(out.contains("export const AliasSchema = BaseSchema;"), "{out}");
        assert!(out.contains("export const SingleSchema = BaseSchema.extend({\n  name: z.string(),\n});"));
        assert!(out.contains(
            "export const BothSchema = BaseSchema.merge(AuditSchema).extend({\n  name: z.string(),\n});"
        ));
        assert!(out.contains(
            "export const ThingsShowResponseBodySchema = z.union([AliasSchema, SingleSchema, BothSchema]);"
        ));
    }

    #[test]
    fn test_extending_an_intersection_stays_an_intersection() {
        let out = generate(
            r#"{
                "resources": { "things": { "actions": { "show": {
                    "response": { "body": { "type": "union", "variants": [
                        { "type": "reference", "to": "leaf" },
                        { "type": "reference", "to": "tip" }
                    ] } }
                } } } },
                "types": {
                    "node": { "type": "object", "shape": {
                        "parent": { "type": "reference", "to": "node", "nullable": true }
                    } },
                    "mid": { "type": "object", "extends": ["node"], "shape": { "x": { "type": "string" } } },
                    "leaf": { "type": "object", "extends": ["mid"], "shape": { "y": { "type": "string" } } },
                    "choice": { "type": "union", "variants": [
                        { "type": "string" }, { "type": "integer" }
                    ] },
                    "branch": { "type": "object", "extends": ["choice"], "shape": {} },
                    "tip": { "type": "object", "extends": ["branch"], "shape": { "z": { "type": "string" } } }
                }
            }"#,
            "4",
        );
        assert!(
            out.contains("export const MidSchema = z.intersection(NodeSchema, z.object({\n  x: z.string(),\n}));"),
            "{out}"
        );
        assert!(
            out.contains("export const LeafSchema = z.intersection(MidSchema, z.object({\n  y: z.string(),\n}));"),
            "{out}"
        );
        assert!(out.contains("export const BranchSchema = ChoiceSchema;"), "{out}");
        assert!(
            out.contains("export const TipSchema = z.intersection(BranchSchema, z.object({\n  z: z.string(),\n}));"),
            "{out}"
        );
        assert!(!out.contains("MidSchema.extend"));
        assert!(!out.contains("BranchSchema.extend"));
    }

    #[test]
    fn test_intersection_variant_is_not_discriminated() {
        let out = generate(
            r#"{
                "resources": { "feed": { "actions": { "index": {
                    "response": { "body": { "type": "reference", "to": "entry" } }
                } } } },
                "types": {
                    "node": { "type": "object", "shape": {
                        "next": { "type": "reference", "to": "node", "optional": true }
                    } },
                    "linked": { "type": "object", "extends": ["node"], "shape": {} },
                    "entry": { "type": "union", "discriminator": "kind", "variants": [
                        { "tag": "linked", "type": "reference", "to": "linked" },
                        { "tag": "note", "type": "object", "shape": { "text": { "type": "string" } } }
                    ] }
                }
            }"#,
            "4",
        );
        assert!(out.contains("export const EntrySchema = z.union(["), "{out}");
        assert!(out.contains(
            "  z.intersection(LinkedSchema, z.object({\n    kind: z.literal(\"linked\"),\n  })),"
        ));
        assert!(!out.contains("LinkedSchema.extend"));
    }

    #[test]
    fn test_plain_string_discriminator_gets_literal() {
        let out = generate(
            r#"{
                "resources": { "feed": { "actions": { "index": {
                    "response": { "body": { "type": "reference", "to": "entry" } }
                } } } },
                "types": {
                    "entry": { "type": "union", "discriminator": "kind", "variants": [
                        { "tag": "invoice", "type": "reference", "to": "invoice" },
                        { "tag": "note", "type": "object", "shape": {
                            "kind": { "type": "string" },
                            "text": { "type": "string" }
                        } }
                    ] },
                    "invoice": { "type": "object", "shape": {
                        "kind": { "type": "string" },
                        "number": { "type": "string" }
                    } }
                }
            }"#,
            "4",
        );
        assert!(
            out.contains("export const EntrySchema = z.discriminatedUnion(\"kind\", [\n  InvoiceSchema.extend({\n    kind: z.literal(\"invoice\"),\n  }),\n  z.object({\n    kind: z.literal(\"note\"),\n    text: z.string(),\n  }),\n]);"),
            "{out}"
        );
    }
}
