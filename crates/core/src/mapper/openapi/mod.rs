//! OpenAPI document generation.
//!
//! Named types and enums become `components.schemas` entries keyed by their IR
//! name; every action becomes an operation under its `{param}`-style path.
//! Both 3.0 and 3.1 are supported; they differ only in how nullability and
//! literals are spelled.
//!
//! ## Module Structure
//!
//! - `document`: serde structs for the emitted document

mod document;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::analysis::{DeferReason, SortedSurface};
use crate::error::GenerateError;
use crate::ir::{
    ActionSite, EnumAttr, EnumDef, Field, FieldKind, Introspection, Primitive, Shape, TypeDef,
    Union, Variant, path_params, sorted_values, to_openapi_path,
};
use crate::naming::{KeyFormat, operation_id};

use super::primitives::{Bound, bound_of, number_value, openapi_primitive};
use super::{
    Artifact, Generator, MapOptions, Mapper, OutputFormat, discriminator_injection,
    ordered_shape, ordered_variants, render_surface,
};

pub use document::{
    Components, Discriminator, Info, MediaType, OpenApiDocument, Operation, Parameter,
    ParameterLocation, PathItem, RequestBody, Response, Schema, SchemaType, Server,
};

const JSON_MEDIA_TYPE: &str = "application/json";

/// Generator for OpenAPI documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenApiGenerator;

impl Generator for OpenApiGenerator {
    fn name(&self) -> &'static str {
        "openapi"
    }

    fn description(&self) -> &'static str {
        "OpenAPI document (JSON or YAML)"
    }

    fn versions(&self) -> &'static [&'static str] {
        &["3.1.0", "3.0.3"]
    }

    fn formats(&self) -> &'static [OutputFormat] {
        &[OutputFormat::Json, OutputFormat::Yaml]
    }

    fn map(
        &self,
        ir: &Introspection,
        surface: &SortedSurface<'_>,
        options: &MapOptions,
    ) -> Result<Artifact, GenerateError> {
        let mapper = OpenApiMapper::new(surface, options);
        let document = mapper.document(ir, options.version);
        debug!(
            version = options.version,
            paths = document.paths.len(),
            schemas = document.components.schemas.len(),
            "Built OpenAPI document."
        );
        Ok(Artifact::Document(Box::new(document)))
    }
}

/// OpenAPI dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenApiVersion {
    /// OpenAPI 3.0.x: `nullable`, `enum` for constants.
    V3_0,
    /// OpenAPI 3.1.x: type arrays, `const`.
    V3_1,
}

impl OpenApiVersion {
    /// Dialect of a supported version string.
    pub fn from_version(version: &str) -> Self {
        if version.starts_with("3.0") {
            Self::V3_0
        } else {
            Self::V3_1
        }
    }
}

/// Renders IR fields and declarations as OpenAPI schemas.
#[derive(Debug, Clone, Copy)]
pub struct OpenApiMapper<'a, 'ir> {
    surface: &'a SortedSurface<'ir>,
    version: OpenApiVersion,
    key_format: KeyFormat,
}

fn ref_path(name: &str) -> String {
    format!("#/components/schemas/{name}")
}

impl<'a, 'ir> OpenApiMapper<'a, 'ir> {
    /// Mapper over `surface` with validated options.
    pub fn new(surface: &'a SortedSurface<'ir>, options: &MapOptions) -> Self {
        Self {
            surface,
            version: OpenApiVersion::from_version(options.version),
            key_format: options.key_format,
        }
    }

    /// Build the full document for `ir`.
    pub fn document(&self, ir: &Introspection, version: &str) -> OpenApiDocument {
        let info = ir.info.as_ref();
        let mut schemas: IndexMap<String, Schema> = render_surface(self, self.surface)
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect();
        schemas.sort_keys();

        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        for site in ir.actions() {
            let path = to_openapi_path(&site.path);
            let method = site.action.method.as_lower_str();
            let operation = self.operation(ir, &site);
            let item = paths.entry(path.clone()).or_default();
            if item.contains_key(method) {
                warn!(path = %path, method, "Duplicate operation; keeping the last declared.");
            }
            item.insert(method.to_string(), operation);
        }

        OpenApiDocument {
            openapi: version.to_string(),
            info: Info {
                title: info
                    .and_then(|i| i.title.clone())
                    .unwrap_or_else(|| "API".to_string()),
                version: info
                    .and_then(|i| i.version.clone())
                    .unwrap_or_else(|| "1.0.0".to_string()),
                description: info.and_then(|i| i.description.clone()),
            },
            servers: info
                .map(|i| {
                    i.servers
                        .iter()
                        .map(|s| Server {
                            url: s.url.clone(),
                            description: s.description.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            paths,
            components: Components { schemas },
        }
    }

    fn operation(&self, ir: &Introspection, site: &ActionSite<'_>) -> Operation {
        let action = site.action;

        let mut parameters: Vec<Parameter> = path_params(&site.path)
            .into_iter()
            .map(|name| Parameter {
                name: name.to_string(),
                location: ParameterLocation::Path,
                required: true,
                description: None,
                deprecated: false,
                schema: Schema::typed("string"),
            })
            .collect();
        for (name, field) in ordered_shape(&action.request.query, self.key_format) {
            parameters.push(Parameter {
                name,
                location: ParameterLocation::Query,
                required: !field.optional,
                description: field.description.clone(),
                deprecated: field.deprecated,
                schema: self.value(field),
            });
        }

        let request_body = (!action.request.body.is_empty()).then(|| RequestBody {
            required: true,
            content: json_content(self.object(&action.request.body)),
        });

        let mut responses = IndexMap::new();
        match action.response.rendered_body() {
            Some(body) => {
                responses.insert(
                    "200".to_string(),
                    Response {
                        description: "Successful response".to_string(),
                        content: Some(json_content(self.field(body))),
                    },
                );
            }
            None => {
                responses.insert(
                    "204".to_string(),
                    Response {
                        description: "No content".to_string(),
                        content: None,
                    },
                );
            }
        }
        for code in &action.raises {
            let Some(error) = ir.error_codes.get(code) else {
                continue;
            };
            responses
                .entry(error.status.to_string())
                .or_insert_with(|| Response {
                    description: error.description.clone().unwrap_or_else(|| code.clone()),
                    content: None,
                });
        }
        responses.sort_keys();

        Operation {
            operation_id: operation_id(site),
            summary: action.summary.clone(),
            description: action.description.clone(),
            tags: action.tags.clone(),
            deprecated: action.deprecated,
            parameters,
            request_body,
            responses,
        }
    }

    /// Schema for a field, including its documentation.
    pub fn field(&self, field: &Field) -> Schema {
        let mut schema = self.value(field);
        if schema.description.is_none() {
            schema.description.clone_from(&field.description);
        }
        schema.deprecated |= field.deprecated;
        schema.example.clone_from(&field.example);
        schema
    }

    /// Schema for a field's value: kind plus nullability, no documentation.
    fn value(&self, field: &Field) -> Schema {
        let schema = self.kind(field);
        if field.nullable {
            self.nullable(schema)
        } else {
            schema
        }
    }

    fn kind(&self, field: &Field) -> Schema {
        match &field.kind {
            FieldKind::Primitive(primitive) => match &field.enum_attr {
                Some(EnumAttr::Inline(values)) => string_enum(values),
                Some(EnumAttr::Named(name)) => Schema::reference(ref_path(name)),
                None => primitive_schema(primitive),
            },
            FieldKind::Reference(name) => Schema::reference(ref_path(name)),
            FieldKind::ArrayOf(element) => Schema {
                items: Some(Box::new(self.field(element))),
                ..Schema::typed("array")
            },
            FieldKind::Object(shape) => self.object(shape),
            FieldKind::UnionOf(union) => self.union(union),
            FieldKind::Literal(value) => self.literal(value),
        }
    }

    fn object(&self, shape: &Shape) -> Schema {
        let mut properties = IndexMap::new();
        let mut required = Vec::new();
        for (key, field) in ordered_shape(shape, self.key_format) {
            if !field.optional {
                required.push(key.clone());
            }
            properties.insert(key, self.field(field));
        }
        Schema {
            properties: (!properties.is_empty()).then_some(properties),
            required,
            ..Schema::typed("object")
        }
    }

    fn literal(&self, value: &Value) -> Schema {
        let schema_type = match value {
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
            Value::Number(_) => "number",
            Value::Null => {
                return match self.version {
                    OpenApiVersion::V3_1 => Schema::typed("null"),
                    OpenApiVersion::V3_0 => Schema {
                        nullable: Some(true),
                        enum_values: Some(vec![Value::Null]),
                        ..Schema::default()
                    },
                };
            }
            Value::Array(_) | Value::Object(_) => return Schema::default(),
        };
        match self.version {
            OpenApiVersion::V3_1 => Schema {
                const_value: Some(value.clone()),
                ..Schema::typed(schema_type)
            },
            OpenApiVersion::V3_0 => Schema {
                enum_values: Some(vec![value.clone()]),
                ..Schema::typed(schema_type)
            },
        }
    }

    fn nullable(&self, mut schema: Schema) -> Schema {
        match self.version {
            OpenApiVersion::V3_0 => {
                if schema.ref_path.is_some() {
                    return Schema {
                        all_of: vec![schema],
                        nullable: Some(true),
                        ..Schema::default()
                    };
                }
                if let Some(values) = schema.enum_values.as_mut() {
                    values.push(Value::Null);
                }
                schema.nullable = Some(true);
                schema
            }
            OpenApiVersion::V3_1 => match schema.schema_type.take() {
                Some(SchemaType::Single(single)) if schema.const_value.is_none() => {
                    if let Some(values) = schema.enum_values.as_mut() {
                        values.push(Value::Null);
                    }
                    schema.schema_type =
                        Some(SchemaType::Multiple(vec![single, "null".to_string()]));
                    schema
                }
                original => {
                    schema.schema_type = original;
                    Schema {
                        one_of: vec![schema, Schema::typed("null")],
                        ..Schema::default()
                    }
                }
            },
        }
    }

    fn union(&self, union: &Union) -> Schema {
        let one_of: Vec<Schema> = ordered_variants(union)
            .into_iter()
            .map(|variant| self.variant(union, variant))
            .collect();
        if one_of.is_empty() {
            return Schema::default();
        }
        // A mapped component must carry the tag itself; injected tags live
        // only in the `allOf` at the variant site.
        let discriminator = union.discriminator.as_deref().map(|property| Discriminator {
            property_name: self.key_format.apply(property),
            mapping: ordered_variants(union)
                .into_iter()
                .filter(|variant| discriminator_injection(self.surface, union, variant).is_none())
                .filter_map(|variant| match (&variant.tag, &variant.field.kind) {
                    (Some(tag), FieldKind::Reference(name)) => Some((tag.clone(), ref_path(name))),
                    _ => None,
                })
                .collect(),
        });
        Schema {
            one_of,
            discriminator,
            ..Schema::default()
        }
    }

    fn variant(&self, union: &Union, variant: &Variant) -> Schema {
        let field = &variant.field;
        let Some(injection) = discriminator_injection(self.surface, union, variant) else {
            return self.field(field);
        };

        let key = self.key_format.apply(injection.property);
        let tag = self.literal(&Value::String(injection.tag.to_string()));
        let schema = match &field.kind {
            FieldKind::Object(shape) => {
                let mut object = self.object(shape);
                let properties = object.properties.get_or_insert_with(IndexMap::new);
                properties.insert(key.clone(), tag);
                properties.sort_keys();
                if !object.required.contains(&key) {
                    object.required.push(key);
                    object.required.sort();
                }
                object
            }
            _ => Schema {
                all_of: vec![
                    self.kind(field),
                    Schema {
                        properties: Some(IndexMap::from([(key.clone(), tag)])),
                        required: vec![key],
                        ..Schema::typed("object")
                    },
                ],
                ..Schema::default()
            },
        };
        if field.nullable {
            self.nullable(schema)
        } else {
            schema
        }
    }
}

impl Mapper for OpenApiMapper<'_, '_> {
    type Decl = Schema;

    fn render_enum(&self, _name: &str, def: &EnumDef) -> Schema {
        Schema {
            description: def.description.clone(),
            deprecated: def.deprecated,
            ..string_enum(&def.values)
        }
    }

    fn render_type(&self, _name: &str, def: &TypeDef) -> Schema {
        let schema = match def {
            TypeDef::Object(object) if object.extends.is_empty() => self.object(&object.shape),
            TypeDef::Object(object) => {
                let mut all_of: Vec<Schema> = object
                    .extends
                    .iter()
                    .map(|parent| Schema::reference(ref_path(parent)))
                    .collect();
                if !object.shape.is_empty() {
                    all_of.push(self.object(&object.shape));
                }
                Schema {
                    all_of,
                    ..Schema::default()
                }
            }
            TypeDef::Union(union) => self.union(&union.union),
        };
        Schema {
            description: def.description().map(str::to_string),
            ..schema
        }
    }

    /// `$ref` is already forward-reference safe.
    fn render_deferred(&self, name: &str, def: &TypeDef, _reason: DeferReason) -> Schema {
        self.render_type(name, def)
    }
}

fn json_content(schema: Schema) -> IndexMap<String, MediaType> {
    IndexMap::from([(JSON_MEDIA_TYPE.to_string(), MediaType { schema })])
}

fn string_enum(values: &[String]) -> Schema {
    Schema {
        enum_values: Some(
            sorted_values(values)
                .into_iter()
                .map(|value| Value::String(value.to_string()))
                .collect(),
        ),
        ..Schema::typed("string")
    }
}

fn primitive_schema(primitive: &Primitive) -> Schema {
    let table = openapi_primitive(primitive.kind);
    let Some(schema_type) = table.schema_type else {
        return Schema::default();
    };
    let mut schema = Schema {
        format: primitive
            .format
            .clone()
            .or_else(|| table.format.map(str::to_string)),
        ..Schema::typed(schema_type)
    };
    match bound_of(primitive.kind) {
        Some(Bound::Length) => {
            schema.min_length = primitive.min.map(|n| number_value(n.floor()));
            schema.max_length = primitive.max.map(|n| number_value(n.floor()));
        }
        Some(Bound::Value) => {
            schema.minimum = primitive.min.map(number_value);
            schema.maximum = primitive.max.map(number_value);
        }
        None => {}
    }
    schema
}
