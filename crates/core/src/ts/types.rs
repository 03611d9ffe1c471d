//! TypeScript AST used by the source-emitting mappers.
//!
//! - TsType: type-position syntax (primitives, arrays, unions, objects, refs)
//! - TsExpr: value-position syntax (calls, member chains, object literals)
//! - TsTypeDef / TsConst: top-level declarations collected into a TsModule

/// Type-position syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// `string`, `number`, `null`, ...
    Primitive(TsPrimitive),
    /// `T[]`
    Array(Box<TsType>),
    /// `A | B`
    Union(Vec<TsType>),
    /// `A & B`
    Intersection(Vec<TsType>),
    /// Inline object type, `{ total: number; note?: string }`
    Object(Vec<TsProp>),
    /// Literal type, e.g. `"draft"`.
    Literal(TsLiteral),
    /// Reference to a declared type.
    Ref(String),
    /// Generic instantiation: z.ZodType<Node>
    Generic {
        /// Generic type name.
        name: String,
        /// Type arguments.
        args: Vec<TsType>,
    },
    /// Type query: typeof NodeSchema
    TypeOf(String),
}

impl TsType {
    /// Reference to a declared type by name.
    pub fn named(name: impl Into<String>) -> Self {
        TsType::Ref(name.into())
    }

    /// `T | null`, flattening when `T` is already a union.
    pub fn or_null(self) -> Self {
        match self {
            TsType::Union(mut types) => {
                types.push(TsType::Primitive(TsPrimitive::Null));
                TsType::Union(types)
            }
            other => TsType::Union(vec![other, TsType::Primitive(TsPrimitive::Null)]),
        }
    }
}

/// Built-in TypeScript types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// `unknown`
    Unknown,
    /// `never`
    Never,
}

impl TsPrimitive {
    /// Keyword spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Unknown => "unknown",
            Self::Never => "never",
        }
    }
}

/// Property of an interface or inline object type.
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    /// Property key, quoted on emission when needed.
    pub name: String,
    /// Property type.
    pub ty: TsType,
    /// Emitted as `name?:`.
    pub optional: bool,
    /// Leading JSDoc.
    pub doc: JsDoc,
}

/// Documentation attached to a declaration or property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsDoc {
    /// Description text, trimmed and non-empty.
    pub description: Option<String>,
    /// Emits `@deprecated`.
    pub deprecated: bool,
}

impl JsDoc {
    /// Doc from optional text; blank text counts as absent.
    pub fn new(description: Option<&str>, deprecated: bool) -> Self {
        Self {
            description: description
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
            deprecated,
        }
    }

    /// Whether nothing would be emitted.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && !self.deprecated
    }
}

/// Literal usable in both type and value position.
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    /// String literal.
    String(String),
    /// Floating-point literal.
    Number(f64),
    /// Integral number, emitted without a fraction.
    Int(i64),
    /// `true` or `false`.
    Bool(bool),
    /// `null`
    Null,
}

/// Value-position syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum TsExpr {
    /// Identifier or dotted path, e.g. `z.iso.datetime`
    Ident(String),
    /// Literal value.
    Literal(TsLiteral),
    /// `callee(args)`
    Call {
        /// Function or method being called.
        callee: Box<TsExpr>,
        /// Arguments, in order.
        args: Vec<TsExpr>,
    },
    /// `object.prop`
    Member {
        /// Receiver.
        object: Box<TsExpr>,
        /// Property name.
        prop: String,
    },
    /// `(params) => body`
    Arrow {
        /// Parameter names.
        params: Vec<String>,
        /// Returned expression.
        body: Box<TsExpr>,
    },
    /// Object literal; entries keep their order.
    Object(Vec<(String, TsExpr)>),
    /// Array literal.
    Array(Vec<TsExpr>),
    /// `expr as const`
    AsConst(Box<TsExpr>),
}

impl TsExpr {
    /// Identifier or dotted path.
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    /// String literal, escaped on emission.
    pub fn string(value: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(value.into()))
    }

    /// Call of a named function: `callee(args)`.
    pub fn call(callee: impl Into<String>, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(TsExpr::Ident(callee.into())),
            args,
        }
    }

    /// Chain a method call onto this expression: `self.name(args)`.
    pub fn method(self, name: &str, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(TsExpr::Member {
                object: Box::new(self),
                prop: name.to_string(),
            }),
            args,
        }
    }

    /// Zero-argument arrow returning `body`.
    pub fn arrow(body: TsExpr) -> Self {
        TsExpr::Arrow {
            params: Vec::new(),
            body: Box::new(body),
        }
    }

    /// Whether emission spans several lines.
    pub fn is_multiline(&self) -> bool {
        match self {
            TsExpr::Ident(_) | TsExpr::Literal(_) => false,
            TsExpr::Object(props) => !props.is_empty(),
            TsExpr::Call { callee, args } => {
                callee.is_multiline() || args.iter().any(TsExpr::is_multiline)
            }
            TsExpr::Member { object, .. } => object.is_multiline(),
            TsExpr::Arrow { body, .. } => body.is_multiline(),
            TsExpr::Array(items) => items.iter().any(TsExpr::is_multiline),
            TsExpr::AsConst(inner) => inner.is_multiline(),
        }
    }
}

/// `import { names } from "module";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsImport {
    /// Imported bindings.
    pub names: Vec<String>,
    /// Module specifier.
    pub from: String,
}

impl TsImport {
    /// Import a single binding.
    pub fn named(name: &str, from: &str) -> Self {
        Self {
            names: vec![name.to_string()],
            from: from.to_string(),
        }
    }
}

/// Body of a type declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// `interface Foo extends Bar { ... }`
    Interface {
        /// Supertypes, by declared name.
        extends: Vec<String>,
        /// Own properties.
        properties: Vec<TsProp>,
    },
    /// `type Foo = ...`
    TypeAlias {
        /// Aliased type.
        ty: TsType,
    },
}

/// `export interface` or `export type` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    /// Declared name.
    pub name: String,
    /// Leading JSDoc.
    pub doc: JsDoc,
    /// Interface or alias body.
    pub kind: TypeDefKind,
}

/// Exported `const` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TsConst {
    /// Declared name.
    pub name: String,
    /// Leading JSDoc.
    pub doc: JsDoc,
    /// Explicit type annotation.
    pub ty: Option<TsType>,
    /// Initialiser.
    pub init: TsExpr,
}

/// Top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TsItem {
    /// `export interface` or `export type`.
    Type(TsTypeDef),
    /// `export const`.
    Const(TsConst),
}

impl TsItem {
    /// Declared name.
    pub fn name(&self) -> &str {
        match self {
            TsItem::Type(def) => &def.name,
            TsItem::Const(decl) => &decl.name,
        }
    }
}

/// A generated source file: imports followed by declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsModule {
    /// Import lines, in order.
    pub imports: Vec<TsImport>,
    /// Declarations, in emission order.
    pub items: Vec<TsItem>,
}
