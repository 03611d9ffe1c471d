//! Rendering of the TypeScript AST to source text.
//!
//! Two-space indentation; object and array literals that contain an object
//! break across lines, everything else stays on one line.

use super::types::{
    JsDoc, TsConst, TsExpr, TsImport, TsItem, TsLiteral, TsModule, TsPrimitive, TsProp, TsType,
    TsTypeDef, TypeDefKind,
};
use super::utils::{escape_js_string, quote_if_needed};

/// Render an AST node as TypeScript source.
pub trait Emit {
    /// Render as TypeScript source.
    fn emit(&self) -> String;
}

fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}

fn join_emitted<'a, T: Emit + 'a>(items: impl IntoIterator<Item = &'a T>, sep: &str) -> String {
    items
        .into_iter()
        .map(Emit::emit)
        .collect::<Vec<_>>()
        .join(sep)
}

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        self.as_str().to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            Self::String(text) => format!("\"{}\"", escape_js_string(text)),
            Self::Number(n) => n.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Null => "null".to_string(),
        }
    }
}

impl TsType {
    /// Emit, parenthesised when `self` binds looser than the surrounding operator.
    fn emit_operand(&self, looser: fn(&Self) -> bool) -> String {
        if looser(self) {
            format!("({})", self.emit())
        } else {
            self.emit()
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            Self::Primitive(primitive) => primitive.emit(),
            Self::Literal(literal) => literal.emit(),
            Self::Ref(name) => name.clone(),
            Self::TypeOf(name) => format!("typeof {name}"),
            Self::Generic { name, args } => format!("{name}<{}>", join_emitted(args, ", ")),
            Self::Array(element) => {
                let element = element.emit_operand(|ty| {
                    matches!(ty, Self::Union(_) | Self::Intersection(_))
                });
                format!("{element}[]")
            }
            Self::Union(members) => join_emitted(members, " | "),
            Self::Intersection(members) => members
                .iter()
                .map(|member| member.emit_operand(|ty| matches!(ty, Self::Union(_))))
                .collect::<Vec<_>>()
                .join(" & "),
            Self::Object(props) if props.is_empty() => "{}".to_string(),
            Self::Object(props) => format!("{{ {} }}", join_emitted(props, "; ")),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let marker = if self.optional { "?" } else { "" };
        format!("{}{marker}: {}", quote_if_needed(&self.name), self.ty.emit())
    }
}

impl JsDoc {
    /// Emit as a JSDoc block at the given indentation; empty docs emit nothing.
    pub fn emit_indented(&self, indent: usize) -> String {
        if self.is_empty() {
            return String::new();
        }
        let prefix = indent_str(indent);
        let mut lines: Vec<String> = self
            .description
            .iter()
            .flat_map(|text| text.lines())
            .map(|line| line.trim_end().replace("*/", "*\\/"))
            .collect();
        if self.deprecated {
            lines.push("@deprecated".to_string());
        }
        if let [only] = lines.as_slice() {
            return format!("{prefix}/** {only} */\n");
        }

        let body: String = lines
            .iter()
            .map(|line| {
                if line.is_empty() {
                    format!("{prefix} *\n")
                } else {
                    format!("{prefix} * {line}\n")
                }
            })
            .collect();
        format!("{prefix}/**\n{body}{prefix} */\n")
    }
}

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let doc = self.doc.emit_indented(0);
        let name = &self.name;
        match &self.kind {
            TypeDefKind::TypeAlias { ty } => format!("{doc}export type {name} = {};\n", ty.emit()),
            TypeDefKind::Interface {
                extends,
                properties,
            } => {
                let heritage = if extends.is_empty() {
                    String::new()
                } else {
                    format!(" extends {}", extends.join(", "))
                };
                if properties.is_empty() {
                    return format!("{doc}export interface {name}{heritage} {{}}\n");
                }
                let members: String = properties
                    .iter()
                    .map(|prop| format!("{}  {};\n", prop.doc.emit_indented(1), prop.emit()))
                    .collect();
                format!("{doc}export interface {name}{heritage} {{\n{members}}}\n")
            }
        }
    }
}

impl Emit for TsConst {
    fn emit(&self) -> String {
        let annotation = match &self.ty {
            Some(ty) => format!(": {}", ty.emit()),
            None => String::new(),
        };
        format!(
            "{}export const {}{annotation} = {};\n",
            self.doc.emit_indented(0),
            self.name,
            self.init.emit()
        )
    }
}

impl Emit for TsItem {
    fn emit(&self) -> String {
        match self {
            Self::Type(def) => def.emit(),
            Self::Const(decl) => decl.emit(),
        }
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

impl TsExpr {
    /// Emit with continuation lines of multi-line literals indented one level
    /// deeper than `indent`.
    pub fn emit_indented(&self, indent: usize) -> String {
        match self {
            Self::Ident(name) => name.clone(),
            Self::Literal(literal) => literal.emit(),
            Self::Call { callee, args } => {
                let args: Vec<String> = args.iter().map(|arg| arg.emit_indented(indent)).collect();
                format!("{}({})", callee.emit_indented(indent), args.join(", "))
            }
            Self::Member { object, prop } => format!("{}.{prop}", object.emit_indented(indent)),
            Self::Arrow { params, body } => {
                format!("({}) => {}", params.join(", "), body.emit_indented(indent))
            }
            Self::AsConst(inner) => format!("{} as const", inner.emit_indented(indent)),
            Self::Object(entries) if entries.is_empty() => "{}".to_string(),
            Self::Object(entries) => {
                let lines = entries.iter().map(|(key, value)| {
                    format!("{}: {}", quote_if_needed(key), value.emit_indented(indent + 1))
                });
                block(('{', '}'), lines, indent)
            }
            Self::Array(items) if items.iter().any(Self::is_multiline) => {
                let lines = items.iter().map(|item| item.emit_indented(indent + 1));
                block(('[', ']'), lines, indent)
            }
            Self::Array(items) => {
                let items: Vec<String> = items.iter().map(|item| item.emit_indented(indent)).collect();
                format!("[{}]", items.join(", "))
            }
        }
    }
}

/// One entry per line, each followed by a trailing comma.
fn block(
    (open, close): (char, char),
    lines: impl Iterator<Item = String>,
    indent: usize,
) -> String {
    let inner = indent_str(indent + 1);
    let body: String = lines.map(|line| format!("{inner}{line},\n")).collect();
    format!("{open}\n{body}{}{close}", indent_str(indent))
}

impl Emit for TsImport {
    fn emit(&self) -> String {
        format!("import {{ {} }} from \"{}\";\n", self.names.join(", "), self.from)
    }
}

impl Emit for TsModule {
    fn emit(&self) -> String {
        let imports: String = self.imports.iter().map(Emit::emit).collect();
        let items = join_emitted(&self.items, "\n");
        if imports.is_empty() || items.is_empty() {
            format!("{imports}{items}")
        } else {
            format!("{imports}\n{items}")
        }
    }
}
