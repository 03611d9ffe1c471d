//! TypeScript AST and emitter shared by the source-emitting mappers.
//!
//! Mappers build structured declarations (testable without string matching)
//! and emission is purely mechanical string building via the `Emit` trait.
//!
//! ## Module Structure
//!
//! - `types`: TypeScript AST (TsType, TsExpr, TsTypeDef, TsConst, TsModule)
//! - `emit`: AST to TypeScript code strings
//! - `utils`: key quoting, string escaping, identifier sanitising

mod emit;
mod types;
pub mod utils;

pub use emit::Emit;
pub use types::{
    JsDoc, TsConst, TsExpr, TsImport, TsItem, TsLiteral, TsModule, TsPrimitive, TsProp,
    TsType, TsTypeDef, TypeDefKind,
};
