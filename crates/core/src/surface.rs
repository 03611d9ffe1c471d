//! Reachable-surface resolution.
//!
//! Starting from every action's query, body and response fields, walk the
//! reference graph and collect the named types and enums actually used. Types
//! and enums that no action reaches are left out of every generated artifact.

use std::collections::VecDeque;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::{DefinitionKind, GenerateError};
use crate::ir::{EnumAttr, EnumDef, Field, FieldKind, Introspection, Shape, TypeDef};

/// The subset of named types and enums reachable from at least one action.
///
/// Both maps are in discovery order, which is a pure function of the IR's
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct Surface<'ir> {
    /// Reachable named types, in discovery order.
    pub types: IndexMap<&'ir str, &'ir TypeDef>,
    /// Reachable named enums, in discovery order.
    pub enums: IndexMap<&'ir str, &'ir EnumDef>,
}

/// Resolve the reachable surface of `ir`.
pub fn resolve(ir: &Introspection) -> Result<Surface<'_>, GenerateError> {
    SurfaceResolver::new(ir).resolve()
}

/// Worklist traversal over the IR's reference graph.
///
/// The resolver owns the visited state for one generation call: a type is
/// recorded in `surface.types` before its definition is walked, so self- and
/// mutually-referential types terminate.
#[derive(Debug)]
pub struct SurfaceResolver<'ir> {
    ir: &'ir Introspection,
    surface: Surface<'ir>,
    worklist: VecDeque<&'ir str>,
}

impl<'ir> SurfaceResolver<'ir> {
    /// Resolver over `ir` with nothing visited yet.
    pub fn new(ir: &'ir Introspection) -> Self {
        Self {
            ir,
            surface: Surface::default(),
            worklist: VecDeque::new(),
        }
    }

    /// Walk every action and collect what it reaches.
    pub fn resolve(mut self) -> Result<Surface<'ir>, GenerateError> {
        let ir = self.ir;
        for site in ir.actions() {
            let origin = format!("{}#{}", site.resource_keys.join("."), site.name);
            let action = site.action;

            let undeclared = action
                .raises
                .iter()
                .find(|code| !ir.error_codes.contains_key(code.as_str()));
            if let Some(code) = undeclared {
                return Err(GenerateError::IrDefect {
                    kind: DefinitionKind::ErrorCode,
                    name: code.clone(),
                    referenced_by: origin,
                });
            }
            self.visit_shape(&action.request.query, &origin)?;
            self.visit_shape(&action.request.body, &origin)?;
            if let Some(body) = action.response.rendered_body() {
                self.visit_field(body, &origin)?;
            }
            self.drain()?;
        }

        debug!(
            types = self.surface.types.len(),
            enums = self.surface.enums.len(),
            declared_types = ir.types.len(),
            declared_enums = ir.enums.len(),
            "Resolved reachable surface."
        );
        Ok(self.surface)
    }

    /// Walk queued type definitions until no unseen references remain.
    fn drain(&mut self) -> Result<(), GenerateError> {
        while let Some(name) = self.worklist.pop_front() {
            let Some(def) = self.surface.types.get(name).copied() else {
                continue;
            };
            trace!(type_name = name, "Walking type definition.");
            match def {
                TypeDef::Object(object) => {
                    for parent in &object.extends {
                        self.mark_type(parent, name)?;
                    }
                    self.visit_shape(&object.shape, name)?;
                }
                TypeDef::Union(union) => {
                    for variant in &union.union.variants {
                        self.visit_field(&variant.field, name)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn visit_shape(&mut self, shape: &'ir Shape, origin: &str) -> Result<(), GenerateError> {
        for field in shape.values() {
            self.visit_field(field, origin)?;
        }
        Ok(())
    }

    fn visit_field(&mut self, field: &'ir Field, origin: &str) -> Result<(), GenerateError> {
        if let Some(EnumAttr::Named(name)) = &field.enum_attr {
            self.mark_enum(name, origin)?;
        }

        match &field.kind {
            FieldKind::Reference(name) => self.mark_type(name, origin),
            FieldKind::ArrayOf(element) => self.visit_field(element, origin),
            FieldKind::Object(shape) => self.visit_shape(shape, origin),
            FieldKind::UnionOf(union) => {
                for variant in &union.variants {
                    self.visit_field(&variant.field, origin)?;
                }
                Ok(())
            }
            FieldKind::Primitive(_) | FieldKind::Literal(_) => Ok(()),
        }
    }

    fn mark_type(&mut self, name: &'ir str, origin: &str) -> Result<(), GenerateError> {
        if self.surface.types.contains_key(name) {
            return Ok(());
        }
        let Some((key, def)) = self.ir.types.get_key_value(name) else {
            return Err(GenerateError::IrDefect {
                kind: DefinitionKind::Type,
                name: name.to_string(),
                referenced_by: origin.to_string(),
            });
        };
        self.surface.types.insert(key.as_str(), def);
        self.worklist.push_back(key.as_str());
        Ok(())
    }

    fn mark_enum(&mut self, name: &'ir str, origin: &str) -> Result<(), GenerateError> {
        if self.surface.enums.contains_key(name) {
            return Ok(());
        }
        let Some((key, def)) = self.ir.enums.get_key_value(name) else {
            return Err(GenerateError::IrDefect {
                kind: DefinitionKind::Enum,
                name: name.to_string(),
                referenced_by: origin.to_string(),
            });
        };
        self.surface.enums.insert(key.as_str(), def);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn names<'a, V>(map: &IndexMap<&'a str, V>) -> Vec<&'a str> {
        map.keys().copied().collect()
    }

    #[test]
    fn test_orphans_are_excluded() {
        let ir = Introspection::from_json(
            r#"{
                "resources": { "customers": { "actions": { "show": {
                    "response": { "body": { "type": "reference", "to": "address" } }
                } } } },
                "types": {
                    "orphan": { "type": "object", "shape": { "unused": { "type": "string" } } },
                    "address": { "type": "object", "shape": { "street": { "type": "string" } } }
                },
                "enums": { "orphan_enum": { "values": ["unused"] } }
            }"#,
        )
        .unwrap();
        let surface = resolve(&ir).unwrap();
        assert_eq!(names(&surface.types), vec!["address"]);
        assert!(surface.enums.is_empty());
    }

    #[test]
    fn test_enum_references_are_transitive() {
        let ir = Introspection::from_json(
            r#"{
                "resources": { "invoices": { "actions": { "show": {
                    "response": { "body": { "type": "reference", "to": "invoice" } }
                } } } },
                "types": {
                    "invoice": { "type": "object", "shape": {
                        "status": { "type": "string", "enum": "invoice_status" },
                        "currency": { "type": "string", "enum": ["eur", "usd"] }
                    } }
                },
                "enums": {
                    "invoice_status": { "values": ["draft", "sent", "paid"] },
                    "orphan_enum": { "values": ["unused"] }
                }
            }"#,
        )
        .unwrap();
        let surface = resolve(&ir).unwrap();
        assert_eq!(names(&surface.types), vec!["invoice"]);
        assert_eq!(names(&surface.enums), vec!["invoice_status"]);
    }

    #[test]
    fn test_walks_nested_inline_shapes_extends_and_unions() {
        let ir = Introspection::from_json(
            r#"{
                "resources": { "orders": {
                    "actions": { "create": {
                        "method": "POST",
                        "request": {
                            "query": { "expand": { "type": "string", "enum": "expansion" } },
                            "body": { "order": { "type": "object", "shape": {
                                "lines": { "type": "array", "of": { "type": "union", "variants": [
                                    { "type": "reference", "to": "product_line" },
                                    { "type": "object", "shape": { "note": { "type": "reference", "to": "note" } } }
                                ] } }
                            } } }
                        }
                    } },
                    "resources": { "items": { "actions": { "index": {
                        "response": { "body": { "type": "array", "of": { "type": "reference", "to": "item" } } }
                    } } } }
                } },
                "types": {
                    "item": { "type": "object", "shape": {} },
                    "base_line": { "type": "object", "shape": { "id": { "type": "uuid" } } },
                    "product_line": { "type": "object", "extends": ["base_line"], "shape": {} },
                    "note": { "type": "object", "shape": {} }
                },
                "enums": { "expansion": { "values": ["lines"] } }
            }"#,
        )
        .unwrap();
        let surface = resolve(&ir).unwrap();
        assert_eq!(
            names(&surface.types),
            vec!["product_line", "note", "base_line", "item"]
        );
        assert_eq!(names(&surface.enums), vec!["expansion"]);
    }

    #[test]
    fn test_cycles_terminate() {
        let ir = Introspection::from_json(
            r#"{
                "resources": { "nodes": { "actions": { "show": {
                    "response": { "body": { "type": "reference", "to": "node" } }
                } } } },
                "types": {
                    "node": { "type": "object", "shape": {
                        "value": { "type": "string" },
                        "children": { "type": "array", "of": { "type": "reference", "to": "node" } },
                        "owner": { "type": "reference", "to": "person" }
                    } },
                    "person": { "type": "object", "shape": {
                        "favorite": { "type": "reference", "to": "node", "nullable": true }
                    } }
                }
            }"#,
        )
        .unwrap();
        let surface = resolve(&ir).unwrap();
        assert_eq!(names(&surface.types), vec!["node", "person"]);
    }

    #[test]
    fn test_missing_reference_is_an_ir_defect() {
        let ir = Introspection::from_json(
            r#"{
                "resources": { "invoices": { "actions": { "show": {
                    "response": { "body": { "type": "reference", "to": "invoice" } }
                } } } },
                "types": {
                    "invoice": { "type": "object", "shape": { "customer": { "type": "reference", "to": "customer" } } }
                }
            }"#,
        )
        .unwrap();
        let err = resolve(&ir).unwrap_err();
        match err {
            GenerateError::IrDefect {
                kind,
                name,
                referenced_by,
            } => {
                assert_eq!(kind, DefinitionKind::Type);
                assert_eq!(name, "customer");
                assert_eq!(referenced_by, "invoice");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_enum_from_action_names_the_action() {
        let ir = Introspection::from_json(
            r#"{
                "resources": { "invoices": { "actions": { "index": {
                    "request": { "query": { "status": { "type": "string", "enum": "invoice_status" } } }
                } } } }
            }"#,
        )
        .unwrap();
        let err = resolve(&ir).unwrap_err();
        assert_eq!(
            err.to_string(),
            "IR defect: invoices#index references undeclared enum 'invoice_status'"
        );
    }

    #[test]
    fn test_no_content_response_body_is_not_walked() {
        let ir = Introspection::from_json(
            r#"{
                "resources": { "invoices": { "actions": { "destroy": {
                    "method": "DELETE",
                    "response": { "no_content": true, "body": { "type": "reference", "to": "invoice" } }
                } } } },
                "types": { "invoice": { "type": "object", "shape": {} } }
            }"#,
        )
        .unwrap();
        assert!(resolve(&ir).unwrap().types.is_empty());
    }

    #[test]
    fn test_undeclared_error_code_is_an_ir_defect() {
        let ir = Introspection::from_json(
            r#"{
                "error_codes": { "not_found": { "status": 404 } },
                "resources": { "invoices": { "actions": { "destroy": {
                    "method": "DELETE",
                    "raises": ["not_found", "gone"]
                } } } }
            }"#,
        )
        .unwrap();
        let err = resolve(&ir).unwrap_err();
        assert_eq!(
            err.to_string(),
            "IR defect: invoices#destroy references undeclared error code 'gone'"
        );
    }
}
