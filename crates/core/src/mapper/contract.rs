//! Typed contract-surface module.
//!
//! Emits the Zod enum and type declarations followed by a single
//! `contract` constant that mirrors the resource tree:
//!
//! ```text
//! export const contract = {
//!   invoices: {
//!     show: { method: "GET", path: "/invoices/:id", pathParams: ..., errors: [] },
//!   },
//! } as const;
//! ```

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::analysis::SortedSurface;
use crate::error::GenerateError;
use crate::ir::{ActionSite, Introspection, path_params};
use crate::ts::{Emit, JsDoc, TsConst, TsExpr, TsItem};

use super::primitives::ZodVersion;
use super::zod::ZodMapper;
use super::{Artifact, Generator, MapOptions};

/// Generator for the contract-surface module.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContractGenerator;

impl Generator for ContractGenerator {
    fn name(&self) -> &'static str {
        "contract"
    }

    fn description(&self) -> &'static str {
        "Typed contract surface backed by Zod schemas"
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
        let mut tree = ContractNode::default();
        let sites = ir.actions();
        for site in &sites {
            tree.insert(site, action_entry(&mapper, site));
        }

        let mut module = mapper.module();
        module.items.push(TsItem::Const(TsConst {
            name: "contract".to_string(),
            doc: JsDoc::default(),
            ty: None,
            init: TsExpr::AsConst(Box::new(tree.into_expr())),
        }));
        debug!(
            version = options.version,
            actions = sites.len(),
            "Rendered contract module."
        );
        Ok(Artifact::Source(module.emit()))
    }
}

#[derive(Debug)]
enum ContractEntry {
    Action(TsExpr),
    Resource(ContractNode),
}

/// One level of the contract tree, keys sorted.
#[derive(Debug, Default)]
struct ContractNode {
    entries: BTreeMap<String, ContractEntry>,
}

impl ContractNode {
    /// Place an action under its resource chain. A resource's actions are
    /// visited before its nested resources, so on a key collision the action
    /// wins and the nested resource's action is dropped.
    fn insert(&mut self, site: &ActionSite<'_>, action: TsExpr) {
        let mut node = self;
        for key in &site.resource_keys {
            let entry = node
                .entries
                .entry((*key).to_string())
                .or_insert_with(|| ContractEntry::Resource(ContractNode::default()));
            match entry {
                ContractEntry::Resource(child) => node = child,
                ContractEntry::Action(_) => {
                    warn!(
                        resource = *key,
                        action = site.name,
                        path = %site.path,
                        "Contract key collides with an action; skipping."
                    );
                    return;
                }
            }
        }
        if node.entries.contains_key(site.name) {
            warn!(
                action = site.name,
                path = %site.path,
                "Contract key collides with a resource; skipping."
            );
            return;
        }
        node.entries.insert(site.name.to_string(), ContractEntry::Action(action));
    }

    fn into_expr(self) -> TsExpr {
        TsExpr::Object(
            self.entries
                .into_iter()
                .map(|(key, entry)| {
                    let value = match entry {
                        ContractEntry::Action(expr) => expr,
                        ContractEntry::Resource(node) => node.into_expr(),
                    };
                    (key, value)
                })
                .collect(),
        )
    }
}

fn action_entry(mapper: &ZodMapper<'_, '_>, site: &ActionSite<'_>) -> TsExpr {
    let action = site.action;
    let path_schema = TsExpr::Object(
        path_params(&site.path)
            .into_iter()
            .map(|name| (name.to_string(), TsExpr::call("z.string", vec![])))
            .collect(),
    );

    let mut entries = vec![
        ("method".to_string(), TsExpr::string(action.method.as_str())),
        ("path".to_string(), TsExpr::string(site.path.as_str())),
        (
            "pathParams".to_string(),
            TsExpr::call("z.object", vec![path_schema]),
        ),
    ];
    if !action.request.query.is_empty() {
        entries.push(("query".to_string(), mapper.object(&action.request.query)));
    }
    if !action.request.body.is_empty() {
        entries.push(("body".to_string(), mapper.object(&action.request.body)));
    }
    if let Some(body) = action.response.rendered_body() {
        entries.push(("response".to_string(), mapper.field(body)));
    }
    entries.push((
        "errors".to_string(),
        TsExpr::Array(action.raises.iter().map(|code| TsExpr::string(code.as_str())).collect()),
    ));
    TsExpr::Object(entries)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::analysis::sort;
    use crate::naming::KeyFormat;
    use crate::surface::resolve;

    fn generate(json: &str) -> String {
        let ir = Introspection::from_json(json).unwrap();
        let surface = resolve(&ir).unwrap();
        let sorted = sort(&surface);
        let options = MapOptions {
            version: "4",
            key_format: KeyFormat::Keep,
        };
        match ContractGenerator.map(&ir, &sorted, &options).unwrap() {
            Artifact::Source(text) => text,
            Artifact::Document(_) => panic!("expected source"),
        }
    }

    const IR: &str = r#"{
        "error_codes": { "not_found": { "status": 404 } },
        "resources": {
            "invoices": {
                "actions": {
                    "show": {
                        "path": "/:id",
                        "raises": ["not_found"],
                        "response": { "body": { "type": "reference", "to": "invoice" } }
                    },
                    "create": {
                        "method": "POST",
                        "request": { "body": { "number": { "type": "string" } } },
                        "response": { "no_content": true }
                    }
                },
                "resources": { "lines": {
                    "path": "/:invoice_id/lines",
                    "actions": { "index": {
                        "request": { "query": { "page": { "type": "integer", "optional": true } } }
                    } }
                } }
            }
        },
        "types": { "invoice": { "type": "object", "shape": { "number": { "type": "string" } } } }
    }"#;

    #[test]
    fn test_contract_mirrors_resource_tree() {
        let output = generate(IR);
        assert!(output.starts_with("import { z } from \"zod\";\n\n"), "{output}");
        assert!(output.contains("export const InvoiceSchema = z.object({"), "{output}");
        assert!(!output.contains("InvoicesShowResponse"), "{output}");

        let contract = output.split("export const contract = ").nth(1).unwrap();
        let expected = r#"{
  invoices: {
    create: {
      method: "POST",
      path: "/invoices",
      pathParams: z.object({}),
      body: z.object({
        number: z.string(),
      }),
      errors: [],
    },
    lines: {
      index: {
        method: "GET",
        path: "/invoices/:invoice_id/lines",
        pathParams: z.object({
          invoice_id: z.string(),
        }),
        query: z.object({
          page: z.int().optional(),
        }),
        errors: [],
      },
    },
    show: {
      method: "GET",
      path: "/invoices/:id",
      pathParams: z.object({
        id: z.string(),
      }),
      response: InvoiceSchema,
      errors: ["not_found"],
    },
  },
} as const;
"#;
        assert_eq!(contract, expected);
    }

    #[test]
    fn test_action_wins_key_collision() {
        let output = generate(
            r#"{
                "resources": { "reports": {
                    "actions": { "export": { "method": "POST" } },
                    "resources": { "export": { "actions": { "show": {} } } }
                } }
            }"#,
        );
        assert!(output.contains("export: {\n      method: \"POST\""), "{output}");
        assert!(!output.contains("show:"), "{output}");
    }
}
