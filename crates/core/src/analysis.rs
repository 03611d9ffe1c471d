//! Reference graph analysis over the reachable surface.
//!
//! Produces the emission order for named types and the [`Emission`] marker
//! each mapper consumes: types that reference themselves, or that cannot be
//! ordered because of a multi-type cycle, are emitted as
//! [`Emission::Deferred`] and rendered through the mapper's deferred hook.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexSet;
use tracing::debug;

use crate::ir::{EnumDef, Field, FieldKind, PrimitiveKind, Shape, TypeDef};
use crate::surface::Surface;

/// Which referenced names [`references`] reports.
#[derive(Debug, Clone, Copy)]
pub enum RefFilter<'a> {
    /// Follow every reference.
    All,
    /// Skip names that collide with built-in primitive kinds.
    CustomOnly,
    /// Only names contained in the given set.
    Subset(&'a IndexSet<&'a str>),
}

impl RefFilter<'_> {
    fn admits(&self, name: &str) -> bool {
        match self {
            RefFilter::All => true,
            RefFilter::CustomOnly => PrimitiveKind::from_name(name).is_none(),
            RefFilter::Subset(names) => names.contains(name),
        }
    }
}

/// Named types mentioned anywhere in `def`, in first-mention order.
///
/// Covers supertypes, shape fields, array elements, union variants and every
/// inline object or union nested inside them.
pub fn references<'ir>(def: &'ir TypeDef, filter: RefFilter<'_>) -> IndexSet<&'ir str> {
    let mut found = IndexSet::new();
    match def {
        TypeDef::Object(object) => {
            for parent in &object.extends {
                if filter.admits(parent) {
                    found.insert(parent.as_str());
                }
            }
            collect_shape(&object.shape, filter, &mut found);
        }
        TypeDef::Union(union) => {
            for variant in &union.union.variants {
                collect_field(&variant.field, filter, &mut found);
            }
        }
    }
    found
}

fn collect_shape<'ir>(shape: &'ir Shape, filter: RefFilter<'_>, found: &mut IndexSet<&'ir str>) {
    for field in shape.values() {
        collect_field(field, filter, found);
    }
}

fn collect_field<'ir>(field: &'ir Field, filter: RefFilter<'_>, found: &mut IndexSet<&'ir str>) {
    match &field.kind {
        FieldKind::Reference(name) => {
            if filter.admits(name) {
                found.insert(name.as_str());
            }
        }
        FieldKind::ArrayOf(element) => collect_field(element, filter, found),
        FieldKind::Object(shape) => collect_shape(shape, filter, found),
        FieldKind::UnionOf(union) => {
            for variant in &union.variants {
                collect_field(&variant.field, filter, found);
            }
        }
        FieldKind::Primitive(_) | FieldKind::Literal(_) => {}
    }
}

/// Whether `def` mentions its own name.
pub fn is_self_referential(name: &str, def: &TypeDef) -> bool {
    references(def, RefFilter::All).contains(name)
}

/// Why a type is emitted with the target's deferred construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferReason {
    /// The type references itself.
    SelfReference,
    /// The type could not be ordered: it sits on, or behind, a multi-type cycle.
    Cycle,
}

/// How a type must be declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// Declared in place; everything it references is already declared.
    Direct,
    /// Declared with the target's forward-reference-safe construct.
    Deferred(DeferReason),
}

impl Emission {
    /// Whether the type needs a forward-reference-safe declaration.
    pub fn is_deferred(self) -> bool {
        matches!(self, Emission::Deferred(_))
    }
}

/// A named type in emission order.
#[derive(Debug, Clone, Copy)]
pub struct SortedType<'ir> {
    /// IR name.
    pub name: &'ir str,
    /// Its definition.
    pub def: &'ir TypeDef,
    /// How it must be declared.
    pub emission: Emission,
}

/// The reachable surface in emission order.
#[derive(Debug, Clone, Default)]
pub struct SortedSurface<'ir> {
    /// Types in dependency order; unorderable types last, in input order.
    pub types: Vec<SortedType<'ir>>,
    /// Enums sorted by name.
    pub enums: Vec<(&'ir str, &'ir EnumDef)>,
    positions: HashMap<&'ir str, usize>,
}

impl<'ir> SortedSurface<'ir> {
    /// Position and emission of a reachable type.
    pub fn get(&self, name: &str) -> Option<&SortedType<'ir>> {
        self.positions.get(name).map(|&index| &self.types[index])
    }

    /// Definition of a reachable type; `None` for anything outside the surface.
    pub fn type_def(&self, name: &str) -> Option<&'ir TypeDef> {
        self.get(name).map(|ty| ty.def)
    }

    /// Definition of a reachable enum.
    pub fn enum_def(&self, name: &str) -> Option<&'ir EnumDef> {
        self.enums
            .iter()
            .find(|(enum_name, _)| *enum_name == name)
            .map(|(_, def)| *def)
    }

    /// Whether `name` was marked deferred.
    pub fn is_deferred(&self, name: &str) -> bool {
        self.get(name).is_some_and(|ty| ty.emission.is_deferred())
    }

    /// Names of deferred types, in emission order.
    pub fn deferred(&self) -> impl Iterator<Item = &'ir str> + '_ {
        self.types
            .iter()
            .filter(|ty| ty.emission.is_deferred())
            .map(|ty| ty.name)
    }
}

/// Order the reachable surface for emission.
///
/// Kahn's algorithm over the induced reference graph. Among ready types the one
/// earliest in input order is placed first, so the result is stable across
/// runs. Self-edges never block placement. Types still unplaced once no type is
/// ready are appended in input order and marked [`DeferReason::Cycle`]; the
/// sort never fails.
pub fn sort<'ir>(surface: &Surface<'ir>) -> SortedSurface<'ir> {
    let names: IndexSet<&'ir str> = surface.types.keys().copied().collect();
    let defs: Vec<&'ir TypeDef> = surface.types.values().copied().collect();

    let mut self_referential = vec![false; names.len()];
    let mut in_degree = vec![0usize; names.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); names.len()];

    for (index, def) in defs.iter().enumerate() {
        for dependency in references(def, RefFilter::Subset(&names)) {
            let Some(dep_index) = names.get_index_of(dependency) else {
                continue;
            };
            if dep_index == index {
                self_referential[index] = true;
                continue;
            }
            in_degree[index] += 1;
            dependents[dep_index].push(index);
        }
    }

    let mut ready: BTreeSet<usize> = (0..names.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut placed = vec![false; names.len()];
    let mut order = Vec::with_capacity(names.len());

    while let Some(index) = ready.pop_first() {
        placed[index] = true;
        order.push(index);
        for &dependent in &dependents[index] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    let unresolved: Vec<usize> = (0..names.len()).filter(|&i| !placed[i]).collect();
    if !unresolved.is_empty() {
        debug!(
            types = ?unresolved.iter().map(|&i| names[i]).collect::<Vec<_>>(),
            "Deferring types caught in reference cycles."
        );
    }

    let mut types = Vec::with_capacity(names.len());
    for index in order {
        let emission = if self_referential[index] {
            Emission::Deferred(DeferReason::SelfReference)
        } else {
            Emission::Direct
        };
        types.push(SortedType {
            name: names[index],
            def: defs[index],
            emission,
        });
    }
    for index in unresolved {
        types.push(SortedType {
            name: names[index],
            def: defs[index],
            emission: Emission::Deferred(DeferReason::Cycle),
        });
    }

    let positions = types
        .iter()
        .enumerate()
        .map(|(position, ty)| (ty.name, position))
        .collect();

    let mut enums: Vec<(&'ir str, &'ir EnumDef)> = surface
        .enums
        .iter()
        .map(|(name, def)| (*name, *def))
        .collect();
    enums.sort_by_key(|(name, _)| *name);

    SortedSurface {
        types,
        enums,
        positions,
    }
}
