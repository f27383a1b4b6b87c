//! Type registry and recursive resolver.
//!
//! The registry owns raw declarations and expands any type reference into a
//! [`ResolvedType`] tree. Resolution never fails: unknown names degrade to
//! opaque scalars and back-references degrade to cycle markers.

mod expr;
mod precedence;
mod scalar;

pub use expr::strip_option;
pub use precedence::{Ranked, ShadowReason, Shadowed, select_by_precedence};
pub use scalar::{FOREIGN_SCALARS, PRIMITIVE_SCALARS, scalar_origin};

use crate::prelude::*;
use expr::{TypeExpr, last_segment};
use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet, HashMap},
    rc::Rc,
};

const OPTION_WRAPPERS: &[&str] = &["Option"];
const LIST_WRAPPERS: &[&str] = &["BTreeSet", "HashSet", "IndexSet", "Vec", "VecDeque"];
const MAP_WRAPPERS: &[&str] = &["BTreeMap", "HashMap", "IndexMap"];
const TRANSPARENT_WRAPPERS: &[&str] = &["Arc", "Box", "Rc"];

///
/// TypeRegistry
///
/// Raw declarations keyed by name, plus a memo cache of resolved trees.
/// The cache only ever grows and is private to one pipeline run; the
/// registry is intentionally not `Sync`.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeDefinition>,

    #[serde(skip)]
    cache: RefCell<HashMap<String, Memo>>,
}

impl PartialEq for TypeRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.types == other.types
    }
}

impl Eq for TypeRegistry {}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from scanned candidates, discarding lower-precedence duplicates
    /// before anything is registered.
    pub fn build(candidates: impl IntoIterator<Item = Ranked<TypeDefinition>>) -> (Self, Vec<Shadowed>) {
        let (kept, shadowed) = select_by_precedence(candidates);

        for s in &shadowed {
            tracing::debug!(
                name = %s.name,
                kept = %s.kept_source,
                discarded = %s.discarded_source,
                reason = %s.reason,
                "type definition shadowed"
            );
        }

        let mut registry = Self::new();
        for candidate in kept {
            registry.insert(candidate.item);
        }

        (registry, shadowed)
    }

    /// Register a definition. Clears the memo cache, since earlier results
    /// may have treated this name as opaque.
    pub fn insert(&mut self, def: TypeDefinition) {
        self.cache.get_mut().clear();
        self.types.insert(def.name.clone(), def);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDefinition)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether a resolved tree for this exact type string is memoized.
    #[must_use]
    pub fn is_cached(&self, type_name: &str) -> bool {
        self.cache.borrow().contains_key(type_name.trim())
    }

    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.borrow().len()
    }

    ///
    /// resolve
    ///
    /// Expand a type reference into its full structure. Top-level results
    /// are always memoized, so a repeat call is a single map lookup.
    ///
    #[must_use]
    pub fn resolve(&self, type_name: &str) -> Rc<ResolvedType> {
        let mut in_progress = BTreeSet::new();

        self.resolve_in(type_name, &mut in_progress).tree
    }

    // resolve_in
    // `in_progress` holds the registry keys on the current path
    fn resolve_in(&self, type_name: &str, in_progress: &mut BTreeSet<String>) -> Resolution {
        let key = type_name.trim();

        // a memoized tree is reusable only if it expands nothing that is
        // currently on the path; otherwise the path would see it twice
        if let Some(hit) = self.cache.borrow().get(key)
            && hit.reaches.is_disjoint(in_progress)
        {
            return Resolution {
                tree: Rc::clone(&hit.tree),
                open: BTreeSet::new(),
                reaches: Rc::clone(&hit.reaches),
            };
        }

        let resolution = self.dispatch(key, in_progress);

        // only path-independent trees are memoized
        if resolution.open.is_empty() {
            self.cache.borrow_mut().insert(
                key.to_string(),
                Memo {
                    tree: Rc::clone(&resolution.tree),
                    reaches: Rc::clone(&resolution.reaches),
                },
            );
        }

        resolution
    }

    fn dispatch(&self, key: &str, in_progress: &mut BTreeSet<String>) -> Resolution {
        let (base, args) = match TypeExpr::parse(key) {
            TypeExpr::Array(item) => {
                let item = self.resolve_in(item, in_progress);
                return item.map(|t| ResolvedType::list(t.clone()));
            }
            TypeExpr::Tuple => return Resolution::leaf(ResolvedType::opaque(key)),
            TypeExpr::Path { base, args } => (base, args),
        };
        let name = last_segment(base);

        // strip one layer of generic wrapping
        match args.as_slice() {
            [inner] if OPTION_WRAPPERS.contains(&name) => {
                return self
                    .resolve_in(inner, in_progress)
                    .map(|t| ResolvedType::optional(t.clone()));
            }
            [item] if LIST_WRAPPERS.contains(&name) => {
                return self
                    .resolve_in(item, in_progress)
                    .map(|t| ResolvedType::list(t.clone()));
            }
            [inner] if TRANSPARENT_WRAPPERS.contains(&name) => {
                return self.resolve_in(inner, in_progress);
            }
            [key_ty, value_ty] if MAP_WRAPPERS.contains(&name) => {
                let key = self.resolve_in(key_ty, in_progress);
                let value = self.resolve_in(value_ty, in_progress);
                let mut open = key.open;
                open.extend(value.open);
                let mut reaches = (*key.reaches).clone();
                reaches.extend(value.reaches.iter().cloned());

                return Resolution {
                    tree: Rc::new(ResolvedType::map(
                        (*key.tree).clone(),
                        (*value.tree).clone(),
                    )),
                    open,
                    reaches: Rc::new(reaches),
                };
            }
            _ => {}
        }

        if let Some(origin) = scalar_origin(name) {
            return Resolution::leaf(ResolvedType::scalar(name, origin));
        }

        // path entries are registry keys, whichever form matched
        let Some((found, def)) = self
            .types
            .get_key_value(name)
            .or_else(|| self.types.get_key_value(base))
        else {
            return Resolution::leaf(ResolvedType::opaque(key));
        };

        // cycle guard
        if in_progress.contains(found) {
            return Resolution {
                tree: Rc::new(ResolvedType::cycle(def.name.as_str())),
                open: BTreeSet::from([found.clone()]),
                reaches: Rc::default(),
            };
        }

        in_progress.insert(found.clone());
        let mut open = BTreeSet::new();
        let mut reaches = BTreeSet::from([found.clone()]);
        let tree = self.expand(def, in_progress, &mut open, &mut reaches);
        in_progress.remove(found);
        open.remove(found);

        Resolution {
            tree: Rc::new(tree),
            open,
            reaches: Rc::new(reaches),
        }
    }

    // expand
    // recurse into the declared body of a registered type
    fn expand(
        &self,
        def: &TypeDefinition,
        in_progress: &mut BTreeSet<String>,
        open: &mut BTreeSet<String>,
        reaches: &mut BTreeSet<String>,
    ) -> ResolvedType {
        let mut child = |ty: &str, in_progress: &mut BTreeSet<String>| {
            let r = self.resolve_in(ty, in_progress);
            open.extend(r.open);
            reaches.extend(r.reaches.iter().cloned());
            (*r.tree).clone()
        };

        match &def.body {
            DefinitionBody::Struct { fields } => ResolvedType::Struct {
                name: def.name.clone(),
                fields: fields
                    .iter()
                    .map(|f| TypeField {
                        name: f.name.clone(),
                        ty: f.ty.clone(),
                        optional: f.optional,
                        resolved: child(&f.ty, in_progress),
                    })
                    .collect(),
            },

            DefinitionBody::Newtype { inner_type } => ResolvedType::Newtype {
                name: def.name.clone(),
                inner: Box::new(child(inner_type, in_progress)),
            },

            DefinitionBody::Enum {
                variants,
                tagging,
                rename_rule,
            } => ResolvedType::Enum {
                name: def.name.clone(),
                variants: variants
                    .iter()
                    .map(|v| EnumVariant {
                        name: v.name.clone(),
                        shape: match &v.shape {
                            RawVariantShape::Unit => VariantShape::Unit,
                            RawVariantShape::Struct { fields } => VariantShape::Struct {
                                fields: fields
                                    .iter()
                                    .map(|f| TypeField {
                                        name: f.name.clone(),
                                        ty: f.ty.clone(),
                                        optional: f.optional,
                                        resolved: child(&f.ty, in_progress),
                                    })
                                    .collect(),
                            },
                            RawVariantShape::Tuple { types } => VariantShape::Tuple {
                                types: types.iter().map(|t| child(t, in_progress)).collect(),
                            },
                        },
                    })
                    .collect(),
                tagging: *tagging,
                rename_rule: *rename_rule,
            },
        }
    }
}

///
/// Memo
/// cached tree plus every declared name expanded inside it
///

#[derive(Clone, Debug)]
struct Memo {
    tree: Rc<ResolvedType>,
    reaches: Rc<BTreeSet<String>>,
}

///
/// Resolution
///
/// A resolved tree, the cycle targets it references that are still on the
/// caller's path, and the declared names it expands. A non-empty `open`
/// set makes the tree path-dependent.
///

struct Resolution {
    tree: Rc<ResolvedType>,
    open: BTreeSet<String>,
    reaches: Rc<BTreeSet<String>>,
}

impl Resolution {
    fn leaf(tree: ResolvedType) -> Self {
        Self {
            tree: Rc::new(tree),
            open: BTreeSet::new(),
            reaches: Rc::default(),
        }
    }

    fn map(self, f: impl FnOnce(&ResolvedType) -> ResolvedType) -> Self {
        Self {
            tree: Rc::new(f(&self.tree)),
            open: self.open,
            reaches: self.reaches,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn node_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.insert(TypeDefinition::structure(
            "Node",
            vec![
                RawField::new("value", "u32"),
                RawField::new("next", "Option<Box<Node>>").optional(true),
            ],
        ));
        registry
    }

    #[test]
    fn wrappers_strip_one_layer() {
        let registry = TypeRegistry::new();

        assert_eq!(
            *registry.resolve("Option<u64>"),
            ResolvedType::optional(ResolvedType::scalar("u64", ScalarOrigin::Primitive))
        );
        assert_eq!(
            *registry.resolve("HashSet<Uuid>"),
            ResolvedType::list(ResolvedType::scalar("Uuid", ScalarOrigin::Foreign))
        );
        assert_eq!(
            *registry.resolve("BTreeMap<String, Mystery>"),
            ResolvedType::map(
                ResolvedType::scalar("String", ScalarOrigin::Primitive),
                ResolvedType::opaque("Mystery"),
            )
        );
    }

    #[test]
    fn qualified_foreign_scalar_uses_bare_name() {
        let registry = TypeRegistry::new();

        assert_eq!(
            *registry.resolve("chrono::DateTime<Utc>"),
            ResolvedType::scalar("DateTime", ScalarOrigin::Foreign)
        );
    }

    #[test]
    fn unknown_name_is_opaque_literal() {
        let registry = TypeRegistry::new();

        assert_eq!(
            *registry.resolve("es_entity::Idempotent<Foo>"),
            ResolvedType::opaque("es_entity::Idempotent<Foo>")
        );
    }

    #[test]
    fn self_reference_ends_in_cycle_marker() {
        let registry = node_registry();
        let tree = registry.resolve("Node");

        let ResolvedType::Struct { fields, .. } = &*tree else {
            panic!("expected struct, got {tree:?}");
        };
        assert_eq!(
            fields[1].resolved,
            ResolvedType::optional(ResolvedType::cycle("Node"))
        );
        assert_eq!(tree.cycle_targets(), BTreeSet::from(["Node".to_string()]));
    }

    #[test]
    fn qualified_self_reference_ends_in_cycle_marker() {
        let mut registry = TypeRegistry::new();
        registry.insert(TypeDefinition::structure(
            "graph::Node",
            vec![RawField::new("next", "Option<Box<graph::Node>>").optional(true)],
        ));

        let tree = registry.resolve("graph::Node");

        let ResolvedType::Struct { fields, .. } = &*tree else {
            panic!("expected struct, got {tree:?}");
        };
        assert_eq!(
            fields[0].resolved,
            ResolvedType::optional(ResolvedType::cycle("graph::Node"))
        );
        assert!(registry.is_cached("graph::Node"));
    }

    #[test]
    fn second_resolve_is_served_from_cache() {
        let registry = node_registry();

        let first = registry.resolve("Node");
        assert!(registry.is_cached("Node"));
        let second = registry.resolve("Node");

        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn path_dependent_subtrees_are_not_memoized() {
        let mut registry = TypeRegistry::new();
        registry.insert(TypeDefinition::structure(
            "A",
            vec![RawField::new("b", "B")],
        ));
        registry.insert(TypeDefinition::structure(
            "B",
            vec![RawField::new("a", "A")],
        ));

        let a = registry.resolve("A");
        assert!(registry.is_cached("A"));
        assert!(!registry.is_cached("B"), "B saw A as a cycle, shape is path-dependent");

        // resolving B directly expands A beneath it, and does not reuse the
        // memoized A (which already contains a B)
        let b = registry.resolve("B");
        assert_eq!(a.depth(), b.depth());
        let ResolvedType::Struct { fields, .. } = &*b else {
            panic!("expected struct");
        };
        assert_eq!(fields[0].resolved.kind(), "struct");
        assert_eq!(b.cycle_targets(), BTreeSet::from(["B".to_string()]));
    }

    #[test]
    fn insert_invalidates_cache() {
        let mut registry = TypeRegistry::new();
        assert_eq!(*registry.resolve("Terms"), ResolvedType::opaque("Terms"));

        registry.insert(TypeDefinition::newtype("Terms", "u32"));

        assert_eq!(registry.resolve("Terms").kind(), "newtype");
    }

    #[test]
    fn enum_variants_resolve_each_shape() {
        let mut registry = TypeRegistry::new();
        registry.insert(
            TypeDefinition::enumeration(
                "Duration",
                vec![
                    RawVariant::unit("Open"),
                    RawVariant::tuple("Months", vec!["u32".to_string()]),
                    RawVariant::structure("Custom", vec![RawField::new("days", "u16")]),
                ],
            )
            .with_serde(TaggingMode::Adjacent, Some(RenameRule::Snake)),
        );

        let ResolvedType::Enum {
            variants,
            tagging,
            rename_rule,
            ..
        } = &*registry.resolve("Duration")
        else {
            panic!("expected enum");
        };

        assert_eq!(*tagging, TaggingMode::Adjacent);
        assert_eq!(*rename_rule, Some(RenameRule::Snake));
        assert!(variants[0].is_unit());
        assert_eq!(
            variants[1].shape,
            VariantShape::Tuple {
                types: vec![ResolvedType::scalar("u32", ScalarOrigin::Primitive)]
            }
        );
    }

    #[test]
    fn build_discards_lower_precedence_before_registering() {
        let (registry, shadowed) = TypeRegistry::build([
            Ranked::new(
                "Terms",
                "lana/app/terms.rs",
                0,
                TypeDefinition::newtype("Terms", "String"),
            ),
            Ranked::new(
                "Terms",
                "core/credit/terms.rs",
                10,
                TypeDefinition::newtype("Terms", "u32"),
            ),
        ]);

        assert_eq!(registry.len(), 1);
        assert_eq!(shadowed.len(), 1);
        let ResolvedType::Newtype { inner, .. } = &*registry.resolve("Terms") else {
            panic!("expected newtype");
        };
        assert_eq!(**inner, ResolvedType::scalar("u32", ScalarOrigin::Primitive));
    }
}
