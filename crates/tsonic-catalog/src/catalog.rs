//! `UnifiedTypeCatalog` (`spec.md` §4.3).
//!
//! Fuses the source-authored catalog and the assembly catalog behind
//! one lookup surface. INV-CLR: every nominal lookup goes through this
//! type; no other component keeps a parallel type store.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{trace, warn};

use tsonic_common::diagnostics::TSN;
use tsonic_common::{Diagnostic, DiagnosticsCollector};

use crate::entry::{MemberEntry, NominalEntry, Origin};
use crate::stable_id::StableId;
use crate::type_id::{primitive_type_id, TypeId};

/// A type reference with nullability and generic arguments, the unit
/// `isAssignable` reasons about (INV-NULLABLE, and — via
/// `type_arguments` — variance-respecting generic substitution).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    pub type_id: TypeId,
    pub nullable: bool,
    pub type_arguments: Vec<TypeRef>,
}

impl TypeRef {
    pub fn non_null(type_id: TypeId) -> Self {
        Self { type_id, nullable: false, type_arguments: Vec::new() }
    }

    pub fn nullable(type_id: TypeId) -> Self {
        Self { type_id, nullable: true, type_arguments: Vec::new() }
    }

    pub fn generic(type_id: TypeId, nullable: bool, type_arguments: Vec<TypeRef>) -> Self {
        Self { type_id, nullable, type_arguments }
    }
}

/// Numeric widening rank (`spec.md` §4.3 "numeric widening per
/// INV-NUM"). A value of a lower rank implicitly widens to a higher
/// rank within the same family; `Decimal` only receives from the
/// integral family, matching the target's own implicit-conversion
/// rules.
fn numeric_rank(clr_name: &str) -> Option<u8> {
    match clr_name {
        "Byte" => Some(0),
        "Int16" => Some(1),
        "Int32" => Some(2),
        "Int64" => Some(3),
        "Single" => Some(4),
        "Double" => Some(5),
        _ => None,
    }
}

#[derive(Default)]
pub struct UnifiedTypeCatalog {
    entries: FxHashMap<StableId, NominalEntry>,
    /// tsName -> stableId. A real compiler would scope this by module;
    /// this catalog keeps one flat namespace per compilation, which is
    /// sufficient for the contract this spec asks for (`resolveTsName`
    /// takes a `scope` parameter for forward compatibility but this
    /// catalog does not yet need to discriminate on it — see
    /// `DESIGN.md`).
    ts_index: FxHashMap<String, StableId>,
    clr_index: FxHashMap<String, StableId>,
}

impl UnifiedTypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type declared in this compilation. If an assembly
    /// type with the same stable id was already loaded, the source
    /// declaration wins and a shadowing diagnostic is emitted
    /// (INV-CLR).
    pub fn register_source(&mut self, entry: NominalEntry, diagnostics: &mut DiagnosticsCollector) {
        debug_assert_eq!(entry.origin, Origin::Source);
        if let Some(existing) = self.entries.get(&entry.type_id.stable_id) {
            if existing.origin == Origin::Assembly {
                diagnostics.push(Diagnostic::new(
                    TSN::SHADOWED_STABLE_ID,
                    "",
                    0,
                    0,
                    &[entry.type_id.stable_id.as_str()],
                ));
            }
        }
        self.insert(entry);
    }

    /// Register a type loaded from an assembly manifest. Duplicate
    /// loads of the same stable id across two assemblies are diagnosed
    /// but the first-loaded assembly wins (`spec.md` §9 Open Questions).
    /// A source declaration already present always wins over an
    /// assembly declaration, regardless of load order (INV-CLR).
    pub fn register_assembly(&mut self, entry: NominalEntry, diagnostics: &mut DiagnosticsCollector) {
        debug_assert_eq!(entry.origin, Origin::Assembly);
        if let Some(existing) = self.entries.get(&entry.type_id.stable_id) {
            match existing.origin {
                Origin::Source => {
                    trace!(stable_id = %entry.type_id.stable_id, "source declaration shadows assembly type");
                    return;
                }
                Origin::Assembly => {
                    warn!(stable_id = %entry.type_id.stable_id, "duplicate assembly stable id");
                    diagnostics.push(Diagnostic::new(
                        TSN::DUPLICATE_ASSEMBLY_STABLE_ID,
                        "",
                        0,
                        0,
                        &[entry.type_id.stable_id.as_str()],
                    ));
                    return;
                }
            }
        }
        self.insert(entry);
    }

    fn insert(&mut self, entry: NominalEntry) {
        self.ts_index.insert(entry.type_id.ts_name.clone(), entry.type_id.stable_id.clone());
        self.clr_index.insert(entry.type_id.clr_name.clone(), entry.type_id.stable_id.clone());
        self.entries.insert(entry.type_id.stable_id.clone(), entry);
    }

    /// `resolveTsName(tsName, scope) -> TypeId?`. Primitive scalar
    /// names resolve without consulting the registered entries at all.
    pub fn resolve_ts_name(&self, ts_name: &str, _scope: &str) -> Option<TypeId> {
        if let Some(id) = primitive_type_id(ts_name) {
            return Some(id);
        }
        let stable_id = self.ts_index.get(ts_name)?;
        self.entries.get(stable_id).map(|e| e.type_id.clone())
    }

    /// `resolveClrName(fqName) -> TypeId?`.
    pub fn resolve_clr_name(&self, fq_name: &str) -> Option<TypeId> {
        if let Some(ts_name) = crate::type_id::primitive_source_name(fq_name) {
            return primitive_type_id(ts_name);
        }
        let stable_id = self.clr_index.get(fq_name)?;
        self.entries.get(stable_id).map(|e| e.type_id.clone())
    }

    pub fn get_entry(&self, type_id: &TypeId) -> Option<&NominalEntry> {
        self.entries.get(&type_id.stable_id)
    }

    /// `lookupMember(TypeId, memberName) -> MemberEntry?`. Method
    /// resolution order: self, then each direct parent left-to-right in
    /// declaration order, then implemented interfaces. A visited-set
    /// guards against a heritage cycle re-entering a type already on
    /// the walk (`spec.md` §9 "Design Notes — Cyclic graphs").
    pub fn lookup_member(&self, type_id: &TypeId, member_name: &str) -> Option<&MemberEntry> {
        let mut visited = FxHashSet::default();
        self.lookup_member_inner(type_id, member_name, &mut visited)
    }

    fn lookup_member_inner<'a>(
        &'a self,
        type_id: &TypeId,
        member_name: &str,
        visited: &mut FxHashSet<StableId>,
    ) -> Option<&'a MemberEntry> {
        if !visited.insert(type_id.stable_id.clone()) {
            return None;
        }
        let entry = self.get_entry(type_id)?;
        if let Some(m) = entry.own_member(member_name) {
            return Some(m);
        }
        for parent in &entry.parents {
            if let Some(m) = self.lookup_member_inner(parent, member_name, visited) {
                return Some(m);
            }
        }
        for iface in &entry.interfaces {
            if let Some(m) = self.lookup_member_inner(iface, member_name, visited) {
                return Some(m);
            }
        }
        None
    }

    /// `isAssignable(from, to) -> bool` (`spec.md` §4.3: "identity,
    /// numeric widening per INV-NUM, nullable↔non-nullable, heritage,
    /// and variance-respecting generic substitution"). General
    /// structural widening over non-nominal IR shapes (unions, object
    /// types) stays the IR converter's job — this method only answers
    /// questions about *nominal* identity, numeric rank, inheritance,
    /// and generic-argument variance (see `DESIGN.md`).
    pub fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> bool {
        if from.nullable && !to.nullable {
            return false;
        }
        if from.type_id == to.type_id {
            return self.type_arguments_assignable(&from.type_id, &from.type_arguments, &to.type_arguments);
        }
        if self.is_numeric_widening(&from.type_id, &to.type_id) {
            return true;
        }
        self.is_in_heritage(&from.type_id, &to.type_id, &mut FxHashSet::default())
    }

    fn is_numeric_widening(&self, from: &TypeId, to: &TypeId) -> bool {
        let Some(from_rank) = numeric_rank(&from.clr_name) else { return false };
        let Some(to_rank) = numeric_rank(&to.clr_name) else { return false };
        from_rank < to_rank
    }

    /// Checks each generic argument against the declared variance of
    /// the corresponding type parameter (`spec.md` §3 "type parameters
    /// (name + variance + constraint TypeIds)"). A type with no
    /// registered entry (a primitive, or an unresolved reference) or a
    /// mismatched arity has no generic-argument constraint to violate.
    fn type_arguments_assignable(&self, type_id: &TypeId, from_args: &[TypeRef], to_args: &[TypeRef]) -> bool {
        if from_args.is_empty() && to_args.is_empty() {
            return true;
        }
        if from_args.len() != to_args.len() {
            return false;
        }
        let Some(entry) = self.get_entry(type_id) else { return from_args == to_args };
        if entry.type_parameters.len() != from_args.len() {
            return from_args == to_args;
        }
        entry.type_parameters.iter().zip(from_args.iter().zip(to_args.iter())).all(|(param, (from_arg, to_arg))| match param.variance {
            crate::entry::Variance::Invariant => from_arg == to_arg,
            crate::entry::Variance::Covariant => self.is_assignable(from_arg, to_arg),
            crate::entry::Variance::Contravariant => self.is_assignable(to_arg, from_arg),
        })
    }

    fn is_in_heritage(&self, from: &TypeId, to: &TypeId, visited: &mut FxHashSet<StableId>) -> bool {
        if !visited.insert(from.stable_id.clone()) {
            return false;
        }
        let Some(entry) = self.get_entry(from) else { return false };
        for parent in entry.parents.iter().chain(entry.interfaces.iter()) {
            if parent == to || self.is_in_heritage(parent, to, visited) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::*;
    use indexmap::IndexMap;
    use smallvec::smallvec;

    fn class_entry(name: &str, parents: Vec<TypeId>) -> NominalEntry {
        NominalEntry {
            type_id: TypeId::new(StableId::source(name), name, name),
            origin: Origin::Source,
            kind: TypeKind::Class,
            accessibility: Accessibility::Public,
            is_sealed: false,
            is_abstract: false,
            type_parameters: smallvec![],
            parents: parents.into(),
            interfaces: smallvec![],
            members: IndexMap::new(),
        }
    }

    #[test]
    fn source_declaration_wins_over_assembly_with_same_stable_id() {
        let mut catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();

        let mut assembly_entry = class_entry("Widget", vec![]);
        assembly_entry.origin = Origin::Assembly;
        catalog.register_assembly(assembly_entry, &mut diagnostics);

        let mut source_entry = class_entry("Widget", vec![]);
        source_entry.kind = TypeKind::Struct;
        catalog.register_source(source_entry, &mut diagnostics);

        let id = TypeId::new(StableId::source("Widget"), "Widget", "Widget");
        assert_eq!(catalog.get_entry(&id).unwrap().kind, TypeKind::Struct);
        assert!(diagnostics.has_errors() == false);
        assert_eq!(diagnostics.len(), 1); // shadowing warning
    }

    #[test]
    fn lookup_member_walks_parents_before_interfaces() {
        let mut catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();

        let base_id = TypeId::new(StableId::source("Base"), "Base", "Base");
        let mut base = class_entry("Base", vec![]);
        base.members.insert(
            "name".to_string(),
            MemberEntry {
                ts_name: "name".to_string(),
                clr_name: "Name".to_string(),
                kind: MemberKind::Property,
                is_static: false,
                declared_type: Some(TypeId::new(StableId::source("Base"), "Base", "Base")),
                signatures: smallvec![],
            },
        );
        catalog.register_source(base, &mut diagnostics);

        let derived = class_entry("Derived", vec![base_id.clone()]);
        catalog.register_source(derived, &mut diagnostics);

        let derived_id = TypeId::new(StableId::source("Derived"), "Derived", "Derived");
        let member = catalog.lookup_member(&derived_id, "name").unwrap();
        assert_eq!(member.clr_name, "Name");
    }

    #[test]
    fn is_assignable_follows_heritage_chain() {
        let mut catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();

        let base_id = TypeId::new(StableId::source("Animal"), "Animal", "Animal");
        catalog.register_source(class_entry("Animal", vec![]), &mut diagnostics);
        catalog.register_source(class_entry("Dog", vec![base_id.clone()]), &mut diagnostics);

        let dog_id = TypeId::new(StableId::source("Dog"), "Dog", "Dog");
        assert!(catalog.is_assignable(&TypeRef::non_null(dog_id.clone()), &TypeRef::non_null(base_id)));
    }

    #[test]
    fn nullable_cannot_flow_into_non_nullable() {
        let catalog = UnifiedTypeCatalog::new();
        let string_id = primitive_type_id("string").unwrap();
        assert!(!catalog.is_assignable(&TypeRef::nullable(string_id.clone()), &TypeRef::non_null(string_id)));
    }

    #[test]
    fn number_and_double_resolve_to_the_same_type_id() {
        let catalog = UnifiedTypeCatalog::new();
        let number = catalog.resolve_ts_name("number", "").unwrap();
        let double = catalog.resolve_ts_name("double", "").unwrap();
        assert_eq!(number, double);
    }

    #[test]
    fn int_widens_to_long_and_double_but_not_the_reverse() {
        let catalog = UnifiedTypeCatalog::new();
        let int_ty = primitive_type_id("int").unwrap();
        let long_ty = primitive_type_id("long").unwrap();
        let number_ty = primitive_type_id("number").unwrap();

        assert!(catalog.is_assignable(&TypeRef::non_null(int_ty.clone()), &TypeRef::non_null(long_ty.clone())));
        assert!(catalog.is_assignable(&TypeRef::non_null(int_ty.clone()), &TypeRef::non_null(number_ty)));
        assert!(!catalog.is_assignable(&TypeRef::non_null(long_ty), &TypeRef::non_null(int_ty)));
    }

    #[test]
    fn string_and_int_are_not_numerically_assignable() {
        let catalog = UnifiedTypeCatalog::new();
        let string_ty = primitive_type_id("string").unwrap();
        let int_ty = primitive_type_id("int").unwrap();
        assert!(!catalog.is_assignable(&TypeRef::non_null(int_ty), &TypeRef::non_null(string_ty)));
    }

    fn generic_entry(name: &str, variance: Variance) -> NominalEntry {
        NominalEntry {
            type_id: TypeId::new(StableId::source(name), name, name),
            origin: Origin::Source,
            kind: TypeKind::Class,
            accessibility: Accessibility::Public,
            is_sealed: false,
            is_abstract: false,
            type_parameters: smallvec![TypeParamEntry { name: "T".to_string(), variance, constraint: None }],
            parents: smallvec![],
            interfaces: smallvec![],
            members: IndexMap::new(),
        }
    }

    #[test]
    fn covariant_generic_argument_follows_its_own_heritage() {
        let mut catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        let animal_id = TypeId::new(StableId::source("Animal"), "Animal", "Animal");
        catalog.register_source(class_entry("Animal", vec![]), &mut diagnostics);
        catalog.register_source(class_entry("Dog", vec![animal_id.clone()]), &mut diagnostics);
        catalog.register_source(generic_entry("Producer", Variance::Covariant), &mut diagnostics);

        let dog_id = TypeId::new(StableId::source("Dog"), "Dog", "Dog");
        let producer_id = TypeId::new(StableId::source("Producer"), "Producer", "Producer");
        let from = TypeRef::generic(producer_id.clone(), false, vec![TypeRef::non_null(dog_id)]);
        let to = TypeRef::generic(producer_id, false, vec![TypeRef::non_null(animal_id)]);

        assert!(catalog.is_assignable(&from, &to));
    }

    #[test]
    fn invariant_generic_argument_rejects_a_heritage_substitution() {
        let mut catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        let animal_id = TypeId::new(StableId::source("Animal"), "Animal", "Animal");
        catalog.register_source(class_entry("Animal", vec![]), &mut diagnostics);
        catalog.register_source(class_entry("Dog", vec![animal_id.clone()]), &mut diagnostics);
        catalog.register_source(generic_entry("Box", Variance::Invariant), &mut diagnostics);

        let dog_id = TypeId::new(StableId::source("Dog"), "Dog", "Dog");
        let box_id = TypeId::new(StableId::source("Box"), "Box", "Box");
        let from = TypeRef::generic(box_id.clone(), false, vec![TypeRef::non_null(dog_id)]);
        let to = TypeRef::generic(box_id, false, vec![TypeRef::non_null(animal_id)]);

        assert!(!catalog.is_assignable(&from, &to));
    }

    #[test]
    fn cyclic_heritage_does_not_infinite_loop() {
        // A pathological manifest could describe A extends B extends A;
        // the visited-set guard must still terminate.
        let mut catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        let a_id = TypeId::new(StableId::source("A"), "A", "A");
        let b_id = TypeId::new(StableId::source("B"), "B", "B");
        catalog.register_source(class_entry("A", vec![b_id.clone()]), &mut diagnostics);
        catalog.register_source(class_entry("B", vec![a_id.clone()]), &mut diagnostics);
        assert!(catalog.lookup_member(&a_id, "missing").is_none());
    }
}
