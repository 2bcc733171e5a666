//! Query memoization over the catalog (`spec.md` §4.3, §9 "Design Notes").
//!
//! `isAssignable` and `lookupMember` are re-run constantly during
//! validation and IR conversion. `QueryCache` memoizes both, keeping a
//! **separate** map per query kind — folding them into one keyed-by-enum
//! cache would let an `isAssignable` miss evict an unrelated
//! `lookupMember` hit and vice versa, defeating the point of caching.

use rustc_hash::FxHashMap;

use crate::catalog::TypeRef;
use crate::entry::MemberEntry;
use crate::type_id::TypeId;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct AssignabilityKey {
    from: TypeId,
    from_nullable: bool,
    from_type_arguments: Vec<(TypeId, bool)>,
    to: TypeId,
    to_nullable: bool,
    to_type_arguments: Vec<(TypeId, bool)>,
}

fn flatten_type_arguments(args: &[TypeRef]) -> Vec<(TypeId, bool)> {
    args.iter().map(|a| (a.type_id.clone(), a.nullable)).collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct MemberKey {
    type_id: TypeId,
    member_name: String,
}

#[derive(Default)]
pub struct QueryCache {
    assignability_cache: FxHashMap<AssignabilityKey, bool>,
    member_cache: FxHashMap<MemberKey, Option<MemberEntry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_assignable(
        &mut self,
        catalog: &crate::catalog::UnifiedTypeCatalog,
        from: &TypeRef,
        to: &TypeRef,
    ) -> bool {
        let key = AssignabilityKey {
            from: from.type_id.clone(),
            from_nullable: from.nullable,
            from_type_arguments: flatten_type_arguments(&from.type_arguments),
            to: to.type_id.clone(),
            to_nullable: to.nullable,
            to_type_arguments: flatten_type_arguments(&to.type_arguments),
        };
        if let Some(hit) = self.assignability_cache.get(&key) {
            return *hit;
        }
        let result = catalog.is_assignable(from, to);
        self.assignability_cache.insert(key, result);
        result
    }

    pub fn lookup_member(
        &mut self,
        catalog: &crate::catalog::UnifiedTypeCatalog,
        type_id: &TypeId,
        member_name: &str,
    ) -> Option<MemberEntry> {
        let key = MemberKey { type_id: type_id.clone(), member_name: member_name.to_string() };
        if let Some(hit) = self.member_cache.get(&key) {
            return hit.clone();
        }
        let result = catalog.lookup_member(type_id, member_name).cloned();
        self.member_cache.insert(key, result.clone());
        result
    }

    pub fn assignability_cache_len(&self) -> usize {
        self.assignability_cache.len()
    }

    pub fn member_cache_len(&self) -> usize {
        self.member_cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UnifiedTypeCatalog;
    use crate::entry::*;
    use crate::stable_id::StableId;
    use indexmap::IndexMap;
    use smallvec::smallvec;
    use tsonic_common::DiagnosticsCollector;

    fn a_class() -> NominalEntry {
        NominalEntry {
            type_id: TypeId::new(StableId::source("A"), "A", "A"),
            origin: Origin::Source,
            kind: TypeKind::Class,
            accessibility: Accessibility::Public,
            is_sealed: false,
            is_abstract: false,
            type_parameters: smallvec![],
            parents: smallvec![],
            interfaces: smallvec![],
            members: IndexMap::new(),
        }
    }

    #[test]
    fn repeated_assignability_queries_hit_the_cache() {
        let mut catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        catalog.register_source(a_class(), &mut diagnostics);
        let mut cache = QueryCache::new();

        let a_id = TypeId::new(StableId::source("A"), "A", "A");
        let r1 = cache.is_assignable(&catalog, &TypeRef::non_null(a_id.clone()), &TypeRef::non_null(a_id.clone()));
        let r2 = cache.is_assignable(&catalog, &TypeRef::non_null(a_id.clone()), &TypeRef::non_null(a_id));
        assert_eq!(r1, r2);
        assert_eq!(cache.assignability_cache_len(), 1);
    }

    #[test]
    fn assignability_and_member_caches_do_not_cross_contaminate() {
        let mut catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        catalog.register_source(a_class(), &mut diagnostics);
        let mut cache = QueryCache::new();

        let a_id = TypeId::new(StableId::source("A"), "A", "A");
        cache.is_assignable(&catalog, &TypeRef::non_null(a_id.clone()), &TypeRef::non_null(a_id.clone()));
        cache.lookup_member(&catalog, &a_id, "missing");

        assert_eq!(cache.assignability_cache_len(), 1);
        assert_eq!(cache.member_cache_len(), 1);
    }
}
