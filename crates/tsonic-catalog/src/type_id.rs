//! `TypeId` — uniquely identifies a nominal type (`spec.md` §3).
//!
//! Equality and hashing are defined purely in terms of `stable_id`: two
//! `TypeId`s with the same stable id are the same type even if
//! constructed from different `clrName`/`tsName` strings along the way
//! (e.g. one obtained via `resolveTsName`, the other via
//! `resolveClrName`).

use std::hash::{Hash, Hasher};

use crate::stable_id::StableId;

#[derive(Clone, Debug)]
pub struct TypeId {
    pub stable_id: StableId,
    pub clr_name: String,
    pub ts_name: String,
}

impl TypeId {
    pub fn new(stable_id: StableId, clr_name: impl Into<String>, ts_name: impl Into<String>) -> Self {
        Self { stable_id, clr_name: clr_name.into(), ts_name: ts_name.into() }
    }
}

impl PartialEq for TypeId {
    fn eq(&self, other: &Self) -> bool {
        self.stable_id == other.stable_id
    }
}

impl Eq for TypeId {}

impl Hash for TypeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stable_id.hash(state);
    }
}

/// Primitive scalar types have a fixed bidirectional mapping between
/// source names and stable ids (`spec.md` §3). `source("number")`
/// always yields the same `TypeId` as the target's `double`: INV-NUM's
/// "source 'number' type always maps to the target's double".
pub const PRIMITIVE_SOURCE_NAMES: &[(&str, &str)] = &[
    ("number", "Double"),
    ("int", "Int32"),
    ("long", "Int64"),
    ("byte", "Byte"),
    ("short", "Int16"),
    ("float", "Single"),
    ("double", "Double"),
    ("decimal", "Decimal"),
    ("boolean", "Boolean"),
    ("string", "String"),
    ("char", "Char"),
];

pub fn primitive_type_id(source_name: &str) -> Option<TypeId> {
    PRIMITIVE_SOURCE_NAMES
        .iter()
        .find(|(ts, _)| *ts == source_name)
        .map(|(ts, clr)| TypeId::new(StableId::new("<primitive>", clr), *clr, *ts))
}

/// Reverse lookup: the source-facing alias for a primitive CLR name.
/// `"number"` and `"double"` both map *to* `Double`, but the reverse
/// mapping for `Double` must resolve back to `"number"` (the distinct
/// CLR-facing aliases like `int`/`long` are otherwise unambiguous).
pub fn primitive_source_name(clr_name: &str) -> Option<&'static str> {
    if clr_name == "Double" {
        return Some("number");
    }
    PRIMITIVE_SOURCE_NAMES
        .iter()
        .find(|(_, clr)| *clr == clr_name)
        .map(|(ts, _)| *ts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_and_double_share_a_stable_id() {
        let number = primitive_type_id("number").unwrap();
        let double = primitive_type_id("double").unwrap();
        assert_eq!(number, double);
        assert_eq!(number.clr_name, "Double");
    }

    #[test]
    fn int_and_long_are_distinct_from_number() {
        let int_ty = primitive_type_id("int").unwrap();
        let number = primitive_type_id("number").unwrap();
        assert_ne!(int_ty, number);
    }

    #[test]
    fn equality_ignores_clr_and_ts_name_fields() {
        let a = TypeId::new(crate::stable_id::StableId::source("Widget"), "Widget", "Widget");
        let b = TypeId::new(crate::stable_id::StableId::source("Widget"), "DifferentClrName", "widget");
        assert_eq!(a, b);
    }

    #[test]
    fn double_reverse_maps_to_number_not_double() {
        assert_eq!(primitive_source_name("Double"), Some("number"));
        assert_eq!(primitive_source_name("Int32"), Some("int"));
    }
}
