//! `UnifiedTypeCatalog` — the single source of truth for nominal
//! identity (`spec.md` §2, §4.3; INV-CLR).
//!
//! Merges a source-authored catalog (entities defined in this
//! compilation) and an assembly catalog (entities loaded from
//! `bindings.json` manifests) behind one lookup surface. No other
//! component in the core maintains a parallel type store.

pub mod stable_id;
pub mod type_id;
pub mod entry;
pub mod catalog;
pub mod cache;

pub use catalog::UnifiedTypeCatalog;
pub use cache::QueryCache;
pub use catalog::TypeRef;
pub use entry::{Accessibility, MemberEntry, MemberKind, NominalEntry, Origin, ParamEntry, PassingMode, SignatureEntry, TypeKind, TypeParamEntry, Variance};
pub use stable_id::StableId;
pub use type_id::TypeId;
