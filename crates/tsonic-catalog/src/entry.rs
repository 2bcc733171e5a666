//! `NominalEntry` and its member table (`spec.md` §3).

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::type_id::TypeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Source,
    Assembly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accessibility {
    Public,
    Protected,
    Private,
    Internal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
}

#[derive(Clone, Debug)]
pub struct TypeParamEntry {
    pub name: String,
    pub variance: Variance,
    pub constraint: Option<TypeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Method,
    Field,
    Event,
    Indexer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassingMode {
    Value,
    Ref,
    Out,
    In,
}

#[derive(Clone, Debug)]
pub struct ParamEntry {
    pub name: String,
    pub type_id: TypeId,
    pub optional: bool,
    pub rest: bool,
    pub passing_mode: PassingMode,
}

#[derive(Clone, Debug)]
pub struct SignatureEntry {
    pub parameters: SmallVec<[ParamEntry; 4]>,
    pub return_type: TypeId,
}

#[derive(Clone, Debug)]
pub struct MemberEntry {
    pub ts_name: String,
    pub clr_name: String,
    pub kind: MemberKind,
    pub is_static: bool,
    /// Declared type for properties/fields/events/indexers.
    pub declared_type: Option<TypeId>,
    /// One or more overload signatures for methods; empty for
    /// non-callable members.
    pub signatures: SmallVec<[SignatureEntry; 1]>,
}

#[derive(Clone, Debug)]
pub struct NominalEntry {
    pub type_id: TypeId,
    pub origin: Origin,
    pub kind: TypeKind,
    pub accessibility: Accessibility,
    pub is_sealed: bool,
    pub is_abstract: bool,
    pub type_parameters: SmallVec<[TypeParamEntry; 2]>,
    /// Direct parent types, left-to-right in declaration order (a
    /// single base class, or the `extends` list of an interface).
    pub parents: SmallVec<[TypeId; 1]>,
    /// Implemented interfaces, declaration order.
    pub interfaces: SmallVec<[TypeId; 2]>,
    /// Own (non-inherited) members, insertion-ordered for deterministic
    /// emission (`spec.md` §4.8 "deterministic declaration order").
    pub members: IndexMap<String, MemberEntry>,
}

impl NominalEntry {
    pub fn own_member(&self, name: &str) -> Option<&MemberEntry> {
        self.members.get(name)
    }
}
