//! Opaque-handle registry.
//!
//! `spec.md` §3/§4.2: every AST node the compiler must refer to later is
//! registered once and returned as an opaque handle. The registry is the
//! *only* place raw `tsonic_ast::NodeId`s live past the binding phase;
//! downstream code (catalog, IR converter, specializer, soundness gate)
//! receives handles, not nodes. Handles are totally ordered and
//! content-addressed: looking up the same `NodeId` twice always returns
//! the same handle (INV-DETERMINISM), and identities are assigned in
//! order of first encounter, independent of hash iteration order
//! (`spec.md` §5).

use rustc_hash::FxHashMap;
use tsonic_ast::{AstArena, AstNode, NodeId};

macro_rules! handle_type {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

handle_type!(DeclId);
handle_type!(SignatureId);
handle_type!(MemberId);
handle_type!(TypeSyntaxId);

/// A single content-addressed table from `NodeId` to one handle kind.
#[derive(Default, Debug)]
struct HandleTable {
    by_node: FxHashMap<NodeId, u32>,
    by_handle: Vec<NodeId>,
}

impl HandleTable {
    fn intern(&mut self, node: NodeId) -> u32 {
        if let Some(&h) = self.by_node.get(&node) {
            return h;
        }
        let h = self.by_handle.len() as u32;
        self.by_handle.push(node);
        self.by_node.insert(node, h);
        h
    }

    fn node_of(&self, handle: u32) -> NodeId {
        self.by_handle[handle as usize]
    }
}

/// Owns every handle minted for one compilation run, and is the single
/// gateway to the raw arena: `spec.md` §4.2 makes the handle registry
/// "the *only* place raw AST pointers live" — every other phase
/// (catalog, IR converter, validator, specializer, soundness gate)
/// holds a `&HandleRegistry`, never an `&AstArena` directly, and reaches
/// a node only through `get`. Created fresh per compilation and frozen
/// (read-only) once binding completes (`spec.md` §3 "Lifecycle and
/// ownership").
#[derive(Debug)]
pub struct HandleRegistry<'a> {
    arena: &'a AstArena,
    decls: HandleTable,
    signatures: HandleTable,
    members: HandleTable,
    type_syntax: HandleTable,
}

impl<'a> HandleRegistry<'a> {
    pub fn new(arena: &'a AstArena) -> Self {
        Self { arena, decls: HandleTable::default(), signatures: HandleTable::default(), members: HandleTable::default(), type_syntax: HandleTable::default() }
    }

    /// The only way any phase outside this crate looks at a raw node.
    pub fn get(&self, id: NodeId) -> &'a AstNode {
        self.arena.get(id)
    }

    pub fn decl_of(&mut self, node: NodeId) -> DeclId {
        DeclId(self.decls.intern(node))
    }

    pub fn signature_of(&mut self, node: NodeId) -> SignatureId {
        SignatureId(self.signatures.intern(node))
    }

    pub fn member_of(&mut self, node: NodeId) -> MemberId {
        MemberId(self.members.intern(node))
    }

    pub fn type_syntax_of(&mut self, node: NodeId) -> TypeSyntaxId {
        TypeSyntaxId(self.type_syntax.intern(node))
    }

    pub fn node_of_decl(&self, id: DeclId) -> NodeId {
        self.decls.node_of(id.0)
    }

    pub fn node_of_signature(&self, id: SignatureId) -> NodeId {
        self.signatures.node_of(id.0)
    }

    pub fn node_of_member(&self, id: MemberId) -> NodeId {
        self.members.node_of(id.0)
    }

    pub fn node_of_type_syntax(&self, id: TypeSyntaxId) -> NodeId {
        self.type_syntax.node_of(id.0)
    }
}
