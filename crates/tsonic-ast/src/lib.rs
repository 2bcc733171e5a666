//! Neutral AST contract.
//!
//! `spec.md` §1 delegates source parsing to an external syntax library
//! and specifies only that "we consume an AST". This crate defines the
//! shape of that AST — an arena of nodes addressed by `NodeId` — with no
//! lexer or parser behind it. It is the equivalent of depending on
//! `tsz-parser`'s `NodeArena`/`NodeIndex` without reimplementing the
//! scanner/parser that produces them.
//!
//! Everything here is inert data. The binder is the only crate besides
//! the converter that reads it directly; everyone downstream of the
//! binder operates on handles (`tsonic_binder::handles`).

pub mod kind;
pub mod node;

pub use kind::SyntaxKind;
pub use node::{AstArena, AstNode, NodeId};
