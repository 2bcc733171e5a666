//! The typed intermediate representation (`spec.md` §3 "IR") and the
//! AST-to-IR converter (`spec.md` §4.4).
//!
//! IR trees are tagged-variant, not object-oriented: every exhaustive
//! `match` over an `IrStatement`/`IrExpression`/`IrType` is a
//! compile-time guarantee that every kind is handled (no virtual
//! dispatch, no missed case at runtime).

pub mod ty;
pub mod expr;
pub mod stmt;
pub mod module;
pub mod converter;
pub mod emit_contract;

pub use converter::{Converter, Scope};
pub use expr::{IrExpression, MemberBinding};
pub use module::{IrExport, IrImport, IrModule};
pub use stmt::IrStatement;
pub use ty::{IrType, NumericIntent};
