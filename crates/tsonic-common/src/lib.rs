//! Common types and utilities shared across every tsonic crate.
//!
//! This crate provides the ambient stack the rest of the core builds on:
//! - Source spans (`Span`)
//! - Diagnostics (`Diagnostic`, `DiagnosticsCollector`, `TSN####` message table)
//! - Compile-time options (`CompileOptions`)
//! - Numeric literal parsing shared by the IR converter
//! - String interning (`Atom`, `Interner`)
//! - The `ice!` macro for internal invariant violations

pub mod atom;
pub use atom::{Atom, Interner};

pub mod span;
pub use span::Span;

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, Diagnostics, DiagnosticsCollector};

pub mod numeric;

pub mod options;
pub use options::CompileOptions;

pub mod ice;
