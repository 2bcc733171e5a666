//! Rejects unsupported constructs before the IR converter ever sees them
//! (`spec.md` §4.5).
//!
//! The validator reads the AST directly through the arena, the same way
//! the binding layer does, because it runs earlier than the handle
//! registry is consumed downstream — but it never mutates anything and
//! never produces IR; it only appends diagnostics.

mod validator;

pub use validator::Validator;
