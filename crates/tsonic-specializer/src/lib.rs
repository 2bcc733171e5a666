//! Monomorphizes every generic function/class declaration against the
//! concrete type arguments observed at its call sites (`spec.md` §4.6).
//!
//! Runs after the converter and before the soundness gate: it only ever
//! adds declarations to a module, it never removes the original generic
//! declaration (kept for signature lookup, never emitted per the
//! emitter contract).

mod engine;
mod key;
mod substitute;

pub use engine::Specializer;
pub use key::{request_key, serialize_type, specialized_name};
