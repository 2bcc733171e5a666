//! Top-level orchestration for the tsonic compiler core (`spec.md` §4, §6, §9).
//!
//! Everything else in this workspace is a pure, independently-testable
//! phase; this crate is the only thing that knows the order they run
//! in. No phase reads from the filesystem or the environment — `compile`
//! takes already-parsed ASTs and a `ManifestProbe` the caller supplies
//! (`spec.md` §6 "No environment variables are consulted by the core").

mod compile;
mod populate;
mod program;
mod resolve;

pub use compile::{compile, CompileOutput};
pub use program::ProgramContext;
pub use resolve::SourceUnit;
