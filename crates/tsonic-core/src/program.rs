//! `ProgramContext` (`spec.md` §9 "Global state").
//!
//! The only ambient singleton in the teacher's original source is its
//! unified catalog. Here it is an explicit value, constructed once per
//! compilation and threaded by reference through every phase — there is
//! no process-wide mutable state anywhere in this crate.

use tsonic_catalog::UnifiedTypeCatalog;
use tsonic_common::CompileOptions;

/// Everything downstream phases need that is not itself a diagnostics
/// sink or an IR node: the catalog and the options the caller chose.
/// Built fresh by [`crate::compile`] and handed back to the caller on
/// success so a tool built on top of `compile()` can keep querying the
/// catalog (`resolveClrName`, `lookupMember`, …) after compilation.
pub struct ProgramContext {
    pub catalog: UnifiedTypeCatalog,
    pub options: CompileOptions,
}

impl ProgramContext {
    pub fn new(options: CompileOptions) -> Self {
        Self { catalog: UnifiedTypeCatalog::new(), options }
    }
}
