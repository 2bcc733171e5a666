//! Compile-time options threaded through every phase as part of
//! `ProgramContext`. Plain data, `Default`-constructible, never read from
//! the environment inside the core (`spec.md` §6).

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Root directory local module specifiers are resolved against.
    pub project_root: String,
    /// Root directory source files live under.
    pub source_root: String,
    /// Namespace prefix applied to every emitted declaration.
    pub root_namespace: String,
    /// Additional directories searched for `bindings.json` manifests,
    /// beyond the specifier's first path segment's own directory.
    pub type_roots: Vec<String>,
    /// When true, Sound Mode diagnostics that are otherwise warnings are
    /// promoted to errors (mirrors the teacher's `sound_mode` flag).
    pub sound_mode: bool,
}

impl CompileOptions {
    pub fn new(project_root: impl Into<String>, source_root: impl Into<String>) -> Self {
        Self {
            project_root: project_root.into(),
            source_root: source_root.into(),
            root_namespace: String::new(),
            type_roots: Vec::new(),
            sound_mode: false,
        }
    }
}
