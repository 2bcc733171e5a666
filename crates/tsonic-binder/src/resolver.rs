//! Module & import resolver.
//!
//! `spec.md` §4.1: resolves each import specifier into one of four
//! kinds (local module, foreign CLR import, core language import,
//! other/rejected) and detects import cycles by DFS over the module
//! graph. Per-element type/value classification of a named import
//! (`BindingLayer::classify_named_import`, backed by
//! `is_type_decl`/`is_value_decl`) is a separate step this module
//! doesn't perform itself — `tsonic_core::resolve::classify_module_decls`
//! runs a binder over each target module's own top-level declarations,
//! and the IR converter consults that result when lowering a named
//! import's `IrImport::kind`.

use rustc_hash::{FxHashMap, FxHashSet};
use tsonic_common::diagnostics::TSN;
use tsonic_common::{Diagnostic, DiagnosticsCollector};

use tsonic_ast::kind::CORE_LANGUAGE_MARKERS;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportKind {
    /// Resolved to a specific source file under the source root.
    Local(String),
    /// A `bindings.json` manifest exists for the specifier's first path
    /// segment; `assembly` is that manifest's declared assembly name.
    Foreign { assembly: String },
    /// One of the privileged built-in marker specifiers.
    Core,
}

/// Decides whether a foreign manifest exists for a given first path
/// segment. Kept as a trait so resolution can be unit-tested without
/// touching the filesystem — the production implementation is a thin
/// wrapper around `manifest::ManifestLoader`.
pub trait ManifestProbe {
    fn assembly_for(&self, first_segment: &str) -> Option<String>;
}

pub struct ModuleResolver<'a, P: ManifestProbe> {
    source_root: &'a str,
    /// Specifiers known to resolve to an existing file under the source
    /// root (populated by whatever file-discovery step runs ahead of
    /// the core; this crate does not touch the filesystem itself).
    known_local_modules: FxHashSet<String>,
    probe: &'a P,
}

impl<'a, P: ManifestProbe> ModuleResolver<'a, P> {
    pub fn new(source_root: &'a str, known_local_modules: FxHashSet<String>, probe: &'a P) -> Self {
        Self { source_root, known_local_modules, probe }
    }

    /// Classify one import specifier. `spec.md` §4.1: "detected *only*
    /// by the presence of a `bindings.json` manifest ... no heuristics,
    /// no name-based guessing" — so local-module membership and the
    /// manifest probe are both checked before falling through to an
    /// "other" rejection.
    pub fn classify(&self, specifier: &str, file: &str, diagnostics: &mut DiagnosticsCollector) -> Option<ImportKind> {
        let first_segment = specifier.split('/').next().unwrap_or(specifier);

        if CORE_LANGUAGE_MARKERS.contains(&first_segment) {
            return Some(ImportKind::Core);
        }
        if specifier.starts_with('.') || self.known_local_modules.contains(specifier) {
            return Some(ImportKind::Local(format!("{}/{specifier}", self.source_root)));
        }
        if let Some(assembly) = self.probe.assembly_for(first_segment) {
            return Some(ImportKind::Foreign { assembly });
        }

        diagnostics.push(Diagnostic::new(
            TSN::UNKNOWN_IMPORT_SPECIFIER,
            file,
            0,
            specifier.len() as u32,
            &[specifier],
        ));
        None
    }
}

/// The module dependency graph used to detect import cycles.
/// `spec.md` §4.1: "cycles are detected by DFS over the module graph
/// and reported with the cycle path". Basenames (not full paths) are
/// what the diagnostic names, per the S6 end-to-end scenario.
#[derive(Default, Debug)]
pub struct ModuleGraph {
    edges: FxHashMap<String, Vec<String>>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges.entry(from.to_string()).or_default().push(to.to_string());
    }

    /// Topological order of modules, leaves first. Running this twice
    /// over the same graph yields the same order (`spec.md` §8,
    /// quantified property 6) because edge lists preserve insertion
    /// order and nodes are visited in a fixed (sorted) root order.
    pub fn topological_order(&self) -> Result<Vec<String>, Vec<String>> {
        let mut all_nodes: Vec<&String> = self.edges.keys().collect();
        for targets in self.edges.values() {
            for t in targets {
                if !self.edges.contains_key(t) {
                    all_nodes.push(t);
                }
            }
        }
        all_nodes.sort();
        all_nodes.dedup();

        let mut visited: FxHashSet<String> = FxHashSet::default();
        let mut on_stack: Vec<String> = Vec::new();
        let mut order: Vec<String> = Vec::new();

        for node in all_nodes {
            if !visited.contains(node) {
                self.visit(node, &mut visited, &mut on_stack, &mut order)?;
            }
        }
        Ok(order)
    }

    fn visit(
        &self,
        node: &str,
        visited: &mut FxHashSet<String>,
        on_stack: &mut Vec<String>,
        order: &mut Vec<String>,
    ) -> Result<(), Vec<String>> {
        if let Some(pos) = on_stack.iter().position(|n| n == node) {
            let mut cycle: Vec<String> = on_stack[pos..].to_vec();
            cycle.push(node.to_string());
            return Err(cycle);
        }
        if visited.contains(node) {
            return Ok(());
        }
        on_stack.push(node.to_string());
        if let Some(targets) = self.edges.get(node) {
            for target in targets {
                self.visit(target, visited, on_stack, order)?;
            }
        }
        on_stack.pop();
        visited.insert(node.to_string());
        order.push(node.to_string());
        Ok(())
    }

    /// Format a cycle as `spec.md`'s S6 scenario expects: `A -> B -> A`.
    pub fn format_cycle(cycle: &[String]) -> String {
        cycle.join(" -> ")
    }
}
