//! Wires `tsonic_binder::resolver` into the compilation's full file set
//! (`spec.md` §4.1, §8 quantified invariant 6, scenario S6).

use rustc_hash::{FxHashMap, FxHashSet};

use tsonic_ast::{AstArena, AstNode, NodeId};
use tsonic_binder::resolver::{ImportKind, ManifestProbe, ModuleGraph, ModuleResolver};
use tsonic_binder::{BindingLayer, DeclKind, HandleRegistry};
use tsonic_common::diagnostics::TSN;
use tsonic_common::{Diagnostic, DiagnosticsCollector};

/// A single compilation unit. Parsing is out of scope (`SPEC_FULL.md`
/// §C "Parser adapter"); callers hand in an already-built `SourceFile`
/// node from a shared arena.
pub struct SourceUnit {
    pub path: String,
    pub source_file: NodeId,
}

pub fn basename(path: &str) -> &str {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.strip_suffix(".ts").unwrap_or(file)
}

/// Classifies every import in every file, builds the module dependency
/// graph, and returns modules in topological (leaves-first) order.
///
/// On a detected cycle, pushes `TSN::CIRCULAR_IMPORT` once with the
/// cycle path formatted as `spec.md` S6 expects and returns `None` —
/// the caller skips every later phase per the §7 propagation policy.
pub fn resolve_modules(
    arena: &AstArena,
    files: &[SourceUnit],
    source_root: &str,
    probe: &impl ManifestProbe,
    diagnostics: &mut DiagnosticsCollector,
) -> Option<Vec<String>> {
    let known_local_modules: FxHashSet<String> = files.iter().map(|f| basename(&f.path).to_string()).collect();
    let resolver = ModuleResolver::new(source_root, known_local_modules, probe);

    let mut graph = ModuleGraph::new();
    for file in files {
        let from = basename(&file.path).to_string();
        let AstNode::SourceFile { body, .. } = arena.get(file.source_file) else {
            tsonic_common::ice!("core", "resolve_modules called on a non-SourceFile node");
        };
        for &stmt_id in body {
            let AstNode::ImportDeclaration { specifier, .. } = arena.get(stmt_id) else { continue };
            match resolver.classify(specifier, &file.path, diagnostics) {
                Some(ImportKind::Local(_)) => graph.add_edge(&from, basename(specifier)),
                Some(ImportKind::Foreign { .. }) | Some(ImportKind::Core) | None => {}
            }
        }
    }

    match graph.topological_order() {
        Ok(mut order) => {
            // Files with no local imports and no local importers never become
            // an edge endpoint, so they are invisible to the graph. Append
            // them in source order, once, after the resolved dependency order.
            for file in files {
                let name = basename(&file.path);
                if !order.iter().any(|n| n == name) {
                    order.push(name.to_string());
                }
            }
            Some(order)
        }
        Err(cycle) => {
            let path = ModuleGraph::format_cycle(&cycle);
            diagnostics.push(Diagnostic::new(TSN::CIRCULAR_IMPORT, files.first().map(|f| f.path.as_str()).unwrap_or(""), 0, 0, &[path.as_str()]));
            None
        }
    }
}

fn top_level_decl_name(node: &AstNode) -> Option<&str> {
    match node {
        AstNode::ClassDeclaration { name, .. }
        | AstNode::InterfaceDeclaration { name, .. }
        | AstNode::EnumDeclaration { name, .. }
        | AstNode::TypeAliasDeclaration { name, .. }
        | AstNode::FunctionDeclaration { name, .. }
        | AstNode::VariableDeclaration { name, .. } => Some(name.as_str()),
        _ => None,
    }
}

/// Classifies every one of a module's own top-level declarations into
/// `DeclKind::{Value,Type,Both}` by running them through a throwaway
/// `BindingLayer` (`spec.md` §4.1 "classifying each named specifier
/// into type vs. value by consulting the Binding layer"). The registry
/// backing this binder is scoped to this one call — it never needs to
/// outlive the classification, since the result is a plain name -> kind
/// snapshot any caller can hold onto without borrowing the binder.
pub fn classify_module_decls(arena: &AstArena, source_file: NodeId) -> FxHashMap<String, DeclKind> {
    let AstNode::SourceFile { body, .. } = arena.get(source_file) else {
        tsonic_common::ice!("core", "classify_module_decls called on a non-SourceFile node");
    };
    let mut registry = HandleRegistry::new(arena);
    let mut binder = BindingLayer::new(&mut registry);
    let root = binder.root_scope();
    for &stmt_id in body {
        if let Some(name) = top_level_decl_name(arena.get(stmt_id)) {
            binder.declare(root, name, stmt_id);
        }
    }
    body.iter()
        .filter_map(|&stmt_id| top_level_decl_name(arena.get(stmt_id)))
        .filter_map(|name| binder.classify_named_import(name).map(|kind| (name.to_string(), kind)))
        .collect()
}
