//! The `compile()` entry point (`spec.md` §6 "CLI surface").
//!
//! Wires every phase in dependency order: resolve → populate catalog →
//! validate → convert → specialize → soundness gate. Each phase runs to
//! completion over every file before the next begins, accumulating
//! diagnostics into one collector; once a phase has produced an error,
//! every later phase is skipped (`spec.md` §7 "Propagation policy") and
//! `compile` returns the full, sorted diagnostic set with no IR.

use rustc_hash::FxHashMap;
use tracing::debug;

use tsonic_ast::AstArena;
use tsonic_binder::resolver::ManifestProbe;
use tsonic_binder::{DeclKind, HandleRegistry};
use tsonic_common::{CompileOptions, Diagnostics, DiagnosticsCollector};
use tsonic_ir::converter::Converter;
use tsonic_ir::IrModule;
use tsonic_soundness::SoundnessGate;
use tsonic_specializer::Specializer;
use tsonic_validator::Validator;

use crate::populate::register_module_declarations;
use crate::program::ProgramContext;
use crate::resolve::{basename, classify_module_decls, resolve_modules, SourceUnit};

pub struct CompileOutput {
    pub program: ProgramContext,
    pub ir_modules: Vec<IrModule>,
    pub diagnostics: Diagnostics,
}

/// `compile(filePaths, options) -> Result<{program, irModules, diagnostics}, diagnostics>`
/// (`spec.md` §6). `files` stands in for `filePaths`: the parser is out
/// of this core's scope, so callers already hold one shared `arena` and
/// a `SourceFile` node per path. `probe` answers whether a `bindings.json`
/// manifest exists for an import's first path segment, same contract as
/// `tsonic_binder::resolver::ManifestProbe`.
pub fn compile(arena: &AstArena, files: &[SourceUnit], options: CompileOptions, probe: &impl ManifestProbe) -> Result<CompileOutput, Diagnostics> {
    let mut diagnostics = DiagnosticsCollector::new();
    let mut program = ProgramContext::new(options);

    debug!(file_count = files.len(), "resolving module graph");
    let Some(order) = resolve_modules(arena, files, &program.options.source_root, probe, &mut diagnostics) else {
        return Err(diagnostics.into_sorted());
    };
    if diagnostics.has_errors() {
        return Err(diagnostics.into_sorted());
    }

    debug!("populating catalog with source declarations");
    for file in files {
        register_module_declarations(arena, file.source_file, &mut program.catalog, &mut diagnostics);
    }
    if diagnostics.has_errors() {
        return Err(diagnostics.into_sorted());
    }

    let registry = HandleRegistry::new(arena);

    debug!("validating modules");
    for file in files {
        Validator::new(&registry, &mut diagnostics, file.path.clone()).validate_module(file.source_file);
    }
    if diagnostics.has_errors() {
        return Err(diagnostics.into_sorted());
    }

    debug!("classifying named imports against each target module's own declarations");
    let mut import_classifications: FxHashMap<String, FxHashMap<String, DeclKind>> = FxHashMap::default();
    for file in files {
        import_classifications.insert(basename(&file.path).to_string(), classify_module_decls(arena, file.source_file));
    }

    debug!("converting AST to IR");
    let ordered_files = order_files(files, &order);
    let mut ir_modules = Vec::with_capacity(ordered_files.len());
    for file in &ordered_files {
        let class_name = class_name_for(&file.path);
        let mut converter = Converter::new(&registry, &program.catalog, &mut diagnostics, file.path.clone(), &import_classifications);
        ir_modules.push(converter.convert_module(file.source_file, program.options.root_namespace.clone(), class_name));
    }
    if diagnostics.has_errors() {
        return Err(diagnostics.into_sorted());
    }

    debug!("specializing generic declarations");
    for module in &mut ir_modules {
        Specializer::new(&mut diagnostics, module.file_path.clone()).specialize_module(module);
    }
    if diagnostics.has_errors() {
        return Err(diagnostics.into_sorted());
    }

    debug!("running the soundness gate");
    for module in &ir_modules {
        SoundnessGate::new(&program.catalog, &mut diagnostics, module.file_path.clone()).check_module(module);
    }

    let diagnostics = diagnostics.into_sorted();
    if diagnostics.iter().any(|d| d.is_error()) {
        return Err(diagnostics);
    }
    Ok(CompileOutput { program, ir_modules, diagnostics })
}

/// Reorders `files` to match the resolver's topological (leaves-first)
/// basename order, so a module is only converted once every module it
/// imports is already in the catalog and has been converted.
fn order_files<'a>(files: &'a [SourceUnit], order: &[String]) -> Vec<&'a SourceUnit> {
    order
        .iter()
        .filter_map(|name| files.iter().find(|f| basename(&f.path) == name))
        .collect()
}

fn class_name_for(path: &str) -> String {
    let name = basename(path);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => name.to_string(),
    }
}
