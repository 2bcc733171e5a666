//! Registers every top-level nominal declaration in a module's catalog
//! entry before the converter runs.
//!
//! `tsonic_ir::converter::Converter::convert_type_syntax` falls back to
//! `IrType::TypeParameter` for any `TypeReference` name the catalog
//! cannot resolve — correct for an actual open generic parameter, wrong
//! for a forward reference to a class declared later in the same file
//! or in a module compiled earlier in the same run. Running this pass
//! over every file before any file is converted closes that gap: by the
//! time `Converter` sees the first `TypeReference`, every class,
//! interface and enum in the whole compilation is already registered.
//!
//! Heritage and member tables are left empty here — extracting them
//! from AST members would duplicate the converter's own member-lowering
//! logic and nothing in `spec.md` currently reads a source type's
//! inherited members through the catalog (`is_assignable`/`lookup_member`
//! degrade gracefully to "no parents known", see `DESIGN.md`).

use indexmap::IndexMap;
use smallvec::smallvec;

use tsonic_ast::{AstArena, AstNode, NodeId};
use tsonic_catalog::{Accessibility, NominalEntry, Origin, StableId, TypeId, TypeKind, UnifiedTypeCatalog};
use tsonic_common::DiagnosticsCollector;

fn stub_entry(name: &str, kind: TypeKind) -> NominalEntry {
    NominalEntry {
        type_id: TypeId::new(StableId::source(name), name, name),
        origin: Origin::Source,
        kind,
        accessibility: Accessibility::Public,
        is_sealed: false,
        is_abstract: false,
        type_parameters: smallvec![],
        parents: smallvec![],
        interfaces: smallvec![],
        members: IndexMap::new(),
    }
}

pub fn register_module_declarations(
    arena: &AstArena,
    source_file: NodeId,
    catalog: &mut UnifiedTypeCatalog,
    diagnostics: &mut DiagnosticsCollector,
) {
    let AstNode::SourceFile { body, .. } = arena.get(source_file) else {
        tsonic_common::ice!("core", "register_module_declarations called on a non-SourceFile node");
    };
    for &stmt_id in body {
        let entry = match arena.get(stmt_id) {
            AstNode::ClassDeclaration { name, .. } => Some(stub_entry(name, TypeKind::Class)),
            AstNode::InterfaceDeclaration { name, .. } => Some(stub_entry(name, TypeKind::Interface)),
            AstNode::EnumDeclaration { name, .. } => Some(stub_entry(name, TypeKind::Enum)),
            _ => None,
        };
        if let Some(entry) = entry {
            catalog.register_source(entry, diagnostics);
        }
    }
}
