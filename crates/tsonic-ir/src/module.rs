//! `IrModule` (`spec.md` §3).

use crate::stmt::IrStatement;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportBindingKind {
    Value,
    TypeOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrImport {
    pub specifier: String,
    pub imported_name: String,
    pub local_name: String,
    pub kind: ImportBindingKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrExport {
    pub exported_name: String,
    pub local_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrModule {
    pub file_path: String,
    pub namespace: String,
    pub class_name: String,
    /// A module whose every export is a function/const (no single
    /// enclosing class instance) lowers to a static container type.
    pub is_static_container: bool,
    pub imports: Vec<IrImport>,
    /// Top-level declarations, in source order (`spec.md` §5
    /// "Ordering").
    pub body: Vec<IrStatement>,
    pub exports: Vec<IrExport>,
}

impl IrModule {
    pub fn new(file_path: impl Into<String>, namespace: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            namespace: namespace.into(),
            class_name: class_name.into(),
            is_static_container: true,
            imports: Vec::new(),
            body: Vec::new(),
            exports: Vec::new(),
        }
    }
}
