//! Binding layer for the tsonic compiler.
//!
//! This crate provides:
//! - `handles` — the opaque-handle registry (`DeclId`/`SignatureId`/
//!   `MemberId`/`TypeSyntaxId`), the only place raw AST nodes live.
//! - `binding` — `BindingLayer`, answering `resolveName`, `resolveImport`,
//!   `isTypeDecl`/`isValueDecl` for any AST position.
//! - `resolver` — the module & import resolver: classifies every import
//!   specifier and detects import cycles by DFS over the module graph.
//! - `manifest` — the `bindings.json` format and its loader, including
//!   facade re-export walking and idempotent per-stable-id caching.

pub mod handles;
pub mod binding;
pub mod resolver;
pub mod manifest;

pub use handles::{DeclId, HandleRegistry, MemberId, SignatureId, TypeSyntaxId};
pub use binding::{BindingLayer, DeclKind};
pub use resolver::{ImportKind, ModuleResolver};
pub use manifest::{BindingsManifest, ManifestLoader};
