//! `bindings.json` manifest format and loader.
//!
//! `spec.md` §6: "A `bindings.json` declares one assembly and a tree of
//! namespaces → types → members. Each node carries a source-side alias,
//! a CLR-side name, kind, accessibility, member signatures with
//! parameter modes, and a `binding { assembly, type, member }` triple
//! that the emitter will print as a fully qualified reference."
//!
//! The loader also implements two supplementary behaviors from
//! `SPEC_FULL.md` §B: facade re-export walking with a visited-set cycle
//! guard, and an idempotent per-assembly cache so repeated loads of the
//! same stable id are free.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PassingMode {
    Value,
    Ref,
    Out,
    In,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MemberKind {
    Property,
    Method,
    Field,
    Event,
    Indexer,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Accessibility {
    Public,
    Protected,
    Private,
    Internal,
}

/// The `{ assembly, type, member }` triple the emitter prints as a
/// fully qualified reference.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Binding {
    pub assembly: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub member: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterManifest {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub rest: bool,
    #[serde(default = "default_passing_mode")]
    pub passing_mode: PassingMode,
}

fn default_passing_mode() -> PassingMode {
    PassingMode::Value
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureManifest {
    #[serde(default)]
    pub parameters: Vec<ParameterManifest>,
    pub return_type: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberManifest {
    pub ts_name: String,
    pub clr_name: String,
    pub kind: MemberKind,
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub signatures: Vec<SignatureManifest>,
    pub binding: Binding,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeManifest {
    pub ts_name: String,
    pub clr_name: String,
    pub kind: TypeKind,
    pub accessibility: Accessibility,
    #[serde(default)]
    pub members: Vec<MemberManifest>,
    pub binding: Binding,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceManifest {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeManifest>,
    /// Other manifest files this namespace re-exports from (facade
    /// pattern): resolved relative to the manifest's own directory.
    #[serde(default)]
    pub re_exports: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingsManifest {
    pub assembly: String,
    #[serde(default)]
    pub namespaces: Vec<NamespaceManifest>,
}

impl BindingsManifest {
    pub fn find_type(&self, ts_name: &str) -> Option<&TypeManifest> {
        self.namespaces
            .iter()
            .flat_map(|ns| ns.types.iter())
            .find(|t| t.ts_name == ts_name)
    }
}

/// Loads and caches `bindings.json` manifests. Loads are idempotent per
/// stable assembly id: a manifest already loaded is returned from cache
/// rather than re-read and re-parsed (`SPEC_FULL.md` §B.3,
/// `spec.md` §4.3 "manifests are loaded exactly once per stable ID").
#[derive(Default)]
pub struct ManifestLoader {
    cache: RefCell<FxHashMap<PathBuf, BindingsManifest>>,
}

impl ManifestLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest from disk, recursively merging any facade
    /// `re_exports` it names. A `visited` set guards against a facade
    /// cycle re-entering itself.
    pub fn load(&self, path: &Path) -> std::io::Result<BindingsManifest> {
        let mut visited: rustc_hash::FxHashSet<PathBuf> = rustc_hash::FxHashSet::default();
        self.load_inner(path, &mut visited)
    }

    fn load_inner(
        &self,
        path: &Path,
        visited: &mut rustc_hash::FxHashSet<PathBuf>,
    ) -> std::io::Result<BindingsManifest> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(cached) = self.cache.borrow().get(&canonical) {
            debug!(path = %canonical.display(), "manifest cache hit");
            return Ok(cached.clone());
        }
        if !visited.insert(canonical.clone()) {
            // Facade cycle: stop walking, return what we have so far
            // rather than recursing forever.
            return Ok(BindingsManifest { assembly: String::new(), namespaces: vec![] });
        }

        let text = std::fs::read_to_string(path)?;
        let mut manifest: BindingsManifest = serde_json::from_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for ns in &mut manifest.namespaces {
            let re_exports = std::mem::take(&mut ns.re_exports);
            for re_export in re_exports {
                let target = base.join(&re_export);
                let merged = self.load_inner(&target, visited)?;
                for merged_ns in merged.namespaces {
                    ns.types.extend(merged_ns.types);
                }
            }
        }

        self.cache.borrow_mut().insert(canonical, manifest.clone());
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_manifest(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    const SIMPLE: &str = r#"{
        "assembly": "System.Linq",
        "namespaces": [
            {
                "name": "System.Linq",
                "alias": "systemLinq",
                "types": [
                    {
                        "tsName": "enumerable",
                        "clrName": "Enumerable",
                        "kind": "class",
                        "accessibility": "public",
                        "members": [
                            {
                                "tsName": "selectMany",
                                "clrName": "SelectMany",
                                "kind": "method",
                                "accessibility": "public",
                                "isStatic": true,
                                "signatures": [
                                    { "parameters": [{ "name": "source", "typeName": "any" }], "returnType": "any" }
                                ],
                                "binding": { "assembly": "System.Linq", "type": "System.Linq.Enumerable", "member": "SelectMany" }
                            }
                        ],
                        "binding": { "assembly": "System.Linq", "type": "System.Linq.Enumerable" }
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn loads_and_parses_a_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "bindings.json", SIMPLE);
        let loader = ManifestLoader::new();
        let manifest = loader.load(&path).unwrap();
        assert_eq!(manifest.assembly, "System.Linq");
        let ty = manifest.find_type("enumerable").unwrap();
        assert_eq!(ty.clr_name, "Enumerable");
        assert_eq!(ty.members[0].binding.member.as_deref(), Some("SelectMany"));
    }

    #[test]
    fn repeated_loads_hit_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "bindings.json", SIMPLE);
        let loader = ManifestLoader::new();
        let first = loader.load(&path).unwrap();
        let second = loader.load(&path).unwrap();
        assert_eq!(first.assembly, second.assembly);
        assert_eq!(loader.cache.borrow().len(), 1);
    }

    #[test]
    fn facade_re_export_cycle_terminates() {
        let dir = tempfile::tempdir().unwrap();
        let a = r#"{"assembly":"A","namespaces":[{"name":"A","types":[],"reExports":["b.json"]}]}"#;
        let b = r#"{"assembly":"B","namespaces":[{"name":"B","types":[],"reExports":["a.json"]}]}"#;
        write_manifest(dir.path(), "a.json", a);
        write_manifest(dir.path(), "b.json", b);
        let loader = ManifestLoader::new();
        // Must terminate rather than recurse forever.
        let result = loader.load(&dir.path().join("a.json"));
        assert!(result.is_ok());
    }
}
