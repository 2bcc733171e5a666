//! `StableId` — the canonical key `<assembly>:<qualifiedName>` that
//! identifies a nominal type across the source and assembly universes
//! (`spec.md` §3, Glossary).

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StableId(String);

/// The pseudo-assembly name used for types declared in this
/// compilation, so source and assembly stable ids share one key space
/// without ever colliding by accident.
pub const SOURCE_ASSEMBLY: &str = "<source>";

impl StableId {
    pub fn new(assembly: impl AsRef<str>, qualified_name: impl AsRef<str>) -> Self {
        Self(format!("{}:{}", assembly.as_ref(), qualified_name.as_ref()))
    }

    pub fn source(qualified_name: impl AsRef<str>) -> Self {
        Self::new(SOURCE_ASSEMBLY, qualified_name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into `(assembly, qualifiedName)`.
    pub fn parts(&self) -> (&str, &str) {
        self.0.split_once(':').unwrap_or((&self.0, ""))
    }

    /// Nested types use `+` in reflection names (`Outer+Inner`);
    /// `spec.md` §4.3 requires this converted to `$` in source-exported
    /// identifiers and to `.` in emitted target-language names.
    pub fn to_source_identifier(&self) -> String {
        self.parts().1.replace('+', "$")
    }

    pub fn to_emitted_name(&self) -> String {
        self.parts().1.replace('+', ".")
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_type_punctuation_is_converted_per_target() {
        let id = StableId::new("System.Linq", "System.Linq.Enumerable+Helper");
        assert_eq!(id.to_source_identifier(), "System.Linq.Enumerable$Helper");
        assert_eq!(id.to_emitted_name(), "System.Linq.Enumerable.Helper");
    }

    #[test]
    fn source_ids_share_a_fixed_pseudo_assembly() {
        let id = StableId::source("MyApp.Widget");
        assert_eq!(id.parts().0, SOURCE_ASSEMBLY);
    }
}
