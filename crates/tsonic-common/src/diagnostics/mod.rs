//! Diagnostic types and message lookup.
//!
//! Diagnostics are values, never exceptions (`spec.md` §7): every phase
//! boundary returns `Result<T, Diagnostics>` or accumulates into a
//! `DiagnosticsCollector` passed by mutable reference. Stable codes live
//! in `data.rs`, grouped by family exactly as enumerated in `spec.md` §6.

mod data;
pub use data::{get_diagnostic_message, DiagnosticMessage, TSN};

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, Serialize)]
pub struct RelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message: String,
}

/// A single compiler diagnostic: a stable code, a severity, an optional
/// source location and a rendered hint.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedInformation>,
}

impl Diagnostic {
    pub fn new(code: u32, file: impl Into<String>, start: u32, length: u32, args: &[&str]) -> Self {
        let msg = get_diagnostic_message(code);
        let category = msg.map_or(DiagnosticCategory::Error, |m| m.category);
        let template = msg.map_or("unknown diagnostic", |m| m.message);
        Self {
            code,
            category,
            file: file.into(),
            start,
            length,
            message: format_message(template, args),
            related: Vec::new(),
        }
    }

    pub fn with_related(
        mut self,
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
    ) -> Self {
        self.related.push(RelatedInformation {
            file: file.into(),
            start,
            length,
            message: message.into(),
        });
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.category, DiagnosticCategory::Error)
    }
}

pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

pub type Diagnostics = Vec<Diagnostic>;

/// Append-only sink threaded through a phase. A single-threaded
/// compilation uses one directly; parallel module processing wraps it
/// in a mutex (`spec.md` §5 "Shared resources").
#[derive(Default, Debug)]
pub struct DiagnosticsCollector {
    diagnostics: Diagnostics,
}

impl DiagnosticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Sort by file, then line (approximated via byte offset since this
    /// layer has no line map), then column, per the §7 ordering contract.
    pub fn into_sorted(mut self) -> Diagnostics {
        self.diagnostics
            .sort_by(|a, b| (&a.file, a.start).cmp(&(&b.file, b.start)));
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_positional_placeholders() {
        let s = format_message("Module '{0}' has no exported member '{1}'.", &["fs", "readFileSync"]);
        assert_eq!(s, "Module 'fs' has no exported member 'readFileSync'.");
    }

    #[test]
    fn collector_sorts_by_file_then_offset() {
        let mut collector = DiagnosticsCollector::new();
        collector.push(Diagnostic::new(TSN::UNRESOLVED_IMPORT, "b.ts", 10, 1, &["x"]));
        collector.push(Diagnostic::new(TSN::UNRESOLVED_IMPORT, "a.ts", 20, 1, &["y"]));
        collector.push(Diagnostic::new(TSN::UNRESOLVED_IMPORT, "a.ts", 5, 1, &["z"]));
        let sorted = collector.into_sorted();
        assert_eq!(sorted[0].file, "a.ts");
        assert_eq!(sorted[0].start, 5);
        assert_eq!(sorted[1].file, "a.ts");
        assert_eq!(sorted[1].start, 20);
        assert_eq!(sorted[2].file, "b.ts");
    }

    #[test]
    fn has_errors_ignores_warnings() {
        let mut collector = DiagnosticsCollector::new();
        collector.push(Diagnostic::new(TSN::DEFAULT_IMPORT_FROM_LOCAL, "a.ts", 0, 1, &[]));
        assert!(!collector.has_errors());
        collector.push(Diagnostic::new(TSN::CIRCULAR_IMPORT, "a.ts", 0, 1, &["a -> b -> a"]));
        assert!(collector.has_errors());
    }
}
