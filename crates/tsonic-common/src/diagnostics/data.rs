//! Stable diagnostic codes, grouped by family per `spec.md` §6:
//!
//! - `TSN1xxx` resolution / imports
//! - `TSN2xxx` unsupported features
//! - `TSN3xxx` language restrictions (promise chains)
//! - `TSN5xxx` numeric contract (int <-> double)
//! - `TSN6xxx` field/member shadowing
//! - `TSN71xx` generic restrictions
//! - `TSN72xx` structural restrictions
//! - `TSN74xx` IR soundness

use super::DiagnosticCategory;

#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Named constants for the codes this compiler actually emits, so call
/// sites never hardcode a bare integer.
pub struct TSN;

impl TSN {
    pub const UNRESOLVED_LOCAL_MODULE: u32 = 1001;
    pub const CIRCULAR_IMPORT: u32 = 1002;
    pub const UNKNOWN_IMPORT_SPECIFIER: u32 = 1003;
    pub const UNRESOLVED_IMPORT: u32 = 1004;
    pub const DUPLICATE_NAMED_EXPORT: u32 = 1010;
    pub const DEFAULT_IMPORT_FROM_LOCAL: u32 = 1011;

    pub const DYNAMIC_PROPERTY_ACCESS: u32 = 2001;
    pub const WITH_STATEMENT: u32 = 2002;
    pub const IMPORT_META: u32 = 2003;
    pub const DYNAMIC_IMPORT: u32 = 2004;
    pub const RECURSIVE_STRUCTURAL_ALIAS: u32 = 2005;
    pub const RECURSIVE_MAPPED_TYPE: u32 = 2006;
    pub const CONDITIONAL_TYPE_WITH_INFER: u32 = 2007;
    pub const THIS_AS_TYPE_NAME: u32 = 2008;
    pub const VARIADIC_TYPE_PARAMETER: u32 = 2009;
    pub const SYMBOL_INDEX_SIGNATURE: u32 = 2010;
    pub const DISALLOWED_UTILITY_TYPE: u32 = 2011;
    pub const RECORD_WITH_NON_STRING_KEY: u32 = 2012;

    pub const PROMISE_CHAIN_METHOD: u32 = 3001;

    pub const INT_LITERAL_TO_DOUBLE: u32 = 5110;
    pub const NARROWING_NUMERIC_WIDEN: u32 = 5120;

    pub const SHADOWED_STABLE_ID: u32 = 6001;
    pub const DUPLICATE_ASSEMBLY_STABLE_ID: u32 = 6002;

    pub const GENERIC_ARITY_MISMATCH: u32 = 7101;
    pub const UNRESOLVED_TYPE_PARAMETER: u32 = 7102;

    pub const ANONYMOUS_OBJECT_IN_TYPE_POSITION: u32 = 7201;
    pub const UNSPECIFIED_DICTIONARY_VALUE_TYPE: u32 = 7202;

    pub const RESIDUAL_ANY: u32 = 7401;
    pub const UNRESOLVED_REFERENCE: u32 = 7402;
    pub const ESCAPING_GENERIC_PARAMETER: u32 = 7403;
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage { code: TSN::UNRESOLVED_LOCAL_MODULE, category: DiagnosticCategory::Error, message: "Cannot find local module '{0}'." },
    DiagnosticMessage { code: TSN::CIRCULAR_IMPORT, category: DiagnosticCategory::Error, message: "Circular import detected: {0}." },
    DiagnosticMessage { code: TSN::UNKNOWN_IMPORT_SPECIFIER, category: DiagnosticCategory::Error, message: "Import specifier '{0}' is neither a local module, a foreign binding, nor a core language import." },
    DiagnosticMessage { code: TSN::UNRESOLVED_IMPORT, category: DiagnosticCategory::Error, message: "Module '{0}' has no exported member '{1}'." },
    DiagnosticMessage { code: TSN::DUPLICATE_NAMED_EXPORT, category: DiagnosticCategory::Error, message: "Module has more than one export named '{0}'." },
    DiagnosticMessage { code: TSN::DEFAULT_IMPORT_FROM_LOCAL, category: DiagnosticCategory::Warning, message: "Default import '{0}' from a local module is discouraged; prefer a named export." },

    DiagnosticMessage { code: TSN::DYNAMIC_PROPERTY_ACCESS, category: DiagnosticCategory::Error, message: "Dynamic property access on a receiver of unknown shape is not supported." },
    DiagnosticMessage { code: TSN::WITH_STATEMENT, category: DiagnosticCategory::Error, message: "'with' statements are not supported." },
    DiagnosticMessage { code: TSN::IMPORT_META, category: DiagnosticCategory::Error, message: "'import.meta' is not supported." },
    DiagnosticMessage { code: TSN::DYNAMIC_IMPORT, category: DiagnosticCategory::Error, message: "Dynamic 'import()' is not supported." },
    DiagnosticMessage { code: TSN::RECURSIVE_STRUCTURAL_ALIAS, category: DiagnosticCategory::Error, message: "Type alias '{0}' is recursive through a structural (non-nominal) reference." },
    DiagnosticMessage { code: TSN::RECURSIVE_MAPPED_TYPE, category: DiagnosticCategory::Error, message: "Recursive mapped types are not supported." },
    DiagnosticMessage { code: TSN::CONDITIONAL_TYPE_WITH_INFER, category: DiagnosticCategory::Error, message: "Conditional types using 'infer' are not supported." },
    DiagnosticMessage { code: TSN::THIS_AS_TYPE_NAME, category: DiagnosticCategory::Error, message: "'this' cannot be used as a type name here." },
    DiagnosticMessage { code: TSN::VARIADIC_TYPE_PARAMETER, category: DiagnosticCategory::Error, message: "Variadic type parameters are not supported." },
    DiagnosticMessage { code: TSN::SYMBOL_INDEX_SIGNATURE, category: DiagnosticCategory::Error, message: "Index signatures keyed by 'symbol' are not supported." },
    DiagnosticMessage { code: TSN::DISALLOWED_UTILITY_TYPE, category: DiagnosticCategory::Error, message: "Utility type '{0}' is not supported as a generic argument." },
    DiagnosticMessage { code: TSN::RECORD_WITH_NON_STRING_KEY, category: DiagnosticCategory::Error, message: "'Record' is only supported with a 'string' key type." },

    DiagnosticMessage { code: TSN::PROMISE_CHAIN_METHOD, category: DiagnosticCategory::Error, message: "Promise-chaining method '{0}' is not supported; use 'await' instead." },

    DiagnosticMessage { code: TSN::INT_LITERAL_TO_DOUBLE, category: DiagnosticCategory::Error, message: "Integer literal '{0}' cannot be implicitly widened to 'number'; write it as a floating literal or use an explicit cast." },
    DiagnosticMessage { code: TSN::NARROWING_NUMERIC_WIDEN, category: DiagnosticCategory::Error, message: "Implicit narrowing from '{0}' to '{1}' is not allowed." },

    DiagnosticMessage { code: TSN::SHADOWED_STABLE_ID, category: DiagnosticCategory::Warning, message: "Source declaration '{0}' shadows an assembly type with the same stable id." },
    DiagnosticMessage { code: TSN::DUPLICATE_ASSEMBLY_STABLE_ID, category: DiagnosticCategory::Warning, message: "Stable id '{0}' is declared by more than one assembly; the first-loaded assembly wins." },

    DiagnosticMessage { code: TSN::GENERIC_ARITY_MISMATCH, category: DiagnosticCategory::Error, message: "Expected {0} type argument(s) but got {1}." },
    DiagnosticMessage { code: TSN::UNRESOLVED_TYPE_PARAMETER, category: DiagnosticCategory::Error, message: "Type parameter '{0}' has no substitution at this call site." },

    DiagnosticMessage { code: TSN::ANONYMOUS_OBJECT_IN_TYPE_POSITION, category: DiagnosticCategory::Error, message: "Anonymous object types are not representable in a type position here." },
    DiagnosticMessage { code: TSN::UNSPECIFIED_DICTIONARY_VALUE_TYPE, category: DiagnosticCategory::Error, message: "Index signature has no specified value type." },

    DiagnosticMessage { code: TSN::RESIDUAL_ANY, category: DiagnosticCategory::Error, message: "Internal error: 'any' survived validation and reached the soundness gate ({0})." },
    DiagnosticMessage { code: TSN::UNRESOLVED_REFERENCE, category: DiagnosticCategory::Error, message: "Internal error: reference to unresolved type id reached the soundness gate ({0})." },
    DiagnosticMessage { code: TSN::ESCAPING_GENERIC_PARAMETER, category: DiagnosticCategory::Error, message: "Internal error: open generic parameter '{0}' escaped specialization." },
];

pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_constant_has_a_message() {
        for m in DIAGNOSTIC_MESSAGES {
            assert!(get_diagnostic_message(m.code).is_some());
        }
    }
}
