//! Final IR pass before emission (`spec.md` §4.7).
//!
//! A straight-line consumer, not a producer: it never rewrites the IR,
//! only rejects what the emitter could not receive. Anything left by
//! the converter, validator or specializer that still violates the
//! emitter contract (`tsonic_ir::emit_contract`) is caught here, one
//! phase later than ideal but before any text is produced.

mod gate;

pub use gate::SoundnessGate;

#[cfg(test)]
mod tests {
    use super::*;
    use tsonic_catalog::UnifiedTypeCatalog;
    use tsonic_common::DiagnosticsCollector;
    use tsonic_ir::expr::IrExpressionKind;
    use tsonic_ir::{IrExpression, IrModule, IrStatement, IrType};

    fn int_type() -> IrType {
        IrType::Primitive { type_id: tsonic_catalog::type_id::primitive_type_id("int").unwrap(), numeric_intent: Some(tsonic_ir::NumericIntent::Int32) }
    }

    #[test]
    fn a_fully_typed_module_passes_without_panicking() {
        let mut module = IrModule::new("ok.ts", "Demo", "Ok");
        module.body.push(IrStatement::VariableDeclaration {
            declarators: vec![tsonic_ir::stmt::VariableDeclarator {
                name: "x".to_string(),
                declared_type: Some(int_type()),
                initializer: Some(IrExpression::new(IrExpressionKind::Literal(tsonic_ir::expr::Literal::Numeric("1".to_string()))).with_type(int_type())),
            }],
            is_const: true,
        });

        let catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        SoundnessGate::new(&catalog, &mut diagnostics, "ok.ts").check_module(&module);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    #[should_panic(expected = "internal compiler error")]
    fn a_residual_any_triggers_an_ice() {
        let mut module = IrModule::new("bad.ts", "Demo", "Bad");
        module.body.push(IrStatement::VariableDeclaration {
            declarators: vec![tsonic_ir::stmt::VariableDeclarator {
                name: "x".to_string(),
                declared_type: Some(IrType::Any),
                initializer: None,
            }],
            is_const: true,
        });

        let catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        SoundnessGate::new(&catalog, &mut diagnostics, "bad.ts").check_module(&module);
    }

    #[test]
    fn an_unspecified_dictionary_value_type_is_a_regular_diagnostic_not_a_panic() {
        let mut module = IrModule::new("dict.ts", "Demo", "Dict");
        module.body.push(IrStatement::VariableDeclaration {
            declarators: vec![tsonic_ir::stmt::VariableDeclarator {
                name: "x".to_string(),
                declared_type: Some(IrType::Dictionary { value: None }),
                initializer: None,
            }],
            is_const: true,
        });

        let catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        SoundnessGate::new(&catalog, &mut diagnostics, "dict.ts").check_module(&module);
        assert!(diagnostics.has_errors());
    }
}
