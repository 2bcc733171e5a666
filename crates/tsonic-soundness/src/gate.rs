//! The soundness gate (`spec.md` §4.7): the last pass before emission.
//!
//! Two kinds of rejection live here, and they are not the same
//! severity. `anyType`, unresolved `TypeId` references and escaping
//! generic parameters are internal-compiler-error conditions — every
//! earlier phase is supposed to have ruled them out, so finding one
//! here means a phase upstream has a bug, and we abort via `ice!`
//! (`spec.md` §8 invariant 8, §7 "any or unresolved reference reaching
//! it produces an ICE"). Anonymous object types and unspecified
//! dictionary value types are ordinary structural-restriction
//! diagnostics (`TSN72xx`) that the validator and converter could not
//! rule out earlier because they depend on the type's final position.

use tsonic_catalog::{TypeId, UnifiedTypeCatalog};
use tsonic_common::diagnostics::TSN;
use tsonic_common::{Diagnostic, DiagnosticsCollector};
use tsonic_ir::expr::IrExpressionKind;
use tsonic_ir::{IrExpression, IrModule, IrStatement, IrType};

pub struct SoundnessGate<'a> {
    catalog: &'a UnifiedTypeCatalog,
    diagnostics: &'a mut DiagnosticsCollector,
    file: String,
}

impl<'a> SoundnessGate<'a> {
    pub fn new(catalog: &'a UnifiedTypeCatalog, diagnostics: &'a mut DiagnosticsCollector, file: impl Into<String>) -> Self {
        Self { catalog, diagnostics, file: file.into() }
    }

    pub fn check_module(&mut self, module: &IrModule) {
        for stmt in &module.body {
            self.check_stmt(stmt);
        }
    }

    fn is_resolvable(&self, type_id: &TypeId) -> bool {
        self.catalog.get_entry(type_id).is_some() || tsonic_catalog::type_id::primitive_type_id(&type_id.ts_name).is_some()
    }

    /// `position` names where this type sits, purely for the ICE/diagnostic message.
    fn check_type(&mut self, ty: &IrType, position: &str) {
        match ty {
            IrType::Any => {
                tsonic_common::ice!("soundness", "'any' survived validation and reached the soundness gate ({})", position);
            }
            IrType::Reference { type_id, type_arguments } => {
                if !self.is_resolvable(type_id) {
                    tsonic_common::ice!("soundness", "reference to unresolved type id '{}' reached the soundness gate ({})", type_id.ts_name, position);
                }
                for t in type_arguments {
                    self.check_type(t, position);
                }
            }
            IrType::Primitive { type_id, .. } => {
                if !self.is_resolvable(type_id) {
                    tsonic_common::ice!("soundness", "reference to unresolved type id '{}' reached the soundness gate ({})", type_id.ts_name, position);
                }
            }
            IrType::TypeParameter { name } => {
                tsonic_common::ice!("soundness", "open generic parameter '{}' escaped specialization ({})", name, position);
            }
            IrType::Array { element } => self.check_type(element, position),
            IrType::Tuple { elements } => {
                for t in elements {
                    self.check_type(t, position);
                }
            }
            IrType::Function { parameters, return_type } => {
                for t in parameters {
                    self.check_type(t, position);
                }
                self.check_type(return_type, position);
            }
            IrType::Object { members } => {
                if position != "expression" {
                    self.diagnostics.push(Diagnostic::new(TSN::ANONYMOUS_OBJECT_IN_TYPE_POSITION, self.file.clone(), 0, 0, &[]));
                }
                for (_, t) in members {
                    self.check_type(t, position);
                }
            }
            IrType::Dictionary { value } => match value {
                Some(v) => self.check_type(v, position),
                None => self.diagnostics.push(Diagnostic::new(TSN::UNSPECIFIED_DICTIONARY_VALUE_TYPE, self.file.clone(), 0, 0, &[])),
            },
            IrType::Union { members } | IrType::Intersection { members } => {
                for t in members {
                    self.check_type(t, position);
                }
            }
            IrType::Literal { .. } | IrType::Unknown | IrType::Void | IrType::Never => {}
        }
    }

    fn check_expr(&mut self, expr: &IrExpression) {
        let Some(ty) = &expr.inferred_type else {
            tsonic_common::ice!("soundness", "expression with no inferredType reached the soundness gate");
        };
        self.check_type(ty, "expression");
        self.check_expr_kind(&expr.kind);
    }

    fn check_expr_kind(&mut self, kind: &IrExpressionKind) {
        match kind {
            IrExpressionKind::Literal(_) | IrExpressionKind::Identifier { .. } => {}
            IrExpressionKind::MemberAccess { object, .. } => self.check_expr(object),
            IrExpressionKind::Call { callee, arguments, type_arguments, .. } | IrExpressionKind::New { callee, arguments, type_arguments, .. } => {
                self.check_expr(callee);
                for a in arguments {
                    self.check_expr(a);
                }
                for t in type_arguments {
                    self.check_type(t, "generic argument");
                }
            }
            IrExpressionKind::Binary { left, right, .. } | IrExpressionKind::Logical { left, right, .. } => {
                self.check_expr(left);
                self.check_expr(right);
            }
            IrExpressionKind::Unary { operand, .. } | IrExpressionKind::Update { operand, .. } | IrExpressionKind::Spread { argument: operand } | IrExpressionKind::Await { argument: operand } => {
                self.check_expr(operand);
            }
            IrExpressionKind::Assignment { target, value } => {
                self.check_expr(target);
                self.check_expr(value);
            }
            IrExpressionKind::Conditional { test, consequent, alternate } => {
                self.check_expr(test);
                self.check_expr(consequent);
                self.check_expr(alternate);
            }
            IrExpressionKind::TemplateLiteral { expressions, .. } => {
                for e in expressions {
                    self.check_expr(e);
                }
            }
            IrExpressionKind::ArrowFunction { parameters, body, return_type } | IrExpressionKind::FunctionExpression { parameters, body, return_type, .. } => {
                for p in parameters {
                    self.check_type(&p.inferred_type, "parameter");
                }
                if let Some(rt) = return_type {
                    self.check_type(rt, "type position");
                }
                self.check_stmt(body);
            }
            IrExpressionKind::Array { elements } => {
                for e in elements {
                    self.check_expr(e);
                }
            }
            IrExpressionKind::Object { properties } => {
                for p in properties {
                    self.check_expr(&p.value);
                }
            }
            IrExpressionKind::Yield { argument, resumed_type, .. } => {
                if let Some(a) = argument {
                    self.check_expr(a);
                }
                self.check_type(resumed_type, "yield resumption");
            }
        }
    }

    fn check_stmt(&mut self, stmt: &IrStatement) {
        match stmt {
            IrStatement::VariableDeclaration { declarators, .. } => {
                for d in declarators {
                    if let Some(t) = &d.declared_type {
                        self.check_type(t, "type position");
                    }
                    if let Some(i) = &d.initializer {
                        self.check_expr(i);
                    }
                }
            }
            IrStatement::FunctionDeclaration { parameters, body, return_type, .. } => {
                for p in parameters {
                    self.check_type(&p.inferred_type, "parameter");
                }
                self.check_type(return_type, "type position");
                self.check_stmt(body);
            }
            IrStatement::ClassDeclaration { body, .. } => {
                for s in body {
                    self.check_stmt(s);
                }
            }
            IrStatement::EnumDeclaration { members, .. } => {
                for (_, v) in members {
                    if let Some(e) = v {
                        self.check_expr(e);
                    }
                }
            }
            IrStatement::TypeAliasDeclaration { aliased, .. } => self.check_type(aliased, "type position"),
            IrStatement::ExpressionStatement { expression } => self.check_expr(expression),
            IrStatement::ReturnStatement { argument } => {
                if let Some(e) = argument {
                    self.check_expr(e);
                }
            }
            IrStatement::IfStatement { test, consequent, alternate } => {
                self.check_expr(test);
                self.check_stmt(consequent);
                if let Some(a) = alternate {
                    self.check_stmt(a);
                }
            }
            IrStatement::WhileStatement { test, body } => {
                self.check_expr(test);
                self.check_stmt(body);
            }
            IrStatement::ForStatement { init, test, update, body } => {
                if let Some(i) = init {
                    self.check_stmt(i);
                }
                if let Some(t) = test {
                    self.check_expr(t);
                }
                if let Some(u) = update {
                    self.check_expr(u);
                }
                self.check_stmt(body);
            }
            IrStatement::ForOfStatement { declared_type, right, body, .. } => {
                if let Some(t) = declared_type {
                    self.check_type(t, "type position");
                }
                self.check_expr(right);
                self.check_stmt(body);
            }
            IrStatement::SwitchStatement { discriminant, cases } => {
                self.check_expr(discriminant);
                for c in cases {
                    if let Some(t) = &c.test {
                        self.check_expr(t);
                    }
                    for s in &c.consequent {
                        self.check_stmt(s);
                    }
                }
            }
            IrStatement::ThrowStatement { argument } => self.check_expr(argument),
            IrStatement::TryStatement { block, handler, finalizer } => {
                self.check_stmt(block);
                if let Some(h) = handler {
                    self.check_stmt(&h.body);
                }
                if let Some(f) = finalizer {
                    self.check_stmt(f);
                }
            }
            IrStatement::BlockStatement { body } => {
                for s in body {
                    self.check_stmt(s);
                }
            }
            IrStatement::InterfaceDeclaration { .. } | IrStatement::Break { .. } | IrStatement::Continue { .. } => {}
        }
    }
}
