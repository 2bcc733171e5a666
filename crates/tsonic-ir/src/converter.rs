//! The AST-to-IR converter (`spec.md` §4.4).
//!
//! `Converter::convert_expression`/`convert_statement` are the contract
//! function `(AST node, ProgramContext, expectedType?) -> IR node`.
//! `expectedType` is threaded by value (cloned `Option<IrType>`, not a
//! reference with a lifetime) because branches such as conditional
//! expressions need to hand the same expected type to two independent
//! recursive calls.

use rustc_hash::FxHashMap;
use tracing::trace;

use tsonic_ast::{AstNode, NodeId};
use tsonic_binder::{DeclKind, HandleRegistry};
use tsonic_catalog::{TypeId, TypeRef, UnifiedTypeCatalog};
use tsonic_common::diagnostics::TSN;
use tsonic_common::numeric::{classify_numeric_syntax, NumericSyntax};
use tsonic_common::{Diagnostic, DiagnosticsCollector};

use crate::expr::{
    BinaryOperator, IrExpression, IrExpressionKind, Literal, LogicalOperator, MemberBinding, ObjectProperty,
    Parameter as IrParameter, UnaryOperator, UpdateOperator,
};
use crate::module::{ImportBindingKind, IrExport, IrImport, IrModule};
use crate::stmt::{CatchClause, IrStatement, SwitchCase, VariableDeclarator};
use crate::ty::{IrType, NumericIntent};

/// A block's type environment. Variable declarations add bindings that
/// are visible to the rest of the same block and to nested blocks,
/// never to sibling blocks that came before (`spec.md` §4.4 "Blocks
/// introduce scope").
#[derive(Default, Debug)]
pub struct Scope {
    bindings: FxHashMap<String, IrType>,
}

impl Scope {
    pub fn declare(&mut self, name: impl Into<String>, ty: IrType) {
        self.bindings.insert(name.into(), ty);
    }

    fn get(&self, name: &str) -> Option<&IrType> {
        self.bindings.get(name)
    }
}

/// A type guard recognized off the raw test expression of an
/// `if`/ternary, naming the variable it narrows and how (`spec.md` §6,
/// §8 S4).
struct Narrowing {
    target: String,
    kind: NarrowingKind,
}

enum NarrowingKind {
    /// `"prop" in v` — keeps union members that do/don't declare `prop`.
    In { property: String },
    /// `typeof v === "string"` — keeps members whose JS-facing runtime
    /// category matches (numeric CLR aliases all report `"number"`).
    Typeof { type_name: String },
    /// `v instanceof Foo` — keeps members assignable to `Foo`.
    InstanceOf { type_id: TypeId },
}

impl NarrowingKind {
    fn matches(&self, catalog: &UnifiedTypeCatalog, member: &IrType) -> bool {
        match self {
            NarrowingKind::In { property } => matches!(member, IrType::Object { members } if members.iter().any(|(name, _)| name == property)),
            NarrowingKind::Typeof { type_name } => match member {
                IrType::Primitive { type_id, .. } => match type_name.as_str() {
                    "number" => matches!(type_id.ts_name.as_str(), "number" | "double" | "int" | "long" | "byte" | "short" | "float" | "decimal"),
                    "string" => matches!(type_id.ts_name.as_str(), "string" | "char"),
                    "boolean" => type_id.ts_name == "boolean",
                    _ => false,
                },
                _ => false,
            },
            NarrowingKind::InstanceOf { type_id } => match member {
                IrType::Reference { type_id: member_id, .. } => {
                    member_id == type_id || catalog.is_assignable(&TypeRef::non_null(member_id.clone()), &TypeRef::non_null(type_id.clone()))
                }
                _ => false,
            },
        }
    }
}

/// Mirrors `tsonic_core::resolve::basename` (an import specifier's
/// bare, extensionless target module name) without pulling in a
/// dependency on that crate for one three-line helper.
fn module_basename(specifier: &str) -> &str {
    let file = specifier.rsplit('/').next().unwrap_or(specifier);
    file.strip_suffix(".ts").unwrap_or(file)
}

fn numeric_intent_for_ts_name(ts_name: &str) -> Option<NumericIntent> {
    match ts_name {
        "int" => Some(NumericIntent::Int32),
        "long" => Some(NumericIntent::Int64),
        "byte" => Some(NumericIntent::Byte),
        "short" => Some(NumericIntent::Int16),
        "float" => Some(NumericIntent::Single),
        "decimal" => Some(NumericIntent::Decimal),
        _ => None,
    }
}

pub struct Converter<'a> {
    registry: &'a HandleRegistry<'a>,
    catalog: &'a UnifiedTypeCatalog,
    diagnostics: &'a mut DiagnosticsCollector,
    file: String,
    scopes: Vec<Scope>,
    /// The declared return type of the function currently being
    /// converted, threaded down through every block, loop, try/catch
    /// and switch so a nested `return` converts against it.
    enclosing_return_type: Vec<IrType>,
    /// Dotted-path aliases resolved from bindings manifests, e.g.
    /// `"systemLinq.enumerable.selectMany" -> {assembly, type, member}`
    /// (`spec.md` §4.4 "member access ... derived from hierarchical
    /// bindings that name aliases for namespaces, types, and members").
    foreign_aliases: FxHashMap<String, MemberBinding>,
    /// One entry per generator function body currently being converted;
    /// `true` until that function's first `yield` is converted, then
    /// flipped to `false` (`spec.md` §9 "Coroutines" — the argument to
    /// the priming `next()` call has nowhere to go, so only the first
    /// yield's resumption type is pinned to `IrType::Void`).
    pending_first_yield: Vec<bool>,
    /// Per-target-module-basename, per-declared-name classification of
    /// every top-level declaration, built once up front by
    /// `tsonic_core::resolve::classify_module_decls` (`spec.md` §4.1).
    /// Refines `IrImport::kind` for a named import past the
    /// whole-statement `is_type_only` flag: an element importing a name
    /// the target module declares as type-only becomes
    /// `ImportBindingKind::TypeOnly` even on an otherwise-value import
    /// statement.
    import_classifications: &'a FxHashMap<String, FxHashMap<String, DeclKind>>,
}

impl<'a> Converter<'a> {
    pub fn new(
        registry: &'a HandleRegistry<'a>,
        catalog: &'a UnifiedTypeCatalog,
        diagnostics: &'a mut DiagnosticsCollector,
        file: impl Into<String>,
        import_classifications: &'a FxHashMap<String, FxHashMap<String, DeclKind>>,
    ) -> Self {
        Self {
            registry,
            catalog,
            diagnostics,
            file: file.into(),
            scopes: vec![Scope::default()],
            enclosing_return_type: Vec::new(),
            foreign_aliases: FxHashMap::default(),
            pending_first_yield: Vec::new(),
            import_classifications,
        }
    }

    pub fn register_foreign_alias(&mut self, dotted_path: impl Into<String>, binding: MemberBinding) {
        self.foreign_aliases.insert(dotted_path.into(), binding);
    }

    fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn resolve_scoped(&self, name: &str) -> Option<IrType> {
        self.scopes.iter().rev().find_map(|s| s.get(name).cloned())
    }

    fn declare_scoped(&mut self, name: impl Into<String>, ty: IrType) {
        self.scopes.last_mut().expect("at least one scope").declare(name, ty);
    }

    // ---- Modules -----------------------------------------------------

    pub fn convert_module(
        &mut self,
        source_file: NodeId,
        namespace: impl Into<String>,
        class_name: impl Into<String>,
    ) -> IrModule {
        let AstNode::SourceFile { file_path, body } = self.registry.get(source_file) else {
            tsonic_common::ice!("converter", "convert_module called on a non-SourceFile node");
        };
        let mut module = IrModule::new(file_path.clone(), namespace, class_name);
        self.hoist_declarations(body);
        for &stmt_id in body {
            if let AstNode::ImportDeclaration { specifier, elements, is_type_only, .. } = self.registry.get(stmt_id) {
                let target_decls = self.import_classifications.get(module_basename(specifier));
                for el in elements {
                    let kind = if *is_type_only {
                        ImportBindingKind::TypeOnly
                    } else {
                        match target_decls.and_then(|m| m.get(&el.imported_name)) {
                            Some(DeclKind::Type) => ImportBindingKind::TypeOnly,
                            Some(DeclKind::Value) | Some(DeclKind::Both) | None => ImportBindingKind::Value,
                        }
                    };
                    module.imports.push(IrImport {
                        specifier: specifier.clone(),
                        imported_name: el.imported_name.clone(),
                        local_name: el.local_name.clone(),
                        kind,
                    });
                }
                continue;
            }
            if let AstNode::ExportDeclaration { names } = self.registry.get(stmt_id) {
                for name in names {
                    module.exports.push(IrExport { exported_name: name.clone(), local_name: name.clone() });
                }
                continue;
            }
            module.body.push(self.convert_statement(stmt_id));
        }
        module
    }

    /// Binds every top-level function/class/enum name to a value type
    /// in the module's root scope before any statement body is
    /// converted, so a call or `new` anywhere in the module — including
    /// before the declaration appears in source order, and inside the
    /// declaration's own body for recursion — resolves an `inferredType`
    /// for its callee instead of leaving it `None` (the soundness gate
    /// requires every expression to carry one).
    fn hoist_declarations(&mut self, body: &[NodeId]) {
        for &stmt_id in body {
            match self.registry.get(stmt_id) {
                AstNode::FunctionDeclaration { name, parameters, return_type, .. } => {
                    let params = self.convert_parameters(parameters, None).into_iter().map(|p| p.inferred_type).collect();
                    let return_ty = return_type.map(|t| self.convert_type_syntax(t)).unwrap_or(IrType::Void);
                    self.declare_scoped(name.clone(), IrType::Function { parameters: params, return_type: Box::new(return_ty) });
                }
                AstNode::ClassDeclaration { name, .. } | AstNode::EnumDeclaration { name, .. } => {
                    let ty = match self.catalog.resolve_ts_name(name, "") {
                        Some(type_id) => IrType::Reference { type_id, type_arguments: Default::default() },
                        None => IrType::Unknown,
                    };
                    self.declare_scoped(name.clone(), ty);
                }
                _ => {}
            }
        }
    }

    /// Lowers a class's member list to the flat statement body
    /// `IrStatement::ClassDeclaration` carries: a method becomes a
    /// `FunctionDeclaration`, a field a `VariableDeclaration`. Member
    /// accessibility/staticness already lives in the catalog's
    /// `NominalEntry` (`spec.md` §3 "MemberEntry"); the IR body only
    /// needs executable statements to specialize and emit.
    fn convert_class_members(&mut self, members: &[tsonic_ast::node::MemberSyntax]) -> Vec<IrStatement> {
        members.iter().map(|m| self.convert_class_member(m)).collect()
    }

    fn convert_class_member(&mut self, member: &tsonic_ast::node::MemberSyntax) -> IrStatement {
        if member.is_method {
            let return_ty = member.return_type.map(|t| self.convert_type_syntax(t)).unwrap_or(IrType::Void);
            self.push_scope();
            let params = self.convert_parameters(&member.parameters, None);
            for p in &params {
                self.declare_scoped(p.name.clone(), p.inferred_type.clone());
            }
            self.enclosing_return_type.push(return_ty.clone());
            self.pending_first_yield.push(true);
            let body = match &member.body {
                Some(stmts) => IrStatement::BlockStatement { body: stmts.iter().map(|s| self.convert_statement(*s)).collect() },
                None => IrStatement::BlockStatement { body: vec![] },
            };
            self.pending_first_yield.pop();
            self.enclosing_return_type.pop();
            self.pop_scope();
            IrStatement::FunctionDeclaration {
                name: member.name.clone(),
                parameters: params,
                body: Box::new(body),
                return_type: return_ty,
                type_parameters: Vec::new(),
                // `tsonic_ast::node::MemberSyntax` doesn't carry a
                // generator flag (methods aren't named in the
                // generator requirement); methods never lower as one.
                is_generator: false,
            }
        } else {
            let declared_type = member.type_syntax.map(|t| self.convert_type_syntax(t));
            let initializer = member.initializer.map(|e| self.convert_expression(e, declared_type.clone()));
            let inferred = declared_type.clone().or_else(|| initializer.as_ref().and_then(|v| v.inferred_type.clone()));
            IrStatement::VariableDeclaration {
                declarators: vec![VariableDeclarator { name: member.name.clone(), declared_type: inferred, initializer }],
                is_const: member.is_readonly,
            }
        }
    }

    // ---- Statements ----------------------------------------------------

    pub fn convert_statement(&mut self, id: NodeId) -> IrStatement {
        match self.registry.get(id) {
            AstNode::VariableDeclaration { name, declared_type, initializer, is_const } => {
                let expected = declared_type.map(|t| self.convert_type_syntax(t));
                let value = initializer.map(|init| self.convert_expression(init, expected.clone()));
                let inferred = expected.clone().or_else(|| value.as_ref().and_then(|v| v.inferred_type.clone()));
                if let Some(ty) = inferred.clone() {
                    self.declare_scoped(name.clone(), ty);
                }
                IrStatement::VariableDeclaration {
                    declarators: vec![VariableDeclarator { name: name.clone(), declared_type: inferred, initializer: value }],
                    is_const: *is_const,
                }
            }
            AstNode::FunctionDeclaration { name, type_parameters, parameters, return_type, body, is_generator, .. } => {
                let return_ty = return_type.map(|t| self.convert_type_syntax(t)).unwrap_or(IrType::Void);
                self.push_scope();
                let params = self.convert_parameters(parameters, None);
                for p in &params {
                    self.declare_scoped(p.name.clone(), p.inferred_type.clone());
                }
                self.enclosing_return_type.push(return_ty.clone());
                self.pending_first_yield.push(true);
                let converted_body = match body {
                    Some(stmts) => IrStatement::BlockStatement { body: stmts.iter().map(|s| self.convert_statement(*s)).collect() },
                    None => IrStatement::BlockStatement { body: vec![] },
                };
                self.pending_first_yield.pop();
                self.enclosing_return_type.pop();
                self.pop_scope();
                IrStatement::FunctionDeclaration {
                    name: name.clone(),
                    parameters: params,
                    body: Box::new(converted_body),
                    return_type: return_ty,
                    type_parameters: type_parameters.iter().map(|p| p.name.clone()).collect(),
                    is_generator: *is_generator,
                }
            }
            AstNode::ClassDeclaration { name, type_parameters, members, .. } => IrStatement::ClassDeclaration {
                name: name.clone(),
                type_parameters: type_parameters.iter().map(|p| p.name.clone()).collect(),
                body: self.convert_class_members(members),
            },
            AstNode::InterfaceDeclaration { name, type_parameters, .. } => IrStatement::InterfaceDeclaration {
                name: name.clone(),
                type_parameters: type_parameters.iter().map(|p| p.name.clone()).collect(),
            },
            AstNode::EnumDeclaration { name, members } => IrStatement::EnumDeclaration {
                name: name.clone(),
                members: members.iter().map(|(n, init)| (n.clone(), init.map(|i| self.convert_expression(i, None)))).collect(),
            },
            AstNode::TypeAliasDeclaration { name, aliased_type, .. } => {
                IrStatement::TypeAliasDeclaration { name: name.clone(), aliased: self.convert_type_syntax(*aliased_type) }
            }
            AstNode::Block { statements } => {
                self.push_scope();
                let body = statements.iter().map(|s| self.convert_statement(*s)).collect();
                self.pop_scope();
                IrStatement::BlockStatement { body }
            }
            AstNode::ExpressionStatement { expression } => IrStatement::ExpressionStatement { expression: self.convert_expression(*expression, None) },
            AstNode::ReturnStatement { expression } => {
                let expected = self.enclosing_return_type.last().cloned();
                IrStatement::ReturnStatement { argument: expression.map(|e| self.convert_expression(e, expected)) }
            }
            AstNode::IfStatement { condition, then_branch, else_branch } => {
                let narrowing = self.analyze_narrowing(*condition);
                let test = self.convert_expression(*condition, None);
                self.push_scope();
                if let Some(n) = &narrowing {
                    self.apply_narrowing(n, true);
                }
                let consequent = self.convert_statement(*then_branch);
                self.pop_scope();
                let alternate = else_branch.map(|e| {
                    self.push_scope();
                    if let Some(n) = &narrowing {
                        self.apply_narrowing(n, false);
                    }
                    let converted = self.convert_statement(e);
                    self.pop_scope();
                    converted
                });
                IrStatement::IfStatement { test, consequent: Box::new(consequent), alternate: alternate.map(Box::new) }
            }
            AstNode::WhileStatement { condition, body } => IrStatement::WhileStatement {
                test: self.convert_expression(*condition, None),
                body: Box::new(self.convert_statement(*body)),
            },
            AstNode::ForStatement { initializer, condition, incrementor, body } => IrStatement::ForStatement {
                init: initializer.map(|i| Box::new(self.convert_statement(i))),
                test: condition.map(|c| self.convert_expression(c, None)),
                update: incrementor.map(|u| self.convert_expression(u, None)),
                body: Box::new(self.convert_statement(*body)),
            },
            AstNode::ForOfStatement { binding_name, iterable, body } => {
                let right = self.convert_expression(*iterable, None);
                let element_ty = match &right.inferred_type {
                    Some(IrType::Array { element }) => Some((**element).clone()),
                    _ => None,
                };
                self.push_scope();
                if let Some(ty) = element_ty.clone() {
                    self.declare_scoped(binding_name.clone(), ty);
                }
                let converted_body = self.convert_statement(*body);
                self.pop_scope();
                IrStatement::ForOfStatement {
                    declared_name: binding_name.clone(),
                    declared_type: element_ty,
                    right,
                    body: Box::new(converted_body),
                }
            }
            AstNode::SwitchStatement { discriminant, cases } => IrStatement::SwitchStatement {
                discriminant: self.convert_expression(*discriminant, None),
                cases: cases
                    .iter()
                    .map(|(test, consequent)| SwitchCase {
                        test: test.map(|t| self.convert_expression(t, None)),
                        consequent: consequent.iter().map(|s| self.convert_statement(*s)).collect(),
                    })
                    .collect(),
            },
            AstNode::ThrowStatement { expression } => IrStatement::ThrowStatement { argument: self.convert_expression(*expression, None) },
            AstNode::TryStatement { try_block, catch_binding, catch_block, finally_block } => {
                let block = Box::new(self.convert_statement(*try_block));
                let handler = catch_block.map(|cb| {
                    self.push_scope();
                    if let Some(name) = catch_binding {
                        // Exceptions caught in a catch clause bind the exception
                        // name as the foreign Exception type (`spec.md` §4.4).
                        if let Some(exception_type) = self.catalog.resolve_ts_name("Exception", "System") {
                            self.declare_scoped(name.clone(), IrType::Reference { type_id: exception_type, type_arguments: Default::default() });
                        }
                    }
                    let body = Box::new(self.convert_statement(cb));
                    self.pop_scope();
                    CatchClause { parameter_name: catch_binding.clone(), body }
                });
                let finalizer = finally_block.map(|f| Box::new(self.convert_statement(f)));
                IrStatement::TryStatement { block, handler, finalizer }
            }
            AstNode::BreakStatement { label } => IrStatement::Break { label: label.clone() },
            AstNode::ContinueStatement { label } => IrStatement::Continue { label: label.clone() },
            other => tsonic_common::ice!("converter", "unexpected node kind in statement position: {:?}", other.kind()),
        }
    }

    // ---- Expressions ---------------------------------------------------

    pub fn convert_expression(&mut self, id: NodeId, expected: Option<IrType>) -> IrExpression {
        match self.registry.get(id) {
            AstNode::NumericLiteral { text } => self.convert_numeric_literal(text, expected),
            AstNode::StringLiteral { value } => {
                let ty = self.catalog.resolve_ts_name("string", "").map(|t| IrType::Primitive { type_id: t, numeric_intent: None });
                IrExpression::new(IrExpressionKind::Literal(Literal::String(value.clone()))).with_type_opt(ty)
            }
            AstNode::BooleanLiteral { value } => {
                let ty = self.catalog.resolve_ts_name("boolean", "").map(|t| IrType::Primitive { type_id: t, numeric_intent: None });
                IrExpression::new(IrExpressionKind::Literal(Literal::Boolean(*value))).with_type_opt(ty)
            }
            AstNode::NullLiteral => IrExpression::new(IrExpressionKind::Literal(Literal::Null)),
            AstNode::Identifier { name } => {
                let inferred = self.resolve_scoped(name);
                IrExpression { kind: IrExpressionKind::Identifier { name: name.clone(), resolved_clr_type: None, resolved_assembly: None, resolved_clr_value: None }, inferred_type: inferred }
            }
            AstNode::TemplateLiteral { parts, expressions } => {
                let exprs = expressions.iter().map(|e| self.convert_expression(*e, None)).collect();
                let ty = self.catalog.resolve_ts_name("string", "").map(|t| IrType::Primitive { type_id: t, numeric_intent: None });
                IrExpression::new(IrExpressionKind::TemplateLiteral { quasis: parts.clone(), expressions: exprs }).with_type_opt(ty)
            }
            AstNode::ArrayLiteral { elements } => {
                let element_expected = match &expected {
                    Some(IrType::Array { element }) => Some((**element).clone()),
                    _ => None,
                };
                let converted: Vec<_> = elements.iter().map(|e| self.convert_expression(*e, element_expected.clone())).collect();
                let ty = expected.clone().or_else(|| converted.first().and_then(|e| e.inferred_type.clone()).map(|t| IrType::Array { element: Box::new(t) }));
                IrExpression::new(IrExpressionKind::Array { elements: converted }).with_type_opt(ty)
            }
            AstNode::ObjectLiteral { properties } => {
                let member_types: FxHashMap<String, IrType> = match &expected {
                    Some(IrType::Object { members }) => members.iter().cloned().collect(),
                    _ => FxHashMap::default(),
                };
                let props = properties
                    .iter()
                    .map(|(key, value_id)| ObjectProperty { key: key.clone(), value: self.convert_expression(*value_id, member_types.get(key).cloned()) })
                    .collect();
                IrExpression::new(IrExpressionKind::Object { properties: props }).with_type_opt(expected)
            }
            AstNode::SpreadElement { expression } => {
                let inner = self.convert_expression(*expression, None);
                let ty = inner.inferred_type.clone();
                IrExpression::new(IrExpressionKind::Spread { argument: Box::new(inner) }).with_type_opt(ty)
            }
            AstNode::CallExpression { callee, type_arguments, arguments } => self.convert_call(*callee, type_arguments, arguments, false),
            AstNode::NewExpression { callee, type_arguments, arguments } => self.convert_call(*callee, type_arguments, arguments, true),
            AstNode::BinaryExpression { operator, left, right } => self.convert_binary(operator, *left, *right),
            AstNode::LogicalExpression { operator, left, right } => {
                let l = self.convert_expression(*left, None);
                let r = self.convert_expression(*right, None);
                let op = match operator.as_str() {
                    "&&" => LogicalOperator::And,
                    "||" => LogicalOperator::Or,
                    "??" => LogicalOperator::NullishCoalescing,
                    other => tsonic_common::ice!("converter", "unknown logical operator {}", other),
                };
                let ty = r.inferred_type.clone();
                IrExpression::new(IrExpressionKind::Logical { operator: op, left: Box::new(l), right: Box::new(r) }).with_type_opt(ty)
            }
            AstNode::UnaryExpression { operator, operand, prefix } => {
                let inner = self.convert_expression(*operand, None);
                let op = match operator.as_str() {
                    "+" => UnaryOperator::Plus,
                    "-" => UnaryOperator::Minus,
                    "!" => UnaryOperator::Not,
                    "~" => UnaryOperator::BitNot,
                    "typeof" => UnaryOperator::Typeof,
                    "void" => UnaryOperator::Void,
                    other => tsonic_common::ice!("converter", "unknown unary operator {}", other),
                };
                let ty = if matches!(op, UnaryOperator::Not) {
                    self.catalog.resolve_ts_name("boolean", "").map(|t| IrType::Primitive { type_id: t, numeric_intent: None })
                } else {
                    inner.inferred_type.clone()
                };
                let _ = prefix;
                IrExpression::new(IrExpressionKind::Unary { operator: op, operand: Box::new(inner) }).with_type_opt(ty)
            }
            AstNode::UpdateExpression { operator, operand, prefix } => {
                let inner = self.convert_expression(*operand, None);
                let op = match operator.as_str() {
                    "++" => UpdateOperator::Increment,
                    "--" => UpdateOperator::Decrement,
                    other => tsonic_common::ice!("converter", "unknown update operator {}", other),
                };
                let ty = inner.inferred_type.clone();
                IrExpression::new(IrExpressionKind::Update { operator: op, operand: Box::new(inner), prefix: *prefix }).with_type_opt(ty)
            }
            AstNode::AssignmentExpression { target, value, .. } => {
                let target_ir = self.convert_expression(*target, None);
                let expected_rhs = target_ir.inferred_type.clone();
                let value_ir = self.convert_expression(*value, expected_rhs);
                let ty = target_ir.inferred_type.clone();
                IrExpression::new(IrExpressionKind::Assignment { target: Box::new(target_ir), value: Box::new(value_ir) }).with_type_opt(ty)
            }
            AstNode::ConditionalExpression { condition, when_true, when_false } => {
                let test = self.convert_expression(*condition, None);
                let consequent = self.convert_expression(*when_true, expected.clone());
                let alternate = self.convert_expression(*when_false, expected.clone());
                let result_ty = expected.clone().or_else(|| match (&consequent.inferred_type, &alternate.inferred_type) {
                    (Some(a), Some(b)) if a == b => Some(a.clone()),
                    (Some(a), Some(b)) => Some(IrType::normalized_union(vec![a.clone(), b.clone()])),
                    (Some(a), None) => Some(a.clone()),
                    (None, Some(b)) => Some(b.clone()),
                    (None, None) => None,
                });
                IrExpression::new(IrExpressionKind::Conditional { test: Box::new(test), consequent: Box::new(consequent), alternate: Box::new(alternate) }).with_type_opt(result_ty)
            }
            AstNode::MemberAccessExpression { object, property, .. } => self.convert_member_access(*object, property),
            AstNode::ArrowFunctionExpression { parameters, return_type, body, is_expression_body, .. } => {
                let expected_fn = match &expected {
                    Some(IrType::Function { parameters, return_type }) => Some((parameters.clone(), (**return_type).clone())),
                    _ => None,
                };
                self.push_scope();
                let params = self.convert_parameters(parameters, expected_fn.as_ref().map(|(p, _)| p.as_slice()));
                for p in &params {
                    self.declare_scoped(p.name.clone(), p.inferred_type.clone());
                }
                let return_ty = return_type
                    .map(|t| self.convert_type_syntax(t))
                    .or_else(|| expected_fn.as_ref().map(|(_, r)| r.clone()));
                self.enclosing_return_type.push(return_ty.clone().unwrap_or(IrType::Void));
                let converted_body = if *is_expression_body {
                    let value = self.convert_expression(*body, return_ty.clone());
                    Box::new(IrStatement::ReturnStatement { argument: Some(value) })
                } else {
                    Box::new(self.convert_statement(*body))
                };
                self.enclosing_return_type.pop();
                self.pop_scope();
                let fn_ty = IrType::Function {
                    parameters: params.iter().map(|p| p.inferred_type.clone()).collect(),
                    return_type: Box::new(return_ty.clone().unwrap_or(IrType::Void)),
                };
                IrExpression::new(IrExpressionKind::ArrowFunction { parameters: params, body: converted_body, return_type: return_ty }).with_type_opt(Some(fn_ty))
            }
            AstNode::FunctionExpression { name, parameters, return_type, body, is_generator, .. } => {
                self.push_scope();
                let params = self.convert_parameters(parameters, None);
                for p in &params {
                    self.declare_scoped(p.name.clone(), p.inferred_type.clone());
                }
                let return_ty = return_type.map(|t| self.convert_type_syntax(t));
                self.enclosing_return_type.push(return_ty.clone().unwrap_or(IrType::Void));
                self.pending_first_yield.push(true);
                let converted_body = Box::new(self.convert_statement(*body));
                self.pending_first_yield.pop();
                self.enclosing_return_type.pop();
                self.pop_scope();
                IrExpression::new(IrExpressionKind::FunctionExpression { name: name.clone(), parameters: params, body: converted_body, return_type: return_ty, is_generator: *is_generator })
            }
            AstNode::AwaitExpression { expression } => {
                let inner = self.convert_expression(*expression, None);
                let ty = inner.inferred_type.clone();
                IrExpression::new(IrExpressionKind::Await { argument: Box::new(inner) }).with_type_opt(ty)
            }
            AstNode::YieldExpression { expression, delegate } => {
                let argument = expression.map(|e| Box::new(self.convert_expression(e, None)));
                let is_first = match self.pending_first_yield.last_mut() {
                    Some(pending @ true) => {
                        *pending = false;
                        true
                    }
                    _ => false,
                };
                let resumed_type = if is_first { IrType::Void } else { IrType::Unknown };
                IrExpression::new(IrExpressionKind::Yield { argument, delegate: *delegate, resumed_type })
            }
            other => tsonic_common::ice!("converter", "unexpected node kind in expression position: {:?}", other.kind()),
        }
    }

    fn convert_numeric_literal(&mut self, text: &str, expected: Option<IrType>) -> IrExpression {
        let syntax = classify_numeric_syntax(text);
        let expected_primitive = match &expected {
            Some(IrType::Primitive { type_id, .. }) => Some(type_id.clone()),
            _ => None,
        };

        if let Some(type_id) = expected_primitive {
            let ts_name = tsonic_catalog::type_id::primitive_source_name(&type_id.clr_name);
            let intent = ts_name.and_then(numeric_intent_for_ts_name);
            if intent.is_none() {
                // number/double context.
                if matches!(syntax, NumericSyntax::Integer) {
                    self.diagnostics.push(Diagnostic::new(TSN::INT_LITERAL_TO_DOUBLE, self.file.clone(), 0, 0, &[text]));
                }
            } else if matches!(syntax, NumericSyntax::Floating) {
                self.diagnostics.push(Diagnostic::new(TSN::NARROWING_NUMERIC_WIDEN, self.file.clone(), 0, 0, &["number", ts_name.unwrap_or("int")]));
            }
            return IrExpression::new(IrExpressionKind::Literal(Literal::Numeric(text.to_string())))
                .with_type(IrType::Primitive { type_id, numeric_intent: intent });
        }

        // No contextual type: default to the source literal's own syntactic
        // form (`spec.md` §4.4).
        let (ts_name, intent) = match syntax {
            NumericSyntax::Integer => ("int", Some(NumericIntent::Int32)),
            NumericSyntax::Floating => ("number", None),
        };
        let ty = self.catalog.resolve_ts_name(ts_name, "").map(|type_id| IrType::Primitive { type_id, numeric_intent: intent });
        IrExpression::new(IrExpressionKind::Literal(Literal::Numeric(text.to_string()))).with_type_opt(ty)
    }

    fn convert_parameters(&mut self, params: &[tsonic_ast::node::Parameter], expected: Option<&[IrType]>) -> Vec<IrParameter> {
        params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let ty = if let Some(t) = p.type_syntax {
                    self.convert_type_syntax(t)
                } else if let Some(expected) = expected.and_then(|e| e.get(i)) {
                    expected.clone()
                } else {
                    IrType::Any
                };
                IrParameter { name: p.name.clone(), inferred_type: ty, optional: p.optional, rest: p.rest }
            })
            .collect()
    }

    fn convert_call(&mut self, callee: NodeId, type_arguments: &[NodeId], arguments: &[NodeId], is_new: bool) -> IrExpression {
        let callee_ir = self.convert_expression(callee, None);
        let type_args: smallvec::SmallVec<[IrType; 2]> = type_arguments.iter().map(|t| self.convert_type_syntax(*t)).collect();
        let args = arguments.iter().map(|a| self.convert_expression(*a, None)).collect();
        let requires_specialization = !type_args.is_empty() && matches!(&callee_ir.kind, IrExpressionKind::Identifier { resolved_clr_type: None, resolved_assembly: None, .. });
        trace!(is_new, requires_specialization, "converted call expression");
        let kind = if is_new {
            IrExpressionKind::New { callee: Box::new(callee_ir), arguments: args, type_arguments: type_args, requires_specialization }
        } else {
            IrExpressionKind::Call { callee: Box::new(callee_ir), arguments: args, type_arguments: type_args, requires_specialization }
        };
        IrExpression::new(kind)
    }

    fn convert_binary(&mut self, operator: &str, left: NodeId, right: NodeId) -> IrExpression {
        let l = self.convert_expression(left, None);
        let r = self.convert_expression(right, l.inferred_type.clone());
        let op = match operator {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Mod,
            "==" => BinaryOperator::Eq,
            "!=" => BinaryOperator::NotEq,
            "===" => BinaryOperator::StrictEq,
            "!==" => BinaryOperator::StrictNotEq,
            "<" => BinaryOperator::Lt,
            "<=" => BinaryOperator::LtEq,
            ">" => BinaryOperator::Gt,
            ">=" => BinaryOperator::GtEq,
            "instanceof" => BinaryOperator::Instanceof,
            "in" => BinaryOperator::In,
            other => tsonic_common::ice!("converter", "unknown binary operator {}", other),
        };
        let is_comparison = matches!(op, BinaryOperator::Eq | BinaryOperator::NotEq | BinaryOperator::StrictEq | BinaryOperator::StrictNotEq | BinaryOperator::Lt | BinaryOperator::LtEq | BinaryOperator::Gt | BinaryOperator::GtEq | BinaryOperator::Instanceof | BinaryOperator::In);
        let ty = if is_comparison {
            self.catalog.resolve_ts_name("boolean", "").map(|t| IrType::Primitive { type_id: t, numeric_intent: None })
        } else {
            l.inferred_type.clone().or_else(|| r.inferred_type.clone())
        };
        IrExpression::new(IrExpressionKind::Binary { operator: op, left: Box::new(l), right: Box::new(r) }).with_type_opt(ty)
    }

    fn convert_member_access(&mut self, object: NodeId, property: &str) -> IrExpression {
        let dotted = self.dotted_path(object).map(|p| format!("{p}.{property}"));
        let member_binding = dotted.as_deref().and_then(|p| self.foreign_aliases.get(p)).cloned();
        let object_ir = self.convert_expression(object, None);
        let ty = member_binding.as_ref().map(|_| IrType::Unknown);
        IrExpression::new(IrExpressionKind::MemberAccess { object: Box::new(object_ir), property: property.to_string(), member_binding }).with_type_opt(ty)
    }

    /// Re-derives the dotted textual path of a member-access chain
    /// (`a.b.c`) purely from syntax, used only to probe
    /// `foreign_aliases` before the expression itself is converted.
    fn dotted_path(&self, id: NodeId) -> Option<String> {
        match self.registry.get(id) {
            AstNode::Identifier { name } => Some(name.clone()),
            AstNode::MemberAccessExpression { object, property, .. } => self.dotted_path(*object).map(|p| format!("{p}.{property}")),
            _ => None,
        }
    }

    // ---- Type-guard narrowing -------------------------------------------

    /// Recognizes the `in`/`typeof`/`instanceof` type-guard forms named
    /// by `spec.md` §6 directly off the raw test expression, before it
    /// is converted, since only the *unconverted* syntax distinguishes
    /// `"n" in v` from an ordinary `in` membership check on a non-union.
    fn analyze_narrowing(&self, condition: NodeId) -> Option<Narrowing> {
        match self.registry.get(condition) {
            AstNode::BinaryExpression { operator, left, right } if operator == "in" => {
                let AstNode::StringLiteral { value: property } = self.registry.get(*left) else { return None };
                let AstNode::Identifier { name: target } = self.registry.get(*right) else { return None };
                Some(Narrowing { target: target.clone(), kind: NarrowingKind::In { property: property.clone() } })
            }
            AstNode::BinaryExpression { operator, left, right } if operator == "instanceof" => {
                let AstNode::Identifier { name: target } = self.registry.get(*left) else { return None };
                let AstNode::Identifier { name: type_name } = self.registry.get(*right) else { return None };
                let type_id = self.catalog.resolve_ts_name(type_name, "")?;
                Some(Narrowing { target: target.clone(), kind: NarrowingKind::InstanceOf { type_id } })
            }
            AstNode::BinaryExpression { operator, left, right } if operator == "===" || operator == "==" => {
                let as_typeof = |operand: NodeId, literal: NodeId| -> Option<(String, String)> {
                    let AstNode::UnaryExpression { operator: op, operand, .. } = self.registry.get(operand) else { return None };
                    if op != "typeof" {
                        return None;
                    }
                    let AstNode::Identifier { name: target } = self.registry.get(*operand) else { return None };
                    let AstNode::StringLiteral { value } = self.registry.get(literal) else { return None };
                    Some((target.clone(), value.clone()))
                };
                let (target, type_name) = as_typeof(*left, *right).or_else(|| as_typeof(*right, *left))?;
                Some(Narrowing { target, kind: NarrowingKind::Typeof { type_name } })
            }
            _ => None,
        }
    }

    /// Narrows `narrowing.target`'s current union type to the members
    /// consistent with the test having evaluated to `branch_true`,
    /// declaring the result in the scope already pushed for that
    /// branch so it shadows the wider binding only there. Leaves the
    /// binding untouched if it isn't currently a union, or narrowing
    /// would eliminate every member (a condition the validator should
    /// have already rejected, not something worth an ICE over here).
    fn apply_narrowing(&mut self, narrowing: &Narrowing, branch_true: bool) {
        let Some(IrType::Union { members }) = self.resolve_scoped(&narrowing.target) else { return };
        let kept: Vec<IrType> = members
            .into_iter()
            .filter(|member| narrowing.kind.matches(self.catalog, member) == branch_true)
            .collect();
        if kept.is_empty() {
            return;
        }
        self.declare_scoped(narrowing.target.clone(), IrType::normalized_union(kept));
    }

    // ---- Type syntax -----------------------------------------------------

    pub fn convert_type_syntax(&mut self, id: NodeId) -> IrType {
        match self.registry.get(id) {
            AstNode::PrimitiveTypeReference { name } => self
                .catalog
                .resolve_ts_name(name, "")
                .map(|type_id| IrType::Primitive { type_id, numeric_intent: numeric_intent_for_ts_name(name) })
                .unwrap_or(IrType::Any),
            AstNode::TypeReference { name, type_arguments } => {
                let args: smallvec::SmallVec<[IrType; 2]> = type_arguments.iter().map(|t| self.convert_type_syntax(*t)).collect();
                match self.catalog.resolve_ts_name(name, "") {
                    Some(type_id) => IrType::Reference { type_id, type_arguments: args },
                    None => IrType::TypeParameter { name: name.clone() },
                }
            }
            AstNode::ArrayTypeSyntax { element } => IrType::Array { element: Box::new(self.convert_type_syntax(*element)) },
            AstNode::TupleTypeSyntax { elements } => IrType::Tuple { elements: elements.iter().map(|e| self.convert_type_syntax(*e)).collect() },
            AstNode::FunctionTypeSyntax { parameters, return_type } => IrType::Function {
                parameters: parameters.iter().filter_map(|p| p.type_syntax).map(|t| self.convert_type_syntax(t)).collect(),
                return_type: Box::new(self.convert_type_syntax(*return_type)),
            },
            AstNode::ObjectTypeSyntax { members, index_signature_value } => {
                if let Some(value_ty) = index_signature_value {
                    IrType::Dictionary { value: Some(Box::new(self.convert_type_syntax(*value_ty))) }
                } else {
                    let fields = members
                        .iter()
                        .map(|m| (m.name.clone(), m.type_syntax.map(|t| self.convert_type_syntax(t)).unwrap_or(IrType::Any)))
                        .collect();
                    IrType::Object { members: fields }
                }
            }
            AstNode::UnionTypeSyntax { members } => {
                let converted = members.iter().map(|m| self.convert_type_syntax(*m)).collect();
                IrType::normalized_union(converted)
            }
            AstNode::IntersectionTypeSyntax { members } => IrType::Intersection { members: members.iter().map(|m| self.convert_type_syntax(*m)).collect() },
            AstNode::LiteralTypeSyntax { text } => IrType::Literal { value: text.clone() },
            other => tsonic_common::ice!("converter", "unexpected node kind in type position: {:?}", other.kind()),
        }
    }
}

trait WithTypeOpt {
    fn with_type_opt(self, ty: Option<IrType>) -> Self;
}

impl WithTypeOpt for IrExpression {
    fn with_type_opt(mut self, ty: Option<IrType>) -> Self {
        self.inferred_type = ty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsonic_ast::node::{Parameter as AstParameter, PassingMode};
    use tsonic_ast::AstArena;
    use tsonic_common::Span;

    fn param(name: &str, type_syntax: Option<NodeId>) -> AstParameter {
        AstParameter { name: name.to_string(), type_syntax, optional: false, rest: false, passing_mode: PassingMode::Value, default_value: None }
    }

    #[test]
    fn bare_integer_literal_in_a_number_context_is_diagnosed() {
        // `const x: number = 42;` (`spec.md` §8 S1).
        let mut arena = AstArena::new();
        let type_syntax = arena.alloc(AstNode::PrimitiveTypeReference { name: "number".to_string() }, Span::dummy());
        let literal = arena.alloc(AstNode::NumericLiteral { text: "42".to_string() }, Span::dummy());
        let decl = arena.alloc(
            AstNode::VariableDeclaration { name: "x".to_string(), declared_type: Some(type_syntax), initializer: Some(literal), is_const: true },
            Span::dummy(),
        );

        let catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        let registry = HandleRegistry::new(&arena);
        let import_classifications = FxHashMap::default();
        let mut converter = Converter::new(&registry, &catalog, &mut diagnostics, "a.ts", &import_classifications);
        converter.convert_statement(decl);

        assert!(diagnostics.has_errors());
    }

    #[test]
    fn floating_literal_in_a_number_context_is_not_diagnosed() {
        let mut arena = AstArena::new();
        let type_syntax = arena.alloc(AstNode::PrimitiveTypeReference { name: "number".to_string() }, Span::dummy());
        let literal = arena.alloc(AstNode::NumericLiteral { text: "42.0".to_string() }, Span::dummy());
        let decl = arena.alloc(
            AstNode::VariableDeclaration { name: "x".to_string(), declared_type: Some(type_syntax), initializer: Some(literal), is_const: true },
            Span::dummy(),
        );

        let catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        let registry = HandleRegistry::new(&arena);
        let import_classifications = FxHashMap::default();
        let mut converter = Converter::new(&registry, &catalog, &mut diagnostics, "a.ts", &import_classifications);
        let stmt = converter.convert_statement(decl);

        assert!(diagnostics.is_empty());
        let IrStatement::VariableDeclaration { declarators, .. } = stmt else { panic!("expected variable declaration") };
        let initializer = declarators[0].initializer.as_ref().unwrap();
        assert!(matches!(&initializer.inferred_type, Some(IrType::Primitive { numeric_intent: None, .. })));
    }

    #[test]
    fn arrow_parameters_without_annotations_are_inferred_from_the_expected_function_type() {
        // `const add: (a:number,b:number)=>number = (a,b) => a+b;` (`spec.md` §8 S3).
        let mut arena = AstArena::new();
        let a_id = arena.alloc(AstNode::Identifier { name: "a".to_string() }, Span::dummy());
        let b_id = arena.alloc(AstNode::Identifier { name: "b".to_string() }, Span::dummy());
        let sum = arena.alloc(AstNode::BinaryExpression { operator: "+".to_string(), left: a_id, right: b_id }, Span::dummy());
        let arrow = arena.alloc(
            AstNode::ArrowFunctionExpression {
                parameters: vec![param("a", None), param("b", None)],
                return_type: None,
                body: sum,
                is_expression_body: true,
                is_async: false,
            },
            Span::dummy(),
        );

        let catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        let registry = HandleRegistry::new(&arena);
        let import_classifications = FxHashMap::default();
        let mut converter = Converter::new(&registry, &catalog, &mut diagnostics, "a.ts", &import_classifications);
        let number = converter.catalog.resolve_ts_name("number", "").unwrap();
        let expected = IrType::Function {
            parameters: vec![
                IrType::Primitive { type_id: number.clone(), numeric_intent: None },
                IrType::Primitive { type_id: number.clone(), numeric_intent: None },
            ]
            .into(),
            return_type: Box::new(IrType::Primitive { type_id: number, numeric_intent: None }),
        };

        let converted = converter.convert_expression(arrow, Some(expected));
        let IrExpressionKind::ArrowFunction { parameters, .. } = &converted.kind else { panic!("expected arrow function") };
        for p in parameters {
            assert!(matches!(p.inferred_type, IrType::Primitive { numeric_intent: None, .. }));
            assert!(!matches!(p.inferred_type, IrType::Any));
        }
    }

    #[test]
    fn conditional_branches_share_the_expected_type_and_unify_without_it() {
        let mut arena = AstArena::new();
        let test = arena.alloc(AstNode::BooleanLiteral { value: true }, Span::dummy());
        let a = arena.alloc(AstNode::NumericLiteral { text: "1".to_string() }, Span::dummy());
        let b = arena.alloc(AstNode::NumericLiteral { text: "2".to_string() }, Span::dummy());
        let cond = arena.alloc(AstNode::ConditionalExpression { condition: test, when_true: a, when_false: b }, Span::dummy());

        let catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        let registry = HandleRegistry::new(&arena);
        let import_classifications = FxHashMap::default();
        let mut converter = Converter::new(&registry, &catalog, &mut diagnostics, "a.ts", &import_classifications);
        let converted = converter.convert_expression(cond, None);

        // Both branches default to `int` syntax with no context; identical
        // inferred types unify to themselves (`spec.md` §4.4).
        assert!(matches!(converted.inferred_type, Some(IrType::Primitive { .. })));
    }

    #[test]
    fn variable_declared_in_a_block_is_visible_to_later_statements_in_the_same_block() {
        let mut arena = AstArena::new();
        let literal = arena.alloc(AstNode::NumericLiteral { text: "1".to_string() }, Span::dummy());
        let decl = arena.alloc(
            AstNode::VariableDeclaration { name: "x".to_string(), declared_type: None, initializer: Some(literal), is_const: true },
            Span::dummy(),
        );
        let x_ref = arena.alloc(AstNode::Identifier { name: "x".to_string() }, Span::dummy());
        let use_stmt = arena.alloc(AstNode::ExpressionStatement { expression: x_ref }, Span::dummy());
        let block = arena.alloc(AstNode::Block { statements: vec![decl, use_stmt].into() }, Span::dummy());

        let catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        let registry = HandleRegistry::new(&arena);
        let import_classifications = FxHashMap::default();
        let mut converter = Converter::new(&registry, &catalog, &mut diagnostics, "a.ts", &import_classifications);
        let IrStatement::BlockStatement { body } = converter.convert_statement(block) else { panic!("expected block") };
        let IrStatement::ExpressionStatement { expression } = &body[1] else { panic!("expected expression statement") };
        assert!(expression.inferred_type.is_some());
    }

    fn type_member(name: &str, type_syntax: NodeId) -> tsonic_ast::node::MemberSyntax {
        tsonic_ast::node::MemberSyntax {
            name: name.to_string(),
            is_static: false,
            is_method: false,
            is_readonly: false,
            optional: false,
            type_syntax: Some(type_syntax),
            parameters: vec![],
            return_type: None,
            body: None,
            initializer: None,
        }
    }

    #[test]
    fn in_operator_narrows_a_discriminated_union_in_each_branch() {
        // `{n:number}|{s:string}` narrowed by `"n" in v` (`spec.md` §8 S4).
        let mut arena = AstArena::new();
        let number_ty = arena.alloc(AstNode::PrimitiveTypeReference { name: "number".to_string() }, Span::dummy());
        let string_ty = arena.alloc(AstNode::PrimitiveTypeReference { name: "string".to_string() }, Span::dummy());
        let has_n = arena.alloc(AstNode::ObjectTypeSyntax { members: vec![type_member("n", number_ty)], index_signature_value: None }, Span::dummy());
        let has_s = arena.alloc(AstNode::ObjectTypeSyntax { members: vec![type_member("s", string_ty)], index_signature_value: None }, Span::dummy());
        let union_ty = arena.alloc(AstNode::UnionTypeSyntax { members: vec![has_n, has_s] }, Span::dummy());
        let decl = arena.alloc(
            AstNode::VariableDeclaration { name: "v".to_string(), declared_type: Some(union_ty), initializer: None, is_const: true },
            Span::dummy(),
        );

        let property = arena.alloc(AstNode::StringLiteral { value: "n".to_string() }, Span::dummy());
        let v_in_true = arena.alloc(AstNode::Identifier { name: "v".to_string() }, Span::dummy());
        let condition = arena.alloc(AstNode::BinaryExpression { operator: "in".to_string(), left: property, right: v_in_true }, Span::dummy());
        let v_in_then = arena.alloc(AstNode::Identifier { name: "v".to_string() }, Span::dummy());
        let then_branch = arena.alloc(AstNode::ExpressionStatement { expression: v_in_then }, Span::dummy());
        let v_in_else = arena.alloc(AstNode::Identifier { name: "v".to_string() }, Span::dummy());
        let else_branch = arena.alloc(AstNode::ExpressionStatement { expression: v_in_else }, Span::dummy());
        let if_stmt = arena.alloc(AstNode::IfStatement { condition, then_branch, else_branch: Some(else_branch) }, Span::dummy());
        let block = arena.alloc(AstNode::Block { statements: vec![decl, if_stmt].into() }, Span::dummy());

        let catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        let registry = HandleRegistry::new(&arena);
        let import_classifications = FxHashMap::default();
        let mut converter = Converter::new(&registry, &catalog, &mut diagnostics, "a.ts", &import_classifications);
        let IrStatement::BlockStatement { body } = converter.convert_statement(block) else { panic!("expected block") };
        let IrStatement::IfStatement { consequent, alternate, .. } = &body[1] else { panic!("expected if statement") };

        let IrStatement::ExpressionStatement { expression: then_expr } = consequent.as_ref() else { panic!() };
        let Some(IrType::Object { members: then_members }) = &then_expr.inferred_type else { panic!("expected narrowed object type in true branch") };
        assert_eq!(then_members.len(), 1);
        assert_eq!(then_members[0].0, "n");

        let IrStatement::ExpressionStatement { expression: else_expr } = alternate.as_ref().unwrap().as_ref() else { panic!() };
        let Some(IrType::Object { members: else_members }) = &else_expr.inferred_type else { panic!("expected narrowed object type in false branch") };
        assert_eq!(else_members.len(), 1);
        assert_eq!(else_members[0].0, "s");
    }

    #[test]
    fn generator_function_carries_the_flag_and_only_its_first_yield_resumes_as_void() {
        // `function* gen() { yield 1; yield 2; }` (`spec.md` §9 "Coroutines").
        let mut arena = AstArena::new();
        let one = arena.alloc(AstNode::NumericLiteral { text: "1".to_string() }, Span::dummy());
        let first_yield = arena.alloc(AstNode::YieldExpression { expression: Some(one), delegate: false }, Span::dummy());
        let first_stmt = arena.alloc(AstNode::ExpressionStatement { expression: first_yield }, Span::dummy());
        let two = arena.alloc(AstNode::NumericLiteral { text: "2".to_string() }, Span::dummy());
        let second_yield = arena.alloc(AstNode::YieldExpression { expression: Some(two), delegate: false }, Span::dummy());
        let second_stmt = arena.alloc(AstNode::ExpressionStatement { expression: second_yield }, Span::dummy());
        let func = arena.alloc(
            AstNode::FunctionDeclaration {
                name: "gen".to_string(),
                type_parameters: vec![],
                parameters: vec![],
                return_type: None,
                body: Some(vec![first_stmt, second_stmt].into()),
                is_async: false,
                is_generator: true,
            },
            Span::dummy(),
        );

        let catalog = UnifiedTypeCatalog::new();
        let mut diagnostics = DiagnosticsCollector::new();
        let registry = HandleRegistry::new(&arena);
        let import_classifications = FxHashMap::default();
        let mut converter = Converter::new(&registry, &catalog, &mut diagnostics, "a.ts", &import_classifications);
        let IrStatement::FunctionDeclaration { is_generator, body, .. } = converter.convert_statement(func) else { panic!("expected function declaration") };
        assert!(is_generator);

        let IrStatement::BlockStatement { body } = *body else { panic!("expected block") };
        let IrStatement::ExpressionStatement { expression: first } = &body[0] else { panic!() };
        let IrExpressionKind::Yield { resumed_type: first_resumed, .. } = &first.kind else { panic!("expected yield") };
        assert_eq!(*first_resumed, IrType::Void);

        let IrStatement::ExpressionStatement { expression: second } = &body[1] else { panic!() };
        let IrExpressionKind::Yield { resumed_type: second_resumed, .. } = &second.kind else { panic!("expected yield") };
        assert_eq!(*second_resumed, IrType::Unknown);
    }
}
