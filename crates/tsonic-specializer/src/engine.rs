//! Collection, generation and substitution driver (`spec.md` §4.6).

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use tsonic_common::diagnostics::TSN;
use tsonic_common::{Diagnostic, DiagnosticsCollector};
use tsonic_ir::expr::IrExpressionKind;
use tsonic_ir::{IrExpression, IrModule, IrStatement, IrType};

use crate::key::{request_key, specialized_name};
use crate::substitute::{find_unsubstituted, substitute_stmt, Formals};

#[derive(Clone, Debug)]
struct Request {
    base_name: String,
    type_arguments: Vec<IrType>,
}

/// Drives specialization for one module to a fixed point: each pass may
/// uncover new requests inside freshly materialized bodies (nested
/// generics), so collection and generation repeat until a pass adds
/// nothing (`spec.md` §8 "idempotence").
pub struct Specializer<'a> {
    diagnostics: &'a mut DiagnosticsCollector,
    file: String,
}

impl<'a> Specializer<'a> {
    pub fn new(diagnostics: &'a mut DiagnosticsCollector, file: impl Into<String>) -> Self {
        Self { diagnostics, file: file.into() }
    }

    pub fn specialize_module(&mut self, module: &mut IrModule) {
        let mut materialized: FxHashSet<String> = module.body.iter().filter_map(decl_name).collect();
        let mut diagnosed: FxHashSet<String> = FxHashSet::default();

        loop {
            let requests = collect_requests(module);
            let mut added = false;

            for (_, request) in requests {
                let name = specialized_name(&request.base_name, &request.type_arguments);
                if materialized.contains(&name) {
                    continue;
                }

                let Some(generic_decl) = find_generic_declaration(module, &request.base_name) else {
                    continue;
                };
                let formal_names = decl_type_parameters(generic_decl).to_vec();

                if formal_names.len() != request.type_arguments.len() {
                    if diagnosed.insert(name.clone()) {
                        self.diagnostics.push(Diagnostic::new(
                            TSN::GENERIC_ARITY_MISMATCH,
                            self.file.clone(),
                            0,
                            0,
                            &[&formal_names.len().to_string(), &request.type_arguments.len().to_string()],
                        ));
                    }
                    materialized.insert(name);
                    continue;
                }

                let formals: Formals = formal_names.iter().cloned().zip(request.type_arguments.iter().cloned()).collect();
                let specialized = rename(substitute_stmt(generic_decl, &formals), &name);

                if let Some(unresolved) = decl_return_and_body_unresolved(&specialized, &formal_names) {
                    if diagnosed.insert(name.clone()) {
                        self.diagnostics.push(Diagnostic::new(TSN::UNRESOLVED_TYPE_PARAMETER, self.file.clone(), 0, 0, &[&unresolved]));
                    }
                }

                debug!(base = %request.base_name, specialized = %name, "materialized specialization");
                materialized.insert(name);
                module.body.push(specialized);
                added = true;
            }

            if !added {
                break;
            }
        }
    }
}

fn decl_name(stmt: &IrStatement) -> Option<String> {
    match stmt {
        IrStatement::FunctionDeclaration { name, .. } | IrStatement::ClassDeclaration { name, .. } => Some(name.clone()),
        _ => None,
    }
}

fn decl_type_parameters(stmt: &IrStatement) -> &[String] {
    match stmt {
        IrStatement::FunctionDeclaration { type_parameters, .. } | IrStatement::ClassDeclaration { type_parameters, .. } => type_parameters,
        _ => &[],
    }
}

fn find_generic_declaration<'m>(module: &'m IrModule, base_name: &str) -> Option<&'m IrStatement> {
    module.body.iter().find(|stmt| decl_name(stmt).as_deref() == Some(base_name) && !decl_type_parameters(stmt).is_empty())
}

fn rename(stmt: IrStatement, new_name: &str) -> IrStatement {
    match stmt {
        IrStatement::FunctionDeclaration { parameters, body, return_type, is_generator, .. } => {
            IrStatement::FunctionDeclaration { name: new_name.to_string(), parameters, body, return_type, type_parameters: Vec::new(), is_generator }
        }
        IrStatement::ClassDeclaration { body, .. } => IrStatement::ClassDeclaration { name: new_name.to_string(), type_parameters: Vec::new(), body },
        other => other,
    }
}

fn decl_return_and_body_unresolved(stmt: &IrStatement, formal_names: &[String]) -> Option<String> {
    match stmt {
        IrStatement::FunctionDeclaration { parameters, return_type, .. } => parameters
            .iter()
            .find_map(|p| find_unsubstituted(&p.inferred_type, formal_names))
            .or_else(|| find_unsubstituted(return_type, formal_names)),
        _ => None,
    }
}

/// Depth-first collection of every generic call/`new` site, deduplicated
/// by `(baseName, serialized(typeArgs))` (`spec.md` §4.6 "Collection").
/// `IndexMap` keeps first-encounter order so repeated runs over
/// identical IR produce the same request order (INV-DETERMINISM).
fn collect_requests(module: &IrModule) -> IndexMap<String, Request> {
    let mut requests = IndexMap::new();
    for stmt in &module.body {
        collect_stmt(stmt, &mut requests);
    }
    requests
}

fn collect_stmt(stmt: &IrStatement, out: &mut IndexMap<String, Request>) {
    match stmt {
        IrStatement::VariableDeclaration { declarators, .. } => {
            for d in declarators {
                if let Some(e) = &d.initializer {
                    collect_expr(e, out);
                }
            }
        }
        IrStatement::FunctionDeclaration { body, .. } => collect_stmt(body, out),
        IrStatement::ClassDeclaration { body, .. } => {
            for s in body {
                collect_stmt(s, out);
            }
        }
        IrStatement::EnumDeclaration { members, .. } => {
            for (_, v) in members {
                if let Some(e) = v {
                    collect_expr(e, out);
                }
            }
        }
        IrStatement::ExpressionStatement { expression } => collect_expr(expression, out),
        IrStatement::ReturnStatement { argument } => {
            if let Some(e) = argument {
                collect_expr(e, out);
            }
        }
        IrStatement::IfStatement { test, consequent, alternate } => {
            collect_expr(test, out);
            collect_stmt(consequent, out);
            if let Some(a) = alternate {
                collect_stmt(a, out);
            }
        }
        IrStatement::WhileStatement { test, body } => {
            collect_expr(test, out);
            collect_stmt(body, out);
        }
        IrStatement::ForStatement { init, test, update, body } => {
            if let Some(i) = init {
                collect_stmt(i, out);
            }
            if let Some(t) = test {
                collect_expr(t, out);
            }
            if let Some(u) = update {
                collect_expr(u, out);
            }
            collect_stmt(body, out);
        }
        IrStatement::ForOfStatement { right, body, .. } => {
            collect_expr(right, out);
            collect_stmt(body, out);
        }
        IrStatement::SwitchStatement { discriminant, cases } => {
            collect_expr(discriminant, out);
            for c in cases {
                if let Some(t) = &c.test {
                    collect_expr(t, out);
                }
                for s in &c.consequent {
                    collect_stmt(s, out);
                }
            }
        }
        IrStatement::ThrowStatement { argument } => collect_expr(argument, out),
        IrStatement::TryStatement { block, handler, finalizer } => {
            collect_stmt(block, out);
            if let Some(h) = handler {
                collect_stmt(&h.body, out);
            }
            if let Some(f) = finalizer {
                collect_stmt(f, out);
            }
        }
        IrStatement::BlockStatement { body } => {
            for s in body {
                collect_stmt(s, out);
            }
        }
        IrStatement::InterfaceDeclaration { .. } | IrStatement::TypeAliasDeclaration { .. } | IrStatement::Break { .. } | IrStatement::Continue { .. } => {}
    }
}

fn collect_expr(expr: &IrExpression, out: &mut IndexMap<String, Request>) {
    match &expr.kind {
        IrExpressionKind::Call { callee, arguments, type_arguments, requires_specialization } | IrExpressionKind::New { callee, arguments, type_arguments, requires_specialization } => {
            if *requires_specialization && !type_arguments.is_empty() {
                if let IrExpressionKind::Identifier { name, .. } = &callee.kind {
                    let type_arguments: Vec<IrType> = type_arguments.iter().cloned().collect();
                    let key = request_key(name, &type_arguments);
                    trace!(base = %name, key = %key, "collected specialization request");
                    out.entry(key).or_insert(Request { base_name: name.clone(), type_arguments });
                }
            }
            collect_expr(callee, out);
            for a in arguments {
                collect_expr(a, out);
            }
        }
        IrExpressionKind::MemberAccess { object, .. } => collect_expr(object, out),
        IrExpressionKind::Binary { left, right, .. } | IrExpressionKind::Logical { left, right, .. } => {
            collect_expr(left, out);
            collect_expr(right, out);
        }
        IrExpressionKind::Unary { operand, .. } | IrExpressionKind::Update { operand, .. } | IrExpressionKind::Spread { argument: operand } | IrExpressionKind::Await { argument: operand } => {
            collect_expr(operand, out);
        }
        IrExpressionKind::Assignment { target, value } => {
            collect_expr(target, out);
            collect_expr(value, out);
        }
        IrExpressionKind::Conditional { test, consequent, alternate } => {
            collect_expr(test, out);
            collect_expr(consequent, out);
            collect_expr(alternate, out);
        }
        IrExpressionKind::TemplateLiteral { expressions, .. } => {
            for e in expressions {
                collect_expr(e, out);
            }
        }
        IrExpressionKind::ArrowFunction { body, .. } | IrExpressionKind::FunctionExpression { body, .. } => collect_stmt(body, out),
        IrExpressionKind::Array { elements } => {
            for e in elements {
                collect_expr(e, out);
            }
        }
        IrExpressionKind::Object { properties } => {
            for p in properties {
                collect_expr(&p.value, out);
            }
        }
        IrExpressionKind::Yield { argument, .. } => {
            if let Some(a) = argument {
                collect_expr(a, out);
            }
        }
        IrExpressionKind::Literal(_) | IrExpressionKind::Identifier { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;
    use tsonic_catalog::{StableId, TypeId};
    use tsonic_ir::expr::Parameter;

    fn primitive(name: &str) -> IrType {
        IrType::Primitive { type_id: TypeId::new(StableId::source(name), name, name), numeric_intent: None }
    }

    fn identity_module() -> IrModule {
        let mut module = IrModule::new("identity.ts", "Demo", "Identity");
        module.body.push(IrStatement::FunctionDeclaration {
            name: "identity".to_string(),
            parameters: vec![Parameter { name: "x".to_string(), inferred_type: IrType::TypeParameter { name: "T".to_string() }, optional: false, rest: false }],
            body: Box::new(IrStatement::BlockStatement {
                body: vec![IrStatement::ReturnStatement {
                    argument: Some(IrExpression::new(IrExpressionKind::Identifier {
                        name: "x".to_string(),
                        resolved_clr_type: None,
                        resolved_assembly: None,
                        resolved_clr_value: None,
                    })),
                }],
            }),
            return_type: IrType::TypeParameter { name: "T".to_string() },
            type_parameters: vec!["T".to_string()],
            is_generator: false,
        });

        for (label, ty) in [("int", primitive("int")), ("string", primitive("string"))] {
            module.body.push(IrStatement::ExpressionStatement {
                expression: IrExpression::new(IrExpressionKind::Call {
                    callee: Box::new(IrExpression::new(IrExpressionKind::Identifier {
                        name: "identity".to_string(),
                        resolved_clr_type: None,
                        resolved_assembly: None,
                        resolved_clr_value: None,
                    })),
                    arguments: vec![IrExpression::new(IrExpressionKind::Literal(tsonic_ir::expr::Literal::Numeric(label.to_string())))],
                    type_arguments: smallvec![ty],
                    requires_specialization: true,
                }),
            });
        }
        module
    }

    #[test]
    fn two_calls_to_a_generic_produce_two_distinct_specializations() {
        let mut module = identity_module();
        let mut diagnostics = DiagnosticsCollector::new();
        Specializer::new(&mut diagnostics, "identity.ts").specialize_module(&mut module);

        assert!(!diagnostics.has_errors());
        let names: Vec<String> = module.body.iter().filter_map(decl_name).collect();
        assert!(names.contains(&"identity__int".to_string()));
        assert!(names.contains(&"identity__string".to_string()));
        assert!(names.contains(&"identity".to_string()), "the original generic declaration must remain for signature lookup");
    }

    #[test]
    fn specializing_an_already_specialized_module_is_a_fixed_point() {
        let mut module = identity_module();
        let mut diagnostics = DiagnosticsCollector::new();
        Specializer::new(&mut diagnostics, "identity.ts").specialize_module(&mut module);
        let first_pass_len = module.body.len();

        Specializer::new(&mut diagnostics, "identity.ts").specialize_module(&mut module);
        assert_eq!(module.body.len(), first_pass_len);
    }

    #[test]
    fn arity_mismatch_is_diagnosed() {
        let mut module = identity_module();
        if let IrStatement::ExpressionStatement { expression } = &mut module.body[1] {
            if let IrExpressionKind::Call { type_arguments, .. } = &mut expression.kind {
                type_arguments.push(primitive("string"));
            }
        }
        let mut diagnostics = DiagnosticsCollector::new();
        Specializer::new(&mut diagnostics, "identity.ts").specialize_module(&mut module);
        assert!(diagnostics.has_errors());
    }
}
