//! Recursive IR rewrite that replaces every `TypeParameter` matching a
//! formal with its concrete substitution (`spec.md` §4.6 "Substitution").
//!
//! A nested reference such as `Container<Container<int>>` is handled by
//! ordinary recursion: the outer node is matched and rebuilt first, and
//! its type arguments are substituted afterwards, so the outer formal
//! is always resolved before any nested one.

use rustc_hash::FxHashMap;

use tsonic_ir::expr::{IrExpressionKind, ObjectProperty, Parameter};
use tsonic_ir::stmt::{CatchClause, SwitchCase, VariableDeclarator};
use tsonic_ir::{IrExpression, IrStatement, IrType};

pub type Formals = FxHashMap<String, IrType>;

pub fn substitute_type(ty: &IrType, formals: &Formals) -> IrType {
    match ty {
        IrType::TypeParameter { name } => formals.get(name).cloned().unwrap_or_else(|| ty.clone()),
        IrType::Primitive { .. } | IrType::Literal { .. } | IrType::Any | IrType::Unknown | IrType::Void | IrType::Never => ty.clone(),
        IrType::Reference { type_id, type_arguments } => IrType::Reference {
            type_id: type_id.clone(),
            type_arguments: type_arguments.iter().map(|t| substitute_type(t, formals)).collect(),
        },
        IrType::Array { element } => IrType::Array { element: Box::new(substitute_type(element, formals)) },
        IrType::Tuple { elements } => IrType::Tuple { elements: elements.iter().map(|t| substitute_type(t, formals)).collect() },
        IrType::Function { parameters, return_type } => IrType::Function {
            parameters: parameters.iter().map(|t| substitute_type(t, formals)).collect(),
            return_type: Box::new(substitute_type(return_type, formals)),
        },
        IrType::Object { members } => {
            IrType::Object { members: members.iter().map(|(name, t)| (name.clone(), substitute_type(t, formals))).collect() }
        }
        IrType::Dictionary { value } => IrType::Dictionary { value: value.as_ref().map(|v| Box::new(substitute_type(v, formals))) },
        IrType::Union { members } => IrType::Union { members: members.iter().map(|t| substitute_type(t, formals)).collect() },
        IrType::Intersection { members } => IrType::Intersection { members: members.iter().map(|t| substitute_type(t, formals)).collect() },
    }
}

fn substitute_opt_type(ty: &Option<IrType>, formals: &Formals) -> Option<IrType> {
    ty.as_ref().map(|t| substitute_type(t, formals))
}

pub fn substitute_expr(expr: &IrExpression, formals: &Formals) -> IrExpression {
    let kind = match &expr.kind {
        IrExpressionKind::Literal(lit) => IrExpressionKind::Literal(lit.clone()),
        IrExpressionKind::Identifier { name, resolved_clr_type, resolved_assembly, resolved_clr_value } => {
            IrExpressionKind::Identifier {
                name: name.clone(),
                resolved_clr_type: resolved_clr_type.clone(),
                resolved_assembly: resolved_assembly.clone(),
                resolved_clr_value: resolved_clr_value.clone(),
            }
        }
        IrExpressionKind::MemberAccess { object, property, member_binding } => IrExpressionKind::MemberAccess {
            object: Box::new(substitute_expr(object, formals)),
            property: property.clone(),
            member_binding: member_binding.clone(),
        },
        IrExpressionKind::Call { callee, arguments, type_arguments, requires_specialization } => IrExpressionKind::Call {
            callee: Box::new(substitute_expr(callee, formals)),
            arguments: arguments.iter().map(|a| substitute_expr(a, formals)).collect(),
            type_arguments: type_arguments.iter().map(|t| substitute_type(t, formals)).collect(),
            requires_specialization: *requires_specialization,
        },
        IrExpressionKind::New { callee, arguments, type_arguments, requires_specialization } => IrExpressionKind::New {
            callee: Box::new(substitute_expr(callee, formals)),
            arguments: arguments.iter().map(|a| substitute_expr(a, formals)).collect(),
            type_arguments: type_arguments.iter().map(|t| substitute_type(t, formals)).collect(),
            requires_specialization: *requires_specialization,
        },
        IrExpressionKind::Binary { operator, left, right } => IrExpressionKind::Binary {
            operator: *operator,
            left: Box::new(substitute_expr(left, formals)),
            right: Box::new(substitute_expr(right, formals)),
        },
        IrExpressionKind::Logical { operator, left, right } => IrExpressionKind::Logical {
            operator: *operator,
            left: Box::new(substitute_expr(left, formals)),
            right: Box::new(substitute_expr(right, formals)),
        },
        IrExpressionKind::Unary { operator, operand } => {
            IrExpressionKind::Unary { operator: *operator, operand: Box::new(substitute_expr(operand, formals)) }
        }
        IrExpressionKind::Update { operator, operand, prefix } => {
            IrExpressionKind::Update { operator: *operator, operand: Box::new(substitute_expr(operand, formals)), prefix: *prefix }
        }
        IrExpressionKind::Assignment { target, value } => IrExpressionKind::Assignment {
            target: Box::new(substitute_expr(target, formals)),
            value: Box::new(substitute_expr(value, formals)),
        },
        IrExpressionKind::Conditional { test, consequent, alternate } => IrExpressionKind::Conditional {
            test: Box::new(substitute_expr(test, formals)),
            consequent: Box::new(substitute_expr(consequent, formals)),
            alternate: Box::new(substitute_expr(alternate, formals)),
        },
        IrExpressionKind::TemplateLiteral { quasis, expressions } => IrExpressionKind::TemplateLiteral {
            quasis: quasis.clone(),
            expressions: expressions.iter().map(|e| substitute_expr(e, formals)).collect(),
        },
        IrExpressionKind::ArrowFunction { parameters, body, return_type } => IrExpressionKind::ArrowFunction {
            parameters: parameters
                .iter()
                .map(|p| Parameter {
                    name: p.name.clone(),
                    inferred_type: substitute_type(&p.inferred_type, formals),
                    optional: p.optional,
                    rest: p.rest,
                })
                .collect(),
            body: Box::new(substitute_stmt(body, formals)),
            return_type: substitute_opt_type(return_type, formals),
        },
        IrExpressionKind::FunctionExpression { name, parameters, body, return_type, is_generator } => IrExpressionKind::FunctionExpression {
            name: name.clone(),
            parameters: parameters
                .iter()
                .map(|p| Parameter {
                    name: p.name.clone(),
                    inferred_type: substitute_type(&p.inferred_type, formals),
                    optional: p.optional,
                    rest: p.rest,
                })
                .collect(),
            body: Box::new(substitute_stmt(body, formals)),
            return_type: substitute_opt_type(return_type, formals),
            is_generator: *is_generator,
        },
        IrExpressionKind::Array { elements } => IrExpressionKind::Array { elements: elements.iter().map(|e| substitute_expr(e, formals)).collect() },
        IrExpressionKind::Object { properties } => IrExpressionKind::Object {
            properties: properties
                .iter()
                .map(|p| ObjectProperty { key: p.key.clone(), value: substitute_expr(&p.value, formals) })
                .collect(),
        },
        IrExpressionKind::Spread { argument } => IrExpressionKind::Spread { argument: Box::new(substitute_expr(argument, formals)) },
        IrExpressionKind::Await { argument } => IrExpressionKind::Await { argument: Box::new(substitute_expr(argument, formals)) },
        IrExpressionKind::Yield { argument, delegate, resumed_type } => IrExpressionKind::Yield {
            argument: argument.as_ref().map(|a| Box::new(substitute_expr(a, formals))),
            delegate: *delegate,
            resumed_type: substitute_type(resumed_type, formals),
        },
    };
    IrExpression { kind, inferred_type: substitute_opt_type(&expr.inferred_type, formals) }
}

pub fn substitute_stmt(stmt: &IrStatement, formals: &Formals) -> IrStatement {
    match stmt {
        IrStatement::VariableDeclaration { declarators, is_const } => IrStatement::VariableDeclaration {
            declarators: declarators
                .iter()
                .map(|d| VariableDeclarator {
                    name: d.name.clone(),
                    declared_type: substitute_opt_type(&d.declared_type, formals),
                    initializer: d.initializer.as_ref().map(|i| substitute_expr(i, formals)),
                })
                .collect(),
            is_const: *is_const,
        },
        // Nested generic declarations are specialized independently by
        // their own collection pass; only the type parameters they do
        // not shadow are substituted here.
        IrStatement::FunctionDeclaration { name, parameters, body, return_type, type_parameters, is_generator } => {
            let shadowed: Formals = formals.iter().filter(|(k, _)| !type_parameters.contains(k)).map(|(k, v)| (k.clone(), v.clone())).collect();
            IrStatement::FunctionDeclaration {
                name: name.clone(),
                parameters: parameters
                    .iter()
                    .map(|p| Parameter {
                        name: p.name.clone(),
                        inferred_type: substitute_type(&p.inferred_type, &shadowed),
                        optional: p.optional,
                        rest: p.rest,
                    })
                    .collect(),
                body: Box::new(substitute_stmt(body, &shadowed)),
                return_type: substitute_type(return_type, &shadowed),
                type_parameters: type_parameters.clone(),
                is_generator: *is_generator,
            }
        }
        IrStatement::ClassDeclaration { name, type_parameters, body } => {
            let shadowed: Formals = formals.iter().filter(|(k, _)| !type_parameters.contains(k)).map(|(k, v)| (k.clone(), v.clone())).collect();
            IrStatement::ClassDeclaration { name: name.clone(), type_parameters: type_parameters.clone(), body: body.iter().map(|s| substitute_stmt(s, &shadowed)).collect() }
        }
        IrStatement::InterfaceDeclaration { name, type_parameters } => {
            IrStatement::InterfaceDeclaration { name: name.clone(), type_parameters: type_parameters.clone() }
        }
        IrStatement::EnumDeclaration { name, members } => IrStatement::EnumDeclaration {
            name: name.clone(),
            members: members.iter().map(|(n, v)| (n.clone(), v.as_ref().map(|e| substitute_expr(e, formals)))).collect(),
        },
        IrStatement::TypeAliasDeclaration { name, aliased } => {
            IrStatement::TypeAliasDeclaration { name: name.clone(), aliased: substitute_type(aliased, formals) }
        }
        IrStatement::ExpressionStatement { expression } => IrStatement::ExpressionStatement { expression: substitute_expr(expression, formals) },
        IrStatement::ReturnStatement { argument } => IrStatement::ReturnStatement { argument: argument.as_ref().map(|e| substitute_expr(e, formals)) },
        IrStatement::IfStatement { test, consequent, alternate } => IrStatement::IfStatement {
            test: substitute_expr(test, formals),
            consequent: Box::new(substitute_stmt(consequent, formals)),
            alternate: alternate.as_ref().map(|s| Box::new(substitute_stmt(s, formals))),
        },
        IrStatement::WhileStatement { test, body } => {
            IrStatement::WhileStatement { test: substitute_expr(test, formals), body: Box::new(substitute_stmt(body, formals)) }
        }
        IrStatement::ForStatement { init, test, update, body } => IrStatement::ForStatement {
            init: init.as_ref().map(|s| Box::new(substitute_stmt(s, formals))),
            test: test.as_ref().map(|e| substitute_expr(e, formals)),
            update: update.as_ref().map(|e| substitute_expr(e, formals)),
            body: Box::new(substitute_stmt(body, formals)),
        },
        IrStatement::ForOfStatement { declared_name, declared_type, right, body } => IrStatement::ForOfStatement {
            declared_name: declared_name.clone(),
            declared_type: substitute_opt_type(declared_type, formals),
            right: substitute_expr(right, formals),
            body: Box::new(substitute_stmt(body, formals)),
        },
        IrStatement::SwitchStatement { discriminant, cases } => IrStatement::SwitchStatement {
            discriminant: substitute_expr(discriminant, formals),
            cases: cases
                .iter()
                .map(|c| SwitchCase {
                    test: c.test.as_ref().map(|e| substitute_expr(e, formals)),
                    consequent: c.consequent.iter().map(|s| substitute_stmt(s, formals)).collect(),
                })
                .collect(),
        },
        IrStatement::ThrowStatement { argument } => IrStatement::ThrowStatement { argument: substitute_expr(argument, formals) },
        IrStatement::TryStatement { block, handler, finalizer } => IrStatement::TryStatement {
            block: Box::new(substitute_stmt(block, formals)),
            handler: handler.as_ref().map(|h| CatchClause {
                parameter_name: h.parameter_name.clone(),
                body: Box::new(substitute_stmt(&h.body, formals)),
            }),
            finalizer: finalizer.as_ref().map(|s| Box::new(substitute_stmt(s, formals))),
        },
        IrStatement::BlockStatement { body } => IrStatement::BlockStatement { body: body.iter().map(|s| substitute_stmt(s, formals)).collect() },
        IrStatement::Break { label } => IrStatement::Break { label: label.clone() },
        IrStatement::Continue { label } => IrStatement::Continue { label: label.clone() },
    }
}

/// Returns the first formal name from `formal_names` that still appears
/// as a bare `TypeParameter` anywhere in `ty` after substitution — a
/// witness that substitution did not fully resolve the declaration
/// (`spec.md` §4.6 "Failure").
pub fn find_unsubstituted(ty: &IrType, formal_names: &[String]) -> Option<String> {
    match ty {
        IrType::TypeParameter { name } if formal_names.contains(name) => Some(name.clone()),
        IrType::TypeParameter { .. } | IrType::Primitive { .. } | IrType::Literal { .. } | IrType::Any | IrType::Unknown | IrType::Void | IrType::Never => None,
        IrType::Reference { type_arguments, .. } => type_arguments.iter().find_map(|t| find_unsubstituted(t, formal_names)),
        IrType::Array { element } => find_unsubstituted(element, formal_names),
        IrType::Tuple { elements } => elements.iter().find_map(|t| find_unsubstituted(t, formal_names)),
        IrType::Function { parameters, return_type } => {
            parameters.iter().find_map(|t| find_unsubstituted(t, formal_names)).or_else(|| find_unsubstituted(return_type, formal_names))
        }
        IrType::Object { members } => members.iter().find_map(|(_, t)| find_unsubstituted(t, formal_names)),
        IrType::Dictionary { value } => value.as_ref().and_then(|v| find_unsubstituted(v, formal_names)),
        IrType::Union { members } | IrType::Intersection { members } => members.iter().find_map(|t| find_unsubstituted(t, formal_names)),
    }
}
