use rustc_hash::FxHashSet;
use tracing::debug;

use tsonic_ast::{AstNode, NodeId};
use tsonic_binder::HandleRegistry;
use tsonic_common::diagnostics::TSN;
use tsonic_common::{Diagnostic, DiagnosticsCollector};

/// Closed set of utility type names rejected as generic arguments
/// (`spec.md` §4.5); `Record` is handled separately since it is allowed
/// when its key type is `string`.
const DISALLOWED_UTILITY_TYPES: &[&str] = &[
    "Partial",
    "Required",
    "Readonly",
    "Pick",
    "Omit",
    "Extract",
    "Exclude",
    "NonNullable",
    "ReturnType",
    "Parameters",
    "ConstructorParameters",
    "InstanceType",
    "Awaited",
];

const PROMISE_CHAIN_METHODS: &[&str] = &["then", "catch", "finally"];

pub struct Validator<'a> {
    registry: &'a HandleRegistry<'a>,
    diagnostics: &'a mut DiagnosticsCollector,
    file: String,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a HandleRegistry<'a>, diagnostics: &'a mut DiagnosticsCollector, file: impl Into<String>) -> Self {
        Self { registry, diagnostics, file: file.into() }
    }

    pub fn validate_module(&mut self, source_file: NodeId) {
        let AstNode::SourceFile { body, .. } = self.registry.get(source_file) else {
            tsonic_common::ice!("validator", "validate_module called on a non-SourceFile node");
        };
        let body = body.clone();

        self.check_duplicate_named_exports(&body);
        for &stmt in &body {
            self.walk_statement(stmt);
        }
    }

    fn check_duplicate_named_exports(&mut self, body: &[NodeId]) {
        let mut seen = FxHashSet::default();
        for &id in body {
            if let AstNode::ExportDeclaration { names } = self.registry.get(id) {
                for name in names {
                    if !seen.insert(name.clone()) {
                        self.diagnostics.push(Diagnostic::new(TSN::DUPLICATE_NAMED_EXPORT, self.file.clone(), 0, 0, &[name.as_str()]));
                    }
                }
            }
        }
    }

    fn walk_statement(&mut self, id: NodeId) {
        match self.registry.get(id).clone() {
            AstNode::ImportDeclaration { default_import: Some(name), specifier, .. } => {
                if !specifier.starts_with('.') {
                    // Only a local (relative) specifier triggers the
                    // warning; foreign/core imports are unaffected.
                    return;
                }
                debug!(%name, "default import from a local module");
                self.diagnostics.push(Diagnostic::new(TSN::DEFAULT_IMPORT_FROM_LOCAL, self.file.clone(), 0, 0, &[name.as_str()]));
            }
            AstNode::VariableDeclaration { declared_type, initializer, .. } => {
                if let Some(t) = declared_type {
                    self.walk_type_syntax(t);
                }
                if let Some(e) = initializer {
                    self.walk_expression(e);
                }
            }
            AstNode::FunctionDeclaration { parameters, return_type, body, .. } => {
                self.walk_parameters(&parameters);
                if let Some(t) = return_type {
                    self.walk_type_syntax(t);
                }
                if let Some(stmts) = body {
                    for s in stmts {
                        self.walk_statement(s);
                    }
                }
            }
            AstNode::ClassDeclaration { heritage, implements, members, .. } => {
                for h in heritage.iter().chain(implements.iter()) {
                    self.walk_type_syntax(*h);
                }
                for m in &members {
                    self.walk_parameters(&m.parameters);
                    if let Some(t) = m.type_syntax {
                        self.walk_type_syntax(t);
                    }
                    if let Some(t) = m.return_type {
                        self.walk_type_syntax(t);
                    }
                    if let Some(stmts) = &m.body {
                        for s in stmts {
                            self.walk_statement(*s);
                        }
                    }
                    if let Some(init) = m.initializer {
                        self.walk_expression(init);
                    }
                }
            }
            AstNode::InterfaceDeclaration { heritage, members, .. } => {
                for h in &heritage {
                    self.walk_type_syntax(*h);
                }
                for m in &members {
                    if let Some(t) = m.type_syntax {
                        self.walk_type_syntax(t);
                    }
                }
            }
            AstNode::TypeAliasDeclaration { aliased_type, .. } => self.walk_type_syntax(aliased_type),
            AstNode::Block { statements } => {
                for s in statements {
                    self.walk_statement(s);
                }
            }
            AstNode::ExpressionStatement { expression } => self.walk_expression(expression),
            AstNode::ReturnStatement { expression: Some(e) } => self.walk_expression(e),
            AstNode::IfStatement { condition, then_branch, else_branch } => {
                self.walk_expression(condition);
                self.walk_statement(then_branch);
                if let Some(e) = else_branch {
                    self.walk_statement(e);
                }
            }
            AstNode::WhileStatement { condition, body } => {
                self.walk_expression(condition);
                self.walk_statement(body);
            }
            AstNode::ForStatement { initializer, condition, incrementor, body } => {
                if let Some(i) = initializer {
                    self.walk_statement(i);
                }
                if let Some(c) = condition {
                    self.walk_expression(c);
                }
                if let Some(u) = incrementor {
                    self.walk_expression(u);
                }
                self.walk_statement(body);
            }
            AstNode::ForOfStatement { iterable, body, .. } => {
                self.walk_expression(iterable);
                self.walk_statement(body);
            }
            AstNode::SwitchStatement { discriminant, cases } => {
                self.walk_expression(discriminant);
                for (test, consequent) in cases {
                    if let Some(t) = test {
                        self.walk_expression(t);
                    }
                    for s in consequent {
                        self.walk_statement(s);
                    }
                }
            }
            AstNode::ThrowStatement { expression } => self.walk_expression(expression),
            AstNode::TryStatement { try_block, catch_block, finally_block, .. } => {
                self.walk_statement(try_block);
                if let Some(c) = catch_block {
                    self.walk_statement(c);
                }
                if let Some(f) = finally_block {
                    self.walk_statement(f);
                }
            }
            _ => {}
        }
    }

    fn walk_parameters(&mut self, parameters: &[tsonic_ast::node::Parameter]) {
        for p in parameters {
            if let Some(t) = p.type_syntax {
                self.walk_type_syntax(t);
            }
        }
    }

    fn walk_expression(&mut self, id: NodeId) {
        match self.registry.get(id).clone() {
            AstNode::MemberAccessExpression { object, property, .. } if self.dotted_root_is_import(object) && property == "meta" => {
                self.diagnostics.push(Diagnostic::new(TSN::IMPORT_META, self.file.clone(), 0, 0, &[]));
            }
            AstNode::MemberAccessExpression { object, .. } => self.walk_expression(object),
            AstNode::CallExpression { callee, arguments, type_arguments, .. } => {
                if self.is_dynamic_import(callee) {
                    self.diagnostics.push(Diagnostic::new(TSN::DYNAMIC_IMPORT, self.file.clone(), 0, 0, &[]));
                } else if let AstNode::MemberAccessExpression { property, .. } = self.registry.get(callee) {
                    if PROMISE_CHAIN_METHODS.contains(&property.as_str()) {
                        self.diagnostics.push(Diagnostic::new(TSN::PROMISE_CHAIN_METHOD, self.file.clone(), 0, 0, &[property]));
                    }
                }
                self.walk_expression(callee);
                for a in arguments {
                    self.walk_expression(a);
                }
                for t in type_arguments {
                    self.walk_type_syntax(t);
                }
            }
            AstNode::NewExpression { callee, arguments, type_arguments } => {
                self.walk_expression(callee);
                for a in arguments {
                    self.walk_expression(a);
                }
                for t in type_arguments {
                    self.walk_type_syntax(t);
                }
            }
            AstNode::BinaryExpression { left, right, .. } | AstNode::LogicalExpression { left, right, .. } => {
                self.walk_expression(left);
                self.walk_expression(right);
            }
            AstNode::UnaryExpression { operand, .. } | AstNode::UpdateExpression { operand, .. } | AstNode::SpreadElement { expression: operand } | AstNode::AwaitExpression { expression: operand } => {
                self.walk_expression(operand);
            }
            AstNode::AssignmentExpression { target, value, .. } => {
                self.walk_expression(target);
                self.walk_expression(value);
            }
            AstNode::ConditionalExpression { condition, when_true, when_false } => {
                self.walk_expression(condition);
                self.walk_expression(when_true);
                self.walk_expression(when_false);
            }
            AstNode::ArrayLiteral { elements } => {
                for e in elements {
                    self.walk_expression(e);
                }
            }
            AstNode::ObjectLiteral { properties } => {
                for (_, value) in properties {
                    self.walk_expression(value);
                }
            }
            AstNode::TemplateLiteral { expressions, .. } => {
                for e in expressions {
                    self.walk_expression(e);
                }
            }
            AstNode::ArrowFunctionExpression { parameters, return_type, body, .. } => {
                self.walk_parameters(&parameters);
                if let Some(t) = return_type {
                    self.walk_type_syntax(t);
                }
                self.walk_expression(body);
            }
            AstNode::FunctionExpression { parameters, return_type, body, .. } => {
                self.walk_parameters(&parameters);
                if let Some(t) = return_type {
                    self.walk_type_syntax(t);
                }
                self.walk_statement(body);
            }
            AstNode::YieldExpression { expression: Some(e), .. } => self.walk_expression(e),
            _ => {}
        }
    }

    /// Convention used by the (out-of-scope) parser adapter to encode a
    /// dynamic `import()` call: a `CallExpression` whose callee is the
    /// bare identifier `import`, since there is no dedicated expression
    /// kind for it in this neutral AST.
    fn is_dynamic_import(&self, callee: NodeId) -> bool {
        matches!(self.registry.get(callee), AstNode::Identifier { name } if name == "import")
    }

    fn dotted_root_is_import(&self, id: NodeId) -> bool {
        matches!(self.registry.get(id), AstNode::Identifier { name } if name == "import")
    }

    fn walk_type_syntax(&mut self, id: NodeId) {
        match self.registry.get(id).clone() {
            AstNode::TypeReference { name, type_arguments } => {
                if name == "this" {
                    self.diagnostics.push(Diagnostic::new(TSN::THIS_AS_TYPE_NAME, self.file.clone(), 0, 0, &[]));
                } else if name == "Record" {
                    let key_is_string = type_arguments.first().is_some_and(|t| matches!(self.registry.get(*t), AstNode::PrimitiveTypeReference { name } if name == "string"));
                    if !key_is_string {
                        self.diagnostics.push(Diagnostic::new(TSN::RECORD_WITH_NON_STRING_KEY, self.file.clone(), 0, 0, &[]));
                    }
                } else if !type_arguments.is_empty() && DISALLOWED_UTILITY_TYPES.contains(&name.as_str()) {
                    self.diagnostics.push(Diagnostic::new(TSN::DISALLOWED_UTILITY_TYPE, self.file.clone(), 0, 0, &[name.as_str()]));
                }
                for t in type_arguments {
                    self.walk_type_syntax(t);
                }
            }
            AstNode::ArrayTypeSyntax { element } => self.walk_type_syntax(element),
            AstNode::TupleTypeSyntax { elements } => {
                for e in elements {
                    self.walk_type_syntax(e);
                }
            }
            AstNode::FunctionTypeSyntax { parameters, return_type } => {
                self.walk_parameters(&parameters);
                self.walk_type_syntax(return_type);
            }
            AstNode::ObjectTypeSyntax { members, index_signature_value } => {
                for m in &members {
                    if let Some(t) = m.type_syntax {
                        self.walk_type_syntax(t);
                    }
                }
                if let Some(v) = index_signature_value {
                    self.walk_type_syntax(v);
                } else if members.is_empty() {
                    self.diagnostics.push(Diagnostic::new(TSN::UNSPECIFIED_DICTIONARY_VALUE_TYPE, self.file.clone(), 0, 0, &[]));
                }
            }
            AstNode::UnionTypeSyntax { members } | AstNode::IntersectionTypeSyntax { members } => {
                for m in members {
                    self.walk_type_syntax(m);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsonic_common::Span;

    fn source_file(arena: &mut AstArena, body: Vec<NodeId>) -> NodeId {
        arena.alloc(AstNode::SourceFile { file_path: "a.ts".to_string(), body: body.into() }, Span::dummy())
    }

    #[test]
    fn rejects_a_promise_chain_method_call() {
        let mut arena = AstArena::new();
        let receiver = arena.alloc(AstNode::Identifier { name: "p".to_string() }, Span::dummy());
        let access = arena.alloc(AstNode::MemberAccessExpression { object: receiver, property: "then".to_string(), optional: false }, Span::dummy());
        let call = arena.alloc(AstNode::CallExpression { callee: access, type_arguments: vec![], arguments: Default::default() }, Span::dummy());
        let stmt = arena.alloc(AstNode::ExpressionStatement { expression: call }, Span::dummy());
        let sf = source_file(&mut arena, vec![stmt]);

        let registry = HandleRegistry::new(&arena);
        let mut diagnostics = DiagnosticsCollector::new();
        Validator::new(&registry, &mut diagnostics, "a.ts").validate_module(sf);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn rejects_disallowed_utility_types_but_allows_record_with_string_key() {
        let mut arena = AstArena::new();
        let string_ty = arena.alloc(AstNode::PrimitiveTypeReference { name: "string".to_string() }, Span::dummy());
        let record_ty = arena.alloc(AstNode::TypeReference { name: "Record".to_string(), type_arguments: vec![string_ty] }, Span::dummy());
        let partial_ty = arena.alloc(AstNode::TypeReference { name: "Partial".to_string(), type_arguments: vec![string_ty] }, Span::dummy());
        let decl1 = arena.alloc(AstNode::VariableDeclaration { name: "a".to_string(), declared_type: Some(record_ty), initializer: None, is_const: true }, Span::dummy());
        let decl2 = arena.alloc(AstNode::VariableDeclaration { name: "b".to_string(), declared_type: Some(partial_ty), initializer: None, is_const: true }, Span::dummy());
        let sf = source_file(&mut arena, vec![decl1, decl2]);

        let registry = HandleRegistry::new(&arena);
        let mut diagnostics = DiagnosticsCollector::new();
        Validator::new(&registry, &mut diagnostics, "a.ts").validate_module(sf);
        let sorted = diagnostics.into_sorted();
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].code, TSN::DISALLOWED_UTILITY_TYPE);
    }

    #[test]
    fn rejects_duplicate_named_exports() {
        let mut arena = AstArena::new();
        let export1 = arena.alloc(AstNode::ExportDeclaration { names: vec!["widget".to_string()] }, Span::dummy());
        let export2 = arena.alloc(AstNode::ExportDeclaration { names: vec!["widget".to_string()] }, Span::dummy());
        let sf = source_file(&mut arena, vec![export1, export2]);

        let registry = HandleRegistry::new(&arena);
        let mut diagnostics = DiagnosticsCollector::new();
        Validator::new(&registry, &mut diagnostics, "a.ts").validate_module(sf);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn default_import_from_a_local_module_is_a_warning_not_an_error() {
        let mut arena = AstArena::new();
        let import = arena.alloc(
            AstNode::ImportDeclaration { specifier: "./widget".to_string(), elements: vec![], default_import: Some("Widget".to_string()), is_type_only: false },
            Span::dummy(),
        );
        let sf = source_file(&mut arena, vec![import]);

        let registry = HandleRegistry::new(&arena);
        let mut diagnostics = DiagnosticsCollector::new();
        Validator::new(&registry, &mut diagnostics, "a.ts").validate_module(sf);
        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn rejects_dynamic_import_and_import_meta() {
        let mut arena = AstArena::new();
        let import_ident = arena.alloc(AstNode::Identifier { name: "import".to_string() }, Span::dummy());
        let call = arena.alloc(AstNode::CallExpression { callee: import_ident, type_arguments: vec![], arguments: Default::default() }, Span::dummy());
        let stmt1 = arena.alloc(AstNode::ExpressionStatement { expression: call }, Span::dummy());

        let import_ident2 = arena.alloc(AstNode::Identifier { name: "import".to_string() }, Span::dummy());
        let meta = arena.alloc(AstNode::MemberAccessExpression { object: import_ident2, property: "meta".to_string(), optional: false }, Span::dummy());
        let stmt2 = arena.alloc(AstNode::ExpressionStatement { expression: meta }, Span::dummy());

        let sf = source_file(&mut arena, vec![stmt1, stmt2]);
        let registry = HandleRegistry::new(&arena);
        let mut diagnostics = DiagnosticsCollector::new();
        Validator::new(&registry, &mut diagnostics, "a.ts").validate_module(sf);
        let sorted = diagnostics.into_sorted();
        assert_eq!(sorted.len(), 2);
    }
}
