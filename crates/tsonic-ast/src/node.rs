//! Arena-indexed AST nodes.
//!
//! Nodes reference each other by `NodeId` rather than by owned pointer so
//! that the arena can be built incrementally by an external adapter and
//! so that `NodeId` can serve as the seed the binder hashes into
//! `DeclId`/`SignatureId`/`MemberId`/`TypeSyntaxId` (`spec.md` §3
//! "Handles").

use smallvec::SmallVec;
use tsonic_common::Span;

use crate::kind::SyntaxKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

pub type NodeList = SmallVec<[NodeId; 4]>;

#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: String,
    pub type_syntax: Option<NodeId>,
    pub optional: bool,
    pub rest: bool,
    /// Passing mode syntax: plain, `ref<T>`, `out<T>`, `in<T>`.
    pub passing_mode: PassingMode,
    pub default_value: Option<NodeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassingMode {
    Value,
    Ref,
    Out,
    In,
}

#[derive(Clone, Debug)]
pub struct TypeParameterSyntax {
    pub name: String,
    pub constraint: Option<NodeId>,
    pub default: Option<NodeId>,
}

#[derive(Clone, Debug)]
pub struct MemberSyntax {
    pub name: String,
    pub is_static: bool,
    pub is_method: bool,
    pub is_readonly: bool,
    pub optional: bool,
    pub type_syntax: Option<NodeId>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<NodeId>,
    /// A method's body, or `None` for an interface/ambient member
    /// signature. Unused when `is_method` is false.
    pub body: Option<NodeList>,
    /// A field's initializer expression, if any. Unused when
    /// `is_method` is true.
    pub initializer: Option<NodeId>,
}

#[derive(Clone, Debug)]
pub struct ImportElement {
    pub imported_name: String,
    pub local_name: String,
}

/// A single AST node. Grouped loosely by the categories in `spec.md`
/// §3 (IrStatement/IrExpression/IrType) because the converter's job is
/// exactly to map each of these onto the corresponding IR variant.
#[derive(Clone, Debug)]
pub enum AstNode {
    SourceFile {
        file_path: String,
        body: NodeList,
    },

    // --- Declarations ---
    VariableDeclaration {
        name: String,
        declared_type: Option<NodeId>,
        initializer: Option<NodeId>,
        is_const: bool,
    },
    FunctionDeclaration {
        name: String,
        type_parameters: Vec<TypeParameterSyntax>,
        parameters: Vec<Parameter>,
        return_type: Option<NodeId>,
        body: Option<NodeList>,
        is_async: bool,
        is_generator: bool,
    },
    ClassDeclaration {
        name: String,
        type_parameters: Vec<TypeParameterSyntax>,
        heritage: Vec<NodeId>,
        implements: Vec<NodeId>,
        members: Vec<MemberSyntax>,
    },
    InterfaceDeclaration {
        name: String,
        type_parameters: Vec<TypeParameterSyntax>,
        heritage: Vec<NodeId>,
        members: Vec<MemberSyntax>,
    },
    EnumDeclaration {
        name: String,
        members: Vec<(String, Option<NodeId>)>,
    },
    TypeAliasDeclaration {
        name: String,
        type_parameters: Vec<TypeParameterSyntax>,
        aliased_type: NodeId,
    },
    ImportDeclaration {
        specifier: String,
        elements: Vec<ImportElement>,
        default_import: Option<String>,
        is_type_only: bool,
    },
    ExportDeclaration {
        names: Vec<String>,
    },

    // --- Statements ---
    Block {
        statements: NodeList,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    ReturnStatement {
        expression: Option<NodeId>,
    },
    IfStatement {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    WhileStatement {
        condition: NodeId,
        body: NodeId,
    },
    ForStatement {
        initializer: Option<NodeId>,
        condition: Option<NodeId>,
        incrementor: Option<NodeId>,
        body: NodeId,
    },
    ForOfStatement {
        binding_name: String,
        iterable: NodeId,
        body: NodeId,
    },
    SwitchStatement {
        discriminant: NodeId,
        cases: Vec<(Option<NodeId>, NodeList)>,
    },
    ThrowStatement {
        expression: NodeId,
    },
    TryStatement {
        try_block: NodeId,
        catch_binding: Option<String>,
        catch_block: Option<NodeId>,
        finally_block: Option<NodeId>,
    },
    BreakStatement {
        label: Option<String>,
    },
    ContinueStatement {
        label: Option<String>,
    },

    // --- Expressions ---
    Identifier {
        name: String,
    },
    NumericLiteral {
        text: String,
    },
    StringLiteral {
        value: String,
    },
    BooleanLiteral {
        value: bool,
    },
    NullLiteral,
    TemplateLiteral {
        parts: Vec<String>,
        expressions: NodeList,
    },
    ArrayLiteral {
        elements: NodeList,
    },
    ObjectLiteral {
        properties: Vec<(String, NodeId)>,
    },
    SpreadElement {
        expression: NodeId,
    },
    CallExpression {
        callee: NodeId,
        type_arguments: Vec<NodeId>,
        arguments: NodeList,
    },
    NewExpression {
        callee: NodeId,
        type_arguments: Vec<NodeId>,
        arguments: NodeList,
    },
    BinaryExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    LogicalExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    UnaryExpression {
        operator: String,
        operand: NodeId,
        prefix: bool,
    },
    UpdateExpression {
        operator: String,
        operand: NodeId,
        prefix: bool,
    },
    AssignmentExpression {
        operator: String,
        target: NodeId,
        value: NodeId,
    },
    ConditionalExpression {
        condition: NodeId,
        when_true: NodeId,
        when_false: NodeId,
    },
    MemberAccessExpression {
        object: NodeId,
        property: String,
        optional: bool,
    },
    ArrowFunctionExpression {
        parameters: Vec<Parameter>,
        return_type: Option<NodeId>,
        body: NodeId,
        is_expression_body: bool,
        is_async: bool,
    },
    FunctionExpression {
        name: Option<String>,
        parameters: Vec<Parameter>,
        return_type: Option<NodeId>,
        body: NodeId,
        is_async: bool,
        is_generator: bool,
    },
    AwaitExpression {
        expression: NodeId,
    },
    YieldExpression {
        expression: Option<NodeId>,
        delegate: bool,
    },

    // --- Type syntax ---
    PrimitiveTypeReference {
        name: String,
    },
    TypeReference {
        name: String,
        type_arguments: Vec<NodeId>,
    },
    ArrayTypeSyntax {
        element: NodeId,
    },
    TupleTypeSyntax {
        elements: Vec<NodeId>,
    },
    FunctionTypeSyntax {
        parameters: Vec<Parameter>,
        return_type: NodeId,
    },
    ObjectTypeSyntax {
        members: Vec<MemberSyntax>,
        index_signature_value: Option<NodeId>,
    },
    UnionTypeSyntax {
        members: Vec<NodeId>,
    },
    IntersectionTypeSyntax {
        members: Vec<NodeId>,
    },
    LiteralTypeSyntax {
        text: String,
    },
}

impl AstNode {
    pub fn kind(&self) -> SyntaxKind {
        use AstNode::*;
        match self {
            SourceFile { .. } => SyntaxKind::SourceFile,
            VariableDeclaration { .. } => SyntaxKind::VariableDeclaration,
            FunctionDeclaration { .. } => SyntaxKind::FunctionDeclaration,
            ClassDeclaration { .. } => SyntaxKind::ClassDeclaration,
            InterfaceDeclaration { .. } => SyntaxKind::InterfaceDeclaration,
            EnumDeclaration { .. } => SyntaxKind::EnumDeclaration,
            TypeAliasDeclaration { .. } => SyntaxKind::TypeAliasDeclaration,
            ImportDeclaration { .. } => SyntaxKind::ImportDeclaration,
            ExportDeclaration { .. } => SyntaxKind::ExportDeclaration,
            Block { .. } => SyntaxKind::Block,
            ExpressionStatement { .. } => SyntaxKind::ExpressionStatement,
            ReturnStatement { .. } => SyntaxKind::ReturnStatement,
            IfStatement { .. } => SyntaxKind::IfStatement,
            WhileStatement { .. } => SyntaxKind::WhileStatement,
            ForStatement { .. } => SyntaxKind::ForStatement,
            ForOfStatement { .. } => SyntaxKind::ForOfStatement,
            SwitchStatement { .. } => SyntaxKind::SwitchStatement,
            ThrowStatement { .. } => SyntaxKind::ThrowStatement,
            TryStatement { .. } => SyntaxKind::TryStatement,
            BreakStatement { .. } => SyntaxKind::BreakStatement,
            ContinueStatement { .. } => SyntaxKind::ContinueStatement,
            Identifier { .. } => SyntaxKind::Identifier,
            NumericLiteral { .. } => SyntaxKind::NumericLiteral,
            StringLiteral { .. } => SyntaxKind::StringLiteral,
            BooleanLiteral { .. } => SyntaxKind::BooleanLiteral,
            NullLiteral => SyntaxKind::NullLiteral,
            TemplateLiteral { .. } => SyntaxKind::TemplateLiteral,
            ArrayLiteral { .. } => SyntaxKind::ArrayLiteral,
            ObjectLiteral { .. } => SyntaxKind::ObjectLiteral,
            SpreadElement { .. } => SyntaxKind::SpreadElement,
            CallExpression { .. } => SyntaxKind::CallExpression,
            NewExpression { .. } => SyntaxKind::NewExpression,
            BinaryExpression { .. } => SyntaxKind::BinaryExpression,
            LogicalExpression { .. } => SyntaxKind::LogicalExpression,
            UnaryExpression { .. } => SyntaxKind::UnaryExpression,
            UpdateExpression { .. } => SyntaxKind::UpdateExpression,
            AssignmentExpression { .. } => SyntaxKind::AssignmentExpression,
            ConditionalExpression { .. } => SyntaxKind::ConditionalExpression,
            MemberAccessExpression { .. } => SyntaxKind::MemberAccessExpression,
            ArrowFunctionExpression { .. } => SyntaxKind::ArrowFunctionExpression,
            FunctionExpression { .. } => SyntaxKind::FunctionExpression,
            AwaitExpression { .. } => SyntaxKind::AwaitExpression,
            YieldExpression { .. } => SyntaxKind::YieldExpression,
            PrimitiveTypeReference { .. } => SyntaxKind::PrimitiveTypeReference,
            TypeReference { .. } => SyntaxKind::TypeReference,
            ArrayTypeSyntax { .. } => SyntaxKind::ArrayTypeSyntax,
            TupleTypeSyntax { .. } => SyntaxKind::TupleTypeSyntax,
            FunctionTypeSyntax { .. } => SyntaxKind::FunctionTypeSyntax,
            ObjectTypeSyntax { .. } => SyntaxKind::ObjectTypeSyntax,
            UnionTypeSyntax { .. } => SyntaxKind::UnionTypeSyntax,
            IntersectionTypeSyntax { .. } => SyntaxKind::IntersectionTypeSyntax,
            LiteralTypeSyntax { .. } => SyntaxKind::LiteralTypeSyntax,
        }
    }
}

/// Owns every node produced for one compilation unit. Mirrors
/// `tsz-parser`'s `NodeArena`: a flat `Vec` indexed by `NodeId`, plus the
/// span table kept in lockstep.
#[derive(Default, Debug)]
pub struct AstArena {
    nodes: Vec<AstNode>,
    spans: Vec<Span>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: AstNode, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.spans.push(span);
        id
    }

    pub fn get(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.0 as usize]
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.spans[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
