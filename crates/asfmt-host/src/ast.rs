//! Abstract Syntax Tree (AST) definitions
//!
//! The tree keeps only what the printer needs: statement and member spans
//! for comment placement, and enough structure to re-emit every construct
//! of the strict grammar in canonical form.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Top-level program containing all statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<Stmt>,
    pub span: Span,
}

/// Identifier with its location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// `export` / `export default` / `declare` prefix of a declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub export: bool,
    pub default: bool,
    pub declare: bool,
    /// Offset of the first token after the modifiers
    pub end: usize,
}

impl Modifiers {
    pub fn is_empty(&self) -> bool {
        !self.export && !self.default && !self.declare
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Var(VarStmt),
    Function(FunctionDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Namespace(NamespaceDecl),
    Enum(EnumDecl),
    TypeAlias(TypeAliasDecl),
    Import(ImportDecl),
    Export(ExportDecl),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    For(ForStmt),
    ForOf(ForOfStmt),
    Return(ReturnStmt),
    Break(JumpStmt),
    Continue(JumpStmt),
    Throw(ThrowStmt),
    Block(Block),
    Empty(Span),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Var(s) => s.span,
            Stmt::Function(s) => s.span,
            Stmt::Class(s) => s.span,
            Stmt::Interface(s) => s.span,
            Stmt::Namespace(s) => s.span,
            Stmt::Enum(s) => s.span,
            Stmt::TypeAlias(s) => s.span,
            Stmt::Import(s) => s.span,
            Stmt::Export(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::ForOf(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Break(s) | Stmt::Continue(s) => s.span,
            Stmt::Throw(s) => s.span,
            Stmt::Block(s) => s.span,
            Stmt::Empty(span) => *span,
            Stmt::Expr(s) => s.span,
        }
    }

    pub fn modifiers(&self) -> Option<&Modifiers> {
        match self {
            Stmt::Var(s) => Some(&s.modifiers),
            Stmt::Function(s) => Some(&s.modifiers),
            Stmt::Class(s) => Some(&s.modifiers),
            Stmt::Interface(s) => Some(&s.modifiers),
            Stmt::Namespace(s) => Some(&s.modifiers),
            Stmt::Enum(s) => Some(&s.modifiers),
            Stmt::TypeAlias(s) => Some(&s.modifiers),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Let,
    Const,
    Var,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Let => "let",
            VarKind::Const => "const",
            VarKind::Var => "var",
        }
    }
}

/// `let a: T = x, b!: U;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarStmt {
    pub modifiers: Modifiers,
    pub kind: VarKind,
    pub declarators: Vec<VarDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDeclarator {
    pub name: Identifier,
    /// Definite assignment assertion (`let x!: T`)
    pub definite: bool,
    pub type_ann: Option<TypeRef>,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: Identifier,
    pub constraint: Option<TypeRef>,
    pub default: Option<TypeRef>,
}

/// Function or method parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter property modifiers (`public`, `readonly`, ...)
    pub modifiers: Vec<String>,
    pub rest: bool,
    pub name: Identifier,
    pub optional: bool,
    pub type_ann: Option<TypeRef>,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub modifiers: Modifiers,
    pub name: Identifier,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeRef>,
    /// `None` for ambient signatures (`declare function f(): void;`)
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub modifiers: Modifiers,
    pub is_abstract: bool,
    pub name: Identifier,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub modifiers: Modifiers,
    pub name: Identifier,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeRef>,
    pub members: Vec<Member>,
    pub span: Span,
}

/// Class or interface member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// `static`, `public`, `readonly`, ... in source order
    pub modifiers: Vec<String>,
    pub kind: MemberKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accessor {
    Get,
    Set,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberKind {
    Field {
        name: String,
        optional: bool,
        definite: bool,
        type_ann: Option<TypeRef>,
        init: Option<Expr>,
    },
    Method {
        name: String,
        accessor: Option<Accessor>,
        optional: bool,
        type_params: Vec<TypeParam>,
        params: Vec<Param>,
        return_type: Option<TypeRef>,
        body: Option<Block>,
    },
    Constructor {
        params: Vec<Param>,
        body: Option<Block>,
    },
    /// `[key: K]: V`
    Index {
        key: Identifier,
        key_type: TypeRef,
        value_type: TypeRef,
    },
}

/// `namespace a.b { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDecl {
    pub modifiers: Modifiers,
    pub name: Vec<Identifier>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub modifiers: Modifiers,
    pub is_const: bool,
    pub name: Identifier,
    pub members: Vec<EnumMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasDecl {
    pub modifiers: Modifiers,
    pub name: Identifier,
    pub type_params: Vec<TypeParam>,
    pub ty: TypeRef,
    pub span: Span,
}

/// `name` or `name as alias` inside import/export braces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specifier {
    pub name: Identifier,
    pub alias: Option<Identifier>,
}

/// Import declaration
///
/// `import "m";`, `import d, { a as b } from "m";`, `import * as ns from "m";`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub default: Option<Identifier>,
    pub namespace: Option<Identifier>,
    /// `Some` when braces were written
    pub named: Option<Vec<Specifier>>,
    /// Raw module string literal
    pub source: String,
    pub span: Span,
}

/// Export forms that are not a modifier on a declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDecl {
    pub kind: ExportKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportKind {
    /// `export { a, b as c } [from "m"];`
    Named {
        specifiers: Vec<Specifier>,
        source: Option<String>,
    },
    /// `export * [as ns] from "m";`
    All {
        alias: Option<Identifier>,
        source: String,
    },
    /// `export default expr;`
    Default(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoWhileStmt {
    pub body: Box<Stmt>,
    pub cond: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForInit {
    Var(VarStmt),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub init: Option<ForInit>,
    pub cond: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// `for (const x of xs) ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForOfStmt {
    pub kind: VarKind,
    pub name: Identifier,
    pub iterable: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// `break` / `continue` with optional label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpStmt {
    pub label: Option<Identifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowStmt {
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    Identifier(Identifier),
    This,
    Super,
    Array(Vec<Expr>),
    Object(Vec<Property>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        type_args: Vec<TypeRef>,
        args: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        type_args: Vec<TypeRef>,
        args: Option<Vec<Expr>>,
    },
    Member {
        object: Box<Expr>,
        property: Identifier,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// Non-null assertion `x!`
    NonNull(Box<Expr>),
    /// `x as T`
    As {
        expr: Box<Expr>,
        ty: TypeRef,
    },
    /// Prefix type assertion `<T>x`
    TypeAssertion {
        ty: TypeRef,
        expr: Box<Expr>,
    },
    Arrow(Box<ArrowFunction>),
    Group(Box<Expr>),
    Spread(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Raw numeric text
    Number(String),
    /// Raw string literal, quotes included
    String(String),
    /// Raw template literal, backticks included
    Template(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Property {
    /// `key: value`, or shorthand `key` when `value` is `None`
    KeyValue { key: String, value: Option<Expr> },
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowFunction {
    pub params: Vec<Param>,
    /// Single bare identifier parameter written without parentheses
    pub bare_param: bool,
    pub return_type: Option<TypeRef>,
    pub body: ArrowBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrowBody {
    Expr(Expr),
    Block(Block),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    PreIncrement,
    PreDecrement,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Typeof => "typeof ",
            UnaryOp::Void => "void ",
            UnaryOp::PreIncrement => "++",
            UnaryOp::PreDecrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Nullish,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    Instanceof,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNe => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Nullish => "??",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Instanceof => "instanceof",
        }
    }

    /// Binding power; higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Nullish => 1,
            BinaryOp::Or => 2,
            BinaryOp::And => 3,
            BinaryOp::BitOr => 4,
            BinaryOp::BitXor => 5,
            BinaryOp::BitAnd => 6,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::StrictEq | BinaryOp::StrictNe => 7,
            BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::Instanceof => 8,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 9,
            BinaryOp::Add | BinaryOp::Sub => 10,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 11,
            BinaryOp::Pow => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Pow => "**=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::UShr => ">>>=",
        }
    }
}

/// Type annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeRef {
    /// `a.b.C<T, U>`
    Named { name: String, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    Union(Vec<TypeRef>),
    Intersection(Vec<TypeRef>),
    Function {
        params: Vec<Param>,
        ret: Box<TypeRef>,
    },
    /// String or numeric literal type, raw text
    Literal(String),
    Paren(Box<TypeRef>),
}
