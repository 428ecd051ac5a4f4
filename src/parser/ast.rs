// AST (Abstract Syntax Tree) definitions for the C front end

use std::fmt;

/// Handle identifying a declaration node, used by the symbol table to refer
/// back into the tree without owning it
pub type NodeId = usize;

/// Identifier of a lexical scope (0 is the global scope)
pub type ScopeId = usize;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The effective type named by a declaration specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSpecifierKind {
    Void,
    Char,
    Int,
    Struct,
    Union,
    Enum,
}

impl fmt::Display for TypeSpecifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeSpecifierKind::Void => "void",
            TypeSpecifierKind::Char => "char",
            TypeSpecifierKind::Int => "int",
            TypeSpecifierKind::Struct => "struct",
            TypeSpecifierKind::Union => "union",
            TypeSpecifierKind::Enum => "enum",
        };
        f.write_str(name)
    }
}

/// Binary operators, loosest binding last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Multiplicative
    Mul,
    Div,
    Mod,
    // Additive
    Add,
    Sub,
    // Shift
    Shl,
    Shr,
    // Relational
    Lt,
    Gt,
    Le,
    Ge,
    // Equality
    Eq,
    Ne,
    // Bitwise
    BitAnd,
    BitXor,
    BitOr,
    // Logical
    LogicalAnd,
    LogicalOr,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::BitAnd => "&",
            BinOp::BitXor => "^",
            BinOp::BitOr => "|",
            BinOp::LogicalAnd => "&&",
            BinOp::LogicalOr => "||",
        }
    }
}

/// Simple and compound assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,    // =
    AddAssign, // +=
    SubAssign, // -=
    MulAssign, // *=
    DivAssign, // /=
    ModAssign, // %=
    AndAssign, // &=
    XorAssign, // ^=
    OrAssign,  // |=
    ShlAssign, // <<=
    ShrAssign, // >>=
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
            AssignOp::AndAssign => "&=",
            AssignOp::XorAssign => "^=",
            AssignOp::OrAssign => "|=",
            AssignOp::ShlAssign => "<<=",
            AssignOp::ShrAssign => ">>=",
        }
    }
}

/// Prefix unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    PreInc, // ++x
    PreDec, // --x
    AddrOf, // &x
    Deref,  // *x
    Plus,   // +x
    Neg,    // -x
    BitNot, // ~x
    Not,    // !x
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::PreInc => "++",
            UnaryOp::PreDec => "--",
            UnaryOp::AddrOf => "&",
            UnaryOp::Deref => "*",
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "!",
        }
    }
}

/// Postfix increment and decrement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Inc, // x++
    Dec, // x--
}

impl PostfixOp {
    pub fn symbol(self) -> &'static str {
        match self {
            PostfixOp::Inc => "++",
            PostfixOp::Dec => "--",
        }
    }
}

/// Where an identifier use was resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub scope_id: ScopeId,
    pub declaration: Option<NodeId>,
}

/// Expressions, from constants up through assignments
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntegerConstant {
        value: u64,
        is_unsigned: bool,
        is_long: bool,
        location: SourceLocation,
    },
    CharConstant {
        value: u32,
        wide: bool,
        location: SourceLocation,
    },
    StringLiteral {
        value: String,
        wide: bool,
        location: SourceLocation,
    },
    Identifier {
        name: String,
        binding: Option<Binding>,
        location: SourceLocation,
    },
    Assignment {
        op: AssignOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        location: SourceLocation,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        location: SourceLocation,
    },
    Cast {
        type_name: Box<AbstractDeclaration>,
        expr: Box<Expr>,
        location: SourceLocation,
    },
    SizeofExpr {
        expr: Box<Expr>,
        location: SourceLocation,
    },
    SizeofType {
        type_name: Box<AbstractDeclaration>,
        location: SourceLocation,
    },
    /// Placeholder for an operand that could not be parsed. A diagnostic
    /// has always been recorded when one of these is built.
    Error { location: SourceLocation },
}

impl Expr {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::IntegerConstant { location, .. }
            | Expr::CharConstant { location, .. }
            | Expr::StringLiteral { location, .. }
            | Expr::Identifier { location, .. }
            | Expr::Assignment { location, .. }
            | Expr::Binary { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Postfix { location, .. }
            | Expr::ArrayAccess { location, .. }
            | Expr::Call { location, .. }
            | Expr::Cast { location, .. }
            | Expr::SizeofExpr { location, .. }
            | Expr::SizeofType { location, .. }
            | Expr::Error { location } => *location,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Expr::Error { .. })
    }
}

/// One `name` or `name = value` entry of an enum body
#[derive(Debug, Clone, PartialEq)]
pub struct Enumerator {
    pub name: String,
    pub value: Option<Expr>,
    pub location: SourceLocation,
}

/// Declaration specifier: a basic type keyword or a struct/union/enum
#[derive(Debug, Clone, PartialEq)]
pub enum DeclSpecifier {
    Basic {
        kind: TypeSpecifierKind,
        location: SourceLocation,
    },
    /// `struct`/`union` with optional tag; `members` is `None` for a bare
    /// reference such as `struct point p;`
    StructOrUnion {
        kind: TypeSpecifierKind,
        tag: Option<String>,
        members: Option<Vec<Declaration>>,
        location: SourceLocation,
    },
    Enum {
        tag: Option<String>,
        enumerators: Option<Vec<Enumerator>>,
        location: SourceLocation,
    },
}

impl DeclSpecifier {
    pub fn kind(&self) -> TypeSpecifierKind {
        match self {
            DeclSpecifier::Basic { kind, .. } | DeclSpecifier::StructOrUnion { kind, .. } => *kind,
            DeclSpecifier::Enum { .. } => TypeSpecifierKind::Enum,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            DeclSpecifier::Basic { location, .. }
            | DeclSpecifier::StructOrUnion { location, .. }
            | DeclSpecifier::Enum { location, .. } => *location,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            DeclSpecifier::Basic { .. } => None,
            DeclSpecifier::StructOrUnion { tag, .. } | DeclSpecifier::Enum { tag, .. } => {
                tag.as_deref()
            }
        }
    }
}

/// Declarator tree.
///
/// The tree is type-ordered: the root is the outermost type constructor of
/// the declared entity and the identifier, when present, is the leaf. So
/// `*a[3]` is `Array(Pointer(a))` ("array of pointer") while `(*a)[3]` is
/// `Pointer(Array(a))` ("pointer to array"). Abstract declarators have no
/// identifier leaf, which is why every `inner` is optional.
#[derive(Debug, Clone, PartialEq)]
pub enum Declarator {
    Identifier {
        name: String,
        location: SourceLocation,
    },
    Pointer {
        inner: Option<Box<Declarator>>,
        location: SourceLocation,
    },
    Array {
        inner: Option<Box<Declarator>>,
        size: Option<Box<Expr>>,
        location: SourceLocation,
    },
    Function {
        inner: Option<Box<Declarator>>,
        params: Vec<AbstractDeclaration>,
        variadic: bool,
        location: SourceLocation,
    },
}

impl Declarator {
    pub fn location(&self) -> SourceLocation {
        match self {
            Declarator::Identifier { location, .. }
            | Declarator::Pointer { location, .. }
            | Declarator::Array { location, .. }
            | Declarator::Function { location, .. } => *location,
        }
    }

    pub fn inner(&self) -> Option<&Declarator> {
        match self {
            Declarator::Identifier { .. } => None,
            Declarator::Pointer { inner, .. }
            | Declarator::Array { inner, .. }
            | Declarator::Function { inner, .. } => inner.as_deref(),
        }
    }

    /// The declared name, found at the leaf of the tree
    pub fn identifier(&self) -> Option<&str> {
        let mut node = self;
        loop {
            match node {
                Declarator::Identifier { name, .. } => return Some(name),
                other => node = other.inner()?,
            }
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Declarator::Function { .. })
    }
}

/// A specifier with an optional, possibly unnamed declarator. Used for
/// parameters, casts and `sizeof(type)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AbstractDeclaration {
    pub specifier: DeclSpecifier,
    pub declarator: Option<Declarator>,
    pub location: SourceLocation,
}

/// Initializer of a declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    Expr(Expr),
    List {
        items: Vec<Initializer>,
        location: SourceLocation,
    },
}

/// A single declared entity: `int *p = 0;` or one member of a struct body.
///
/// `int a, b;` produces two declarations that share an equal specifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub id: NodeId,
    pub specifier: DeclSpecifier,
    pub declarator: Option<Declarator>,
    pub initializer: Option<Initializer>,
    /// Width of a struct member bit-field (`int flag : 1;`)
    pub bit_width: Option<Expr>,
    pub location: SourceLocation,
}

/// Function definition: a function declarator followed by a compound body
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub id: NodeId,
    pub specifier: DeclSpecifier,
    pub declarator: Declarator,
    pub body: Box<Stmt>,
    pub location: SourceLocation,
}

impl FunctionDefinition {
    pub fn name(&self) -> Option<&str> {
        self.declarator.identifier()
    }
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Compound {
        items: Vec<AstNode>,
        scope_id: ScopeId,
        location: SourceLocation,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        location: SourceLocation,
    },
    Switch {
        expr: Expr,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
        location: SourceLocation,
    },
    For {
        init: Option<Expr>,
        condition: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    Goto {
        label: String,
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Return {
        expr: Option<Expr>,
        location: SourceLocation,
    },
    Label {
        name: String,
        body: Option<Box<Stmt>>,
        location: SourceLocation,
    },
    Case {
        value: Expr,
        body: Option<Box<Stmt>>,
        location: SourceLocation,
    },
    Default {
        body: Option<Box<Stmt>>,
        location: SourceLocation,
    },
    /// `expr;`, or the null statement `;` when `expr` is `None`
    Expression {
        expr: Option<Expr>,
        location: SourceLocation,
    },
}

impl Stmt {
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::Compound { location, .. }
            | Stmt::If { location, .. }
            | Stmt::Switch { location, .. }
            | Stmt::While { location, .. }
            | Stmt::DoWhile { location, .. }
            | Stmt::For { location, .. }
            | Stmt::Goto { location, .. }
            | Stmt::Continue { location }
            | Stmt::Break { location }
            | Stmt::Return { location, .. }
            | Stmt::Label { location, .. }
            | Stmt::Case { location, .. }
            | Stmt::Default { location, .. }
            | Stmt::Expression { location, .. } => *location,
        }
    }
}

/// An item of a translation unit or of a compound statement
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Declaration(Declaration),
    FunctionDefinition(FunctionDefinition),
    Statement(Stmt),
}

impl AstNode {
    /// Get the source location of this node
    pub fn location(&self) -> SourceLocation {
        match self {
            AstNode::Declaration(decl) => decl.location,
            AstNode::FunctionDefinition(def) => def.location,
            AstNode::Statement(stmt) => stmt.location(),
        }
    }
}

/// Top-level translation unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationUnit {
    pub nodes: Vec<AstNode>, // Declarations and function definitions, in source order
}

impl TranslationUnit {
    pub fn new() -> Self {
        TranslationUnit::default()
    }

    pub fn function_definitions(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.nodes.iter().filter_map(|node| match node {
            AstNode::FunctionDefinition(def) => Some(def),
            _ => None,
        })
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.nodes.iter().filter_map(|node| match node {
            AstNode::Declaration(decl) => Some(decl),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Declarator {
        Declarator::Identifier {
            name: name.to_string(),
            location: SourceLocation::new(1, 1),
        }
    }

    #[test]
    fn test_declarator_identifier_is_found_at_leaf() {
        let decl = Declarator::Array {
            inner: Some(Box::new(Declarator::Pointer {
                inner: Some(Box::new(ident("a"))),
                location: SourceLocation::new(1, 5),
            })),
            size: None,
            location: SourceLocation::new(1, 7),
        };
        assert_eq!(decl.identifier(), Some("a"));
        assert!(!decl.is_function());
    }

    #[test]
    fn test_abstract_declarator_has_no_identifier() {
        let decl = Declarator::Pointer {
            inner: None,
            location: SourceLocation::new(2, 3),
        };
        assert_eq!(decl.identifier(), None);
        assert_eq!(decl.location(), SourceLocation::new(2, 3));
    }

    #[test]
    fn test_specifier_kind() {
        let spec = DeclSpecifier::Enum {
            tag: Some("color".to_string()),
            enumerators: None,
            location: SourceLocation::default(),
        };
        assert_eq!(spec.kind(), TypeSpecifierKind::Enum);
        assert_eq!(spec.tag(), Some("color"));
        assert_eq!(TypeSpecifierKind::Union.to_string(), "union");
    }
}
