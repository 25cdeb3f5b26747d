use crate::token::Token;

/// Stable identity of a resolvable expression node.
///
/// Assigned once by the parser; the resolver's side table is keyed by it, so
/// moving or cloning the tree never invalidates a resolved binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub usize);

/// A **literal constant** that appears directly in the source code.
///
/// The parser copies the value out of the token so the AST does not depend
/// on the token buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal, stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// Every kind of *expression* in Lox.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub‑expression.
    Grouping(Box<Expr>),

    /// Prefix operator: `!x`, `-x`.
    Unary { operator: Token, right: Box<Expr> },

    /// Infix arithmetic, comparison or equality operator.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// `name = value`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Function, method or class call.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token, kept for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// object.property
    Get { object: Box<Expr>, name: Token },

    /// object.property = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The `this` keyword inside a method.
    This { id: ExprId, keyword: Token },
}

/// Double‑dispatch interface over [`Expr`] variants.
pub trait ExprVisitor<R> {
    fn visit_literal(&mut self, value: &LiteralValue) -> R;

    fn visit_grouping(&mut self, inner: &Expr) -> R;

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> R;

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> R;

    fn visit_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> R;

    fn visit_variable(&mut self, id: ExprId, name: &Token) -> R;

    fn visit_assign(&mut self, id: ExprId, name: &Token, value: &Expr) -> R;

    fn visit_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> R;

    fn visit_get(&mut self, object: &Expr, name: &Token) -> R;

    fn visit_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> R;

    fn visit_this(&mut self, id: ExprId, keyword: &Token) -> R;
}

impl Expr {
    pub fn accept<R, V: ExprVisitor<R> + ?Sized>(&self, visitor: &mut V) -> R {
        match self {
            Expr::Literal(value) => visitor.visit_literal(value),

            Expr::Grouping(inner) => visitor.visit_grouping(inner),

            Expr::Unary { operator, right } => visitor.visit_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => visitor.visit_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => visitor.visit_logical(left, operator, right),

            Expr::Variable { id, name } => visitor.visit_variable(*id, name),

            Expr::Assign { id, name, value } => visitor.visit_assign(*id, name, value),

            Expr::Call {
                callee,
                paren,
                arguments,
            } => visitor.visit_call(callee, paren, arguments),

            Expr::Get { object, name } => visitor.visit_get(object, name),

            Expr::Set {
                object,
                name,
                value,
            } => visitor.visit_set(object, name, value),

            Expr::This { id, keyword } => visitor.visit_this(*id, keyword),
        }
    }
}
