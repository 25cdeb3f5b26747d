use std::rc::Rc;

use crate::expr::Expr;
use crate::token::Token;

/// A function (or method) declaration.
///
/// Shared behind an `Rc` so runtime closures can hold on to the declaration
/// without copying the body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (at most 255).
    pub params: Vec<Token>,

    pub body: Vec<Stmt>,
}

/// Every kind of *statement*. A program is a `Vec<Stmt>`.
///
/// There is no `for` node: the parser desugars `for` into `Block` + `While`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    Print(Expr),

    /// `"var" IDENT ("=" initializer)? ";"`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope.
    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    /// Exit the innermost enclosing loop.
    Break(Token),

    Class {
        name: Token,
        methods: Vec<Rc<FunctionDecl>>,
    },
}

/// Double‑dispatch interface over [`Stmt`] variants.
pub trait StmtVisitor<R> {
    fn visit_expression(&mut self, expr: &Expr) -> R;

    fn visit_print(&mut self, expr: &Expr) -> R;

    fn visit_var(&mut self, name: &Token, initializer: Option<&Expr>) -> R;

    fn visit_block(&mut self, statements: &[Stmt]) -> R;

    fn visit_if(&mut self, condition: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) -> R;

    fn visit_while(&mut self, condition: &Expr, body: &Stmt) -> R;

    fn visit_function(&mut self, declaration: &Rc<FunctionDecl>) -> R;

    fn visit_return(&mut self, keyword: &Token, value: Option<&Expr>) -> R;

    fn visit_break(&mut self, keyword: &Token) -> R;

    fn visit_class(&mut self, name: &Token, methods: &[Rc<FunctionDecl>]) -> R;
}

impl Stmt {
    pub fn accept<R, V: StmtVisitor<R> + ?Sized>(&self, visitor: &mut V) -> R {
        match self {
            Stmt::Expression(expr) => visitor.visit_expression(expr),

            Stmt::Print(expr) => visitor.visit_print(expr),

            Stmt::Var { name, initializer } => visitor.visit_var(name, initializer.as_ref()),

            Stmt::Block(statements) => visitor.visit_block(statements),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => visitor.visit_if(condition, then_branch, else_branch.as_deref()),

            Stmt::While { condition, body } => visitor.visit_while(condition, body),

            Stmt::Function(declaration) => visitor.visit_function(declaration),

            Stmt::Return { keyword, value } => visitor.visit_return(keyword, value.as_ref()),

            Stmt::Break(keyword) => visitor.visit_break(keyword),

            Stmt::Class { name, methods } => visitor.visit_class(name, methods),
        }
    }
}
