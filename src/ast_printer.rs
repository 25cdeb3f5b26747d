use std::rc::Rc;

use crate::expr::{Expr, ExprId, ExprVisitor, LiteralValue};
use crate::stmt::{FunctionDecl, Stmt, StmtVisitor};
use crate::token::Token;

/// Renders the tree in a Lisp‑like prefix form, e.g. `(+ 1.0 (group 2.0))`.
/// Used by the `parse` subcommand and by tests.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        expr.accept(&mut AstPrinter)
    }

    pub fn print_stmt(stmt: &Stmt) -> String {
        stmt.accept(&mut AstPrinter)
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        let mut s = format!("({}", name);
        for expr in exprs {
            s.push(' ');
            s.push_str(&expr.accept(self));
        }
        s.push(')');
        s
    }

    fn join_stmts(&mut self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|stmt| stmt.accept(self))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn function(&mut self, keyword: &str, declaration: &FunctionDecl) -> String {
        let params: Vec<&str> = declaration
            .params
            .iter()
            .map(|p| p.lexeme.as_str())
            .collect();

        let head = format!("({} {} ({})", keyword, declaration.name.lexeme, params.join(" "));

        if declaration.body.is_empty() {
            format!("{})", head)
        } else {
            format!("{} {})", head, self.join_stmts(&declaration.body))
        }
    }
}

impl ExprVisitor<String> for AstPrinter {
    fn visit_literal(&mut self, value: &LiteralValue) -> String {
        match value {
            LiteralValue::True => "true".into(),

            LiteralValue::False => "false".into(),

            LiteralValue::Nil => "nil".into(),

            LiteralValue::Str(s) => s.clone(),

            LiteralValue::Number(n) => {
                if n.fract() == 0.0 {
                    // 3 → 3.0
                    format!("{:.1}", n)
                } else {
                    n.to_string()
                }
            }
        }
    }

    fn visit_grouping(&mut self, inner: &Expr) -> String {
        self.parenthesize("group", &[inner])
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> String {
        self.parenthesize(&operator.lexeme, &[right])
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> String {
        self.parenthesize(&operator.lexeme, &[left, right])
    }

    fn visit_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> String {
        self.parenthesize(&operator.lexeme, &[left, right])
    }

    fn visit_variable(&mut self, _id: ExprId, name: &Token) -> String {
        name.lexeme.clone()
    }

    fn visit_assign(&mut self, _id: ExprId, name: &Token, value: &Expr) -> String {
        format!("(= {} {})", name.lexeme, value.accept(self))
    }

    fn visit_call(&mut self, callee: &Expr, _paren: &Token, arguments: &[Expr]) -> String {
        let mut exprs: Vec<&Expr> = vec![callee];
        exprs.extend(arguments.iter());
        self.parenthesize("call", &exprs)
    }

    fn visit_get(&mut self, object: &Expr, name: &Token) -> String {
        format!("(. {} {})", object.accept(self), name.lexeme)
    }

    fn visit_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> String {
        format!(
            "(= (. {} {}) {})",
            object.accept(self),
            name.lexeme,
            value.accept(self)
        )
    }

    fn visit_this(&mut self, _id: ExprId, _keyword: &Token) -> String {
        "this".into()
    }
}

impl StmtVisitor<String> for AstPrinter {
    fn visit_expression(&mut self, expr: &Expr) -> String {
        self.parenthesize(";", &[expr])
    }

    fn visit_print(&mut self, expr: &Expr) -> String {
        self.parenthesize("print", &[expr])
    }

    fn visit_var(&mut self, name: &Token, initializer: Option<&Expr>) -> String {
        match initializer {
            Some(expr) => format!("(var {} {})", name.lexeme, expr.accept(self)),
            None => format!("(var {})", name.lexeme),
        }
    }

    fn visit_block(&mut self, statements: &[Stmt]) -> String {
        if statements.is_empty() {
            return "(block)".into();
        }
        format!("(block {})", self.join_stmts(statements))
    }

    fn visit_if(&mut self, condition: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) -> String {
        let condition = condition.accept(self);
        let then_branch = then_branch.accept(self);

        match else_branch {
            Some(else_branch) => format!(
                "(if {} {} {})",
                condition,
                then_branch,
                else_branch.accept(self)
            ),
            None => format!("(if {} {})", condition, then_branch),
        }
    }

    fn visit_while(&mut self, condition: &Expr, body: &Stmt) -> String {
        format!("(while {} {})", condition.accept(self), body.accept(self))
    }

    fn visit_function(&mut self, declaration: &Rc<FunctionDecl>) -> String {
        self.function("fun", declaration)
    }

    fn visit_return(&mut self, _keyword: &Token, value: Option<&Expr>) -> String {
        match value {
            Some(expr) => self.parenthesize("return", &[expr]),
            None => "(return)".into(),
        }
    }

    fn visit_break(&mut self, _keyword: &Token) -> String {
        "(break)".into()
    }

    fn visit_class(&mut self, name: &Token, methods: &[Rc<FunctionDecl>]) -> String {
        let mut s = format!("(class {}", name.lexeme);
        for method in methods {
            s.push(' ');
            s.push_str(&self.function("method", method));
        }
        s.push(')');
        s
    }
}
