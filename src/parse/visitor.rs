use crate::parse::ast::{BinaryOp, Expr, Item, Literal, RegexMatch, Stmt};

/// Double-dispatch target for [`Ast::accept`](crate::parse::ast::Ast::accept).
/// Every hook defaults to doing nothing.
pub trait Visitor {
    fn visit_item(&mut self, _item: &Item) {}

    fn visit_literal(&mut self, _literal: &Literal) {}

    fn visit_regex(&mut self, _regex: &RegexMatch) {}

    fn visit_expr(&mut self, _expr: &Expr) {}

    fn visit_stmt(&mut self, _stmt: &Stmt) {}
}

/// Lowers syntax trees to a stack-machine IL, one instruction per line.
#[derive(Debug, Default)]
pub struct IlGenerator {
    out: String,
}

impl IlGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn instruction(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn arithmetic(&mut self, op: BinaryOp) {
        self.instruction(match op {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mult => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "rem",
        });
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Int(value) => self.instruction(&format!("push.i64 {}", value)),
            Expr::Float(value) => self.instruction(&format!("push.f64 {:?}", value)),
            Expr::Identifier(name) => self.instruction(&format!("load {}", name)),
            Expr::Binary { left, op, right } => {
                self.expr(left);
                self.expr(right);
                self.arithmetic(*op);
            }
        }
    }

    pub fn generate(&self) -> String {
        self.out.clone()
    }

    pub fn into_il(self) -> String {
        self.out
    }
}

impl Visitor for IlGenerator {
    fn visit_item(&mut self, item: &Item) {
        self.out.push(item.0);
    }

    fn visit_literal(&mut self, literal: &Literal) {
        self.out.push_str(&literal.0);
    }

    fn visit_regex(&mut self, regex: &RegexMatch) {
        self.out.push_str(&regex.value);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        self.expr(expr);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { target, op, value } => {
                match op.binary_op() {
                    Some(arithmetic) => {
                        self.instruction(&format!("load {}", target));
                        self.expr(value);
                        self.arithmetic(arithmetic);
                    }
                    None => self.expr(value),
                }
                self.instruction(&format!("store {}", target));
            }
        }
    }
}
