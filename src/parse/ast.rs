use crate::parse::visitor::Visitor;
use serde::Serialize;

/// Anything a [`Visitor`] can walk.
pub trait Ast {
    fn accept(&self, visitor: &mut dyn Visitor);
}

// Intermediate nodes produced by the basic combinators. They are normally
// mapped away before a tree reaches a visitor.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Empty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Item(pub char);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Literal(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegexMatch {
    pub value: String,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mult,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" => Some(Self::Sub),
            "*" => Some(Self::Mult),
            "/" => Some(Self::Div),
            "%" => Some(Self::Mod),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mult => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Int(i64),
    Float(f64),
    Identifier(String),
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Height of the tree; a leaf is 1. Walks with an explicit stack.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            if let Self::Binary { left, right, .. } = node {
                pending.push((left, depth + 1));
                pending.push((right, depth + 1));
            }
        }
        deepest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MultAssign,
    DivAssign,
    ModAssign,
}

impl AssignOp {
    /// Longest spelling first so `+=` is tried before `=`.
    pub const ALL: [AssignOp; 6] = [
        Self::AddAssign,
        Self::SubAssign,
        Self::MultAssign,
        Self::DivAssign,
        Self::ModAssign,
        Self::Assign,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MultAssign => "*=",
            Self::DivAssign => "/=",
            Self::ModAssign => "%=",
        }
    }

    /// The arithmetic a compound assignment applies before storing.
    pub fn binary_op(self) -> Option<BinaryOp> {
        match self {
            Self::Assign => None,
            Self::AddAssign => Some(BinaryOp::Add),
            Self::SubAssign => Some(BinaryOp::Sub),
            Self::MultAssign => Some(BinaryOp::Mult),
            Self::DivAssign => Some(BinaryOp::Div),
            Self::ModAssign => Some(BinaryOp::Mod),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Assign {
        target: String,
        op: AssignOp,
        value: Expr,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Ast for Empty {
    fn accept(&self, _visitor: &mut dyn Visitor) {}
}

impl Ast for Item {
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_item(self);
    }
}

impl Ast for Literal {
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_literal(self);
    }
}

impl Ast for RegexMatch {
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_regex(self);
    }
}

impl Ast for Expr {
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_expr(self);
    }
}

impl Ast for Stmt {
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_stmt(self);
    }
}

impl Ast for Program {
    fn accept(&self, visitor: &mut dyn Visitor) {
        self.statements.accept(visitor);
    }
}

impl<T: Ast> Ast for Vec<T> {
    fn accept(&self, visitor: &mut dyn Visitor) {
        for node in self {
            node.accept(visitor);
        }
    }
}

impl<T: Ast> Ast for Option<T> {
    fn accept(&self, visitor: &mut dyn Visitor) {
        if let Some(node) = self {
            node.accept(visitor);
        }
    }
}

impl<A: Ast, B: Ast> Ast for (A, B) {
    fn accept(&self, visitor: &mut dyn Visitor) {
        self.0.accept(visitor);
        self.1.accept(visitor);
    }
}
