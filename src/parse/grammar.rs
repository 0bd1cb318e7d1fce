//! Expression and statement grammar for osta, built from the combinators.
//!
//! ```text
//! program  := stmt* EOF
//! stmt     := IDENT assign_op expr ';'
//! expr     := term (('+' | '-') term)*
//! term     := factor (('*' | '/' | '%') factor)*
//! factor   := FLOAT | INT | IDENT | '(' expr ')'
//! ```
//!
//! Whitespace is allowed around every token. Parentheses nest at most
//! [`MAX_NESTING`] deep and an expression tree is at most [`MAX_EXPR_DEPTH`]
//! high; deeper input fails with [`ParseError::TooDeep`] instead of
//! exhausting the stack.

use crate::lex::token::TokenType;
use crate::parse::ast::{AssignOp, BinaryOp, Empty, Expr, Literal, Program, RegexMatch, Stmt};
use crate::parse::combinators::{
    decimal, end_of_input, integer, lazy, literal, map, one_of, pair, regex, skip_whitespace, test,
    triple, zero_or_more, BoxedParser, ParseResult, Parsed, Parser,
};
use crate::parse::ParseError;
use crate::text::line_col;

const ADDITIVE: &[BinaryOp] = &[BinaryOp::Add, BinaryOp::Sub];
const MULTIPLICATIVE: &[BinaryOp] = &[BinaryOp::Mult, BinaryOp::Div, BinaryOp::Mod];

/// Characters of leftover input quoted in errors.
const ERROR_CONTEXT_LEN: usize = 10;

/// Deepest parenthesis nesting accepted.
pub const MAX_NESTING: usize = 128;

/// Highest expression tree accepted. Lowering and dropping a tree recurse
/// once per level.
pub const MAX_EXPR_DEPTH: usize = 1024;

fn token<'a>(symbol: &str) -> impl Parser<'a, Literal> {
    skip_whitespace(literal(symbol))
}

fn is_reserved(name: &str) -> bool {
    TokenType::ALL
        .iter()
        .filter_map(|kind| kind.keyword())
        .any(|keyword| keyword == name)
}

/// Identifier that is not a keyword or primitive type name.
pub fn identifier<'a>() -> impl Parser<'a, String> {
    let name = map(
        skip_whitespace(regex("[_a-zA-Z][_a-zA-Z0-9]*", "Invalid identifier")),
        |m: RegexMatch| m.value,
    );
    test(name, |name: &String| !is_reserved(name), "Reserved word used as identifier")
}

pub fn factor<'a>() -> BoxedParser<'a, Expr> {
    factor_at(0)
}

fn factor_at<'a>(nesting: usize) -> BoxedParser<'a, Expr> {
    let parenthesized = map(
        triple(token("("), nested(nesting), token(")")),
        |(_, inner, _): (Literal, Expr, Literal)| inner,
    );

    one_of(vec![
        skip_whitespace(decimal()).boxed(),
        skip_whitespace(integer()).boxed(),
        map(identifier(), Expr::Identifier).boxed(),
        parenthesized.boxed(),
    ])
    .boxed()
}

/// Expression inside a pair of parentheses opened at `nesting`.
fn nested<'a>(nesting: usize) -> BoxedParser<'a, Expr> {
    if nesting >= MAX_NESTING {
        return (move |_: &'a str| -> ParseResult<'a, Expr> {
            Err(ParseError::TooDeep { limit: MAX_NESTING })
        })
        .boxed();
    }
    lazy(move || expr_at(nesting + 1)).boxed()
}

fn operator<'a>(ops: &'static [BinaryOp]) -> BoxedParser<'a, BinaryOp> {
    let alternatives = ops
        .iter()
        .map(|&op| map(token(op.symbol()), move |_: Literal| op).boxed())
        .collect();
    one_of(alternatives).boxed()
}

/// `operand (op operand)*`, folded to the left. An operator whose right
/// operand fails is left unconsumed, except when the operand is too deep.
fn left_assoc<'a>(operand: BoxedParser<'a, Expr>, ops: &'static [BinaryOp]) -> BoxedParser<'a, Expr> {
    let operator = operator(ops);
    (move |input: &'a str| -> ParseResult<'a, Expr> {
        let head = operand.parse(input)?;
        let mut tree = head.ast;
        let mut rest = head.rest;
        let mut depth = tree.depth();

        while let Ok(op) = operator.parse(rest) {
            let right = match operand.parse(op.rest) {
                Ok(right) => right,
                Err(err @ ParseError::TooDeep { .. }) => return Err(err),
                Err(_) => break,
            };
            depth = depth.max(right.ast.depth()) + 1;
            if depth > MAX_EXPR_DEPTH {
                return Err(ParseError::TooDeep { limit: MAX_EXPR_DEPTH });
            }
            tree = Expr::binary(tree, op.ast, right.ast);
            rest = right.rest;
        }

        Ok(Parsed::new(tree, rest))
    })
    .boxed()
}

pub fn term<'a>() -> BoxedParser<'a, Expr> {
    term_at(0)
}

fn term_at<'a>(nesting: usize) -> BoxedParser<'a, Expr> {
    left_assoc(factor_at(nesting), MULTIPLICATIVE)
}

pub fn expr<'a>() -> BoxedParser<'a, Expr> {
    expr_at(0)
}

fn expr_at<'a>(nesting: usize) -> BoxedParser<'a, Expr> {
    left_assoc(term_at(nesting), ADDITIVE)
}

pub fn assign_op<'a>() -> BoxedParser<'a, AssignOp> {
    let alternatives = AssignOp::ALL
        .iter()
        .map(|&op| map(token(op.symbol()), move |_: Literal| op).boxed())
        .collect();
    one_of(alternatives).boxed()
}

pub fn stmt<'a>() -> BoxedParser<'a, Stmt> {
    let assign = map(
        triple(identifier(), assign_op(), expr()),
        |(target, op, value): (String, AssignOp, Expr)| Stmt::Assign { target, op, value },
    );
    map(pair(assign, token(";")), |(stmt, _): (Stmt, Literal)| stmt).boxed()
}

pub fn program<'a>() -> BoxedParser<'a, Program> {
    let body = pair(zero_or_more(stmt()), skip_whitespace(end_of_input()));
    map(body, |(statements, _): (Vec<Stmt>, Empty)| Program { statements }).boxed()
}

fn context(rest: &str) -> String {
    rest.chars().take(ERROR_CONTEXT_LEN).collect()
}

/// Parses a whole expression; leftover input is an error.
pub fn parse_expr(source: &str) -> Result<Expr, ParseError> {
    let parsed = expr().parse(source)?;
    let trailing = parsed.rest.trim_start();
    if trailing.is_empty() {
        return Ok(parsed.ast);
    }
    let (line, column) = line_col(source, source.len() - trailing.len());
    Err(ParseError::TrailingInput {
        line,
        column,
        found: context(trailing),
    })
}

/// Parses a whole source file, reporting the first statement that fails.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let stmt = stmt();
    let mut statements = Vec::new();
    let mut rest = source;

    loop {
        let upcoming = rest.trim_start();
        if upcoming.is_empty() {
            break;
        }
        match stmt.parse(rest) {
            Ok(parsed) => {
                statements.push(parsed.ast);
                rest = parsed.rest;
            }
            Err(cause) => {
                let (line, column) = line_col(source, source.len() - upcoming.len());
                return Err(ParseError::InvalidStatement {
                    line,
                    column,
                    found: context(upcoming),
                    cause: Box::new(cause),
                });
            }
        }
    }

    tracing::debug!("Parsed {} statements", statements.len());
    Ok(Program { statements })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_rejects_keywords() {
        assert!(identifier().parse("while").is_err());
        assert_eq!(identifier().parse(" whiley ").unwrap().ast, "whiley");
    }

    #[test]
    fn test_parenthesized_expression() {
        let parsed = parse_expr("(1 + 2) * x").unwrap();
        assert_eq!(
            parsed,
            Expr::binary(
                Expr::binary(Expr::Int(1), BinaryOp::Add, Expr::Int(2)),
                BinaryOp::Mult,
                Expr::identifier("x"),
            )
        );
    }

    #[test]
    fn test_program_combinator() {
        let parsed = program().parse("a = 1; b = a;  ").unwrap();
        assert_eq!(parsed.ast.statements.len(), 2);
        assert!(program().parse("a = 1; b").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let wrapped = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse_expr(&wrapped(MAX_NESTING)).unwrap(), Expr::Int(1));
        assert_eq!(
            parse_expr(&wrapped(MAX_NESTING + 1)),
            Err(ParseError::TooDeep { limit: MAX_NESTING })
        );
    }

    #[test]
    fn test_expression_height_limit() {
        let chain = |terms: usize| format!("1{}", " * 2".repeat(terms - 1));
        assert_eq!(parse_expr(&chain(MAX_EXPR_DEPTH)).unwrap().depth(), MAX_EXPR_DEPTH);
        assert_eq!(
            parse_expr(&chain(MAX_EXPR_DEPTH + 1)),
            Err(ParseError::TooDeep { limit: MAX_EXPR_DEPTH })
        );
    }

    #[test]
    fn test_trailing_input_position() {
        let err = parse_expr("1 + 2\n  )").unwrap_err();
        assert_eq!(err.location(), Some((2, 3)));
    }
}
