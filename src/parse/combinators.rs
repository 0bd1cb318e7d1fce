use crate::parse::ast::{Empty, Expr, Item, Literal, RegexMatch};
use crate::parse::ParseError;
use regex::Regex;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Mutex, OnceLock};

/// A successful parse: the produced node and the unconsumed input.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<'a, T> {
    pub ast: T,
    pub rest: &'a str,
}

impl<'a, T> Parsed<'a, T> {
    pub fn new(ast: T, rest: &'a str) -> Self {
        Self { ast, rest }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<'a, U> {
        Parsed::new(f(self.ast), self.rest)
    }
}

pub type ParseResult<'a, T> = Result<Parsed<'a, T>, ParseError>;

pub trait Parser<'a, T> {
    fn parse(&self, input: &'a str) -> ParseResult<'a, T>;

    fn boxed(self) -> BoxedParser<'a, T>
    where
        Self: Sized + 'a,
    {
        BoxedParser::new(self)
    }
}

impl<'a, F, T> Parser<'a, T> for F
where
    F: Fn(&'a str) -> ParseResult<'a, T>,
{
    fn parse(&self, input: &'a str) -> ParseResult<'a, T> {
        self(input)
    }
}

/// Type-erased, cheaply clonable parser.
pub struct BoxedParser<'a, T> {
    inner: Rc<dyn Parser<'a, T> + 'a>,
}

impl<'a, T> BoxedParser<'a, T> {
    pub fn new<P>(parser: P) -> Self
    where
        P: Parser<'a, T> + 'a,
    {
        Self {
            inner: Rc::new(parser),
        }
    }
}

impl<'a, T> Clone for BoxedParser<'a, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<'a, T> Parser<'a, T> for BoxedParser<'a, T> {
    fn parse(&self, input: &'a str) -> ParseResult<'a, T> {
        self.inner.parse(input)
    }
}

/// Always succeeds without consuming anything.
pub fn noop<'a>() -> impl Parser<'a, Empty> {
    move |input: &'a str| -> ParseResult<'a, Empty> { Ok(Parsed::new(Empty, input)) }
}

/// Builds the inner parser on every call, which is what allows recursive grammars.
pub fn lazy<'a, T, P, F>(factory: F) -> impl Parser<'a, T>
where
    F: Fn() -> P,
    P: Parser<'a, T>,
{
    move |input: &'a str| -> ParseResult<'a, T> { factory().parse(input) }
}

pub fn test<'a, T, P, F>(parser: P, predicate: F, message: &str) -> impl Parser<'a, T>
where
    P: Parser<'a, T>,
    F: Fn(&T) -> bool,
{
    let message = message.to_string();
    move |input: &'a str| -> ParseResult<'a, T> {
        let result = parser.parse(input)?;
        if predicate(&result.ast) {
            Ok(result)
        } else {
            Err(ParseError::Message(message.clone()))
        }
    }
}

/// Runs every parser in order. Fails with `NoParsers` when given none.
pub fn sequence<'a, T>(parsers: Vec<BoxedParser<'a, T>>) -> impl Parser<'a, Vec<T>> {
    move |mut input: &'a str| -> ParseResult<'a, Vec<T>> {
        if parsers.is_empty() {
            return Err(ParseError::NoParsers);
        }
        let mut asts = Vec::with_capacity(parsers.len());
        for parser in &parsers {
            let parsed = parser.parse(input)?;
            asts.push(parsed.ast);
            input = parsed.rest;
        }
        Ok(Parsed::new(asts, input))
    }
}

pub fn pair<'a, A, B, P1, P2>(first: P1, second: P2) -> impl Parser<'a, (A, B)>
where
    P1: Parser<'a, A>,
    P2: Parser<'a, B>,
{
    move |input: &'a str| -> ParseResult<'a, (A, B)> {
        let a = first.parse(input)?;
        let b = second.parse(a.rest)?;
        Ok(Parsed::new((a.ast, b.ast), b.rest))
    }
}

pub fn triple<'a, A, B, C, P1, P2, P3>(first: P1, second: P2, third: P3) -> impl Parser<'a, (A, B, C)>
where
    P1: Parser<'a, A>,
    P2: Parser<'a, B>,
    P3: Parser<'a, C>,
{
    move |input: &'a str| -> ParseResult<'a, (A, B, C)> {
        let a = first.parse(input)?;
        let b = second.parse(a.rest)?;
        let c = third.parse(b.rest)?;
        Ok(Parsed::new((a.ast, b.ast, c.ast), c.rest))
    }
}

/// First success wins. When every parser fails, the last failure is returned.
pub fn one_of<'a, T>(parsers: Vec<BoxedParser<'a, T>>) -> impl Parser<'a, T> {
    move |input: &'a str| -> ParseResult<'a, T> {
        let mut error = ParseError::NoParsers;
        for parser in &parsers {
            match parser.parse(input) {
                Ok(parsed) => return Ok(parsed),
                Err(e) => error = e,
            }
        }
        Err(error)
    }
}

/// Like [`one_of`] for two parsers with different outputs that share a target type.
pub fn either<'a, A, B, T, P1, P2>(first: P1, second: P2) -> impl Parser<'a, T>
where
    P1: Parser<'a, A>,
    P2: Parser<'a, B>,
    A: Into<T>,
    B: Into<T>,
{
    move |input: &'a str| -> ParseResult<'a, T> {
        match first.parse(input) {
            Ok(parsed) => Ok(parsed.map(Into::into)),
            Err(_) => second.parse(input).map(|parsed| parsed.map(Into::into)),
        }
    }
}

pub fn optional<'a, T, P>(parser: P) -> impl Parser<'a, Option<T>>
where
    P: Parser<'a, T>,
{
    move |input: &'a str| -> ParseResult<'a, Option<T>> {
        Ok(match parser.parse(input) {
            Ok(parsed) => parsed.map(Some),
            Err(_) => Parsed::new(None, input),
        })
    }
}

pub fn map<'a, A, B, P, F>(parser: P, f: F) -> impl Parser<'a, B>
where
    P: Parser<'a, A>,
    F: Fn(A) -> B,
{
    move |input: &'a str| -> ParseResult<'a, B> { parser.parse(input).map(|parsed| parsed.map(&f)) }
}

/// `map` with a conversion that can reject the node.
pub fn and_then<'a, A, B, P, F>(parser: P, f: F) -> impl Parser<'a, B>
where
    P: Parser<'a, A>,
    F: Fn(A) -> Result<B, ParseError>,
{
    move |input: &'a str| -> ParseResult<'a, B> {
        let parsed = parser.parse(input)?;
        Ok(Parsed::new(f(parsed.ast)?, parsed.rest))
    }
}

/// Repeats until the parser fails or stops consuming input.
pub fn zero_or_more<'a, T, P>(parser: P) -> impl Parser<'a, Vec<T>>
where
    P: Parser<'a, T>,
{
    move |mut input: &'a str| -> ParseResult<'a, Vec<T>> {
        let mut asts = Vec::new();
        while let Ok(parsed) = parser.parse(input) {
            if parsed.rest.len() == input.len() {
                break;
            }
            asts.push(parsed.ast);
            input = parsed.rest;
        }
        Ok(Parsed::new(asts, input))
    }
}

pub fn one_or_more<'a, T, P>(parser: P) -> impl Parser<'a, Vec<T>>
where
    P: Parser<'a, T>,
{
    move |input: &'a str| -> ParseResult<'a, Vec<T>> {
        let first = parser.parse(input)?;
        let mut asts = vec![first.ast];
        let mut rest = first.rest;
        while let Ok(parsed) = parser.parse(rest) {
            if parsed.rest.len() == rest.len() {
                break;
            }
            asts.push(parsed.ast);
            rest = parsed.rest;
        }
        Ok(Parsed::new(asts, rest))
    }
}

/// Any single character.
pub fn item<'a>() -> impl Parser<'a, Item> {
    move |input: &'a str| -> ParseResult<'a, Item> {
        let mut chars = input.chars();
        match chars.next() {
            Some(c) => Ok(Parsed::new(Item(c), chars.as_str())),
            None => Err(ParseError::UnexpectedEof),
        }
    }
}

pub fn literal<'a>(expected: &str) -> impl Parser<'a, Literal> {
    let expected = expected.to_string();
    move |input: &'a str| -> ParseResult<'a, Literal> {
        if let Some(rest) = input.strip_prefix(expected.as_str()) {
            return Ok(Parsed::new(Literal(expected.clone()), rest));
        }
        if input.chars().count() < expected.chars().count() {
            Err(ParseError::UnexpectedEof)
        } else {
            Err(ParseError::ExpectedLiteral(expected.clone()))
        }
    }
}

fn compile_anchored(pattern: &str) -> Result<Regex, String> {
    static CACHE: OnceLock<Mutex<HashMap<String, Regex>>> = OnceLock::new();

    let anchored = format!("^(?:{})", pattern);
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    if let Some(re) = cache.lock().ok().and_then(|guard| guard.get(&anchored).cloned()) {
        return Ok(re);
    }

    let re = Regex::new(&anchored).map_err(|e| e.to_string())?;
    if let Ok(mut guard) = cache.lock() {
        guard.insert(anchored, re.clone());
    }
    Ok(re)
}

/// Matches `pattern` at the start of the input. Unmatched capture groups come
/// back as empty strings.
pub fn regex<'a>(pattern: &str, message: &str) -> impl Parser<'a, RegexMatch> {
    let pattern = pattern.to_string();
    let compiled = compile_anchored(&pattern);
    let message = message.to_string();

    move |input: &'a str| -> ParseResult<'a, RegexMatch> {
        let re = compiled.as_ref().map_err(|reason| ParseError::InvalidPattern {
            pattern: pattern.clone(),
            reason: reason.clone(),
        })?;

        let caps = re
            .captures(input)
            .ok_or_else(|| ParseError::Message(message.clone()))?;
        let end = caps.get(0).map_or(0, |m| m.end());
        let groups = caps
            .iter()
            .skip(1)
            .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
            .collect();

        Ok(Parsed::new(
            RegexMatch {
                value: input[..end].to_string(),
                groups,
            },
            &input[end..],
        ))
    }
}

pub fn surrounded_by<'a, T, S, P, Q>(inner: P, surrounder: Q) -> impl Parser<'a, T>
where
    P: Parser<'a, T>,
    Q: Parser<'a, S>,
{
    move |input: &'a str| -> ParseResult<'a, T> {
        let open = surrounder.parse(input)?;
        let body = inner.parse(open.rest)?;
        let close = surrounder.parse(body.rest)?;
        Ok(Parsed::new(body.ast, close.rest))
    }
}

pub fn skip_whitespace<'a, T, P>(inner: P) -> impl Parser<'a, T>
where
    P: Parser<'a, T>,
{
    surrounded_by(inner, regex(r"\s*", "Expected whitespace"))
}

pub fn end_of_input<'a>() -> impl Parser<'a, Empty> {
    move |input: &'a str| -> ParseResult<'a, Empty> {
        if input.is_empty() {
            Ok(Parsed::new(Empty, input))
        } else {
            let found: String = input.chars().take(10).collect();
            Err(ParseError::Message(format!("Expected end of input, found '{}'", found)))
        }
    }
}

/// Decimal integer with an optional leading minus. Leading zeros are accepted.
pub fn integer<'a>() -> impl Parser<'a, Expr> {
    and_then(regex("-?[0-9]+", "Expected an integer"), |m: RegexMatch| {
        m.value
            .parse::<i64>()
            .map(Expr::Int)
            .map_err(|_| ParseError::InvalidInteger(m.value.clone()))
    })
}

pub fn decimal<'a>() -> impl Parser<'a, Expr> {
    and_then(
        regex(
            r"-?(?:[0-9]+\.[0-9]*|[0-9]*\.[0-9]+)(?:[eE][+-]?[0-9]+)?",
            "Expected a decimal",
        ),
        |m: RegexMatch| {
            m.value
                .parse::<f64>()
                .map(Expr::Float)
                .map_err(|_| ParseError::InvalidFloat(m.value.clone()))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item() {
        let parsed = item().parse("ñx").unwrap();
        assert_eq!(parsed.ast, Item('ñ'));
        assert_eq!(parsed.rest, "x");
        assert_eq!(item().parse(""), Err(ParseError::UnexpectedEof));
    }

    #[test]
    fn test_literal_errors() {
        assert_eq!(literal("abc").parse("ab"), Err(ParseError::UnexpectedEof));
        assert_eq!(
            literal("abc").parse("abd"),
            Err(ParseError::ExpectedLiteral("abc".to_string()))
        );
    }

    #[test]
    fn test_regex_groups() {
        let parsed = regex(r"(\d+)-(\d+)?x?", "Expected a range").parse("12-rest").unwrap();
        assert_eq!(parsed.ast.value, "12-");
        assert_eq!(parsed.ast.groups, vec!["12".to_string(), String::new()]);
        assert_eq!(parsed.rest, "rest");
    }

    #[test]
    fn test_regex_is_anchored() {
        let result = regex("[0-9]+", "Expected digits").parse("a1");
        assert_eq!(result, Err(ParseError::Message("Expected digits".to_string())));
    }

    #[test]
    fn test_invalid_regex_pattern() {
        let result = regex("(", "never").parse("(");
        assert!(matches!(result, Err(ParseError::InvalidPattern { .. })));
    }

    #[test]
    fn test_empty_sequence_and_one_of() {
        assert_eq!(sequence::<Literal>(vec![]).parse("x"), Err(ParseError::NoParsers));
        assert_eq!(one_of::<Literal>(vec![]).parse("x"), Err(ParseError::NoParsers));
    }

    #[test]
    fn test_one_of_reports_last_failure() {
        let parser = one_of(vec![literal("a").boxed(), literal("b").boxed()]);
        assert_eq!(parser.parse("c"), Err(ParseError::ExpectedLiteral("b".to_string())));
        assert_eq!(parser.parse("b!").unwrap().rest, "!");
    }

    #[test]
    fn test_zero_or_more_stops_without_progress() {
        let parsed = zero_or_more(regex("a*", "")).parse("aab").unwrap();
        assert_eq!(parsed.ast.len(), 1);
        assert_eq!(parsed.rest, "b");
    }

    #[test]
    fn test_integer_and_decimal() {
        let parsed = integer().parse("-1234 a").unwrap();
        assert_eq!(parsed.ast, Expr::Int(-1234));
        assert_eq!(parsed.rest, " a");

        assert_eq!(integer().parse("0154").unwrap().ast, Expr::Int(154));
        assert!(matches!(
            integer().parse("99999999999999999999"),
            Err(ParseError::InvalidInteger(_))
        ));

        assert_eq!(decimal().parse("2.5e2;").unwrap().ast, Expr::Float(250.0));
        assert_eq!(decimal().parse(".5").unwrap().ast, Expr::Float(0.5));
        assert!(decimal().parse("12").is_err());
    }
}
