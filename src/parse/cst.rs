use crate::lex::token::{Token, TokenType};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CstError {
    #[error("Unbalanced delimiter '{found}' at {line}:{column}: {reason}")]
    Unbalanced {
        found: String,
        line: usize,
        column: usize,
        reason: String,
    },
}

/// Concrete syntax tree node. The root carries no token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cst {
    token: Option<Token>,
    children: Vec<Cst>,
}

impl Cst {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(token: Token) -> Self {
        Self {
            token: Some(token),
            children: Vec::new(),
        }
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn children(&self) -> &[Cst] {
        &self.children
    }

    pub fn child(&mut self, cst: Cst) -> &mut Cst {
        self.children.push(cst);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn child_token(&mut self, token: Token) -> &mut Cst {
        self.child(Cst::new(token))
    }

    /// Child at `i`, wrapping around; negative indices count from the end.
    pub fn ith(&self, i: isize) -> Option<&Cst> {
        if self.children.is_empty() {
            return None;
        }
        let index = i.rem_euclid(self.children.len() as isize) as usize;
        self.children.get(index)
    }

    /// Groups a token stream by bracket nesting. Each opener owns the tokens up
    /// to and including its closer. EOF tokens are dropped.
    pub fn from_tokens(tokens: &[Token]) -> Result<Self, CstError> {
        // Stack of open groups; index 0 is the root.
        let mut stack: Vec<Cst> = vec![Cst::root()];

        for token in tokens.iter().filter(|t| t.kind != TokenType::Eof) {
            if token.kind.is_opening_delimiter() {
                stack.push(Cst::new(token.clone()));
            } else if token.kind.is_closing_delimiter() {
                if stack.len() == 1 {
                    return Err(unbalanced(token, "no matching opener"));
                }
                let mut group = stack.pop().unwrap_or_default();
                let expected = group.token.as_ref().and_then(|t| t.kind.closer());
                if expected != Some(token.kind) {
                    return Err(unbalanced(token, "does not close the innermost group"));
                }
                group.child_token(token.clone());
                if let Some(parent) = stack.last_mut() {
                    parent.child(group);
                }
            } else if let Some(current) = stack.last_mut() {
                current.child_token(token.clone());
            }
        }

        if stack.len() > 1 {
            let open = stack.pop().and_then(|g| g.token).unwrap_or_else(|| {
                Token::new(TokenType::Eof, "", 0, 0)
            });
            return Err(unbalanced(&open, "never closed"));
        }

        Ok(stack.pop().unwrap_or_default())
    }

    /// Graphviz rendering, nodes numbered breadth first.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph CST {\n");
        let mut pending: VecDeque<(usize, &Cst)> = VecDeque::new();
        let mut next_id = 1;
        pending.push_back((0, self));

        while let Some((id, node)) = pending.pop_front() {
            let label = match &node.token {
                Some(token) if token.value.is_empty() => token.kind.to_string(),
                Some(token) => format!("{}: {}", token.kind, escape_label(&token.value)),
                None => "ROOT".to_string(),
            };
            out.push_str(&format!("  {} [label=\"{}\"]\n", id, label));

            for child in &node.children {
                out.push_str(&format!("  {} -> {}\n", id, next_id));
                pending.push_back((next_id, child));
                next_id += 1;
            }
        }

        out.push_str("}\n");
        out
    }
}

/// Escapes text for a double-quoted DOT string. Backslashes go first.
fn escape_label(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unbalanced(token: &Token, reason: &str) -> CstError {
    CstError::Unbalanced {
        found: token.value.clone(),
        line: token.line,
        column: token.column,
        reason: reason.to_string(),
    }
}

impl fmt::Display for Cst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Lexer;

    fn tree(source: &str) -> Result<Cst, CstError> {
        let tokens = Lexer::new(source).unwrap().tokenize().unwrap();
        Cst::from_tokens(&tokens)
    }

    #[test]
    fn test_ith_wraps_around() {
        let mut root = Cst::root();
        assert!(root.ith(0).is_none());
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            root.child_token(Token::new(TokenType::Identifier, *name, 1, i + 1));
        }
        let value = |i| root.ith(i).and_then(|c| c.token()).map(|t| t.value.clone());
        assert_eq!(value(0).as_deref(), Some("a"));
        assert_eq!(value(-1).as_deref(), Some("c"));
        assert_eq!(value(4).as_deref(), Some("b"));
        assert_eq!(value(-4).as_deref(), Some("c"));
    }

    #[test]
    fn test_groups_by_brackets() {
        let cst = tree("a = (1 + [b]);").unwrap();
        // a, =, ( ... ), ;
        assert_eq!(cst.children().len(), 4);
        let group = &cst.children()[2];
        assert_eq!(group.token().unwrap().kind, TokenType::LeftParen);
        // 1, +, [ ... ], )
        assert_eq!(group.children().len(), 4);
        assert_eq!(group.children()[2].children().len(), 2);
        assert_eq!(group.ith(-1).unwrap().token().unwrap().kind, TokenType::RightParen);
    }

    #[test]
    fn test_unbalanced_delimiters() {
        assert!(matches!(tree("a = 1);"), Err(CstError::Unbalanced { column: 6, .. })));
        assert!(matches!(tree("{ (a }"), Err(CstError::Unbalanced { .. })));
        assert!(matches!(tree("{ a"), Err(CstError::Unbalanced { column: 1, .. })));
    }

    #[test]
    fn test_dot_output() {
        let cst = tree("s = \"hi\";").unwrap();
        let dot = cst.to_dot();
        assert!(dot.starts_with("digraph CST {\n"));
        assert!(dot.contains("0 [label=\"ROOT\"]"));
        assert!(dot.contains("1 [label=\"IDENTIFIER: s\"]"));
        assert!(dot.contains("3 [label=\"STRING: \\\"hi\\\"\"]"));
        assert!(dot.contains("0 -> 4"));
        assert!(dot.ends_with("}\n"));
        assert_eq!(cst.to_string(), dot);
    }

    #[test]
    fn test_dot_escapes_backslashes() {
        let cst = tree(r#"c = '\"';"#).unwrap();
        let dot = cst.to_dot();
        assert!(dot.contains(r#"3 [label="CHAR: '\\\"'"]"#));
        assert!(!dot.contains(r#"'\\"'"#));
    }
}
