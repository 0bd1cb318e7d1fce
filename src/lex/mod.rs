pub mod registry;
pub mod token;

use crate::text::{Position, SourceText};
use registry::TokenRegistry;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use token::{Token, TokenType};

/// Characters of upcoming input quoted in an unexpected-token error.
const ERROR_SLICE_LEN: usize = 10;

#[derive(Error, Debug)]
pub enum LexError {
    #[error("Invalid token rule for {kind} ({pattern}): {reason}")]
    InvalidRule {
        kind: TokenType,
        pattern: String,
        reason: String,
    },

    #[error("{0} has no keyword spelling")]
    NotAKeyword(TokenType),

    #[error("Unexpected token at {line}:{column}. Expected {} but got '...{found}...'.", describe_expected(.expected))]
    UnexpectedToken {
        expected: Vec<TokenType>,
        found: String,
        line: usize,
        column: usize,
    },

    #[error("No saved lexer position to restore")]
    NothingToRestore,

    #[error("Could not read source: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_expected(expected: &[TokenType]) -> String {
    match expected {
        [single] => single.to_string(),
        many => {
            let names: Vec<&str> = many.iter().map(|k| k.name()).collect();
            format!("one of [{}]", names.join(", "))
        }
    }
}

/// Pull-based lexer. Callers ask for the kinds they accept next, so the same
/// input can be read differently depending on parser state.
#[derive(Debug)]
pub struct Lexer {
    text: SourceText,
    registry: Arc<TokenRegistry>,
    backup: Vec<Position>,
    returned: Vec<Token>,
}

impl Lexer {
    pub fn new(source: impl Into<String>) -> Result<Self, LexError> {
        Ok(Self::with_registry(source, Arc::new(TokenRegistry::standard()?)))
    }

    pub fn with_registry(source: impl Into<String>, registry: Arc<TokenRegistry>) -> Self {
        Self {
            text: SourceText::new(source),
            registry,
            backup: Vec::new(),
            returned: Vec::new(),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LexError> {
        let source = std::fs::read_to_string(path)?;
        Self::new(source)
    }

    fn skip_whitespace(&mut self) {
        let skipped = self
            .text
            .remaining()
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(self.text.remaining().len());
        self.text.advance(skipped);
    }

    /// Next token among `kinds`, longest match first. Ties go to the kind
    /// listed earlier. `None` when nothing matches; the cursor is then left
    /// where it was, leading whitespace included.
    pub fn next_of(&mut self, kinds: &[TokenType]) -> Option<Token> {
        if let Some(token) = self.returned.pop() {
            return Some(token);
        }

        let start = self.text.position();
        self.skip_whitespace();
        if self.text.is_empty() {
            return Some(Token::new(
                TokenType::Eof,
                "",
                self.text.line(),
                self.text.column(),
            ));
        }

        let (line, column) = (self.text.line(), self.text.column());
        let mut selected: Option<Token> = None;
        for kind in kinds {
            if let Some(token) = self.registry.produce(*kind, self.text.remaining(), line, column) {
                if selected.as_ref().map_or(true, |s| token.len() > s.len()) {
                    selected = Some(token);
                }
            }
        }

        let Some(token) = selected else {
            self.text.set_position(start);
            return None;
        };
        self.text.advance(token.value.len());
        tracing::trace!("Lexed {}", token);
        Some(token)
    }

    /// Like [`next_of`](Self::next_of), but a miss is an error located at the
    /// first character that is not whitespace.
    pub fn expect_of(&mut self, kinds: &[TokenType]) -> Result<Token, LexError> {
        if let Some(token) = self.next_of(kinds) {
            return Ok(token);
        }

        let start = self.text.position();
        self.skip_whitespace();
        let error = LexError::UnexpectedToken {
            expected: kinds.to_vec(),
            found: self.text.slice(ERROR_SLICE_LEN),
            line: self.text.line(),
            column: self.text.column(),
        };
        self.text.set_position(start);
        Err(error)
    }

    /// Next token of any kind.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.expect_of(TokenType::ALL)
    }

    /// Every remaining token, ending with EOF.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenType::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tracing::debug!("Tokenized {} tokens", tokens.len());
        Ok(tokens)
    }

    pub fn slice(&self, length: usize) -> String {
        self.text.slice(length)
    }

    pub fn line(&self) -> usize {
        self.text.line()
    }

    pub fn column(&self) -> usize {
        self.text.column()
    }

    pub fn backup(&mut self) {
        self.backup.push(self.text.position());
    }

    pub fn restore(&mut self) -> Result<(), LexError> {
        let position = self.backup.pop().ok_or(LexError::NothingToRestore)?;
        self.text.set_position(position);
        Ok(())
    }

    /// Pushes a token back; pushed tokens are handed out again LIFO.
    pub fn return_token(&mut self, token: Token) {
        self.returned.push(token);
    }

    pub fn has_next(&mut self) -> bool {
        if !self.returned.is_empty() {
            return true;
        }
        self.skip_whitespace();
        !self.text.is_empty()
    }
}
