use crate::lex::LexError;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

macro_rules! token_types {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Every kind of token the osta lexer can produce.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TokenType {
            $($variant),*
        }

        impl TokenType {
            /// All kinds in declaration order: keywords, then primitive types, then literals,
            /// delimiters, operators, comparisons, assignments, misc and EOF.
            pub const ALL: &'static [TokenType] = &[$(TokenType::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(TokenType::$variant => $name),*
                }
            }
        }
    };
}

token_types! {
    // Keywords
    Struct => "STRUCT", Trait => "TRAIT", Enum => "ENUM",
    Auto => "AUTO", Static => "STATIC", Const => "CONST",
    If => "IF", Else => "ELSE",
    While => "WHILE", For => "FOR", Do => "DO",
    Break => "BREAK", Continue => "CONTINUE", Return => "RETURN", Defer => "DEFER",
    // Types
    I8 => "I8", I16 => "I16", I32 => "I32", I64 => "I64", I128 => "I128",
    U8 => "U8", U16 => "U16", U32 => "U32", U64 => "U64", U128 => "U128",
    F32 => "F32", F64 => "F64",
    Usize => "USIZE",
    // Literals
    Identifier => "IDENTIFIER", Integer => "INTEGER", Float => "FLOAT", Str => "STRING", Char => "CHAR",
    // Delimiters
    LeftParen => "LEFT_PAREN", RightParen => "RIGHT_PAREN",
    LeftBrace => "LEFT_BRACE", RightBrace => "RIGHT_BRACE",
    LeftBracket => "LEFT_BRACKET", RightBracket => "RIGHT_BRACKET",
    Comma => "COMMA", Semicolon => "SEMICOLON", Colon => "COLON", Dot => "DOT",
    Question => "QUESTION", Exclamation => "EXCLAMATION",
    // Operators
    Plus => "PLUS", Minus => "MINUS", Star => "STAR", Slash => "SLASH", Percent => "PERCENT",
    Ampersand => "AMPERSAND", Pipe => "PIPE", Caret => "CARET", Tilde => "TILDE",
    LeftShift => "LEFT_SHIFT", RightShift => "RIGHT_SHIFT", ArithmeticRightShift => "ARITHMETIC_RIGHT_SHIFT",
    // Comparison
    EqualEqual => "EQUAL_EQUAL", NotEqual => "NOT_EQUAL",
    Less => "LESS", LessEqual => "LESS_EQUAL", Greater => "GREATER", GreaterEqual => "GREATER_EQUAL",
    // Assignment
    Equal => "EQUAL", PlusEqual => "PLUS_EQUAL", MinusEqual => "MINUS_EQUAL",
    StarEqual => "STAR_EQUAL", SlashEqual => "SLASH_EQUAL", PercentEqual => "PERCENT_EQUAL",
    AmpersandEqual => "AMPERSAND_EQUAL", PipeEqual => "PIPE_EQUAL", CaretEqual => "CARET_EQUAL",
    LeftShiftEqual => "LEFT_SHIFT_EQUAL", RightShiftEqual => "RIGHT_SHIFT_EQUAL",
    ArithmeticRightShiftEqual => "ARITHMETIC_RIGHT_SHIFT_EQUAL",
    // Misc
    Arrow => "ARROW",
    Eof => "EOF",
}

impl TokenType {
    /// Lowercase spelling for keyword and primitive type kinds.
    pub fn keyword(self) -> Option<String> {
        if self <= TokenType::Usize {
            Some(self.name().to_ascii_lowercase())
        } else {
            None
        }
    }

    pub fn is_opening_delimiter(self) -> bool {
        matches!(
            self,
            TokenType::LeftParen | TokenType::LeftBrace | TokenType::LeftBracket
        )
    }

    pub fn is_closing_delimiter(self) -> bool {
        matches!(
            self,
            TokenType::RightParen | TokenType::RightBrace | TokenType::RightBracket
        )
    }

    /// The closer that balances an opening delimiter.
    pub fn closer(self) -> Option<TokenType> {
        match self {
            TokenType::LeftParen => Some(TokenType::RightParen),
            TokenType::LeftBrace => Some(TokenType::RightBrace),
            TokenType::LeftBracket => Some(TokenType::RightBracket),
            _ => None,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TokenType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenType,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenType, value: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            column,
        }
    }

    /// Length of the lexeme in characters.
    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token{{type={}, value='{}', line={}, column={}}}",
            self.kind, self.value, self.line, self.column
        )
    }
}

/// A single lexing rule: a regex anchored at the start of the input.
#[derive(Debug, Clone)]
pub struct TokenRule {
    kind: TokenType,
    pattern: Regex,
}

impl TokenRule {
    pub fn new(kind: TokenType, regex: &str) -> Result<Self, LexError> {
        let body = regex.strip_prefix('^').unwrap_or(regex);
        let pattern = Regex::new(&format!("^(?:{})", body)).map_err(|e| LexError::InvalidRule {
            kind,
            pattern: regex.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { kind, pattern })
    }

    /// Rule matching the lowercase spelling of a keyword or primitive type.
    pub fn keyword(kind: TokenType) -> Result<Self, LexError> {
        let spelling = kind.keyword().ok_or(LexError::NotAKeyword(kind))?;
        Self::new(kind, &regex::escape(&spelling))
    }

    pub fn kind(&self) -> TokenType {
        self.kind
    }

    /// Matches at the start of `input`. Empty matches never produce a token.
    pub fn produce(&self, input: &str, line: usize, column: usize) -> Option<Token> {
        self.pattern
            .find(input)
            .filter(|m| !m.as_str().is_empty())
            .map(|m| Token::new(self.kind, m.as_str(), line, column))
    }
}
