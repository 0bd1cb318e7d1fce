use crate::lex::token::{Token, TokenRule, TokenType};
use crate::lex::LexError;
use std::collections::HashMap;

/// Rules grouped by the token kind they produce.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    rules: HashMap<TokenType, Vec<TokenRule>>,
}

impl TokenRegistry {
    pub fn builder() -> TokenRegistryBuilder {
        TokenRegistryBuilder::default()
    }

    /// Longest match among the rules registered for `kind`. Ties go to the
    /// rule registered first.
    pub fn produce(&self, kind: TokenType, input: &str, line: usize, column: usize) -> Option<Token> {
        let mut selected: Option<Token> = None;
        for rule in self.rules.get(&kind).into_iter().flatten() {
            if let Some(token) = rule.produce(input, line, column) {
                if selected.as_ref().map_or(true, |s| token.len() > s.len()) {
                    selected = Some(token);
                }
            }
        }
        selected
    }

    pub fn rule_count(&self, kind: TokenType) -> usize {
        self.rules.get(&kind).map_or(0, Vec::len)
    }

    /// The full osta token table.
    pub fn standard() -> Result<Self, LexError> {
        let mut builder = Self::builder();
        for kind in TokenType::ALL.iter().copied().filter(|k| k.keyword().is_some()) {
            builder = builder.register_keyword(kind);
        }

        builder
            // Literals
            .register_pattern(TokenType::Identifier, "[a-zA-Z_][a-zA-Z0-9_]*")
            .register_pattern(TokenType::Integer, "-?[0-9]+")
            .register_pattern(TokenType::Integer, "-?0[bB][01]+")
            .register_pattern(TokenType::Integer, "-?0[oO][0-7]+")
            .register_pattern(TokenType::Integer, "-?0[xX][0-9a-fA-F]+")
            .register_pattern(TokenType::Float, r"-?[0-9]+\.[0-9]+")
            .register_pattern(TokenType::Float, r"-?[0-9]+\.[0-9]+[eE][+-]?[0-9]+")
            .register_pattern(TokenType::Str, r#""(?:[^"\\]|\\.)*""#)
            .register_pattern(TokenType::Char, r"'(?:[^'\\]|\\.)'")
            // Delimiters
            .register_pattern(TokenType::LeftParen, r"\(")
            .register_pattern(TokenType::RightParen, r"\)")
            .register_pattern(TokenType::LeftBrace, r"\{")
            .register_pattern(TokenType::RightBrace, r"\}")
            .register_pattern(TokenType::LeftBracket, r"\[")
            .register_pattern(TokenType::RightBracket, r"\]")
            .register_pattern(TokenType::Comma, ",")
            .register_pattern(TokenType::Semicolon, ";")
            .register_pattern(TokenType::Colon, ":")
            .register_pattern(TokenType::Dot, r"\.")
            .register_pattern(TokenType::Question, r"\?")
            .register_pattern(TokenType::Exclamation, "!")
            // Operators
            .register_pattern(TokenType::Plus, r"\+")
            .register_pattern(TokenType::Minus, "-")
            .register_pattern(TokenType::Star, r"\*")
            .register_pattern(TokenType::Slash, "/")
            .register_pattern(TokenType::Percent, "%")
            .register_pattern(TokenType::Ampersand, "&")
            .register_pattern(TokenType::Pipe, r"\|")
            .register_pattern(TokenType::Caret, r"\^")
            .register_pattern(TokenType::Tilde, "~")
            .register_pattern(TokenType::LeftShift, "<<")
            .register_pattern(TokenType::RightShift, ">>")
            .register_pattern(TokenType::ArithmeticRightShift, ">>>")
            // Assignment
            .register_pattern(TokenType::Equal, "=")
            .register_pattern(TokenType::PlusEqual, r"\+=")
            .register_pattern(TokenType::MinusEqual, "-=")
            .register_pattern(TokenType::StarEqual, r"\*=")
            .register_pattern(TokenType::SlashEqual, "/=")
            .register_pattern(TokenType::PercentEqual, "%=")
            .register_pattern(TokenType::AmpersandEqual, "&=")
            .register_pattern(TokenType::PipeEqual, r"\|=")
            .register_pattern(TokenType::CaretEqual, r"\^=")
            .register_pattern(TokenType::LeftShiftEqual, "<<=")
            .register_pattern(TokenType::RightShiftEqual, ">>=")
            .register_pattern(TokenType::ArithmeticRightShiftEqual, ">>>=")
            // Comparison
            .register_pattern(TokenType::EqualEqual, "==")
            .register_pattern(TokenType::NotEqual, "!=")
            .register_pattern(TokenType::Less, "<")
            .register_pattern(TokenType::LessEqual, "<=")
            .register_pattern(TokenType::Greater, ">")
            .register_pattern(TokenType::GreaterEqual, ">=")
            // Misc
            .register_pattern(TokenType::Arrow, "->")
            .build()
    }
}

/// Collects rules and compiles them in `build`, so a bad pattern surfaces
/// once instead of at every call site.
#[derive(Debug, Default)]
pub struct TokenRegistryBuilder {
    rules: Vec<PendingRule>,
}

#[derive(Debug)]
enum PendingRule {
    Compiled(TokenRule),
    Keyword(TokenType),
    Pattern(TokenType, String),
}

impl TokenRegistryBuilder {
    pub fn register(mut self, rule: TokenRule) -> Self {
        self.rules.push(PendingRule::Compiled(rule));
        self
    }

    pub fn register_keyword(mut self, kind: TokenType) -> Self {
        self.rules.push(PendingRule::Keyword(kind));
        self
    }

    pub fn register_pattern(mut self, kind: TokenType, regex: &str) -> Self {
        self.rules.push(PendingRule::Pattern(kind, regex.to_string()));
        self
    }

    pub fn register_all(self, rules: impl IntoIterator<Item = TokenRule>) -> Self {
        rules.into_iter().fold(self, Self::register)
    }

    pub fn build(self) -> Result<TokenRegistry, LexError> {
        let mut rules: HashMap<TokenType, Vec<TokenRule>> = HashMap::new();
        for pending in self.rules {
            let rule = match pending {
                PendingRule::Compiled(rule) => rule,
                PendingRule::Keyword(kind) => TokenRule::keyword(kind)?,
                PendingRule::Pattern(kind, regex) => TokenRule::new(kind, &regex)?,
            };
            rules.entry(rule.kind()).or_default().push(rule);
        }
        tracing::debug!("Built token registry with {} token kinds", rules.len());
        Ok(TokenRegistry { rules })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_every_kind_but_eof() {
        let registry = TokenRegistry::standard().unwrap();
        for kind in TokenType::ALL.iter().copied().filter(|k| *k != TokenType::Eof) {
            assert!(registry.rule_count(kind) > 0, "no rule for {}", kind);
        }
        assert_eq!(registry.rule_count(TokenType::Eof), 0);
    }

    #[test]
    fn test_longest_rule_wins_within_kind() {
        let registry = TokenRegistry::standard().unwrap();
        let token = registry.produce(TokenType::Integer, "0x1F;", 1, 1).unwrap();
        assert_eq!(token.value, "0x1F");

        let token = registry.produce(TokenType::Float, "1.5e-3 ", 1, 1).unwrap();
        assert_eq!(token.value, "1.5e-3");
    }

    #[test]
    fn test_unregistered_kind_produces_nothing() {
        let registry = TokenRegistry::builder()
            .register_pattern(TokenType::Plus, r"\+")
            .build()
            .unwrap();
        assert!(registry.produce(TokenType::Minus, "-", 1, 1).is_none());
        assert!(registry.produce(TokenType::Plus, "+", 1, 1).is_some());
    }

    #[test]
    fn test_register_all_keeps_order() {
        let registry = TokenRegistry::builder()
            .register_all(vec![
                TokenRule::new(TokenType::Identifier, "[a-z]+").unwrap(),
                TokenRule::new(TokenType::Identifier, "[a-z]").unwrap(),
            ])
            .build()
            .unwrap();
        assert_eq!(registry.rule_count(TokenType::Identifier), 2);
        let token = registry.produce(TokenType::Identifier, "abc", 1, 1).unwrap();
        assert_eq!(token.value, "abc");
    }

    #[test]
    fn test_build_fails_on_bad_pattern() {
        let result = TokenRegistry::builder()
            .register_pattern(TokenType::Identifier, "(")
            .build();
        assert!(result.is_err());
    }
}
