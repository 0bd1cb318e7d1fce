use crate::lex::LexError;
use crate::parse::cst::CstError;
use crate::parse::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OstaError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lexing failed: {0}")]
    LexError(#[from] LexError),

    #[error("Parsing failed: {0}")]
    ParseError(#[from] ParseError),

    #[error("Syntax tree error: {0}")]
    CstError(#[from] CstError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Compilation error in {path}: {source}")]
    SourceError {
        path: String,
        #[source]
        source: Box<OstaError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Io,
    Syntax,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a run that failed with this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl OstaError {
    /// Attaches the offending source file to an error.
    pub fn in_source(path: impl Into<String>, error: impl Into<OstaError>) -> Self {
        OstaError::SourceError {
            path: path.into(),
            source: Box::new(error.into()),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            OstaError::IoError(_) => ErrorCategory::Io,
            OstaError::LexError(LexError::Io(_)) => ErrorCategory::Io,
            OstaError::LexError(LexError::InvalidRule { .. })
            | OstaError::LexError(LexError::NotAKeyword(_))
            | OstaError::LexError(LexError::NothingToRestore) => ErrorCategory::Internal,
            OstaError::LexError(_) | OstaError::ParseError(_) | OstaError::CstError(_) => {
                ErrorCategory::Syntax
            }
            OstaError::SerializationError(_) => ErrorCategory::Internal,
            OstaError::ConfigValidationError { .. }
            | OstaError::InvalidConfigValueError { .. }
            | OstaError::MissingConfigError { .. } => ErrorCategory::Config,
            OstaError::SourceError { source, .. } => source.category(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Syntax => ErrorSeverity::High,
            ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Medium,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            OstaError::SourceError { source, .. } => source.recovery_suggestion(),
            OstaError::MissingConfigError { field } => {
                format!("Set '{}' in osta.toml or pass it on the command line", field)
            }
            OstaError::InvalidConfigValueError { field, .. }
            | OstaError::ConfigValidationError { field, .. } => {
                format!("Check the value of '{}' in your configuration", field)
            }
            _ => match self.category() {
                ErrorCategory::Syntax => {
                    "Fix the source at the reported line and column, then compile again".to_string()
                }
                ErrorCategory::Io => {
                    "Make sure the file exists and the output directory is writable".to_string()
                }
                ErrorCategory::Config => "Review the configuration file".to_string(),
                ErrorCategory::Internal => {
                    "This is a bug in osta; please report it with the input that triggered it"
                        .to_string()
                }
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OstaError::SourceError { path, source } => {
                format!("{}: {}", path, source.user_friendly_message())
            }
            OstaError::LexError(e) => format!("Lexing failed: {}", e),
            OstaError::ParseError(e) => format!("Syntax error: {}", e),
            OstaError::CstError(e) => format!("Syntax error: {}", e),
            OstaError::IoError(e) => format!("File error: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OstaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_errors_are_high_severity() {
        let err = OstaError::in_source("main.osta", ParseError::UnexpectedEof);
        assert_eq!(err.category(), ErrorCategory::Syntax);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.severity().exit_code(), 1);
        assert!(err.user_friendly_message().starts_with("main.osta: Syntax error"));
    }

    #[test]
    fn test_io_errors_are_retryable() {
        let err = OstaError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.severity().exit_code(), 2);
    }

    #[test]
    fn test_missing_config_suggestion_names_field() {
        let err = OstaError::MissingConfigError {
            field: "build.sources".to_string(),
        };
        assert!(err.recovery_suggestion().contains("build.sources"));
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_bad_token_rule_is_critical() {
        let err = OstaError::from(LexError::NothingToRestore);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
