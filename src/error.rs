//! Error types for json2dart
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Fatal errors carry the raw text a caller needs to recover by hand
//! (partial decode records, unformatted code); see [`Error::raw`].

use thiserror::Error;

/// The main error type for json2dart
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Inference Errors
    // ============================================================================
    #[error("Invalid identifier: '{name}'")]
    InvalidIdentifier { name: String },

    #[error("`{method}` variable conflict in class {class}: every candidate name is a field key")]
    VariableNameExhausted {
        class: String,
        method: String,
        raw: String,
    },

    #[error("Invalid sample: {message}")]
    InvalidSample { message: String },

    // ============================================================================
    // Decode Errors
    // ============================================================================
    #[error("Unrecognized field literal at line {line_no}: {line}")]
    DecodeSyntax {
        line_no: usize,
        line: String,
        partial: String,
    },

    #[error("no top class found")]
    NoTopClass { partial: String },

    // ============================================================================
    // Prompt Errors
    // ============================================================================
    #[error("Input closed while waiting for an answer to: {query}")]
    PromptClosed { query: String },

    #[error("{message}")]
    Prompt { message: String },

    // ============================================================================
    // Template Errors
    // ============================================================================
    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // External Collaborators
    // ============================================================================
    #[error("Formatter exited with {}: {output}", exit_status(.code))]
    Formatter {
        code: Option<i32>,
        output: String,
        raw: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid identifier error
    pub fn invalid_identifier(name: impl Into<String>) -> Self {
        Self::InvalidIdentifier { name: name.into() }
    }

    /// Create an invalid sample error
    pub fn invalid_sample(message: impl Into<String>) -> Self {
        Self::InvalidSample {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a prompt error
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::Prompt {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Raw diagnostic text attached to a fatal error, if any
    pub fn raw(&self) -> Option<&str> {
        match self {
            Error::VariableNameExhausted { raw, .. } | Error::Formatter { raw, .. } => Some(raw),
            Error::DecodeSyntax { partial, .. } | Error::NoTopClass { partial } => Some(partial),
            _ => None,
        }
    }

    /// Check if this error means "the file does not exist"
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::FileNotFound { .. } => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

fn exit_status(code: &Option<i32>) -> String {
    code.map_or_else(|| "no status".to_string(), |c| format!("code {c}"))
}

/// Result type alias for json2dart
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::invalid_identifier("1abc");
        assert_eq!(err.to_string(), "Invalid identifier: '1abc'");

        let err = Error::NoTopClass {
            partial: "{}".to_string(),
        };
        assert_eq!(err.to_string(), "no top class found");

        let err = Error::Formatter {
            code: Some(2),
            output: "bad".to_string(),
            raw: String::new(),
        };
        assert_eq!(err.to_string(), "Formatter exited with code 2: bad");
    }

    #[test]
    fn test_raw_diagnostics() {
        let err = Error::Formatter {
            code: None,
            output: String::new(),
            raw: "class A {}".to_string(),
        };
        assert_eq!(err.raw(), Some("class A {}"));

        let err = Error::DecodeSyntax {
            line_no: 3,
            line: "/// * a: `~`".to_string(),
            partial: "{\"A\":{}}".to_string(),
        };
        assert_eq!(err.raw(), Some("{\"A\":{}}"));

        assert!(Error::config("x").raw().is_none());
    }

    #[test]
    fn test_is_not_found() {
        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.is_not_found());
        assert!(Error::FileNotFound {
            path: "a.dart".to_string()
        }
        .is_not_found());
        assert!(!Error::config("x").is_not_found());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
