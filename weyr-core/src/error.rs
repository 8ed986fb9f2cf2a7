//! Structured errors
//!
//! Errors never crash the system. They are values that propagate through
//! computations and carry a machine-readable code plus a suggestion.

use crate::NumberError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const UNDEFINED_FUNC: &str = "UNDEFINED_FUNC";
    pub const UNDEFINED_FIELD: &str = "UNDEFINED_FIELD";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const ARG_TYPE: &str = "ARG_TYPE";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
    // Matrix and spectrum codes
    pub const NOT_SQUARE: &str = "NOT_SQUARE";
    pub const NOT_EIGENVALUE: &str = "NOT_EIGENVALUE";
    pub const IRRATIONAL_SPECTRUM: &str = "IRRATIONAL_SPECTRUM";
    pub const DIMENSION_LIMIT: &str = "DIMENSION_LIMIT";
    pub const INVARIANT: &str = "INVARIANT";
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Input was rejected; the caller can fix it
    Error,
    /// Internal arithmetic is inconsistent; the result cannot be trusted
    Fatal,
}

/// Structured error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeyrError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Propagation notes, innermost first
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,

    pub severity: Severity,
}

impl WeyrError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            notes: Vec::new(),
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }

    // ========== Common Error Constructors ==========

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
            .with_suggestion("Use integers, fractions like 1/3, or finite decimals")
    }

    pub fn div_zero() -> Self {
        Self::new(codes::DIV_ZERO, "Division by zero")
            .with_suggestion("Ensure divisor is not zero")
    }

    pub fn undefined_func(name: &str) -> Self {
        Self::new(codes::UNDEFINED_FUNC, format!("Unknown function: {}", name))
            .with_suggestion("Use list_functions to see available functions")
    }

    pub fn undefined_field(name: &str) -> Self {
        Self::new(codes::UNDEFINED_FIELD, format!("Undefined field: {}", name))
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(codes::TYPE_ERROR, format!("Expected {}, got {}", expected, got))
    }

    pub fn arg_count(func: &str, expected: usize, got: usize) -> Self {
        Self::new(codes::ARG_COUNT,
            format!("{}() expects {} arguments, got {}", func, expected, got))
            .with_suggestion(format!("Use help('{}') for usage", func))
    }

    pub fn arg_type(func: &str, arg: &str, expected: &str, got: &str) -> Self {
        Self::new(codes::ARG_TYPE,
            format!("{}() argument '{}': expected {}, got {}", func, arg, expected, got))
    }

    pub fn domain_error(details: impl Into<String>) -> Self {
        Self::new(codes::DOMAIN_ERROR, format!("Domain error: {}", details.into()))
    }

    pub fn not_square(func: &str, rows: usize, cols: usize) -> Self {
        Self::new(codes::NOT_SQUARE,
            format!("{}: requires square matrix, got {}×{}", func, rows, cols))
    }

    pub fn not_eigenvalue(value: impl std::fmt::Display) -> Self {
        Self::new(codes::NOT_EIGENVALUE,
            format!("{} is not an eigenvalue: A - λI has full rank", value))
            .with_suggestion("Pass a value from eigenvalues(matrix)")
    }

    pub fn irrational_spectrum(residual_degree: usize) -> Self {
        Self::new(codes::IRRATIONAL_SPECTRUM,
            format!("characteristic polynomial has an irreducible factor of degree {} over the rationals",
                residual_degree))
            .with_suggestion("Only matrices whose eigenvalues are all rational are supported")
    }

    pub fn dimension_limit(n: usize, limit: usize) -> Self {
        Self::new(codes::DIMENSION_LIMIT,
            format!("matrix dimension {} exceeds exact arithmetic limit {}", n, limit))
            .with_suggestion("Raise WEYR_EXACT_LIMIT if the cost is acceptable")
    }

    pub fn invariant(details: impl Into<String>) -> Self {
        Self::new(codes::INVARIANT, format!("Invariant violated: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
            .with_severity(Severity::Fatal)
    }
}

impl std::fmt::Display for WeyrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for WeyrError {}

impl From<NumberError> for WeyrError {
    fn from(err: NumberError) -> Self {
        match err {
            NumberError::ParseError(s) => Self::parse_error(s),
            NumberError::DivisionByZero => Self::div_zero(),
        }
    }
}
