use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default number of errors stored before further ones are only counted.
pub const MAX_ERRORS: usize = 20;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Diagnostic category, determined by code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Declaration,
    Type,
    Mutability,
    Usage,
}

/// Numeric diagnostic code (E100–E599).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNCLOSED_DELIMITER: Self = Self(101);
    pub const INVALID_LITERAL: Self = Self(102);

    // ── Declarations (E200–E299) ──
    pub const UNKNOWN_TYPE: Self = Self(200);
    pub const DUPLICATE_DECLARATION: Self = Self(201);
    pub const UNKNOWN_IDENTIFIER: Self = Self(202);

    // ── Types (E300–E399) ──
    pub const TYPE_MISMATCH: Self = Self(300);
    pub const WRONG_ARG_COUNT: Self = Self(301);
    pub const UNKNOWN_MEMBER: Self = Self(302);
    pub const NOT_OPTIONAL_CHAIN: Self = Self(303);
    pub const OPERATOR_NOT_APPLICABLE: Self = Self(304);
    pub const UNWRAPPED_OPTIONAL_REQUIRED: Self = Self(305);

    // ── Mutability (E400–E499) ──
    pub const NOT_ASSIGNABLE: Self = Self(400);
    pub const CANNOT_ASSIGN_IMMUTABLE: Self = Self(401);
    pub const MUTATING_ON_IMMUTABLE_RECEIVER: Self = Self(402);

    // ── Usage (E500–E599) ──
    pub const UNUSED_RESULT: Self = Self(500);

    /// Get the category for this code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            200..=299 => ErrorCategory::Declaration,
            300..=399 => ErrorCategory::Type,
            400..=499 => ErrorCategory::Mutability,
            500..=599 => ErrorCategory::Usage,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Returned when text such as `E401` cannot be read back as an [`ErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid diagnostic code '{0}' (expected E followed by digits)")]
pub struct InvalidErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = InvalidErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('E')
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
            .map(ErrorCode)
            .ok_or_else(|| InvalidErrorCode(s.to_string()))
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Declaration => write!(f, "declaration"),
            Self::Type => write!(f, "type"),
            Self::Mutability => write!(f, "mutability"),
            Self::Usage => write!(f, "usage"),
        }
    }
}

/// A structured diagnostic produced by any stage of the checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Source file name.
    pub file: String,
    pub code: ErrorCode,
    pub severity: Severity,
    /// Derived from `code`.
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The source line the span starts on.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Downgrade to a warning.
    pub fn into_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{}:{}: {} {} [{}] {}",
            self.file, self.span, level, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Accumulated diagnostics for one checked file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub total_errors: usize,
    pub total_warnings: usize,
    /// Errors past this count are counted but not stored.
    #[serde(skip, default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    MAX_ERRORS
}

impl Diagnostics {
    /// Create an empty set with the default error cap.
    pub fn empty() -> Self {
        Self::with_limit(MAX_ERRORS)
    }

    /// Create an empty set storing at most `limit` errors.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            total_errors: 0,
            total_warnings: 0,
            limit,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Returns `true` once the error cap is reached.
    pub fn is_full(&self) -> bool {
        self.total_errors >= self.limit
    }

    /// Add a diagnostic, routing it by severity.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.push_error(diagnostic),
            Severity::Warning => self.push_warning(diagnostic),
        }
    }

    /// Add an error, respecting the cap.
    pub fn push_error(&mut self, error: Diagnostic) {
        if self.errors.len() < self.limit {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn push_warning(&mut self, warning: Diagnostic) {
        self.warnings.push(warning);
        self.total_warnings += 1;
    }

    /// Move everything from `other` into `self`.
    pub fn extend(&mut self, other: Diagnostics) {
        // Errors `other` dropped past its own cap still count.
        self.total_errors += other.total_errors.saturating_sub(other.errors.len());
        for error in other.errors {
            self.push_error(error);
        }
        for warning in other.warnings {
            self.push_warning(warning);
        }
    }

    /// All stored diagnostics, errors first.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Codes of the stored errors, in emission order.
    pub fn error_codes(&self) -> Vec<ErrorCode> {
        self.errors.iter().map(|e| e.code).collect()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::empty()
    }
}
