//! Error and diagnostic types for BLK parsing.
//!
//! BLK error handling is two-tiered: [`BlkError`] covers failures that abort
//! the enclosing block (and propagate to the document loader), while
//! [`Diagnostic`] records the many tolerated anomalies where parsing continues
//! with a defined fallback. Each diagnostic carries its [`FallbackPolicy`] so
//! tests can assert on the exact substitution that happened.

use thiserror::Error;

/// Errors that abort a parse (or a file load).
#[derive(Error, Debug)]
pub enum BlkError {
    /// A structural error at a known 1-based line. The remaining entries of
    /// the enclosing block are not parsed; the failure propagates upward.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The input did not start with `{` (or was empty).
    #[error("document must start with '{{'")]
    NotADocument,

    /// A file could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout blk-core.
pub type Result<T> = std::result::Result<T, BlkError>;

/// The defined fallback applied when a non-fatal anomaly is tolerated.
///
/// Every tolerated anomaly substitutes a concrete, documented value instead of
/// failing the parse; the policy names that substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Unknown enum type or member: the value stores placeholder ids `(0, 0)`.
    EnumPlaceholder,
    /// An array element of the wrong kind is appended anyway; the array's
    /// declared kind stays whatever the first element established.
    ArrayElementKept,
    /// An unrecognized boolean literal reads as `false`.
    BoolFalse,
    /// An unknown escape sequence keeps the raw character.
    RawCharKept,
    /// A `\x` with no hex digit after it is kept as the literal two
    /// characters `\x`.
    LiteralHexKept,
    /// An `#include` that cannot be loaded (or exceeds the depth limit)
    /// contributes zero entries.
    IncludeSkipped,
    /// A hanging `/` outside a comment is treated as whitespace.
    TreatedAsWhitespace,
    /// `s =` not followed by an opening quote leaves the entry empty.
    EntryLeftEmpty,
    /// The `extends` base block was not found; no inheritance occurs.
    BaseBlockMissing,
    /// An empty token was encountered inside an array body.
    EmptyArrayToken,
}

/// A logged, non-fatal parse anomaly. Parsing continued past it with the
/// fallback named by `policy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line where the anomaly was detected.
    pub line: usize,
    /// The fallback that substituted for the malformed input.
    pub policy: FallbackPolicy,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn new(line: usize, policy: FallbackPolicy, message: impl Into<String>) -> Self {
        Diagnostic {
            line,
            policy,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
