// error.rs - Error types for pattern compilation and replacement.

use std::fmt;

use crate::regerror::error_kind_to_message;

/// What went wrong while compiling a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `[` without a closing `]`.
    UnmatchedBracket,
    /// `{` without a matching `}`, or a stray `}`.
    UnmatchedBrace,
    /// `(` / `\(` without a matching close, or a stray close.
    UnmatchedParen,
    /// A quantifier with nothing (or nothing quantifiable) before it.
    EmptyExpression,
    /// Unknown `[:name:]` inside a bracket expression.
    InvalidClassName,
    /// Range whose end sorts before its start.
    InvalidRange,
    /// Malformed or reversed `{n,m}` interval.
    InvalidInterval,
    /// Groups nested too deeply, or too many capture groups.
    LevelOverflow,
    /// Escape with missing digits, missing `}`, or at the end of the pattern.
    BadEscape,
}

/// Compile failure with the pattern byte offset where it was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub offset: usize,
}

impl CompileError {
    pub fn new(kind: ErrorKind, offset: usize) -> CompileError {
        CompileError { kind, offset }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn message(&self) -> &'static str {
        error_kind_to_message(self.kind)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message(), self.offset)
    }
}

impl std::error::Error for CompileError {}

/// Non-fatal problem found while expanding a replacement template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplaceError {
    /// The template referenced a group that did not participate in the
    /// match or does not exist.
    NoSuchCapture(usize),
}

impl fmt::Display for ReplaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplaceError::NoSuchCapture(n) => write!(f, "no such capture: {}", n),
        }
    }
}

impl std::error::Error for ReplaceError {}
