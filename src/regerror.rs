// regerror.rs - Error kind to message conversion.

use crate::error::ErrorKind;

/// Human-readable message for a compile error kind.
pub fn error_kind_to_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::UnmatchedBracket => "unmatched [",
        ErrorKind::UnmatchedBrace => "unmatched { or }",
        ErrorKind::UnmatchedParen => "unmatched ( or )",
        ErrorKind::EmptyExpression => "target of repeat operator is not specified",
        ErrorKind::InvalidClassName => "invalid character class name",
        ErrorKind::InvalidRange => "invalid range in character class",
        ErrorKind::InvalidInterval => "invalid repeat range {lower,upper}",
        ErrorKind::LevelOverflow => "group nesting too deep",
        ErrorKind::BadEscape => "invalid escape sequence",
    }
}
