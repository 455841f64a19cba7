// prelude.rs - Convenient re-exports for the idiomatic API.
//
//! # Prelude
//!
//! ```
//! use edregex::prelude::*;
//!
//! let re = Regex::new(r"[0-9]+").unwrap();
//! let m = re.find("answer: 42").unwrap();
//! assert_eq!(m.as_str(), "42");
//! ```

pub use crate::api::{Captures, CapturesIter, FindIter, Match, Regex, RegexBuilder, Translation};
pub use crate::error::{CompileError, ErrorKind, ReplaceError};
pub use crate::options::{MatchOptions, SearchFlags};
pub use crate::regsyntax::Dialect;
