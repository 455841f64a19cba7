//! # edregex
//!
//! Byte-oriented regular expression engine for text editors, with
//! SIMD-accelerated literal search via [`memchr`](https://crates.io/crates/memchr).
//!
//! Patterns are written in one of six dialects (Brief, Unix, Extended, Perl,
//! Ruby, Tre), compiled into a linked operation list and run by a
//! backtracking VM. A companion replacement engine expands `\1`, `&`, `$&`
//! style templates against a match.
//!
//! ## Quick Start
//!
//! ```rust
//! use edregex::prelude::*;
//!
//! let re = Regex::new(r"[0-9]+").unwrap();
//! let m = re.find("abc123def").unwrap();
//! assert_eq!(m.as_str(), "123");
//! assert_eq!(m.range(), 3..6);
//! assert_eq!(re.replace("abc123def", "<$&>"), "abc<123>def");
//! ```
//!
//! For dialects and flags, use [`RegexBuilder`](api::RegexBuilder):
//!
//! ```rust
//! use edregex::prelude::*;
//!
//! let re = Regex::builder(r"\(a\)\(b\)")
//!     .dialect(Dialect::Brief)
//!     .build()
//!     .unwrap();
//! let caps = re.captures("xaby").unwrap();
//! assert_eq!(caps.get(0).unwrap().as_str(), "ab");
//! assert_eq!(caps.get(1).unwrap().as_str(), "a");
//! assert_eq!(caps.get(2).unwrap().as_str(), "b");
//! ```
//!
//! ## Low-Level API
//!
//! The compiler, VM and replacement engine are usable directly:
//!
//! ```rust
//! use edregex::options::{CompileOptions, MatchOptions};
//! use edregex::regcomp::re_compile;
//! use edregex::regexec::re_exec;
//! use edregex::regrpl::{compile_template, execute};
//! use edregex::regsyntax::Dialect;
//!
//! let prog = re_compile(b"[0-9]+", &CompileOptions::new(Dialect::Unix)).unwrap();
//! let text = b"abc123def";
//! let m = re_exec(&prog, text, 0, &MatchOptions::default()).unwrap();
//! assert_eq!((m.start, m.end), (3, 6));
//!
//! let tpl = compile_template(b"<$&>", Dialect::Perl);
//! assert_eq!(execute(&tpl, &m, text), "<123>");
//! ```
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`regparse`] | Pattern scanning: escapes, classes, intervals |
//! | [`regcomp`] | Pattern-to-program compiler |
//! | [`reglink`] | Jump resolution for alternation and loops |
//! | [`regexec`] | Matching VM and search driver |
//! | [`regkmp`] | KMP and memchr literal search |
//! | [`regrpl`] | Replacement template compiler and executor |
//! | [`regint`] | Opcodes, operations, programs, bitsets |
//! | [`regenc`] | ASCII character classification and case folding |
//! | [`regsyntax`] | Dialect definitions |
//! | [`options`] | Compile and search options, match results |
//! | [`error`] / [`regerror`] | Error types and messages |
//! | [`api`] | `Regex`, `Match`, `Captures`, replacement helpers |

pub mod api;
pub mod error;
pub mod options;
pub mod prelude;
pub mod regcomp;
pub mod regenc;
pub mod regerror;
pub mod regexec;
pub mod regint;
pub mod regkmp;
pub mod reglink;
pub mod regparse;
pub mod regrpl;
pub mod regsyntax;
