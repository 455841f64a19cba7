// api.rs - Idiomatic Rust API for edregex.
//
// Wraps the compiler, the VM and the replacement engine (re_compile,
// re_exec, compile_template) with Rust-native types: Regex, RegexBuilder,
// Match, Captures, FindIter, Translation.

use std::ops::Range;

use crate::error::{CompileError, ReplaceError};
use crate::options::{CompileOptions, MatchOptions, MatchResult, OptionFlags};
use crate::regcomp::re_compile;
use crate::regexec::re_exec;
use crate::regint::Program;
use crate::regrpl::{compile_template, execute, ReplacementProgram, Substitution};
use crate::regsyntax::Dialect;

/// A compiled regular expression.
///
/// # Examples
///
/// ```
/// use edregex::api::Regex;
///
/// let re = Regex::new(r"[0-9]+").unwrap();
/// assert!(re.is_match("abc123def"));
///
/// let m = re.find("abc123def").unwrap();
/// assert_eq!(m.as_str(), "123");
/// assert_eq!(m.start(), 3);
/// assert_eq!(m.end(), 6);
/// ```
#[derive(Clone)]
pub struct Regex {
    prog: Program,
    pattern: Vec<u8>,
}

impl Regex {
    /// Compile a pattern in the Unix dialect with no flags.
    pub fn new(pattern: &str) -> Result<Regex, CompileError> {
        Self::new_bytes(pattern.as_bytes())
    }

    /// Compile a pattern from raw bytes in the Unix dialect.
    pub fn new_bytes(pattern: &[u8]) -> Result<Regex, CompileError> {
        Self::with_options(pattern, &CompileOptions::default())
    }

    /// Compile a pattern with explicit options.
    pub fn with_options(pattern: &[u8], options: &CompileOptions) -> Result<Regex, CompileError> {
        let prog = re_compile(pattern, options)?;
        Ok(Regex {
            prog,
            pattern: pattern.to_vec(),
        })
    }

    /// Create a [`RegexBuilder`] for dialect and flag selection.
    pub fn builder(pattern: &str) -> RegexBuilder {
        RegexBuilder::new(pattern)
    }

    /// Return the first match in `text`, or `None` if no match.
    pub fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.find_bytes(text.as_bytes())
    }

    /// Return the first match in `text` (as bytes). Always searches forward
    /// from the start of the buffer.
    pub fn find_bytes<'t>(&self, text: &'t [u8]) -> Option<Match<'t>> {
        self.find_at(text, 0)
    }

    /// First match starting at or after `offset`.
    pub fn find_at<'t>(&self, text: &'t [u8], offset: usize) -> Option<Match<'t>> {
        let m = self.search_bytes(text, offset, &MatchOptions::forward())?;
        Some(Match::new(text, m.start, m.end))
    }

    /// Last match starting at or before `offset`.
    pub fn rfind_at<'t>(&self, text: &'t [u8], offset: usize) -> Option<Match<'t>> {
        let m = self.search_bytes(text, offset, &MatchOptions::backward())?;
        Some(Match::new(text, m.start, m.end))
    }

    /// Check whether `text` matches the pattern anywhere.
    pub fn is_match(&self, text: &str) -> bool {
        self.is_match_bytes(text.as_bytes())
    }

    /// Check whether `text` (as bytes) matches the pattern anywhere.
    pub fn is_match_bytes(&self, text: &[u8]) -> bool {
        self.search_bytes(text, 0, &MatchOptions::forward()).is_some()
    }

    /// Return the first match with all capture groups, or `None`.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.captures_bytes(text.as_bytes())
    }

    /// Return the first match with all capture groups (bytes), or `None`.
    pub fn captures_bytes<'t>(&self, text: &'t [u8]) -> Option<Captures<'t>> {
        self.captures_at(text, 0, &MatchOptions::forward())
    }

    /// Search from `offset` with explicit options and keep every group.
    pub fn captures_at<'t>(
        &self,
        text: &'t [u8],
        offset: usize,
        opts: &MatchOptions,
    ) -> Option<Captures<'t>> {
        let result = self.search_bytes(text, offset, opts)?;
        Some(Captures {
            text,
            result,
            len: self.captures_len() + 1,
            dialect: self.dialect(),
        })
    }

    /// Iterate over all non-overlapping matches in `text`.
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> FindIter<'r, 't> {
        self.find_iter_bytes(text.as_bytes())
    }

    /// Iterate over all non-overlapping matches in `text` (as bytes).
    pub fn find_iter_bytes<'r, 't>(&'r self, text: &'t [u8]) -> FindIter<'r, 't> {
        FindIter {
            regex: self,
            text,
            pos: 0,
        }
    }

    /// Raw search returning offsets only.
    ///
    /// Direction comes from `opts`, or from the regex's backward flag when
    /// `opts.direction` is `None`.
    pub fn search_bytes(&self, text: &[u8], offset: usize, opts: &MatchOptions) -> Option<MatchResult> {
        re_exec(&self.prog, text, offset, opts)
    }

    /// Number of capture groups in the pattern (excluding group 0).
    pub fn captures_len(&self) -> usize {
        self.prog.num_mem
    }

    pub fn dialect(&self) -> Dialect {
        self.prog.options.dialect
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Access the compiled program.
    pub fn program(&self) -> &Program {
        &self.prog
    }

    /// Compile a replacement template with this regex's dialect.
    pub fn template(&self, template: &str) -> ReplacementProgram {
        compile_template(template.as_bytes(), self.dialect())
    }

    // === Replacement ===

    /// Replace the first match (or every match when `global`) in `text`.
    ///
    /// One compiled template and one output buffer serve every match. After
    /// an empty match the next search starts one byte further on.
    pub fn translate(&self, text: &[u8], template: &ReplacementProgram, global: bool) -> Translation {
        let mut out = Vec::with_capacity(text.len());
        let mut sub = Substitution::new();
        let mut diagnostics = Vec::new();
        let mut count = 0;
        let mut copied = 0;
        let mut pos = 0;

        while pos <= text.len() {
            let Some(m) = self.search_bytes(text, pos, &MatchOptions::forward()) else {
                break;
            };
            out.extend_from_slice(&text[copied..m.start]);
            out.extend_from_slice(sub.execute(template, &m, text));
            diagnostics.extend_from_slice(sub.diagnostics());
            count += 1;
            copied = m.end;
            if !global {
                break;
            }
            if m.is_empty() {
                if let Some(&c) = text.get(m.end) {
                    out.push(c);
                }
                copied = m.end + 1;
                pos = m.end + 1;
            } else {
                pos = m.end;
            }
        }
        if let Some(rest) = text.get(copied..) {
            out.extend_from_slice(rest);
        }

        Translation {
            text: String::from_utf8_lossy(&out).into_owned(),
            count,
            diagnostics,
        }
    }

    /// Replace the first match of the pattern in `text`.
    pub fn replace(&self, text: &str, template: &str) -> String {
        self.translate(text.as_bytes(), &self.template(template), false)
            .text
    }

    /// Replace every non-overlapping match of the pattern in `text`.
    pub fn replace_all(&self, text: &str, template: &str) -> String {
        self.translate(text.as_bytes(), &self.template(template), true)
            .text
    }
}

impl std::fmt::Debug for Regex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Regex")
            .field("pattern", &String::from_utf8_lossy(&self.pattern))
            .field("dialect", &self.dialect())
            .finish_non_exhaustive()
    }
}

// === RegexBuilder ===

/// Builder for compiling a [`Regex`] with a dialect and flags.
///
/// # Examples
///
/// ```
/// use edregex::api::Regex;
/// use edregex::regsyntax::Dialect;
///
/// let re = Regex::builder(r"hello {world|there}")
///     .dialect(Dialect::Brief)
///     .case_insensitive(true)
///     .build()
///     .unwrap();
/// assert!(re.is_match("Hello There"));
/// ```
#[derive(Debug, Clone)]
pub struct RegexBuilder {
    pattern: Vec<u8>,
    options: CompileOptions,
}

impl RegexBuilder {
    /// Create a new builder for the given pattern (Unix dialect, no flags).
    pub fn new(pattern: &str) -> Self {
        RegexBuilder {
            pattern: pattern.as_bytes().to_vec(),
            options: CompileOptions::default(),
        }
    }

    /// Select the pattern dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.options.dialect = dialect;
        self
    }

    fn flag(mut self, flag: OptionFlags, yes: bool) -> Self {
        self.options.flags.set(flag, yes);
        self
    }

    /// Enable or disable case-insensitive matching.
    pub fn case_insensitive(self, yes: bool) -> Self {
        self.flag(OptionFlags::IGNORECASE, yes)
    }

    /// Make quantifiers and `*` prefer the shortest match.
    pub fn minimal(self, yes: bool) -> Self {
        self.flag(OptionFlags::MINIMAL, yes)
    }

    /// Search backward by default in [`Regex::search_bytes`].
    pub fn backward(self, yes: bool) -> Self {
        self.flag(OptionFlags::BACKWARD, yes)
    }

    /// Let `^`/`$` match at embedded newlines; wildcards stop at `\n`.
    pub fn multiline(self, yes: bool) -> Self {
        self.flag(OptionFlags::MULTILINE, yes)
    }

    /// Compile the pattern into a [`Regex`].
    pub fn build(self) -> Result<Regex, CompileError> {
        Regex::with_options(&self.pattern, &self.options)
    }
}

// === Match ===

/// A single match result referencing the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t [u8],
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    fn new(text: &'t [u8], start: usize, end: usize) -> Match<'t> {
        Match { text, start, end }
    }

    /// Byte offset of the start of the match.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset of the end of the match (exclusive).
    pub fn end(&self) -> usize {
        self.end
    }

    /// Byte range of the match.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The matched text as a byte slice.
    pub fn as_bytes(&self) -> &'t [u8] {
        &self.text[self.start..self.end]
    }

    /// The matched text as a `&str`.
    ///
    /// # Panics
    ///
    /// Panics if the matched bytes are not valid UTF-8.
    pub fn as_str(&self) -> &'t str {
        std::str::from_utf8(self.as_bytes()).expect("match is not valid UTF-8")
    }

    /// Returns the length of the match in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the match is empty (zero-length).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// === Captures ===

/// All capture groups from a single match.
///
/// Group 0 is the entire match. Groups 1..N are numbered by the order of
/// their opening brackets.
pub struct Captures<'t> {
    text: &'t [u8],
    result: MatchResult,
    len: usize,
    dialect: Dialect,
}

impl<'t> Captures<'t> {
    /// Get capture group `i`, or `None` if the group did not participate.
    pub fn get(&self, i: usize) -> Option<Match<'t>> {
        if i >= self.len {
            return None;
        }
        let (start, end) = self.result.group(i)?;
        Some(Match::new(self.text, start, end))
    }

    /// Number of capture groups (including group 0).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highest group that participated in the match, 0 if none did.
    pub fn max_group(&self) -> usize {
        self.result.max_group
    }

    /// Position recorded by `\c`, if the pattern has one and it was reached.
    pub fn set_pos(&self) -> Option<usize> {
        self.result.set_pos
    }

    /// Expand a replacement template (in the regex's dialect) for this match.
    pub fn expand(&self, template: &str) -> String {
        let prog = compile_template(template.as_bytes(), self.dialect);
        execute(&prog, &self.result, self.text)
    }

    /// The raw offsets.
    pub fn as_result(&self) -> &MatchResult {
        &self.result
    }

    /// Iterate over all capture groups.
    pub fn iter(&self) -> CapturesIter<'_, 't> {
        CapturesIter {
            captures: self,
            index: 0,
        }
    }
}

impl std::fmt::Debug for Captures<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for i in 0..self.len() {
            list.entry(&self.get(i).map(|m| m.range()));
        }
        list.finish()
    }
}

// === CapturesIter ===

/// Iterator over capture groups in a [`Captures`].
pub struct CapturesIter<'c, 't> {
    captures: &'c Captures<'t>,
    index: usize,
}

impl<'c, 't> Iterator for CapturesIter<'c, 't> {
    type Item = Option<Match<'t>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.captures.len() {
            return None;
        }
        let m = self.captures.get(self.index);
        self.index += 1;
        Some(m)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.captures.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CapturesIter<'_, '_> {}

// === FindIter ===

/// Iterator over all non-overlapping matches in a text.
pub struct FindIter<'r, 't> {
    regex: &'r Regex,
    text: &'t [u8],
    pos: usize,
}

impl<'r, 't> Iterator for FindIter<'r, 't> {
    type Item = Match<'t>;

    fn next(&mut self) -> Option<Match<'t>> {
        if self.pos > self.text.len() {
            return None;
        }
        let m = self
            .regex
            .search_bytes(self.text, self.pos, &MatchOptions::forward())?;

        // Step past an empty match so the next search cannot return it again.
        self.pos = if m.is_empty() { m.end + 1 } else { m.end };

        Some(Match::new(self.text, m.start, m.end))
    }
}

// === Translation ===

/// Result of [`Regex::translate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    /// Number of matches replaced.
    pub count: usize,
    /// Problems reported while expanding the template, in match order.
    pub diagnostics: Vec<ReplaceError>,
}
