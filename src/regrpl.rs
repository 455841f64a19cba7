// regrpl.rs - Replacement templates: compiler and executor.
//
// A template is compiled once per dialect into a token list. Executing it
// against a match copies literal runs and the referenced spans of the
// searched buffer into an owned output buffer.

use bitflags::bitflags;
use log::debug;

use crate::error::ReplaceError;
use crate::options::MatchResult;
use crate::regint::NSUBEXP;
use crate::regparse::conv_backslash_value;
use crate::regsyntax::{Dialect, RplOp};

bitflags! {
    /// Summary of what a compiled template references.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ReplaceFlags: u32 {
        /// Pure literal; the match is never consulted.
        const SIMPLE = 1 << 0;
        /// References a numbered group or the highest group.
        const HAS_CAPTURE = 1 << 1;
        /// References text before or after the match.
        const HAS_CONTEXT = 1 << 2;
        /// References the whole match.
        const HAS_MATCH = 1 << 3;
    }
}

/// Sizing hints for the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hints {
    /// Total bytes of literal text in the template.
    pub literal_len: usize,
    pub flags: ReplaceFlags,
}

impl Hints {
    /// Upper-bound guess of the output size for one referenced span each.
    pub fn capacity(&self, m: &MatchResult, text_len: usize) -> usize {
        let mut n = self.literal_len;
        if self.flags.intersects(ReplaceFlags::HAS_MATCH | ReplaceFlags::HAS_CAPTURE) {
            n += m.len();
        }
        if self.flags.contains(ReplaceFlags::HAS_CONTEXT) {
            n += text_len.saturating_sub(m.len());
        }
        n
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceToken {
    Literal(Vec<u8>),
    /// Group `n`, 1-based.
    Capture(usize),
    /// Highest group that participated, or the whole match if none did.
    CaptureMax,
    WholeMatch,
    /// Buffer text before the match.
    Before,
    /// Buffer text after the match.
    After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementProgram {
    pub hints: Hints,
    pub tokens: Vec<ReplaceToken>,
    pub dialect: Dialect,
}

impl ReplacementProgram {
    pub fn is_simple(&self) -> bool {
        self.hints.flags.contains(ReplaceFlags::SIMPLE)
    }
}

// ============================================================================
// Compiler
// ============================================================================

struct TemplateBuilder {
    tokens: Vec<ReplaceToken>,
    literal_len: usize,
    flags: ReplaceFlags,
}

impl TemplateBuilder {
    fn literal(&mut self, c: u8) {
        self.literal_len += 1;
        if let Some(ReplaceToken::Literal(bytes)) = self.tokens.last_mut() {
            bytes.push(c);
        } else {
            self.tokens.push(ReplaceToken::Literal(vec![c]));
        }
    }

    fn reference(&mut self, token: ReplaceToken) {
        match token {
            ReplaceToken::Capture(_) | ReplaceToken::CaptureMax => {
                self.flags |= ReplaceFlags::HAS_CAPTURE
            }
            ReplaceToken::Before | ReplaceToken::After => self.flags |= ReplaceFlags::HAS_CONTEXT,
            ReplaceToken::WholeMatch => self.flags |= ReplaceFlags::HAS_MATCH,
            ReplaceToken::Literal(_) => {}
        }
        self.tokens.push(token);
    }

    fn group(&mut self, n: usize) {
        if n == 0 {
            self.reference(ReplaceToken::WholeMatch);
        } else {
            self.reference(ReplaceToken::Capture(n));
        }
    }
}

/// Parse `${digits}` starting just after the `$`. Returns the group number
/// and advances `p` past the `}`.
fn fetch_braced_group(p: &mut usize, template: &[u8]) -> Option<usize> {
    let rest = template.get(*p..)?;
    if rest.first() != Some(&b'{') {
        return None;
    }
    let digits = rest[1..].iter().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || rest.get(1 + digits) != Some(&b'}') {
        return None;
    }
    let n = rest[1..1 + digits]
        .iter()
        .fold(0usize, |acc, &c| acc.saturating_mul(10).saturating_add((c - b'0') as usize));
    *p += digits + 2;
    Some(n)
}

/// Compile a replacement template with the sigils of `dialect`.
pub fn compile_template(template: &[u8], dialect: Dialect) -> ReplacementProgram {
    let syn = dialect.syntax();
    let mut b = TemplateBuilder {
        tokens: Vec::new(),
        literal_len: 0,
        flags: ReplaceFlags::empty(),
    };

    let mut p = 0;
    while p < template.len() {
        let c = template[p];
        p += 1;
        match c {
            b'\\' => {
                let Some(&e) = template.get(p) else {
                    b.literal(b'\\');
                    break;
                };
                p += 1;
                match e {
                    b'0'..=b'9' if syn.is_rpl(RplOp::ESC_DIGIT) => b.group((e - b'0') as usize),
                    b'&' if syn.is_rpl(RplOp::ESC_SPECIALS) => {
                        b.reference(ReplaceToken::WholeMatch)
                    }
                    b'`' if syn.is_rpl(RplOp::ESC_SPECIALS) => b.reference(ReplaceToken::Before),
                    b'\'' if syn.is_rpl(RplOp::ESC_SPECIALS) => b.reference(ReplaceToken::After),
                    b'+' if syn.is_rpl(RplOp::ESC_SPECIALS) => {
                        b.reference(ReplaceToken::CaptureMax)
                    }
                    _ => b.literal(conv_backslash_value(e).unwrap_or(e)),
                }
            }
            b'&' if syn.is_rpl(RplOp::AMPERSAND_WHOLE) => b.reference(ReplaceToken::WholeMatch),
            b'$' if syn.is_rpl(RplOp::DOLLAR_SIGILS) => match template.get(p) {
                Some(&d @ b'0'..=b'9') => {
                    p += 1;
                    b.group((d - b'0') as usize);
                }
                Some(b'&') => {
                    p += 1;
                    b.reference(ReplaceToken::WholeMatch);
                }
                Some(b'+') => {
                    p += 1;
                    b.reference(ReplaceToken::CaptureMax);
                }
                Some(b'`') => {
                    p += 1;
                    b.reference(ReplaceToken::Before);
                }
                Some(b'\'') => {
                    p += 1;
                    b.reference(ReplaceToken::After);
                }
                Some(b'$') => {
                    p += 1;
                    b.literal(b'$');
                }
                Some(b'{') => match fetch_braced_group(&mut p, template) {
                    Some(n) => b.group(n),
                    None => b.literal(b'$'),
                },
                _ => b.literal(b'$'),
            },
            _ => b.literal(c),
        }
    }

    let mut flags = b.flags;
    if b
        .tokens
        .iter()
        .all(|t| matches!(t, ReplaceToken::Literal(_)))
    {
        flags |= ReplaceFlags::SIMPLE;
    }
    ReplacementProgram {
        hints: Hints {
            literal_len: b.literal_len,
            flags,
        },
        tokens: b.tokens,
        dialect,
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Reusable output buffer for template expansion.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    buf: Vec<u8>,
    diagnostics: Vec<ReplaceError>,
}

impl Substitution {
    pub fn new() -> Substitution {
        Substitution::default()
    }

    /// Expand `prog` for the match `m` of `text`. The previous output and
    /// diagnostics are discarded; the buffer's capacity is kept.
    pub fn execute(&mut self, prog: &ReplacementProgram, m: &MatchResult, text: &[u8]) -> &[u8] {
        self.buf.clear();
        self.diagnostics.clear();

        self.buf.reserve(prog.hints.capacity(m, text.len()));

        for token in &prog.tokens {
            match token {
                ReplaceToken::Literal(bytes) => self.buf.extend_from_slice(bytes),
                ReplaceToken::WholeMatch => self.push_span(text, m.start, m.end),
                ReplaceToken::Before => self.push_span(text, 0, m.start),
                ReplaceToken::After => self.push_span(text, m.end, text.len()),
                ReplaceToken::CaptureMax => match m.group(m.max_group) {
                    Some((s, e)) => self.push_span(text, s, e),
                    None => self.push_span(text, m.start, m.end),
                },
                &ReplaceToken::Capture(n) => {
                    let span = if n < NSUBEXP { m.group(n) } else { None };
                    match span {
                        Some((s, e)) => self.push_span(text, s, e),
                        None => {
                            debug!("replacement references missing capture {}", n);
                            self.diagnostics.push(ReplaceError::NoSuchCapture(n));
                        }
                    }
                }
            }
        }
        &self.buf
    }

    fn push_span(&mut self, text: &[u8], start: usize, end: usize) {
        if let Some(bytes) = text.get(start..end) {
            self.buf.extend_from_slice(bytes);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Problems found by the last `execute`.
    pub fn diagnostics(&self) -> &[ReplaceError] {
        &self.diagnostics
    }
}

/// One-shot expansion into a `String`. Invalid UTF-8 is replaced.
pub fn execute(prog: &ReplacementProgram, m: &MatchResult, text: &[u8]) -> String {
    let mut sub = Substitution::new();
    String::from_utf8_lossy(sub.execute(prog, m, text)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(start: usize, end: usize, groups: &[(usize, Option<(usize, usize)>)]) -> MatchResult {
        let mut all = [None; NSUBEXP];
        all[0] = Some((start, end));
        let mut max_group = 0;
        for &(n, span) in groups {
            all[n] = span;
            if span.is_some() {
                max_group = max_group.max(n);
            }
        }
        MatchResult {
            groups: all,
            max_group,
            start,
            end,
            set_pos: None,
        }
    }

    fn expand(template: &str, dialect: Dialect, m: &MatchResult, text: &str) -> String {
        execute(&compile_template(template.as_bytes(), dialect), m, text.as_bytes())
    }

    #[test]
    fn literal_templates_are_simple() {
        let prog = compile_template(b"plain text", Dialect::Perl);
        assert!(prog.is_simple());
        assert_eq!(prog.tokens, vec![ReplaceToken::Literal(b"plain text".to_vec())]);
        assert_eq!(prog.hints.literal_len, 10);

        let prog = compile_template(b"a\\tb\\\\", Dialect::Brief);
        assert!(prog.is_simple());
        assert_eq!(prog.tokens, vec![ReplaceToken::Literal(b"a\tb\\".to_vec())]);
    }

    #[test]
    fn token_shapes() {
        let prog = compile_template(b"<$&>", Dialect::Perl);
        assert_eq!(
            prog.tokens,
            vec![
                ReplaceToken::Literal(b"<".to_vec()),
                ReplaceToken::WholeMatch,
                ReplaceToken::Literal(b">".to_vec()),
            ]
        );
        assert!(!prog.is_simple());

        let prog = compile_template(b"\\1-$`", Dialect::Unix);
        assert!(prog.hints.flags.contains(ReplaceFlags::HAS_CAPTURE));
        assert!(prog.hints.flags.contains(ReplaceFlags::HAS_CONTEXT));
        assert!(!prog.hints.flags.contains(ReplaceFlags::HAS_MATCH));
    }

    #[test]
    fn capacity_follows_references() {
        let m = result(3, 6, &[]);
        let literal = compile_template(b"abcd", Dialect::Perl);
        assert_eq!(literal.hints.capacity(&m, 9), 4);
        let whole = compile_template(b"<$&>", Dialect::Perl);
        assert_eq!(whole.hints.capacity(&m, 9), 5);
        let context = compile_template(b"$`$'", Dialect::Perl);
        assert_eq!(context.hints.capacity(&m, 9), 6);
        let escaped = compile_template(b"\\\\1$'", Dialect::Perl);
        assert_eq!(escaped.hints.flags, ReplaceFlags::HAS_CONTEXT);
        let group = compile_template(b"$1$'", Dialect::Perl);
        assert_eq!(group.hints.capacity(&m, 9), 9);
    }

    #[test]
    fn brief_sigils() {
        let m = result(1, 3, &[(1, Some((1, 2))), (2, Some((2, 3)))]);
        assert_eq!(expand("[&]", Dialect::Brief, &m, "xaby"), "[ab]");
        assert_eq!(expand("\\2\\1", Dialect::Brief, &m, "xaby"), "ba");
        assert_eq!(expand("\\0", Dialect::Brief, &m, "xaby"), "ab");
        assert_eq!(expand("\\&", Dialect::Brief, &m, "xaby"), "&");
        assert_eq!(expand("$1", Dialect::Brief, &m, "xaby"), "$1");
    }

    #[test]
    fn perl_sigils() {
        let m = result(3, 6, &[(1, Some((3, 4)))]);
        let text = "abc123def";
        assert_eq!(expand("<$&>", Dialect::Perl, &m, text), "<123>");
        assert_eq!(expand("$0|$1|${1}", Dialect::Perl, &m, text), "123|1|1");
        assert_eq!(expand("$`/$'", Dialect::Perl, &m, text), "abc/def");
        assert_eq!(expand("$+", Dialect::Perl, &m, text), "1");
        assert_eq!(expand("$$1", Dialect::Perl, &m, text), "$1");
        assert_eq!(expand("&", Dialect::Perl, &m, text), "&");
        assert_eq!(expand("${x}", Dialect::Perl, &m, text), "${x}");
        assert_eq!(expand("cost $", Dialect::Perl, &m, text), "cost $");
    }

    #[test]
    fn ruby_sigils() {
        let m = result(3, 6, &[(1, Some((4, 5)))]);
        let text = "abc123def";
        assert_eq!(expand("\\&", Dialect::Ruby, &m, text), "123");
        assert_eq!(expand("\\`|\\'", Dialect::Ruby, &m, text), "abc|def");
        assert_eq!(expand("\\+", Dialect::Ruby, &m, text), "2");
        assert_eq!(expand("$&", Dialect::Ruby, &m, text), "$&");
    }

    #[test]
    fn capture_max_without_groups_is_whole_match() {
        let m = result(0, 2, &[]);
        assert_eq!(expand("$+", Dialect::Unix, &m, "hi"), "hi");
    }

    #[test]
    fn missing_captures_are_diagnosed() {
        let m = result(0, 2, &[(1, None)]);
        let prog = compile_template(b"[\\1${12}]", Dialect::Unix);
        let mut sub = Substitution::new();
        assert_eq!(sub.execute(&prog, &m, b"hi"), b"[]");
        assert_eq!(
            sub.diagnostics(),
            &[ReplaceError::NoSuchCapture(1), ReplaceError::NoSuchCapture(12)]
        );

        // diagnostics do not leak into the next run
        let prog = compile_template(b"&", Dialect::Unix);
        assert_eq!(sub.execute(&prog, &m, b"hi"), b"hi");
        assert!(sub.diagnostics().is_empty());
    }

    #[test]
    fn trailing_backslash_is_literal() {
        let m = result(0, 1, &[]);
        assert_eq!(expand("a\\", Dialect::Perl, &m, "x"), "a\\");
    }

    #[test]
    fn buffer_is_reused() {
        let m = result(0, 1, &[]);
        let prog = compile_template(b"&&&&", Dialect::Unix);
        let mut sub = Substitution::new();
        sub.execute(&prog, &m, b"x");
        assert_eq!(sub.as_bytes(), b"xxxx");
        assert_eq!(sub.execute(&prog, &m, b"y"), b"yyyy");
        assert_eq!(sub.into_bytes(), b"yyyy".to_vec());
    }
}
