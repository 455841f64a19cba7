// compat_replace.rs - Integration tests for replacement templates.
//
// Each case compiles a pattern and a template in the same dialect, runs the
// first forward match and expands the template against it.

use edregex::error::ReplaceError;
use edregex::options::{CompileOptions, MatchOptions};
use edregex::regcomp::re_compile;
use edregex::regexec::re_exec;
use edregex::regrpl::{compile_template, ReplaceFlags, Substitution};
use edregex::regsyntax::Dialect;

fn r(dialect: Dialect, pattern: &[u8], input: &[u8], template: &[u8], expected: &str) {
    let prog = re_compile(pattern, &CompileOptions::new(dialect)).unwrap_or_else(|e| {
        panic!(
            "compile failed for {:?}: {}",
            std::str::from_utf8(pattern).unwrap_or("<invalid>"),
            e
        )
    });
    let m = re_exec(&prog, input, 0, &MatchOptions::default()).unwrap_or_else(|| {
        panic!(
            "r: expected match for {:?} against {:?}",
            std::str::from_utf8(pattern).unwrap_or("<invalid>"),
            std::str::from_utf8(input).unwrap_or("<invalid>")
        )
    });
    let tpl = compile_template(template, dialect);
    let mut sub = Substitution::new();
    let out = sub.execute(&tpl, &m, input);
    assert_eq!(
        String::from_utf8_lossy(out),
        expected,
        "r: wrong expansion of {:?} for {:?} against {:?} ({})",
        std::str::from_utf8(template).unwrap_or("<invalid>"),
        std::str::from_utf8(pattern).unwrap_or("<invalid>"),
        std::str::from_utf8(input).unwrap_or("<invalid>"),
        dialect.name()
    );
}

// ============================================================================
// Whole match
// ============================================================================

#[test]
fn whole_match_forms() {
    r(Dialect::Unix, b"[0-9]+", b"abc123def", b"<$&>", "<123>");
    r(Dialect::Perl, b"[0-9]+", b"abc123def", b"<$&>", "<123>");
    r(Dialect::Perl, b"[0-9]+", b"abc123def", b"$0", "123");
    r(Dialect::Brief, b"[0-9]+", b"abc123def", b"<&>", "<123>");
    r(Dialect::Brief, b"[0-9]+", b"abc123def", b"\\0", "123");
    r(Dialect::Ruby, b"[0-9]+", b"abc123def", b"\\&", "123");
    r(Dialect::Extended, b"[0-9]+", b"abc123def", b"&&", "123123");
    r(Dialect::Tre, b"[0-9]+", b"abc123def", b"[&]", "[123]");
}

#[test]
fn literal_templates_ignore_the_match() {
    for dialect in Dialect::ALL {
        r(dialect, b"b", b"abc", b"xyz", "xyz");
        r(dialect, b"b", b"abc", b"", "");
    }
}

// ============================================================================
// Numbered groups
// ============================================================================

#[test]
fn numbered_groups() {
    r(Dialect::Brief, b"\\(a\\)\\(b\\)", b"xaby", b"\\2\\1", "ba");
    r(Dialect::Brief, b"{a}{b}", b"xaby", b"\\2-\\1", "b-a");
    r(Dialect::Unix, b"\\([a-z]+\\)=\\([0-9]+\\)", b"k=42", b"$2:$1", "42:k");
    r(Dialect::Perl, b"(\\w+) (\\w+)", b"hello world", b"${2} ${1}", "world hello");
    r(Dialect::Ruby, b"(\\w+)@(\\w+)", b"me@host", b"\\2 at \\1", "host at me");
}

#[test]
fn highest_group() {
    r(Dialect::Perl, b"(a)|(b)", b"b", b"[$+]", "[b]");
    r(Dialect::Perl, b"(a)(b)?", b"a", b"[$+]", "[a]");
    r(Dialect::Ruby, b"(x)(y)", b"xy", b"\\+", "y");
    r(Dialect::Perl, b"ab", b"ab", b"$+", "ab");
}

#[test]
fn context_around_match() {
    r(Dialect::Perl, b"123", b"abc123def", b"$'|$`", "def|abc");
    r(Dialect::Ruby, b"123", b"abc123def", b"\\'|\\`", "def|abc");
}

// ============================================================================
// Per-dialect literals
// ============================================================================

#[test]
fn sigils_outside_their_dialect_are_literal() {
    r(Dialect::Brief, b"b", b"abc", b"$&", "$b");
    r(Dialect::Brief, b"b", b"abc", b"$1", "$1");
    r(Dialect::Perl, b"b", b"abc", b"&", "&");
    r(Dialect::Ruby, b"b", b"abc", b"$&&", "$&&");
    r(Dialect::Brief, b"b", b"abc", b"\\&", "&");
    r(Dialect::Perl, b"b", b"abc", b"\\&", "&");
}

#[test]
fn escapes_in_templates() {
    r(Dialect::Unix, b"b", b"abc", b"\\t\\n", "\t\n");
    r(Dialect::Unix, b"b", b"abc", b"\\\\", "\\");
    r(Dialect::Unix, b"b", b"abc", b"\\q", "q");
    r(Dialect::Perl, b"b", b"abc", b"$$", "$");
    r(Dialect::Perl, b"b", b"abc", b"end\\", "end\\");
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn unset_capture_is_empty_and_reported() {
    let prog = re_compile(b"(a)|(b)", &CompileOptions::new(Dialect::Extended)).unwrap();
    let m = re_exec(&prog, b"b", 0, &MatchOptions::default()).unwrap();
    let tpl = compile_template(b"<\\1|\\2>", Dialect::Extended);
    let mut sub = Substitution::new();
    assert_eq!(sub.execute(&tpl, &m, b"b"), b"<|b>");
    assert_eq!(sub.diagnostics(), &[ReplaceError::NoSuchCapture(1)]);
}

#[test]
fn out_of_range_capture_is_reported() {
    let prog = re_compile(b"a", &CompileOptions::new(Dialect::Perl)).unwrap();
    let m = re_exec(&prog, b"a", 0, &MatchOptions::default()).unwrap();
    let tpl = compile_template(b"${10}", Dialect::Perl);
    let mut sub = Substitution::new();
    assert_eq!(sub.execute(&tpl, &m, b"a"), b"");
    assert_eq!(sub.diagnostics(), &[ReplaceError::NoSuchCapture(10)]);
}

#[test]
fn hints_describe_the_template() {
    let tpl = compile_template(b"abc", Dialect::Perl);
    assert!(tpl.hints.flags.contains(ReplaceFlags::SIMPLE));
    assert_eq!(tpl.hints.literal_len, 3);

    let tpl = compile_template(b"x$1y", Dialect::Perl);
    assert!(!tpl.hints.flags.contains(ReplaceFlags::SIMPLE));
    assert!(tpl.hints.flags.contains(ReplaceFlags::HAS_CAPTURE));
    assert_eq!(tpl.hints.literal_len, 2);

    let tpl = compile_template(b"$&", Dialect::Perl);
    assert!(!tpl.hints.flags.intersects(ReplaceFlags::SIMPLE | ReplaceFlags::HAS_CAPTURE));
    assert!(tpl.hints.flags.contains(ReplaceFlags::HAS_MATCH));

    let tpl = compile_template(b"$&", Dialect::Brief);
    assert!(tpl.hints.flags.contains(ReplaceFlags::HAS_MATCH));
    assert_eq!(tpl.hints.literal_len, 1);
}
