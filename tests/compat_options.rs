// compat_options.rs - Integration tests for compile and search options.
//
// Compile flags (IGNORECASE, MINIMAL, BACKWARD, MULTILINE) go through
// CompileOptions; search flags (NOTBOL, NOTEOL, ANCHORED, NO_FAST_PATH) and
// direction go through MatchOptions.

use edregex::options::{CompileOptions, MatchOptions, OptionFlags, SearchFlags};
use edregex::regcomp::re_compile;
use edregex::regexec::re_exec;
use edregex::regsyntax::Dialect;

fn unix(flags: OptionFlags) -> CompileOptions {
    CompileOptions::new(Dialect::Unix).with_flags(flags)
}

fn brief(flags: OptionFlags) -> CompileOptions {
    CompileOptions::new(Dialect::Brief).with_flags(flags)
}

fn search(
    copts: &CompileOptions,
    mopts: &MatchOptions,
    pattern: &[u8],
    input: &[u8],
    offset: usize,
) -> Option<(usize, usize)> {
    let prog = re_compile(pattern, copts).unwrap_or_else(|e| {
        panic!(
            "compile failed for {:?} with {:?}: {}",
            std::str::from_utf8(pattern).unwrap_or("<invalid>"),
            copts,
            e
        )
    });
    re_exec(&prog, input, offset, mopts).map(|m| (m.start, m.end))
}

fn x2(copts: CompileOptions, pattern: &[u8], input: &[u8], from: usize, to: usize) {
    xs(copts, MatchOptions::default(), pattern, input, 0, from, to);
}

fn n(copts: CompileOptions, pattern: &[u8], input: &[u8]) {
    ns(copts, MatchOptions::default(), pattern, input, 0);
}

fn xs(
    copts: CompileOptions,
    mopts: MatchOptions,
    pattern: &[u8],
    input: &[u8],
    offset: usize,
    from: usize,
    to: usize,
) {
    let got = search(&copts, &mopts, pattern, input, offset);
    assert_eq!(
        got,
        Some((from, to)),
        "x2: wrong result for {:?} against {:?} from {} with {:?} / {:?}",
        std::str::from_utf8(pattern).unwrap_or("<invalid>"),
        std::str::from_utf8(input).unwrap_or("<invalid>"),
        offset,
        copts.flags,
        mopts
    );
}

fn ns(copts: CompileOptions, mopts: MatchOptions, pattern: &[u8], input: &[u8], offset: usize) {
    let got = search(&copts, &mopts, pattern, input, offset);
    assert_eq!(
        got,
        None,
        "n: expected no match for {:?} against {:?} from {} with {:?} / {:?}",
        std::str::from_utf8(pattern).unwrap_or("<invalid>"),
        std::str::from_utf8(input).unwrap_or("<invalid>"),
        offset,
        copts.flags,
        mopts
    );
}

const NONE: OptionFlags = OptionFlags::empty();
const IC: OptionFlags = OptionFlags::IGNORECASE;
const MIN: OptionFlags = OptionFlags::MINIMAL;
const BACK: OptionFlags = OptionFlags::BACKWARD;
const ML: OptionFlags = OptionFlags::MULTILINE;

// ============================================================================
// IGNORECASE
// ============================================================================

#[test]
fn option_ignorecase_literal() {
    x2(unix(IC), b"abc", b"xABC", 1, 4);
    x2(unix(IC), b"hello world!", b"say HELLO WORLD!", 4, 16);
    n(unix(IC), b"a", b"b");
    n(unix(NONE), b"abc", b"ABC");
}

#[test]
fn option_ignorecase_class() {
    x2(unix(IC), b"[A-C]+", b"xxabc", 2, 5);
    x2(unix(IC), b"[^a]", b"Ab", 1, 2);
    x2(unix(IC), b"[[:upper:]]", b"1a", 1, 2);
}

#[test]
fn option_ignorecase_escaped_literal() {
    x2(unix(IC), b"\\x41", b"a", 0, 1);
}

#[test]
fn option_ignorecase_leaves_non_letters() {
    x2(unix(IC), b"a1_", b"A1_", 0, 3);
    n(unix(IC), b"@", b"`");
}

// ============================================================================
// MINIMAL
// ============================================================================

#[test]
fn option_minimal_star() {
    x2(brief(NONE), b"a*c", b"abcbc", 0, 5);
    x2(brief(MIN), b"a*c", b"abcbc", 0, 3);
}

#[test]
fn option_minimal_quantifiers() {
    x2(unix(NONE), b"a+", b"aaa", 0, 3);
    x2(unix(MIN), b"a+", b"aaa", 0, 1);
    x2(unix(MIN), b"a*b", b"aab", 0, 3);
    x2(unix(MIN), b"\\(ab\\)*", b"abab", 0, 0);
}

// ============================================================================
// BACKWARD and direction
// ============================================================================

#[test]
fn option_backward_default_direction() {
    xs(unix(BACK), MatchOptions::default(), b"ab", b"ab ab", 5, 3, 5);
    xs(unix(BACK), MatchOptions::default(), b"ab", b"ab ab", 2, 0, 2);
    xs(unix(BACK), MatchOptions::forward(), b"ab", b"ab ab", 1, 3, 5);
}

#[test]
fn option_backward_search_options() {
    xs(unix(NONE), MatchOptions::backward(), b"[0-9]", b"1a2b3", 5, 4, 5);
    xs(unix(NONE), MatchOptions::backward(), b"[0-9]", b"1a2b3", 3, 2, 3);
    ns(unix(NONE), MatchOptions::backward(), b"a", b"ba", 0);
}

#[test]
fn option_backward_multiline_anchor() {
    xs(unix(ML), MatchOptions::backward(), b"^a", b"a\na", 3, 2, 3);
    xs(unix(ML), MatchOptions::backward(), b"^a", b"a\na", 1, 0, 1);
    xs(unix(NONE), MatchOptions::backward(), b"^a", b"a\na", 3, 0, 1);
}

// ============================================================================
// MULTILINE
// ============================================================================

#[test]
fn option_multiline_anchors() {
    n(unix(NONE), b"^b", b"a\nb");
    x2(unix(ML), b"^b", b"a\nb", 2, 3);
    n(unix(NONE), b"a$", b"a\nb");
    x2(unix(ML), b"a$", b"a\nb", 0, 1);
    x2(unix(ML), b"x$", b"ax\nbx", 1, 2);
    x2(unix(ML), b"^$", b"a\n\nb", 2, 2);
    x2(brief(ML), b"<b", b"a\nb", 2, 3);
}

#[test]
fn option_multiline_wildcards() {
    x2(unix(NONE), b"a.b", b"a\nb", 0, 3);
    n(unix(ML), b"a.b", b"a\nb");
    x2(brief(NONE), b"a*", b"ab\ncd", 0, 5);
    x2(brief(ML), b"a*", b"ab\ncd", 0, 2);
    x2(unix(ML), b"[^x]+", b"ab\ncd", 0, 5);
}

// ============================================================================
// Search flags
// ============================================================================

#[test]
fn search_notbol() {
    let notbol = MatchOptions::default().with_flags(SearchFlags::NOTBOL);
    ns(unix(NONE), notbol, b"^a", b"a", 0);
    xs(unix(ML), notbol, b"^a", b"a\na", 0, 2, 3);
}

#[test]
fn search_noteol() {
    let noteol = MatchOptions::default().with_flags(SearchFlags::NOTEOL);
    ns(unix(NONE), noteol, b"a$", b"a", 0);
    xs(unix(ML), noteol, b"a$", b"a\na", 0, 0, 1);
}

#[test]
fn search_anchored() {
    let anchored = MatchOptions::default().with_flags(SearchFlags::ANCHORED);
    ns(unix(NONE), anchored, b"b", b"ab", 0);
    xs(unix(NONE), anchored, b"b", b"ab", 1, 1, 2);
    xs(unix(NONE), anchored, b"x*", b"ab", 0, 0, 0);
}

#[test]
fn search_offsets() {
    xs(unix(NONE), MatchOptions::default(), b"ab", b"ab ab", 1, 3, 5);
    ns(unix(NONE), MatchOptions::default(), b"ab", b"ab ab", 4);
    ns(unix(NONE), MatchOptions::default(), b"", b"ab", 3);
}

#[test]
fn search_no_fast_path_agrees() {
    let slow = MatchOptions::default().with_flags(SearchFlags::NO_FAST_PATH);
    xs(unix(NONE), slow, b"needle", b"haystack with needle", 0, 14, 20);
    xs(unix(IC), slow, b"needle", b"haystack with NEEDLE", 0, 14, 20);
    ns(unix(NONE), slow, b"needle", b"haystack", 0);
}
