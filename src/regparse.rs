// regparse.rs - Pattern lexer helpers.
//
// Escape decoding, number scanning, bracket expressions and intervals.
// The compiler drives the main loop; everything here works on a byte
// cursor `p` into the pattern and reports errors with pattern offsets.

use crate::error::{CompileError, ErrorKind};
use crate::regenc::{
    is_code_ctype, other_case, posix_bracket_ctype, CTYPE_DIGIT, CTYPE_SPACE, CTYPE_WORD,
};
use crate::regint::*;
use crate::regsyntax::{SyntaxOp, SyntaxType};

// ============================================================================
// Cursor helpers
// ============================================================================

#[inline]
pub fn ppeek(p: usize, pattern: &[u8]) -> Option<u8> {
    pattern.get(p).copied()
}

#[inline]
pub fn ppeek_is(p: usize, pattern: &[u8], c: u8) -> bool {
    ppeek(p, pattern) == Some(c)
}

#[inline]
pub fn pfetch(p: &mut usize, pattern: &[u8]) -> Option<u8> {
    let c = ppeek(*p, pattern)?;
    *p += 1;
    Some(c)
}

// ============================================================================
// Number scanning
// ============================================================================

#[inline]
fn xdigitval(c: u8) -> Option<u32> {
    (c as char).to_digit(16)
}

/// Decimal number; `None` when no digit is present. Saturates on overflow.
pub fn scan_number(p: &mut usize, pattern: &[u8]) -> Option<u32> {
    let start = *p;
    let mut num: u32 = 0;
    while let Some(c) = ppeek(*p, pattern) {
        if !c.is_ascii_digit() {
            break;
        }
        num = num.saturating_mul(10).saturating_add((c - b'0') as u32);
        *p += 1;
    }
    (*p > start).then_some(num)
}

/// Up to `maxlen` hex digits, at least `minlen`.
pub fn scan_hexadecimal_number(
    p: &mut usize,
    pattern: &[u8],
    minlen: usize,
    maxlen: usize,
) -> Option<u32> {
    let mut code: u32 = 0;
    let mut n = 0;
    while n < maxlen {
        let Some(val) = ppeek(*p, pattern).and_then(xdigitval) else {
            break;
        };
        code = code.saturating_mul(16).saturating_add(val);
        *p += 1;
        n += 1;
    }
    (n >= minlen).then_some(code)
}

/// Up to `maxlen` octal digits, at least `minlen`.
pub fn scan_octal_number(
    p: &mut usize,
    pattern: &[u8],
    minlen: usize,
    maxlen: usize,
) -> Option<u32> {
    let mut code: u32 = 0;
    let mut n = 0;
    while n < maxlen {
        match ppeek(*p, pattern) {
            Some(c @ b'0'..=b'7') => {
                code = code.saturating_mul(8).saturating_add((c - b'0') as u32);
                *p += 1;
                n += 1;
            }
            _ => break,
        }
    }
    (n >= minlen).then_some(code)
}

/// Up to `maxlen` decimal digits, appended to an already-read value.
fn scan_decimal_tail(p: &mut usize, pattern: &[u8], mut code: u32, maxlen: usize) -> u32 {
    let mut n = 0;
    while n < maxlen {
        match ppeek(*p, pattern) {
            Some(c) if c.is_ascii_digit() => {
                code = code * 10 + (c - b'0') as u32;
                *p += 1;
                n += 1;
            }
            _ => break,
        }
    }
    code
}

fn fetch_braced(
    p: &mut usize,
    pattern: &[u8],
    esc_at: usize,
    scan: fn(&mut usize, &[u8], usize, usize) -> Option<u32>,
) -> Result<u32, CompileError> {
    let bad = CompileError::new(ErrorKind::BadEscape, esc_at);
    let code = scan(p, pattern, 1, 11).ok_or(bad)?;
    if pfetch(p, pattern) != Some(b'}') {
        return Err(bad);
    }
    Ok(code)
}

// ============================================================================
// Escapes
// ============================================================================

/// Fixed control escapes: `\e \f \n \r \t \v`.
pub fn conv_backslash_value(c: u8) -> Option<u8> {
    match c {
        b'e' => Some(0x1B),
        b'f' => Some(0x0C),
        b'n' => Some(b'\n'),
        b'r' => Some(b'\r'),
        b't' => Some(b'\t'),
        b'v' => Some(0x0B),
        _ => None,
    }
}

/// Decode a value escape whose letter `c` has just been consumed.
///
/// Returns `Ok(None)` when `c` does not introduce a value escape; the caller
/// then decides what the escaped byte means. Numeric values above 0xFF are
/// capped.
pub fn fetch_escaped_value(
    p: &mut usize,
    pattern: &[u8],
    c: u8,
    esc_at: usize,
) -> Result<Option<u8>, CompileError> {
    if let Some(v) = conv_backslash_value(c) {
        return Ok(Some(v));
    }
    let bad = CompileError::new(ErrorKind::BadEscape, esc_at);
    let code = match c {
        b'x' => {
            if ppeek_is(*p, pattern, b'{') {
                *p += 1;
                fetch_braced(p, pattern, esc_at, scan_hexadecimal_number)?
            } else {
                scan_hexadecimal_number(p, pattern, 1, 2).ok_or(bad)?
            }
        }
        b'X' => scan_hexadecimal_number(p, pattern, 1, 4).ok_or(bad)?,
        b'o' => {
            if pfetch(p, pattern) != Some(b'{') {
                return Err(bad);
            }
            fetch_braced(p, pattern, esc_at, scan_octal_number)?
        }
        b'0' => scan_octal_number(p, pattern, 0, 3).unwrap_or(0),
        b'1'..=b'9' => scan_decimal_tail(p, pattern, (c - b'0') as u32, 2),
        _ => return Ok(None),
    };
    Ok(Some(code.min(0xFF) as u8))
}

fn ctype_set(ctype: u32) -> BitSet {
    let mut bs: BitSet = [0; BITSET_REAL_SIZE];
    for c in 0..=255u8 {
        if is_code_ctype(c, ctype) {
            bitset_set_bit(&mut bs, c as usize);
        }
    }
    bs
}

/// `\d \w \s` and their negations.
pub fn class_shorthand(c: u8) -> Option<BitSet> {
    let ctype = match c.to_ascii_lowercase() {
        b'd' => CTYPE_DIGIT,
        b'w' => CTYPE_WORD,
        b's' => CTYPE_SPACE,
        _ => return None,
    };
    let mut bs = ctype_set(ctype);
    if c.is_ascii_uppercase() {
        bitset_invert(&mut bs);
    }
    Some(bs)
}

// ============================================================================
// Bracket expressions
// ============================================================================

/// `[:name:]` starts at `p` (just past the `[`) when a `:]` closes it
/// before any other `]`.
fn is_posix_bracket_start(p: usize, pattern: &[u8]) -> bool {
    if !ppeek_is(p, pattern, b':') {
        return false;
    }
    match pattern[p + 1..].iter().position(|&c| c == b']') {
        Some(i) => i > 1 && pattern[p + i] == b':',
        None => false,
    }
}

fn prs_posix_bracket(p: &mut usize, pattern: &[u8], bs: &mut BitSet) -> Result<(), CompileError> {
    let at = *p - 1;
    // skip ':'
    *p += 1;
    let close = pattern[*p..]
        .iter()
        .position(|&c| c == b':')
        .map(|i| *p + i)
        .ok_or(CompileError::new(ErrorKind::InvalidClassName, at))?;
    let ctype = posix_bracket_ctype(&pattern[*p..close])
        .ok_or(CompileError::new(ErrorKind::InvalidClassName, at))?;
    bitset_or(bs, &ctype_set(ctype));
    *p = close + 2;
    Ok(())
}

enum ClassMember {
    Byte(u8),
    Set(BitSet),
}

fn fetch_class_member(
    p: &mut usize,
    pattern: &[u8],
    syn: &SyntaxType,
    open_at: usize,
) -> Result<ClassMember, CompileError> {
    let at = *p;
    let c = pfetch(p, pattern).ok_or(CompileError::new(ErrorKind::UnmatchedBracket, open_at))?;
    if c != b'\\' {
        return Ok(ClassMember::Byte(c));
    }
    let e = pfetch(p, pattern).ok_or(CompileError::new(ErrorKind::BadEscape, at))?;
    if syn.is_op(SyntaxOp::ESC_CLASS_SHORTHAND) {
        if let Some(bs) = class_shorthand(e) {
            return Ok(ClassMember::Set(bs));
        }
    }
    match fetch_escaped_value(p, pattern, e, at)? {
        Some(v) => Ok(ClassMember::Byte(v)),
        None => Ok(ClassMember::Byte(e)),
    }
}

/// Parse a bracket expression; `p` is just past the opening `[`.
///
/// The returned bitmap is already folded for case-insensitive programs and
/// inverted when the class is negated.
pub fn prs_cc(
    p: &mut usize,
    pattern: &[u8],
    syn: &SyntaxType,
    ignorecase: bool,
) -> Result<BitSet, CompileError> {
    let open_at = *p - 1;
    let mut bs: BitSet = [0; BITSET_REAL_SIZE];

    let not = matches!(ppeek(*p, pattern), Some(b'^') | Some(b'~'));
    if not {
        *p += 1;
    }
    if ppeek_is(*p, pattern, b']') {
        bitset_set_bit(&mut bs, b']' as usize);
        *p += 1;
    }

    loop {
        match ppeek(*p, pattern) {
            None => return Err(CompileError::new(ErrorKind::UnmatchedBracket, open_at)),
            Some(b']') => {
                *p += 1;
                break;
            }
            Some(b'[') if is_posix_bracket_start(*p + 1, pattern) => {
                *p += 1;
                prs_posix_bracket(p, pattern, &mut bs)?;
                continue;
            }
            _ => {}
        }

        let member_at = *p;
        let lo = match fetch_class_member(p, pattern, syn, open_at)? {
            ClassMember::Set(set) => {
                bitset_or(&mut bs, &set);
                continue;
            }
            ClassMember::Byte(b) => b,
        };

        let is_range = ppeek_is(*p, pattern, b'-')
            && ppeek(*p + 1, pattern).is_some_and(|c| c != b']');
        if !is_range {
            bitset_set_bit(&mut bs, lo as usize);
            continue;
        }
        *p += 1;
        let hi = match fetch_class_member(p, pattern, syn, open_at)? {
            ClassMember::Byte(b) => b,
            ClassMember::Set(_) => {
                return Err(CompileError::new(ErrorKind::InvalidRange, member_at))
            }
        };
        if hi < lo {
            return Err(CompileError::new(ErrorKind::InvalidRange, member_at));
        }
        bitset_set_range(&mut bs, lo as usize, hi as usize);
    }

    if ignorecase {
        for c in 0..=255u8 {
            if bitset_at(&bs, c as usize) {
                bitset_set_bit(&mut bs, other_case(c) as usize);
            }
        }
    }
    if not {
        bitset_invert(&mut bs);
    }
    Ok(bs)
}

// ============================================================================
// Intervals
// ============================================================================

/// Parse `{n}`, `{n,}`, `{n,m}` or `{,m}`; `p` is just past the `{`.
pub fn fetch_interval(p: &mut usize, pattern: &[u8]) -> Result<(u32, Option<u32>), CompileError> {
    let open_at = *p - 1;
    let invalid = CompileError::new(ErrorKind::InvalidInterval, open_at);

    let low = scan_number(p, pattern);
    let up = if ppeek_is(*p, pattern, b',') {
        *p += 1;
        let up = scan_number(p, pattern);
        if low.is_none() && up.is_none() {
            return Err(invalid);
        }
        up
    } else {
        Some(low.ok_or(invalid)?)
    };
    let low = low.unwrap_or(0);

    match pfetch(p, pattern) {
        Some(b'}') => {}
        None => return Err(CompileError::new(ErrorKind::UnmatchedBrace, open_at)),
        Some(_) => return Err(invalid),
    }
    if low > MAX_REPEAT || up.is_some_and(|u| u > MAX_REPEAT || u < low) {
        return Err(invalid);
    }
    Ok((low, up))
}
