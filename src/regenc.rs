// regenc.rs - Byte classification and case folding.
//
// The engine works on raw byte values 0-255; encoding is the caller's
// concern. Every byte above 0x7f is treated as an opaque non-word,
// non-letter value.

// === Character Types ===
pub const CTYPE_NEWLINE: u32 = 0;
pub const CTYPE_ALPHA: u32 = 1;
pub const CTYPE_BLANK: u32 = 2;
pub const CTYPE_CNTRL: u32 = 3;
pub const CTYPE_DIGIT: u32 = 4;
pub const CTYPE_GRAPH: u32 = 5;
pub const CTYPE_LOWER: u32 = 6;
pub const CTYPE_PRINT: u32 = 7;
pub const CTYPE_PUNCT: u32 = 8;
pub const CTYPE_SPACE: u32 = 9;
pub const CTYPE_UPPER: u32 = 10;
pub const CTYPE_XDIGIT: u32 = 11;
pub const CTYPE_WORD: u32 = 12;
pub const CTYPE_ALNUM: u32 = 13;
pub const CTYPE_ASCII: u32 = 14;
pub const MAX_STD_CTYPE: u32 = CTYPE_ASCII;

#[inline]
pub const fn ctype_to_bit(ctype: u32) -> u16 {
    1 << ctype
}

const fn ctype_bits(c: u8) -> u16 {
    let mut bits = 0u16;
    if c == b'\n' {
        bits |= ctype_to_bit(CTYPE_NEWLINE);
    }
    if c.is_ascii_alphabetic() {
        bits |= ctype_to_bit(CTYPE_ALPHA);
    }
    if c == b' ' || c == b'\t' {
        bits |= ctype_to_bit(CTYPE_BLANK);
    }
    if c.is_ascii_control() {
        bits |= ctype_to_bit(CTYPE_CNTRL);
    }
    if c.is_ascii_digit() {
        bits |= ctype_to_bit(CTYPE_DIGIT);
    }
    if c.is_ascii_graphic() {
        bits |= ctype_to_bit(CTYPE_GRAPH) | ctype_to_bit(CTYPE_PRINT);
    }
    if c == b' ' {
        bits |= ctype_to_bit(CTYPE_PRINT);
    }
    if c.is_ascii_lowercase() {
        bits |= ctype_to_bit(CTYPE_LOWER);
    }
    if c.is_ascii_punctuation() {
        bits |= ctype_to_bit(CTYPE_PUNCT);
    }
    // \t \n \v \f \r and space; u8::is_ascii_whitespace leaves out \v.
    if c == b' ' || (c >= 0x09 && c <= 0x0d) {
        bits |= ctype_to_bit(CTYPE_SPACE);
    }
    if c.is_ascii_uppercase() {
        bits |= ctype_to_bit(CTYPE_UPPER);
    }
    if c.is_ascii_hexdigit() {
        bits |= ctype_to_bit(CTYPE_XDIGIT);
    }
    if c.is_ascii_alphanumeric() || c == b'_' {
        bits |= ctype_to_bit(CTYPE_WORD);
    }
    if c.is_ascii_alphanumeric() {
        bits |= ctype_to_bit(CTYPE_ALNUM);
    }
    if c.is_ascii() {
        bits |= ctype_to_bit(CTYPE_ASCII);
    }
    bits
}

const fn build_ctype_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = ctype_bits(i as u8);
        i += 1;
    }
    table
}

pub static BYTE_CTYPE_TABLE: [u16; 256] = build_ctype_table();

#[inline]
pub fn is_code_ctype(c: u8, ctype: u32) -> bool {
    ctype <= MAX_STD_CTYPE && (BYTE_CTYPE_TABLE[c as usize] & ctype_to_bit(ctype)) != 0
}

/// Word characters are `[A-Za-z0-9_]`.
#[inline]
pub fn is_word(c: u8) -> bool {
    is_code_ctype(c, CTYPE_WORD)
}

// === Case folding ===

#[inline]
pub fn fold(c: u8) -> u8 {
    c.to_ascii_lowercase()
}

/// The other-case partner of `c`, or `c` itself for non-letters.
#[inline]
pub fn other_case(c: u8) -> u8 {
    if c.is_ascii_lowercase() {
        c.to_ascii_uppercase()
    } else if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

// === POSIX bracket names ===

struct PosixBracketEntry {
    name: &'static [u8],
    ctype: u32,
}

static POSIX_BRACKETS: &[PosixBracketEntry] = &[
    PosixBracketEntry { name: b"alnum", ctype: CTYPE_ALNUM },
    PosixBracketEntry { name: b"alpha", ctype: CTYPE_ALPHA },
    PosixBracketEntry { name: b"blank", ctype: CTYPE_BLANK },
    PosixBracketEntry { name: b"cntrl", ctype: CTYPE_CNTRL },
    PosixBracketEntry { name: b"digit", ctype: CTYPE_DIGIT },
    PosixBracketEntry { name: b"graph", ctype: CTYPE_GRAPH },
    PosixBracketEntry { name: b"lower", ctype: CTYPE_LOWER },
    PosixBracketEntry { name: b"print", ctype: CTYPE_PRINT },
    PosixBracketEntry { name: b"punct", ctype: CTYPE_PUNCT },
    PosixBracketEntry { name: b"space", ctype: CTYPE_SPACE },
    PosixBracketEntry { name: b"upper", ctype: CTYPE_UPPER },
    PosixBracketEntry { name: b"xdigit", ctype: CTYPE_XDIGIT },
    PosixBracketEntry { name: b"ascii", ctype: CTYPE_ASCII },
    PosixBracketEntry { name: b"word", ctype: CTYPE_WORD },
];

/// Resolve a `[:name:]` class name to its ctype.
pub fn posix_bracket_ctype(name: &[u8]) -> Option<u32> {
    POSIX_BRACKETS
        .iter()
        .find(|pb| pb.name == name)
        .map(|pb| pb.ctype)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_chars() {
        assert!(is_word(b'a'));
        assert!(is_word(b'Z'));
        assert!(is_word(b'7'));
        assert!(is_word(b'_'));
        assert!(!is_word(b'-'));
        assert!(!is_word(b' '));
        assert!(!is_word(0xe9));
    }

    #[test]
    fn ctype_table_agrees_with_std() {
        for c in 0..=255u8 {
            assert_eq!(is_code_ctype(c, CTYPE_DIGIT), c.is_ascii_digit(), "digit {c}");
            assert_eq!(is_code_ctype(c, CTYPE_UPPER), c.is_ascii_uppercase(), "upper {c}");
            assert_eq!(is_code_ctype(c, CTYPE_PUNCT), c.is_ascii_punctuation(), "punct {c}");
        }
        assert!(is_code_ctype(0x0b, CTYPE_SPACE));
        assert!(is_code_ctype(b' ', CTYPE_PRINT));
        assert!(!is_code_ctype(b' ', CTYPE_GRAPH));
        assert!(!is_code_ctype(b'a', 99));
    }

    #[test]
    fn case_helpers() {
        assert_eq!(other_case(b'a'), b'A');
        assert_eq!(other_case(b'Q'), b'q');
        assert_eq!(other_case(b'3'), b'3');
        assert_eq!(fold(b'X'), b'x');
        assert_eq!(fold(b'-'), b'-');
    }

    #[test]
    fn bracket_names() {
        assert_eq!(posix_bracket_ctype(b"digit"), Some(CTYPE_DIGIT));
        assert_eq!(posix_bracket_ctype(b"word"), Some(CTYPE_WORD));
        assert_eq!(posix_bracket_ctype(b"digits"), None);
    }
}
