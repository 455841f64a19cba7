// regkmp.rs - Literal substring search.
//
// KMP with a precomputed failure table for long literals, memchr byte
// scans for short ones. The case-folding variants expect the pattern to be
// stored folded already (the compiler folds literals when IGNORECASE is on).

use memchr::{memchr, memchr2, memrchr, memrchr2};

use crate::regenc::{fold, other_case};

/// Build the failure table: `table[i]` is the length of the longest proper
/// prefix of `pat[..=i]` that is also its suffix.
pub fn kmp_table(pat: &[u8]) -> Vec<u16> {
    let mut table = vec![0u16; pat.len()];
    let mut k = 0usize;
    for i in 1..pat.len() {
        while k > 0 && pat[i] != pat[k] {
            k = table[k - 1] as usize;
        }
        if pat[i] == pat[k] {
            k += 1;
        }
        table[i] = k as u16;
    }
    table
}

/// First occurrence of `pat` in `text` starting at or after `from`.
pub fn kmp_search(pat: &[u8], table: &[u16], text: &[u8], from: usize) -> Option<usize> {
    if pat.is_empty() {
        return (from <= text.len()).then_some(from);
    }
    let mut k = 0usize;
    let mut i = from;
    while i < text.len() {
        if k == 0 {
            // Nothing matched yet: jump straight to the next candidate head.
            i += memchr(pat[0], text.get(i..)?)?;
        }
        let c = text[i];
        while k > 0 && pat[k] != c {
            k = table[k - 1] as usize;
        }
        if pat[k] == c {
            k += 1;
        }
        if k == pat.len() {
            return Some(i + 1 - k);
        }
        i += 1;
    }
    None
}

/// Case-folding KMP; `pat` must already be folded.
pub fn kmp_search_fold(pat: &[u8], table: &[u16], text: &[u8], from: usize) -> Option<usize> {
    if pat.is_empty() {
        return (from <= text.len()).then_some(from);
    }
    let head = pat[0];
    let mut k = 0usize;
    let mut i = from;
    while i < text.len() {
        if k == 0 {
            i += memchr2(head, other_case(head), text.get(i..)?)?;
        }
        let c = fold(text[i]);
        while k > 0 && pat[k] != c {
            k = table[k - 1] as usize;
        }
        if pat[k] == c {
            k += 1;
        }
        if k == pat.len() {
            return Some(i + 1 - k);
        }
        i += 1;
    }
    None
}

#[inline]
fn matches_at(pat: &[u8], text: &[u8], s: usize, ignorecase: bool) -> bool {
    match text.get(s..s + pat.len()) {
        Some(window) if ignorecase => window.iter().zip(pat).all(|(&t, &p)| fold(t) == p),
        Some(window) => window == pat,
        None => false,
    }
}

/// Short-literal scan: find the head byte with memchr, verify the tail.
pub fn find_literal(pat: &[u8], text: &[u8], from: usize, ignorecase: bool) -> Option<usize> {
    let Some(&head) = pat.first() else {
        return (from <= text.len()).then_some(from);
    };
    let mut s = from;
    while s < text.len() {
        let hay = &text[s..];
        let hit = if ignorecase {
            memchr2(head, other_case(head), hay)
        } else {
            memchr(head, hay)
        };
        s += hit?;
        if matches_at(pat, text, s, ignorecase) {
            return Some(s);
        }
        s += 1;
    }
    None
}

/// Last occurrence of `pat` starting at or before `start`.
pub fn rfind_literal(pat: &[u8], text: &[u8], start: usize, ignorecase: bool) -> Option<usize> {
    if pat.len() > text.len() {
        return None;
    }
    let last_start = start.min(text.len() - pat.len());
    let Some(&head) = pat.first() else {
        return Some(last_start);
    };
    let mut end = last_start + 1;
    while end > 0 {
        let hay = &text[..end];
        let hit = if ignorecase {
            memrchr2(head, other_case(head), hay)
        } else {
            memrchr(head, hay)
        };
        let s = hit?;
        if matches_at(pat, text, s, ignorecase) {
            return Some(s);
        }
        end = s;
    }
    None
}

/// Forward search choosing KMP when a table is available.
pub fn search_forward(
    pat: &[u8],
    table: Option<&[u16]>,
    text: &[u8],
    from: usize,
    ignorecase: bool,
) -> Option<usize> {
    match table {
        Some(t) if ignorecase => kmp_search_fold(pat, t, text, from),
        Some(t) => kmp_search(pat, t, text, from),
        None => find_literal(pat, text, from, ignorecase),
    }
}
