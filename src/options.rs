// options.rs - Compile and search options, match results.

use std::ops::Range;

use bitflags::bitflags;

use crate::regint::NSUBEXP;
use crate::regsyntax::Dialect;

bitflags! {
    /// Options fixed when a pattern is compiled.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OptionFlags: u32 {
        /// Fold ASCII case on both sides of every comparison.
        const IGNORECASE = 1 << 0;
        /// Quantifiers and `*` (Brief) prefer the shortest match.
        const MINIMAL = 1 << 1;
        /// Searches run backward unless the caller says otherwise.
        const BACKWARD = 1 << 2;
        /// The buffer may span lines: anchors also match at `\n` and
        /// wildcards stop at it.
        const MULTILINE = 1 << 3;
    }
}

bitflags! {
    /// Per-search flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SearchFlags: u32 {
        /// Buffer start is not a line start.
        const NOTBOL = 1 << 0;
        /// Buffer end is not a line end.
        const NOTEOL = 1 << 1;
        /// Try every position instead of scanning for the leading literal.
        const NO_FAST_PATH = 1 << 2;
        /// Only try the start offset itself.
        const ANCHORED = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompileOptions {
    pub dialect: Dialect,
    pub flags: OptionFlags,
}

impl CompileOptions {
    pub fn new(dialect: Dialect) -> CompileOptions {
        CompileOptions {
            dialect,
            flags: OptionFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: OptionFlags) -> CompileOptions {
        self.flags |= flags;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatchOptions {
    /// `None` uses the program's default direction.
    pub direction: Option<Direction>,
    pub flags: SearchFlags,
}

impl MatchOptions {
    pub fn forward() -> MatchOptions {
        MatchOptions {
            direction: Some(Direction::Forward),
            flags: SearchFlags::empty(),
        }
    }

    pub fn backward() -> MatchOptions {
        MatchOptions {
            direction: Some(Direction::Backward),
            flags: SearchFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: SearchFlags) -> MatchOptions {
        self.flags |= flags;
        self
    }
}

// === MatchResult ===

/// Outcome of a successful search.
///
/// Spans are byte offsets into the searched buffer; slot 0 is the whole
/// match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub groups: [Option<(usize, usize)>; NSUBEXP],
    /// Highest group number that closed during the match, 0 if none.
    pub max_group: usize,
    pub start: usize,
    pub end: usize,
    /// Position recorded by the cursor escape `\c`.
    pub set_pos: Option<usize>,
}

impl MatchResult {
    pub fn group(&self, n: usize) -> Option<(usize, usize)> {
        self.groups.get(n).copied().flatten()
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
