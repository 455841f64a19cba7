// regsyntax.rs - Dialect definitions.
//
// Each dialect is a static table of operator flags. The compiler and the
// replacement compiler never match on `Dialect` directly; they ask the
// table whether a construct is enabled.

use bitflags::bitflags;

bitflags! {
    /// Pattern operators enabled by a dialect.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SyntaxOp: u32 {
        /// `?` matches any single character.
        const QMARK_ANYCHAR = 1 << 0;
        /// `.` matches any single character.
        const DOT_ANYCHAR = 1 << 1;
        /// `*` matches any run of characters.
        const ASTERISK_ANYSTRING = 1 << 2;
        /// `*` repeats the previous element zero or more times.
        const ASTERISK_ZERO_INF = 1 << 3;
        /// `@` repeats the previous element zero or more times.
        const AT_ZERO_INF = 1 << 4;
        /// `+` repeats the previous element one or more times.
        const PLUS_ONE_INF = 1 << 5;
        /// `?` makes the previous element optional.
        const QMARK_ZERO_ONE = 1 << 6;
        /// `{n}`, `{n,}`, `{n,m}` intervals.
        const BRACE_INTERVAL = 1 << 7;
        /// A trailing `?` makes a quantifier lazy.
        const LAZY_QUANTIFIER = 1 << 8;
        /// `{ ... }` capture group.
        const BRACE_GROUP = 1 << 9;
        /// `\( ... \)` capture group.
        const ESC_LPAREN_GROUP = 1 << 10;
        /// `( ... )` capture group.
        const LPAREN_GROUP = 1 << 11;
        /// `|` alternation.
        const VBAR_ALT = 1 << 12;
        /// `<` and `%` match at line start, `>` at line end.
        const LT_GT_LINE_ANCHOR = 1 << 13;
        /// `^` and `$` line anchors.
        const CARET_DOLLAR_ANCHOR = 1 << 14;
        /// `\c` records the cursor position.
        const ESC_C_SETPOS = 1 << 15;
        /// `\<` and `\>` word anchors.
        const ESC_LTGT_WORD = 1 << 16;
        /// `\d \w \s \D \W \S` class shorthands.
        const ESC_CLASS_SHORTHAND = 1 << 17;
    }
}

bitflags! {
    /// Replacement-template sigils enabled by a dialect.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RplOp: u32 {
        /// `\0`..`\9` capture references.
        const ESC_DIGIT = 1 << 0;
        /// `&` inserts the whole match.
        const AMPERSAND_WHOLE = 1 << 1;
        /// `$0`..`$9`, `${n}`, `$+`, `` $` ``, `$&`, `$'`, `$$`.
        const DOLLAR_SIGILS = 1 << 2;
        /// `\&`, `` \` ``, `\'`, `\+` references.
        const ESC_SPECIALS = 1 << 3;
    }
}

/// Selectable pattern grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Legacy BRIEF syntax: `?` any char, `*` any string, `@` zero-or-more, `{}` groups.
    Brief,
    /// Unix syntax: `.`, `*`, `+`, `?`, `\(\)` groups.
    #[default]
    Unix,
    /// POSIX extended syntax: `( )` groups and `{n,m}` intervals.
    Extended,
    /// Perl-flavoured extended syntax with lazy quantifiers.
    Perl,
    /// Ruby-flavoured extended syntax with lazy quantifiers.
    Ruby,
    /// TRE-compatible extended syntax.
    Tre,
}

/// Operator table of one dialect.
#[derive(Debug)]
pub struct SyntaxType {
    pub name: &'static str,
    pub op: SyntaxOp,
    pub rpl: RplOp,
}

impl SyntaxType {
    #[inline]
    pub fn is_op(&self, op: SyntaxOp) -> bool {
        self.op.contains(op)
    }

    #[inline]
    pub fn is_rpl(&self, rpl: RplOp) -> bool {
        self.rpl.contains(rpl)
    }
}

const EXTENDED_OPS: SyntaxOp = SyntaxOp::DOT_ANYCHAR
    .union(SyntaxOp::ASTERISK_ZERO_INF)
    .union(SyntaxOp::PLUS_ONE_INF)
    .union(SyntaxOp::QMARK_ZERO_ONE)
    .union(SyntaxOp::BRACE_INTERVAL)
    .union(SyntaxOp::LPAREN_GROUP)
    .union(SyntaxOp::VBAR_ALT)
    .union(SyntaxOp::CARET_DOLLAR_ANCHOR)
    .union(SyntaxOp::ESC_LTGT_WORD);

const AWK_DOLLAR_RPL: RplOp = RplOp::ESC_DIGIT
    .union(RplOp::AMPERSAND_WHOLE)
    .union(RplOp::DOLLAR_SIGILS);

pub static SYNTAX_BRIEF: SyntaxType = SyntaxType {
    name: "brief",
    op: SyntaxOp::QMARK_ANYCHAR
        .union(SyntaxOp::ASTERISK_ANYSTRING)
        .union(SyntaxOp::AT_ZERO_INF)
        .union(SyntaxOp::PLUS_ONE_INF)
        .union(SyntaxOp::BRACE_GROUP)
        .union(SyntaxOp::ESC_LPAREN_GROUP)
        .union(SyntaxOp::VBAR_ALT)
        .union(SyntaxOp::LT_GT_LINE_ANCHOR)
        .union(SyntaxOp::CARET_DOLLAR_ANCHOR)
        .union(SyntaxOp::ESC_C_SETPOS)
        .union(SyntaxOp::ESC_LTGT_WORD),
    rpl: RplOp::ESC_DIGIT.union(RplOp::AMPERSAND_WHOLE),
};

pub static SYNTAX_UNIX: SyntaxType = SyntaxType {
    name: "unix",
    op: SyntaxOp::DOT_ANYCHAR
        .union(SyntaxOp::ASTERISK_ZERO_INF)
        .union(SyntaxOp::PLUS_ONE_INF)
        .union(SyntaxOp::QMARK_ZERO_ONE)
        .union(SyntaxOp::ESC_LPAREN_GROUP)
        .union(SyntaxOp::VBAR_ALT)
        .union(SyntaxOp::CARET_DOLLAR_ANCHOR)
        .union(SyntaxOp::ESC_C_SETPOS)
        .union(SyntaxOp::ESC_LTGT_WORD),
    rpl: AWK_DOLLAR_RPL,
};

pub static SYNTAX_EXTENDED: SyntaxType = SyntaxType {
    name: "extended",
    op: EXTENDED_OPS,
    rpl: AWK_DOLLAR_RPL,
};

pub static SYNTAX_PERL: SyntaxType = SyntaxType {
    name: "perl",
    op: EXTENDED_OPS
        .union(SyntaxOp::LAZY_QUANTIFIER)
        .union(SyntaxOp::ESC_CLASS_SHORTHAND),
    rpl: RplOp::ESC_DIGIT.union(RplOp::DOLLAR_SIGILS),
};

pub static SYNTAX_RUBY: SyntaxType = SyntaxType {
    name: "ruby",
    op: EXTENDED_OPS
        .union(SyntaxOp::LAZY_QUANTIFIER)
        .union(SyntaxOp::ESC_CLASS_SHORTHAND),
    rpl: RplOp::ESC_DIGIT.union(RplOp::ESC_SPECIALS),
};

pub static SYNTAX_TRE: SyntaxType = SyntaxType {
    name: "tre",
    op: EXTENDED_OPS.union(SyntaxOp::ESC_CLASS_SHORTHAND),
    rpl: AWK_DOLLAR_RPL,
};

impl Dialect {
    pub const ALL: [Dialect; 6] = [
        Dialect::Brief,
        Dialect::Unix,
        Dialect::Extended,
        Dialect::Perl,
        Dialect::Ruby,
        Dialect::Tre,
    ];

    /// The operator table for this dialect.
    pub fn syntax(self) -> &'static SyntaxType {
        match self {
            Dialect::Brief => &SYNTAX_BRIEF,
            Dialect::Unix => &SYNTAX_UNIX,
            Dialect::Extended => &SYNTAX_EXTENDED,
            Dialect::Perl => &SYNTAX_PERL,
            Dialect::Ruby => &SYNTAX_RUBY,
            Dialect::Tre => &SYNTAX_TRE,
        }
    }

    /// Look a dialect up by the name a command layer would use ("brief", "unix", ...).
    pub fn from_name(name: &str) -> Option<Dialect> {
        Dialect::ALL
            .into_iter()
            .find(|d| d.syntax().name.eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        self.syntax().name
    }
}
