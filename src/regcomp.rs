// regcomp.rs - Pattern compiler.
//
// Single left-to-right pass over the pattern. Each element (literal run,
// class, wildcard, anchor, group marker) is emitted as one operation block;
// quantifiers are wrapped around the block just emitted by inserting the
// quantifier before it and a `Loop` after it. Alternation inserts an `Or`
// at the start of the enclosing context on its first `|`. The linker then
// resolves every jump and the optimizer picks a search fast path.

use log::{debug, trace};
use smallvec::SmallVec;

use crate::error::{CompileError, ErrorKind};
use crate::options::{CompileOptions, OptionFlags};
use crate::regenc::fold;
use crate::regint::*;
use crate::regkmp::kmp_table;
use crate::reglink::link_program;
use crate::regparse::{
    class_shorthand, fetch_escaped_value, fetch_interval, pfetch, ppeek_is, prs_cc,
};
use crate::regsyntax::{SyntaxOp, SyntaxType};

// ============================================================================
// Compile environment
// ============================================================================

/// Token that closes a group context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Closer {
    Pattern,
    Brace,
    EscParen,
    Paren,
}

impl Closer {
    fn unmatched(self) -> ErrorKind {
        match self {
            Closer::Brace => ErrorKind::UnmatchedBrace,
            Closer::Pattern | Closer::EscParen | Closer::Paren => ErrorKind::UnmatchedParen,
        }
    }
}

struct GroupContext {
    /// First operation of the context body (just after its `Open`).
    start: usize,
    has_alt: bool,
    num: usize,
    closer: Closer,
    open_at: usize,
}

/// What a following quantifier would apply to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Last {
    Nothing,
    Element(usize),
    Quantified,
    Anchor,
}

struct CompileEnv<'a> {
    pattern: &'a [u8],
    p: usize,
    syn: &'static SyntaxType,
    options: CompileOptions,
    ignorecase: bool,
    ops: Vec<Operation>,
    stack: SmallVec<[GroupContext; MAX_NEST]>,
    num_mem: usize,
    last: Last,
    /// The last operation is a `String` that still accepts bytes.
    lit_open: bool,
}

// ============================================================================
// Operation management
// ============================================================================

impl<'a> CompileEnv<'a> {
    fn new(pattern: &'a [u8], options: &CompileOptions) -> CompileEnv<'a> {
        let mut stack = SmallVec::new();
        stack.push(GroupContext {
            start: 0,
            has_alt: false,
            num: 0,
            closer: Closer::Pattern,
            open_at: 0,
        });
        CompileEnv {
            pattern,
            p: 0,
            syn: options.dialect.syntax(),
            options: *options,
            ignorecase: options.flags.contains(OptionFlags::IGNORECASE),
            ops: Vec::new(),
            stack,
            num_mem: 0,
            last: Last::Nothing,
            lit_open: false,
        }
    }

    /// Append an operation and return its index.
    fn add_op(&mut self, op: Operation) -> usize {
        let idx = self.ops.len();
        self.ops.push(op);
        self.lit_open = false;
        idx
    }

    fn add_element(&mut self, op: Operation) {
        let idx = self.add_op(op);
        self.last = Last::Element(idx);
    }

    fn add_anchor(&mut self, opcode: OpCode) {
        self.add_op(Operation::new(opcode));
        self.last = Last::Anchor;
    }

    /// Extend the open literal run with `c`, or start a new one.
    fn add_literal(&mut self, c: u8) {
        let c = if self.ignorecase { fold(c) } else { c };
        if self.lit_open {
            if let Some(Operation {
                payload: OperationPayload::String { bytes, .. },
                ..
            }) = self.ops.last_mut()
            {
                bytes.push(c);
                return;
            }
        }
        let idx = self.add_op(Operation::with_payload(
            OpCode::String,
            OperationPayload::String {
                bytes: vec![c],
                kmp: None,
            },
        ));
        self.lit_open = true;
        self.last = Last::Element(idx);
    }

    // ========================================================================
    // Elements
    // ========================================================================

    fn compile(&mut self) -> Result<(), CompileError> {
        let pattern = self.pattern;
        while let Some(c) = pfetch(&mut self.p, pattern) {
            let at = self.p - 1;
            self.compile_char(c, at)?;
        }
        self.finish()
    }

    fn compile_char(&mut self, c: u8, at: usize) -> Result<(), CompileError> {
        let syn = self.syn;
        match c {
            b'\\' => self.compile_escape(at)?,
            b'[' => {
                let bs = prs_cc(&mut self.p, self.pattern, syn, self.ignorecase)?;
                self.add_element(Operation::class(bs));
            }
            b'|' if syn.is_op(SyntaxOp::VBAR_ALT) => self.compile_alt(),
            b'?' if syn.is_op(SyntaxOp::QMARK_ANYCHAR) => {
                self.add_element(Operation::new(OpCode::Question))
            }
            b'.' if syn.is_op(SyntaxOp::DOT_ANYCHAR) => {
                self.add_element(Operation::new(OpCode::Question))
            }
            b'*' if syn.is_op(SyntaxOp::ASTERISK_ANYSTRING) => {
                self.add_op(Operation::new(OpCode::Star));
                self.last = Last::Quantified;
            }
            b'*' if syn.is_op(SyntaxOp::ASTERISK_ZERO_INF) => {
                self.compile_quantifier(OpCode::ZeroOrMore, 0, None, at)?
            }
            b'@' if syn.is_op(SyntaxOp::AT_ZERO_INF) => {
                self.compile_quantifier(OpCode::ZeroOrMore, 0, None, at)?
            }
            b'+' if syn.is_op(SyntaxOp::PLUS_ONE_INF) => {
                self.compile_quantifier(OpCode::OneOrMore, 1, None, at)?
            }
            b'?' if syn.is_op(SyntaxOp::QMARK_ZERO_ONE) => {
                self.compile_quantifier(OpCode::ZeroOrOne, 0, Some(1), at)?
            }
            b'{' if syn.is_op(SyntaxOp::BRACE_INTERVAL) => {
                let (min, max) = fetch_interval(&mut self.p, self.pattern)?;
                self.compile_quantifier(OpCode::Repeat, min, max, at)?
            }
            b'{' if syn.is_op(SyntaxOp::BRACE_GROUP) => self.open_group(Closer::Brace, at)?,
            b'}' if syn.is_op(SyntaxOp::BRACE_GROUP) => self.close_group(Closer::Brace, at)?,
            b'(' if syn.is_op(SyntaxOp::LPAREN_GROUP) => self.open_group(Closer::Paren, at)?,
            b')' if syn.is_op(SyntaxOp::LPAREN_GROUP) => self.close_group(Closer::Paren, at)?,
            b'<' | b'%' if syn.is_op(SyntaxOp::LT_GT_LINE_ANCHOR) => self.add_anchor(OpCode::Bol),
            b'>' if syn.is_op(SyntaxOp::LT_GT_LINE_ANCHOR) => self.add_anchor(OpCode::Eol),
            b'^' if syn.is_op(SyntaxOp::CARET_DOLLAR_ANCHOR) => self.add_anchor(OpCode::Bol),
            b'$' if syn.is_op(SyntaxOp::CARET_DOLLAR_ANCHOR) => self.add_anchor(OpCode::Eol),
            _ => self.add_literal(c),
        }
        Ok(())
    }

    /// Compile the escape whose backslash sits at `at`.
    fn compile_escape(&mut self, at: usize) -> Result<(), CompileError> {
        let syn = self.syn;
        let e = pfetch(&mut self.p, self.pattern)
            .ok_or(CompileError::new(ErrorKind::BadEscape, at))?;
        match e {
            b'(' if syn.is_op(SyntaxOp::ESC_LPAREN_GROUP) => self.open_group(Closer::EscParen, at)?,
            b')' if syn.is_op(SyntaxOp::ESC_LPAREN_GROUP) => {
                self.close_group(Closer::EscParen, at)?
            }
            b'c' if syn.is_op(SyntaxOp::ESC_C_SETPOS) => self.add_anchor(OpCode::SetPos),
            b'<' if syn.is_op(SyntaxOp::ESC_LTGT_WORD) => self.add_anchor(OpCode::WordBegin),
            b'>' if syn.is_op(SyntaxOp::ESC_LTGT_WORD) => self.add_anchor(OpCode::WordEnd),
            _ => {
                if syn.is_op(SyntaxOp::ESC_CLASS_SHORTHAND) {
                    if let Some(bs) = class_shorthand(e) {
                        self.add_element(Operation::class(bs));
                        return Ok(());
                    }
                }
                let v = fetch_escaped_value(&mut self.p, self.pattern, e, at)?;
                self.add_literal(v.unwrap_or(e));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Quantifiers
    // ========================================================================

    /// Wrap the last element in a quantifier of `min..=max` iterations
    /// (`None` is unbounded).
    ///
    /// The quantifier is inserted in front of the element block and a `Loop`
    /// is appended after it; a trailing `?` makes it lazy where the dialect
    /// allows. Fails with `EmptyExpression` when nothing precedes it.
    fn compile_quantifier(
        &mut self,
        opcode: OpCode,
        min: u32,
        max: Option<u32>,
        at: usize,
    ) -> Result<(), CompileError> {
        let Last::Element(mut start) = self.last else {
            return Err(CompileError::new(ErrorKind::EmptyExpression, at));
        };

        // A quantifier after a literal run applies to its last byte only.
        if let OperationPayload::String { bytes, .. } = &mut self.ops[start].payload {
            if bytes.len() > 1 {
                let tail = bytes.pop();
                if let Some(c) = tail {
                    start = self.add_op(Operation::with_payload(
                        OpCode::String,
                        OperationPayload::String {
                            bytes: vec![c],
                            kmp: None,
                        },
                    ));
                }
            }
        }

        let mut greedy = !self.options.flags.contains(OptionFlags::MINIMAL);
        if self.syn.is_op(SyntaxOp::LAZY_QUANTIFIER) && ppeek_is(self.p, self.pattern, b'?') {
            self.p += 1;
            greedy = false;
        }

        self.ops
            .insert(start, Operation::quantifier(opcode, min, max, greedy));
        self.add_op(Operation::with_payload(
            OpCode::Loop,
            OperationPayload::Loop { quant: NO_LINK },
        ));
        self.last = Last::Quantified;
        Ok(())
    }

    // ========================================================================
    // Groups and alternation
    // ========================================================================

    /// Emit `Open` for the next capture number and push a context that
    /// `closer` must end. Fails with `LevelOverflow` past the nesting or
    /// capture limits.
    fn open_group(&mut self, closer: Closer, at: usize) -> Result<(), CompileError> {
        if self.stack.len() >= MAX_NEST || self.num_mem + 1 >= NSUBEXP {
            return Err(CompileError::new(ErrorKind::LevelOverflow, at));
        }
        self.num_mem += 1;
        let num = self.num_mem;
        self.add_op(Operation::mem(OpCode::Open, num));
        self.stack.push(GroupContext {
            start: self.ops.len(),
            has_alt: false,
            num,
            closer,
            open_at: at,
        });
        self.last = Last::Nothing;
        Ok(())
    }

    /// Pop the innermost context; the whole group becomes the last element.
    fn close_group(&mut self, closer: Closer, at: usize) -> Result<(), CompileError> {
        let matches_top = self.stack.len() > 1
            && self.stack.last().is_some_and(|ctx| ctx.closer == closer);
        if !matches_top {
            return Err(CompileError::new(closer.unmatched(), at));
        }
        let Some(ctx) = self.stack.pop() else {
            return Err(CompileError::new(closer.unmatched(), at));
        };
        if ctx.has_alt {
            self.add_op(Operation::new(OpCode::End));
        }
        self.add_op(Operation::mem(OpCode::Close, ctx.num));
        self.last = Last::Element(ctx.start - 1);
        Ok(())
    }

    fn compile_alt(&mut self) {
        if let Some(ctx) = self.stack.last_mut() {
            if !ctx.has_alt {
                self.ops.insert(ctx.start, Operation::new(OpCode::Or));
                ctx.has_alt = true;
            }
        }
        self.add_op(Operation::new(OpCode::End));
        self.add_op(Operation::new(OpCode::Or));
        self.last = Last::Nothing;
    }

    /// Check for unclosed groups, then terminate the program.
    fn finish(&mut self) -> Result<(), CompileError> {
        if self.stack.len() > 1 {
            if let Some(ctx) = self.stack.last() {
                return Err(CompileError::new(ctx.closer.unmatched(), ctx.open_at));
            }
        }
        if self.stack.first().is_some_and(|root| root.has_alt) {
            self.add_op(Operation::new(OpCode::End));
        }
        self.add_op(Operation::new(OpCode::Finish));
        set_kmp_tables(&mut self.ops);
        Ok(())
    }
}

// ============================================================================
// Post-processing
// ============================================================================

/// Attach failure tables to literals of `KMP_MIN_LEN..=KMP_MAX_LEN` bytes.
fn set_kmp_tables(ops: &mut [Operation]) {
    for op in ops.iter_mut() {
        if let OperationPayload::String { bytes, kmp } = &mut op.payload {
            if (KMP_MIN_LEN..=KMP_MAX_LEN).contains(&bytes.len()) {
                *kmp = Some(kmp_table(bytes));
            }
        }
    }
}

/// Choose the search strategy from the first consuming operation.
fn set_optimize_info(prog: &mut Program) {
    let Some(first) = prog.ops.iter().position(|op| op.opcode != OpCode::Open) else {
        return;
    };
    match &prog.ops[first].payload {
        OperationPayload::String { kmp, .. } => {
            prog.prefix_at = first;
            prog.optimize = if kmp.is_some() {
                OptimizeType::StrKmp
            } else {
                OptimizeType::Str
            };
        }
        _ if prog.ops[first].opcode == OpCode::Bol => prog.anchor_bol = true,
        _ => {}
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Compile `pattern` under `options` into a linked program.
pub fn re_compile(pattern: &[u8], options: &CompileOptions) -> Result<Program, CompileError> {
    let mut env = CompileEnv::new(pattern, options);
    if let Err(err) = env.compile() {
        debug!(
            "compile of {:?} ({}) failed: {}",
            String::from_utf8_lossy(pattern),
            options.dialect.name(),
            err
        );
        return Err(err);
    }

    let mut ops = env.ops;
    link_program(&mut ops);

    let mut prog = Program {
        ops,
        options: *options,
        num_mem: env.num_mem,
        optimize: OptimizeType::None,
        prefix_at: 0,
        anchor_bol: false,
    };
    set_optimize_info(&mut prog);
    trace!(
        "compiled {:?}: {} ops, {} groups, optimize {:?}, anchor_bol {}",
        String::from_utf8_lossy(pattern),
        prog.len(),
        prog.num_mem,
        prog.optimize,
        prog.anchor_bol
    );
    Ok(prog)
}
