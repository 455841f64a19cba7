// regexec.rs - Matching VM and search driver.
//
// `match_at` walks `next` links from an operation and returns the end of
// the whole match. Every branching point (alternation, quantifier decision,
// `*` run length) recurses and rolls the capture registers back to a trail
// mark when the attempt fails, so untaken paths never leave captures behind.
//
// The search driver tries start positions forward or backward and narrows
// them with the leading literal (KMP or memchr scans) or a leading line
// anchor.

use memchr::{memchr, memrchr};
use smallvec::SmallVec;

use crate::options::{Direction, MatchOptions, MatchResult, SearchFlags};
use crate::regenc::{fold, is_word};
use crate::regint::*;
use crate::regkmp::{rfind_literal, search_forward};

// ============================================================================
// Match state
// ============================================================================

#[derive(Clone, Copy)]
struct Registers {
    open: [Option<usize>; NSUBEXP],
    groups: [Option<(usize, usize)>; NSUBEXP],
    max_group: usize,
    set_pos: Option<usize>,
}

impl Registers {
    const EMPTY: Registers = Registers {
        open: [None; NSUBEXP],
        groups: [None; NSUBEXP],
        max_group: 0,
        set_pos: None,
    };
}

/// Previous value of a register, pushed before every write.
#[derive(Clone, Copy, Debug)]
enum Undo {
    Open(usize, Option<usize>),
    Close(usize, Option<(usize, usize)>, usize),
    SetPos(Option<usize>),
}

/// Iteration state of one active quantifier.
#[derive(Clone, Copy, Debug)]
struct LoopFrame {
    quant: usize,
    count: u32,
    /// Position where the current iteration started.
    start: usize,
}

struct MatchArg<'a> {
    prog: &'a Program,
    text: &'a [u8],
    ignorecase: bool,
    multiline: bool,
    notbol: bool,
    noteol: bool,
    regs: Registers,
    trail: Vec<Undo>,
    frames: SmallVec<[LoopFrame; 8]>,
}

impl<'a> MatchArg<'a> {
    fn new(prog: &'a Program, text: &'a [u8], flags: SearchFlags) -> MatchArg<'a> {
        MatchArg {
            prog,
            text,
            ignorecase: prog.ignorecase(),
            multiline: prog.multiline(),
            notbol: flags.contains(SearchFlags::NOTBOL),
            noteol: flags.contains(SearchFlags::NOTEOL),
            regs: Registers::EMPTY,
            trail: Vec::new(),
            frames: SmallVec::new(),
        }
    }

    // ========================================================================
    // Registers
    // ========================================================================

    #[inline]
    fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Undo every register write made since `mark`.
    fn rollback(&mut self, mark: usize) {
        while self.trail.len() > mark {
            match self.trail.pop() {
                Some(Undo::Open(n, v)) => self.regs.open[n] = v,
                Some(Undo::Close(n, span, max)) => {
                    self.regs.groups[n] = span;
                    self.regs.max_group = max;
                }
                Some(Undo::SetPos(v)) => self.regs.set_pos = v,
                None => break,
            }
        }
    }

    fn open_group(&mut self, n: usize, pos: usize) {
        self.trail.push(Undo::Open(n, self.regs.open[n]));
        self.regs.open[n] = Some(pos);
    }

    fn close_group(&mut self, n: usize, pos: usize) {
        if let Some(start) = self.regs.open[n] {
            self.trail
                .push(Undo::Close(n, self.regs.groups[n], self.regs.max_group));
            self.regs.groups[n] = Some((start, pos));
            self.regs.max_group = self.regs.max_group.max(n);
        }
    }

    fn set_pos(&mut self, pos: usize) {
        self.trail.push(Undo::SetPos(self.regs.set_pos));
        self.regs.set_pos = Some(pos);
    }

    // ========================================================================
    // Single-position tests
    // ========================================================================

    #[inline]
    fn compare(&self, bytes: &[u8], pos: usize) -> bool {
        match self.text.get(pos..pos + bytes.len()) {
            Some(window) if self.ignorecase => {
                window.iter().zip(bytes).all(|(&t, &b)| fold(t) == b)
            }
            Some(window) => window == bytes,
            None => false,
        }
    }

    #[inline]
    fn any_char_at(&self, pos: usize) -> bool {
        match self.text.get(pos) {
            Some(&b'\n') => !self.multiline,
            Some(_) => true,
            None => false,
        }
    }

    #[inline]
    fn class_at(&self, bs: &BitSet, pos: usize) -> bool {
        self.text.get(pos).is_some_and(|&c| bitset_at(bs, c as usize))
    }

    fn is_bol(&self, pos: usize) -> bool {
        (pos == 0 && !self.notbol) || (self.multiline && pos > 0 && self.text[pos - 1] == b'\n')
    }

    fn is_eol(&self, pos: usize) -> bool {
        let len = self.text.len();
        (pos == len && !self.noteol) || (self.multiline && pos < len && self.text[pos] == b'\n')
    }

    fn is_word_begin(&self, pos: usize) -> bool {
        self.text.get(pos).is_some_and(|&c| is_word(c))
            && (pos == 0 || !is_word(self.text[pos - 1]))
    }

    fn is_word_end(&self, pos: usize) -> bool {
        pos > 0
            && is_word(self.text[pos - 1])
            && self.text.get(pos).map_or(true, |&c| !is_word(c))
    }

    /// Match one fixed-width operation at `pos`.
    fn match_single(&self, op: &Operation, pos: usize) -> bool {
        match (&op.opcode, &op.payload) {
            (OpCode::String, OperationPayload::String { bytes, .. }) => self.compare(bytes, pos),
            (OpCode::Class, OperationPayload::Class { bsp }) => self.class_at(bsp, pos),
            (OpCode::Question, _) => self.any_char_at(pos),
            _ => false,
        }
    }

    // ========================================================================
    // Interpreter
    // ========================================================================

    /// Run the program from operation `pc` with the subject at `pos`.
    ///
    /// Returns the end of the whole match. On failure the registers may hold
    /// writes from the failed path; callers roll back to their own mark.
    fn match_at(&mut self, mut pc: usize, mut pos: usize) -> Option<usize> {
        let prog = self.prog;
        loop {
            let op = &prog.ops[pc];
            match op.opcode {
                OpCode::Finish => return Some(pos),
                OpCode::End => {}
                OpCode::Or => return self.match_alternatives(pc, pos),
                OpCode::String | OpCode::Class | OpCode::Question => {
                    if !self.match_single(op, pos) {
                        return None;
                    }
                    pos += op.fixed_width().unwrap_or(0);
                }
                OpCode::Star => return self.match_star(op.next, pos),
                OpCode::Bol => {
                    if !self.is_bol(pos) {
                        return None;
                    }
                }
                OpCode::Eol => {
                    if !self.is_eol(pos) {
                        return None;
                    }
                }
                OpCode::WordBegin => {
                    if !self.is_word_begin(pos) {
                        return None;
                    }
                }
                OpCode::WordEnd => {
                    if !self.is_word_end(pos) {
                        return None;
                    }
                }
                OpCode::SetPos => self.set_pos(pos),
                OpCode::Open => self.open_group(op.mem_num(), pos),
                OpCode::Close => self.close_group(op.mem_num(), pos),
                OpCode::ZeroOrMore | OpCode::OneOrMore | OpCode::ZeroOrOne | OpCode::Repeat => {
                    return self.match_quantifier(pc, pos)
                }
                OpCode::Loop => return self.match_loop(pc, pos),
            }
            pc = op.next;
        }
    }

    /// Try each branch of the `Or` chain starting at `first`, in order.
    fn match_alternatives(&mut self, first: usize, pos: usize) -> Option<usize> {
        let prog = self.prog;
        let ops = &prog.ops;
        let mark = self.mark();
        let mut alt = first;
        loop {
            if let Some(end) = self.match_at(alt + 1, pos) {
                return Some(end);
            }
            self.rollback(mark);
            alt = ops[alt].next;
            if ops.get(alt).map(|op| op.opcode) != Some(OpCode::Or) {
                return None;
            }
        }
    }

    /// Any run of characters, longest first unless minimal.
    fn match_star(&mut self, next: usize, pos: usize) -> Option<usize> {
        let rest = &self.text[pos..];
        let limit = if self.multiline {
            memchr(b'\n', rest).unwrap_or(rest.len())
        } else {
            rest.len()
        };
        let mark = self.mark();
        if self.prog.minimal() {
            for n in 0..=limit {
                if let Some(end) = self.match_at(next, pos + n) {
                    return Some(end);
                }
                self.rollback(mark);
            }
        } else {
            for n in (0..=limit).rev() {
                if let Some(end) = self.match_at(next, pos + n) {
                    return Some(end);
                }
                self.rollback(mark);
            }
        }
        None
    }

    // ========================================================================
    // Quantifiers
    // ========================================================================

    /// Enter the quantifier at `q`: its body runs from `q + 1` up to the
    /// paired `Loop`, which decides between another iteration and the
    /// continuation after the loop.
    fn match_quantifier(&mut self, q: usize, pos: usize) -> Option<usize> {
        let prog = self.prog;
        let quant = *prog.ops[q].quant()?;
        let cont = prog.ops[quant.loop_at].next;

        let body = &prog.ops[q + 1..quant.loop_at];
        if let Some(width) = linear_width(body) {
            return self.match_linear_repeat(body, width, &quant, cont, pos);
        }

        self.frames.push(LoopFrame {
            quant: q,
            count: 0,
            start: pos,
        });
        let idx = self.frames.len() - 1;
        let can_repeat = quant.max != Some(0);
        let can_exit = quant.min == 0;
        let r = self.loop_step(q, &quant, idx, cont, pos, can_repeat, can_exit);
        if r.is_none() {
            self.frames.truncate(idx);
        }
        r
    }

    /// Does a straight-line body match in full at `pos`?
    fn match_linear(&self, body: &[Operation], mut pos: usize) -> bool {
        for op in body {
            if let Some(w) = op.fixed_width() {
                if !self.match_single(op, pos) {
                    return false;
                }
                pos += w;
            }
        }
        true
    }

    /// Apply the group markers of one straight-line iteration at `pos`.
    fn replay_linear(&mut self, body: &[Operation], mut pos: usize) {
        for op in body {
            match op.opcode {
                OpCode::Open => self.open_group(op.mem_num(), pos),
                OpCode::Close => self.close_group(op.mem_num(), pos),
                _ => pos += op.fixed_width().unwrap_or(0),
            }
        }
    }

    /// Straight-line bodies are counted without recursion; only the final
    /// iteration's group spans are recorded.
    fn match_linear_repeat(
        &mut self,
        body: &[Operation],
        width: usize,
        quant: &Quant,
        cont: usize,
        pos: usize,
    ) -> Option<usize> {
        let max = quant.max.map_or(usize::MAX, |m| m as usize);
        let min = quant.min as usize;
        let mut n = 0usize;
        while n < max && self.match_linear(body, pos + n * width) {
            n += 1;
        }
        if n < min {
            return None;
        }
        let mark = self.mark();
        if quant.greedy {
            for k in (min..=n).rev() {
                if let Some(end) = self.try_linear_count(body, width, cont, pos, k) {
                    return Some(end);
                }
                self.rollback(mark);
            }
        } else {
            for k in min..=n {
                if let Some(end) = self.try_linear_count(body, width, cont, pos, k) {
                    return Some(end);
                }
                self.rollback(mark);
            }
        }
        None
    }

    fn try_linear_count(
        &mut self,
        body: &[Operation],
        width: usize,
        cont: usize,
        pos: usize,
        k: usize,
    ) -> Option<usize> {
        if k > 0 {
            self.replay_linear(body, pos + (k - 1) * width);
        }
        self.match_at(cont, pos + k * width)
    }

    /// One iteration of the quantifier paired with `Loop` at `l` ended at
    /// `pos`; count it and choose between repeating and leaving.
    fn match_loop(&mut self, l: usize, pos: usize) -> Option<usize> {
        let prog = self.prog;
        let OperationPayload::Loop { quant: q } = prog.ops[l].payload else {
            debug_assert!(false, "loop at {} has no quantifier link", l);
            return None;
        };
        let quant = *prog.ops[q].quant()?;
        let Some(idx) = self.frames.iter().rposition(|f| f.quant == q) else {
            debug_assert!(false, "loop at {} reached without an active frame", l);
            return None;
        };

        let frame = self.frames[idx];
        let count = frame.count.saturating_add(1);
        self.frames[idx].count = count;

        // An iteration that consumed nothing ends the loop.
        let zero = pos == frame.start;
        let can_repeat = !zero && quant.max.map_or(true, |m| count < m);
        let can_exit = count >= quant.min || zero;

        let r = self.loop_step(q, &quant, idx, prog.ops[l].next, pos, can_repeat, can_exit);
        if r.is_none() {
            self.frames[idx].count = frame.count;
        }
        r
    }

    #[allow(clippy::too_many_arguments)]
    fn loop_step(
        &mut self,
        q: usize,
        quant: &Quant,
        idx: usize,
        cont: usize,
        pos: usize,
        can_repeat: bool,
        can_exit: bool,
    ) -> Option<usize> {
        if quant.greedy {
            if can_repeat {
                if let Some(end) = self.loop_repeat(q, idx, pos) {
                    return Some(end);
                }
            }
            if can_exit {
                return self.loop_exit(idx, cont, pos);
            }
        } else {
            if can_exit {
                if let Some(end) = self.loop_exit(idx, cont, pos) {
                    return Some(end);
                }
            }
            if can_repeat {
                return self.loop_repeat(q, idx, pos);
            }
        }
        None
    }

    /// Run another iteration of the body of `q` from `pos`.
    fn loop_repeat(&mut self, q: usize, idx: usize, pos: usize) -> Option<usize> {
        let frame = self.frames[idx];
        let mark = self.mark();
        self.frames[idx].start = pos;
        let r = self.match_at(q + 1, pos);
        if r.is_none() {
            self.frames[idx] = frame;
            self.rollback(mark);
        }
        r
    }

    /// Leave the loop of frame `idx`; the frame is reinstated on failure.
    fn loop_exit(&mut self, idx: usize, cont: usize, pos: usize) -> Option<usize> {
        let frame = self.frames.remove(idx);
        let mark = self.mark();
        let r = self.match_at(cont, pos);
        if r.is_none() {
            self.frames.insert(idx, frame);
            self.rollback(mark);
        }
        r
    }

    // ========================================================================
    // Entry
    // ========================================================================

    /// Anchored attempt at `start` with fresh registers.
    fn match_start(&mut self, start: usize) -> Option<MatchResult> {
        self.regs = Registers::EMPTY;
        self.trail.clear();
        self.frames.clear();
        let end = self.match_at(0, start)?;
        let mut groups = self.regs.groups;
        groups[0] = Some((start, end));
        Some(MatchResult {
            groups,
            max_group: self.regs.max_group,
            start,
            end,
            set_pos: self.regs.set_pos,
        })
    }
}

/// Width of one iteration when `body` is a run of fixed-width operations and
/// group markers with no branching; `None` otherwise.
fn linear_width(body: &[Operation]) -> Option<usize> {
    let mut width = 0;
    for op in body {
        match op.opcode {
            OpCode::Open | OpCode::Close => {}
            _ => width += op.fixed_width()?,
        }
    }
    (width > 0).then_some(width)
}

// ============================================================================
// Search driver
// ============================================================================

/// Smallest plausible start position at or after `pos`.
fn forward_search(arg: &MatchArg<'_>, pos: usize, fast: bool) -> Option<usize> {
    let text = arg.text;
    if !fast {
        return Some(pos);
    }
    if arg.prog.anchor_bol {
        if pos == 0 && !arg.notbol {
            return Some(0);
        }
        if !arg.multiline {
            return None;
        }
        let from = pos.saturating_sub(1);
        return memchr(b'\n', text.get(from..)?).map(|i| from + i + 1);
    }
    match arg.prog.prefix() {
        Some((pat, table)) => search_forward(pat, table, text, pos, arg.ignorecase),
        None => Some(pos),
    }
}

/// Largest plausible start position at or before `pos`.
fn backward_search(arg: &MatchArg<'_>, pos: usize, fast: bool) -> Option<usize> {
    let text = arg.text;
    if !fast {
        return Some(pos);
    }
    if arg.prog.anchor_bol {
        if arg.multiline {
            if let Some(i) = memrchr(b'\n', &text[..pos]) {
                return Some(i + 1);
            }
        }
        return (!arg.notbol).then_some(0);
    }
    match arg.prog.prefix() {
        Some((pat, _)) => rfind_literal(pat, text, pos, arg.ignorecase),
        None => Some(pos),
    }
}

/// Search `text` for `prog`, starting at `offset`.
///
/// Forward searches try `offset, offset + 1, ..., text.len()`; backward
/// searches try `min(offset, text.len())` down to 0. The first position
/// where the program matches wins.
///
/// Matching recurses once per decision point, so stack use grows with the
/// number of iterations of a quantifier whose body branches (alternation,
/// `*`, nested quantifiers or anchors). Bodies made only of literals,
/// classes, wildcards and groups are counted iteratively. Callers matching
/// branching loops over very long buffers should run on a thread with a
/// larger stack.
pub fn re_exec(
    prog: &Program,
    text: &[u8],
    offset: usize,
    opts: &MatchOptions,
) -> Option<MatchResult> {
    let backward = match opts.direction {
        Some(Direction::Backward) => true,
        Some(Direction::Forward) => false,
        None => prog.backward(),
    };
    let fast = !opts.flags.contains(SearchFlags::NO_FAST_PATH);
    let len = text.len();
    let mut arg = MatchArg::new(prog, text, opts.flags);

    if opts.flags.contains(SearchFlags::ANCHORED) {
        let at = if backward { offset.min(len) } else { offset };
        if at > len {
            return None;
        }
        return arg.match_start(at);
    }

    if backward {
        let mut pos = offset.min(len);
        loop {
            let start = backward_search(&arg, pos, fast)?;
            if let Some(m) = arg.match_start(start) {
                return Some(m);
            }
            if start == 0 {
                return None;
            }
            pos = start - 1;
        }
    } else {
        let mut pos = offset;
        while pos <= len {
            let start = forward_search(&arg, pos, fast)?;
            if let Some(m) = arg.match_start(start) {
                return Some(m);
            }
            pos = start + 1;
        }
        None
    }
}
