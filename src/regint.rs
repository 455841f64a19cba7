// regint.rs - Internal types.
// OpCode, Operation, BitSet, Program and engine-wide constants.

use std::fmt::Write as _;

use crate::options::{CompileOptions, OptionFlags};

// === Config Constants ===

/// Capture slots, including slot 0 for the whole match.
pub const NSUBEXP: usize = 10;
/// Maximum group nesting depth (the pattern itself counts as one level).
pub const MAX_NEST: usize = 10;
/// Shortest literal run that carries a KMP failure table.
pub const KMP_MIN_LEN: usize = 4;
/// Longest literal run that carries a KMP failure table.
pub const KMP_MAX_LEN: usize = 0x1FFF;
/// Largest bound accepted in an interval `{n,m}`.
pub const MAX_REPEAT: u32 = 0xFFFF;

/// Placeholder for a link the linker has not resolved yet.
pub const NO_LINK: usize = usize::MAX;

// === BitSet (256 bits for byte classes) ===
pub const BITS_PER_BYTE: usize = 8;
pub const SINGLE_BYTE_SIZE: usize = 1 << BITS_PER_BYTE;
pub const BITS_IN_ROOM: usize = 32;
pub const BITSET_REAL_SIZE: usize = SINGLE_BYTE_SIZE / BITS_IN_ROOM;
pub type Bits = u32;
pub type BitSet = [Bits; BITSET_REAL_SIZE];

#[inline]
pub fn bs_room(pos: usize) -> usize {
    pos >> 5
}

#[inline]
pub fn bs_bit(pos: usize) -> u32 {
    1u32 << (pos & 0x1f)
}

#[inline]
pub fn bitset_at(bs: &BitSet, pos: usize) -> bool {
    (bs[bs_room(pos)] & bs_bit(pos)) != 0
}

#[inline]
pub fn bitset_set_bit(bs: &mut BitSet, pos: usize) {
    bs[bs_room(pos)] |= bs_bit(pos);
}

pub fn bitset_set_range(bs: &mut BitSet, from: usize, to: usize) {
    for pos in from..=to.min(SINGLE_BYTE_SIZE - 1) {
        bitset_set_bit(bs, pos);
    }
}

pub fn bitset_invert(bs: &mut BitSet) {
    for room in bs.iter_mut() {
        *room = !*room;
    }
}

pub fn bitset_or(dst: &mut BitSet, src: &BitSet) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d |= *s;
    }
}

// === OpCode Enum ===
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    Finish = 0,
    End = 1,
    Or = 2,
    String = 3,
    Class = 4,
    Bol = 5,
    Eol = 6,
    WordBegin = 7,
    WordEnd = 8,
    SetPos = 9,
    Question = 10,
    Star = 11,
    ZeroOrMore = 12,
    OneOrMore = 13,
    ZeroOrOne = 14,
    Repeat = 15,
    Loop = 16,
    Open = 17,
    Close = 18,
}

impl OpCode {
    #[inline]
    pub fn is_quantifier(self) -> bool {
        matches!(
            self,
            OpCode::ZeroOrMore | OpCode::OneOrMore | OpCode::ZeroOrOne | OpCode::Repeat
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            OpCode::Finish => "finish",
            OpCode::End => "end",
            OpCode::Or => "or",
            OpCode::String => "string",
            OpCode::Class => "class",
            OpCode::Bol => "bol",
            OpCode::Eol => "eol",
            OpCode::WordBegin => "word-begin",
            OpCode::WordEnd => "word-end",
            OpCode::SetPos => "set-pos",
            OpCode::Question => "any-char",
            OpCode::Star => "any-string",
            OpCode::ZeroOrMore => "zero-or-more",
            OpCode::OneOrMore => "one-or-more",
            OpCode::ZeroOrOne => "zero-or-one",
            OpCode::Repeat => "repeat",
            OpCode::Loop => "loop",
            OpCode::Open => "open",
            OpCode::Close => "close",
        }
    }
}

// === Operation (program instruction) ===

/// Quantifier bounds and the index of the paired `Loop`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quant {
    pub min: u32,
    /// `None` is unbounded.
    pub max: Option<u32>,
    pub greedy: bool,
    pub loop_at: usize,
}

#[derive(Clone, Debug)]
pub struct Operation {
    pub opcode: OpCode,
    /// Index of the next operation at the same nesting level.
    pub next: usize,
    pub payload: OperationPayload,
}

#[derive(Clone, Debug)]
pub enum OperationPayload {
    None,
    String {
        bytes: Vec<u8>,
        kmp: Option<Vec<u16>>,
    },
    Class {
        bsp: Box<BitSet>,
    },
    Quantifier(Quant),
    Loop {
        quant: usize,
    },
    Mem {
        num: usize,
    },
}

impl Operation {
    pub fn new(opcode: OpCode) -> Operation {
        Operation {
            opcode,
            next: NO_LINK,
            payload: OperationPayload::None,
        }
    }

    pub fn with_payload(opcode: OpCode, payload: OperationPayload) -> Operation {
        Operation {
            opcode,
            next: NO_LINK,
            payload,
        }
    }

    pub fn class(bs: BitSet) -> Operation {
        Operation::with_payload(OpCode::Class, OperationPayload::Class { bsp: Box::new(bs) })
    }

    pub fn mem(opcode: OpCode, num: usize) -> Operation {
        Operation::with_payload(opcode, OperationPayload::Mem { num })
    }

    pub fn quantifier(opcode: OpCode, min: u32, max: Option<u32>, greedy: bool) -> Operation {
        debug_assert!(opcode.is_quantifier());
        Operation::with_payload(
            opcode,
            OperationPayload::Quantifier(Quant {
                min,
                max,
                greedy,
                loop_at: NO_LINK,
            }),
        )
    }

    pub fn string_bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            OperationPayload::String { bytes, .. } => Some(bytes),
            _ => None,
        }
    }

    pub fn quant(&self) -> Option<&Quant> {
        match &self.payload {
            OperationPayload::Quantifier(q) => Some(q),
            _ => None,
        }
    }

    pub fn mem_num(&self) -> usize {
        match self.payload {
            OperationPayload::Mem { num } => num,
            _ => 0,
        }
    }

    /// Bytes consumed by this operation when it is a fixed-width single
    /// element, `None` otherwise.
    pub fn fixed_width(&self) -> Option<usize> {
        match (&self.opcode, &self.payload) {
            (OpCode::String, OperationPayload::String { bytes, .. }) => Some(bytes.len()),
            (OpCode::Class, _) | (OpCode::Question, _) => Some(1),
            _ => None,
        }
    }
}

// === Optimize Type ===
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptimizeType {
    None,
    /// Leading literal found with a byte scan.
    Str,
    /// Leading literal found with KMP.
    StrKmp,
}

// === Program ===

/// A compiled, linked pattern.
#[derive(Clone, Debug)]
pub struct Program {
    pub ops: Vec<Operation>,
    pub options: CompileOptions,
    /// Number of capture groups in the pattern.
    pub num_mem: usize,
    pub optimize: OptimizeType,
    /// Index of the leading `String` used by the search fast path.
    pub prefix_at: usize,
    /// The pattern starts with a line anchor.
    pub anchor_bol: bool,
}

impl Program {
    #[inline]
    pub fn ignorecase(&self) -> bool {
        self.options.flags.contains(OptionFlags::IGNORECASE)
    }

    #[inline]
    pub fn minimal(&self) -> bool {
        self.options.flags.contains(OptionFlags::MINIMAL)
    }

    #[inline]
    pub fn backward(&self) -> bool {
        self.options.flags.contains(OptionFlags::BACKWARD)
    }

    #[inline]
    pub fn multiline(&self) -> bool {
        self.options.flags.contains(OptionFlags::MULTILINE)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The leading literal and its KMP table, when the fast path applies.
    pub fn prefix(&self) -> Option<(&[u8], Option<&[u16]>)> {
        if self.optimize == OptimizeType::None {
            return None;
        }
        match &self.ops.get(self.prefix_at)?.payload {
            OperationPayload::String { bytes, kmp } => Some((bytes, kmp.as_deref())),
            _ => None,
        }
    }

    /// Human-readable listing, one operation per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (i, op) in self.ops.iter().enumerate() {
            let _ = write!(out, "{:3}: {}", i, op.opcode.name());
            match &op.payload {
                OperationPayload::String { bytes, kmp } => {
                    let _ = write!(out, " {:?}", String::from_utf8_lossy(bytes));
                    if kmp.is_some() {
                        out.push_str(" kmp");
                    }
                }
                OperationPayload::Class { bsp } => {
                    let n: u32 = bsp.iter().map(|r| r.count_ones()).sum();
                    let _ = write!(out, " ({} bytes)", n);
                }
                OperationPayload::Quantifier(q) => {
                    let _ = match q.max {
                        Some(max) => write!(out, " {{{},{}}}", q.min, max),
                        None => write!(out, " {{{},}}", q.min),
                    };
                    if !q.greedy {
                        out.push_str(" lazy");
                    }
                    let _ = write!(out, " loop={}", q.loop_at);
                }
                OperationPayload::Loop { quant } => {
                    let _ = write!(out, " quant={}", quant);
                }
                OperationPayload::Mem { num } => {
                    let _ = write!(out, " {}", num);
                }
                OperationPayload::None => {}
            }
            if op.next != NO_LINK {
                let _ = write!(out, " -> {}", op.next);
            }
            out.push('\n');
        }
        out
    }
}
