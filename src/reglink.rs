// reglink.rs - Fix-up pass over freshly emitted operations.
//
// Resolves every `next` link:
//   - ordinary operations fall through to `i + 1`;
//   - each `Or` links to the operation after its branch's `End`, which is
//     either the next `Or` of the chain or the continuation;
//   - every `End` of a chain links to the continuation after the last
//     branch, so taken and untaken branches converge there;
//   - quantifiers and their `Loop` terminators are paired through a stack.

use smallvec::SmallVec;

use crate::regint::*;

/// Index of the `End` closing the branch that starts at `from`, skipping
/// nested `Open`..`Close` ranges.
fn branch_end(ops: &[Operation], from: usize) -> usize {
    let mut depth = 0usize;
    let mut i = from;
    while i < ops.len() {
        match ops[i].opcode {
            OpCode::Open => depth += 1,
            OpCode::Close => {
                debug_assert!(depth > 0, "close at {} leaves its branch", i);
                depth = depth.saturating_sub(1);
            }
            OpCode::End if depth == 0 => return i,
            OpCode::Finish => break,
            _ => {}
        }
        i += 1;
    }
    debug_assert!(false, "branch starting at {} has no End", from);
    ops.len() - 1
}

fn link_alternation(ops: &mut [Operation], first: usize) {
    let mut ends: SmallVec<[usize; 8]> = SmallVec::new();
    let mut or = first;
    loop {
        let end = branch_end(ops, or + 1);
        ops[or].next = end + 1;
        ends.push(end);
        match ops.get(end + 1) {
            Some(op) if op.opcode == OpCode::Or => or = end + 1,
            _ => break,
        }
    }
    let cont = ends.last().map_or(ops.len() - 1, |&e| e + 1);
    for e in ends {
        ops[e].next = cont;
    }
}

fn link_quantifiers(ops: &mut [Operation]) {
    let mut open: SmallVec<[usize; MAX_NEST]> = SmallVec::new();
    for i in 0..ops.len() {
        if ops[i].opcode.is_quantifier() {
            open.push(i);
        } else if ops[i].opcode == OpCode::Loop {
            let Some(q) = open.pop() else {
                debug_assert!(false, "loop at {} has no quantifier", i);
                continue;
            };
            if let OperationPayload::Quantifier(quant) = &mut ops[q].payload {
                quant.loop_at = i;
            }
            ops[i].payload = OperationPayload::Loop { quant: q };
        }
    }
    debug_assert!(open.is_empty(), "unterminated quantifiers: {:?}", open);
}

/// Resolve all links of a program in place.
pub fn link_program(ops: &mut [Operation]) {
    debug_assert!(
        ops.last().is_some_and(|op| op.opcode == OpCode::Finish),
        "program must end with Finish"
    );

    for (i, op) in ops.iter_mut().enumerate() {
        op.next = match op.opcode {
            OpCode::Or | OpCode::End => NO_LINK,
            OpCode::Finish => i,
            _ => i + 1,
        };
    }

    link_quantifiers(ops);

    for i in 0..ops.len() {
        if ops[i].opcode == OpCode::Or && ops[i].next == NO_LINK {
            link_alternation(ops, i);
        }
    }

    debug_assert!(
        ops.iter().all(|op| op.next != NO_LINK),
        "unresolved link after linking"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompileOptions;
    use crate::regcomp::re_compile;
    use crate::regsyntax::Dialect;

    fn links(pat: &str, dialect: Dialect) -> Vec<(OpCode, usize)> {
        re_compile(pat.as_bytes(), &CompileOptions::new(dialect))
            .unwrap()
            .ops
            .iter()
            .map(|op| (op.opcode, op.next))
            .collect()
    }

    #[test]
    fn flat_alternation() {
        // 0:or 1:a 2:end 3:or 4:b 5:end 6:or 7:c 8:end 9:finish
        let l = links("a|b|c", Dialect::Unix);
        assert_eq!(l[0], (OpCode::Or, 3));
        assert_eq!(l[3], (OpCode::Or, 6));
        assert_eq!(l[6], (OpCode::Or, 9));
        for end in [2, 5, 8] {
            assert_eq!(l[end], (OpCode::End, 9));
        }
        assert_eq!(l[9], (OpCode::Finish, 9));
    }

    #[test]
    fn nested_groups_are_skipped() {
        // 0:or 1:a 2:open 3:or 4:b 5:end 6:or 7:c 8:end 9:close 10:end
        // 11:or 12:d 13:end 14:finish
        let l = links("a{b|c}|d", Dialect::Brief);
        assert_eq!(l[0], (OpCode::Or, 11));
        assert_eq!(l[11], (OpCode::Or, 14));
        assert_eq!(l[10], (OpCode::End, 14));
        assert_eq!(l[13], (OpCode::End, 14));
        // inner chain converges on the close
        assert_eq!(l[3], (OpCode::Or, 6));
        assert_eq!(l[6], (OpCode::Or, 9));
        assert_eq!(l[5], (OpCode::End, 9));
        assert_eq!(l[8], (OpCode::End, 9));
        assert_eq!(l[2], (OpCode::Open, 3));
    }

    #[test]
    fn quantifier_pairs() {
        let prog = re_compile(b"(a(b)*)+c", &CompileOptions::new(Dialect::Extended)).unwrap();
        // 0:+ 1:open 2:a 3:* 4:open 5:b 6:close 7:loop 8:close 9:loop 10:c 11:finish
        assert_eq!(prog.ops[0].quant().map(|q| q.loop_at), Some(9));
        assert_eq!(prog.ops[3].quant().map(|q| q.loop_at), Some(7));
        assert!(matches!(prog.ops[7].payload, OperationPayload::Loop { quant: 3 }));
        assert!(matches!(prog.ops[9].payload, OperationPayload::Loop { quant: 0 }));
        assert_eq!(prog.ops[9].next, 10);
    }

    #[test]
    fn ordinary_ops_fall_through() {
        let l = links("^a.b$", Dialect::Unix);
        for (i, (op, next)) in l.iter().enumerate() {
            if *op != OpCode::Finish {
                assert_eq!(*next, i + 1);
            }
        }
    }
}
