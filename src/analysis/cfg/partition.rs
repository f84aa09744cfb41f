//! Splitting a linear instruction stream into basic blocks.
//!
//! Partitioning runs in three passes over the stream:
//!
//! 1. Memo hints and marks of labels no branch targets are removed.
//! 2. Every remaining instruction is numbered with the block it belongs to.
//!    A branch or return closes the current block, and a targeted mark opens
//!    a new one unless a block has just been opened.
//! 3. Runs of equally numbered instructions are turned into [`BasicBlock`]s.
//!    Leading marks are dropped and a trailing branch or return becomes the
//!    block [`Terminator`].

use crate::{
    analysis::cfg::{BasicBlock, Terminator},
    tac::{Function, Label, LabelInfo, Tac},
    Error, Result,
};

/// Partitions `function` into basic blocks in layout order.
///
/// The function's instruction stream is consumed. On return every targeted
/// label's [`LabelInfo::block`] names the block its mark opened.
///
/// A function with no instructions (after stripping hints and untargeted
/// marks) yields no blocks. If the last block ends with a conditional branch
/// an empty returning block is appended to receive the fall-through edge.
///
/// # Errors
///
/// Returns [`Error::UnresolvedLabel`] if a branch targets a label that no
/// block starts with.
pub(crate) fn partition(function: &mut Function) -> Result<Vec<BasicBlock>> {
    let temp_count = function.temp_count();
    let code = function.take_code();
    let labels = function.labels_mut();
    for info in labels.iter_mut() {
        info.block = None;
    }

    let code: Vec<Tac> = code
        .into_iter()
        .filter(|tac| match tac {
            Tac::Memo { .. } => false,
            Tac::Mark { label } => labels.get(label.index()).is_some_and(|info| info.targeted),
            _ => true,
        })
        .collect();

    let numbers = number_blocks(&code, labels);
    let groups = group_by_number(code, &numbers);
    let group_count = groups.len();

    let mut blocks = Vec::with_capacity(group_count + 1);
    let mut needs_exit = false;
    for (num, group) in groups.into_iter().enumerate() {
        let (body, terminator) = split_terminator(num, group, group_count, labels)?;
        if let Some(fallthrough) = terminator.next()[1] {
            needs_exit |= fallthrough == group_count;
        }
        log::trace!("partition: block {num} with {} instructions, {terminator}", body.len());
        blocks.push(BasicBlock::new(num, body, terminator, temp_count));
    }

    if needs_exit {
        log::trace!("partition: appending exit block {group_count} for trailing conditional");
        blocks.push(BasicBlock::new(
            group_count,
            Vec::new(),
            Terminator::Return(None),
            temp_count,
        ));
    }

    Ok(blocks)
}

/// Assigns a block number to every instruction and records the block each
/// placed label opens.
fn number_blocks(code: &[Tac], labels: &mut [LabelInfo]) -> Vec<usize> {
    let mut numbers = Vec::with_capacity(code.len());
    let mut index = 0;
    let mut at_start = true;

    for tac in code {
        match tac {
            Tac::Mark { label } => {
                if !at_start {
                    index += 1;
                    at_start = true;
                }
                if let Some(info) = labels.get_mut(label.index()) {
                    info.block = Some(index);
                }
                numbers.push(index);
            }
            t if t.is_terminator() => {
                numbers.push(index);
                index += 1;
                at_start = true;
            }
            _ => {
                numbers.push(index);
                at_start = false;
            }
        }
    }

    numbers
}

/// Collects runs of equally numbered instructions. Block numbers are dense
/// and non-decreasing, so the run index equals the block number.
fn group_by_number(code: Vec<Tac>, numbers: &[usize]) -> Vec<Vec<Tac>> {
    let mut groups: Vec<Vec<Tac>> = Vec::new();
    let mut current = None;

    for (tac, &num) in code.into_iter().zip(numbers) {
        if current != Some(num) {
            groups.push(Vec::new());
            current = Some(num);
        }
        if let Some(group) = groups.last_mut() {
            group.push(tac);
        }
    }

    groups
}

fn split_terminator(
    num: usize,
    group: Vec<Tac>,
    group_count: usize,
    labels: &[LabelInfo],
) -> Result<(Vec<Tac>, Terminator)> {
    let mut body: Vec<Tac> = group
        .into_iter()
        .skip_while(|tac| matches!(tac, Tac::Mark { .. }))
        .collect();

    let terminator = match body.last() {
        None => Terminator::Return(None),
        Some(Tac::Return { value }) => Terminator::Return(*value),
        Some(Tac::Branch { target }) => Terminator::Jump(resolve(*target, labels)?),
        Some(Tac::Beqz { cond, target }) => Terminator::Beqz {
            cond: *cond,
            taken: resolve(*target, labels)?,
            fallthrough: num + 1,
        },
        Some(Tac::Bnez { cond, target }) => Terminator::Bnez {
            cond: *cond,
            taken: resolve(*target, labels)?,
            fallthrough: num + 1,
        },
        Some(_) if num + 1 < group_count => Terminator::Jump(num + 1),
        Some(_) => Terminator::Return(None),
    };

    if body.last().is_some_and(Tac::is_terminator) {
        body.pop();
    }

    Ok((body, terminator))
}

fn resolve(label: Label, labels: &[LabelInfo]) -> Result<usize> {
    labels
        .get(label.index())
        .and_then(|info| info.block)
        .ok_or(Error::UnresolvedLabel(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::cfg::EndKind,
        tac::{FunctionBuilder, Temp},
    };

    #[test]
    fn test_empty_function_has_no_blocks() {
        let mut f = FunctionBuilder::new("empty").finish();
        assert!(partition(&mut f).unwrap().is_empty());

        let mut fb = FunctionBuilder::new("memo_only");
        fb.memo("PARAM");
        let mut f = fb.finish();
        assert!(partition(&mut f).unwrap().is_empty());
    }

    #[test]
    fn test_straight_line_is_one_block() {
        let mut fb = FunctionBuilder::new("f");
        let (a, b) = (fb.new_temp(), fb.new_temp());
        fb.load_imm4(a, 1).assign(b, a).ret(Some(b));
        let mut f = fb.finish();

        let blocks = partition(&mut f).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].instrs().len(), 2);
        assert_eq!(*blocks[0].terminator(), Terminator::Return(Some(b)));
    }

    #[test]
    fn test_untargeted_mark_does_not_split() {
        let mut fb = FunctionBuilder::new("f");
        let a = fb.new_temp();
        let unused = fb.new_label();
        fb.load_imm4(a, 1).mark(unused).parm(a).ret(None);
        let mut f = fb.finish();

        let blocks = partition(&mut f).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].instrs().len(), 2);
        assert_eq!(f.label(unused).unwrap().block, None);
    }

    #[test]
    fn test_targeted_mark_opens_block_and_falls_through() {
        let mut fb = FunctionBuilder::new("f");
        let a = fb.new_temp();
        let top = fb.new_label();
        fb.load_imm4(a, 1)
            .mark(top)
            .parm(a)
            .bnez(a, top)
            .ret(Some(a));
        let mut f = fb.finish();

        let blocks = partition(&mut f).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(*blocks[0].terminator(), Terminator::Jump(1));
        assert_eq!(
            *blocks[1].terminator(),
            Terminator::Bnez {
                cond: a,
                taken: 1,
                fallthrough: 2
            }
        );
        assert_eq!(blocks[2].end_kind(), EndKind::Return);
        assert_eq!(f.label(top).unwrap().block, Some(1));
    }

    #[test]
    fn test_leading_mark_at_function_start() {
        let mut fb = FunctionBuilder::new("f");
        let a = fb.new_temp();
        let top = fb.new_label();
        fb.mark(top).load_imm4(a, 0).beqz(a, top).ret(None);
        let mut f = fb.finish();

        let blocks = partition(&mut f).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(f.label(top).unwrap().block, Some(0));
        assert_eq!(blocks[0].instrs().len(), 1);
    }

    #[test]
    fn test_trailing_conditional_gets_exit_block() {
        let mut fb = FunctionBuilder::new("f");
        let a = fb.new_temp();
        let top = fb.new_label();
        fb.mark(top).load_imm4(a, 0).bnez(a, top);
        let mut f = fb.finish();

        let blocks = partition(&mut f).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].terminator().next(), [Some(0), Some(1)]);
        assert!(blocks[1].is_empty());
        assert_eq!(*blocks[1].terminator(), Terminator::Return(None));
    }

    #[test]
    fn test_trailing_mark_becomes_empty_return_block() {
        let mut fb = FunctionBuilder::new("f");
        let end = fb.new_label();
        fb.branch(end).mark(end);
        let mut f = fb.finish();

        let blocks = partition(&mut f).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(*blocks[0].terminator(), Terminator::Jump(1));
        assert!(blocks[1].is_empty());
        assert_eq!(blocks[1].end_kind(), EndKind::Return);
    }

    #[test]
    fn test_missing_mark_is_unresolved() {
        let mut fb = FunctionBuilder::new("f");
        let nowhere = fb.new_label();
        fb.branch(nowhere);
        let mut f = fb.finish();

        assert!(matches!(
            partition(&mut f),
            Err(Error::UnresolvedLabel(l)) if l == nowhere
        ));
    }

    #[test]
    fn test_memo_is_stripped() {
        let mut fb = FunctionBuilder::new("f");
        let a = fb.new_temp();
        fb.memo("PARAM:_T0:4").parm(a).ret(None);
        let mut f = fb.finish();

        let blocks = partition(&mut f).unwrap();
        assert_eq!(blocks[0].instrs().len(), 1);
        assert_eq!(*blocks[0].instrs()[0].tac(), Tac::Parm { value: Temp::new(0) });
    }
}
