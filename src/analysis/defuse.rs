//! Definition-use chains.
//!
//! For every instruction that defines a temp, this module records the points
//! that may read the defined value before it is overwritten:
//!
//! 1. Later instructions of the defining block, in order, up to the first
//!    instruction that redefines the temp. A redefinition that also reads
//!    the temp (`t = t + 1`) is itself a consumer.
//! 2. The terminator of the defining block, if the definition survives to
//!    the end of the block and the terminator tests or returns the temp.
//! 3. Instructions and terminators of other blocks, found by a depth-first
//!    walk over successors that is cut off at every redefinition.
//!
//! Consumers are identified by block number and [`DuPosition`]: a 1-based
//! line in the block body, or [`DuPosition::EndOfBlock`] for the terminator.
//!
//! # Basic Usage
//!
//! ```rust
//! use tacflow::{analysis::DuPosition, FlowGraph, FunctionBuilder};
//!
//! // t0 = 1; parm t0; return t0
//! let mut fb = FunctionBuilder::new("f");
//! let t0 = fb.new_temp();
//! fb.load_imm4(t0, 1).parm(t0).ret(Some(t0));
//! let graph = FlowGraph::new(fb.finish())?;
//!
//! let chain = graph.block(0).and_then(|b| b.instrs()[0].du_chain()).unwrap_or_default();
//! assert_eq!(chain.len(), 2);
//! assert_eq!(chain[0].position, DuPosition::Line(2));
//! assert_eq!(chain[1].position, DuPosition::EndOfBlock);
//! # Ok::<(), tacflow::Error>(())
//! ```

use std::fmt;

use crate::{
    analysis::cfg::BasicBlock,
    tac::Temp,
    utils::BitSet,
    Error, Result,
};

/// Where inside a block a consumer reads the defined value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DuPosition {
    /// 1-based position in the block body.
    Line(usize),
    /// The block terminator (the tested or returned temp).
    EndOfBlock,
}

/// One consumer of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuUse {
    /// Block holding the consumer.
    pub block: usize,
    /// Consumer position within the block.
    pub position: DuPosition,
}

impl DuUse {
    /// Creates a consumer at a 1-based body line.
    #[must_use]
    pub const fn line(block: usize, line: usize) -> Self {
        Self {
            block,
            position: DuPosition::Line(line),
        }
    }

    /// Creates a consumer at the terminator of `block`.
    #[must_use]
    pub const fn end_of_block(block: usize) -> Self {
        Self {
            block,
            position: DuPosition::EndOfBlock,
        }
    }
}

impl fmt::Display for DuUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            DuPosition::Line(line) => write!(f, "B{}:{line}", self.block),
            DuPosition::EndOfBlock => write!(f, "B{}:end", self.block),
        }
    }
}

/// Scans `block` body from index `from` and records reads of `temp`.
/// Returns `true` if an instruction redefined `temp`.
fn scan_block(
    block: &BasicBlock,
    block_idx: usize,
    from: usize,
    temp: Temp,
    chain: &mut Vec<DuUse>,
) -> bool {
    for (pos, instr) in block.instrs().iter().enumerate().skip(from) {
        if instr.tac().reads(temp) {
            chain.push(DuUse::line(block_idx, pos + 1));
        }
        if instr.tac().def() == Some(temp) {
            return true;
        }
    }

    if block.var() == Some(temp) {
        chain.push(DuUse::end_of_block(block_idx));
    }
    false
}

/// Computes the consumers of the definition at `blocks[block_idx]` body
/// index `instr_idx`, which defines `temp`.
///
/// # Errors
///
/// Returns [`Error::RecursionLimit`] if the successor walk exceeds the block
/// count in depth.
pub(crate) fn du_chain(
    blocks: &[BasicBlock],
    block_idx: usize,
    instr_idx: usize,
    temp: Temp,
) -> Result<Vec<DuUse>> {
    let mut chain = Vec::new();
    if scan_block(&blocks[block_idx], block_idx, instr_idx + 1, temp, &mut chain) {
        return Ok(chain);
    }

    let limit = blocks.len();
    let mut visited = BitSet::new(limit);
    let mut stack: Vec<(usize, usize)> = Vec::new();
    push_successors(&blocks[block_idx], 1, &mut stack);

    while let Some((current, depth)) = stack.pop() {
        if depth > limit {
            return Err(Error::RecursionLimit(limit));
        }
        if !visited.insert(current) {
            continue;
        }
        let block = &blocks[current];
        if !scan_block(block, current, 0, temp, &mut chain) {
            push_successors(block, depth + 1, &mut stack);
        }
    }

    Ok(chain)
}

/// Pushes successors so that the taken edge is explored first.
fn push_successors(block: &BasicBlock, depth: usize, stack: &mut Vec<(usize, usize)>) {
    let [first, second] = block.terminator().next();
    stack.extend(second.map(|s| (s, depth)));
    stack.extend(first.map(|s| (s, depth)));
}

/// Attaches a DU chain to every defining instruction of every block and
/// clears the chain of every other instruction. Returns the number of
/// definitions processed.
pub(crate) fn compute_du_chains(blocks: &mut [BasicBlock]) -> Result<usize> {
    let mut chains = Vec::with_capacity(blocks.len());
    let mut definitions = 0;
    for (block_idx, block) in blocks.iter().enumerate() {
        let mut block_chains = Vec::with_capacity(block.instrs().len());
        for (instr_idx, instr) in block.instrs().iter().enumerate() {
            let chain = match instr.tac().def() {
                Some(temp) => {
                    definitions += 1;
                    Some(du_chain(blocks, block_idx, instr_idx, temp)?)
                }
                None => None,
            };
            block_chains.push(chain);
        }
        chains.push(block_chains);
    }

    for (block, block_chains) in blocks.iter_mut().zip(chains) {
        for (instr, chain) in block.instrs_mut().iter_mut().zip(block_chains) {
            instr.set_du_chain(chain);
        }
    }

    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::cfg::Terminator,
        tac::{BinaryOp, Tac},
    };

    fn t(n: u32) -> Temp {
        Temp::new(n)
    }

    fn imm(dest: u32) -> Tac {
        Tac::LoadImm4 {
            dest: t(dest),
            value: 0,
        }
    }

    fn add(dest: u32, left: u32, right: u32) -> Tac {
        Tac::Binary {
            op: BinaryOp::Add,
            dest: t(dest),
            left: t(left),
            right: t(right),
        }
    }

    #[test]
    fn test_intra_block_kill_suppresses_successors() {
        // 0: t0 = 0; parm t0; t0 = 0; goto 1    1: return t0
        let blocks = vec![
            BasicBlock::new(
                0,
                vec![imm(0), Tac::Parm { value: t(0) }, imm(0)],
                Terminator::Jump(1),
                1,
            ),
            BasicBlock::new(1, Vec::new(), Terminator::Return(Some(t(0))), 1),
        ];
        let chain = du_chain(&blocks, 0, 0, t(0)).unwrap();
        assert_eq!(chain, vec![DuUse::line(0, 2)]);

        let chain = du_chain(&blocks, 0, 2, t(0)).unwrap();
        assert_eq!(chain, vec![DuUse::end_of_block(1)]);
    }

    #[test]
    fn test_self_update_is_consumer_and_kill() {
        // t0 = 0; t0 = t0 + t0; return t0
        let blocks = vec![BasicBlock::new(
            0,
            vec![imm(0), add(0, 0, 0)],
            Terminator::Return(Some(t(0))),
            1,
        )];
        assert_eq!(du_chain(&blocks, 0, 0, t(0)).unwrap(), vec![DuUse::line(0, 2)]);
        assert_eq!(
            du_chain(&blocks, 0, 1, t(0)).unwrap(),
            vec![DuUse::end_of_block(0)]
        );
    }

    #[test]
    fn test_loop_reaches_defining_block_head() {
        // 0: t0 = 0; goto 1
        // 1: parm t0; t0 = t0 + t1; if (t0 != 0) goto 1 else 2
        // 2: return
        let blocks = vec![
            BasicBlock::new(0, vec![imm(0)], Terminator::Jump(1), 2),
            BasicBlock::new(
                1,
                vec![Tac::Parm { value: t(0) }, add(0, 0, 1)],
                Terminator::Bnez {
                    cond: t(0),
                    taken: 1,
                    fallthrough: 2,
                },
                2,
            ),
            BasicBlock::new(2, Vec::new(), Terminator::Return(None), 2),
        ];

        assert_eq!(
            du_chain(&blocks, 0, 0, t(0)).unwrap(),
            vec![DuUse::line(1, 1), DuUse::line(1, 2)]
        );
        // The loop-carried definition reaches its own terminator, then the
        // head of its own block along the back edge.
        assert_eq!(
            du_chain(&blocks, 1, 1, t(0)).unwrap(),
            vec![
                DuUse::end_of_block(1),
                DuUse::line(1, 1),
                DuUse::line(1, 2)
            ]
        );
    }

    #[test]
    fn test_taken_successor_first() {
        // 0: t0 = 0; if (t1 == 0) goto 2 else 1    1: return t0    2: return t0
        let blocks = vec![
            BasicBlock::new(
                0,
                vec![imm(0)],
                Terminator::Beqz {
                    cond: t(1),
                    taken: 2,
                    fallthrough: 1,
                },
                2,
            ),
            BasicBlock::new(1, Vec::new(), Terminator::Return(Some(t(0))), 2),
            BasicBlock::new(2, Vec::new(), Terminator::Return(Some(t(0))), 2),
        ];
        assert_eq!(
            du_chain(&blocks, 0, 0, t(0)).unwrap(),
            vec![DuUse::end_of_block(2), DuUse::end_of_block(1)]
        );
    }

    #[test]
    fn test_compute_marks_definitions_only() {
        let mut blocks = vec![BasicBlock::new(
            0,
            vec![imm(0), Tac::Parm { value: t(0) }],
            Terminator::Return(None),
            1,
        )];
        assert_eq!(compute_du_chains(&mut blocks).unwrap(), 1);

        let instrs = blocks[0].instrs();
        assert!(instrs[0].is_def());
        assert_eq!(instrs[0].du_chain(), Some(&[DuUse::line(0, 2)][..]));
        assert!(!instrs[1].is_def());
        assert_eq!(instrs[1].du_chain(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(DuUse::line(3, 1).to_string(), "B3:1");
        assert_eq!(DuUse::end_of_block(0).to_string(), "B0:end");
    }
}
