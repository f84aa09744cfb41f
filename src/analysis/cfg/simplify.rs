//! Dead-block elimination and jump threading.
//!
//! Simplification removes two kinds of blocks from a freshly partitioned
//! graph:
//!
//! - blocks no control-flow path from the entry can reach, found by counting
//!   in-degrees and withdrawing the edges of every block whose in-degree
//!   drops to zero
//! - empty blocks that only jump elsewhere ("redirects"), which are bypassed
//!   by retargeting their predecessors at the first live block down the
//!   redirect chain
//!
//! The entry block is never removed. Surviving blocks are renumbered densely
//! in their original order.

use crate::{
    analysis::cfg::{BasicBlock, Terminator},
    malformed_error, Error, Result,
};

/// Outcome of [`simplify`].
#[derive(Debug)]
pub(crate) struct Simplified {
    /// Surviving blocks, renumbered densely.
    pub blocks: Vec<BasicBlock>,
    /// For every pre-simplification block, the surviving block control
    /// reaching it now arrives at. `None` for blocks that were unreachable.
    pub forward: Vec<Option<usize>>,
}

/// Removes unreachable blocks, threads jumps through empty redirects and
/// renumbers the survivors.
///
/// # Errors
///
/// Returns [`Error::UnterminatedChase`] if a successor of a live block leads
/// into a cycle of empty redirects, and [`Error::Malformed`] if threading
/// ends on a removed block that is not a redirect.
pub(crate) fn simplify(mut blocks: Vec<BasicBlock>) -> Result<Simplified> {
    let n = blocks.len();
    if n == 0 {
        return Ok(Simplified {
            blocks,
            forward: Vec::new(),
        });
    }

    let in_degree = reachable_in_degree(&blocks);
    let mut cancelled = vec![false; n];
    for (i, bb) in blocks.iter_mut().enumerate().skip(1) {
        let unreachable = in_degree[i] <= 0;
        let redirect = bb.is_empty() && matches!(bb.terminator(), Terminator::Jump(_));
        if unreachable || redirect {
            log::trace!(
                "simplify: cancel block {i} ({})",
                if unreachable { "unreachable" } else { "redirect" }
            );
            cancelled[i] = true;
            bb.set_cancelled(true);
        }
    }

    for i in (0..n).filter(|&i| !cancelled[i]) {
        let targets = blocks[i]
            .successors()
            .map(|s| chase(&blocks, &cancelled, i, s))
            .collect::<Result<Vec<_>>>()?;
        let terminator = blocks[i].terminator_mut();
        for (slot, target) in terminator.successors_mut().into_iter().zip(targets) {
            *slot = target;
        }
        downgrade_same_target(terminator);
    }

    let mut renumber = vec![None; n];
    let mut next = 0;
    for (i, slot) in renumber.iter_mut().enumerate() {
        if !cancelled[i] {
            *slot = Some(next);
            next += 1;
        }
    }

    let forward = (0..n)
        .map(|i| {
            if in_degree[i] <= 0 && i != 0 {
                None
            } else {
                try_chase(&blocks, &cancelled, i).and_then(|live| renumber[live])
            }
        })
        .collect();

    let mut survivors = Vec::with_capacity(next);
    for (i, mut bb) in blocks.into_iter().enumerate() {
        let Some(num) = renumber[i] else {
            continue;
        };
        bb.set_num(num);
        for slot in bb.terminator_mut().successors_mut() {
            let old = *slot;
            *slot = renumber[old]
                .ok_or_else(|| malformed_error!("block {} still targets removed block {}", i, old))?;
        }
        survivors.push(bb);
    }

    let mut degrees = vec![0; survivors.len()];
    degrees[0] = 1;
    for bb in &survivors {
        for s in bb.successors() {
            degrees[s] += 1;
        }
    }
    for (bb, degree) in survivors.iter_mut().zip(degrees) {
        bb.set_in_degree(degree);
    }

    log::debug!("simplify: {n} blocks -> {} blocks", survivors.len());

    Ok(Simplified {
        blocks: survivors,
        forward,
    })
}

/// Counts incoming edges per block, with one extra for the entry, then
/// repeatedly withdraws the outgoing edges of every non-entry block whose
/// count has dropped to zero.
fn reachable_in_degree(blocks: &[BasicBlock]) -> Vec<isize> {
    let n = blocks.len();
    let mut in_degree = vec![0_isize; n];
    in_degree[0] = 1;
    for bb in blocks {
        for s in bb.successors() {
            in_degree[s] += 1;
        }
    }

    let mut worklist: Vec<usize> = (1..n).filter(|&i| in_degree[i] <= 0).collect();
    while let Some(dead) = worklist.pop() {
        for s in blocks[dead].successors() {
            in_degree[s] -= 1;
            if in_degree[s] == 0 && s != 0 {
                worklist.push(s);
            }
        }
    }

    in_degree
}

/// Follows redirects from `start` until a live block is reached.
///
/// The chase takes at most one step per block; a longer chase can only be a
/// cycle of redirects.
fn chase(blocks: &[BasicBlock], cancelled: &[bool], from: usize, start: usize) -> Result<usize> {
    let limit = blocks.len();
    let mut current = start;
    let mut steps = 0;
    while cancelled[current] {
        let Terminator::Jump(target) = *blocks[current].terminator() else {
            return Err(malformed_error!(
                "successor {} of block {} was removed but is not a redirect",
                current,
                from
            ));
        };
        steps += 1;
        if steps > limit {
            return Err(Error::UnterminatedChase { block: from, limit });
        }
        current = target;
    }
    Ok(current)
}

/// Like [`chase`], but yields `None` instead of failing.
fn try_chase(blocks: &[BasicBlock], cancelled: &[bool], start: usize) -> Option<usize> {
    chase(blocks, cancelled, start, start).ok()
}

/// A conditional branch whose two edges reach the same block is a jump.
fn downgrade_same_target(terminator: &mut Terminator) {
    if let Terminator::Beqz {
        taken, fallthrough, ..
    }
    | Terminator::Bnez {
        taken, fallthrough, ..
    } = *terminator
    {
        if taken == fallthrough {
            *terminator = Terminator::Jump(taken);
        }
    }
}
