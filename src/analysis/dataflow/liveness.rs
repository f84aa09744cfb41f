//! Live variable analysis.
//!
//! A temp is *live* at a program point if some path from that point reads
//! it before writing it again.
//!
//! # Uses
//!
//! Live variable analysis is essential for:
//! - **Dead code elimination**: If a definition's result is never live, it's dead
//! - **Register allocation**: Temps live at the same time need different registers
//!
//! # Algorithm
//!
//! This is a backward data flow analysis:
//!
//! - `USE[B]` = temps whose first occurrence in B is a read
//! - `DEF[B]` = temps whose first occurrence in B is a write
//! - `OUT[B]` = ∪{IN[S] | S is a successor of B}
//! - `IN[B]` = USE[B] ∪ (OUT[B] - DEF[B])
//!
//! Within one instruction the operands are read before the destination is
//! written, so `t = t + 1` as the first mention of `t` puts `t` in `USE`.
//! The temp tested or returned by the block terminator is read after the
//! whole body.
//!
//! Once the block-level fixpoint is known, a single backward walk over each
//! block assigns every instruction the set of temps live right after it.

use crate::{
    analysis::{
        cfg::BasicBlock,
        dataflow::{framework::DataFlowAnalysis, solver::DataFlowSolver},
        VarSet,
    },
    Result,
};

/// Live variable analysis.
///
/// Computes which temps are live at each block boundary. Construction
/// classifies every temp occurrence of every block into the block's `DEF`
/// and `USE` sets; the [`DataFlowSolver`] then iterates the transfer
/// function to the least fixpoint.
///
/// # Example
///
/// ```rust
/// use tacflow::analysis::{DataFlowSolver, LiveVariables};
/// use tacflow::{FlowConfig, FlowGraph, FunctionBuilder};
///
/// let mut fb = FunctionBuilder::new("f");
/// let (a, b) = (fb.new_temp(), fb.new_temp());
/// let exit = fb.new_label();
/// fb.beqz(a, exit).load_imm4(b, 1).mark(exit).ret(Some(a));
/// let graph = FlowGraph::build(fb.finish(), &FlowConfig::structure_only())?;
///
/// let analysis = LiveVariables::new(graph.blocks(), graph.temp_count());
/// let results = DataFlowSolver::new(analysis).solve(graph.blocks())?;
/// assert!(results.in_state(0).is_some_and(|live| live.contains(a)));
/// # Ok::<(), tacflow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct LiveVariables {
    /// Number of temps in the function.
    num_vars: usize,
    /// USE sets for each block (temps read before any local write).
    use_sets: Vec<VarSet>,
    /// DEF sets for each block (temps written before any local read).
    def_sets: Vec<VarSet>,
}

impl LiveVariables {
    /// Creates a new live variables analysis over `blocks`.
    #[must_use]
    pub fn new(blocks: &[BasicBlock], num_vars: usize) -> Self {
        let (def_sets, use_sets): (Vec<VarSet>, Vec<VarSet>) = blocks
            .iter()
            .map(|block| Self::classify(block, num_vars))
            .unzip();

        Self {
            num_vars,
            use_sets,
            def_sets,
        }
    }

    /// Splits the temps mentioned in `block` by their first occurrence.
    fn classify(block: &BasicBlock, num_vars: usize) -> (VarSet, VarSet) {
        let mut seen = VarSet::new(num_vars);
        let mut defs = VarSet::new(num_vars);
        let mut uses = VarSet::new(num_vars);

        for instr in block.instrs() {
            for temp in instr.tac().uses() {
                if seen.insert(temp) {
                    uses.insert(temp);
                }
            }
            if let Some(temp) = instr.tac().def() {
                if seen.insert(temp) {
                    defs.insert(temp);
                }
            }
        }
        if let Some(temp) = block.var() {
            if seen.insert(temp) {
                uses.insert(temp);
            }
        }

        (defs, uses)
    }

    /// Returns the USE set of a block.
    #[must_use]
    pub fn use_set(&self, block: usize) -> Option<&VarSet> {
        self.use_sets.get(block)
    }

    /// Returns the DEF set of a block.
    #[must_use]
    pub fn def_set(&self, block: usize) -> Option<&VarSet> {
        self.def_sets.get(block)
    }
}

impl DataFlowAnalysis for LiveVariables {
    type Lattice = VarSet;

    fn boundary(&self) -> VarSet {
        VarSet::new(self.num_vars)
    }

    fn initial(&self) -> VarSet {
        VarSet::new(self.num_vars)
    }

    fn transfer(&self, block_id: usize, _block: &BasicBlock, output: &VarSet) -> VarSet {
        let mut input = output.clone();
        if let Some(defs) = self.def_sets.get(block_id) {
            input.difference_with(defs);
        }
        if let Some(uses) = self.use_sets.get(block_id) {
            input.union_with(uses);
        }
        input
    }
}

/// Returns the default bound on solver visits: every block once, plus one
/// revisit per edge for each temp that can be added to a live-in set.
#[must_use]
pub fn default_iteration_limit(blocks: &[BasicBlock], num_vars: usize) -> usize {
    let edges: usize = blocks.iter().map(|b| b.successors().count()).sum();
    blocks
        .len()
        .saturating_add(edges.saturating_mul(num_vars))
        .saturating_add(1)
}

/// Solves block-level liveness and stores `DEF`, `USE`, live-in and live-out
/// on every block. Returns the number of solver visits.
pub(crate) fn compute_liveness(
    blocks: &mut [BasicBlock],
    num_vars: usize,
    max_iterations: Option<usize>,
) -> Result<usize> {
    let limit = max_iterations.unwrap_or_else(|| default_iteration_limit(blocks, num_vars));
    let analysis = LiveVariables::new(blocks, num_vars);
    let results = DataFlowSolver::new(analysis.clone())
        .with_iteration_limit(limit)
        .solve(blocks)?;

    let states = results.in_states.into_iter().zip(results.out_states);
    let sets = analysis.def_sets.into_iter().zip(analysis.use_sets);
    for (block, ((live_in, live_out), (defs, uses))) in blocks.iter_mut().zip(states.zip(sets)) {
        block.set_def_use(defs, uses);
        block.set_live(live_in, live_out);
    }

    Ok(results.iterations)
}

/// Assigns every instruction of `block` the temps live right after it.
///
/// Requires the block's live-out set to be final.
pub(crate) fn compute_instruction_liveness(block: &mut BasicBlock) {
    let mut live = block.live_out().clone();
    live.extend(block.var());

    for instr in block.instrs_mut().iter_mut().rev() {
        instr.set_live_out(live.clone());
        if let Some(temp) = instr.tac().def() {
            live.remove(temp);
        }
        live.extend(instr.tac().uses());
    }
}

/// Returns `true` if the live sets stored on `blocks` satisfy the liveness
/// equations, i.e. form a fixpoint.
#[must_use]
pub fn satisfies_equations(blocks: &[BasicBlock]) -> bool {
    blocks.iter().all(|block| {
        let mut expected_out = VarSet::new(block.live_out().capacity());
        for succ in block.successors() {
            match blocks.get(succ) {
                Some(s) => {
                    expected_out.union_with(s.live_in());
                }
                None => return false,
            }
        }

        let mut expected_in = expected_out.clone();
        expected_in.difference_with(block.def());
        expected_in.union_with(block.live_use());

        expected_out == *block.live_out() && expected_in == *block.live_in()
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::{
        analysis::{cfg::Terminator, MeetSemiLattice},
        tac::{BinaryOp, Tac, Temp},
    };

    fn t(n: u32) -> Temp {
        Temp::new(n)
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
    fn test_first_occurrence_classification() {
        // t1 = t0 + t0; t0 = t1 + t2; if (t3 == 0) ...
        let block = BasicBlock::new(
            0,
            vec![add(1, 0, 0), add(0, 1, 2)],
            Terminator::Beqz {
                cond: t(3),
                taken: 0,
                fallthrough: 0,
            },
            4,
        );
        let (defs, uses) = LiveVariables::classify(&block, 4);
        assert_eq!(defs.iter().collect::<Vec<_>>(), vec![t(1)]);
        assert_eq!(uses.iter().collect::<Vec<_>>(), vec![t(0), t(2), t(3)]);
    }

    #[test]
    fn test_self_update_is_a_use() {
        let block = BasicBlock::new(0, vec![add(0, 0, 1)], Terminator::Return(None), 2);
        let (defs, uses) = LiveVariables::classify(&block, 2);
        assert!(defs.is_empty());
        assert!(uses.contains(t(0)));
    }

    #[test]
    fn test_terminator_after_local_def_is_not_a_use() {
        let block = BasicBlock::new(
            0,
            vec![Tac::LoadImm4 {
                dest: t(0),
                value: 1,
            }],
            Terminator::Return(Some(t(0))),
            1,
        );
        let (defs, uses) = LiveVariables::classify(&block, 1);
        assert!(defs.contains(t(0)));
        assert!(uses.is_empty());
    }

    #[test]
    fn test_loop_fixpoint() {
        // 0: t0 = 0; goto 1
        // 1: t0 = t0 + t1; if (t0 != 0) goto 1 else 2
        // 2: return t0
        let mut blocks = vec![
            BasicBlock::new(
                0,
                vec![Tac::LoadImm4 {
                    dest: t(0),
                    value: 0,
                }],
                Terminator::Jump(1),
                2,
            ),
            BasicBlock::new(
                1,
                vec![add(0, 0, 1)],
                Terminator::Bnez {
                    cond: t(0),
                    taken: 1,
                    fallthrough: 2,
                },
                2,
            ),
            BasicBlock::new(2, Vec::new(), Terminator::Return(Some(t(0))), 2),
        ];

        let iterations = compute_liveness(&mut blocks, 2, None).unwrap();
        assert!(iterations <= default_iteration_limit(&blocks, 2));
        assert!(satisfies_equations(&blocks));

        assert_eq!(blocks[0].live_in().iter().collect::<Vec<_>>(), vec![t(1)]);
        assert_eq!(
            blocks[1].live_in().iter().collect::<Vec<_>>(),
            vec![t(0), t(1)]
        );
        assert_eq!(
            blocks[1].live_out().iter().collect::<Vec<_>>(),
            vec![t(0), t(1)]
        );
        assert_eq!(blocks[2].live_in().iter().collect::<Vec<_>>(), vec![t(0)]);
        assert!(blocks[2].live_out().is_empty());
    }

    #[test]
    fn test_instruction_liveness() {
        // t1 = t0 + t0; t2 = t1 + t1; return t2
        let mut blocks = vec![BasicBlock::new(
            0,
            vec![add(1, 0, 0), add(2, 1, 1)],
            Terminator::Return(Some(t(2))),
            3,
        )];
        compute_liveness(&mut blocks, 3, None).unwrap();
        compute_instruction_liveness(&mut blocks[0]);

        let instrs = blocks[0].instrs();
        assert_eq!(instrs[1].live_out().iter().collect::<Vec<_>>(), vec![t(2)]);
        assert_eq!(instrs[0].live_out().iter().collect::<Vec<_>>(), vec![t(1)]);
        assert_eq!(blocks[0].live_in().iter().collect::<Vec<_>>(), vec![t(0)]);
    }

    #[test]
    fn test_explicit_limit_is_enforced() {
        let mut blocks = vec![
            BasicBlock::new(0, Vec::new(), Terminator::Jump(1), 1),
            BasicBlock::new(1, Vec::new(), Terminator::Return(Some(t(0))), 1),
        ];
        assert!(matches!(
            compute_liveness(&mut blocks, 1, Some(1)),
            Err(crate::Error::IterationLimit(1))
        ));
    }

    #[test]
    fn test_stale_sets_fail_equations() {
        let mut blocks = vec![
            BasicBlock::new(0, Vec::new(), Terminator::Jump(1), 1),
            BasicBlock::new(1, Vec::new(), Terminator::Return(Some(t(0))), 1),
        ];
        compute_liveness(&mut blocks, 1, None).unwrap();
        assert!(satisfies_equations(&blocks));
        assert!(blocks[0].live_out().contains(t(0)));

        blocks[1].set_live(VarSet::new(1), VarSet::new(1));
        assert!(!satisfies_equations(&blocks));
    }

    /// Wraps liveness and checks that no block's entry state ever shrinks.
    struct Monotone {
        inner: LiveVariables,
        last: RefCell<Vec<Option<VarSet>>>,
    }

    impl DataFlowAnalysis for Monotone {
        type Lattice = VarSet;

        fn boundary(&self) -> VarSet {
            self.inner.boundary()
        }

        fn initial(&self) -> VarSet {
            self.inner.initial()
        }

        fn transfer(&self, block_id: usize, block: &BasicBlock, output: &VarSet) -> VarSet {
            let input = self.inner.transfer(block_id, block, output);
            let mut last = self.last.borrow_mut();
            if let Some(previous) = &last[block_id] {
                assert!(previous.is_subset(&input), "entry state of {block_id} shrank");
            }
            last[block_id] = Some(input.clone());
            input
        }
    }

    #[test]
    fn test_iteration_is_monotone() {
        // Nested loops: 0 -> 1; 1 -> 2 | 4; 2 -> 2 | 3; 3 -> 1; 4 returns
        let cond = |c: u32, taken, fallthrough| Terminator::Bnez {
            cond: t(c),
            taken,
            fallthrough,
        };
        let blocks = vec![
            BasicBlock::new(0, vec![add(0, 3, 3)], Terminator::Jump(1), 4),
            BasicBlock::new(1, vec![add(1, 0, 2)], cond(1, 2, 4), 4),
            BasicBlock::new(2, vec![add(2, 2, 3)], cond(2, 2, 3), 4),
            BasicBlock::new(3, vec![add(0, 0, 1)], Terminator::Jump(1), 4),
            BasicBlock::new(4, Vec::new(), Terminator::Return(Some(t(0))), 4),
        ];

        let analysis = Monotone {
            inner: LiveVariables::new(&blocks, 4),
            last: RefCell::new(vec![None; blocks.len()]),
        };
        let results = DataFlowSolver::new(analysis).solve(&blocks).unwrap();
        let entry = results.in_state(0).unwrap();
        assert!(entry.contains(t(2)));
        assert!(entry.contains(t(3)));
        assert!(!entry.contains(t(0)));

        let merged = results.in_state(2).unwrap().meet(results.in_state(4).unwrap());
        assert_eq!(&merged, results.out_state(1).unwrap());
    }
}
