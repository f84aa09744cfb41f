//! Liveness integration tests.
//!
//! These tests verify block-level and instruction-level liveness using the
//! public API:
//! 1. Build an instruction stream with `FunctionBuilder`
//! 2. Construct a `FlowGraph`
//! 3. Verify DEF/USE, live-in and live-out against hand-derived sets
//! 4. Verify the stored sets form a fixpoint of the liveness equations

use tacflow::{
    analysis::{
        dataflow::{default_iteration_limit, satisfies_equations},
        DataFlowSolver, DuUse, LiveVariables, VarSet,
    },
    Analyses, BinaryOp, Error, FlowConfig, FlowGraph, Function, FunctionBuilder, Result, Tac,
    Temp,
};

fn temps(set: &VarSet) -> Vec<Temp> {
    set.iter().collect()
}

/// `i = 10; one = 1; L: if (i == 0) goto X; i = i - one; goto L; X: return`
fn countdown() -> (Function, Temp, Temp) {
    let mut fb = FunctionBuilder::new("countdown");
    let (i, one) = (fb.new_temp(), fb.new_temp());
    let (head, exit) = (fb.new_label(), fb.new_label());
    fb.load_imm4(i, 10)
        .load_imm4(one, 1)
        .mark(head)
        .beqz(i, exit)
        .binary(BinaryOp::Sub, i, i, one)
        .branch(head)
        .mark(exit)
        .ret(None);
    (fb.finish(), i, one)
}

#[test]
fn test_diamond_block_sets() -> Result<()> {
    let mut fb = FunctionBuilder::new("f");
    let (a, b, t1, t2) = (fb.new_temp(), fb.new_temp(), fb.new_temp(), fb.new_temp());
    let l = fb.new_label();
    fb.binary(BinaryOp::Add, t1, a, b)
        .beqz(t1, l)
        .binary(BinaryOp::Mul, t2, t1, t1)
        .ret(Some(t2))
        .mark(l)
        .ret(Some(t1));

    let graph = FlowGraph::new(fb.finish())?;
    let [b0, b1, b2] = graph.blocks() else {
        panic!("expected three blocks");
    };

    assert_eq!(temps(b0.def()), vec![t1]);
    assert_eq!(temps(b0.live_use()), vec![a, b]);
    assert_eq!(temps(b0.live_in()), vec![a, b]);
    assert_eq!(temps(b0.live_out()), vec![t1]);

    assert_eq!(temps(b1.live_in()), vec![t1]);
    assert_eq!(temps(b1.def()), vec![t2]);
    assert!(b1.live_out().is_empty());

    assert_eq!(temps(b2.live_use()), vec![t1]);
    assert_eq!(temps(b2.live_in()), vec![t1]);
    assert!(b2.live_out().is_empty());

    // The value tested by the terminator is live after the body.
    assert_eq!(temps(b0.instrs()[0].live_out()), vec![t1]);
    // The returned value is live after its definition.
    assert_eq!(temps(b1.instrs()[0].live_out()), vec![t2]);

    assert!(graph.verify_liveness());
    Ok(())
}

#[test]
fn test_loop_carried_temps() -> Result<()> {
    let (function, i, one) = countdown();
    let graph = FlowGraph::new(function)?;
    assert_eq!(graph.block_count(), 4);

    // B0: i = 10; one = 1    B1: beqz i    B2: i = i - one    B3: return
    let blocks = graph.blocks();
    assert_eq!(temps(blocks[0].def()), vec![i, one]);
    assert!(blocks[0].live_in().is_empty());
    assert_eq!(temps(blocks[0].live_out()), vec![i, one]);

    assert_eq!(temps(blocks[1].live_in()), vec![i, one]);
    assert_eq!(temps(blocks[1].live_out()), vec![i, one]);

    // `i = i - one` reads `i` first, so `i` is a use and not a definition.
    assert_eq!(temps(blocks[2].live_use()), vec![i, one]);
    assert!(blocks[2].def().is_empty());
    assert_eq!(temps(blocks[2].live_out()), vec![i, one]);

    assert!(blocks[3].live_in().is_empty());

    let instrs = blocks[0].instrs();
    assert_eq!(temps(instrs[0].live_out()), vec![i]);
    assert_eq!(temps(instrs[1].live_out()), vec![i, one]);

    assert!(graph.verify_liveness());
    Ok(())
}

#[test]
fn test_solver_iterations_within_default_bound() -> Result<()> {
    let (function, _, _) = countdown();
    let mut graph = FlowGraph::build(function, &FlowConfig::structure_only())?;
    let bound = default_iteration_limit(graph.blocks(), graph.temp_count());

    let iterations = graph.compute_liveness(None)?;
    assert!(iterations >= graph.block_count());
    assert!(iterations <= bound);
    assert!(graph.computed().contains(Analyses::LIVENESS));
    Ok(())
}

#[test]
fn test_iteration_limit_aborts_build() {
    let (function, _, _) = countdown();
    let config = FlowConfig {
        max_solver_iterations: Some(1),
        ..FlowConfig::default()
    };

    let result = FlowGraph::build(function, &config);
    assert!(matches!(result, Err(Error::IterationLimit(1))));
}

#[test]
fn test_instruction_liveness_requires_block_liveness() -> Result<()> {
    let (function, _, _) = countdown();
    let mut graph = FlowGraph::build(function, &FlowConfig::structure_only())?;

    assert!(matches!(
        graph.compute_instruction_liveness(),
        Err(Error::Malformed { .. })
    ));

    graph.compute_liveness(None)?;
    graph.compute_instruction_liveness()?;
    assert!(graph
        .computed()
        .contains(Analyses::LIVENESS | Analyses::INSTRUCTION_LIVENESS));
    Ok(())
}

#[test]
fn test_liveness_only_config() -> Result<()> {
    let (function, i, _) = countdown();
    let graph = FlowGraph::build(function, &FlowConfig::liveness_only())?;

    assert!(!graph.computed().contains(Analyses::DU_CHAINS));
    assert!(graph.blocks()[1].live_in().contains(i));
    assert!(graph.blocks()[0].instrs()[0].du_chain().is_none());
    Ok(())
}

#[test]
fn test_recompute_after_insertion() -> Result<()> {
    let mut fb = FunctionBuilder::new("f");
    let (a, b) = (fb.new_temp(), fb.new_temp());
    fb.load_imm4(a, 1).load_imm4(b, 2).parm(a).ret(None);
    let mut graph = FlowGraph::new(fb.finish())?;
    assert!(graph.blocks()[0].live_in().is_empty());

    graph.insert_before(0, 0, Tac::Parm { value: b })?;
    // Stored results are stale until recomputed.
    assert!(graph.blocks()[0].live_in().is_empty());

    graph.compute_liveness(None)?;
    graph.compute_instruction_liveness()?;
    let entry = &graph.blocks()[0];
    assert_eq!(temps(entry.live_in()), vec![b]);
    assert_eq!(temps(entry.live_use()), vec![b]);
    assert_eq!(temps(entry.def()), vec![a]);
    assert_eq!(temps(entry.instrs()[0].live_out()), Vec::<Temp>::new());
    assert_eq!(temps(entry.instrs()[1].live_out()), vec![a]);
    Ok(())
}

#[test]
fn test_insertion_rejects_temps_outside_live_sets() -> Result<()> {
    let mut fb = FunctionBuilder::new("f");
    let a = fb.new_temp();
    fb.load_imm4(a, 1).parm(a).ret(None);
    let mut graph = FlowGraph::new(fb.finish())?;
    assert_eq!(graph.temp_count(), 1);

    // `_T1` has no slot in the live sets of this function.
    let spill = Temp::new(1);
    assert!(matches!(
        graph.insert_after(0, 0, Tac::LoadImm4 { dest: spill, value: 0 }),
        Err(Error::Malformed { .. })
    ));
    assert!(matches!(
        graph.insert_before(0, 1, Tac::Parm { value: spill }),
        Err(Error::Malformed { .. })
    ));
    assert_eq!(graph.blocks()[0].instrs().len(), 2);

    graph.insert_after(0, 1, Tac::Parm { value: a })?;
    graph.compute_liveness(None)?;
    graph.compute_instruction_liveness()?;
    graph.compute_du_chains()?;

    // Liveness and the DU chain agree on every read of `a`.
    let entry = &graph.blocks()[0];
    assert_eq!(temps(entry.instrs()[0].live_out()), vec![a]);
    assert_eq!(temps(entry.instrs()[1].live_out()), vec![a]);
    assert!(entry.instrs()[2].live_out().is_empty());
    assert_eq!(
        entry.instrs()[0].du_chain(),
        Some(&[DuUse::line(0, 2), DuUse::line(0, 3)][..])
    );
    assert!(graph.verify_liveness());
    Ok(())
}

#[test]
fn test_solver_agrees_with_stored_sets() -> Result<()> {
    let (function, _, _) = countdown();
    let graph = FlowGraph::new(function)?;

    let analysis = LiveVariables::new(graph.blocks(), graph.temp_count());
    let results = DataFlowSolver::new(analysis).solve(graph.blocks())?;
    assert_eq!(results.block_count(), graph.block_count());
    for (idx, block) in graph.blocks().iter().enumerate() {
        assert_eq!(results.in_state(idx), Some(block.live_in()));
        assert_eq!(results.out_state(idx), Some(block.live_out()));
    }
    assert!(satisfies_equations(graph.blocks()));
    Ok(())
}
