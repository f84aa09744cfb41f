//! The flow graph of one function.

use std::fmt::Write;

use crate::{
    analysis::{
        cfg::{
            edge::CfgEdge,
            partition::partition,
            simplify::{simplify, Simplified},
            BasicBlock, CfgEdgeKind,
        },
        dataflow::{compute_instruction_liveness, compute_liveness, satisfies_equations},
        defuse::compute_du_chains,
    },
    config::{Analyses, FlowConfig},
    malformed_error,
    tac::{Function, Label, Tac},
    utils::escape_dot,
    Result,
};

/// The basic blocks of one function, simplified and annotated with liveness
/// and DU chains.
///
/// A `FlowGraph` owns the [`Function`] it was built from. Blocks are numbered
/// densely from 0 in layout order; block 0 is the entry. Every successor index
/// of every block is a valid block number.
///
/// Construction runs a fixed pipeline:
///
/// 1. partition the instruction stream into blocks
/// 2. remove unreachable blocks and thread jumps through empty redirects
/// 3. solve block-level liveness
/// 4. propagate liveness to every instruction
/// 5. build DU chains for every definition
///
/// Steps 3 to 5 can be switched off through [`FlowConfig`].
///
/// # Examples
///
/// ```rust
/// use tacflow::{BinaryOp, FlowGraph, FunctionBuilder};
///
/// let mut fb = FunctionBuilder::new("sum");
/// let (i, n, acc) = (fb.new_temp(), fb.new_temp(), fb.new_temp());
/// let (head, done) = (fb.new_label(), fb.new_label());
/// fb.load_imm4(acc, 0)
///     .mark(head)
///     .beqz(i, done)
///     .binary(BinaryOp::Add, acc, acc, i)
///     .binary(BinaryOp::Sub, i, i, n)
///     .branch(head)
///     .mark(done)
///     .ret(Some(acc));
///
/// let graph = FlowGraph::new(fb.finish())?;
/// assert_eq!(graph.block_count(), 4);
/// assert!(graph.block(0).is_some_and(|b| b.live_in().contains(i)));
/// assert!(graph.verify_liveness());
/// # Ok::<(), tacflow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FlowGraph {
    function: Function,
    blocks: Vec<BasicBlock>,
    computed: Analyses,
}

impl FlowGraph {
    /// Builds the graph with every analysis enabled.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn new(function: Function) -> Result<Self> {
        Self::build(function, &FlowConfig::default())
    }

    /// Builds the graph, running the analyses `config` selects.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::UnresolvedLabel`] if a branch targets a label that
    ///   starts no block
    /// - [`crate::Error::UnterminatedChase`] if a live block's successor
    ///   leads into a cycle of empty redirects
    /// - [`crate::Error::IterationLimit`] if liveness does not converge
    ///   within the configured cap
    /// - [`crate::Error::RecursionLimit`] if a DU search exceeds its depth
    ///   bound
    pub fn build(mut function: Function, config: &FlowConfig) -> Result<Self> {
        let partitioned = partition(&mut function)?;
        log::debug!(
            "{}: partitioned into {} blocks",
            function.name(),
            partitioned.len()
        );

        let Simplified { blocks, forward } = simplify(partitioned)?;
        for info in function.labels_mut() {
            info.block = info
                .block
                .and_then(|old| forward.get(old).copied().flatten());
        }

        let mut graph = Self {
            function,
            blocks,
            computed: Analyses::empty(),
        };

        let analyses = config.effective_analyses();
        if analyses.contains(Analyses::LIVENESS) {
            graph.compute_liveness(config.max_solver_iterations)?;
        }
        if analyses.contains(Analyses::INSTRUCTION_LIVENESS) {
            graph.compute_instruction_liveness()?;
        }
        if analyses.contains(Analyses::DU_CHAINS) {
            graph.compute_du_chains()?;
        }

        Ok(graph)
    }

    /// Solves block-level liveness, replacing any previous result. Returns
    /// the number of solver visits.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IterationLimit`] if the solver makes more than
    /// `max_iterations` block visits (default: a bound a correct solve never
    /// reaches).
    pub fn compute_liveness(&mut self, max_iterations: Option<usize>) -> Result<usize> {
        let iterations = compute_liveness(
            &mut self.blocks,
            self.function.temp_count(),
            max_iterations,
        )?;
        self.computed |= Analyses::LIVENESS;
        log::debug!(
            "{}: liveness converged after {iterations} block visits",
            self.function.name()
        );
        Ok(iterations)
    }

    /// Recomputes the live-out set of every instruction from the block
    /// live-out sets.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if block liveness has not been
    /// computed.
    pub fn compute_instruction_liveness(&mut self) -> Result<()> {
        if !self.computed.contains(Analyses::LIVENESS) {
            return Err(malformed_error!(
                "instruction liveness of {} requested before block liveness",
                self.function.name()
            ));
        }
        for block in &mut self.blocks {
            compute_instruction_liveness(block);
        }
        self.computed |= Analyses::INSTRUCTION_LIVENESS;
        Ok(())
    }

    /// Rebuilds the DU chain of every instruction. Returns the number of
    /// definitions.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RecursionLimit`] if a search exceeds the
    /// block count in depth.
    pub fn compute_du_chains(&mut self) -> Result<usize> {
        let definitions = compute_du_chains(&mut self.blocks)?;
        self.computed |= Analyses::DU_CHAINS;
        log::debug!(
            "{}: built DU chains for {definitions} definitions",
            self.function.name()
        );
        Ok(definitions)
    }

    /// Returns the analyses whose results are currently stored.
    #[must_use]
    pub const fn computed(&self) -> Analyses {
        self.computed
    }

    /// Returns the function the graph was built from.
    ///
    /// Its instruction stream has been moved into the blocks.
    #[must_use]
    pub const fn function(&self) -> &Function {
        &self.function
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.function.name()
    }

    /// Returns the number of temps of the function, the capacity of every
    /// live set.
    #[must_use]
    pub const fn temp_count(&self) -> usize {
        self.function.temp_count()
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns all blocks in order.
    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Returns a block by number.
    #[must_use]
    pub fn block(&self, num: usize) -> Option<&BasicBlock> {
        self.blocks.get(num)
    }

    /// Returns a block by number for code emission.
    #[must_use]
    pub fn block_mut(&mut self, num: usize) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(num)
    }

    /// Returns the block control reaches through `label`, or `None` if the
    /// label is untargeted, unknown or unreachable.
    #[must_use]
    pub fn label_block(&self, label: Label) -> Option<usize> {
        self.function.label(label).and_then(|info| info.block)
    }

    /// Iterates over the successors of a block.
    pub fn successors(&self, num: usize) -> impl Iterator<Item = usize> + '_ {
        self.blocks.get(num).into_iter().flat_map(BasicBlock::successors)
    }

    /// Returns the predecessors of a block in ascending order.
    #[must_use]
    pub fn predecessors(&self, num: usize) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.successors().any(|s| s == num))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Iterates over every edge, in block order, taken edge first.
    pub fn edges(&self) -> impl Iterator<Item = CfgEdge> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .flat_map(|(idx, b)| CfgEdge::from_terminator(idx, b.terminator()))
    }

    /// Returns `true` if the stored block live sets form a fixpoint of the
    /// liveness equations.
    #[must_use]
    pub fn verify_liveness(&self) -> bool {
        satisfies_equations(&self.blocks)
    }

    /// Inserts `tac` in front of body position `pos` of block `block`.
    ///
    /// The new instruction carries an empty live-out set and no DU chain;
    /// stored analyses are not updated.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the position does not exist,
    /// `tac` is a branch, return or label marker, or `tac` names a temp at or
    /// beyond [`temp_count`](Self::temp_count).
    pub fn insert_before(&mut self, block: usize, pos: usize, tac: Tac) -> Result<()> {
        self.insert_at(block, pos, pos, tac)
    }

    /// Inserts `tac` right after body position `pos` of block `block`.
    ///
    /// # Errors
    ///
    /// See [`insert_before`](Self::insert_before).
    pub fn insert_after(&mut self, block: usize, pos: usize, tac: Tac) -> Result<()> {
        self.insert_at(block, pos, pos + 1, tac)
    }

    fn insert_at(&mut self, block: usize, anchor: usize, at: usize, tac: Tac) -> Result<()> {
        if tac.is_terminator() || matches!(tac, Tac::Mark { .. } | Tac::Memo { .. }) {
            return Err(malformed_error!("cannot insert '{}' into a block body", tac));
        }
        // Live sets are sized by the function's temp count.
        let temp_count = self.temp_count();
        if let Some(temp) = tac
            .def()
            .into_iter()
            .chain(tac.uses())
            .find(|temp| temp.index() >= temp_count)
        {
            return Err(malformed_error!(
                "'{}' names {} but the function has {} temps",
                tac,
                temp,
                temp_count
            ));
        }
        let bb = self
            .blocks
            .get_mut(block)
            .ok_or_else(|| malformed_error!("block {} does not exist", block))?;
        if anchor >= bb.instrs().len() {
            return Err(malformed_error!(
                "block {} has no instruction at position {}",
                block,
                anchor
            ));
        }
        bb.insert(at, tac);
        Ok(())
    }

    /// Generates a DOT (Graphviz) representation of the graph.
    ///
    /// Each node lists the block body followed by its terminator, with live
    /// sets when liveness has been computed.
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph CFG {\n");
        let name = title.unwrap_or(self.function.name());
        let _ = writeln!(dot, "    label=\"CFG: {}\";", escape_dot(name));
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
        dot.push_str("    edge [fontname=\"Courier\", fontsize=9];\n\n");

        let with_liveness = self.computed.contains(Analyses::LIVENESS);
        for (idx, block) in self.blocks.iter().enumerate() {
            let is_entry = idx == 0;
            let is_exit = block.successors().next().is_none();

            let mut label = format!("B{idx}");
            if is_entry {
                label.push_str(" (entry)");
            }
            if is_exit {
                label.push_str(" (exit)");
            }
            label.push_str("\\l");

            if with_liveness {
                let _ = write!(label, "in: {}\\l", escape_dot(&block.live_in().to_string()));
            }
            for (pos, instr) in block.instrs().iter().enumerate() {
                let _ = write!(
                    label,
                    "{}: {}\\l",
                    pos + 1,
                    escape_dot(&instr.tac().to_string())
                );
            }
            let _ = write!(label, "{}\\l", escape_dot(&block.terminator().to_string()));
            if with_liveness {
                let _ = write!(label, "out: {}\\l", escape_dot(&block.live_out().to_string()));
            }

            let style = if is_entry {
                ", style=filled, fillcolor=lightgreen"
            } else if is_exit {
                ", style=filled, fillcolor=lightcoral"
            } else {
                ""
            };

            let _ = writeln!(dot, "    B{idx} [label=\"{label}\"{style}];");
        }

        dot.push('\n');

        for edge in self.edges() {
            let (edge_label, color) = match edge.kind() {
                CfgEdgeKind::Unconditional => ("", "black"),
                CfgEdgeKind::Taken => ("taken", "green"),
                CfgEdgeKind::Fallthrough => ("fallthrough", "red"),
            };
            let _ = writeln!(
                dot,
                "    B{} -> B{} [label=\"{edge_label}\", color={color}];",
                edge.source(),
                edge.target()
            );
        }

        dot.push_str("}\n");
        dot
    }
}
