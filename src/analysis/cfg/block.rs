//! Basic blocks and their terminators.

use std::fmt;

use strum::Display;

use crate::{
    analysis::{defuse::DuUse, VarSet},
    tac::{Tac, Temp},
};

/// Classification of how control leaves a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EndKind {
    /// Unconditional transfer to a single successor
    #[strum(to_string = "BRANCH")]
    Branch,
    /// Taken when the tested temp is zero
    #[strum(to_string = "BEQZ")]
    Beqz,
    /// Taken when the tested temp is non-zero
    #[strum(to_string = "BNEZ")]
    Bnez,
    /// Leaves the function
    #[strum(to_string = "RETURN")]
    Return,
}

/// The structural exit of a basic block.
///
/// The branch or return instruction that ended the block in the instruction
/// stream is folded into this value during partitioning and removed from the
/// block body. Successors are block indices into the owning
/// [`crate::FlowGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminator {
    /// `goto target`, including fall-through into the next block.
    Jump(usize),
    /// `if (cond == 0) goto taken else goto fallthrough`
    Beqz {
        /// Tested temp
        cond: Temp,
        /// Successor when `cond == 0`
        taken: usize,
        /// Successor otherwise (the block that follows in layout order)
        fallthrough: usize,
    },
    /// `if (cond != 0) goto taken else goto fallthrough`
    Bnez {
        /// Tested temp
        cond: Temp,
        /// Successor when `cond != 0`
        taken: usize,
        /// Successor otherwise (the block that follows in layout order)
        fallthrough: usize,
    },
    /// Return from the function, with the returned temp for non-`void` returns.
    Return(Option<Temp>),
}

impl Terminator {
    /// Returns the terminator classification.
    #[must_use]
    pub const fn kind(&self) -> EndKind {
        match self {
            Self::Jump(_) => EndKind::Branch,
            Self::Beqz { .. } => EndKind::Beqz,
            Self::Bnez { .. } => EndKind::Bnez,
            Self::Return(_) => EndKind::Return,
        }
    }

    /// Returns the temp the terminator tests or returns.
    #[must_use]
    pub const fn var(&self) -> Option<Temp> {
        match self {
            Self::Beqz { cond, .. } | Self::Bnez { cond, .. } => Some(*cond),
            Self::Return(value) => *value,
            Self::Jump(_) => None,
        }
    }

    /// Returns the two successor slots: `[taken, fallthrough]` for conditional
    /// terminators, `[target, None]` for jumps and `[None, None]` for returns.
    #[must_use]
    pub const fn next(&self) -> [Option<usize>; 2] {
        match self {
            Self::Jump(target) => [Some(*target), None],
            Self::Beqz {
                taken, fallthrough, ..
            }
            | Self::Bnez {
                taken, fallthrough, ..
            } => [Some(*taken), Some(*fallthrough)],
            Self::Return(_) => [None, None],
        }
    }

    /// Iterates over the successor block indices, taken edge first.
    pub fn successors(&self) -> impl Iterator<Item = usize> {
        self.next().into_iter().flatten()
    }

    pub(crate) fn successors_mut(&mut self) -> Vec<&mut usize> {
        match self {
            Self::Jump(target) => vec![target],
            Self::Beqz {
                taken, fallthrough, ..
            }
            | Self::Bnez {
                taken, fallthrough, ..
            } => vec![taken, fallthrough],
            Self::Return(_) => vec![],
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jump(target) => write!(f, "END BY BRANCH, goto {target}"),
            Self::Beqz {
                cond,
                taken,
                fallthrough,
            } => write!(
                f,
                "END BY BEQZ, if {cond} = 0 : goto {taken}; else goto {fallthrough}"
            ),
            Self::Bnez {
                cond,
                taken,
                fallthrough,
            } => write!(
                f,
                "END BY BNEZ, if {cond} != 0 : goto {taken}; else goto {fallthrough}"
            ),
            Self::Return(Some(value)) => write!(f, "END BY RETURN, result = {value}"),
            Self::Return(None) => f.write_str("END BY RETURN, void result"),
        }
    }
}

/// An instruction inside a block body, together with its analysis facts.
#[derive(Debug, Clone, PartialEq)]
pub struct Instr {
    tac: Tac,
    live_out: VarSet,
    du_chain: Option<Vec<DuUse>>,
}

impl Instr {
    pub(crate) fn new(tac: Tac, temp_count: usize) -> Self {
        Self {
            tac,
            live_out: VarSet::new(temp_count),
            du_chain: None,
        }
    }

    /// Returns the instruction.
    #[must_use]
    pub const fn tac(&self) -> &Tac {
        &self.tac
    }

    /// Returns the temps live immediately after this instruction.
    #[must_use]
    pub const fn live_out(&self) -> &VarSet {
        &self.live_out
    }

    /// Returns `true` if DU-chain construction classified this instruction as
    /// a definition.
    #[must_use]
    pub const fn is_def(&self) -> bool {
        self.du_chain.is_some()
    }

    /// Returns the consumers of the value this instruction defines.
    ///
    /// `None` if the instruction defines nothing (or DU chains were not
    /// computed); an empty slice for a definition that is never read.
    #[must_use]
    pub fn du_chain(&self) -> Option<&[DuUse]> {
        self.du_chain.as_deref()
    }

    pub(crate) fn set_live_out(&mut self, live_out: VarSet) {
        self.live_out = live_out;
    }

    pub(crate) fn set_du_chain(&mut self, chain: Option<Vec<DuUse>>) {
        self.du_chain = chain;
    }
}

/// A maximal straight-line run of instructions with a single exit.
///
/// Blocks are created by partitioning, renumbered densely by simplification
/// and then annotated in place by liveness and DU-chain construction.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    num: usize,
    terminator: Terminator,
    body: Vec<Instr>,
    def: VarSet,
    live_use: VarSet,
    live_in: VarSet,
    live_out: VarSet,
    in_degree: usize,
    cancelled: bool,
    asms: Vec<String>,
}

impl BasicBlock {
    pub(crate) fn new(num: usize, body: Vec<Tac>, terminator: Terminator, temp_count: usize) -> Self {
        Self {
            num,
            terminator,
            body: body
                .into_iter()
                .map(|tac| Instr::new(tac, temp_count))
                .collect(),
            def: VarSet::new(temp_count),
            live_use: VarSet::new(temp_count),
            live_in: VarSet::new(temp_count),
            live_out: VarSet::new(temp_count),
            in_degree: 0,
            cancelled: false,
            asms: Vec::new(),
        }
    }

    /// Returns the block number (its index in the owning graph).
    #[must_use]
    pub const fn num(&self) -> usize {
        self.num
    }

    /// Returns how control leaves the block.
    #[must_use]
    pub const fn terminator(&self) -> &Terminator {
        &self.terminator
    }

    /// Returns the terminator classification.
    #[must_use]
    pub const fn end_kind(&self) -> EndKind {
        self.terminator.kind()
    }

    /// Returns the temp tested or returned by the terminator.
    #[must_use]
    pub const fn var(&self) -> Option<Temp> {
        self.terminator.var()
    }

    /// Iterates over successor block indices.
    pub fn successors(&self) -> impl Iterator<Item = usize> {
        self.terminator.successors()
    }

    /// Returns the block body, terminator excluded.
    #[must_use]
    pub fn instrs(&self) -> &[Instr] {
        &self.body
    }

    /// Returns `true` if the body holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Temps whose first occurrence in the block is a definition.
    #[must_use]
    pub const fn def(&self) -> &VarSet {
        &self.def
    }

    /// Temps read in the block before any local definition, terminator
    /// operand included.
    #[must_use]
    pub const fn live_use(&self) -> &VarSet {
        &self.live_use
    }

    /// Temps live on entry.
    #[must_use]
    pub const fn live_in(&self) -> &VarSet {
        &self.live_in
    }

    /// Temps live on exit.
    #[must_use]
    pub const fn live_out(&self) -> &VarSet {
        &self.live_out
    }

    /// Number of control-flow edges entering the block, counting the function
    /// entry for block 0.
    #[must_use]
    pub const fn in_degree(&self) -> usize {
        self.in_degree
    }

    /// `true` while simplification has scheduled the block for removal.
    /// Blocks reachable through a [`crate::FlowGraph`] are never cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Appends target-machine output for this block.
    ///
    /// The buffer belongs to code emission; the analyses never read it.
    pub fn append_asm(&mut self, asm: impl Into<String>) {
        self.asms.push(asm.into());
    }

    /// Returns the code-emission buffer.
    #[must_use]
    pub fn asms(&self) -> &[String] {
        &self.asms
    }

    /// Inserts `tac` so that it ends up at body position `pos`.
    ///
    /// The new instruction has an empty live-out set and no DU chain.
    ///
    /// # Panics
    ///
    /// Panics if `pos > self.instrs().len()`.
    pub(crate) fn insert(&mut self, pos: usize, tac: Tac) {
        let temp_count = self.live_out.capacity();
        self.body.insert(pos, Instr::new(tac, temp_count));
    }

    pub(crate) fn set_num(&mut self, num: usize) {
        self.num = num;
    }

    pub(crate) fn terminator_mut(&mut self) -> &mut Terminator {
        &mut self.terminator
    }

    pub(crate) fn set_in_degree(&mut self, in_degree: usize) {
        self.in_degree = in_degree;
    }

    pub(crate) fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    pub(crate) fn instrs_mut(&mut self) -> &mut [Instr] {
        &mut self.body
    }

    pub(crate) fn set_def_use(&mut self, def: VarSet, live_use: VarSet) {
        self.def = def;
        self.live_use = live_use;
    }

    pub(crate) fn set_live(&mut self, live_in: VarSet, live_out: VarSet) {
        self.live_in = live_in;
        self.live_out = live_out;
    }
}
