//! Control flow edge types for the flow graph.
//!
//! Edges are not stored; they are derived from block terminators on demand
//! by [`crate::FlowGraph::edges`].

use crate::analysis::cfg::Terminator;

/// The kind of control flow represented by an edge.
///
/// # Examples
///
/// ```rust
/// use tacflow::analysis::CfgEdgeKind;
///
/// assert!(CfgEdgeKind::Taken.is_conditional());
/// assert!(!CfgEdgeKind::Unconditional.is_conditional());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfgEdgeKind {
    /// An unconditional jump, including fall-through from a block without a
    /// branch.
    Unconditional,

    /// The branch of a conditional that is followed when its test succeeds.
    Taken,

    /// The branch of a conditional that falls through to the next block.
    Fallthrough,
}

impl CfgEdgeKind {
    /// Returns `true` for both arms of a conditional branch.
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        matches!(self, Self::Taken | Self::Fallthrough)
    }
}

/// An edge in the flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CfgEdge {
    source: usize,
    target: usize,
    kind: CfgEdgeKind,
}

impl CfgEdge {
    /// Creates a new edge.
    #[must_use]
    pub const fn new(source: usize, target: usize, kind: CfgEdgeKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }

    /// Returns the block control leaves.
    #[must_use]
    pub const fn source(&self) -> usize {
        self.source
    }

    /// Returns the block control enters.
    #[must_use]
    pub const fn target(&self) -> usize {
        self.target
    }

    /// Returns the kind of control flow.
    #[must_use]
    pub const fn kind(&self) -> CfgEdgeKind {
        self.kind
    }

    /// Returns the outgoing edges of block `source`, taken edge first.
    pub(crate) fn from_terminator(source: usize, terminator: &Terminator) -> Vec<Self> {
        match *terminator {
            Terminator::Jump(target) => vec![Self::new(source, target, CfgEdgeKind::Unconditional)],
            Terminator::Beqz {
                taken, fallthrough, ..
            }
            | Terminator::Bnez {
                taken, fallthrough, ..
            } => vec![
                Self::new(source, taken, CfgEdgeKind::Taken),
                Self::new(source, fallthrough, CfgEdgeKind::Fallthrough),
            ],
            Terminator::Return(_) => Vec::new(),
        }
    }
}
