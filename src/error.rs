use thiserror::Error;

use crate::tac::Label;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

pub(crate) use malformed_error;

/// The error type for every fallible operation in this crate.
///
/// The instruction stream handed to [`crate::FlowGraph::build`] is produced by a
/// trusted upstream pass, so every variant here is an internal-consistency
/// defect: the analysis of the affected function is aborted and the error is
/// reported to the caller. Analyses are deterministic, so retrying the same
/// input reproduces the same error.
///
/// Absent operands (a `void` call or return) are not errors; they are modelled
/// as `None` and contribute nothing to any set.
///
/// # Examples
///
/// ```rust
/// use tacflow::{Error, FlowGraph, FunctionBuilder};
///
/// // x = 1; L: goto L;  (the empty self-loop is a redirect cycle)
/// let mut fb = FunctionBuilder::new("spin");
/// let x = fb.new_temp();
/// let top = fb.new_label();
/// fb.load_imm4(x, 1).mark(top).branch(top);
///
/// match FlowGraph::new(fb.finish()) {
///     Err(Error::UnterminatedChase { block, .. }) => println!("redirect cycle at {block}"),
///     Err(e) => println!("other defect: {e}"),
///     Ok(graph) => println!("{} blocks", graph.block_count()),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The instruction stream violates a structural expectation.
    ///
    /// Carries the source location where the violation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - What was wrong
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// Description of the violation
        message: String,
        /// The source file in which this error occurred
        file: &'static str,
        /// The source line in which this error occurred
        line: u32,
    },

    /// A branch targets a label that does not start any basic block.
    ///
    /// Either the label is never placed in the stream, or it was placed but
    /// not flagged as targeted, so partitioning spliced its marker out.
    #[error("Branch target {0} does not resolve to a basic block")]
    UnresolvedLabel(Label),

    /// Jump threading could not reach a live block.
    ///
    /// The chase through cancelled blocks starting at the successor of
    /// `block` did not terminate within `limit` steps, which means the
    /// cancelled blocks form a cycle (for example `L: goto L`).
    #[error("Successor chase from block {block} did not reach a live block within {limit} steps")]
    UnterminatedChase {
        /// Provisional number of the block whose successor was being threaded
        block: usize,
        /// Maximum number of steps allowed (the block count)
        limit: usize,
    },

    /// The inter-block DU search exceeded its depth bound.
    ///
    /// The associated value is the bound (the block count).
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// The liveness fixed point did not converge within the iteration cap.
    ///
    /// The associated value is the cap that was reached.
    #[error("Liveness did not converge within {0} iterations")]
    IterationLimit(usize),
}
