//! Parallel analysis of independent functions.
//!
//! Every function is analysed into its own [`FlowGraph`] with no shared
//! mutable state, so a compilation unit's functions can be processed on the
//! rayon thread pool without synchronization.

use rayon::prelude::*;

use crate::{analysis::cfg::FlowGraph, config::FlowConfig, tac::Function, Result};

/// Builds one [`FlowGraph`] per function in parallel.
///
/// Results are returned in input order. A defect in one function does not
/// affect the others; its slot holds the error.
///
/// # Examples
///
/// ```rust
/// use tacflow::{analyze_functions, FlowConfig, FunctionBuilder};
///
/// let functions: Vec<_> = (0..4)
///     .map(|i| {
///         let mut fb = FunctionBuilder::new(format!("f{i}"));
///         let t = fb.new_temp();
///         fb.load_imm4(t, i).ret(Some(t));
///         fb.finish()
///     })
///     .collect();
///
/// let graphs = analyze_functions(functions, &FlowConfig::default());
/// assert_eq!(graphs.len(), 4);
/// assert!(graphs.iter().all(Result::is_ok));
/// ```
#[must_use]
pub fn analyze_functions(functions: Vec<Function>, config: &FlowConfig) -> Vec<Result<FlowGraph>> {
    log::debug!("analyzing {} functions", functions.len());
    functions
        .into_par_iter()
        .map(|function| {
            let name = function.name().to_string();
            FlowGraph::build(function, config).inspect_err(|e| {
                log::debug!("{name}: analysis aborted: {e}");
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tac::FunctionBuilder, Error};

    #[test]
    fn test_errors_stay_in_their_slot() {
        let mut good = FunctionBuilder::new("good");
        good.ret(None);

        let mut bad = FunctionBuilder::new("bad");
        let nowhere = bad.new_label();
        bad.branch(nowhere);

        let results = analyze_functions(
            vec![good.finish(), bad.finish(), FunctionBuilder::new("empty").finish()],
            &FlowConfig::default(),
        );
        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().is_ok_and(|g| g.name() == "good"));
        assert!(matches!(results[1], Err(Error::UnresolvedLabel(_))));
        assert!(results[2].as_ref().is_ok_and(|g| g.block_count() == 0));
    }
}
