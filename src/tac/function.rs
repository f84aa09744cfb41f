//! The analysed unit: one function's instruction stream.

use crate::tac::{Label, LabelInfo, Tac};

/// One function's three-address code, as handed over by instruction
/// generation.
///
/// The function owns its instruction arena and the table of label facts.
/// Temp and label counts are derived from the instructions, so every temp
/// index below [`temp_count`](Self::temp_count) can key a
/// [`crate::analysis::VarSet`].
///
/// # Examples
///
/// ```rust
/// use tacflow::{Function, Label, Tac, Temp};
///
/// let l = Label::new(0);
/// let f = Function::new(
///     "main",
///     vec![
///         Tac::Mark { label: l },
///         Tac::LoadImm4 { dest: Temp::new(0), value: 1 },
///         Tac::Bnez { cond: Temp::new(0), target: l },
///         Tac::Return { value: None },
///     ],
/// );
/// assert_eq!(f.temp_count(), 1);
/// assert!(f.label(l).is_some_and(|info| info.targeted));
/// ```
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    code: Vec<Tac>,
    labels: Vec<LabelInfo>,
    temp_count: usize,
}

impl Function {
    /// Creates a function from its display name and instruction stream.
    ///
    /// A label is flagged as targeted when at least one branch in `code`
    /// jumps to it.
    #[must_use]
    pub fn new(name: impl Into<String>, code: Vec<Tac>) -> Self {
        let mut temp_count = 0;
        let mut label_count = 0;
        for tac in &code {
            for temp in tac.def().into_iter().chain(tac.uses()) {
                temp_count = temp_count.max(temp.index() + 1);
            }
            let label = match tac {
                Tac::Mark { label } => Some(*label),
                other => other.branch_target(),
            };
            if let Some(label) = label {
                label_count = label_count.max(label.index() + 1);
            }
        }

        let mut labels = vec![LabelInfo::default(); label_count];
        for target in code.iter().filter_map(Tac::branch_target) {
            labels[target.index()].targeted = true;
        }

        Self {
            name: name.into(),
            code,
            labels,
            temp_count,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the instruction stream.
    #[must_use]
    pub fn code(&self) -> &[Tac] {
        &self.code
    }

    /// Returns one past the highest temp index used by the function.
    #[must_use]
    pub const fn temp_count(&self) -> usize {
        self.temp_count
    }

    /// Returns the facts recorded for `label`.
    #[must_use]
    pub fn label(&self, label: Label) -> Option<&LabelInfo> {
        self.labels.get(label.index())
    }

    /// Returns the number of labels the function references.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub(crate) fn labels_mut(&mut self) -> &mut [LabelInfo] {
        &mut self.labels
    }

    /// Moves the instruction stream out, leaving the function empty.
    pub(crate) fn take_code(&mut self) -> Vec<Tac> {
        std::mem::take(&mut self.code)
    }
}
