//! Three-address instructions.
//!
//! [`Tac`] is a closed enum with one variant per opcode class. The operand
//! classification every analysis depends on ("which temp does this define,
//! which temps does it read") is encoded once, in [`Tac::def`] and
//! [`Tac::uses`]; partitioning, liveness and DU-chain construction never
//! inspect opcodes themselves.
//!
//! # Operand classes
//!
//! | Class | Variants | Defines | Uses |
//! |-------|----------|---------|------|
//! | binary | [`Tac::Binary`] | `dest` | `left`, `right` |
//! | unary / copy / load | [`Tac::Unary`], [`Tac::IndirectCall`], [`Tac::Load`] | `dest` (optional for calls) | one source |
//! | pure definition | [`Tac::LoadImm4`], [`Tac::LoadStrConst`], [`Tac::LoadVtbl`], [`Tac::DirectCall`] | `dest` (optional for calls) | nothing |
//! | store | [`Tac::Store`] | nothing | `src`, `base` |
//! | single use | [`Tac::Parm`], [`Tac::Beqz`], [`Tac::Bnez`] | nothing | one operand |
//! | control | [`Tac::Branch`], [`Tac::Return`] | nothing | returned value, if any |
//! | markers | [`Tac::Mark`], [`Tac::Memo`] | nothing | nothing |
//!
//! A [`Tac::Return`] always ends its basic block and is folded into the
//! block's terminator, so within block bodies it never appears; its operand
//! is reported as a use.

use std::fmt;

use strum::{Display, EnumCount, EnumIter};

use crate::tac::{Label, Temp};

/// Binary arithmetic, relational and logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
pub enum BinaryOp {
    /// Addition
    #[strum(to_string = "+")]
    Add,
    /// Subtraction
    #[strum(to_string = "-")]
    Sub,
    /// Multiplication
    #[strum(to_string = "*")]
    Mul,
    /// Division
    #[strum(to_string = "/")]
    Div,
    /// Remainder
    #[strum(to_string = "%")]
    Mod,
    /// Logical and
    #[strum(to_string = "&&")]
    Land,
    /// Logical or
    #[strum(to_string = "||")]
    Lor,
    /// Greater than
    #[strum(to_string = ">")]
    Gtr,
    /// Greater or equal
    #[strum(to_string = ">=")]
    Geq,
    /// Equal
    #[strum(to_string = "==")]
    Equ,
    /// Not equal
    #[strum(to_string = "!=")]
    Neq,
    /// Less or equal
    #[strum(to_string = "<=")]
    Leq,
    /// Less than
    #[strum(to_string = "<")]
    Les,
}

/// Unary operators, including the plain copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
pub enum UnaryOp {
    /// Arithmetic negation
    #[strum(to_string = "-")]
    Neg,
    /// Logical not
    #[strum(to_string = "!")]
    Lnot,
    /// Copy
    #[strum(to_string = "")]
    Assign,
}

/// A three-address instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Tac {
    /// `dest = left op right`
    Binary {
        /// Operator
        op: BinaryOp,
        /// Result
        dest: Temp,
        /// Left operand
        left: Temp,
        /// Right operand
        right: Temp,
    },
    /// `dest = op src`
    Unary {
        /// Operator
        op: UnaryOp,
        /// Result
        dest: Temp,
        /// Operand
        src: Temp,
    },
    /// `dest = call target`, `dest` absent for `void` calls.
    IndirectCall {
        /// Result, if the callee returns a value
        dest: Option<Temp>,
        /// Temp holding the callee address
        target: Temp,
    },
    /// `dest = *(base + offset)`
    Load {
        /// Result
        dest: Temp,
        /// Base address
        base: Temp,
        /// Byte offset
        offset: i32,
    },
    /// `dest = value`
    LoadImm4 {
        /// Result
        dest: Temp,
        /// Immediate
        value: i32,
    },
    /// `dest = "value"`
    LoadStrConst {
        /// Result
        dest: Temp,
        /// String literal
        value: String,
    },
    /// `dest = VTBL <class>`
    LoadVtbl {
        /// Result
        dest: Temp,
        /// Class whose virtual table is loaded
        class: String,
    },
    /// `dest = call callee`, `dest` absent for `void` calls.
    DirectCall {
        /// Result, if the callee returns a value
        dest: Option<Temp>,
        /// Callee symbol
        callee: String,
    },
    /// `return value`, `value` absent for `void` returns.
    Return {
        /// Returned temp
        value: Option<Temp>,
    },
    /// `*(base + offset) = src`
    Store {
        /// Stored value
        src: Temp,
        /// Base address
        base: Temp,
        /// Byte offset
        offset: i32,
    },
    /// `parm value`
    Parm {
        /// Pushed argument
        value: Temp,
    },
    /// `branch target`
    Branch {
        /// Jump target
        target: Label,
    },
    /// `if (cond == 0) branch target`
    Beqz {
        /// Tested temp
        cond: Temp,
        /// Taken target
        target: Label,
    },
    /// `if (cond != 0) branch target`
    Bnez {
        /// Tested temp
        cond: Temp,
        /// Taken target
        target: Label,
    },
    /// `label:` marker
    Mark {
        /// Placed label
        label: Label,
    },
    /// Memoization hint; carries no operands.
    Memo {
        /// Free-form payload
        text: String,
    },
}

impl Tac {
    /// Returns the temp this instruction defines, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tacflow::{BinaryOp, Tac, Temp};
    ///
    /// let add = Tac::Binary { op: BinaryOp::Add, dest: Temp::new(0), left: Temp::new(1), right: Temp::new(2) };
    /// assert_eq!(add.def(), Some(Temp::new(0)));
    ///
    /// let void_call = Tac::DirectCall { dest: None, callee: "_PrintInt".into() };
    /// assert_eq!(void_call.def(), None);
    /// ```
    #[must_use]
    pub fn def(&self) -> Option<Temp> {
        match self {
            Self::Binary { dest, .. }
            | Self::Unary { dest, .. }
            | Self::Load { dest, .. }
            | Self::LoadImm4 { dest, .. }
            | Self::LoadStrConst { dest, .. }
            | Self::LoadVtbl { dest, .. } => Some(*dest),
            Self::IndirectCall { dest, .. } | Self::DirectCall { dest, .. } => *dest,
            Self::Return { .. }
            | Self::Store { .. }
            | Self::Parm { .. }
            | Self::Branch { .. }
            | Self::Beqz { .. }
            | Self::Bnez { .. }
            | Self::Mark { .. }
            | Self::Memo { .. } => None,
        }
    }

    /// Returns the temps this instruction reads, in operand order.
    ///
    /// A temp appearing in two operand slots is reported twice.
    #[must_use]
    pub fn uses(&self) -> Vec<Temp> {
        match self {
            Self::Binary { left, right, .. } => vec![*left, *right],
            Self::Unary { src, .. } => vec![*src],
            Self::IndirectCall { target, .. } => vec![*target],
            Self::Load { base, .. } => vec![*base],
            Self::Store { src, base, .. } => vec![*src, *base],
            Self::Parm { value } => vec![*value],
            Self::Beqz { cond, .. } | Self::Bnez { cond, .. } => vec![*cond],
            Self::Return { value } => value.iter().copied().collect(),
            Self::LoadImm4 { .. }
            | Self::LoadStrConst { .. }
            | Self::LoadVtbl { .. }
            | Self::DirectCall { .. }
            | Self::Branch { .. }
            | Self::Mark { .. }
            | Self::Memo { .. } => vec![],
        }
    }

    /// Returns `true` if this instruction reads `temp`.
    #[must_use]
    pub fn reads(&self, temp: Temp) -> bool {
        match self {
            Self::Binary { left, right, .. } => *left == temp || *right == temp,
            Self::Store { src, base, .. } => *src == temp || *base == temp,
            Self::Unary { src: op, .. }
            | Self::IndirectCall { target: op, .. }
            | Self::Load { base: op, .. }
            | Self::Parm { value: op }
            | Self::Beqz { cond: op, .. }
            | Self::Bnez { cond: op, .. } => *op == temp,
            Self::Return { value } => *value == Some(temp),
            _ => false,
        }
    }

    /// Returns `true` if this instruction transfers control and therefore ends
    /// a basic block.
    #[must_use]
    pub const fn is_terminator(&self) -> bool {
        matches!(
            self,
            Self::Branch { .. } | Self::Beqz { .. } | Self::Bnez { .. } | Self::Return { .. }
        )
    }

    /// Returns the label this instruction jumps to, if it is a branch.
    #[must_use]
    pub const fn branch_target(&self) -> Option<Label> {
        match self {
            Self::Branch { target } | Self::Beqz { target, .. } | Self::Bnez { target, .. } => {
                Some(*target)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Tac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary {
                op,
                dest,
                left,
                right,
            } => write!(f, "{dest} = ({left} {op} {right})"),
            Self::Unary {
                op: UnaryOp::Assign,
                dest,
                src,
            } => write!(f, "{dest} = {src}"),
            Self::Unary { op, dest, src } => write!(f, "{dest} = {op} {src}"),
            Self::IndirectCall {
                dest: Some(dest),
                target,
            } => write!(f, "{dest} = call {target}"),
            Self::IndirectCall { dest: None, target } => write!(f, "call {target}"),
            Self::Load { dest, base, offset } => write!(f, "{dest} = *({base} {offset:+})"),
            Self::LoadImm4 { dest, value } => write!(f, "{dest} = {value}"),
            Self::LoadStrConst { dest, value } => write!(f, "{dest} = {value:?}"),
            Self::LoadVtbl { dest, class } => write!(f, "{dest} = VTBL <{class}>"),
            Self::DirectCall {
                dest: Some(dest),
                callee,
            } => write!(f, "{dest} = call {callee}"),
            Self::DirectCall { dest: None, callee } => write!(f, "call {callee}"),
            Self::Return { value: Some(v) } => write!(f, "return {v}"),
            Self::Return { value: None } => f.write_str("return <empty>"),
            Self::Store { src, base, offset } => write!(f, "*({base} {offset:+}) = {src}"),
            Self::Parm { value } => write!(f, "parm {value}"),
            Self::Branch { target } => write!(f, "branch {target}"),
            Self::Beqz { cond, target } => write!(f, "if ({cond} == 0) branch {target}"),
            Self::Bnez { cond, target } => write!(f, "if ({cond} != 0) branch {target}"),
            Self::Mark { label } => write!(f, "{label}:"),
            Self::Memo { text } => write!(f, "memo '{text}'"),
        }
    }
}
