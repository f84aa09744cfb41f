//! Fluent construction of instruction streams.
//!
//! [`FunctionBuilder`] plays the part of the instruction-generation pass:
//! it hands out fresh temps and labels and appends one instruction per
//! method call. It is how tests, benchmarks and the fuzz target produce
//! input for [`crate::FlowGraph`].
//!
//! # Examples
//!
//! ```rust
//! use tacflow::{BinaryOp, FlowGraph, FunctionBuilder};
//!
//! // t1 = a + b; if (t1 == 0) goto L; t2 = t1 * t1; return t2; L: return t1;
//! let mut fb = FunctionBuilder::new("f");
//! let (a, b, t1, t2) = (fb.new_temp(), fb.new_temp(), fb.new_temp(), fb.new_temp());
//! let l = fb.new_label();
//! fb.binary(BinaryOp::Add, t1, a, b)
//!     .beqz(t1, l)
//!     .binary(BinaryOp::Mul, t2, t1, t1)
//!     .ret(Some(t2))
//!     .mark(l)
//!     .ret(Some(t1));
//!
//! let graph = FlowGraph::new(fb.finish())?;
//! assert_eq!(graph.block_count(), 3);
//! # Ok::<(), tacflow::Error>(())
//! ```

use crate::tac::{BinaryOp, Function, Label, Tac, Temp, UnaryOp};

/// Appends instructions to a function under construction.
#[derive(Debug, Clone)]
pub struct FunctionBuilder {
    name: String,
    code: Vec<Tac>,
    next_temp: u32,
    next_label: u32,
}

impl FunctionBuilder {
    /// Starts an empty function.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: Vec::new(),
            next_temp: 0,
            next_label: 0,
        }
    }

    /// Allocates a fresh temp.
    pub fn new_temp(&mut self) -> Temp {
        let temp = Temp::new(self.next_temp);
        self.next_temp += 1;
        temp
    }

    /// Allocates a fresh label. It is not placed until [`mark`](Self::mark).
    pub fn new_label(&mut self) -> Label {
        let label = Label::new(self.next_label);
        self.next_label += 1;
        label
    }

    /// Appends an arbitrary instruction.
    pub fn push(&mut self, tac: Tac) -> &mut Self {
        self.code.push(tac);
        self
    }

    /// Places `label` at the current position.
    pub fn mark(&mut self, label: Label) -> &mut Self {
        self.push(Tac::Mark { label })
    }

    /// `dest = left op right`
    pub fn binary(&mut self, op: BinaryOp, dest: Temp, left: Temp, right: Temp) -> &mut Self {
        self.push(Tac::Binary {
            op,
            dest,
            left,
            right,
        })
    }

    /// `dest = op src`
    pub fn unary(&mut self, op: UnaryOp, dest: Temp, src: Temp) -> &mut Self {
        self.push(Tac::Unary { op, dest, src })
    }

    /// `dest = src`
    pub fn assign(&mut self, dest: Temp, src: Temp) -> &mut Self {
        self.unary(UnaryOp::Assign, dest, src)
    }

    /// `dest = value`
    pub fn load_imm4(&mut self, dest: Temp, value: i32) -> &mut Self {
        self.push(Tac::LoadImm4 { dest, value })
    }

    /// `dest = "value"`
    pub fn load_str(&mut self, dest: Temp, value: impl Into<String>) -> &mut Self {
        self.push(Tac::LoadStrConst {
            dest,
            value: value.into(),
        })
    }

    /// `dest = VTBL <class>`
    pub fn load_vtbl(&mut self, dest: Temp, class: impl Into<String>) -> &mut Self {
        self.push(Tac::LoadVtbl {
            dest,
            class: class.into(),
        })
    }

    /// `dest = *(base + offset)`
    pub fn load(&mut self, dest: Temp, base: Temp, offset: i32) -> &mut Self {
        self.push(Tac::Load { dest, base, offset })
    }

    /// `*(base + offset) = src`
    pub fn store(&mut self, src: Temp, base: Temp, offset: i32) -> &mut Self {
        self.push(Tac::Store { src, base, offset })
    }

    /// `parm value`
    pub fn parm(&mut self, value: Temp) -> &mut Self {
        self.push(Tac::Parm { value })
    }

    /// `[dest =] call callee`
    pub fn direct_call(&mut self, dest: Option<Temp>, callee: impl Into<String>) -> &mut Self {
        self.push(Tac::DirectCall {
            dest,
            callee: callee.into(),
        })
    }

    /// `[dest =] call target`
    pub fn indirect_call(&mut self, dest: Option<Temp>, target: Temp) -> &mut Self {
        self.push(Tac::IndirectCall { dest, target })
    }

    /// `branch target`
    pub fn branch(&mut self, target: Label) -> &mut Self {
        self.push(Tac::Branch { target })
    }

    /// `if (cond == 0) branch target`
    pub fn beqz(&mut self, cond: Temp, target: Label) -> &mut Self {
        self.push(Tac::Beqz { cond, target })
    }

    /// `if (cond != 0) branch target`
    pub fn bnez(&mut self, cond: Temp, target: Label) -> &mut Self {
        self.push(Tac::Bnez { cond, target })
    }

    /// `return [value]`
    pub fn ret(&mut self, value: Option<Temp>) -> &mut Self {
        self.push(Tac::Return { value })
    }

    /// Appends a memoization hint.
    pub fn memo(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Tac::Memo { text: text.into() })
    }

    /// Returns the number of instructions emitted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns `true` if nothing has been emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Finishes the function.
    #[must_use]
    pub fn finish(self) -> Function {
        Function::new(self.name, self.code)
    }
}
