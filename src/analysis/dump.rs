//! Plain-text diagnostics for a [`FlowGraph`].
//!
//! The formats are meant for people reading compiler debug output, one line
//! per instruction, block or fact. Nothing parses them back.

use std::io::{self, Write};

use crate::analysis::{
    cfg::{BasicBlock, FlowGraph},
    defuse::{DuPosition, DuUse},
};

impl FlowGraph {
    /// Writes every block with its numbered body and terminator.
    ///
    /// ```text
    /// FUNCTION f:
    /// BASIC BLOCK 0:
    ///     1  _T2 = (_T0 + _T1)
    ///     2  END BY BEQZ, if _T2 = 0 : goto 2; else goto 1
    /// ```
    ///
    /// # Errors
    ///
    /// Returns any error of the underlying writer.
    pub fn write_blocks<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "FUNCTION {}:", self.name())?;
        for block in self.blocks() {
            writeln!(out, "BASIC BLOCK {}:", block.num())?;
            for (pos, instr) in block.instrs().iter().enumerate() {
                writeln!(out, "    {:<2} {}", pos + 1, instr.tac())?;
            }
            writeln!(out, "    {:<2} {}", block.instrs().len() + 1, block.terminator())?;
        }
        Ok(())
    }

    /// Writes block-level DEF/USE and live sets, followed by every
    /// instruction with the temps live after it.
    ///
    /// # Errors
    ///
    /// Returns any error of the underlying writer.
    pub fn write_liveness<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "FUNCTION {}:", self.name())?;
        for block in self.blocks() {
            writeln!(out, "BASIC BLOCK {}:", block.num())?;
            writeln!(out, "  Def     = {}", block.def())?;
            writeln!(out, "  liveUse = {}", block.live_use())?;
            writeln!(out, "  liveIn  = {}", block.live_in())?;
            writeln!(out, "  liveOut = {}", block.live_out())?;
            for instr in block.instrs() {
                writeln!(out, "    {} {}", instr.tac(), instr.live_out())?;
            }
            writeln!(out, "    {}", block.terminator())?;
        }
        Ok(())
    }

    /// Writes every instruction, with `[ (block,line) ... ]` after each
    /// definition. A consumer at a terminator is printed at the line after
    /// the last body instruction of its block.
    ///
    /// # Errors
    ///
    /// Returns any error of the underlying writer.
    pub fn write_du_chains<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "FUNCTION {}:", self.name())?;
        for block in self.blocks() {
            writeln!(out, "BASIC BLOCK {}:", block.num())?;
            for (pos, instr) in block.instrs().iter().enumerate() {
                write!(out, "    {:<2} {}", pos + 1, instr.tac())?;
                if let Some(chain) = instr.du_chain() {
                    write!(out, " [ ")?;
                    for du in chain {
                        let line = sentinel_line(self.blocks(), du);
                        write!(out, "({},{line}) ", du.block)?;
                    }
                    write!(out, "]")?;
                }
                writeln!(out)?;
            }
            writeln!(out, "    {:<2} {}", block.instrs().len() + 1, block.terminator())?;
        }
        Ok(())
    }
}

fn sentinel_line(blocks: &[BasicBlock], du: &DuUse) -> usize {
    match du.position {
        DuPosition::Line(line) => line,
        DuPosition::EndOfBlock => blocks.get(du.block).map_or(0, |b| b.instrs().len()) + 1,
    }
}
