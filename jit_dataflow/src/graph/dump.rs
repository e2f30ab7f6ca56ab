// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic textual rendering of a graph, for debugging and fixture comparisons.
//!
//! ```text
//! bb0:
//!   preds: -
//!   x = op(a, b)
//!   branch x ? bb1 : bb2
//! ```

use core::fmt;

use crate::graph::{BasicBlock, BlockId, Graph, Op, Terminator};
use crate::vreg::{VReg, VRegTable};

/// [`Display`](fmt::Display) adapter returned by [`Graph::dump`].
#[derive(Clone, Copy, Debug)]
pub struct GraphDump<'a> {
    graph: &'a Graph,
    vregs: &'a VRegTable,
}

impl<'a> GraphDump<'a> {
    pub(crate) fn new(graph: &'a Graph, vregs: &'a VRegTable) -> Self {
        Self { graph, vregs }
    }

    fn block(&self, f: &mut fmt::Formatter<'_>, block: &BasicBlock) -> fmt::Result {
        writeln!(f, "{}:", block.id())?;
        f.write_str("  preds: ")?;
        write_blocks(f, block.preds())?;
        f.write_str("\n")?;
        for op in block.ops() {
            f.write_str("  ")?;
            match op {
                Op::Assign { dst, srcs } => {
                    write!(f, "{} = op(", self.vregs.display_name(*dst))?;
                    self.regs(f, srcs)?;
                    f.write_str(")")?;
                }
                Op::Eval { srcs } => {
                    f.write_str("eval(")?;
                    self.regs(f, srcs)?;
                    f.write_str(")")?;
                }
                Op::Delete { vreg } => write!(f, "del {}", self.vregs.display_name(*vreg))?,
            }
            f.write_str("\n")?;
        }
        match *block.terminator() {
            Terminator::Jump { target } => writeln!(f, "  jump {target}"),
            Terminator::Branch {
                cond,
                if_true,
                if_false,
            } => writeln!(
                f,
                "  branch {} ? {if_true} : {if_false}",
                self.vregs.display_name(cond)
            ),
            Terminator::Return { value: Some(v) } => {
                writeln!(f, "  return {}", self.vregs.display_name(v))
            }
            Terminator::Return { value: None } => writeln!(f, "  return"),
        }
    }

    fn regs(&self, f: &mut fmt::Formatter<'_>, regs: &[VReg]) -> fmt::Result {
        for (i, r) in regs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", self.vregs.display_name(*r))?;
        }
        Ok(())
    }
}

pub(crate) fn write_blocks(f: &mut fmt::Formatter<'_>, blocks: &[BlockId]) -> fmt::Result {
    if blocks.is_empty() {
        return f.write_str("-");
    }
    for (i, b) in blocks.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{b}")?;
    }
    Ok(())
}

impl fmt::Display for GraphDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in self.graph.blocks() {
            self.block(f, block)?;
        }
        Ok(())
    }
}
