// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured analysis reporting.
//!
//! Small, allocation-based report types intended for debugging and fixture comparisons. The
//! [`Display`](core::fmt::Display) form is deterministic: blocks and registers in id order.

use core::fmt;

use alloc::vec::Vec;

use crate::analysis::bitset::BitSet;
use crate::analysis::liveness::LivenessResult;
use crate::analysis::phi::PhiResult;
use crate::graph::{BlockId, Graph, dump};
use crate::vreg::{VReg, VRegTable};

/// Facts about one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockReport {
    /// The block.
    pub block: BlockId,
    /// Predecessors.
    pub preds: Vec<BlockId>,
    /// Registers live on entry.
    pub live_in: Vec<VReg>,
    /// Registers live on exit.
    pub live_out: Vec<VReg>,
    /// Registers needing a phi on entry.
    pub phis: Vec<VReg>,
    /// Live-in registers that may be unbound on entry.
    pub maybe_undefined: Vec<VReg>,
}

/// Report for a whole function.
#[derive(Clone, Debug)]
pub struct AnalysisReport<'a> {
    vregs: &'a VRegTable,
    /// Per-block records, in block order.
    pub blocks: Vec<BlockReport>,
}

fn members(set: &BitSet) -> Vec<VReg> {
    set.vregs().collect()
}

impl<'a> AnalysisReport<'a> {
    /// Collects the report. `liveness` and `phis` must come from `graph`.
    pub fn new(
        graph: &Graph,
        vregs: &'a VRegTable,
        liveness: &LivenessResult,
        phis: &PhiResult,
    ) -> Self {
        let blocks = graph
            .blocks()
            .iter()
            .map(|b| {
                let id = b.id();
                let live_in = members(liveness.live_in(id));
                let maybe_undefined = live_in
                    .iter()
                    .copied()
                    .filter(|&v| phis.is_potentially_undefined_at(v, id))
                    .collect();
                BlockReport {
                    block: id,
                    preds: b.preds().to_vec(),
                    live_in,
                    live_out: members(liveness.live_out(id)),
                    phis: members(phis.required_for(id)),
                    maybe_undefined,
                }
            })
            .collect();
        Self { vregs, blocks }
    }

    fn regs(&self, f: &mut fmt::Formatter<'_>, label: &str, regs: &[VReg]) -> fmt::Result {
        write!(f, "  {label}:")?;
        if regs.is_empty() {
            f.write_str(" -")?;
        }
        for r in regs {
            write!(f, " {}", self.vregs.display_name(*r))?;
        }
        f.write_str("\n")
    }
}

impl fmt::Display for AnalysisReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.blocks {
            writeln!(f, "{}:", b.block)?;
            f.write_str("  preds: ")?;
            dump::write_blocks(f, &b.preds)?;
            f.write_str("\n")?;
            self.regs(f, "live-in", &b.live_in)?;
            self.regs(f, "live-out", &b.live_out)?;
            self.regs(f, "phis", &b.phis)?;
            self.regs(f, "maybe-undefined", &b.maybe_undefined)?;
        }
        Ok(())
    }
}
