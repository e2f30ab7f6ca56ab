// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backwards liveness analysis.
//!
//! A register is live at a point if some path from that point reads it before any redefinition.
//! `del x` counts as a read followed by a write: it checks that `x` is bound, then ends its value.
//!
//! Every block is solved, including blocks unreachable from the entry; an unreachable block has no
//! influence on reachable ones since liveness only flows from successors to predecessors.

use alloc::vec::Vec;

use crate::analysis::bitset::BitSet;
use crate::analysis::cfg::Dfs;
use crate::analysis::dataflow;
use crate::graph::{BasicBlock, BlockId, Graph};
use crate::vreg::{VReg, VRegTable};

/// Per-block live-in/live-out sets at the fixed point.
///
/// Immutable once computed and valid for as long as the caller keeps it; queries are O(1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LivenessResult {
    use_sets: Vec<BitSet>,
    def_sets: Vec<BitSet>,
    live_in: Vec<BitSet>,
    live_out: Vec<BitSet>,
    num_vregs: usize,
}

pub(crate) fn compute_use_def(num_vregs: usize, block: &BasicBlock) -> (BitSet, BitSet) {
    let mut use_set = BitSet::new_empty(num_vregs);
    let mut def_set = BitSet::new_empty(num_vregs);
    let term_reads = block.terminator().reads();
    let reads = block
        .ops()
        .iter()
        .map(|op| (op.reads(), op.writes()))
        .chain(core::iter::once((term_reads, None)));
    for (reads, writes) in reads {
        for r in reads {
            if !def_set.contains(*r) {
                use_set.set(r.index());
            }
        }
        if let Some(w) = writes {
            def_set.set(w.index());
        }
    }
    (use_set, def_set)
}

/// Runs liveness over every block of `graph`.
///
/// # Panics
///
/// Panics if `graph` was not validated against `vregs`.
pub fn compute_liveness(graph: &Graph, vregs: &VRegTable) -> LivenessResult {
    assert_eq!(
        graph.num_vregs(),
        vregs.len(),
        "graph was built against a different register table"
    );
    let num_vregs = vregs.len();

    let (use_sets, def_sets): (Vec<BitSet>, Vec<BitSet>) = graph
        .blocks()
        .iter()
        .map(|b| compute_use_def(num_vregs, b))
        .unzip();

    // Postorder from the entry visits exits first; unreachable blocks go last.
    let dfs = Dfs::new(graph, &[BlockId::ENTRY]);
    let mut order = dfs.postorder.clone();
    order.extend((0..graph.len()).filter(|&b| !dfs.reachable[b]));

    let bottom = BitSet::new_empty(num_vregs);
    let fix = dataflow::solve_backward(
        graph,
        &order,
        bottom,
        |acc, succ_in| {
            acc.union_with(succ_in);
        },
        |b_idx, out_state| {
            // IN = USE ∪ (OUT \ DEF)
            let mut in_set = use_sets[b_idx].clone();
            let mut tmp = out_state.clone();
            tmp.subtract_with(&def_sets[b_idx]);
            in_set.union_with(&tmp);
            in_set
        },
    );

    tracing::debug!(
        blocks = graph.len(),
        vregs = num_vregs,
        visits = fix.visits,
        "liveness converged"
    );

    LivenessResult {
        use_sets,
        def_sets,
        live_in: fix.in_states,
        live_out: fix.out_states,
        num_vregs,
    }
}

impl LivenessResult {
    fn check(&self, vreg: VReg, block: BlockId) {
        assert!(
            vreg.index() < self.num_vregs,
            "{vreg} is not a register of the analyzed function ({} registers)",
            self.num_vregs
        );
        self.check_block(block);
    }

    fn check_block(&self, block: BlockId) {
        assert!(
            block.index() < self.live_in.len(),
            "{block} is not a block of the analyzed function ({} blocks)",
            self.live_in.len()
        );
    }

    /// Number of blocks covered.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.live_in.len()
    }

    /// Size of the register space.
    #[inline]
    pub fn num_vregs(&self) -> usize {
        self.num_vregs
    }

    /// Is `vreg` live when control reaches the end of `block`?
    pub fn is_live_at_end(&self, vreg: VReg, block: BlockId) -> bool {
        self.check(vreg, block);
        self.live_out[block.index()].contains(vreg)
    }

    /// Is `vreg` live when control enters `block`?
    pub fn is_live_at_start(&self, vreg: VReg, block: BlockId) -> bool {
        self.check(vreg, block);
        self.live_in[block.index()].contains(vreg)
    }

    /// Registers live at entry of `block`.
    pub fn live_in(&self, block: BlockId) -> &BitSet {
        self.check_block(block);
        &self.live_in[block.index()]
    }

    /// Registers live at exit of `block`.
    pub fn live_out(&self, block: BlockId) -> &BitSet {
        self.check_block(block);
        &self.live_out[block.index()]
    }

    /// Registers `block` reads before writing them.
    pub fn use_set(&self, block: BlockId) -> &BitSet {
        self.check_block(block);
        &self.use_sets[block.index()]
    }

    /// Registers `block` writes (assigns or deletes).
    pub fn def_set(&self, block: BlockId) -> &BitSet {
        self.check_block(block);
        &self.def_sets[block.index()]
    }

    /// Registers live immediately before position `pos` of `block`.
    ///
    /// Positions `0..ops.len()` are operations; `ops.len()` is the terminator. `graph` must be
    /// the graph this result was computed from.
    pub fn live_before(&self, graph: &Graph, block: BlockId, pos: usize) -> BitSet {
        self.check_block(block);
        let b = graph.block(block);
        assert!(
            pos <= b.ops().len(),
            "position {pos} is past the terminator of {block}"
        );

        let mut live = self.live_out[block.index()].clone();
        for r in b.terminator().reads() {
            live.set(r.index());
        }
        for op in b.ops()[pos..].iter().rev() {
            if let Some(w) = op.writes() {
                live.clear(w.index());
            }
            for r in op.reads() {
                live.set(r.index());
            }
        }
        live
    }

    /// Is the read of `vreg` at position `pos` of `block` its last use?
    ///
    /// Returns `false` if the operation at `pos` does not read `vreg`. Code generation uses this
    /// to release a value right after the read that kills it.
    pub fn is_last_use(&self, graph: &Graph, vreg: VReg, block: BlockId, pos: usize) -> bool {
        self.check(vreg, block);
        let b = graph.block(block);
        assert!(
            pos <= b.ops().len(),
            "position {pos} is past the terminator of {block}"
        );
        let reads = match b.ops().get(pos) {
            Some(op) => op.reads(),
            None => b.terminator().reads(),
        };
        if !reads.contains(&vreg) {
            return false;
        }
        if pos >= b.ops().len() {
            return !self.live_out[block.index()].contains(vreg);
        }
        let writes_here = b.ops()[pos].writes() == Some(vreg);
        writes_here || !self.live_before(graph, block, pos + 1).contains(vreg)
    }
}
