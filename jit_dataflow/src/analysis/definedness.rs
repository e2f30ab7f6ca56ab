// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forward definedness analysis.
//!
//! Tracks, per register and block boundary, whether the name may be bound and whether it may be
//! unbound on some path reaching that boundary. The two facts are independent bitsets merged by
//! union at joins, which gives the three-level lattice of [`DefinitionLevel`]:
//!
//! | may be defined | may be undefined | level                |
//! |----------------|------------------|----------------------|
//! | yes            | no               | `Defined`            |
//! | yes            | yes              | `PotentiallyDefined` |
//! | no             | yes              | `Undefined`          |
//! | no             | no               | (block unreachable)  |
//!
//! Roots are the function entry (parameters bound, everything else unbound) and, in OSR mode, the
//! OSR target. Registers the OSR frame declares bound are pinned to `Defined` at the target's
//! entry whatever the natural predecessors say; the captured frame is self-consistent.

use alloc::vec;
use alloc::vec::Vec;

use crate::analysis::bitset::BitSet;
use crate::analysis::cfg::Dfs;
use crate::analysis::dataflow;
use crate::graph::{BasicBlock, BlockId, Graph};
use crate::osr::OsrEntryDescriptor;
use crate::vreg::VReg;

/// Whether a name is bound at a point, over all paths reaching it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DefinitionLevel {
    /// Unbound on every path.
    Undefined,
    /// Bound on some paths, unbound on others.
    PotentiallyDefined,
    /// Bound on every path.
    Defined,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct DefState {
    maybe_defined: BitSet,
    maybe_undefined: BitSet,
}

impl DefState {
    fn bottom(num_vregs: usize) -> Self {
        Self {
            maybe_defined: BitSet::new_empty(num_vregs),
            maybe_undefined: BitSet::new_empty(num_vregs),
        }
    }

    fn meet_into(&mut self, other: &Self) {
        self.maybe_defined.union_with(&other.maybe_defined);
        self.maybe_undefined.union_with(&other.maybe_undefined);
    }

    fn level(&self, vreg: VReg) -> Option<DefinitionLevel> {
        match (
            self.maybe_defined.contains(vreg),
            self.maybe_undefined.contains(vreg),
        ) {
            (true, false) => Some(DefinitionLevel::Defined),
            (true, true) => Some(DefinitionLevel::PotentiallyDefined),
            (false, true) => Some(DefinitionLevel::Undefined),
            (false, false) => None,
        }
    }
}

/// Net effect of one block: registers it leaves bound and registers it leaves unbound.
struct BlockEffect {
    binds: BitSet,
    unbinds: BitSet,
}

fn block_effect(num_vregs: usize, block: &BasicBlock) -> BlockEffect {
    let mut binds = BitSet::new_empty(num_vregs);
    let mut unbinds = BitSet::new_empty(num_vregs);
    for op in block.ops() {
        let Some(w) = op.writes() else {
            continue;
        };
        if op.unbinds() {
            binds.clear(w.index());
            unbinds.set(w.index());
        } else {
            unbinds.clear(w.index());
            binds.set(w.index());
        }
    }
    BlockEffect { binds, unbinds }
}

/// Per-block definedness at the fixed point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinednessResult {
    reachable: Vec<bool>,
    at_start: Vec<DefState>,
    at_end: Vec<DefState>,
    num_vregs: usize,
}

/// Runs definedness over `graph`.
///
/// `params` are bound on entry to the function. With `osr`, its target becomes a second root fed
/// by the descriptor; the descriptor must already be valid for `graph`.
///
/// # Panics
///
/// Panics if a parameter is outside the graph's register space, or if `osr` fails
/// [`OsrEntryDescriptor::validate`].
pub fn compute_definedness(
    graph: &Graph,
    params: &[VReg],
    osr: Option<&OsrEntryDescriptor>,
) -> DefinednessResult {
    let num_vregs = graph.num_vregs();

    let mut entry = DefState::bottom(num_vregs);
    for v in 0..num_vregs {
        entry.maybe_undefined.set(v);
    }
    for p in params {
        assert!(
            p.index() < num_vregs,
            "parameter {p} is outside the register space ({num_vregs} registers)"
        );
        entry.maybe_defined.set(p.index());
        entry.maybe_undefined.clear(p.index());
    }

    let mut roots = vec![(BlockId::ENTRY.index(), entry)];
    let mut pinned: Option<(usize, BitSet)> = None;
    let mut root_ids = vec![BlockId::ENTRY];
    if let Some(d) = osr {
        if let Err(e) = d.validate(graph) {
            panic!("invalid osr entry descriptor: {e}");
        }
        let defined = d.defined_set(num_vregs);
        let mut seed = DefState::bottom(num_vregs);
        seed.maybe_defined = d.supplied_set(num_vregs);
        seed.maybe_undefined = d.maybe_undefined_set(num_vregs);
        roots.push((d.target().index(), seed));
        pinned = Some((d.target().index(), defined));
        root_ids.push(d.target());
    }

    let effects: Vec<BlockEffect> = graph
        .blocks()
        .iter()
        .map(|b| block_effect(num_vregs, b))
        .collect();
    let reachable = Dfs::new(graph, &root_ids).reachable;

    let fix = dataflow::solve_forward(
        graph,
        &reachable,
        roots,
        DefState::bottom(num_vregs),
        DefState::meet_into,
        |b_idx, in_state| {
            if let Some((target, defined)) = &pinned
                && *target == b_idx
            {
                in_state.maybe_defined.union_with(defined);
                in_state.maybe_undefined.subtract_with(defined);
            }
        },
        |b_idx, in_state| {
            let e = &effects[b_idx];
            let mut out = in_state.clone();
            out.maybe_defined.subtract_with(&e.unbinds);
            out.maybe_defined.union_with(&e.binds);
            out.maybe_undefined.subtract_with(&e.binds);
            out.maybe_undefined.union_with(&e.unbinds);
            out
        },
    );

    tracing::debug!(
        blocks = graph.len(),
        vregs = num_vregs,
        osr = osr.is_some(),
        visits = fix.visits,
        "definedness converged"
    );

    DefinednessResult {
        reachable,
        at_start: fix.in_states,
        at_end: fix.out_states,
        num_vregs,
    }
}

impl DefinednessResult {
    fn check(&self, vreg: VReg, block: BlockId) {
        assert!(
            vreg.index() < self.num_vregs,
            "{vreg} is not a register of the analyzed function ({} registers)",
            self.num_vregs
        );
        assert!(
            block.index() < self.at_start.len(),
            "{block} is not a block of the analyzed function ({} blocks)",
            self.at_start.len()
        );
    }

    /// Returns `true` if control can reach `block` from a root.
    pub fn is_reachable(&self, block: BlockId) -> bool {
        self.reachable.get(block.index()).copied().unwrap_or(false)
    }

    /// Definedness of `vreg` on entry to `block`; `None` if the block is unreachable.
    pub fn level_at_start(&self, vreg: VReg, block: BlockId) -> Option<DefinitionLevel> {
        self.check(vreg, block);
        self.at_start[block.index()].level(vreg)
    }

    /// Definedness of `vreg` on exit from `block`; `None` if the block is unreachable.
    pub fn level_at_end(&self, vreg: VReg, block: BlockId) -> Option<DefinitionLevel> {
        self.check(vreg, block);
        self.at_end[block.index()].level(vreg)
    }

    /// May `vreg` be unbound on entry to `block`?
    pub fn is_potentially_undefined_at_start(&self, vreg: VReg, block: BlockId) -> bool {
        self.check(vreg, block);
        self.at_start[block.index()].maybe_undefined.contains(vreg)
    }

    /// May `vreg` be unbound on exit from `block`?
    pub fn is_potentially_undefined_at_end(&self, vreg: VReg, block: BlockId) -> bool {
        self.check(vreg, block);
        self.at_end[block.index()].maybe_undefined.contains(vreg)
    }

    /// Registers bound on at least one path leaving `block`.
    pub(crate) fn maybe_defined_at_end(&self, block: usize) -> &BitSet {
        &self.at_end[block].maybe_defined
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::graph::{GraphBuilder, Op, Terminator};
    use crate::vreg::{VRegKind, VRegTableBuilder};

    #[test]
    fn delete_then_rebind_on_one_arm() {
        let mut t = VRegTableBuilder::new();
        let x = t.intern("x", VRegKind::UserVisible).unwrap();
        let c = t.intern("c", VRegKind::UserVisible).unwrap();
        let t = t.finish();

        // entry: x = ...; branch c ? a : join
        // a: del x; jump join
        let mut gb = GraphBuilder::new();
        let entry = gb.add_block();
        let a = gb.add_block();
        let join = gb.add_block();
        gb.push(entry, Op::Assign { dst: x, srcs: vec![] });
        gb.terminate(
            entry,
            Terminator::Branch {
                cond: c,
                if_true: a,
                if_false: join,
            },
        );
        gb.push(a, Op::Delete { vreg: x });
        gb.terminate(a, Terminator::Jump { target: join });
        gb.terminate(join, Terminator::Return { value: Some(x) });
        let g = gb.finish(&t).unwrap();

        let d = compute_definedness(&g, &[c], None);
        assert_eq!(d.level_at_end(x, entry), Some(DefinitionLevel::Defined));
        assert_eq!(d.level_at_end(x, a), Some(DefinitionLevel::Undefined));
        assert_eq!(
            d.level_at_start(x, join),
            Some(DefinitionLevel::PotentiallyDefined)
        );
        assert_eq!(d.level_at_start(c, join), Some(DefinitionLevel::Defined));
        assert!(d.is_potentially_undefined_at_start(x, join));
        assert!(!d.is_potentially_undefined_at_start(c, a));
    }

    #[test]
    fn unreachable_block_has_no_level() {
        let mut t = VRegTableBuilder::new();
        let x = t.intern("x", VRegKind::UserVisible).unwrap();
        let t = t.finish();

        let mut gb = GraphBuilder::new();
        let entry = gb.add_block();
        let dead = gb.add_block();
        gb.terminate(entry, Terminator::Return { value: None });
        gb.terminate(dead, Terminator::Return { value: Some(x) });
        let g = gb.finish(&t).unwrap();

        let d = compute_definedness(&g, &[], None);
        assert!(!d.is_reachable(dead));
        assert_eq!(d.level_at_start(x, dead), None);
        assert!(!d.is_potentially_undefined_at_start(x, dead));
        assert_eq!(d.level_at_start(x, entry), Some(DefinitionLevel::Undefined));
    }
}
