// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Phi requirement analysis.
//!
//! A block needs a phi for register `r` when it has at least two effective predecessors (reachable
//! natural predecessors, plus the OSR edge if the block is the OSR target), `r` is live on entry,
//! and at least one incoming edge may carry a bound value for `r`. A register unbound along every
//! incoming edge has nothing to merge.
//!
//! The rule is structural and over-approximates: it never tries to prove two incoming values
//! equal. The one refinement ([`PhiConfig::skip_dominated_single_def`]) drops a candidate whose
//! every binding and unbinding happens in a single block that strictly dominates the merge, so all
//! incoming edges carry the value that block left behind.
//!
//! Definition sites are counted per block: every block that assigns or deletes `r`, the entry
//! for parameters, and the OSR target for supplied registers that are live there. Dominance is
//! computed on the natural graph. A supplied register that is dead at the target is overwritten
//! before any read, so like an unsupplied one it never sees the OSR edge; a live one always counts
//! the target as a site.

use alloc::vec;
use alloc::vec::Vec;

use crate::analysis::bitset::BitSet;
use crate::analysis::definedness::{DefinednessResult, compute_definedness};
use crate::analysis::dominators::DominatorTree;
use crate::analysis::liveness::LivenessResult;
use crate::graph::{BlockId, Graph};
use crate::osr::OsrEntryDescriptor;
use crate::vreg::VReg;

/// Knobs for phi placement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PhiConfig {
    /// Skip a phi when the register's only definition site is one block strictly dominating the
    /// merge. With `false`, every candidate at a merge gets a phi.
    pub skip_dominated_single_def: bool,
}

impl Default for PhiConfig {
    fn default() -> Self {
        Self {
            skip_dominated_single_def: true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Sites {
    None,
    One(usize),
    Many,
}

impl Sites {
    fn add(&mut self, block: usize) {
        *self = match *self {
            Self::None => Self::One(block),
            Self::One(b) if b == block => Self::One(b),
            _ => Self::Many,
        };
    }
}

/// `osr` is the OSR target with the supplied registers live there.
fn definition_sites(graph: &Graph, params: &[VReg], osr: Option<&(BlockId, BitSet)>) -> Vec<Sites> {
    let mut sites = vec![Sites::None; graph.num_vregs()];
    for p in params {
        sites[p.index()].add(BlockId::ENTRY.index());
    }
    for (b_idx, block) in graph.blocks().iter().enumerate() {
        for w in block.ops().iter().filter_map(|op| op.writes()) {
            sites[w.index()].add(b_idx);
        }
    }
    if let Some((target, supplied)) = osr {
        for v in supplied.iter() {
            sites[v].add(target.index());
        }
    }
    sites
}

/// Per-block phi requirements and definedness, for one analysis run.
///
/// Immutable once computed. It borrows nothing: the liveness result it was computed from may be
/// dropped or reused independently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhiResult {
    required: Vec<BitSet>,
    unique_succ: Vec<Option<usize>>,
    definedness: DefinednessResult,
    osr_target: Option<BlockId>,
    empty: BitSet,
}

/// Computes phi requirements for a normal call entry.
///
/// `params` are the registers bound by the caller before the entry block runs.
///
/// # Panics
///
/// Panics if `liveness` was not computed from `graph`.
pub fn compute_required_phis(
    graph: &Graph,
    liveness: &LivenessResult,
    params: &[VReg],
    config: PhiConfig,
) -> PhiResult {
    PhiResult::compute(graph, liveness, params, None, config)
}

/// Computes phi requirements with `entry` acting as an extra predecessor of its target.
///
/// # Panics
///
/// Panics if `liveness` was not computed from `graph`, or if `entry` fails
/// [`OsrEntryDescriptor::validate`].
pub fn compute_required_phis_for_osr(
    graph: &Graph,
    liveness: &LivenessResult,
    params: &[VReg],
    entry: &OsrEntryDescriptor,
    config: PhiConfig,
) -> PhiResult {
    PhiResult::compute(graph, liveness, params, Some(entry), config)
}

impl PhiResult {
    fn compute(
        graph: &Graph,
        liveness: &LivenessResult,
        params: &[VReg],
        osr: Option<&OsrEntryDescriptor>,
        config: PhiConfig,
    ) -> Self {
        assert!(
            liveness.num_blocks() == graph.len() && liveness.num_vregs() == graph.num_vregs(),
            "liveness result does not belong to this graph"
        );
        let num_vregs = graph.num_vregs();

        let definedness = compute_definedness(graph, params, osr);
        let osr_live = osr.map(|d| {
            let mut supplied = d.supplied_set(num_vregs);
            supplied.intersect_with(liveness.live_in(d.target()));
            (d.target(), supplied)
        });
        let sites = definition_sites(graph, params, osr_live.as_ref());
        let dom = config
            .skip_dominated_single_def
            .then(|| DominatorTree::new(graph));
        let osr_target = osr.map(OsrEntryDescriptor::target);

        let mut required = Vec::with_capacity(graph.len());
        let mut total = 0;
        for block in graph.blocks() {
            let id = block.id();
            let mut req = BitSet::new_empty(num_vregs);
            if !definedness.is_reachable(id) {
                required.push(req);
                continue;
            }

            let is_target = osr_target == Some(id);
            let mut npred = usize::from(is_target);
            for p in block.preds() {
                if definedness.is_reachable(*p) {
                    npred += 1;
                    req.union_with(definedness.maybe_defined_at_end(p.index()));
                }
            }
            if npred < 2 {
                required.push(BitSet::new_empty(num_vregs));
                continue;
            }
            if is_target && let Some((_, supplied)) = &osr_live {
                req.union_with(supplied);
            }
            req.intersect_with(liveness.live_in(id));

            if let Some(dom) = &dom {
                let skipped: Vec<usize> = req
                    .iter()
                    .filter(|&r| match sites[r] {
                        Sites::One(d) => dom.strictly_dominates(BlockId::from_index(d), id),
                        Sites::None | Sites::Many => false,
                    })
                    .collect();
                for r in skipped {
                    req.clear(r);
                }
            }

            tracing::trace!(block = %id, preds = npred, phis = req.count(), "merge");
            total += req.count();
            required.push(req);
        }

        tracing::debug!(
            blocks = graph.len(),
            osr = osr.is_some(),
            phis = total,
            "phi analysis done"
        );

        let unique_succ = graph
            .blocks()
            .iter()
            .map(|b| match b.succs() {
                [only] => Some(only.index()),
                _ => None,
            })
            .collect();

        Self {
            required,
            unique_succ,
            definedness,
            osr_target,
            empty: BitSet::new_empty(num_vregs),
        }
    }

    fn check_block(&self, block: BlockId) {
        assert!(
            block.index() < self.required.len(),
            "{block} is not a block of the analyzed function ({} blocks)",
            self.required.len()
        );
    }

    /// Registers needing a phi at entry of `block`.
    pub fn required_for(&self, block: BlockId) -> &BitSet {
        self.check_block(block);
        &self.required[block.index()]
    }

    /// Does `vreg` need a phi at entry of `block`?
    pub fn is_required(&self, vreg: VReg, block: BlockId) -> bool {
        self.required_for(block).contains(vreg)
    }

    /// Phis the code generator must feed when leaving `block`: those of its successor if it has
    /// exactly one, otherwise none (a block with several successors never feeds phis directly).
    pub fn required_after(&self, block: BlockId) -> &BitSet {
        self.check_block(block);
        match self.unique_succ[block.index()] {
            Some(s) => &self.required[s],
            None => &self.empty,
        }
    }

    /// `required_after(block)` membership.
    pub fn is_required_after(&self, vreg: VReg, block: BlockId) -> bool {
        self.required_after(block).contains(vreg)
    }

    /// May `vreg` be unbound on entry to `block`?
    ///
    /// Code generation guards reads of such registers with an unbound-name check.
    pub fn is_potentially_undefined_at(&self, vreg: VReg, block: BlockId) -> bool {
        self.definedness
            .is_potentially_undefined_at_start(vreg, block)
    }

    /// May `vreg` be unbound when control leaves `block`?
    pub fn is_potentially_undefined_after(&self, vreg: VReg, block: BlockId) -> bool {
        self.definedness.is_potentially_undefined_at_end(vreg, block)
    }

    /// The definedness facts this result was derived from.
    #[inline]
    pub fn definedness(&self) -> &DefinednessResult {
        &self.definedness
    }

    /// The OSR target, if this run had an OSR entry.
    #[inline]
    pub fn osr_target(&self) -> Option<BlockId> {
        self.osr_target
    }

    /// Returns `true` if this run had an OSR entry.
    #[inline]
    pub fn is_osr(&self) -> bool {
        self.osr_target.is_some()
    }
}
