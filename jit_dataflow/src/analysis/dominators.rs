// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dominator tree over the blocks reachable from the entry.
//!
//! Iterative intersection over reverse postorder (Cooper, Harvey and Kennedy, "A Simple, Fast
//! Dominance Algorithm"). Handles irreducible graphs; converges in a couple of passes on
//! structured code.

use alloc::vec;
use alloc::vec::Vec;

use crate::analysis::cfg::Dfs;
use crate::graph::{BlockId, Graph};

/// Immediate dominators of every reachable block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DominatorTree {
    /// `idom[b]`; the entry is its own idom, unreachable blocks have none.
    idom: Vec<Option<usize>>,
    /// Position of each block in reverse postorder (entry = 0).
    rpo_index: Vec<usize>,
}

impl DominatorTree {
    /// Computes the dominator tree of `graph` rooted at its entry.
    pub fn new(graph: &Graph) -> Self {
        let dfs = Dfs::new(graph, &[BlockId::ENTRY]);
        Self::from_dfs(graph, &dfs)
    }

    pub(crate) fn from_dfs(graph: &Graph, dfs: &Dfs) -> Self {
        let n = graph.len();
        let rpo = dfs.reverse_postorder();
        let mut rpo_index = vec![usize::MAX; n];
        for (i, &b) in rpo.iter().enumerate() {
            rpo_index[b] = i;
        }

        let mut idom: Vec<Option<usize>> = vec![None; n];
        idom[BlockId::ENTRY.index()] = Some(BlockId::ENTRY.index());

        let mut changed = true;
        while changed {
            changed = false;
            for &b in rpo.iter().skip(1) {
                let mut new_idom: Option<usize> = None;
                for p in graph.blocks()[b].preds() {
                    let p = p.index();
                    if idom[p].is_none() {
                        continue;
                    }
                    new_idom = Some(match new_idom {
                        None => p,
                        Some(cur) => intersect(&idom, &rpo_index, p, cur),
                    });
                }
                if new_idom.is_some() && idom[b] != new_idom {
                    idom[b] = new_idom;
                    changed = true;
                }
            }
        }

        Self { idom, rpo_index }
    }

    /// Immediate dominator of `block`; `None` for the entry and unreachable blocks.
    pub fn idom(&self, block: BlockId) -> Option<BlockId> {
        let b = block.index();
        match self.idom.get(b).copied().flatten() {
            Some(d) if d != b => Some(BlockId::from_index(d)),
            _ => None,
        }
    }

    /// Returns `true` if `block` is reachable from the entry.
    pub fn is_reachable(&self, block: BlockId) -> bool {
        self.idom.get(block.index()).is_some_and(Option::is_some)
    }

    /// Does every path from the entry to `b` pass through `a`? (Reflexive.)
    ///
    /// Unreachable blocks dominate nothing and are dominated by nothing.
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        if !self.is_reachable(a) || !self.is_reachable(b) {
            return false;
        }
        let (a, mut cur) = (a.index(), b.index());
        loop {
            if cur == a {
                return true;
            }
            // Dominators come earlier in reverse postorder; stop once we've walked past `a`.
            if self.rpo_index[cur] < self.rpo_index[a] {
                return false;
            }
            match self.idom[cur] {
                Some(next) if next != cur => cur = next,
                _ => return false,
            }
        }
    }

    /// `dominates(a, b) && a != b`.
    pub fn strictly_dominates(&self, a: BlockId, b: BlockId) -> bool {
        a != b && self.dominates(a, b)
    }
}

fn intersect(idom: &[Option<usize>], rpo_index: &[usize], mut a: usize, mut b: usize) -> usize {
    while a != b {
        while rpo_index[a] > rpo_index[b] {
            a = idom[a].unwrap_or(a);
        }
        while rpo_index[b] > rpo_index[a] {
            b = idom[b].unwrap_or(b);
        }
    }
    a
}
