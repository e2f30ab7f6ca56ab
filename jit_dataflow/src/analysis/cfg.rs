// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traversal orders and loop headers.

use alloc::vec;
use alloc::vec::Vec;

use crate::analysis::dominators::DominatorTree;
use crate::graph::{BlockId, Graph};

/// Result of one depth-first walk from a set of roots.
#[derive(Clone, Debug)]
pub(crate) struct Dfs {
    /// `reachable[b]` is `true` if `b` was visited.
    pub(crate) reachable: Vec<bool>,
    /// Visited blocks in postorder.
    pub(crate) postorder: Vec<usize>,
}

impl Dfs {
    /// Walks `graph` depth-first from `roots`, in order. Successors are visited in terminator
    /// order, so the result is deterministic.
    pub(crate) fn new(graph: &Graph, roots: &[BlockId]) -> Self {
        let n = graph.len();
        let mut reachable = vec![false; n];
        let mut postorder = Vec::with_capacity(n);
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in roots {
            let r = root.index();
            if reachable[r] {
                continue;
            }
            reachable[r] = true;
            stack.push((r, 0));

            while let Some(top) = stack.last_mut() {
                let b = top.0;
                if let Some(s) = graph.blocks()[b].succs().get(top.1) {
                    top.1 += 1;
                    let s = s.index();
                    if !reachable[s] {
                        reachable[s] = true;
                        stack.push((s, 0));
                    }
                } else {
                    postorder.push(b);
                    stack.pop();
                }
            }
        }

        Self {
            reachable,
            postorder,
        }
    }

    /// Visited blocks in reverse postorder.
    pub(crate) fn reverse_postorder(&self) -> Vec<usize> {
        self.postorder.iter().rev().copied().collect()
    }
}

/// Returns `true` if `target` is reachable and heads a loop: some path leaves it and comes back
/// without passing through a block that strictly dominates it.
///
/// Natural loop headers qualify through their back edges. Every block an irreducible loop can be
/// entered at qualifies too, whichever one a walk from the entry happens to visit first. Blocks
/// inside a loop body do not, since every way back to them runs through their header.
pub(crate) fn is_loop_header(graph: &Graph, target: BlockId) -> bool {
    let dom = DominatorTree::new(graph);
    if !dom.is_reachable(target) {
        return false;
    }
    let mut seen = vec![false; graph.len()];
    let mut stack: Vec<BlockId> = graph.block(target).succs().to_vec();
    while let Some(b) = stack.pop() {
        if b == target {
            return true;
        }
        if seen[b.index()] || dom.strictly_dominates(b, target) {
            continue;
        }
        seen[b.index()] = true;
        stack.extend_from_slice(graph.block(b).succs());
    }
    false
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::graph::{GraphBuilder, Terminator};
    use crate::vreg::{VRegKind, VRegTableBuilder};

    #[test]
    fn loop_orders_and_back_edges() {
        let mut t = VRegTableBuilder::new();
        let c = t.intern("c", VRegKind::UserVisible).unwrap();
        let t = t.finish();

        // 0 -> 1 -> 2 -> 1, 1 -> 3; 4 is unreachable.
        let mut gb = GraphBuilder::new();
        let b: std::vec::Vec<_> = (0..5).map(|_| gb.add_block()).collect();
        gb.terminate(b[0], Terminator::Jump { target: b[1] });
        gb.terminate(
            b[1],
            Terminator::Branch {
                cond: c,
                if_true: b[2],
                if_false: b[3],
            },
        );
        gb.terminate(b[2], Terminator::Jump { target: b[1] });
        gb.terminate(b[3], Terminator::Return { value: None });
        gb.terminate(b[4], Terminator::Jump { target: b[3] });
        let g = gb.finish(&t).unwrap();

        let dfs = Dfs::new(&g, &[BlockId::ENTRY]);
        assert_eq!(dfs.reachable, [true, true, true, true, false]);
        assert_eq!(dfs.postorder, [2, 3, 1, 0]);
        assert_eq!(dfs.reverse_postorder(), [0, 1, 3, 2]);
        assert!(is_loop_header(&g, b[1]));
        // The latch closes the loop but does not head it.
        assert!(!is_loop_header(&g, b[2]));
        assert!(!is_loop_header(&g, b[3]));
        assert!(!is_loop_header(&g, b[0]));
        assert!(!is_loop_header(&g, b[4]));
    }

    #[test]
    fn both_entries_of_irreducible_loop_are_headers() {
        let mut t = VRegTableBuilder::new();
        let c = t.intern("c", VRegKind::UserVisible).unwrap();
        let t = t.finish();

        // 0 -> {1, 2}; 1 <-> 2; both -> 3.
        let mut gb = GraphBuilder::new();
        let b: std::vec::Vec<_> = (0..4).map(|_| gb.add_block()).collect();
        let branch = |a, b| Terminator::Branch {
            cond: c,
            if_true: a,
            if_false: b,
        };
        gb.terminate(b[0], branch(b[1], b[2]));
        gb.terminate(b[1], branch(b[2], b[3]));
        gb.terminate(b[2], branch(b[1], b[3]));
        gb.terminate(b[3], Terminator::Return { value: None });
        let g = gb.finish(&t).unwrap();

        assert!(is_loop_header(&g, b[1]));
        assert!(is_loop_header(&g, b[2]));
        assert!(!is_loop_header(&g, b[3]));
    }

    #[test]
    fn inner_header_counts_but_outer_body_does_not() {
        let mut t = VRegTableBuilder::new();
        let c = t.intern("c", VRegKind::UserVisible).unwrap();
        let t = t.finish();

        // 0 -> 1; 1 -> {2, 5}; 2 -> 3; 3 -> {3, 4}; 4 -> 1; 5 returns.
        let mut gb = GraphBuilder::new();
        let b: std::vec::Vec<_> = (0..6).map(|_| gb.add_block()).collect();
        let branch = |a, b| Terminator::Branch {
            cond: c,
            if_true: a,
            if_false: b,
        };
        gb.terminate(b[0], Terminator::Jump { target: b[1] });
        gb.terminate(b[1], branch(b[2], b[5]));
        gb.terminate(b[2], Terminator::Jump { target: b[3] });
        gb.terminate(b[3], branch(b[3], b[4]));
        gb.terminate(b[4], Terminator::Jump { target: b[1] });
        gb.terminate(b[5], Terminator::Return { value: None });
        let g = gb.finish(&t).unwrap();

        let headers: std::vec::Vec<_> = b.iter().map(|&x| is_loop_header(&g, x)).collect();
        assert_eq!(headers, [false, true, false, true, false, false]);
    }
}
