// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small reusable dataflow solvers.
//!
//! Liveness runs backward and definedness runs forward; both are worklist fixpoints over the same
//! block arena. This module owns the iteration mechanics so each analysis only states its lattice
//! (`meet_into`) and its per-block transfer.
//!
//! Notes:
//!
//! - Correctness assumes the usual dataflow conditions: the `meet_into` and `transfer_block`
//!   functions are monotone over a finite-height lattice, so iteration reaches a fixpoint.
//! - Iteration order only affects speed. Callers pass a seed order (postorder for backward
//!   problems) so most blocks converge on their first visit.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

use crate::graph::Graph;

/// Per-block fixpoint states plus how many block visits it took to get there.
#[derive(Clone, Debug)]
pub(crate) struct Fixpoint<State> {
    /// State at block entry.
    pub(crate) in_states: Vec<State>,
    /// State at block exit.
    pub(crate) out_states: Vec<State>,
    /// Number of transfer-function applications.
    pub(crate) visits: usize,
}

/// Computes a forward dataflow fixpoint.
///
/// The analysis is defined by:
/// - `roots`: blocks where control can enter the graph, each with its incoming state (the
///   function entry, plus an OSR target when there is one)
/// - `bottom`: initial state for all other blocks
/// - `meet_into`: in-place meet operation: `acc = meet(acc, incoming)`
/// - `adjust_in`: applied to a block's IN after every meet; used to pin facts at a root that
///   override what the natural predecessors bring
/// - `transfer_block`: transfer function for a single basic block
///
/// Blocks marked unreachable in `reachable` are ignored and left as `bottom`.
pub(crate) fn solve_forward<State, MeetInto, AdjustIn, TransferBlock>(
    graph: &Graph,
    reachable: &[bool],
    roots: Vec<(usize, State)>,
    bottom: State,
    mut meet_into: MeetInto,
    mut adjust_in: AdjustIn,
    mut transfer_block: TransferBlock,
) -> Fixpoint<State>
where
    State: Clone + PartialEq,
    MeetInto: FnMut(&mut State, &State),
    AdjustIn: FnMut(usize, &mut State),
    TransferBlock: FnMut(usize, &State) -> State,
{
    // Convention: `in_states[b]` is the fixpoint state at block entry, and `out_states[b]` is the
    // fixpoint state at block exit (after applying the block transfer).
    let n = graph.len();
    let mut in_states: Vec<State> = (0..n).map(|_| bottom.clone()).collect();
    let mut out_states: Vec<State> = (0..n).map(|_| bottom.clone()).collect();
    let mut visits = 0;

    let mut work: VecDeque<usize> = VecDeque::new();

    for (b_idx, seed) in roots {
        if !reachable.get(b_idx).copied().unwrap_or(false) {
            continue;
        }
        meet_into(&mut in_states[b_idx], &seed);
        adjust_in(b_idx, &mut in_states[b_idx]);
        out_states[b_idx] = transfer_block(b_idx, &in_states[b_idx]);
        visits += 1;
        work.push_back(b_idx);
    }

    while let Some(b_idx) = work.pop_front() {
        // Re-propagate this block's OUT to its successors.
        let out = out_states[b_idx].clone();
        for succ in graph.blocks()[b_idx].succs() {
            let succ = succ.index();
            if !reachable.get(succ).copied().unwrap_or(false) {
                continue;
            }

            // IN_succ = meet(IN_succ, OUT_pred) for each predecessor.
            let mut new_in = in_states[succ].clone();
            meet_into(&mut new_in, &out);
            adjust_in(succ, &mut new_in);
            if new_in != in_states[succ] {
                in_states[succ] = new_in;

                // OUT_succ is derived purely from IN_succ via the per-block transfer.
                let new_out = transfer_block(succ, &in_states[succ]);
                visits += 1;
                if new_out != out_states[succ] {
                    out_states[succ] = new_out;
                    work.push_back(succ);
                }
            }
        }
    }

    Fixpoint {
        in_states,
        out_states,
        visits,
    }
}

/// Computes a backward dataflow fixpoint.
///
/// The analysis is defined by:
/// - `order`: initial worklist order (every block that should be solved, usually postorder)
/// - `bottom`: initial state for all blocks (usually "empty")
/// - `meet_into`: in-place meet operation used when combining successor IN states into OUT:
///   `acc = meet(acc, succ_in)`
/// - `transfer_block`: transfer function for a single basic block computing IN from OUT
///
/// The meet over an empty successor set is `bottom`. Blocks missing from `order` are left as
/// `bottom` and do not contribute to their predecessors.
pub(crate) fn solve_backward<State, MeetInto, TransferBlock>(
    graph: &Graph,
    order: &[usize],
    bottom: State,
    mut meet_into: MeetInto,
    mut transfer_block: TransferBlock,
) -> Fixpoint<State>
where
    State: Clone + PartialEq,
    MeetInto: FnMut(&mut State, &State),
    TransferBlock: FnMut(usize, &State) -> State,
{
    let n = graph.len();
    let mut in_states: Vec<State> = (0..n).map(|_| bottom.clone()).collect();
    let mut out_states: Vec<State> = (0..n).map(|_| bottom.clone()).collect();
    let mut visits = 0;

    let mut solved = vec![false; n];
    let mut queued = vec![false; n];
    let mut work: VecDeque<usize> = VecDeque::with_capacity(order.len());
    for &b in order {
        if !solved[b] {
            solved[b] = true;
            queued[b] = true;
            work.push_back(b);
        }
    }

    while let Some(b_idx) = work.pop_front() {
        queued[b_idx] = false;

        // OUT[b] = meet over IN[succ].
        let mut new_out = bottom.clone();
        for succ in graph.blocks()[b_idx].succs() {
            if solved[succ.index()] {
                meet_into(&mut new_out, &in_states[succ.index()]);
            }
        }

        // IN[b] = transfer(b, OUT[b]).
        let mut changed = false;
        if new_out != out_states[b_idx] {
            out_states[b_idx] = new_out;
            changed = true;
        }
        let new_in = transfer_block(b_idx, &out_states[b_idx]);
        visits += 1;
        if new_in != in_states[b_idx] {
            in_states[b_idx] = new_in;
            changed = true;
        }

        if changed {
            // Any predecessor's OUT may have changed; revisit preds.
            for p in graph.blocks()[b_idx].preds() {
                let p = p.index();
                if solved[p] && !queued[p] {
                    queued[p] = true;
                    work.push_back(p);
                }
            }
        }
    }

    Fixpoint {
        in_states,
        out_states,
        visits,
    }
}
