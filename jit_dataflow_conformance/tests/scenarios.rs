// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Behavioral scenarios over the canonical fixtures, in natural and OSR mode.

use jit_dataflow::{
    BlockId, DefinitionLevel, DominatorTree, LivenessResult, OsrArg, OsrEntryDescriptor,
    OsrError, PhiConfig, PhiResult, compute_liveness, compute_required_phis,
    compute_required_phis_for_osr,
};
use jit_dataflow_conformance::{self as fixtures, Fixture};
use pretty_assertions::assert_eq;

fn analyze(f: &Fixture) -> (LivenessResult, PhiResult) {
    let liveness = compute_liveness(&f.graph, &f.vregs);
    let phis = compute_required_phis(&f.graph, &liveness, &f.params, PhiConfig::default());
    (liveness, phis)
}

fn analyze_osr(f: &Fixture, entry: &OsrEntryDescriptor) -> PhiResult {
    let liveness = compute_liveness(&f.graph, &f.vregs);
    compute_required_phis_for_osr(
        &f.graph,
        &liveness,
        &f.params,
        entry,
        PhiConfig::default(),
    )
}

#[test]
fn straight_line_has_nothing_to_merge() {
    let f = fixtures::straight_line();
    let x = f.reg("x");
    let b0 = BlockId::ENTRY;
    let (liveness, phis) = analyze(&f);

    assert!(!liveness.is_live_at_start(x, b0));
    assert!(!phis.is_required(x, b0));
    assert!(!phis.is_potentially_undefined_after(x, b0));
    // Nothing has bound `x` yet when the block starts.
    assert_eq!(
        phis.definedness().level_at_start(x, b0),
        Some(DefinitionLevel::Undefined)
    );
    assert_eq!(
        phis.definedness().level_at_end(x, b0),
        Some(DefinitionLevel::Defined)
    );
    assert!(!phis.is_osr());
}

#[test]
fn diamond_merge_needs_phi_and_guard() {
    let f = fixtures::diamond();
    let x = f.reg("x");
    let c = f.reg("c");
    let join = f.block(3);
    let (liveness, phis) = analyze(&f);

    assert!(liveness.is_live_at_start(x, join));
    assert!(phis.is_required(x, join));
    assert!(phis.is_potentially_undefined_at(x, join));
    assert!(!phis.is_required(c, join), "c is not live at the join");
    assert_eq!(
        phis.definedness().level_at_start(x, join),
        Some(DefinitionLevel::PotentiallyDefined)
    );

    // Both arms jump to the join, so both feed its phi.
    assert!(phis.is_required_after(x, f.block(1)));
    assert!(phis.is_required_after(x, f.block(2)));
    assert!(phis.required_after(BlockId::ENTRY).is_empty());
}

#[test]
fn counted_loop_only_merges_at_header() {
    let f = fixtures::counted_loop();
    let i = f.reg("i");
    let n = f.reg("n");
    let header = f.block(1);
    let (_, phis) = analyze(&f);

    assert!(phis.is_required(i, header));
    assert!(!phis.is_required(n, header), "parameters dominate the loop");
    for b in [0, 2, 3] {
        assert!(phis.required_for(f.block(b)).is_empty(), "bb{b}");
    }
    for b in [1, 2, 3] {
        assert!(!phis.is_potentially_undefined_at(i, f.block(b)), "bb{b}");
    }
}

#[test]
fn for_loop_target_is_ambiguous_in_natural_mode() {
    let f = fixtures::for_loop();
    let i = f.reg("i");
    let iter = f.reg("#iter");
    let header = f.block(1);
    let exit = f.block(4);
    let (_, phis) = analyze(&f);

    assert!(phis.is_required(i, header));
    assert!(phis.is_potentially_undefined_at(i, header));
    assert!(phis.is_potentially_undefined_at(i, exit));
    assert!(!phis.is_required(iter, header));
    assert!(!phis.is_potentially_undefined_at(iter, header));
    assert!(phis.is_required_after(i, f.block(3)), "back edge feeds the header");

    assert!(f.graph.has_back_edge_into(header));
    assert!(!f.graph.has_back_edge_into(f.block(2)));
}

#[test]
fn osr_defined_arg_pins_definedness() {
    let f = fixtures::for_loop();
    let i = f.reg("i");
    let iter = f.reg("#iter");
    let header = f.block(1);
    let (_, natural) = analyze(&f);

    let mut entry = OsrEntryDescriptor::new(header);
    entry.supply(i, OsrArg::Defined);
    let osr = analyze_osr(&f, &entry);

    assert!(osr.is_osr());
    assert_eq!(osr.osr_target(), Some(header));
    assert!(osr.is_required(i, header));
    assert!(!osr.is_potentially_undefined_at(i, header));
    assert!(!osr.is_potentially_undefined_at(i, f.block(4)));
    assert_eq!(
        osr.definedness().level_at_start(i, header),
        Some(DefinitionLevel::Defined)
    );

    // `#iter` is not supplied: everything about it matches natural mode.
    for b in 0..5 {
        let b = f.block(b);
        assert_eq!(osr.is_required(iter, b), natural.is_required(iter, b));
        assert_eq!(
            osr.is_potentially_undefined_at(iter, b),
            natural.is_potentially_undefined_at(iter, b)
        );
    }
}

#[test]
fn osr_maybe_undefined_arg_keeps_guard() {
    let f = fixtures::for_loop();
    let i = f.reg("i");
    let header = f.block(1);

    let mut entry = OsrEntryDescriptor::new(header);
    entry.supply(i, OsrArg::MaybeUndefined);
    let osr = analyze_osr(&f, &entry);

    assert!(osr.is_required(i, header));
    assert!(osr.is_potentially_undefined_at(i, header));
    assert_eq!(
        osr.definedness().level_at_start(i, header),
        Some(DefinitionLevel::PotentiallyDefined)
    );
}

#[test]
fn osr_supplied_value_always_gets_a_phi() {
    let f = fixtures::for_loop();
    let iter = f.reg("#iter");
    let header = f.block(1);

    let mut entry = OsrEntryDescriptor::new(header);
    entry.supply(iter, OsrArg::Defined);
    let osr = analyze_osr(&f, &entry);

    // The frame's value and the entry block's value both reach the header.
    assert!(osr.is_required(iter, header));
    assert!(!osr.is_potentially_undefined_at(iter, header));
}

#[test]
fn osr_descriptor_must_target_a_loop_header() {
    let f = fixtures::for_loop();
    let body = f.block(2);
    let entry = OsrEntryDescriptor::new(body);
    assert_eq!(
        entry.validate(&f.graph),
        Err(OsrError::NotLoopHeader { target: body })
    );

    let missing = OsrEntryDescriptor::new(BlockId::new(42));
    assert_eq!(
        missing.validate(&f.graph),
        Err(OsrError::BadTarget {
            target: BlockId::new(42)
        })
    );
}

#[test]
#[should_panic(expected = "invalid osr entry descriptor")]
fn osr_analysis_rejects_invalid_descriptor() {
    let f = fixtures::diamond();
    let entry = OsrEntryDescriptor::new(f.block(3));
    let _ = analyze_osr(&f, &entry);
}

#[test]
fn nested_loops_merge_each_header() {
    let f = fixtures::nested_loops();
    let [n, m, total, i, j] = ["n", "m", "total", "i", "j"].map(|s| f.reg(s));
    let outer = f.block(1);
    let inner = f.block(3);
    let (liveness, phis) = analyze(&f);

    assert!(phis.is_required(total, outer));
    assert!(phis.is_required(i, outer));
    assert!(!phis.is_required(n, outer));
    assert!(!phis.is_required(m, outer));
    // `j` may be unbound at the outer header, but nothing there reads it.
    assert!(phis.definedness().is_potentially_undefined_at_start(j, outer));
    assert!(!liveness.is_live_at_start(j, outer));
    assert!(!phis.is_required(j, outer));

    assert!(phis.is_required(total, inner));
    assert!(phis.is_required(j, inner));
    assert!(!phis.is_potentially_undefined_at(j, inner));
    assert!(!phis.is_required(m, inner));

    let mut entry = OsrEntryDescriptor::new(inner);
    entry
        .supply(total, OsrArg::Defined)
        .supply(i, OsrArg::Defined)
        .supply(j, OsrArg::Defined);
    assert_eq!(entry.validate(&f.graph), Ok(()));
    let osr = analyze_osr(&f, &entry);
    assert!(osr.is_required(total, inner));
    assert!(osr.is_required(j, inner));
    assert!(!osr.is_required(m, inner), "m is not supplied");
}

#[test]
fn irreducible_loop_has_no_dominating_definition() {
    let f = fixtures::irreducible();
    let x = f.reg("x");
    let c = f.reg("c");
    let a = f.block(1);
    let b = f.block(2);
    let (liveness, phis) = analyze(&f);

    let dom = DominatorTree::new(&f.graph);
    assert_eq!(dom.idom(a), Some(BlockId::ENTRY));
    assert_eq!(dom.idom(b), Some(BlockId::ENTRY));
    assert!(!dom.dominates(a, b));

    assert!(liveness.is_live_at_start(x, b));
    assert!(phis.is_required(x, b));
    assert!(phis.is_potentially_undefined_at(x, b));
    assert!(!phis.is_required(c, b));
    assert!(phis.required_for(a).is_empty());
}

#[test]
fn both_irreducible_entries_accept_osr() {
    let f = fixtures::irreducible();
    let x = f.reg("x");
    for target in [f.block(1), f.block(2)] {
        assert!(f.graph.has_back_edge_into(target), "{target}");
        let mut entry = OsrEntryDescriptor::new(target);
        entry.supply(x, OsrArg::MaybeUndefined);
        assert_eq!(entry.validate(&f.graph), Ok(()), "{target}");
        let osr = analyze_osr(&f, &entry);
        assert_eq!(osr.osr_target(), Some(target));
    }
    assert!(!f.graph.has_back_edge_into(f.block(3)));
}

#[test]
fn osr_args_dead_at_target_add_no_phis() {
    let f = fixtures::loop_local();
    let x = f.reg("x");
    let c = f.reg("c");
    let header = f.block(1);
    let join = f.block(5);
    let (liveness, natural) = analyze(&f);

    assert!(!liveness.is_live_at_start(x, header));
    assert!(liveness.is_live_at_start(x, join));
    // The body's definition dominates the join.
    assert!(!natural.is_required(x, join));

    let mut entry = OsrEntryDescriptor::new(header);
    entry.supply(x, OsrArg::Defined).supply(c, OsrArg::Defined);
    let osr = analyze_osr(&f, &entry);
    assert!(osr.is_required(c, header), "c is live at the header");
    for b in 0..7 {
        let b = f.block(b);
        assert!(!osr.is_required(x, b), "{b}");
    }
    // Definedness still honors the descriptor.
    assert!(!osr.is_potentially_undefined_at(x, header));
}

#[test]
fn conditional_delete_leaves_name_maybe_unbound() {
    let f = fixtures::conditional_delete();
    let x = f.reg("x");
    let del = f.block(1);
    let join = f.block(2);
    let (liveness, phis) = analyze(&f);

    assert!(liveness.is_live_at_start(x, del), "del reads its operand");
    assert!(liveness.is_last_use(&f.graph, x, del, 0));
    assert_eq!(
        phis.definedness().level_at_end(x, del),
        Some(DefinitionLevel::Undefined)
    );
    assert!(phis.is_required(x, join));
    assert!(phis.is_potentially_undefined_at(x, join));
}

#[test]
fn conservative_config_keeps_dominated_candidates() {
    let f = fixtures::for_loop();
    let iter = f.reg("#iter");
    let header = f.block(1);
    let liveness = compute_liveness(&f.graph, &f.vregs);
    let conservative = compute_required_phis(
        &f.graph,
        &liveness,
        &f.params,
        PhiConfig {
            skip_dominated_single_def: false,
        },
    );
    assert!(conservative.is_required(iter, header));

    let (_, default) = analyze(&f);
    for b in 0..5 {
        let b = f.block(b);
        assert!(
            default.required_for(b).is_subset(conservative.required_for(b)),
            "{b}"
        );
    }
}

#[test]
fn instruction_level_liveness() {
    let f = fixtures::counted_loop();
    let i = f.reg("i");
    let n = f.reg("n");
    let cond = f.reg("#cond");
    let header = f.block(1);
    let body = f.block(2);
    let (liveness, _) = analyze(&f);

    let before_cond = liveness.live_before(&f.graph, header, 0);
    assert!(before_cond.contains(i) && before_cond.contains(n));
    assert!(!before_cond.contains(cond));
    let before_branch = liveness.live_before(&f.graph, header, 1);
    assert!(before_branch.contains(cond));

    // The branch reads `#cond` for the last time.
    assert!(liveness.is_last_use(&f.graph, cond, header, 1));
    assert!(!liveness.is_last_use(&f.graph, i, header, 0));
    // `i = op(i)` consumes the old value.
    assert!(liveness.is_last_use(&f.graph, i, body, 0));
    assert!(!liveness.is_last_use(&f.graph, n, body, 0), "not read there");
}
