// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use jit_dataflow::{
    PhiConfig, compute_liveness, compute_required_phis, compute_required_phis_for_osr,
};
use jit_dataflow_wind_tunnel::{Workload, chain, diamond_ladder, loop_nest};

/// Entry point for `jit_dataflow` wind-tunnel benchmarks.
///
/// Scenarios isolate the three cost drivers of the analyses: block count (chains), merge count
/// (diamond ladders) and loop depth (nests, which need more passes to converge).
fn bench_analysis(c: &mut Criterion) {
    bench_chain_liveness(c);
    bench_ladder_phis(c);
    bench_loop_nest_liveness(c);
    bench_loop_nest_phis(c);
    bench_loop_nest_osr(c);
}

fn phis(w: &Workload) -> usize {
    let liveness = compute_liveness(&w.graph, &w.vregs);
    let phis = compute_required_phis(&w.graph, &liveness, &w.params, PhiConfig::default());
    w.graph
        .blocks()
        .iter()
        .map(|b| phis.required_for(b.id()).count())
        .sum()
}

/// Straight-line chain of `len` blocks over 32 registers.
///
/// Measures per-block liveness cost with no merges and a single backward pass.
fn bench_chain_liveness(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_liveness");
    for &len in &[10_usize, 100, 1_000] {
        let w = chain(len, 32);
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| black_box(compute_liveness(black_box(&w.graph), &w.vregs)));
        });
    }
    group.finish();
}

/// `rungs` diamonds in sequence; every join needs a phi.
///
/// Measures definedness, dominators and phi placement end to end.
fn bench_ladder_phis(c: &mut Criterion) {
    let mut group = c.benchmark_group("ladder_phis");
    for &rungs in &[10_usize, 100, 1_000] {
        let w = diamond_ladder(rungs);
        group.bench_with_input(BenchmarkId::from_parameter(rungs), &rungs, |b, _| {
            b.iter(|| black_box(phis(black_box(&w))));
        });
    }
    group.finish();
}

/// Nested loops of increasing depth over 16 accumulators.
///
/// Deeper nests take more passes to reach the liveness fixed point.
fn bench_loop_nest_liveness(c: &mut Criterion) {
    let mut group = c.benchmark_group("loop_nest_liveness");
    for &depth in &[1_usize, 4, 16] {
        let w = loop_nest(depth, 16);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| black_box(compute_liveness(black_box(&w.graph), &w.vregs)));
        });
    }
    group.finish();
}

fn bench_loop_nest_phis(c: &mut Criterion) {
    let mut group = c.benchmark_group("loop_nest_phis");
    for &depth in &[1_usize, 4, 16] {
        let w = loop_nest(depth, 16);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| black_box(phis(black_box(&w))));
        });
    }
    group.finish();
}

/// Same nests, analyzed with an OSR entry into the outermost header.
///
/// Liveness is computed once outside the loop; only the OSR-mode phi pass is timed.
fn bench_loop_nest_osr(c: &mut Criterion) {
    let mut group = c.benchmark_group("loop_nest_osr_phis");
    for &depth in &[1_usize, 4, 16] {
        let w = loop_nest(depth, 16);
        let Some(entry) = w.osr.clone() else {
            continue;
        };
        let liveness = compute_liveness(&w.graph, &w.vregs);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                black_box(compute_required_phis_for_osr(
                    black_box(&w.graph),
                    &liveness,
                    &w.params,
                    &entry,
                    PhiConfig::default(),
                ))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_analysis);
criterion_main!(benches);
