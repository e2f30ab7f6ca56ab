// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parameterized graph shapes for the `jit_dataflow` benchmarks.
//!
//! Each generator returns a [`Workload`] whose size grows with its parameters, so criterion
//! groups can show how the analyses scale with blocks, registers and loop depth.

use jit_dataflow::{
    BlockId, Graph, GraphBuilder, Op, OsrArg, OsrEntryDescriptor, Terminator, VReg, VRegKind,
    VRegTable, VRegTableBuilder,
};

/// A generated function.
#[derive(Clone, Debug)]
pub struct Workload {
    /// The control-flow graph.
    pub graph: Graph,
    /// Its register table.
    pub vregs: VRegTable,
    /// Registers bound by the caller.
    pub params: Vec<VReg>,
    /// An OSR entry into the outermost loop, if the shape has one.
    pub osr: Option<OsrEntryDescriptor>,
}

fn intern(b: &mut VRegTableBuilder, name: &str) -> VReg {
    b.intern(name, VRegKind::UserVisible)
        .unwrap_or_else(|e| panic!("generator interned {name} twice: {e}"))
}

fn finish(gb: GraphBuilder, vregs: VRegTable, params: Vec<VReg>) -> Workload {
    let graph = gb
        .finish(&vregs)
        .unwrap_or_else(|e| panic!("generator produced a malformed graph: {e}"));
    Workload {
        graph,
        vregs,
        params,
        osr: None,
    }
}

/// `len` blocks in a straight line, each assigning `regs` registers from the previous block's.
///
/// No merges: measures the fixed cost of liveness and definedness per block.
pub fn chain(len: usize, regs: usize) -> Workload {
    let mut names = VRegTableBuilder::new();
    let vs: Vec<VReg> = (0..regs.max(1))
        .map(|k| intern(&mut names, &format!("r{k}")))
        .collect();
    let vregs = names.finish();

    let mut gb = GraphBuilder::new();
    let blocks: Vec<BlockId> = (0..len.max(1)).map(|_| gb.add_block()).collect();
    for (i, &b) in blocks.iter().enumerate() {
        for (k, &v) in vs.iter().enumerate() {
            let src = vs[(k + 1) % vs.len()];
            gb.push(b, Op::Assign { dst: v, srcs: vec![src] });
        }
        let term = match blocks.get(i + 1) {
            Some(&next) => Terminator::Jump { target: next },
            None => Terminator::Return {
                value: vs.first().copied(),
            },
        };
        gb.terminate(b, term);
    }
    finish(gb, vregs, vs)
}

/// A chain of `rungs` diamonds; every rung conditionally reassigns `x` and reads it at its join.
///
/// Every join is a merge with a live, multiply-defined register.
pub fn diamond_ladder(rungs: usize) -> Workload {
    let mut names = VRegTableBuilder::new();
    let c = intern(&mut names, "c");
    let x = intern(&mut names, "x");
    let vregs = names.finish();

    let mut gb = GraphBuilder::new();
    let mut prev = gb.add_block();
    gb.push(prev, Op::Assign { dst: x, srcs: vec![] });
    for _ in 0..rungs {
        let then = gb.add_block();
        let join = gb.add_block();
        gb.terminate(
            prev,
            Terminator::Branch {
                cond: c,
                if_true: then,
                if_false: join,
            },
        );
        gb.push(then, Op::Assign { dst: x, srcs: vec![x] });
        gb.terminate(then, Terminator::Jump { target: join });
        gb.push(join, Op::Eval { srcs: vec![x] });
        prev = join;
    }
    gb.terminate(prev, Terminator::Return { value: Some(x) });
    finish(gb, vregs, vec![c])
}

/// `depth` nested loops around a body that updates `width` accumulators.
///
/// Loop depth drives the number of liveness and definedness passes before the fixed point. The
/// workload carries an OSR entry into the outermost header that supplies every accumulator.
pub fn loop_nest(depth: usize, width: usize) -> Workload {
    let mut names = VRegTableBuilder::new();
    let c = intern(&mut names, "c");
    let accs: Vec<VReg> = (0..width.max(1))
        .map(|k| intern(&mut names, &format!("acc{k}")))
        .collect();
    let vregs = names.finish();

    let mut gb = GraphBuilder::new();
    let entry = gb.add_block();
    for &a in &accs {
        gb.push(entry, Op::Assign { dst: a, srcs: vec![] });
    }

    // Headers are listed outermost first; each header's exit edge goes to the enclosing latch.
    let headers: Vec<BlockId> = (0..depth).map(|_| gb.add_block()).collect();
    let body = gb.add_block();
    gb.terminate(
        entry,
        Terminator::Jump {
            target: headers.first().copied().unwrap_or(body),
        },
    );
    for w in accs.windows(2) {
        gb.push(
            body,
            Op::Assign {
                dst: w[0],
                srcs: vec![w[0], w[1]],
            },
        );
    }
    if let Some(&last) = accs.last() {
        gb.push(
            body,
            Op::Assign {
                dst: last,
                srcs: vec![last],
            },
        );
    }

    let exit = gb.add_block();
    let mut inner_exit = body;
    for (level, &header) in headers.iter().enumerate().rev() {
        gb.terminate(inner_exit, Terminator::Jump { target: header });
        let after = if level == 0 { exit } else { gb.add_block() };
        let next_inner = headers.get(level + 1).copied().unwrap_or(body);
        gb.terminate(
            header,
            Terminator::Branch {
                cond: c,
                if_true: next_inner,
                if_false: after,
            },
        );
        inner_exit = after;
    }
    if depth == 0 {
        gb.terminate(body, Terminator::Jump { target: exit });
    }
    gb.terminate(
        exit,
        Terminator::Return {
            value: accs.first().copied(),
        },
    );

    let mut w = finish(gb, vregs, vec![c]);
    if let Some(&outer) = headers.first() {
        let mut d = OsrEntryDescriptor::new(outer);
        d.supply(c, OsrArg::Defined);
        for &a in &accs {
            d.supply(a, OsrArg::Defined);
        }
        w.osr = Some(d);
    }
    w
}
