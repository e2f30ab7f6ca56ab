// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canonical lowered functions for the `jit_dataflow` conformance tests.
//!
//! Each fixture mirrors a small source function after lowering; the comment on each constructor
//! shows the source shape it stands for.

use jit_dataflow::{
    BlockId, Graph, GraphBuilder, Op, Terminator, VReg, VRegKind, VRegTable, VRegTableBuilder,
};

/// A lowered function: graph, register table and parameters.
#[derive(Clone, Debug)]
pub struct Fixture {
    /// Short name used in assertion messages.
    pub name: &'static str,
    /// The control-flow graph.
    pub graph: Graph,
    /// Its register table.
    pub vregs: VRegTable,
    /// Registers bound by the caller.
    pub params: Vec<VReg>,
}

impl Fixture {
    /// Register of `name`.
    ///
    /// # Panics
    ///
    /// Panics if the fixture has no such name.
    pub fn reg(&self, name: &str) -> VReg {
        self.vregs
            .get(name)
            .unwrap_or_else(|| panic!("{}: no register named {name}", self.name))
    }

    /// Block with raw index `index`.
    pub fn block(&self, index: u32) -> BlockId {
        let id = BlockId::new(index);
        assert!(self.graph.contains(id), "{}: no block {index}", self.name);
        id
    }
}

/// Names interned up front so ids are predictable in expected dumps.
struct Names(VRegTableBuilder);

impl Names {
    fn new(user: &[&str], temps: &[&str]) -> Self {
        let mut b = VRegTableBuilder::new();
        for n in user {
            b.intern(n, VRegKind::UserVisible).expect("fresh name");
        }
        for n in temps {
            b.intern(n, VRegKind::CrossBlockTemp).expect("fresh name");
        }
        Self(b)
    }

    fn finish(self) -> VRegTable {
        self.0.finish()
    }
}

fn assign(dst: VReg, srcs: &[VReg]) -> Op {
    Op::Assign {
        dst,
        srcs: srcs.to_vec(),
    }
}

fn build(name: &'static str, gb: GraphBuilder, vregs: VRegTable, params: &[&str]) -> Fixture {
    let graph = gb
        .finish(&vregs)
        .unwrap_or_else(|e| panic!("{name}: fixture graph is malformed: {e}"));
    let params = params
        .iter()
        .map(|p| vregs.get(p).expect("parameter is interned"))
        .collect();
    Fixture {
        name,
        graph,
        vregs,
        params,
    }
}

/// ```text
/// def f():
///     x = 1
///     print(x)
/// ```
pub fn straight_line() -> Fixture {
    let vregs = Names::new(&["x"], &[]).finish();
    let x = vregs.get("x").expect("interned");

    let mut gb = GraphBuilder::new();
    let b0 = gb.add_block();
    gb.push(b0, assign(x, &[]));
    gb.push(b0, Op::Eval { srcs: vec![x] });
    gb.terminate(b0, Terminator::Return { value: None });
    build("straight_line", gb, vregs, &[])
}

/// ```text
/// def f(c):
///     if c:
///         x = 1
///     return x
/// ```
pub fn diamond() -> Fixture {
    let vregs = Names::new(&["c", "x"], &[]).finish();
    let c = vregs.get("c").expect("interned");
    let x = vregs.get("x").expect("interned");

    let mut gb = GraphBuilder::new();
    let entry = gb.add_block();
    let then = gb.add_block();
    let els = gb.add_block();
    let join = gb.add_block();
    gb.terminate(
        entry,
        Terminator::Branch {
            cond: c,
            if_true: then,
            if_false: els,
        },
    );
    gb.push(then, assign(x, &[]));
    gb.terminate(then, Terminator::Jump { target: join });
    gb.terminate(els, Terminator::Jump { target: join });
    gb.terminate(join, Terminator::Return { value: Some(x) });
    build("diamond", gb, vregs, &["c"])
}

/// ```text
/// def f(n):
///     i = 0
///     while i < n:
///         i = i + 1
///     return i
/// ```
pub fn counted_loop() -> Fixture {
    let vregs = Names::new(&["n", "i"], &["#cond"]).finish();
    let n = vregs.get("n").expect("interned");
    let i = vregs.get("i").expect("interned");
    let cond = vregs.get("#cond").expect("interned");

    let mut gb = GraphBuilder::new();
    let entry = gb.add_block();
    let header = gb.add_block();
    let body = gb.add_block();
    let exit = gb.add_block();
    gb.push(entry, assign(i, &[]));
    gb.terminate(entry, Terminator::Jump { target: header });
    gb.push(header, assign(cond, &[i, n]));
    gb.terminate(
        header,
        Terminator::Branch {
            cond,
            if_true: body,
            if_false: exit,
        },
    );
    gb.push(body, assign(i, &[i]));
    gb.terminate(body, Terminator::Jump { target: header });
    gb.terminate(exit, Terminator::Return { value: Some(i) });
    build("counted_loop", gb, vregs, &["n"])
}

/// A `for` loop whose target is only bound inside the body, with a separate back-edge block.
///
/// ```text
/// def f(n):
///     for i in range(n):
///         pass
///     return i
/// ```
///
/// Blocks: `bb0` entry (creates the iterator), `bb1` header, `bb2` body, `bb3` back-edge jump,
/// `bb4` exit.
pub fn for_loop() -> Fixture {
    let vregs = Names::new(&["n", "i"], &["#iter", "#has_next"]).finish();
    let n = vregs.get("n").expect("interned");
    let i = vregs.get("i").expect("interned");
    let iter = vregs.get("#iter").expect("interned");
    let has_next = vregs.get("#has_next").expect("interned");

    let mut gb = GraphBuilder::new();
    let entry = gb.add_block();
    let header = gb.add_block();
    let body = gb.add_block();
    let backedge = gb.add_block();
    let exit = gb.add_block();
    gb.push(entry, assign(iter, &[n]));
    gb.terminate(entry, Terminator::Jump { target: header });
    gb.push(header, assign(has_next, &[iter]));
    gb.terminate(
        header,
        Terminator::Branch {
            cond: has_next,
            if_true: body,
            if_false: exit,
        },
    );
    gb.push(body, assign(i, &[iter]));
    gb.terminate(body, Terminator::Jump { target: backedge });
    gb.terminate(backedge, Terminator::Jump { target: header });
    gb.terminate(exit, Terminator::Return { value: Some(i) });
    build("for_loop", gb, vregs, &["n"])
}

/// ```text
/// def f(n, m):
///     total = 0
///     i = 0
///     while i < n:
///         j = 0
///         while j < m:
///             total = total + j
///             j = j + 1
///         i = i + 1
///     return total
/// ```
pub fn nested_loops() -> Fixture {
    let vregs = Names::new(&["n", "m", "total", "i", "j"], &["#c"]).finish();
    let [n, m, total, i, j, c] =
        ["n", "m", "total", "i", "j", "#c"].map(|s| vregs.get(s).expect("interned"));

    let mut gb = GraphBuilder::new();
    let entry = gb.add_block();
    let outer = gb.add_block();
    let outer_body = gb.add_block();
    let inner = gb.add_block();
    let inner_body = gb.add_block();
    let latch = gb.add_block();
    let exit = gb.add_block();

    gb.push(entry, assign(total, &[]));
    gb.push(entry, assign(i, &[]));
    gb.terminate(entry, Terminator::Jump { target: outer });

    gb.push(outer, assign(c, &[i, n]));
    gb.terminate(
        outer,
        Terminator::Branch {
            cond: c,
            if_true: outer_body,
            if_false: exit,
        },
    );

    gb.push(outer_body, assign(j, &[]));
    gb.terminate(outer_body, Terminator::Jump { target: inner });

    gb.push(inner, assign(c, &[j, m]));
    gb.terminate(
        inner,
        Terminator::Branch {
            cond: c,
            if_true: inner_body,
            if_false: latch,
        },
    );

    gb.push(inner_body, assign(total, &[total, j]));
    gb.push(inner_body, assign(j, &[j]));
    gb.terminate(inner_body, Terminator::Jump { target: inner });

    gb.push(latch, assign(i, &[i]));
    gb.terminate(latch, Terminator::Jump { target: outer });

    gb.terminate(exit, Terminator::Return { value: Some(total) });
    build("nested_loops", gb, vregs, &["n", "m"])
}

/// Two blocks that jump into each other, each enterable from the entry; no block dominates the
/// other. Only `a` assigns `x`; `b` reads it.
pub fn irreducible() -> Fixture {
    let vregs = Names::new(&["c", "x"], &[]).finish();
    let c = vregs.get("c").expect("interned");
    let x = vregs.get("x").expect("interned");

    let mut gb = GraphBuilder::new();
    let entry = gb.add_block();
    let a = gb.add_block();
    let b = gb.add_block();
    let exit = gb.add_block();
    gb.terminate(
        entry,
        Terminator::Branch {
            cond: c,
            if_true: a,
            if_false: b,
        },
    );
    gb.push(a, assign(x, &[]));
    gb.terminate(
        a,
        Terminator::Branch {
            cond: c,
            if_true: b,
            if_false: exit,
        },
    );
    gb.push(b, Op::Eval { srcs: vec![x] });
    gb.terminate(
        b,
        Terminator::Branch {
            cond: c,
            if_true: a,
            if_false: exit,
        },
    );
    gb.terminate(exit, Terminator::Return { value: None });
    build("irreducible", gb, vregs, &["c"])
}

/// ```text
/// def f(c):
///     x = 1
///     if c:
///         del x
///     return x
/// ```
pub fn conditional_delete() -> Fixture {
    let vregs = Names::new(&["c", "x"], &[]).finish();
    let c = vregs.get("c").expect("interned");
    let x = vregs.get("x").expect("interned");

    let mut gb = GraphBuilder::new();
    let entry = gb.add_block();
    let del = gb.add_block();
    let join = gb.add_block();
    gb.push(entry, assign(x, &[]));
    gb.terminate(
        entry,
        Terminator::Branch {
            cond: c,
            if_true: del,
            if_false: join,
        },
    );
    gb.push(del, Op::Delete { vreg: x });
    gb.terminate(del, Terminator::Jump { target: join });
    gb.terminate(join, Terminator::Return { value: Some(x) });
    build("conditional_delete", gb, vregs, &["c"])
}

/// ```text
/// def f(c):
///     while c:
///         x = 1
///         if c:
///             pass
///         else:
///             pass
///         print(x)
/// ```
///
/// `x` is rebound on every trip before it is read, so it is dead at the loop header.
pub fn loop_local() -> Fixture {
    let vregs = Names::new(&["c", "x"], &[]).finish();
    let c = vregs.get("c").expect("interned");
    let x = vregs.get("x").expect("interned");

    let mut gb = GraphBuilder::new();
    let entry = gb.add_block();
    let header = gb.add_block();
    let body = gb.add_block();
    let then = gb.add_block();
    let other = gb.add_block();
    let join = gb.add_block();
    let exit = gb.add_block();
    gb.terminate(entry, Terminator::Jump { target: header });
    gb.terminate(
        header,
        Terminator::Branch {
            cond: c,
            if_true: body,
            if_false: exit,
        },
    );
    gb.push(body, assign(x, &[]));
    gb.terminate(
        body,
        Terminator::Branch {
            cond: c,
            if_true: then,
            if_false: other,
        },
    );
    gb.terminate(then, Terminator::Jump { target: join });
    gb.terminate(other, Terminator::Jump { target: join });
    gb.push(join, Op::Eval { srcs: vec![x] });
    gb.terminate(join, Terminator::Jump { target: header });
    gb.terminate(exit, Terminator::Return { value: None });
    build("loop_local", gb, vregs, &["c"])
}

/// Every fixture, for tests that check invariants across all of them.
pub fn all() -> Vec<Fixture> {
    vec![
        straight_line(),
        diamond(),
        counted_loop(),
        for_loop(),
        nested_loops(),
        irreducible(),
        conditional_delete(),
        loop_local(),
    ]
}
