// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dataflow core for a JIT compiler of a dynamic language.
//!
//! Given a function lowered into a [`Graph`] of basic blocks over virtual registers, this crate
//! computes:
//!
//! - **liveness** of every register at every block boundary ([`LivenessResult`]),
//! - **definedness**: whether a register may be unbound on some path reaching a point
//!   ([`DefinednessResult`]), because the source language lets a conditionally assigned name be
//!   read and only fails at run time if the unassigned path is actually taken,
//! - **phi requirements** at control-flow merges ([`PhiResult`]), optionally with an
//!   on-stack-replacement entry ([`OsrEntryDescriptor`]) acting as an extra predecessor of a loop
//!   header.
//!
//! The analyses are structural: they never look at values, and they over-approximate where a
//! precise answer would need value equality.
//!
//! ## Pipeline
//!
//! ```
//! use jit_dataflow::{
//!     GraphBuilder, Op, PhiConfig, Terminator, VRegKind, VRegTableBuilder, compute_liveness,
//!     compute_required_phis,
//! };
//!
//! let mut vregs = VRegTableBuilder::new();
//! let x = vregs.intern("x", VRegKind::UserVisible).unwrap();
//! let c = vregs.intern("c", VRegKind::UserVisible).unwrap();
//! let vregs = vregs.finish();
//!
//! // entry -> (a, b) -> join; only `a` assigns `x`.
//! let mut gb = GraphBuilder::new();
//! let entry = gb.add_block();
//! let a = gb.add_block();
//! let b = gb.add_block();
//! let join = gb.add_block();
//! gb.terminate(entry, Terminator::Branch { cond: c, if_true: a, if_false: b });
//! gb.push(a, Op::Assign { dst: x, srcs: vec![] });
//! gb.terminate(a, Terminator::Jump { target: join });
//! gb.terminate(b, Terminator::Jump { target: join });
//! gb.terminate(join, Terminator::Return { value: Some(x) });
//! let graph = gb.finish(&vregs).unwrap();
//!
//! let liveness = compute_liveness(&graph, &vregs);
//! let phis = compute_required_phis(&graph, &liveness, &[c], PhiConfig::default());
//!
//! assert!(liveness.is_live_at_start(x, join));
//! assert!(phis.is_required(x, join));
//! assert!(phis.is_potentially_undefined_at(x, join));
//! ```
//!
//! ## Concurrency
//!
//! Every analysis is a synchronous, single-threaded fixed point over borrowed, immutable inputs.
//! Results own their bitsets and are `Send + Sync`, so independent functions can be analyzed on
//! separate threads without coordination.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod analysis;
mod error;
pub mod graph;
pub mod osr;
pub mod report;
pub mod vreg;

pub use analysis::bitset::BitSet;
pub use analysis::definedness::{DefinednessResult, DefinitionLevel, compute_definedness};
pub use analysis::dominators::DominatorTree;
pub use analysis::liveness::{LivenessResult, compute_liveness};
pub use analysis::phi::{
    PhiConfig, PhiResult, compute_required_phis, compute_required_phis_for_osr,
};
pub use error::{GraphError, OsrError, VRegError};
pub use graph::{BasicBlock, BlockId, Graph, GraphBuilder, Op, Terminator};
pub use osr::{OsrArg, OsrEntryDescriptor};
pub use report::AnalysisReport;
pub use vreg::{VReg, VRegKind, VRegTable, VRegTableBuilder};
