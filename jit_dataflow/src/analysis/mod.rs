// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dataflow analyses over a [`Graph`](crate::Graph).
//!
//! Data flows one way: liveness first, then phi analysis, which runs definedness internally and
//! borrows the liveness result for the duration of the call.

pub mod bitset;
pub(crate) mod cfg;
pub(crate) mod dataflow;
pub mod definedness;
pub mod dominators;
pub mod liveness;
pub mod phi;
