// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction errors.
//!
//! These are the checks the lowering and OSR-trigger stages run before handing data to the
//! analyses. The analyses themselves assume validated input and treat violations as fatal.

use alloc::boxed::Box;

use crate::graph::BlockId;
use crate::vreg::{VReg, VRegKind};

/// Virtual-register table construction errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VRegError {
    /// A name was interned twice with different kinds.
    #[error("name `{name}` already interned as {existing:?}, requested {requested:?}")]
    KindMismatch {
        /// The name being interned.
        name: Box<str>,
        /// Kind recorded on first interning.
        existing: VRegKind,
        /// Kind requested by the conflicting call.
        requested: VRegKind,
    },
    /// The table would exceed the `u32` id space.
    #[error("too many virtual registers")]
    TooManyRegisters,
}

/// Graph validation errors reported by [`GraphBuilder::finish`](crate::GraphBuilder::finish).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The graph has no blocks; there is no entry.
    #[error("graph has no blocks")]
    Empty,
    /// A block was never given a terminator.
    #[error("block {block} has no terminator")]
    MissingTerminator {
        /// Offending block.
        block: BlockId,
    },
    /// A terminator names a block that does not exist.
    #[error("block {block} jumps to nonexistent block {target}")]
    BadSuccessor {
        /// Block whose terminator is malformed.
        block: BlockId,
        /// The dangling target.
        target: BlockId,
    },
    /// An operation or terminator references a register outside the table.
    #[error("block {block} references {vreg} but the table has {count} registers")]
    BadRegister {
        /// Block containing the reference.
        block: BlockId,
        /// The out-of-range register.
        vreg: VReg,
        /// Number of registers in the table.
        count: usize,
    },
    /// The entry block is the target of some edge.
    #[error("entry block has predecessor {pred}")]
    EntryHasPredecessor {
        /// One offending predecessor.
        pred: BlockId,
    },
    /// The graph would exceed the `u32` block id space.
    #[error("too many blocks")]
    TooManyBlocks,
}

/// OSR entry descriptor validation errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OsrError {
    /// The target block is not part of the graph.
    #[error("osr target {target} is not in the graph")]
    BadTarget {
        /// Offending target.
        target: BlockId,
    },
    /// The target block cannot be reached from the function entry.
    #[error("osr target {target} is unreachable")]
    UnreachableTarget {
        /// Offending target.
        target: BlockId,
    },
    /// The target block is not a loop header.
    #[error("osr target {target} has no back-edge predecessor")]
    NotLoopHeader {
        /// Offending target.
        target: BlockId,
    },
    /// A described register is outside the table.
    #[error("osr entry describes {vreg} but the table has {count} registers")]
    BadRegister {
        /// The out-of-range register.
        vreg: VReg,
        /// Number of registers in the table.
        count: usize,
    },
}
