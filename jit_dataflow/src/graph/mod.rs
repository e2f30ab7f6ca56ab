// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic-block control-flow graph over virtual registers.
//!
//! The graph is an arena: blocks are addressed by [`BlockId`] and refer to each other only by id,
//! so loops (cyclic predecessor/successor relations) need no shared ownership. A [`Graph`] can only
//! be produced by [`GraphBuilder::finish`], which validates it; the analyses rely on that.
//!
//! Operations are deliberately opaque: the analyses only care which registers an operation reads,
//! which it writes, and whether a write unbinds the name.

mod builder;
pub(crate) mod dump;

use core::fmt;
use core::slice;

use alloc::vec::Vec;

use crate::analysis::cfg;
use crate::vreg::{VReg, VRegTable};

pub use builder::GraphBuilder;
pub use dump::GraphDump;

/// Stable index of a block within its graph.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BlockId(u32);

impl BlockId {
    /// The function entry block.
    pub const ENTRY: Self = Self(0);

    /// Creates a block id from its raw index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the index into the block arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// A straight-line operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// `dst = <expr>(srcs...)`.
    Assign {
        /// Register bound by the operation.
        dst: VReg,
        /// Registers read by the expression, in evaluation order.
        srcs: Vec<VReg>,
    },
    /// Evaluates an expression over `srcs` for its effect.
    Eval {
        /// Registers read.
        srcs: Vec<VReg>,
    },
    /// Unbinds a name (`del x`). The name is read first (deleting an unbound name is itself an
    /// error), and is undefined afterwards.
    Delete {
        /// Register being unbound.
        vreg: VReg,
    },
}

impl Op {
    /// Registers read by this operation.
    #[inline]
    pub fn reads(&self) -> &[VReg] {
        match self {
            Self::Assign { srcs, .. } | Self::Eval { srcs } => srcs,
            Self::Delete { vreg } => slice::from_ref(vreg),
        }
    }

    /// Register whose previous value this operation ends, if any.
    #[inline]
    pub fn writes(&self) -> Option<VReg> {
        match self {
            Self::Assign { dst, .. } => Some(*dst),
            Self::Eval { .. } => None,
            Self::Delete { vreg } => Some(*vreg),
        }
    }

    /// Returns `true` if the write leaves the register unbound.
    #[inline]
    pub fn unbinds(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}

/// How control leaves a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Terminator {
    /// Unconditional transfer (including fall-through).
    Jump {
        /// Destination block.
        target: BlockId,
    },
    /// Two-way conditional transfer on `cond`.
    Branch {
        /// Condition register.
        cond: VReg,
        /// Destination when `cond` is truthy.
        if_true: BlockId,
        /// Destination otherwise.
        if_false: BlockId,
    },
    /// Function exit.
    Return {
        /// Returned register, if any.
        value: Option<VReg>,
    },
}

impl Terminator {
    /// Registers read by the terminator.
    #[inline]
    pub fn reads(&self) -> &[VReg] {
        match self {
            Self::Jump { .. } => &[],
            Self::Branch { cond, .. } => slice::from_ref(cond),
            Self::Return { value } => value.as_slice(),
        }
    }

    /// Control-flow targets in terminator order (may repeat).
    pub fn targets(&self) -> impl Iterator<Item = BlockId> + '_ {
        let (a, b) = match *self {
            Self::Jump { target } => (Some(target), None),
            Self::Branch {
                if_true, if_false, ..
            } => (Some(if_true), Some(if_false)),
            Self::Return { .. } => (None, None),
        };
        a.into_iter().chain(b)
    }
}

/// One basic block: operations, a terminator, and cached edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicBlock {
    id: BlockId,
    ops: Vec<Op>,
    terminator: Terminator,
    preds: Vec<BlockId>,
    succs: Vec<BlockId>,
}

impl BasicBlock {
    /// This block's id.
    #[inline]
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Straight-line operations, in execution order.
    #[inline]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// The terminator.
    #[inline]
    pub fn terminator(&self) -> &Terminator {
        &self.terminator
    }

    /// Predecessors, in ascending id order, without duplicates.
    #[inline]
    pub fn preds(&self) -> &[BlockId] {
        &self.preds
    }

    /// Successors, in terminator order, without duplicates.
    #[inline]
    pub fn succs(&self) -> &[BlockId] {
        &self.succs
    }
}

/// A function body (or OSR-compiled fragment) as a validated block arena.
///
/// Block [`BlockId::ENTRY`] is the entry and has no predecessors. Topology is fixed once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    blocks: Vec<BasicBlock>,
    num_vregs: usize,
}

impl Graph {
    /// Number of blocks.
    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`: a validated graph has an entry block.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Size of the register space the graph was validated against.
    #[inline]
    pub fn num_vregs(&self) -> usize {
        self.num_vregs
    }

    /// The entry block.
    #[inline]
    pub fn entry(&self) -> &BasicBlock {
        &self.blocks[0]
    }

    /// Returns the block `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a block of this graph.
    #[inline]
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        assert!(
            id.index() < self.blocks.len(),
            "{id} is not a block of this graph ({} blocks)",
            self.blocks.len()
        );
        &self.blocks[id.index()]
    }

    /// Returns the block `id`, or `None` if it is out of range.
    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    /// Blocks in id order (entry first).
    #[inline]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Returns `true` if `id` names a block of this graph.
    #[inline]
    pub fn contains(&self, id: BlockId) -> bool {
        id.index() < self.blocks.len()
    }

    /// Returns `true` if `block` is reachable from the entry and heads a loop, i.e. control can
    /// come back to it without first passing a block that strictly dominates it. Every block an
    /// irreducible loop can be entered at counts.
    pub fn has_back_edge_into(&self, block: BlockId) -> bool {
        cfg::is_loop_header(self, block)
    }

    /// Renders the graph as deterministic text, naming registers through `vregs`.
    pub fn dump<'a>(&'a self, vregs: &'a VRegTable) -> GraphDump<'a> {
        GraphDump::new(self, vregs)
    }
}
