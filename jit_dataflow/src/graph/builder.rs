// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec;
use alloc::vec::Vec;

use crate::error::GraphError;
use crate::graph::{BasicBlock, BlockId, Graph, Op, Terminator};
use crate::vreg::VRegTable;

#[derive(Clone, Debug, Default)]
struct PendingBlock {
    ops: Vec<Op>,
    terminator: Option<Terminator>,
}

/// Assembles a [`Graph`] block by block.
///
/// The first block added is the entry. Predecessor lists are derived from terminators in
/// [`finish`](Self::finish), so they can never disagree with successor lists.
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    blocks: Vec<PendingBlock>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new, empty block.
    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId::from_index(self.blocks.len());
        self.blocks.push(PendingBlock::default());
        id
    }

    /// Appends `op` to `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` was not returned by [`add_block`](Self::add_block).
    pub fn push(&mut self, block: BlockId, op: Op) -> &mut Self {
        self.pending(block).ops.push(op);
        self
    }

    /// Sets (or replaces) the terminator of `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` was not returned by [`add_block`](Self::add_block).
    pub fn terminate(&mut self, block: BlockId, terminator: Terminator) -> &mut Self {
        self.pending(block).terminator = Some(terminator);
        self
    }

    fn pending(&mut self, block: BlockId) -> &mut PendingBlock {
        let len = self.blocks.len();
        self.blocks
            .get_mut(block.index())
            .unwrap_or_else(|| panic!("{block} was not added to this builder ({len} blocks)"))
    }

    /// Validates the graph against `vregs` and freezes it.
    pub fn finish(self, vregs: &VRegTable) -> Result<Graph, GraphError> {
        let n = self.blocks.len();
        if n == 0 {
            return Err(GraphError::Empty);
        }
        if u32::try_from(n).is_err() {
            return Err(GraphError::TooManyBlocks);
        }

        let mut terminators: Vec<Terminator> = Vec::with_capacity(n);
        let mut all_ops: Vec<Vec<Op>> = Vec::with_capacity(n);
        for (i, b) in self.blocks.into_iter().enumerate() {
            let block = BlockId::from_index(i);
            let terminator = b
                .terminator
                .ok_or(GraphError::MissingTerminator { block })?;

            let regs = b
                .ops
                .iter()
                .flat_map(|op| op.reads().iter().copied().chain(op.writes()))
                .chain(terminator.reads().iter().copied());
            for vreg in regs {
                if !vregs.contains(vreg) {
                    return Err(GraphError::BadRegister {
                        block,
                        vreg,
                        count: vregs.len(),
                    });
                }
            }
            for target in terminator.targets() {
                if target.index() >= n {
                    return Err(GraphError::BadSuccessor { block, target });
                }
            }

            terminators.push(terminator);
            all_ops.push(b.ops);
        }

        let mut succs: Vec<Vec<BlockId>> = vec![Vec::new(); n];
        let mut preds: Vec<Vec<BlockId>> = vec![Vec::new(); n];
        for (i, term) in terminators.iter().enumerate() {
            let from = BlockId::from_index(i);
            for target in term.targets() {
                if !succs[i].contains(&target) {
                    succs[i].push(target);
                    preds[target.index()].push(from);
                }
            }
        }

        if let Some(&pred) = preds[0].first() {
            return Err(GraphError::EntryHasPredecessor { pred });
        }

        let blocks = all_ops
            .into_iter()
            .zip(terminators)
            .zip(succs.into_iter().zip(preds))
            .enumerate()
            .map(|(i, ((ops, terminator), (succs, preds)))| BasicBlock {
                id: BlockId::from_index(i),
                ops,
                terminator,
                preds,
                succs,
            })
            .collect();

        Ok(Graph {
            blocks,
            num_vregs: vregs.len(),
        })
    }
}
