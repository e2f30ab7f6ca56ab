// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! On-stack-replacement entry descriptors.
//!
//! When the baseline tier decides a loop is hot, it captures its frame and asks for code that
//! resumes at the loop header. The descriptor records what that frame can hand over: for each
//! register it supplies, whether the value is known to be bound. The analyses treat the descriptor
//! as one extra predecessor edge of the target block, scoped to a single analysis run; the graph
//! itself is never edited.

use alloc::collections::BTreeMap;

use crate::analysis::bitset::BitSet;
use crate::analysis::cfg::{self, Dfs};
use crate::error::OsrError;
use crate::graph::{BlockId, Graph};
use crate::vreg::VReg;

/// What the OSR frame supplies for one register.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OsrArg {
    /// A concrete value is supplied and the name is known to be bound.
    Defined,
    /// A slot is supplied but the name may be unbound in the captured frame.
    MaybeUndefined,
}

/// State the interpreter supplies when jumping into the middle of a function.
///
/// Registers without an entry are not supplied by this edge; for them the target's natural
/// predecessors alone decide definedness and phis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OsrEntryDescriptor {
    target: BlockId,
    args: BTreeMap<VReg, OsrArg>,
}

impl OsrEntryDescriptor {
    /// Creates a descriptor resuming at `target` that supplies nothing yet.
    #[must_use]
    pub fn new(target: BlockId) -> Self {
        Self {
            target,
            args: BTreeMap::new(),
        }
    }

    /// Declares what is supplied for `vreg`, replacing any earlier declaration.
    pub fn supply(&mut self, vreg: VReg, arg: OsrArg) -> &mut Self {
        self.args.insert(vreg, arg);
        self
    }

    /// The loop header where execution resumes.
    #[inline]
    pub fn target(&self) -> BlockId {
        self.target
    }

    /// What is supplied for `vreg`, if anything.
    pub fn arg(&self, vreg: VReg) -> Option<OsrArg> {
        self.args.get(&vreg).copied()
    }

    /// Supplied registers in id order.
    pub fn args(&self) -> impl Iterator<Item = (VReg, OsrArg)> + '_ {
        self.args.iter().map(|(&v, &a)| (v, a))
    }

    /// Number of supplied registers.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns `true` if nothing is supplied.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Checks the descriptor against `graph`.
    ///
    /// The target must exist, be reachable from the entry, and head a loop (have a back-edge
    /// predecessor); every supplied register must belong to the graph's register space.
    pub fn validate(&self, graph: &Graph) -> Result<(), OsrError> {
        if !graph.contains(self.target) {
            return Err(OsrError::BadTarget {
                target: self.target,
            });
        }
        if let Some((&vreg, _)) = self
            .args
            .iter()
            .find(|(v, _)| v.index() >= graph.num_vregs())
        {
            return Err(OsrError::BadRegister {
                vreg,
                count: graph.num_vregs(),
            });
        }
        let dfs = Dfs::new(graph, &[BlockId::ENTRY]);
        if !dfs.reachable[self.target.index()] {
            return Err(OsrError::UnreachableTarget {
                target: self.target,
            });
        }
        if !cfg::is_loop_header(graph, self.target) {
            return Err(OsrError::NotLoopHeader {
                target: self.target,
            });
        }
        Ok(())
    }

    /// Registers supplied by the edge, whatever their definedness.
    pub(crate) fn supplied_set(&self, num_vregs: usize) -> BitSet {
        let mut s = BitSet::new_empty(num_vregs);
        for &v in self.args.keys() {
            s.set(v.index());
        }
        s
    }

    /// Registers declared bound at the target.
    pub(crate) fn defined_set(&self, num_vregs: usize) -> BitSet {
        self.set_of(num_vregs, OsrArg::Defined)
    }

    /// Registers supplied but possibly unbound.
    pub(crate) fn maybe_undefined_set(&self, num_vregs: usize) -> BitSet {
        self.set_of(num_vregs, OsrArg::MaybeUndefined)
    }

    fn set_of(&self, num_vregs: usize, want: OsrArg) -> BitSet {
        let mut s = BitSet::new_empty(num_vregs);
        for (&v, &a) in &self.args {
            if a == want {
                s.set(v.index());
            }
        }
        s
    }
}
