// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtual registers and the per-function name table.
//!
//! Every symbolic name of a function (source-level names as well as compiler temporaries) gets a
//! dense `u32` id. Ids are assigned in interning order starting at zero, never reused, and stable
//! for the lifetime of the table, so analyses can index fixed-size bitsets with them.

use core::fmt;

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::error::VRegError;

/// A virtual register: a storage slot for one symbolic name within one function.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VReg(u32);

impl VReg {
    /// Creates a register from its raw id.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the id as a bitset index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// What kind of name a register stands for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VRegKind {
    /// A name that appears in the source program.
    UserVisible,
    /// A compiler temporary whose value flows between blocks (loop iterators, etc).
    CrossBlockTemp,
    /// A compiler temporary confined to a single block.
    BlockLocalTemp,
}

#[derive(Clone, Debug)]
struct Entry {
    name: Box<str>,
    kind: VRegKind,
}

/// Incrementally assigns register ids to names.
#[derive(Clone, Debug, Default)]
pub struct VRegTableBuilder {
    entries: Vec<Entry>,
    by_name: HashMap<Box<str>, VReg>,
}

impl VRegTableBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the register for `name`, assigning the next id on first use.
    ///
    /// Interning the same name again returns the same register. Asking for a different `kind`
    /// than the one recorded first is an error.
    pub fn intern(&mut self, name: &str, kind: VRegKind) -> Result<VReg, VRegError> {
        if let Some(&vreg) = self.by_name.get(name) {
            let existing = self.entries[vreg.index()].kind;
            if existing != kind {
                return Err(VRegError::KindMismatch {
                    name: name.into(),
                    existing,
                    requested: kind,
                });
            }
            return Ok(vreg);
        }

        let raw = u32::try_from(self.entries.len()).map_err(|_| VRegError::TooManyRegisters)?;
        let vreg = VReg::new(raw);
        self.entries.push(Entry {
            name: name.into(),
            kind,
        });
        self.by_name.insert(name.into(), vreg);
        Ok(vreg)
    }

    /// Freezes the table.
    #[must_use]
    pub fn finish(self) -> VRegTable {
        VRegTable {
            entries: self.entries,
            by_name: self.by_name,
        }
    }
}

/// Immutable bijection between a function's names and its registers.
///
/// Analyses borrow the table; none of them copy it.
#[derive(Clone, Debug)]
pub struct VRegTable {
    entries: Vec<Entry>,
    by_name: HashMap<Box<str>, VReg>,
}

impl VRegTable {
    /// Number of registers (one past the largest id).
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the function has no names at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the register of `name`.
    pub fn get(&self, name: &str) -> Option<VReg> {
        self.by_name.get(name).copied()
    }

    /// Returns the name of `vreg`, or `None` if it is out of range.
    pub fn name(&self, vreg: VReg) -> Option<&str> {
        self.entries.get(vreg.index()).map(|e| &*e.name)
    }

    /// Returns the kind of `vreg`, or `None` if it is out of range.
    pub fn kind(&self, vreg: VReg) -> Option<VRegKind> {
        self.entries.get(vreg.index()).map(|e| e.kind)
    }

    /// Returns `true` if `vreg` belongs to this table.
    #[inline]
    pub fn contains(&self, vreg: VReg) -> bool {
        vreg.index() < self.entries.len()
    }

    /// Iterates `(register, name, kind)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (VReg, &str, VRegKind)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (VReg::new(u32::try_from(i).unwrap_or(u32::MAX)), &*e.name, e.kind))
    }

    /// Counts registers of the given kind.
    pub fn count_of(&self, kind: VRegKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Returns a printable name for `vreg`, falling back to its raw id.
    pub(crate) fn display_name(&self, vreg: VReg) -> DisplayVReg<'_> {
        DisplayVReg { table: self, vreg }
    }
}

pub(crate) struct DisplayVReg<'a> {
    table: &'a VRegTable,
    vreg: VReg,
}

impl fmt::Display for DisplayVReg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table.name(self.vreg) {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.vreg),
        }
    }
}
