// Copyright 2026 the JIT Dataflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-size bitset over register ids.

use core::fmt;

use alloc::vec;
use alloc::vec::Vec;

use crate::vreg::VReg;

const WORD_BITS: usize = 64;

/// A fixed-capacity set of small integers, stored as 64-bit words.
///
/// All binary operations require both operands to have the same capacity.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    words: Vec<u64>,
    len: usize,
}

impl BitSet {
    /// Creates an empty set able to hold `0..len`.
    #[must_use]
    pub fn new_empty(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Capacity of the set (not the number of members).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.len
    }

    #[inline]
    fn check(&self, i: usize) {
        assert!(i < self.len, "bit {i} out of range for set of {}", self.len);
    }

    /// Returns `true` if `i` is a member.
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        self.check(i);
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 != 0
    }

    /// Adds `i`.
    #[inline]
    pub fn set(&mut self, i: usize) {
        self.check(i);
        self.words[i / WORD_BITS] |= 1 << (i % WORD_BITS);
    }

    /// Removes `i`.
    #[inline]
    pub fn clear(&mut self, i: usize) {
        self.check(i);
        self.words[i / WORD_BITS] &= !(1 << (i % WORD_BITS));
    }

    /// Returns `true` if `vreg` is a member.
    #[inline]
    pub fn contains(&self, vreg: VReg) -> bool {
        self.get(vreg.index())
    }

    /// `self = self ∪ other`. Returns `true` if `self` changed.
    pub fn union_with(&mut self, other: &Self) -> bool {
        debug_assert_eq!(self.len, other.len, "bitset capacity mismatch");
        let mut changed = false;
        for (a, &b) in self.words.iter_mut().zip(&other.words) {
            let next = *a | b;
            changed |= next != *a;
            *a = next;
        }
        changed
    }

    /// `self = self ∩ other`.
    pub fn intersect_with(&mut self, other: &Self) {
        debug_assert_eq!(self.len, other.len, "bitset capacity mismatch");
        for (a, &b) in self.words.iter_mut().zip(&other.words) {
            *a &= b;
        }
    }

    /// `self = self − other`.
    pub fn subtract_with(&mut self, other: &Self) {
        debug_assert_eq!(self.len, other.len, "bitset capacity mismatch");
        for (a, &b) in self.words.iter_mut().zip(&other.words) {
            *a &= !b;
        }
    }

    /// Returns `true` if every member of `self` is in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        debug_assert_eq!(self.len, other.len, "bitset capacity mismatch");
        self.words
            .iter()
            .zip(&other.words)
            .all(|(&a, &b)| a & !b == 0)
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of members.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut w = word;
            core::iter::from_fn(move || {
                if w == 0 {
                    return None;
                }
                let bit = w.trailing_zeros() as usize;
                w &= w - 1;
                Some(wi * WORD_BITS + bit)
            })
        })
    }

    /// Members as registers, in ascending id order.
    pub fn vregs(&self) -> impl Iterator<Item = VReg> + '_ {
        self.iter()
            .map(|i| VReg::new(u32::try_from(i).unwrap_or(u32::MAX)))
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
