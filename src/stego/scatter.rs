// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! PIN-keyed scatter order over the bits of a lane.
//!
//! Produces a lazy Fisher-Yates permutation of `0..plane_bits` from a ChaCha20
//! PRNG seeded with the layer's scatter seed. Encoder and decoder walk the
//! same sequence, so the payload lands on unpredictable positions while
//! remaining exactly reconstructable from the PIN alone.
//!
//! # Algorithm (frame version 1)
//!
//! Forward Fisher-Yates over the virtual identity array `a`: step `i` draws
//! `j = gen_range(i..n)` as `u32`, yields `a[j]` and sets `a[j] = a[i]`.
//! Only displaced slots are stored, so taking `m` indices costs `O(m)` time
//! and memory regardless of `n`. Taking all `n` indices is a bijection.
//!
//! # Cross-platform portability
//!
//! The draw uses `u32`, never `usize`: `gen_range` consumes a different amount
//! of PRNG output per call for 32-bit and 64-bit ranges, which would give
//! wasm32 and x86_64 different sequences for the same seed.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// 32-byte seed derived from the PIN and the layer's domain constant.
pub type ScatterSeed = [u8; 32];

/// Lazy iterator over a seeded permutation of `0..plane_bits`.
pub struct ScatterSequence {
    rng: ChaCha20Rng,
    len: u32,
    next: u32,
    displaced: HashMap<u32, u32>,
}

impl ScatterSequence {
    pub fn new(seed: &ScatterSeed, plane_bits: u32) -> Self {
        Self {
            rng: ChaCha20Rng::from_seed(*seed),
            len: plane_bits,
            next: 0,
            displaced: HashMap::new(),
        }
    }

    /// Size of the index range being permuted.
    pub fn plane_bits(&self) -> u32 {
        self.len
    }

    #[inline]
    fn slot(&self, k: u32) -> u32 {
        self.displaced.get(&k).copied().unwrap_or(k)
    }
}

impl Iterator for ScatterSequence {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.next >= self.len {
            return None;
        }
        let i = self.next;
        let j = self.rng.gen_range(i..self.len);
        let picked = self.slot(j);
        if j != i {
            let head = self.slot(i);
            self.displaced.insert(j, head);
        }
        // Slot i is never read again.
        self.displaced.remove(&i);
        self.next += 1;
        Some(picked)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.len - self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ScatterSequence {}

/// Collect the first `count` indices of the sequence for `seed`.
///
/// Returns fewer than `count` indices when `count > plane_bits`.
pub fn sequence(seed: &ScatterSeed, plane_bits: u32, count: usize) -> Vec<u32> {
    ScatterSequence::new(seed, plane_bits).take(count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn deterministic() {
        let a = sequence(&[42u8; 32], 5000, 700);
        let b = sequence(&[42u8; 32], 5000, 700);
        assert_eq!(a, b);
    }

    #[test]
    fn full_sequence_is_bijection() {
        let n = 1000u32;
        let mut all = sequence(&[7u8; 32], n, n as usize);
        assert_eq!(all.len(), n as usize);
        all.sort_unstable();
        let expected: Vec<u32> = (0..n).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn prefix_is_distinct() {
        let idx = sequence(&[3u8; 32], 10_000, 2_500);
        let unique: HashSet<_> = idx.iter().copied().collect();
        assert_eq!(unique.len(), idx.len());
        assert!(idx.iter().all(|&i| i < 10_000));
    }

    #[test]
    fn prefix_matches_longer_run() {
        let short = sequence(&[9u8; 32], 4096, 100);
        let long = sequence(&[9u8; 32], 4096, 1000);
        assert_eq!(&long[..100], &short[..]);
    }

    #[test]
    fn different_seeds_differ() {
        let a = sequence(&[1u8; 32], 4096, 64);
        let b = sequence(&[2u8; 32], 4096, 64);
        assert_ne!(a, b);
    }

    #[test]
    fn not_sequential() {
        let idx = sequence(&[5u8; 32], 4096, 64);
        let identity: Vec<u32> = (0..64).collect();
        assert_ne!(idx, identity);
    }

    #[test]
    fn exhausts_at_plane_size() {
        let mut seq = ScatterSequence::new(&[0u8; 32], 3);
        assert_eq!(seq.len(), 3);
        assert!(seq.next().is_some());
        assert!(seq.next().is_some());
        assert!(seq.next().is_some());
        assert_eq!(seq.next(), None);
        assert_eq!(seq.len(), 0);
    }

    #[test]
    fn empty_plane_yields_nothing() {
        assert!(sequence(&[0u8; 32], 0, 10).is_empty());
    }

    #[test]
    fn displaced_map_stays_bounded() {
        let mut seq = ScatterSequence::new(&[11u8; 32], 1_000_000);
        for _ in 0..500 {
            seq.next();
        }
        assert!(seq.displaced.len() <= 500);
    }
}
