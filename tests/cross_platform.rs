// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Cross-platform determinism tests.
//!
//! Three derivations decide where bits live and what a wrong PIN looks like:
//!
//! 1. **Scatter order**: `ScatterSequence` must yield identical indices on
//!    64-bit and 32-bit `usize`. It draws with `u32` `gen_range()` so the
//!    ChaCha20 stream is consumed identically on both.
//! 2. **Tier-1 scatter seeds**: Argon2id over the PIN with the fixed per-layer
//!    salts. A change in cost parameters or salts moves every bit.
//! 3. **Glitch seed**: SHA-256 over the domain tag and residue.
//!
//! If any pinned value changes, carriers written by one build no longer read
//! back in another.

use mirage_core::stego::crypto::derive_scatter_seed;
use mirage_core::stego::glitch::glitch_seed;
use mirage_core::stego::scatter::{sequence, ScatterSequence};
use mirage_core::Layer;

/// Pinned from the u32 forward Fisher-Yates over ChaCha20 on 2026-10-18.
#[test]
fn pin_scatter_seed42_10000() {
    let got: Vec<u32> = ScatterSequence::new(&[42u8; 32], 10_000).take(20).collect();
    let expected = vec![
        2739, 5907, 1084, 8294, 4611, 5511, 9355, 4084, 7350, 8128, 112, 1202, 1998, 7750, 165, 7426, 4480, 8140,
        8756, 5648,
    ];
    assert_eq!(got, expected);
    assert_eq!(sequence(&[42u8; 32], 10_000, 20), expected);
}

#[test]
fn pin_secret_scatter_seed() {
    let seed = derive_scatter_seed("1234", Layer::Secret).unwrap();
    let expected: [u8; 32] = [
        41, 234, 127, 43, 16, 166, 138, 190, 188, 95, 30, 66, 202, 244, 201, 89, 250, 78, 207, 181, 242, 212, 32, 124,
        59, 190, 212, 234, 167, 209, 38, 208,
    ];
    assert_eq!(*seed, expected);
}

#[test]
fn pin_decoy_scatter_seed() {
    let seed = derive_scatter_seed("1234", Layer::Decoy).unwrap();
    let expected: [u8; 32] = [
        208, 23, 138, 232, 81, 47, 54, 69, 190, 128, 189, 138, 153, 159, 37, 235, 205, 169, 50, 33, 207, 37, 148, 122,
        106, 228, 13, 47, 115, 121, 41, 158,
    ];
    assert_eq!(*seed, expected);
}

#[test]
fn pin_glitch_seed_empty_residue() {
    let expected: [u8; 32] = [
        156, 225, 129, 95, 230, 116, 109, 103, 226, 186, 155, 165, 219, 194, 82, 172, 149, 61, 0, 149, 139, 173, 118,
        91, 125, 163, 68, 195, 96, 114, 184, 230,
    ];
    assert_eq!(glitch_seed(b""), expected);
}
