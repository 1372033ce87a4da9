// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Glitch rendering for failed extractions.
//!
//! When no layer verifies, the caller gets a corrupted copy of the carrier
//! instead of an error. The corruption is driven by a ChaCha20 stream seeded
//! with `SHA-256("mirage-glitch-v1" || residue)`, where the residue is the
//! header bytes the failed attempts read out of the carrier. Same carrier and
//! same PIN always give the same image; a wrong PIN, a damaged payload and a
//! plain photo all look alike.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use crate::raster::{CarrierImage, ChannelPlane, CHANNELS};
use crate::stego::error::StegoError;

/// Probability that a row is sheared; also scales the other effects.
pub const GLITCH_INTENSITY: f64 = 0.8;

/// Largest horizontal row shift in pixels (either direction).
const MAX_ROW_SHIFT: i64 = 50;

/// Edge length of an inverted block in pixels.
const BLOCK_SIZE: usize = 50;

const GLITCH_DOMAIN: &[u8] = b"mirage-glitch-v1";

/// Seed for the glitch PRNG.
pub fn glitch_seed(residue: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(GLITCH_DOMAIN);
    hasher.update(residue);
    hasher.finalize().into()
}

/// Produce the glitched copy of `carrier`. Alpha is carried over unchanged.
pub fn glitch_image(carrier: &CarrierImage, residue: &[u8]) -> CarrierImage {
    let mut rng = ChaCha20Rng::from_seed(glitch_seed(residue));
    let width = carrier.width() as usize;
    let height = carrier.height() as usize;
    let row_len = width * CHANNELS;

    let mut out = carrier.clone();
    let pixels = out.pixels_mut();
    let mut scratch = vec![0u8; row_len];

    for line in pixels.chunks_exact_mut(row_len) {
        if rng.gen_bool(GLITCH_INTENSITY) {
            let shift = rng.gen_range(-MAX_ROW_SHIFT..=MAX_ROW_SHIFT);
            shift_row(line, &mut scratch, shift);
        }
        // Channel static: one color channel of the row replaced by noise.
        if rng.gen_bool(GLITCH_INTENSITY / 4.0) {
            let plane = ChannelPlane::ALL[rng.gen_range(0..ChannelPlane::ALL.len())];
            for px in line.chunks_exact_mut(CHANNELS) {
                px[plane.offset()] = rng.gen();
            }
        }
    }

    let blocks = (10.0 * GLITCH_INTENSITY) as usize;
    for _ in 0..blocks {
        let x0 = rng.gen_range(0..=width.saturating_sub(BLOCK_SIZE));
        let y0 = rng.gen_range(0..=height.saturating_sub(BLOCK_SIZE));
        for y in y0..(y0 + BLOCK_SIZE).min(height) {
            for x in x0..(x0 + BLOCK_SIZE).min(width) {
                let base = (y * width + x) * CHANNELS;
                for plane in ChannelPlane::ALL {
                    pixels[base + plane.offset()] = 255 - pixels[base + plane.offset()];
                }
            }
        }
    }

    out
}

/// Move every pixel of `line` by `shift` columns: pixel `x` takes the color of
/// pixel `x + shift`. Pixels whose source falls outside the row keep theirs.
fn shift_row(line: &mut [u8], scratch: &mut [u8], shift: i64) {
    scratch.copy_from_slice(line);
    let width = (line.len() / CHANNELS) as i64;
    for x in 0..width {
        let src = x + shift;
        if !(0..width).contains(&src) {
            continue;
        }
        let (dst, src) = (x as usize * CHANNELS, src as usize * CHANNELS);
        // RGB only.
        line[dst..dst + 3].copy_from_slice(&scratch[src..src + 3]);
    }
}

/// Render the glitch image as PNG bytes.
pub fn render(carrier: &CarrierImage, residue: &[u8]) -> Result<Vec<u8>, StegoError> {
    glitch_image(carrier, residue)
        .to_png()
        .map_err(StegoError::OutputEncoding)
}
