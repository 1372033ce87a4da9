// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Capacity planning.
//!
//! Capacities are frame budgets in bytes: how many frame bytes fit into the
//! lane a layer writes to. Without a decoy the secret lane spans the red,
//! green and blue planes (`floor(W*H*3/8)`); with a decoy each layer owns a
//! single plane, one third of that (`floor(W*H/8)`).
//!
//! Every check here runs before key derivation or any pixel write, so an
//! oversized payload is rejected without touching the carrier.

use crate::stego::error::StegoError;
use crate::stego::frame::{framed_len, MIN_FRAME_BYTES};
use crate::stego::payload::{self, Payload};

/// Frame budget in bytes for a `width` x `height` carrier.
pub fn capacity(width: u32, height: u32, decoy_enabled: bool) -> usize {
    let pixels = width as u64 * height as u64;
    let solo = usize::try_from(pixels * 3 / 8).unwrap_or(usize::MAX);
    if decoy_enabled {
        solo / 3
    } else {
        solo
    }
}

/// Exact framed length of `payload` (compression included, salt and nonce
/// do not change it).
pub fn required_bytes(payload: &Payload) -> Result<usize, StegoError> {
    Ok(framed_len(payload::encode_body(payload)?.len()))
}

/// Fail-fast capacity check.
pub fn fits(required: usize, capacity: usize) -> bool {
    required <= capacity
}

/// Frame budgets for both layer configurations, plus the longest text each
/// could hold without any help from compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityInfo {
    /// Budget of the secret layer when no decoy is embedded.
    pub solo_bytes: usize,
    /// Budget of each layer when a decoy is embedded.
    pub paired_bytes: usize,
    /// Longest uncompressed text for the solo budget.
    pub solo_max_text: usize,
    /// Longest uncompressed text for the paired budget.
    pub paired_max_text: usize,
}

pub fn capacity_info(width: u32, height: u32) -> CapacityInfo {
    let solo_bytes = capacity(width, height, false);
    let paired_bytes = capacity(width, height, true);
    CapacityInfo {
        solo_bytes,
        paired_bytes,
        solo_max_text: solo_bytes.saturating_sub(MIN_FRAME_BYTES),
        paired_max_text: paired_bytes.saturating_sub(MIN_FRAME_BYTES),
    }
}
