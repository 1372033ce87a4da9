// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! LSB embedding and extraction.
//!
//! A payload is serialized, Brotli-compressed, sealed with AES-256-GCM-SIV
//! and framed ([`frame`]). The frame bits are then written into the least
//! significant bits of one or more color planes, in an order drawn from a
//! PIN-keyed permutation ([`scatter`]). An optional decoy payload with its
//! own PIN lives in a separate plane ([`layer`]).
//!
//! Extraction ([`verify`]) tries the secret layer, then the decoy layer, and
//! answers with a glitch image ([`glitch`]) when neither verifies.

pub mod error;
pub mod capacity;
pub mod channel;
pub mod crypto;
pub mod frame;
pub mod glitch;
pub mod layer;
pub mod payload;
mod pipeline;
pub mod scatter;
pub mod verify;

pub use error::StegoError;

use crate::stego::frame::MIN_FRAME_BYTES;

/// Maximum pixel dimension (width or height) for encode.
pub const MAX_DIMENSION: u32 = 8192;

/// Maximum total pixel count for encode (width × height).
pub const MAX_PIXELS: u32 = 16_000_000;

/// Validate carrier dimensions for encoding.
///
/// # Errors
/// - [`StegoError::ImageTooLarge`] if either dimension > 8192px or total pixels > 16M.
/// - [`StegoError::ImageTooSmall`] if the lane cannot hold the smallest frame
///   ([`MIN_FRAME_BYTES`]) in the requested layer configuration.
pub fn validate_encode_dimensions(width: u32, height: u32, decoy_enabled: bool) -> Result<(), StegoError> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION || width.checked_mul(height).map_or(true, |p| p > MAX_PIXELS) {
        return Err(StegoError::ImageTooLarge);
    }
    if capacity::capacity(width, height, decoy_enabled) < MIN_FRAME_BYTES {
        return Err(StegoError::ImageTooSmall);
    }
    Ok(())
}

pub use capacity::{capacity, capacity_info, fits, required_bytes, CapacityInfo};
pub use layer::{Layer, LayerConfig};
pub use payload::{compressed_payload_size, Payload, PayloadKind};
pub use pipeline::{embed, embed_layer, embed_png, DecoyLayer};
pub use verify::{extract, extract_png, DecodeResult};
