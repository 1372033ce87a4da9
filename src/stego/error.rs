// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the steganography pipeline.
//!
//! [`StegoError`] covers all failure modes from container decoding through
//! framing, encryption and re-encoding. Frame rejection during extraction
//! never reaches the caller as an error: it is folded into the glitch result.

use thiserror::Error;

use crate::raster::error::RasterError;

/// Errors that can occur during steganographic embedding or extraction.
#[derive(Debug, Error)]
pub enum StegoError {
    /// The carrier could not be decoded as a raster image, or its buffer is malformed.
    #[error("invalid carrier image: {0}")]
    InvalidImage(#[source] RasterError),
    /// The carrier cannot hold even the smallest possible frame.
    #[error("image too small for embedding")]
    ImageTooSmall,
    /// The image dimensions exceed the maximum allowed (8192px / 16MP).
    #[error("image too large (max 8192px / 16MP)")]
    ImageTooLarge,
    /// A caller-supplied argument is unusable (empty PIN, bad filename, ...).
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The framed payload exceeds the channel-plane budget.
    #[error("payload needs {required} bytes but the image holds {available}")]
    MessageTooLarge { required: usize, available: usize },
    /// The frame failed verification: wrong PIN, wrong layer, or corrupted bits.
    #[error("payload frame rejected")]
    FrameCorrupted,
    /// Argon2 rejected its parameters.
    #[error("key derivation failed")]
    KeyDerivation,
    /// AES-GCM-SIV refused to seal the payload.
    #[error("payload encryption failed")]
    Encryption,
    /// The output image could not be serialized.
    #[error("output encoding failed: {0}")]
    OutputEncoding(#[source] RasterError),
}
