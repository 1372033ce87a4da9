// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the raster container layer.

use thiserror::Error;

/// Errors that can occur while building, decoding or encoding a carrier image.
#[derive(Debug, Error)]
pub enum RasterError {
    /// Width or height is zero, or `width * height * 4` overflows `usize`.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// The RGBA buffer length does not match the declared dimensions.
    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    /// The input bytes are not a raster image in a supported container.
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    /// PNG serialization of the pixel buffer failed.
    #[error("could not encode PNG: {0}")]
    Encode(#[source] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RasterError>;
