// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Raw RGBA carrier buffers and the raster container boundary.
//!
//! All embedding works on a [`CarrierImage`]: an owned RGBA8 buffer with
//! validated dimensions. Container formats only appear at the edges:
//! [`CarrierImage::from_bytes`] decodes an uploaded PNG/JPEG/BMP/GIF into
//! RGBA8, and [`CarrierImage::to_png`] serializes the result losslessly.
//! Lossy containers are never written, since recompression would destroy
//! the low-order bits the payload lives in.

pub mod error;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use error::{RasterError, Result};

/// Bytes per pixel in the RGBA buffer.
pub const CHANNELS: usize = 4;

/// Byte offset of the alpha channel within a pixel. Never written by the engine.
pub const ALPHA_OFFSET: usize = 3;

/// A color channel whose low-order bits form one addressable bit plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelPlane {
    Red,
    Green,
    Blue,
}

impl ChannelPlane {
    /// All embeddable planes in buffer order.
    pub const ALL: [ChannelPlane; 3] = [ChannelPlane::Red, ChannelPlane::Green, ChannelPlane::Blue];

    /// Byte offset of this channel within an RGBA pixel.
    pub const fn offset(self) -> usize {
        match self {
            ChannelPlane::Red => 0,
            ChannelPlane::Green => 1,
            ChannelPlane::Blue => 2,
        }
    }
}

/// An RGBA8 pixel buffer with its dimensions.
///
/// Invariant: `pixels.len() == width * height * 4`, and both dimensions are
/// non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl CarrierImage {
    /// Wrap an existing RGBA8 buffer.
    ///
    /// # Errors
    /// - [`RasterError::InvalidDimensions`] if a dimension is zero or the
    ///   buffer size would overflow.
    /// - [`RasterError::BufferMismatch`] if `pixels.len() != width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = expected_len(width, height)?;
        if pixels.len() != expected {
            return Err(RasterError::BufferMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    /// Decode a raster container (PNG, JPEG, BMP, GIF) into an RGBA8 carrier.
    ///
    /// Images without an alpha channel get an opaque one.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).map_err(RasterError::Decode)?;
        let rgba = decoded.into_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }

    /// Serialize the buffer as an RGBA PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&self.pixels, self.width, self.height, ExtendedColorType::Rgba8)
            .map_err(RasterError::Encode)?;
        Ok(out)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels (`width * height`), i.e. the bit length of one plane.
    pub fn pixel_count(&self) -> usize {
        self.pixels.len() / CHANNELS
    }

    /// The raw RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Consume the image and return its RGBA buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Render the low-order bit of one channel as a black/white noise map.
    ///
    /// A set bit becomes a white pixel, a clear bit a black one. Embedded
    /// regions show up as uniform static, untouched photo regions keep some
    /// structure.
    pub fn bit_plane_map(&self, plane: ChannelPlane) -> CarrierImage {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for px in self.pixels.chunks_exact(CHANNELS) {
            let v = (px[plane.offset()] & 1) * 255;
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
        CarrierImage {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

fn expected_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|p| p.checked_mul(CHANNELS))
        .ok_or(RasterError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> CarrierImage {
        let mut pixels = Vec::with_capacity((width * height) as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, (x ^ y) as u8, 200]);
            }
        }
        CarrierImage::from_rgba(width, height, pixels).unwrap()
    }

    #[test]
    fn buffer_length_checked() {
        assert!(CarrierImage::from_rgba(2, 2, vec![0; 16]).is_ok());
        match CarrierImage::from_rgba(2, 2, vec![0; 15]) {
            Err(RasterError::BufferMismatch { expected: 16, actual: 15, .. }) => {}
            other => panic!("expected BufferMismatch, got {other:?}"),
        }
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(matches!(
            CarrierImage::from_rgba(0, 5, vec![]),
            Err(RasterError::InvalidDimensions { width: 0, height: 5 })
        ));
    }

    #[test]
    fn png_roundtrip_is_lossless() {
        let img = gradient(17, 9);
        let png = img.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let back = CarrierImage::from_bytes(&png).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn garbage_bytes_rejected() {
        assert!(matches!(
            CarrierImage::from_bytes(b"definitely not an image"),
            Err(RasterError::Decode(_))
        ));
    }

    #[test]
    fn bit_plane_map_reflects_lsb() {
        let img = CarrierImage::from_rgba(2, 1, vec![0, 0, 1, 255, 0, 0, 2, 255]).unwrap();
        let map = img.bit_plane_map(ChannelPlane::Blue);
        assert_eq!(map.pixels(), &[255, 255, 255, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn plane_offsets_skip_alpha() {
        for plane in ChannelPlane::ALL {
            assert_ne!(plane.offset(), ALPHA_OFFSET);
        }
    }
}
