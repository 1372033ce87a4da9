// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Single-bit LSB access to one channel of one pixel.
//!
//! Both functions index the RGBA buffer directly; callers derive
//! `pixel_index` from a lane, which never exceeds the pixel count.

use crate::raster::{ChannelPlane, CHANNELS};

#[inline]
fn byte_index(pixel_index: usize, plane: ChannelPlane) -> usize {
    pixel_index * CHANNELS + plane.offset()
}

/// Replace the low-order bit of the selected channel byte with `bit & 1`.
///
/// The other seven bits of that byte, and every other byte, are unchanged.
#[inline]
pub fn write_bit(pixels: &mut [u8], pixel_index: usize, plane: ChannelPlane, bit: u8) {
    let idx = byte_index(pixel_index, plane);
    pixels[idx] = (pixels[idx] & 0xFE) | (bit & 1);
}

/// Return the low-order bit of the selected channel byte.
#[inline]
pub fn read_bit(pixels: &[u8], pixel_index: usize, plane: ChannelPlane) -> u8 {
    pixels[byte_index(pixel_index, plane)] & 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_touches_only_target_lsb() {
        let mut px = vec![0b1010_1010u8; 8];
        write_bit(&mut px, 1, ChannelPlane::Blue, 1);
        assert_eq!(px[6], 0b1010_1011);
        for (i, &b) in px.iter().enumerate() {
            if i != 6 {
                assert_eq!(b, 0b1010_1010, "byte {i} changed");
            }
        }

        write_bit(&mut px, 1, ChannelPlane::Blue, 0);
        assert_eq!(px[6], 0b1010_1010);
    }

    #[test]
    fn read_returns_lsb() {
        let px = [0xFF, 0xFE, 0x01, 0x00];
        assert_eq!(read_bit(&px, 0, ChannelPlane::Red), 1);
        assert_eq!(read_bit(&px, 0, ChannelPlane::Green), 0);
        assert_eq!(read_bit(&px, 0, ChannelPlane::Blue), 1);
    }

    #[test]
    fn alpha_never_written() {
        let mut px = vec![0x80u8; 4 * 16];
        for i in 0..16 {
            for plane in ChannelPlane::ALL {
                write_bit(&mut px, i, plane, 1);
            }
        }
        for i in 0..16 {
            assert_eq!(px[i * 4 + 3], 0x80);
        }
    }

    #[test]
    fn non_binary_bit_masked() {
        let mut px = vec![0u8; 4];
        write_bit(&mut px, 0, ChannelPlane::Red, 0b10);
        assert_eq!(px[0], 0);
    }
}
