// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Payload frame construction and parsing.
//!
//! The frame is the binary container that wraps the encrypted payload before
//! it is scattered into a lane. Secret and decoy layers use the same format:
//!
//! ```text
//! [2 bytes ] magic "MR"
//! [1 byte  ] frame version
//! [4 bytes ] sealed body length L (big-endian u32)
//! [16 bytes] Argon2 salt (for Tier-2 key derivation)
//! [12 bytes] AES-GCM-SIV nonce
//! [L+16    ] ciphertext + auth tag (AAD = magic, version, L)
//! [4 bytes ] CRC-32 of everything above
//! ```
//!
//! Total frame size = 55 + L bytes. The auth tag is the integrity check that
//! matters; the CRC only lets a reader drop random bits before paying for
//! Tier-2 key derivation.

use crate::stego::crypto::{self, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::stego::error::StegoError;
use crate::stego::payload::{self, Payload, BODY_OVERHEAD};

/// Frame magic bytes.
pub const MAGIC: [u8; 2] = *b"MR";

/// Current frame version. Bumped whenever KDF, PRNG or layout change.
pub const FRAME_VERSION: u8 = 1;

/// Bytes before the ciphertext: magic(2) + version(1) + length(4) + salt(16) + nonce(12).
pub const HEADER_LEN: usize = 2 + 1 + 4 + SALT_LEN + NONCE_LEN; // 35

/// Fixed overhead: header(35) + tag(16) + crc(4) = 55 bytes.
pub const FRAME_OVERHEAD: usize = HEADER_LEN + TAG_LEN + 4; // 55

/// Size of the smallest possible frame (an empty text message).
pub const MIN_FRAME_BYTES: usize = FRAME_OVERHEAD + BODY_OVERHEAD; // 58

/// Frame length for a sealed body of `body_len` bytes.
pub const fn framed_len(body_len: usize) -> usize {
    FRAME_OVERHEAD + body_len
}

fn associated_data(body_len: u32) -> [u8; 7] {
    let len = body_len.to_be_bytes();
    [MAGIC[0], MAGIC[1], FRAME_VERSION, len[0], len[1], len[2], len[3]]
}

/// Unauthenticated frame header, parsed from the first [`HEADER_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// Sealed body (plaintext) length in bytes.
    pub body_len: u32,
    /// Argon2 salt for Tier-2 encryption key derivation.
    pub salt: [u8; SALT_LEN],
    /// AES-GCM-SIV nonce.
    pub nonce: [u8; NONCE_LEN],
}

impl FrameHeader {
    /// Parse and sanity-check a header.
    ///
    /// Returns [`StegoError::FrameCorrupted`] if `data` is shorter than
    /// [`HEADER_LEN`], or the magic or version do not match.
    pub fn parse(data: &[u8]) -> Result<Self, StegoError> {
        if data.len() < HEADER_LEN || data[..2] != MAGIC || data[2] != FRAME_VERSION {
            return Err(StegoError::FrameCorrupted);
        }
        let body_len = u32::from_be_bytes([data[3], data[4], data[5], data[6]]);

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&data[7..7 + SALT_LEN]);

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&data[7 + SALT_LEN..HEADER_LEN]);

        Ok(Self { body_len, salt, nonce })
    }

    /// Total length of the frame this header announces, or `None` if it
    /// does not fit in `usize`.
    pub fn frame_len(&self) -> Option<usize> {
        (self.body_len as usize).checked_add(FRAME_OVERHEAD)
    }
}

/// Encrypt a sealed body under `pin` and wrap it in a frame.
pub fn seal(body: &[u8], pin: &str) -> Result<Vec<u8>, StegoError> {
    let body_len = u32::try_from(body.len()).map_err(|_| StegoError::MessageTooLarge {
        required: body.len(),
        available: u32::MAX as usize,
    })?;

    let aad = associated_data(body_len);
    let (ciphertext, nonce, salt) = crypto::encrypt(body, &aad, pin)?;
    debug_assert_eq!(ciphertext.len(), body.len() + TAG_LEN, "ciphertext length mismatch");

    let mut frame = Vec::with_capacity(framed_len(body.len()));
    frame.extend_from_slice(&aad);
    frame.extend_from_slice(&salt);
    frame.extend_from_slice(&nonce);
    frame.extend_from_slice(&ciphertext);

    let crc = crc32fast::hash(&frame);
    frame.extend_from_slice(&crc.to_be_bytes());

    Ok(frame)
}

/// Serialize, compress, encrypt and frame a payload.
pub fn frame(payload: &Payload, pin: &str) -> Result<Vec<u8>, StegoError> {
    seal(&payload::encode_body(payload)?, pin)
}

/// Verify and decrypt a frame, returning the sealed body.
///
/// `data` may be longer than the frame; the length comes from the header.
/// Every failure is [`StegoError::FrameCorrupted`].
pub fn open(data: &[u8], pin: &str) -> Result<Vec<u8>, StegoError> {
    let header = FrameHeader::parse(data)?;
    let total = header.frame_len().ok_or(StegoError::FrameCorrupted)?;
    if total < FRAME_OVERHEAD || data.len() < total {
        return Err(StegoError::FrameCorrupted);
    }

    let sealed = &data[..total - 4];
    let stored_crc = u32::from_be_bytes([data[total - 4], data[total - 3], data[total - 2], data[total - 1]]);
    if crc32fast::hash(sealed) != stored_crc {
        return Err(StegoError::FrameCorrupted);
    }

    let body = crypto::decrypt(
        &sealed[HEADER_LEN..],
        &associated_data(header.body_len),
        pin,
        &header.salt,
        &header.nonce,
    )?;
    if body.len() != header.body_len as usize {
        return Err(StegoError::FrameCorrupted);
    }
    Ok(body)
}

/// Reverse [`frame`]: verify, decrypt, decompress and rebuild the payload.
pub fn unframe(data: &[u8], pin: &str) -> Result<Payload, StegoError> {
    payload::decode_body(&open(data, pin)?)
}

/// Convert bytes to a bit vector (MSB first within each byte).
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit_pos in (0..8).rev() {
            bits.push((byte >> bit_pos) & 1);
        }
    }
    bits
}

/// Convert a bit vector (MSB first) back to bytes.
/// Pads the last byte with zero bits if `bits.len()` is not a multiple of 8.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((bits.len() + 7) / 8);
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            byte |= (bit & 1) << (7 - i);
        }
        bytes.push(byte);
    }
    bytes
}
