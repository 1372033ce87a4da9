// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Payload serialization and compression.
//!
//! The sealed body is what gets encrypted inside a frame:
//!
//! ```text
//! [1 byte ] kind (0x01 text, 0x02 file)
//! [1 byte ] filename_len N (0 for text, 1–255 for files)
//! [N bytes] filename (UTF-8)
//! [1 byte ] flags
//! [M bytes] content (raw or Brotli-compressed depending on flags)
//! ```
//!
//! Kind and filename live inside the ciphertext, so nothing about the payload
//! is visible without the PIN.

use std::io::{Read, Write};

use crate::stego::error::StegoError;

/// Compression algorithm flags (bits 0-1 of flags byte).
const COMPRESS_NONE: u8 = 0b00;
const COMPRESS_BROTLI: u8 = 0b01;
const COMPRESS_MASK: u8 = 0b11;

/// Brotli compression quality (0-11).
const BROTLI_QUALITY: u32 = 11;

/// Brotli LG_WINDOW_SIZE. 22 is the default (4 MB window).
const BROTLI_LG_WINDOW_SIZE: u32 = 22;

/// Longest accepted filename in bytes.
pub const MAX_FILENAME_LEN: usize = 255;

/// Maximum content size before compression (hard reject), and the cap on
/// decompressed output when reading a frame back.
pub const MAX_CONTENT_LEN: usize = 8 * 1024 * 1024;

/// Fixed body bytes around the filename and content: kind + name_len + flags.
pub const BODY_OVERHEAD: usize = 3;

/// What the payload bytes represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Text,
    File,
}

impl PayloadKind {
    fn to_byte(self) -> u8 {
        match self {
            PayloadKind::Text => 0x01,
            PayloadKind::File => 0x02,
        }
    }

    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(PayloadKind::Text),
            0x02 => Some(PayloadKind::File),
            _ => None,
        }
    }
}

/// A text message or a named file to hide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub kind: PayloadKind,
    pub content: Vec<u8>,
    /// Required for [`PayloadKind::File`], must be `None` for text.
    pub filename: Option<String>,
}

impl Payload {
    pub fn text(message: &str) -> Self {
        Self {
            kind: PayloadKind::Text,
            content: message.as_bytes().to_vec(),
            filename: None,
        }
    }

    pub fn file(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            kind: PayloadKind::File,
            content,
            filename: Some(filename.into()),
        }
    }

    fn validate(&self) -> Result<(), StegoError> {
        if self.content.len() > MAX_CONTENT_LEN {
            return Err(StegoError::MessageTooLarge {
                required: self.content.len(),
                available: MAX_CONTENT_LEN,
            });
        }
        match (self.kind, &self.filename) {
            (PayloadKind::Text, None) => {
                std::str::from_utf8(&self.content)
                    .map_err(|_| StegoError::InvalidInput("text payload is not valid UTF-8"))?;
            }
            (PayloadKind::Text, Some(_)) => {
                return Err(StegoError::InvalidInput("text payload cannot carry a filename"));
            }
            (PayloadKind::File, None) => {
                return Err(StegoError::InvalidInput("file payload needs a filename"));
            }
            (PayloadKind::File, Some(name)) => {
                if name.is_empty() {
                    return Err(StegoError::InvalidInput("file payload needs a filename"));
                }
                if name.len() > MAX_FILENAME_LEN {
                    return Err(StegoError::InvalidInput("filename longer than 255 bytes"));
                }
            }
        }
        Ok(())
    }
}

/// Serialize a payload into the sealed body (before encryption).
///
/// Content is Brotli-compressed only if that is strictly smaller.
pub fn encode_body(payload: &Payload) -> Result<Vec<u8>, StegoError> {
    payload.validate()?;
    let name = payload.filename.as_deref().unwrap_or("").as_bytes();
    let (flags, content) = try_compress(&payload.content);

    let mut body = Vec::with_capacity(BODY_OVERHEAD + name.len() + content.len());
    body.push(payload.kind.to_byte());
    body.push(name.len() as u8);
    body.extend_from_slice(name);
    body.push(flags);
    body.extend_from_slice(&content);
    Ok(body)
}

/// Exact sealed-body size for `payload`, for live "used bytes" displays.
///
/// Falls back to the uncompressed size if the payload is invalid.
pub fn compressed_payload_size(payload: &Payload) -> usize {
    encode_body(payload).map(|b| b.len()).unwrap_or_else(|_| {
        BODY_OVERHEAD + payload.filename.as_ref().map_or(0, |n| n.len()) + payload.content.len()
    })
}

/// Parse a sealed body back into a payload.
///
/// Every malformation is [`StegoError::FrameCorrupted`]; by the time this runs
/// the body has been authenticated, so these only fire on a buggy encoder.
pub fn decode_body(body: &[u8]) -> Result<Payload, StegoError> {
    if body.len() < BODY_OVERHEAD {
        return Err(StegoError::FrameCorrupted);
    }
    let kind = PayloadKind::from_byte(body[0]).ok_or(StegoError::FrameCorrupted)?;
    let name_len = body[1] as usize;
    let mut cursor = 2;
    if cursor + name_len + 1 > body.len() {
        return Err(StegoError::FrameCorrupted);
    }
    let name = &body[cursor..cursor + name_len];
    cursor += name_len;
    let flags = body[cursor];
    cursor += 1;

    let content = match flags & COMPRESS_MASK {
        COMPRESS_NONE => body[cursor..].to_vec(),
        COMPRESS_BROTLI => decompress_brotli(&body[cursor..])?,
        _ => return Err(StegoError::FrameCorrupted),
    };

    let filename = match kind {
        PayloadKind::Text => {
            if name_len != 0 || std::str::from_utf8(&content).is_err() {
                return Err(StegoError::FrameCorrupted);
            }
            None
        }
        PayloadKind::File => {
            if name_len == 0 {
                return Err(StegoError::FrameCorrupted);
            }
            let name = std::str::from_utf8(name).map_err(|_| StegoError::FrameCorrupted)?;
            Some(name.to_string())
        }
    };

    Ok(Payload { kind, content, filename })
}

/// Try Brotli compression; return `(flags, data)` using whichever is smaller.
fn try_compress(content: &[u8]) -> (u8, Vec<u8>) {
    if content.is_empty() {
        return (COMPRESS_NONE, Vec::new());
    }
    match compress_brotli(content) {
        Some(compressed) if compressed.len() < content.len() => (COMPRESS_BROTLI, compressed),
        _ => (COMPRESS_NONE, content.to_vec()),
    }
}

fn compress_brotli(data: &[u8]) -> Option<Vec<u8>> {
    let mut output = Vec::new();
    {
        let mut compressor = brotli::CompressorWriter::new(
            &mut output,
            4096, // buffer size
            BROTLI_QUALITY,
            BROTLI_LG_WINDOW_SIZE,
        );
        compressor.write_all(data).ok()?;
        // CompressorWriter finishes the stream on drop
    }
    Some(output)
}

fn decompress_brotli(data: &[u8]) -> Result<Vec<u8>, StegoError> {
    let mut output = Vec::new();
    let decompressor = brotli::Decompressor::new(data, 4096);
    // One byte past the limit tells an oversized stream from an exact fit.
    decompressor
        .take(MAX_CONTENT_LEN as u64 + 1)
        .read_to_end(&mut output)
        .map_err(|_| StegoError::FrameCorrupted)?;
    if output.len() > MAX_CONTENT_LEN {
        return Err(StegoError::FrameCorrupted);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_roundtrip() {
        let p = Payload::text("Hello, world!");
        let body = encode_body(&p).unwrap();
        assert_eq!(decode_body(&body).unwrap(), p);
    }

    #[test]
    fn empty_text_roundtrip() {
        let p = Payload::text("");
        let body = encode_body(&p).unwrap();
        assert_eq!(body.len(), BODY_OVERHEAD);
        assert_eq!(decode_body(&body).unwrap(), p);
    }

    #[test]
    fn file_roundtrip() {
        let p = Payload::file("report.pdf", vec![0x25, 0x50, 0x44, 0x46, 0x00, 0xFF]);
        let body = encode_body(&p).unwrap();
        let back = decode_body(&body).unwrap();
        assert_eq!(back.kind, PayloadKind::File);
        assert_eq!(back.filename.as_deref(), Some("report.pdf"));
        assert_eq!(back.content, p.content);
    }

    #[test]
    fn short_message_not_compressed() {
        let body = encode_body(&Payload::text("hi")).unwrap();
        assert_eq!(body[2] & COMPRESS_MASK, COMPRESS_NONE);
    }

    #[test]
    fn repetitive_text_compressed() {
        let long_text = "abcdefghij".repeat(100);
        let body = encode_body(&Payload::text(&long_text)).unwrap();
        assert_eq!(body[2] & COMPRESS_MASK, COMPRESS_BROTLI);
        assert!(body.len() < long_text.len());
        let back = decode_body(&body).unwrap();
        assert_eq!(back.content, long_text.as_bytes());
    }

    #[test]
    fn unicode_filename() {
        let p = Payload::file("daten-übersicht.pdf", vec![1, 2, 3]);
        let back = decode_body(&encode_body(&p).unwrap()).unwrap();
        assert_eq!(back.filename.as_deref(), Some("daten-übersicht.pdf"));
    }

    #[test]
    fn file_without_name_rejected() {
        let p = Payload { kind: PayloadKind::File, content: vec![1], filename: None };
        assert!(matches!(encode_body(&p), Err(StegoError::InvalidInput(_))));
        let p = Payload::file("", vec![1]);
        assert!(matches!(encode_body(&p), Err(StegoError::InvalidInput(_))));
    }

    #[test]
    fn long_filename_rejected() {
        let p = Payload::file("x".repeat(256), vec![1]);
        assert!(matches!(encode_body(&p), Err(StegoError::InvalidInput(_))));
        let p = Payload::file("x".repeat(255), vec![1]);
        assert!(encode_body(&p).is_ok());
    }

    #[test]
    fn text_with_filename_rejected() {
        let p = Payload { kind: PayloadKind::Text, content: b"a".to_vec(), filename: Some("a".into()) };
        assert!(matches!(encode_body(&p), Err(StegoError::InvalidInput(_))));
    }

    #[test]
    fn non_utf8_text_rejected() {
        let p = Payload { kind: PayloadKind::Text, content: vec![0xFF, 0xFE], filename: None };
        assert!(matches!(encode_body(&p), Err(StegoError::InvalidInput(_))));
    }

    #[test]
    fn oversized_content_rejected() {
        let p = Payload::file("big.bin", vec![0u8; MAX_CONTENT_LEN + 1]);
        assert!(matches!(encode_body(&p), Err(StegoError::MessageTooLarge { .. })));
    }

    #[test]
    fn truncated_body_rejected() {
        assert!(decode_body(&[]).is_err());
        assert!(decode_body(&[0x02, 5, b'a']).is_err());
    }

    #[test]
    fn unknown_kind_rejected() {
        assert!(matches!(decode_body(&[0x07, 0, COMPRESS_NONE]), Err(StegoError::FrameCorrupted)));
    }

    fn brotli_body(content_len: usize) -> Vec<u8> {
        let mut body = vec![PayloadKind::File.to_byte(), 1, b'z', COMPRESS_BROTLI];
        body.extend(compress_brotli(&vec![0u8; content_len]).unwrap());
        body
    }

    #[test]
    fn decompression_accepts_content_limit() {
        let p = decode_body(&brotli_body(MAX_CONTENT_LEN)).unwrap();
        assert_eq!(p.content.len(), MAX_CONTENT_LEN);
        assert_eq!(p.filename.as_deref(), Some("z"));
    }

    #[test]
    fn decompression_rejects_one_past_limit() {
        assert!(matches!(decode_body(&brotli_body(MAX_CONTENT_LEN + 1)), Err(StegoError::FrameCorrupted)));
    }

    #[test]
    fn size_matches_encoding() {
        let p = Payload::text(&"repeat ".repeat(50));
        assert_eq!(compressed_payload_size(&p), encode_body(&p).unwrap().len());
    }
}
