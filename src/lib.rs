// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! # mirage-core
//!
//! Pure-Rust LSB steganography engine. Hides an encrypted text message or
//! file in the low-order bits of an image's color channels, optionally next
//! to a second "decoy" payload that opens with a different PIN.
//!
//! - Payloads are Brotli-compressed and sealed with AES-256-GCM-SIV under an
//!   Argon2id key. Bit positions follow a PIN-keyed ChaCha20 permutation.
//! - Without a decoy the payload uses the red, green and blue planes. With a
//!   decoy the secret lives in blue, the decoy in red, green stays untouched.
//! - A wrong PIN never produces an error: extraction returns a glitched copy
//!   of the image instead, whether the carrier holds data or not.
//!
//! The engine is stateless and never mutates its inputs. Enable the
//! `parallel` feature to process the two layers on the rayon pool.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use mirage_core::{embed_png, extract_png, DecodeResult, Payload};
//!
//! let cover = std::fs::read("photo.png").unwrap();
//! let stego = embed_png(&cover, &Payload::text("HELLO"), "1234", None).unwrap();
//! match extract_png(&stego, "1234").unwrap() {
//!     DecodeResult::Text { message, is_decoy } => assert_eq!((message.as_str(), is_decoy), ("HELLO", false)),
//!     _ => unreachable!(),
//! }
//! ```

pub mod raster;
pub mod stego;

pub use raster::error::RasterError;
pub use raster::{CarrierImage, ChannelPlane};
pub use stego::{capacity, capacity_info, compressed_payload_size, fits, required_bytes, CapacityInfo};
pub use stego::{embed, embed_layer, embed_png, extract, extract_png, DecodeResult, DecoyLayer, StegoError};
pub use stego::{validate_encode_dimensions, Layer, LayerConfig, Payload, PayloadKind, MAX_DIMENSION, MAX_PIXELS};
