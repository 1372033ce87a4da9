// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Embed pipeline.
//!
//! 1. Validate PINs and carrier dimensions.
//! 2. Serialize every payload and check its exact frame length against the
//!    lane budget. Nothing expensive has happened yet.
//! 3. Derive scatter seeds (Tier 1) and seal the frames (Tier 2).
//! 4. Write all frames into a copy of the carrier.

use tracing::debug;

use crate::raster::CarrierImage;
use crate::stego::capacity::{capacity, fits};
use crate::stego::crypto::derive_scatter_seed;
use crate::stego::error::StegoError;
use crate::stego::frame::{self, framed_len};
use crate::stego::layer::{embed_frames, Layer, LayerConfig, LayerWrite};
use crate::stego::payload::{self, Payload};

/// The optional second payload, revealed by its own PIN.
#[derive(Debug, Clone, Copy)]
pub struct DecoyLayer<'a> {
    pub payload: &'a Payload,
    pub pin: &'a str,
}

fn validate_pin(pin: &str) -> Result<(), StegoError> {
    if pin.is_empty() {
        return Err(StegoError::InvalidInput("PIN must not be empty"));
    }
    Ok(())
}

/// Serialize `payload` and make sure its frame fits `available` bytes.
fn preflight(payload: &Payload, available: usize) -> Result<Vec<u8>, StegoError> {
    let body = payload::encode_body(payload)?;
    let required = framed_len(body.len());
    if !fits(required, available) {
        return Err(StegoError::MessageTooLarge { required, available });
    }
    Ok(body)
}

/// Hide `secret` (and optionally a decoy) in a copy of `carrier`.
///
/// Without a decoy the secret spreads over the red, green and blue planes.
/// With a decoy the secret takes the blue plane and the decoy the red one.
///
/// # Errors
/// - [`StegoError::InvalidInput`] for an empty PIN, a decoy PIN equal to the
///   secure PIN, or a malformed payload.
/// - [`StegoError::ImageTooLarge`] / [`StegoError::ImageTooSmall`] for
///   unusable dimensions.
/// - [`StegoError::MessageTooLarge`] if a frame exceeds its lane. The carrier
///   is never touched in that case.
pub fn embed(
    carrier: &CarrierImage,
    secret: &Payload,
    secure_pin: &str,
    decoy: Option<DecoyLayer<'_>>,
) -> Result<CarrierImage, StegoError> {
    validate_pin(secure_pin)?;
    if let Some(d) = decoy {
        validate_pin(d.pin)?;
        if d.pin == secure_pin {
            return Err(StegoError::InvalidInput("decoy PIN must differ from the secure PIN"));
        }
    }

    let (width, height) = (carrier.width(), carrier.height());
    let decoy_enabled = decoy.is_some();
    super::validate_encode_dimensions(width, height, decoy_enabled)?;

    let config = LayerConfig::for_decoy(decoy_enabled);
    let available = capacity(width, height, decoy_enabled);
    let secret_body = preflight(secret, available)?;
    let decoy_body = match decoy {
        Some(d) => Some((d, preflight(d.payload, available)?)),
        None => None,
    };

    debug!(
        width,
        height,
        ?config,
        available,
        secret_frame = framed_len(secret_body.len()),
        decoy_frame = decoy_body.as_ref().map(|(_, b)| framed_len(b.len())),
        "embedding"
    );

    let secret_seed = derive_scatter_seed(secure_pin, Layer::Secret)?;
    let secret_frame = frame::seal(&secret_body, secure_pin)?;
    let decoy_sealed = match decoy_body {
        Some((d, body)) => Some((derive_scatter_seed(d.pin, Layer::Decoy)?, frame::seal(&body, d.pin)?)),
        None => None,
    };

    let mut writes = vec![LayerWrite {
        layer: Layer::Secret,
        seed: &secret_seed,
        frame: &secret_frame,
    }];
    if let Some((seed, frame)) = &decoy_sealed {
        writes.push(LayerWrite {
            layer: Layer::Decoy,
            seed,
            frame,
        });
    }

    embed_frames(carrier, config, &writes)
}

/// Container form of [`embed`]: decode any supported raster, return PNG bytes.
///
/// # Errors
/// Those of [`embed`], plus [`StegoError::InvalidImage`] for undecodable
/// input and [`StegoError::OutputEncoding`] if the PNG cannot be written.
pub fn embed_png(
    image_bytes: &[u8],
    secret: &Payload,
    secure_pin: &str,
    decoy: Option<DecoyLayer<'_>>,
) -> Result<Vec<u8>, StegoError> {
    let carrier = CarrierImage::from_bytes(image_bytes).map_err(StegoError::InvalidImage)?;
    let stego = embed(&carrier, secret, secure_pin, decoy)?;
    stego.to_png().map_err(StegoError::OutputEncoding)
}

/// Write one layer of the paired layout, leaving all other planes as they are.
///
/// Lets a decoy be added to an image that already carries a paired secret
/// (or the other way round) without knowing the other layer's PIN.
pub fn embed_layer(
    carrier: &CarrierImage,
    layer: Layer,
    payload: &Payload,
    pin: &str,
) -> Result<CarrierImage, StegoError> {
    validate_pin(pin)?;
    let (width, height) = (carrier.width(), carrier.height());
    super::validate_encode_dimensions(width, height, true)?;

    let available = capacity(width, height, true);
    let body = preflight(payload, available)?;
    debug!(width, height, ?layer, available, frame = framed_len(body.len()), "embedding single layer");

    let seed = derive_scatter_seed(pin, layer)?;
    let frame = frame::seal(&body, pin)?;
    embed_frames(
        carrier,
        LayerConfig::Paired,
        &[LayerWrite {
            layer,
            seed: &seed,
            frame: &frame,
        }],
    )
}
