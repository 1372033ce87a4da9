// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Layer coordination over disjoint channel planes.
//!
//! A carrier holds one or two layers:
//!
//! | Config   | Secret lane      | Decoy lane | Unused |
//! |----------|------------------|------------|--------|
//! | `Solo`   | Red, Green, Blue | -          | -      |
//! | `Paired` | Blue             | Red        | Green  |
//!
//! A lane is the bit array formed by its planes' LSBs; in a multi-plane lane
//! bit `i` lives in pixel `i / planes` on plane `planes[i % planes]`. Each
//! layer walks its own lane in the scatter order of its own seed. Lanes never
//! share a plane, so layers can be written in any order (or concurrently)
//! and read back independently.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::trace;

use crate::raster::{CarrierImage, ChannelPlane};
use crate::stego::capacity::fits;
use crate::stego::channel::{read_bit, write_bit};
use crate::stego::crypto::derive_scatter_seed;
use crate::stego::error::StegoError;
use crate::stego::frame::{self, bits_to_bytes, bytes_to_bits, FrameHeader, HEADER_LEN};
use crate::stego::payload::Payload;
use crate::stego::scatter::{ScatterSeed, ScatterSequence};

const SOLO_SECRET_PLANES: [ChannelPlane; 3] = ChannelPlane::ALL;
const PAIRED_SECRET_PLANES: [ChannelPlane; 1] = [ChannelPlane::Blue];
const PAIRED_DECOY_PLANES: [ChannelPlane; 1] = [ChannelPlane::Red];

/// One independently keyed payload slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Secret,
    Decoy,
}

impl Layer {
    /// Configurations a reader must try for this layer, in order.
    ///
    /// A secret may have been written alone (Solo) or next to a decoy
    /// (Paired); a decoy only exists in the Paired layout.
    pub fn read_configs(self) -> &'static [LayerConfig] {
        match self {
            Layer::Secret => &[LayerConfig::Solo, LayerConfig::Paired],
            Layer::Decoy => &[LayerConfig::Paired],
        }
    }
}

/// Assignment of layers to channel planes for one carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerConfig {
    /// Secret only, spread over all three color planes.
    Solo,
    /// Secret in Blue, decoy in Red, Green left untouched.
    Paired,
}

impl LayerConfig {
    pub fn for_decoy(decoy_enabled: bool) -> Self {
        if decoy_enabled {
            LayerConfig::Paired
        } else {
            LayerConfig::Solo
        }
    }

    /// Planes owned by `layer`; empty if the layer has no place in this config.
    pub fn planes(self, layer: Layer) -> &'static [ChannelPlane] {
        match (self, layer) {
            (LayerConfig::Solo, Layer::Secret) => &SOLO_SECRET_PLANES,
            (LayerConfig::Solo, Layer::Decoy) => &[],
            (LayerConfig::Paired, Layer::Secret) => &PAIRED_SECRET_PLANES,
            (LayerConfig::Paired, Layer::Decoy) => &PAIRED_DECOY_PLANES,
        }
    }

    /// The lane `layer` occupies on a carrier with `pixel_count` pixels.
    pub fn lane(self, layer: Layer, pixel_count: usize) -> Option<Lane> {
        let planes = self.planes(layer);
        if planes.is_empty() {
            None
        } else {
            Some(Lane { planes, pixel_count })
        }
    }
}

/// The bit array a layer reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lane {
    planes: &'static [ChannelPlane],
    pixel_count: usize,
}

impl Lane {
    pub fn planes(&self) -> &'static [ChannelPlane] {
        self.planes
    }

    /// Number of addressable bits.
    pub fn bit_len(&self) -> usize {
        self.pixel_count * self.planes.len()
    }

    /// Frame budget in whole bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.bit_len() / 8
    }

    /// Map a lane bit index to its pixel and plane.
    #[inline]
    pub fn locate(&self, index: u32) -> (usize, ChannelPlane) {
        let k = self.planes.len();
        let i = index as usize;
        (i / k, self.planes[i % k])
    }

    fn order(&self, seed: &ScatterSeed) -> ScatterSequence {
        ScatterSequence::new(seed, u32::try_from(self.bit_len()).unwrap_or(u32::MAX))
    }
}

/// One frame to be written into one layer.
#[derive(Debug, Clone, Copy)]
pub struct LayerWrite<'a> {
    pub layer: Layer,
    pub seed: &'a ScatterSeed,
    pub frame: &'a [u8],
}

/// Write every frame into its layer's lane of a copy of `carrier`.
///
/// The carrier itself is never modified; on error nothing is returned.
///
/// # Errors
/// - [`StegoError::InvalidInput`] if a layer appears twice or has no lane in `config`.
/// - [`StegoError::MessageTooLarge`] if a frame exceeds its lane.
pub fn embed_frames(
    carrier: &CarrierImage,
    config: LayerConfig,
    writes: &[LayerWrite<'_>],
) -> Result<CarrierImage, StegoError> {
    let pixel_count = carrier.pixel_count();
    let mut plans: Vec<(Lane, &LayerWrite<'_>)> = Vec::with_capacity(writes.len());
    for (i, w) in writes.iter().enumerate() {
        if writes[..i].iter().any(|other| other.layer == w.layer) {
            return Err(StegoError::InvalidInput("layer written twice"));
        }
        let lane = config
            .lane(w.layer, pixel_count)
            .ok_or(StegoError::InvalidInput("layer has no lane in this configuration"))?;
        if !fits(w.frame.len(), lane.capacity_bytes()) {
            return Err(StegoError::MessageTooLarge {
                required: w.frame.len(),
                available: lane.capacity_bytes(),
            });
        }
        plans.push((lane, w));
    }

    // Scatter orders are independent per layer; only the writes need the buffer.
    let scatter = |(lane, w): &(Lane, &LayerWrite<'_>)| -> Vec<u32> {
        lane.order(w.seed).take(w.frame.len() * 8).collect()
    };
    #[cfg(feature = "parallel")]
    let orders: Vec<Vec<u32>> = plans.par_iter().map(scatter).collect();
    #[cfg(not(feature = "parallel"))]
    let orders: Vec<Vec<u32>> = plans.iter().map(scatter).collect();

    let mut out = carrier.clone();
    let pixels = out.pixels_mut();
    for ((lane, w), order) in plans.iter().zip(&orders) {
        trace!(layer = ?w.layer, planes = lane.planes().len(), bits = order.len(), "writing lane");
        for (&index, bit) in order.iter().zip(bytes_to_bits(w.frame)) {
            let (pixel, plane) = lane.locate(index);
            write_bit(pixels, pixel, plane, bit);
        }
    }
    Ok(out)
}

/// Sequential byte reader over a lane in scatter order.
pub struct LaneReader<'a> {
    pixels: &'a [u8],
    lane: Lane,
    order: ScatterSequence,
}

impl<'a> LaneReader<'a> {
    pub fn new(carrier: &'a CarrierImage, lane: Lane, seed: &ScatterSeed) -> Self {
        Self {
            pixels: carrier.pixels(),
            lane,
            order: lane.order(seed),
        }
    }

    /// Read the next `n` bytes. Returns fewer if the lane runs out.
    pub fn read_bytes(&mut self, n: usize) -> Vec<u8> {
        let pixels = self.pixels;
        let lane = self.lane;
        let bits: Vec<u8> = self
            .order
            .by_ref()
            .take(n * 8)
            .map(|index| {
                let (pixel, plane) = lane.locate(index);
                read_bit(pixels, pixel, plane)
            })
            .collect();
        bits_to_bytes(&bits[..bits.len() / 8 * 8])
    }
}

/// Outcome of reading one layer with one PIN.
#[derive(Debug, Clone, Default)]
pub struct LayerAttempt {
    /// The unframed payload, if the frame verified.
    pub payload: Option<Payload>,
    /// Header bytes read by failed lane attempts, in attempt order.
    pub residue: Vec<u8>,
}

/// Try to read and unframe a frame from one lane.
pub fn try_lane(carrier: &CarrierImage, lane: Lane, seed: &ScatterSeed, pin: &str) -> LayerAttempt {
    let mut reader = LaneReader::new(carrier, lane, seed);
    let mut bytes = reader.read_bytes(HEADER_LEN);

    let frame_len = match FrameHeader::parse(&bytes).ok().and_then(|h| h.frame_len()) {
        Some(len) if len <= lane.capacity_bytes() => len,
        _ => {
            return LayerAttempt { payload: None, residue: bytes };
        }
    };
    bytes.extend(reader.read_bytes(frame_len - HEADER_LEN));

    match frame::unframe(&bytes, pin) {
        Ok(payload) => LayerAttempt { payload: Some(payload), residue: Vec::new() },
        Err(_) => {
            bytes.truncate(HEADER_LEN);
            LayerAttempt { payload: None, residue: bytes }
        }
    }
}

/// Try every lane `layer` may occupy, deriving its scatter seed from `pin`.
pub fn attempt_layer(carrier: &CarrierImage, layer: Layer, pin: &str) -> LayerAttempt {
    let Ok(seed) = derive_scatter_seed(pin, layer) else {
        return LayerAttempt::default();
    };
    let mut residue = Vec::new();
    for &config in layer.read_configs() {
        let Some(lane) = config.lane(layer, carrier.pixel_count()) else {
            continue;
        };
        trace!(?layer, ?config, "trying lane");
        let attempt = try_lane(carrier, lane, &seed, pin);
        if attempt.payload.is_some() {
            return attempt;
        }
        residue.extend(attempt.residue);
    }
    LayerAttempt { payload: None, residue }
}

/// A payload that verified under the supplied PIN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub layer: Layer,
    pub payload: Payload,
}

/// Read both layers independently with one PIN.
///
/// Returns zero, one or two candidates, secret first.
pub fn extract(carrier: &CarrierImage, pin: &str) -> Vec<Candidate> {
    #[cfg(feature = "parallel")]
    let (secret, decoy) = rayon::join(
        || attempt_layer(carrier, Layer::Secret, pin),
        || attempt_layer(carrier, Layer::Decoy, pin),
    );
    #[cfg(not(feature = "parallel"))]
    let (secret, decoy) = (
        attempt_layer(carrier, Layer::Secret, pin),
        attempt_layer(carrier, Layer::Decoy, pin),
    );

    [(Layer::Secret, secret), (Layer::Decoy, decoy)]
        .into_iter()
        .filter_map(|(layer, attempt)| attempt.payload.map(|payload| Candidate { layer, payload }))
        .collect()
}
