// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Extraction and outcome classification.
//!
//! ```text
//! START -> TRY_SECRET -> TRY_DECOY -> CLASSIFY -> { SECRET_OK | DECOY_OK | GLITCH }
//! ```
//!
//! `TRY_DECOY` is skipped once the secret layer verifies. A failed
//! classification is never reported as an error: the caller gets a glitch
//! image instead, so a wrong PIN cannot be told apart from a carrier that
//! holds nothing.

use tracing::debug;

use crate::raster::CarrierImage;
use crate::stego::error::StegoError;
use crate::stego::glitch;
use crate::stego::layer::{attempt_layer, Layer, LayerAttempt};
use crate::stego::payload::{Payload, PayloadKind};

/// Outcome of an extraction, one variant per terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    Text {
        message: String,
        is_decoy: bool,
    },
    File {
        filename: String,
        content: Vec<u8>,
        is_decoy: bool,
    },
    /// PNG bytes of the glitched carrier.
    Glitch { image: Vec<u8> },
}

impl DecodeResult {
    fn from_payload(payload: Payload, is_decoy: bool) -> Self {
        match payload.kind {
            PayloadKind::Text => DecodeResult::Text {
                message: String::from_utf8_lossy(&payload.content).into_owned(),
                is_decoy,
            },
            PayloadKind::File => DecodeResult::File {
                filename: payload.filename.unwrap_or_default(),
                content: payload.content,
                is_decoy,
            },
        }
    }

    /// `true` if a payload came from the decoy layer. Always `false` for glitches.
    pub fn is_decoy(&self) -> bool {
        match self {
            DecodeResult::Text { is_decoy, .. } | DecodeResult::File { is_decoy, .. } => *is_decoy,
            DecodeResult::Glitch { .. } => false,
        }
    }

    pub fn is_glitch(&self) -> bool {
        matches!(self, DecodeResult::Glitch { .. })
    }
}

#[cfg(not(feature = "parallel"))]
#[derive(Debug)]
enum VerifyState {
    Start,
    TrySecret,
    TryDecoy { secret: LayerAttempt },
    Classify { secret: LayerAttempt, decoy: Option<LayerAttempt> },
}

#[derive(Debug)]
enum Verdict {
    SecretOk(Payload),
    DecoyOk(Payload),
    Glitch { residue: Vec<u8> },
}

impl Verdict {
    fn label(&self) -> &'static str {
        match self {
            Verdict::SecretOk(_) => "secret",
            Verdict::DecoyOk(_) => "decoy",
            Verdict::Glitch { .. } => "glitch",
        }
    }
}

fn classify(secret: LayerAttempt, decoy: Option<LayerAttempt>) -> Verdict {
    if let Some(payload) = secret.payload {
        return Verdict::SecretOk(payload);
    }
    let mut residue = secret.residue;
    if let Some(decoy) = decoy {
        if let Some(payload) = decoy.payload {
            return Verdict::DecoyOk(payload);
        }
        residue.extend(decoy.residue);
    }
    Verdict::Glitch { residue }
}

/// Serial state machine: the decoy lane is only read if the secret fails.
#[cfg(not(feature = "parallel"))]
fn verify(carrier: &CarrierImage, pin: &str) -> Verdict {
    let mut state = VerifyState::Start;
    loop {
        state = match state {
            VerifyState::Start => VerifyState::TrySecret,
            VerifyState::TrySecret => {
                let secret = attempt_layer(carrier, Layer::Secret, pin);
                if secret.payload.is_some() {
                    VerifyState::Classify { secret, decoy: None }
                } else {
                    VerifyState::TryDecoy { secret }
                }
            }
            VerifyState::TryDecoy { secret } => {
                let decoy = attempt_layer(carrier, Layer::Decoy, pin);
                VerifyState::Classify { secret, decoy: Some(decoy) }
            }
            VerifyState::Classify { secret, decoy } => return classify(secret, decoy),
        };
    }
}

/// Parallel variant: both layers are read concurrently via `rayon::join`,
/// then classified. The secret still wins, so results match the serial path.
#[cfg(feature = "parallel")]
fn verify(carrier: &CarrierImage, pin: &str) -> Verdict {
    let (secret, decoy) = rayon::join(
        || attempt_layer(carrier, Layer::Secret, pin),
        || attempt_layer(carrier, Layer::Decoy, pin),
    );
    classify(secret, Some(decoy))
}

/// Extract whatever `pin` unlocks from `carrier`.
///
/// # Errors
/// Only [`StegoError::OutputEncoding`], if the glitch image cannot be
/// serialized. A wrong PIN is a [`DecodeResult::Glitch`], not an error.
pub fn extract(carrier: &CarrierImage, pin: &str) -> Result<DecodeResult, StegoError> {
    let verdict = verify(carrier, pin);
    debug!(
        width = carrier.width(),
        height = carrier.height(),
        outcome = verdict.label(),
        "extraction classified"
    );
    match verdict {
        Verdict::SecretOk(payload) => Ok(DecodeResult::from_payload(payload, false)),
        Verdict::DecoyOk(payload) => Ok(DecodeResult::from_payload(payload, true)),
        Verdict::Glitch { residue } => Ok(DecodeResult::Glitch {
            image: glitch::render(carrier, &residue)?,
        }),
    }
}

/// Decode a raster container, then [`extract`].
///
/// # Errors
/// [`StegoError::InvalidImage`] if `image_bytes` is not a decodable image.
pub fn extract_png(image_bytes: &[u8], pin: &str) -> Result<DecodeResult, StegoError> {
    let carrier = CarrierImage::from_bytes(image_bytes).map_err(StegoError::InvalidImage)?;
    extract(&carrier, pin)
}
