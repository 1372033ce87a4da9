// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Cryptographic primitives for payload encryption.
//!
//! Implements a two-tier key derivation scheme using Argon2id:
//!
//! - **Tier 1 (structural)**: Deterministic scatter seed derived from PIN +
//!   a fixed per-layer salt. Secret and decoy layers use different salts, so
//!   one PIN never produces the same bit order for both layers. Encoder and
//!   decoder derive identical seeds.
//!
//! - **Tier 2 (encryption)**: AES-256-GCM-SIV key derived from PIN + random
//!   salt. The random salt is embedded in the payload frame, so the decoder
//!   recovers it from the extracted data.
//!
//! Argon2 parameters are pinned rather than taken from `Argon2::default()`,
//! because they are part of the frame format: a change here is a new
//! frame version.

use aes_gcm_siv::aead::{Aead, Payload as AeadPayload};
use aes_gcm_siv::{Aes256GcmSiv, KeyInit, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::stego::error::StegoError;
use crate::stego::layer::Layer;
use crate::stego::scatter::ScatterSeed;

/// Fixed salt for the secret layer's scatter seed.
const SECRET_SCATTER_SALT: &[u8; 16] = b"mirage-secret-v1";

/// Fixed salt for the decoy layer's scatter seed.
const DECOY_SCATTER_SALT: &[u8; 16] = b"mirage-decoy-v1\0";

/// Argon2id memory cost in KiB.
pub const ARGON2_M_COST: u32 = 19 * 1024;
/// Argon2id iterations.
pub const ARGON2_T_COST: u32 = 2;
/// Argon2id lanes.
pub const ARGON2_P_COST: u32 = 1;

/// AES-GCM-SIV nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// Argon2 salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-GCM-SIV authentication tag length in bytes.
pub const TAG_LEN: usize = 16;
/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

fn argon2() -> Result<Argon2<'static>, StegoError> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(KEY_LEN))
        .map_err(|_| StegoError::KeyDerivation)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn scatter_salt(layer: Layer) -> &'static [u8; 16] {
    match layer {
        Layer::Secret => SECRET_SCATTER_SALT,
        Layer::Decoy => DECOY_SCATTER_SALT,
    }
}

/// Derive the scatter seed (Tier 1) for one layer from a PIN.
pub fn derive_scatter_seed(pin: &str, layer: Layer) -> Result<Zeroizing<ScatterSeed>, StegoError> {
    let mut seed = Zeroizing::new([0u8; 32]);
    argon2()?
        .hash_password_into(pin.as_bytes(), scatter_salt(layer), &mut *seed)
        .map_err(|_| StegoError::KeyDerivation)?;
    Ok(seed)
}

/// Derive the AES-256 encryption key (Tier 2) from PIN + frame salt.
pub fn derive_encryption_key(pin: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, StegoError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2()?
        .hash_password_into(pin.as_bytes(), salt, &mut *key)
        .map_err(|_| StegoError::KeyDerivation)?;
    Ok(key)
}

/// Encrypt plaintext with AES-256-GCM-SIV, authenticating `aad` alongside it.
///
/// Returns (ciphertext_with_tag, nonce, salt). Salt and nonce are fresh
/// random values for every call.
pub fn encrypt(
    plaintext: &[u8],
    aad: &[u8],
    pin: &str,
) -> Result<(Vec<u8>, [u8; NONCE_LEN], [u8; SALT_LEN]), StegoError> {
    let mut rng = rand::thread_rng();

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let key = derive_encryption_key(pin, &salt)?;
    let cipher = Aes256GcmSiv::new_from_slice(&*key).map_err(|_| StegoError::Encryption)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), AeadPayload { msg: plaintext, aad })
        .map_err(|_| StegoError::Encryption)?;

    Ok((ciphertext, nonce_bytes, salt))
}

/// Decrypt and authenticate ciphertext with AES-256-GCM-SIV.
///
/// Any failure, including a wrong PIN, is [`StegoError::FrameCorrupted`].
pub fn decrypt(
    ciphertext: &[u8],
    aad: &[u8],
    pin: &str,
    salt: &[u8; SALT_LEN],
    nonce_bytes: &[u8; NONCE_LEN],
) -> Result<Vec<u8>, StegoError> {
    let key = derive_encryption_key(pin, salt).map_err(|_| StegoError::FrameCorrupted)?;
    let cipher = Aes256GcmSiv::new_from_slice(&*key).map_err(|_| StegoError::FrameCorrupted)?;
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), AeadPayload { msg: ciphertext, aad })
        .map_err(|_| StegoError::FrameCorrupted)
}
