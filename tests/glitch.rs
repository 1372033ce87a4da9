// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Wrong PIN, no payload and corrupted payload all end in a glitch image.

use mirage_core::{embed, extract, extract_png, CarrierImage, DecodeResult, DecoyLayer, Payload};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn cover(width: u32, height: u32, seed: u64) -> CarrierImage {
    let mut pixels = vec![0u8; (width * height * 4) as usize];
    ChaCha20Rng::seed_from_u64(seed).fill_bytes(&mut pixels);
    for px in pixels.chunks_exact_mut(4) {
        px[3] = 255;
    }
    CarrierImage::from_rgba(width, height, pixels).unwrap()
}

fn glitch_png(result: DecodeResult) -> Vec<u8> {
    match result {
        DecodeResult::Glitch { image } => image,
        other => panic!("expected glitch, got {other:?}"),
    }
}

#[test]
fn wrong_pin_is_deterministic() {
    let img = cover(100, 100, 1);
    let stego = embed(&img, &Payload::text("HELLO"), "1234", None).unwrap();
    let a = glitch_png(extract(&stego, "9999").unwrap());
    let b = glitch_png(extract(&stego, "9999").unwrap());
    assert_eq!(a, b);
}

#[test]
fn glitch_is_decodable_png_of_same_size() {
    let img = cover(73, 41, 2);
    let png = glitch_png(extract(&img, "1234").unwrap());
    let decoded = CarrierImage::from_bytes(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (73, 41));
    assert_ne!(decoded, img);
}

#[test]
fn different_pins_give_different_glitches() {
    let img = cover(100, 100, 3);
    let a = glitch_png(extract(&img, "1111").unwrap());
    let b = glitch_png(extract(&img, "2222").unwrap());
    assert_ne!(a, b);
}

#[test]
fn corrupted_payload_is_glitch() {
    let img = cover(60, 60, 4);
    let stego = embed(&img, &Payload::text("fragile"), "1", None).unwrap();
    // Flip every color LSB: the frame cannot survive that.
    let pixels: Vec<u8> = stego
        .pixels()
        .iter()
        .enumerate()
        .map(|(i, &b)| if i % 4 == 3 { b } else { b ^ 1 })
        .collect();
    let damaged = CarrierImage::from_rgba(60, 60, pixels).unwrap();
    assert!(extract(&damaged, "1").unwrap().is_glitch());
}

#[test]
fn decoy_carrier_wrong_pin_is_glitch() {
    let img = cover(100, 100, 5);
    let decoy = Payload::text("d");
    let stego = embed(&img, &Payload::text("s"), "1", Some(DecoyLayer { payload: &decoy, pin: "2" })).unwrap();
    let result = extract(&stego, "3").unwrap();
    assert!(result.is_glitch());
    assert!(!result.is_decoy());
}

#[test]
fn png_path_glitches_too() {
    let png = cover(50, 50, 6).to_png().unwrap();
    assert!(extract_png(&png, "whatever").unwrap().is_glitch());
}
