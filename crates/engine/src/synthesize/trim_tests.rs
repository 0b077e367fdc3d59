// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::synthesize::wav;
use crate::synthesize::wav::{encode_pcm16, SAMPLE_RATE};

fn tone_samples(count: usize) -> Vec<i16> {
    vec![5_000i16; count]
}

#[test]
fn trims_leading_and_trailing_silence() {
    let mut samples = vec![0i16; SAMPLE_RATE as usize / 2];
    samples.extend(tone_samples(SAMPLE_RATE as usize * 2));
    samples.extend(vec![0i16; SAMPLE_RATE as usize / 2]);
    let wav = encode_pcm16(&samples, SAMPLE_RATE);

    let trimmed = trim_reference(&wav);
    let (trimmed_samples, rate) = wav::decode_pcm16(&trimmed).unwrap();
    assert_eq!(rate, SAMPLE_RATE);
    assert!(trimmed_samples.len() < samples.len());
    assert!(trimmed_samples.iter().all(|&s| s == 5_000));
}

#[test]
fn clamps_to_the_maximum_duration() {
    let samples = tone_samples(SAMPLE_RATE as usize * 30);
    let wav = encode_pcm16(&samples, SAMPLE_RATE);

    let trimmed = trim_reference(&wav);
    let (trimmed_samples, _) = wav::decode_pcm16(&trimmed).unwrap();
    assert!(trimmed_samples.len() as f32 <= MAX_DURATION_SECS * SAMPLE_RATE as f32 + 1.0);
}

#[test]
fn all_silence_clip_is_returned_unchanged() {
    let samples = vec![0i16; SAMPLE_RATE as usize];
    let wav = encode_pcm16(&samples, SAMPLE_RATE);

    let trimmed = trim_reference(&wav);
    assert_eq!(trimmed, wav);
}

#[test]
fn non_wav_bytes_are_returned_unchanged() {
    let bytes = Bytes::from_static(b"not a wav file");
    assert_eq!(trim_reference(&bytes), bytes);
}
