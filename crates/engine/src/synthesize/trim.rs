// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference-audio trimming (supplements spec §4.5's fallback chain with a
//! detail the distillation left implicit: cloning engines perform best
//! against a short, silence-free reference clip). Pure function over
//! decoded PCM samples so it is exercised directly by unit tests without a
//! real audio file on disk.

use bytes::Bytes;

use super::wav;

const SILENCE_THRESHOLD: i16 = 400;
const MIN_DURATION_SECS: f32 = 1.0;
const MAX_DURATION_SECS: f32 = 10.0;

/// Trims leading/trailing silence from a reference clip, then clamps the
/// remaining span to `[MIN_DURATION_SECS, MAX_DURATION_SECS]`. If the
/// entire clip is silence, or the bytes don't parse as the WAV form this
/// module understands, the original bytes are returned unchanged — this is
/// best-effort quality normalization, not a correctness requirement.
pub fn trim_reference(bytes: &Bytes) -> Bytes {
    let Some((samples, sample_rate)) = wav::decode_pcm16(bytes) else {
        return bytes.clone();
    };
    if samples.is_empty() || sample_rate == 0 {
        return bytes.clone();
    }

    let start = samples
        .iter()
        .position(|&s| s.unsigned_abs() > SILENCE_THRESHOLD as u16);
    let end = samples
        .iter()
        .rposition(|&s| s.unsigned_abs() > SILENCE_THRESHOLD as u16);

    let (Some(start), Some(end)) = (start, end) else {
        return bytes.clone();
    };

    let min_samples = (MIN_DURATION_SECS * sample_rate as f32) as usize;
    let max_samples = (MAX_DURATION_SECS * sample_rate as f32) as usize;
    let trimmed_len = (end - start + 1).clamp(min_samples.min(samples.len()), max_samples);
    let trimmed_end = (start + trimmed_len).min(samples.len());

    wav::encode_pcm16(&samples[start..trimmed_end], sample_rate)
}

#[cfg(test)]
#[path = "trim_tests.rs"]
mod tests;
