// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The inline-directive text preprocessor (spec §4.5.1): a deterministic,
//! pure function over a single string. Kept in `deckcast-core` because it
//! has no I/O and is exercised directly by both the synthesis worker and
//! property tests.

use once_cell::sync::Lazy;
use regex::Regex;

/// Coarse emotional tone recognized by `[EMOTION:...]`. `Neutral` is the
/// default when no directive is present or the directive is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emotion {
    Excited,
    Sad,
    Angry,
    Happy,
    Neutral,
}

crate::simple_display! {
    Emotion {
        Excited => "excited",
        Sad => "sad",
        Angry => "angry",
        Happy => "happy",
        Neutral => "neutral",
    }
}

/// Clamped bounds for `[SPEED:...]` / `[PITCH:...]` float forms (spec §8
/// boundary behaviors: `3.0` clamps to `2.0`, `0.1` clamps to `0.5`).
pub const RATE_MIN: f32 = 0.5;
pub const RATE_MAX: f32 = 2.0;

/// Result of parsing one slide's note text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNote {
    pub clean_text: String,
    pub emotion: Emotion,
    pub speed: f32,
    pub pitch: f32,
}

static EMOTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[EMOTION:(excited|sad|angry|happy|neutral)\]").unwrap()
});
static SPEED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[SPEED:(slow|normal|fast|[0-9]*\.?[0-9]+)\]").unwrap());
static PITCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[PITCH:(low|normal|high|[0-9]*\.?[0-9]+)\]").unwrap());
static PAUSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[PAUSE:(\d+)\]").unwrap());
static EMPHASIS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[EMPHASIS:([^\]]+)\]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn clamp_rate(value: f32) -> f32 {
    value.clamp(RATE_MIN, RATE_MAX)
}

/// Parse the directives out of `text`, returning the cleaned text plus the
/// recognized prosody controls. Unknown `[...]` directives are left intact
/// (spec §4.5.1: "the engine is forward-compatible").
pub fn parse(text: &str) -> ParsedNote {
    let mut emotion = Emotion::Neutral;
    let mut speed = 1.0_f32;
    let mut pitch = 1.0_f32;
    let mut out = text.to_string();

    if let Some(caps) = EMOTION_RE.captures(&out) {
        emotion = match caps[1].to_lowercase().as_str() {
            "excited" => Emotion::Excited,
            "sad" => Emotion::Sad,
            "angry" => Emotion::Angry,
            "happy" => Emotion::Happy,
            _ => Emotion::Neutral,
        };
    }
    out = EMOTION_RE.replace_all(&out, "").into_owned();

    if let Some(caps) = SPEED_RE.captures(&out) {
        speed = match caps[1].to_lowercase().as_str() {
            "slow" => 0.7,
            "normal" => 1.0,
            "fast" => 1.3,
            other => other.parse::<f32>().map(clamp_rate).unwrap_or(1.0),
        };
    }
    out = SPEED_RE.replace_all(&out, "").into_owned();

    if let Some(caps) = PITCH_RE.captures(&out) {
        pitch = match caps[1].to_lowercase().as_str() {
            "low" => 0.8,
            "normal" => 1.0,
            "high" => 1.2,
            other => other.parse::<f32>().map(clamp_rate).unwrap_or(1.0),
        };
    }
    out = PITCH_RE.replace_all(&out, "").into_owned();

    out = PAUSE_RE
        .replace_all(&out, |caps: &regex::Captures| {
            let n: usize = caps[1].parse().unwrap_or(0);
            ",".repeat(n)
        })
        .into_owned();

    out = EMPHASIS_RE
        .replace_all(&out, |caps: &regex::Captures| caps[1].to_uppercase())
        .into_owned();

    out = WHITESPACE_RE.replace_all(&out, " ").trim().to_string();

    ParsedNote {
        clean_text: out,
        emotion,
        speed,
        pitch,
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
