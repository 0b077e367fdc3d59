// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fish Speech client (spec §4.5.2 tier 2 candidate): no reference cloning
//! support.

use bytes::Bytes;
use serde::Serialize;

use super::{Synthesizer, SynthesizerError};

#[derive(Debug, Serialize)]
struct BaseRequest<'a> {
    text: &'a str,
    speed: f32,
    pitch: f32,
}

#[derive(Clone)]
pub struct FishSpeechSynthesizer {
    http: reqwest::Client,
    base_url: String,
}

impl FishSpeechSynthesizer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl Synthesizer for FishSpeechSynthesizer {
    async fn synthesize_with_reference(
        &self,
        _text: &str,
        _ref_bytes: &Bytes,
        _ref_ext: &str,
        _speed: f32,
        _pitch: f32,
    ) -> Result<Bytes, SynthesizerError> {
        Err(SynthesizerError::CloningUnsupported)
    }

    async fn synthesize_base(
        &self,
        text: &str,
        speed: f32,
        pitch: f32,
    ) -> Result<Bytes, SynthesizerError> {
        let request = BaseRequest { text, speed, pitch };
        let response = self
            .http
            .post(format!("{}/synthesize/base", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| SynthesizerError::Request(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SynthesizerError::Request(format!(
                "engine returned {}",
                response.status()
            )));
        }
        response
            .bytes()
            .await
            .map_err(|e| SynthesizerError::Request(e.to_string()))
    }
}
