// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MeloTTS client (spec §4.5.2 tier 1): the only engine spec §6 guarantees
//! supports `synthesize_with_reference`.

use bytes::Bytes;
use serde::Serialize;

use super::{Synthesizer, SynthesizerError};

#[derive(Debug, Serialize)]
struct ClonedRequest<'a> {
    text: &'a str,
    speed: f32,
    pitch: f32,
    reference_audio_base64: String,
    reference_ext: &'a str,
}

#[derive(Debug, Serialize)]
struct BaseRequest<'a> {
    text: &'a str,
    speed: f32,
    pitch: f32,
}

#[derive(Clone)]
pub struct MeloTtsSynthesizer {
    http: reqwest::Client,
    base_url: String,
}

impl MeloTtsSynthesizer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl Synthesizer for MeloTtsSynthesizer {
    async fn synthesize_with_reference(
        &self,
        text: &str,
        ref_bytes: &Bytes,
        ref_ext: &str,
        speed: f32,
        pitch: f32,
    ) -> Result<Bytes, SynthesizerError> {
        use base64::Engine;
        let request = ClonedRequest {
            text,
            speed,
            pitch,
            reference_audio_base64: base64::engine::general_purpose::STANDARD.encode(ref_bytes),
            reference_ext: ref_ext,
        };
        post_for_wav(&self.http, &format!("{}/synthesize/cloned", self.base_url), &request).await
    }

    async fn synthesize_base(
        &self,
        text: &str,
        speed: f32,
        pitch: f32,
    ) -> Result<Bytes, SynthesizerError> {
        let request = BaseRequest { text, speed, pitch };
        post_for_wav(&self.http, &format!("{}/synthesize/base", self.base_url), &request).await
    }
}

async fn post_for_wav(
    http: &reqwest::Client,
    url: &str,
    body: &impl Serialize,
) -> Result<Bytes, SynthesizerError> {
    let response = http
        .post(url)
        .json(body)
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
