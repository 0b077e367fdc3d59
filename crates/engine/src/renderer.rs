// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slide-renderer HTTP client (spec §4.3 step 5, §6). The renderer is an
//! external collaborator the engine treats as a capability with a single
//! operation: `convert(bucket, object) -> image_paths`.

use std::time::Duration;

use backoff::future::retry;
use backoff::ExponentialBackoffBuilder;
use deckcast_core::{Classify, FailureKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("renderer request failed: {0}")]
    Request(String),

    #[error("renderer returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl Classify for RendererError {
    fn kind(&self) -> FailureKind {
        FailureKind::TransientInfrastructure
    }
}

#[derive(Debug, Serialize)]
struct ConvertRequest<'a> {
    bucket_name: &'a str,
    object_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    image_paths: Vec<String>,
}

/// `POST /convert {bucket_name, object_name} -> {image_paths}`, retrying a
/// 5xx response (or transport error) up to 3 attempts total with 2s then
/// 4s backoff between them (spec §9's open-question normalization); a 4xx
/// is not retried.
#[derive(Clone)]
pub struct RendererClient {
    http: reqwest::Client,
    base_url: String,
}

impl RendererClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn convert(&self, bucket: &str, object: &str) -> Result<Vec<String>, RendererError> {
        // initial=2s, x2 multiplier gives retry delays 2s then 4s; the
        // elapsed-time cap stops the chain before a would-be third delay,
        // bounding the call to exactly 3 attempts.
        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_secs(2))
            .with_multiplier(2.0)
            .with_max_elapsed_time(Some(Duration::from_millis(6_500)))
            .build();

        retry(backoff, || self.try_convert(bucket, object)).await
    }

    async fn try_convert(
        &self,
        bucket: &str,
        object: &str,
    ) -> Result<Vec<String>, backoff::Error<RendererError>> {
        let url = format!("{}/convert", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&ConvertRequest {
                bucket_name: bucket,
                object_name: object,
            })
            .send()
            .await
            .map_err(|e| backoff::Error::transient(RendererError::Request(e.to_string())))?;

        let status = response.status();
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(backoff::Error::transient(RendererError::Status {
                status: status.as_u16(),
                body,
            }));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(backoff::Error::permanent(RendererError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let parsed: ConvertResponse = response
            .json()
            .await
            .map_err(|e| backoff::Error::permanent(RendererError::Request(e.to_string())))?;
        Ok(parsed.image_paths)
    }
}
