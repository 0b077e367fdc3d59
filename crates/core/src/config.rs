// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process configuration (spec §6's enumerated table). Constructed once at
//! program start with [`Config::from_env`] and handed to workers by `Arc`
//! — no global mutable singleton, per §9's re-architecture guidance.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// TTS engine selection (spec §6). Only `MeloTts` guarantees
/// `synthesize_with_reference` (voice cloning); see spec §4.5.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsEngine {
    Melotts,
    Neuphonic,
    Fishspeech,
    Chatterbox,
}

impl Default for TtsEngine {
    fn default() -> Self {
        Self::Melotts
    }
}

impl std::str::FromStr for TtsEngine {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "melotts" => Ok(Self::Melotts),
            "neuphonic" => Ok(Self::Neuphonic),
            "fishspeech" => Ok(Self::Fishspeech),
            "chatterbox" => Ok(Self::Chatterbox),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub broker_url: String,
    pub result_backend_url: String,
    pub object_store_url: String,
    pub object_store_access_key: String,
    pub object_store_secret_key: String,
    pub tts_engine: TtsEngine,
    pub tts_soft_time_limit: Duration,
    pub tts_hard_time_limit: Duration,
    pub assembly_barrier_deadline: Duration,
    pub renderer_url: String,
    /// Base URL of the selected `tts_engine`'s model server. Not named in
    /// spec §6's table (the original addresses each engine by an
    /// engine-specific settings block); defaulted rather than required so
    /// deployments pinning `TTS_ENGINE=melotts` don't need to set it.
    pub tts_engine_url: String,
    /// Bound on concurrently in-flight task bodies per worker process
    /// (spec §5's "configurable concurrency limit"). Read by
    /// `deckcast-cpu-worker`; the CPU queue is genuinely parallel across
    /// processes and within one.
    pub worker_concurrency: usize,
    /// Bound on concurrently in-flight `synthesize` tasks per GPU worker
    /// process. Defaults to 1: spec §5 requires the GPU be "owned
    /// exclusively by one task at a time per worker process" (serial per
    /// GPU, parallel only across separate GPU-owning processes). Raising
    /// this is only correct for a process that shards multiple GPUs
    /// behind one worker.
    pub gpu_worker_concurrency: usize,
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn duration_secs(key: &'static str, default_secs: u64) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}

fn with_default(key: &'static str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn usize_with_default(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<usize>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from the process environment. Callers that want
    /// `.env` support load one with `dotenvy::dotenv().ok()` before calling
    /// this (see `deckcast-daemon`'s entrypoints).
    pub fn from_env() -> Result<Self, ConfigError> {
        let tts_engine = match std::env::var("TTS_ENGINE") {
            Ok(raw) => raw
                .parse::<TtsEngine>()
                .map_err(|_| ConfigError::Invalid { key: "TTS_ENGINE", value: raw })?,
            Err(_) => TtsEngine::default(),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            broker_url: required("BROKER_URL")?,
            result_backend_url: required("RESULT_BACKEND_URL")?,
            object_store_url: required("OBJECT_STORE_URL")?,
            object_store_access_key: required("OBJECT_STORE_ACCESS_KEY")?,
            object_store_secret_key: required("OBJECT_STORE_SECRET_KEY")?,
            tts_engine,
            tts_soft_time_limit: duration_secs("TTS_SOFT_TIME_LIMIT", 300)?,
            tts_hard_time_limit: duration_secs("TTS_HARD_TIME_LIMIT", 360)?,
            assembly_barrier_deadline: duration_secs("ASSEMBLY_BARRIER_DEADLINE", 600)?,
            renderer_url: required("RENDERER_URL")?,
            tts_engine_url: with_default("TTS_ENGINE_URL", "http://localhost:8100"),
            worker_concurrency: usize_with_default("WORKER_CONCURRENCY", 4)?,
            gpu_worker_concurrency: usize_with_default("GPU_WORKER_CONCURRENCY", 1)?,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
