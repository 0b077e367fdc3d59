// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! deckcast-daemon: process wiring shared by the two worker binaries
//! (`deckcast-cpu-worker`, `deckcast-gpu-worker`) — config/logging
//! bootstrap, store/broker/object-store construction, and the
//! `TTS_ENGINE` → [`Synthesizer`] factory (spec §5, §8.2).

use std::sync::Arc;

use deckcast_broker::Broker;
use deckcast_core::{Config, TtsEngine};
use deckcast_engine::synthesize::{
    ChatterboxSynthesizer, FishSpeechSynthesizer, MeloTtsSynthesizer, NeuphonicSynthesizer, Synthesizer,
};
use deckcast_objectstore::ObjectStore;
use deckcast_storage::{JobStore, TaskStore, VoiceReferenceStore, MIGRATOR};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Resources every worker task body is handed by `Arc` (spec §8.2: "no
/// global mutable config"). Built once at process start.
pub struct Context {
    pub config: Arc<Config>,
    pub job_store: Arc<JobStore>,
    pub task_store: Arc<TaskStore>,
    pub voice_store: Arc<VoiceReferenceStore>,
    pub object_store: Arc<ObjectStore>,
    pub broker: Arc<Broker>,
}

impl Context {
    /// Loads `.env` (if present), parses [`Config`], connects the
    /// Postgres pool and runs pending migrations, and wires up the
    /// object store and broker. Shared by both worker binaries so the two
    /// processes can never drift in how they're constructed.
    pub async fn connect() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Config::from_env()?;

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;
        MIGRATOR.run(&pool).await?;

        let object_store = ObjectStore::connect(
            &config.object_store_url,
            &config.object_store_access_key,
            &config.object_store_secret_key,
        )
        .await;
        let broker = Broker::connect(pool.clone()).await?;

        Ok(Self {
            config: Arc::new(config),
            job_store: Arc::new(JobStore::new(pool.clone())),
            task_store: Arc::new(TaskStore::new(pool.clone())),
            voice_store: Arc::new(VoiceReferenceStore::new(pool)),
            object_store: Arc::new(object_store),
            broker: Arc::new(broker),
        })
    }
}

/// Builds the `TTS_ENGINE`-selected adapter (spec §4.5), boxed so the
/// synthesis worker can be instantiated without a type parameter chosen
/// at compile time.
pub fn build_synthesizer(config: &Config) -> Box<dyn Synthesizer> {
    match config.tts_engine {
        TtsEngine::Melotts => Box::new(MeloTtsSynthesizer::new(config.tts_engine_url.clone())),
        TtsEngine::Neuphonic => Box::new(NeuphonicSynthesizer::new(config.tts_engine_url.clone())),
        TtsEngine::Fishspeech => Box::new(FishSpeechSynthesizer::new(config.tts_engine_url.clone())),
        TtsEngine::Chatterbox => Box::new(ChatterboxSynthesizer::new(config.tts_engine_url.clone())),
    }
}

/// `RUST_LOG`-driven filter, human-readable by default and structured
/// JSON when `LOG_FORMAT=json` (spec §8.1; production deployments set the
/// latter for log-aggregator ingestion).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let json = std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
