// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn set_required_vars() {
    std::env::set_var("DATABASE_URL", "postgres://localhost/deckcast");
    std::env::set_var("BROKER_URL", "postgres://localhost/deckcast");
    std::env::set_var("RESULT_BACKEND_URL", "postgres://localhost/deckcast");
    std::env::set_var("OBJECT_STORE_URL", "http://localhost:9000");
    std::env::set_var("OBJECT_STORE_ACCESS_KEY", "minioadmin");
    std::env::set_var("OBJECT_STORE_SECRET_KEY", "minioadmin");
    std::env::set_var("RENDERER_URL", "http://localhost:8100");
}

fn clear_all_vars() {
    for key in [
        "DATABASE_URL",
        "BROKER_URL",
        "RESULT_BACKEND_URL",
        "OBJECT_STORE_URL",
        "OBJECT_STORE_ACCESS_KEY",
        "OBJECT_STORE_SECRET_KEY",
        "RENDERER_URL",
        "TTS_ENGINE",
        "TTS_SOFT_TIME_LIMIT",
        "TTS_HARD_TIME_LIMIT",
        "ASSEMBLY_BARRIER_DEADLINE",
        "WORKER_CONCURRENCY",
        "GPU_WORKER_CONCURRENCY",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn defaults_apply_when_optional_vars_are_absent() {
    clear_all_vars();
    set_required_vars();
    let config = Config::from_env().unwrap();
    assert_eq!(config.tts_engine, TtsEngine::Melotts);
    assert_eq!(config.tts_soft_time_limit, Duration::from_secs(300));
    assert_eq!(config.tts_hard_time_limit, Duration::from_secs(360));
    assert_eq!(config.assembly_barrier_deadline, Duration::from_secs(600));
    assert_eq!(config.tts_engine_url, "http://localhost:8100");
    assert_eq!(config.worker_concurrency, 4);
    assert_eq!(config.gpu_worker_concurrency, 1);
}

#[test]
#[serial]
fn missing_required_var_is_an_error() {
    clear_all_vars();
    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
}

#[test]
#[serial]
fn tts_engine_parses_case_insensitively() {
    clear_all_vars();
    set_required_vars();
    std::env::set_var("TTS_ENGINE", "FishSpeech");
    let config = Config::from_env().unwrap();
    assert_eq!(config.tts_engine, TtsEngine::Fishspeech);
    std::env::remove_var("TTS_ENGINE");
}
