// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[sqlx::test(migrations = "./migrations")]
async fn create_and_get_round_trips(pool: PgPool) {
    let store = VoiceReferenceStore::new(pool);
    let created = store
        .create(UserId::new(7), "narrator", "voice-clones/abc.wav")
        .await
        .unwrap();

    let fetched = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "narrator");
    assert_eq!(fetched.s3_path, "voice-clones/abc.wav");
}

#[sqlx::test(migrations = "./migrations")]
async fn get_returns_none_for_missing_id(pool: PgPool) {
    let store = VoiceReferenceStore::new(pool);
    assert!(store.get(VoiceReferenceId::new(99999)).await.unwrap().is_none());
}
