// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

async fn connect(pool: PgPool) -> Broker {
    Broker::connect(pool).await.unwrap()
}

#[sqlx::test(migrations = "../storage/migrations")]
async fn enqueue_returns_an_opaque_external_id(pool: PgPool) {
    let broker = connect(pool).await;
    let external_id = broker
        .enqueue(Queue::Gpu, "synthesize", json!({"job_id": 1, "slide_index": 1}), None)
        .await
        .unwrap();
    assert!(external_id.parse::<i64>().is_ok());
}

#[sqlx::test(migrations = "../storage/migrations")]
async fn inspect_reports_active_after_enqueue(pool: PgPool) {
    let broker = connect(pool).await;
    broker
        .enqueue(Queue::Cpu, "assemble", json!({"job_id": 1}), None)
        .await
        .unwrap();
    let inspection = broker.inspect(Queue::Cpu).await.unwrap();
    assert_eq!(inspection.active, 1);
    assert_eq!(inspection.reserved, 0);
}

#[sqlx::test(migrations = "../storage/migrations")]
async fn revoke_archives_an_unread_message(pool: PgPool) {
    let broker = connect(pool.clone()).await;
    let external_id = broker
        .enqueue(Queue::Gpu, "synthesize", json!({"job_id": 1, "slide_index": 1}), None)
        .await
        .unwrap();

    broker.revoke(Some(&external_id)).await.unwrap();

    let inspection = broker.inspect(Queue::Gpu).await.unwrap();
    assert_eq!(inspection.active, 0);
    assert_eq!(inspection.reserved, 0);
}

#[sqlx::test(migrations = "../storage/migrations")]
async fn revoke_with_no_external_id_is_a_noop(pool: PgPool) {
    let broker = connect(pool).await;
    broker.revoke(None).await.unwrap();
}
