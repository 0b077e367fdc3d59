// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! deckcast-broker: the `cpu`/`gpu` work queues (spec §5/§6), realized on
//! `pgmq` against the same Postgres instance as the job store — no second
//! infrastructure dependency, at-least-once delivery by construction.
//!
//! `revoke` cannot assume the broker can interrupt a task already being
//! executed (spec §9), so it is split into two best-effort halves: an
//! opportunistic archive of the not-yet-read pgmq message, and a row in
//! `task_cancellations` that a running worker polls between suspension
//! points.

pub mod error;

pub use error::BrokerError;

use deckcast_core::TaskId;
use pgmq::PGMQueueExt;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// The two named queues from spec §5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Queue {
    Cpu,
    Gpu,
}

impl Queue {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
        }
    }
}

/// Wire payload for every message the engine enqueues (spec §6:
/// `enqueue(queue, task_name, args, task_id?)`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMessage {
    pub task_name: String,
    pub args: serde_json::Value,
    pub task_id: Option<TaskId>,
}

/// Read-out for dashboards (spec §6: `inspect(queue) -> {active, reserved, stats}`).
/// Non-essential to correctness, as the spec notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueInspection {
    pub active: i64,
    pub reserved: i64,
}

/// One message read off a queue: pgmq's own delivery bookkeeping plus the
/// decoded [`TaskMessage`] payload.
#[derive(Debug, Clone)]
pub struct ReceivedTask {
    pub msg_id: i64,
    pub message: TaskMessage,
    pub read_count: i32,
}

#[derive(Clone)]
pub struct Broker {
    pool: PgPool,
    queue: PGMQueueExt,
}

impl Broker {
    pub async fn connect(pool: PgPool) -> Result<Self, BrokerError> {
        let queue = PGMQueueExt::new_with_pool(pool.clone()).await;
        queue
            .create(Queue::Cpu.as_str())
            .await
            .map_err(|e| BrokerError::Queue(e.to_string()))?;
        queue
            .create(Queue::Gpu.as_str())
            .await
            .map_err(|e| BrokerError::Queue(e.to_string()))?;
        Ok(Self { pool, queue })
    }

    /// Enqueues a message, returning the opaque external id workers record
    /// on the task row for later cancellation (spec §4.3 step 7).
    pub async fn enqueue(
        &self,
        queue: Queue,
        task_name: &str,
        args: serde_json::Value,
        task_id: Option<TaskId>,
    ) -> Result<String, BrokerError> {
        let message = TaskMessage {
            task_name: task_name.to_string(),
            args,
            task_id,
        };
        let msg_id: i64 = self
            .queue
            .send(queue.as_str(), &message)
            .await
            .map_err(|e| BrokerError::Queue(e.to_string()))?;
        Ok(msg_id.to_string())
    }

    /// Broadcasts revoke across all queues (spec §6: "affecting all
    /// queues"). Archives the message if it hasn't been read yet. Does not
    /// itself raise the cooperative-cancellation flag — callers pair this
    /// with `TaskStore::request_cancellation` (split so the cancellation
    /// orchestrator can depend on the two capabilities independently, per
    /// spec §9's guidance against broker-coupled cancellation).
    pub async fn revoke(&self, external_id: Option<&str>) -> Result<(), BrokerError> {
        if let Some(msg_id) = external_id.and_then(|id| id.parse::<i64>().ok()) {
            for queue in [Queue::Cpu, Queue::Gpu] {
                let _ = self.queue.archive(queue.as_str(), msg_id).await;
            }
        }
        Ok(())
    }

    /// Reads one message off `queue`, hiding it from other readers for
    /// `visibility_timeout_secs` (pgmq's standard lease). Workers must
    /// call [`Self::ack`] once the task is settled; an un-acked message
    /// reappears for redelivery once its visibility timeout lapses,
    /// giving the at-least-once semantics spec §6 calls for.
    pub async fn receive(
        &self,
        queue: Queue,
        visibility_timeout_secs: i32,
    ) -> Result<Option<ReceivedTask>, BrokerError> {
        let message = self
            .queue
            .read::<TaskMessage>(queue.as_str(), Some(visibility_timeout_secs))
            .await
            .map_err(|e| BrokerError::Queue(e.to_string()))?;
        Ok(message.map(|m| ReceivedTask {
            msg_id: m.msg_id,
            message: m.message,
            read_count: m.read_ct,
        }))
    }

    /// Deletes a message a worker has fully processed. Idempotent: acking
    /// an id that no longer exists (already deleted, or archived by a
    /// concurrent [`Self::revoke`]) is not an error.
    pub async fn ack(&self, queue: Queue, msg_id: i64) -> Result<(), BrokerError> {
        self.queue
            .delete(queue.as_str(), msg_id)
            .await
            .map_err(|e| BrokerError::Queue(e.to_string()))?;
        Ok(())
    }

    /// Queries pgmq's own table directly for dashboard counts: `active`
    /// messages are those whose visibility timeout has elapsed (eligible
    /// for immediate read), `reserved` are currently checked out by a
    /// worker.
    pub async fn inspect(&self, queue: Queue) -> Result<QueueInspection, BrokerError> {
        let table = format!("pgmq.q_{}", queue.as_str());
        let row: (i64, i64) = sqlx::query_as(&format!(
            r#"
            SELECT
                count(*) FILTER (WHERE vt <= now()) AS active,
                count(*) FILTER (WHERE vt > now()) AS reserved
            FROM {table}
            "#
        ))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| BrokerError::Queue(e.to_string()))?;
        Ok(QueueInspection {
            active: row.0,
            reserved: row.1,
        })
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
