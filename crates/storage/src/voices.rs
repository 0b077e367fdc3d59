// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `VoiceReference` persistence. Not itemized with its own numbered
//! operations in spec §4.1, but needed by the same Job Store component to
//! resolve `Job.voice_ref_id` (spec §4.5 step 2).

use crate::error::StorageError;
use deckcast_core::{UserId, VoiceReference, VoiceReferenceId};
use sqlx::PgPool;

#[derive(Clone)]
pub struct VoiceReferenceStore {
    pool: PgPool,
}

impl VoiceReferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        owner_id: UserId,
        name: &str,
        s3_path: &str,
    ) -> Result<VoiceReference, StorageError> {
        let reference = sqlx::query_as::<_, VoiceReference>(
            r#"
            INSERT INTO voice_references (owner_id, name, s3_path)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, s3_path
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(s3_path)
        .fetch_one(&self.pool)
        .await?;
        Ok(reference)
    }

    pub async fn get(&self, id: VoiceReferenceId) -> Result<Option<VoiceReference>, StorageError> {
        let reference = sqlx::query_as::<_, VoiceReference>(
            "SELECT id, owner_id, name, s3_path FROM voice_references WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(reference)
    }
}

#[cfg(test)]
#[path = "voices_tests.rs"]
mod tests;
