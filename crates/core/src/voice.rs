// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Voice reference: a named pointer to either an uploaded voice clip or a
//! built-in engine speaker (spec §3).

use crate::ids::{UserId, VoiceReferenceId};
use serde::{Deserialize, Serialize};

/// `builtin://<id>` scheme prefix marking an engine built-in speaker
/// instead of an object-store key.
pub const BUILTIN_SCHEME: &str = "builtin://";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VoiceReference {
    pub id: VoiceReferenceId,
    pub owner_id: UserId,
    pub name: String,
    /// Either an object-store key (`voice-clones/{uuid}.wav`) or a
    /// `builtin://<id>` sentinel.
    pub s3_path: String,
}

/// Resolution of a [`VoiceReference`]'s `s3_path` (spec §4.5 step 2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSource<'a> {
    /// `speaker_id` is the portion after `builtin://`.
    Builtin { speaker_id: &'a str },
    /// `bucket`/`key` to load reference audio bytes from.
    Uploaded { bucket: &'a str, key: &'a str },
}

impl VoiceReference {
    /// Resolve this reference's source, per §4.5 step 2. Returns `None` for
    /// an uploaded path that isn't `bucket/key` shaped — callers should
    /// treat that as an input-invalid error (spec §7, taxonomy kind 2).
    pub fn resolve(&self) -> Option<VoiceSource<'_>> {
        if let Some(speaker_id) = self.s3_path.strip_prefix(BUILTIN_SCHEME) {
            return Some(VoiceSource::Builtin { speaker_id });
        }
        let trimmed = self.s3_path.trim_start_matches('/');
        let (bucket, key) = trimmed.split_once('/')?;
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(VoiceSource::Uploaded { bucket, key })
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct VoiceReferenceBuilder => VoiceReference {
        set { id: VoiceReferenceId = VoiceReferenceId::new(1) }
        set { owner_id: UserId = UserId::new(1) }
        into { name: String = "default" }
        into { s3_path: String = "voice-clones/00000000-0000-0000-0000-000000000000.wav" }
    }
}

#[cfg(test)]
#[path = "voice_tests.rs"]
mod tests;
