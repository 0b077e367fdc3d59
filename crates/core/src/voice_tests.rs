// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn resolves_builtin_sentinel() {
    let vref = VoiceReference::builder().s3_path("builtin://en-default").build();
    assert_eq!(
        vref.resolve(),
        Some(VoiceSource::Builtin {
            speaker_id: "en-default"
        })
    );
}

#[test]
fn resolves_uploaded_object_store_path() {
    let vref = VoiceReference::builder()
        .s3_path("voice-clones/abc.wav")
        .build();
    assert_eq!(
        vref.resolve(),
        Some(VoiceSource::Uploaded {
            bucket: "voice-clones",
            key: "abc.wav"
        })
    );
}

#[test]
fn leading_slash_is_tolerated() {
    let vref = VoiceReference::builder()
        .s3_path("/voice-clones/abc.wav")
        .build();
    assert_eq!(
        vref.resolve(),
        Some(VoiceSource::Uploaded {
            bucket: "voice-clones",
            key: "abc.wav"
        })
    );
}

#[test]
fn malformed_path_resolves_to_none() {
    let vref = VoiceReference::builder().s3_path("not-a-path").build();
    assert_eq!(vref.resolve(), None);
}
