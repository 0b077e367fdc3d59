// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn canonical_path_round_trips() {
    let path = CanonicalPath::new("output", "42.mp4");
    assert_eq!(path.render(), "/output/42.mp4");
    assert_eq!(CanonicalPath::parse(&path.render()).as_ref(), Some(&path));
}

#[test]
fn parse_rejects_paths_without_a_key() {
    assert_eq!(CanonicalPath::parse("/bucket"), None);
    assert_eq!(CanonicalPath::parse("/"), None);
}

#[test]
fn notes_and_video_use_job_id_images_and_audio_use_job_uuid() {
    let job_id = JobId::new(42);
    assert_eq!(
        ArtifactPaths::notes(job_id, 3).render(),
        "/presentations/42/notes/slide_3.txt"
    );
    assert_eq!(ArtifactPaths::output(job_id).render(), "/output/42.mp4");
    assert_eq!(
        ArtifactPaths::audio("abc-uuid", 3).render(),
        "/presentations/abc-uuid/audio/slide_3.wav"
    );
    let (bucket, prefix) = ArtifactPaths::images_prefix("abc-uuid");
    assert_eq!((bucket, prefix.as_str()), ("presentations", "abc-uuid/images/"));
}
