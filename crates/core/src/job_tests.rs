// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn source_uuid_strips_directory_and_extension() {
    let job = Job::builder()
        .source_artifact_key("ingest/abc-123.pptx")
        .build();
    assert_eq!(job.source_uuid(), "abc-123");
}

#[test]
fn source_uuid_handles_no_extension() {
    let job = Job::builder().source_artifact_key("ingest/abc").build();
    assert_eq!(job.source_uuid(), "abc");
}

#[test]
fn pending_progresses_through_the_full_dag() {
    assert!(JobStatus::Pending.can_transition_to(JobStatus::Decomposing));
    assert!(JobStatus::Decomposing.can_transition_to(JobStatus::Synthesizing));
    assert!(JobStatus::Synthesizing.can_transition_to(JobStatus::Assembling));
    assert!(JobStatus::Assembling.can_transition_to(JobStatus::Completed));
}

#[test]
fn cannot_skip_stages() {
    assert!(!JobStatus::Pending.can_transition_to(JobStatus::Assembling));
    assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
}

#[test]
fn any_non_terminal_state_can_fail_or_cancel() {
    for s in [
        JobStatus::Pending,
        JobStatus::Decomposing,
        JobStatus::Synthesizing,
        JobStatus::Assembling,
    ] {
        assert!(s.can_transition_to(JobStatus::Failed));
        assert!(s.can_transition_to(JobStatus::Cancelled));
    }
}

#[test]
fn terminal_states_are_absorbing() {
    for s in [JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled] {
        assert!(s.is_terminal());
        assert!(!s.can_transition_to(JobStatus::Failed));
        assert!(!s.can_transition_to(JobStatus::Pending));
    }
}
