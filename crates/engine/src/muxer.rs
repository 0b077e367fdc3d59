// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Video muxing (spec §4.4 Phase B, §6). The muxer is an external
//! collaborator invoked as a subprocess: `ffmpeg`'s concat demuxer over an
//! ordered list of per-slide `(image, audio)` pairs, writing H.264 video +
//! AAC audio with each image held for the duration of its paired clip.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use deckcast_core::{Classify, FailureKind};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum MuxerError {
    #[error("failed to spawn ffmpeg: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("ffmpeg exited with status {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("empty pair list")]
    EmptyInput,
}

impl Classify for MuxerError {
    fn kind(&self) -> FailureKind {
        FailureKind::TransientInfrastructure
    }
}

/// One slide's visual and its paired narration.
#[derive(Debug, Clone)]
pub struct SlidePair {
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
}

/// Capability for turning an ordered slide sequence into a single MP4.
/// A trait, not a bare function, so tests can substitute a fake that
/// writes a stub file instead of shelling out to a real `ffmpeg` binary.
#[async_trait::async_trait]
pub trait Muxer: Send + Sync {
    async fn mux(&self, pairs: &[SlidePair], output_path: &Path) -> Result<(), MuxerError>;
}

#[derive(Debug, Clone, Default)]
pub struct FfmpegMuxer {
    binary: Option<String>,
}

impl FfmpegMuxer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: Some(binary.into()),
        }
    }

    fn binary_name(&self) -> &str {
        self.binary.as_deref().unwrap_or("ffmpeg")
    }
}

#[async_trait::async_trait]
impl Muxer for FfmpegMuxer {
    async fn mux(&self, pairs: &[SlidePair], output_path: &Path) -> Result<(), MuxerError> {
        if pairs.is_empty() {
            return Err(MuxerError::EmptyInput);
        }

        // Build a per-slide clip by holding the image for the audio's
        // duration, then concat the clips. ffmpeg's `-loop 1 -i image
        // -i audio -shortest` pattern produces exactly that for one pair;
        // `filter_complex concat` chains N of them in a single invocation
        // so there is no intermediate-file cleanup to manage.
        let mut cmd = Command::new(self.binary_name());
        cmd.arg("-y");
        for pair in pairs {
            cmd.arg("-loop").arg("1").arg("-i").arg(&pair.image_path);
            cmd.arg("-i").arg(&pair.audio_path);
        }

        let mut filter = String::new();
        for (i, _) in pairs.iter().enumerate() {
            let video_in = i * 2;
            let audio_in = i * 2 + 1;
            filter.push_str(&format!(
                "[{video_in}:v]scale=trunc(iw/2)*2:trunc(ih/2)*2,setsar=1,fps=25[v{i}];"
            ));
            filter.push_str(&format!("[v{i}][{audio_in}:a]concat=n=1:v=1:a=1[outv{i}][outa{i}];"));
        }
        let concat_inputs: String = (0..pairs.len())
            .map(|i| format!("[outv{i}][outa{i}]"))
            .collect();
        filter.push_str(&format!(
            "{concat_inputs}concat=n={}:v=1:a=1[v][a]",
            pairs.len()
        ));

        cmd.arg("-filter_complex")
            .arg(filter)
            .arg("-map")
            .arg("[v]")
            .arg("-map")
            .arg("[a]")
            .arg("-c:v")
            .arg("libx264")
            .arg("-c:a")
            .arg("aac")
            .arg("-shortest")
            .arg(output_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(MuxerError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "muxer_tests.rs"]
mod tests;
