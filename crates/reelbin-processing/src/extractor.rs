//! Video metadata extraction.
//!
//! Extraction is best-effort by contract: enqueueing a file must never fail
//! because its metadata could not be read. A video that ffprobe cannot parse
//! yields `("0:00", None)`; a readable video whose frame capture fails yields
//! its real duration with no thumbnail.

use std::io::Write;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::process::Command;

use reelbin_core::validation::format_duration;

/// JPEG quality for captured thumbnail frames.
const THUMBNAIL_JPEG_QUALITY: u8 = 90;

/// Hard cap on a single ffprobe/ffmpeg invocation.
const TOOL_TIMEOUT: Duration = Duration::from_secs(60);

/// Result of probing one video file.
#[derive(Debug, Clone)]
pub struct ExtractedMetadata {
    /// Display duration, `m:ss` or `h:mm:ss`; `"0:00"` when unreadable.
    pub duration: String,
    /// JPEG thumbnail captured from an early frame, if capture succeeded.
    pub thumbnail: Option<Bytes>,
}

impl ExtractedMetadata {
    fn unreadable() -> Self {
        Self {
            duration: "0:00".to_string(),
            thumbnail: None,
        }
    }
}

/// Seek point for the thumbnail frame: one second in, or 10% of the video
/// for clips shorter than ten seconds.
pub(crate) fn thumbnail_seek_seconds(duration_seconds: f64) -> f64 {
    (duration_seconds * 0.1).min(1.0)
}

/// Parse the duration out of `ffprobe -of json -show_entries format=duration` output.
pub(crate) fn parse_ffprobe_duration(output: &[u8]) -> Option<f64> {
    let value: serde_json::Value = serde_json::from_slice(output).ok()?;
    let duration = value.get("format")?.get("duration")?.as_str()?;
    duration.parse::<f64>().ok().filter(|d| d.is_finite() && *d > 0.0)
}

/// Probes uploaded videos with external ffprobe/ffmpeg binaries.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl MetadataExtractor {
    pub fn new(ffmpeg_path: impl Into<String>, ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Probe one video. Never fails; degrades per the ladder described in the
    /// module docs. The spilled temp file is removed on every exit path.
    pub async fn extract(&self, filename: &str, data: &[u8]) -> ExtractedMetadata {
        let temp = match self.spill_to_tempfile(filename, data) {
            Ok(temp) => temp,
            Err(e) => {
                tracing::warn!(error = %e, filename, "Failed to spill video for probing");
                return ExtractedMetadata::unreadable();
            }
        };
        let path = temp.path().to_string_lossy().to_string();

        let duration_seconds = match self.probe_duration_seconds(&path).await {
            Ok(secs) => secs,
            Err(e) => {
                tracing::debug!(error = %e, filename, "ffprobe could not read video metadata");
                return ExtractedMetadata::unreadable();
            }
        };
        let duration = format_duration(duration_seconds);

        let seek = thumbnail_seek_seconds(duration_seconds);
        let thumbnail = match self.capture_frame(&path, seek).await {
            Ok(jpeg) => Some(Bytes::from(jpeg)),
            Err(e) => {
                tracing::debug!(error = %e, filename, seek, "Thumbnail capture failed");
                None
            }
        };

        ExtractedMetadata { duration, thumbnail }
    }

    /// Write the bytes to a named temp file, keeping the source extension so
    /// the tools can use it as a container hint.
    fn spill_to_tempfile(&self, filename: &str, data: &[u8]) -> Result<tempfile::NamedTempFile> {
        let suffix = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let mut temp = tempfile::Builder::new()
            .prefix("reelbin-probe-")
            .suffix(&suffix)
            .tempfile()
            .context("Failed to create temp file")?;
        temp.write_all(data).context("Failed to write temp file")?;
        temp.flush().context("Failed to flush temp file")?;
        Ok(temp)
    }

    async fn probe_duration_seconds(&self, path: &str) -> Result<f64> {
        let output = tokio::time::timeout(
            TOOL_TIMEOUT,
            Command::new(&self.ffprobe_path)
                .args([
                    "-v",
                    "error",
                    "-show_entries",
                    "format=duration",
                    "-of",
                    "json",
                ])
                .arg(path)
                .stdin(Stdio::null())
                .output(),
        )
        .await
        .context("ffprobe timed out")?
        .context("Failed to run ffprobe")?;

        if !output.status.success() {
            anyhow::bail!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_ffprobe_duration(&output.stdout)
            .ok_or_else(|| anyhow::anyhow!("No duration in ffprobe output"))
    }

    /// Grab one frame at `seek` seconds and re-encode it as JPEG.
    async fn capture_frame(&self, path: &str, seek: f64) -> Result<Vec<u8>> {
        let output = tokio::time::timeout(
            TOOL_TIMEOUT,
            Command::new(&self.ffmpeg_path)
                .args(["-v", "error", "-ss", &format!("{:.3}", seek), "-i"])
                .arg(path)
                .args(["-frames:v", "1", "-f", "image2", "-c:v", "png", "pipe:1"])
                .stdin(Stdio::null())
                .output(),
        )
        .await
        .context("ffmpeg timed out")?
        .context("Failed to run ffmpeg")?;

        if !output.status.success() || output.stdout.is_empty() {
            anyhow::bail!(
                "ffmpeg frame capture failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let frame = image::load_from_memory(&output.stdout)
            .context("Failed to decode captured frame")?;

        let mut jpeg = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            &mut jpeg,
            THUMBNAIL_JPEG_QUALITY,
        );
        frame
            .write_with_encoder(encoder)
            .context("Failed to encode thumbnail JPEG")?;

        Ok(jpeg)
    }
}
