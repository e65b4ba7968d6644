//! Preview image generation.
//!
//! Generation is delegated to a [`MediaProcessor`]. The default
//! [`FfmpegProcessor`] grabs a video frame with the `ffmpeg` executable and
//! resizes raster images with the `image` crate. Callers treat every
//! failure as non-fatal.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::Command;

use image::codecs::jpeg::JpegEncoder;

use crate::{MediaboxError, Result};

/// JPEG quality for generated previews.
const JPEG_QUALITY: u8 = 80;

/// Video previews are grabbed at this fraction of the duration.
const PREVIEW_POSITION: f64 = 0.1;

/// Parse `Duration: HH:MM:SS.ss` from ffmpeg's stderr, in seconds.
fn parse_duration(stderr: &str) -> Option<f64> {
    let start = stderr.find("Duration: ")? + "Duration: ".len();
    let stamp = stderr[start..].split(',').next()?.trim();

    let mut parts = stamp.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// What kind of source a preview is made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    /// A raster image.
    Image,
    /// A video; a representative frame is extracted.
    Video,
}

impl PreviewKind {
    /// Preview kind for a MIME type, if previews are supported for it.
    ///
    /// SVG is excluded since it is not a raster format.
    pub fn for_mime(mime_type: &str) -> Option<Self> {
        if mime_type.starts_with("video/") {
            Some(Self::Video)
        } else if mime_type.starts_with(super::IMAGE_MIME_PREFIX) && mime_type != "image/svg+xml"
        {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// Produces a JPEG preview for a stored file.
pub trait MediaProcessor: Send + Sync {
    /// Write a preview of `source` to `target`.
    fn generate_preview(&self, source: &Path, target: &Path, kind: PreviewKind) -> Result<()>;
}

/// Default processor backed by ffmpeg and the `image` crate.
#[derive(Debug, Clone)]
pub struct FfmpegProcessor {
    ffmpeg_path: String,
    size: u32,
}

impl FfmpegProcessor {
    /// Create a processor producing previews bounded by `size` pixels.
    pub fn new(ffmpeg_path: impl Into<String>, size: u32) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            size,
        }
    }

    fn image_preview(&self, source: &Path, target: &Path) -> Result<()> {
        let img = image::open(source)?;
        let img = if img.width() > self.size || img.height() > self.size {
            img.thumbnail(self.size, self.size)
        } else {
            img
        };

        let mut writer = BufWriter::new(File::create(target)?);
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
            encoder.encode_image(&img.to_rgb8())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a video's duration from ffmpeg's stream banner.
    fn probe_duration(&self, source: &Path) -> Option<f64> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-hide_banner")
            .arg("-i")
            .arg(source)
            .output()
            .ok()?;
        parse_duration(&String::from_utf8_lossy(&output.stderr))
    }

    fn video_preview(&self, source: &Path, target: &Path) -> Result<()> {
        let seek = self
            .probe_duration(source)
            .map(|duration| duration * PREVIEW_POSITION)
            .unwrap_or(0.0);

        let output = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-ss")
            .arg(format!("{seek:.3}"))
            .arg("-i")
            .arg(source)
            .arg("-vf")
            .arg(format!("scale={}:-2", self.size))
            .arg("-frames:v")
            .arg("1")
            .arg(target)
            .output()
            .map_err(|e| {
                MediaboxError::Thumbnail(format!("failed to run {}: {e}", self.ffmpeg_path))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().last().unwrap_or_default();
            return Err(MediaboxError::Thumbnail(format!(
                "ffmpeg exited with {}: {last_line}",
                output.status
            )));
        }
        Ok(())
    }
}

impl MediaProcessor for FfmpegProcessor {
    fn generate_preview(&self, source: &Path, target: &Path, kind: PreviewKind) -> Result<()> {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match kind {
            PreviewKind::Image => self.image_preview(source, target),
            PreviewKind::Video => self.video_preview(source, target),
        }
    }
}
