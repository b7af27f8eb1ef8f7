//! Video playback seam. Decoding is an external concern: the runtime talks
//! to a `VideoSource` (frame delay, decode-next, current frame index) and a
//! `VideoBackend` that opens sources by path. The built-in `SlateSource`
//! synthesizes a fixed-length frame counter so headless runs and tests can
//! exercise the pacing and end-of-stream handoff without a codec.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Frame delay used when a container reports no usable frame rate: 25 fps.
pub const FALLBACK_FRAME_DELAY_MS: f64 = 40.0;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("failed to open video {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("decode failed in `{source_name}` at frame {frame}")]
    Decode { source_name: String, frame: u64 },
}

pub trait VideoSource: std::fmt::Debug {
    fn name(&self) -> &str;
    /// Milliseconds between successive display frames.
    fn frame_delay_ms(&self) -> f64;
    /// Decode one frame. `Ok(true)` while more frames remain, `Ok(false)` at
    /// end of stream.
    fn decode_next(&mut self) -> Result<bool, VideoError>;
    /// Index of the most recently decoded frame.
    fn current_frame(&self) -> u64;
}

pub trait VideoBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, VideoError>;
}

/// Millisecond decode schedule. Accumulates elapsed wall time and reports how
/// many frames are due; after a stall longer than two frame delays the
/// schedule resynchronizes instead of bursting decodes to catch up.
#[derive(Debug, Clone)]
pub struct FramePacer {
    frame_delay_ms: f64,
    clock_ms: f64,
    next_due_ms: f64,
}

impl FramePacer {
    pub fn new(frame_delay_ms: f64) -> Self {
        let frame_delay_ms = if frame_delay_ms > 0.0 {
            frame_delay_ms
        } else {
            FALLBACK_FRAME_DELAY_MS
        };
        FramePacer {
            frame_delay_ms,
            clock_ms: 0.0,
            next_due_ms: 0.0,
        }
    }

    pub fn frame_delay_ms(&self) -> f64 {
        self.frame_delay_ms
    }

    /// Advance by `dt` seconds and return how many frames are now due.
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.clock_ms += dt as f64 * 1000.0;
        if self.clock_ms - self.next_due_ms > self.frame_delay_ms * 2.0 {
            self.next_due_ms = self.clock_ms + self.frame_delay_ms;
            return 1;
        }
        let mut due = 0;
        while self.clock_ms >= self.next_due_ms {
            self.next_due_ms += self.frame_delay_ms;
            due += 1;
        }
        due
    }
}

/// Synthetic video: `total_frames` blank frames at a fixed rate. Stands in
/// for a real decoder wherever only timing and end-of-stream matter.
#[derive(Debug, Clone)]
pub struct SlateSource {
    name: String,
    frame_delay_ms: f64,
    total_frames: u64,
    decoded: u64,
}

impl SlateSource {
    pub fn new(name: &str, fps: f64, total_frames: u64) -> Self {
        let frame_delay_ms = if fps > 0.0 {
            1000.0 / fps
        } else {
            FALLBACK_FRAME_DELAY_MS
        };
        SlateSource {
            name: name.to_string(),
            frame_delay_ms,
            total_frames,
            decoded: 0,
        }
    }
}

impl VideoSource for SlateSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame_delay_ms(&self) -> f64 {
        self.frame_delay_ms
    }

    fn decode_next(&mut self) -> Result<bool, VideoError> {
        if self.decoded >= self.total_frames {
            return Ok(false);
        }
        self.decoded += 1;
        Ok(true)
    }

    fn current_frame(&self) -> u64 {
        self.decoded.saturating_sub(1)
    }
}

/// Backend that opens any existing file as a `SlateSource`. A missing file is
/// an open failure, which the scene manager turns into an immediate
/// next-scene advance.
#[derive(Debug, Clone)]
pub struct SlateBackend {
    pub fps: f64,
    pub total_frames: u64,
}

impl Default for SlateBackend {
    fn default() -> Self {
        SlateBackend {
            fps: 25.0,
            total_frames: 50,
        }
    }
}

impl VideoBackend for SlateBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, VideoError> {
        if !path.is_file() {
            return Err(VideoError::Open {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("video")
            .to_string();
        Ok(Box::new(SlateSource::new(&name, self.fps, self.total_frames)))
    }
}
