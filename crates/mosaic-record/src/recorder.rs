#![forbid(unsafe_code)]

//! Recorder state machine.
//!
//! ```text
//!          start()                     stop()
//!   Idle ───────────▶ Recording ───────────────▶ Idle
//!    │ stop(): no-op    │ start(): ignored
//!    │                  │ append(): one frame
//!    │                  │ write error: abort ──▶ Idle
//! ```
//!
//! At most one output file is open at a time. Every `start` from `Idle`
//! opens a new, distinct file.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use mosaic_render::{Canvas, ChannelOrder};

use crate::avi::AviWriter;
use crate::config::RecordConfig;
use crate::error::{RecordError, Result};

/// Observable recorder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// Result of [`Recorder::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new file was opened.
    Started(PathBuf),
    /// A recording was already active; nothing changed.
    AlreadyRecording(PathBuf),
}

impl StartOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Started(path) | Self::AlreadyRecording(path) => path,
        }
    }

    pub const fn is_new(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

/// What a finished recording contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSummary {
    pub path: PathBuf,
    pub frames: u32,
    pub width: u32,
    pub height: u32,
}

// Unbuffered, so a failed frame write leaves nothing pending in memory.
struct ActiveRecording {
    writer: AviWriter<File>,
    path: PathBuf,
    jpeg: Vec<u8>,
}

impl ActiveRecording {
    fn summary(&self) -> RecordingSummary {
        let (width, height) = self.writer.size();
        RecordingSummary {
            path: self.path.clone(),
            frames: self.writer.frame_count(),
            width,
            height,
        }
    }

    fn finish(self) -> Result<RecordingSummary> {
        let summary = self.summary();
        self.writer
            .finish()
            .and_then(|file| file.sync_all())
            .map_err(|source| RecordError::Finalize {
                path: summary.path.clone(),
                source,
            })?;
        Ok(summary)
    }

    /// Close after a failed append, keeping every complete frame.
    ///
    /// If the file cannot be repaired it is removed.
    fn salvage(self) -> Result<RecordingSummary> {
        let summary = self.summary();
        let repaired = self
            .writer
            .finish_truncated(|file, len| file.set_len(len))
            .and_then(|file| file.sync_all());
        if let Err(source) = repaired {
            if let Err(err) = fs::remove_file(&summary.path) {
                tracing::warn!(path = %summary.path.display(), error = %err, "failed to remove broken recording");
            }
            return Err(RecordError::Finalize {
                path: summary.path,
                source,
            });
        }
        Ok(summary)
    }
}

/// File stem for a recording started at `now`, e.g. `record-20261016-101112.123456`.
pub fn file_stem_for(prefix: &str, now: &DateTime<Local>) -> String {
    format!("{prefix}-{}", now.format("%Y%m%d-%H%M%S%.6f"))
}

/// Two-state video recorder.
pub struct Recorder {
    config: RecordConfig,
    active: Option<ActiveRecording>,
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("path", &self.path())
            .field("frames", &self.frames())
            .finish()
    }
}

impl Recorder {
    #[must_use]
    pub fn new(config: RecordConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &RecordConfig {
        &self.config
    }

    pub fn state(&self) -> RecorderState {
        if self.active.is_some() {
            RecorderState::Recording
        } else {
            RecorderState::Idle
        }
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Path of the open recording.
    pub fn path(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.path.as_path())
    }

    /// Frames appended to the open recording (0 when idle).
    pub fn frames(&self) -> u32 {
        self.active.as_ref().map_or(0, |a| a.writer.frame_count())
    }

    /// Open a new recording of `width x height` frames.
    ///
    /// Ignored while a recording is active. On failure the recorder stays
    /// idle.
    pub fn start(
        &mut self,
        now: DateTime<Local>,
        width: u32,
        height: u32,
    ) -> Result<StartOutcome> {
        if let Some(active) = &self.active {
            tracing::debug!(path = %active.path.display(), "start ignored, already recording");
            return Ok(StartOutcome::AlreadyRecording(active.path.clone()));
        }

        let problems = self.config.validate();
        if !problems.is_empty() {
            return Err(RecordError::InvalidConfig(problems));
        }

        let dir = &self.config.output_dir;
        if self.config.create_dir {
            fs::create_dir_all(dir).map_err(|source| RecordError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }

        let stem = file_stem_for(&self.config.prefix, &now);
        let (path, file) = create_unique(dir, &stem)?;
        let writer = AviWriter::new(file, width, height, self.config.fps)
            .map_err(|source| RecordError::Open {
                path: path.clone(),
                source,
            })?;

        tracing::info!(
            path = %path.display(),
            width,
            height,
            fps = self.config.fps,
            "recording started"
        );
        self.active = Some(ActiveRecording {
            writer,
            path: path.clone(),
            jpeg: Vec::new(),
        });
        Ok(StartOutcome::Started(path))
    }

    /// Encode `canvas` and append it. No-op while idle.
    ///
    /// A canvas of the wrong size is rejected and the recording continues.
    /// An encode or write failure aborts the recording: the frames written
    /// so far are finalized into a playable file and the recorder goes idle.
    pub fn append(&mut self, canvas: &Canvas) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };

        let (width, height) = active.writer.size();
        if canvas.size() != (width, height) {
            return Err(RecordError::FrameSize {
                width,
                height,
                actual_width: canvas.width(),
                actual_height: canvas.height(),
            });
        }

        let frame = active.writer.frame_count();
        active.jpeg.clear();
        let encoded = JpegEncoder::new_with_quality(&mut active.jpeg, self.config.jpeg_quality)
            .encode(
                &canvas.to_bytes(ChannelOrder::Rgb),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
            .map_err(|source| RecordError::Encode { frame, source });
        let result = encoded.and_then(|()| {
            active
                .writer
                .write_frame(&active.jpeg)
                .map_err(|source| RecordError::Write {
                    path: active.path.clone(),
                    frame,
                    source,
                })
        });

        let Err(err) = result else {
            return Ok(());
        };
        if let Some(active) = self.active.take() {
            match active.salvage() {
                Ok(kept) => tracing::warn!(
                    path = %kept.path.display(),
                    frames_kept = kept.frames,
                    error = %err,
                    "recording aborted"
                ),
                Err(repair) => tracing::warn!(
                    error = %err,
                    repair_error = %repair,
                    "recording aborted and its file removed"
                ),
            }
        }
        Err(err)
    }

    /// Finalize and close the recording. No-op while idle.
    pub fn stop(&mut self) -> Result<Option<RecordingSummary>> {
        let Some(active) = self.active.take() else {
            tracing::debug!("stop ignored, not recording");
            return Ok(None);
        };
        let summary = active.finish()?;
        tracing::info!(
            path = %summary.path.display(),
            frames = summary.frames,
            "recording stopped"
        );
        Ok(Some(summary))
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            let path = active.path.clone();
            if let Err(err) = active.finish() {
                tracing::warn!(path = %path.display(), error = %err, "failed to finalize recording on drop");
            }
        }
    }
}

/// Create `<dir>/<stem>.avi`, or `<stem>-1.avi`, `<stem>-2.avi`... if taken.
fn create_unique(dir: &Path, stem: &str) -> Result<(PathBuf, File)> {
    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("{stem}.avi")
        } else {
            format!("{stem}-{attempt}.avi")
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists && attempt < 1000 => {
                attempt += 1;
            }
            Err(source) => return Err(RecordError::Open { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mosaic_render::{PanelImage, Rgb};

    fn at(secs: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 12, 0, secs).unwrap()
    }

    fn recorder(dir: &Path) -> Recorder {
        Recorder::new(RecordConfig::in_dir(dir))
    }

    #[test]
    fn starts_idle() {
        let rec = Recorder::new(RecordConfig::default());
        assert_eq!(rec.state(), RecorderState::Idle);
        assert_eq!(rec.frames(), 0);
        assert!(rec.path().is_none());
    }

    #[test]
    fn file_stem_uses_prefix_and_timestamp() {
        assert_eq!(file_stem_for("record", &at(5)), "record-20261016-120005.000000");
    }

    #[test]
    fn double_start_opens_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = recorder(dir.path());

        let first = rec.start(at(0), 16, 8).unwrap();
        assert!(first.is_new());
        let second = rec.start(at(1), 16, 8).unwrap();
        assert_eq!(second, StartOutcome::AlreadyRecording(first.path().to_path_buf()));

        rec.stop().unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn stop_without_start_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = recorder(dir.path());
        assert_eq!(rec.stop().unwrap(), None);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn append_while_idle_is_noop() {
        let mut rec = Recorder::new(RecordConfig::in_dir("/nonexistent"));
        rec.append(&Canvas::new(4, 4)).unwrap();
        assert_eq!(rec.state(), RecorderState::Idle);
    }

    #[test]
    fn restart_with_same_timestamp_gets_distinct_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = recorder(dir.path());

        let a = rec.start(at(0), 8, 8).unwrap().path().to_path_buf();
        rec.stop().unwrap();
        let b = rec.start(at(0), 8, 8).unwrap().path().to_path_buf();
        rec.stop().unwrap();

        assert_ne!(a, b);
        assert!(b.to_string_lossy().ends_with("-1.avi"));
    }

    #[test]
    fn summary_counts_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = recorder(dir.path());
        let mut canvas = Canvas::new(32, 16);
        rec.start(at(0), 32, 16).unwrap();
        for v in 0..3 {
            canvas.blit(&PanelImage::gray(8, 8, v * 40), 0, 0).unwrap();
            rec.append(&canvas).unwrap();
        }
        assert_eq!(rec.frames(), 3);
        let summary = rec.stop().unwrap().unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!((summary.width, summary.height), (32, 16));
        assert_eq!(rec.state(), RecorderState::Idle);
    }

    #[test]
    fn wrong_frame_size_keeps_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = recorder(dir.path());
        rec.start(at(0), 8, 8).unwrap();
        let err = rec.append(&Canvas::new(9, 8)).unwrap_err();
        assert!(matches!(err, RecordError::FrameSize { actual_width: 9, .. }));
        assert!(!err.aborted_recording());
        assert!(rec.is_recording());
        rec.append(&Canvas::new(8, 8)).unwrap();
        assert_eq!(rec.frames(), 1);
    }

    #[test]
    fn encode_failure_aborts_and_leaves_a_playable_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = recorder(dir.path());
        // Baseline JPEG caps each dimension at 65535.
        let (width, height) = (u32::from(u16::MAX) + 1, 1);
        let path = rec.start(at(0), width, height).unwrap().path().to_path_buf();

        let err = rec.append(&Canvas::new(width, height)).unwrap_err();
        assert!(matches!(err, RecordError::Encode { frame: 0, .. }));
        assert!(err.aborted_recording());
        assert_eq!(rec.state(), RecorderState::Idle);
        assert_eq!(rec.stop().unwrap(), None);

        let avi = crate::avi::AviFile::open(&path).unwrap();
        assert_eq!((avi.width, avi.height), (width, height));
        assert_eq!(avi.declared_frames, 0);
    }

    #[test]
    fn salvage_drops_partial_chunk_and_keeps_frames() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let mut rec = recorder(dir.path());
        let mut canvas = Canvas::new(16, 16);
        let path = rec.start(at(0), 16, 16).unwrap().path().to_path_buf();
        for v in [10, 200] {
            canvas.fill(Rgb::gray(v));
            rec.append(&canvas).unwrap();
        }

        // What a write cut short by a full disk leaves behind.
        let mut tail = OpenOptions::new().append(true).open(&path).unwrap();
        tail.write_all(b"00dc\xff\xff\x00\x00partial").unwrap();
        drop(tail);

        let kept = rec.active.take().unwrap().salvage().unwrap();
        assert_eq!(kept.frames, 2);
        let avi = crate::avi::AviFile::open(&path).unwrap();
        assert_eq!(avi.declared_frames, 2);
        assert_eq!(avi.frames.len(), 2);
        let last = avi.decode_frame(1).unwrap().unwrap();
        assert!(last.pixels().all(|p| p.0.iter().all(|&c| c.abs_diff(200) <= 2)));
    }

    #[test]
    fn missing_directory_is_reported_and_stays_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = recorder(&dir.path().join("absent"));
        let err = rec.start(at(0), 8, 8).unwrap_err();
        assert!(matches!(err, RecordError::Open { .. }));
        assert_eq!(rec.state(), RecorderState::Idle);
    }

    #[test]
    fn create_dir_option_makes_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("videos");
        let mut rec = Recorder::new(RecordConfig::in_dir(&out).with_create_dir(true));
        rec.start(at(0), 8, 8).unwrap();
        assert!(rec.path().unwrap().starts_with(&out));
    }

    #[test]
    fn invalid_config_refuses_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = Recorder::new(RecordConfig::in_dir(dir.path()).with_fps(0));
        assert!(matches!(
            rec.start(at(0), 8, 8),
            Err(RecordError::InvalidConfig(_))
        ));
    }

    #[test]
    fn drop_finalizes_open_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let mut rec = recorder(dir.path());
            rec.start(at(0), 8, 8).unwrap();
            let mut canvas = Canvas::new(8, 8);
            canvas.fill(Rgb::BLACK);
            rec.append(&canvas).unwrap();
            rec.path().unwrap().to_path_buf()
        };
        let avi = crate::avi::AviFile::open(path).unwrap();
        assert_eq!(avi.declared_frames, 1);
    }
}
