//! Key-driven recording through the overlay.

use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use mosaic::prelude::*;
use mosaic::BackendError;
use mosaic_record::avi::AviFile;
use mosaic_harness::{HeadlessBackend, ScriptedKeys};

fn recording_overlay(dir: &Path, script: &str) -> Overlay<HeadlessBackend> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Overlay::new(
        LayoutPreset::two_panel(),
        HeadlessBackend::new().with_keys(ScriptedKeys::from_script(script)),
        OverlayConfig::default()
            .with_recording(true)
            .with_record(RecordConfig::in_dir(dir)),
    )
    .unwrap()
}

fn avi_files(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == "avi"))
        .collect();
    files.sort();
    files
}

#[test]
fn r_then_q_records_every_frame_in_between() {
    let dir = tempfile::tempdir().unwrap();
    // Frames: r (start + record), idle x3 (record), q (stop), idle.
    let mut overlay = recording_overlay(dir.path(), "r...q.");

    let mut recorded = 0;
    let mut stopped = None;
    for i in 0..6u8 {
        overlay
            .update_rgb(&PanelImage::gray(256, 256, i.wrapping_mul(20)))
            .unwrap();
        let report = overlay.refresh().unwrap();
        recorded += usize::from(report.recorded);
        if let Some(CommandOutcome::Stopped(summary)) = report.command {
            stopped = Some(summary);
        }
    }

    assert_eq!(recorded, 4);
    let summary = stopped.unwrap();
    assert_eq!(summary.frames, 4);
    assert_eq!((summary.width, summary.height), (512, 256));

    let avi = AviFile::open(&summary.path).unwrap();
    assert_eq!(avi.frames.len(), 4);
    assert_eq!(avi.fps, 22);
    let frame = avi.decode_frame(3).unwrap().unwrap();
    assert_eq!(frame.dimensions(), (512, 256));
}

#[test]
fn start_start_yields_one_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut overlay = recording_overlay(dir.path(), "rr");

    let first = overlay.refresh().unwrap();
    assert!(matches!(first.command, Some(CommandOutcome::Started(_))));
    let second = overlay.refresh().unwrap();
    assert_eq!(second.command, Some(CommandOutcome::AlreadyRecording));

    let summary = overlay.finish().unwrap().unwrap();
    assert_eq!(summary.frames, 2);
    assert_eq!(avi_files(dir.path()).len(), 1);
}

#[test]
fn stop_then_start_creates_a_distinct_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut overlay = recording_overlay(dir.path(), "rqr");
    for _ in 0..3 {
        overlay.refresh().unwrap();
    }
    let second = overlay.recording_path().unwrap().to_path_buf();
    overlay.finish().unwrap();

    let files = avi_files(dir.path());
    assert_eq!(files.len(), 2);
    assert!(files.contains(&second));
}

#[test]
fn stop_without_start_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let mut overlay = recording_overlay(dir.path(), "q");
    let report = overlay.refresh().unwrap();
    assert_eq!(report.command, Some(CommandOutcome::NotRecording));
    assert!(avi_files(dir.path()).is_empty());
}

#[test]
fn file_name_comes_from_backend_clock() {
    let dir = tempfile::tempdir().unwrap();
    let mut overlay = recording_overlay(dir.path(), "r");
    overlay.refresh().unwrap();
    let name = overlay
        .recording_path()
        .unwrap()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    // The stepping clock starts at 2026-01-01 00:00:00 local.
    assert_eq!(name, "record-20260101-000000.000000.avi");
}

#[test]
fn failed_start_still_presents_the_frame() {
    let dir = tempfile::tempdir().unwrap();
    let mut overlay = recording_overlay(&dir.path().join("missing"), "r");
    let err = overlay.refresh().unwrap_err();
    assert_eq!(err.degradation(), DegradationAction::SkipRecording);
    assert!(!overlay.is_recording());
    assert_eq!(overlay.backend().display.frame_count(), 1);
}

#[test]
fn explicit_recording_control() {
    let dir = tempfile::tempdir().unwrap();
    let mut overlay = recording_overlay(dir.path(), "");
    assert!(overlay.start_recording().unwrap().is_new());
    overlay.refresh().unwrap();
    overlay.refresh().unwrap();
    let summary = overlay.stop_recording().unwrap().unwrap();
    assert_eq!(summary.frames, 2);
    assert_eq!(overlay.stop_recording().unwrap(), None);
}

#[test]
fn key_poll_failure_skips_the_frame() {
    let dir = tempfile::tempdir().unwrap();
    let mut overlay = recording_overlay(dir.path(), "r");
    overlay.backend_mut().keys.fail_next_poll();
    let err = overlay.refresh().unwrap_err();
    assert_eq!(err.degradation(), DegradationAction::SkipFrame);
    assert_eq!(overlay.backend().display.frame_count(), 0);
    // The scripted key is still pending.
    assert!(matches!(
        overlay.refresh().unwrap().command,
        Some(CommandOutcome::Started(_))
    ));
}

#[test]
fn aborted_recording_still_presents_the_frame() {
    let dir = tempfile::tempdir().unwrap();
    // JPEG cannot encode a canvas wider than 65535.
    let preset = LayoutPreset::builder("wide", 65_536, 1)
        .gray_panel(Modality::Rgb, Rect::new(0, 0, 65_536, 1), 100)
        .build()
        .unwrap();
    let mut overlay = Overlay::new(
        preset,
        HeadlessBackend::new().with_keys(ScriptedKeys::from_script("r")),
        OverlayConfig::default()
            .with_recording(true)
            .with_record(RecordConfig::in_dir(dir.path())),
    )
    .unwrap();

    let err = overlay.refresh().unwrap_err();
    assert_eq!(err.degradation(), DegradationAction::SkipRecording);
    assert!(matches!(&err, Error::Record(e) if e.aborted_recording()));
    assert_eq!(overlay.backend().display.frame_count(), 1);
    assert!(!overlay.is_recording());

    let files = avi_files(dir.path());
    assert_eq!(files.len(), 1);
    let avi = AviFile::open(&files[0]).unwrap();
    assert_eq!((avi.width, avi.height), (65_536, 1));
    assert!(avi.frames.is_empty());
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[test]
fn failed_present_logs_the_recorder_error_it_replaces() {
    let dir = tempfile::tempdir().unwrap();
    let mut overlay = recording_overlay(&dir.path().join("missing"), "r");
    overlay.backend_mut().display.fail_next_present();

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .with_writer(move || writer.clone())
        .finish();
    let err = tracing::subscriber::with_default(subscriber, || overlay.refresh().unwrap_err());

    assert!(matches!(err, Error::Backend(BackendError::Present(_))));
    assert_eq!(err.degradation(), DegradationAction::SkipFrame);
    assert!(!overlay.is_recording());
    assert_eq!(overlay.backend().display.frame_count(), 0);
    assert!(!dir.path().join("missing").exists());

    let logged = log.contents();
    assert!(logged.contains("recorder error superseded by failed present"), "{logged}");
    assert!(logged.contains("error_type=\"record\""), "{logged}");
}
