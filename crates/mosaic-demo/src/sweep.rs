#![forbid(unsafe_code)]

//! Brightness sweep over the RGB panel.
//!
//! Each frame refreshes the overlay, then replaces the RGB panel with a flat
//! gray one step brighter than the last. The level wraps past 255.

use std::time::Duration;

use mosaic::{Backend, DegradationAction, Error, Modality, Overlay, PanelImage, Result};

/// The first update blacks out the RGB panel.
pub const DEFAULT_START: u8 = 0;
pub const DEFAULT_STEP: u8 = 20;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

/// Sweep parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Stop after this many frames; `None` runs until the display closes.
    pub frames: Option<u64>,
    /// Sleep between frames.
    pub interval: Duration,
    pub start: u8,
    pub step: u8,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            frames: None,
            interval: DEFAULT_INTERVAL,
            start: DEFAULT_START,
            step: DEFAULT_STEP,
        }
    }
}

impl SweepConfig {
    #[must_use]
    pub fn with_frames(mut self, frames: u64) -> Self {
        self.frames = Some(frames);
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: u8) -> Self {
        self.step = step;
        self
    }
}

/// What a sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Refreshes attempted.
    pub frames: u64,
    /// Frames written to a recording.
    pub recorded: u64,
    /// Frames that returned a recoverable error.
    pub degraded: u64,
    /// Whether the loop ended because the display went away.
    pub closed: bool,
    /// Gray level of the last RGB update.
    pub last_level: u8,
}

/// Drive `overlay` until the frame limit is reached or the display closes.
///
/// Recoverable errors are logged and counted; the loop keeps going. An
/// error that asks for shutdown ends the sweep without failing it.
pub fn run_sweep<B: Backend>(overlay: &mut Overlay<B>, config: &SweepConfig) -> Result<SweepStats> {
    let Some(rgb) = overlay.preset().panel(Modality::Rgb).copied() else {
        return Err(mosaic::UpdateError::UnknownModality {
            preset: overlay.preset().name().to_string(),
            modality: Modality::Rgb,
        }
        .into());
    };
    let (width, height) = rgb.size();

    let mut stats = SweepStats {
        last_level: config.start,
        ..SweepStats::default()
    };
    let mut level = config.start;

    while config.frames.is_none_or(|limit| stats.frames < limit) {
        stats.frames += 1;
        match overlay.refresh() {
            Ok(report) => {
                if report.recorded {
                    stats.recorded += 1;
                }
            }
            Err(err) => match err.degradation() {
                DegradationAction::Shutdown => {
                    tracing::info!(frame = stats.frames, error = %err, "sweep stopping");
                    stats.closed = matches!(err, Error::Backend(mosaic::BackendError::Closed));
                    break;
                }
                action => {
                    tracing::warn!(frame = stats.frames, ?action, error = %err, "frame degraded");
                    stats.degraded += 1;
                }
            },
        }

        overlay.update_rgb(&PanelImage::gray(width, height, level))?;
        stats.last_level = level;
        level = level.wrapping_add(config.step);

        if !config.interval.is_zero() {
            std::thread::sleep(config.interval);
        }
    }

    tracing::debug!(?stats, "sweep finished");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic::{LayoutPreset, OverlayConfig, RecordConfig, Rgb};
    use mosaic_harness::{HeadlessBackend, ScriptedKeys};

    fn quick(frames: u64) -> SweepConfig {
        SweepConfig::default()
            .with_frames(frames)
            .with_interval(Duration::ZERO)
    }

    fn overlay(preset: LayoutPreset) -> Overlay<HeadlessBackend> {
        Overlay::new(preset, HeadlessBackend::new(), OverlayConfig::default()).unwrap()
    }

    #[test]
    fn sweep_brightens_rgb_panel_each_frame() {
        let mut ov = overlay(LayoutPreset::two_panel());
        let stats = run_sweep(&mut ov, &quick(3)).unwrap();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.last_level, 40);
        // RGB panel is the right half of the two-panel canvas.
        assert_eq!(ov.canvas().get(300, 10), Some(Rgb::gray(40)));
        // Physics keeps its placeholder.
        assert_eq!(ov.canvas().get(10, 10), Some(Rgb::gray(140)));
        assert_eq!(ov.backend().display.frame_count(), 3);
    }

    #[test]
    fn first_presented_frame_shows_placeholders() {
        let mut ov = overlay(LayoutPreset::six_panel());
        run_sweep(&mut ov, &quick(1)).unwrap();
        assert_eq!(ov.frame_count(), 1);
        let first = ov.backend().display.last_frame().unwrap();
        assert_eq!(first.get(10, 10), Some(Rgb::gray(100)));
        assert_eq!(first.get(600, 10), Some(Rgb::gray(120)));
    }

    #[test]
    fn default_sweep_starts_from_black() {
        assert_eq!(SweepConfig::default().start, 0);
        let mut ov = overlay(LayoutPreset::two_panel());
        let stats = run_sweep(&mut ov, &quick(1)).unwrap();
        assert_eq!(stats.last_level, 0);
        assert_eq!(ov.canvas().get(300, 10), Some(Rgb::BLACK));
    }

    #[test]
    fn level_wraps_past_255() {
        let mut ov = overlay(LayoutPreset::four_panel());
        let cfg = SweepConfig {
            start: 240,
            ..quick(3)
        };
        let stats = run_sweep(&mut ov, &cfg).unwrap();
        assert_eq!(stats.last_level, 24);
    }

    #[test]
    fn closed_display_ends_sweep() {
        let mut ov = overlay(LayoutPreset::two_panel());
        ov.backend_mut().display.close();
        let stats = run_sweep(&mut ov, &quick(10)).unwrap();
        assert!(stats.closed);
        assert_eq!(stats.frames, 1);
    }

    #[test]
    fn failed_present_is_counted_and_skipped() {
        let mut ov = overlay(LayoutPreset::two_panel());
        ov.backend_mut().display.fail_next_present();
        let stats = run_sweep(&mut ov, &quick(3)).unwrap();
        assert_eq!(stats.degraded, 1);
        assert_eq!(ov.backend().display.frame_count(), 2);
    }

    #[test]
    fn scripted_keys_record_part_of_the_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let config = OverlayConfig::default()
            .with_recording(true)
            .with_record(RecordConfig::in_dir(dir.path()));
        let backend = HeadlessBackend::new().with_keys(ScriptedKeys::from_script(".r..q."));
        let mut ov = Overlay::new(LayoutPreset::two_panel(), backend, config).unwrap();

        let stats = run_sweep(&mut ov, &quick(6)).unwrap();
        assert_eq!(stats.recorded, 3);
        assert!(!ov.is_recording());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn preset_without_rgb_is_rejected() {
        let preset = LayoutPreset::builder("depth-only", 8, 8)
            .gray_panel(Modality::Depth, mosaic::Rect::square(0, 0, 8), 120)
            .build()
            .unwrap();
        let mut ov = overlay(preset);
        assert!(run_sweep(&mut ov, &quick(1)).is_err());
        assert_eq!(ov.frame_count(), 0);
    }
}
