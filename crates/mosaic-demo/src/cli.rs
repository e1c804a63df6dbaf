#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, TimeDelta};
use clap::{Args, Parser, Subcommand};
use mosaic::{Backend, LayoutPreset, Overlay, OverlayConfig, PresetKind};
use mosaic_harness::{HeadlessBackend, ScriptedKeys, SteppingClock};

use crate::error::{DemoError, Result};
use crate::sweep::{DEFAULT_STEP, SweepConfig, run_sweep};

#[derive(Debug, Parser)]
#[command(
    name = "mosaic-demo",
    about = "Panel overlay sweep demo: press r to record, q to stop",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the brightness sweep on one preset.
    Run(RunArgs),
    /// Print the built-in presets and their panels.
    ListPresets,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Built-in preset (two, four, six). Overrides the config file.
    #[arg(long)]
    pub preset: Option<PresetKind>,

    /// Stop after this many frames. Runs until the window closes otherwise.
    #[arg(long)]
    pub frames: Option<u64>,

    /// Delay between frames in milliseconds.
    #[arg(long, default_value_t = 200)]
    pub interval_ms: u64,

    /// Brightness step per frame.
    #[arg(long, default_value_t = DEFAULT_STEP)]
    pub step: u8,

    /// Enable the r/q recording keys.
    #[arg(long)]
    pub record: bool,

    /// Directory for recordings.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// TOML or JSON overlay config.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Open a native window instead of running headless.
    #[arg(long)]
    pub window: bool,

    /// Keys fed to a headless run, one per frame; `.` means no key.
    #[arg(long, default_value = "")]
    pub script: String,
}

impl RunArgs {
    /// Resolve the overlay config: file first, then command-line overrides.
    pub fn overlay_config(&self) -> Result<OverlayConfig> {
        let mut config = match &self.config {
            Some(path) => OverlayConfig::load(path)?,
            None => OverlayConfig::default(),
        };
        if let Some(kind) = self.preset {
            config = config.with_preset(kind);
            config.custom_preset = None;
        }
        if self.record {
            config = config.with_recording(true);
        }
        if let Some(dir) = &self.output_dir {
            config.record = config.record.with_output_dir(dir);
        }
        Ok(config.validated()?)
    }

    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            frames: self.frames,
            interval: Duration::from_millis(self.interval_ms),
            step: self.step,
            ..SweepConfig::default()
        }
    }
}

pub fn run_from_env() -> Result<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_demo(&args),
        Commands::ListPresets => {
            print!("{}", list_presets());
            Ok(())
        }
    }
}

/// One line per preset followed by its panels.
pub fn list_presets() -> String {
    let mut out = String::new();
    for kind in PresetKind::ALL {
        let preset = kind.preset();
        out.push_str(&format!("{preset}\n"));
        for panel in preset.panels() {
            out.push_str(&format!(
                "  {:<9} {} gray {}\n",
                panel.modality.as_str(),
                panel.rect,
                panel.placeholder.r
            ));
        }
    }
    out
}

fn run_demo(args: &RunArgs) -> Result<()> {
    let config = args.overlay_config()?;
    let preset = config.layout()?;
    tracing::info!(preset = %preset, recording = config.recording_enabled, "starting sweep");

    if args.window {
        return run_windowed(preset, config, args);
    }
    if !args.script.is_empty() && !config.recording_enabled {
        tracing::warn!("--script has no effect without --record");
    }
    let backend = HeadlessBackend::new()
        .with_keys(ScriptedKeys::from_script(&args.script))
        .with_clock(SteppingClock::new(Local::now(), TimeDelta::seconds(1)));
    let frames = drive(Overlay::new(preset, backend, config)?, args)?;
    println!("presented {frames} frames headless");
    Ok(())
}

#[cfg(feature = "window")]
fn run_windowed(preset: LayoutPreset, config: OverlayConfig, args: &RunArgs) -> Result<()> {
    let (width, height) = preset.size();
    let backend = mosaic_window::WindowBackend::open(&config.window_title, width, height)
        .map_err(|e| DemoError::Window(e.to_string()))?;
    drive(Overlay::new(preset, backend, config)?, args)?;
    Ok(())
}

#[cfg(not(feature = "window"))]
fn run_windowed(_preset: LayoutPreset, _config: OverlayConfig, _args: &RunArgs) -> Result<()> {
    Err(DemoError::Window(
        "built without the `window` feature".to_string(),
    ))
}

/// Sweep, then finalize any recording still open. Returns frames attempted.
fn drive<B: Backend>(mut overlay: Overlay<B>, args: &RunArgs) -> Result<u64> {
    let stats = run_sweep(&mut overlay, &args.sweep_config())?;
    if let Some(summary) = overlay.finish()? {
        println!("recorded {} frames to {}", summary.frames, summary.path.display());
    }
    tracing::info!(
        frames = stats.frames,
        recorded = stats.recorded,
        degraded = stats.degraded,
        "sweep done"
    );
    Ok(stats.frames)
}
