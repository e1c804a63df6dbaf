#![forbid(unsafe_code)]

//! Sweep demo for the Mosaic overlay.
//!
//! Fills every panel with its placeholder, then brightens the RGB panel by a
//! fixed step each frame (wrapping at 255). With `--record`, press `r` to
//! start and `q` to stop recording; headless runs take keys from `--script`.

pub mod cli;
pub mod error;
pub mod sweep;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{DemoError, Result};
pub use sweep::{SweepConfig, SweepStats, run_sweep};
