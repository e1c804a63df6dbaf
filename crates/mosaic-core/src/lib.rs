#![forbid(unsafe_code)]

//! Core: pixel geometry, key events, and recording commands.
//!
//! # Role in Mosaic
//! `mosaic-core` is the dependency-light base of the workspace. It defines the
//! pixel-space [`geometry::Rect`] used by canvases and layout presets, the
//! canonical key events produced by backends, and the mapping from keys to
//! recorder commands.
//!
//! # How it fits in the system
//! The render kernel (`mosaic-render`) and the layout presets
//! (`mosaic-layout`) use `Rect` for panel placement. Backends produce
//! [`event::KeyEvent`] values which the overlay turns into
//! [`command::RecordCommand`]s once per refresh.

pub mod command;
pub mod event;
pub mod geometry;
