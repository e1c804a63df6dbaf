#![forbid(unsafe_code)]

//! Render kernel: pixels, panel images, and the compositing canvas.
//!
//! # Role in Mosaic
//! `mosaic-render` owns the pixel buffer every frame is composited into. Panel
//! images supplied by the simulation driver are blitted into a [`Canvas`] at
//! fixed offsets; the canvas is then converted into display scanlines or
//! video frame bytes.
//!
//! # Primary responsibilities
//! - **Rgb/ChannelOrder**: 8-bit pixels and boundary byte-order conversion.
//! - **PanelImage**: owned source images with checked constructors.
//! - **Canvas**: fixed-size buffer with bounds-checked blits and exports.
//!
//! # How it fits in the system
//! `mosaic-layout` decides *where* each modality goes; this crate does the
//! copying. The overlay facade hands the canvas to a display sink and, while
//! recording, to the video writer.

pub mod canvas;
pub mod panel_image;
pub mod pixel;

pub use canvas::{BlitError, Canvas};
pub use panel_image::{ImageError, PanelImage};
pub use pixel::{ChannelOrder, Rgb};
