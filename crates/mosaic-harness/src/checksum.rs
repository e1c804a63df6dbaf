#![forbid(unsafe_code)]

//! Canvas checksums for golden-frame tests.

use mosaic_render::{Canvas, ChannelOrder};

/// Prefix that names the hash in logs and golden files.
pub const CHECKSUM_PREFIX: &str = "blake3:";

/// BLAKE3 checksum over canvas dimensions and RGB bytes.
///
/// Returns a hex string prefixed with `blake3:`.
pub fn canvas_checksum(canvas: &Canvas) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&canvas.width().to_le_bytes());
    hasher.update(&canvas.height().to_le_bytes());
    hasher.update(&canvas.to_bytes(ChannelOrder::Rgb));
    format!("{CHECKSUM_PREFIX}{}", hasher.finalize().to_hex())
}

/// Compare checksum sequences; returns the first differing index on mismatch.
///
/// A length mismatch reports the length of the shorter sequence.
pub fn verify_checksums(actual: &[String], expected: &[String]) -> Result<(), usize> {
    if let Some(i) = actual.iter().zip(expected).position(|(a, e)| a != e) {
        return Err(i);
    }
    if actual.len() != expected.len() {
        return Err(actual.len().min(expected.len()));
    }
    Ok(())
}
