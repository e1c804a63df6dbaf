#![forbid(unsafe_code)]

//! Minimal motion-JPEG AVI container.
//!
//! File layout (all integers little-endian):
//!
//! ```text
//! RIFF <size> 'AVI '
//!   LIST <192> 'hdrl'
//!     'avih' <56>  main header (frame period, frame count, size)
//!     LIST <116> 'strl'
//!       'strh' <56>  stream header ('vids' / 'MJPG', rate = fps)
//!       'strf' <40>  BITMAPINFOHEADER (24 bpp, compression 'MJPG')
//!   LIST <size> 'movi'
//!     '00dc' <len> <jpeg bytes> [pad to even]
//!     ...
//!   'idx1' <16 * n>  one keyframe entry per frame
//! ```
//!
//! Header counters are unknown until the last frame, so [`AviWriter`]
//! writes a placeholder header up front and rewrites it in
//! [`AviWriter::finish`]. `idx1` offsets are relative to the `movi` fourcc.

use std::fs;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use thiserror::Error;

/// Bytes before the first `00dc` chunk.
pub const HEADER_LEN: u64 = 224;

const HDRL_LEN: u32 = 192;
const STRL_LEN: u32 = 116;
const AVIH_LEN: u32 = 56;
const STRH_LEN: u32 = 56;
const STRF_LEN: u32 = 40;
const INDEX_ENTRY_LEN: u32 = 16;

const AVIF_HASINDEX: u32 = 0x10;
const AVIIF_KEYFRAME: u32 = 0x10;

const FRAME_CHUNK: &[u8; 4] = b"00dc";
const MJPG: &[u8; 4] = b"MJPG";

fn too_large() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "AVI file would exceed 4 GiB")
}

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    offset: u32,
    size: u32,
}

/// Streaming writer for a single-stream MJPEG AVI.
#[derive(Debug)]
pub struct AviWriter<W: Write + Seek> {
    inner: W,
    width: u32,
    height: u32,
    fps: u32,
    /// Bytes written after the `movi` fourcc.
    movi_len: u32,
    max_frame_len: u32,
    index: Vec<IndexEntry>,
}

impl<W: Write + Seek> AviWriter<W> {
    /// Write a placeholder header and get ready for frames.
    pub fn new(mut inner: W, width: u32, height: u32, fps: u32) -> io::Result<Self> {
        if fps == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "frame rate must be > 0",
            ));
        }
        inner.seek(SeekFrom::Start(0))?;
        let mut writer = Self {
            inner,
            width,
            height,
            fps,
            movi_len: 0,
            max_frame_len: 0,
            index: Vec::new(),
        };
        writer.write_header()?;
        Ok(writer)
    }

    /// Frames written so far.
    #[inline]
    pub fn frame_count(&self) -> u32 {
        // Bounded by the 4 GiB check in `write_frame`.
        self.index.len() as u32
    }

    #[inline]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Append one JPEG-encoded frame.
    pub fn write_frame(&mut self, jpeg: &[u8]) -> io::Result<()> {
        let len = u32::try_from(jpeg.len()).map_err(|_| too_large())?;
        let padded = len.checked_add(len & 1).ok_or_else(too_large)?;
        let chunk_len = padded.checked_add(8).ok_or_else(too_large)?;
        let new_movi_len = self.movi_len.checked_add(chunk_len).ok_or_else(too_large)?;
        let index_len = (self.index.len() as u64 + 1) * u64::from(INDEX_ENTRY_LEN);
        if HEADER_LEN + u64::from(new_movi_len) + 8 + index_len > u64::from(u32::MAX) {
            return Err(too_large());
        }

        self.inner.write_all(FRAME_CHUNK)?;
        self.inner.write_all(&len.to_le_bytes())?;
        self.inner.write_all(jpeg)?;
        if len & 1 == 1 {
            self.inner.write_all(&[0])?;
        }

        self.index.push(IndexEntry {
            offset: 4 + self.movi_len,
            size: len,
        });
        self.movi_len = new_movi_len;
        self.max_frame_len = self.max_frame_len.max(len);
        Ok(())
    }

    /// File length up to the end of the last complete frame chunk.
    #[inline]
    pub fn committed_len(&self) -> u64 {
        HEADER_LEN + u64::from(self.movi_len)
    }

    /// Finish after a failed [`write_frame`](Self::write_frame).
    ///
    /// `truncate` must cut the sink to the given length, dropping whatever
    /// part of the failed chunk reached it. Every complete frame is kept.
    pub fn finish_truncated(
        mut self,
        truncate: impl FnOnce(&mut W, u64) -> io::Result<()>,
    ) -> io::Result<W> {
        let len = self.committed_len();
        truncate(&mut self.inner, len)?;
        self.inner.seek(SeekFrom::Start(len))?;
        self.finish()
    }

    /// Write the index, patch the header and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        let mut idx = Vec::with_capacity(8 + self.index.len() * INDEX_ENTRY_LEN as usize);
        idx.extend_from_slice(b"idx1");
        put_u32(&mut idx, self.frame_count() * INDEX_ENTRY_LEN);
        for entry in &self.index {
            idx.extend_from_slice(FRAME_CHUNK);
            put_u32(&mut idx, AVIIF_KEYFRAME);
            put_u32(&mut idx, entry.offset);
            put_u32(&mut idx, entry.size);
        }
        self.inner.write_all(&idx)?;

        self.inner.seek(SeekFrom::Start(0))?;
        self.write_header()?;
        self.inner.seek(SeekFrom::End(0))?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_header(&mut self) -> io::Result<()> {
        let frames = self.frame_count();
        let index_len = frames * INDEX_ENTRY_LEN;
        let riff_len = (HEADER_LEN as u32 - 8) + self.movi_len + 8 + index_len;
        let frame_period = 1_000_000 / self.fps;
        let suggested = self.max_frame_len.saturating_add(8);

        let mut h = Vec::with_capacity(HEADER_LEN as usize);
        h.extend_from_slice(b"RIFF");
        put_u32(&mut h, riff_len);
        h.extend_from_slice(b"AVI ");

        h.extend_from_slice(b"LIST");
        put_u32(&mut h, HDRL_LEN);
        h.extend_from_slice(b"hdrl");

        h.extend_from_slice(b"avih");
        put_u32(&mut h, AVIH_LEN);
        put_u32(&mut h, frame_period);
        put_u32(&mut h, suggested.saturating_mul(self.fps));
        put_u32(&mut h, 0); // padding granularity
        put_u32(&mut h, AVIF_HASINDEX);
        put_u32(&mut h, frames);
        put_u32(&mut h, 0); // initial frames
        put_u32(&mut h, 1); // streams
        put_u32(&mut h, suggested);
        put_u32(&mut h, self.width);
        put_u32(&mut h, self.height);
        h.extend_from_slice(&[0; 16]);

        h.extend_from_slice(b"LIST");
        put_u32(&mut h, STRL_LEN);
        h.extend_from_slice(b"strl");

        h.extend_from_slice(b"strh");
        put_u32(&mut h, STRH_LEN);
        h.extend_from_slice(b"vids");
        h.extend_from_slice(MJPG);
        put_u32(&mut h, 0); // flags
        put_u16(&mut h, 0); // priority
        put_u16(&mut h, 0); // language
        put_u32(&mut h, 0); // initial frames
        put_u32(&mut h, 1); // scale
        put_u32(&mut h, self.fps); // rate
        put_u32(&mut h, 0); // start
        put_u32(&mut h, frames); // length
        put_u32(&mut h, suggested);
        put_u32(&mut h, u32::MAX); // default quality
        put_u32(&mut h, 0); // sample size
        put_u16(&mut h, 0);
        put_u16(&mut h, 0);
        put_u16(&mut h, u16::try_from(self.width).unwrap_or(u16::MAX));
        put_u16(&mut h, u16::try_from(self.height).unwrap_or(u16::MAX));

        h.extend_from_slice(b"strf");
        put_u32(&mut h, STRF_LEN);
        put_u32(&mut h, STRF_LEN);
        put_u32(&mut h, self.width);
        put_u32(&mut h, self.height);
        put_u16(&mut h, 1); // planes
        put_u16(&mut h, 24); // bit count
        h.extend_from_slice(MJPG);
        put_u32(&mut h, self.width.saturating_mul(self.height).saturating_mul(3));
        h.extend_from_slice(&[0; 16]);

        h.extend_from_slice(b"LIST");
        put_u32(&mut h, 4 + self.movi_len);
        h.extend_from_slice(b"movi");

        debug_assert_eq!(h.len() as u64, HEADER_LEN);
        self.inner.write_all(&h)
    }
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

// ── Reading ─────────────────────────────────────────────────────────────

/// Errors from [`AviFile`] parsing.
#[derive(Debug, Error)]
pub enum AviError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("not a RIFF AVI file")]
    NotAvi,
    #[error("missing {0} chunk")]
    Missing(&'static str),
    #[error("truncated {0} chunk")]
    Truncated(&'static str),
    #[error("failed to decode frame {frame}: {source}")]
    Decode {
        frame: usize,
        #[source]
        source: image::ImageError,
    },
}

/// A parsed MJPEG AVI: header fields plus the raw JPEG of every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AviFile {
    pub width: u32,
    pub height: u32,
    /// Frames per second, `rate / scale` from the stream header.
    pub fps: u32,
    /// Frame count declared in the main header.
    pub declared_frames: u32,
    /// Number of `idx1` entries.
    pub indexed_frames: u32,
    pub frames: Vec<Vec<u8>>,
}

impl AviFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AviError> {
        Self::parse(&fs::read(path)?)
    }

    pub fn parse(data: &[u8]) -> Result<Self, AviError> {
        if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"AVI " {
            return Err(AviError::NotAvi);
        }
        let riff_len = read_u32(data, 4, "RIFF")? as usize;
        let body = data
            .get(12..(8 + riff_len).min(data.len()))
            .ok_or(AviError::Truncated("RIFF"))?;

        let mut main = None;
        let mut rate = None;
        let mut frames = None;
        let mut indexed_frames = 0;

        for (id, chunk) in chunks(body, "RIFF")? {
            match (&id, list_kind(&id, chunk)) {
                (_, Some(b"hdrl")) => {
                    for (sub, sub_body) in chunks(&chunk[4..], "hdrl")? {
                        if &sub == b"avih" {
                            main = Some((
                                read_u32(sub_body, 16, "avih")?,
                                read_u32(sub_body, 32, "avih")?,
                                read_u32(sub_body, 36, "avih")?,
                            ));
                        } else if list_kind(&sub, sub_body) == Some(&b"strl"[..]) {
                            for (s, s_body) in chunks(&sub_body[4..], "strl")? {
                                if &s == b"strh" {
                                    let scale = read_u32(s_body, 20, "strh")?.max(1);
                                    rate = Some(read_u32(s_body, 24, "strh")? / scale);
                                }
                            }
                        }
                    }
                }
                (_, Some(b"movi")) => {
                    frames = Some(
                        chunks(&chunk[4..], "movi")?
                            .into_iter()
                            .filter(|(id, _)| id == FRAME_CHUNK)
                            .map(|(_, jpeg)| jpeg.to_vec())
                            .collect::<Vec<_>>(),
                    );
                }
                (b"idx1", None) => {
                    indexed_frames = (chunk.len() / INDEX_ENTRY_LEN as usize) as u32;
                }
                _ => {}
            }
        }

        let (declared_frames, width, height) = main.ok_or(AviError::Missing("avih"))?;
        Ok(Self {
            width,
            height,
            fps: rate.ok_or(AviError::Missing("strh"))?,
            declared_frames,
            indexed_frames,
            frames: frames.ok_or(AviError::Missing("movi"))?,
        })
    }

    /// Decode frame `i` to RGB.
    pub fn decode_frame(&self, i: usize) -> Result<Option<::image::RgbImage>, AviError> {
        let Some(jpeg) = self.frames.get(i) else {
            return Ok(None);
        };
        ::image::load_from_memory_with_format(jpeg, ::image::ImageFormat::Jpeg)
            .map(|img| Some(img.to_rgb8()))
            .map_err(|source| AviError::Decode { frame: i, source })
    }
}

fn read_u32(data: &[u8], at: usize, chunk: &'static str) -> Result<u32, AviError> {
    data.get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(AviError::Truncated(chunk))
}

fn list_kind<'a>(id: &[u8; 4], body: &'a [u8]) -> Option<&'a [u8]> {
    (id == b"LIST").then(|| body.get(0..4)).flatten()
}

/// Split a chunk sequence into `(fourcc, body)` pairs, honoring word padding.
fn chunks<'a>(mut data: &'a [u8], parent: &'static str) -> Result<Vec<([u8; 4], &'a [u8])>, AviError> {
    let mut out = Vec::new();
    while data.len() >= 8 {
        let mut id = [0; 4];
        id.copy_from_slice(&data[0..4]);
        let len = read_u32(data, 4, parent)? as usize;
        let body = data.get(8..8 + len).ok_or(AviError::Truncated(parent))?;
        out.push((id, body));
        let next = (8 + len + (len & 1)).min(data.len());
        data = &data[next..];
    }
    Ok(out)
}
