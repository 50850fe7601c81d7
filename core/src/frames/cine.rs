//! DICOM cine loops decoded up front
//!
//! Every multi-frame file is decoded completely at load time; frames from
//! all files are flattened into one sequence and navigation steps through
//! that sequence frame by frame. Single-frame files are not cine loops and
//! are left out.

use super::tags::{get_int_value, NUMBER_OF_FRAMES};
use super::FrameSource;
use crate::error::{Result, ViewtagError};
use crate::types::{Frame, MediaItem};
use dicom_object::open_file;
use dicom_pixeldata::{
    DecodedPixelData, PhotometricInterpretation, PixelDecoder, PixelRepresentation,
    PlanarConfiguration,
};
use log::{debug, info, warn};
use std::path::Path;

/// One decoded frame and where it came from
#[derive(Debug, Clone)]
pub struct CineFrame {
    /// Index of the media item
    pub item: usize,
    /// Frame number within its file
    pub index: usize,
    pub frame: Frame,
}

/// All cine frames of a session, in file order then frame order
#[derive(Debug, Clone)]
pub struct CineLibrary {
    frames: Vec<CineFrame>,
    /// Frame count per media item, zero for dropped files
    clip_lengths: Vec<usize>,
    position: usize,
}

impl CineLibrary {
    /// Decodes every multi-frame file among `items`
    ///
    /// Unreadable files are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ViewtagError::NoCineFrames`] if no file yields frames.
    pub fn load(items: &[MediaItem]) -> Result<Self> {
        let mut clips = Vec::new();
        for (i, item) in items.iter().enumerate() {
            match load_cine(&item.path) {
                Ok(Some(frames)) => {
                    debug!("Decoded {} frames from {}", frames.len(), item.name);
                    clips.push((i, frames));
                }
                Ok(None) => debug!("Skipping single-frame file {}", item.name),
                Err(e) => warn!("Skipping {}: {}", item.path.display(), e),
            }
        }

        let library = Self::from_clips(items.len(), clips)?;
        info!(
            "Loaded {} cine frames from {} files",
            library.len(),
            library.clip_count()
        );
        Ok(library)
    }

    /// Builds a library from already decoded clips `(item index, frames)`
    pub fn from_clips(item_count: usize, clips: Vec<(usize, Vec<Frame>)>) -> Result<Self> {
        let mut frames = Vec::new();
        let mut clip_lengths = vec![0; item_count];
        for (item, clip) in clips {
            if item >= item_count {
                continue;
            }
            clip_lengths[item] = clip.len();
            frames.extend(
                clip.into_iter()
                    .enumerate()
                    .map(|(index, frame)| CineFrame { item, index, frame }),
            );
        }

        if frames.is_empty() {
            return Err(ViewtagError::NoCineFrames);
        }

        Ok(Self {
            frames,
            clip_lengths,
            position: 0,
        })
    }

    /// Number of files that contributed frames
    pub fn clip_count(&self) -> usize {
        self.clip_lengths.iter().filter(|&&n| n > 0).count()
    }

    /// Whether the item at `item` was kept as a cine loop
    pub fn has_clip(&self, item: usize) -> bool {
        self.clip_lengths.get(item).copied().unwrap_or(0) > 0
    }

    pub fn frames(&self) -> &[CineFrame] {
        &self.frames
    }
}

impl FrameSource for CineLibrary {
    fn len(&self) -> usize {
        self.frames.len()
    }

    fn item_at(&self, position: usize) -> usize {
        self.frames[position].item
    }

    fn seek(&mut self, position: usize) -> Result<()> {
        self.position = position.min(self.frames.len() - 1);
        Ok(())
    }

    fn current_frame(&self) -> Option<&Frame> {
        self.frames.get(self.position).map(|f| &f.frame)
    }

    fn frame_position(&self) -> Option<(usize, usize)> {
        let current = self.frames.get(self.position)?;
        Some((current.index + 1, self.clip_lengths[current.item]))
    }
}

/// Decodes all frames of a DICOM file
///
/// Returns `Ok(None)` for single-frame files.
pub fn load_cine(path: &Path) -> Result<Option<Vec<Frame>>> {
    let dcm = open_file(path)?;

    let declared = get_int_value(&dcm, NUMBER_OF_FRAMES).unwrap_or(1);
    if declared <= 1 {
        return Ok(None);
    }

    let decoded = dcm.decode_pixel_data()?;
    let layout = PixelLayout::of(&decoded);
    debug!(
        "{} decodes to {} x {} {}",
        path.display(),
        layout.columns,
        layout.rows,
        decoded.photometric_interpretation()
    );

    let frames = frames_from_bytes(decoded.data(), decoded.number_of_frames() as usize, &layout)?;
    Ok((frames.len() > 1).then_some(frames))
}

/// Sample layout of decoded pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLayout {
    pub rows: usize,
    pub columns: usize,
    pub samples_per_pixel: usize,
    pub bits_allocated: usize,
    /// Two's complement samples
    pub signed: bool,
    /// Color planes stored one after another instead of interleaved
    pub planar: bool,
    /// First sample is already luminance (YBR color spaces)
    pub luma_first: bool,
}

impl PixelLayout {
    /// Layout of the samples as the decoder produced them
    ///
    /// Compressed color streams come back as interleaved RGB whatever the
    /// file declares, so the file's own attributes are not consulted.
    pub fn of(decoded: &DecodedPixelData<'_>) -> Self {
        Self {
            rows: decoded.rows() as usize,
            columns: decoded.columns() as usize,
            samples_per_pixel: decoded.samples_per_pixel() as usize,
            bits_allocated: decoded.bits_allocated() as usize,
            signed: decoded.pixel_representation() == PixelRepresentation::Signed,
            planar: decoded.planar_configuration() == PlanarConfiguration::PixelFirst,
            luma_first: is_luma_first(decoded.photometric_interpretation()),
        }
    }

    fn bytes_per_sample(&self) -> usize {
        self.bits_allocated.div_ceil(8)
    }

    fn frame_bytes(&self) -> usize {
        self.rows * self.columns * self.samples_per_pixel * self.bytes_per_sample()
    }
}

/// Whether the first sample of a pixel is already its luminance
fn is_luma_first(interpretation: &PhotometricInterpretation) -> bool {
    matches!(
        interpretation,
        PhotometricInterpretation::YbrFull
            | PhotometricInterpretation::YbrFull422
            | PhotometricInterpretation::YbrPartial420
            | PhotometricInterpretation::YbrIct
            | PhotometricInterpretation::YbrRct
    )
}

/// Splits little-endian pixel data into normalized grayscale frames
pub fn frames_from_bytes(data: &[u8], count: usize, layout: &PixelLayout) -> Result<Vec<Frame>> {
    if !matches!(layout.bits_allocated, 8 | 16 | 32) {
        return Err(ViewtagError::DicomError(format!(
            "unsupported bits allocated: {}",
            layout.bits_allocated
        )));
    }
    if !matches!(layout.samples_per_pixel, 1 | 3) {
        return Err(ViewtagError::DicomError(format!(
            "unsupported samples per pixel: {}",
            layout.samples_per_pixel
        )));
    }

    let frame_bytes = layout.frame_bytes();
    if frame_bytes == 0 || data.len() < frame_bytes * count {
        return Err(ViewtagError::DicomError(format!(
            "pixel data holds {} bytes, expected {} frames of {} bytes",
            data.len(),
            count,
            frame_bytes
        )));
    }

    data.chunks_exact(frame_bytes)
        .take(count)
        .map(|chunk| {
            let samples = intensities(chunk, layout);
            Frame::normalized(layout.columns, layout.rows, &samples).ok_or_else(|| {
                ViewtagError::DicomError("frame size does not match dimensions".to_string())
            })
        })
        .collect()
}

/// One intensity per pixel; color is reduced to luminance
fn intensities(chunk: &[u8], layout: &PixelLayout) -> Vec<f32> {
    let samples: Vec<f32> = chunk
        .chunks_exact(layout.bytes_per_sample())
        .map(|b| sample_value(b, layout.signed))
        .collect();

    if layout.samples_per_pixel == 1 {
        return samples;
    }

    let pixels = layout.rows * layout.columns;
    let channel = |pixel: usize, c: usize| {
        if layout.planar {
            samples[c * pixels + pixel]
        } else {
            samples[pixel * 3 + c]
        }
    };

    (0..pixels)
        .map(|p| {
            if layout.luma_first {
                channel(p, 0)
            } else {
                0.299 * channel(p, 0) + 0.587 * channel(p, 1) + 0.114 * channel(p, 2)
            }
        })
        .collect()
}

fn sample_value(bytes: &[u8], signed: bool) -> f32 {
    match (bytes.len(), signed) {
        (1, false) => bytes[0] as f32,
        (1, true) => bytes[0] as i8 as f32,
        (2, false) => u16::from_le_bytes([bytes[0], bytes[1]]) as f32,
        (2, true) => i16::from_le_bytes([bytes[0], bytes[1]]) as f32,
        (4, false) => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f32,
        (4, true) => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f32,
        _ => 0.0,
    }
}
