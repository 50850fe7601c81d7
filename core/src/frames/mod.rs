//! Frame sources
//!
//! A [`FrameSource`] owns the decoded pixels for a session and maps each
//! navigable position back to the media item it came from.

pub mod cine;
pub mod playback;
pub mod tags;
#[cfg(feature = "video")]
pub mod video;

pub use cine::CineLibrary;
pub use playback::{ClipDecoder, ClipPlayer};

use crate::error::Result;
use crate::types::Frame;
use std::time::Duration;

/// The current file's displayable frames
pub trait FrameSource {
    /// Number of navigable positions
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the media item shown at `position`
    fn item_at(&self, position: usize) -> usize;

    /// Makes `position` current, releasing whatever the previous one held
    fn seek(&mut self, position: usize) -> Result<()>;

    /// Playback step on the redraw timer
    fn tick(&mut self) -> Result<()> {
        Ok(())
    }

    /// Frame to display, if one could be decoded
    fn current_frame(&self) -> Option<&Frame>;

    /// Redraw pacing; `None` means redraw only on input
    fn interval(&self) -> Option<Duration> {
        None
    }

    /// Frame number within the current clip and the clip length, when the
    /// source steps through frames
    fn frame_position(&self) -> Option<(usize, usize)> {
        None
    }

    /// Whether the pause toggle applies to this source
    fn supports_pause(&self) -> bool {
        self.interval().is_some()
    }
}
