//! Timed playback of one clip at a time
//!
//! One position per file. Seeking opens the file and drops the previous
//! decoder; each tick decodes the next frame and rewinds at end of stream,
//! so a clip loops until the operator moves on.

use super::FrameSource;
use crate::error::Result;
use crate::types::{Frame, MediaItem};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sequential decoder over one opened file
pub trait ClipDecoder {
    /// Decodes the next frame, `None` at end of stream
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Seeks back to the first frame
    fn rewind(&mut self) -> Result<()>;
}

/// Opens a decoder for a file
pub type ClipOpener = Box<dyn Fn(&Path) -> Result<Box<dyn ClipDecoder>>>;

/// Frame source playing one file at a time on the redraw timer
pub struct ClipPlayer {
    paths: Vec<PathBuf>,
    interval: Duration,
    open: ClipOpener,
    position: usize,
    clip: Option<Box<dyn ClipDecoder>>,
    frame: Option<Frame>,
}

impl ClipPlayer {
    /// Creates a player over `items`; nothing is opened until [`FrameSource::seek`]
    pub fn new(items: &[MediaItem], interval: Duration, open: ClipOpener) -> Self {
        Self {
            paths: items.iter().map(|i| i.path.clone()).collect(),
            interval,
            open,
            position: 0,
            clip: None,
            frame: None,
        }
    }

    fn advance(&mut self) -> Result<()> {
        let Some(clip) = self.clip.as_mut() else {
            return Ok(());
        };
        match clip.next_frame()? {
            Some(frame) => self.frame = Some(frame),
            None => {
                debug!("End of {}, rewinding", self.paths[self.position].display());
                clip.rewind()?;
                if let Some(frame) = clip.next_frame()? {
                    self.frame = Some(frame);
                }
            }
        }
        Ok(())
    }
}

impl FrameSource for ClipPlayer {
    fn len(&self) -> usize {
        self.paths.len()
    }

    fn item_at(&self, position: usize) -> usize {
        position
    }

    fn seek(&mut self, position: usize) -> Result<()> {
        self.clip = None;
        self.frame = None;
        self.position = position.min(self.paths.len().saturating_sub(1));

        let Some(path) = self.paths.get(self.position) else {
            return Ok(());
        };
        match (self.open)(path) {
            Ok(clip) => {
                self.clip = Some(clip);
                self.advance()
            }
            Err(e) => {
                warn!("Cannot play {}: {}", path.display(), e);
                Ok(())
            }
        }
    }

    fn tick(&mut self) -> Result<()> {
        self.advance()
    }

    fn current_frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    fn interval(&self) -> Option<Duration> {
        Some(self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewtagError;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Yields 1x1 frames holding 0, 1, .. `len - 1`
    struct CountingClip {
        len: u8,
        next: u8,
        rewinds: Rc<Cell<usize>>,
    }

    impl ClipDecoder for CountingClip {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            if self.next >= self.len {
                return Ok(None);
            }
            let frame = Frame::new(1, 1, vec![self.next]);
            self.next += 1;
            Ok(frame)
        }

        fn rewind(&mut self) -> Result<()> {
            self.next = 0;
            self.rewinds.set(self.rewinds.get() + 1);
            Ok(())
        }
    }

    struct Fixture {
        player: ClipPlayer,
        opens: Rc<Cell<usize>>,
        rewinds: Rc<Cell<usize>>,
    }

    /// Player over `names`; `missing.mp4` fails to open, `empty.mp4` has no frames
    fn fixture(names: &[&str]) -> Fixture {
        let items: Vec<_> = names
            .iter()
            .map(|n| MediaItem {
                path: PathBuf::from("/media").join(n),
                name: n.to_string(),
            })
            .collect();
        let opens = Rc::new(Cell::new(0));
        let rewinds = Rc::new(Cell::new(0));

        let (o, r) = (opens.clone(), rewinds.clone());
        let open: ClipOpener = Box::new(move |path: &Path| -> Result<Box<dyn ClipDecoder>> {
            let len = match path.file_name().and_then(|n| n.to_str()) {
                Some("missing.mp4") => {
                    return Err(ViewtagError::VideoError("No such file".to_string()))
                }
                Some("empty.mp4") => 0,
                _ => 3,
            };
            o.set(o.get() + 1);
            Ok(Box::new(CountingClip {
                len,
                next: 0,
                rewinds: r.clone(),
            }))
        });

        Fixture {
            player: ClipPlayer::new(&items, Duration::from_millis(30), open),
            opens,
            rewinds,
        }
    }

    fn shown(player: &ClipPlayer) -> Option<u8> {
        player.current_frame().map(|f| f.pixels[0])
    }

    #[test]
    fn test_clip_loops_at_end_of_stream() {
        let mut fx = fixture(&["a.mp4"]);
        fx.player.seek(0).unwrap();

        let mut seen = vec![shown(&fx.player)];
        for _ in 0..4 {
            fx.player.tick().unwrap();
            seen.push(shown(&fx.player));
        }

        assert_eq!(seen, vec![Some(0), Some(1), Some(2), Some(0), Some(1)]);
        assert_eq!(fx.rewinds.get(), 1);
    }

    #[test]
    fn test_seek_opens_the_new_clip() {
        let mut fx = fixture(&["a.mp4", "b.mp4"]);
        fx.player.seek(0).unwrap();
        fx.player.tick().unwrap();
        assert_eq!(shown(&fx.player), Some(1));

        fx.player.seek(1).unwrap();

        assert_eq!(fx.opens.get(), 2);
        assert_eq!(shown(&fx.player), Some(0));
    }

    #[test]
    fn test_unopenable_file_leaves_no_frame() {
        let mut fx = fixture(&["a.mp4", "missing.mp4"]);
        fx.player.seek(0).unwrap();
        assert_eq!(shown(&fx.player), Some(0));

        fx.player.seek(1).unwrap();
        assert_eq!(shown(&fx.player), None);

        fx.player.tick().unwrap();
        assert_eq!(shown(&fx.player), None);
        assert_eq!(fx.player.len(), 2);
    }

    #[test]
    fn test_empty_clip_does_not_spin() {
        let mut fx = fixture(&["empty.mp4"]);
        fx.player.seek(0).unwrap();
        fx.player.tick().unwrap();

        assert_eq!(shown(&fx.player), None);
        assert_eq!(fx.rewinds.get(), 2);
    }

    #[test]
    fn test_player_is_timed() {
        let fx = fixture(&["a.mp4"]);
        assert_eq!(fx.player.interval(), Some(Duration::from_millis(30)));
        assert!(fx.player.supports_pause());
    }
}
