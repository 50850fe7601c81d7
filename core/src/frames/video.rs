//! Video decoding through FFmpeg
//!
//! Frames are scaled to 8-bit grayscale as they are decoded.

use super::playback::{ClipDecoder, ClipPlayer};
use crate::error::{Result, ViewtagError};
use crate::types::{Frame, MediaItem};
use ffmpeg_next as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::software::scaling::{Context as Scaler, Flags};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Once;
use std::time::Duration;

static FFMPEG_INIT: Once = Once::new();

/// Initialize FFmpeg library once per process
fn init_ffmpeg() {
    FFMPEG_INIT.call_once(|| match ffmpeg::init() {
        Ok(()) => info!("FFmpeg initialized"),
        Err(e) => warn!("ffmpeg::init() failed: {}", e),
    });
}

/// Open decoder for one video file
struct VideoStream {
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::decoder::Video,
    scaler: Scaler,
    stream_index: usize,
    /// End of file reached and the decoder has been told so
    draining: bool,
}

impl VideoStream {
    fn open(path: &Path) -> Result<Self> {
        let input = ffmpeg::format::input(&path)?;
        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| {
                ViewtagError::VideoError(format!("no video stream in {}", path.display()))
            })?;
        let stream_index = stream.index();

        let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = context.decoder().video()?;
        let scaler = Scaler::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::GRAY8,
            decoder.width(),
            decoder.height(),
            Flags::BILINEAR,
        )?;

        debug!(
            "Opened {} ({}x{})",
            path.display(),
            decoder.width(),
            decoder.height()
        );
        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            draining: false,
        })
    }

    fn to_gray(&mut self, decoded: &ffmpeg::frame::Video) -> Result<Frame> {
        let mut gray = ffmpeg::frame::Video::empty();
        self.scaler.run(decoded, &mut gray)?;

        let width = gray.width() as usize;
        let height = gray.height() as usize;
        let stride = gray.stride(0);
        let data = gray.data(0);

        let mut pixels = Vec::with_capacity(width * height);
        for row in 0..height {
            let start = row * stride;
            pixels.extend_from_slice(&data[start..start + width]);
        }
        Frame::new(width, height, pixels)
            .ok_or_else(|| ViewtagError::VideoError("scaled frame size mismatch".to_string()))
    }
}

impl ClipDecoder for VideoStream {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut decoded = ffmpeg::frame::Video::empty();
        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return self.to_gray(&decoded).map(Some);
            }
            if self.draining {
                return Ok(None);
            }

            let packet = self
                .input
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));
            match packet {
                Some((index, packet)) if index == self.stream_index => {
                    self.decoder.send_packet(&packet)?;
                }
                Some(_) => {}
                None => {
                    self.decoder.send_eof()?;
                    self.draining = true;
                }
            }
        }
    }

    fn rewind(&mut self) -> Result<()> {
        self.input.seek(0, ..)?;
        self.decoder.flush();
        self.draining = false;
        Ok(())
    }
}

/// Player over video files decoded with FFmpeg
pub fn player(items: &[MediaItem], interval: Duration) -> ClipPlayer {
    init_ffmpeg();
    ClipPlayer::new(
        items,
        interval,
        Box::new(|path: &Path| -> Result<Box<dyn ClipDecoder>> {
            Ok(Box::new(VideoStream::open(path)?))
        }),
    )
}
