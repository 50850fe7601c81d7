/// Displayable 8-bit grayscale image, rows packed without padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Frame {
    /// Creates a frame, returning `None` if the buffer size does not match
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width * height).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Min-max normalizes raw intensities into a grayscale frame
    ///
    /// The darkest sample maps to 0 and the brightest to 255. A flat image
    /// (all samples equal) maps to 0 everywhere.
    pub fn normalized(width: usize, height: usize, samples: &[f32]) -> Option<Self> {
        if samples.len() != width * height {
            return None;
        }
        let (min, max) = samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;
        let pixels = if range > 0.0 {
            samples
                .iter()
                .map(|&v| (((v - min) / range) * 255.0).round() as u8)
                .collect()
        } else {
            vec![0; samples.len()]
        };
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width, self.height]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        assert!(Frame::new(2, 2, vec![0; 4]).is_some());
        assert!(Frame::new(2, 2, vec![0; 3]).is_none());
    }

    #[test]
    fn test_normalized_stretches_range() {
        let frame = Frame::normalized(2, 2, &[100.0, 150.0, 200.0, 125.0]).unwrap();
        assert_eq!(frame.pixels, vec![0, 128, 255, 64]);
    }

    #[test]
    fn test_normalized_handles_negative_values() {
        let frame = Frame::normalized(3, 1, &[-1000.0, 0.0, 1000.0]).unwrap();
        assert_eq!(frame.pixels, vec![0, 128, 255]);
    }

    #[test]
    fn test_normalized_flat_image() {
        let frame = Frame::normalized(2, 1, &[42.0, 42.0]).unwrap();
        assert_eq!(frame.pixels, vec![0, 0]);
    }
}
