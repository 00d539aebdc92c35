//! Borrowed pixel buffers handed to the engine.

use crate::error::{ImageError, ImageResult};

/// Interleaved pixel layouts understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// 8-bit red, green, blue.
    Rgb24,
    /// 8-bit blue, green, red.
    Bgr24,
    /// 8-bit red, green, blue, alpha.
    Rgba32,
    /// 8-bit luminance.
    Gray8,
}

impl PixelLayout {
    /// Bytes occupied by a single pixel.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb24 | Self::Bgr24 => 3,
            Self::Rgba32 => 4,
            Self::Gray8 => 1,
        }
    }
}

/// A validated, non-owning view over caller pixel memory.
///
/// Construction checks that every row the engine will read lies inside
/// `pixels`, so a `Frame` never describes memory past the buffer end.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'buf> {
    pixels: &'buf [u8],
    width: u16,
    height: u16,
    stride: u16,
    layout: PixelLayout,
}

impl<'buf> Frame<'buf> {
    /// Creates a frame over `pixels`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `width` or `height` is zero
    /// - `stride` is shorter than `width * bytes_per_pixel`
    /// - `stride * height` exceeds `pixels.len()`
    pub fn new(
        pixels: &'buf [u8],
        width: u16,
        height: u16,
        stride: u16,
        layout: PixelLayout,
    ) -> ImageResult<Self> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions {
                width: u32::from(width),
                height: u32::from(height),
            });
        }

        let row_len = usize::from(width) * layout.bytes_per_pixel();
        if usize::from(stride) < row_len {
            return Err(ImageError::StrideTooSmall { stride, row_len });
        }

        let required = usize::from(stride) * usize::from(height);
        if required > pixels.len() {
            return Err(ImageError::BufferTooSmall {
                required,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            pixels,
            width,
            height,
            stride,
            layout,
        })
    }

    /// Creates a frame over tightly packed RGB24 rows of `width * 3` bytes.
    ///
    /// # Errors
    ///
    /// Fails when the dimensions do not fit the engine's 16-bit range or
    /// the buffer is too small.
    pub fn packed_rgb(pixels: &'buf [u8], width: u32, height: u32) -> ImageResult<Self> {
        let invalid = || ImageError::InvalidDimensions { width, height };
        let w = u16::try_from(width).map_err(|_| invalid())?;
        let h = u16::try_from(height).map_err(|_| invalid())?;
        let stride = width
            .checked_mul(3)
            .and_then(|s| u16::try_from(s).ok())
            .ok_or_else(invalid)?;
        Self::new(pixels, w, h, stride, PixelLayout::Rgb24)
    }

    /// The underlying pixel bytes.
    #[must_use]
    pub fn pixels(&self) -> &'buf [u8] {
        self.pixels
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Row stride in bytes.
    #[must_use]
    pub fn stride(&self) -> u16 {
        self.stride
    }

    /// Pixel layout.
    #[must_use]
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_padded_rows() {
        let pixels = vec![0u8; 16 * 4];
        let frame = Frame::new(&pixels, 5, 4, 16, PixelLayout::Rgb24).unwrap();
        assert_eq!(frame.stride(), 16);
        assert_eq!(frame.layout(), PixelLayout::Rgb24);
    }

    #[test]
    fn rejects_zero_dimensions() {
        let pixels = vec![0u8; 12];
        let err = Frame::new(&pixels, 0, 4, 3, PixelLayout::Rgb24).unwrap_err();
        assert!(matches!(err, ImageError::InvalidDimensions { .. }));
    }

    #[test]
    fn rejects_short_stride() {
        let pixels = vec![0u8; 100];
        let err = Frame::new(&pixels, 5, 2, 14, PixelLayout::Rgb24).unwrap_err();
        assert_eq!(
            err,
            ImageError::StrideTooSmall {
                stride: 14,
                row_len: 15
            }
        );
    }

    #[test]
    fn rejects_read_past_end() {
        let pixels = vec![0u8; 15 * 3 - 1];
        let err = Frame::new(&pixels, 5, 3, 15, PixelLayout::Rgb24).unwrap_err();
        assert_eq!(
            err,
            ImageError::BufferTooSmall {
                required: 45,
                actual: 44
            }
        );
    }

    #[test]
    fn packed_rgb_rejects_oversized_width() {
        let pixels = vec![0u8; 3];
        let err = Frame::packed_rgb(&pixels, 30_000, 1).unwrap_err();
        assert!(matches!(err, ImageError::InvalidDimensions { .. }));
    }

    proptest! {
        #[test]
        fn valid_frames_stay_in_bounds(
            width in 1u16..64,
            height in 1u16..64,
            padding in 0u16..8,
            slack in 0usize..32,
        ) {
            let stride = width * 3 + padding;
            let pixels = vec![0u8; usize::from(stride) * usize::from(height) + slack];
            let frame = Frame::new(&pixels, width, height, stride, PixelLayout::Rgb24).unwrap();
            prop_assert!(usize::from(frame.stride()) * usize::from(frame.height()) <= pixels.len());
        }

        #[test]
        fn truncated_buffers_are_rejected(
            width in 1u16..64,
            height in 1u16..64,
            missing in 1usize..16,
        ) {
            let stride = width * 3;
            let full = usize::from(stride) * usize::from(height);
            let pixels = vec![0u8; full.saturating_sub(missing)];
            let is_too_small = matches!(
                Frame::new(&pixels, width, height, stride, PixelLayout::Rgb24),
                Err(ImageError::BufferTooSmall { .. })
            );
            prop_assert!(is_too_small);
        }
    }
}
