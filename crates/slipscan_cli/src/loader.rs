//! Image file decoding.

use std::path::{Path, PathBuf};

use slipscan_engine::Frame;
use tracing::debug;

use crate::error::{CliError, CliResult};

/// A decoded image held as packed RGB24 rows.
#[derive(Debug)]
pub struct LoadedImage {
    path: PathBuf,
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl LoadedImage {
    /// Decodes the image at `path` into RGB24.
    ///
    /// Any format the `image` crate can read is accepted; alpha and
    /// grayscale images are converted.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded.
    pub fn open(path: &Path) -> CliResult<Self> {
        let decoded = image::open(path)
            .map_err(|source| CliError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        let (width, height) = decoded.dimensions();
        debug!(path = %path.display(), width, height, "image decoded");

        Ok(Self {
            path: path.to_path_buf(),
            pixels: decoded.into_raw(),
            width,
            height,
        })
    }

    /// Borrows the pixels as an engine frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is too large for the engine.
    pub fn frame(&self) -> CliResult<Frame<'_>> {
        Frame::packed_rgb(&self.pixels, self.width, self.height).map_err(|source| {
            CliError::ImageFrame {
                path: self.path.clone(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use slipscan_engine::PixelLayout;
    use slipscan_testkit::TestWorkspace;

    #[test]
    fn decodes_png_as_packed_rgb() {
        let ws = TestWorkspace::new();
        let path = ws.path().join("slip.png");
        RgbImage::from_pixel(5, 3, Rgb([10, 20, 30])).save(&path).unwrap();

        let loaded = LoadedImage::open(&path).unwrap();
        let frame = loaded.frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (5, 3));
        assert_eq!(frame.stride(), 15);
        assert_eq!(frame.layout(), PixelLayout::Rgb24);
        assert_eq!(&frame.pixels()[..3], &[10, 20, 30]);
    }

    #[test]
    fn drops_alpha() {
        let ws = TestWorkspace::new();
        let path = ws.path().join("slip.png");
        RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 128])).save(&path).unwrap();

        let loaded = LoadedImage::open(&path).unwrap();
        assert_eq!(loaded.frame().unwrap().pixels().len(), 12);
    }

    #[test]
    fn reports_undecodable_files() {
        let ws = TestWorkspace::new();
        let path = ws.write("slip.png", b"not a png");

        let err = LoadedImage::open(&path).unwrap_err();
        assert!(matches!(err, CliError::ImageLoad { .. }));
        assert!(err.to_string().contains("slip.png"));
    }
}
