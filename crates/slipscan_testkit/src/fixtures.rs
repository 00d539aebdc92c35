//! Test fixtures and engine helpers.
//!
//! Provides sample pixel buffers, payment results, scripted engines and
//! temporary file workspaces for common test scenarios.

use std::path::{Path, PathBuf};

use slipscan_engine::{Amount, Frame, PaymentDate, PaymentResult, RecognizerKind, ResultState};
use tempfile::TempDir;

/// IBAN carried by the sample payment slip.
pub const SAMPLE_IBAN: &str = "HR1210010051863000160";

/// Amount carried by the sample payment slip, in euro cents.
pub const SAMPLE_AMOUNT_CENTS: i64 = 10_000;

/// A valid payment matching the sample slip.
pub fn sample_payment() -> PaymentResult {
    PaymentResult {
        payer_name: "Ivan Horvat".into(),
        payer_address: "Ilica 1, 10000 Zagreb".into(),
        recipient_name: "Komunalno d.o.o.".into(),
        recipient_address: "Trg bana 5, 10000 Zagreb".into(),
        reference_model: "HR01".into(),
        reference: "7336-68949637625-00008".into(),
        purpose_code: "COST".into(),
        payment_description: "Komunalna naknada".into(),
        due_date: Some(PaymentDate {
            day: 15,
            month: 3,
            year: 2024,
        }),
        ..PaymentResult::valid(SAMPLE_IBAN, Amount::from_minor(SAMPLE_AMOUNT_CENTS))
    }
}

/// A payment decoded with missing data.
pub fn uncertain_payment() -> PaymentResult {
    PaymentResult {
        state: ResultState::Uncertain,
        uncertain: true,
        ..PaymentResult::valid(SAMPLE_IBAN, Amount::from_minor(0))
    }
}

/// An owned packed RGB24 pixel buffer.
#[derive(Debug, Clone)]
pub struct TestImage {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl TestImage {
    /// Creates a white image.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0xff; (width * height * 3) as usize],
            width,
            height,
        }
    }

    /// Creates an image of black and white vertical bars.
    pub fn bars(width: u32, height: u32) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..height {
            for x in 0..width {
                let v = if (x / 2) % 2 == 0 { 0x00 } else { 0xff };
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    /// The raw pixel bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Borrows the buffer as a frame.
    pub fn frame(&self) -> Frame<'_> {
        Frame::packed_rgb(&self.pixels, self.width, self.height)
            .expect("Test image dimensions should be valid")
    }
}

/// A temporary directory for config and image files, removed on drop.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Creates an empty workspace.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// The workspace root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `contents` to `name` inside the workspace.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write workspace file");
        path
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Scripted engines for common scenarios.
pub mod scenarios {
    use super::*;
    use slipscan_engine::{CreateError, MemoryEngine, UnlockError};

    /// An engine whose PDF417 recognizer finds the sample slip.
    pub fn pdf417_slip() -> MemoryEngine {
        MemoryEngine::new().with_detection(RecognizerKind::Pdf417Payment, sample_payment())
    }

    /// An engine whose QR recognizer finds the sample slip.
    pub fn qr_slip() -> MemoryEngine {
        MemoryEngine::new().with_detection(RecognizerKind::QrPayment, sample_payment())
    }

    /// An engine where both recognizers find the sample slip.
    pub fn both_slips() -> MemoryEngine {
        MemoryEngine::new()
            .with_detection(RecognizerKind::Pdf417Payment, sample_payment())
            .with_detection(RecognizerKind::QrPayment, sample_payment())
    }

    /// An engine that finds nothing.
    pub fn blank() -> MemoryEngine {
        MemoryEngine::new()
    }

    /// An engine that rejects every license.
    pub fn unlicensed() -> MemoryEngine {
        MemoryEngine::new().reject_unlock(UnlockError::InvalidKey)
    }

    /// An engine whose `index`th recognizer cannot be allocated.
    pub fn failing_recognizer(index: usize) -> MemoryEngine {
        pdf417_slip().fail_recognizer(index, CreateError::allocation("payment recognizer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_frames() {
        let image = TestImage::bars(8, 4);
        let frame = image.frame();
        assert_eq!(frame.width(), 8);
        assert_eq!(frame.stride(), 24);
        assert_eq!(image.pixels()[0], 0x00);
        assert_eq!(image.pixels()[6], 0xff);
    }

    #[test]
    fn workspace_writes_files() {
        let ws = TestWorkspace::new();
        let path = ws.write("config.json", "{}");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
    }

    #[test]
    fn sample_payment_is_valid() {
        let payment = sample_payment();
        assert!(payment.state.is_valid());
        assert_eq!(payment.amount_eur.to_string(), "100.00");
    }
}
