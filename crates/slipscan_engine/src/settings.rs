//! License and recognizer settings.

use std::fmt;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

/// Default EUR to HRK conversion rate applied by payment recognizers.
pub const DEFAULT_CONVERSION_RATE: f32 = 7.5345;

/// License material used to unlock the engine.
///
/// The key is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct License {
    key: Zeroizing<String>,
    licensee: Option<String>,
    cache_dir: PathBuf,
}

impl License {
    /// Creates a license for a key issued without a licensee.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Zeroizing::new(key.into()),
            licensee: None,
            cache_dir: PathBuf::from("."),
        }
    }

    /// Binds the key to a licensee.
    #[must_use]
    pub fn with_licensee(mut self, licensee: impl Into<String>) -> Self {
        self.licensee = Some(licensee.into());
        self
    }

    /// Sets where the engine persists license state.
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// The license key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The licensee, if the key is bound to one.
    #[must_use]
    pub fn licensee(&self) -> Option<&str> {
        self.licensee.as_deref()
    }

    /// Directory for persisted license state.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

impl fmt::Debug for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("License")
            .field("key", &"<redacted>")
            .field("licensee", &self.licensee)
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}

/// Symbologies a payment recognizer can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecognizerKind {
    /// PDF417 payment slip barcode.
    Pdf417Payment,
    /// QR payment slip code.
    QrPayment,
}

impl RecognizerKind {
    /// Short label used in console output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pdf417Payment => "PDF417",
            Self::QrPayment => "QR",
        }
    }
}

impl fmt::Display for RecognizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf417Payment => f.write_str("PDF417 payment recognizer"),
            Self::QrPayment => f.write_str("QR payment recognizer"),
        }
    }
}

/// Settings shared by both payment recognizers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommonPaymentSettings {
    /// Rate used to convert HRK amounts to EUR.
    pub conversion_rate: f32,
}

impl Default for CommonPaymentSettings {
    fn default() -> Self {
        Self {
            conversion_rate: DEFAULT_CONVERSION_RATE,
        }
    }
}

/// Settings for the PDF417 payment recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pdf417PaymentSettings {
    /// Shared payment settings.
    pub common: CommonPaymentSettings,
    /// Accept barcodes with missing rows, at the cost of completeness.
    pub uncertain_decoding: bool,
}

impl Default for Pdf417PaymentSettings {
    fn default() -> Self {
        Self {
            common: CommonPaymentSettings::default(),
            uncertain_decoding: true,
        }
    }
}

/// Settings for the QR payment recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QrPaymentSettings {
    /// Shared payment settings.
    pub common: CommonPaymentSettings,
    /// Scan more slowly and more thoroughly.
    pub slower_thorough_scan: bool,
}

impl Default for QrPaymentSettings {
    fn default() -> Self {
        Self {
            common: CommonPaymentSettings::default(),
            slower_thorough_scan: true,
        }
    }
}

/// Typed settings for one recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecognizerSettings {
    /// Build a PDF417 payment recognizer.
    Pdf417Payment(Pdf417PaymentSettings),
    /// Build a QR payment recognizer.
    QrPayment(QrPaymentSettings),
}

impl RecognizerSettings {
    /// Default settings for `kind`.
    #[must_use]
    pub fn default_for(kind: RecognizerKind) -> Self {
        match kind {
            RecognizerKind::Pdf417Payment => Self::Pdf417Payment(Pdf417PaymentSettings::default()),
            RecognizerKind::QrPayment => Self::QrPayment(QrPaymentSettings::default()),
        }
    }

    /// The recognizer kind these settings build.
    #[must_use]
    pub fn kind(&self) -> RecognizerKind {
        match self {
            Self::Pdf417Payment(_) => RecognizerKind::Pdf417Payment,
            Self::QrPayment(_) => RecognizerKind::QrPayment,
        }
    }

    /// Shared payment settings.
    #[must_use]
    pub fn common(&self) -> &CommonPaymentSettings {
        match self {
            Self::Pdf417Payment(s) => &s.common,
            Self::QrPayment(s) => &s.common,
        }
    }
}

/// Settings for a recognizer runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunnerSettings {
    /// Keep results from every matching recognizer instead of only the first.
    pub allow_multiple_results: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_key() {
        let license = License::new("sRwAAAMEdGVzdFS3").with_licensee("test");
        let printed = format!("{license:?}");
        assert!(!printed.contains("sRwAAAMEdGVzdFS3"));
        assert!(printed.contains("test"));
        assert_eq!(license.key(), "sRwAAAMEdGVzdFS3");
    }

    #[test]
    fn payment_defaults() {
        let pdf = Pdf417PaymentSettings::default();
        assert!(pdf.uncertain_decoding);
        assert!((pdf.common.conversion_rate - 7.5345).abs() < f32::EPSILON);

        let qr = QrPaymentSettings::default();
        assert!(qr.slower_thorough_scan);

        assert!(!RunnerSettings::default().allow_multiple_results);
    }

    #[test]
    fn settings_report_their_kind() {
        for kind in [RecognizerKind::Pdf417Payment, RecognizerKind::QrPayment] {
            assert_eq!(RecognizerSettings::default_for(kind).kind(), kind);
        }
    }
}
