//! Config file loading and merging with command-line options.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use slipscan_core::Config;
use slipscan_engine::{
    CommonPaymentSettings, License, Pdf417PaymentSettings, QrPaymentSettings, RecognizerSettings,
    DEFAULT_CONVERSION_RATE,
};
use zeroize::Zeroize;

use crate::error::{CliError, CliResult};

/// JSON config file layout.
///
/// ```json
/// {
///   "license_key": "...",
///   "licensee": "demo",
///   "cache_dir": "/var/cache/slipscan",
///   "allow_multiple_results": false,
///   "conversion_rate": 7.5345,
///   "pdf417": { "uncertain_decoding": true },
///   "qr": { "slower_thorough_scan": true }
/// }
/// ```
#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// License key.
    pub license_key: Option<String>,
    /// Licensee the key was issued to.
    pub licensee: Option<String>,
    /// Directory for the engine's license cache.
    pub cache_dir: Option<PathBuf>,
    /// Keep results from every matching recognizer.
    pub allow_multiple_results: Option<bool>,
    /// Drop runner state left over from earlier passes.
    pub reset_pending: Option<bool>,
    /// EUR to HRK conversion rate for both recognizers.
    pub conversion_rate: Option<f32>,
    /// PDF417 recognizer options. Setting `enabled` to false removes it.
    pub pdf417: Option<Pdf417Section>,
    /// QR recognizer options. Setting `enabled` to false removes it.
    pub qr: Option<QrSection>,
}

/// PDF417 section of the config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pdf417Section {
    /// Whether to create the recognizer.
    #[serde(default = "enabled")]
    pub enabled: bool,
    /// Accept barcodes with missing rows.
    pub uncertain_decoding: Option<bool>,
}

/// QR section of the config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QrSection {
    /// Whether to create the recognizer.
    #[serde(default = "enabled")]
    pub enabled: bool,
    /// Scan more slowly and more thoroughly.
    pub slower_thorough_scan: Option<bool>,
}

fn enabled() -> bool {
    true
}

impl Drop for ConfigFile {
    fn drop(&mut self) {
        if let Some(key) = self.license_key.as_mut() {
            key.zeroize();
        }
    }
}

impl ConfigFile {
    /// Loads a config file from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> CliResult<Self> {
        let mut text = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = serde_json::from_str(&text).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        });
        text.zeroize();
        parsed
    }

    fn recognizers(&self) -> Vec<RecognizerSettings> {
        let common = CommonPaymentSettings {
            conversion_rate: self.conversion_rate.unwrap_or(DEFAULT_CONVERSION_RATE),
        };
        let mut recognizers = Vec::with_capacity(2);

        let pdf417 = self.pdf417.as_ref();
        if pdf417.is_none_or(|s| s.enabled) {
            let defaults = Pdf417PaymentSettings::default();
            recognizers.push(RecognizerSettings::Pdf417Payment(Pdf417PaymentSettings {
                common,
                uncertain_decoding: pdf417
                    .and_then(|s| s.uncertain_decoding)
                    .unwrap_or(defaults.uncertain_decoding),
            }));
        }

        let qr = self.qr.as_ref();
        if qr.is_none_or(|s| s.enabled) {
            let defaults = QrPaymentSettings::default();
            recognizers.push(RecognizerSettings::QrPayment(QrPaymentSettings {
                common,
                slower_thorough_scan: qr
                    .and_then(|s| s.slower_thorough_scan)
                    .unwrap_or(defaults.slower_thorough_scan),
            }));
        }

        recognizers
    }
}

/// License and session options given on the command line or in the
/// environment. These take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    /// `--license-key` / `SLIPSCAN_LICENSE_KEY`.
    pub license_key: Option<String>,
    /// `--licensee` / `SLIPSCAN_LICENSEE`.
    pub licensee: Option<String>,
    /// `--cache-dir` / `SLIPSCAN_CACHE_DIR`.
    pub cache_dir: Option<PathBuf>,
    /// `--allow-multiple-results`.
    pub allow_multiple_results: bool,
}

/// Merges `overrides` over `file` into the license and session config.
///
/// # Errors
///
/// Returns an error if no license key is available or the resulting
/// session config is invalid.
pub fn resolve(mut overrides: Overrides, mut file: ConfigFile) -> CliResult<(License, Config)> {
    let key = overrides
        .license_key
        .take()
        .or_else(|| file.license_key.take())
        .filter(|k| !k.is_empty())
        .ok_or(CliError::MissingLicenseKey)?;

    let mut license = License::new(key);
    if let Some(licensee) = overrides.licensee.take().or_else(|| file.licensee.take()) {
        license = license.with_licensee(licensee);
    }
    if let Some(dir) = overrides.cache_dir.take().or_else(|| file.cache_dir.take()) {
        license = license.with_cache_dir(dir);
    }

    let config = Config::new()
        .recognizers(file.recognizers())
        .allow_multiple_results(
            overrides.allow_multiple_results || file.allow_multiple_results.unwrap_or(false),
        )
        .reset_pending(file.reset_pending.unwrap_or(false));
    config.validate()?;

    Ok((license, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipscan_engine::RecognizerKind;
    use slipscan_testkit::TestWorkspace;

    fn overrides(key: Option<&str>) -> Overrides {
        Overrides {
            license_key: key.map(str::to_owned),
            ..Overrides::default()
        }
    }

    #[test]
    fn defaults_without_file() {
        let (license, config) = resolve(overrides(Some("k")), ConfigFile::default()).unwrap();
        assert_eq!(license.key(), "k");
        assert_eq!(license.licensee(), None);
        assert_eq!(license.cache_dir(), Path::new("."));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = resolve(overrides(None), ConfigFile::default()).unwrap_err();
        assert!(matches!(err, CliError::MissingLicenseKey));

        let err = resolve(overrides(Some("")), ConfigFile::default()).unwrap_err();
        assert!(matches!(err, CliError::MissingLicenseKey));
    }

    #[test]
    fn flags_take_precedence_over_file() {
        let ws = TestWorkspace::new();
        let path = ws.write(
            "slipscan.json",
            r#"{
                "license_key": "file-key",
                "licensee": "file-licensee",
                "cache_dir": "/tmp/cache",
                "conversion_rate": 7.0,
                "qr": { "slower_thorough_scan": false }
            }"#,
        );
        let file = ConfigFile::load(&path).unwrap();
        let flags = Overrides {
            licensee: Some("flag-licensee".into()),
            allow_multiple_results: true,
            ..Overrides::default()
        };

        let (license, config) = resolve(flags, file).unwrap();
        assert_eq!(license.key(), "file-key");
        assert_eq!(license.licensee(), Some("flag-licensee"));
        assert_eq!(license.cache_dir(), Path::new("/tmp/cache"));
        assert!(config.runner.allow_multiple_results);

        match config.recognizers[1] {
            RecognizerSettings::QrPayment(qr) => {
                assert!(!qr.slower_thorough_scan);
                assert!((qr.common.conversion_rate - 7.0).abs() < f32::EPSILON);
            }
            other => panic!("unexpected recognizer {other:?}"),
        }
    }

    #[test]
    fn disabled_recognizer_is_dropped() {
        let ws = TestWorkspace::new();
        let path = ws.write("slipscan.json", r#"{ "pdf417": { "enabled": false } }"#);
        let file = ConfigFile::load(&path).unwrap();

        let (_, config) = resolve(overrides(Some("k")), file).unwrap();
        let kinds: Vec<_> = config.recognizers.iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, [RecognizerKind::QrPayment]);
    }

    #[test]
    fn disabling_every_recognizer_is_rejected() {
        let ws = TestWorkspace::new();
        let path = ws.write(
            "slipscan.json",
            r#"{ "pdf417": { "enabled": false }, "qr": { "enabled": false } }"#,
        );
        let file = ConfigFile::load(&path).unwrap();

        let err = resolve(overrides(Some("k")), file).unwrap_err();
        assert!(matches!(err, CliError::Session(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let ws = TestWorkspace::new();
        let path = ws.write("slipscan.json", r#"{ "licence_key": "typo" }"#);
        assert!(matches!(
            ConfigFile::load(&path),
            Err(CliError::ConfigParse { .. })
        ));
    }

    #[test]
    fn unreadable_file_is_reported() {
        let ws = TestWorkspace::new();
        let missing = ws.path().join("missing.json");
        assert!(matches!(
            ConfigFile::load(&missing),
            Err(CliError::ConfigRead { .. })
        ));
    }
}
