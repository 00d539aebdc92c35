//! Session configuration.

use slipscan_engine::{RecognizerKind, RecognizerSettings, RunnerSettings};

use crate::error::{CoreError, CoreResult};

/// Configuration for a recognition session.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Recognizers to create, in runner priority order.
    pub recognizers: Vec<RecognizerSettings>,

    /// Runner settings.
    pub runner: RunnerSettings,

    /// Whether the runner should drop state left over from earlier passes.
    pub reset_pending: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recognizers: vec![
                RecognizerSettings::default_for(RecognizerKind::Pdf417Payment),
                RecognizerSettings::default_for(RecognizerKind::QrPayment),
            ],
            runner: RunnerSettings::default(),
            reset_pending: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the recognizer list.
    #[must_use]
    pub fn recognizers(mut self, recognizers: Vec<RecognizerSettings>) -> Self {
        self.recognizers = recognizers;
        self
    }

    /// Sets whether every matching recognizer keeps its result.
    #[must_use]
    pub fn allow_multiple_results(mut self, value: bool) -> Self {
        self.runner.allow_multiple_results = value;
        self
    }

    /// Sets whether to reset pending runner state before recognition.
    #[must_use]
    pub fn reset_pending(mut self, value: bool) -> Self {
        self.reset_pending = value;
        self
    }

    /// Checks that a session can be built from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no recognizer is configured or a kind appears
    /// twice.
    pub fn validate(&self) -> CoreResult<()> {
        if self.recognizers.is_empty() {
            return Err(CoreError::invalid_config("no recognizers configured"));
        }
        for (i, settings) in self.recognizers.iter().enumerate() {
            if self.recognizers[..i]
                .iter()
                .any(|s| s.kind() == settings.kind())
            {
                return Err(CoreError::invalid_config(format!(
                    "{} configured more than once",
                    settings.kind()
                )));
            }
        }
        Ok(())
    }
}
