//! One recognition pass, from unlock to shutdown.

use slipscan_engine::{
    Frame, License, PaymentResult, ProgressObserver, RecognitionEngine, RecognizerKind,
    ResultState,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::CoreResult;
use crate::guard::{EngineSession, ImageGuard, RecognizerSet};

/// What one recognizer found.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerOutcome {
    /// Recognizer that produced the result.
    pub kind: RecognizerKind,
    /// The recognizer's result, read after the run.
    pub result: PaymentResult,
}

impl RecognizerOutcome {
    /// Whether this recognizer reported a valid payment.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.result.state.is_valid()
    }
}

/// The outcome of a completed recognition pass.
///
/// Finding nothing is a normal outcome, reported here rather than as an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// Overall state returned by the runner.
    pub overall: ResultState,
    /// One entry per recognizer, in runner priority order.
    pub results: Vec<RecognizerOutcome>,
}

impl SessionReport {
    /// Whether any recognizer reported a valid payment.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.results.iter().any(RecognizerOutcome::is_valid)
    }

    /// The outcome of the recognizer of `kind`, if one was configured.
    #[must_use]
    pub fn outcome(&self, kind: RecognizerKind) -> Option<&RecognizerOutcome> {
        self.results.iter().find(|o| o.kind == kind)
    }

    /// Outcomes that reported a valid payment.
    pub fn winners(&self) -> impl Iterator<Item = &RecognizerOutcome> {
        self.results.iter().filter(|o| o.is_valid())
    }
}

/// Drives the engine through one ordered recognition pass.
///
/// The sequence is unlock, image, recognizers, runner, run, read results.
/// On success the objects are released image first, then the runner, then
/// every recognizer, and finally the engine session is shut down. When a
/// step fails, everything acquired before it is released before the error
/// is returned.
///
/// # Example
///
/// ```rust
/// use slipscan_core::{Config, Session};
/// use slipscan_engine::{Frame, License, MemoryEngine};
///
/// let engine = MemoryEngine::new();
/// let pixels = vec![0u8; 4 * 4 * 3];
/// let frame = Frame::packed_rgb(&pixels, 4, 4).unwrap();
///
/// let report = Session::new(&engine, Config::default())
///     .recognize(&License::new("key"), frame)
///     .unwrap();
/// assert!(!report.is_success());
/// assert_eq!(engine.live_objects(), 0);
/// ```
pub struct Session<'e, E: RecognitionEngine> {
    engine: &'e E,
    config: Config,
}

impl<'e, E: RecognitionEngine> Session<'e, E> {
    /// Creates a session over `engine`.
    pub fn new(engine: &'e E, config: Config) -> Self {
        Self { engine, config }
    }

    /// The session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one recognition pass over `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the engine cannot
    /// be unlocked, the frame is rejected, or a recognizer or the runner
    /// cannot be created.
    pub fn recognize(&self, license: &License, frame: Frame<'_>) -> CoreResult<SessionReport> {
        self.recognize_with_progress(license, frame, None)
    }

    /// Like [`Session::recognize`], reporting progress to `progress`.
    ///
    /// # Errors
    ///
    /// Same as [`Session::recognize`].
    pub fn recognize_with_progress(
        &self,
        license: &License,
        frame: Frame<'_>,
        progress: Option<&mut dyn ProgressObserver>,
    ) -> CoreResult<SessionReport> {
        self.config.validate()?;

        let session = EngineSession::unlock(self.engine, license)?;
        let image = ImageGuard::wrap(&session, frame)?;
        let recognizers = RecognizerSet::create(&session, &self.config.recognizers)?;
        let runner = recognizers.runner(&self.config.runner)?;

        let overall = runner.run(&image, self.config.reset_pending, progress);
        let results = recognizers.read_results();
        for outcome in &results {
            if outcome.is_valid() {
                info!(
                    recognizer = outcome.kind.label(),
                    iban = %outcome.result.iban,
                    amount_eur = %outcome.result.amount_eur,
                    "valid payment"
                );
            } else {
                info!(
                    recognizer = outcome.kind.label(),
                    state = ?outcome.result.state,
                    "no valid payment"
                );
            }
        }
        if overall == ResultState::Empty {
            warn!("nothing recognized");
        }

        image.release();
        runner.release();
        recognizers.release();
        session.close();

        Ok(SessionReport { overall, results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipscan_engine::{Amount, EngineEvent, MemoryEngine};

    fn pixels() -> Vec<u8> {
        vec![0u8; 8 * 8 * 3]
    }

    #[test]
    fn success_path_teardown_order() {
        let engine = MemoryEngine::new().with_detection(
            RecognizerKind::Pdf417Payment,
            PaymentResult::valid("HR1210010051863000160", Amount::from_minor(10_000)),
        );
        let pixels = pixels();
        let frame = Frame::packed_rgb(&pixels, 8, 8).unwrap();

        let report = Session::new(&engine, Config::default())
            .recognize(&License::new("key"), frame)
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.overall, ResultState::Valid);

        let events = engine.events();
        let tail: Vec<_> = events[events.len() - 5..].to_vec();
        assert!(matches!(tail[0], EngineEvent::ImageDisposed(_)));
        assert!(matches!(tail[1], EngineEvent::RunnerDisposed(_)));
        assert!(matches!(tail[2], EngineEvent::RecognizerDisposed(_)));
        assert!(matches!(tail[3], EngineEvent::RecognizerDisposed(_)));
        assert_eq!(tail[4], EngineEvent::Shutdown);
        assert!(engine.violations().is_empty());
    }

    #[test]
    fn report_lookup() {
        let report = SessionReport {
            overall: ResultState::Valid,
            results: vec![
                RecognizerOutcome {
                    kind: RecognizerKind::Pdf417Payment,
                    result: PaymentResult::empty(),
                },
                RecognizerOutcome {
                    kind: RecognizerKind::QrPayment,
                    result: PaymentResult::valid("HR1", Amount::from_minor(5)),
                },
            ],
        };

        assert!(report.is_success());
        assert_eq!(report.winners().count(), 1);
        assert!(report.outcome(RecognizerKind::QrPayment).unwrap().is_valid());
        assert!(!report
            .outcome(RecognizerKind::Pdf417Payment)
            .unwrap()
            .is_valid());
    }

    #[test]
    fn invalid_config_touches_nothing() {
        let engine = MemoryEngine::new();
        let pixels = pixels();
        let frame = Frame::packed_rgb(&pixels, 8, 8).unwrap();

        let err = Session::new(&engine, Config::new().recognizers(Vec::new()))
            .recognize(&License::new("key"), frame)
            .unwrap_err();
        assert_eq!(err.stage(), "config");
        assert!(engine.events().is_empty());
    }
}
