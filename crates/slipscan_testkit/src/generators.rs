//! Property-based test generators using proptest.
//!
//! Provides strategies for scripting engine behavior, so lifecycle
//! properties can be checked across every failure point.

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use slipscan_engine::{
    Amount, CreateError, ImageError, MemoryEngine, PaymentResult, RecognizerKind, ResultState,
    UnlockError,
};

/// Step of a recognition pass at which a scripted engine fails.
#[derive(Debug, Clone, PartialEq)]
pub enum FailurePoint {
    /// Nothing fails.
    None,
    /// `unlock` fails.
    Unlock(UnlockError),
    /// `make_image` fails.
    Image,
    /// The recognizer at this index (0-based) fails.
    Recognizer(usize),
    /// `make_runner` fails.
    Runner,
}

impl FailurePoint {
    /// Scripts the failure onto `engine`.
    pub fn apply(&self, engine: MemoryEngine) -> MemoryEngine {
        match self {
            Self::None => engine,
            Self::Unlock(err) => engine.reject_unlock(err.clone()),
            Self::Image => engine.reject_image(ImageError::Engine("out of memory".into())),
            Self::Recognizer(index) => {
                engine.fail_recognizer(*index, CreateError::allocation("payment recognizer"))
            }
            Self::Runner => engine.fail_runner(CreateError::allocation("recognizer runner")),
        }
    }
}

/// Strategy for generating unlock failures.
pub fn unlock_error_strategy() -> impl Strategy<Value = UnlockError> {
    prop_oneof![
        Just(UnlockError::InvalidKey),
        Just(UnlockError::Expired),
        "[a-z]{1,12}".prop_map(|licensee| UnlockError::LicenseeMismatch { licensee }),
        "[a-z ]{1,20}".prop_map(UnlockError::Cache),
        "[a-z ]{1,20}".prop_map(UnlockError::Network),
    ]
}

/// Strategy for generating failure points for a pass with
/// `recognizers` recognizers.
pub fn failure_point_strategy(recognizers: usize) -> impl Strategy<Value = FailurePoint> {
    prop_oneof![
        Just(FailurePoint::None),
        unlock_error_strategy().prop_map(FailurePoint::Unlock),
        Just(FailurePoint::Image),
        (0..recognizers.max(1)).prop_map(FailurePoint::Recognizer),
        Just(FailurePoint::Runner),
    ]
}

/// Strategy for generating Croatian IBANs.
pub fn iban_strategy() -> impl Strategy<Value = String> {
    "HR[0-9]{19}"
}

/// Strategy for generating payment results in any state.
pub fn payment_result_strategy() -> impl Strategy<Value = PaymentResult> {
    (
        prop_oneof![
            Just(ResultState::Empty),
            Just(ResultState::Uncertain),
            Just(ResultState::StageValid),
            Just(ResultState::Valid),
        ],
        iban_strategy(),
        0i64..10_000_000,
    )
        .prop_map(|(state, iban, cents)| PaymentResult {
            state,
            ..PaymentResult::valid(iban, Amount::from_minor(cents))
        })
}

/// Strategy for generating what each recognizer kind finds.
pub fn detections_strategy() -> impl Strategy<Value = Vec<(RecognizerKind, PaymentResult)>> {
    (
        prop::option::of(payment_result_strategy()),
        prop::option::of(payment_result_strategy()),
    )
        .prop_map(|(pdf417, qr)| {
            let mut detections = Vec::new();
            if let Some(result) = pdf417 {
                detections.push((RecognizerKind::Pdf417Payment, result));
            }
            if let Some(result) = qr {
                detections.push((RecognizerKind::QrPayment, result));
            }
            detections
        })
}

/// Builds an engine that finds `detections`.
pub fn scripted_engine(detections: &[(RecognizerKind, PaymentResult)]) -> MemoryEngine {
    detections
        .iter()
        .cloned()
        .fold(MemoryEngine::new(), |engine, (kind, result)| {
            engine.with_detection(kind, result)
        })
}

/// Strategy for generating frame geometry: width, height and stride
/// padding in bytes.
pub fn frame_geometry_strategy() -> impl Strategy<Value = (u16, u16, u16)> {
    (1u16..64, 1u16..64, 0u16..8)
}

/// Configuration for property tests.
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest's configuration.
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
