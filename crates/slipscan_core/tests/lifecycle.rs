//! Lifecycle tests for recognition sessions against the scripted engine.

use proptest::prelude::*;
use slipscan_core::{Config, CoreError, Session};
use slipscan_engine::{
    CreateError, EngineEvent, Frame, ImageError, License, MemoryEngine, PixelLayout,
    ProgressControl, RecognizerKind, ResultState,
};
use slipscan_testkit::prelude::*;

fn license() -> License {
    License::new("test-key").with_licensee("slipscan-tests")
}

fn count(engine: &MemoryEngine, pred: impl Fn(&EngineEvent) -> bool) -> usize {
    engine.events().iter().filter(|e| pred(e)).count()
}

fn shutdowns(engine: &MemoryEngine) -> usize {
    count(engine, |e| *e == EngineEvent::Shutdown)
}

fn image_disposals(engine: &MemoryEngine) -> usize {
    count(engine, |e| matches!(e, EngineEvent::ImageDisposed(_)))
}

fn runner_disposals(engine: &MemoryEngine) -> usize {
    count(engine, |e| matches!(e, EngineEvent::RunnerDisposed(_)))
}

fn recognizer_disposals(engine: &MemoryEngine) -> usize {
    count(engine, |e| matches!(e, EngineEvent::RecognizerDisposed(_)))
}

#[test]
fn valid_pdf417_slip() {
    let engine = scenarios::pdf417_slip();
    let image = TestImage::bars(64, 32);

    let report = Session::new(&engine, Config::default())
        .recognize(&license(), image.frame())
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.overall, ResultState::Valid);
    let pdf417 = report.outcome(RecognizerKind::Pdf417Payment).unwrap();
    assert_eq!(pdf417.result.iban, SAMPLE_IBAN);
    assert_eq!(pdf417.result.amount_eur.to_string(), "100.00");
    assert!(!report.outcome(RecognizerKind::QrPayment).unwrap().is_valid());

    assert_eq!(image_disposals(&engine), 1);
    assert_eq!(runner_disposals(&engine), 1);
    assert_eq!(recognizer_disposals(&engine), 2);
    assert_eq!(shutdowns(&engine), 1);
    assert!(engine.violations().is_empty());
}

#[test]
fn success_disposes_image_runner_then_recognizers() {
    let engine = scenarios::qr_slip();
    let image = TestImage::blank(16, 16);

    Session::new(&engine, Config::default())
        .recognize(&license(), image.frame())
        .unwrap();

    let events = engine.events();
    let created: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::RecognizerCreated(id, _) => Some(*id),
            _ => None,
        })
        .collect();
    let disposed: Vec<_> = engine.disposals();

    assert!(matches!(disposed[0], EngineEvent::ImageDisposed(_)));
    assert!(matches!(disposed[1], EngineEvent::RunnerDisposed(_)));
    assert_eq!(
        disposed[2..],
        created
            .iter()
            .map(|id| EngineEvent::RecognizerDisposed(*id))
            .collect::<Vec<_>>()[..]
    );
    assert_eq!(events.last(), Some(&EngineEvent::Shutdown));
}

#[test]
fn nothing_recognized_is_not_an_error() {
    let engine = scenarios::blank();
    let image = TestImage::blank(16, 16);

    let report = Session::new(&engine, Config::default())
        .recognize(&license(), image.frame())
        .unwrap();

    assert_eq!(report.overall, ResultState::Empty);
    assert!(!report.is_success());
    assert_eq!(report.results.len(), 2);
    assert!(report.results.iter().all(|o| !o.is_valid()));
    assert_eq!(
        count(&engine, |e| matches!(e, EngineEvent::ResultRead(_))),
        2
    );
    assert_eq!(engine.live_objects(), 0);
}

#[test]
fn second_recognizer_failure_unwinds() {
    let engine = scenarios::failing_recognizer(1);
    let image = TestImage::blank(16, 16);

    let err = Session::new(&engine, Config::default())
        .recognize(&license(), image.frame())
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Create(CreateError::Allocation { .. })
    ));
    assert_eq!(recognizer_disposals(&engine), 1);
    assert_eq!(image_disposals(&engine), 1);
    assert_eq!(runner_disposals(&engine), 0);
    assert_eq!(shutdowns(&engine), 1);
    assert_eq!(engine.live_objects(), 0);
    assert!(engine.violations().is_empty());
}

#[test]
fn first_recognizer_failure_releases_only_image() {
    let engine = scenarios::failing_recognizer(0);
    let image = TestImage::blank(16, 16);

    let err = Session::new(&engine, Config::default())
        .recognize(&license(), image.frame())
        .unwrap_err();

    assert_eq!(err.stage(), "create");
    assert_eq!(recognizer_disposals(&engine), 0);
    assert_eq!(image_disposals(&engine), 1);
    assert_eq!(shutdowns(&engine), 1);
}

#[test]
fn runner_failure_releases_recognizers_and_image() {
    let engine = scenarios::pdf417_slip().fail_runner(CreateError::allocation("recognizer runner"));
    let image = TestImage::blank(16, 16);

    let err = Session::new(&engine, Config::default())
        .recognize(&license(), image.frame())
        .unwrap_err();

    assert_eq!(err.stage(), "create");
    assert_eq!(recognizer_disposals(&engine), 2);
    assert_eq!(image_disposals(&engine), 1);
    assert_eq!(runner_disposals(&engine), 0);
    assert_eq!(engine.live_objects(), 0);
}

#[test]
fn unlock_failure_holds_nothing() {
    let engine = scenarios::unlicensed();
    let image = TestImage::blank(16, 16);

    let err = Session::new(&engine, Config::default())
        .recognize(&license(), image.frame())
        .unwrap_err();

    assert_eq!(err.stage(), "unlock");
    assert_eq!(engine.events(), [EngineEvent::UnlockRejected]);
}

#[test]
fn oversized_stride_is_rejected_before_the_engine() {
    let pixels = vec![0u8; 30];
    let err = Frame::new(&pixels, 4, 4, 12, PixelLayout::Rgb24).unwrap_err();
    assert_eq!(
        err,
        ImageError::BufferTooSmall {
            required: 48,
            actual: 30
        }
    );
}

#[test]
fn engine_image_rejection_leaves_no_image() {
    let engine = scenarios::pdf417_slip().reject_image(ImageError::Engine("no memory".into()));
    let image = TestImage::blank(16, 16);

    let err = Session::new(&engine, Config::default())
        .recognize(&license(), image.frame())
        .unwrap_err();

    assert_eq!(err.stage(), "image");
    assert_eq!(
        count(&engine, |e| matches!(e, EngineEvent::ImageCreated(_))),
        0
    );
    assert_eq!(image_disposals(&engine), 0);
    assert_eq!(shutdowns(&engine), 1);
}

#[test]
fn non_rgb_frame_is_rejected() {
    let engine = scenarios::pdf417_slip();
    let pixels = vec![0u8; 64];
    let frame = Frame::new(&pixels, 4, 4, 16, PixelLayout::Rgba32).unwrap();

    let err = Session::new(&engine, Config::default())
        .recognize(&license(), frame)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Image(ImageError::UnsupportedLayout(PixelLayout::Rgba32))
    ));
}

#[test]
fn first_match_wins_without_multiple_results() {
    let engine = scenarios::both_slips();
    let image = TestImage::blank(16, 16);

    let report = Session::new(&engine, Config::default())
        .recognize(&license(), image.frame())
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.winners().count(), 1);
    assert_eq!(report.winners().next().unwrap().kind, RecognizerKind::Pdf417Payment);
}

#[test]
fn multiple_results_keep_every_match() {
    let engine = scenarios::both_slips();
    let image = TestImage::blank(16, 16);

    let report = Session::new(&engine, Config::new().allow_multiple_results(true))
        .recognize(&license(), image.frame())
        .unwrap();

    assert_eq!(report.winners().count(), 2);
}

#[test]
fn progress_can_cancel_recognition() {
    let engine = scenarios::pdf417_slip().cancellable();
    let image = TestImage::blank(16, 16);
    let mut seen = Vec::new();
    let mut observer = |percent: u8| {
        seen.push(percent);
        ProgressControl::Cancel
    };

    let report = Session::new(&engine, Config::default())
        .recognize_with_progress(&license(), image.frame(), Some(&mut observer))
        .unwrap();

    assert_eq!(seen, [0]);
    assert!(!report.is_success());
    assert_eq!(engine.live_objects(), 0);
}

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn every_path_releases_everything_in_order(
        detections in detections_strategy(),
        failure in failure_point_strategy(2),
        allow_multiple in any::<bool>(),
    ) {
        let engine = failure.apply(scripted_engine(&detections));
        let image = TestImage::blank(8, 8);
        let config = Config::new().allow_multiple_results(allow_multiple);

        let outcome = Session::new(&engine, config).recognize(&license(), image.frame());

        prop_assert_eq!(engine.live_objects(), 0);
        prop_assert!(engine.violations().is_empty(), "{:?}", engine.violations());

        let unlocked = !matches!(failure, FailurePoint::Unlock(_));
        prop_assert_eq!(shutdowns(&engine), usize::from(unlocked));
        if unlocked {
            let events = engine.events();
            prop_assert_eq!(events.last(), Some(&EngineEvent::Shutdown));
        }

        match (&failure, outcome) {
            (FailurePoint::None, Ok(report)) => {
                let any_valid = detections.iter().any(|(_, r)| r.state.is_valid());
                prop_assert_eq!(report.is_success(), any_valid);
                prop_assert_eq!(runner_disposals(&engine), 1);
            }
            (FailurePoint::Recognizer(index), Err(_)) => {
                prop_assert_eq!(recognizer_disposals(&engine), *index);
                prop_assert_eq!(image_disposals(&engine), 1);
                prop_assert_eq!(runner_disposals(&engine), 0);
            }
            (FailurePoint::None, Err(e)) => {
                prop_assert!(false, "unexpected error: {}", e);
            }
            (_, Ok(_)) => {
                prop_assert!(false, "failure at {:?} was not reported", failure);
            }
            (_, Err(_)) => {}
        }
    }
}
