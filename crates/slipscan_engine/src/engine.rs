//! Recognition engine trait definition.

use crate::error::{CreateResult, ImageResult, UnlockError};
use crate::frame::Frame;
use crate::result::{PaymentResult, ResultState};
use crate::settings::{License, RecognizerSettings, RunnerSettings};

/// What the engine should do after a progress report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressControl {
    /// Keep recognizing.
    Continue,
    /// Stop as soon as possible and report what was found so far.
    Cancel,
}

/// Receives progress reports during a recognition pass.
pub trait ProgressObserver {
    /// Called with the completed share of the pass, 0-100.
    fn on_progress(&mut self, percent: u8) -> ProgressControl;
}

impl<F> ProgressObserver for F
where
    F: FnMut(u8) -> ProgressControl,
{
    fn on_progress(&mut self, percent: u8) -> ProgressControl {
        self(percent)
    }
}

/// A payment-barcode recognition engine.
///
/// Engines are **opaque native libraries** with manually managed objects.
/// The handle types are move-only: they are neither `Copy` nor `Clone`, and
/// every `dispose_*` method takes its handle by value, so each handle is
/// released at most once.
///
/// # Invariants
///
/// - An `Image<'buf>` borrows the pixel buffer it was made from.
/// - A `Runner<'r>` borrows every recognizer it was built from, so no
///   recognizer can be disposed while a runner referencing it is alive.
/// - `shutdown` is the last call made on an unlocked engine.
///
/// # Implementors
///
/// - [`super::MemoryEngine`] - Scripted engine for testing
pub trait RecognitionEngine {
    /// A wrapped recognition image.
    type Image<'buf>;
    /// A configured recognizer.
    type Recognizer;
    /// A runner bound to a set of recognizers.
    type Runner<'r>;

    /// Unlocks the engine with `license`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid, expired, bound to another
    /// licensee, or the license cache cannot be used.
    fn unlock(&self, license: &License) -> Result<(), UnlockError>;

    /// Wraps `frame` as a recognition image without copying it.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine does not accept the frame's layout or
    /// dimensions.
    fn make_image<'buf>(&self, frame: Frame<'buf>) -> ImageResult<Self::Image<'buf>>;

    /// Creates a recognizer from typed settings.
    ///
    /// # Errors
    ///
    /// Returns an error if allocation fails, the settings are rejected, or
    /// the license does not cover the recognizer.
    fn make_recognizer(&self, settings: &RecognizerSettings) -> CreateResult<Self::Recognizer>;

    /// Creates a runner over `recognizers`, in priority order.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot create the runner.
    fn make_runner<'r>(
        &self,
        recognizers: &[&'r Self::Recognizer],
        settings: &RunnerSettings,
    ) -> CreateResult<Self::Runner<'r>>;

    /// Runs one blocking recognition pass over `image`.
    ///
    /// Engine-side failures are reported through the returned state.
    fn run(
        &self,
        runner: &Self::Runner<'_>,
        image: &Self::Image<'_>,
        reset_pending: bool,
        progress: Option<&mut dyn ProgressObserver>,
    ) -> ResultState;

    /// Reads a snapshot of `recognizer`'s latest result.
    fn read_result(&self, recognizer: &Self::Recognizer) -> PaymentResult;

    /// Releases an image.
    fn dispose_image(&self, image: Self::Image<'_>);

    /// Releases a runner.
    fn dispose_runner(&self, runner: Self::Runner<'_>);

    /// Releases a recognizer.
    fn dispose_recognizer(&self, recognizer: Self::Recognizer);

    /// Ends the unlocked engine session.
    fn shutdown(&self);
}
