//! Scripted in-memory engine for testing.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::engine::{ProgressControl, ProgressObserver, RecognitionEngine};
use crate::error::{CreateError, CreateResult, ImageError, ImageResult, UnlockError};
use crate::frame::{Frame, PixelLayout};
use crate::result::{PaymentResult, ResultState};
use crate::settings::{License, RecognizerKind, RecognizerSettings, RunnerSettings};

/// Identifier of an object created by a [`MemoryEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A call observed by a [`MemoryEngine`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// `unlock` succeeded.
    Unlocked,
    /// `unlock` failed.
    UnlockRejected,
    /// An image was created.
    ImageCreated(HandleId),
    /// A recognizer was created.
    RecognizerCreated(HandleId, RecognizerKind),
    /// A runner was created over the listed recognizers.
    RunnerCreated(HandleId, Vec<HandleId>),
    /// A recognition pass ran.
    Ran {
        /// Runner used.
        runner: HandleId,
        /// Image recognized.
        image: HandleId,
        /// Overall outcome.
        state: ResultState,
    },
    /// A recognizer's result was read.
    ResultRead(HandleId),
    /// An image was disposed.
    ImageDisposed(HandleId),
    /// A runner was disposed.
    RunnerDisposed(HandleId),
    /// A recognizer was disposed.
    RecognizerDisposed(HandleId),
    /// The engine session ended.
    Shutdown,
}

impl EngineEvent {
    /// Whether this event released an object.
    #[must_use]
    pub fn is_disposal(&self) -> bool {
        matches!(
            self,
            Self::ImageDisposed(_) | Self::RunnerDisposed(_) | Self::RecognizerDisposed(_)
        )
    }
}

/// An image created by a [`MemoryEngine`].
#[derive(Debug)]
pub struct MemoryImage<'buf> {
    id: HandleId,
    frame: Frame<'buf>,
}

impl MemoryImage<'_> {
    /// The image's identifier.
    #[must_use]
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Width of the wrapped frame.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.frame.width()
    }
}

/// A recognizer created by a [`MemoryEngine`].
#[derive(Debug)]
pub struct MemoryRecognizer {
    id: HandleId,
    kind: RecognizerKind,
}

impl MemoryRecognizer {
    /// The recognizer's identifier.
    #[must_use]
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// The recognizer's kind.
    #[must_use]
    pub fn kind(&self) -> RecognizerKind {
        self.kind
    }
}

/// A runner created by a [`MemoryEngine`].
#[derive(Debug)]
pub struct MemoryRunner<'r> {
    id: HandleId,
    members: Vec<(HandleId, RecognizerKind)>,
    settings: RunnerSettings,
    _recognizers: PhantomData<&'r MemoryRecognizer>,
}

impl MemoryRunner<'_> {
    /// The runner's identifier.
    #[must_use]
    pub fn id(&self) -> HandleId {
        self.id
    }
}

/// What a [`MemoryEngine`] should do when called.
#[derive(Debug, Clone, Default)]
struct Script {
    detections: Vec<(RecognizerKind, PaymentResult)>,
    unlock_error: Option<UnlockError>,
    image_error: Option<ImageError>,
    recognizer_failures: HashMap<usize, CreateError>,
    runner_error: Option<CreateError>,
    cancel_after_progress: bool,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    unlocked: bool,
    recognizers_requested: usize,
    events: Vec<EngineEvent>,
    live_images: HashSet<HandleId>,
    live_recognizers: HashSet<HandleId>,
    live_runners: HashMap<HandleId, Vec<HandleId>>,
    results: HashMap<HandleId, PaymentResult>,
    violations: Vec<String>,
}

impl State {
    fn allocate(&mut self) -> HandleId {
        self.next_id += 1;
        HandleId(self.next_id)
    }
}

/// A scripted recognition engine that records every call.
///
/// This engine decodes nothing. Each recognizer kind "finds" whatever
/// payment result was scripted for it with [`MemoryEngine::with_detection`],
/// and failures can be injected at every acquisition step. The recorded
/// [`EngineEvent`] log and the list of lifecycle violations make it
/// suitable for:
/// - Unit tests of session orchestration
/// - Property tests of teardown ordering
///
/// # Example
///
/// ```rust
/// use slipscan_engine::{Amount, MemoryEngine, PaymentResult, RecognizerKind};
///
/// let engine = MemoryEngine::new().with_detection(
///     RecognizerKind::Pdf417Payment,
///     PaymentResult::valid("HR1210010051863000160", Amount::from_minor(10_000)),
/// );
/// assert!(engine.events().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryEngine {
    script: Script,
    state: Mutex<State>,
}

impl MemoryEngine {
    /// Creates an engine that accepts any license and finds nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes recognizers of `kind` report `result` when run.
    #[must_use]
    pub fn with_detection(mut self, kind: RecognizerKind, result: PaymentResult) -> Self {
        self.script.detections.push((kind, result));
        self
    }

    /// Makes `unlock` fail with `error`.
    #[must_use]
    pub fn reject_unlock(mut self, error: UnlockError) -> Self {
        self.script.unlock_error = Some(error);
        self
    }

    /// Makes `make_image` fail with `error`.
    #[must_use]
    pub fn reject_image(mut self, error: ImageError) -> Self {
        self.script.image_error = Some(error);
        self
    }

    /// Makes the `index`th call to `make_recognizer` (0-based) fail.
    #[must_use]
    pub fn fail_recognizer(mut self, index: usize, error: CreateError) -> Self {
        self.script.recognizer_failures.insert(index, error);
        self
    }

    /// Makes `make_runner` fail with `error`.
    #[must_use]
    pub fn fail_runner(mut self, error: CreateError) -> Self {
        self.script.runner_error = Some(error);
        self
    }

    /// Honors a cancel request from the progress observer.
    #[must_use]
    pub fn cancellable(mut self) -> Self {
        self.script.cancel_after_progress = true;
        self
    }

    /// Returns a copy of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<EngineEvent> {
        self.state.lock().events.clone()
    }

    /// Returns the recorded disposal events, in order.
    #[must_use]
    pub fn disposals(&self) -> Vec<EngineEvent> {
        self.state
            .lock()
            .events
            .iter()
            .filter(|e| e.is_disposal())
            .cloned()
            .collect()
    }

    /// Returns every lifecycle rule broken so far.
    #[must_use]
    pub fn violations(&self) -> Vec<String> {
        self.state.lock().violations.clone()
    }

    /// Number of images, recognizers and runners not yet disposed.
    #[must_use]
    pub fn live_objects(&self) -> usize {
        let state = self.state.lock();
        state.live_images.len() + state.live_recognizers.len() + state.live_runners.len()
    }

    fn detection_for(&self, kind: RecognizerKind) -> Option<&PaymentResult> {
        self.script
            .detections
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, r)| r)
    }
}

impl RecognitionEngine for MemoryEngine {
    type Image<'buf> = MemoryImage<'buf>;
    type Recognizer = MemoryRecognizer;
    type Runner<'r> = MemoryRunner<'r>;

    fn unlock(&self, license: &License) -> Result<(), UnlockError> {
        let mut state = self.state.lock();
        if let Some(err) = &self.script.unlock_error {
            state.events.push(EngineEvent::UnlockRejected);
            return Err(err.clone());
        }
        trace!(licensee = ?license.licensee(), "memory engine unlocked");
        state.unlocked = true;
        state.events.push(EngineEvent::Unlocked);
        Ok(())
    }

    fn make_image<'buf>(&self, frame: Frame<'buf>) -> ImageResult<MemoryImage<'buf>> {
        if let Some(err) = &self.script.image_error {
            return Err(err.clone());
        }
        if frame.layout() != PixelLayout::Rgb24 {
            return Err(ImageError::UnsupportedLayout(frame.layout()));
        }

        let mut state = self.state.lock();
        let id = state.allocate();
        state.live_images.insert(id);
        state.events.push(EngineEvent::ImageCreated(id));
        Ok(MemoryImage { id, frame })
    }

    fn make_recognizer(&self, settings: &RecognizerSettings) -> CreateResult<MemoryRecognizer> {
        let kind = settings.kind();
        let mut state = self.state.lock();
        let index = state.recognizers_requested;
        state.recognizers_requested += 1;

        if !state.unlocked {
            return Err(CreateError::NotLicensed {
                what: kind.to_string(),
            });
        }
        if let Some(err) = self.script.recognizer_failures.get(&index) {
            return Err(err.clone());
        }
        let rate = settings.common().conversion_rate;
        if rate.is_nan() || rate <= 0.0 {
            return Err(CreateError::InvalidSettings {
                what: kind.to_string(),
                reason: "conversion rate must be positive".into(),
            });
        }

        let id = state.allocate();
        state.live_recognizers.insert(id);
        state.results.insert(id, PaymentResult::empty());
        state.events.push(EngineEvent::RecognizerCreated(id, kind));
        Ok(MemoryRecognizer { id, kind })
    }

    fn make_runner<'r>(
        &self,
        recognizers: &[&'r MemoryRecognizer],
        settings: &RunnerSettings,
    ) -> CreateResult<MemoryRunner<'r>> {
        if let Some(err) = &self.script.runner_error {
            return Err(err.clone());
        }
        if recognizers.is_empty() {
            return Err(CreateError::InvalidSettings {
                what: "recognizer runner".into(),
                reason: "no recognizers".into(),
            });
        }

        let mut state = self.state.lock();
        let id = state.allocate();
        let members: Vec<_> = recognizers.iter().map(|r| (r.id, r.kind)).collect();
        let ids: Vec<_> = members.iter().map(|(id, _)| *id).collect();
        state.live_runners.insert(id, ids.clone());
        state.events.push(EngineEvent::RunnerCreated(id, ids));
        Ok(MemoryRunner {
            id,
            members,
            settings: *settings,
            _recognizers: PhantomData,
        })
    }

    fn run(
        &self,
        runner: &MemoryRunner<'_>,
        image: &MemoryImage<'_>,
        reset_pending: bool,
        progress: Option<&mut dyn ProgressObserver>,
    ) -> ResultState {
        trace!(runner = %runner.id, image = %image.id, reset_pending, "memory engine run");

        let mut cancelled = false;
        if let Some(observer) = progress {
            for percent in [0u8, 50, 100] {
                if observer.on_progress(percent) == ProgressControl::Cancel
                    && self.script.cancel_after_progress
                {
                    cancelled = true;
                    break;
                }
            }
        }

        let mut state = self.state.lock();
        let mut winner_found = false;
        let mut overall = ResultState::Empty;

        for (id, kind) in &runner.members {
            let found = if cancelled {
                None
            } else {
                self.detection_for(*kind)
            };
            let result = match found {
                Some(r) if !(winner_found && !runner.settings.allow_multiple_results) => r.clone(),
                _ => PaymentResult::empty(),
            };

            overall = match (overall, result.state) {
                (_, ResultState::Valid) | (ResultState::Valid, _) => ResultState::Valid,
                (_, ResultState::Uncertain | ResultState::StageValid)
                | (ResultState::Uncertain, _) => ResultState::Uncertain,
                _ => overall,
            };
            if result.state.is_valid() {
                winner_found = true;
            }
            state.results.insert(*id, result);
        }

        state.events.push(EngineEvent::Ran {
            runner: runner.id,
            image: image.id,
            state: overall,
        });
        overall
    }

    fn read_result(&self, recognizer: &MemoryRecognizer) -> PaymentResult {
        let mut state = self.state.lock();
        state.events.push(EngineEvent::ResultRead(recognizer.id));
        state
            .results
            .get(&recognizer.id)
            .cloned()
            .unwrap_or_default()
    }

    fn dispose_image(&self, image: MemoryImage<'_>) {
        let mut state = self.state.lock();
        if !state.live_images.remove(&image.id) {
            state
                .violations
                .push(format!("image {} disposed twice", image.id));
        }
        debug!(image = %image.id, "memory engine disposed image");
        state.events.push(EngineEvent::ImageDisposed(image.id));
    }

    fn dispose_runner(&self, runner: MemoryRunner<'_>) {
        let mut state = self.state.lock();
        if let Some(members) = state.live_runners.remove(&runner.id) {
            let gone: Vec<_> = members
                .iter()
                .filter(|id| !state.live_recognizers.contains(*id))
                .copied()
                .collect();
            for id in gone {
                state.violations.push(format!(
                    "runner {} disposed after its recognizer {id}",
                    runner.id
                ));
            }
        } else {
            state
                .violations
                .push(format!("runner {} disposed twice", runner.id));
        }
        debug!(runner = %runner.id, "memory engine disposed runner");
        state.events.push(EngineEvent::RunnerDisposed(runner.id));
    }

    fn dispose_recognizer(&self, recognizer: MemoryRecognizer) {
        let mut state = self.state.lock();
        let holders: Vec<_> = state
            .live_runners
            .iter()
            .filter(|(_, members)| members.contains(&recognizer.id))
            .map(|(runner, _)| *runner)
            .collect();
        for runner in holders {
            state.violations.push(format!(
                "recognizer {} disposed while runner {runner} is alive",
                recognizer.id
            ));
        }
        if !state.live_recognizers.remove(&recognizer.id) {
            state
                .violations
                .push(format!("recognizer {} disposed twice", recognizer.id));
        }
        state.results.remove(&recognizer.id);
        debug!(recognizer = %recognizer.id, "memory engine disposed recognizer");
        state.events.push(EngineEvent::RecognizerDisposed(recognizer.id));
    }

    fn shutdown(&self) {
        let mut state = self.state.lock();
        let live = state.live_images.len() + state.live_recognizers.len() + state.live_runners.len();
        if live > 0 {
            state
                .violations
                .push(format!("engine shut down with {live} live objects"));
        }
        if !state.unlocked {
            state
                .violations
                .push("engine shut down without an unlocked session".into());
        }
        state.unlocked = false;
        state.events.push(EngineEvent::Shutdown);
    }
}
