//! Scoped ownership of engine objects.
//!
//! Every engine object is held by a guard that releases it exactly once,
//! either through an explicit `release`/`close` or on drop. Dependencies
//! are borrows, so the compiler enforces teardown order:
//!
//! ```text
//! EngineSession ◄── ImageGuard
//!               ◄── RecognizerSet ◄── RunnerGuard
//! ```
//!
//! A `RunnerGuard` borrows the `RecognizerSet` it was built from, so the set
//! cannot be released while the runner lives, and every guard borrows the
//! `EngineSession`, so the session is shut down last.

use slipscan_engine::{
    CreateResult, Frame, ImageError, ImageResult, License, PixelLayout, ProgressObserver,
    RecognitionEngine, RecognizerKind, RecognizerSettings, ResultState, RunnerSettings,
    UnlockError,
};
use tracing::{debug, info, warn};

use crate::session::RecognizerOutcome;

/// An unlocked engine.
///
/// Shutting down the engine is an explicit step: [`EngineSession::close`]
/// or drop calls [`RecognitionEngine::shutdown`] exactly once.
pub struct EngineSession<'e, E: RecognitionEngine> {
    engine: &'e E,
}

impl<'e, E: RecognitionEngine> EngineSession<'e, E> {
    /// Unlocks `engine` with `license`.
    ///
    /// # Errors
    ///
    /// Returns the engine's unlock error. Nothing is held on failure.
    pub fn unlock(engine: &'e E, license: &License) -> Result<Self, UnlockError> {
        engine.unlock(license)?;
        info!(
            licensee = license.licensee().unwrap_or("<none>"),
            cache_dir = %license.cache_dir().display(),
            "engine unlocked"
        );
        Ok(Self { engine })
    }

    /// The unlocked engine.
    pub fn engine(&self) -> &'e E {
        self.engine
    }

    /// Shuts the engine session down.
    pub fn close(self) {
        drop(self);
    }
}

impl<E: RecognitionEngine> Drop for EngineSession<'_, E> {
    fn drop(&mut self) {
        debug!("shutting down engine session");
        self.engine.shutdown();
    }
}

/// A recognition image wrapping caller pixel memory.
pub struct ImageGuard<'s, 'buf, E: RecognitionEngine> {
    session: &'s EngineSession<'s, E>,
    image: Option<E::Image<'buf>>,
}

impl<'s, 'buf, E: RecognitionEngine> ImageGuard<'s, 'buf, E> {
    /// Wraps `frame` as a recognition image.
    ///
    /// Only interleaved RGB24 frames are accepted; the layout is checked
    /// before the engine sees the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout is not RGB24 or the engine rejects
    /// the frame. No image exists on failure.
    pub fn wrap(session: &'s EngineSession<'s, E>, frame: Frame<'buf>) -> ImageResult<Self> {
        if frame.layout() != PixelLayout::Rgb24 {
            return Err(ImageError::UnsupportedLayout(frame.layout()));
        }
        let image = session.engine().make_image(frame)?;
        debug!(
            width = frame.width(),
            height = frame.height(),
            stride = frame.stride(),
            "image wrapped"
        );
        Ok(Self {
            session,
            image: Some(image),
        })
    }

    fn handle(&self) -> &E::Image<'buf> {
        match &self.image {
            Some(image) => image,
            None => unreachable!("image used after release"),
        }
    }

    /// Releases the image.
    pub fn release(mut self) {
        self.dispose();
    }

    fn dispose(&mut self) {
        if let Some(image) = self.image.take() {
            debug!("releasing image");
            self.session.engine().dispose_image(image);
        }
    }
}

impl<E: RecognitionEngine> Drop for ImageGuard<'_, '_, E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// The recognizers of a session, in runner priority order.
pub struct RecognizerSet<'s, E: RecognitionEngine> {
    session: &'s EngineSession<'s, E>,
    members: Vec<(RecognizerKind, E::Recognizer)>,
}

impl<'s, E: RecognitionEngine> RecognizerSet<'s, E> {
    /// Creates one recognizer per entry of `settings`.
    ///
    /// # Errors
    ///
    /// Returns the first construction error. Recognizers created before the
    /// failure are released before this returns.
    pub fn create(
        session: &'s EngineSession<'s, E>,
        settings: &[RecognizerSettings],
    ) -> CreateResult<Self> {
        let mut set = Self {
            session,
            members: Vec::with_capacity(settings.len()),
        };

        for s in settings {
            let kind = s.kind();
            match session.engine().make_recognizer(s) {
                Ok(recognizer) => {
                    debug!(%kind, "recognizer created");
                    set.members.push((kind, recognizer));
                }
                Err(e) => {
                    warn!(
                        %kind,
                        error = %e,
                        acquired = set.members.len(),
                        "recognizer creation failed, releasing acquired recognizers"
                    );
                    return Err(e);
                }
            }
        }

        Ok(set)
    }

    /// Number of recognizers.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Creates a runner over every recognizer in the set.
    ///
    /// # Errors
    ///
    /// Returns the engine's construction error.
    pub fn runner<'r>(&'r self, settings: &RunnerSettings) -> CreateResult<RunnerGuard<'s, 'r, E>> {
        let handles: Vec<&'r E::Recognizer> = self.members.iter().map(|(_, r)| r).collect();
        let runner = self.session.engine().make_runner(&handles, settings)?;
        debug!(
            recognizers = handles.len(),
            allow_multiple_results = settings.allow_multiple_results,
            "runner created"
        );
        Ok(RunnerGuard {
            session: self.session,
            runner: Some(runner),
        })
    }

    /// Reads every recognizer's result independently.
    pub fn read_results(&self) -> Vec<RecognizerOutcome> {
        self.members
            .iter()
            .map(|(kind, recognizer)| {
                let result = self.session.engine().read_result(recognizer);
                debug!(%kind, state = ?result.state, "result read");
                RecognizerOutcome { kind: *kind, result }
            })
            .collect()
    }

    /// Releases every recognizer, in creation order.
    pub fn release(mut self) {
        self.dispose();
    }

    fn dispose(&mut self) {
        let engine = self.session.engine();
        for (kind, recognizer) in self.members.drain(..) {
            debug!(%kind, "releasing recognizer");
            engine.dispose_recognizer(recognizer);
        }
    }
}

impl<E: RecognitionEngine> Drop for RecognizerSet<'_, E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// A runner borrowing the recognizers it drives.
pub struct RunnerGuard<'s, 'r, E: RecognitionEngine> {
    session: &'s EngineSession<'s, E>,
    runner: Option<E::Runner<'r>>,
}

impl<E: RecognitionEngine> RunnerGuard<'_, '_, E> {
    /// Runs one blocking recognition pass over `image`.
    pub fn run(
        &self,
        image: &ImageGuard<'_, '_, E>,
        reset_pending: bool,
        progress: Option<&mut dyn ProgressObserver>,
    ) -> ResultState {
        let runner = match &self.runner {
            Some(runner) => runner,
            None => unreachable!("runner used after release"),
        };
        let state = self
            .session
            .engine()
            .run(runner, image.handle(), reset_pending, progress);
        info!(?state, "recognition finished");
        state
    }

    /// Releases the runner.
    pub fn release(mut self) {
        self.dispose();
    }

    fn dispose(&mut self) {
        if let Some(runner) = self.runner.take() {
            debug!("releasing runner");
            self.session.engine().dispose_runner(runner);
        }
    }
}

impl<E: RecognitionEngine> Drop for RunnerGuard<'_, '_, E> {
    fn drop(&mut self) {
        self.dispose();
    }
}
