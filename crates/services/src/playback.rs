use async_trait::async_trait;
use course_core::Progress;
use course_core::model::{Catalog, Lesson, LessonId, PlayerEvent, VideoRef};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::completion::{CompletionTracker, MarkOutcome};
use crate::error::{PlaybackError, SurfaceError};

/// The part of the external video widget the coordinator drives.
///
/// Webview-backed surfaces answer through JS evaluation, so the returned
/// future is not required to be `Send`.
#[async_trait(?Send)]
pub trait VideoSurface: Send {
    /// Load `video` into the existing playback surface.
    ///
    /// # Errors
    ///
    /// Returns `SurfaceError` if the widget did not accept the request.
    async fn load(&mut self, video: &VideoRef) -> Result<(), SurfaceError>;
}

/// Handle given to the widget at construction; forwards its events to the
/// coordinator that created it.
#[derive(Clone, Debug)]
pub struct PlayerEventSink {
    tx: mpsc::UnboundedSender<PlayerEvent>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("player subscription was removed")]
pub struct Disconnected;

impl PlayerEventSink {
    /// Queue an event for the coordinator.
    ///
    /// # Errors
    ///
    /// Returns `Disconnected` after the coordinator detached the surface or
    /// registered a newer subscription.
    pub fn send(&self, event: PlayerEvent) -> Result<(), Disconnected> {
        self.tx.send(event).map_err(|_| Disconnected)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// What handling a selection or player event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The video was handed to the surface.
    Loaded(VideoRef),
    /// The surface is not ready; the video loads once it is.
    Deferred(VideoRef),
    LessonCompleted(LessonId),
    AlreadyComplete(LessonId),
    Ignored,
}

/// Single owner of the current selection and the completion tracker.
///
/// Views read from it; only selection and player events mutate it.
pub struct PlaybackCoordinator {
    tracker: CompletionTracker,
    current: Option<LessonId>,
    surface: Option<Box<dyn VideoSurface>>,
    surface_ready: bool,
    pending: Option<VideoRef>,
    /// Lesson whose video the surface last accepted.
    loaded: Option<LessonId>,
    events: Option<mpsc::UnboundedReceiver<PlayerEvent>>,
}

impl PlaybackCoordinator {
    /// Start with the first lesson of the first course selected.
    #[must_use]
    pub fn new(tracker: CompletionTracker) -> Self {
        let first = tracker.catalog().first_lesson();
        let current = first.map(|lesson| lesson.id().clone());
        let pending = first.map(|lesson| lesson.video().clone());
        Self {
            tracker,
            current,
            surface: None,
            surface_ready: false,
            pending,
            loaded: None,
            events: None,
        }
    }

    #[must_use]
    pub fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.tracker.catalog()
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.tracker.progress()
    }

    #[must_use]
    pub fn current_lesson(&self) -> Option<&Lesson> {
        self.current
            .as_ref()
            .and_then(|id| self.tracker.catalog().lesson(id))
    }

    #[must_use]
    pub fn is_surface_ready(&self) -> bool {
        self.surface.is_some() && self.surface_ready
    }

    /// Video waiting for the surface to become ready, if any.
    #[must_use]
    pub fn pending_video(&self) -> Option<&VideoRef> {
        self.pending.as_ref()
    }

    /// Lesson currently playing on the surface. `None` while a load is queued.
    #[must_use]
    pub fn loaded_lesson(&self) -> Option<&LessonId> {
        if self.pending.is_some() {
            return None;
        }
        self.loaded.as_ref()
    }

    /// Make `lesson_id` current and load its video.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::UnknownLesson` for ids outside the catalog; the
    /// selection is unchanged.
    pub async fn select_lesson(
        &mut self,
        lesson_id: &LessonId,
    ) -> Result<PlaybackOutcome, PlaybackError> {
        let video = self
            .tracker
            .catalog()
            .lesson(lesson_id)
            .map(|lesson| lesson.video().clone())
            .ok_or_else(|| PlaybackError::UnknownLesson(lesson_id.clone()))?;

        self.current = Some(lesson_id.clone());
        Ok(self.request_load(video).await)
    }

    /// Register the widget and its event subscription.
    ///
    /// Replaces any previous surface; the previous sink is disconnected. The
    /// current lesson's video is queued until the widget reports `Ready`.
    pub fn attach_surface(&mut self, surface: Box<dyn VideoSurface>) -> PlayerEventSink {
        let (tx, rx) = mpsc::unbounded_channel();
        self.surface = Some(surface);
        self.surface_ready = false;
        self.loaded = None;
        self.events = Some(rx);
        let current_video = self.current_lesson().map(|lesson| lesson.video().clone());
        if current_video.is_some() {
            self.pending = current_video;
        }
        PlayerEventSink { tx }
    }

    /// Drop the widget and unregister its subscription.
    pub fn detach_surface(&mut self) {
        self.surface = None;
        self.surface_ready = false;
        self.loaded = None;
        self.events = None;
    }

    /// React to one widget event.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Completion` if recording a completion fails.
    pub async fn handle_event(&mut self, event: PlayerEvent) -> Result<PlaybackOutcome, PlaybackError> {
        match event {
            PlayerEvent::Ready => {
                self.surface_ready = true;
                match self.pending.take() {
                    Some(video) => Ok(self.request_load(video).await),
                    None => Ok(PlaybackOutcome::Ignored),
                }
            }
            PlayerEvent::StateChanged(state) if state.is_ended() => self.on_playback_ended().await,
            PlayerEvent::StateChanged(_) => Ok(PlaybackOutcome::Ignored),
        }
    }

    /// Natural end of the loaded video: record its lesson as complete.
    ///
    /// Ignored while the selected video is still queued, since the widget is
    /// then reporting on something else.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::NoSelection` for an empty catalog, or
    /// `PlaybackError::Completion` if the write fails.
    pub async fn on_playback_ended(&mut self) -> Result<PlaybackOutcome, PlaybackError> {
        if self.current.is_none() {
            return Err(PlaybackError::NoSelection);
        }
        let Some(lesson_id) = self.loaded_lesson().cloned() else {
            tracing::debug!("playback ended with no confirmed video; ignored");
            return Ok(PlaybackOutcome::Ignored);
        };
        match self.tracker.mark_complete(&lesson_id).await? {
            MarkOutcome::Completed => Ok(PlaybackOutcome::LessonCompleted(lesson_id)),
            MarkOutcome::AlreadyComplete => Ok(PlaybackOutcome::AlreadyComplete(lesson_id)),
        }
    }

    /// Handle every event queued by the attached widget.
    ///
    /// Stops at the first failure; events after it stay queued.
    ///
    /// # Errors
    ///
    /// Returns the first `PlaybackError` raised while handling an event.
    pub async fn pump(&mut self) -> Result<Vec<PlaybackOutcome>, PlaybackError> {
        let mut outcomes = Vec::new();
        loop {
            let Some(event) = self.events.as_mut().and_then(|rx| rx.try_recv().ok()) else {
                break;
            };
            outcomes.push(self.handle_event(event).await?);
        }
        Ok(outcomes)
    }

    async fn request_load(&mut self, video: VideoRef) -> PlaybackOutcome {
        if let (Some(surface), true) = (self.surface.as_mut(), self.surface_ready) {
            match surface.load(&video).await {
                Ok(()) => {
                    self.pending = None;
                    self.loaded = self.current.clone();
                    return PlaybackOutcome::Loaded(video);
                }
                Err(err) => {
                    tracing::warn!(error = %err, video = %video, "video surface rejected load");
                }
            }
        }
        self.pending = Some(video.clone());
        PlaybackOutcome::Deferred(video)
    }
}
