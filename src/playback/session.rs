//! Playback session state machine
//!
//! `Idle → Playing → (stopped manually | stopped by timer) → Idle`. Both
//! stop paths converge on one teardown function, so post-conditions are
//! identical regardless of which path triggered the stop: the timer is
//! cancelled, the sink handle is released exactly once, and waiters and
//! observers are notified.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use log::debug;
use uuid::Uuid;

use crate::dsp::Transform;
use crate::playback::sink::SinkHandle;
use crate::playback::timer::StopTimer;

/// Observer invoked once when a session stops (the "re-enable controls" hook)
pub type StopObserver = Arc<dyn Fn(StopReason) + Send + Sync>;

/// Current state of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Audio is playing and an auto-stop is pending
    Playing,
    /// Playback has stopped; the session holds no resources
    Idle,
}

/// Which path stopped the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The caller invoked `stop`
    Manual,
    /// The auto-stop timer fired after the effective duration
    Completed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Manual => write!(f, "manual"),
            StopReason::Completed => write!(f, "completed"),
        }
    }
}

struct SessionResources {
    state: SessionState,
    stop_reason: Option<StopReason>,
    sink: Option<Box<dyn SinkHandle>>,
    timer: Option<StopTimer>,
    observer: Option<StopObserver>,
}

struct SessionInner {
    id: Uuid,
    transform: Transform,
    effective_duration: Duration,
    resources: Mutex<SessionResources>,
    stopped: Condvar,
}

impl SessionInner {
    fn lock(&self) -> MutexGuard<'_, SessionResources> {
        match self.resources.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Handle to one playback attempt
///
/// Clones share the same underlying session; stopping any clone stops them
/// all. Stop is idempotent: stopping an already-stopped session is a no-op.
#[derive(Clone)]
pub struct PlaybackSession {
    inner: Arc<SessionInner>,
}

impl PlaybackSession {
    pub(crate) fn new(
        transform: Transform,
        effective_duration: Duration,
        sink: Box<dyn SinkHandle>,
        observer: Option<StopObserver>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4(),
                transform,
                effective_duration,
                resources: Mutex::new(SessionResources {
                    state: SessionState::Playing,
                    stop_reason: None,
                    sink: Some(sink),
                    timer: None,
                    observer,
                }),
                stopped: Condvar::new(),
            }),
        }
    }

    /// Attach the pending auto-stop timer
    ///
    /// If the session already stopped (a zero-length clip can complete
    /// before the timer handle is attached), the timer is cancelled instead
    /// of stored.
    pub(crate) fn attach_timer(&self, timer: StopTimer) {
        let mut resources = self.inner.lock();
        if resources.state == SessionState::Playing {
            resources.timer = Some(timer);
        } else {
            drop(resources);
            timer.cancel();
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn transform(&self) -> Transform {
        self.inner.transform
    }

    /// Wall-clock time until the auto-stop fires, computed at play time
    pub fn effective_duration(&self) -> Duration {
        self.inner.effective_duration
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn is_playing(&self) -> bool {
        self.state() == SessionState::Playing
    }

    /// Which path stopped the session, once it has stopped
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.inner.lock().stop_reason
    }

    /// Manually stop playback
    ///
    /// Safe to call repeatedly or concurrently with the timer firing; the
    /// first stop wins and later calls are no-ops.
    pub fn stop(&self) {
        self.stop_with(StopReason::Manual);
    }

    /// Timer path; converges on the same teardown as manual stop
    pub(crate) fn complete(&self) {
        self.stop_with(StopReason::Completed);
    }

    fn stop_with(&self, reason: StopReason) {
        let mut resources = self.inner.lock();
        if resources.state == SessionState::Idle {
            return;
        }

        resources.state = SessionState::Idle;
        resources.stop_reason = Some(reason);
        let timer = resources.timer.take();
        let sink = resources.sink.take();
        let observer = resources.observer.take();
        drop(resources);

        if let Some(timer) = timer {
            timer.cancel();
        }
        if let Some(sink) = sink {
            sink.stop();
        }

        debug!("session {} stopped ({})", self.inner.id, reason);
        self.inner.stopped.notify_all();

        if let Some(observer) = observer {
            observer(reason);
        }
    }

    /// Block until the session reaches `Idle`, returning the stop reason
    pub fn wait(&self) -> StopReason {
        let mut resources = self.inner.lock();
        while resources.state == SessionState::Playing {
            resources = match self.inner.stopped.wait(resources) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
        resources.stop_reason.unwrap_or(StopReason::Manual)
    }
}

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("id", &self.inner.id)
            .field("transform", &self.inner.transform)
            .field("state", &self.state())
            .finish()
    }
}
