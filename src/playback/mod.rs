//! Playback transformer
//!
//! Loads a recording, builds the stage chain for the requested transform,
//! renders and starts playback, and schedules a cancellable auto-stop after
//! the effective duration. At most one session is active per transformer;
//! starting a new one auto-stops the previous.

pub mod session;
pub mod sink;
pub mod timer;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info};

use crate::audio::{read_wav, AudioBuffer};
use crate::dsp::{Transform, TransformChain};
use crate::error::Result;

pub use session::{PlaybackSession, SessionState, StopObserver, StopReason};
pub use sink::{PlaybackSink, RenderedAudio, RodioSink, SinkHandle};
pub use timer::StopTimer;

/// A recording opened for playback, with format metadata read from the file
#[derive(Debug, Clone)]
pub struct LoadedAudio {
    path: PathBuf,
    buffer: AudioBuffer,
    sample_rate: u32,
}

impl LoadedAudio {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> usize {
        self.buffer.num_channels()
    }

    /// Total frame count (samples per channel)
    pub fn num_frames(&self) -> u64 {
        self.buffer.num_frames() as u64
    }

    /// Untransformed duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.buffer.duration_secs(self.sample_rate)
    }
}

/// Open a recording and read its format metadata
///
/// Any open/decode failure is `AudioFile` and is terminal for that
/// recording: the caller must re-record.
pub fn load(path: &Path) -> Result<LoadedAudio> {
    let (buffer, sample_rate) = read_wav(path)?;
    info!(
        "loaded {}: {} Hz, {} channel(s), {} frames",
        path.display(),
        sample_rate,
        buffer.num_channels(),
        buffer.num_frames()
    );
    Ok(LoadedAudio {
        path: path.to_path_buf(),
        buffer,
        sample_rate,
    })
}

/// Wall-clock seconds until playback of the remaining audio completes
///
/// `(total_frames - rendered_frames) / sample_rate`, further divided by the
/// playback rate when a rate override is active. Pitch-only and effect-only
/// transforms pass `None` and get rate 1.
pub fn effective_duration_secs(
    total_frames: u64,
    rendered_frames: u64,
    sample_rate: u32,
    rate: Option<f32>,
) -> f64 {
    let remaining = total_frames.saturating_sub(rendered_frames) as f64;
    let seconds = remaining / sample_rate as f64;
    match rate {
        Some(rate) => seconds / rate as f64,
        None => seconds,
    }
}

/// Plays loaded recordings through fixed transform chains
pub struct PlaybackTransformer {
    sink: Arc<dyn PlaybackSink>,
    active: Mutex<Option<PlaybackSession>>,
    observer: Mutex<Option<StopObserver>>,
}

impl PlaybackTransformer {
    /// Create a transformer playing through the given sink
    pub fn new(sink: Arc<dyn PlaybackSink>) -> Self {
        Self {
            sink,
            active: Mutex::new(None),
            observer: Mutex::new(None),
        }
    }

    /// Create a transformer playing through the default output device
    pub fn with_default_output() -> Self {
        Self::new(Arc::new(RodioSink::new()))
    }

    /// Register an observer invoked once per session when it stops
    ///
    /// This is the hook the caller uses to re-enable its controls; it fires
    /// on both the manual and the timer stop path.
    pub fn on_stop<F>(&self, observer: F)
    where
        F: Fn(StopReason) + Send + Sync + 'static,
    {
        *lock(&self.observer) = Some(Arc::new(observer));
    }

    /// Start playing `audio` through `transform`'s stage chain
    ///
    /// Auto-stops any previously active session first. On success the
    /// returned session is `Playing` with an auto-stop pending after the
    /// effective duration; on `AudioEngine` failure nothing was scheduled.
    pub fn play(&self, audio: &LoadedAudio, transform: Transform) -> Result<PlaybackSession> {
        // Single-active-session invariant: the guard is held from the
        // stop-check through the store, so concurrent calls serialize and
        // cannot both leave a session playing
        let mut active = lock(&self.active);
        if let Some(previous) = active.take() {
            debug!("auto-stopping previous session {}", previous.id());
            previous.stop();
        }

        let chain = TransformChain::build(transform.into());
        debug!("built chain for {}: {}", transform, chain.describe());

        let rendered = RenderedAudio {
            buffer: chain.render(audio.buffer(), audio.sample_rate()),
            sample_rate: audio.sample_rate(),
        };

        // Engine start failure aborts here; no stop is scheduled
        let handle = self.sink.start(rendered)?;

        // Playback starts from the beginning, so no frames are rendered yet
        let seconds =
            effective_duration_secs(audio.num_frames(), 0, audio.sample_rate(), transform.rate());
        let effective = Duration::from_secs_f64(seconds);

        let session = PlaybackSession::new(
            transform,
            effective,
            handle,
            lock(&self.observer).clone(),
        );

        let timer_session = session.clone();
        let timer = StopTimer::schedule(effective, move || timer_session.complete());
        session.attach_timer(timer);

        info!(
            "playing {} as {} ({:.3}s effective)",
            audio.path().display(),
            transform,
            seconds
        );

        *active = Some(session.clone());
        Ok(session)
    }

    /// Manually stop the active session, if any
    pub fn stop(&self) {
        if let Some(session) = lock(&self.active).take() {
            session.stop();
        }
    }

    /// The currently tracked session, if one was started
    pub fn active_session(&self) -> Option<PlaybackSession> {
        lock(&self.active).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_effective_duration_plain() {
        assert_relative_eq!(effective_duration_secs(441_000, 0, 44_100, None), 10.0);
    }

    #[test]
    fn test_effective_duration_slow_doubles() {
        assert_relative_eq!(
            effective_duration_secs(441_000, 0, 44_100, Some(0.5)),
            20.0
        );
    }

    #[test]
    fn test_effective_duration_fast_shortens() {
        assert_relative_eq!(
            effective_duration_secs(441_000, 0, 44_100, Some(1.5)),
            10.0 / 1.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_effective_duration_subtracts_rendered_frames() {
        assert_relative_eq!(
            effective_duration_secs(441_000, 220_500, 44_100, None),
            5.0
        );
    }

    #[test]
    fn test_effective_duration_never_negative() {
        assert_eq!(effective_duration_secs(100, 200, 44_100, None), 0.0);
        assert_eq!(effective_duration_secs(100, 200, 44_100, Some(0.5)), 0.0);
    }
}
