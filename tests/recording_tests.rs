//! Recording Integration Tests
//!
//! Record-then-play flows with a mock input device and a mock output sink.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use approx::assert_relative_eq;
use tempfile::tempdir;

use revoice::playback::{PlaybackSink, RenderedAudio, SinkHandle};
use revoice::recorder::{AudioInput, CaptureStream, CapturedAudio};
use revoice::{PlaybackTransformer, Recorder, Transform};
use revoice::audio::AudioBuffer;

/// Input device producing a fixed mono sine clip
struct SineInput {
    frames: usize,
}

struct SineStream {
    frames: usize,
}

impl AudioInput for SineInput {
    fn open(&self) -> revoice::Result<Box<dyn CaptureStream>> {
        Ok(Box::new(SineStream {
            frames: self.frames,
        }))
    }
}

impl CaptureStream for SineStream {
    fn finish(self: Box<Self>) -> revoice::Result<CapturedAudio> {
        let samples: Vec<f32> = (0..self.frames)
            .map(|i| (i as f32 * 2.0 * std::f32::consts::PI * 220.0 / 44_100.0).sin() * 0.4)
            .collect();
        Ok(CapturedAudio {
            buffer: AudioBuffer::from_channels(vec![samples]).unwrap(),
            sample_rate: 44_100,
        })
    }
}

/// Output sink that discards audio
struct NullSink {
    stops: Arc<AtomicUsize>,
}

struct NullHandle {
    stops: Arc<AtomicUsize>,
}

impl PlaybackSink for NullSink {
    fn start(&self, _audio: RenderedAudio) -> revoice::Result<Box<dyn SinkHandle>> {
        Ok(Box::new(NullHandle {
            stops: self.stops.clone(),
        }))
    }
}

impl SinkHandle for NullHandle {
    fn stop(&self) {
        self.stops.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[test]
fn test_record_writes_metadata_matching_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.wav");

    let recorder = Recorder::new(Box::new(SineInput { frames: 22_050 }));
    let handle = recorder.start(&path);
    let recording = handle.unwrap().stop().unwrap();

    assert_eq!(recording.path, path);
    assert_eq!(recording.frames, 22_050);
    assert_eq!(recording.channels, 1);
    assert_relative_eq!(recording.duration_secs(), 0.5);

    let loaded = revoice::load(&recording.path).unwrap();
    assert_eq!(loaded.num_frames(), recording.frames);
    assert_eq!(loaded.sample_rate(), recording.sample_rate);
    assert_eq!(loaded.num_channels() as u16, recording.channels);
}

#[test]
fn test_record_then_play_transformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.wav");

    // 4410 frames = 0.1 s at 44.1 kHz
    let recorder = Recorder::new(Box::new(SineInput { frames: 4410 }));
    let recording = recorder.start(&path).unwrap().stop().unwrap();

    let audio = revoice::load(&recording.path).unwrap();
    let stops = Arc::new(AtomicUsize::new(0));
    let transformer = PlaybackTransformer::new(Arc::new(NullSink {
        stops: stops.clone(),
    }));

    // Pitch transforms leave the playback rate at 1
    let session = transformer.play(&audio, Transform::Chipmunk).unwrap();
    assert_relative_eq!(session.effective_duration().as_secs_f64(), 0.1);
    session.stop();

    // Slow halves the rate, doubling the effective duration
    let session = transformer.play(&audio, Transform::Slow).unwrap();
    assert_relative_eq!(session.effective_duration().as_secs_f64(), 0.2);
    session.stop();
}

#[test]
fn test_recording_ids_are_unique() {
    let dir = tempdir().unwrap();

    let recorder = Recorder::new(Box::new(SineInput { frames: 441 }));
    let first = recorder
        .start(dir.path().join("a.wav"))
        .unwrap()
        .stop()
        .unwrap();
    let second = recorder
        .start(dir.path().join("b.wav"))
        .unwrap()
        .stop()
        .unwrap();

    assert_ne!(first.id, second.id);
}
