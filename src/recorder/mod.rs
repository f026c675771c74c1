//! Recorder
//!
//! Captures audio input to a finalized WAV file on request. The input
//! device sits behind `AudioInput` so the start/stop flow is testable
//! without hardware; the production implementation is `Microphone` (cpal).
//!
//! There is no retry anywhere: a failed recording is restarted by the
//! caller from scratch, and there is no partial-file guarantee on failure.

pub mod microphone;

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audio::{write_wav, AudioBuffer};
use crate::error::{Result, RevoiceError};

pub use microphone::Microphone;

/// PCM handed back by a capture stream when it finishes
#[derive(Debug, Clone)]
pub struct CapturedAudio {
    pub buffer: AudioBuffer,
    pub sample_rate: u32,
}

/// An audio input device that can be acquired for capture
pub trait AudioInput {
    /// Exclusively acquire the device and begin capturing
    ///
    /// Fails with `DeviceConfiguration` when the device cannot be opened
    /// with the requested settings.
    fn open(&self) -> Result<Box<dyn CaptureStream>>;
}

/// An in-progress capture
///
/// Deliberately not `Send`: platform input streams cannot move between
/// threads, so capture stays on the thread that opened the device.
pub trait CaptureStream {
    /// Stop capturing, release the device, and hand back the audio
    ///
    /// Fails with `RecordingFailed` when the underlying stream signaled an
    /// error during capture.
    fn finish(self: Box<Self>) -> Result<CapturedAudio>;
}

/// A finalized recording on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub id: Uuid,
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: u64,
}

impl Recording {
    /// Duration of the clip in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Captures voice clips from an audio input
pub struct Recorder {
    input: Box<dyn AudioInput>,
}

impl Recorder {
    pub fn new(input: Box<dyn AudioInput>) -> Self {
        Self { input }
    }

    /// Record from the default microphone
    pub fn with_default_microphone() -> Self {
        Self::new(Box::new(Microphone::new()))
    }

    /// Begin capturing audio destined for `destination`
    pub fn start(&self, destination: impl Into<PathBuf>) -> Result<RecordingHandle> {
        let destination = destination.into();
        let stream = self.input.open()?;
        info!("recording started, destination {}", destination.display());
        Ok(RecordingHandle {
            stream,
            destination,
        })
    }
}

/// Handle to an in-progress recording
pub struct RecordingHandle {
    stream: Box<dyn CaptureStream>,
    destination: PathBuf,
}

impl std::fmt::Debug for RecordingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingHandle")
            .field("destination", &self.destination)
            .finish_non_exhaustive()
    }
}

impl RecordingHandle {
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Stop capture and finalize the WAV file
    pub fn stop(self) -> Result<Recording> {
        let captured = self.stream.finish()?;

        if captured.buffer.is_empty() {
            return Err(RevoiceError::RecordingFailed {
                reason: "capture produced no audio".to_string(),
            });
        }

        write_wav(&self.destination, &captured.buffer, captured.sample_rate)?;

        let recording = Recording {
            id: Uuid::new_v4(),
            path: self.destination,
            sample_rate: captured.sample_rate,
            channels: captured.buffer.num_channels() as u16,
            frames: captured.buffer.num_frames() as u64,
        };

        info!(
            "recording finalized: {} ({:.2}s at {} Hz)",
            recording.path.display(),
            recording.duration_secs(),
            recording.sample_rate
        );

        Ok(recording)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ChannelLayout;
    use tempfile::tempdir;

    struct FixedInput {
        frames: usize,
    }

    struct FixedStream {
        frames: usize,
    }

    impl AudioInput for FixedInput {
        fn open(&self) -> Result<Box<dyn CaptureStream>> {
            Ok(Box::new(FixedStream {
                frames: self.frames,
            }))
        }
    }

    impl CaptureStream for FixedStream {
        fn finish(self: Box<Self>) -> Result<CapturedAudio> {
            let samples: Vec<f32> = (0..self.frames)
                .map(|i| (i as f32 * 0.01).sin() * 0.5)
                .collect();
            Ok(CapturedAudio {
                buffer: AudioBuffer::from_channels(vec![samples]).unwrap(),
                sample_rate: 44_100,
            })
        }
    }

    struct UnavailableInput;

    impl AudioInput for UnavailableInput {
        fn open(&self) -> Result<Box<dyn CaptureStream>> {
            Err(RevoiceError::DeviceConfiguration {
                reason: "no input device".to_string(),
            })
        }
    }

    struct FailingStreamInput;

    struct FailingStream;

    impl AudioInput for FailingStreamInput {
        fn open(&self) -> Result<Box<dyn CaptureStream>> {
            Ok(Box::new(FailingStream))
        }
    }

    impl CaptureStream for FailingStream {
        fn finish(self: Box<Self>) -> Result<CapturedAudio> {
            Err(RevoiceError::RecordingFailed {
                reason: "stream error".to_string(),
            })
        }
    }

    #[test]
    fn test_record_and_finalize() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        let recorder = Recorder::new(Box::new(FixedInput { frames: 4410 }));
        let handle = recorder.start(&path).unwrap();
        let recording = handle.stop().unwrap();

        assert_eq!(recording.path, path);
        assert_eq!(recording.sample_rate, 44_100);
        assert_eq!(recording.channels, 1);
        assert_eq!(recording.frames, 4410);
        assert!((recording.duration_secs() - 0.1).abs() < 1e-9);
        assert!(path.exists());
    }

    #[test]
    fn test_recording_readable_by_playback_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        let recorder = Recorder::new(Box::new(FixedInput { frames: 2000 }));
        let recording = recorder.start(&path).unwrap().stop().unwrap();

        let loaded = crate::playback::load(&recording.path).unwrap();
        assert_eq!(loaded.sample_rate(), 44_100);
        assert_eq!(loaded.num_frames(), 2000);
    }

    #[test]
    fn test_unconfigurable_device() {
        let recorder = Recorder::new(Box::new(UnavailableInput));
        let result = recorder.start("/tmp/never-written.wav");
        assert!(matches!(
            result.unwrap_err(),
            RevoiceError::DeviceConfiguration { .. }
        ));
    }

    #[test]
    fn test_failed_capture_surfaces_recording_failed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        let recorder = Recorder::new(Box::new(FailingStreamInput));
        let handle = recorder.start(&path).unwrap();
        let result = handle.stop();

        assert!(matches!(
            result.unwrap_err(),
            RevoiceError::RecordingFailed { .. }
        ));
        // No partial-file guarantee, but nothing should have been written here
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_capture_is_recording_failed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        let recorder = Recorder::new(Box::new(FixedInput { frames: 0 }));
        let handle = recorder.start(&path).unwrap();
        let result = handle.stop();

        assert!(matches!(
            result.unwrap_err(),
            RevoiceError::RecordingFailed { .. }
        ));
    }

    #[test]
    fn test_empty_capture_buffer_layout() {
        // from_channels accepts an empty mono channel
        let buffer = AudioBuffer::from_channels(vec![vec![]]).unwrap();
        assert_eq!(buffer.layout(), ChannelLayout::Mono);
        assert!(buffer.is_empty());
    }
}
