//! Revoice - Voice Clip Recorder and Playback Transformer
//!
//! Revoice captures a voice clip from the microphone and plays it back
//! through one of six fixed transformations (slow, fast, chipmunk, deep
//! voice, echo, reverb).
//!
//! # Architecture
//!
//! The system has two components, used sequentially:
//! - Recorder: captures microphone input to a WAV file on request
//! - Playback transformer: loads the recording, builds a fixed stage chain,
//!   plays it, and auto-stops after the computed effective duration

pub mod audio;
pub mod cli;
pub mod dsp;
pub mod error;
pub mod playback;
pub mod recorder;

pub use dsp::{ChainRequest, Transform, TransformChain};
pub use error::{Result, RevoiceError};
pub use playback::{load, PlaybackSession, PlaybackTransformer, SessionState, StopReason};
pub use recorder::{Recorder, Recording, RecordingHandle};
