//! Audio buffer
//!
//! Planar (per-channel) 32-bit float sample storage. Playback rendering
//! works on these buffers; interleaving only happens at the WAV boundary.

use serde::{Deserialize, Serialize};

/// Channel layout of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    /// Number of channels in this layout
    pub fn channel_count(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Layout for a channel count (only 1 and 2 are representable)
    pub fn from_channel_count(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

/// Planar f32 audio buffer
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// One sample vector per channel, all the same length
    pub samples: Vec<Vec<f32>>,
    layout: ChannelLayout,
}

impl AudioBuffer {
    /// Create a zero-filled buffer with the given frame count
    pub fn new(frames: usize, layout: ChannelLayout) -> Self {
        Self {
            samples: vec![vec![0.0; frames]; layout.channel_count()],
            layout,
        }
    }

    /// Create a buffer from existing per-channel data
    ///
    /// All channels must have the same length; the channel count must be
    /// mono or stereo.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Option<Self> {
        let layout = ChannelLayout::from_channel_count(channels.len())?;
        let frames = channels[0].len();
        if channels.iter().any(|c| c.len() != frames) {
            return None;
        }
        Some(Self {
            samples: channels,
            layout,
        })
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.first().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    /// Duration in seconds at the given sample rate
    pub fn duration_secs(&self, sample_rate: u32) -> f64 {
        self.num_frames() as f64 / sample_rate as f64
    }

    /// Immutable view of one channel
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Mutable view of one channel
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.samples[index]
    }
}
