//! Transform definitions
//!
//! Six mutually exclusive variants, each a fixed parameter set: a playback
//! rate override, a pitch shift in cents, or a toggled effect stage.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Playback rate for the slow transform
pub const SLOW_RATE: f32 = 0.5;
/// Playback rate for the fast transform
pub const FAST_RATE: f32 = 1.5;
/// Pitch shift in cents for the chipmunk transform
pub const CHIPMUNK_CENTS: f32 = 1000.0;
/// Pitch shift in cents for the deep voice transform
pub const DEEP_VOICE_CENTS: f32 = -1000.0;

/// A named fixed playback transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Transform {
    /// Half-speed playback
    Slow,
    /// 1.5x-speed playback
    Fast,
    /// Pitch shifted up 1000 cents
    Chipmunk,
    /// Pitch shifted down 1000 cents
    DeepVoice,
    /// Multi-echo effect stage
    Echo,
    /// Hall reverb effect stage
    Reverb,
}

impl Transform {
    /// All six variants, in presentation order
    pub const ALL: [Transform; 6] = [
        Transform::Slow,
        Transform::Fast,
        Transform::Chipmunk,
        Transform::DeepVoice,
        Transform::Echo,
        Transform::Reverb,
    ];

    /// Playback rate override, if this transform has one
    ///
    /// Pitch-only and effect-only transforms return `None`; the effective
    /// duration then treats the rate as 1 (no division).
    pub fn rate(&self) -> Option<f32> {
        match self {
            Transform::Slow => Some(SLOW_RATE),
            Transform::Fast => Some(FAST_RATE),
            _ => None,
        }
    }

    /// Pitch shift in cents, if this transform has one
    pub fn pitch_cents(&self) -> Option<f32> {
        match self {
            Transform::Chipmunk => Some(CHIPMUNK_CENTS),
            Transform::DeepVoice => Some(DEEP_VOICE_CENTS),
            _ => None,
        }
    }

    /// Whether the echo stage is enabled
    pub fn echo(&self) -> bool {
        matches!(self, Transform::Echo)
    }

    /// Whether the reverb stage is enabled
    pub fn reverb(&self) -> bool {
        matches!(self, Transform::Reverb)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transform::Slow => "slow",
            Transform::Fast => "fast",
            Transform::Chipmunk => "chipmunk",
            Transform::DeepVoice => "deep-voice",
            Transform::Echo => "echo",
            Transform::Reverb => "reverb",
        };
        write!(f, "{}", name)
    }
}

/// The parameter bundle a transform expands into
///
/// Kept separate from `Transform` so that echo and reverb can be enabled
/// simultaneously: the chain supports that combination even though no
/// `Transform` variant currently requests it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainRequest {
    /// Playback rate override (None means rate 1)
    pub rate: Option<f32>,
    /// Pitch shift in cents (None means no shift)
    pub pitch_cents: Option<f32>,
    /// Enable the echo stage
    pub echo: bool,
    /// Enable the reverb stage
    pub reverb: bool,
}

impl From<Transform> for ChainRequest {
    fn from(transform: Transform) -> Self {
        Self {
            rate: transform.rate(),
            pitch_cents: transform.pitch_cents(),
            echo: transform.echo(),
            reverb: transform.reverb(),
        }
    }
}
