//! Stage chain assembly (fixed order)
//!
//! A chain is an ordered sequence of named stages: the rate/pitch stage is
//! always present, followed conditionally by echo, then reverb. Both effect
//! stages may be present simultaneously even though no `Transform` variant
//! currently requests that combination.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::audio::AudioBuffer;
use crate::dsp::stages::{
    apply_echo, apply_rate_pitch, apply_reverb, EchoConfig, RatePitchConfig, ReverbConfig,
};
use crate::dsp::transform::ChainRequest;

/// One named stage of a processing chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "kebab-case")]
pub enum Stage {
    RatePitch(RatePitchConfig),
    Echo(EchoConfig),
    Reverb(ReverbConfig),
}

impl Stage {
    /// Stage name as it appears in chain descriptions
    pub fn name(&self) -> &'static str {
        match self {
            Stage::RatePitch(_) => "rate-pitch",
            Stage::Echo(_) => "echo",
            Stage::Reverb(_) => "reverb",
        }
    }
}

/// An ordered sequence of stages built from a `ChainRequest`
#[derive(Debug, Clone, PartialEq)]
pub struct TransformChain {
    stages: Vec<Stage>,
}

impl TransformChain {
    /// Assemble the chain for a request, in fixed order
    pub fn build(request: ChainRequest) -> Self {
        let mut stages = vec![Stage::RatePitch(RatePitchConfig {
            rate: request.rate.unwrap_or(1.0),
            pitch_cents: request.pitch_cents.unwrap_or(0.0),
        })];

        if request.echo {
            stages.push(Stage::Echo(EchoConfig::default()));
        }
        if request.reverb {
            stages.push(Stage::Reverb(ReverbConfig::default()));
        }

        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Render the chain over the input, stage by stage
    ///
    /// The input buffer is never mutated; each stage consumes the previous
    /// stage's output.
    pub fn render(&self, input: &AudioBuffer, sample_rate: u32) -> AudioBuffer {
        let mut current = input.clone();
        for stage in &self.stages {
            current = match stage {
                Stage::RatePitch(config) => apply_rate_pitch(config, &current),
                Stage::Echo(config) => apply_echo(config, &current, sample_rate),
                Stage::Reverb(config) => apply_reverb(config, &current, sample_rate),
            };
        }
        current
    }

    /// Describe the chain as JSON (stage names and parameters, in order)
    pub fn describe(&self) -> serde_json::Value {
        json!({
            "stages": self.stages,
            "order": self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
        })
    }
}
