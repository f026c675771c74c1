//! Stage configuration records and their rendering
//!
//! Each stage is a pure configuration record; rendering never mutates its
//! input. The rate/pitch stage resamples by linear interpolation; echo and
//! reverb are tap-delay renderings of their fixed presets.

use serde::{Deserialize, Serialize};

use crate::audio::AudioBuffer;

/// Echoes and reverb tails quieter than this are not rendered
const TAIL_GAIN_FLOOR: f32 = 0.05;

/// Rate/pitch stage configuration
///
/// Always the first stage of a chain. The rate resamples the clip, changing
/// its length; the pitch shift is duration-preserving, so a pitch-only stage
/// never changes the frame count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePitchConfig {
    /// Playback rate multiplier (1.0 = unchanged)
    pub rate: f32,
    /// Pitch shift in cents (0.0 = unchanged)
    pub pitch_cents: f32,
}

impl Default for RatePitchConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch_cents: 0.0,
        }
    }
}

impl RatePitchConfig {
    /// Pitch shift expressed as a frequency ratio
    pub fn pitch_factor(&self) -> f32 {
        (self.pitch_cents / 1200.0).exp2()
    }

    /// True when this stage leaves the audio untouched
    pub fn is_passthrough(&self) -> bool {
        (self.rate - 1.0).abs() < 1e-6 && self.pitch_cents.abs() < 1e-3
    }
}

/// Echo stage configuration (fixed multi-echo preset)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EchoConfig {
    /// Delay between repeats in milliseconds
    pub delay_ms: f32,
    /// Gain applied to each successive repeat (0-0.95)
    pub feedback: f32,
    /// Level of the first repeat relative to the dry signal (0-1)
    pub wet_level: f32,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            delay_ms: 180.0,
            feedback: 0.45,
            wet_level: 0.5,
        }
    }
}

/// Reverb stage configuration (fixed hall preset)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverbConfig {
    /// Comb delay times in milliseconds
    pub comb_delays_ms: [f32; 4],
    /// Gain applied per comb repeat (0-0.95)
    pub decay: f32,
    /// Wet/dry mix in percent (0 = dry only, 100 = wet only)
    pub wet_dry_mix: f32,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            comb_delays_ms: [50.3, 56.9, 61.7, 68.3],
            decay: 0.6,
            wet_dry_mix: 50.0,
        }
    }
}

/// Apply the rate/pitch stage
///
/// The rate resamples by linear interpolation, scaling the frame count by
/// `1/rate`. The pitch shift resamples by the pitch factor and then
/// time-stretches back to the incoming frame count, so it changes frequency
/// content but never duration.
pub fn apply_rate_pitch(config: &RatePitchConfig, input: &AudioBuffer) -> AudioBuffer {
    if config.is_passthrough() || input.is_empty() {
        return input.clone();
    }

    let pitch = config.pitch_factor() as f64;
    let rate = config.rate as f64;

    let channels = input
        .samples
        .iter()
        .map(|channel| {
            let shifted = if (pitch - 1.0).abs() < 1e-9 {
                channel.clone()
            } else {
                shift_pitch(channel, pitch)
            };
            if (rate - 1.0).abs() < 1e-9 {
                shifted
            } else {
                resample_linear(&shifted, 1.0 / rate)
            }
        })
        .collect();

    // Channel count is unchanged, so the layout stays representable
    AudioBuffer::from_channels(channels).unwrap_or_else(|| input.clone())
}

/// Shift pitch by a frequency ratio without changing duration
///
/// Resampling by the pitch factor shifts the pitch but shortens (up) or
/// lengthens (down) the clip; a granular time-stretch then restores the
/// original frame count.
fn shift_pitch(samples: &[f32], pitch_factor: f64) -> Vec<f32> {
    let resampled = resample_linear(samples, 1.0 / pitch_factor);
    stretch_to_len(&resampled, samples.len())
}

/// Granular overlap-add time-stretch to an exact frame count
///
/// Grains are read from source positions advancing at the stretch ratio and
/// summed with a triangular crossfade at 50% overlap, which sums to unity
/// gain everywhere except the fade at the very end.
fn stretch_to_len(samples: &[f32], target_len: usize) -> Vec<f32> {
    const GRAIN: usize = 2048;
    const HOP: usize = GRAIN / 2;

    if samples.is_empty() || target_len == 0 {
        return vec![0.0; target_len];
    }
    if samples.len() == target_len {
        return samples.to_vec();
    }

    let ratio = samples.len() as f64 / target_len as f64;
    let mut output = vec![0.0f32; target_len];

    let mut out_pos = 0;
    while out_pos < target_len {
        let grain_start = (out_pos as f64 * ratio) as usize;
        for n in 0..GRAIN {
            match output.get_mut(out_pos + n) {
                Some(slot) => {
                    let sample = samples.get(grain_start + n).copied().unwrap_or(0.0);
                    let window = if n < HOP {
                        // The first grain has no predecessor to overlap
                        if out_pos == 0 {
                            1.0
                        } else {
                            n as f32 / HOP as f32
                        }
                    } else {
                        (GRAIN - n) as f32 / HOP as f32
                    };
                    *slot += sample * window;
                }
                None => break,
            }
        }
        out_pos += HOP;
    }

    output
}

/// Apply the echo stage as a decaying tap-delay
///
/// The output is extended past the input so the tail is not truncated;
/// repeats below the gain floor are dropped.
pub fn apply_echo(config: &EchoConfig, input: &AudioBuffer, sample_rate: u32) -> AudioBuffer {
    let delay_samples = ms_to_samples(config.delay_ms, sample_rate);
    let taps = audible_taps(config.wet_level, config.feedback);
    if taps == 0 || input.is_empty() {
        return input.clone();
    }

    let frames = input.num_frames();
    let out_frames = frames + delay_samples * taps;
    let mut output = AudioBuffer::new(out_frames, input.layout());

    for (ch, channel) in input.samples.iter().enumerate() {
        let out = output.channel_mut(ch);
        out[..frames].copy_from_slice(channel);

        let mut gain = config.wet_level;
        for tap in 1..=taps {
            add_delayed(out, channel, delay_samples * tap, gain);
            gain *= config.feedback;
        }
    }

    output
}

/// Apply the reverb stage as a bank of decaying comb delays
pub fn apply_reverb(config: &ReverbConfig, input: &AudioBuffer, sample_rate: u32) -> AudioBuffer {
    if input.is_empty() {
        return input.clone();
    }

    let wet = (config.wet_dry_mix / 100.0).clamp(0.0, 1.0);
    let dry = 1.0 - wet;
    let repeats = audible_taps(1.0, config.decay);
    let comb_gain = wet / config.comb_delays_ms.len() as f32;

    let max_delay = config
        .comb_delays_ms
        .iter()
        .map(|&ms| ms_to_samples(ms, sample_rate))
        .max()
        .unwrap_or(0);

    let frames = input.num_frames();
    let out_frames = frames + max_delay * repeats;
    let mut output = AudioBuffer::new(out_frames, input.layout());

    for (ch, channel) in input.samples.iter().enumerate() {
        let out = output.channel_mut(ch);
        for (n, &sample) in channel.iter().enumerate() {
            out[n] = dry * sample;
        }

        for &delay_ms in &config.comb_delays_ms {
            let delay_samples = ms_to_samples(delay_ms, sample_rate);
            let mut gain = comb_gain * config.decay;
            for repeat in 1..=repeats {
                add_delayed(out, channel, delay_samples * repeat, gain);
                gain *= config.decay;
            }
        }
    }

    output
}

/// Number of delay repeats before `first_gain * feedback^k` falls below the floor
fn audible_taps(first_gain: f32, feedback: f32) -> usize {
    let mut taps = 0;
    let mut gain = first_gain;
    while gain >= TAIL_GAIN_FLOOR && taps < 16 {
        taps += 1;
        gain *= feedback;
    }
    taps
}

fn ms_to_samples(ms: f32, sample_rate: u32) -> usize {
    ((ms * sample_rate as f32 / 1000.0) as usize).max(1)
}

/// Mix `src` into `dst` starting at `offset`, scaled by `gain`
fn add_delayed(dst: &mut [f32], src: &[f32], offset: usize, gain: f32) {
    for (n, &sample) in src.iter().enumerate() {
        if let Some(slot) = dst.get_mut(offset + n) {
            *slot += gain * sample;
        }
    }
}

/// Linear interpolation resampling
///
/// `ratio` is output length over input length: 2.0 doubles the frame count
/// (half-speed playback), 0.5 halves it.
fn resample_linear(samples: &[f32], ratio: f64) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let source_len = samples.len();
    let target_len = ((source_len as f64) * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(target_len);

    for i in 0..target_len {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let sample = if src_idx + 1 < source_len {
            samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
        } else if src_idx < source_len {
            samples[src_idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}
