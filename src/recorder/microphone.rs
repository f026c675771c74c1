//! Microphone capture via cpal
//!
//! Opens the default input device with its default configuration, pushes
//! converted f32 samples into a shared buffer from the stream callback, and
//! flags stream errors so `finish` can report `RecordingFailed`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig};
use log::{error, info};

use crate::audio::io::deinterleave;
use crate::audio::AudioBuffer;
use crate::error::{Result, RevoiceError};
use crate::recorder::{AudioInput, CaptureStream, CapturedAudio};

/// The default system microphone
#[derive(Debug, Default)]
pub struct Microphone;

impl Microphone {
    pub fn new() -> Self {
        Self
    }
}

impl AudioInput for Microphone {
    fn open(&self) -> Result<Box<dyn CaptureStream>> {
        let device_err = |reason: String| RevoiceError::DeviceConfiguration { reason };

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| device_err("no default input device found".to_string()))?;

        let supported = device
            .default_input_config()
            .map_err(|e| device_err(format!("no usable input configuration: {}", e)))?;

        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        if channels == 0 || channels > 2 {
            return Err(device_err(format!(
                "{}-channel input (only mono/stereo supported)",
                channels
            )));
        }

        let config: StreamConfig = supported.config();
        let samples = Arc::new(Mutex::new(Vec::<f32>::new()));
        let failed = Arc::new(AtomicBool::new(false));

        let stream = match supported.sample_format() {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, &samples, &failed),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, &samples, &failed),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, &samples, &failed),
            other => Err(device_err(format!("unsupported sample format: {:?}", other))),
        }?;

        stream
            .play()
            .map_err(|e| device_err(format!("failed to start input stream: {}", e)))?;

        info!(
            "microphone capture started: {} Hz, {} channel(s)",
            sample_rate, channels
        );

        Ok(Box::new(MicrophoneStream {
            stream,
            samples,
            failed,
            sample_rate,
            channels,
        }))
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    samples: &Arc<Mutex<Vec<f32>>>,
    failed: &Arc<AtomicBool>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + Send + 'static,
    f32: cpal::FromSample<T>,
{
    let samples = samples.clone();
    let failed = failed.clone();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buffer) = samples.lock() {
                    for &sample in data {
                        let converted: f32 = cpal::Sample::from_sample(sample);
                        buffer.push(converted);
                    }
                }
            },
            move |err| {
                error!("input stream error: {}", err);
                failed.store(true, Ordering::Release);
            },
            None,
        )
        .map_err(|e| RevoiceError::DeviceConfiguration {
            reason: format!("failed to build input stream: {}", e),
        })
}

struct MicrophoneStream {
    stream: cpal::Stream,
    samples: Arc<Mutex<Vec<f32>>>,
    failed: Arc<AtomicBool>,
    sample_rate: u32,
    channels: u16,
}

impl CaptureStream for MicrophoneStream {
    fn finish(self: Box<Self>) -> Result<CapturedAudio> {
        let MicrophoneStream {
            stream,
            samples,
            failed,
            sample_rate,
            channels,
        } = *self;

        // Releases the input device; the stream callback will not run again
        drop(stream);

        if failed.load(Ordering::Acquire) {
            return Err(RevoiceError::RecordingFailed {
                reason: "input stream reported an error during capture".to_string(),
            });
        }

        let interleaved = match Arc::try_unwrap(samples) {
            Ok(mutex) => mutex.into_inner().unwrap_or_default(),
            Err(shared) => shared.lock().map(|buf| buf.clone()).unwrap_or_default(),
        };

        let planar = deinterleave(&interleaved, channels as usize);
        let buffer = AudioBuffer::from_channels(planar).ok_or_else(|| {
            RevoiceError::RecordingFailed {
                reason: "captured channel data was inconsistent".to_string(),
            }
        })?;

        Ok(CapturedAudio {
            buffer,
            sample_rate,
        })
    }
}
