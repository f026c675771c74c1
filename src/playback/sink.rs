//! Output sink abstraction
//!
//! The session layer talks to the output device through `PlaybackSink` so
//! the sequencing logic is testable without hardware. The production
//! implementation plays through rodio on a dedicated thread, because rodio
//! output streams cannot move between threads.

use std::thread;

use crossbeam_channel::{bounded, Sender};
use log::debug;

use crate::audio::io::interleave;
use crate::audio::AudioBuffer;
use crate::error::{Result, RevoiceError};

/// Audio rendered through a stage chain, ready for the output device
#[derive(Debug, Clone)]
pub struct RenderedAudio {
    pub buffer: AudioBuffer,
    pub sample_rate: u32,
}

/// An audio output device that can start playing rendered audio
pub trait PlaybackSink: Send + Sync {
    /// Start playback from the beginning of `audio`
    ///
    /// Fails synchronously with `AudioEngine` when the output device cannot
    /// start; in that case nothing has been scheduled and there is nothing
    /// to release.
    fn start(&self, audio: RenderedAudio) -> Result<Box<dyn SinkHandle>>;
}

/// Handle to audio that is currently playing
///
/// The session layer guarantees `stop` is invoked at most once per handle.
pub trait SinkHandle: Send {
    /// Halt playback and release the output device
    fn stop(&self);
}

/// Plays rendered audio through the default rodio output device
#[derive(Debug, Default)]
pub struct RodioSink;

impl RodioSink {
    pub fn new() -> Self {
        Self
    }
}

impl PlaybackSink for RodioSink {
    fn start(&self, audio: RenderedAudio) -> Result<Box<dyn SinkHandle>> {
        let channels = audio.buffer.num_channels() as u16;
        let sample_rate = audio.sample_rate;
        let samples = interleave(&audio.buffer.samples);

        let (ready_tx, ready_rx) = bounded::<std::result::Result<(), String>>(1);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        // The output stream is not Send, so one thread owns it for the whole
        // playback and the handle just signals it.
        thread::spawn(move || {
            let (_stream, handle) = match rodio::OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("failed to open output device: {}", e)));
                    return;
                }
            };

            let sink = match rodio::Sink::try_new(&handle) {
                Ok(sink) => sink,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("failed to create output sink: {}", e)));
                    return;
                }
            };

            sink.append(rodio::buffer::SamplesBuffer::new(
                channels,
                sample_rate,
                samples,
            ));
            let _ = ready_tx.send(Ok(()));

            // Park until stopped; a dropped handle counts as a stop
            let _ = stop_rx.recv();
            sink.stop();
            debug!("playback thread released output device");
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Box::new(RodioHandle { stop_tx })),
            Ok(Err(reason)) => Err(RevoiceError::AudioEngine { reason }),
            Err(_) => Err(RevoiceError::AudioEngine {
                reason: "playback thread exited before starting".to_string(),
            }),
        }
    }
}

struct RodioHandle {
    stop_tx: Sender<()>,
}

impl SinkHandle for RodioHandle {
    fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }
}
