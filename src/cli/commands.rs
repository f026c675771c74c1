//! CLI Command Implementations

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;

use crate::dsp::{Transform, TransformChain};
use crate::playback::{self, PlaybackTransformer};
use crate::recorder::Recorder;

/// Record from the default microphone until the duration elapses or the
/// user presses Enter.
pub fn record(output: &Path, duration: Option<f64>) -> Result<()> {
    let recorder = Recorder::with_default_microphone();
    let handle = recorder.start(output)?;

    match duration {
        Some(secs) => {
            println!("Recording for {:.1}s...", secs);
            thread::sleep(Duration::from_secs_f64(secs.max(0.0)));
        }
        None => {
            println!("Recording... press Enter to stop.");
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("failed to read from stdin")?;
        }
    }

    let recording = handle.stop()?;
    println!(
        "Recorded {:.2}s to {}",
        recording.duration_secs(),
        recording.path.display()
    );

    Ok(())
}

/// Play a recording through a transform, blocking until it stops.
pub fn play(file: &Path, transform: Transform) -> Result<()> {
    let audio = playback::load(file)?;
    debug!(
        "chain: {}",
        TransformChain::build(transform.into()).describe()
    );

    let transformer = PlaybackTransformer::with_default_output();
    let session = transformer.play(&audio, transform)?;

    println!(
        "Playing {} as {} ({:.2}s)...",
        file.display(),
        transform,
        session.effective_duration().as_secs_f64()
    );

    let reason = session.wait();
    println!("Stopped ({})", reason);

    Ok(())
}

/// Print format metadata for a recording.
pub fn info(file: &Path) -> Result<()> {
    let audio = playback::load(file)?;

    println!("File:        {}", file.display());
    println!("Sample rate: {} Hz", audio.sample_rate());
    println!("Channels:    {}", audio.num_channels());
    println!("Frames:      {}", audio.num_frames());
    println!("Duration:    {:.3}s", audio.duration_secs());

    Ok(())
}
