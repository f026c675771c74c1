//! WAV file I/O
//!
//! The recorder writes finalized clips as 16-bit PCM WAV; the playback
//! transformer reads them back with format metadata auto-detected from the
//! header. All samples are converted to f32 on read.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::audio::buffer::{AudioBuffer, ChannelLayout};
use crate::error::{Result, RevoiceError};

/// Read a WAV file into a planar buffer, returning its native sample rate
///
/// # Errors
/// `AudioFile` for anything that prevents reading: missing file, corrupt
/// header, unsupported bit depth, or more than two channels.
pub fn read_wav(path: &Path) -> Result<(AudioBuffer, u32)> {
    let audio_file_err = |reason: String| RevoiceError::AudioFile {
        path: path.display().to_string(),
        reason,
    };

    if !path.exists() {
        return Err(audio_file_err("file not found".to_string()));
    }

    let reader =
        WavReader::open(path).map_err(|e| audio_file_err(format!("failed to open WAV: {}", e)))?;

    let spec = reader.spec();
    let channels = spec.channels as usize;

    let layout = ChannelLayout::from_channel_count(channels).ok_or_else(|| {
        audio_file_err(format!(
            "{}-channel audio (only mono/stereo supported)",
            channels
        ))
    })?;

    let interleaved = read_samples_as_f32(reader, spec).map_err(|reason| audio_file_err(reason))?;

    if interleaved.is_empty() {
        return Err(audio_file_err("file contains no samples".to_string()));
    }

    let planar = deinterleave(&interleaved, layout.channel_count());
    let buffer = AudioBuffer::from_channels(planar)
        .ok_or_else(|| audio_file_err("inconsistent channel data".to_string()))?;

    Ok((buffer, spec.sample_rate))
}

/// Write a planar buffer as a 16-bit PCM WAV file
pub fn write_wav(path: &Path, buffer: &AudioBuffer, sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(io_error)?;

    for sample in interleave(&buffer.samples) {
        let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(scaled).map_err(io_error)?;
    }

    writer.finalize().map_err(io_error)?;
    Ok(())
}

fn io_error(e: hound::Error) -> RevoiceError {
    RevoiceError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

/// Read samples from a WAV reader and convert to f32 in [-1, 1]
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    spec: WavSpec,
) -> std::result::Result<Vec<f32>, String> {
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| format!("failed to read float samples: {}", e)),
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| format!("failed to read 8-bit samples: {}", e)),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| format!("failed to read 16-bit samples: {}", e)),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8_388_608.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| format!("failed to read 24-bit samples: {}", e)),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| format!("failed to read 32-bit samples: {}", e)),
        (format, bits) => Err(format!("unsupported sample format: {:?} {}-bit", format, bits)),
    }
}

/// De-interleave samples from [L,R,L,R,...] to [[L,L,...], [R,R,...]]
pub(crate) fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels;
    let mut result = vec![Vec::with_capacity(frames); channels];

    for (i, sample) in samples.iter().enumerate() {
        result[i % channels].push(*sample);
    }

    result
}

/// Interleave channels from [[L,L,...], [R,R,...]] to [L,R,L,R,...]
pub(crate) fn interleave(channels: &[Vec<f32>]) -> Vec<f32> {
    if channels.is_empty() {
        return Vec::new();
    }

    let num_channels = channels.len();
    let frames = channels[0].len();
    let mut result = Vec::with_capacity(frames * num_channels);

    for frame in 0..frames {
        for channel in channels {
            result.push(channel[frame]);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_tone(frames: usize) -> AudioBuffer {
        let samples: Vec<f32> = (0..frames)
            .map(|i| (i as f32 * 0.05).sin() * 0.8)
            .collect();
        AudioBuffer::from_channels(vec![samples]).unwrap()
    }

    #[test]
    fn test_interleave_deinterleave_roundtrip() {
        let left = vec![1.0, 2.0, 3.0, 4.0];
        let right = vec![5.0, 6.0, 7.0, 8.0];
        let channels = vec![left.clone(), right.clone()];

        let interleaved = interleave(&channels);
        assert_eq!(interleaved, vec![1.0, 5.0, 2.0, 6.0, 3.0, 7.0, 4.0, 8.0]);

        let deinterleaved = deinterleave(&interleaved, 2);
        assert_eq!(deinterleaved[0], left);
        assert_eq!(deinterleaved[1], right);
    }

    #[test]
    fn test_round_trip_mono() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        let original = test_tone(4410);
        write_wav(&path, &original, 44_100).unwrap();

        let (imported, sample_rate) = read_wav(&path).unwrap();
        assert_eq!(sample_rate, 44_100);
        assert_eq!(imported.num_channels(), 1);
        assert_eq!(imported.num_frames(), original.num_frames());

        for (orig, imp) in original.channel(0).iter().zip(imported.channel(0)) {
            // 16-bit quantization error bound
            assert!((orig - imp).abs() < 0.001, "{} vs {}", orig, imp);
        }
    }

    #[test]
    fn test_round_trip_stereo() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");

        let left: Vec<f32> = (0..2000).map(|i| (i as f32 * 0.03).sin() * 0.5).collect();
        let right: Vec<f32> = (0..2000).map(|i| (i as f32 * 0.07).sin() * 0.5).collect();
        let original = AudioBuffer::from_channels(vec![left, right]).unwrap();

        write_wav(&path, &original, 48_000).unwrap();
        let (imported, sample_rate) = read_wav(&path).unwrap();

        assert_eq!(sample_rate, 48_000);
        assert_eq!(imported.num_channels(), 2);
        assert_eq!(imported.num_frames(), 2000);
    }

    #[test]
    fn test_read_nonexistent_file() {
        let result = read_wav(Path::new("/nonexistent/path/clip.wav"));
        match result.unwrap_err() {
            RevoiceError::AudioFile { path, .. } => assert!(path.contains("nonexistent")),
            other => panic!("expected AudioFile error, got: {:?}", other),
        }
    }

    #[test]
    fn test_read_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"this is not a wav file").unwrap();

        let result = read_wav(&path);
        assert!(matches!(
            result.unwrap_err(),
            RevoiceError::AudioFile { .. }
        ));
    }
}
