//! Error handling for Revoice
//!
//! Every failure in the record → transform → play flow is terminal for the
//! current attempt: nothing is retried internally, and each variant carries
//! the caller-facing message the UI layer shows before resetting its controls.

use thiserror::Error;

/// Result type alias for Revoice operations
pub type Result<T> = std::result::Result<T, RevoiceError>;

/// Main error type for Revoice operations
#[derive(Error, Debug)]
pub enum RevoiceError {
    /// The audio input device could not be opened with the requested settings
    #[error("Input device configuration failed: {reason}")]
    DeviceConfiguration { reason: String },

    /// Capture completed but the underlying stream signaled failure
    #[error("Recording failed: {reason}")]
    RecordingFailed { reason: String },

    /// The recorded file cannot be opened or read
    #[error("Audio file error: {path}: {reason}")]
    AudioFile { path: String, reason: String },

    /// The playback output could not be started
    #[error("Audio engine error: {reason}")]
    AudioEngine { reason: String },

    /// I/O error while finalizing a recording
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RevoiceError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            RevoiceError::DeviceConfiguration { .. } => "DEVICE_CONFIGURATION",
            RevoiceError::RecordingFailed { .. } => "RECORDING_FAILED",
            RevoiceError::AudioFile { .. } => "AUDIO_FILE",
            RevoiceError::AudioEngine { .. } => "AUDIO_ENGINE",
            RevoiceError::Io(_) => "IO_ERROR",
        }
    }

    /// Get the caller-facing message for this error
    ///
    /// The caller shows this and resets the relevant control to a clean
    /// re-try state; there is no partial-success state to report.
    pub fn user_message(&self) -> String {
        match self {
            RevoiceError::DeviceConfiguration { .. } => {
                "The microphone could not be configured. Check that an input device \
                 is connected and that recording is allowed."
                    .to_string()
            }
            RevoiceError::RecordingFailed { .. } => {
                "Something went wrong with your recording. Please record again.".to_string()
            }
            RevoiceError::AudioFile { path, .. } => {
                format!(
                    "The recording at '{}' could not be read. Please record again.",
                    path
                )
            }
            RevoiceError::AudioEngine { .. } => {
                "Playback could not be started. The output device may be busy.".to_string()
            }
            RevoiceError::Io(_) => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = RevoiceError::AudioFile {
            path: "clip.wav".to_string(),
            reason: "not a WAV file".to_string(),
        };
        assert_eq!(err.error_code(), "AUDIO_FILE");

        let err = RevoiceError::AudioEngine {
            reason: "device busy".to_string(),
        };
        assert_eq!(err.error_code(), "AUDIO_ENGINE");
    }

    #[test]
    fn test_user_message_names_path() {
        let err = RevoiceError::AudioFile {
            path: "clip.wav".to_string(),
            reason: "truncated header".to_string(),
        };
        assert!(err.user_message().contains("clip.wav"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = RevoiceError::from(io);
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
