//! Audio primitives: sample buffers and WAV file I/O.

pub mod buffer;
pub mod io;

pub use buffer::{AudioBuffer, ChannelLayout};
pub use io::{read_wav, write_wav};
