//! Fixed playback transformations
//!
//! A `Transform` names one of the six fixed configurations; it expands into
//! a `ChainRequest`, which `TransformChain` assembles into an ordered
//! sequence of stages (rate/pitch, then echo, then reverb).

mod chain;
mod stages;
mod transform;

pub use chain::{Stage, TransformChain};
pub use stages::{EchoConfig, RatePitchConfig, ReverbConfig};
pub use transform::{ChainRequest, Transform};
