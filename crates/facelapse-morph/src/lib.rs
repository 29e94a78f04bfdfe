#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// The frame sequencer producing hold and morph frames.
pub mod sequencer;

/// The frame sink abstraction for streaming output.
pub mod sink;

pub use sequencer::{make_morph_video, make_still_video, MorphConfig, MorphError};
pub use sink::{FrameCollector, FrameSink, SinkError};
