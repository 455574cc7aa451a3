//! Destinations for finished frames.

pub mod sink;

pub use sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
