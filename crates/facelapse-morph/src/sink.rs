use facelapse_image::Image;
use thiserror::Error;

/// Error raised by a frame sink.
///
/// Sinks wrap arbitrary backends, so the error is an opaque boxed source.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct SinkError(#[from] Box<dyn std::error::Error + Send + Sync>);

impl SinkError {
    /// Wrap a backend error.
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Box::new(err))
    }
}

/// Receives rendered frames in presentation order.
pub trait FrameSink {
    /// Consume the next frame.
    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), SinkError>;
}

/// A sink that keeps every frame in memory.
#[derive(Debug, Default)]
pub struct FrameCollector {
    /// The collected frames, in write order.
    pub frames: Vec<Image<u8, 3>>,
}

impl FrameCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for FrameCollector {
    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), SinkError> {
        self.frames.push(frame.clone());
        Ok(())
    }
}
