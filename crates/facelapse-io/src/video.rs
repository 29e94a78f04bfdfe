use std::path::Path;

use gstreamer::prelude::*;
use thiserror::Error;

use facelapse_image::{Image, ImageSize};
use facelapse_morph::{FrameSink, SinkError};

/// The codec to use for the video writer.
pub enum VideoCodec {
    /// H.264 codec.
    H264,
}

/// The pixel format of the frames pushed into the writer.
pub enum ImageFormat {
    /// 8-bit RGB format.
    Rgb8,
    /// 8-bit mono format.
    Mono8,
}

/// Errors from the video writer.
#[derive(Debug, Error)]
pub enum VideoWriterError {
    /// Error from the gstreamer library.
    #[error(transparent)]
    GStreamer(#[from] gstreamer::glib::Error),

    /// An element could not be downcast to its expected type.
    #[error("failed to downcast a pipeline element")]
    DowncastPipeline(gstreamer::Element),

    /// The appsrc element was not found in the pipeline.
    #[error("failed to get the appsrc element")]
    GetElementByName,

    /// The pipeline refused a state change.
    #[error(transparent)]
    StateChange(#[from] gstreamer::StateChangeError),

    /// The pipeline has no bus.
    #[error("failed to get the pipeline bus")]
    Bus,

    /// A frame buffer could not be mapped for writing.
    #[error("failed to get a mutable reference to the buffer")]
    GetBuffer,

    /// The bus message thread panicked.
    #[error("failed to join the bus message thread")]
    JoinThread,

    /// A frame did not match the configured format.
    #[error("invalid image format: {0}")]
    InvalidImageFormat(String),

    /// The appsrc rejected a frame.
    #[error("failed to push buffer: {0}")]
    PushBuffer(String),
}

/// A struct for writing video files.
///
/// Frames are pushed into an appsrc feeding an H.264 encoder and an mp4
/// muxer; call [`VideoWriter::start`] before the first write and
/// [`VideoWriter::close`] when done.
pub struct VideoWriter {
    pipeline: gstreamer::Pipeline,
    appsrc: gstreamer_app::AppSrc,
    fps: i32,
    format: ImageFormat,
    counter: u64,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl VideoWriter {
    /// Create a new VideoWriter.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to save the video file.
    /// * `codec` - The codec to use for the video writer.
    /// * `format` - The expected image format.
    /// * `fps` - The frames per second of the video.
    /// * `size` - The size of the video.
    pub fn new(
        path: impl AsRef<Path>,
        codec: VideoCodec,
        format: ImageFormat,
        fps: i32,
        size: ImageSize,
    ) -> Result<Self, VideoWriterError> {
        // make sure that we do not initialize gstreamer several times
        if !gstreamer::INITIALIZED.load(std::sync::atomic::Ordering::Relaxed) {
            gstreamer::init()?;
        }

        let VideoCodec::H264 = codec;

        let format_str = match format {
            ImageFormat::Mono8 => "GRAY8",
            ImageFormat::Rgb8 => "RGB",
        };

        let pipeline_str = format!(
            "appsrc name=src ! \
            videoconvert ! video/x-raw,format=I420 ! \
            x264enc ! \
            video/x-h264,profile=main ! \
            h264parse ! \
            mp4mux ! \
            filesink location={}",
            path.as_ref().to_string_lossy()
        );

        let pipeline = gstreamer::parse::launch(&pipeline_str)?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(VideoWriterError::DowncastPipeline)?;

        let appsrc = pipeline
            .by_name("src")
            .ok_or(VideoWriterError::GetElementByName)?
            .dynamic_cast::<gstreamer_app::AppSrc>()
            .map_err(VideoWriterError::DowncastPipeline)?;

        appsrc.set_format(gstreamer::Format::Time);

        let caps = gstreamer::Caps::builder("video/x-raw")
            .field("format", format_str)
            .field("width", size.width as i32)
            .field("height", size.height as i32)
            .field("framerate", gstreamer::Fraction::new(fps, 1))
            .build();

        appsrc.set_caps(Some(&caps));

        appsrc.set_is_live(true);
        appsrc.set_property("block", false);

        Ok(Self {
            pipeline,
            appsrc,
            fps,
            format,
            counter: 0,
            handle: None,
        })
    }

    /// Start the video writer.
    ///
    /// Set the pipeline to playing and launch a task to handle the bus messages.
    pub fn start(&mut self) -> Result<(), VideoWriterError> {
        self.pipeline.set_state(gstreamer::State::Playing)?;

        let bus = self.pipeline.bus().ok_or(VideoWriterError::Bus)?;

        // handle the bus messages in the background, exit on EOS
        let handle = std::thread::spawn(move || {
            for msg in bus.iter_timed(gstreamer::ClockTime::NONE) {
                match msg.view() {
                    gstreamer::MessageView::Eos(..) => {
                        log::debug!("gstreamer received EOS");
                        break;
                    }
                    gstreamer::MessageView::Error(err) => {
                        log::error!(
                            "Error from {:?}: {} ({:?})",
                            msg.src().map(|s| s.path_string()),
                            err.error(),
                            err.debug()
                        );
                        break;
                    }
                    _ => {}
                }
            }
        });

        self.handle = Some(handle);

        Ok(())
    }

    /// Close the video writer.
    ///
    /// Set the pipeline to null and join the thread.
    pub fn close(&mut self) -> Result<(), VideoWriterError> {
        // send end of stream to the appsrc
        self.appsrc.end_of_stream().map_err(flow_error)?;

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                return Err(VideoWriterError::JoinThread);
            }
        }

        self.pipeline.set_state(gstreamer::State::Null)?;

        Ok(())
    }

    /// Write an image to the video file.
    ///
    /// # Arguments
    ///
    /// * `img` - The image to write to the video file.
    pub fn write<const C: usize>(&mut self, img: &Image<u8, C>) -> Result<(), VideoWriterError> {
        let expected = match self.format {
            ImageFormat::Mono8 => 1,
            ImageFormat::Rgb8 => 3,
        };
        if C != expected {
            return Err(VideoWriterError::InvalidImageFormat(format!(
                "Invalid number of channels: expected {expected}, got {C}"
            )));
        }

        let mut buffer = gstreamer::Buffer::from_mut_slice(img.as_slice().to_vec());

        let pts =
            gstreamer::ClockTime::from_nseconds(self.counter * 1_000_000_000 / self.fps as u64);
        let duration = gstreamer::ClockTime::from_nseconds(1_000_000_000 / self.fps as u64);

        let buffer_ref = buffer.get_mut().ok_or(VideoWriterError::GetBuffer)?;
        buffer_ref.set_pts(Some(pts));
        buffer_ref.set_duration(Some(duration));

        self.counter += 1;

        self.appsrc.push_buffer(buffer).map_err(flow_error)?;

        Ok(())
    }
}

fn flow_error(err: gstreamer::FlowError) -> VideoWriterError {
    VideoWriterError::PushBuffer(err.to_string())
}

impl Drop for VideoWriter {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.close();
        }
    }
}

impl FrameSink for VideoWriter {
    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), SinkError> {
        VideoWriter::write(self, frame).map_err(SinkError::new)
    }
}
