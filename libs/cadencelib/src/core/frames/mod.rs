pub mod pixel_buffer;
pub mod video_frame;

pub use pixel_buffer::{PixelBuffer, PixelFormat};
pub use video_frame::{VideoFrame, VideoRotation};
