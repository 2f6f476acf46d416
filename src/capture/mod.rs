pub mod session;
pub mod still;

pub use session::{CameraDevice, CaptureSession};
pub use still::{StillFrameDevice, JPEG_QUALITY};
