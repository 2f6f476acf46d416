use crate::{
    capture::session::CameraDevice,
    error::{Result, StylistError},
    models::EncodedImage,
};
use image::{codecs::jpeg::JpegEncoder, DynamicImage};
use std::path::{Path, PathBuf};

pub const JPEG_QUALITY: u8 = 95;

/// Serves a still image file as if it were a live camera stream.
pub struct StillFrameDevice {
    path: PathBuf,
    frame: Option<DynamicImage>,
}

impl StillFrameDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            frame: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Mirrors horizontally and encodes as JPEG.
pub fn encode_mirrored(frame: &DynamicImage) -> Result<EncodedImage> {
    let mirrored = DynamicImage::ImageRgb8(frame.fliph().to_rgb8());
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    mirrored
        .write_with_encoder(encoder)
        .map_err(|e| StylistError::CaptureError(format!("JPEG encoding failed: {}", e)))?;
    EncodedImage::new("image/jpeg", buffer)
}

impl CameraDevice for StillFrameDevice {
    fn open(&mut self) -> Result<()> {
        let bytes = std::fs::read(&self.path)?;
        let frame = image::load_from_memory(&bytes).map_err(|e| {
            StylistError::CaptureError(format!("cannot decode {}: {}", self.path.display(), e))
        })?;
        log::debug!(
            "Loaded still frame {}x{} from {}",
            frame.width(),
            frame.height(),
            self.path.display()
        );
        self.frame = Some(frame);
        Ok(())
    }

    fn grab_frame(&mut self) -> Result<EncodedImage> {
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| StylistError::CaptureError("camera stream is not open".into()))?;
        encode_mirrored(frame)
    }

    fn close(&mut self) {
        self.frame = None;
    }

    fn is_open(&self) -> bool {
        self.frame.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureSession;
    use image::{Rgb, RgbImage};

    fn write_split_image(dir: &Path) -> PathBuf {
        // Left half red, right half blue.
        let image = RgbImage::from_fn(32, 16, |x, _| {
            if x < 16 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let path = dir.join("frame.png");
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn test_frame_is_mirrored_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let mut device = StillFrameDevice::new(write_split_image(dir.path()));

        let frame = {
            let mut session = CaptureSession::start(&mut device).unwrap();
            session.acquire_frame().unwrap()
        };
        assert!(!device.is_open());
        assert_eq!(frame.media_type(), "image/jpeg");
        assert!(frame.to_data_url().starts_with("data:image/jpeg;base64,"));

        let decoded = image::load_from_memory(frame.data()).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (32, 16));
        let left = decoded.get_pixel(2, 8);
        let right = decoded.get_pixel(29, 8);
        assert!(left[2] > left[0], "left edge should be blue after mirroring");
        assert!(right[0] > right[2], "right edge should be red after mirroring");
    }

    #[test]
    fn test_grab_while_closed_fails() {
        let mut device = StillFrameDevice::new("unused.png");
        let err = device.grab_frame().unwrap_err();
        assert!(matches!(err, StylistError::CaptureError(_)));
    }

    #[test]
    fn test_missing_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut device = StillFrameDevice::new(dir.path().join("absent.png"));
        assert!(CaptureSession::start(&mut device).is_err());
        assert!(!device.is_open());
    }
}
