use crate::{error::Result, models::EncodedImage};

/// A frame source with an explicit open/close lifecycle.
pub trait CameraDevice: Send {
    fn open(&mut self) -> Result<()>;

    /// Grabs one mirrored, encoded frame from an open stream.
    fn grab_frame(&mut self) -> Result<EncodedImage>;

    fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// Holds a device open for as long as the capture view lives.
///
/// The device is closed when the session is dropped, on every exit path.
pub struct CaptureSession<'a, D: CameraDevice> {
    device: &'a mut D,
}

impl<'a, D: CameraDevice> CaptureSession<'a, D> {
    pub fn start(device: &'a mut D) -> Result<Self> {
        if device.is_open() {
            log::debug!("Releasing stale camera stream before reopening");
            device.close();
        }
        device.open()?;
        log::info!("📷 Camera stream opened");
        Ok(Self { device })
    }

    pub fn acquire_frame(&mut self) -> Result<EncodedImage> {
        let frame = self.device.grab_frame()?;
        log::debug!("Captured {} bytes of {}", frame.len(), frame.media_type());
        Ok(frame)
    }
}

impl<D: CameraDevice> Drop for CaptureSession<'_, D> {
    fn drop(&mut self) {
        self.device.close();
        log::info!("📷 Camera stream released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StylistError;

    #[derive(Default)]
    struct CountingDevice {
        open: bool,
        opens: usize,
        closes: usize,
        fail_grab: bool,
    }

    impl CameraDevice for CountingDevice {
        fn open(&mut self) -> Result<()> {
            self.open = true;
            self.opens += 1;
            Ok(())
        }

        fn grab_frame(&mut self) -> Result<EncodedImage> {
            if self.fail_grab {
                return Err(StylistError::CaptureError("no signal".into()));
            }
            EncodedImage::new("image/jpeg", vec![0xFF, 0xD8])
        }

        fn close(&mut self) {
            if self.open {
                self.closes += 1;
            }
            self.open = false;
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }

    #[test]
    fn test_session_releases_on_drop() {
        let mut device = CountingDevice::default();
        {
            let mut session = CaptureSession::start(&mut device).unwrap();
            let frame = session.acquire_frame().unwrap();
            assert_eq!(frame.media_type(), "image/jpeg");
        }
        assert!(!device.is_open());
        assert_eq!((device.opens, device.closes), (1, 1));
    }

    #[test]
    fn test_session_releases_on_error_path() {
        fn grab(device: &mut CountingDevice) -> Result<EncodedImage> {
            let mut session = CaptureSession::start(device)?;
            session.acquire_frame()
        }

        let mut device = CountingDevice {
            fail_grab: true,
            ..Default::default()
        };
        assert!(grab(&mut device).is_err());
        assert!(!device.is_open());
        assert_eq!(device.closes, 1);
    }

    #[test]
    fn test_stale_stream_closed_before_reopen() {
        let mut device = CountingDevice::default();
        device.open().unwrap();
        {
            let _session = CaptureSession::start(&mut device).unwrap();
        }
        assert_eq!((device.opens, device.closes), (2, 2));
    }
}
