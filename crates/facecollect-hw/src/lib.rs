//! facecollect-hw — Camera capture and still-frame encoding.
//!
//! Provides V4L2-based camera access, pixel conversion to RGB and the
//! base64 JPEG payload the detection backend expects.

pub mod camera;
pub mod frame;
pub mod media;

pub use camera::{Camera, CameraError, DeviceInfo, PixelFormat};
pub use frame::Frame;
pub use media::{MediaCapture, MediaConfig};
