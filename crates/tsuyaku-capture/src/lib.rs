mod capture;
mod crop;
mod encode;

pub use capture::{CaptureError, StaticCapture, ViewportCapture};
#[cfg(feature = "screen")]
pub use capture::ScreenCapture;
pub use crop::{CropError, PixelRegion, crop, scale_factor};
pub use encode::{EncodedImage, encode_png};
pub use image::RgbaImage;
