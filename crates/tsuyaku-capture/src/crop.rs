use image::{RgbaImage, imageops};
use tsuyaku_types::Rect;

/// Upper bound on the output raster, guards against absurd selections
const MAX_PIXELS: u64 = 1 << 26;

#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("Selection maps to an empty region ({width}x{height} px)")]
    EmptyRegion { width: u32, height: u32 },

    #[error("Selection too large: {width}x{height} px")]
    TooLarge { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Device pixel ratio to apply; absent, zero or nonsensical values mean 1
pub fn scale_factor(device_pixel_ratio: Option<f64>) -> f64 {
    match device_pixel_ratio {
        Some(ratio) if ratio.is_finite() && ratio > 0.0 => ratio,
        _ => 1.0,
    }
}

/// Selection mapped onto whole physical pixels of the captured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRegion {
    /// Each of the four quantities is scaled and rounded on its own
    pub fn from_css(rect: Rect, scale: f64) -> Self {
        let px = |v: f64| (v * scale).round().max(0.0) as u32;
        Self {
            x: px(rect.x),
            y: px(rect.y),
            width: px(rect.width),
            height: px(rect.height),
        }
    }
}

/// Crop `rect` (CSS pixels) out of a full viewport frame.
///
/// The output always measures `round(w * dpr) x round(h * dpr)`. Parts of
/// the selection beyond the frame are clipped and stay transparent.
pub fn crop(
    frame: &RgbaImage,
    rect: Rect,
    device_pixel_ratio: Option<f64>,
) -> Result<RgbaImage, CropError> {
    let region = PixelRegion::from_css(rect, scale_factor(device_pixel_ratio));
    let (width, height) = (region.width, region.height);

    if width == 0 || height == 0 {
        return Err(CropError::EmptyRegion { width, height });
    }
    if u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(CropError::TooLarge { width, height });
    }

    let mut out = RgbaImage::new(width, height);

    if region.x < frame.width() && region.y < frame.height() {
        let visible_w = width.min(frame.width() - region.x);
        let visible_h = height.min(frame.height() - region.y);
        let visible = imageops::crop_imm(frame, region.x, region.y, visible_w, visible_h).to_image();
        imageops::replace(&mut out, &visible, 0, 0);

        if visible_w < width || visible_h < height {
            tracing::debug!(
                "Selection clipped to frame: {}x{} of {}x{} px visible",
                visible_w,
                visible_h,
                width,
                height
            );
        }
    } else {
        tracing::warn!(
            "Selection at ({}, {}) lies outside the {}x{} frame",
            region.x,
            region.y,
            frame.width(),
            frame.height()
        );
    }

    Ok(out)
}
