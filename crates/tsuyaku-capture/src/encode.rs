use base64::Engine as _;
use base64::engine::general_purpose;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use crate::crop::CropError;

/// Lossless PNG ready for submission to a vision backend
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.png)
    }

    /// `data:` URL form expected by chat-completion image parts
    pub fn data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.base64())
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<EncodedImage, CropError> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;

    Ok(EncodedImage {
        png: buffer,
        width: image.width(),
        height: image.height(),
    })
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn data_url_holds_lossless_png() {
        let image = RgbaImage::from_fn(7, 3, |x, y| Rgba([x as u8 * 30, y as u8 * 60, 9, 255]));
        let encoded = encode_png(&image).unwrap();

        let url = encoded.data_url();
        let b64 = url.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = general_purpose::STANDARD.decode(b64).unwrap();

        let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded, image);
    }
}
