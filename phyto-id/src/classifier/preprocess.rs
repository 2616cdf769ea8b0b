//! Image preprocessing for the on-device classifier
//!
//! decode → RGB8 → bilinear resize to the model input → scale to [0, 1] →
//! NHWC batch of one. Decoding is independent of the model; resizing needs
//! the loaded model's input size.

use super::ModelError;
use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;
use std::sync::Arc;

/// Decode encoded image bytes (format sniffed from content)
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, ModelError> {
    if bytes.is_empty() {
        return Err(ModelError::InvalidImage("empty payload".to_string()));
    }

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ModelError::InvalidImage(format!("decode failed: {}", e)))?;
    Ok(decoded.to_rgb8())
}

/// Resize and normalize into a `[1, height, width, 3]` tensor
pub fn to_input_tensor(image: &RgbImage, width: u32, height: u32) -> Array4<f32> {
    let resized = if image.dimensions() == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, width, height, FilterType::Triangle)
    };

    Array4::from_shape_fn(
        (1, height as usize, width as usize, 3),
        |(_, y, x, c)| {
            let p = resized.get_pixel(x as u32, y as u32);
            p[c] as f32 / 255.0
        },
    )
}

/// Decode on the blocking pool
///
/// Runs before the model is needed, so an unreadable payload is reported
/// even when no model can be loaded.
pub async fn decode_image_blocking(bytes: Arc<[u8]>) -> Result<RgbImage, ModelError> {
    tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|e| ModelError::Inference(format!("Decode task join error: {}", e)))?
}
