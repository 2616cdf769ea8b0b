//! Synthetic image payloads

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

fn encode(format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(32, 24, |x, y| Rgb([(x * 8) as u8, (y * 10) as u8, 90]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Small gradient PNG
pub fn png_bytes() -> Vec<u8> {
    encode(ImageFormat::Png)
}

/// Small gradient JPEG
pub fn jpeg_bytes() -> Vec<u8> {
    encode(ImageFormat::Jpeg)
}
