//! I/O helpers for grayscale inputs, RGB visualisations and JSON reports.
//!
//! - `decode_grayscale`: decode an encoded image (PNG/JPEG/BMP/TIFF) into 8-bit gray.
//! - `load_grayscale_image`: read a file from disk and decode it.
//! - `encode_png` / `save_rgb_png`: serialise a visualisation raster.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::GrayImageU8;
use crate::error::{Error, Result};
use image::{ImageFormat, RgbImage};
use serde::Serialize;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Largest encoded payload accepted by [`decode_grayscale`] (16 MiB).
pub const MAX_ENCODED_BYTES: usize = 16 * 1024 * 1024;

/// Decode an encoded image and convert it to 8-bit grayscale.
pub fn decode_grayscale(bytes: &[u8]) -> Result<GrayImageU8> {
    if bytes.is_empty() {
        return Err(Error::EmptyInput);
    }
    if bytes.len() > MAX_ENCODED_BYTES {
        return Err(Error::Decode(format!(
            "payload of {} bytes exceeds the {MAX_ENCODED_BYTES} byte limit",
            bytes.len()
        )));
    }
    let img = image::load_from_memory(bytes)
        .map_err(|e| Error::Decode(e.to_string()))?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    if width == 0 || height == 0 {
        return Err(Error::EmptyInput);
    }
    Ok(GrayImageU8::new(width, height, img.into_raw()))
}

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImageU8> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    decode_grayscale(&bytes)
}

/// Encode an RGB raster as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| Error::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

/// Save an RGB raster to a PNG file, creating parent directories.
pub fn save_rgb_png(image: &RgbImage, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let bytes = encode_png(image)?;
    fs::write(path, bytes).map_err(|e| Error::io(path, e))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| Error::io(path, e))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_reported_as_empty_input() {
        assert!(matches!(decode_grayscale(&[]), Err(Error::EmptyInput)));
    }

    #[test]
    fn garbage_payload_is_a_decode_error() {
        let err = decode_grayscale(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "got {err:?}");
    }

    #[test]
    fn png_round_trip_preserves_gray_values() {
        let mut rgb = RgbImage::new(3, 2);
        for (i, px) in rgb.pixels_mut().enumerate() {
            let v = (i * 40) as u8;
            *px = image::Rgb([v, v, v]);
        }
        let bytes = encode_png(&rgb).expect("encode");
        let gray = decode_grayscale(&bytes).expect("decode");
        assert_eq!(gray.width(), 3);
        assert_eq!(gray.height(), 2);
        assert_eq!(gray.data(), &[0, 40, 80, 120, 160, 200]);
    }
}
