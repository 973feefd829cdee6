//! Page encoding: raster page → JPEG for the PDF, PNG for page export.
//!
//! Pages go into the PDF as JPEG (DCT) streams. A card at 300 DPI is about
//! 6 MB as raw RGB; holding a batch of those until assembly would not scale,
//! so each page is compressed as soon as it is rendered and only the JPEG
//! bytes are kept.

use crate::error::HagakiError;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A compressed page ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPage {
    pub width: u32,
    pub height: u32,
    /// Baseline JPEG stream.
    pub jpeg: Vec<u8>,
}

/// JPEG-encode a rendered page.
///
/// `page_num` is only used in the error.
pub fn encode_jpeg(img: &RgbImage, quality: u8, page_num: usize) -> Result<EncodedPage, HagakiError> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode_image(img)
        .map_err(|e| HagakiError::EncodeFailed {
            page: page_num,
            detail: e.to_string(),
        })?;
    debug!("Encoded page {} → {} bytes JPEG", page_num, jpeg.len());

    Ok(EncodedPage {
        width: img.width(),
        height: img.height(),
        jpeg,
    })
}

/// PNG-encode a rendered page into memory.
pub fn encode_png(img: &RgbImage, page_num: usize) -> Result<Vec<u8>, HagakiError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| HagakiError::EncodeFailed {
            page: page_num,
            detail: e.to_string(),
        })?;
    Ok(buf)
}

/// File name of an exported page: `page-0001.png`, …
pub fn page_image_name(page_num: usize) -> String {
    format!("page-{:04}.png", page_num)
}

/// Write a page as PNG into `dir`, returning the written path.
pub fn write_page_png(img: &RgbImage, dir: &Path, page_num: usize) -> Result<PathBuf, HagakiError> {
    let path = dir.join(page_image_name(page_num));
    let png = encode_png(img, page_num)?;
    std::fs::write(&path, png).map_err(|e| HagakiError::OutputWriteFailed {
        path: path.clone(),
        source: e,
    })?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn page() -> RgbImage {
        RgbImage::from_pixel(40, 60, Rgb([255, 255, 255]))
    }

    #[test]
    fn jpeg_has_soi_marker_and_dimensions() {
        let encoded = encode_jpeg(&page(), 95, 1).unwrap();
        assert_eq!((encoded.width, encoded.height), (40, 60));
        assert_eq!(&encoded.jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn jpeg_decodes_back_to_same_size() {
        let encoded = encode_jpeg(&page(), 80, 1).unwrap();
        let decoded = image::load_from_memory(&encoded.jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 60));
    }

    #[test]
    fn png_has_signature() {
        let png = encode_png(&page(), 1).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn page_names_are_zero_padded() {
        assert_eq!(page_image_name(7), "page-0007.png");
        assert_eq!(page_image_name(12345), "page-12345.png");
    }

    #[test]
    fn write_png_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_page_png(&page(), dir.path(), 3).unwrap();
        assert_eq!(path.file_name().unwrap(), "page-0003.png");
        assert!(path.exists());
    }
}
