//! PDF assembly: one page per card, each page a full-bleed JPEG.

use crate::error::HagakiError;
use crate::pipeline::encode::EncodedPage;
use printpdf::{
    ColorBits, ColorSpace, Image, ImageFilter, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};
use tracing::{debug, info};

const MM_PER_INCH: f32 = 25.4;

/// Physical size of a page image at `dpi`, in millimetres.
pub fn page_size_mm(width_px: u32, height_px: u32, dpi: u32) -> (f32, f32) {
    let dpi = dpi as f32;
    (
        width_px as f32 / dpi * MM_PER_INCH,
        height_px as f32 / dpi * MM_PER_INCH,
    )
}

/// Build a PDF from pages already in output order.
///
/// Each page is sized to its image at `dpi`, so a card rendered at the
/// layout DPI prints at its physical size.
pub fn assemble_pdf(pages: &[EncodedPage], dpi: u32, title: &str) -> Result<Vec<u8>, HagakiError> {
    let first = pages
        .first()
        .ok_or_else(|| HagakiError::PdfAssembly("no pages to assemble".into()))?;

    let (w, h) = page_size_mm(first.width, first.height, dpi);
    let (doc, page1, layer1) = PdfDocument::new(title, Mm(w), Mm(h), "Layer 1");
    let mut layer = doc.get_page(page1).get_layer(layer1);

    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            let (w, h) = page_size_mm(page.width, page.height, dpi);
            let (p, l) = doc.add_page(Mm(w), Mm(h), "Layer 1");
            layer = doc.get_page(p).get_layer(l);
        }

        let image = Image::from(ImageXObject {
            width: Px(page.width as usize),
            height: Px(page.height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: page.jpeg.clone(),
            image_filter: Some(ImageFilter::DCT),
            clipping_bbox: None,
            smask: None,
        });
        image.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm(0.0)),
                dpi: Some(dpi as f32),
                ..Default::default()
            },
        );
        debug!("Added page {} ({}x{} px)", i + 1, page.width, page.height);
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| HagakiError::PdfAssembly(e.to_string()))?;
    info!("Assembled PDF: {} pages, {} bytes", pages.len(), bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encode::encode_jpeg;
    use image::{Rgb, RgbImage};

    #[test]
    fn postcard_page_size() {
        let (w, h) = page_size_mm(1181, 1748, 300);
        assert!((w - 99.99).abs() < 0.05, "w = {w}");
        assert!((h - 148.0).abs() < 0.05, "h = {h}");
    }

    #[test]
    fn empty_batch_is_an_error() {
        let err = assemble_pdf(&[], 300, "Postcards").unwrap_err();
        assert!(matches!(err, HagakiError::PdfAssembly(_)));
    }

    #[test]
    fn assembles_multi_page_pdf() {
        let img = RgbImage::from_pixel(59, 87, Rgb([255, 255, 255]));
        let page = encode_jpeg(&img, 90, 1).unwrap();
        let bytes = assemble_pdf(&[page.clone(), page], 150, "Test").unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.len() > 200);
    }
}
