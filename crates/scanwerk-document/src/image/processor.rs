// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode with orientation, fit-or-fill resize, linear
// contrast/brightness and JPEG encode. Operates on in-memory images using the
// `image` crate.

use std::io::Cursor;

use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{ColorType, DynamicImage, ImageDecoder, ImageReader};
use scanwerk_core::error::ScanwerkError;
use tracing::{debug, info, instrument, warn};

/// Image processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, enabling
/// method chaining. The fallible resize borrows instead, so the caller still
/// owns the source raster when it needs to fall back to it.
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&raw)?
///     .resized(1920, 1080, FilterType::Triangle)?
///     .adjust_linear(1.2, 5.0)
///     .to_jpeg_bytes(95)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode raw encoded bytes (JPEG, PNG, TIFF, etc.).
    ///
    /// The orientation reported by the decoder (EXIF for JPEG/TIFF) is applied
    /// here, so every later stage sees the image upright.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ScanwerkError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|err| ScanwerkError::Decode(format!("failed to sniff format: {}", err)))?;
        let mut decoder = reader
            .into_decoder()
            .map_err(|err| ScanwerkError::Decode(err.to_string()))?;

        let orientation = decoder.orientation().unwrap_or_else(|err| {
            warn!(%err, "Could not read orientation metadata; assuming upright");
            Orientation::NoTransforms
        });

        let mut img = DynamicImage::from_decoder(decoder)
            .map_err(|err| ScanwerkError::Decode(err.to_string()))?;
        img.apply_orientation(orientation);

        debug!(
            width = img.width(),
            height = img.height(),
            color = ?img.color(),
            ?orientation,
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Whether the decoded samples are 8 bits per channel.
    pub fn is_8bit(&self) -> bool {
        matches!(
            self.image.color(),
            ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8
        )
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Resample to exactly `width` x `height`, leaving `self` untouched.
    ///
    /// Fails on an empty target or one whose RGBA buffer would not fit in
    /// memory addressable by this platform.
    #[instrument(skip(self), fields(from_w = self.width(), from_h = self.height()))]
    pub fn resized(
        &self,
        width: u32,
        height: u32,
        filter: FilterType,
    ) -> Result<Self, ScanwerkError> {
        if width == 0 || height == 0 {
            return Err(ScanwerkError::Resize(format!(
                "target {}x{} is empty",
                width, height
            )));
        }
        let bytes = (width as u64)
            .checked_mul(height as u64)
            .and_then(|px| px.checked_mul(4))
            .filter(|bytes| *bytes <= isize::MAX as u64);
        if bytes.is_none() {
            return Err(ScanwerkError::Resize(format!(
                "target {}x{} exceeds the addressable buffer size",
                width, height
            )));
        }

        if (width, height) == self.dimensions() {
            debug!("Target matches source; skipping resample");
            return Ok(Self {
                image: self.image.clone(),
            });
        }

        let resized = self.image.resize_exact(width, height, filter);
        debug!(
            new_w = resized.width(),
            new_h = resized.height(),
            ?filter,
            "Resize complete"
        );
        Ok(Self { image: resized })
    }

    /// Apply `out = clamp(0, 255, (in - 128) * contrast + 128 + brightness)` to
    /// each colour channel. Alpha is passed through and the result is RGBA8.
    #[instrument(skip(self))]
    pub fn adjust_linear(self, contrast: f32, brightness: f32) -> Self {
        info!(contrast, brightness, "Adjusting contrast and brightness");

        let mut rgba = self.image.into_rgba8();
        let adjust = |channel: u8| -> u8 {
            let val = (channel as f32 - 128.0) * contrast + 128.0 + brightness;
            val.round().clamp(0.0, 255.0) as u8
        };
        for pixel in rgba.pixels_mut() {
            let image::Rgba([r, g, b, a]) = *pixel;
            *pixel = image::Rgba([adjust(r), adjust(g), adjust(b), a]);
        }

        Self {
            image: DynamicImage::ImageRgba8(rgba),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    ///
    /// JPEG carries no alpha; the image is flattened to RGB first.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, ScanwerkError> {
        if !(1..=100).contains(&quality) {
            return Err(ScanwerkError::Encode(format!(
                "JPEG quality must be 1-100, got {}",
                quality
            )));
        }
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder)
            .map_err(|err| ScanwerkError::Encode(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// Dimensions of `width` x `height` shrunk so the longer edge is at most
/// `max_edge`. Sources already within the cap are returned as-is.
pub fn edge_capped(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let max_edge = max_edge.max(1);
    let longest = width.max(height);
    if longest <= max_edge {
        return (width, height);
    }
    let scale = max_edge as f64 / longest as f64;
    (
        ((width as f64 * scale).round() as u32).clamp(1, max_edge),
        ((height as f64 * scale).round() as u32).clamp(1, max_edge),
    )
}

/// Scale-to-fit-or-fill target for a `width` x `height` source inside a
/// `max_width` x `max_height` box.
///
/// Whichever axis is relatively longer is pinned to the box; the other follows
/// the aspect ratio, rounded half away from zero. Small sources are upscaled,
/// large ones downscaled. Both results are clamped to `[1, max]`.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let max_width = max_width.max(1);
    let max_height = max_height.max(1);
    if width == 0 || height == 0 {
        return (max_width, max_height);
    }

    let aspect = width as f64 / height as f64;
    let box_aspect = max_width as f64 / max_height as f64;

    if aspect > box_aspect {
        let h = (max_width as f64 / aspect).round() as u32;
        (max_width, h.clamp(1, max_height))
    } else {
        let w = (max_height as f64 * aspect).round() as u32;
        (w.clamp(1, max_width), max_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb, Rgba, RgbaImage};

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .expect("png encode");
        buffer
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        let err = ImageProcessor::from_bytes(b"definitely not an image").err();
        assert!(matches!(err, Some(ScanwerkError::Decode(_))));
        assert!(ImageProcessor::from_bytes(&[]).is_err());
    }

    #[test]
    fn from_bytes_decodes_png() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(12, 7, Rgb([10, 20, 30])));
        let processor = ImageProcessor::from_bytes(&png_bytes(&img)).expect("decodes");
        assert_eq!(processor.dimensions(), (12, 7));
        assert!(processor.is_8bit());
    }

    /// JPEG with an EXIF APP1 segment carrying only the orientation tag.
    fn jpeg_with_orientation(image: &DynamicImage, orientation: u16) -> Vec<u8> {
        let mut plain = Vec::new();
        image
            .to_rgb8()
            .write_with_encoder(image::codecs::jpeg::JpegEncoder::new_with_quality(&mut plain, 90))
            .expect("jpeg encode");

        // Big-endian TIFF header, one IFD entry: 0x0112 SHORT x1.
        let mut tiff = b"MM\x00\x2a\x00\x00\x00\x08\x00\x01\x01\x12\x00\x03\x00\x00\x00\x01".to_vec();
        tiff.extend_from_slice(&orientation.to_be_bytes());
        tiff.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

        let mut app1 = vec![0xFF, 0xE1];
        let len = (2 + 6 + tiff.len()) as u16;
        app1.extend_from_slice(&len.to_be_bytes());
        app1.extend_from_slice(b"Exif\x00\x00");
        app1.extend_from_slice(&tiff);

        // Splice right after SOI.
        let mut tagged = plain[..2].to_vec();
        tagged.extend_from_slice(&app1);
        tagged.extend_from_slice(&plain[2..]);
        tagged
    }

    #[test]
    fn from_bytes_applies_exif_orientation() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(16, 8, Rgb([90, 120, 150])));

        // 6: rotate 90 degrees clockwise.
        let rotated = ImageProcessor::from_bytes(&jpeg_with_orientation(&img, 6)).expect("decodes");
        assert_eq!(rotated.dimensions(), (8, 16));

        // 8: rotate 90 degrees counter-clockwise.
        let rotated = ImageProcessor::from_bytes(&jpeg_with_orientation(&img, 8)).expect("decodes");
        assert_eq!(rotated.dimensions(), (8, 16));

        // 1: upright.
        let upright = ImageProcessor::from_bytes(&jpeg_with_orientation(&img, 1)).expect("decodes");
        assert_eq!(upright.dimensions(), (16, 8));
    }

    #[test]
    fn sixteen_bit_is_not_8bit() {
        let img = DynamicImage::ImageRgba16(ImageBuffer::new(4, 4));
        assert!(!ImageProcessor::from_dynamic(img).is_8bit());
    }

    #[test]
    fn fit_downscales_wide_source() {
        assert_eq!(fit_dimensions(300, 200, 100, 100), (100, 67));
        assert_eq!(fit_dimensions(8000, 6000, 7680, 4320), (5760, 4320));
    }

    #[test]
    fn fit_upscales_small_source() {
        assert_eq!(fit_dimensions(40, 20, 200, 200), (200, 100));
        assert_eq!(fit_dimensions(20, 40, 200, 100), (50, 100));
    }

    #[test]
    fn fit_preserves_aspect_within_a_pixel() {
        let cases = [(1, 1), (3, 1000), (1000, 3), (4032, 3024), (1080, 1920), (17, 23)];
        for (w, h) in cases {
            let (tw, th) = fit_dimensions(w, h, 640, 480);
            assert!((1..=640).contains(&tw) && (1..=480).contains(&th), "{w}x{h} -> {tw}x{th}");
            let aspect = w as f64 / h as f64;
            let width_err = (tw as f64 - th as f64 * aspect).abs();
            let height_err = (th as f64 - tw as f64 / aspect).abs();
            assert!(
                width_err <= 1.0 || height_err <= 1.0,
                "{w}x{h} -> {tw}x{th} drifts from aspect {aspect}"
            );
        }
    }

    #[test]
    fn resized_rejects_empty_target() {
        let processor = ImageProcessor::from_dynamic(DynamicImage::new_rgba8(8, 8));
        let err = processor.resized(0, 8, FilterType::Triangle).err();
        assert!(matches!(err, Some(ScanwerkError::Resize(_))));
    }

    #[test]
    fn resized_rejects_unaddressable_target() {
        let processor = ImageProcessor::from_dynamic(DynamicImage::new_rgba8(8, 8));
        let err = processor.resized(u32::MAX, u32::MAX, FilterType::Triangle).err();
        assert!(matches!(err, Some(ScanwerkError::Resize(_))));
    }

    #[test]
    fn edge_capped_keeps_aspect() {
        assert_eq!(edge_capped(8000, 6000, 4096), (4096, 3072));
        assert_eq!(edge_capped(3000, 9000, 4096), (1365, 4096));
        assert_eq!(edge_capped(100, 50, 4096), (100, 50));
        assert_eq!(edge_capped(10000, 1, 4096), (4096, 1));
    }

    #[test]
    fn adjust_linear_matches_formula_and_keeps_alpha() {
        let img = RgbaImage::from_fn(4, 1, |x, _| match x {
            0 => Rgba([100, 200, 0, 17]),
            1 => Rgba([255, 128, 127, 255]),
            2 => Rgba([50, 50, 50, 0]),
            _ => Rgba([0, 0, 0, 128]),
        });
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(img))
            .adjust_linear(1.2, 5.0)
            .into_dynamic()
            .into_rgba8();

        // (100-128)*1.2+133 = 99.4, (200-128)*1.2+133 = 219.4, 0 -> -20.6
        assert_eq!(out.get_pixel(0, 0).0, [99, 219, 0, 17]);
        // 255 -> 285.4, 128 -> 133, 127 -> 131.8
        assert_eq!(out.get_pixel(1, 0).0, [255, 133, 132, 255]);
        assert_eq!(out.get_pixel(2, 0).0[3], 0);
        assert_eq!(out.get_pixel(3, 0).0[3], 128);
    }

    #[test]
    fn jpeg_round_trip_keeps_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(33, 21, Rgba([90, 120, 200, 10])));
        let jpeg = ImageProcessor::from_dynamic(img)
            .to_jpeg_bytes(80)
            .expect("encodes");
        assert_eq!(image::guess_format(&jpeg).ok(), Some(ImageFormat::Jpeg));
        let back = image::load_from_memory(&jpeg).expect("decodes");
        assert_eq!((back.width(), back.height()), (33, 21));
    }

    #[test]
    fn jpeg_rejects_zero_quality() {
        let processor = ImageProcessor::from_dynamic(DynamicImage::new_rgb8(2, 2));
        assert!(matches!(
            processor.to_jpeg_bytes(0),
            Err(ScanwerkError::Encode(_))
        ));
    }
}
