// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture enhancement pipeline — decode, contrast pass on a bounded working
// copy, fit-or-fill resize with edge sharpening, and lossy re-encode.
//
// Every stage after decode degrades instead of failing. Only a failed encode
// is reported, and the outer `enhance` entry point turns even that into "hand
// back the original bytes".

use std::panic::{AssertUnwindSafe, catch_unwind};

use image::DynamicImage;
use image::imageops::FilterType;
use scanwerk_core::config::{EnhancementOptions, PipelineLimits};
use scanwerk_core::error::ScanwerkError;
use tracing::{debug, info, instrument, warn};

use crate::image::processor::{ImageProcessor, edge_capped, fit_dimensions};
use crate::scan::sharpen::{UnsharpMask, unsharp_mask};

/// Contrast gain of the auto-align pass.
const ALIGN_CONTRAST: f32 = 1.2;
/// Brightness offset of the auto-align pass.
const ALIGN_BRIGHTNESS: f32 = 5.0;

/// What a single pipeline stage produced.
#[derive(Debug)]
pub enum StageOutcome<T> {
    /// The stage ran as intended.
    Ok(T),
    /// The stage failed; `T` is the best raster available from earlier stages.
    Degraded(T, ScanwerkError),
    /// Nothing usable was produced.
    Fatal(ScanwerkError),
}

impl<T> StageOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Keep whatever raster the stage left behind, reporting its status.
    fn settle(self, status: &mut StageStatus) -> Result<T, ScanwerkError> {
        match self {
            Self::Ok(value) => {
                *status = StageStatus::Applied;
                Ok(value)
            }
            Self::Degraded(value, err) => {
                *status = StageStatus::Degraded(err.to_string());
                Ok(value)
            }
            Self::Fatal(err) => Err(err),
        }
    }
}

/// How a stage ended up, for logs and callers that want to surface it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StageStatus {
    #[default]
    Skipped,
    Applied,
    Degraded(String),
}

/// Summary of one enhancement call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnhancementReport {
    /// Dimensions after decode, `None` if decode failed.
    pub decoded: Option<(u32, u32)>,
    pub align: StageStatus,
    /// Dimensions of the working raster after the align stage.
    pub working: Option<(u32, u32)>,
    pub resize: StageStatus,
    pub sharpened: bool,
    /// Dimensions of the encoded output, `None` when the original was returned.
    pub output: Option<(u32, u32)>,
    /// The caller got its input bytes back untouched.
    pub returned_original: bool,
}

/// Bytes produced by [`DocumentEnhancer::run`] together with the report.
#[derive(Debug, Clone)]
pub struct Enhanced {
    pub bytes: Vec<u8>,
    pub report: EnhancementReport,
}

/// Prepares captured document photos for storage and OCR.
///
/// Stateless apart from its settings: one enhancer may serve many calls, from
/// many threads, since each call owns its rasters.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentEnhancer {
    options: EnhancementOptions,
    limits: PipelineLimits,
}

impl DocumentEnhancer {
    // -- Construction ---------------------------------------------------------

    pub fn new(options: EnhancementOptions) -> Self {
        Self {
            options,
            limits: PipelineLimits::default(),
        }
    }

    pub fn with_limits(options: EnhancementOptions, limits: PipelineLimits) -> Self {
        Self { options, limits }
    }

    pub fn options(&self) -> &EnhancementOptions {
        &self.options
    }

    pub fn limits(&self) -> &PipelineLimits {
        &self.limits
    }

    // -- Entry points ---------------------------------------------------------

    /// Enhance `data`, never failing: on any terminal problem (undecodable
    /// input, failed encode, or a panic inside the pipeline) the input bytes
    /// are returned unchanged.
    pub fn enhance(&self, data: &[u8]) -> Vec<u8> {
        self.enhance_with_report(data).0
    }

    /// Like [`enhance`](Self::enhance), also returning what each stage did.
    pub fn enhance_with_report(&self, data: &[u8]) -> (Vec<u8>, EnhancementReport) {
        match catch_unwind(AssertUnwindSafe(|| self.run(data))) {
            Ok(Ok(enhanced)) => (enhanced.bytes, enhanced.report),
            Ok(Err(err)) => {
                warn!(%err, "Enhancement failed; returning original bytes");
                (data.to_vec(), Self::original_report())
            }
            Err(_) => {
                warn!("Enhancement panicked; returning original bytes");
                (data.to_vec(), Self::original_report())
            }
        }
    }

    /// Enhance `data`, surfacing an encode failure as an error.
    ///
    /// Undecodable input still yields `Ok` with the original bytes.
    pub fn enhance_checked(&self, data: &[u8]) -> Result<Vec<u8>, ScanwerkError> {
        self.run(data).map(|enhanced| enhanced.bytes)
    }

    /// Run every stage in order and report how each one went.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub fn run(&self, data: &[u8]) -> Result<Enhanced, ScanwerkError> {
        let mut report = EnhancementReport::default();

        // Stage 1: decode. A failure here ends the call with the original bytes.
        let decoded = match self.decode(data) {
            StageOutcome::Ok(processor) => processor,
            StageOutcome::Degraded(processor, err) => {
                warn!(%err, "Decode degraded");
                processor
            }
            StageOutcome::Fatal(err) => {
                warn!(%err, "Decode failed; returning original bytes");
                return Ok(Enhanced {
                    bytes: data.to_vec(),
                    report: Self::original_report(),
                });
            }
        };
        report.decoded = Some(decoded.dimensions());

        // Stage 2: contrast pass on a bounded working copy.
        let aligned = if self.options.auto_align {
            self.auto_align(decoded).settle(&mut report.align)?
        } else {
            decoded
        };
        report.working = Some(aligned.dimensions());

        // Stage 3: fit-or-fill resize, sharpened when affordable.
        let (resized, sharpened) = self.resize_stage(aligned).settle(&mut report.resize)?;
        report.sharpened = sharpened;

        // Stage 4: encode. The only failure reported to the caller.
        let bytes = self.encode(&resized)?;
        report.output = Some(resized.dimensions());

        info!(
            decoded = ?report.decoded,
            output = ?report.output,
            sharpened = report.sharpened,
            out_len = bytes.len(),
            "Enhancement complete"
        );
        Ok(Enhanced { bytes, report })
    }

    // -- Stages ---------------------------------------------------------------

    /// Decode the input. Orientation metadata is applied by the decoder.
    pub fn decode(&self, data: &[u8]) -> StageOutcome<ImageProcessor> {
        match ImageProcessor::from_bytes(data) {
            Ok(processor) if processor.width() == 0 || processor.height() == 0 => {
                StageOutcome::Fatal(ScanwerkError::Decode(format!(
                    "decoded image is empty ({}x{})",
                    processor.width(),
                    processor.height()
                )))
            }
            Ok(processor) => StageOutcome::Ok(processor),
            Err(err) => StageOutcome::Fatal(err),
        }
    }

    /// Global contrast/brightness pass, run on a copy whose longest edge is
    /// capped by [`PipelineLimits::align_edge_cap`].
    ///
    /// Despite the name this performs no geometric correction. Non-8-bit input
    /// is rejected and the decoded raster is used as-is.
    #[instrument(skip(self, processor), fields(width = processor.width(), height = processor.height()))]
    pub fn auto_align(&self, processor: ImageProcessor) -> StageOutcome<ImageProcessor> {
        if !processor.is_8bit() {
            let err = ScanwerkError::UnsupportedPixelFormat(format!(
                "{:?}",
                processor.as_dynamic().color()
            ));
            warn!(%err, "Skipping auto-align");
            return StageOutcome::Degraded(processor, err);
        }

        let (w, h) = processor.dimensions();
        let (cw, ch) = edge_capped(w, h, self.limits.align_edge_cap);
        let working = if (cw, ch) == (w, h) {
            processor
        } else {
            info!(from_w = w, from_h = h, cw, ch, "Downsizing working raster");
            match processor.resized(cw, ch, FilterType::Triangle) {
                Ok(small) => small,
                Err(err) => {
                    warn!(%err, "Could not downsize working raster; skipping auto-align");
                    return StageOutcome::Degraded(processor, err);
                }
            }
        };

        StageOutcome::Ok(working.adjust_linear(ALIGN_CONTRAST, ALIGN_BRIGHTNESS))
    }

    /// Resize to the fit-or-fill target. With `enhance_quality`, resample with
    /// a bicubic filter and sharpen when the result is small enough; if that
    /// fails, fall back to a plain resize, then to the unresized raster.
    pub fn resize_stage(&self, source: ImageProcessor) -> StageOutcome<(ImageProcessor, bool)> {
        if self.options.enhance_quality {
            let quality = self.enhance_quality(&source);
            return with_plain_fallback(source, quality, |raster| self.plain_resize(raster));
        }

        match self.plain_resize(&source) {
            Ok(plain) => StageOutcome::Ok((plain, false)),
            Err(err) => {
                warn!(%err, "Resize failed; keeping working raster");
                StageOutcome::Degraded((source, false), err)
            }
        }
    }

    /// High-quality resample plus unsharp mask below the area ceiling.
    /// Returns the new raster and whether it was sharpened.
    #[instrument(skip(self, source), fields(width = source.width(), height = source.height()))]
    pub fn enhance_quality(
        &self,
        source: &ImageProcessor,
    ) -> Result<(ImageProcessor, bool), ScanwerkError> {
        let (tw, th) = self.target_dimensions(source);
        let resized = source.resized(tw, th, FilterType::CatmullRom)?;

        let pixels = tw as u64 * th as u64;
        if pixels >= self.limits.sharpen_pixel_ceiling {
            info!(
                pixels,
                ceiling = self.limits.sharpen_pixel_ceiling,
                "Raster above sharpen ceiling; skipping unsharp mask"
            );
            return Ok((resized, false));
        }

        let rgba = resized.into_dynamic().into_rgba8();
        let sharp = unsharp_mask(&rgba, UnsharpMask::default())?;
        Ok((
            ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(sharp)),
            true,
        ))
    }

    /// Resize to the same target without sharpening.
    pub fn plain_resize(&self, source: &ImageProcessor) -> Result<ImageProcessor, ScanwerkError> {
        let (tw, th) = self.target_dimensions(source);
        source.resized(tw, th, FilterType::Triangle)
    }

    /// Encode at the configured quality.
    pub fn encode(&self, processor: &ImageProcessor) -> Result<Vec<u8>, ScanwerkError> {
        self.options
            .validate()
            .map_err(|err| ScanwerkError::Encode(err.to_string()))?;
        processor.to_jpeg_bytes(self.options.jpeg_quality())
    }

    fn target_dimensions(&self, source: &ImageProcessor) -> (u32, u32) {
        let (tw, th) = fit_dimensions(
            source.width(),
            source.height(),
            self.options.max_width,
            self.options.max_height,
        );
        debug!(
            src_w = source.width(),
            src_h = source.height(),
            tw,
            th,
            "Target dimensions computed"
        );
        (tw, th)
    }

    fn original_report() -> EnhancementReport {
        EnhancementReport {
            returned_original: true,
            ..Default::default()
        }
    }
}

/// Settle the quality path: keep its result, or on failure resize `source`
/// with `plain`, or keep `source` unresized if that fails too.
fn with_plain_fallback(
    source: ImageProcessor,
    quality: Result<(ImageProcessor, bool), ScanwerkError>,
    plain: impl FnOnce(&ImageProcessor) -> Result<ImageProcessor, ScanwerkError>,
) -> StageOutcome<(ImageProcessor, bool)> {
    let err = match quality {
        Ok(result) => return StageOutcome::Ok(result),
        Err(err) => err,
    };
    warn!(%err, "Quality enhancement failed; falling back to plain resize");
    match plain(&source) {
        Ok(resized) => StageOutcome::Degraded((resized, false), err),
        Err(plain_err) => {
            warn!(err = %plain_err, "Plain resize failed; keeping working raster");
            StageOutcome::Degraded((source, false), plain_err)
        }
    }
}

/// Enhance `data` with `options` and default limits. Never fails; see
/// [`DocumentEnhancer::enhance`].
pub fn enhance(data: &[u8], options: &EnhancementOptions) -> Vec<u8> {
    DocumentEnhancer::new(*options).enhance(data)
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;
    use std::io::Cursor;

    /// A light "page" with a dark block of "text", encoded as PNG.
    fn document_png(width: u32, height: u32) -> Vec<u8> {
        let mut img = RgbaImage::from_pixel(width, height, Rgba([225, 220, 210, 255]));
        draw_filled_rect_mut(
            &mut img,
            Rect::at(width as i32 / 4, height as i32 / 4).of_size(width / 2, height / 3),
            Rgba([35, 35, 40, 255]),
        );
        encode_png(&DynamicImage::ImageRgba8(img))
    }

    fn encode_png(img: &DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .expect("png encode");
        buffer
    }

    fn output_dimensions(bytes: &[u8]) -> (u32, u32) {
        let img = image::load_from_memory(bytes).expect("enhanced output decodes");
        (img.width(), img.height())
    }

    fn boxed(max_width: u32, max_height: u32) -> EnhancementOptions {
        EnhancementOptions {
            max_width,
            max_height,
            ..Default::default()
        }
    }

    #[test]
    fn undecodable_input_is_returned_verbatim() {
        let garbage = b"\x00\x01not really a jpeg\xff\xd8".to_vec();
        assert_eq!(enhance(&garbage, &EnhancementOptions::default()), garbage);
        assert_eq!(enhance(&[], &EnhancementOptions::default()), Vec::<u8>::new());

        let (bytes, report) = DocumentEnhancer::default().enhance_with_report(&garbage);
        assert_eq!(bytes, garbage);
        assert!(report.returned_original);
        assert_eq!(report.decoded, None);
    }

    #[test]
    fn undecodable_input_is_not_an_error_for_checked_callers() {
        let garbage = b"plain text".to_vec();
        let out = DocumentEnhancer::default()
            .enhance_checked(&garbage)
            .expect("decode failure degrades to the original");
        assert_eq!(out, garbage);
    }

    #[test]
    fn output_is_jpeg() {
        let out = enhance(&document_png(60, 40), &boxed(120, 120));
        assert_eq!(image::guess_format(&out).ok(), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn downscales_into_the_box() {
        let out = enhance(&document_png(300, 200), &boxed(100, 100));
        assert_eq!(output_dimensions(&out), (100, 67));
    }

    #[test]
    fn upscales_to_fill_the_box() {
        let out = enhance(&document_png(40, 20), &boxed(200, 200));
        assert_eq!(output_dimensions(&out), (200, 100));

        let out = enhance(&document_png(20, 40), &boxed(200, 100));
        assert_eq!(output_dimensions(&out), (50, 100));
    }

    #[test]
    fn output_stays_in_bounds_and_keeps_aspect() {
        for (w, h) in [(64, 48), (48, 64), (97, 13), (13, 97), (50, 50)] {
            for (mw, mh) in [(80, 60), (30, 200), (1, 1)] {
                let out = enhance(&document_png(w, h), &boxed(mw, mh));
                let (ow, oh) = output_dimensions(&out);
                assert!((1..=mw).contains(&ow), "{w}x{h} in {mw}x{mh} -> {ow}x{oh}");
                assert!((1..=mh).contains(&oh), "{w}x{h} in {mw}x{mh} -> {ow}x{oh}");
                let aspect = w as f64 / h as f64;
                let drift = (ow as f64 - oh as f64 * aspect)
                    .abs()
                    .min((oh as f64 - ow as f64 / aspect).abs());
                assert!(drift <= 1.0, "{w}x{h} in {mw}x{mh} -> {ow}x{oh}");
            }
        }
    }

    #[test]
    fn plain_resize_when_quality_enhancement_is_off() {
        let options = EnhancementOptions {
            enhance_quality: false,
            ..boxed(100, 100)
        };
        let (out, report) = DocumentEnhancer::new(options).enhance_with_report(&document_png(300, 200));
        assert_eq!(output_dimensions(&out), (100, 67));
        assert_eq!(report.resize, StageStatus::Applied);
        assert!(!report.sharpened);
    }

    #[test]
    fn auto_align_is_skipped_when_disabled() {
        let options = EnhancementOptions {
            auto_align: false,
            ..boxed(100, 100)
        };
        let (_, report) = DocumentEnhancer::new(options).enhance_with_report(&document_png(30, 30));
        assert_eq!(report.align, StageStatus::Skipped);
        assert_eq!(report.working, Some((30, 30)));
    }

    #[test]
    fn auto_align_works_on_a_capped_copy() {
        let limits = PipelineLimits {
            align_edge_cap: 100,
            ..Default::default()
        };
        let enhancer = DocumentEnhancer::with_limits(boxed(1000, 1000), limits);
        let (out, report) = enhancer.enhance_with_report(&document_png(300, 150));

        assert_eq!(report.decoded, Some((300, 150)));
        assert_eq!(report.align, StageStatus::Applied);
        assert_eq!(report.working, Some((100, 50)));
        // The resize stage still targets the caller's box.
        assert_eq!(output_dimensions(&out), (1000, 500));
    }

    #[test]
    fn auto_align_applies_contrast_to_the_raster() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([100, 200, 0, 255])));
        let enhancer = DocumentEnhancer::default();
        let aligned = match enhancer.auto_align(ImageProcessor::from_dynamic(img)) {
            StageOutcome::Ok(p) => p,
            _ => panic!("expected the contrast pass to apply"),
        };
        let rgba = aligned.into_dynamic().into_rgba8();
        assert_eq!(rgba.get_pixel(3, 3).0, [99, 219, 0, 255]);
    }

    #[test]
    fn sixteen_bit_input_degrades_auto_align_only() {
        let img: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(40, 20, Rgba([40_000, 20_000, 10_000, 65_535]));
        let png = encode_png(&DynamicImage::ImageRgba16(img));

        let (out, report) = DocumentEnhancer::new(boxed(80, 80)).enhance_with_report(&png);
        assert!(matches!(report.align, StageStatus::Degraded(ref why) if why.contains("Rgba16")));
        assert_eq!(report.resize, StageStatus::Applied);
        assert!(!report.returned_original);
        assert_eq!(output_dimensions(&out), (80, 40));
    }

    #[test]
    fn sharpening_respects_the_area_ceiling() {
        let png = document_png(64, 48);

        let (_, report) = DocumentEnhancer::new(boxed(64, 48)).enhance_with_report(&png);
        assert!(report.sharpened);

        // Sharpening needs strictly fewer pixels than the ceiling.
        let at_ceiling = PipelineLimits {
            sharpen_pixel_ceiling: 64 * 48,
            ..Default::default()
        };
        let (_, report) =
            DocumentEnhancer::with_limits(boxed(64, 48), at_ceiling).enhance_with_report(&png);
        assert!(!report.sharpened);
        assert_eq!(report.resize, StageStatus::Applied);

        let above = PipelineLimits {
            sharpen_pixel_ceiling: 64 * 48 + 1,
            ..Default::default()
        };
        let (_, report) = DocumentEnhancer::with_limits(boxed(64, 48), above).enhance_with_report(&png);
        assert!(report.sharpened);
    }

    #[test]
    fn encode_failure_surfaces_to_checked_callers_only() {
        let options = EnhancementOptions {
            quality: 0.0,
            ..boxed(50, 50)
        };
        let enhancer = DocumentEnhancer::new(options);
        let png = document_png(20, 20);

        assert!(matches!(
            enhancer.enhance_checked(&png),
            Err(ScanwerkError::Encode(_))
        ));

        let (out, report) = enhancer.enhance_with_report(&png);
        assert_eq!(out, png);
        assert!(report.returned_original);
    }

    #[test]
    fn quality_failure_falls_back_to_plain_resize() {
        let source = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(RgbaImage::new(30, 20)));
        let outcome = with_plain_fallback(
            source,
            Err(ScanwerkError::Sharpen("buffer mismatch".into())),
            |raster| raster.resized(15, 10, FilterType::Triangle),
        );

        match outcome {
            StageOutcome::Degraded((plain, sharpened), err) => {
                assert_eq!(plain.dimensions(), (15, 10));
                assert!(!sharpened);
                assert!(matches!(err, ScanwerkError::Sharpen(_)));
            }
            _ => panic!("expected the plain resize to stand in"),
        }
    }

    #[test]
    fn quality_success_skips_the_plain_resize() {
        let source = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(RgbaImage::new(30, 20)));
        let sharpened = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(RgbaImage::new(60, 40)));
        let outcome = with_plain_fallback(source, Ok((sharpened, true)), |_| {
            panic!("plain resize must not run")
        });

        match outcome {
            StageOutcome::Ok((raster, true)) => assert_eq!(raster.dimensions(), (60, 40)),
            _ => panic!("expected the quality result"),
        }
    }

    #[test]
    fn failed_resizes_keep_the_working_raster() {
        // A box this large cannot be allocated; both resize paths fail and the
        // working raster is encoded as-is.
        let options = boxed(u32::MAX, u32::MAX);
        let enhancer = DocumentEnhancer::new(options);
        let (out, report) = enhancer.enhance_with_report(&document_png(30, 20));

        assert!(matches!(report.resize, StageStatus::Degraded(_)));
        assert!(!report.sharpened);
        assert_eq!(output_dimensions(&out), (30, 20));
    }

    #[test]
    fn stage_outcome_reports_ok() {
        let enhancer = DocumentEnhancer::default();
        assert!(enhancer.decode(&document_png(5, 5)).is_ok());
        assert!(!enhancer.decode(b"nope").is_ok());
    }
}
