//! Image processing pipeline: RGB source -> downscale -> luminance ->
//! exposure/contrast -> Sobel edge magnitude
//!
//! The pipeline runs on the main tick and publishes each completed edge
//! image through an `ArcSwap`, so the audio callback always reads a
//! fully-formed snapshot without taking a lock. The previously published
//! buffer is recycled as the next scratch buffer once the audio thread has
//! let go of it.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use crate::raster::{GrayRaster, RgbRaster};

/// Processing parameters, compared by value to detect staleness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineParams {
    /// Downscale factor applied to the source before processing (e.g. 0.25).
    pub scale_factor: f32,
    /// Multiplier around the 0.5 midpoint (1.0 = no change).
    pub contrast: f32,
    /// Additive offset in normalized [0,1] space.
    pub exposure: f32,
    /// Scales the Sobel magnitude before clamping to [0,255].
    pub sobel_strength: f32,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            scale_factor: 0.25,
            contrast: 1.0,
            exposure: 0.0,
            sobel_strength: 1.0,
        }
    }
}

/// A fully-processed edge image plus the generation that produced it.
#[derive(Debug, Clone)]
pub struct EdgeSnapshot {
    pub image: GrayRaster,
    pub generation: u64,
}

/// Shared handle the audio thread loads snapshots from.
pub type EdgeHandle = Arc<ArcSwap<EdgeSnapshot>>;

/// Owns the current source image and derives the Sobel edge image from it.
pub struct GradientPipeline {
    source: Option<RgbRaster>,
    gray: GrayRaster,
    spare: Option<GrayRaster>,
    published: EdgeHandle,
    params: PipelineParams,
    dirty: bool,
    generation: u64,
}

impl GradientPipeline {
    pub fn new(params: PipelineParams) -> Self {
        let empty = EdgeSnapshot {
            image: GrayRaster::new(0, 0),
            generation: 0,
        };
        Self {
            source: None,
            gray: GrayRaster::new(0, 0),
            spare: None,
            published: Arc::new(ArcSwap::from_pointee(empty)),
            params,
            dirty: true,
            generation: 0,
        }
    }

    /// Replace the source image (e.g. a frame captured from the camera).
    /// Empty frames are ignored.
    pub fn set_source(&mut self, rgb: RgbRaster) {
        if rgb.is_empty() {
            return;
        }
        self.source = Some(rgb);
        self.dirty = true;
    }

    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        if scale_factor != self.params.scale_factor {
            self.params.scale_factor = scale_factor;
            self.dirty = true;
        }
    }

    /// Update processing parameters; marks dirty only when a value changes.
    pub fn set_params(&mut self, contrast: f32, exposure: f32, sobel_strength: f32) {
        if contrast != self.params.contrast
            || exposure != self.params.exposure
            || sobel_strength != self.params.sobel_strength
        {
            self.params.contrast = contrast;
            self.params.exposure = exposure;
            self.params.sobel_strength = sobel_strength;
            self.dirty = true;
        }
    }

    pub fn params(&self) -> PipelineParams {
        self.params
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Generation of the most recently published edge image. Bumped on every
    /// successful `process()`; consumers detect change by comparing it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Shared handle for the audio side. Cheap to clone.
    pub fn edges(&self) -> EdgeHandle {
        Arc::clone(&self.published)
    }

    /// Dimensions the derived images currently have (0x0 before the first
    /// source arrives).
    pub fn dimensions(&self) -> (usize, usize) {
        match &self.source {
            Some(src) => self.derived_dimensions(src),
            None => (self.gray.width(), self.gray.height()),
        }
    }

    fn derived_dimensions(&self, src: &RgbRaster) -> (usize, usize) {
        let w = ((src.width() as f32 * self.params.scale_factor) as usize).max(1);
        let h = ((src.height() as f32 * self.params.scale_factor) as usize).max(1);
        (w, h)
    }

    /// Run processing if needed. No-op when nothing changed or no source
    /// exists; otherwise reprocesses and atomically publishes the result.
    pub fn process(&mut self) {
        if !self.dirty {
            return;
        }
        let Some(source) = self.source.take() else {
            return;
        };

        let (w, h) = self.derived_dimensions(&source);
        self.gray.reallocate(w, h);
        resample_to_luminance(&source, &mut self.gray);
        apply_adjustments(&mut self.gray, self.params.contrast, self.params.exposure);

        let mut edges = self.spare.take().unwrap_or_else(|| GrayRaster::new(w, h));
        edges.reallocate(w, h);
        apply_sobel(&self.gray, &mut edges, self.params.sobel_strength);

        self.generation += 1;
        let old = self.published.swap(Arc::new(EdgeSnapshot {
            image: edges,
            generation: self.generation,
        }));
        // Recycle the retired buffer unless the audio thread still holds it.
        self.spare = Arc::try_unwrap(old).ok().map(|s| s.image);

        self.source = Some(source);
        self.dirty = false;
        debug!(generation = self.generation, width = w, height = h, "processed edge image");
    }
}

/// Nearest-neighbor downscale straight into single-channel luminance
/// (Rec. 601 weights).
fn resample_to_luminance(src: &RgbRaster, dst: &mut GrayRaster) {
    let (dw, dh) = (dst.width(), dst.height());
    let (sw, sh) = (src.width(), src.height());
    for y in 0..dh {
        let sy = (y * sh / dh).min(sh - 1);
        for x in 0..dw {
            let sx = (x * sw / dw).min(sw - 1);
            let (r, g, b) = src.rgb(sx, sy);
            let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
            dst.set(x, y, luma as u8);
        }
    }
}

/// Exposure as an additive offset in normalized space, then contrast as a
/// scale about the 0.5 midpoint.
fn apply_adjustments(img: &mut GrayRaster, contrast: f32, exposure: f32) {
    for p in img.data_mut() {
        let mut v = *p as f32 / 255.0;
        v += exposure;
        v = (v - 0.5) * contrast + 0.5;
        *p = (v * 255.0).clamp(0.0, 255.0) as u8;
    }
}

/// Sobel magnitude as the L1 sum |Gx| + |Gy|, scaled and clamped to [0,255].
/// The L1 norm is intentional; all downstream brightness thresholds are
/// calibrated against it. Border pixels stay 0 because the kernel is not
/// evaluated there.
fn apply_sobel(src: &GrayRaster, dst: &mut GrayRaster, sobel_strength: f32) {
    dst.fill(0);
    let w = src.width();
    let h = src.height();
    if w < 3 || h < 3 {
        return;
    }
    let pix = src.data();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let gx = -(pix[i - w - 1] as i32) + pix[i - w + 1] as i32
                - 2 * pix[i - 1] as i32
                + 2 * pix[i + 1] as i32
                - pix[i + w - 1] as i32
                + pix[i + w + 1] as i32;
            let gy = -(pix[i - w - 1] as i32)
                - 2 * pix[i - w] as i32
                - pix[i - w + 1] as i32
                + pix[i + w - 1] as i32
                + 2 * pix[i + w] as i32
                + pix[i + w + 1] as i32;
            let magnitude = (gx.abs() + gy.abs()) as f32 * sobel_strength;
            dst.data_mut()[i] = magnitude.clamp(0.0, 255.0) as u8;
        }
    }
}
