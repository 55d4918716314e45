// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stage 1: normalize a raw blueprint image into a clean edge map
//!
//! Scanned plans carry speckle noise, uneven lighting and faint strokes.
//! The preprocessor reduces all inputs to the same canonical form:
//! a binary ink mask plus a one-pixel edge map ready for line detection.

use crate::types::DetectionConfig;
use image::{GrayImage, Luma};
use imageproc::contrast::{adaptive_threshold, equalize_histogram};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::{gaussian_blur_f32, median_filter};
use imageproc::morphology::dilate;

/// Intermediate images shared by the downstream stages.
///
/// `grayscale` is the denoised single-channel input (used for thickness
/// sampling), `blurred` feeds the arc detector, `binary` is the ink mask
/// (ink = white foreground) for the contour fallback, and `edges` is the
/// Canny edge map consumed by the line extractor.
#[derive(Debug, Clone)]
pub struct PreprocessedImage {
    pub grayscale: GrayImage,
    pub blurred: GrayImage,
    pub binary: GrayImage,
    pub edges: GrayImage,
}

/// Run the full preprocessing chain on a grayscale image
pub fn preprocess(grayscale: &GrayImage, config: &DetectionConfig) -> PreprocessedImage {
    let denoised = if config.denoise_radius > 0 {
        median_filter(grayscale, config.denoise_radius, config.denoise_radius)
    } else {
        grayscale.clone()
    };

    let enhanced = if config.enhance_contrast {
        equalize_histogram(&denoised)
    } else {
        denoised.clone()
    };

    let blurred = gaussian_blur_f32(&enhanced, config.blur_sigma);

    let binary = binarize(&blurred, config.adaptive_block_radius);

    let edges = detect_edges(
        &blurred,
        config.canny_low,
        config.canny_high,
        config.edge_dilate_radius,
    );

    tracing::debug!(
        width = grayscale.width(),
        height = grayscale.height(),
        edge_pixels = count_foreground(&edges),
        "preprocessing complete"
    );

    PreprocessedImage {
        grayscale: denoised,
        blurred,
        binary,
        edges,
    }
}

/// Binarize so that ink pixels become white foreground.
///
/// Adaptive thresholding handles uneven scan lighting; a block radius of
/// zero falls back to a global Otsu threshold for clean exports.
pub fn binarize(image: &GrayImage, block_radius: u32) -> GrayImage {
    let thresholded = if block_radius > 0 {
        adaptive_threshold(image, block_radius)
    } else {
        let level = otsu_level(image);
        global_threshold(image, level)
    };
    // Both thresholds leave paper white; flip so ink is the foreground
    invert(&thresholded)
}

/// Canny edge detection with optional dilation to close small scan gaps
pub fn detect_edges(image: &GrayImage, low: f32, high: f32, dilate_radius: u8) -> GrayImage {
    let edges = canny(image, low, high);
    if dilate_radius > 0 {
        dilate(&edges, Norm::L1, dilate_radius)
    } else {
        edges
    }
}

/// Count foreground (white) pixels in a binary image
pub fn count_foreground(image: &GrayImage) -> usize {
    image.pixels().filter(|p| p.0[0] > 128).count()
}

/// Convert an RGBA buffer to grayscale (ITU-R BT.601 luminance)
pub fn rgba_to_grayscale(rgba: &[u8], width: u32, height: u32) -> GrayImage {
    let mut gray = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let i = ((y * width + x) * 4) as usize;
            if i + 2 < rgba.len() {
                let r = rgba[i] as f32;
                let g = rgba[i + 1] as f32;
                let b = rgba[i + 2] as f32;
                let luma = (0.299 * r + 0.587 * g + 0.114 * b) as u8;
                gray.put_pixel(x, y, Luma([luma]));
            }
        }
    }

    gray
}

fn invert(image: &GrayImage) -> GrayImage {
    let mut result = image.clone();
    for pixel in result.pixels_mut() {
        pixel.0[0] = 255 - pixel.0[0];
    }
    result
}

fn global_threshold(image: &GrayImage, level: u8) -> GrayImage {
    let mut result = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let value = if pixel.0[0] >= level { 255 } else { 0 };
        result.put_pixel(x, y, Luma([value]));
    }
    result
}

/// Otsu's optimal global threshold level.
///
/// Returns the first foreground bin, so thresholding with `>= level`
/// keeps pixels at the background/foreground boundary on the dark side.
fn otsu_level(image: &GrayImage) -> u8 {
    let mut histogram = [0u32; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = (image.width() * image.height()) as f64;
    if total_pixels == 0.0 {
        return 128;
    }

    let mut sum_total = 0.0;
    for (i, &count) in histogram.iter().enumerate() {
        sum_total += i as f64 * count as f64;
    }

    let mut sum_background = 0.0;
    let mut weight_background = 0.0;
    let mut max_variance = 0.0;
    let mut best_threshold = 0usize;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count as f64;
        if weight_background == 0.0 {
            continue;
        }

        let weight_foreground = total_pixels - weight_background;
        if weight_foreground == 0.0 {
            break;
        }

        sum_background += t as f64 * count as f64;

        let mean_background = sum_background / weight_background;
        let mean_foreground = (sum_total - sum_background) / weight_foreground;

        let variance =
            weight_background * weight_foreground * (mean_background - mean_foreground).powi(2);

        if variance > max_variance {
            max_variance = variance;
            best_threshold = t;
        }
    }

    // The loop's t is the last background bin; the level is one above it
    (best_threshold + 1).min(255) as u8
}
