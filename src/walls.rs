// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stage 3: filter raw segments into de-duplicated wall segments
//!
//! The line extractor passes everything through, so this stage owns the
//! wall policy: a thickness test against the grayscale ink, a length
//! floor, and a single merge pass that collapses parallel duplicates
//! produced by the two Canny edges of one thick stroke.

use crate::lines::{min_endpoint_distance, undirected_angle_diff};
use crate::types::{DetectionConfig, LineSegment, Point2D, WallSegment, DEFAULT_WALL_THICKNESS_M};
use image::GrayImage;

/// Width of the sampling band drawn along a segment (pixels)
const SAMPLE_BAND_WIDTH: i32 = 3;

/// Consolidate raw segments into wall segments in pixel space
pub fn consolidate_walls(
    segments: &[LineSegment],
    grayscale: &GrayImage,
    config: &DetectionConfig,
) -> Vec<WallSegment> {
    let mut candidates: Vec<LineSegment> = Vec::new();

    for segment in segments {
        if segment.length < config.min_wall_length {
            continue;
        }

        let mean = band_mean_intensity(grayscale, segment, SAMPLE_BAND_WIDTH);
        if mean > config.thickness_threshold as f64 {
            candidates.push(normalize_direction(segment));
        }
    }

    let before_merge = candidates.len();
    let merged = merge_pass(
        candidates,
        config.angle_tolerance,
        config.max_line_separation,
    );

    tracing::debug!(
        input = segments.len(),
        surviving = before_merge,
        walls = merged.len(),
        "wall consolidation complete"
    );

    // Pixel thickness is not measurable from a centerline; carry the
    // semantic default expressed in pixels so assembly round-trips
    let thickness_px = DEFAULT_WALL_THICKNESS_M / config.scale_factor;

    merged
        .into_iter()
        .map(|segment| WallSegment {
            start: segment.start,
            end: segment.end,
            thickness: thickness_px,
        })
        .collect()
}

/// Mean grayscale intensity inside a thin band along the segment.
///
/// True walls render as thick strokes, so the band straddles a mix of ink
/// and paper; segments buried in uniform dark fills fall below the
/// threshold and are rejected. Each pixel counts once even where the band
/// overlaps itself.
pub fn band_mean_intensity(gray: &GrayImage, segment: &LineSegment, band_width: i32) -> f64 {
    let width = gray.width() as i32;
    let height = gray.height() as i32;

    let steps = segment.length.ceil() as usize;
    let dir_x = (segment.end.x - segment.start.x) / segment.length;
    let dir_y = (segment.end.y - segment.start.y) / segment.length;
    // Unit normal to the segment
    let norm_x = -dir_y;
    let norm_y = dir_x;

    let half = band_width / 2;

    let mut pixels: Vec<(i32, i32)> = Vec::new();
    for step in 0..=steps {
        let base_x = segment.start.x + dir_x * step as f64;
        let base_y = segment.start.y + dir_y * step as f64;
        for offset in -half..=half {
            let px = (base_x + norm_x * offset as f64).round() as i32;
            let py = (base_y + norm_y * offset as f64).round() as i32;
            if px >= 0 && px < width && py >= 0 && py < height {
                pixels.push((px, py));
            }
        }
    }

    pixels.sort_unstable();
    pixels.dedup();

    if pixels.is_empty() {
        return 0.0;
    }

    let sum: u64 = pixels
        .iter()
        .map(|&(x, y)| gray.get_pixel(x as u32, y as u32).0[0] as u64)
        .sum();
    sum as f64 / pixels.len() as f64
}

/// Orient a segment so its start is the lexicographically smaller endpoint.
///
/// Merge eligibility treats direction as irrelevant; averaging the
/// endpoints of two anti-parallel duplicates would collapse them to a
/// point, so all candidates are put in a canonical direction first.
fn normalize_direction(segment: &LineSegment) -> LineSegment {
    let flip = segment.end.x < segment.start.x
        || (segment.end.x == segment.start.x && segment.end.y < segment.start.y);

    if flip {
        // Endpoints are finite and distinct, so reversal cannot fail
        LineSegment::try_new(segment.end, segment.start).unwrap_or(*segment)
    } else {
        *segment
    }
}

/// Single merge pass with first-eligible-match pairing.
///
/// Each segment participates in at most one merge; chains of three or more
/// collinear fragments are not fully collapsed in one call. This mirrors
/// the original detector and trades completeness for one linear pass.
fn merge_pass(segments: Vec<LineSegment>, angle_tolerance: f64, max_separation: f64) -> Vec<LineSegment> {
    let mut merged: Vec<LineSegment> = Vec::new();
    let mut used = vec![false; segments.len()];

    for i in 0..segments.len() {
        if used[i] {
            continue;
        }

        let mut did_merge = false;
        for j in (i + 1)..segments.len() {
            if used[j] {
                continue;
            }

            if !merge_eligible(&segments[i], &segments[j], angle_tolerance, max_separation) {
                continue;
            }

            match merge_pair(&segments[i], &segments[j]) {
                Ok(segment) => {
                    used[i] = true;
                    used[j] = true;
                    merged.push(segment);
                    did_merge = true;
                }
                Err(e) => {
                    // Averaged endpoints collapsed; keep the originals apart
                    tracing::debug!(error = %e, "merge produced degenerate segment, skipping pair");
                }
            }
            break;
        }

        if !did_merge && !used[i] {
            merged.push(segments[i]);
            used[i] = true;
        }
    }

    merged
}

/// Two segments merge when near-parallel (undirected) and their closest
/// endpoints are within the separation threshold, inclusive
fn merge_eligible(
    a: &LineSegment,
    b: &LineSegment,
    angle_tolerance: f64,
    max_separation: f64,
) -> bool {
    undirected_angle_diff(a.angle_rad(), b.angle_rad()) < angle_tolerance
        && min_endpoint_distance(a, b) <= max_separation
}

/// Coordinate-wise average of the two segments' endpoints
fn merge_pair(a: &LineSegment, b: &LineSegment) -> Result<LineSegment, crate::error::PipelineError> {
    let start = Point2D::new((a.start.x + b.start.x) / 2.0, (a.start.y + b.start.y) / 2.0);
    let end = Point2D::new((a.end.x + b.end.x) / 2.0, (a.end.y + b.end.y) / 2.0);
    LineSegment::try_new(start, end)
}
