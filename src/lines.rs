// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stage 2: probabilistic straight-line extraction from the edge map
//!
//! No filtering happens here; noise segments pass through on purpose.
//! The wall consolidator and the opening classifier both reuse this
//! detector with different thresholds, so policy lives with them.

use crate::error::PipelineError;
use crate::types::{HoughParams, LineSegment, Point2D};
use image::GrayImage;
use std::f64::consts::{FRAC_PI_2, PI};

/// Cap on accumulator peaks examined per call
const MAX_PEAKS: usize = 500;

/// Detect raw line segments in a binary edge map.
///
/// Votes every edge pixel into a (rho, theta) accumulator, then walks each
/// peak's supporting points in projection order, splitting at gaps larger
/// than `max_line_gap`. Returns [`PipelineError::NoFeaturesDetected`] when
/// the edge map has no foreground or no segment reaches `min_line_length`;
/// an architecturally blank plan is a valid input and the pipeline maps
/// this tag to an empty model.
pub fn extract_segments(
    edges: &GrayImage,
    params: &HoughParams,
) -> Result<Vec<LineSegment>, PipelineError> {
    let width = edges.width() as i32;
    let height = edges.height() as i32;

    let num_thetas = (PI / params.theta_resolution) as usize;

    let mut cos_table = Vec::with_capacity(num_thetas);
    let mut sin_table = Vec::with_capacity(num_thetas);
    for i in 0..num_thetas {
        let theta = i as f64 * params.theta_resolution;
        cos_table.push(theta.cos());
        sin_table.push(theta.sin());
    }

    let max_rho = ((width * width + height * height) as f64).sqrt();
    let num_rhos = (2.0 * max_rho / params.rho_resolution) as usize + 1;
    let rho_offset = max_rho;

    // Collect edge points in scan order so repeated runs vote identically
    let mut edge_points: Vec<(i32, i32)> = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if edges.get_pixel(x as u32, y as u32).0[0] > 128 {
                edge_points.push((x, y));
            }
        }
    }

    if edge_points.is_empty() {
        return Err(PipelineError::NoFeaturesDetected);
    }

    let mut accumulator = vec![0u32; num_thetas * num_rhos];
    for &(x, y) in &edge_points {
        for theta_idx in 0..num_thetas {
            let rho = x as f64 * cos_table[theta_idx] + y as f64 * sin_table[theta_idx];
            let rho_idx = ((rho + rho_offset) / params.rho_resolution) as usize;
            if rho_idx < num_rhos {
                accumulator[theta_idx * num_rhos + rho_idx] += 1;
            }
        }
    }

    let mut peaks: Vec<(usize, usize, u32)> = Vec::new();
    for theta_idx in 0..num_thetas {
        for rho_idx in 0..num_rhos {
            let votes = accumulator[theta_idx * num_rhos + rho_idx];
            if votes >= params.vote_threshold {
                peaks.push((theta_idx, rho_idx, votes));
            }
        }
    }

    // Strongest peaks first; index order breaks ties deterministically
    peaks.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));

    let mut segments = Vec::new();
    let mut used_points = vec![false; edge_points.len()];

    for (theta_idx, rho_idx, _votes) in peaks.iter().take(MAX_PEAKS) {
        let rho = *rho_idx as f64 * params.rho_resolution - rho_offset;
        let cos_t = cos_table[*theta_idx];
        let sin_t = sin_table[*theta_idx];

        // Supporting points: close to the peak line, not yet claimed
        let mut line_points: Vec<(i32, i32, usize)> = Vec::new();
        for (i, &(x, y)) in edge_points.iter().enumerate() {
            if used_points[i] {
                continue;
            }
            let point_rho = x as f64 * cos_t + y as f64 * sin_t;
            if (point_rho - rho).abs() < 2.0 {
                line_points.push((x, y, i));
            }
        }

        if line_points.len() < 2 {
            continue;
        }

        // Order along the line direction, then split at gaps
        line_points.sort_by(|a, b| {
            let proj_a = a.0 as f64 * (-sin_t) + a.1 as f64 * cos_t;
            let proj_b = b.0 as f64 * (-sin_t) + b.1 as f64 * cos_t;
            proj_a
                .partial_cmp(&proj_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.2.cmp(&b.2))
        });

        let mut run_start = 0;
        for i in 1..=line_points.len() {
            let gap = if i < line_points.len() {
                let dx = (line_points[i].0 - line_points[i - 1].0) as f64;
                let dy = (line_points[i].1 - line_points[i - 1].1) as f64;
                (dx * dx + dy * dy).sqrt()
            } else {
                f64::INFINITY
            };

            if gap > params.max_line_gap {
                emit_run(
                    &line_points[run_start..i],
                    params.min_line_length,
                    &mut used_points,
                    &mut segments,
                );
                run_start = i;
            }
        }
    }

    if segments.is_empty() {
        return Err(PipelineError::NoFeaturesDetected);
    }

    tracing::debug!(count = segments.len(), "raw segments extracted");
    Ok(segments)
}

/// Turn one contiguous run of supporting points into a segment
fn emit_run(
    run: &[(i32, i32, usize)],
    min_line_length: f64,
    used_points: &mut [bool],
    segments: &mut Vec<LineSegment>,
) {
    if run.len() < 2 {
        return;
    }

    let start = Point2D::new(run[0].0 as f64, run[0].1 as f64);
    let end = Point2D::new(
        run[run.len() - 1].0 as f64,
        run[run.len() - 1].1 as f64,
    );

    if start.distance_to(&end) < min_line_length {
        return;
    }

    match LineSegment::try_new(start, end) {
        Ok(segment) => {
            for &(_, _, idx) in run {
                used_points[idx] = true;
            }
            segments.push(segment);
        }
        Err(e) => {
            // A single malformed segment must not abort the run
            tracing::debug!(error = %e, "dropping degenerate segment");
        }
    }
}

/// Undirected angle difference in radians, in [0, PI/2].
///
/// A line and its reversal describe the same wall, so angle and
/// angle + 180 degrees compare as equal.
pub fn undirected_angle_diff(a_rad: f64, b_rad: f64) -> f64 {
    let mut diff = (a_rad - b_rad).abs() % PI;
    if diff > FRAC_PI_2 {
        diff = PI - diff;
    }
    diff
}

/// Minimum euclidean distance over the four endpoint pairings of two segments
pub fn min_endpoint_distance(a: &LineSegment, b: &LineSegment) -> f64 {
    let d1 = a.start.distance_to(&b.start);
    let d2 = a.start.distance_to(&b.end);
    let d3 = a.end.distance_to(&b.start);
    let d4 = a.end.distance_to(&b.end);
    d1.min(d2).min(d3).min(d4)
}

/// Perpendicular distance from a point to a segment, clamped to its extent
pub fn point_to_segment_distance(point: &Point2D, start: &Point2D, end: &Point2D) -> f64 {
    let dir = end.to_nalgebra() - start.to_nalgebra();
    let length_sq = dir.norm_squared();

    if length_sq < 1e-10 {
        return point.distance_to(start);
    }

    let t = ((point.to_nalgebra() - start.to_nalgebra()).dot(&dir) / length_sq).clamp(0.0, 1.0);
    let projection = start.to_nalgebra() + dir * t;
    (point.to_nalgebra() - projection).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Luma;

    fn edge_image_with_horizontal_line() -> GrayImage {
        let mut img = GrayImage::new(200, 100);
        for x in 20..180 {
            img.put_pixel(x, 50, Luma([255]));
        }
        img
    }

    #[test]
    fn test_detects_horizontal_segment() {
        let edges = edge_image_with_horizontal_line();
        let params = HoughParams {
            vote_threshold: 50,
            min_line_length: 100.0,
            ..Default::default()
        };

        let segments = extract_segments(&edges, &params).unwrap();

        assert!(!segments.is_empty());
        let longest = segments
            .iter()
            .max_by(|a, b| a.length.partial_cmp(&b.length).unwrap())
            .unwrap();
        assert!(longest.length >= 150.0);
        assert_relative_eq!(longest.start.y, 50.0, epsilon = 2.0);
        assert_relative_eq!(longest.end.y, 50.0, epsilon = 2.0);
    }

    #[test]
    fn test_empty_edge_map_reports_no_features() {
        let edges = GrayImage::new(100, 100);
        let result = extract_segments(&edges, &HoughParams::default());
        assert!(matches!(result, Err(PipelineError::NoFeaturesDetected)));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let edges = edge_image_with_horizontal_line();
        let params = HoughParams {
            vote_threshold: 30,
            min_line_length: 50.0,
            ..Default::default()
        };

        let first = extract_segments(&edges, &params).unwrap();
        let second = extract_segments(&edges, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_undirected_angle_diff() {
        // 5 degrees vs 185 degrees: same undirected line
        let a = 5.0_f64.to_radians();
        let b = 185.0_f64.to_radians();
        assert_relative_eq!(undirected_angle_diff(a, b), 0.0, epsilon = 1e-12);

        let c = 0.0;
        let d = 0.2;
        assert_relative_eq!(undirected_angle_diff(c, d), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_point_to_segment_distance() {
        let start = Point2D::new(0.0, 0.0);
        let end = Point2D::new(10.0, 0.0);

        let above = Point2D::new(5.0, 5.0);
        assert_relative_eq!(point_to_segment_distance(&above, &start, &end), 5.0);

        // Beyond the end: clamped to endpoint distance
        let past = Point2D::new(13.0, 4.0);
        assert_relative_eq!(point_to_segment_distance(&past, &start, &end), 5.0);
    }

    #[test]
    fn test_min_endpoint_distance() {
        let a = LineSegment::try_new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)).unwrap();
        let b = LineSegment::try_new(Point2D::new(13.0, 4.0), Point2D::new(30.0, 4.0)).unwrap();
        assert_relative_eq!(min_endpoint_distance(&a, &b), 5.0);
    }
}
