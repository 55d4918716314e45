// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gradient Hough transform for circular arc features
//!
//! Door swings are drawn as quarter-circle arcs. This is a two-stage
//! detector in the classical HOUGH_GRADIENT arrangement: edge pixels vote
//! for centers along their gradient direction, surviving centers are
//! suppressed to `min_dist` spacing, then each center's radius is taken
//! from the mode of its supporting edge distances.

use crate::types::{DoorParams, Point2D};
use image::GrayImage;
use imageproc::edges::canny;

/// A circle candidate with its accumulator support
#[derive(Debug, Clone)]
pub struct CircleCandidate {
    pub center: Point2D,
    pub radius: f64,
    pub votes: u32,
}

impl CircleCandidate {
    /// Vote support normalized by the circumference of the fitted circle.
    /// A fully drawn circle approaches 1.0; a quarter arc sits near 0.25.
    pub fn support(&self) -> f32 {
        let circumference = 2.0 * std::f64::consts::PI * self.radius.max(1.0);
        ((self.votes as f64 / circumference).min(1.0)) as f32
    }
}

/// Detect circular features in a blurred grayscale image
pub fn detect_circles(blurred: &GrayImage, params: &DoorParams) -> Vec<CircleCandidate> {
    let width = blurred.width() as i32;
    let height = blurred.height() as i32;
    if width < 3 || height < 3 {
        return Vec::new();
    }

    let edges = canny(blurred, params.param1 / 2.0, params.param1);

    // Edge pixels with their unit gradient direction
    let mut edge_points: Vec<(i32, i32, f64, f64)> = Vec::new();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if edges.get_pixel(x as u32, y as u32).0[0] <= 128 {
                continue;
            }
            let (gx, gy) = sobel_at(blurred, x, y);
            let magnitude = (gx * gx + gy * gy).sqrt();
            if magnitude < 1e-6 {
                continue;
            }
            edge_points.push((x, y, gx / magnitude, gy / magnitude));
        }
    }

    if edge_points.is_empty() {
        return Vec::new();
    }

    // Stage 1: center voting along the gradient line, both directions
    let mut accumulator = vec![0u32; (width * height) as usize];
    for &(x, y, dx, dy) in &edge_points {
        for r in params.min_radius..=params.max_radius {
            for sign in [-1.0, 1.0] {
                let cx = (x as f64 + sign * dx * r as f64).round() as i32;
                let cy = (y as f64 + sign * dy * r as f64).round() as i32;
                if cx >= 0 && cx < width && cy >= 0 && cy < height {
                    accumulator[(cy * width + cx) as usize] += 1;
                }
            }
        }
    }

    // Local maxima above the vote floor, strongest first; scan order
    // breaks ties so repeated runs pick identical centers
    let mut peaks: Vec<(u32, i32, i32)> = Vec::new();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let votes = accumulator[(y * width + x) as usize];
            if votes < params.param2 {
                continue;
            }
            if is_local_maximum(&accumulator, width, x, y, votes) {
                peaks.push((votes, y, x));
            }
        }
    }
    peaks.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    // Greedy min_dist suppression
    let mut centers: Vec<(u32, i32, i32)> = Vec::new();
    for &(votes, y, x) in &peaks {
        let far_enough = centers.iter().all(|&(_, cy, cx)| {
            let dx = (x - cx) as f64;
            let dy = (y - cy) as f64;
            (dx * dx + dy * dy).sqrt() >= params.min_dist
        });
        if far_enough {
            centers.push((votes, y, x));
        }
    }

    // Stage 2: radius from the mode of supporting edge distances
    let mut circles = Vec::new();
    for &(votes, cy, cx) in &centers {
        if let Some(radius) = estimate_radius(&edge_points, cx, cy, params) {
            circles.push(CircleCandidate {
                center: Point2D::new(cx as f64, cy as f64),
                radius,
                votes,
            });
        }
    }

    tracing::debug!(count = circles.len(), "circle candidates detected");
    circles
}

fn is_local_maximum(accumulator: &[u32], width: i32, x: i32, y: i32, votes: u32) -> bool {
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let neighbor = accumulator[((y + dy) * width + (x + dx)) as usize];
            if neighbor > votes {
                return false;
            }
            // Plateau: the lexicographically first cell wins
            if neighbor == votes && (dy < 0 || (dy == 0 && dx < 0)) {
                return false;
            }
        }
    }
    true
}

/// 3x3 Sobel response at an interior pixel
fn sobel_at(image: &GrayImage, x: i32, y: i32) -> (f64, f64) {
    let p = |dx: i32, dy: i32| image.get_pixel((x + dx) as u32, (y + dy) as u32).0[0] as f64;

    let gx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
    let gy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
    (gx, gy)
}

/// Histogram the distances from edge pixels to the center and take the
/// mode within the configured radius range
fn estimate_radius(
    edge_points: &[(i32, i32, f64, f64)],
    cx: i32,
    cy: i32,
    params: &DoorParams,
) -> Option<f64> {
    let bins = (params.max_radius - params.min_radius + 1) as usize;
    let mut histogram = vec![0u32; bins];

    for &(x, y, _, _) in edge_points {
        let dx = (x - cx) as f64;
        let dy = (y - cy) as f64;
        let distance = (dx * dx + dy * dy).sqrt();
        let r = distance.round() as i64;
        if r >= params.min_radius as i64 && r <= params.max_radius as i64 {
            histogram[(r - params.min_radius as i64) as usize] += 1;
        }
    }

    let (best_bin, &best_count) = histogram
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;

    if best_count == 0 {
        return None;
    }

    Some((params.min_radius as usize + best_bin) as f64)
}
