// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stage 4: classify doors and windows against the consolidated walls
//!
//! Doors are found by their swing arcs: a circle candidate counts only if
//! an annulus around it touches the rasterized wall mask, since doors are
//! never freestanding. Windows are short parallel line pairs that sit next
//! to a wall without being part of it; when no pair is found, a contour
//! scan for small rectangles takes over. Doors always win conflicts.

use crate::circles::{detect_circles, CircleCandidate};
use crate::lines::{extract_segments, point_to_segment_distance, undirected_angle_diff};
use crate::preprocess::PreprocessedImage;
use crate::types::{
    DetectedDoor, DetectedWindow, DetectionConfig, HoughParams, LineSegment, Point2D, WallSegment,
};
use image::{GrayImage, Luma};

/// Margin added to the arc radius for the wall-adjacency annulus (pixels)
const DOOR_WALL_MARGIN: f64 = 5.0;
/// Half thickness of the annulus ring test (pixels)
const ANNULUS_HALF_WIDTH: f64 = 1.5;
/// Rasterized wall line half width (2px lines, as drawn in the mask)
const WALL_MASK_HALF_WIDTH: i32 = 1;
/// Dilation radius for the window proximity test (pixels)
const WINDOW_PROXIMITY_RADIUS: i32 = 3;
/// Maximum midpoint distance for associating an opening with a host wall
const HOST_WALL_MAX_DISTANCE: f64 = 25.0;
/// Bounding-box area range for the rectangular contour fallback (px^2)
const CONTOUR_AREA_RANGE: (f64, f64) = (50.0, 500.0);
/// Canonical window aspect ratio (width over height, long side first)
const CANONICAL_WINDOW_ASPECT: f64 = 1.25;

/// Classified openings in pixel space
#[derive(Debug, Clone, Default)]
pub struct DetectedOpenings {
    pub doors: Vec<DetectedDoor>,
    pub windows: Vec<DetectedWindow>,
}

/// Run door and window classification against the consolidated walls
pub fn classify_openings(
    pre: &PreprocessedImage,
    walls: &[WallSegment],
    config: &DetectionConfig,
) -> DetectedOpenings {
    if walls.is_empty() {
        // Openings are defined by wall adjacency; nothing to do
        return DetectedOpenings::default();
    }

    let mask = rasterize_wall_mask(walls, pre.grayscale.width(), pre.grayscale.height());

    let doors = detect_doors(pre, walls, &mask, config);
    let windows = detect_windows(pre, walls, &mask, &doors, config);

    tracing::debug!(
        doors = doors.len(),
        windows = windows.len(),
        "opening classification complete"
    );

    DetectedOpenings { doors, windows }
}

/// Draw the wall centerlines into a binary mask as 2px-wide strokes
pub fn rasterize_wall_mask(walls: &[WallSegment], width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for wall in walls {
        stamp_line(
            &mut mask,
            wall.start.x.round() as i32,
            wall.start.y.round() as i32,
            wall.end.x.round() as i32,
            wall.end.y.round() as i32,
            WALL_MASK_HALF_WIDTH,
        );
    }
    mask
}

/// Bresenham walk stamping a disc brush at every step
fn stamp_line(mask: &mut GrayImage, x0: i32, y0: i32, x1: i32, y1: i32, brush: i32) {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        for oy in -brush..=brush {
            for ox in -brush..=brush {
                if ox * ox + oy * oy <= brush * brush {
                    let px = x + ox;
                    let py = y + oy;
                    if px >= 0 && px < mask.width() as i32 && py >= 0 && py < mask.height() as i32 {
                        mask.put_pixel(px as u32, py as u32, Luma([255]));
                    }
                }
            }
        }

        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

// ─── Doors ──────────────────────────────────────────────────────────────────

fn detect_doors(
    pre: &PreprocessedImage,
    walls: &[WallSegment],
    mask: &GrayImage,
    config: &DetectionConfig,
) -> Vec<DetectedDoor> {
    let circles = detect_circles(&pre.blurred, &config.door);

    circles
        .into_iter()
        .filter(|circle| annulus_touches_mask(mask, circle))
        .map(|circle| {
            let host_wall = nearest_wall(
                &circle.center,
                walls,
                circle.radius + DOOR_WALL_MARGIN + HOST_WALL_MAX_DISTANCE,
            );
            DetectedDoor {
                center: circle.center,
                radius: circle.radius,
                confidence: circle.support(),
                host_wall,
            }
        })
        .collect()
}

/// True when the ring at `radius + margin` overlaps any wall mask pixel
fn annulus_touches_mask(mask: &GrayImage, circle: &CircleCandidate) -> bool {
    let ring_radius = circle.radius + DOOR_WALL_MARGIN;
    let reach = (ring_radius + ANNULUS_HALF_WIDTH).ceil() as i32;

    let cx = circle.center.x.round() as i32;
    let cy = circle.center.y.round() as i32;

    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let distance = ((dx * dx + dy * dy) as f64).sqrt();
            if (distance - ring_radius).abs() > ANNULUS_HALF_WIDTH {
                continue;
            }
            let px = cx + dx;
            let py = cy + dy;
            if px >= 0
                && px < mask.width() as i32
                && py >= 0
                && py < mask.height() as i32
                && mask.get_pixel(px as u32, py as u32).0[0] > 128
            {
                return true;
            }
        }
    }
    false
}

// ─── Windows ────────────────────────────────────────────────────────────────

fn detect_windows(
    pre: &PreprocessedImage,
    walls: &[WallSegment],
    mask: &GrayImage,
    doors: &[DetectedDoor],
    config: &DetectionConfig,
) -> Vec<DetectedWindow> {
    let candidates = window_candidates(pre, walls, mask, config);
    let mut windows = pair_candidates(&candidates, config);
    for window in &mut windows {
        window.host_wall = nearest_wall(&window.position, walls, HOST_WALL_MAX_DISTANCE);
    }

    if windows.is_empty() {
        windows = rectangle_fallback(pre, walls, mask, config);
    }

    // Doors take priority: a door opening in projection can look like a
    // pair of jamb lines
    windows.retain(|window| {
        doors.iter().all(|door| {
            window.position.distance_to(&door.center) > door.radius + DOOR_WALL_MARGIN
        })
    });

    windows
}

/// Short segments near a wall, parallel to it, but not lying on it
fn window_candidates(
    pre: &PreprocessedImage,
    walls: &[WallSegment],
    mask: &GrayImage,
    config: &DetectionConfig,
) -> Vec<LineSegment> {
    let (min_len, max_len) = config.window_length_range;
    let params = HoughParams {
        vote_threshold: 15,
        min_line_length: min_len,
        max_line_gap: 3.0,
        ..config.hough.clone()
    };

    let segments = match extract_segments(&pre.edges, &params) {
        Ok(segments) => segments,
        Err(_) => return Vec::new(),
    };

    segments
        .into_iter()
        .filter(|seg| seg.length >= min_len && seg.length <= max_len)
        .filter(|seg| !segment_overlaps_mask(mask, seg, 0))
        .filter(|seg| segment_overlaps_mask(mask, seg, WINDOW_PROXIMITY_RADIUS))
        .filter(|seg| {
            parallel_wall_nearby(seg, walls, config.window_angle_tolerance)
        })
        .collect()
}

/// Sample along a segment with perpendicular offsets up to `half_width`;
/// true when any sampled pixel is set in the mask
fn segment_overlaps_mask(mask: &GrayImage, segment: &LineSegment, half_width: i32) -> bool {
    let width = mask.width() as i32;
    let height = mask.height() as i32;

    let steps = segment.length.ceil() as usize;
    let dir_x = (segment.end.x - segment.start.x) / segment.length;
    let dir_y = (segment.end.y - segment.start.y) / segment.length;
    let norm_x = -dir_y;
    let norm_y = dir_x;

    for step in 0..=steps {
        let base_x = segment.start.x + dir_x * step as f64;
        let base_y = segment.start.y + dir_y * step as f64;
        for offset in -half_width..=half_width {
            let px = (base_x + norm_x * offset as f64).round() as i32;
            let py = (base_y + norm_y * offset as f64).round() as i32;
            if px >= 0
                && px < width
                && py >= 0
                && py < height
                && mask.get_pixel(px as u32, py as u32).0[0] > 128
            {
                return true;
            }
        }
    }
    false
}

fn parallel_wall_nearby(segment: &LineSegment, walls: &[WallSegment], tolerance: f64) -> bool {
    let midpoint = segment.midpoint();
    walls.iter().any(|wall| {
        point_to_segment_distance(&midpoint, &wall.start, &wall.end) <= HOST_WALL_MAX_DISTANCE
            && undirected_angle_diff(segment.angle_rad(), wall.angle_rad()) <= tolerance
    })
}

/// Pair surviving candidates first-eligible-match; each pair is one window
fn pair_candidates(candidates: &[LineSegment], config: &DetectionConfig) -> Vec<DetectedWindow> {
    let mut windows = Vec::new();
    let mut used = vec![false; candidates.len()];

    for i in 0..candidates.len() {
        if used[i] {
            continue;
        }
        for j in (i + 1)..candidates.len() {
            if used[j] {
                continue;
            }

            let a = &candidates[i];
            let b = &candidates[j];
            let angle_diff = undirected_angle_diff(a.angle_rad(), b.angle_rad());
            let separation = a.midpoint().distance_to(&b.midpoint());

            if angle_diff <= config.window_angle_tolerance
                && separation <= config.window_pair_max_separation
            {
                used[i] = true;
                used[j] = true;
                windows.push(window_from_pair(a, b, angle_diff, config));
                break;
            }
        }
    }

    windows
}

fn window_from_pair(
    a: &LineSegment,
    b: &LineSegment,
    angle_diff: f64,
    config: &DetectionConfig,
) -> DetectedWindow {
    let position = a.midpoint().midpoint(&b.midpoint());
    let width_px = (a.length + b.length) / 2.0;

    // Plausibility rewards tight parallelism and similar jamb lengths
    let parallelism = 1.0 - (angle_diff / config.window_angle_tolerance.max(1e-9)).min(1.0);
    let length_similarity = (a.length.min(b.length) / a.length.max(b.length)).clamp(0.0, 1.0);
    let confidence = ((parallelism + length_similarity) / 2.0) as f32;

    DetectedWindow {
        position,
        width_px,
        angle: a.angle,
        confidence,
        host_wall: None,
    }
}

// ─── Rectangular contour fallback ───────────────────────────────────────────

/// When no jamb pair is confidently found, scan the ink mask for small
/// closed, roughly rectangular contours next to a wall
fn rectangle_fallback(
    pre: &PreprocessedImage,
    walls: &[WallSegment],
    mask: &GrayImage,
    config: &DetectionConfig,
) -> Vec<DetectedWindow> {
    let contours = trace_contours(&pre.binary);

    let mut windows = Vec::new();
    for contour in &contours {
        let simplified = simplify_polygon(contour, 2.0);
        if simplified.len() < 4 || simplified.len() > 6 {
            continue;
        }

        let (min_x, min_y, max_x, max_y) = bounding_box(&simplified);
        let w = max_x - min_x;
        let h = max_y - min_y;
        if w <= 0.0 || h <= 0.0 {
            continue;
        }

        let area = w * h;
        if area < CONTOUR_AREA_RANGE.0 || area > CONTOUR_AREA_RANGE.1 {
            continue;
        }

        let aspect = w / h;
        if !(0.25..=4.0).contains(&aspect) {
            continue;
        }

        let center = Point2D::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
        let probe = LineSegment::try_new(
            Point2D::new(min_x, center.y),
            Point2D::new(max_x, center.y),
        );
        let near_wall = match probe {
            Ok(seg) => segment_overlaps_mask(mask, &seg, WINDOW_PROXIMITY_RADIUS),
            Err(_) => false,
        };
        if !near_wall {
            continue;
        }

        // Shape regularity: exactly four vertices is a clean rectangle.
        // Plausibility: long-side aspect close to the canonical window.
        let regularity: f64 = if simplified.len() == 4 { 1.0 } else { 0.5 };
        let long_aspect = if aspect >= 1.0 { aspect } else { 1.0 / aspect };
        let plausibility =
            (1.0 - ((long_aspect - CANONICAL_WINDOW_ASPECT).abs() / CANONICAL_WINDOW_ASPECT))
                .clamp(0.0, 1.0);
        let confidence = (regularity * (0.5 + 0.5 * plausibility)) as f32;

        let angle = if w >= h { 0.0 } else { 90.0 };

        windows.push(DetectedWindow {
            position: center,
            width_px: w.max(h),
            angle,
            confidence,
            host_wall: nearest_wall(&center, walls, HOST_WALL_MAX_DISTANCE),
        });
    }

    windows
}

/// Index of the closest wall within `max_distance`, if any
fn nearest_wall(point: &Point2D, walls: &[WallSegment], max_distance: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, wall) in walls.iter().enumerate() {
        let distance = point_to_segment_distance(point, &wall.start, &wall.end);
        if distance <= max_distance && best.map_or(true, |(_, d)| distance < d) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i)
}

/// Trace closed foreground contours by border following (8-connected)
fn trace_contours(binary: &GrayImage) -> Vec<Vec<Point2D>> {
    let width = binary.width() as i32;
    let height = binary.height() as i32;

    let mut visited = vec![false; (width * height) as usize];
    let mut contours = Vec::new();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let idx = (y * width + x) as usize;
            if visited[idx] {
                continue;
            }
            let foreground = binary.get_pixel(x as u32, y as u32).0[0] > 128;
            if foreground && is_border(binary, x, y) {
                if let Some(contour) = follow_border(binary, x, y, &mut visited) {
                    if contour.len() >= 8 {
                        contours.push(contour);
                    }
                }
            }
            visited[idx] = true;
        }
    }

    contours
}

fn is_border(binary: &GrayImage, x: i32, y: i32) -> bool {
    for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
        let nx = x + dx;
        let ny = y + dy;
        if nx >= 0
            && nx < binary.width() as i32
            && ny >= 0
            && ny < binary.height() as i32
            && binary.get_pixel(nx as u32, ny as u32).0[0] <= 128
        {
            return true;
        }
    }
    false
}

fn follow_border(
    binary: &GrayImage,
    start_x: i32,
    start_y: i32,
    visited: &mut [bool],
) -> Option<Vec<Point2D>> {
    const DIRECTIONS: [(i32, i32); 8] = [
        (1, 0),
        (1, 1),
        (0, 1),
        (-1, 1),
        (-1, 0),
        (-1, -1),
        (0, -1),
        (1, -1),
    ];

    let width = binary.width() as i32;
    let height = binary.height() as i32;

    let mut contour = Vec::new();
    let mut x = start_x;
    let mut y = start_y;
    let mut dir = 0;
    let mut closed = false;

    for _ in 0..(width * height) as usize {
        contour.push(Point2D::new(x as f64, y as f64));
        visited[(y * width + x) as usize] = true;

        let mut advanced = false;
        let search_from = (dir + 6) % 8;
        for i in 0..8 {
            let candidate = (search_from + i) % 8;
            let (dx, dy) = DIRECTIONS[candidate];
            let nx = x + dx;
            let ny = y + dy;

            if nx < 1 || nx >= width - 1 || ny < 1 || ny >= height - 1 {
                continue;
            }
            let pixel = binary.get_pixel(nx as u32, ny as u32).0[0];
            if pixel > 128 && is_border(binary, nx, ny) {
                if nx == start_x && ny == start_y && contour.len() > 2 {
                    closed = true;
                    advanced = true;
                    break;
                }
                if !visited[(ny * width + nx) as usize] {
                    x = nx;
                    y = ny;
                    dir = candidate;
                    advanced = true;
                    break;
                }
            }
        }

        if closed || !advanced {
            break;
        }
    }

    if closed {
        Some(contour)
    } else {
        None
    }
}

/// Douglas-Peucker polygon simplification
fn simplify_polygon(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = &points[0];
    let last = &points[points.len() - 1];

    let mut max_distance = 0.0;
    let mut max_index = 0;
    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let distance = point_to_segment_distance(point, first, last);
        if distance > max_distance {
            max_distance = distance;
            max_index = i;
        }
    }

    if max_distance > epsilon {
        let mut left = simplify_polygon(&points[..=max_index], epsilon);
        let right = simplify_polygon(&points[max_index..], epsilon);
        left.extend_from_slice(&right[1..]);
        left
    } else {
        vec![*first, *last]
    }
}

fn bounding_box(points: &[Point2D]) -> (f64, f64, f64, f64) {
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    (min_x, min_y, max_x, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::preprocess;
    use image::Luma;

    fn white_image(w: u32, h: u32) -> GrayImage {
        let mut img = GrayImage::new(w, h);
        for p in img.pixels_mut() {
            *p = Luma([255]);
        }
        img
    }

    fn horizontal_wall(y: f64, x0: f64, x1: f64) -> WallSegment {
        WallSegment {
            start: Point2D::new(x0, y),
            end: Point2D::new(x1, y),
            thickness: 10.0,
        }
    }

    fn draw_ring(img: &mut GrayImage, cx: f64, cy: f64, radius: f64) {
        for y in 0..img.height() {
            for x in 0..img.width() {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                if ((dx * dx + dy * dy).sqrt() - radius).abs() <= 1.0 {
                    img.put_pixel(x, y, Luma([0]));
                }
            }
        }
    }

    fn draw_hline(img: &mut GrayImage, y: u32, x0: u32, x1: u32, thickness: u32) {
        for x in x0..x1 {
            for t in 0..thickness {
                img.put_pixel(x, y + t, Luma([0]));
            }
        }
    }

    #[test]
    fn test_wall_mask_covers_centerline() {
        let walls = vec![horizontal_wall(50.0, 10.0, 90.0)];
        let mask = rasterize_wall_mask(&walls, 100, 100);

        assert_eq!(mask.get_pixel(50, 50).0[0], 255);
        assert_eq!(mask.get_pixel(50, 51).0[0], 255);
        assert_eq!(mask.get_pixel(50, 80).0[0], 0);
    }

    #[test]
    fn test_door_requires_wall_adjacency() {
        // Ring centered 2px from a wall: accepted. Same ring alone: rejected.
        let mut img = white_image(200, 150);
        draw_ring(&mut img, 100.0, 70.0, 15.0);
        draw_hline(&mut img, 72, 20, 180, 2);

        let config = DetectionConfig::default();
        let pre = preprocess(&img, &config);

        let with_wall = vec![horizontal_wall(72.0, 20.0, 180.0)];
        let openings = classify_openings(&pre, &with_wall, &config);
        assert_eq!(openings.doors.len(), 1);
        assert!((openings.doors[0].center.x - 100.0).abs() <= 3.0);
        assert!(openings.doors[0].host_wall.is_some());

        let far_wall = vec![horizontal_wall(5.0, 20.0, 180.0)];
        let openings = classify_openings(&pre, &far_wall, &config);
        assert!(openings.doors.is_empty());
    }

    #[test]
    fn test_no_walls_means_no_openings() {
        let mut img = white_image(120, 120);
        draw_ring(&mut img, 60.0, 60.0, 15.0);

        let config = DetectionConfig::default();
        let pre = preprocess(&img, &config);
        let openings = classify_openings(&pre, &[], &config);

        assert!(openings.doors.is_empty());
        assert!(openings.windows.is_empty());
    }

    #[test]
    fn test_window_pair_yields_single_window() {
        let a = LineSegment::try_new(Point2D::new(40.0, 30.0), Point2D::new(55.0, 30.0)).unwrap();
        let b = LineSegment::try_new(Point2D::new(40.0, 36.0), Point2D::new(55.0, 36.0)).unwrap();
        let config = DetectionConfig::default();

        let windows = pair_candidates(&[a, b], &config);
        assert_eq!(windows.len(), 1);
        assert!((windows[0].position.x - 47.5).abs() < 1e-9);
        assert!((windows[0].position.y - 33.0).abs() < 1e-9);
        assert!(windows[0].confidence > 0.8);
    }

    #[test]
    fn test_lone_candidate_is_not_a_window() {
        let a = LineSegment::try_new(Point2D::new(40.0, 30.0), Point2D::new(55.0, 30.0)).unwrap();
        let config = DetectionConfig::default();
        assert!(pair_candidates(&[a], &config).is_empty());
    }

    #[test]
    fn test_candidate_on_wall_is_excluded() {
        // A short piece of the wall itself must not count as a jamb line
        let walls = vec![horizontal_wall(50.0, 10.0, 190.0)];
        let mask = rasterize_wall_mask(&walls, 200, 100);

        let on_wall =
            LineSegment::try_new(Point2D::new(80.0, 50.0), Point2D::new(95.0, 50.0)).unwrap();
        assert!(segment_overlaps_mask(&mask, &on_wall, 0));

        let beside_wall =
            LineSegment::try_new(Point2D::new(80.0, 46.0), Point2D::new(95.0, 46.0)).unwrap();
        assert!(!segment_overlaps_mask(&mask, &beside_wall, 0));
        assert!(segment_overlaps_mask(&mask, &beside_wall, WINDOW_PROXIMITY_RADIUS));
    }

    #[test]
    fn test_door_footprint_suppresses_detected_windows() {
        // Two jamb pairs beside one wall: one inside a door's footprint,
        // one clear of it. Only the clear pair may survive detection.
        let width = 300u32;
        let height = 100u32;

        let mut edges = GrayImage::new(width, height);
        for x in 52..70u32 {
            edges.put_pixel(x, 46, Luma([255]));
            edges.put_pixel(x, 52, Luma([255]));
        }
        for x in 200..218u32 {
            edges.put_pixel(x, 46, Luma([255]));
            edges.put_pixel(x, 52, Luma([255]));
        }

        let gray = white_image(width, height);
        let pre = PreprocessedImage {
            grayscale: gray.clone(),
            blurred: gray.clone(),
            binary: GrayImage::new(width, height),
            edges,
        };

        let walls = vec![horizontal_wall(49.0, 10.0, 290.0)];
        let mask = rasterize_wall_mask(&walls, width, height);
        let doors = vec![DetectedDoor {
            center: Point2D::new(60.0, 49.0),
            radius: 15.0,
            confidence: 0.9,
            host_wall: Some(0),
        }];

        let config = DetectionConfig::default();
        let windows = detect_windows(&pre, &walls, &mask, &doors, &config);

        assert_eq!(windows.len(), 1);
        let survivor = &windows[0];
        assert!((survivor.position.x - 208.5).abs() <= 2.0);
        assert!(
            survivor.position.distance_to(&doors[0].center)
                > doors[0].radius + DOOR_WALL_MARGIN
        );
    }

    #[test]
    fn test_rectangle_contour_simplifies_to_quad() {
        let mut img = GrayImage::new(100, 100);
        // Ink rectangle outline as white foreground on black
        for x in 30..60u32 {
            img.put_pixel(x, 40, Luma([255]));
            img.put_pixel(x, 55, Luma([255]));
        }
        for y in 40..=55u32 {
            img.put_pixel(30, y, Luma([255]));
            img.put_pixel(59, y, Luma([255]));
        }

        let contours = trace_contours(&img);
        assert!(!contours.is_empty());

        let simplified = simplify_polygon(&contours[0], 2.0);
        assert!(simplified.len() >= 4 && simplified.len() <= 6);
    }

    #[test]
    fn test_nearest_wall_respects_bound() {
        let walls = vec![horizontal_wall(50.0, 0.0, 100.0), horizontal_wall(90.0, 0.0, 100.0)];
        let point = Point2D::new(50.0, 55.0);

        assert_eq!(nearest_wall(&point, &walls, 25.0), Some(0));
        assert_eq!(nearest_wall(&point, &walls, 2.0), None);
    }
}
