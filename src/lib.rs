// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Blueprint element recognition
//!
//! This crate vectorizes a raster architectural blueprint into walls,
//! doors and windows in physical units, ready for 3D reconstruction.
//! The pipeline is a strict five-stage dataflow:
//!
//! 1. Preprocessing: grayscale, denoise, binarize, edge detection
//! 2. Line extraction: probabilistic Hough segments
//! 3. Wall consolidation: thickness/length filtering + collinear merge
//! 4. Opening classification: arc-based doors, parallel-pair windows
//! 5. Model assembly: pixel space to meters with a vertical flip
//!
//! Each run is a pure, synchronous transform of one image; the pipeline
//! holds no state between invocations, so independent images may be
//! processed on separate threads by running separate calls.
//!
//! # Usage
//!
//! ```rust,ignore
//! use blueprint_vision::{detect_blueprint, DetectionConfig};
//!
//! let model = detect_blueprint(&grayscale, &DetectionConfig::default())?;
//! println!("{}", serde_json::to_string_pretty(&model)?);
//! ```

pub mod assembler;
pub mod circles;
pub mod error;
pub mod lines;
pub mod openings;
pub mod preprocess;
pub mod types;
pub mod walls;

pub use assembler::{assemble_model, PixelToMeter};
pub use error::PipelineError;
pub use openings::{classify_openings, DetectedOpenings};
pub use preprocess::{preprocess, rgba_to_grayscale, PreprocessedImage};
pub use types::{
    BlueprintModel, DetectedDoor, DetectedWindow, DetectionConfig, Door, DoorParams, HoughParams,
    LineSegment, Point2D, Wall, WallSegment, Window,
};

use image::GrayImage;

/// Run the full detection pipeline on a grayscale blueprint image.
///
/// A plan in which no features are found is a valid input: the result is
/// a model with empty element lists, not an error. The only fatal failure
/// is an unreadable image, which the byte-level entry points report as
/// [`PipelineError::ImageLoad`] before this function is ever reached.
pub fn detect_blueprint(
    grayscale: &GrayImage,
    config: &DetectionConfig,
) -> Result<BlueprintModel, PipelineError> {
    let pre = preprocess::preprocess(grayscale, config);

    let segments = match lines::extract_segments(&pre.edges, &config.hough) {
        Ok(segments) => segments,
        Err(PipelineError::NoFeaturesDetected) => {
            tracing::info!("no line features detected, returning empty model");
            return Ok(BlueprintModel::empty());
        }
        Err(e) => return Err(e),
    };

    let wall_segments = walls::consolidate_walls(&segments, &pre.grayscale, config);
    let openings = openings::classify_openings(&pre, &wall_segments, config);

    let transform = PixelToMeter::new(config.scale_factor, grayscale.height());
    let model = assemble_model(&wall_segments, &openings, &transform);

    tracing::info!(
        walls = model.walls.len(),
        doors = model.doors.len(),
        windows = model.windows.len(),
        "blueprint detection complete"
    );

    Ok(model)
}

/// Convenience entry point for callers holding a decoded RGBA buffer
pub fn detect_blueprint_from_rgba(
    rgba: &[u8],
    width: u32,
    height: u32,
    config: &DetectionConfig,
) -> Result<BlueprintModel, PipelineError> {
    let grayscale = rgba_to_grayscale(rgba, width, height);
    detect_blueprint(&grayscale, config)
}

/// Decode an encoded image (PNG/JPEG) and run the pipeline.
///
/// Decode failures abort the run with [`PipelineError::ImageLoad`];
/// no partial model is produced.
pub fn detect_blueprint_from_bytes(
    bytes: &[u8],
    config: &DetectionConfig,
) -> Result<BlueprintModel, PipelineError> {
    let image = image::load_from_memory(bytes)?;
    detect_blueprint(&image.to_luma8(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Luma;

    fn white_image(width: u32, height: u32) -> GrayImage {
        let mut img = GrayImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = Luma([255]);
        }
        img
    }

    fn draw_stroke(img: &mut GrayImage, x0: u32, x1: u32, y0: u32, y1: u32) {
        for x in x0..x1 {
            for y in y0..y1 {
                img.put_pixel(x, y, Luma([0]));
            }
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

    #[test]
    fn test_blank_plan_yields_empty_model() {
        // Scenario: all-white 800x600 image
        let img = white_image(800, 600);
        let model = detect_blueprint(&img, &DetectionConfig::default()).unwrap();
        assert_eq!(model, BlueprintModel::empty());
    }

    #[test]
    fn test_single_stroke_becomes_one_horizontal_wall() {
        // Scenario: one 200px-long, 5px-thick horizontal stroke on 800x600,
        // default configuration throughout
        let mut img = white_image(800, 600);
        draw_stroke(&mut img, 300, 500, 298, 303);

        let model = detect_blueprint(&img, &DetectionConfig::default()).unwrap();

        assert_eq!(model.walls.len(), 1);
        let wall = &model.walls[0];
        assert!((wall.start.y - wall.end.y).abs() < 0.06);

        let length = wall.start.distance_to(&wall.end);
        assert!((3.7..=4.3).contains(&length), "length was {length}");
    }

    #[test]
    fn test_arc_next_to_wall_becomes_one_door() {
        // Scenario: circular feature of radius 15px centered 2px from a wall
        let mut img = white_image(300, 200);
        draw_stroke(&mut img, 40, 260, 96, 98);
        draw_ring(&mut img, 150.0, 92.0, 15.0);

        let config = DetectionConfig::default();
        let model = detect_blueprint(&img, &config).unwrap();

        assert!(!model.walls.is_empty());
        assert_eq!(model.doors.len(), 1);

        let door = &model.doors[0];
        assert_relative_eq!(door.width, 0.9);
        assert_relative_eq!(door.height, 2.1);
        assert!((door.position.x - 150.0 * 0.02).abs() <= 0.15);
        assert!((door.position.y - (200.0 - 92.0) * 0.02).abs() <= 0.15);
    }

    #[test]
    fn test_no_feature_is_both_door_and_window() {
        let mut img = white_image(300, 200);
        draw_stroke(&mut img, 40, 260, 96, 98);
        draw_ring(&mut img, 150.0, 92.0, 15.0);

        let config = DetectionConfig::default();
        let model = detect_blueprint(&img, &config).unwrap();

        // Suppression keeps windows out of the door footprint: arc radius
        // (15px in this plan) plus the adjacency margin, in meters
        let exclusion_m = (15.0 + 5.0) * config.scale_factor;
        for door in &model.doors {
            for window in &model.windows {
                let distance = door.position.distance_to(&window.position);
                assert!(
                    distance > exclusion_m,
                    "window at {distance} m sits inside a door footprint"
                );
            }
        }
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let mut img = white_image(300, 200);
        draw_stroke(&mut img, 40, 260, 96, 98);
        draw_ring(&mut img, 150.0, 92.0, 15.0);

        let config = DetectionConfig::default();
        let first = detect_blueprint(&img, &config).unwrap();
        let second = detect_blueprint(&img, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_emitted_dimensions_non_negative() {
        let mut img = white_image(300, 200);
        draw_stroke(&mut img, 40, 260, 96, 98);
        draw_ring(&mut img, 150.0, 92.0, 15.0);

        let model = detect_blueprint(&img, &DetectionConfig::default()).unwrap();

        for wall in &model.walls {
            assert!(wall.thickness >= 0.0);
        }
        for door in &model.doors {
            assert!(door.width >= 0.0 && door.height >= 0.0);
        }
        for window in &model.windows {
            assert!(window.width >= 0.0 && window.height >= 0.0 && window.sill_height >= 0.0);
        }
    }

    #[test]
    fn test_model_serializes_to_expected_shape() {
        let mut img = white_image(300, 200);
        draw_stroke(&mut img, 40, 260, 96, 98);
        draw_ring(&mut img, 150.0, 92.0, 15.0);

        let model = detect_blueprint(&img, &DetectionConfig::default()).unwrap();
        let json = serde_json::to_value(&model).unwrap();

        assert!(json.get("walls").is_some());
        assert!(json.get("doors").is_some());
        assert!(json.get("windows").is_some());

        let wall = &json["walls"][0];
        assert!(wall.get("start").is_some());
        assert!(wall["start"].get("x").is_some());
        assert!(wall.get("thickness").is_some());

        let door = &json["doors"][0];
        assert!(door.get("position").is_some());
        assert!(door.get("rotation").is_some());
    }

    #[test]
    fn test_invalid_bytes_report_image_load_error() {
        let result = detect_blueprint_from_bytes(b"not an image", &DetectionConfig::default());
        assert!(matches!(result, Err(PipelineError::ImageLoad(_))));
    }

    #[test]
    fn test_rgba_entry_point_matches_grayscale() {
        let width = 100u32;
        let height = 80u32;
        let mut rgba = vec![255u8; (width * height * 4) as usize];
        // One dark horizontal band
        for x in 10..90u32 {
            for y in 38..42u32 {
                let i = ((y * width + x) * 4) as usize;
                rgba[i] = 0;
                rgba[i + 1] = 0;
                rgba[i + 2] = 0;
            }
        }

        let config = DetectionConfig::default();
        let from_rgba = detect_blueprint_from_rgba(&rgba, width, height, &config).unwrap();
        let from_gray = detect_blueprint(&rgba_to_grayscale(&rgba, width, height), &config).unwrap();
        assert_eq!(from_rgba, from_gray);
    }
}
