// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stage 5: map pixel-space geometry into the physical-unit model
//!
//! Raster coordinates grow downward; the target coordinate system grows
//! upward (north-up plan convention), so the transform flips the vertical
//! axis around the image height in addition to scaling. Wall thickness
//! scales from the consolidator's pixel estimate; dimensions that cannot
//! be recovered from plan geometry (door and window sizes) are attached
//! here as architectural standard defaults.

use crate::openings::DetectedOpenings;
use crate::types::{
    BlueprintModel, Door, Point2D, Wall, WallSegment, Window, DEFAULT_DOOR_HEIGHT_M,
    DEFAULT_DOOR_WIDTH_M, DEFAULT_ROTATION_DEG, DEFAULT_WINDOW_HEIGHT_M,
    DEFAULT_WINDOW_SILL_HEIGHT_M, DEFAULT_WINDOW_WIDTH_M,
};

/// Pixel-to-meter transform with the mandatory vertical flip
#[derive(Debug, Clone, Copy)]
pub struct PixelToMeter {
    /// Meters per pixel
    pub scale: f64,
    /// Source image height in pixels
    pub image_height: u32,
}

impl PixelToMeter {
    pub fn new(scale: f64, image_height: u32) -> Self {
        Self {
            scale,
            image_height,
        }
    }

    pub fn to_meters(&self, p: &Point2D) -> Point2D {
        Point2D::new(
            p.x * self.scale,
            (self.image_height as f64 - p.y) * self.scale,
        )
    }

    /// Inverse transform, for round-trip verification
    pub fn to_pixels(&self, p: &Point2D) -> Point2D {
        Point2D::new(
            p.x / self.scale,
            self.image_height as f64 - p.y / self.scale,
        )
    }
}

/// Assemble the final immutable model from pixel-space detections
pub fn assemble_model(
    walls: &[WallSegment],
    openings: &DetectedOpenings,
    transform: &PixelToMeter,
) -> BlueprintModel {
    let walls_m = walls
        .iter()
        .map(|wall| Wall {
            start: transform.to_meters(&wall.start),
            end: transform.to_meters(&wall.end),
            thickness: wall.thickness * transform.scale,
        })
        .collect();

    let doors_m = openings
        .doors
        .iter()
        .map(|door| Door {
            position: transform.to_meters(&door.center),
            width: DEFAULT_DOOR_WIDTH_M,
            height: DEFAULT_DOOR_HEIGHT_M,
            rotation: DEFAULT_ROTATION_DEG,
        })
        .collect();

    let windows_m = openings
        .windows
        .iter()
        .map(|window| Window {
            position: transform.to_meters(&window.position),
            width: DEFAULT_WINDOW_WIDTH_M,
            height: DEFAULT_WINDOW_HEIGHT_M,
            sill_height: DEFAULT_WINDOW_SILL_HEIGHT_M,
            rotation: window.angle,
        })
        .collect();

    BlueprintModel {
        walls: walls_m,
        doors: doors_m,
        windows: windows_m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DetectedDoor, DetectedWindow};
    use approx::assert_relative_eq;

    #[test]
    fn test_vertical_flip() {
        let transform = PixelToMeter::new(0.02, 600);

        // Pixel origin (top-left) maps to the top of the physical plan
        let top_left = transform.to_meters(&Point2D::new(0.0, 0.0));
        assert_relative_eq!(top_left.x, 0.0);
        assert_relative_eq!(top_left.y, 12.0);

        let bottom_left = transform.to_meters(&Point2D::new(0.0, 600.0));
        assert_relative_eq!(bottom_left.y, 0.0);
    }

    #[test]
    fn test_round_trip_recovers_pixel_coordinates() {
        let transform = PixelToMeter::new(0.02, 600);
        let original = Point2D::new(137.0, 421.0);

        let recovered = transform.to_pixels(&transform.to_meters(&original));
        assert_relative_eq!(recovered.x, original.x, epsilon = 1e-9);
        assert_relative_eq!(recovered.y, original.y, epsilon = 1e-9);
    }

    #[test]
    fn test_semantic_defaults_attached() {
        let walls = vec![WallSegment {
            start: Point2D::new(100.0, 100.0),
            end: Point2D::new(300.0, 100.0),
            thickness: 10.0,
        }];
        let openings = DetectedOpenings {
            doors: vec![DetectedDoor {
                center: Point2D::new(150.0, 100.0),
                radius: 15.0,
                confidence: 0.8,
                host_wall: Some(0),
            }],
            windows: vec![DetectedWindow {
                position: Point2D::new(250.0, 100.0),
                width_px: 14.0,
                angle: 0.0,
                confidence: 0.7,
                host_wall: Some(0),
            }],
        };

        let transform = PixelToMeter::new(0.02, 600);
        let model = assemble_model(&walls, &openings, &transform);

        assert_relative_eq!(model.walls[0].thickness, 0.2);
        assert_relative_eq!(model.doors[0].width, 0.9);
        assert_relative_eq!(model.doors[0].height, 2.1);
        assert_relative_eq!(model.windows[0].width, 1.5);
        assert_relative_eq!(model.windows[0].height, 1.2);
        assert_relative_eq!(model.windows[0].sill_height, 0.9);
    }

    #[test]
    fn test_wall_thickness_scales_from_pixel_estimate() {
        let walls = vec![WallSegment {
            start: Point2D::new(0.0, 50.0),
            end: Point2D::new(200.0, 50.0),
            thickness: 15.0,
        }];
        let transform = PixelToMeter::new(0.02, 600);
        let model = assemble_model(&walls, &DetectedOpenings::default(), &transform);
        assert_relative_eq!(model.walls[0].thickness, 0.3);
    }

    #[test]
    fn test_wall_length_scales() {
        let walls = vec![WallSegment {
            start: Point2D::new(100.0, 100.0),
            end: Point2D::new(300.0, 100.0),
            thickness: 10.0,
        }];
        let transform = PixelToMeter::new(0.02, 600);
        let model = assemble_model(&walls, &DetectedOpenings::default(), &transform);

        let wall = &model.walls[0];
        let length = wall.start.distance_to(&wall.end);
        assert_relative_eq!(length, 4.0, epsilon = 1e-9);
        assert_relative_eq!(wall.start.y, wall.end.y);
    }

    #[test]
    fn test_emitted_dimensions_are_non_negative() {
        let walls = vec![WallSegment {
            start: Point2D::new(10.0, 580.0),
            end: Point2D::new(10.0, 20.0),
            thickness: 10.0,
        }];
        let transform = PixelToMeter::new(0.02, 600);
        let model = assemble_model(&walls, &DetectedOpenings::default(), &transform);

        for wall in &model.walls {
            assert!(wall.thickness >= 0.0);
            assert!(wall.start.distance_to(&wall.end) >= 0.0);
        }
    }
}
