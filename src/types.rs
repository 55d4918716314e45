// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for blueprint element recognition

use crate::error::PipelineError;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Default wall thickness attached during assembly (meters)
pub const DEFAULT_WALL_THICKNESS_M: f64 = 0.2;
/// Default door leaf width (meters)
pub const DEFAULT_DOOR_WIDTH_M: f64 = 0.9;
/// Default door height (meters)
pub const DEFAULT_DOOR_HEIGHT_M: f64 = 2.1;
/// Default window width (meters)
pub const DEFAULT_WINDOW_WIDTH_M: f64 = 1.5;
/// Default window height (meters)
pub const DEFAULT_WINDOW_HEIGHT_M: f64 = 1.2;
/// Default window sill height (meters)
pub const DEFAULT_WINDOW_SILL_HEIGHT_M: f64 = 0.9;
/// Default opening rotation (degrees)
pub const DEFAULT_ROTATION_DEG: f64 = 0.0;

/// A 2D point (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (self.to_nalgebra() - other.to_nalgebra()).norm()
    }

    pub fn midpoint(&self, other: &Point2D) -> Point2D {
        Point2D::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Raw line segment produced by the line extractor.
///
/// Length and angle are derived at construction and never go stale;
/// the angle is in degrees, `atan2(dy, dx)`, range (-180, 180].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Point2D,
    pub end: Point2D,
    pub length: f64,
    pub angle: f64,
}

impl LineSegment {
    /// Build a segment, rejecting degenerate geometry.
    ///
    /// Zero-length segments and segments with non-finite coordinates have
    /// no meaningful direction; they are reported as
    /// [`PipelineError::GeometryDegenerate`] so the caller can drop them
    /// without aborting the run.
    pub fn try_new(start: Point2D, end: Point2D) -> Result<Self, PipelineError> {
        if !start.x.is_finite() || !start.y.is_finite() || !end.x.is_finite() || !end.y.is_finite()
        {
            return Err(PipelineError::GeometryDegenerate {
                reason: "non-finite endpoint coordinate".into(),
            });
        }

        let length = start.distance_to(&end);
        if length <= f64::EPSILON {
            return Err(PipelineError::GeometryDegenerate {
                reason: "zero-length segment".into(),
            });
        }

        let angle = (end.y - start.y).atan2(end.x - start.x).to_degrees();

        Ok(Self {
            start,
            end,
            length,
            angle,
        })
    }

    pub fn midpoint(&self) -> Point2D {
        self.start.midpoint(&self.end)
    }

    /// Angle in radians, as computed by `atan2`
    pub fn angle_rad(&self) -> f64 {
        self.angle.to_radians()
    }
}

/// Consolidated structural wall line, still in pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct WallSegment {
    pub start: Point2D,
    pub end: Point2D,
    /// Estimated thickness in pixels
    pub thickness: f64,
}

impl WallSegment {
    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn angle_rad(&self) -> f64 {
        (self.end.y - self.start.y).atan2(self.end.x - self.start.x)
    }
}

/// Door candidate in pixel space, found by arc detection
#[derive(Debug, Clone)]
pub struct DetectedDoor {
    /// Arc center (the hinge side of the swing)
    pub center: Point2D,
    /// Arc radius in pixels
    pub radius: f64,
    /// Detection confidence in [0, 1]
    pub confidence: f32,
    /// Index of the nearest wall, if one is within the proximity bound
    pub host_wall: Option<usize>,
}

/// Window candidate in pixel space
#[derive(Debug, Clone)]
pub struct DetectedWindow {
    pub position: Point2D,
    /// Measured opening width in pixels
    pub width_px: f64,
    /// Orientation in degrees, parallel to the host wall
    pub angle: f64,
    /// Detection confidence in [0, 1]
    pub confidence: f32,
    /// Index of the nearest wall, if one is within the proximity bound
    pub host_wall: Option<usize>,
}

/// Wall in physical space (meters)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wall {
    pub start: Point2D,
    pub end: Point2D,
    pub thickness: f64,
}

/// Door in physical space (meters; rotation in degrees)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Door {
    pub position: Point2D,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

/// Window in physical space (meters; rotation in degrees)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Window {
    pub position: Point2D,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "sillHeight")]
    pub sill_height: f64,
    pub rotation: f64,
}

/// Terminal artifact of one pipeline run.
///
/// Immutable after assembly; serializes to the JSON shape consumed by the
/// 3D reconstruction frontend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlueprintModel {
    pub walls: Vec<Wall>,
    pub doors: Vec<Door>,
    pub windows: Vec<Window>,
}

impl BlueprintModel {
    /// Model with no detected elements, the valid result for a blank plan
    pub fn empty() -> Self {
        Self {
            walls: Vec::new(),
            doors: Vec::new(),
            windows: Vec::new(),
        }
    }
}

/// Parameters for the probabilistic straight-line detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoughParams {
    /// Distance resolution of the accumulator (pixels)
    pub rho_resolution: f64,
    /// Angle resolution of the accumulator (radians)
    pub theta_resolution: f64,
    /// Minimum accumulator votes for a line peak
    pub vote_threshold: u32,
    /// Minimum segment length (pixels)
    pub min_line_length: f64,
    /// Maximum gap between points on the same segment (pixels)
    pub max_line_gap: f64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            rho_resolution: 1.0,
            theta_resolution: std::f64::consts::PI / 180.0,
            vote_threshold: 100,
            min_line_length: 100.0,
            max_line_gap: 10.0,
        }
    }
}

/// Parameters for the Hough-circle door detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorParams {
    /// Minimum distance between accepted circle centers (pixels)
    pub min_dist: f64,
    /// Upper Canny threshold used by the gradient stage
    pub param1: f32,
    /// Minimum center accumulator votes
    pub param2: u32,
    /// Minimum arc radius (pixels)
    pub min_radius: u32,
    /// Maximum arc radius (pixels)
    pub max_radius: u32,
}

impl Default for DoorParams {
    fn default() -> Self {
        Self {
            min_dist: 20.0,
            param1: 50.0,
            param2: 15,
            min_radius: 5,
            max_radius: 30,
        }
    }
}

/// Configuration for the full detection pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Gaussian blur sigma for noise suppression
    pub blur_sigma: f32,
    /// Median filter radius for scan-artifact removal (0 disables)
    pub denoise_radius: u32,
    /// Equalize local contrast before binarization (for faint scans)
    pub enhance_contrast: bool,
    /// Adaptive threshold neighborhood radius (pixels)
    pub adaptive_block_radius: u32,
    /// Canny edge detection low threshold
    pub canny_low: f32,
    /// Canny edge detection high threshold
    pub canny_high: f32,
    /// Edge map dilation radius to close scan gaps (0 disables)
    pub edge_dilate_radius: u8,
    /// Straight-line detector parameters
    pub hough: HoughParams,
    /// Minimum mean band intensity for a segment to count as a wall stroke
    pub thickness_threshold: u32,
    /// Minimum wall length (pixels)
    pub min_wall_length: f64,
    /// Maximum endpoint separation for merging collinear segments (pixels)
    pub max_line_separation: f64,
    /// Maximum undirected angle difference for merging (radians)
    pub angle_tolerance: f64,
    /// Hough-circle door detector parameters
    pub door: DoorParams,
    /// Accepted window candidate length range (pixels)
    pub window_length_range: (f64, f64),
    /// Maximum angle between a window candidate and its wall (radians)
    pub window_angle_tolerance: f64,
    /// Maximum separation between the two lines of a window pair (pixels)
    pub window_pair_max_separation: f64,
    /// Meters per pixel
    pub scale_factor: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.4,
            denoise_radius: 1,
            enhance_contrast: false,
            adaptive_block_radius: 11,
            canny_low: 50.0,
            canny_high: 150.0,
            edge_dilate_radius: 0,
            hough: HoughParams::default(),
            thickness_threshold: 5,
            min_wall_length: 50.0,
            // Must cover the gap between the two Canny edges of the
            // thickest common wall stroke (~5px plus edge offset)
            max_line_separation: 8.0,
            angle_tolerance: 0.1,
            door: DoorParams::default(),
            window_length_range: (5.0, 20.0),
            window_angle_tolerance: 0.35,
            window_pair_max_separation: 12.0,
            scale_factor: 0.02,
        }
    }
}
