// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error taxonomy for the detection pipeline

use thiserror::Error;

/// All failure modes surfaced by the pipeline.
///
/// Only [`PipelineError::ImageLoad`] reaches the caller of the high-level
/// entry points: an unreadable input aborts the run with no partial model.
/// `NoFeaturesDetected` is an internal tag from the line extractor that the
/// pipeline maps to a successful empty model, and `GeometryDegenerate`
/// segments are dropped one by one rather than propagated.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("no features detected in edge map")]
    NoFeaturesDetected,

    #[error("degenerate geometry: {reason}")]
    GeometryDegenerate { reason: String },
}
