// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: convert a blueprint image into a vector element model (JSON)
//!
//! Usage:
//!   blueprint-to-json <image_path> [options]

use blueprint_vision::{detect_blueprint, DetectionConfig, PipelineError};
use image::ImageReader;
use std::env;
use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,blueprint_vision=debug".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let image_path = &args[1];

    let mut config = DetectionConfig::default();
    let mut output_path: Option<String> = None;
    let mut pretty = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--scale" => {
                i += 1;
                config.scale_factor = match args.get(i).and_then(|v| v.parse().ok()) {
                    Some(v) => v,
                    None => return bad_option("--scale expects meters per pixel"),
                };
            }
            "--min-wall-length" => {
                i += 1;
                config.min_wall_length = match args.get(i).and_then(|v| v.parse().ok()) {
                    Some(v) => v,
                    None => return bad_option("--min-wall-length expects pixels"),
                };
            }
            "--enhance-contrast" => {
                config.enhance_contrast = true;
            }
            "--output" => {
                i += 1;
                output_path = match args.get(i) {
                    Some(path) => Some(path.clone()),
                    None => return bad_option("--output expects a file path"),
                };
            }
            "--pretty" => {
                pretty = true;
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    let grayscale = match load_grayscale(image_path) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        path = %image_path,
        width = grayscale.width(),
        height = grayscale.height(),
        scale = config.scale_factor,
        "processing blueprint"
    );

    let model = match detect_blueprint(&grayscale, &config) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let json = if pretty {
        serde_json::to_string_pretty(&model)
    } else {
        serde_json::to_string(&model)
    };
    let json = match json {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: failed to serialize model: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Error: cannot write '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
            println!(
                "Wrote {} walls, {} doors, {} windows to {}",
                model.walls.len(),
                model.doors.len(),
                model.windows.len(),
                path
            );
        }
        None => println!("{}", json),
    }

    ExitCode::SUCCESS
}

fn load_grayscale(path: &str) -> Result<image::GrayImage, PipelineError> {
    let image = ImageReader::open(path)
        .map_err(image::ImageError::IoError)?
        .decode()?;
    Ok(image.to_luma8())
}

fn bad_option(message: &str) -> ExitCode {
    eprintln!("Error: {}", message);
    print_usage();
    ExitCode::FAILURE
}

fn print_usage() {
    println!("blueprint-to-json: vectorize a floor plan image into walls, doors and windows");
    println!();
    println!("Usage:");
    println!("  blueprint-to-json <image_path> [options]");
    println!();
    println!("Options:");
    println!("  --scale <m-per-px>        Meters per pixel (default: 0.02)");
    println!("  --min-wall-length <px>    Minimum wall length in pixels (default: 50)");
    println!("  --enhance-contrast        Equalize contrast for faint scans");
    println!("  --output <path>           Write JSON to a file instead of stdout");
    println!("  --pretty                  Pretty-print the JSON output");
}
