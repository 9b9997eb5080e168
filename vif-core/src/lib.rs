//! Integer fixed-point Visual Information Fidelity (VIF) feature extractor.
//!
//! Computes four per-scale VIF scores for a reference/distorted picture
//! pair using the same separable-filter, decimate, and log-domain
//! aggregation pipeline a software video quality pipeline runs per frame,
//! without floating-point convolution.

#[macro_use]
extern crate lazy_static;

mod boundary;
mod collector;
mod engine;
mod error;
mod fixed_point;
mod kernel;
mod plane;
mod sample;
mod types;

pub use collector::{FeatureCollector, VecFeatureCollector};
pub use engine::VifExtractor;
pub use error::{Error, Result};
pub use types::{FeatureKey, Image, ImageData, PixelFormat, VifConfig};
