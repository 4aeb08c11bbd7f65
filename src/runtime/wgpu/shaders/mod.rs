//! WGSL compute shader infrastructure for the WebGPU backend
//!
//! # Module Structure
//!
//! - `generator` - WGSL source generation per strategy
//! - `pipeline` - Pipeline caching and bind group helpers
//! - `conv` - Convolution kernel launchers

pub mod conv;
pub mod generator;
mod pipeline;

pub use pipeline::{LayoutKey, PipelineCache};
