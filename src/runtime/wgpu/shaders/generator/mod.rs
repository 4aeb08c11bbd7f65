//! WGSL shader source generation
//!
//! Sources are built with `format!` so compile-time constants (workgroup
//! shape, scratchpad size) are baked into each variant.

pub mod conv;

pub use conv::{
    DIRECT_WORKGROUP, generate_naive_conv_shader, generate_tiled_conv_shader,
    generate_vectorized_conv_shader, tiled_shader_name,
};
