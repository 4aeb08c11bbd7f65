//! WebGPU implementations of the convolution operations.

pub mod conv;
