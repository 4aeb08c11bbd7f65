//! CPU implementation of convolution operations.

pub mod conv;
