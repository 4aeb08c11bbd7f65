//! Operation traits and their parameter types.

mod conv;

pub use conv::*;
