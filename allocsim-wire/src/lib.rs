//! # allocsim-wire
//!
//! Line codec for the allocator event stream.

pub mod line;

pub use line::{parse_line, Line, WireParseError};
