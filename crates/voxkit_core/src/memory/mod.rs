//! # Memory Management
//!
//! Buffers that accumulate mesh data without knowing final counts up front.
//!
//! ## Design Philosophy
//!
//! - One generic buffer for every element type (positions, colors, indices)
//! - Capacity doubles when full, so appends are amortized O(1)
//! - Growth is fallible: running out of memory is an error value

mod buffer;

pub use buffer::GrowableBuffer;
