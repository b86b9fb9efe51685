//! This module contains the pure, stateless kernels of the n-gram stage.
//!
//! Kernels operate on plain Rust slices and know nothing about Arrow or the
//! host pipeline; the `stage` module marshals record batches into them.

pub mod ngram;
