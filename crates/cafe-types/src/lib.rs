//! Cafe Types - Pure type definitions shared by the cafe service
//!
//! This crate contains only plain data types with no runtime or storage
//! dependencies.

pub mod cafe;

pub use cafe::*;
