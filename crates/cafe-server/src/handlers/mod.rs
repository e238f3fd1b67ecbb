//! HTTP handlers

pub mod cafes;
pub mod health;

pub use health::health;
