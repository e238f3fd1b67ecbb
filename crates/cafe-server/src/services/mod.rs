//! Business logic services

pub mod cafes;

pub use cafes::CafeService;
