//! Storage layer
//!
//! Handlers never touch SQL directly; they go through [`CafeStore`], which the
//! SQLite [`Database`] implements.

pub mod db;

pub use db::Database;

use crate::error::Result;
use async_trait::async_trait;
use cafe_types::{Cafe, NewCafe};

/// Cafe store
#[async_trait]
pub trait CafeStore: Send + Sync {
    /// All cafes in insertion order.
    async fn list(&self) -> Result<Vec<Cafe>>;
    async fn get(&self, id: i64) -> Result<Option<Cafe>>;
    /// First cafe (by id) whose location matches exactly.
    async fn find_by_location(&self, location: &str) -> Result<Option<Cafe>>;
    /// Fails with `DuplicateName` when the name is already taken.
    async fn insert(&self, cafe: NewCafe) -> Result<Cafe>;
    /// Returns the updated cafe, or `None` if no cafe has that id.
    async fn update_price(&self, id: i64, price: &str) -> Result<Option<Cafe>>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn ping(&self) -> Result<()>;
}
