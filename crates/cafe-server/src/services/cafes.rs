//! Cafe directory service

use crate::error::{CafeError, Result};
use crate::storage::CafeStore;
use cafe_types::{Cafe, NewCafe};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{info, warn};

pub const NO_CAFE_AT_LOCATION: &str = "Sorry, we don't have a cafe at that location.";

pub struct CafeService {
    store: Arc<dyn CafeStore>,
    api_key: String,
}

impl CafeService {
    pub fn new(store: Arc<dyn CafeStore>, api_key: String) -> Self {
        Self { store, api_key }
    }

    pub async fn random(&self) -> Result<Cafe> {
        let cafes = self.store.list().await?;
        let cafe = cafes
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(CafeError::EmptyCollection)?;
        info!("Picked random cafe: {}", cafe);
        Ok(cafe)
    }

    pub async fn all(&self) -> Result<Vec<Cafe>> {
        self.store.list().await
    }

    pub async fn search(&self, location: &str) -> Result<Cafe> {
        self.store
            .find_by_location(location)
            .await?
            .ok_or_else(|| CafeError::NotFound(NO_CAFE_AT_LOCATION.to_string()))
    }

    pub async fn add(&self, cafe: NewCafe) -> Result<Cafe> {
        let cafe = self.store.insert(cafe).await?;
        info!("Added cafe {} with id {}", cafe, cafe.id);
        Ok(cafe)
    }

    pub async fn update_price(&self, id: i64, price: &str) -> Result<Cafe> {
        let cafe = self.store.update_price(id, price).await?.ok_or_else(|| {
            CafeError::NotFound(
                "Sorry, cafe with that ID was not found in the database".to_string(),
            )
        })?;
        info!("Updated coffee price of cafe {} to {}", id, price);
        Ok(cafe)
    }

    /// Deletes a cafe, gated by the shared api key.
    pub async fn report_closed(&self, id: i64, api_key: Option<&str>) -> Result<()> {
        let authorized = api_key.is_some_and(|key| constant_time_compare(key, &self.api_key));
        if !authorized {
            warn!("Rejected report-closed for cafe {}: bad api key", id);
            return Err(CafeError::Forbidden);
        }

        if !self.store.delete(id).await? {
            return Err(CafeError::NotFound(
                "Sorry a cafe with that id was not found in the database.".to_string(),
            ));
        }
        info!("Deleted cafe {} (reported closed)", id);
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
