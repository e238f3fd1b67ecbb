//! Query-string and path extractors that reject with a JSON body

use crate::error::CafeError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Query-string parameters deserialized into `T`.
///
/// A repeated parameter keeps its first value (`?loc=London&loc=Paris` reads
/// as `London`).
#[derive(Debug)]
pub struct QueryArgs<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryArgs<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = CafeError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| CafeError::BadRequest(e.body_text()))?;

        let mut args = Map::new();
        for (key, value) in pairs {
            args.entry(key).or_insert(Value::String(value));
        }

        serde_json::from_value(Value::Object(args))
            .map(QueryArgs)
            .map_err(|e| CafeError::BadRequest(format!("Invalid query string: {}", e)))
    }
}

/// Integer cafe id taken from the `:id` path segment.
#[derive(Debug, Clone, Copy)]
pub struct CafeId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CafeId
where
    S: Send + Sync,
{
    type Rejection = CafeError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e| CafeError::BadRequest(e.body_text()))?;
        Ok(CafeId(id))
    }
}
