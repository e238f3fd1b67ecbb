//! Cafe handlers
//!
//! All parameters are read from the query string, including on POST/PATCH/DELETE,
//! so existing clients of the API keep working.

use crate::error::{CafeError, Result};
use crate::extractors::{CafeId, QueryArgs};
use crate::services::cafes::NO_CAFE_AT_LOCATION;
use crate::AppState;
use axum::{extract::State, Json};
use cafe_types::{Cafe, NewCafe};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CafeResponse {
    cafe: Cafe,
}

#[derive(Debug, Serialize)]
pub struct CafeListResponse {
    cafes: Vec<Cafe>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    response: Success,
}

#[derive(Debug, Serialize)]
pub struct Success {
    success: &'static str,
}

impl SuccessResponse {
    fn new(message: &'static str) -> Json<Self> {
        Json(Self {
            response: Success { success: message },
        })
    }
}

pub async fn not_found() -> CafeError {
    CafeError::NotFound("Sorry, that page does not exist.".to_string())
}

pub async fn random(State(state): State<AppState>) -> Result<Json<CafeResponse>> {
    let cafe = state.service.random().await?;
    Ok(Json(CafeResponse { cafe }))
}

pub async fn all(State(state): State<AppState>) -> Result<Json<CafeListResponse>> {
    let cafes = state.service.all().await?;
    Ok(Json(CafeListResponse { cafes }))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    loc: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    QueryArgs(query): QueryArgs<SearchQuery>,
) -> Result<Json<CafeResponse>> {
    let loc = query
        .loc
        .ok_or_else(|| CafeError::NotFound(NO_CAFE_AT_LOCATION.to_string()))?;
    let cafe = state.service.search(&loc).await?;
    Ok(Json(CafeResponse { cafe }))
}

#[derive(Debug, Default, Deserialize)]
pub struct AddCafeQuery {
    name: Option<String>,
    map_url: Option<String>,
    img_url: Option<String>,
    loc: Option<String>,
    seats: Option<String>,
    sockets: Option<String>,
    toilet: Option<String>,
    wifi: Option<String>,
    calls: Option<String>,
    coffee_price: Option<String>,
}

/// Amenity flags are on when the parameter is present and non-empty,
/// whatever its text ("false" and "0" included).
fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

fn required(value: Option<String>, param: &'static str) -> Result<String> {
    value.ok_or(CafeError::MissingField(param))
}

impl AddCafeQuery {
    pub fn into_new_cafe(self) -> Result<NewCafe> {
        Ok(NewCafe {
            has_sockets: flag(self.sockets.as_deref()),
            has_toilet: flag(self.toilet.as_deref()),
            has_wifi: flag(self.wifi.as_deref()),
            can_take_calls: flag(self.calls.as_deref()),
            name: required(self.name, "name")?,
            map_url: required(self.map_url, "map_url")?,
            img_url: required(self.img_url, "img_url")?,
            location: required(self.loc, "loc")?,
            seats: required(self.seats, "seats")?,
            coffee_price: self.coffee_price,
        })
    }
}

pub async fn add(
    State(state): State<AppState>,
    QueryArgs(query): QueryArgs<AddCafeQuery>,
) -> Result<Json<SuccessResponse>> {
    state.service.add(query.into_new_cafe()?).await?;
    Ok(SuccessResponse::new("Successfully added the new cafe."))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePriceQuery {
    new_price: Option<String>,
}

pub async fn update_price(
    State(state): State<AppState>,
    CafeId(id): CafeId,
    QueryArgs(query): QueryArgs<UpdatePriceQuery>,
) -> Result<Json<SuccessResponse>> {
    let new_price = query
        .new_price
        .ok_or(CafeError::MissingField("new_price"))?;
    state.service.update_price(id, &new_price).await?;
    Ok(SuccessResponse::new("Successfully updated the price"))
}

#[derive(Debug, Deserialize)]
pub struct ReportClosedQuery {
    #[serde(rename = "api-key")]
    api_key: Option<String>,
}

pub async fn report_closed(
    State(state): State<AppState>,
    CafeId(id): CafeId,
    QueryArgs(query): QueryArgs<ReportClosedQuery>,
) -> Result<Json<SuccessResponse>> {
    state
        .service
        .report_closed(id, query.api_key.as_deref())
        .await?;
    Ok(SuccessResponse::new(
        "Successfully deleted the cafe from the database.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CafeService;
    use crate::storage::Database;
    use axum::{body::Body, http::Request, http::StatusCode, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const API_KEY: &str = "TopSecretAPIKey";

    const ADD_BEAN_THERE: &str = "/add?name=Bean%20There&map_url=https://maps.example/bean\
        &img_url=https://img.example/bean.jpg&loc=London&seats=20-30\
        &toilet=1&wifi=false&sockets=&coffee_price=%C2%A32.50";

    async fn app() -> Router {
        let db = Database::in_memory().await.unwrap();
        let state = AppState {
            service: Arc::new(CafeService::new(Arc::new(db), API_KEY.to_string())),
        };
        let static_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("static");
        crate::build_router(state, &static_dir)
    }

    async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[test]
    fn test_flag_coercion() {
        assert!(flag(Some("1")));
        assert!(flag(Some("true")));
        assert!(flag(Some("false")));
        assert!(!flag(Some("")));
        assert!(!flag(None));
    }

    #[test]
    fn test_missing_required_field() {
        let query = AddCafeQuery {
            name: Some("Bean There".into()),
            map_url: Some("m".into()),
            img_url: Some("i".into()),
            seats: Some("10".into()),
            ..Default::default()
        };
        assert!(matches!(
            query.into_new_cafe(),
            Err(CafeError::MissingField("loc"))
        ));
    }

    #[tokio::test]
    async fn test_add_then_all() {
        let app = app().await;

        let (status, body) = send(&app, "POST", ADD_BEAN_THERE).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"response": {"success": "Successfully added the new cafe."}})
        );

        let (status, body) = send(&app, "GET", "/all").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"cafes": [{
                "id": 1,
                "name": "Bean There",
                "map_url": "https://maps.example/bean",
                "img_url": "https://img.example/bean.jpg",
                "location": "London",
                "seats": "20-30",
                "has_toilet": true,
                "has_wifi": true,
                "has_sockets": false,
                "can_take_calls": false,
                "coffee_price": "£2.50"
            }]})
        );
    }

    #[tokio::test]
    async fn test_all_empty() {
        let app = app().await;
        let (status, body) = send(&app, "GET", "/all").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"cafes": []}));
    }

    #[tokio::test]
    async fn test_add_duplicate_name_conflicts() {
        let app = app().await;
        send(&app, "POST", ADD_BEAN_THERE).await;

        let (status, body) = send(&app, "POST", ADD_BEAN_THERE).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"]["Conflict"].is_string());

        let (_, body) = send(&app, "GET", "/all").await;
        assert_eq!(body["cafes"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_add_missing_field_is_bad_request() {
        let app = app().await;
        let (status, body) = send(&app, "POST", "/add?name=Nowhere").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": {"Bad Request": "Missing required field: map_url"}})
        );

        let (_, body) = send(&app, "GET", "/all").await;
        assert_eq!(body, json!({"cafes": []}));
    }

    #[tokio::test]
    async fn test_random() {
        let app = app().await;

        let (status, body) = send(&app, "GET", "/random").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": {"Not Found": "Sorry, there are no cafes in the database."}})
        );

        send(&app, "POST", ADD_BEAN_THERE).await;
        let (status, body) = send(&app, "GET", "/random").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cafe"]["name"], "Bean There");
    }

    #[tokio::test]
    async fn test_bean_there_lifecycle() {
        let app = app().await;
        send(&app, "POST", ADD_BEAN_THERE).await;

        let (status, body) = send(&app, "GET", "/search?loc=London").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cafe"]["name"], "Bean There");
        assert_eq!(body["cafe"]["coffee_price"], "£2.50");
        let id = body["cafe"]["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/update-price/{}?new_price=%C2%A33.00", id),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"response": {"success": "Successfully updated the price"}})
        );
        let (_, body) = send(&app, "GET", "/search?loc=London").await;
        assert_eq!(body["cafe"]["coffee_price"], "£3.00");

        let (status, body) =
            send(&app, "DELETE", &format!("/report-closed/{}?api-key=wrong", id)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"]["Forbidden"].is_string());
        let (status, _) = send(&app, "GET", "/search?loc=London").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            "DELETE",
            &format!("/report-closed/{}?api-key={}", id, API_KEY),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"response": {"success": "Successfully deleted the cafe from the database."}})
        );

        let (status, body) = send(&app, "GET", "/search?loc=London").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": {"Not Found": "Sorry, we don't have a cafe at that location."}})
        );
    }

    #[tokio::test]
    async fn test_search_is_case_sensitive() {
        let app = app().await;
        send(&app, "POST", ADD_BEAN_THERE).await;

        let (status, _) = send(&app, "GET", "/search?loc=london").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", "/search").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // The original service answered these with 200; they now carry a real 404.
    #[tokio::test]
    async fn test_not_found_uses_404() {
        let app = app().await;

        let (status, body) = send(&app, "PATCH", "/update-price/42?new_price=1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": {"Not Found": "Sorry, cafe with that ID was not found in the database"}})
        );

        let (status, body) = send(
            &app,
            "DELETE",
            &format!("/report-closed/42?api-key={}", API_KEY),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": {"Not Found": "Sorry a cafe with that id was not found in the database."}})
        );
    }

    #[tokio::test]
    async fn test_update_price_requires_new_price() {
        let app = app().await;
        send(&app, "POST", ADD_BEAN_THERE).await;

        let (status, _) = send(&app, "PATCH", "/update-price/1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (_, body) = send(&app, "GET", "/search?loc=London").await;
        assert_eq!(body["cafe"]["coffee_price"], "£2.50");
    }

    #[tokio::test]
    async fn test_home_and_health() {
        let app = app().await;

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (status, body) = send(&app, "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_repeated_parameter_uses_first_value() {
        let app = app().await;
        send(&app, "POST", ADD_BEAN_THERE).await;

        let (status, body) = send(&app, "GET", "/search?loc=London&loc=Paris").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cafe"]["name"], "Bean There");

        let (status, _) = send(&app, "GET", "/search?loc=Paris&loc=London").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "POST",
            "/add?name=Grounds&name=Other&map_url=m&img_url=i&loc=Leeds&seats=5",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, "GET", "/search?loc=Leeds").await;
        assert_eq!(body["cafe"]["name"], "Grounds");
    }

    #[tokio::test]
    async fn test_bad_id_is_json_bad_request() {
        let app = app().await;

        let (status, body) = send(&app, "PATCH", "/update-price/abc?new_price=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["Bad Request"].is_string());

        let (status, body) = send(
            &app,
            "DELETE",
            &format!("/report-closed/abc?api-key={}", API_KEY),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["Bad Request"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_not_found() {
        let app = app().await;
        let (status, body) = send(&app, "GET", "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": {"Not Found": "Sorry, that page does not exist."}})
        );
    }
}
