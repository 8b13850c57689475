// Verdant Terrarium - Web Server
// REST API over the garden session with Axum

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use verdant_terrarium::{
    filter_plants, init_logging, load_catalog, CatalogFilter, Config, Garden, GardenSummary, Plant,
    PlantProgress, ProgressMap, SqliteStore, SyncOutcome, WateringOutcome,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    garden: Arc<Mutex<Garden<SqliteStore>>>,
    catalog: Arc<Vec<Plant>>,
}

impl AppState {
    /// One request at a time touches the garden
    fn garden(&self) -> MutexGuard<'_, Garden<SqliteStore>> {
        self.garden.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message),
        }
    }
}

fn internal_error(context: &str, e: anyhow::Error) -> Response {
    log::error!("{}: {:#}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::err(format!("{}: {}", context, e))),
    )
        .into_response()
}

/// Garden response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GardenResponse {
    progress: ProgressMap,
    total_level: u64,
    summary: GardenSummary,
}

/// Single plant response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlantProgressResponse {
    plant_id: String,
    progress: PlantProgress,
    threshold: u32,
    xp_fraction: f64,
}

#[derive(Deserialize)]
struct SyncRequest {
    ids: Vec<String>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/garden - Every progress record plus totals
async fn get_garden(State(state): State<AppState>) -> impl IntoResponse {
    let garden = state.garden();
    let summary = garden.summary();

    Json(ApiResponse::ok(GardenResponse {
        progress: garden.progress().clone(),
        total_level: summary.total_level,
        summary,
    }))
}

/// GET /api/garden/:plant_id - One record (default if never seen)
async fn get_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<String>,
) -> impl IntoResponse {
    let garden = state.garden();
    let progress = garden.plant(&plant_id);
    let threshold = garden.rules().threshold(progress.level);

    Json(ApiResponse::ok(PlantProgressResponse {
        plant_id,
        threshold,
        xp_fraction: progress.xp as f64 / threshold.max(1) as f64,
        progress,
    }))
}

/// POST /api/garden/:plant_id/water - Water one plant
async fn water_plant(State(state): State<AppState>, Path(plant_id): Path<String>) -> Response {
    let result: anyhow::Result<WateringOutcome> = state.garden().water(&plant_id);

    match result {
        Ok(outcome) => (StatusCode::OK, Json(ApiResponse::ok(outcome))).into_response(),
        Err(e) => internal_error(&format!("Error watering {}", plant_id), e),
    }
}

/// POST /api/catalog/sync - Fold a list of catalog ids into the garden
async fn sync_catalog(State(state): State<AppState>, Json(request): Json<SyncRequest>) -> Response {
    let result: anyhow::Result<SyncOutcome> = state.garden().sync_ids(&request.ids);

    match result {
        Ok(outcome) => (StatusCode::OK, Json(ApiResponse::ok(outcome))).into_response(),
        Err(e) => internal_error("Error syncing catalog", e),
    }
}

/// GET /api/catalog - The catalog loaded at startup, optionally filtered
/// (?search=&category=&difficulty=&sunlight=&availability=)
async fn get_catalog(
    State(state): State<AppState>,
    Query(filter): Query<CatalogFilter>,
) -> impl IntoResponse {
    let plants: Vec<Plant> = filter_plants(&state.catalog, &filter)
        .into_iter()
        .cloned()
        .collect();

    Json(ApiResponse::ok(plants))
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/garden", get(get_garden))
        .route("/garden/:plant_id", get(get_plant))
        .route("/garden/:plant_id/water", post(water_plant))
        .route("/catalog", get(get_catalog))
        .route("/catalog/sync", post(sync_catalog))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = Config::from_env();

    println!("🌐 Verdant Terrarium - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = SqliteStore::open(&config.db_path)?;
    let mut garden = Garden::open_with(store, &config.storage_key, config.rules)?;
    println!("✓ Garden opened: {:?}", config.db_path);

    let source = config.catalog_source();
    let catalog = load_catalog(&*source);
    let outcome = garden.sync_catalog(&catalog)?;
    println!(
        "✓ Catalog: {} plants ({} new in garden)",
        catalog.len(),
        outcome.added.len()
    );

    // Create shared state
    let state = AppState {
        garden: Arc::new(Mutex::new(garden)),
        catalog: Arc::new(catalog),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;

    println!("\n🚀 Server running on http://{}", config.addr);
    println!("   API: http://{}/api/garden", config.addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use verdant_terrarium::fallback_plants;

    fn test_app() -> Router {
        let garden = Garden::open(SqliteStore::open_in_memory().unwrap()).unwrap();
        build_router(AppState {
            garden: Arc::new(Mutex::new(garden)),
            catalog: Arc::new(fallback_plants()),
        })
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();

        let (status, body) = call(&app, "GET", "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_water_then_read_garden() {
        let app = test_app();

        let (status, body) = call(&app, "POST", "/api/garden/rose/water", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["after"]["xp"], 5);
        assert_eq!(body["data"]["leveledUp"], false);

        let (_, body) = call(&app, "POST", "/api/garden/rose/water", None).await;
        assert_eq!(body["data"]["after"]["level"], 2);
        assert_eq!(body["data"]["leveledUp"], true);

        let (_, body) = call(&app, "GET", "/api/garden", None).await;
        assert_eq!(body["data"]["progress"]["rose"]["level"], 2);
        assert_eq!(body["data"]["totalLevel"], 2);

        println!("✅ Water API test passed");
    }

    #[tokio::test]
    async fn test_unknown_plant_reads_default() {
        let app = test_app();

        let (status, body) = call(&app, "GET", "/api/garden/blue%20orchid", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["plantId"], "blue orchid");
        assert_eq!(
            body["data"]["progress"],
            serde_json::json!({"level": 1, "xp": 0, "lastWatered": 0})
        );
        assert_eq!(body["data"]["threshold"], 10);
    }

    #[tokio::test]
    async fn test_sync_catalog() {
        let app = test_app();
        let ids = serde_json::json!({"ids": ["a", "b"]});

        let (status, body) = call(&app, "POST", "/api/catalog/sync", Some(ids.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["changed"], true);
        assert_eq!(body["data"]["added"], serde_json::json!(["a", "b"]));

        let (_, body) = call(&app, "POST", "/api/catalog/sync", Some(ids)).await;
        assert_eq!(body["data"]["changed"], false);
    }

    #[tokio::test]
    async fn test_catalog_listing() {
        let app = test_app();

        let (_, body) = call(&app, "GET", "/api/catalog", None).await;

        let plants = body["data"].as_array().unwrap();
        assert_eq!(plants.len(), fallback_plants().len());
        assert!(plants[0]["scientificName"].is_string());
    }

    #[tokio::test]
    async fn test_plant_id_is_decoded_once() {
        let app = test_app();

        // Literal id "100%20off", percent-encoded once
        let (_, body) = call(&app, "POST", "/api/garden/100%2520off/water", None).await;
        assert_eq!(body["data"]["plantId"], "100%20off");

        let (_, body) = call(&app, "GET", "/api/garden/100%2520off", None).await;
        assert_eq!(body["data"]["plantId"], "100%20off");
        assert_eq!(body["data"]["progress"]["xp"], 5);

        let (_, body) = call(&app, "GET", "/api/garden", None).await;
        assert!(body["data"]["progress"]["100%20off"].is_object());
        assert!(body["data"]["progress"]["100 off"].is_null());
    }

    #[tokio::test]
    async fn test_catalog_filters() {
        let app = test_app();

        let (status, body) = call(&app, "GET", "/api/catalog?availability=in-stock&category=all", None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        assert!(ids.contains(&"fiddle-leaf-fig"));
        assert!(!ids.contains(&"hibiscus"));

        let (_, body) = call(&app, "GET", "/api/catalog?search=Echev&sunlight=high", None).await;
        let plants = body["data"].as_array().unwrap();
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0]["id"], "echeveria");

        println!("✅ Catalog filter API test passed");
    }
}
