//! API Router with Swagger UI

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ErrorResponse, PagedResponse};
use super::modules::health::{self, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::parking_spots::{
    self, CreateSpotRequest, CreateSpotResponse, DeviceDto, ParkingState, SpotStatusDto,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Parking spots
        parking_spots::list_spots_status,
        parking_spots::create_spot,
        parking_spots::delete_spot,
        parking_spots::occupy,
        parking_spots::free,
        parking_spots::list_devices,
    ),
    components(
        schemas(
            // Common
            ErrorResponse,
            PagedResponse<SpotStatusDto>,
            PagedResponse<DeviceDto>,
            // Health
            health::HealthResponse,
            health::ComponentHealth,
            // Parking spots
            CreateSpotRequest,
            CreateSpotResponse,
            SpotStatusDto,
            DeviceDto,
        )
    ),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Parking Spots", description = "Spot/device pairing, occupancy signals and listings"),
    ),
    info(
        title = "Parking IoT API",
        version = "1.0.0",
        description = "REST API for IoT-guarded parking spots",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(parking: ParkingState, health: HealthState, metrics: MetricsState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let parking_routes = Router::new()
        .route(
            "/api/parking-spots",
            get(parking_spots::list_spots_status).post(parking_spots::create_spot),
        )
        .route("/api/parking-spots/devices", get(parking_spots::list_devices))
        .route("/api/parking-spots/{id}", delete(parking_spots::delete_spot))
        .route("/api/parking-spots/{id}/occupy", post(parking_spots::occupy))
        .route("/api/parking-spots/{id}/free", post(parking_spots::free))
        .route_layer(middleware::from_fn(http_metrics_middleware))
        .with_state(parking);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health);

    let metrics_routes = Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(metrics);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // Build router
    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(parking_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::application::{ParkingService, RateLimitConfig, RateLimiter};
    use crate::infrastructure::InMemoryRepositoryProvider;

    fn app_with(cooldown: Duration) -> Router {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            cooldown,
            retention: Duration::from_secs(600),
        }));
        create_api_router(
            ParkingState {
                service: Arc::new(ParkingService::new(repos, limiter)),
            },
            HealthState::new(None),
            MetricsState::detached(),
        )
    }

    fn app() -> Router {
        app_with(Duration::ZERO)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn create_body(spot: &str, device: &str) -> Value {
        json!({
            "parkingSpotId": spot,
            "parkingName": format!("Spot {}", spot),
            "deviceId": device,
            "deviceSpecification": "Raspberry Pi 5",
        })
    }

    #[tokio::test]
    async fn create_occupy_list_delete() {
        let app = app();

        let (status, body) = send(&app, "POST", "/api/parking-spots", Some(create_body("S1", "D1"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["parkingSpotId"], "S1");
        assert_eq!(body["deviceId"], "D1");
        assert_eq!(body["message"], "Parking spot created successfully with new device");

        let (status, _) = send(&app, "POST", "/api/parking-spots/D1/occupy", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "GET", "/api/parking-spots?pageNumber=1&pageSize=10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalCount"], 1);
        assert_eq!(body["items"][0]["parkingSpotId"], "S1");
        assert_eq!(body["items"][0]["status"], "Occupied");

        let (status, _) = send(&app, "DELETE", "/api/parking-spots/S1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "DELETE", "/api/parking-spots/S1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["statusCode"], 404);
    }

    #[tokio::test]
    async fn repeated_occupy_is_conflict() {
        let app = app();
        send(&app, "POST", "/api/parking-spots", Some(create_body("S1", "D1"))).await;
        send(&app, "POST", "/api/parking-spots/D1/occupy", None).await;

        let (status, body) = send(&app, "POST", "/api/parking-spots/D1/occupy", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["statusCode"], 409);
    }

    #[tokio::test]
    async fn burst_from_one_device_is_throttled() {
        let app = app_with(Duration::from_secs(10));
        send(&app, "POST", "/api/parking-spots", Some(create_body("S1", "D1"))).await;

        let (first, _) = send(&app, "POST", "/api/parking-spots/D1/occupy", None).await;
        let (second, body) = send(&app, "POST", "/api/parking-spots/D1/free", None).await;

        assert_eq!(first, StatusCode::NO_CONTENT);
        assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["statusCode"], 429);
    }

    #[tokio::test]
    async fn unknown_device_is_not_found() {
        let (status, _) = send(&app(), "POST", "/api/parking-spots/ghost/free", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn device_listing_reports_usage() {
        let app = app();
        send(&app, "POST", "/api/parking-spots", Some(create_body("S1", "D1"))).await;

        let (status, body) = send(&app, "GET", "/api/parking-spots/devices", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["deviceId"], "D1");
        assert_eq!(body["items"][0]["status"], "Registered and in use");
        assert_eq!(body["pageNumber"], 1);
    }

    #[tokio::test]
    async fn zero_page_size_is_bad_request() {
        let (status, body) = send(&app(), "GET", "/api/parking-spots?pageNumber=1&pageSize=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
    }

    #[tokio::test]
    async fn huge_page_number_is_bad_request() {
        let uri = format!("/api/parking-spots?pageNumber={}&pageSize=2", u64::MAX);
        let (status, body) = send(&app(), "GET", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
    }

    #[tokio::test]
    async fn empty_fields_fail_validation() {
        let mut body = create_body("S1", "D1");
        body["parkingName"] = json!("");

        let (status, body) = send(&app(), "POST", "/api/parking-spots", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["statusCode"], 422);
    }

    #[tokio::test]
    async fn blank_id_is_bad_request() {
        let (status, _) = send(&app(), "POST", "/api/parking-spots", Some(create_body("  ", "D1"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pairing_twice_is_conflict() {
        let app = app();
        send(&app, "POST", "/api/parking-spots", Some(create_body("S1", "D1"))).await;

        let (status, body) = send(&app, "POST", "/api/parking-spots", Some(create_body("S1", "D1"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Conflict: Device and parking spot is already in use");
    }

    #[tokio::test]
    async fn health_reports_memory_backend() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"]["backend"], "memory");
    }

    #[tokio::test]
    async fn metrics_endpoint_renders_text() {
        let response = app()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn openapi_lists_parking_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/parking-spots"));
        assert!(doc.paths.paths.contains_key("/api/parking-spots/{id}/occupy"));
    }
}
