use super::AppState;
use super::health;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Host-level routes (`/health`).
pub fn system_router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(health::health_handler))
}
