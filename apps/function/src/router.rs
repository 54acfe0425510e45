use axum::Router;
use optbind::kernel::server::AppState;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "optbind-function", description = "HTTP triggers of the function host"))]
struct ApiDoc;

/// Full application router: system routes, function triggers and the `/docs` UI.
pub fn init(state: AppState) -> Router {
    let (routes, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(optbind::server::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    Router::new().merge(routes).merge(Scalar::with_url("/docs", api))
}
