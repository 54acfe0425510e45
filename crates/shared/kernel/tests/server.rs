use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use optbind_kernel::config::SettingsSource;
use optbind_kernel::domain::config::HostConfig;
use optbind_kernel::domain::settings::ConfigurationSettings;
use optbind_kernel::server::router::system_router;
use optbind_kernel::server::{AppState, Options};
use tower::ServiceExt;

fn state(bind: bool) -> AppState {
    let source = SettingsSource::from_pairs([("MyConfigSectionPrefix:ConfigSetting1", "A")]);
    let builder = AppState::builder().config(HostConfig::default());
    let builder =
        if bind { builder.bind::<ConfigurationSettings>(&source).expect("bind") } else { builder };
    builder.build().expect("state")
}

async fn first_setting(Options(settings): Options<ConfigurationSettings>) -> String {
    settings.config_setting1.clone().unwrap_or_default()
}

fn app(state: AppState) -> Router {
    Router::new().route("/first", get(first_setting)).with_state(state)
}

#[tokio::test]
async fn health_reports_status_version_and_uptime() {
    let (router, _): (Router, _) = system_router().with_state(state(true)).split_for_parts();

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(axum::http::header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
        Some("no-store, no-cache, must-revalidate")
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(json["status"], "up");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["uptime"].is_u64());
    assert_eq!(json.as_object().map(serde_json::Map::len), Some(3));
}

#[tokio::test]
async fn options_extractor_retrieves_bound_value() {
    let response = app(state(true))
        .oneshot(Request::get("/first").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    assert_eq!(&body[..], b"A");
}

#[tokio::test]
async fn options_extractor_rejects_unregistered_type() {
    let response = app(state(false))
        .oneshot(Request::get("/first").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
