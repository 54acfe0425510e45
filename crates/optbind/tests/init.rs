use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use optbind::domain::config::HostConfig;
use optbind::domain::settings::ConfigurationSettings;
use optbind::kernel::config::SettingsSource;
use tower::ServiceExt;

#[test]
fn sample_slice_is_enabled_by_default() {
    assert!(optbind::features::is_enabled("sample"));
    assert!(!optbind::features::is_enabled("unknown"));
}

#[test]
fn init_registers_sample_settings() {
    let source = SettingsSource::from_pairs([("MyConfigSectionPrefix:ConfigSetting3", "C")]);
    let state = optbind::init(&HostConfig::default(), &source).expect("init should succeed");

    let settings = state.try_options::<ConfigurationSettings>().expect("settings registered");
    assert_eq!(settings.config_setting3.as_deref(), Some("C"));
}

#[tokio::test]
async fn router_serves_health_and_trigger() {
    let source = SettingsSource::from_pairs([("MyConfigSectionPrefix:ConfigSetting1", "A")]);
    let state = optbind::init(&HostConfig::default(), &source).expect("init");
    let (app, api): (Router, _) = optbind::server::router().with_state(state).split_for_parts();

    assert!(api.paths.paths.contains_key("/health"));
    assert!(api.paths.paths.contains_key("/api/SampleHttpTrigger"));

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/api/SampleHttpTrigger").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    assert_eq!(&body[..], b"ConfigValue1 = A, ConfigValue2 = , ConfigValue3 = ");
}
