// Integration tests for the plot API backed by an on-disk session store

use std::fs;
use std::sync::Arc;

use axum::Json;
use axum::body::to_bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fastlap::api::{ApiState, PlotRequest, get_plots, schedule};
use fastlap::telemetry::{CachedSessionProvider, SessionStore};
use fastlap::{DefaultSelection, RenderConfig};
use tempfile::TempDir;

fn api_state(dir: &TempDir) -> Arc<ApiState> {
    let event_dir = dir.path().join("2024").join("abu_dhabi_grand_prix");
    fs::create_dir_all(&event_dir).unwrap();
    let mut lines = vec![
        r#"{"SessionStart":{"year":2024,"event_name":"Abu Dhabi Grand Prix","session":"R"}}"#
            .to_string(),
        r#"{"Lap":{"driver":"LEC","lap_number":5,"lap_time_s":85.9}}"#.to_string(),
        // timed lap with no telemetry recorded
        r#"{"Lap":{"driver":"HAM","lap_number":3,"lap_time_s":86.4}}"#.to_string(),
    ];
    for i in 0..12 {
        let angle = f64::from(i) / 12.0 * std::f64::consts::TAU;
        lines.push(format!(
            r#"{{"Sample":{{"driver":"LEC","lap_number":5,"time_s":{:.2},"speed_kph":{:.1},"x":{:.1},"y":{:.1}}}}}"#,
            f64::from(i) * 0.5,
            160.0 + 90.0 * angle.sin().abs(),
            900.0 * angle.cos(),
            500.0 * angle.sin()
        ));
    }
    fs::write(event_dir.join("R.jsonl"), lines.join("\n")).unwrap();

    let store = SessionStore::new(dir.path().to_path_buf()).unwrap();
    Arc::new(ApiState {
        provider: Arc::new(CachedSessionProvider::new(store)),
        defaults: DefaultSelection::default(),
        render: RenderConfig::default(),
    })
}

#[tokio::test]
async fn test_default_request_serves_both_plots() {
    let dir = TempDir::new().unwrap();
    let Json(response) = get_plots(State(api_state(&dir)), Json(PlotRequest::default()))
        .await
        .unwrap();

    let speed = STANDARD.decode(&response.speed_plot).unwrap();
    let track = String::from_utf8(STANDARD.decode(&response.track_plot).unwrap()).unwrap();
    assert!(speed.starts_with(b"<svg"));
    assert_eq!(track.matches("class=\"speed-segment\" x1").count(), 11);
    assert_eq!(response.mime_type, "image/svg+xml");
}

#[tokio::test]
async fn test_unknown_driver_and_track() {
    let dir = TempDir::new().unwrap();
    let state = api_state(&dir);

    let missing_driver = get_plots(
        State(Arc::clone(&state)),
        Json(PlotRequest {
            driver: Some("SAI".to_string()),
            ..Default::default()
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(missing_driver.into_response().status(), StatusCode::NOT_FOUND);

    let missing_track = get_plots(
        State(state),
        Json(PlotRequest {
            track: Some("Monaco".to_string()),
            ..Default::default()
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(
        missing_track.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_fastest_lap_without_telemetry_is_a_warning() {
    let dir = TempDir::new().unwrap();
    let err = get_plots(
        State(api_state(&dir)),
        Json(PlotRequest {
            driver: Some("HAM".to_string()),
            ..Default::default()
        }),
    )
    .await
    .unwrap_err();

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body["warning"],
        "No speed data available for driver HAM in this session."
    );
}

#[tokio::test]
async fn test_schedule_endpoint() {
    let dir = TempDir::new().unwrap();
    let Json(events) = schedule(State(api_state(&dir))).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].year, 2024);
}
