//! REST front end serving base64 encoded plots.
//!
//! Handlers stay thin: session loading and rendering run on the blocking pool
//! and every failure is turned into an [`ApiError`] response.

mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

pub use error::ApiError;

use crate::FastlapError;
use crate::config::DefaultSelection;
use crate::render::{RenderConfig, render_driver_plots};
use crate::telemetry::{EventSummary, SessionProvider, SessionType};

pub const WELCOME_MESSAGE: &str = "Welcome to the F1 Dashboard API!";
const SVG_MIME_TYPE: &str = "image/svg+xml";

pub struct ApiState {
    pub provider: Arc<dyn SessionProvider>,
    pub defaults: DefaultSelection,
    pub render: RenderConfig,
}

/// Body of `POST /get_plots`. Unset fields fall back to the configured defaults.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct PlotRequest {
    pub year: Option<u32>,
    pub track: Option<String>,
    pub session: Option<String>,
    pub driver: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSelection {
    pub year: u32,
    pub track: String,
    pub session: SessionType,
    pub driver: String,
}

impl PlotRequest {
    pub fn resolve(self, defaults: &DefaultSelection) -> Result<PlotSelection, FastlapError> {
        let session = match self.session {
            Some(code) => code.parse()?,
            None => defaults.session,
        };
        Ok(PlotSelection {
            year: self.year.unwrap_or(defaults.year),
            track: self.track.unwrap_or_else(|| defaults.track.clone()),
            session,
            driver: self.driver.unwrap_or_else(|| defaults.driver.clone()),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlotResponse {
    pub speed_plot: String,
    pub track_plot: String,
    pub mime_type: String,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/get_plots", post(get_plots))
        .route("/schedule", get(schedule))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: Arc<ApiState>) -> Result<(), FastlapError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| FastlapError::ServerError { source: e })?;
    info!("F1 dashboard API listening on http://{}", addr);
    axum::serve(listener, router(state))
        .await
        .map_err(|e| FastlapError::ServerError { source: e })
}

pub async fn index() -> &'static str {
    WELCOME_MESSAGE
}

pub async fn get_plots(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<PlotRequest>,
) -> Result<Json<PlotResponse>, ApiError> {
    let driver = request
        .driver
        .clone()
        .unwrap_or_else(|| state.defaults.driver.clone());
    let selection = request
        .resolve(&state.defaults)
        .map_err(|e| ApiError::from_error(e, "speed", &driver))?;
    debug!("Plot request resolved to {:?}", selection);

    let plots = tokio::task::spawn_blocking(move || {
        let session =
            state
                .provider
                .load_session(selection.year, &selection.track, selection.session)?;
        render_driver_plots(&session, &selection.driver, &state.render)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Plot task failed: {e}")))?
    .map_err(|e| ApiError::from_error(e, "speed", &driver))?;

    info!(
        "Served plots for {} lap {} ({} + {} bytes of SVG)",
        plots.driver,
        plots.lap_number,
        plots.speed_svg.len(),
        plots.track_svg.len()
    );
    Ok(Json(PlotResponse {
        speed_plot: STANDARD.encode(plots.speed_svg),
        track_plot: STANDARD.encode(plots.track_svg),
        mime_type: SVG_MIME_TYPE.to_string(),
    }))
}

pub async fn schedule(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<EventSummary>>, ApiError> {
    tokio::task::spawn_blocking(move || state.provider.event_schedule())
        .await
        .map_err(|e| ApiError::Internal(format!("Schedule task failed: {e}")))?
        .map(Json)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{Lap, Session, SessionInfo, TelemetrySample};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    struct FixedProvider(Arc<Session>);

    impl SessionProvider for FixedProvider {
        fn load_session(
            &self,
            year: u32,
            track: &str,
            _session: SessionType,
        ) -> Result<Arc<Session>, FastlapError> {
            if year != self.0.info.year {
                return Err(FastlapError::EventNotFound {
                    year,
                    track: track.to_string(),
                });
            }
            Ok(Arc::clone(&self.0))
        }

        fn event_schedule(&self) -> Result<Vec<EventSummary>, FastlapError> {
            Ok(vec![EventSummary {
                year: self.0.info.year,
                event_name: self.0.info.event_name.clone(),
                slug: "abu_dhabi_grand_prix".to_string(),
                sessions: vec![self.0.info.session],
            }])
        }
    }

    fn state() -> Arc<ApiState> {
        let telemetry = vec![
            TelemetrySample {
                time_s: Some(0.0),
                speed_kph: Some(100.0),
                x: Some(0.0),
                y: Some(0.0),
                distance_m: None,
            },
            TelemetrySample {
                time_s: Some(1.0),
                speed_kph: Some(150.0),
                x: Some(40.0),
                y: Some(10.0),
                distance_m: None,
            },
            TelemetrySample {
                time_s: Some(2.0),
                speed_kph: Some(120.0),
                x: Some(70.0),
                y: Some(45.0),
                distance_m: None,
            },
        ];
        let session = Session {
            info: SessionInfo {
                year: 2024,
                event_name: "Abu Dhabi Grand Prix".to_string(),
                session: SessionType::R,
            },
            laps: vec![Lap {
                driver: "LEC".to_string(),
                lap_number: 12,
                lap_time_s: Some(85.6),
                telemetry,
            }],
        };
        Arc::new(ApiState {
            provider: Arc::new(FixedProvider(Arc::new(session))),
            defaults: DefaultSelection::default(),
            render: RenderConfig::default(),
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let selection = PlotRequest::default()
            .resolve(&DefaultSelection::default())
            .unwrap();
        assert_eq!(
            selection,
            PlotSelection {
                year: 2024,
                track: "Abu Dhabi".to_string(),
                session: SessionType::R,
                driver: "LEC".to_string(),
            }
        );

        let selection = PlotRequest {
            session: Some("qualifying".to_string()),
            driver: Some("VER".to_string()),
            ..Default::default()
        }
        .resolve(&DefaultSelection::default())
        .unwrap();
        assert_eq!(selection.session, SessionType::Q);
        assert_eq!(selection.driver, "VER");
    }

    #[tokio::test]
    async fn test_index() {
        assert_eq!(index().await, "Welcome to the F1 Dashboard API!");
    }

    #[tokio::test]
    async fn test_get_plots_returns_base64_svgs() {
        let Json(response) = get_plots(State(state()), Json(PlotRequest::default()))
            .await
            .unwrap();
        assert_eq!(response.mime_type, "image/svg+xml");

        let speed = String::from_utf8(STANDARD.decode(response.speed_plot).unwrap()).unwrap();
        let track = String::from_utf8(STANDARD.decode(response.track_plot).unwrap()).unwrap();
        assert!(speed.contains("LEC Speed Plot"));
        assert_eq!(track.matches("class=\"speed-segment\" x1").count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_driver_is_a_warning() {
        let request = PlotRequest {
            driver: Some("HAM".to_string()),
            ..Default::default()
        };
        let err = get_plots(State(state()), Json(request)).await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["warning"],
            "No speed data available for driver HAM in this session."
        );
    }

    #[tokio::test]
    async fn test_bad_session_code_is_bad_request() {
        let request = PlotRequest {
            session: Some("Sprint".to_string()),
            ..Default::default()
        };
        let err = get_plots(State(state()), Json(request)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_server_error() {
        let request = PlotRequest {
            year: Some(1999),
            ..Default::default()
        };
        let response = get_plots(State(state()), Json(request))
            .await
            .unwrap_err()
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_schedule() {
        let Json(events) = schedule(State(state())).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name, "Abu Dhabi Grand Prix");
    }
}
