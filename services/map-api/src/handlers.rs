//! HTTP request handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use projection::{MapProjection, Rotation};
use renderer::render_frame_with_lut;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MapApiConfig;
use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

// ============================================================================
// Request / response types
// ============================================================================

/// Viewing rotation in degrees; missing components are 0.
#[derive(Debug, Default, Deserialize)]
pub struct RotationParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub heading: Option<f64>,
}

impl RotationParams {
    fn rotation(&self) -> Result<Rotation, ApiError> {
        rotation_from_degrees(self.lat, self.lon, self.heading)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RenderParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub heading: Option<f64>,
    pub projection: Option<String>,
    pub width: Option<usize>,
    pub height: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ProjectionInfo {
    pub name: String,
    pub aspect_ratio: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RotationInfo {
    /// Degrees
    pub latitude: f64,
    /// Degrees
    pub longitude: f64,
    /// Degrees
    pub heading: f64,
    /// `[w, x, y, z]`
    pub quaternion: [f64; 4],
    pub debug: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /render - Render a view as PNG
pub async fn render_handler(
    Extension(state): Extension<Arc<AppState>>,
    params: Result<Query<RenderParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let projection = match params.projection.as_deref() {
        Some(name) => name.parse::<MapProjection>()?,
        None => MapProjection::default(),
    };
    let rotation = rotation_from_degrees(params.lat, params.lon, params.heading)?;
    let (width, height) = resolve_dimensions(&state.config, projection, params.width, params.height)?;

    debug!(
        width,
        height,
        projection = %projection,
        rotation = %rotation,
        "Render request"
    );

    let start = Instant::now();
    let render_state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ApiError> {
        let lut = render_state.view_lut(width, height, &rotation, projection)?;
        let frame = render_frame_with_lut(&lut, &render_state.raster)?;
        Ok(frame.to_png()?)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("render task failed: {}", e)))
    .and_then(|r| r);

    metrics::record_render(projection, start.elapsed(), result.is_ok());
    let png = result?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// GET /projections - Supported projections and their aspect ratios
pub async fn projections_handler() -> Json<Vec<ProjectionInfo>> {
    Json(
        MapProjection::ALL
            .iter()
            .map(|p| ProjectionInfo {
                name: p.name().to_string(),
                aspect_ratio: p.aspect_ratio(),
            })
            .collect(),
    )
}

/// GET /rotation - Decode a rotation and echo its components
pub async fn rotation_handler(
    params: Result<Query<RotationParams>, QueryRejection>,
) -> Result<Json<RotationInfo>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let rotation = params.rotation()?;
    let angles = rotation.angles().to_degrees();
    let q = rotation.quaternion();

    Ok(Json(RotationInfo {
        latitude: angles.latitude,
        longitude: angles.longitude,
        heading: angles.heading,
        quaternion: [q.w, q.i, q.j, q.k],
        debug: rotation.debug(),
    }))
}

/// GET /health - Liveness check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}

// ============================================================================
// Helpers
// ============================================================================

fn rotation_from_degrees(
    lat: Option<f64>,
    lon: Option<f64>,
    heading: Option<f64>,
) -> Result<Rotation, ApiError> {
    Ok(Rotation::from_degrees(
        lat.unwrap_or(0.0),
        lon.unwrap_or(0.0),
        heading.unwrap_or(0.0),
    )?)
}

/// Output size for a request.
///
/// A requested width and height form a box the projection's aspect ratio is
/// fitted into. With only one of them, the other follows from the aspect
/// ratio; with neither, the configured default width is used. The result
/// never exceeds the configured maximum on either axis.
pub fn resolve_dimensions(
    config: &MapApiConfig,
    projection: MapProjection,
    width: Option<usize>,
    height: Option<usize>,
) -> Result<(usize, usize), ApiError> {
    let max = config.max_render_dimension;
    for (name, value) in [("width", width), ("height", height)] {
        match value {
            Some(0) => return Err(ApiError::bad_request(format!("{} must be at least 1", name))),
            Some(v) if v > max => {
                return Err(ApiError::bad_request(format!(
                    "{} {} exceeds the maximum of {}",
                    name, v, max
                )))
            }
            _ => {}
        }
    }

    Ok(match (width, height) {
        (Some(w), Some(h)) => projection.fit_dimensions(w, h),
        (Some(w), None) => projection.fit_dimensions(w, max),
        (None, Some(h)) => projection.fit_dimensions(max, h),
        (None, None) => projection.fit_dimensions(config.default_render_width, max),
    })
}
