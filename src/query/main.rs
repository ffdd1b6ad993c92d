//! Query server for barangay lookups.
//!
//! Provides an HTTP API over the boundary geocoder: raw coordinate lookups,
//! map-link extraction, and dataset diagnostics.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use barangay_geocoder::maplink::{extract_coordinates, is_shortened_link};
use barangay_geocoder::models::{DatasetMetadata, QueryPoint};
use barangay_geocoder::{GeocodeError, Geocoder, GeocoderConfig, MatchResult};

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Barangay geocoding query server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Boundary dataset file (repeatable, tried before configured paths)
    #[arg(long)]
    dataset: Vec<PathBuf>,

    /// Load boundaries at startup instead of on the first request
    #[arg(long)]
    eager: bool,
}

/// Application state shared across handlers
struct AppState {
    geocoder: Arc<Geocoder>,
    http: reqwest::Client,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message.into(),
        }),
    )
}

/// Missing boundary data is an outage, not a server bug.
fn error_status(e: &GeocodeError) -> StatusCode {
    match e {
        GeocodeError::InvalidCoordinates { .. } => StatusCode::BAD_REQUEST,
        GeocodeError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
        e if e.is_dataset_error() => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn geocode_error(e: GeocodeError) -> ApiError {
    let status = error_status(&e);
    if status.is_server_error() {
        tracing::error!("Geocoder failed: {}", e);
    }
    api_error(status, e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Barangay Geocoder Query Server");

    let mut config = match &args.config {
        Some(path) => GeocoderConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeocoderConfig::default(),
    };
    if !args.dataset.is_empty() {
        let mut paths = args.dataset.clone();
        paths.append(&mut config.dataset_paths);
        config.dataset_paths = paths;
    }

    let geocoder = Arc::new(Geocoder::new(config));

    if args.eager {
        let g = Arc::clone(&geocoder);
        tokio::task::spawn_blocking(move || g.initialize())
            .await?
            .context("Failed to load boundary dataset")?;
    }

    let state = Arc::new(AppState {
        geocoder,
        http: reqwest::Client::new(),
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/locate", get(locate_handler))
        .route("/v1/extract-location", post(extract_location_handler))
        .route("/v1/regions", get(regions_handler))
        .route("/v1/metadata", get(metadata_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run a geocoder call off the async workers; the first call may read the dataset.
async fn with_geocoder<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Geocoder) -> barangay_geocoder::Result<T> + Send + 'static,
{
    let geocoder = Arc::clone(&state.geocoder);
    tokio::task::spawn_blocking(move || f(&geocoder))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(geocode_error)
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        initialized: state.geocoder.is_initialized(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    initialized: bool,
}

#[derive(Deserialize)]
struct LocateParams {
    lat: f64,
    lng: f64,
}

/// Coordinate lookup
async fn locate_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<LocateParams>, QueryRejection>,
) -> Result<Json<MatchResult>, ApiError> {
    let Query(params) = params.map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?;
    let result = with_geocoder(&state, move |g| g.locate(params.lat, params.lng)).await?;
    Ok(Json(result))
}

/// Sorted region names
async fn regions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let names = with_geocoder(&state, |g| {
        g.initialize()?;
        g.list_region_names()
    })
    .await?;
    Ok(Json(names))
}

/// Dataset diagnostics
async fn metadata_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DatasetMetadata>, ApiError> {
    let metadata = with_geocoder(&state, |g| {
        g.initialize()?;
        g.metadata()
    })
    .await?;
    Ok(Json(metadata))
}

#[derive(Deserialize)]
struct ExtractLocationRequest {
    #[serde(default)]
    maps_link: String,
}

#[derive(Serialize)]
struct ExtractLocationResponse {
    success: bool,
    location: Location,
}

#[derive(Serialize)]
struct Location {
    barangay: String,
    city: String,
    province: String,
    formatted_address: String,
    coordinates: QueryPoint,
    barangay_confidence: String,
    barangay_method: String,
}

/// Resolve a Google/Apple Maps link to a barangay
async fn extract_location_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractLocationRequest>,
) -> Result<Json<ExtractLocationResponse>, ApiError> {
    let link = req.maps_link.trim().to_string();
    if link.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Map URL is required"));
    }

    info!("Extracting location from URL: {}", link);

    let mut point = extract_coordinates(&link);
    if point.is_none() && is_shortened_link(&link) {
        info!("Detected shortened map link, expanding...");
        match expand_link(&state.http, &link).await {
            Ok(expanded) => point = extract_coordinates(&expanded),
            Err(e) => warn!("Failed to expand {}: {}", link, e),
        }
    }

    let point = point.ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            "Could not extract coordinates from URL",
        )
    })?;

    // A geocoder failure still returns the coordinates, just without a barangay
    let matched = match with_geocoder(&state, move |g| g.locate(point.lat, point.lng)).await {
        Ok(m) => Some(m),
        Err((_, Json(body))) => {
            warn!("Barangay lookup failed: {}", body.error);
            None
        }
    };

    Ok(Json(ExtractLocationResponse {
        success: true,
        location: build_location(point, matched),
    }))
}

async fn expand_link(client: &reqwest::Client, link: &str) -> reqwest::Result<String> {
    // GET follows redirects more reliably than HEAD
    let response = client.get(link).send().await?;
    Ok(response.url().to_string())
}

fn build_location(point: QueryPoint, matched: Option<MatchResult>) -> Location {
    let (barangay, city, province, confidence, method) = match matched {
        Some(m) => (
            m.region_name,
            m.parent_labels.city.unwrap_or_default(),
            m.parent_labels.province.unwrap_or_default(),
            m.confidence.to_string(),
            m.method.to_string(),
        ),
        None => (
            String::new(),
            String::new(),
            String::new(),
            "unknown".to_string(),
            "none".to_string(),
        ),
    };

    let formatted_address = [barangay.as_str(), city.as_str(), province.as_str(), "Philippines"]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    Location {
        barangay,
        city,
        province,
        formatted_address,
        coordinates: point,
        barangay_confidence: confidence,
        barangay_method: method,
    }
}
