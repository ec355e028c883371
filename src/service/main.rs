//! Import web service.
//!
//! Accepts the same inputs as the survey app's upload form (the exported
//! batch plus OSM credentials and a changeset note) and answers with the
//! import label.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geopaposm::batch::{parse_records, run_import};
use geopaposm::error::{ERROR_JSON, ERROR_OSM};
use geopaposm::models::SearchBuffer;
use geopaposm::osm::{ChangesetUploader, Credentials, OsmClient, DEFAULT_API_URL};
use geopaposm::ImportError;

#[derive(Parser, Debug)]
#[command(name = "service")]
#[command(about = "Survey import web service")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// OSM API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Search buffer in degrees around each point
    #[arg(long, default_value_t = geopaposm::models::DEFAULT_BUFFER_DEGREES)]
    buffer: f64,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

/// Application state shared across handlers
struct AppState {
    api_url: String,
    buffer: SearchBuffer,
}

#[derive(Debug, Deserialize)]
struct ImportRequest {
    /// Exported survey batch, as a JSON string
    inputvector: String,
    username: String,
    password: String,
    /// Note appended to the changeset comment
    #[serde(default)]
    changeset: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImportResponse {
    output: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("geopaposm import service");
    info!("OSM API: {}", args.api_url);

    let app = router(AppState {
        api_url: args.api_url,
        buffer: SearchBuffer::new(args.buffer)?,
    });

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/import", post(import_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Health check endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Run one batch with a client built from the request's credentials
async fn import_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<Json<ImportResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        error!("Rejected import request: {}", rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: ERROR_JSON,
            }),
        )
    })?;
    let records = parse_records(&request.inputvector).map_err(error_response)?;

    let credentials = Credentials::Basic {
        username: request.username,
        password: request.password,
    };
    let client = OsmClient::new(&state.api_url, Some(credentials)).map_err(|e| {
        error!("Failed to create OSM API client: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { message: ERROR_OSM }),
        )
    })?;
    let mut uploader = ChangesetUploader::new(client.clone(), request.changeset.as_deref());

    let result = run_import(&records, &client, &mut uploader, state.buffer)
        .await
        .map_err(error_response)?;

    info!("Import request finished: {}", result.summary());
    Ok(Json(ImportResponse {
        output: result.output_label(),
    }))
}

fn error_response(e: ImportError) -> (StatusCode, Json<ErrorResponse>) {
    error!("Import failed: {}", e);
    let status = match e {
        ImportError::MalformedInput(_) => StatusCode::BAD_REQUEST,
        ImportError::Fetch { .. } | ImportError::UploadFailure(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(ErrorResponse { message: e.label() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, Uri};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// Stand-in OSM API: empty map responses and an always-accepting
    /// changeset flow, or a failing map endpoint
    async fn fake_api(map_fails: bool) -> String {
        let app = Router::new().fallback(move |uri: Uri| async move {
            let path = uri.path();
            if path.ends_with("/map.json") {
                if map_fails {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database offline".to_string())
                } else {
                    (StatusCode::OK, r#"{"version": "0.6", "elements": []}"#.to_string())
                }
            } else if path.ends_with("/changeset/create") {
                (StatusCode::OK, "12".to_string())
            } else {
                (StatusCode::OK, String::new())
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn app(api_url: String) -> Router {
        router(AppState {
            api_url,
            buffer: SearchBuffer::default(),
        })
    }

    async fn post_import(app: Router, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/import")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn one_point_batch() -> String {
        json!([{"form": {"formitems": [
            {"key": "LONGITUDE", "value": "11.1", "type": "double"},
            {"key": "LATITUDE", "value": "46.1", "type": "double"},
            {"key": "amenity", "value": "bench", "type": "string"}
        ]}}])
        .to_string()
    }

    fn import_body(inputvector: String) -> String {
        json!({
            "inputvector": inputvector,
            "username": "mapper",
            "password": "secret",
            "changeset": "park survey"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_body_that_is_not_json() {
        let (status, body) = post_import(app(fake_api(false).await), "{oops".into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "error_json"}));
    }

    #[tokio::test]
    async fn test_missing_credentials_field() {
        let request = json!({"inputvector": "[]", "username": "mapper"}).to_string();
        let (status, body) = post_import(app(fake_api(false).await), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "error_json"}));
    }

    #[tokio::test]
    async fn test_malformed_input_vector() {
        let request = import_body("not a batch".into());
        let (status, body) = post_import(app(fake_api(false).await), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "error_json"}));
    }

    #[tokio::test]
    async fn test_osm_failure() {
        let request = import_body(one_point_batch());
        let (status, body) = post_import(app(fake_api(true).await), request).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, json!({"message": "error_osm"}));
    }

    #[tokio::test]
    async fn test_successful_import() {
        let request = import_body(one_point_batch());
        let (status, body) = post_import(app(fake_api(false).await), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"output": "features_imported"}));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let request = import_body("[]".into());
        let (status, body) = post_import(app(fake_api(false).await), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"output": "features_imported"}));
    }
}
