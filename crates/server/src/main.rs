//! opsroster REST API server
//!
//! Serves one in-memory handover session: load units from a transcript or a
//! roster photo, edit them, and render the handover report.

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use clap::Parser;
use core_pipeline::{
    ExtractionOutcome, OcrEngine, RosterError, Session, UnitRecord, UnitStatus, LANGUAGE_HINT,
    LOCATIONS, NO_LOCATION_LABEL,
};
use llm_bridge::{vision::DEFAULT_VISION_MODEL, OllamaClient, OllamaConfig, VisionOcr};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Server configuration, from flags or environment
#[derive(Parser, Debug)]
#[command(name = "opsroster-server", version, about = "opsroster REST API")]
struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "OPSROSTER_BIND", default_value = "127.0.0.1:3000")]
    bind: String,

    /// Ollama base URL for the vision OCR engine
    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    ollama_url: String,

    /// Vision model used for OCR
    #[arg(long, env = "OPSROSTER_VISION_MODEL", default_value = DEFAULT_VISION_MODEL)]
    vision_model: String,
}

struct AppState {
    session: Mutex<Session>,
    /// Held for the duration of one OCR call
    ocr_gate: Mutex<()>,
    engine: Box<dyn OcrEngine>,
}

impl AppState {
    fn new(engine: Box<dyn OcrEngine>) -> Self {
        Self {
            session: Mutex::new(Session::new()),
            ocr_gate: Mutex::new(()),
            engine,
        }
    }
}

type SharedState = Arc<AppState>;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = ServerConfig::parse();
    let client = OllamaClient::new(OllamaConfig::with_base_url(config.ollama_url.clone()))?;
    let engine = VisionOcr::new(client, config.vision_model.clone());
    info!(
        ollama = %config.ollama_url,
        model = engine.model_name(),
        "using vision OCR engine"
    );
    let state = Arc::new(AppState::new(Box::new(engine)));

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Server listening on {}", config.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/options", get(get_options))
        .route("/api/transcript", post(load_transcript))
        .route("/api/ocr", post(run_ocr))
        .route("/api/units", get(list_units).post(add_unit))
        .route("/api/units/:index", put(replace_unit).delete(remove_unit))
        .route("/api/handover", put(set_handover))
        .route("/api/report", post(render_report))
        .with_state(state)
}

/// JSON error body
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<&'static str>,
}

enum ApiError {
    Roster(RosterError),
    BadRequest(String),
    Busy,
}

impl From<RosterError> for ApiError {
    fn from(e: RosterError) -> Self {
        ApiError::Roster(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Roster(e) => {
                let status = match e {
                    RosterError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    RosterError::UnitIndex { .. } => StatusCode::NOT_FOUND,
                    RosterError::UnknownLocation(_) | RosterError::UnknownStatus(_) => {
                        StatusCode::BAD_REQUEST
                    }
                };
                let body = ErrorBody {
                    error: e.to_string(),
                    notice: e.notice(),
                };
                (status, body)
            }
            ApiError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, ErrorBody { error, notice: None })
            }
            ApiError::Busy => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error: "an OCR request is already running".to_string(),
                    notice: None,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Serialize)]
struct OptionEntry {
    value: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct OptionsResponse {
    statuses: Vec<OptionEntry>,
    locations: Vec<OptionEntry>,
}

async fn get_options() -> Json<OptionsResponse> {
    let statuses = UnitStatus::ALL
        .into_iter()
        .map(|status| OptionEntry {
            value: status.key(),
            label: status.label(),
        })
        .collect();
    let locations = LOCATIONS
        .into_iter()
        .map(|location| OptionEntry {
            value: location,
            label: if location.is_empty() {
                NO_LOCATION_LABEL
            } else {
                location
            },
        })
        .collect();
    Json(OptionsResponse {
        statuses,
        locations,
    })
}

#[derive(Serialize)]
struct ExtractResponse {
    outcome: ExtractionOutcome,
    notice: &'static str,
    units: Vec<UnitRecord>,
}

impl ExtractResponse {
    fn new(outcome: ExtractionOutcome, session: &Session) -> Self {
        Self {
            outcome,
            notice: outcome.notice(),
            units: session.units().to_vec(),
        }
    }
}

#[derive(Deserialize)]
struct TranscriptRequest {
    text: String,
}

async fn load_transcript(
    State(state): State<SharedState>,
    Json(request): Json<TranscriptRequest>,
) -> Json<ExtractResponse> {
    let mut session = state.session.lock().await;
    let outcome = session.load_transcript(&request.text);
    Json(ExtractResponse::new(outcome, &session))
}

#[derive(Deserialize)]
struct OcrRequest {
    image_base64: String,
}

async fn run_ocr(
    State(state): State<SharedState>,
    Json(request): Json<OcrRequest>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let _gate = state.ocr_gate.try_lock().map_err(|_| ApiError::Busy)?;

    let image = general_purpose::STANDARD
        .decode(request.image_base64.trim())
        .map_err(|e| ApiError::BadRequest(format!("invalid base64 image: {}", e)))?;

    // The session stays editable while the engine runs
    let recognized = state.engine.recognize(&image, LANGUAGE_HINT).await;

    let mut session = state.session.lock().await;
    let outcome = session.apply_recognition(recognized);
    Ok(Json(ExtractResponse::new(outcome, &session)))
}

async fn list_units(State(state): State<SharedState>) -> Json<Vec<UnitRecord>> {
    let session = state.session.lock().await;
    Json(session.units().to_vec())
}

async fn add_unit(State(state): State<SharedState>) -> (StatusCode, Json<Vec<UnitRecord>>) {
    let mut session = state.session.lock().await;
    session.add_unit();
    (StatusCode::CREATED, Json(session.units().to_vec()))
}

async fn replace_unit(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
    Json(unit): Json<UnitRecord>,
) -> Result<Json<Vec<UnitRecord>>, ApiError> {
    let mut session = state.session.lock().await;
    session.replace_unit(index, unit)?;
    Ok(Json(session.units().to_vec()))
}

async fn remove_unit(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
) -> Result<Json<Vec<UnitRecord>>, ApiError> {
    let mut session = state.session.lock().await;
    session.remove_unit(index)?;
    Ok(Json(session.units().to_vec()))
}

#[derive(Deserialize)]
struct HandoverRequest {
    recipient: String,
    deputy: String,
}

async fn set_handover(
    State(state): State<SharedState>,
    Json(request): Json<HandoverRequest>,
) -> StatusCode {
    let mut session = state.session.lock().await;
    session.recipient = request.recipient;
    session.deputy = request.deputy;
    StatusCode::NO_CONTENT
}

#[derive(Serialize)]
struct ReportResponse {
    text: String,
}

async fn render_report(
    State(state): State<SharedState>,
) -> Result<Json<ReportResponse>, ApiError> {
    let session = state.session.lock().await;
    let text = session.render()?;
    Ok(Json(ReportResponse { text }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use tokio::sync::Notify;
    use tower::ServiceExt;

    struct FixedEngine(&'static str);

    #[async_trait]
    impl OcrEngine for FixedEngine {
        async fn recognize(&self, _image: &[u8], _languages: &str) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingEngine;

    #[async_trait]
    impl OcrEngine for FailingEngine {
        async fn recognize(&self, _image: &[u8], _languages: &str) -> anyhow::Result<String> {
            anyhow::bail!("model not loaded")
        }
    }

    /// Blocks until released, to hold the OCR gate
    struct BlockingEngine(Arc<Notify>);

    #[async_trait]
    impl OcrEngine for BlockingEngine {
        async fn recognize(&self, _image: &[u8], _languages: &str) -> anyhow::Result<String> {
            self.0.notified().await;
            Ok(String::new())
        }
    }

    fn app_with(engine: Box<dyn OcrEngine>) -> (Router, SharedState) {
        let state = Arc::new(AppState::new(engine));
        (router(state.clone()), state)
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = app_with(Box::new(FixedEngine("")));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_options_list_statuses_and_locations() {
        let (app, _) = app_with(Box::new(FixedEngine("")));
        let (status, body) = call(&app, Method::GET, "/api/options", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["statuses"].as_array().unwrap().len(), 3);
        assert_eq!(body["statuses"][1]["label"], "مشغول");
        assert_eq!(body["locations"][0]["value"], "");
        assert_eq!(body["locations"][0]["label"], NO_LOCATION_LABEL);
    }

    #[tokio::test]
    async fn test_transcript_then_report() {
        let (app, _) = app_with(Box::new(FixedEngine("")));
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/transcript",
            Some(json!({"text": "AB101 وحدة 1\nCD202 وحدة 2 خارج"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["outcome"], "extracted");
        assert_eq!(body["units"].as_array().unwrap().len(), 2);

        let (status, body) = call(&app, Method::POST, "/api/report", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["notice"].as_str().unwrap().contains("المستلم"));

        let (status, _) = call(
            &app,
            Method::PUT,
            "/api/handover",
            Some(json!({"recipient": "أحمد | A-1", "deputy": "سارة | B-2"})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(&app, Method::POST, "/api/report", None).await;
        assert_eq!(status, StatusCode::OK);
        let text = body["text"].as_str().unwrap();
        assert!(text.contains(":{2}"));
        assert!(text.contains("وحدة 1 | AB-101"));
        assert!(text.contains("خارج الخدمة : (1)"));
    }

    #[tokio::test]
    async fn test_unit_editing_endpoints() {
        let (app, _) = app_with(Box::new(FixedEngine("")));
        let (status, body) = call(&app, Method::POST, "/api/units", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body[0]["status"], "in_field");

        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/units/0",
            Some(json!({"name": "خالد", "code": "EF-3", "status": "busy", "location": "الغرب"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["location"], "الغرب");

        let (status, _) = call(
            &app,
            Method::PUT,
            "/api/units/0",
            Some(json!({"name": "خالد", "location": "باريس"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, Method::DELETE, "/api/units/5", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(&app, Method::DELETE, "/api/units/0", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ocr_success_and_failure() {
        let (app, _) = app_with(Box::new(FixedEngine("DAT فريق مشغول")));
        let image = general_purpose::STANDARD.encode(b"png");
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/ocr",
            Some(json!({"image_base64": image})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["units"][0]["code"], "DA-1");
        assert_eq!(body["units"][0]["status"], "busy");

        let (app, state) = app_with(Box::new(FailingEngine));
        state.session.lock().await.load_transcript("AB1 علي");
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/ocr",
            Some(json!({"image_base64": image})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["outcome"], "failed");
        assert_eq!(body["units"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ocr_rejects_bad_base64() {
        let (app, _) = app_with(Box::new(FixedEngine("")));
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/ocr",
            Some(json!({"image_base64": "%%%"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_concurrent_ocr_is_rejected() {
        let release = Arc::new(Notify::new());
        let (app, state) = app_with(Box::new(BlockingEngine(release.clone())));
        let image = general_purpose::STANDARD.encode(b"png");

        let first = {
            let app = app.clone();
            let body = json!({"image_base64": image});
            tokio::spawn(async move { call(&app, Method::POST, "/api/ocr", Some(body)).await })
        };

        // Wait for the first request to take the gate
        while state.ocr_gate.try_lock().is_ok() {
            tokio::task::yield_now().await;
        }

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/ocr",
            Some(json!({"image_base64": image})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        release.notify_one();
        let (status, body) = first.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["outcome"], "empty");
    }
}
