//! HTTP API server.
//!
//! Exposes video processing, question answering and session management as
//! JSON endpoints over a shared [`Orchestrator`].

use crate::cli::Output;
use crate::config::Settings;
use crate::error::{ErrorKind, VidqaError};
use crate::orchestrator::Orchestrator;
use crate::session::SessionInfo;
use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, warn};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let cors = cors_layer(&settings.server.cors_allow_origins);
    let orchestrator = Orchestrator::new(settings)?;

    let app = router(Arc::new(AppState { orchestrator })).layer(cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("vidqa API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Process video", "POST   /process_video");
    Output::kv("Ask question", "POST   /ask_question");
    Output::kv("List sessions", "GET    /sessions");
    Output::kv("Delete session", "DELETE /sessions/{session_id}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/sessions", get(list_sessions))
        .route("/sessions/{session_id}", delete(delete_session))
        .route("/process_video", post(process_video))
        .route("/ask_question", post(ask_question))
        .with_state(state)
}

/// Build the CORS layer. A `*` entry allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ProcessVideoRequest {
    youtube_url: String,
}

#[derive(Serialize, Deserialize)]
struct ProcessVideoResponse {
    session_id: String,
    video_id: String,
    title: String,
    message: String,
}

#[derive(Deserialize)]
struct AskQuestionRequest {
    session_id: String,
    question: String,
}

#[derive(Serialize, Deserialize)]
struct AskQuestionResponse {
    question: String,
    answer: String,
}

#[derive(Serialize)]
struct SessionListResponse {
    sessions: Vec<SessionInfo>,
}

#[derive(Serialize, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

/// A pipeline error rendered as an HTTP response.
struct ApiError(VidqaError);

impl From<VidqaError> for ApiError {
    fn from(err: VidqaError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match (&self.0, self.0.kind()) {
            (VidqaError::TranscriptNotAvailable(_), _) => StatusCode::NOT_FOUND,
            (_, ErrorKind::InvalidInput) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::SessionNotFound) => StatusCode::NOT_FOUND,
            (_, ErrorKind::TranscriptUnavailable)
            | (_, ErrorKind::IndexingFailure)
            | (_, ErrorKind::GenerationFailure) => StatusCode::BAD_GATEWAY,
            (_, ErrorKind::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        let body = ErrorResponse {
            error: self.0.to_string(),
            code: self.0.kind().code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

// === Handlers ===

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the Youtube Video Q&A API!".to_string(),
    })
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        sessions: state.orchestrator.list_sessions().await,
    })
}

async fn process_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessVideoRequest>,
) -> ApiResult<ProcessVideoResponse> {
    let processed = state.orchestrator.process_video(&req.youtube_url).await?;

    Ok(Json(ProcessVideoResponse {
        session_id: processed.session_id,
        video_id: processed.video_id,
        title: "Youtube Video".to_string(),
        message: "Video processed successfully.".to_string(),
    }))
}

async fn ask_question(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskQuestionRequest>,
) -> ApiResult<AskQuestionResponse> {
    let qa = state
        .orchestrator
        .ask_question(&req.session_id, &req.question)
        .await?;

    Ok(Json(AskQuestionResponse {
        question: qa.question,
        answer: qa.answer,
    }))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<MessageResponse> {
    state.orchestrator.delete_session(&session_id).await?;

    Ok(Json(MessageResponse {
        message: format!("Session {} deleted successfully.", session_id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::testing::{
        FailingEmbedder, FailingGenerator, KeywordEmbedder, RecordingGenerator,
        StaticTranscriptSource,
    };
    use crate::embedding::Embedder;
    use crate::generation::Generator;

    fn state_with(embedder: Arc<dyn Embedder>, generator: Arc<dyn Generator>) -> Arc<AppState> {
        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(StaticTranscriptSource::new([(
                "XYZ987",
                "Cats are mammals. Cats sleep a lot.",
            )])),
            embedder,
            generator,
        )
        .unwrap();
        Arc::new(AppState { orchestrator })
    }

    fn state() -> Arc<AppState> {
        state_with(
            Arc::new(KeywordEmbedder::new()),
            Arc::new(RecordingGenerator::new()),
        )
    }

    async fn process(state: &Arc<AppState>, url: &str) -> Result<ProcessVideoResponse, ApiError> {
        process_video(
            State(state.clone()),
            Json(ProcessVideoRequest {
                youtube_url: url.to_string(),
            }),
        )
        .await
        .map(|Json(body)| body)
    }

    async fn error_body(err: ApiError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_process_ask_delete() {
        let state = state();

        let processed = process(&state, "https://www.youtube.com/watch?v=XYZ987")
            .await
            .ok()
            .unwrap();
        assert_eq!(processed.video_id, "XYZ987");
        assert_eq!(processed.title, "Youtube Video");
        assert_eq!(processed.message, "Video processed successfully.");

        let Json(sessions) = list_sessions(State(state.clone())).await;
        assert_eq!(sessions.sessions.len(), 1);
        assert_eq!(sessions.sessions[0].session_id, processed.session_id);

        let Json(qa) = ask_question(
            State(state.clone()),
            Json(AskQuestionRequest {
                session_id: processed.session_id.clone(),
                question: "What are cats?".to_string(),
            }),
        )
        .await
        .ok()
        .unwrap();
        assert_eq!(qa.question, "What are cats?");
        assert!(qa.answer.contains("Cats are mammals."));

        let Json(deleted) = delete_session(State(state.clone()), Path(processed.session_id.clone()))
            .await
            .ok()
            .unwrap();
        assert_eq!(
            deleted.message,
            format!("Session {} deleted successfully.", processed.session_id)
        );

        let err = delete_session(State(state.clone()), Path(processed.session_id))
            .await
            .err()
            .unwrap();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "session_not_found");
    }

    #[tokio::test]
    async fn test_session_list_shape() {
        let state = state();
        let url = "https://www.youtube.com/watch?v=XYZ987&t=5";
        let processed = process(&state, url).await.ok().unwrap();

        let Json(sessions) = list_sessions(State(state)).await;
        let json = serde_json::to_value(&sessions).unwrap();
        let entry = &json["sessions"][0];

        assert_eq!(entry["session_id"], processed.session_id.as_str());
        assert_eq!(entry["video_id"], "XYZ987");
        assert_eq!(entry["url"], url);
        assert_eq!(entry["chunk_count"], 1);
        assert!(entry["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_url_is_bad_request() {
        let err = process(&state(), "https://x/watch?x=1").await.err().unwrap();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "invalid_input");
    }

    #[tokio::test]
    async fn test_captions_disabled_is_not_found() {
        let err = process(&state(), "https://www.youtube.com/watch?v=NOCAPS")
            .await
            .err()
            .unwrap();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "transcript_unavailable");
    }

    #[tokio::test]
    async fn test_indexing_failure_is_bad_gateway() {
        let state = state_with(Arc::new(FailingEmbedder), Arc::new(RecordingGenerator::new()));
        let err = process(&state, "https://www.youtube.com/watch?v=XYZ987")
            .await
            .err()
            .unwrap();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "indexing_failure");

        let Json(sessions) = list_sessions(State(state)).await;
        assert!(sessions.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_is_bad_gateway() {
        let state = state_with(Arc::new(KeywordEmbedder::new()), Arc::new(FailingGenerator));
        let processed = process(&state, "https://www.youtube.com/watch?v=XYZ987")
            .await
            .ok()
            .unwrap();

        let err = ask_question(
            State(state),
            Json(AskQuestionRequest {
                session_id: processed.session_id,
                question: "What are cats?".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "generation_failure");
    }

    #[tokio::test]
    async fn test_transcript_tool_failure_is_bad_gateway() {
        let (status, body) =
            error_body(ApiError(VidqaError::TranscriptUnavailable("rate limited".into()))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "transcript_unavailable");

        let (status, body) = error_body(ApiError(VidqaError::Config("bad".into()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "internal");
    }

    #[tokio::test]
    async fn test_root_message() {
        let Json(body) = root().await;
        assert_eq!(body.message, "Welcome to the Youtube Video Q&A API!");
    }
}
