use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::RagError;
use crate::rag::Rag;

pub type AppState = Arc<Rag>;

#[derive(Debug)]
pub enum AppError {
    NotReady(String),
    Upstream(String),
    Internal(String),
}

impl From<RagError> for AppError {
    fn from(e: RagError) -> Self {
        match e {
            RagError::EmptyIndex => AppError::NotReady(e.to_string()),
            RagError::Embedding(_) | RagError::Chat(_) => AppError::Upstream(e.to_string()),
            RagError::Store(_) | RagError::Encoding(_) | RagError::Io(_) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotReady(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        error!(status = status.as_u16(), "{}", message);
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Deserialize)]
struct RagParams {
    query: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/rag", post(ask))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "200": "Okay" }))
}

/// Answer as a JSON string, or `null` for `exit`.
async fn ask(
    State(rag): State<AppState>,
    Query(params): Query<RagParams>,
) -> Result<Json<Option<String>>, AppError> {
    Ok(Json(rag.answer(&params.query).await?))
}

pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::rag::chunker::Chunk;
    use crate::rag::embeddings::testing::{letters, LetterEmbedder};
    use crate::rag::index::VectorIndex;
    use crate::rag::testing::ScriptedChat;

    fn app(index: VectorIndex) -> Router {
        router(Arc::new(Rag::new(
            Box::new(LetterEmbedder),
            Box::new(ScriptedChat::replying("It is typed.")),
            index,
            2,
        )))
    }

    fn one_chunk() -> VectorIndex {
        let mut index = VectorIndex::default();
        index.push(
            Chunk {
                url: "https://d.io/".into(),
                title: None,
                index: 0,
                text: "type hints".into(),
            },
            letters("type hints"),
        );
        index
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn health_check() {
        let (status, body) = call(app(one_chunk()), "GET", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "200": "Okay" }));
    }

    #[tokio::test]
    async fn rag_answers() {
        let (status, body) = call(app(one_chunk()), "POST", "/api/rag?query=what%20types").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!("Answer : It is typed."));
    }

    #[tokio::test]
    async fn exit_is_null() {
        let (status, body) = call(app(one_chunk()), "POST", "/api/rag?query=exit").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn empty_index_unavailable() {
        let (status, body) = call(app(VectorIndex::default()), "POST", "/api/rag?query=hi").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn missing_query_rejected() {
        let (status, _) = call(app(one_chunk()), "POST", "/api/rag").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
