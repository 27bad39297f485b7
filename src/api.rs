//! HTTP read endpoints.
//!
//! Poll queries go through the same visibility filter as broadcasts.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppState;
use crate::error::PollError;
use crate::protocol::ServerMessage;
use crate::types::VoterId;
use crate::visibility::project;

#[derive(Debug, Deserialize)]
pub struct PollQuery {
    pub voter_id: Option<VoterId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub polls: usize,
    pub connections: usize,
}

/// Fetch the visible projection of a poll.
///
/// GET /api/polls/{poll_id}?voter_id=...
pub async fn get_poll(
    State(state): State<Arc<AppState>>,
    Path(poll_id): Path<String>,
    Query(query): Query<PollQuery>,
) -> Response {
    match state.broker.store().get(&poll_id).await {
        Some(poll) => Json(project(&poll, query.voter_id.as_deref())).into_response(),
        None => {
            let body: ServerMessage = PollError::NotFound(poll_id).into();
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
    }
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        polls: state.broker.store().len().await,
        connections: state.broker.connection_count().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{router, AppState};
    use crate::config::ServerConfig;
    use crate::store::test_support::*;
    use crate::types::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_get_poll_is_filtered() {
        let state = Arc::new(AppState::new(ServerConfig::default()));
        let store = state.broker.store();
        let poll = store
            .create(
                choice_spec("Dinner?", &["Pizza", "Sushi"], RevealTrigger::Manual),
                "conn-1",
            )
            .await
            .unwrap();
        store
            .upsert_vote(&poll.id, "ana", "Ana", Answer::Text("Pizza".into()))
            .await
            .unwrap();
        store
            .upsert_vote(&poll.id, "ben", "Ben", Answer::Text("Sushi".into()))
            .await
            .unwrap();

        let (status, body) =
            get_json(state.clone(), &format!("/api/polls/{}?voter_id=ana", poll.id)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "waiting");
        assert_eq!(body["vote_count"], 2);
        assert_eq!(body["own_vote"]["answer"], "Pizza");
        assert!(body["votes"][1].get("answer").is_none());
        assert!(body.get("results").is_none());
    }

    #[tokio::test]
    async fn test_get_revealed_poll_has_results() {
        let state = Arc::new(AppState::new(ServerConfig::default()));
        let store = state.broker.store();
        let poll = store
            .create(
                choice_spec("Dinner?", &["Pizza", "Sushi"], RevealTrigger::Manual),
                "conn-1",
            )
            .await
            .unwrap();
        store
            .upsert_vote(&poll.id, "ana", "Ana", Answer::Text("Pizza".into()))
            .await
            .unwrap();
        store.reveal(&poll.id).await.unwrap();

        let (status, body) = get_json(state.clone(), &format!("/api/polls/{}", poll.id)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["votes"][0]["answer"], "Pizza");
        assert_eq!(body["results"]["winners"][0], "Pizza");
        assert_eq!(body["results"]["tie"], false);
    }

    #[tokio::test]
    async fn test_get_missing_poll() {
        let state = Arc::new(AppState::new(ServerConfig::default()));
        let (status, body) = get_json(state, "/api/polls/ffffff").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "POLL_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_health() {
        let state = Arc::new(AppState::new(ServerConfig::default()));
        state
            .broker
            .store()
            .create(text_spec(RevealTrigger::Manual), "c")
            .await
            .unwrap();

        let (status, body) = get_json(state, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["polls"], 1);
    }
}
