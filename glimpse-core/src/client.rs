//! Collection-service client — the session's three remote collaborators
//!
//! One HTTP service fills all three roles the controller depends on:
//! - **Image source** — `start_game` issues a session id and a masked puzzle
//! - **Turn recorder** — `record_turn` durably logs one committed reveal
//! - **Session finalizer** — `end_game` accepts the trajectory and final guess
//!
//! All three are JSON over POST. A failed call is reported once and never
//! retried; the controller decides what survives it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::CollectorConfig;

// ============================================================================
// CollectorBackend trait
// ============================================================================

/// Abstraction over the collection service, so the session controller can be
/// driven against an in-memory double in tests.
#[async_trait]
pub trait CollectorBackend: Send + Sync {
    /// Open a new game session for `user_id`, returning the session id and
    /// the flattened puzzle image.
    async fn start_game(&self, user_id: &str) -> Result<StartGameResponse, ApiError>;

    /// Durably record one committed turn.
    async fn record_turn(&self, turn: &RecordTurnRequest) -> Result<(), ApiError>;

    /// Close the session with the final guess and the full trajectory.
    async fn end_game(&self, summary: &EndGameRequest) -> Result<(), ApiError>;
}

// ============================================================================
// Error types
// ============================================================================

/// Collection-service call errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service error ({status}): {message}")]
    Api { status: u16, message: String },
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct StartGameRequest<'a> {
    user_id: &'a str,
}

/// Response to `start_game`. The service also reports fields the client must
/// not act on (notably the true label); serde drops them here.
#[derive(Debug, Deserialize)]
pub struct StartGameResponse {
    pub game_id: String,
    pub image: Vec<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordTurnRequest {
    pub game_id: String,
    pub turn_number: u32,
    pub pixel_row: usize,
    pub pixel_col: usize,
    pub probability_distribution: Vec<f64>,
    pub thought_process: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndGameRequest {
    pub game_id: String,
    pub final_guess: usize,
    pub num_turns: u32,
    pub trajectory: Vec<(usize, usize)>,
    pub thought_trajectory: Vec<String>,
    pub probability_distribution_trajectory: Vec<Vec<f64>>,
}

// ============================================================================
// HttpCollectorClient
// ============================================================================

/// Reqwest-backed [`CollectorBackend`] talking to the collection service.
#[derive(Debug, Clone)]
pub struct HttpCollectorClient {
    client: Client,
    base_url: String,
}

impl HttpCollectorClient {
    pub fn new(config: &CollectorConfig) -> Result<Self, ApiError> {
        Self::with_base_url(config.base_url.clone(), config.timeout_seconds)
    }

    /// Create a client against an explicit base URL (for testing / integration)
    pub fn with_base_url(
        base_url: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}/api/{}", self.base_url, endpoint);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                endpoint,
                status = status.as_u16(),
                message = %message,
                "Collection service call failed"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl CollectorBackend for HttpCollectorClient {
    async fn start_game(&self, user_id: &str) -> Result<StartGameResponse, ApiError> {
        let response = self
            .post_json("start_game", &StartGameRequest { user_id })
            .await?;
        Ok(response.json().await?)
    }

    async fn record_turn(&self, turn: &RecordTurnRequest) -> Result<(), ApiError> {
        self.post_json("record_turn", turn).await?;
        Ok(())
    }

    async fn end_game(&self, summary: &EndGameRequest) -> Result<(), ApiError> {
        self.post_json("end_game", summary).await?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
