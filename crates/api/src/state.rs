use std::sync::Arc;

use candor_core::media::MediaStore;
use candor_inference::scoring::FrameScorer;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: candor_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Durable store for uploaded interview videos.
    pub videos: Arc<dyn MediaStore>,
    /// Stage-forward-cleanup workflow for single frames.
    pub frame_scorer: Arc<FrameScorer>,
}
