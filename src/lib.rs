//! Asset Management Server
//!
//! REST JSON API for tracking company IT assets: which asset is assigned to
//! whom, acceptance of assignments, and the return workflow that frees assets
//! again.

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    /// Kept for readiness probes
    pub pool: Pool<Postgres>,
}
