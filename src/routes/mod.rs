// Route exports
pub mod admin;
pub mod auth;
pub mod community;
pub mod gyms;

use actix_web::web;
use std::sync::Arc;
use crate::core::GymFinder;
use crate::services::{CatalogCache, SessionStore};
use auth::TokenVerifier;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub finder: Arc<GymFinder>,
    pub sessions: Arc<SessionStore>,
    pub catalog: Arc<CatalogCache>,
    pub auth: Arc<TokenVerifier>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(gyms::configure)
            .configure(community::configure)
            .configure(admin::configure),
    );
}
