use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use std::sync::Arc;

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route(handlers::STATS_PATH, get(handlers::get_stats))
        .route(handlers::REGISTER_PATH, post(handlers::register))
        .route(handlers::LOGIN_PATH, post(handlers::admin_login))
        .route(handlers::EXPORT_PATH, get(handlers::admin_export))
        .route(handlers::CLEAR_TODAY_PATH, delete(handlers::clear_today))
        .layer(Extension(service))
}
