//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the shared service handle
//! - `routes/`: HTTP routes + handlers (JSON endpoints and HTML pages)
//! - `dto.rs`: request body extraction and JSON response shapes
//! - `html.rs`: page templates, flash messages, redirects
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod html;
pub mod routes;
pub mod services;

pub use services::{build_services, AppServices};

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
///
/// Fails only if the embedded page templates do not parse.
pub fn build_app(services: AppServices) -> Result<Router, tera::Error> {
    let services = Arc::new(services);
    let pages = Arc::new(html::Pages::new()?);

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_id))
                .layer(Extension(services))
                .layer(Extension(pages)),
        ))
}
