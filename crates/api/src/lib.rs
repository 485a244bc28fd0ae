//! HTTP API: JSON endpoints, server-rendered pages, and request/response mapping.

pub mod app;
pub mod middleware;
