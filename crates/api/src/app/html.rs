//! Server-rendered pages.
//!
//! Templates are compiled into the binary and rendered with Tera; every
//! template name ends in `.html`, so interpolated values are HTML-escaped.
//! Flash messages travel in the redirect's query string
//! (`?flash=...&level=success|error`) instead of a session.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use stockroom_core::DomainError;

use crate::app::errors;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("view.html", include_str!("../../templates/view.html")),
    ("edit.html", include_str!("../../templates/edit.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

/// One-shot status message shown at the top of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub message: String,
    pub level: FlashLevel,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: FlashLevel::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: FlashLevel::Error,
        }
    }
}

/// Query parameters a redirect target reads its flash from.
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub flash: Option<String>,
    pub level: Option<String>,
}

impl FlashQuery {
    pub fn into_flash(self) -> Option<Flash> {
        let message = self.flash.filter(|m| !m.trim().is_empty())?;
        Some(match self.level.as_deref() {
            Some("error") => Flash::error(message),
            _ => Flash::success(message),
        })
    }
}

/// 303 to `path` carrying `flash` in the query string.
pub fn redirect_with_flash(path: &str, flash: &Flash) -> Response {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("flash", &flash.message)
        .append_pair("level", flash.level.as_str())
        .finish();
    Redirect::to(&format!("{path}?{query}")).into_response()
}

/// Compiled page templates.
#[derive(Debug)]
pub struct Pages {
    tera: Tera,
}

impl Pages {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    /// Render `template` with `context`, adding `flash` (possibly empty).
    pub fn render(&self, status: StatusCode, template: &str, mut context: Context, flash: Option<Flash>) -> Response {
        context.insert("flash", &flash);
        match self.tera.render(template, &context) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!(template, error = %e, "template rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }

    pub fn error_page(&self, status: StatusCode, message: &str) -> Response {
        let mut context = Context::new();
        context.insert("status", &status.as_u16());
        context.insert("reason", status.canonical_reason().unwrap_or("Error"));
        context.insert("message", message);
        self.render(status, "error.html", context, None)
    }

    pub fn not_found(&self, message: &str) -> Response {
        self.error_page(StatusCode::NOT_FOUND, message)
    }

    /// Response for a failed form submission: validation failures go back to
    /// `back_to` as an error flash, missing entities get the 404 page, backend
    /// failures the 500 page.
    pub fn form_failure(&self, err: DomainError, back_to: &str) -> Response {
        let status = errors::status_for(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, "form submission failed");
            return self.error_page(status, &errors::public_message(&err));
        }
        tracing::info!(error = %err, status = status.as_u16(), "form submission rejected");
        if err.is_not_found() {
            return self.not_found(&err.to_string());
        }
        redirect_with_flash(back_to, &Flash::error(err.to_string()))
    }
}
