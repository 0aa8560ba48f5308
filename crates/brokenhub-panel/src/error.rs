//! Failures of the load / apply / save / reload cycle.
//!
//! Every variant aborts the remaining steps of an update and is surfaced to
//! the client as a `500` with a JSON body naming the failure kind.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("config file {} is unreadable: {reason}", .path.display())]
    ConfigUnreadable { path: PathBuf, reason: String },
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("unreadable form submission: {0}")]
    InvalidForm(String),
    #[error("failed to write config file {}: {reason}", .path.display())]
    ConfigWriteFailed { path: PathBuf, reason: String },
    #[error("reload command failed ({}): {output}", exit_label(.status))]
    ReloadFailed {
        /// Exit code, or `None` if the command never ran to completion.
        status: Option<i32>,
        output: String,
    },
}

impl PanelError {
    /// Stable identifier used in error response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PanelError::ConfigUnreadable { .. } => "config_unreadable",
            PanelError::UnknownField(_) => "unknown_field",
            PanelError::InvalidForm(_) => "invalid_form",
            PanelError::ConfigWriteFailed { .. } => "config_write_failed",
            PanelError::ReloadFailed { .. } => "reload_failed",
        }
    }
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "did not exit".into(),
    }
}

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        tracing::warn!(kind = self.kind(), error = %self, "request failed");

        let message = match &self {
            PanelError::ReloadFailed { .. } => {
                format!("configuration saved but not active: {self}")
            }
            _ => self.to_string(),
        };
        let body = serde_json::json!({ "error": self.kind(), "message": message });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
