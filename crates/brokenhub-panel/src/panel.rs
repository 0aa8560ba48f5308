//! HTTP routes.
//!
//! GET      /            — render the settings form
//! GET|POST /set         — apply submitted fields, save, reload the daemon
//! GET      /api/config  — stored record plus the daemon's reading of it

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::routing::get;
use axum::{Form, Json, Router};

use crate::daemon_view::DaemonView;
use crate::error::PanelError;
use crate::render;
use crate::state::AppState;
use crate::store::ConfigStore;

/// Build the panel router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show_config))
        .route("/set", get(set_without_fields).post(set_from_form))
        .route("/api/config", get(config_json))
}

// ── GET / ───────────────────────────────────────────────────────────

async fn show_config(State(state): State<AppState>) -> Result<Html<String>, PanelError> {
    let record = state.store().load().await?;
    Ok(Html(render::config_page(&record, state.store().path())))
}

// ── GET /api/config ─────────────────────────────────────────────────

async fn config_json(State(state): State<AppState>) -> Result<Json<serde_json::Value>, PanelError> {
    let record = state.store().load().await?;
    let daemon = DaemonView::from_record(&record);

    Ok(Json(serde_json::json!({
        "config": record,
        "daemon": daemon,
        "daemon_loadable": daemon.is_loadable(),
        "daemon_exact": daemon.is_exact(),
    })))
}

// ── GET|POST /set ───────────────────────────────────────────────────

/// POST body fields, in submission order. A body that is not
/// `application/x-www-form-urlencoded` fails before the config is touched.
async fn set_from_form(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Redirect, PanelError> {
    let Form(fields) = form.map_err(|e| PanelError::InvalidForm(e.body_text()))?;
    update(&state, &fields).await
}

/// A GET carries no form body: the stored record is rewritten unchanged and
/// the daemon is still reloaded. Query parameters are ignored.
async fn set_without_fields(State(state): State<AppState>) -> Result<Redirect, PanelError> {
    update(&state, &[]).await
}

async fn update(state: &AppState, submitted: &[(String, String)]) -> Result<Redirect, PanelError> {
    let _guard = state.update_lock().lock().await;

    let existing = state.store().load().await?;
    let merged = ConfigStore::apply_updates(&existing, submitted)?;
    state.store().save(&merged).await?;
    state.reloader().reload().await?;

    let fields: Vec<&str> = submitted.iter().map(|(name, _)| name.as_str()).collect();
    tracing::info!(
        path = %state.store().path().display(),
        fields = ?fields,
        "configuration updated"
    );

    Ok(Redirect::to("/"))
}
