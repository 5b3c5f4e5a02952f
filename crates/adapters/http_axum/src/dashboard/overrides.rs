//! Dashboard overrides page — one-shot exceptions and the add form.

use askama::Template;
use axum::Form;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use homeauto_app::hub::OverrideSpec;
use homeauto_domain::device::SwitchState;
use homeauto_domain::schedule::Override;
use homeauto_domain::time::{self, Timestamp};

use super::{Choice, device_choices, field, format_duration, target_label};
use crate::state::AppState;

/// One row of the overrides table.
pub struct OverrideRow {
    pub index: usize,
    pub device: String,
    pub state: String,
    pub start: String,
    pub duration: String,
    pub status: &'static str,
}

fn status(item: &Override, now: Timestamp) -> &'static str {
    if item.is_active(now) {
        "active"
    } else if item.is_expired(now) {
        "expired"
    } else {
        "pending"
    }
}

/// Overrides page template.
#[derive(Template)]
#[template(path = "overrides.html")]
pub struct OverridesTemplate {
    overrides: Vec<OverrideRow>,
    devices: Vec<Choice>,
}

impl IntoResponse for OverridesTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

/// `GET /overrides`
pub async fn page(State(state): State<AppState>) -> OverridesTemplate {
    let (devices, overrides) = {
        let guard = state.hub.lock();
        (guard.devices.to_vec(), guard.schedule.overrides().to_vec())
    };
    let now = time::now();

    let overrides = overrides
        .iter()
        .enumerate()
        .map(|(index, item)| OverrideRow {
            index,
            device: target_label(&devices, item.target),
            state: item.target_state.to_string(),
            start: item.start().map_or_else(
                || item.start_epoch.to_string(),
                |ts| ts.format("%Y-%m-%d %H:%M UTC").to_string(),
            ),
            duration: format_duration(item.duration_minutes),
            status: status(item, now),
        })
        .collect();

    OverridesTemplate {
        overrides,
        devices: device_choices(&devices),
    }
}

/// Fields of the add-override form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OverrideForm {
    pub pluglist: Option<String>,
    /// Minutes from now.
    pub offset: Option<String>,
    pub duration: Option<String>,
    pub state: Option<String>,
}

impl OverrideForm {
    fn to_spec(&self) -> Option<OverrideSpec> {
        Some(OverrideSpec {
            target: field(self.pluglist.as_deref())?,
            offset_minutes: field(self.offset.as_deref()).unwrap_or(0),
            duration_minutes: field(self.duration.as_deref())?,
            state: field::<SwitchState>(self.state.as_deref())?,
        })
    }
}

/// Response from the form handlers (PRG pattern).
pub enum FormResponse {
    /// Redirect back to the overrides page.
    Redirect(Redirect),
}

impl IntoResponse for FormResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(redirect) => redirect.into_response(),
        }
    }
}

/// `POST /overrides`
pub async fn add(State(state): State<AppState>, Form(form): Form<OverrideForm>) -> FormResponse {
    match form.to_spec() {
        Some(spec) => {
            state.hub.add_override(spec);
        }
        None => tracing::debug!(?form, "ignoring unparseable override form"),
    }
    FormResponse::Redirect(Redirect::to("/overrides"))
}

/// `POST /overrides/{index}/delete`
pub async fn remove(State(state): State<AppState>, Path(index): Path<usize>) -> FormResponse {
    state.hub.delete_override(index);
    FormResponse::Redirect(Redirect::to("/overrides"))
}
