//! Dashboard schedule page — recurring events and the add-event form.

use askama::Template;
use axum::Form;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use homeauto_app::hub::EventSpec;
use homeauto_domain::schedule::Recurrence;

use super::{Choice, device_choices, field, format_duration, target_label};
use crate::state::AppState;

/// One row of the events table.
pub struct EventRow {
    pub index: usize,
    pub device: String,
    pub recurrence: String,
    pub start: String,
    pub end: String,
    pub duration: String,
}

/// Schedule page template.
#[derive(Template)]
#[template(path = "schedule.html")]
pub struct ScheduleTemplate {
    events: Vec<EventRow>,
    devices: Vec<Choice>,
    recurrences: Vec<Choice>,
}

impl IntoResponse for ScheduleTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

impl ScheduleTemplate {
    fn render(state: &AppState) -> Self {
        let (devices, events) = {
            let guard = state.hub.lock();
            (guard.devices.to_vec(), guard.schedule.events().to_vec())
        };

        let events = events
            .iter()
            .enumerate()
            .map(|(index, ev)| EventRow {
                index,
                device: target_label(&devices, ev.target),
                recurrence: ev.recurrence.to_string(),
                start: ev.start.to_string(),
                end: ev.end().to_string(),
                duration: format_duration(ev.duration_minutes),
            })
            .collect();

        Self {
            events,
            devices: device_choices(&devices),
            recurrences: Recurrence::ALL
                .iter()
                .map(|r| Choice::new(r.code(), r.to_string()))
                .collect(),
        }
    }
}

/// Fields of the add-event form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub pluglist: Option<String>,
    pub hour: Option<String>,
    pub minute: Option<String>,
    pub duration: Option<String>,
    pub repeat: Option<String>,
}

impl EventForm {
    fn to_spec(&self) -> Option<EventSpec> {
        Some(EventSpec {
            target: field(self.pluglist.as_deref())?,
            hour: field(self.hour.as_deref())?,
            minute: field(self.minute.as_deref())?,
            duration_minutes: field(self.duration.as_deref())?,
            recurrence: field(self.repeat.as_deref())?,
        })
    }
}

/// Response from the delete form handler (PRG pattern).
pub enum RemoveResponse {
    /// Redirect back to the schedule page.
    Redirect(Redirect),
}

impl IntoResponse for RemoveResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(redirect) => redirect.into_response(),
        }
    }
}

/// `GET /schedule`
pub async fn page(State(state): State<AppState>) -> ScheduleTemplate {
    ScheduleTemplate::render(&state)
}

/// `POST /addevent` — add an event, then show the schedule page again.
pub async fn add(State(state): State<AppState>, Form(form): Form<EventForm>) -> ScheduleTemplate {
    match form.to_spec() {
        Some(spec) => {
            state.hub.add_events(spec);
        }
        None => tracing::debug!(?form, "ignoring unparseable event form"),
    }
    ScheduleTemplate::render(&state)
}

/// `POST /schedule/{index}/delete`
pub async fn remove(State(state): State<AppState>, Path(index): Path<usize>) -> RemoveResponse {
    state.hub.delete_event(index);
    RemoveResponse::Redirect(Redirect::to("/schedule"))
}
