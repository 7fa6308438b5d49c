use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ComplaintStatus, NewComplaint};
use super::query::{ComplaintFilter, ComplaintStats};
use super::repository::ComplaintStore;
use super::service::{Clock, ComplaintService, ComplaintServiceError};

/// Router builder exposing the complaint operations as JSON endpoints.
pub fn complaint_router<S, C>(service: Arc<ComplaintService<S, C>>) -> Router
where
    S: ComplaintStore + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/api/v1/complaints",
            post(create_handler::<S, C>).get(list_handler::<S, C>),
        )
        .route("/api/v1/complaints/by-email", get(by_email_handler::<S, C>))
        .route("/api/v1/complaints/stats", get(stats_handler::<S, C>))
        .route("/api/v1/complaints/:id", get(show_handler::<S, C>))
        .route(
            "/api/v1/complaints/:id/status",
            patch(update_status_handler::<S, C>),
        )
        .with_state(service)
}

/// Admin list query. `status=all` (or an empty value) disables the status filter.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ListParams {
    fn into_filter(self) -> Result<ComplaintFilter, ComplaintServiceError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(raw.parse::<ComplaintStatus>()?),
        };
        Ok(ComplaintFilter {
            search: self.search,
            status,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailLookup {
    pub customer_email: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

pub(crate) async fn create_handler<S, C>(
    State(service): State<Arc<ComplaintService<S, C>>>,
    input: Result<Json<NewComplaint>, JsonRejection>,
) -> Response
where
    S: ComplaintStore + 'static,
    C: Clock + 'static,
{
    let Json(input) = match input {
        Ok(input) => input,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    match service.create(input) {
        Ok(complaint) => (StatusCode::CREATED, Json(complaint)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<S, C>(
    State(service): State<Arc<ComplaintService<S, C>>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Response
where
    S: ComplaintStore + 'static,
    C: Clock + 'static,
{
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let filter = match params.into_filter() {
        Ok(filter) => filter,
        Err(err) => return error_response(err),
    };
    match service.get_all() {
        Ok(complaints) if filter.is_empty() => (StatusCode::OK, Json(complaints)).into_response(),
        Ok(complaints) => (StatusCode::OK, Json(filter.apply(complaints))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn by_email_handler<S, C>(
    State(service): State<Arc<ComplaintService<S, C>>>,
    lookup: Result<Query<EmailLookup>, QueryRejection>,
) -> Response
where
    S: ComplaintStore + 'static,
    C: Clock + 'static,
{
    let Query(lookup) = match lookup {
        Ok(lookup) => lookup,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    match service.get_by_email(&lookup.customer_email) {
        Ok(complaints) => (StatusCode::OK, Json(complaints)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn stats_handler<S, C>(
    State(service): State<Arc<ComplaintService<S, C>>>,
) -> Response
where
    S: ComplaintStore + 'static,
    C: Clock + 'static,
{
    match service.get_all() {
        Ok(complaints) => {
            let stats = ComplaintStats::from_complaints(&complaints);
            (StatusCode::OK, Json(stats)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// A missing complaint is a normal lookup outcome: 200 with a `null` body.
pub(crate) async fn show_handler<S, C>(
    State(service): State<Arc<ComplaintService<S, C>>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response
where
    S: ComplaintStore + 'static,
    C: Clock + 'static,
{
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    match service.get_by_id(id) {
        Ok(complaint) => (StatusCode::OK, Json(complaint)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_status_handler<S, C>(
    State(service): State<Arc<ComplaintService<S, C>>>,
    id: Result<Path<i64>, PathRejection>,
    update: Result<Json<StatusUpdate>, JsonRejection>,
) -> Response
where
    S: ComplaintStore + 'static,
    C: Clock + 'static,
{
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let Json(update) = match update {
        Ok(update) => update,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    match service.update_status_str(id, &update.status) {
        Ok(complaint) => (StatusCode::OK, Json(complaint)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Malformed requests keep axum's status but answer with the same JSON shape as
/// domain errors.
fn rejection_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn error_response(err: ComplaintServiceError) -> Response {
    match err {
        ComplaintServiceError::Validation(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        ComplaintServiceError::NotFound { id } => {
            let payload = json!({
                "error": format!("complaint with id {id} not found"),
                "id": id,
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        ComplaintServiceError::Storage(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
