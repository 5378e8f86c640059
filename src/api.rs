//! HTTP surface for the student registry.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /students` – Create a student. Any `id` in the body is ignored; returns `201` with
//!   the stored record.
//! - `GET /students` – List every stored student (possibly empty).
//! - `GET /students/:id` – Fetch one student.
//! - `PUT /students/:id` – Replace a student's `name`, `age`, and `email`.
//! - `DELETE /students/:id` – Remove a student; returns `204`.
//! - `GET /students/:id/summary` – Plain-text summary produced by the configured model.
//! - `GET /metrics` – Registry counters and the current record count.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Bodies are decoded from raw bytes so that malformed JSON or mistyped fields surface as `400`
//! with a plain-text message. Missing fields take their zero value.

use crate::metrics::MetricsSnapshot;
use crate::records::{RecordApi, RecordError, Student, StudentId, decode_fields, parse_student_id};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the student API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: RecordApi + 'static,
{
    Router::new()
        .route(
            "/students",
            get(list_students::<S>).post(create_student::<S>),
        )
        .route(
            "/students/:id",
            get(get_student::<S>)
                .put(update_student::<S>)
                .delete(delete_student::<S>),
        )
        .route("/students/:id/summary", get(get_student_summary::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

async fn create_student<S>(
    State(service): State<Arc<S>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Student>), AppError>
where
    S: RecordApi,
{
    let fields = decode_fields(&body)?;
    Ok((StatusCode::CREATED, Json(service.create(fields))))
}

async fn list_students<S>(State(service): State<Arc<S>>) -> Json<Vec<Student>>
where
    S: RecordApi,
{
    Json(service.list())
}

async fn get_student<S>(
    State(service): State<Arc<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Student>, AppError>
where
    S: RecordApi,
{
    let id = parse_student_id(&raw_id)?;
    Ok(Json(service.get(id)?))
}

/// Replace a student's fields.
///
/// The identifier is validated before the body so that `/students/abc` with a bad payload
/// reports the identifier problem.
async fn update_student<S>(
    State(service): State<Arc<S>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Student>, AppError>
where
    S: RecordApi,
{
    let id = parse_student_id(&raw_id)?;
    let fields = decode_fields(&body)?;
    Ok(Json(service.update(id, fields)?))
}

async fn delete_student<S>(
    State(service): State<Arc<S>>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    S: RecordApi,
{
    let id = parse_student_id(&raw_id)?;
    service.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Return a plain-text summary of the student.
///
/// The record is fetched and the store released before the collaborator is called, so a slow
/// model never stalls other requests.
async fn get_student_summary<S>(
    State(service): State<Arc<S>>,
    Path(raw_id): Path<String>,
) -> Result<String, AppError>
where
    S: RecordApi,
{
    let id: StudentId = parse_student_id(&raw_id)?;
    Ok(service.summarize(id).await?)
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    students_stored: usize,
    #[serde(flatten)]
    counters: MetricsSnapshot,
}

async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsResponse>
where
    S: RecordApi,
{
    Json(MetricsResponse {
        students_stored: service.stored_count(),
        counters: service.metrics_snapshot(),
    })
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    let student_example = json!({
        "name": "Ann",
        "age": 20,
        "email": "a@x.com"
    });
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "create_student",
                method: "POST",
                path: "/students",
                description: "Store a new student. Response returns the record with its assigned \"id\".",
                request_example: Some(student_example.clone()),
            },
            CommandDescriptor {
                name: "list_students",
                method: "GET",
                path: "/students",
                description: "Return every stored student as a JSON array.",
                request_example: None,
            },
            CommandDescriptor {
                name: "get_student",
                method: "GET",
                path: "/students/{id}",
                description: "Return a single student by id.",
                request_example: None,
            },
            CommandDescriptor {
                name: "update_student",
                method: "PUT",
                path: "/students/{id}",
                description: "Replace name, age, and email of an existing student. The id never changes.",
                request_example: Some(student_example),
            },
            CommandDescriptor {
                name: "delete_student",
                method: "DELETE",
                path: "/students/{id}",
                description: "Remove a student. Ids are never reused.",
                request_example: None,
            },
            CommandDescriptor {
                name: "summarize_student",
                method: "GET",
                path: "/students/{id}/summary",
                description: "Return a plain-text summary generated by the configured model.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return registry counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

struct AppError(RecordError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RecordError::MalformedInput(_) | RecordError::InvalidIdentifier(_) => {
                StatusCode::BAD_REQUEST
            }
            RecordError::NotFound(_) => StatusCode::NOT_FOUND,
            RecordError::SummaryUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::debug!(status = status.as_u16(), error = %self.0, "Request rejected");
        (status, self.0.to_string()).into_response()
    }
}

impl From<RecordError> for AppError {
    fn from(inner: RecordError) -> Self {
        Self(inner)
    }
}
