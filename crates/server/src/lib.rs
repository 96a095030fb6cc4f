use std::str::FromStr;

use api_types::{Envelope, Numeric};
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod budgets;
mod dashboard;
mod projects;
mod quotation;
mod resources;
mod server;
mod tasks;
mod views;

pub mod types {
    pub mod project {
        pub use api_types::project::{ProjectBudgetSummary, ProjectNew, ProjectStats, ProjectView};
    }

    pub mod task {
        pub use api_types::task::{TaskBudget, TaskCost, TaskDeleted, TaskNew, TaskView};
    }

    pub mod budget {
        pub use api_types::budget::{BudgetCreated, BudgetNew, BudgetUpdate, BudgetView};
    }

    pub mod dashboard {
        pub use api_types::dashboard::{DashboardQuery, DashboardStats, Timeline, TimelineQuery};
    }

    pub mod quotation {
        pub use api_types::quotation::{Quotation, QuotationQuery};
    }
}

/// Successful handler output, wrapped in the response envelope.
type Reply<T> = Result<Json<Envelope<T>>, ServerError>;

fn ok<T>(data: T) -> Reply<T> {
    Ok(Json(Envelope::ok(data)))
}

fn ok_with<T>(message: &str, data: T) -> Reply<T> {
    Ok(Json(Envelope::with_message(message, data)))
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };
        let error = status.canonical_reason().unwrap_or("Error");

        (status, Json(Envelope::failure(message, error))).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Reads a numeric request field, rejecting text that is not a number.
fn number(value: &Numeric, field: &str) -> Result<f64, ServerError> {
    value
        .value()
        .ok_or_else(|| ServerError::Generic(format!("{field} must be a number")))
}

fn optional_number(value: Option<&Numeric>, field: &str) -> Result<Option<f64>, ServerError> {
    value.map(|value| number(value, field)).transpose()
}

/// Parses an enum carried as text on the wire.
fn parse<E>(value: Option<&str>) -> Result<Option<E>, ServerError>
where
    E: FromStr<Err = EngineError>,
{
    Ok(value.map(str::parse::<E>).transpose()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound("task not found".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_database_maps_to_500() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("disk full".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn failures_use_the_envelope() {
        let res = ServerError::from(EngineError::NotFound("task not found".to_string()))
            .into_response();
        let body = res.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "message": "task not found",
                "error": "Not Found",
            })
        );
    }

    #[test]
    fn database_details_stay_private() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("disk full".to_string()));
        assert_eq!(message_for_engine_error(err), "internal server error");
    }

    #[test]
    fn numeric_fields_reject_text() {
        assert_eq!(number(&Numeric::Text("12.5".to_string()), "amount").unwrap(), 12.5);
        assert!(number(&Numeric::Text("twelve".to_string()), "amount").is_err());
        assert_eq!(optional_number(None, "amount").unwrap(), None);
    }

    #[test]
    fn enums_parse_from_wire_values() {
        let status: Option<engine::TaskStatus> = parse(Some("in_progress")).unwrap();
        assert_eq!(status, Some(engine::TaskStatus::InProgress));
        assert!(parse::<engine::TaskStatus>(Some("done")).is_err());
    }
}
