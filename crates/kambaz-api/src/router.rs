use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};

use crate::{assignment, attempt, course, enrollment, module, quiz, state::ApiState, user};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .merge(user::routes())
        .merge(course::routes())
        .merge(module::routes())
        .merge(assignment::routes())
        .merge(enrollment::routes())
        .merge(quiz::routes())
        .merge(attempt::routes())
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
