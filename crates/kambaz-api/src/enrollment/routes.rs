use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use kambaz_db::models::Enrollment;
use uuid::Uuid;

use crate::{
    ApiState,
    auth::{SessionUser, resolve_user_id},
    error::ApiError,
};

/// Create the enrollment routes
pub fn routes() -> Router<ApiState> {
    Router::new().route(
        "/api/users/{userId}/courses/{courseId}",
        post(enroll_user_in_course).delete(unenroll_user_from_course),
    )
}

async fn enroll_user_in_course(
    session: Option<SessionUser>,
    State(state): State<ApiState>,
    Path((user_id, course_id)): Path<(String, Uuid)>,
) -> Result<Json<Enrollment>, ApiError> {
    let user_id = resolve_user_id(&user_id, session.as_ref())?;
    Ok(Json(state.store.enroll(user_id, course_id).await?))
}

async fn unenroll_user_from_course(
    session: Option<SessionUser>,
    State(state): State<ApiState>,
    Path((user_id, course_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let user_id = resolve_user_id(&user_id, session.as_ref())?;
    state.store.unenroll(user_id, course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
