use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use kambaz_db::models::{Assignment, AssignmentPatch, Role};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, auth::SessionUser, auth::require_role, error::ApiError};

/// Create the assignment routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/api/courses/{courseId}/assignments",
            get(find_assignments_for_course).post(create_assignment),
        )
        .route(
            "/api/courses/assignments/{assignmentId}",
            put(update_assignment).delete(delete_assignment),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AssignmentData {
    title: String,
    description: String,
    points: f64,
    due_date: Option<DateTime<Utc>>,
    available_date: Option<DateTime<Utc>>,
    until_date: Option<DateTime<Utc>>,
}

impl Default for AssignmentData {
    fn default() -> Self {
        Self {
            title: "New Assignment".to_string(),
            description: String::new(),
            points: 100.0,
            due_date: None,
            available_date: None,
            until_date: None,
        }
    }
}

async fn find_assignments_for_course(
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    Ok(Json(state.store.assignments_for_course(course_id).await?))
}

async fn create_assignment(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
    Json(body): Json<AssignmentData>,
) -> Result<Json<Assignment>, ApiError> {
    require_role(
        &session.user,
        &[Role::Faculty, Role::Admin],
        "Only faculty can create assignments",
    )?;

    let assignment = Assignment {
        id: Uuid::new_v4(),
        title: body.title,
        description: body.description,
        course: course_id,
        points: body.points,
        due_date: body.due_date,
        available_date: body.available_date,
        until_date: body.until_date,
    };
    Ok(Json(state.store.create_assignment(assignment).await?))
}

async fn update_assignment(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(assignment_id): Path<Uuid>,
    Json(patch): Json<AssignmentPatch>,
) -> Result<Json<Assignment>, ApiError> {
    require_role(
        &session.user,
        &[Role::Faculty, Role::Admin],
        "Only faculty can update assignments",
    )?;

    let assignment = state
        .store
        .update_assignment(assignment_id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;
    Ok(Json(assignment))
}

async fn delete_assignment(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(assignment_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_role(
        &session.user,
        &[Role::Faculty, Role::Admin],
        "Only faculty can delete assignments",
    )?;

    if !state.store.delete_assignment(assignment_id).await? {
        return Err(ApiError::NotFound("Assignment not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
