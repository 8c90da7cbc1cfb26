use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use kambaz_db::models::{Course, CoursePatch, User};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    ApiState,
    auth::{SessionUser, resolve_user_id},
    error::ApiError,
};

/// Create the course routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/api/courses", get(find_all_courses))
        // The static `current` segment must carry its own GET: the router
        // prefers it over the `{userId}` pattern for every method.
        .route(
            "/api/users/current/courses",
            post(create_course).get(find_courses_for_current),
        )
        .route("/api/users/{userId}/courses", get(find_courses_for_user))
        .route(
            "/api/courses/{courseId}",
            put(update_course).delete(delete_course),
        )
        .route("/api/courses/{courseId}/users", get(find_users_for_course))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CourseData {
    name: String,
    number: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    department: String,
    credits: i32,
    description: String,
}

impl Default for CourseData {
    fn default() -> Self {
        Self {
            name: "New Course".to_string(),
            number: String::new(),
            start_date: None,
            end_date: None,
            department: String::new(),
            credits: 0,
            description: String::new(),
        }
    }
}

async fn find_all_courses(State(state): State<ApiState>) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.store.all_courses().await?))
}

/// Creating a course also enrolls the creator in it.
async fn create_course(
    session: SessionUser,
    State(state): State<ApiState>,
    Json(body): Json<CourseData>,
) -> Result<Json<Course>, ApiError> {
    let course = Course {
        id: Uuid::new_v4(),
        name: body.name,
        number: body.number,
        start_date: body.start_date,
        end_date: body.end_date,
        department: body.department,
        credits: body.credits,
        description: body.description,
    };
    let course = state.store.create_course(course).await?;
    state.store.enroll(session.user.id, course.id).await?;
    Ok(Json(course))
}

async fn find_courses_for_user(
    session: Option<SessionUser>,
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let user_id = resolve_user_id(&user_id, session.as_ref())?;
    Ok(Json(state.store.courses_for_user(user_id).await?))
}

async fn find_courses_for_current(
    session: SessionUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.store.courses_for_user(session.user.id).await?))
}

async fn update_course(
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
    Json(patch): Json<CoursePatch>,
) -> Result<Json<Course>, ApiError> {
    let course = state
        .store
        .update_course(course_id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;
    Ok(Json(course))
}

/// Enrollments referencing the course are removed first, so no dangling
/// enrollment records survive the deletion.
async fn delete_course(
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.store.find_course(course_id).await?.is_none() {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    state.store.delete_enrollments_for_course(course_id).await?;
    state.store.delete_course(course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Enrolled users for a course. Enrollments whose user no longer resolves are
/// skipped.
async fn find_users_for_course(
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<User>>, ApiError> {
    let enrollments = state.store.enrollments_for_course(course_id).await?;

    let mut users = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        if let Some(user) = state.store.find_user(enrollment.user).await? {
            users.push(user);
        }
    }
    Ok(Json(users))
}
