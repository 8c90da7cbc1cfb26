use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use chrono::Utc;
use kambaz_db::models::{Quiz, QuizData, Role};
use serde_json::json;
use uuid::Uuid;

use crate::{ApiState, auth::SessionUser, auth::require_role, error::ApiError};

/// Create the quiz routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/api/courses/{courseId}/quizzes",
            get(find_quizzes_for_course).post(create_quiz),
        )
        .route(
            "/api/courses/quizzes/{quizId}",
            get(find_quiz_by_id).put(update_quiz).delete(delete_quiz),
        )
        .route(
            "/api/courses/quizzes/{quizId}/publish",
            patch(toggle_publish),
        )
}

fn is_student(session: Option<&SessionUser>) -> bool {
    session.is_some_and(|s| s.user.role == Role::Student)
}

/// Faculty and admins see every quiz of the course; students see only
/// published ones.
async fn find_quizzes_for_course(
    session: Option<SessionUser>,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Quiz>>, ApiError> {
    tracing::debug!(%course_id, "fetching quizzes for course");
    let mut quizzes = state.store.quizzes_for_course(course_id).await?;

    if is_student(session.as_ref()) {
        quizzes.retain(|q| q.data.published);
    }

    tracing::debug!(count = quizzes.len(), "found quizzes");
    Ok(Json(quizzes))
}

async fn find_quiz_by_id(
    session: Option<SessionUser>,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<Quiz>, ApiError> {
    let quiz = state
        .store
        .find_quiz(quiz_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;

    if is_student(session.as_ref()) && !quiz.data.published {
        return Err(ApiError::Forbidden("Quiz not available".to_string()));
    }

    Ok(Json(quiz))
}

async fn create_quiz(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
    Json(data): Json<QuizData>,
) -> Result<(StatusCode, Json<Quiz>), ApiError> {
    require_role(&session.user, &[Role::Faculty], "Only faculty can create quizzes")?;

    let quiz = Quiz {
        id: Uuid::new_v4(),
        course: course_id,
        data,
        created_at: Utc::now(),
    };
    let quiz = state.store.create_quiz(quiz).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// The total point value is recomputed server-side as the sum of question
/// points, overriding any client-supplied total.
async fn update_quiz(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
    Json(mut data): Json<QuizData>,
) -> Result<Json<Quiz>, ApiError> {
    require_role(&session.user, &[Role::Faculty], "Only faculty can edit quizzes")?;

    data.points = data.questions.iter().map(|q| q.points).sum();

    let quiz = state
        .store
        .update_quiz(quiz_id, data)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
    Ok(Json(quiz))
}

/// Deleting a quiz cascades to its attempt records.
async fn delete_quiz(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(&session.user, &[Role::Faculty], "Only faculty can delete quizzes")?;

    if !state.store.delete_quiz(quiz_id).await? {
        return Err(ApiError::NotFound("Quiz not found".to_string()));
    }
    let removed = state.store.delete_attempts_for_quiz(quiz_id).await?;
    tracing::debug!(%quiz_id, removed, "deleted quiz and its attempts");

    Ok(Json(json!({ "message": "Quiz deleted successfully" })))
}

async fn toggle_publish(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<Quiz>, ApiError> {
    require_role(&session.user, &[Role::Faculty], "Only faculty can publish quizzes")?;

    let quiz = state
        .store
        .toggle_publish(quiz_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
    Ok(Json(quiz))
}
