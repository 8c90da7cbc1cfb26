use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use kambaz_db::models::{QuizAttempt, Role};
use serde::Deserialize;
use uuid::Uuid;

use super::grading::{SubmittedAnswer, grade_submission};
use crate::{ApiState, auth::SessionUser, auth::require_role, error::ApiError};

/// Create the quiz attempt routes
pub fn routes() -> Router<ApiState> {
    Router::new().route(
        "/api/courses/quizzes/{quizId}/attempts",
        get(find_my_attempts).post(submit_attempt),
    )
}

#[derive(Debug, Deserialize)]
struct AttemptSubmission {
    answers: Vec<SubmittedAnswer>,
}

/// The session user's own attempts on a quiz, newest first.
async fn find_my_attempts(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<Vec<QuizAttempt>>, ApiError> {
    let attempts = state
        .store
        .attempts_for_student(quiz_id, session.user.id)
        .await?;
    Ok(Json(attempts))
}

/// Grade a submission and persist one immutable attempt record.
///
/// Checks run in a fixed order: authentication (extractor), role, quiz
/// existence, published flag, attempt limit. The record is assembled fully in
/// memory after scoring and written once; a racing submission that lands on
/// the same attempt number is rejected by the store's uniqueness constraint.
async fn submit_attempt(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
    Json(body): Json<AttemptSubmission>,
) -> Result<(StatusCode, Json<QuizAttempt>), ApiError> {
    require_role(
        &session.user,
        &[Role::Student],
        "Only students can submit attempts",
    )?;

    let quiz = state
        .store
        .find_quiz(quiz_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;

    if !quiz.data.published {
        return Err(ApiError::Forbidden("Quiz is not available".to_string()));
    }

    let existing = state
        .store
        .count_submitted_attempts(quiz_id, session.user.id)
        .await?;
    if existing >= i64::from(quiz.data.how_many_attempts) {
        return Err(ApiError::Forbidden("Maximum attempts reached".to_string()));
    }

    let outcome = grade_submission(&quiz, &body.answers);
    let now = Utc::now();
    let attempt = QuizAttempt {
        id: Uuid::new_v4(),
        quiz: quiz_id,
        student: session.user.id,
        attempt_number: existing as i32 + 1,
        answers: outcome.answers,
        score: outcome.score,
        total_points: quiz.data.points,
        submitted: true,
        submitted_at: Some(now),
        created_at: now,
    };
    let attempt = state.store.create_attempt(attempt).await?;

    tracing::debug!(
        %quiz_id,
        student = %attempt.student,
        attempt_number = attempt.attempt_number,
        score = attempt.score,
        "graded quiz attempt"
    );
    Ok((StatusCode::CREATED, Json(attempt)))
}
