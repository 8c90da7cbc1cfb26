use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::PrivateCookieJar;
use chrono::Utc;
use kambaz_db::models::{Role, User, UserPatch};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    ApiState,
    auth::{
        SessionUser,
        cookies::{clear_session_cookie, create_session_cookie},
        require_role,
    },
    error::ApiError,
    validation,
};

/// Create the user and account routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/api/users/signup", post(signup))
        .route("/api/users/signin", post(signin))
        .route("/api/users/signout", post(signout))
        .route("/api/users/profile", post(profile))
        .route("/api/users", get(find_all_users).post(create_user))
        .route(
            "/api/users/{userId}",
            get(find_user_by_id).put(update_user).delete(delete_user),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignupRequest {
    username: String,
    password: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    role: Option<Role>,
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserRequest {
    password: Option<String>,
    #[serde(flatten)]
    patch: UserPatch,
}

#[derive(Debug, Deserialize)]
struct UserListQuery {
    role: Option<Role>,
}

fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    bcrypt::hash(password, cost).map_err(|e| ApiError::Internal(e.to_string()))
}

async fn signup(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    Json(body): Json<SignupRequest>,
) -> Result<(PrivateCookieJar, Json<User>), ApiError> {
    validation::validate_username(&body.username)?;
    validation::validate_password(&body.password)?;

    if state
        .store
        .find_user_by_username(&body.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Validation("Username already in use".to_string()));
    }

    let user = User {
        id: Uuid::new_v4(),
        username: body.username,
        password_hash: hash_password(&body.password, state.bcrypt_cost)?,
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        role: body.role.unwrap_or(Role::Student),
        created_at: Utc::now(),
    };
    let user = state.store.create_user(user).await?;

    let jar = jar.add(create_session_cookie(user.id, &state.environment));
    Ok((jar, Json(user)))
}

async fn signin(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    Json(body): Json<Credentials>,
) -> Result<(PrivateCookieJar, Json<User>), ApiError> {
    let user = state
        .store
        .find_user_by_username(&body.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = bcrypt::verify(&body.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    tracing::debug!(user = %user.username, "user signed in");
    let jar = jar.add(create_session_cookie(user.id, &state.environment));
    Ok((jar, Json(user)))
}

async fn signout(jar: PrivateCookieJar) -> (PrivateCookieJar, StatusCode) {
    (jar.remove(clear_session_cookie()), StatusCode::OK)
}

async fn profile(session: SessionUser) -> Json<User> {
    Json(session.user)
}

async fn find_all_users(
    State(state): State<ApiState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.store.all_users(query.role).await?;
    Ok(Json(users))
}

async fn find_user_by_id(
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

async fn create_user(
    session: SessionUser,
    State(state): State<ApiState>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<User>, ApiError> {
    require_role(&session.user, &[Role::Admin], "Only admins can create users")?;
    validation::validate_username(&body.username)?;
    validation::validate_password(&body.password)?;

    if state
        .store
        .find_user_by_username(&body.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Validation("Username already in use".to_string()));
    }

    let user = User {
        id: Uuid::new_v4(),
        username: body.username,
        password_hash: hash_password(&body.password, state.bcrypt_cost)?,
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        role: body.role.unwrap_or(Role::Student),
        created_at: Utc::now(),
    };
    let user = state.store.create_user(user).await?;
    Ok(Json(user))
}

async fn update_user(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    if session.user.id != user_id {
        require_role(
            &session.user,
            &[Role::Admin],
            "Only admins can update other users",
        )?;
    }

    let mut patch = body.patch;
    if let Some(password) = body.password {
        validation::validate_password(&password)?;
        patch.password_hash = Some(hash_password(&password, state.bcrypt_cost)?);
    }

    let user = state
        .store
        .update_user(user_id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

async fn delete_user(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_role(&session.user, &[Role::Admin], "Only admins can delete users")?;

    if !state.store.delete_user(user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
