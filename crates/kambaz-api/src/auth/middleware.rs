use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use kambaz_db::models::User;
use uuid::Uuid;

use super::cookies::SESSION_COOKIE;
use crate::{error::ApiError, state::ApiState};

/// Acting user for the current request, resolved from the session cookie.
///
/// Use this as an extractor in route handlers that require authentication;
/// a missing or invalid session rejects the request with 401. Handlers where
/// the acting user only influences filtering take `Option<SessionUser>`
/// instead.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user: User,
}

/// Look up the session user, if any. The user record is re-read from the
/// store on every request, so role changes take effect immediately.
async fn resolve_session(parts: &mut Parts, state: &ApiState) -> Result<Option<User>, ApiError> {
    let jar = <PrivateCookieJar<Key> as FromRequestParts<ApiState>>::from_request_parts(parts, state)
        .await
        .map_err(|_| ApiError::Unauthenticated)?;

    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let Ok(user_id) = Uuid::parse_str(cookie.value()) else {
        return Ok(None);
    };

    Ok(state.store.find_user(user_id).await?)
}

impl<S> FromRequestParts<S> for SessionUser
where
    ApiState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let api_state = ApiState::from_ref(state);
        let user = resolve_session(parts, &api_state)
            .await?
            .ok_or(ApiError::Unauthenticated)?;
        Ok(Self { user })
    }
}

impl<S> OptionalFromRequestParts<S> for SessionUser
where
    ApiState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let api_state = ApiState::from_ref(state);
        Ok(resolve_session(parts, &api_state)
            .await?
            .map(|user| Self { user }))
    }
}
