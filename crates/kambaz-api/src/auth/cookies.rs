use axum_extra::extract::cookie::{Cookie, SameSite};
use uuid::Uuid;

use crate::config::Environment;

/// Name of the private session cookie holding the acting user's id.
pub const SESSION_COOKIE: &str = "kambaz_session";

/// Build the session cookie set at sign-in/sign-up.
///
/// The cookie carries no max-age, so it lives for the browser session.
/// Cookies are secure (HTTPS-only) in production; in development they can be
/// used over HTTP.
pub fn create_session_cookie(user_id: Uuid, environment: &Environment) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, user_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!environment.is_development())
        .build()
}

/// Build the removal cookie used at sign-out.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, String::new())).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_development() {
        let user_id = Uuid::new_v4();
        let cookie = create_session_cookie(user_id, &Environment::Development);

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), user_id.to_string());
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.http_only().unwrap_or(false));
        assert!(
            !cookie.secure().unwrap_or(true),
            "Should not be secure in development"
        );
    }

    #[test]
    fn session_cookie_production() {
        let cookie = create_session_cookie(Uuid::new_v4(), &Environment::Production);

        assert!(
            cookie.secure().unwrap_or(false),
            "Should be secure in production"
        );
    }
}
