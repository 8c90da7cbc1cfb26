use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use axum_extra::extract::cookie::Key;
use http_body_util::BodyExt;
use kambaz_api::{config::Environment, router, state::ApiState};
use kambaz_db::memory::MemStore;
use serde::Deserialize;
use serde_json::json;
use tower::ServiceExt;

const TEST_COOKIE_SECRET: &str =
    "test_cookie_secret_minimum_64_characters_long_for_secure_encryption";

/// Build an `ApiState` backed by a fresh in-memory store.
pub fn test_state() -> ApiState {
    ApiState {
        store: Arc::new(MemStore::new()),
        cookie_key: Key::from(TEST_COOKIE_SECRET.as_bytes()),
        environment: Environment::Development,
        bcrypt_cost: 4,
    }
}

/// Helper to make requests to the app router in-process.
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new() -> Self {
        Self::with_state(test_state())
    }

    pub fn with_state(state: ApiState) -> Self {
        Self {
            router: router::router().with_state(state),
        }
    }

    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    /// Send a request with an optional session cookie and optional JSON body.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.request(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send("GET", uri, None, None).await
    }

    pub async fn get_auth(&self, uri: &str, cookie: &str) -> TestResponse {
        self.send("GET", uri, Some(cookie), None).await
    }

    pub async fn post_json(&self, uri: &str, body: &serde_json::Value) -> TestResponse {
        self.send("POST", uri, None, Some(body)).await
    }

    pub async fn post_json_auth(
        &self,
        uri: &str,
        body: &serde_json::Value,
        cookie: &str,
    ) -> TestResponse {
        self.send("POST", uri, Some(cookie), Some(body)).await
    }

    pub async fn post_auth(&self, uri: &str, cookie: &str) -> TestResponse {
        self.send("POST", uri, Some(cookie), None).await
    }

    pub async fn put_json(&self, uri: &str, body: &serde_json::Value) -> TestResponse {
        self.send("PUT", uri, None, Some(body)).await
    }

    pub async fn put_json_auth(
        &self,
        uri: &str,
        body: &serde_json::Value,
        cookie: &str,
    ) -> TestResponse {
        self.send("PUT", uri, Some(cookie), Some(body)).await
    }

    pub async fn patch_auth(&self, uri: &str, cookie: &str) -> TestResponse {
        self.send("PATCH", uri, Some(cookie), None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send("DELETE", uri, None, None).await
    }

    pub async fn delete_auth(&self, uri: &str, cookie: &str) -> TestResponse {
        self.send("DELETE", uri, Some(cookie), None).await
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }

    /// Extract a `name=value` cookie pair from the Set-Cookie headers,
    /// suitable for replaying in a `cookie` request header.
    pub fn session_cookie(&self) -> Option<String> {
        for value in self.headers.get_all("set-cookie").iter() {
            if let Ok(cookie_str) = value.to_str() {
                if cookie_str.starts_with("kambaz_session=") {
                    return cookie_str.split(';').next().map(|s| s.to_string());
                }
            }
        }
        None
    }
}

/// Sign up a user with the given role and return (user id, session cookie).
pub async fn signup(client: &TestClient, username: &str, role: &str) -> (String, String) {
    let response = client
        .post_json(
            "/api/users/signup",
            &json!({
                "username": username,
                "password": "password123",
                "firstName": "Test",
                "lastName": "User",
                "role": role,
            }),
        )
        .await;
    response.assert_status(StatusCode::OK);

    let user: serde_json::Value = response.json();
    let id = user["id"].as_str().expect("user id").to_string();
    let cookie = response.session_cookie().expect("session cookie set");
    (id, cookie)
}

/// Create a course as the given session and return its id.
pub async fn create_course(client: &TestClient, cookie: &str, name: &str) -> String {
    let response = client
        .post_json_auth(
            "/api/users/current/courses",
            &json!({ "name": name, "number": "CS1234", "credits": 4 }),
            cookie,
        )
        .await;
    response.assert_status(StatusCode::OK);
    let course: serde_json::Value = response.json();
    course["id"].as_str().expect("course id").to_string()
}
