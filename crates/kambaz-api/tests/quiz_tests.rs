use axum::http::StatusCode;
use serde_json::json;

use crate::common::{TestClient, create_course, signup};

async fn create_quiz(
    client: &TestClient,
    cookie: &str,
    course_id: &str,
    body: &serde_json::Value,
) -> serde_json::Value {
    let response = client
        .post_json_auth(&format!("/api/courses/{course_id}/quizzes"), body, cookie)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn students_see_only_published_quizzes() {
    let client = TestClient::new();
    let (_, faculty) = signup(&client, "prof_q", "FACULTY").await;
    let (_, student) = signup(&client, "gambit", "STUDENT").await;
    let course_id = create_course(&client, &faculty, "Cards").await;

    create_quiz(&client, &faculty, &course_id, &json!({ "title": "Draft" })).await;
    create_quiz(
        &client,
        &faculty,
        &course_id,
        &json!({ "title": "Live", "published": true }),
    )
    .await;

    let uri = format!("/api/courses/{course_id}/quizzes");

    let for_faculty: Vec<serde_json::Value> = client.get_auth(&uri, &faculty).await.json();
    assert_eq!(for_faculty.len(), 2);

    let for_student: Vec<serde_json::Value> = client.get_auth(&uri, &student).await.json();
    assert_eq!(for_student.len(), 1);
    assert_eq!(for_student[0]["title"], "Live");

    // Only the STUDENT role triggers filtering.
    let anonymous: Vec<serde_json::Value> = client.get(&uri).await.json();
    assert_eq!(anonymous.len(), 2);
}

#[tokio::test]
async fn unpublished_quiz_is_hidden_from_students() {
    let client = TestClient::new();
    let (_, faculty) = signup(&client, "prof_r", "FACULTY").await;
    let (_, student) = signup(&client, "storm", "STUDENT").await;
    let course_id = create_course(&client, &faculty, "Weather").await;

    let quiz = create_quiz(&client, &faculty, &course_id, &json!({ "title": "Hidden" })).await;
    let quiz_id = quiz["id"].as_str().unwrap();
    let uri = format!("/api/courses/quizzes/{quiz_id}");

    let denied = client.get_auth(&uri, &student).await;
    denied.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = denied.json();
    assert_eq!(body["message"], "Quiz not available");

    client.get_auth(&uri, &faculty).await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn quiz_management_excludes_admins() {
    let client = TestClient::new();
    let (_, faculty) = signup(&client, "prof_s", "FACULTY").await;
    let (_, admin) = signup(&client, "admin_s", "ADMIN").await;
    let course_id = create_course(&client, &faculty, "Gatekeeping").await;

    // ADMIN may manage modules and assignments, but not quizzes.
    let denied = client
        .post_json_auth(
            &format!("/api/courses/{course_id}/quizzes"),
            &json!({ "title": "Nope" }),
            &admin,
        )
        .await;
    denied.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = denied.json();
    assert_eq!(body["message"], "Only faculty can create quizzes");
}

#[tokio::test]
async fn quiz_update_recomputes_points_server_side() {
    let client = TestClient::new();
    let (_, faculty) = signup(&client, "prof_t", "FACULTY").await;
    let course_id = create_course(&client, &faculty, "Sums").await;

    let quiz = create_quiz(&client, &faculty, &course_id, &json!({ "title": "Totals" })).await;
    let quiz_id = quiz["id"].as_str().unwrap();

    // The client-supplied total is overridden by the sum of question points.
    let updated = client
        .put_json_auth(
            &format!("/api/courses/quizzes/{quiz_id}"),
            &json!({
                "title": "Totals",
                "points": 999,
                "questions": [
                    { "type": "true-false", "points": 2, "correctAnswer": true },
                    {
                        "type": "fill-in-blank",
                        "points": 3,
                        "possibleAnswers": ["Paris"],
                    },
                ],
            }),
            &faculty,
        )
        .await;
    updated.assert_status(StatusCode::OK);
    let quiz: serde_json::Value = updated.json();
    assert_eq!(quiz["points"], 5.0);
}

#[tokio::test]
async fn publish_toggle_is_faculty_only() {
    let client = TestClient::new();
    let (_, faculty) = signup(&client, "prof_u", "FACULTY").await;
    let (_, student) = signup(&client, "bishop", "STUDENT").await;
    let course_id = create_course(&client, &faculty, "Switches").await;

    let quiz = create_quiz(&client, &faculty, &course_id, &json!({ "title": "Flip" })).await;
    let quiz_id = quiz["id"].as_str().unwrap();
    let publish_uri = format!("/api/courses/quizzes/{quiz_id}/publish");

    client
        .patch_auth(&publish_uri, &student)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // The flag is unchanged after the rejected toggle.
    let quiz: serde_json::Value = client
        .get_auth(&format!("/api/courses/quizzes/{quiz_id}"), &faculty)
        .await
        .json();
    assert_eq!(quiz["published"], false);

    let toggled = client.patch_auth(&publish_uri, &faculty).await;
    toggled.assert_status(StatusCode::OK);
    let quiz: serde_json::Value = toggled.json();
    assert_eq!(quiz["published"], true);
}

#[tokio::test]
async fn deleting_a_quiz_removes_its_attempts() {
    let client = TestClient::new();
    let (_, faculty) = signup(&client, "prof_aa", "FACULTY").await;
    let (_, student) = signup(&client, "colossus", "STUDENT").await;
    let course_id = create_course(&client, &faculty, "Steel").await;

    let quiz = create_quiz(
        &client,
        &faculty,
        &course_id,
        &json!({
            "title": "Doomed quiz",
            "published": true,
            "questions": [
                { "type": "true-false", "points": 1, "correctAnswer": true },
            ],
        }),
    )
    .await;
    let quiz_id = quiz["id"].as_str().unwrap();
    let question_id = quiz["questions"][0]["id"].as_str().unwrap();
    let attempts_uri = format!("/api/courses/quizzes/{quiz_id}/attempts");

    client
        .post_json_auth(
            &attempts_uri,
            &json!({ "answers": [{ "questionId": question_id, "answer": true }] }),
            &student,
        )
        .await
        .assert_status(StatusCode::CREATED);

    let deleted = client
        .delete_auth(&format!("/api/courses/quizzes/{quiz_id}"), &faculty)
        .await;
    deleted.assert_status(StatusCode::OK);
    let body: serde_json::Value = deleted.json();
    assert_eq!(body["message"], "Quiz deleted successfully");

    // None of the quiz's attempt records remain queryable.
    let attempts: Vec<serde_json::Value> =
        client.get_auth(&attempts_uri, &student).await.json();
    assert!(attempts.is_empty());
}
