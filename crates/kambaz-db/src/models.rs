use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account role, gating mutation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

/// User account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Partial user update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub username: Option<String>,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Course record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    /// Catalog number, e.g. "CS1234".
    pub number: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub department: String,
    pub credits: i32,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    pub name: Option<String>,
    pub number: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub department: Option<String>,
    pub credits: Option<i32>,
    pub description: Option<String>,
}

/// Ordered content unit scoped to a course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Owning course id.
    pub course: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Key accepted by module lookups. Callers address a module either by its
/// generated id or by its human-readable name; the first matching candidate
/// wins.
#[derive(Debug, Clone)]
pub struct ModuleKey(String);

impl ModuleKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a module matches this key, by id or by name.
    pub fn matches(&self, module: &Module) -> bool {
        module.id.to_string() == self.0 || module.name == self.0
    }
}

/// Gradable work item scoped to a course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub course: Uuid,
    pub points: f64,
    pub due_date: Option<DateTime<Utc>>,
    pub available_date: Option<DateTime<Utc>>,
    pub until_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub points: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub available_date: Option<DateTime<Utc>>,
    pub until_date: Option<DateTime<Utc>>,
}

/// Association record linking one user to one course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    #[sqlx(rename = "user_id")]
    pub user: Uuid,
    #[sqlx(rename = "course_id")]
    pub course: Uuid,
}

/// A single choice of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// Correctness data per question type. The wire tag matches the original
/// schema values (`multiple-choice`, `true-false`, `fill-in-blank`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum QuestionKind {
    MultipleChoice {
        #[serde(default)]
        choices: Vec<Choice>,
    },
    TrueFalse {
        correct_answer: bool,
    },
    FillInBlank {
        #[serde(default)]
        possible_answers: Vec<String>,
        #[serde(default)]
        case_sensitive: bool,
    },
}

/// One question embedded in a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    /// Question prompt text.
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub points: f64,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Quiz content fields. Create/update request bodies deserialize into this;
/// defaults match the original schema.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizData {
    pub title: String,
    pub description: String,
    /// Visibility flag; unpublished quizzes are hidden from students.
    pub published: bool,
    pub quiz_type: String,
    /// Total possible points. Recomputed server-side on update as the sum of
    /// question points.
    pub points: f64,
    pub assignment_group: String,
    pub shuffle_answers: bool,
    /// Minutes.
    pub time_limit: i32,
    pub multiple_attempts: bool,
    pub how_many_attempts: i32,
    pub show_correct_answers: String,
    pub access_code: String,
    pub one_question_at_time: bool,
    pub webcam_required: bool,
    pub lock_questions_after_answering: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub available_date: Option<DateTime<Utc>>,
    pub until_date: Option<DateTime<Utc>>,
    #[sqlx(json)]
    pub questions: Vec<Question>,
}

impl Default for QuizData {
    fn default() -> Self {
        Self {
            title: "Untitled Quiz".to_string(),
            description: String::new(),
            published: false,
            quiz_type: "graded-quiz".to_string(),
            points: 0.0,
            assignment_group: "quizzes".to_string(),
            shuffle_answers: true,
            time_limit: 20,
            multiple_attempts: false,
            how_many_attempts: 1,
            show_correct_answers: "immediately".to_string(),
            access_code: String::new(),
            one_question_at_time: true,
            webcam_required: false,
            lock_questions_after_answering: false,
            due_date: None,
            available_date: None,
            until_date: None,
            questions: Vec::new(),
        }
    }
}

/// Assessment definition with an embedded ordered question list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub course: Uuid,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub data: QuizData,
    pub created_at: DateTime<Utc>,
}

/// A submitted answer value: a boolean for true/false questions, a choice id
/// for multiple choice, a string or ordered list of strings for fill-in-blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Text(String),
    Many(Vec<String>),
}

/// Per-question grading result stored on an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub question_id: Uuid,
    pub answer: AnswerValue,
    pub is_correct: bool,
    pub points_earned: f64,
}

/// One graded submission of a quiz by a student, numbered sequentially per
/// (quiz, student).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: Uuid,
    #[sqlx(rename = "quiz_id")]
    pub quiz: Uuid,
    #[sqlx(rename = "student_id")]
    pub student: Uuid,
    /// 1-based, unique per (quiz, student).
    pub attempt_number: i32,
    #[sqlx(json)]
    pub answers: Vec<GradedAnswer>,
    pub score: f64,
    /// Snapshot of the quiz's total possible points at submission time.
    pub total_points: f64,
    pub submitted: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
