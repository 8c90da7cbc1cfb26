use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Assignment, AssignmentPatch, Course, CoursePatch, Enrollment, Module, ModuleKey, ModulePatch,
    Quiz, QuizAttempt, QuizData, Role, User, UserPatch,
};

#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write, e.g. two racing attempt
    /// submissions landing on the same (quiz, student, attemptNumber).
    #[error("duplicate record: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository interface over the persistent store, one method group per
/// entity. The HTTP layer receives an `Arc<dyn Datastore>` at construction;
/// production uses [`crate::postgres::PgStore`], the automated tests use
/// [`crate::memory::MemStore`].
#[async_trait]
pub trait Datastore: Send + Sync {
    // Users
    async fn create_user(&self, user: User) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    /// All users, optionally restricted to one role.
    async fn all_users(&self, role: Option<Role>) -> StoreResult<Vec<User>>;
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StoreResult<Option<User>>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    // Courses
    async fn create_course(&self, course: Course) -> StoreResult<Course>;
    async fn all_courses(&self) -> StoreResult<Vec<Course>>;
    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>>;
    async fn update_course(&self, id: Uuid, patch: CoursePatch) -> StoreResult<Option<Course>>;
    async fn delete_course(&self, id: Uuid) -> StoreResult<bool>;
    /// Courses the user is enrolled in. Enrollments pointing at a course that
    /// no longer resolves are skipped.
    async fn courses_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Course>>;

    // Modules
    async fn create_module(&self, module: Module) -> StoreResult<Module>;
    async fn modules_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Module>>;
    async fn update_module(&self, key: &ModuleKey, patch: ModulePatch)
    -> StoreResult<Option<Module>>;
    async fn delete_module(&self, key: &ModuleKey) -> StoreResult<bool>;

    // Assignments
    async fn create_assignment(&self, assignment: Assignment) -> StoreResult<Assignment>;
    async fn assignments_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Assignment>>;
    async fn update_assignment(
        &self,
        id: Uuid,
        patch: AssignmentPatch,
    ) -> StoreResult<Option<Assignment>>;
    async fn delete_assignment(&self, id: Uuid) -> StoreResult<bool>;

    // Enrollments
    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<Enrollment>;
    async fn unenroll(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<bool>;
    async fn enrollments_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Enrollment>>;
    /// Removes every enrollment referencing the course; returns how many.
    async fn delete_enrollments_for_course(&self, course_id: Uuid) -> StoreResult<u64>;

    // Quizzes
    async fn create_quiz(&self, quiz: Quiz) -> StoreResult<Quiz>;
    /// Quizzes of a course, newest first.
    async fn quizzes_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Quiz>>;
    async fn find_quiz(&self, id: Uuid) -> StoreResult<Option<Quiz>>;
    async fn update_quiz(&self, id: Uuid, data: QuizData) -> StoreResult<Option<Quiz>>;
    async fn delete_quiz(&self, id: Uuid) -> StoreResult<bool>;
    async fn toggle_publish(&self, id: Uuid) -> StoreResult<Option<Quiz>>;

    // Quiz attempts
    async fn create_attempt(&self, attempt: QuizAttempt) -> StoreResult<QuizAttempt>;
    /// A student's attempts on a quiz, highest attempt number first.
    async fn attempts_for_student(
        &self,
        quiz_id: Uuid,
        student_id: Uuid,
    ) -> StoreResult<Vec<QuizAttempt>>;
    async fn count_submitted_attempts(&self, quiz_id: Uuid, student_id: Uuid)
    -> StoreResult<i64>;
    async fn delete_attempts_for_quiz(&self, quiz_id: Uuid) -> StoreResult<u64>;
}
