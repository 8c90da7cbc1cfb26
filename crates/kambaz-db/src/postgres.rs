use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::{
    Assignment, AssignmentPatch, Course, CoursePatch, Enrollment, Module, ModuleKey, ModulePatch,
    Quiz, QuizAttempt, QuizData, Role, User, UserPatch,
};
use crate::store::{Datastore, StoreError, StoreResult};

/// PostgreSQL-backed [`Datastore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn conflict_on_unique(e: sqlx::Error, what: &str) -> StoreError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => StoreError::Conflict(what.to_string()),
        _ => StoreError::Database(e),
    }
}

const QUIZ_COLUMNS: &str = "id, course, title, description, published, quiz_type, points, \
     assignment_group, shuffle_answers, time_limit, multiple_attempts, how_many_attempts, \
     show_correct_answers, access_code, one_question_at_time, webcam_required, \
     lock_questions_after_answering, due_date, available_date, until_date, questions, created_at";

#[async_trait]
impl Datastore for PgStore {
    // Users

    async fn create_user(&self, user: User) -> StoreResult<User> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                INSERT INTO users (id, username, password_hash, first_name, last_name, email, role, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, username, password_hash, first_name, last_name, email, role, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username already taken"))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                SELECT id, username, password_hash, first_name, last_name, email, role, created_at
                FROM users
                WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                SELECT id, username, password_hash, first_name, last_name, email, role, created_at
                FROM users
                WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn all_users(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                SELECT id, username, password_hash, first_name, last_name, email, role, created_at
                FROM users
                WHERE $1::user_role IS NULL OR role = $1
                ORDER BY created_at
            "#,
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StoreResult<Option<User>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                UPDATE users
                SET username = COALESCE($2, username),
                    password_hash = COALESCE($3, password_hash),
                    first_name = COALESCE($4, first_name),
                    last_name = COALESCE($5, last_name),
                    email = COALESCE($6, email),
                    role = COALESCE($7, role)
                WHERE id = $1
                RETURNING id, username, password_hash, first_name, last_name, email, role, created_at
            "#,
        )
        .bind(id)
        .bind(patch.username)
        .bind(patch.password_hash)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.email)
        .bind(patch.role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username already taken"))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            // language=PostgreSQL
            r#"
                DELETE FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // Courses

    async fn create_course(&self, course: Course) -> StoreResult<Course> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                INSERT INTO courses (id, name, number, start_date, end_date, department, credits, description)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, name, number, start_date, end_date, department, credits, description
            "#,
        )
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.number)
        .bind(course.start_date)
        .bind(course.end_date)
        .bind(&course.department)
        .bind(course.credits)
        .bind(&course.description)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn all_courses(&self) -> StoreResult<Vec<Course>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                SELECT id, name, number, start_date, end_date, department, credits, description
                FROM courses
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                SELECT id, name, number, start_date, end_date, department, credits, description
                FROM courses
                WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn update_course(&self, id: Uuid, patch: CoursePatch) -> StoreResult<Option<Course>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                UPDATE courses
                SET name = COALESCE($2, name),
                    number = COALESCE($3, number),
                    start_date = COALESCE($4, start_date),
                    end_date = COALESCE($5, end_date),
                    department = COALESCE($6, department),
                    credits = COALESCE($7, credits),
                    description = COALESCE($8, description)
                WHERE id = $1
                RETURNING id, name, number, start_date, end_date, department, credits, description
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.number)
        .bind(patch.start_date)
        .bind(patch.end_date)
        .bind(patch.department)
        .bind(patch.credits)
        .bind(patch.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn delete_course(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            // language=PostgreSQL
            r#"
                DELETE FROM courses WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn courses_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Course>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                SELECT c.id, c.name, c.number, c.start_date, c.end_date, c.department, c.credits, c.description
                FROM enrollments e
                JOIN courses c ON c.id = e.course_id
                WHERE e.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    // Modules

    async fn create_module(&self, module: Module) -> StoreResult<Module> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                INSERT INTO modules (id, name, description, course)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, description, course
            "#,
        )
        .bind(module.id)
        .bind(&module.name)
        .bind(&module.description)
        .bind(module.course)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn modules_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Module>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                SELECT id, name, description, course
                FROM modules
                WHERE course = $1
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn update_module(
        &self,
        key: &ModuleKey,
        patch: ModulePatch,
    ) -> StoreResult<Option<Module>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                UPDATE modules
                SET name = COALESCE($2, name),
                    description = COALESCE($3, description)
                WHERE id::text = $1 OR name = $1
                RETURNING id, name, description, course
            "#,
        )
        .bind(key.as_str())
        .bind(patch.name)
        .bind(patch.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn delete_module(&self, key: &ModuleKey) -> StoreResult<bool> {
        let result = sqlx::query(
            // language=PostgreSQL
            r#"
                DELETE FROM modules WHERE id::text = $1 OR name = $1
            "#,
        )
        .bind(key.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // Assignments

    async fn create_assignment(&self, assignment: Assignment) -> StoreResult<Assignment> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                INSERT INTO assignments (id, title, description, course, points, due_date, available_date, until_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, title, description, course, points, due_date, available_date, until_date
            "#,
        )
        .bind(assignment.id)
        .bind(&assignment.title)
        .bind(&assignment.description)
        .bind(assignment.course)
        .bind(assignment.points)
        .bind(assignment.due_date)
        .bind(assignment.available_date)
        .bind(assignment.until_date)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn assignments_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Assignment>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                SELECT id, title, description, course, points, due_date, available_date, until_date
                FROM assignments
                WHERE course = $1
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn update_assignment(
        &self,
        id: Uuid,
        patch: AssignmentPatch,
    ) -> StoreResult<Option<Assignment>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                UPDATE assignments
                SET title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    points = COALESCE($4, points),
                    due_date = COALESCE($5, due_date),
                    available_date = COALESCE($6, available_date),
                    until_date = COALESCE($7, until_date)
                WHERE id = $1
                RETURNING id, title, description, course, points, due_date, available_date, until_date
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.points)
        .bind(patch.due_date)
        .bind(patch.available_date)
        .bind(patch.until_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn delete_assignment(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            // language=PostgreSQL
            r#"
                DELETE FROM assignments WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // Enrollments

    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<Enrollment> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                INSERT INTO enrollments (id, user_id, course_id)
                VALUES ($1, $2, $3)
                RETURNING id, user_id, course_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn unenroll(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            // language=PostgreSQL
            r#"
                DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn enrollments_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Enrollment>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                SELECT id, user_id, course_id
                FROM enrollments
                WHERE course_id = $1
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn delete_enrollments_for_course(&self, course_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(
            // language=PostgreSQL
            r#"
                DELETE FROM enrollments WHERE course_id = $1
            "#,
        )
        .bind(course_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // Quizzes

    async fn create_quiz(&self, quiz: Quiz) -> StoreResult<Quiz> {
        sqlx::query_as(&format!(
            // language=PostgreSQL
            r#"
                INSERT INTO quizzes (id, course, title, description, published, quiz_type, points,
                                     assignment_group, shuffle_answers, time_limit, multiple_attempts,
                                     how_many_attempts, show_correct_answers, access_code,
                                     one_question_at_time, webcam_required, lock_questions_after_answering,
                                     due_date, available_date, until_date, questions, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                        $18, $19, $20, $21, $22)
                RETURNING {QUIZ_COLUMNS}
            "#,
        ))
        .bind(quiz.id)
        .bind(quiz.course)
        .bind(&quiz.data.title)
        .bind(&quiz.data.description)
        .bind(quiz.data.published)
        .bind(&quiz.data.quiz_type)
        .bind(quiz.data.points)
        .bind(&quiz.data.assignment_group)
        .bind(quiz.data.shuffle_answers)
        .bind(quiz.data.time_limit)
        .bind(quiz.data.multiple_attempts)
        .bind(quiz.data.how_many_attempts)
        .bind(&quiz.data.show_correct_answers)
        .bind(&quiz.data.access_code)
        .bind(quiz.data.one_question_at_time)
        .bind(quiz.data.webcam_required)
        .bind(quiz.data.lock_questions_after_answering)
        .bind(quiz.data.due_date)
        .bind(quiz.data.available_date)
        .bind(quiz.data.until_date)
        .bind(Json(&quiz.data.questions))
        .bind(quiz.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn quizzes_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Quiz>> {
        sqlx::query_as(&format!(
            // language=PostgreSQL
            r#"
                SELECT {QUIZ_COLUMNS}
                FROM quizzes
                WHERE course = $1
                ORDER BY created_at DESC
            "#,
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn find_quiz(&self, id: Uuid) -> StoreResult<Option<Quiz>> {
        sqlx::query_as(&format!(
            // language=PostgreSQL
            r#"
                SELECT {QUIZ_COLUMNS}
                FROM quizzes
                WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn update_quiz(&self, id: Uuid, data: QuizData) -> StoreResult<Option<Quiz>> {
        sqlx::query_as(&format!(
            // language=PostgreSQL
            r#"
                UPDATE quizzes
                SET title = $2, description = $3, published = $4, quiz_type = $5, points = $6,
                    assignment_group = $7, shuffle_answers = $8, time_limit = $9,
                    multiple_attempts = $10, how_many_attempts = $11, show_correct_answers = $12,
                    access_code = $13, one_question_at_time = $14, webcam_required = $15,
                    lock_questions_after_answering = $16, due_date = $17, available_date = $18,
                    until_date = $19, questions = $20
                WHERE id = $1
                RETURNING {QUIZ_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.published)
        .bind(&data.quiz_type)
        .bind(data.points)
        .bind(&data.assignment_group)
        .bind(data.shuffle_answers)
        .bind(data.time_limit)
        .bind(data.multiple_attempts)
        .bind(data.how_many_attempts)
        .bind(&data.show_correct_answers)
        .bind(&data.access_code)
        .bind(data.one_question_at_time)
        .bind(data.webcam_required)
        .bind(data.lock_questions_after_answering)
        .bind(data.due_date)
        .bind(data.available_date)
        .bind(data.until_date)
        .bind(Json(&data.questions))
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn delete_quiz(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            // language=PostgreSQL
            r#"
                DELETE FROM quizzes WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle_publish(&self, id: Uuid) -> StoreResult<Option<Quiz>> {
        sqlx::query_as(&format!(
            // language=PostgreSQL
            r#"
                UPDATE quizzes
                SET published = NOT published
                WHERE id = $1
                RETURNING {QUIZ_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    // Quiz attempts

    async fn create_attempt(&self, attempt: QuizAttempt) -> StoreResult<QuizAttempt> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                INSERT INTO quiz_attempts (id, quiz_id, student_id, attempt_number, answers, score,
                                           total_points, submitted, submitted_at, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING id, quiz_id, student_id, attempt_number, answers, score, total_points,
                          submitted, submitted_at, created_at
            "#,
        )
        .bind(attempt.id)
        .bind(attempt.quiz)
        .bind(attempt.student)
        .bind(attempt.attempt_number)
        .bind(Json(&attempt.answers))
        .bind(attempt.score)
        .bind(attempt.total_points)
        .bind(attempt.submitted)
        .bind(attempt.submitted_at)
        .bind(attempt.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "attempt number already recorded for this quiz and student"))
    }

    async fn attempts_for_student(
        &self,
        quiz_id: Uuid,
        student_id: Uuid,
    ) -> StoreResult<Vec<QuizAttempt>> {
        sqlx::query_as(
            // language=PostgreSQL
            r#"
                SELECT id, quiz_id, student_id, attempt_number, answers, score, total_points,
                       submitted, submitted_at, created_at
                FROM quiz_attempts
                WHERE quiz_id = $1 AND student_id = $2
                ORDER BY attempt_number DESC
            "#,
        )
        .bind(quiz_id)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn count_submitted_attempts(
        &self,
        quiz_id: Uuid,
        student_id: Uuid,
    ) -> StoreResult<i64> {
        sqlx::query_scalar(
            // language=PostgreSQL
            r#"
                SELECT COUNT(*)
                FROM quiz_attempts
                WHERE quiz_id = $1 AND student_id = $2 AND submitted
            "#,
        )
        .bind(quiz_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn delete_attempts_for_quiz(&self, quiz_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(
            // language=PostgreSQL
            r#"
                DELETE FROM quiz_attempts WHERE quiz_id = $1
            "#,
        )
        .bind(quiz_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
