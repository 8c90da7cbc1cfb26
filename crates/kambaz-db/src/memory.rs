use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Assignment, AssignmentPatch, Course, CoursePatch, Enrollment, Module, ModuleKey, ModulePatch,
    Quiz, QuizAttempt, QuizData, Role, User, UserPatch,
};
use crate::store::{Datastore, StoreError, StoreResult};

/// In-memory [`Datastore`] fake backing the automated tests. Mirrors the
/// Postgres schema's behavior, including the uniqueness of
/// (quiz, student, attemptNumber).
#[derive(Debug, Default)]
pub struct MemStore {
    inner: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    courses: Vec<Course>,
    modules: Vec<Module>,
    assignments: Vec<Assignment>,
    enrollments: Vec<Enrollment>,
    quizzes: Vec<Quiz>,
    attempts: Vec<QuizAttempt>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Datastore for MemStore {
    // Users

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.inner.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("username already taken".to_string()));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn all_users(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        let tables = self.inner.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect())
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StoreResult<Option<User>> {
        let mut tables = self.inner.write().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(password_hash) = patch.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(first_name) = patch.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.inner.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        Ok(tables.users.len() < before)
    }

    // Courses

    async fn create_course(&self, course: Course) -> StoreResult<Course> {
        let mut tables = self.inner.write().await;
        tables.courses.push(course.clone());
        Ok(course)
    }

    async fn all_courses(&self) -> StoreResult<Vec<Course>> {
        let tables = self.inner.read().await;
        Ok(tables.courses.clone())
    }

    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>> {
        let tables = self.inner.read().await;
        Ok(tables.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn update_course(&self, id: Uuid, patch: CoursePatch) -> StoreResult<Option<Course>> {
        let mut tables = self.inner.write().await;
        let Some(course) = tables.courses.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            course.name = name;
        }
        if let Some(number) = patch.number {
            course.number = number;
        }
        if let Some(start_date) = patch.start_date {
            course.start_date = Some(start_date);
        }
        if let Some(end_date) = patch.end_date {
            course.end_date = Some(end_date);
        }
        if let Some(department) = patch.department {
            course.department = department;
        }
        if let Some(credits) = patch.credits {
            course.credits = credits;
        }
        if let Some(description) = patch.description {
            course.description = description;
        }
        Ok(Some(course.clone()))
    }

    async fn delete_course(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.inner.write().await;
        let before = tables.courses.len();
        tables.courses.retain(|c| c.id != id);
        Ok(tables.courses.len() < before)
    }

    async fn courses_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Course>> {
        let tables = self.inner.read().await;
        let courses = tables
            .enrollments
            .iter()
            .filter(|e| e.user == user_id)
            .filter_map(|e| tables.courses.iter().find(|c| c.id == e.course))
            .cloned()
            .collect();
        Ok(courses)
    }

    // Modules

    async fn create_module(&self, module: Module) -> StoreResult<Module> {
        let mut tables = self.inner.write().await;
        tables.modules.push(module.clone());
        Ok(module)
    }

    async fn modules_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Module>> {
        let tables = self.inner.read().await;
        Ok(tables
            .modules
            .iter()
            .filter(|m| m.course == course_id)
            .cloned()
            .collect())
    }

    async fn update_module(
        &self,
        key: &ModuleKey,
        patch: ModulePatch,
    ) -> StoreResult<Option<Module>> {
        let mut tables = self.inner.write().await;
        let Some(module) = tables.modules.iter_mut().find(|m| key.matches(m)) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            module.name = name;
        }
        if let Some(description) = patch.description {
            module.description = description;
        }
        Ok(Some(module.clone()))
    }

    async fn delete_module(&self, key: &ModuleKey) -> StoreResult<bool> {
        let mut tables = self.inner.write().await;
        let before = tables.modules.len();
        tables.modules.retain(|m| !key.matches(m));
        Ok(tables.modules.len() < before)
    }

    // Assignments

    async fn create_assignment(&self, assignment: Assignment) -> StoreResult<Assignment> {
        let mut tables = self.inner.write().await;
        tables.assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn assignments_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Assignment>> {
        let tables = self.inner.read().await;
        Ok(tables
            .assignments
            .iter()
            .filter(|a| a.course == course_id)
            .cloned()
            .collect())
    }

    async fn update_assignment(
        &self,
        id: Uuid,
        patch: AssignmentPatch,
    ) -> StoreResult<Option<Assignment>> {
        let mut tables = self.inner.write().await;
        let Some(assignment) = tables.assignments.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            assignment.title = title;
        }
        if let Some(description) = patch.description {
            assignment.description = description;
        }
        if let Some(points) = patch.points {
            assignment.points = points;
        }
        if let Some(due_date) = patch.due_date {
            assignment.due_date = Some(due_date);
        }
        if let Some(available_date) = patch.available_date {
            assignment.available_date = Some(available_date);
        }
        if let Some(until_date) = patch.until_date {
            assignment.until_date = Some(until_date);
        }
        Ok(Some(assignment.clone()))
    }

    async fn delete_assignment(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.inner.write().await;
        let before = tables.assignments.len();
        tables.assignments.retain(|a| a.id != id);
        Ok(tables.assignments.len() < before)
    }

    // Enrollments

    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<Enrollment> {
        let mut tables = self.inner.write().await;
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            user: user_id,
            course: course_id,
        };
        tables.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn unenroll(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.inner.write().await;
        let before = tables.enrollments.len();
        tables
            .enrollments
            .retain(|e| !(e.user == user_id && e.course == course_id));
        Ok(tables.enrollments.len() < before)
    }

    async fn enrollments_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Enrollment>> {
        let tables = self.inner.read().await;
        Ok(tables
            .enrollments
            .iter()
            .filter(|e| e.course == course_id)
            .cloned()
            .collect())
    }

    async fn delete_enrollments_for_course(&self, course_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.inner.write().await;
        let before = tables.enrollments.len();
        tables.enrollments.retain(|e| e.course != course_id);
        Ok((before - tables.enrollments.len()) as u64)
    }

    // Quizzes

    async fn create_quiz(&self, quiz: Quiz) -> StoreResult<Quiz> {
        let mut tables = self.inner.write().await;
        tables.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn quizzes_for_course(&self, course_id: Uuid) -> StoreResult<Vec<Quiz>> {
        let tables = self.inner.read().await;
        let mut quizzes: Vec<Quiz> = tables
            .quizzes
            .iter()
            .filter(|q| q.course == course_id)
            .cloned()
            .collect();
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quizzes)
    }

    async fn find_quiz(&self, id: Uuid) -> StoreResult<Option<Quiz>> {
        let tables = self.inner.read().await;
        Ok(tables.quizzes.iter().find(|q| q.id == id).cloned())
    }

    async fn update_quiz(&self, id: Uuid, data: QuizData) -> StoreResult<Option<Quiz>> {
        let mut tables = self.inner.write().await;
        let Some(quiz) = tables.quizzes.iter_mut().find(|q| q.id == id) else {
            return Ok(None);
        };
        quiz.data = data;
        Ok(Some(quiz.clone()))
    }

    async fn delete_quiz(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.inner.write().await;
        let before = tables.quizzes.len();
        tables.quizzes.retain(|q| q.id != id);
        Ok(tables.quizzes.len() < before)
    }

    async fn toggle_publish(&self, id: Uuid) -> StoreResult<Option<Quiz>> {
        let mut tables = self.inner.write().await;
        let Some(quiz) = tables.quizzes.iter_mut().find(|q| q.id == id) else {
            return Ok(None);
        };
        quiz.data.published = !quiz.data.published;
        Ok(Some(quiz.clone()))
    }

    // Quiz attempts

    async fn create_attempt(&self, attempt: QuizAttempt) -> StoreResult<QuizAttempt> {
        let mut tables = self.inner.write().await;
        let duplicate = tables.attempts.iter().any(|a| {
            a.quiz == attempt.quiz
                && a.student == attempt.student
                && a.attempt_number == attempt.attempt_number
        });
        if duplicate {
            return Err(StoreError::Conflict(
                "attempt number already recorded for this quiz and student".to_string(),
            ));
        }
        tables.attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn attempts_for_student(
        &self,
        quiz_id: Uuid,
        student_id: Uuid,
    ) -> StoreResult<Vec<QuizAttempt>> {
        let tables = self.inner.read().await;
        let mut attempts: Vec<QuizAttempt> = tables
            .attempts
            .iter()
            .filter(|a| a.quiz == quiz_id && a.student == student_id)
            .cloned()
            .collect();
        attempts.sort_by(|a, b| b.attempt_number.cmp(&a.attempt_number));
        Ok(attempts)
    }

    async fn count_submitted_attempts(
        &self,
        quiz_id: Uuid,
        student_id: Uuid,
    ) -> StoreResult<i64> {
        let tables = self.inner.read().await;
        let count = tables
            .attempts
            .iter()
            .filter(|a| a.quiz == quiz_id && a.student == student_id && a.submitted)
            .count();
        Ok(count as i64)
    }

    async fn delete_attempts_for_quiz(&self, quiz_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.inner.write().await;
        let before = tables.attempts.len();
        tables.attempts.retain(|a| a.quiz != quiz_id);
        Ok((before - tables.attempts.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn attempt(quiz: Uuid, student: Uuid, number: i32) -> QuizAttempt {
        QuizAttempt {
            id: Uuid::new_v4(),
            quiz,
            student,
            attempt_number: number,
            answers: Vec::new(),
            score: 0.0,
            total_points: 10.0,
            submitted: true,
            submitted_at: Some(Utc::now()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_attempt_number_is_a_conflict() {
        let store = MemStore::new();
        let quiz = Uuid::new_v4();
        let student = Uuid::new_v4();

        store.create_attempt(attempt(quiz, student, 1)).await.unwrap();
        let err = store.create_attempt(attempt(quiz, student, 1)).await;
        assert!(matches!(err, Err(StoreError::Conflict(_))));

        // A different student may reuse the same number.
        store
            .create_attempt(attempt(quiz, Uuid::new_v4(), 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn module_key_matches_id_or_name() {
        let store = MemStore::new();
        let course = Uuid::new_v4();
        let module = Module {
            id: Uuid::new_v4(),
            name: "Week 1".to_string(),
            description: String::new(),
            course,
        };
        store.create_module(module.clone()).await.unwrap();

        let by_name = store
            .update_module(
                &ModuleKey::new("Week 1"),
                ModulePatch {
                    description: Some("Intro".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_name.unwrap().description, "Intro");

        assert!(
            store
                .delete_module(&ModuleKey::new(module.id.to_string()))
                .await
                .unwrap()
        );
        assert!(store.modules_for_course(course).await.unwrap().is_empty());
    }
}
