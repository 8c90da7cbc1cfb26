use kambaz_db::models::{AnswerValue, GradedAnswer, Question, QuestionKind, Quiz};
use serde::Deserialize;
use uuid::Uuid;

/// One answer as submitted by a student.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    pub answer: AnswerValue,
}

#[derive(Debug, Clone)]
pub struct GradingOutcome {
    pub answers: Vec<GradedAnswer>,
    pub score: f64,
}

/// Grade a submission against a quiz's embedded question list.
///
/// Answers whose question id is not found are skipped silently. A correct
/// answer earns the question's full point value, anything else earns zero.
pub fn grade_submission(quiz: &Quiz, submitted: &[SubmittedAnswer]) -> GradingOutcome {
    let mut score = 0.0;
    let mut answers = Vec::with_capacity(submitted.len());

    for submission in submitted {
        let Some(question) = quiz
            .data
            .questions
            .iter()
            .find(|q| q.id == submission.question_id)
        else {
            continue;
        };

        let is_correct = is_answer_correct(question, &submission.answer);
        let points_earned = if is_correct { question.points } else { 0.0 };
        score += points_earned;

        answers.push(GradedAnswer {
            question_id: submission.question_id,
            answer: submission.answer.clone(),
            is_correct,
            points_earned,
        });
    }

    GradingOutcome { answers, score }
}

fn is_answer_correct(question: &Question, answer: &AnswerValue) -> bool {
    match (&question.kind, answer) {
        // Correct iff the submitted value is the id of the single choice
        // flagged correct.
        (QuestionKind::MultipleChoice { choices }, AnswerValue::Text(choice_id)) => choices
            .iter()
            .find(|c| c.is_correct)
            .is_some_and(|c| c.id.to_string() == *choice_id),
        (QuestionKind::TrueFalse { correct_answer }, AnswerValue::Bool(submitted)) => {
            submitted == correct_answer
        }
        (
            QuestionKind::FillInBlank {
                possible_answers,
                case_sensitive,
            },
            submitted,
        ) => {
            // A single value is treated as a one-element list.
            let blanks: Vec<&str> = match submitted {
                AnswerValue::Text(s) => vec![s.as_str()],
                AnswerValue::Many(list) => list.iter().map(String::as_str).collect(),
                AnswerValue::Bool(_) => return false,
            };
            blanks_match(&blanks, possible_answers, *case_sensitive)
        }
        _ => false,
    }
}

/// Positional comparison of fill-in-blank values: the submitted list must have
/// exactly as many entries as the expected list, and every position must match
/// after trimming, lowercasing both sides unless the question is
/// case-sensitive. Empty values never match.
fn blanks_match(submitted: &[&str], expected: &[String], case_sensitive: bool) -> bool {
    if submitted.len() != expected.len() {
        return false;
    }

    submitted.iter().zip(expected).all(|(s, e)| {
        if s.is_empty() || e.is_empty() {
            return false;
        }
        let s = s.trim();
        let e = e.trim();
        if case_sensitive {
            s == e
        } else {
            s.to_lowercase() == e.to_lowercase()
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use kambaz_db::models::{Choice, QuizData};

    use super::*;

    fn multiple_choice(points: f64, correct: Uuid, wrong: Uuid) -> Question {
        Question {
            id: Uuid::new_v4(),
            title: String::new(),
            question: "Capital of France?".to_string(),
            points,
            kind: QuestionKind::MultipleChoice {
                choices: vec![
                    Choice {
                        id: correct,
                        text: "Paris".to_string(),
                        is_correct: true,
                    },
                    Choice {
                        id: wrong,
                        text: "London".to_string(),
                        is_correct: false,
                    },
                ],
            },
        }
    }

    fn fill_in_blank(points: f64, answers: &[&str], case_sensitive: bool) -> Question {
        Question {
            id: Uuid::new_v4(),
            title: String::new(),
            question: String::new(),
            points,
            kind: QuestionKind::FillInBlank {
                possible_answers: answers.iter().map(|s| s.to_string()).collect(),
                case_sensitive,
            },
        }
    }

    fn quiz_with(questions: Vec<Question>) -> Quiz {
        let points = questions.iter().map(|q| q.points).sum();
        Quiz {
            id: Uuid::new_v4(),
            course: Uuid::new_v4(),
            data: QuizData {
                published: true,
                points,
                questions,
                ..Default::default()
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn full_and_zero_score() {
        let correct_choice = Uuid::new_v4();
        let wrong_choice = Uuid::new_v4();
        let mc = multiple_choice(2.0, correct_choice, wrong_choice);
        let fib = fill_in_blank(3.0, &["Paris"], false);
        let quiz = quiz_with(vec![mc.clone(), fib.clone()]);

        // Correct choice plus a sloppy but case-insensitively right blank.
        let outcome = grade_submission(
            &quiz,
            &[
                SubmittedAnswer {
                    question_id: mc.id,
                    answer: AnswerValue::Text(correct_choice.to_string()),
                },
                SubmittedAnswer {
                    question_id: fib.id,
                    answer: AnswerValue::Text("  paris ".to_string()),
                },
            ],
        );
        assert_eq!(outcome.score, 5.0);
        assert!(outcome.answers.iter().all(|a| a.is_correct));

        // Wrong choice, wrong blank.
        let outcome = grade_submission(
            &quiz,
            &[
                SubmittedAnswer {
                    question_id: mc.id,
                    answer: AnswerValue::Text(wrong_choice.to_string()),
                },
                SubmittedAnswer {
                    question_id: fib.id,
                    answer: AnswerValue::Text("London".to_string()),
                },
            ],
        );
        assert_eq!(outcome.score, 0.0);
        assert!(outcome.answers.iter().all(|a| !a.is_correct));
        assert!(outcome.answers.iter().all(|a| a.points_earned == 0.0));
    }

    #[test]
    fn true_false() {
        let question = Question {
            id: Uuid::new_v4(),
            title: String::new(),
            question: String::new(),
            points: 1.0,
            kind: QuestionKind::TrueFalse {
                correct_answer: true,
            },
        };
        let quiz = quiz_with(vec![question.clone()]);

        let right = grade_submission(
            &quiz,
            &[SubmittedAnswer {
                question_id: question.id,
                answer: AnswerValue::Bool(true),
            }],
        );
        assert_eq!(right.score, 1.0);

        let wrong = grade_submission(
            &quiz,
            &[SubmittedAnswer {
                question_id: question.id,
                answer: AnswerValue::Bool(false),
            }],
        );
        assert_eq!(wrong.score, 0.0);
    }

    #[test]
    fn multi_blank_is_positional() {
        let question = fill_in_blank(4.0, &["red", "blue"], false);
        let quiz = quiz_with(vec![question.clone()]);

        let grade = |answer: AnswerValue| {
            grade_submission(
                &quiz,
                &[SubmittedAnswer {
                    question_id: question.id,
                    answer,
                }],
            )
            .score
        };

        // Case-insensitive positional match.
        assert_eq!(
            grade(AnswerValue::Many(vec!["Red".to_string(), "Blue".to_string()])),
            4.0
        );
        // Wrong length.
        assert_eq!(grade(AnswerValue::Many(vec!["red".to_string()])), 0.0);
        // Wrong order.
        assert_eq!(
            grade(AnswerValue::Many(vec!["blue".to_string(), "red".to_string()])),
            0.0
        );
    }

    #[test]
    fn case_sensitive_blank() {
        let question = fill_in_blank(1.0, &["Paris"], true);
        let quiz = quiz_with(vec![question.clone()]);

        let grade = |text: &str| {
            grade_submission(
                &quiz,
                &[SubmittedAnswer {
                    question_id: question.id,
                    answer: AnswerValue::Text(text.to_string()),
                }],
            )
            .score
        };

        assert_eq!(grade("Paris"), 1.0);
        assert_eq!(grade(" Paris "), 1.0);
        assert_eq!(grade("paris"), 0.0);
        assert_eq!(grade(""), 0.0);
    }

    #[test]
    fn unknown_question_ids_are_skipped() {
        let question = fill_in_blank(1.0, &["x"], false);
        let quiz = quiz_with(vec![question]);

        let outcome = grade_submission(
            &quiz,
            &[SubmittedAnswer {
                question_id: Uuid::new_v4(),
                answer: AnswerValue::Text("x".to_string()),
            }],
        );
        assert!(outcome.answers.is_empty());
        assert_eq!(outcome.score, 0.0);
    }
}
