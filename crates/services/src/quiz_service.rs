use std::sync::Arc;

use course_core::Catalog;
use course_core::model::{Course, QuizQuestion};
use course_core::quiz::{QuizAction, QuizAttempt, QuizOutcome, QuizResult};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::QuizSessionError;
use crate::progress_store::{ProgressStore, SaveStatus};

/// What the learner sees after answering a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealedAnswer<'a> {
    pub selected: usize,
    pub correct_option: usize,
    pub correct: bool,
    pub explanation: &'a str,
}

/// One in-memory run through a course quiz.
#[derive(Debug, Clone)]
pub struct QuizSession {
    course: Arc<Course>,
    attempt: QuizAttempt,
}

impl QuizSession {
    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn attempt(&self) -> &QuizAttempt {
        &self.attempt
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.attempt
            .current_question()
            .and_then(|i| self.course.quiz_questions().get(i))
    }

    /// Feedback for the current question once it has been answered.
    #[must_use]
    pub fn revealed(&self) -> Option<RevealedAnswer<'_>> {
        let selected = self.attempt.selected()?;
        let question = self.current_question()?;
        Some(RevealedAnswer {
            selected,
            correct_option: question.correct_option,
            correct: question.is_correct(selected),
            explanation: &question.explanation,
        })
    }

    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        self.attempt.progress_percent()
    }

    #[must_use]
    pub fn result(&self) -> Option<QuizResult> {
        self.attempt.result()
    }
}

/// Result of applying one quiz action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizStep {
    pub outcome: QuizOutcome,
    /// Set when a pass was written to the store.
    pub saved: Option<SaveStatus>,
}

/// Starts quiz attempts and records passes.
#[derive(Clone)]
pub struct QuizService {
    catalog: Arc<Catalog>,
    progress: ProgressStore,
}

impl QuizService {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, progress: ProgressStore) -> Self {
        Self { catalog, progress }
    }

    /// Begin a fresh attempt. Lesson completion is not required.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::NotFound` for an unknown course and
    /// `QuizSessionError::Quiz` when the course has no questions.
    pub fn start(&self, course_id: &str) -> Result<QuizSession, QuizSessionError> {
        let course = self
            .catalog
            .get(course_id)
            .cloned()
            .ok_or_else(|| QuizSessionError::NotFound {
                id: course_id.to_owned(),
            })?;
        let attempt =
            QuizAttempt::new(course.quiz_questions()).map_err(|source| QuizSessionError::Quiz {
                id: course_id.to_owned(),
                source,
            })?;
        Ok(QuizSession { course, attempt })
    }

    /// Apply `action`; a passing finish writes the quiz flag.
    ///
    /// A failed attempt never clears an earlier pass.
    pub async fn apply(&self, session: &mut QuizSession, action: QuizAction) -> QuizStep {
        let (next, outcome) = session.attempt.apply(action);
        session.attempt = next;

        let course_id = session.course.id();
        let saved = match outcome {
            QuizOutcome::Finished(result) => {
                info!(
                    course_id = %course_id,
                    score = result.score,
                    total = result.total,
                    passed = result.passed,
                    "quiz finished"
                );
                if result.passed {
                    Some(self.progress.save_quiz_passed(course_id).await)
                } else {
                    None
                }
            }
            QuizOutcome::Ignored(reason) => {
                debug!(course_id = %course_id, ?reason, "quiz action ignored");
                None
            }
            QuizOutcome::Answered { .. } | QuizOutcome::Advanced { .. } | QuizOutcome::Restarted => {
                None
            }
        };

        QuizStep { outcome, saved }
    }

    pub async fn select(&self, session: &mut QuizSession, option: usize) -> QuizStep {
        self.apply(session, QuizAction::Select(option)).await
    }

    pub async fn advance(&self, session: &mut QuizSession) -> QuizStep {
        self.apply(session, QuizAction::Advance).await
    }

    pub async fn retry(&self, session: &mut QuizSession) -> QuizStep {
        self.apply(session, QuizAction::Retry).await
    }
}
