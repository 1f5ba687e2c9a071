use std::sync::Arc;

use course_core::Catalog;
use course_core::model::{Course, CourseId, Lesson, LessonId};
use course_core::navigation::{CourseAction, CourseNavigator, CourseOutcome, CoursePhase};
use course_core::unlock::{self, LessonStatus};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::CourseSessionError;
use crate::progress_store::{ProgressStore, SaveStatus};

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

/// One row of a course outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonStatusView {
    pub id: LessonId,
    pub title: String,
    pub duration: String,
    pub status: LessonStatus,
}

/// Snapshot of a learner's standing in one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseProgressView {
    pub course_id: CourseId,
    pub total_lessons: usize,
    pub completed_lessons: Vec<LessonId>,
    pub percentage: u8,
    pub quiz_eligible: bool,
    pub quiz_passed: bool,
    pub next_lesson: Option<LessonId>,
    pub lessons: Vec<LessonStatusView>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// A learner's open course: the immutable definition plus navigation state.
#[derive(Debug, Clone)]
pub struct CourseSession {
    course: Arc<Course>,
    navigator: CourseNavigator,
}

impl CourseSession {
    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn navigator(&self) -> &CourseNavigator {
        &self.navigator
    }

    #[must_use]
    pub fn phase(&self) -> CoursePhase {
        self.navigator.phase()
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.navigator.percentage()
    }

    /// The lesson being viewed, if any.
    #[must_use]
    pub fn current_lesson(&self) -> Option<&Lesson> {
        match self.navigator.phase() {
            CoursePhase::Viewing(id) => self.course.lesson(id),
            CoursePhase::Browsing | CoursePhase::QuizEligible => None,
        }
    }

    #[must_use]
    pub fn view(&self) -> CourseProgressView {
        let progress = self.navigator.progress();
        let lessons = unlock::lesson_statuses(&self.course, progress)
            .into_iter()
            .zip(self.course.lessons())
            .map(|((id, status), lesson)| LessonStatusView {
                id,
                title: lesson.title.clone(),
                duration: lesson.duration.clone(),
                status,
            })
            .collect();
        CourseProgressView {
            course_id: self.course.id().clone(),
            total_lessons: self.navigator.lesson_count(),
            completed_lessons: progress.completed_lessons().iter().copied().collect(),
            percentage: self.navigator.percentage(),
            quiz_eligible: self.navigator.is_quiz_eligible(),
            quiz_passed: progress.quiz_passed(),
            next_lesson: unlock::next_lesson(&self.course, progress),
            lessons,
        }
    }
}

/// Result of applying one action through the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseStep {
    pub outcome: CourseOutcome,
    /// Set when the action triggered a write.
    pub saved: Option<SaveStatus>,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Opens courses and drives lesson navigation, persisting completions.
#[derive(Clone)]
pub struct CourseController {
    catalog: Arc<Catalog>,
    progress: ProgressStore,
}

impl CourseController {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, progress: ProgressStore) -> Self {
        Self { catalog, progress }
    }

    /// Open `course_id` with its stored progress, in the browsing state.
    ///
    /// # Errors
    ///
    /// Returns `CourseSessionError::NotFound` for an unknown course.
    pub async fn open(&self, course_id: &str) -> Result<CourseSession, CourseSessionError> {
        let course = self
            .catalog
            .get(course_id)
            .cloned()
            .ok_or_else(|| CourseSessionError::NotFound {
                id: course_id.to_owned(),
            })?;
        let progress = self.progress.load(course.id()).await;
        let navigator = CourseNavigator::new(&course, progress);
        Ok(CourseSession { course, navigator })
    }

    /// Pull a quiz pass recorded since `session` was opened into it.
    ///
    /// Returns `true` when the session changed.
    pub async fn refresh(&self, session: &mut CourseSession) -> bool {
        if session.navigator.progress().quiz_passed() {
            return false;
        }
        if !self.progress.quiz_passed(session.course.id()).await {
            return false;
        }
        session.navigator.note_quiz_passed();
        debug!(course_id = %session.course.id(), "picked up stored quiz pass");
        true
    }

    /// Apply `action` to `session`, saving completed lessons when they change.
    ///
    /// The session always advances, even when the save fails.
    pub async fn apply(&self, session: &mut CourseSession, action: CourseAction) -> CourseStep {
        self.refresh(session).await;
        let (next, outcome) = session.navigator.apply(action);
        session.navigator = next;

        let course_id = session.course.id();
        let saved = if outcome.needs_persist() {
            let status = self
                .progress
                .save_completed_lessons(course_id, session.navigator.progress().completed_lessons())
                .await;
            info!(
                course_id = %course_id,
                percentage = session.navigator.percentage(),
                saved = status.is_saved(),
                "lesson completed"
            );
            Some(status)
        } else {
            if let CourseOutcome::Ignored(reason) = outcome {
                debug!(course_id = %course_id, ?reason, "course action ignored");
            }
            None
        };

        CourseStep { outcome, saved }
    }

    pub async fn select_lesson(&self, session: &mut CourseSession, lesson: LessonId) -> CourseStep {
        self.apply(session, CourseAction::SelectLesson(lesson)).await
    }

    pub async fn mark_complete(&self, session: &mut CourseSession) -> CourseStep {
        self.apply(session, CourseAction::MarkComplete).await
    }

    pub async fn back(&self, session: &mut CourseSession) -> CourseStep {
        self.apply(session, CourseAction::Back).await
    }

    /// Open the lesson and complete it in one go.
    ///
    /// Returns the step of the selection when it was ignored.
    pub async fn complete_lesson(&self, session: &mut CourseSession, lesson: LessonId) -> CourseStep {
        let opened = self.select_lesson(session, lesson).await;
        if !matches!(opened.outcome, CourseOutcome::Opened(_)) {
            return opened;
        }
        self.mark_complete(session).await
    }

    /// Stored progress of `course_id` without keeping a session open.
    ///
    /// # Errors
    ///
    /// Returns `CourseSessionError::NotFound` for an unknown course.
    pub async fn progress_view(&self, course_id: &str) -> Result<CourseProgressView, CourseSessionError> {
        Ok(self.open(course_id).await?.view())
    }

    /// Forget all stored progress for `course_id`.
    ///
    /// # Errors
    ///
    /// Returns `CourseSessionError::NotFound` for an unknown course.
    pub async fn reset(&self, course_id: &str) -> Result<SaveStatus, CourseSessionError> {
        let course = self
            .catalog
            .get(course_id)
            .ok_or_else(|| CourseSessionError::NotFound {
                id: course_id.to_owned(),
            })?;
        Ok(self.progress.clear(course.id()).await)
    }
}
