//! Lesson navigation state machine for a single course.
//!
//! Transitions are pure: [`CourseNavigator::apply`] returns the next
//! navigator together with an outcome describing what happened. Persisting
//! newly completed lessons is the caller's job.

use serde::Serialize;

use crate::model::{Course, CourseProgress, LessonId};
use crate::unlock;

/// Stored navigation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "lesson", rename_all = "snake_case")]
pub enum CourseView {
    Browsing,
    Viewing(LessonId),
}

/// Navigation state as presented, including the derived quiz-eligible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "lesson", rename_all = "snake_case")]
pub enum CoursePhase {
    Browsing,
    Viewing(LessonId),
    QuizEligible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseAction {
    SelectLesson(LessonId),
    MarkComplete,
    Back,
}

/// Why an action left the navigator unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "lesson", rename_all = "snake_case")]
pub enum IgnoredReason {
    LessonLocked(LessonId),
    UnknownLesson(LessonId),
    AlreadyViewing(LessonId),
    NotViewing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseOutcome {
    Opened(LessonId),
    /// `newly_completed` is false when the lesson was already done.
    Completed {
        lesson: LessonId,
        newly_completed: bool,
    },
    Closed(LessonId),
    Ignored(IgnoredReason),
}

impl CourseOutcome {
    /// True when the outcome changed completion state and should be saved.
    #[must_use]
    pub fn needs_persist(&self) -> bool {
        matches!(
            self,
            CourseOutcome::Completed {
                newly_completed: true,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseNavigator {
    lesson_count: usize,
    view: CourseView,
    progress: CourseProgress,
}

impl CourseNavigator {
    /// Start browsing `course` with previously stored progress.
    ///
    /// Completed ids outside the course's lesson range are discarded.
    #[must_use]
    pub fn new(course: &Course, mut progress: CourseProgress) -> Self {
        let lesson_count = course.lesson_count();
        progress.retain_within(lesson_count);
        Self {
            lesson_count,
            view: CourseView::Browsing,
            progress,
        }
    }

    #[must_use]
    pub fn view(&self) -> CourseView {
        self.view
    }

    #[must_use]
    pub fn phase(&self) -> CoursePhase {
        match self.view {
            CourseView::Viewing(lesson) => CoursePhase::Viewing(lesson),
            CourseView::Browsing if self.is_quiz_eligible() => CoursePhase::QuizEligible,
            CourseView::Browsing => CoursePhase::Browsing,
        }
    }

    #[must_use]
    pub fn progress(&self) -> &CourseProgress {
        &self.progress
    }

    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.lesson_count
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.progress.percentage(self.lesson_count)
    }

    #[must_use]
    pub fn is_quiz_eligible(&self) -> bool {
        self.progress.all_completed(self.lesson_count)
    }

    #[must_use]
    pub fn is_unlocked(&self, lesson: LessonId) -> bool {
        self.contains(lesson) && unlock::is_unlocked(lesson, self.progress.completed_lessons())
    }

    /// Record a quiz pass observed elsewhere so the in-memory copy stays in
    /// step with the store.
    pub fn note_quiz_passed(&mut self) {
        self.progress.mark_quiz_passed();
    }

    /// Apply one user action and return the resulting navigator.
    #[must_use]
    pub fn apply(&self, action: CourseAction) -> (Self, CourseOutcome) {
        let mut next = self.clone();
        let outcome = match (self.view, action) {
            (CourseView::Browsing, CourseAction::SelectLesson(lesson)) => {
                if !self.contains(lesson) {
                    CourseOutcome::Ignored(IgnoredReason::UnknownLesson(lesson))
                } else if !self.is_unlocked(lesson) {
                    CourseOutcome::Ignored(IgnoredReason::LessonLocked(lesson))
                } else {
                    next.view = CourseView::Viewing(lesson);
                    CourseOutcome::Opened(lesson)
                }
            }
            (CourseView::Viewing(current), CourseAction::SelectLesson(_)) => {
                CourseOutcome::Ignored(IgnoredReason::AlreadyViewing(current))
            }
            (CourseView::Viewing(lesson), CourseAction::MarkComplete) => {
                let newly_completed = next.progress.mark_completed(lesson);
                next.view = CourseView::Browsing;
                CourseOutcome::Completed {
                    lesson,
                    newly_completed,
                }
            }
            (CourseView::Viewing(lesson), CourseAction::Back) => {
                next.view = CourseView::Browsing;
                CourseOutcome::Closed(lesson)
            }
            (CourseView::Browsing, CourseAction::MarkComplete | CourseAction::Back) => {
                CourseOutcome::Ignored(IgnoredReason::NotViewing)
            }
        };
        (next, outcome)
    }

    fn contains(&self, lesson: LessonId) -> bool {
        usize::try_from(lesson.value()).is_ok_and(|v| v >= 1 && v <= self.lesson_count)
    }
}
