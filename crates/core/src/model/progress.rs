use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::ids::LessonId;

/// Per-course learner progress: completed lessons and the quiz-passed flag.
///
/// `quiz_passed` only ever moves from `false` to `true` through this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseProgress {
    completed_lessons: BTreeSet<LessonId>,
    quiz_passed: bool,
}

impl CourseProgress {
    /// Zero-value progress: nothing completed, quiz not passed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate progress from persisted facts.
    #[must_use]
    pub fn from_persisted(
        completed_lessons: impl IntoIterator<Item = LessonId>,
        quiz_passed: bool,
    ) -> Self {
        Self {
            completed_lessons: completed_lessons.into_iter().collect(),
            quiz_passed,
        }
    }

    #[must_use]
    pub fn completed_lessons(&self) -> &BTreeSet<LessonId> {
        &self.completed_lessons
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_lessons.len()
    }

    #[must_use]
    pub fn is_completed(&self, lesson: LessonId) -> bool {
        self.completed_lessons.contains(&lesson)
    }

    #[must_use]
    pub fn quiz_passed(&self) -> bool {
        self.quiz_passed
    }

    /// Record a lesson as completed. Returns `true` if it was newly added.
    pub fn mark_completed(&mut self, lesson: LessonId) -> bool {
        self.completed_lessons.insert(lesson)
    }

    /// Set the quiz-passed flag. Returns `true` if it changed.
    pub fn mark_quiz_passed(&mut self) -> bool {
        let changed = !self.quiz_passed;
        self.quiz_passed = true;
        changed
    }

    /// Drop completed ids that do not exist in a course of `lesson_count`
    /// lessons. Returns the number of ids removed.
    pub fn retain_within(&mut self, lesson_count: usize) -> usize {
        let before = self.completed_lessons.len();
        self.completed_lessons.retain(|id| {
            usize::try_from(id.value()).is_ok_and(|v| v >= 1 && v <= lesson_count)
        });
        before - self.completed_lessons.len()
    }

    /// `round(100 * completed / total)`; 0 for a course without lessons.
    #[must_use]
    pub fn percentage(&self, lesson_count: usize) -> u8 {
        percentage(self.completed_lessons.len(), lesson_count)
    }

    /// True once every lesson of the course is completed.
    #[must_use]
    pub fn all_completed(&self, lesson_count: usize) -> bool {
        self.completed_lessons.len() == lesson_count
    }
}

/// Whole-number percentage of `part` over `total`, rounding halves up.
#[must_use]
pub fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let part = part.min(total) as u64;
    let total = total as u64;
    // floor(100 * part / total + 1/2) without floats
    let value = (200 * part + total) / (2 * total);
    u8::try_from(value).unwrap_or(100)
}
