//! Sequential lesson unlocking.
//!
//! Lesson `k` opens once lesson `k - 1` is completed; lesson 1 is always
//! open. The rule itself does not check that `completed` is a valid chain.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{Course, CourseProgress, LessonId};

/// Returns `true` if `lesson` may be opened given the completed set.
#[must_use]
pub fn is_unlocked(lesson: LessonId, completed: &BTreeSet<LessonId>) -> bool {
    match lesson.predecessor() {
        None => lesson == LessonId::FIRST,
        Some(prev) => completed.contains(&prev),
    }
}

/// Access state of one lesson, as shown in a course outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    Locked,
    Unlocked,
    Completed,
}

/// Status of every lesson of `course`, in course order.
#[must_use]
pub fn lesson_statuses(course: &Course, progress: &CourseProgress) -> Vec<(LessonId, LessonStatus)> {
    course
        .lessons()
        .iter()
        .map(|lesson| (lesson.id, status_of(lesson.id, progress)))
        .collect()
}

/// Status of a single lesson.
#[must_use]
pub fn status_of(lesson: LessonId, progress: &CourseProgress) -> LessonStatus {
    if progress.is_completed(lesson) {
        LessonStatus::Completed
    } else if is_unlocked(lesson, progress.completed_lessons()) {
        LessonStatus::Unlocked
    } else {
        LessonStatus::Locked
    }
}

/// Ids of the lessons that can currently be opened. Empty for a course with
/// no lessons.
#[must_use]
pub fn unlocked_lessons(course: &Course, progress: &CourseProgress) -> Vec<LessonId> {
    course
        .lessons()
        .iter()
        .map(|lesson| lesson.id)
        .filter(|id| is_unlocked(*id, progress.completed_lessons()))
        .collect()
}

/// First open lesson that is not completed yet, if any.
#[must_use]
pub fn next_lesson(course: &Course, progress: &CourseProgress) -> Option<LessonId> {
    lesson_statuses(course, progress)
        .into_iter()
        .find(|(_, status)| *status == LessonStatus::Unlocked)
        .map(|(id, _)| id)
}
