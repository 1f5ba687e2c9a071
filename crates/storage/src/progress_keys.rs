//! Key layout and value encoding for persisted course progress.
//!
//! Each course owns two keys:
//!
//! - `<courseId>-completedLessons`: JSON array of completed lesson ids
//! - `<courseId>-completed`: quiz-passed flag, written as `"true"`
//!
//! The two keys are read and written independently.

use std::collections::BTreeSet;

use course_core::model::{CourseId, LessonId};

use crate::repository::StorageError;

const COMPLETED_LESSONS_SUFFIX: &str = "-completedLessons";
const QUIZ_PASSED_SUFFIX: &str = "-completed";

#[must_use]
pub fn completed_lessons_key(course: &CourseId) -> String {
    format!("{course}{COMPLETED_LESSONS_SUFFIX}")
}

#[must_use]
pub fn quiz_passed_key(course: &CourseId) -> String {
    format!("{course}{QUIZ_PASSED_SUFFIX}")
}

/// Encode completed lessons as a JSON array, ascending.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_completed_lessons(lessons: &BTreeSet<LessonId>) -> Result<String, StorageError> {
    let ids: Vec<u32> = lessons.iter().map(LessonId::value).collect();
    serde_json::to_string(&ids).map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Decode a stored lesson array. Duplicates collapse.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the value is not an array of
/// non-negative integers.
pub fn decode_completed_lessons(raw: &str) -> Result<BTreeSet<LessonId>, StorageError> {
    let ids: Vec<u32> =
        serde_json::from_str(raw).map_err(|err| StorageError::Serialization(err.to_string()))?;
    Ok(ids.into_iter().map(LessonId::new).collect())
}

#[must_use]
pub fn encode_quiz_passed(passed: bool) -> &'static str {
    if passed { "true" } else { "false" }
}

/// Any stored value other than an explicit false marker counts as passed.
#[must_use]
pub fn decode_quiz_passed(raw: &str) -> bool {
    !matches!(raw.trim(), "" | "false" | "0")
}
