use std::collections::BTreeSet;
use std::sync::Arc;

use course_core::model::{CourseId, CourseProgress, LessonId};
use storage::progress_keys::{
    completed_lessons_key, decode_completed_lessons, decode_quiz_passed,
    encode_completed_lessons, encode_quiz_passed, quiz_passed_key,
};
use storage::repository::{KeyValueStore, StorageError};
use tracing::{debug, warn};

use crate::Clock;

/// Whether a best-effort write reached the medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Failed,
}

impl SaveStatus {
    #[must_use]
    pub fn is_saved(self) -> bool {
        matches!(self, SaveStatus::Saved)
    }

    fn from_result(result: &Result<(), StorageError>) -> Self {
        if result.is_ok() {
            SaveStatus::Saved
        } else {
            SaveStatus::Failed
        }
    }
}

/// Per-course progress persisted in a key/value store.
///
/// Reads never fail: missing or unreadable values load as the zero value.
/// Writes are best effort; failures are logged and reported as
/// [`SaveStatus::Failed`], and callers keep their in-memory state.
#[derive(Clone)]
pub struct ProgressStore {
    clock: Clock,
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(clock: Clock, kv: Arc<dyn KeyValueStore>) -> Self {
        Self { clock, kv }
    }

    pub async fn load(&self, course: &CourseId) -> CourseProgress {
        let completed = self.load_completed_lessons(course).await;
        let quiz_passed = self.quiz_passed(course).await;
        CourseProgress::from_persisted(completed, quiz_passed)
    }

    /// Write both facts. The quiz flag is only written when set, so a stored
    /// pass is never overwritten with `false`.
    pub async fn save(&self, course: &CourseId, progress: &CourseProgress) -> SaveStatus {
        let lessons = self
            .save_completed_lessons(course, progress.completed_lessons())
            .await;
        if !progress.quiz_passed() {
            return lessons;
        }
        match (lessons, self.save_quiz_passed(course).await) {
            (SaveStatus::Saved, SaveStatus::Saved) => SaveStatus::Saved,
            _ => SaveStatus::Failed,
        }
    }

    pub async fn save_completed_lessons(
        &self,
        course: &CourseId,
        lessons: &BTreeSet<LessonId>,
    ) -> SaveStatus {
        let key = completed_lessons_key(course);
        let result = match encode_completed_lessons(lessons) {
            Ok(value) => self.kv.put(&key, &value, self.clock.now()).await,
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            warn!(course_id = %course, key = %key, error = %err, "failed to save completed lessons");
        } else {
            debug!(course_id = %course, completed = lessons.len(), "saved completed lessons");
        }
        SaveStatus::from_result(&result)
    }

    pub async fn save_quiz_passed(&self, course: &CourseId) -> SaveStatus {
        let key = quiz_passed_key(course);
        let result = self
            .kv
            .put(&key, encode_quiz_passed(true), self.clock.now())
            .await;
        if let Err(err) = &result {
            warn!(course_id = %course, key = %key, error = %err, "failed to save quiz pass");
        }
        SaveStatus::from_result(&result)
    }

    /// Remove both keys for `course`.
    pub async fn clear(&self, course: &CourseId) -> SaveStatus {
        let mut status = SaveStatus::Saved;
        for key in [completed_lessons_key(course), quiz_passed_key(course)] {
            if let Err(err) = self.kv.remove(&key).await {
                warn!(course_id = %course, key = %key, error = %err, "failed to clear progress");
                status = SaveStatus::Failed;
            }
        }
        status
    }

    async fn load_completed_lessons(&self, course: &CourseId) -> BTreeSet<LessonId> {
        let key = completed_lessons_key(course);
        match self.kv.get(&key).await {
            Ok(Some(entry)) => decode_completed_lessons(&entry.value).unwrap_or_else(|err| {
                warn!(course_id = %course, key = %key, error = %err, "discarding malformed completed lessons");
                BTreeSet::new()
            }),
            Ok(None) => BTreeSet::new(),
            Err(err) => {
                warn!(course_id = %course, key = %key, error = %err, "failed to read completed lessons");
                BTreeSet::new()
            }
        }
    }

    /// Stored quiz flag for `course`. Read failures count as not passed.
    pub async fn quiz_passed(&self, course: &CourseId) -> bool {
        let key = quiz_passed_key(course);
        match self.kv.get(&key).await {
            Ok(Some(entry)) => decode_quiz_passed(&entry.value),
            Ok(None) => false,
            Err(err) => {
                warn!(course_id = %course, key = %key, error = %err, "failed to read quiz flag");
                false
            }
        }
    }
}
