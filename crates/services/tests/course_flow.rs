use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::Catalog;
use course_core::fixtures::course;
use course_core::model::LessonId;
use course_core::navigation::{CourseOutcome, CoursePhase, IgnoredReason};
use course_core::time::fixed_clock;
use course_core::unlock::LessonStatus;
use services::{AppServices, CourseSessionError, SaveStatus};
use storage::repository::{InMemoryRepository, KeyValueStore, KvEntry, Storage, StorageError};

struct OfflineStore;

#[async_trait]
impl KeyValueStore for OfflineStore {
    async fn get(&self, _key: &str) -> Result<Option<KvEntry>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn put(&self, _key: &str, _value: &str, _at: DateTime<Utc>) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

fn services_with(repo: Arc<dyn KeyValueStore>) -> AppServices {
    let catalog = Catalog::from_courses([course("three", 3, 4), course("empty", 0, 0)]).unwrap();
    AppServices::from_parts(Arc::new(catalog), &Storage::from_store(repo), fixed_clock())
}

fn lesson(id: u32) -> LessonId {
    LessonId::new(id)
}

#[tokio::test]
async fn completing_every_lesson_makes_quiz_eligible() {
    let repo = InMemoryRepository::new();
    let services = services_with(Arc::new(repo.clone()));
    let courses = services.courses();
    let mut session = courses.open("three").await.unwrap();
    assert_eq!(session.phase(), CoursePhase::Browsing);

    let mut seen = Vec::new();
    for id in 1..=3 {
        let step = courses.complete_lesson(&mut session, lesson(id)).await;
        assert_eq!(step.saved, Some(SaveStatus::Saved));
        seen.push(session.percentage());
    }
    assert_eq!(seen, vec![33, 67, 100]);
    assert_eq!(session.phase(), CoursePhase::QuizEligible);

    let stored = repo.get("three-completedLessons").await.unwrap().unwrap();
    assert_eq!(stored.value, "[1,2,3]");
}

#[tokio::test]
async fn locked_lesson_selection_changes_nothing() {
    let repo = InMemoryRepository::new();
    let services = services_with(Arc::new(repo.clone()));
    let courses = services.courses();
    let mut session = courses.open("three").await.unwrap();

    let step = courses.select_lesson(&mut session, lesson(3)).await;
    assert_eq!(
        step.outcome,
        CourseOutcome::Ignored(IgnoredReason::LessonLocked(lesson(3)))
    );
    assert_eq!(step.saved, None);
    assert_eq!(session.phase(), CoursePhase::Browsing);
    assert_eq!(repo.len().unwrap(), 0);
}

#[tokio::test]
async fn viewing_and_going_back_does_not_persist() {
    let repo = InMemoryRepository::new();
    let services = services_with(Arc::new(repo.clone()));
    let courses = services.courses();
    let mut session = courses.open("three").await.unwrap();

    courses.select_lesson(&mut session, lesson(1)).await;
    assert_eq!(session.current_lesson().unwrap().title, "Lesson 1");
    let step = courses.back(&mut session).await;
    assert_eq!(step.outcome, CourseOutcome::Closed(lesson(1)));
    assert!(session.current_lesson().is_none());
    assert_eq!(repo.len().unwrap(), 0);
}

#[tokio::test]
async fn reopening_restores_stored_progress() {
    let repo = InMemoryRepository::new();
    let services = services_with(Arc::new(repo.clone()));
    let courses = services.courses();

    let mut session = courses.open("three").await.unwrap();
    courses.complete_lesson(&mut session, lesson(1)).await;
    courses.complete_lesson(&mut session, lesson(2)).await;

    let view = courses.progress_view("three").await.unwrap();
    assert_eq!(view.completed_lessons, vec![lesson(1), lesson(2)]);
    assert_eq!(view.percentage, 67);
    assert_eq!(view.next_lesson, Some(lesson(3)));
    let statuses: Vec<LessonStatus> = view.lessons.iter().map(|l| l.status).collect();
    assert_eq!(
        statuses,
        vec![
            LessonStatus::Completed,
            LessonStatus::Completed,
            LessonStatus::Unlocked
        ]
    );
}

#[tokio::test]
async fn completing_twice_writes_once() {
    let repo = InMemoryRepository::new();
    let services = services_with(Arc::new(repo.clone()));
    let courses = services.courses();
    let mut session = courses.open("three").await.unwrap();

    courses.complete_lesson(&mut session, lesson(1)).await;
    let again = courses.complete_lesson(&mut session, lesson(1)).await;
    assert_eq!(
        again.outcome,
        CourseOutcome::Completed {
            lesson: lesson(1),
            newly_completed: false
        }
    );
    assert_eq!(again.saved, None);
    assert_eq!(session.percentage(), 33);
}

#[tokio::test]
async fn unknown_course_is_not_found() {
    let services = services_with(Arc::new(InMemoryRepository::new()));
    let err = services.courses().open("nope").await.unwrap_err();
    assert!(matches!(err, CourseSessionError::NotFound { id } if id == "nope"));
}

#[tokio::test]
async fn empty_course_has_nothing_to_open() {
    let services = services_with(Arc::new(InMemoryRepository::new()));
    let courses = services.courses();
    let mut session = courses.open("empty").await.unwrap();
    assert_eq!(session.percentage(), 0);
    let step = courses.select_lesson(&mut session, lesson(1)).await;
    assert_eq!(
        step.outcome,
        CourseOutcome::Ignored(IgnoredReason::UnknownLesson(lesson(1)))
    );
}

#[tokio::test]
async fn failed_write_keeps_in_memory_progress() {
    let services = services_with(Arc::new(OfflineStore));
    let courses = services.courses();
    let mut session = courses.open("three").await.unwrap();
    assert_eq!(session.percentage(), 0);

    let step = courses.complete_lesson(&mut session, lesson(1)).await;
    assert_eq!(step.saved, Some(SaveStatus::Failed));
    assert_eq!(session.percentage(), 33);
    assert!(session.navigator().is_unlocked(lesson(2)));
}

#[tokio::test]
async fn reset_forgets_progress() {
    let repo = InMemoryRepository::new();
    let services = services_with(Arc::new(repo.clone()));
    let courses = services.courses();
    let mut session = courses.open("three").await.unwrap();
    courses.complete_lesson(&mut session, lesson(1)).await;

    assert_eq!(courses.reset("three").await.unwrap(), SaveStatus::Saved);
    assert_eq!(courses.progress_view("three").await.unwrap().percentage, 0);
    assert!(courses.reset("nope").await.is_err());
}

#[tokio::test]
async fn bundled_catalog_opens_every_course() {
    let services = AppServices::in_memory(fixed_clock()).unwrap();
    for id in services.queries().course_ids() {
        let session = services.courses().open(id.as_str()).await.unwrap();
        assert_eq!(session.phase(), CoursePhase::Browsing);
        assert_eq!(session.view().next_lesson, Some(lesson(1)));
    }
}

#[tokio::test]
async fn open_session_sees_quiz_pass_recorded_later() {
    let services = services_with(Arc::new(InMemoryRepository::new()));
    let courses = services.courses();
    let quizzes = services.quizzes();
    let mut session = courses.open("three").await.unwrap();
    for id in 1..=3 {
        courses.complete_lesson(&mut session, lesson(id)).await;
    }
    assert!(!session.view().quiz_passed);

    let mut quiz = quizzes.start("three").unwrap();
    while let Some(correct) = quiz.current_question().map(|q| q.correct_option) {
        quizzes.select(&mut quiz, correct).await;
        quizzes.advance(&mut quiz).await;
    }
    assert!(quiz.result().unwrap().passed);
    assert!(services.progress().load(session.course().id()).await.quiz_passed());

    assert!(courses.refresh(&mut session).await);
    assert!(session.view().quiz_passed);
    assert!(!courses.refresh(&mut session).await);
}

#[tokio::test]
async fn navigation_picks_up_stored_quiz_pass() {
    let repo = InMemoryRepository::new();
    let services = services_with(Arc::new(repo.clone()));
    let courses = services.courses();
    let mut session = courses.open("three").await.unwrap();

    repo.put("three-completed", "true", course_core::time::fixed_now())
        .await
        .unwrap();
    courses.select_lesson(&mut session, lesson(1)).await;
    assert!(session.view().quiz_passed);
}
