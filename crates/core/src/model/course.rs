use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::content::{ContentBlock, ContentBlockError};
use crate::model::ids::{CourseId, CourseIdError, LessonId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error(transparent)]
    InvalidId(#[from] CourseIdError),

    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("lesson at position {position} has id {found}, expected {expected}")]
    LessonOutOfSequence {
        position: usize,
        expected: u32,
        found: u32,
    },

    #[error("lesson {lesson} has an empty title")]
    EmptyLessonTitle { lesson: LessonId },

    #[error("lesson {lesson}, block {index}: {source}")]
    InvalidContent {
        lesson: LessonId,
        index: usize,
        #[source]
        source: ContentBlockError,
    },

    #[error("question {question} is listed more than once")]
    DuplicateQuestion { question: QuestionId },

    #[error("question {question} has an empty prompt")]
    EmptyPrompt { question: QuestionId },

    #[error("question {question} needs at least two options, has {count}")]
    TooFewOptions { question: QuestionId, count: usize },

    #[error("question {question} marks option {index} correct but only has {count}")]
    CorrectOptionOutOfRange {
        question: QuestionId,
        index: usize,
        count: usize,
    },
}

//
// ─── COURSE PARTS ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub duration: String,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_option: usize,
    pub explanation: String,
}

impl QuizQuestion {
    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_option
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated course as read from a content file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CourseDraft {
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: String,
    pub total_duration: String,
    pub instructor: Instructor,
    #[serde(default)]
    pub learning_outcomes: Vec<String>,
    #[serde(default)]
    pub hero_image: Option<String>,
    #[serde(default)]
    pub gradient_color: Option<String>,
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub quiz_questions: Vec<QuizQuestion>,
}

impl CourseDraft {
    /// Validate structure and produce an immutable `Course`.
    ///
    /// Lesson ids must run `1..=N` in listing order since that order is the
    /// unlock chain.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` for the first violation found.
    pub fn validate(self) -> Result<Course, CourseError> {
        let id = CourseId::new(self.id)?;
        if self.title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }

        for (position, lesson) in self.lessons.iter().enumerate() {
            let expected = u32::try_from(position + 1).unwrap_or(u32::MAX);
            if lesson.id.value() != expected {
                return Err(CourseError::LessonOutOfSequence {
                    position,
                    expected,
                    found: lesson.id.value(),
                });
            }
            if lesson.title.trim().is_empty() {
                return Err(CourseError::EmptyLessonTitle { lesson: lesson.id });
            }
            for (index, block) in lesson.content.iter().enumerate() {
                block
                    .validate()
                    .map_err(|source| CourseError::InvalidContent {
                        lesson: lesson.id,
                        index,
                        source,
                    })?;
            }
        }

        let mut seen = HashSet::new();
        for question in &self.quiz_questions {
            if !seen.insert(question.id) {
                return Err(CourseError::DuplicateQuestion {
                    question: question.id,
                });
            }
            if question.prompt.trim().is_empty() {
                return Err(CourseError::EmptyPrompt {
                    question: question.id,
                });
            }
            let count = question.options.len();
            if count < 2 {
                return Err(CourseError::TooFewOptions {
                    question: question.id,
                    count,
                });
            }
            if question.correct_option >= count {
                return Err(CourseError::CorrectOptionOutOfRange {
                    question: question.id,
                    index: question.correct_option,
                    count,
                });
            }
        }

        Ok(Course {
            id,
            title: self.title,
            description: self.description,
            level: self.level,
            total_duration: self.total_duration,
            instructor: self.instructor,
            learning_outcomes: self.learning_outcomes,
            hero_image: self.hero_image,
            gradient_color: self.gradient_color,
            lessons: self.lessons,
            quiz_questions: self.quiz_questions,
        })
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Immutable course definition: metadata, ordered lessons and the quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    id: CourseId,
    title: String,
    description: String,
    level: String,
    total_duration: String,
    instructor: Instructor,
    learning_outcomes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hero_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gradient_color: Option<String>,
    lessons: Vec<Lesson>,
    quiz_questions: Vec<QuizQuestion>,
}

impl Course {
    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    #[must_use]
    pub fn total_duration(&self) -> &str {
        &self.total_duration
    }

    #[must_use]
    pub fn instructor(&self) -> &Instructor {
        &self.instructor
    }

    #[must_use]
    pub fn learning_outcomes(&self) -> &[String] {
        &self.learning_outcomes
    }

    #[must_use]
    pub fn hero_image(&self) -> Option<&str> {
        self.hero_image.as_deref()
    }

    #[must_use]
    pub fn gradient_color(&self) -> Option<&str> {
        self.gradient_color.as_deref()
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    /// Look up a lesson by id. Ids are positional, so this is an index.
    #[must_use]
    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        let index = usize::try_from(id.value()).ok()?.checked_sub(1)?;
        self.lessons.get(index)
    }

    #[must_use]
    pub fn has_lesson(&self, id: LessonId) -> bool {
        self.lesson(id).is_some()
    }

    #[must_use]
    pub fn quiz_questions(&self) -> &[QuizQuestion] {
        &self.quiz_questions
    }

    #[must_use]
    pub fn has_quiz(&self) -> bool {
        !self.quiz_questions.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            level: self.level.clone(),
            total_duration: self.total_duration.clone(),
            instructor: self.instructor.name.clone(),
            total_lessons: self.lessons.len(),
            total_questions: self.quiz_questions.len(),
            hero_image: self.hero_image.clone(),
            gradient_color: self.gradient_color.clone(),
        }
    }
}

/// Listing view of a course for index pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSummary {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub level: String,
    pub total_duration: String,
    pub instructor: String,
    pub total_lessons: usize,
    pub total_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_color: Option<String>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{course_draft, question};

    #[test]
    fn valid_draft_becomes_course() {
        let course = course_draft("budgeting", 3, 4).validate().unwrap();
        assert_eq!(course.id().as_str(), "budgeting");
        assert_eq!(course.lesson_count(), 3);
        assert_eq!(course.quiz_questions().len(), 4);
        assert_eq!(course.lesson(LessonId::new(2)).unwrap().id, LessonId::new(2));
        assert!(course.lesson(LessonId::new(0)).is_none());
        assert!(course.lesson(LessonId::new(4)).is_none());
    }

    #[test]
    fn lessons_must_be_contiguous_from_one() {
        let mut draft = course_draft("budgeting", 3, 0);
        draft.lessons[2].id = LessonId::new(4);
        assert_eq!(
            draft.validate().unwrap_err(),
            CourseError::LessonOutOfSequence {
                position: 2,
                expected: 3,
                found: 4
            }
        );

        let mut zero_based = course_draft("budgeting", 1, 0);
        zero_based.lessons[0].id = LessonId::new(0);
        assert!(matches!(
            zero_based.validate(),
            Err(CourseError::LessonOutOfSequence { expected: 1, .. })
        ));
    }

    #[test]
    fn question_needs_two_options_and_valid_answer() {
        let mut draft = course_draft("budgeting", 1, 0);
        let mut q = question(1, 0);
        q.options.truncate(1);
        draft.quiz_questions.push(q);
        assert!(matches!(
            draft.validate(),
            Err(CourseError::TooFewOptions { count: 1, .. })
        ));

        let mut draft = course_draft("budgeting", 1, 0);
        draft.quiz_questions.push(question(1, 4));
        assert!(matches!(
            draft.validate(),
            Err(CourseError::CorrectOptionOutOfRange {
                index: 4,
                count: 4,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_question_ids_are_rejected() {
        let mut draft = course_draft("budgeting", 1, 0);
        draft.quiz_questions.push(question(1, 0));
        draft.quiz_questions.push(question(1, 2));
        assert!(matches!(
            draft.validate(),
            Err(CourseError::DuplicateQuestion { .. })
        ));
    }

    #[test]
    fn invalid_block_reports_lesson_and_index() {
        let mut draft = course_draft("budgeting", 2, 0);
        draft.lessons[1].content.push(ContentBlock::Tip {
            content: " ".into(),
        });
        assert!(matches!(
            draft.validate(),
            Err(CourseError::InvalidContent {
                lesson,
                index: 2,
                ..
            }) if lesson == LessonId::new(2)
        ));
    }

    #[test]
    fn empty_course_is_structurally_valid() {
        let course = course_draft("placeholder", 0, 0).validate().unwrap();
        assert_eq!(course.lesson_count(), 0);
        assert!(!course.has_quiz());
    }

    #[test]
    fn summary_counts_lessons_and_questions() {
        let summary = course_draft("budgeting", 3, 5).validate().unwrap().summary();
        assert_eq!(summary.total_lessons, 3);
        assert_eq!(summary.total_questions, 5);
        assert_eq!(summary.instructor, "Test Instructor");
    }
}
