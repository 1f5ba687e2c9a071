//! Deterministic course fixtures for tests. Enabled with the `test-support` feature.

use crate::model::{ContentBlock, Course, CourseDraft, Instructor, Lesson, LessonId, QuestionId, QuizQuestion};

/// A four-option question whose correct answer is `correct`.
#[must_use]
pub fn question(id: u32, correct: usize) -> QuizQuestion {
    QuizQuestion {
        id: QuestionId::new(id),
        prompt: format!("Question {id}?"),
        options: (0..4).map(|i| format!("Option {i}")).collect(),
        correct_option: correct,
        explanation: format!("Option {correct} is right."),
    }
}

/// A lesson with a heading and one paragraph.
#[must_use]
pub fn lesson(id: u32) -> Lesson {
    Lesson {
        id: LessonId::new(id),
        title: format!("Lesson {id}"),
        duration: "10 min".into(),
        content: vec![
            ContentBlock::Heading {
                content: format!("Lesson {id}"),
            },
            ContentBlock::Paragraph {
                content: "Body text.".into(),
            },
        ],
    }
}

/// Draft course with `lessons` sequential lessons and `questions` quiz
/// questions; question `n` has correct option `n % 4`.
#[must_use]
pub fn course_draft(id: &str, lessons: u32, questions: u32) -> CourseDraft {
    CourseDraft {
        id: id.to_string(),
        title: format!("Course {id}"),
        description: "A test course.".into(),
        level: "Beginner".into(),
        total_duration: "1 hour".into(),
        instructor: Instructor {
            name: "Test Instructor".into(),
            title: "Tester".into(),
            bio: None,
        },
        learning_outcomes: vec!["Pass the tests".into()],
        hero_image: None,
        gradient_color: None,
        lessons: (1..=lessons).map(lesson).collect(),
        quiz_questions: (1..=questions)
            .map(|n| question(n, (n % 4) as usize))
            .collect(),
    }
}

/// Validated variant of [`course_draft`].
///
/// # Panics
///
/// Panics if `id` is not a valid course slug.
#[must_use]
pub fn course(id: &str, lessons: u32, questions: u32) -> Course {
    course_draft(id, lessons, questions)
        .validate()
        .expect("fixture course should be valid")
}
