mod content;
mod course;
mod ids;
mod progress;

pub use content::{ContentBlock, ContentBlockError};
pub use course::{Course, CourseDraft, CourseError, CourseSummary, Instructor, Lesson, QuizQuestion};
pub use ids::{CourseId, CourseIdError, LessonId, ParseIdError, QuestionId};
pub use progress::{CourseProgress, percentage};
