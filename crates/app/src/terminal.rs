//! Line-oriented front end used by the `courses`, `progress`, `complete`,
//! `reset` and `quiz` subcommands.

use std::io::Write;

use course_core::model::LessonId;
use course_core::navigation::CourseOutcome;
use course_core::quiz::{QuizOutcome, QuizResult};
use course_core::unlock::LessonStatus;
use services::{AppServices, CourseSessionError, QuizSession, QuizSessionError, SaveStatus};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TerminalError {
    #[error(transparent)]
    Course(#[from] CourseSessionError),
    #[error(transparent)]
    Quiz(#[from] QuizSessionError),
    #[error("invalid lesson id: {raw}")]
    InvalidLesson { raw: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn print_courses(services: &AppServices, out: &mut impl Write) -> Result<(), TerminalError> {
    for summary in services.queries().summaries() {
        writeln!(
            out,
            "{:<24} {} ({} lessons, {}, {})",
            summary.id, summary.title, summary.total_lessons, summary.total_duration, summary.level
        )?;
    }
    Ok(())
}

pub async fn print_progress(
    services: &AppServices,
    course_id: &str,
    out: &mut impl Write,
) -> Result<(), TerminalError> {
    let view = services.courses().progress_view(course_id).await?;
    writeln!(
        out,
        "{}: {}/{} lessons ({}%)",
        view.course_id,
        view.completed_lessons.len(),
        view.total_lessons,
        view.percentage
    )?;
    for lesson in &view.lessons {
        let marker = match lesson.status {
            LessonStatus::Completed => "[x]",
            LessonStatus::Unlocked => "[ ]",
            LessonStatus::Locked => "[-]",
        };
        writeln!(out, "  {marker} {}. {} ({})", lesson.id, lesson.title, lesson.duration)?;
    }
    if view.quiz_passed {
        writeln!(out, "Quiz passed.")?;
    } else if view.quiz_eligible {
        writeln!(out, "All lessons done. Ready for the quiz.")?;
    }
    Ok(())
}

pub async fn complete_lesson(
    services: &AppServices,
    course_id: &str,
    raw_lesson: &str,
    out: &mut impl Write,
) -> Result<(), TerminalError> {
    let lesson: LessonId = raw_lesson.parse().map_err(|_| TerminalError::InvalidLesson {
        raw: raw_lesson.to_owned(),
    })?;
    let courses = services.courses();
    let mut session = courses.open(course_id).await?;
    let step = courses.complete_lesson(&mut session, lesson).await;

    match step.outcome {
        CourseOutcome::Completed {
            newly_completed: true,
            ..
        } => writeln!(out, "Lesson {lesson} completed ({}%).", session.percentage())?,
        CourseOutcome::Completed { .. } => writeln!(out, "Lesson {lesson} was already completed.")?,
        CourseOutcome::Ignored(reason) => writeln!(out, "Lesson {lesson} not available: {reason:?}")?,
        CourseOutcome::Opened(_) | CourseOutcome::Closed(_) => {}
    }
    if step.saved == Some(SaveStatus::Failed) {
        writeln!(out, "Warning: progress could not be saved.")?;
    }
    Ok(())
}

pub async fn reset_progress(
    services: &AppServices,
    course_id: &str,
    out: &mut impl Write,
) -> Result<(), TerminalError> {
    match services.courses().reset(course_id).await? {
        SaveStatus::Saved => writeln!(out, "Progress for {course_id} cleared.")?,
        SaveStatus::Failed => writeln!(out, "Could not clear progress for {course_id}.")?,
    }
    Ok(())
}

/// Run an interactive quiz reading commands line by line from `input`.
///
/// Returns the result of the last finished attempt, if any.
pub async fn run_quiz<R>(
    services: &AppServices,
    course_id: &str,
    input: R,
    out: &mut impl Write,
) -> Result<Option<QuizResult>, TerminalError>
where
    R: AsyncBufRead + Unpin,
{
    let quizzes = services.quizzes();
    let mut session = quizzes.start(course_id)?;
    let mut last_result = None;

    writeln!(out, "{} quiz", session.course().title())?;
    render_question(&session, out)?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        let step = match command {
            "" => continue,
            "quit" | "q" => break,
            "next" | "n" => quizzes.advance(&mut session).await,
            "retry" | "r" => quizzes.retry(&mut session).await,
            other => match other.parse::<usize>() {
                Ok(choice) if choice >= 1 => quizzes.select(&mut session, choice - 1).await,
                _ => {
                    writeln!(out, "Enter an option number, `next`, `retry` or `quit`.")?;
                    continue;
                }
            },
        };

        match step.outcome {
            QuizOutcome::Answered { .. } => render_reveal(&session, out)?,
            QuizOutcome::Advanced { .. } | QuizOutcome::Restarted => render_question(&session, out)?,
            QuizOutcome::Finished(result) => {
                render_result(&result, out)?;
                if step.saved == Some(SaveStatus::Failed) {
                    writeln!(out, "Warning: quiz result could not be saved.")?;
                }
                last_result = Some(result);
            }
            QuizOutcome::Ignored(reason) => writeln!(out, "Ignored: {reason:?}")?,
        }
    }

    Ok(last_result)
}

fn render_question(session: &QuizSession, out: &mut impl Write) -> std::io::Result<()> {
    let Some(question) = session.current_question() else {
        return Ok(());
    };
    let index = session.attempt().current_question().unwrap_or(0);
    writeln!(
        out,
        "\nQuestion {}/{} ({}%)",
        index + 1,
        session.attempt().total(),
        session.progress_percent()
    )?;
    writeln!(out, "{}", question.prompt)?;
    for (i, option) in question.options.iter().enumerate() {
        writeln!(out, "  {}) {option}", i + 1)?;
    }
    Ok(())
}

fn render_reveal(session: &QuizSession, out: &mut impl Write) -> std::io::Result<()> {
    let (Some(revealed), Some(question)) = (session.revealed(), session.current_question()) else {
        return Ok(());
    };
    if revealed.correct {
        writeln!(out, "Correct!")?;
    } else {
        writeln!(
            out,
            "Incorrect. The answer was {}) {}",
            revealed.correct_option + 1,
            question.options[revealed.correct_option]
        )?;
    }
    writeln!(out, "{}", revealed.explanation)?;
    writeln!(out, "Type `next` to continue.")
}

fn render_result(result: &QuizResult, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(
        out,
        "\nScore: {}/{} ({}%)",
        result.score, result.total, result.percentage
    )?;
    if result.passed {
        writeln!(out, "Passed! Course complete.")?;
    } else {
        writeln!(
            out,
            "You need {} correct answers to pass. Type `retry` to try again.",
            result.threshold
        )?;
    }
    Ok(())
}
