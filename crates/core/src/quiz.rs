//! Single-attempt quiz flow.
//!
//! One answer per question; the first selection is final. An attempt lives
//! only in memory. The caller persists the quiz-passed flag when
//! [`QuizOutcome::Finished`] reports a pass.

use serde::Serialize;
use thiserror::Error;

use crate::model::{QuizQuestion, percentage};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,
}

/// Minimum score to pass a quiz of `total` questions: 70%, rounded up to a
/// whole question.
#[must_use]
pub fn pass_threshold(total: usize) -> usize {
    (7 * total).div_ceil(10)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuizPhase {
    AwaitingAnswer { question: usize },
    Revealed { question: usize, selected: usize },
    Finished { score: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizAction {
    Select(usize),
    Advance,
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub threshold: usize,
    pub passed: bool,
    pub percentage: u8,
}

impl QuizResult {
    #[must_use]
    pub fn new(score: usize, total: usize) -> Self {
        let threshold = pass_threshold(total);
        Self {
            score,
            total,
            threshold,
            passed: score >= threshold,
            percentage: percentage(score, total),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum QuizIgnored {
    AlreadyAnswered { question: usize },
    OptionOutOfRange { option: usize, options: usize },
    NotAnswered { question: usize },
    AlreadyFinished,
    NotFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizOutcome {
    Answered {
        question: usize,
        selected: usize,
        correct: bool,
    },
    Advanced {
        question: usize,
    },
    Finished(QuizResult),
    Restarted,
    Ignored(QuizIgnored),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AnswerKey {
    correct: usize,
    options: usize,
}

/// Ephemeral state of one run through a course quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAttempt {
    key: Vec<AnswerKey>,
    phase: QuizPhase,
    score: usize,
}

impl QuizAttempt {
    /// Begin an attempt at the first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` for an empty question list.
    pub fn new(questions: &[QuizQuestion]) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        let key = questions
            .iter()
            .map(|q| AnswerKey {
                correct: q.correct_option,
                options: q.options.len(),
            })
            .collect();
        Ok(Self {
            key,
            phase: QuizPhase::AwaitingAnswer { question: 0 },
            score: 0,
        })
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.key.len()
    }

    /// Index of the question on screen; `None` once finished.
    #[must_use]
    pub fn current_question(&self) -> Option<usize> {
        match self.phase {
            QuizPhase::AwaitingAnswer { question } | QuizPhase::Revealed { question, .. } => {
                Some(question)
            }
            QuizPhase::Finished { .. } => None,
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        match self.phase {
            QuizPhase::Revealed { selected, .. } => Some(selected),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, QuizPhase::Finished { .. })
    }

    #[must_use]
    pub fn result(&self) -> Option<QuizResult> {
        match self.phase {
            QuizPhase::Finished { score } => Some(QuizResult::new(score, self.total())),
            _ => None,
        }
    }

    /// Position in the quiz as a percentage; reaches 100 only once finished.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        let position = match self.phase {
            QuizPhase::AwaitingAnswer { question } | QuizPhase::Revealed { question, .. } => {
                question
            }
            QuizPhase::Finished { .. } => self.total(),
        };
        percentage(position, self.total())
    }

    /// Apply one user action and return the resulting attempt.
    #[must_use]
    pub fn apply(&self, action: QuizAction) -> (Self, QuizOutcome) {
        let mut next = self.clone();
        let outcome = match (self.phase, action) {
            (QuizPhase::AwaitingAnswer { question }, QuizAction::Select(selected)) => {
                let key = self.key[question];
                if selected >= key.options {
                    QuizOutcome::Ignored(QuizIgnored::OptionOutOfRange {
                        option: selected,
                        options: key.options,
                    })
                } else {
                    let correct = selected == key.correct;
                    if correct {
                        next.score += 1;
                    }
                    next.phase = QuizPhase::Revealed { question, selected };
                    QuizOutcome::Answered {
                        question,
                        selected,
                        correct,
                    }
                }
            }
            (QuizPhase::Revealed { question, .. }, QuizAction::Select(_)) => {
                QuizOutcome::Ignored(QuizIgnored::AlreadyAnswered { question })
            }
            (QuizPhase::Revealed { question, .. }, QuizAction::Advance) => {
                if question + 1 < self.total() {
                    next.phase = QuizPhase::AwaitingAnswer {
                        question: question + 1,
                    };
                    QuizOutcome::Advanced {
                        question: question + 1,
                    }
                } else {
                    next.phase = QuizPhase::Finished { score: next.score };
                    QuizOutcome::Finished(QuizResult::new(next.score, self.total()))
                }
            }
            (QuizPhase::AwaitingAnswer { question }, QuizAction::Advance) => {
                QuizOutcome::Ignored(QuizIgnored::NotAnswered { question })
            }
            (QuizPhase::Finished { .. }, QuizAction::Retry) => {
                next.phase = QuizPhase::AwaitingAnswer { question: 0 };
                next.score = 0;
                QuizOutcome::Restarted
            }
            (QuizPhase::Finished { .. }, QuizAction::Select(_) | QuizAction::Advance) => {
                QuizOutcome::Ignored(QuizIgnored::AlreadyFinished)
            }
            (
                QuizPhase::AwaitingAnswer { .. } | QuizPhase::Revealed { .. },
                QuizAction::Retry,
            ) => QuizOutcome::Ignored(QuizIgnored::NotFinished),
        };
        (next, outcome)
    }
}
