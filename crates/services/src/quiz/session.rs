use std::fmt;

use lingo_core::model::{ChallengeId, ChallengeOptionId, LessonId};
use lingo_core::traversal::{ChallengeStatus, LessonDetail, completion_percentage};

use crate::error::QuizError;

/// Where the current challenge stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStatus {
    /// Waiting for a selection and a check.
    Pending,
    Correct,
    Wrong,
}

/// Result of checking one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAnswerResult {
    pub challenge_id: ChallengeId,
    pub correct: bool,
    pub hearts: u32,
    pub percentage: u8,
    /// True when the whole lesson had already been completed before this run.
    pub practice: bool,
    /// True when this was a correct answer to the last challenge.
    pub finishes_lesson: bool,
}

/// In-memory run through one lesson.
///
/// Starts at the first challenge the user has not completed yet. When the
/// lesson is already completed it starts over from the first challenge in
/// practice mode, with the progress bar reset to zero.
pub struct QuizSession {
    lesson: LessonDetail,
    current: usize,
    selected: Option<ChallengeOptionId>,
    status: AnswerStatus,
    hearts: u32,
    practice: bool,
    base_completed: usize,
    solved: usize,
    finished: bool,
}

impl QuizSession {
    /// # Errors
    ///
    /// Returns `QuizError::EmptyLesson` if the lesson has no challenges.
    pub fn new(lesson: LessonDetail, hearts: u32) -> Result<Self, QuizError> {
        if lesson.challenges.is_empty() {
            return Err(QuizError::EmptyLesson(lesson.lesson.id()));
        }

        let (current, practice) = match lesson.first_incomplete_index() {
            Some(index) => (index, false),
            None => (0, true),
        };
        let base_completed = if practice { 0 } else { lesson.completed_count() };

        Ok(Self {
            lesson,
            current,
            selected: None,
            status: AnswerStatus::Pending,
            hearts,
            practice,
            base_completed,
            solved: 0,
            finished: false,
        })
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson.lesson.id()
    }

    #[must_use]
    pub fn lesson_title(&self) -> &str {
        self.lesson.lesson.title()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.lesson.challenges.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_challenge(&self) -> Option<&ChallengeStatus> {
        if self.finished {
            return None;
        }
        self.lesson.challenges.get(self.current)
    }

    #[must_use]
    pub fn selected(&self) -> Option<ChallengeOptionId> {
        self.selected
    }

    #[must_use]
    pub fn status(&self) -> AnswerStatus {
        self.status
    }

    #[must_use]
    pub fn hearts(&self) -> u32 {
        self.hearts
    }

    #[must_use]
    pub fn is_practice(&self) -> bool {
        self.practice
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.finished
    }

    /// Progress bar value, 0..=100.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        completion_percentage(self.base_completed + self.solved, self.total())
    }

    /// Choose an option for the current challenge.
    ///
    /// # Errors
    ///
    /// Returns `Completed` after the last challenge, `AlreadyChecked` once
    /// the answer was checked, or `UnknownOption` for a foreign option.
    pub fn select(&mut self, option_id: ChallengeOptionId) -> Result<(), QuizError> {
        let challenge = self.current_challenge().ok_or(QuizError::Completed)?;
        if self.status != AnswerStatus::Pending {
            return Err(QuizError::AlreadyChecked);
        }
        if !challenge.options.iter().any(|o| o.id() == option_id) {
            return Err(QuizError::UnknownOption);
        }
        self.selected = Some(option_id);
        Ok(())
    }

    /// Evaluate the pending selection without changing state.
    ///
    /// # Errors
    ///
    /// Returns `Completed`, `AlreadyChecked` or `NothingSelected`.
    pub fn evaluate(&self) -> Result<(ChallengeId, bool), QuizError> {
        let challenge = self.current_challenge().ok_or(QuizError::Completed)?;
        if self.status != AnswerStatus::Pending {
            return Err(QuizError::AlreadyChecked);
        }
        let selected = self.selected.ok_or(QuizError::NothingSelected)?;
        let correct = challenge
            .options
            .iter()
            .any(|o| o.id() == selected && o.is_correct());
        Ok((challenge.challenge.id(), correct))
    }

    /// Apply a checked answer with the hearts reported by persistence.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSession::evaluate`].
    pub(crate) fn record_answer(
        &mut self,
        correct: bool,
        hearts: u32,
    ) -> Result<QuizAnswerResult, QuizError> {
        let (challenge_id, _) = self.evaluate()?;
        self.hearts = hearts;
        if correct {
            self.status = AnswerStatus::Correct;
            self.solved += 1;
        } else {
            self.status = AnswerStatus::Wrong;
        }

        Ok(QuizAnswerResult {
            challenge_id,
            correct,
            hearts,
            percentage: self.percentage(),
            practice: self.practice,
            finishes_lesson: correct && self.next_index().is_none(),
        })
    }

    /// Clear a wrong answer so the user can try again.
    ///
    /// # Errors
    ///
    /// Returns `NotAnswered` unless the last check was wrong.
    pub fn retry(&mut self) -> Result<(), QuizError> {
        if self.status != AnswerStatus::Wrong {
            return Err(QuizError::NotAnswered);
        }
        self.status = AnswerStatus::Pending;
        self.selected = None;
        Ok(())
    }

    /// Move on after a correct answer. Returns `true` when the lesson is done.
    ///
    /// # Errors
    ///
    /// Returns `NotAnswered` unless the last check was correct.
    pub fn advance(&mut self) -> Result<bool, QuizError> {
        if self.finished {
            return Err(QuizError::Completed);
        }
        if self.status != AnswerStatus::Correct {
            return Err(QuizError::NotAnswered);
        }

        self.status = AnswerStatus::Pending;
        self.selected = None;
        match self.next_index() {
            Some(next) => self.current = next,
            None => self.finished = true,
        }
        Ok(self.finished)
    }

    fn next_index(&self) -> Option<usize> {
        let next = self.current + 1;
        (next < self.total()).then_some(next)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("lesson_id", &self.lesson_id())
            .field("current", &self.current)
            .field("total", &self.total())
            .field("status", &self.status)
            .field("hearts", &self.hearts)
            .field("practice", &self.practice)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
