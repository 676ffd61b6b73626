use lingo_core::model::{ChallengeKind, ChallengeOptionId, LessonId, POINTS_PER_CHALLENGE, UserId};
use services::{AnswerStatus, ProgressService, QuizError, QuizLoopService, QuizSession};

use crate::views::ViewError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    Select(ChallengeOptionId),
    Check,
    /// Next challenge after a correct answer, another try after a wrong one.
    Continue,
    RefillHearts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizPhase {
    Choosing,
    Correct,
    Wrong,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionState {
    Idle,
    Selected,
    Correct,
    Wrong,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub id: ChallengeOptionId,
    pub text: String,
    pub image_src: Option<String>,
    pub audio_src: Option<String>,
    /// 1-based keyboard shortcut shown on the card.
    pub shortcut: usize,
    pub state: OptionState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengeVm {
    pub title: String,
    /// The phrase to translate, shown in a speech bubble for assist challenges.
    pub bubble: Option<String>,
    pub options: Vec<OptionVm>,
}

pub struct QuizVm {
    session: QuizSession,
    hearts: u32,
}

impl QuizVm {
    #[must_use]
    pub fn new(session: QuizSession) -> Self {
        let hearts = session.hearts();
        Self { session, hearts }
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.session.lesson_id()
    }

    #[must_use]
    pub fn lesson_title(&self) -> &str {
        self.session.lesson_title()
    }

    #[must_use]
    pub fn hearts(&self) -> u32 {
        self.hearts
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.session.percentage()
    }

    #[must_use]
    pub fn is_practice(&self) -> bool {
        self.session.is_practice()
    }

    #[must_use]
    pub fn points_earned(&self) -> u32 {
        u32::try_from(self.session.total())
            .unwrap_or(u32::MAX)
            .saturating_mul(POINTS_PER_CHALLENGE)
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        if self.session.is_complete() {
            return QuizPhase::Finished;
        }
        match self.session.status() {
            AnswerStatus::Pending => QuizPhase::Choosing,
            AnswerStatus::Correct => QuizPhase::Correct,
            AnswerStatus::Wrong => QuizPhase::Wrong,
        }
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.session.selected().is_some()
    }

    #[must_use]
    pub fn challenge(&self) -> Option<ChallengeVm> {
        let current = self.session.current_challenge()?;
        let selected = self.session.selected();
        let status = self.session.status();

        let options = current
            .options
            .iter()
            .enumerate()
            .map(|(index, option)| {
                let state = match (selected == Some(option.id()), status) {
                    (false, _) => OptionState::Idle,
                    (true, AnswerStatus::Pending) => OptionState::Selected,
                    (true, AnswerStatus::Correct) => OptionState::Correct,
                    (true, AnswerStatus::Wrong) => OptionState::Wrong,
                };
                OptionVm {
                    id: option.id(),
                    text: option.text().to_owned(),
                    image_src: option.image_src().map(str::to_owned),
                    audio_src: option.audio_src().map(str::to_owned),
                    shortcut: index + 1,
                    state,
                }
            })
            .collect();

        let question = current.challenge.question().to_owned();
        let (title, bubble) = match current.challenge.kind() {
            ChallengeKind::Assist => ("Select the correct meaning".to_owned(), Some(question)),
            ChallengeKind::Select => (question, None),
        };
        Some(ChallengeVm {
            title,
            bubble,
            options,
        })
    }

    /// Option clicks are ignored once the answer has been checked.
    pub fn select(&mut self, option_id: ChallengeOptionId) {
        if let Err(err) = self.session.select(option_id) {
            tracing::debug!(%err, "selection ignored");
        }
    }

    /// # Errors
    ///
    /// Returns `ViewError::OutOfHearts` when the answer cannot be recorded
    /// without hearts, `ViewError::Unknown` for other failures.
    pub async fn check(&mut self, quiz: &QuizLoopService, user: &UserId) -> Result<(), ViewError> {
        match quiz.check(user, &mut self.session).await {
            Ok(result) => {
                self.hearts = result.hearts;
                Ok(())
            }
            Err(QuizError::NothingSelected | QuizError::AlreadyChecked) => Ok(()),
            Err(err) => {
                tracing::warn!(%err, "answer check failed");
                Err(ViewError::from_quiz(&err))
            }
        }
    }

    /// Move past the current result.
    pub fn proceed(&mut self) {
        let outcome = match self.session.status() {
            AnswerStatus::Correct => self.session.advance().map(|_| ()),
            AnswerStatus::Wrong => self.session.retry(),
            AnswerStatus::Pending => Ok(()),
        };
        if let Err(err) = outcome {
            tracing::debug!(%err, "continue ignored");
        }
    }

    /// # Errors
    ///
    /// Returns the refill rejection, e.g. `ViewError::NotEnoughPoints`.
    pub async fn refill_hearts(
        &mut self,
        progress: &ProgressService,
        user: &UserId,
    ) -> Result<(), ViewError> {
        let refilled = progress
            .refill_hearts(user)
            .await
            .map_err(|err| ViewError::from_progress(&err))?;
        self.hearts = refilled.hearts();
        Ok(())
    }
}

/// Outcome of starting a quiz from the lesson page.
pub enum QuizStart {
    Ready(QuizVm),
    /// No active course, or the lesson is not part of it.
    Missing,
}

/// # Errors
///
/// Returns `ViewError::Unknown` for storage failures.
pub async fn start_quiz(
    quiz: &QuizLoopService,
    user: &UserId,
    lesson_id: Option<LessonId>,
) -> Result<QuizStart, ViewError> {
    match quiz.start(user, lesson_id).await {
        Ok(session) => Ok(QuizStart::Ready(QuizVm::new(session))),
        Err(QuizError::LessonNotFound | QuizError::EmptyLesson(_)) => Ok(QuizStart::Missing),
        Err(err) => {
            tracing::warn!(%err, "quiz start failed");
            Err(ViewError::Unknown)
        }
    }
}
