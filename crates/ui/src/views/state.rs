use dioxus::prelude::*;
use lingo_core::model::UserProgressError;
use services::{ProgressError, QuizError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// Courses without lessons cannot be started.
    CourseEmpty,
    OutOfHearts,
    NotEnoughPoints,
    HeartsFull,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::CourseEmpty => "This course has no lessons yet.",
            Self::OutOfHearts => "You ran out of hearts!",
            Self::NotEnoughPoints => "You need more points to refill your hearts.",
            Self::HeartsFull => "Your hearts are already full.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }

    #[must_use]
    pub fn from_progress(err: &ProgressError) -> Self {
        if err.is_hearts_depleted() {
            return Self::OutOfHearts;
        }
        match err {
            ProgressError::CourseEmpty(_) => Self::CourseEmpty,
            ProgressError::Rejected(UserProgressError::NotEnoughPoints { .. }) => {
                Self::NotEnoughPoints
            }
            ProgressError::Rejected(UserProgressError::HeartsFull) => Self::HeartsFull,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn from_quiz(err: &QuizError) -> Self {
        match err {
            QuizError::Progress(inner) => Self::from_progress(inner),
            _ => Self::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
