use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::ids::{ChallengeId, ChallengeOptionId, LessonId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChallengeError {
    #[error("challenge question cannot be empty")]
    EmptyQuestion,

    #[error("challenge option text cannot be empty")]
    EmptyOptionText,

    #[error("unknown challenge kind: {0}")]
    UnknownKind(String),
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// How a challenge is presented.
///
/// - `Select`: pick the option matching the question (options usually carry images).
/// - `Assist`: translate the quoted word by picking the matching option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeKind {
    Select,
    Assist,
}

impl ChallengeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeKind::Select => "SELECT",
            ChallengeKind::Assist => "ASSIST",
        }
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeKind {
    type Err = ChallengeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SELECT" => Ok(Self::Select),
            "ASSIST" => Ok(Self::Assist),
            other => Err(ChallengeError::UnknownKind(other.to_owned())),
        }
    }
}

//
// ─── CHALLENGE ─────────────────────────────────────────────────────────────────
//

/// A single question inside a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    id: ChallengeId,
    lesson_id: LessonId,
    kind: ChallengeKind,
    question: String,
    order: u32,
}

impl Challenge {
    /// Creates a new Challenge.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeError::EmptyQuestion` if the question is blank.
    pub fn new(
        id: ChallengeId,
        lesson_id: LessonId,
        kind: ChallengeKind,
        question: impl Into<String>,
        order: u32,
    ) -> Result<Self, ChallengeError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(ChallengeError::EmptyQuestion);
        }

        Ok(Self {
            id,
            lesson_id,
            kind,
            question: question.trim().to_owned(),
            order,
        })
    }

    #[must_use]
    pub fn id(&self) -> ChallengeId {
        self.id
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn kind(&self) -> ChallengeKind {
        self.kind
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[must_use]
    pub fn sort_key(&self) -> (u32, ChallengeId) {
        (self.order, self.id)
    }
}

//
// ─── OPTION ────────────────────────────────────────────────────────────────────
//

/// One answer choice for a challenge. At least one option per challenge is
/// expected to be marked correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeOption {
    id: ChallengeOptionId,
    challenge_id: ChallengeId,
    text: String,
    correct: bool,
    image_src: Option<String>,
    audio_src: Option<String>,
}

impl ChallengeOption {
    /// Creates a new option. Blank media paths are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeError::EmptyOptionText` if the text is blank.
    pub fn new(
        id: ChallengeOptionId,
        challenge_id: ChallengeId,
        text: impl Into<String>,
        correct: bool,
        image_src: Option<String>,
        audio_src: Option<String>,
    ) -> Result<Self, ChallengeError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ChallengeError::EmptyOptionText);
        }

        Ok(Self {
            id,
            challenge_id,
            text: text.trim().to_owned(),
            correct,
            image_src: normalize_media(image_src),
            audio_src: normalize_media(audio_src),
        })
    }

    #[must_use]
    pub fn id(&self) -> ChallengeOptionId {
        self.id
    }

    #[must_use]
    pub fn challenge_id(&self) -> ChallengeId {
        self.challenge_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.correct
    }

    #[must_use]
    pub fn image_src(&self) -> Option<&str> {
        self.image_src.as_deref()
    }

    #[must_use]
    pub fn audio_src(&self) -> Option<&str> {
        self.audio_src.as_deref()
    }
}

fn normalize_media(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
