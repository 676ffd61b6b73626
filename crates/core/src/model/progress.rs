use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{ChallengeId, ChallengeProgressId, CourseId, UserId};

/// Hearts a new learner starts with, and the ceiling for refills.
pub const MAX_HEARTS: u32 = 5;
/// Points awarded for each completed challenge (first attempt or practice).
pub const POINTS_PER_CHALLENGE: u32 = 10;
/// Points spent to refill hearts back to `MAX_HEARTS`.
pub const POINTS_TO_REFILL: u32 = 10;

/// Display name used when the identity provider supplies none.
pub const DEFAULT_USER_NAME: &str = "User";
/// Avatar used when the identity provider supplies none.
pub const DEFAULT_USER_IMAGE: &str = "/mascot.svg";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserProgressError {
    #[error("hearts ({hearts}) exceed the maximum")]
    TooManyHearts { hearts: u32 },

    #[error("no hearts left")]
    HeartsDepleted,

    #[error("hearts are already full")]
    HeartsFull,

    #[error("not enough points: have {points}, need {required}")]
    NotEnoughPoints { points: u32, required: u32 },
}

//
// ─── USER PROGRESS ─────────────────────────────────────────────────────────────
//

/// Per-user aggregate: active course, hearts, and points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProgress {
    user_id: UserId,
    user_name: String,
    user_image_src: String,
    active_course_id: Option<CourseId>,
    hearts: u32,
    points: u32,
}

impl UserProgress {
    /// Progress for a learner who just picked their first course.
    #[must_use]
    pub fn start(
        user_id: UserId,
        user_name: Option<&str>,
        user_image_src: Option<&str>,
        course_id: CourseId,
    ) -> Self {
        Self {
            user_id,
            user_name: display_name(user_name),
            user_image_src: display_image(user_image_src),
            active_course_id: Some(course_id),
            hearts: MAX_HEARTS,
            points: 0,
        }
    }

    /// Rehydrate progress from storage.
    ///
    /// # Errors
    ///
    /// Returns `UserProgressError::TooManyHearts` if `hearts > MAX_HEARTS`.
    pub fn from_persisted(
        user_id: UserId,
        user_name: &str,
        user_image_src: &str,
        active_course_id: Option<CourseId>,
        hearts: u32,
        points: u32,
    ) -> Result<Self, UserProgressError> {
        if hearts > MAX_HEARTS {
            return Err(UserProgressError::TooManyHearts { hearts });
        }
        Ok(Self {
            user_id,
            user_name: display_name(Some(user_name)),
            user_image_src: display_image(Some(user_image_src)),
            active_course_id,
            hearts,
            points,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    #[must_use]
    pub fn user_image_src(&self) -> &str {
        &self.user_image_src
    }

    #[must_use]
    pub fn active_course_id(&self) -> Option<CourseId> {
        self.active_course_id
    }

    #[must_use]
    pub fn hearts(&self) -> u32 {
        self.hearts
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Switch the active course, refreshing the profile fields from the
    /// identity provider. Hearts and points carry over.
    pub fn switch_course(
        &mut self,
        course_id: CourseId,
        user_name: Option<&str>,
        user_image_src: Option<&str>,
    ) {
        self.active_course_id = Some(course_id);
        self.user_name = display_name(user_name);
        self.user_image_src = display_image(user_image_src);
    }

    /// Whether a challenge attempt may proceed. Practice never costs hearts.
    #[must_use]
    pub fn can_attempt(&self, is_practice: bool) -> bool {
        is_practice || self.hearts > 0
    }

    /// Apply the reward for a correctly answered challenge.
    ///
    /// Practice (re-doing an already attempted challenge) also restores one heart.
    pub fn reward_challenge(&mut self, is_practice: bool) {
        if is_practice {
            self.hearts = (self.hearts + 1).min(MAX_HEARTS);
        }
        self.points = self.points.saturating_add(POINTS_PER_CHALLENGE);
    }

    /// Take one heart for a wrong answer.
    ///
    /// # Errors
    ///
    /// Returns `UserProgressError::HeartsDepleted` when no hearts are left.
    pub fn lose_heart(&mut self) -> Result<(), UserProgressError> {
        if self.hearts == 0 {
            return Err(UserProgressError::HeartsDepleted);
        }
        self.hearts -= 1;
        Ok(())
    }

    /// Trade `POINTS_TO_REFILL` points for a full set of hearts.
    ///
    /// # Errors
    ///
    /// Returns `HeartsFull` when nothing needs refilling, or `NotEnoughPoints`.
    pub fn refill_hearts(&mut self) -> Result<(), UserProgressError> {
        if self.hearts == MAX_HEARTS {
            return Err(UserProgressError::HeartsFull);
        }
        if self.points < POINTS_TO_REFILL {
            return Err(UserProgressError::NotEnoughPoints {
                points: self.points,
                required: POINTS_TO_REFILL,
            });
        }
        self.hearts = MAX_HEARTS;
        self.points -= POINTS_TO_REFILL;
        Ok(())
    }
}

fn display_name(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_USER_NAME)
        .to_owned()
}

fn display_image(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_USER_IMAGE)
        .to_owned()
}

//
// ─── CHALLENGE PROGRESS ────────────────────────────────────────────────────────
//

/// A user's attempt record for one challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeProgress {
    pub id: ChallengeProgressId,
    pub user_id: UserId,
    pub challenge_id: ChallengeId,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}
