use thiserror::Error;

use crate::model::ids::CourseId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course image cannot be empty")]
    EmptyImage,
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Top-level learning track, e.g. "Spanish".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    image_src: String,
}

impl Course {
    /// Creates a new Course.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` or `CourseError::EmptyImage` when
    /// either field is blank.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        image_src: impl Into<String>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        let image_src = image_src.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        if image_src.trim().is_empty() {
            return Err(CourseError::EmptyImage);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            image_src: image_src.trim().to_owned(),
        })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Relative path of the flag/illustration shown on the course card.
    #[must_use]
    pub fn image_src(&self) -> &str {
        &self.image_src
    }
}
