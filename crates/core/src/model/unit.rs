use thiserror::Error;

use crate::model::ids::{CourseId, LessonId, UnitId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnitError {
    #[error("unit title cannot be empty")]
    EmptyTitle,

    #[error("unit description cannot be empty")]
    EmptyDescription,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,
}

//
// ─── UNIT ──────────────────────────────────────────────────────────────────────
//

/// Ordered grouping of lessons within a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    id: UnitId,
    course_id: CourseId,
    title: String,
    description: String,
    order: u32,
}

impl Unit {
    /// Creates a new Unit.
    ///
    /// # Errors
    ///
    /// Returns `UnitError` if the title or description is blank.
    pub fn new(
        id: UnitId,
        course_id: CourseId,
        title: impl Into<String>,
        description: impl Into<String>,
        order: u32,
    ) -> Result<Self, UnitError> {
        let title = title.into();
        let description = description.into();
        if title.trim().is_empty() {
            return Err(UnitError::EmptyTitle);
        }
        if description.trim().is_empty() {
            return Err(UnitError::EmptyDescription);
        }

        Ok(Self {
            id,
            course_id,
            title: title.trim().to_owned(),
            description: description.trim().to_owned(),
            order,
        })
    }

    #[must_use]
    pub fn id(&self) -> UnitId {
        self.id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Sort key used everywhere units are traversed.
    #[must_use]
    pub fn sort_key(&self) -> (u32, UnitId) {
        (self.order, self.id)
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Ordered grouping of challenges within a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    unit_id: UnitId,
    title: String,
    order: u32,
}

impl Lesson {
    /// Creates a new Lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the title is blank.
    pub fn new(
        id: LessonId,
        unit_id: UnitId,
        title: impl Into<String>,
        order: u32,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }

        Ok(Self {
            id,
            unit_id,
            title: title.trim().to_owned(),
            order,
        })
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn unit_id(&self) -> UnitId {
        self.unit_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[must_use]
    pub fn sort_key(&self) -> (u32, LessonId) {
        (self.order, self.id)
    }
}
