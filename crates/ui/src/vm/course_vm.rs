use lingo_core::model::{Course, CourseId};

/// UI-ready representation of a course card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseCardVm {
    pub id: CourseId,
    pub title: String,
    pub image_src: String,
    pub active: bool,
}

/// Convert courses into cards, highlighting the active one.
#[must_use]
pub fn map_course_cards(courses: &[Course], active: Option<CourseId>) -> Vec<CourseCardVm> {
    courses
        .iter()
        .map(|course| CourseCardVm {
            id: course.id(),
            title: course.title().to_owned(),
            image_src: course.image_src().to_owned(),
            active: active == Some(course.id()),
        })
        .collect()
}
