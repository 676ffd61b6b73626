use lingo_core::model::{LessonId, UnitId};
use lingo_core::traversal::{CourseProgress, UnitProgress};
use services::{UserProgressView, lesson_states};

/// Header stats shown above the learning path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserStatsVm {
    pub course_title: String,
    pub course_image_src: Option<String>,
    pub hearts: u32,
    pub points: u32,
}

impl From<&UserProgressView> for UserStatsVm {
    fn from(view: &UserProgressView) -> Self {
        Self {
            course_title: view
                .active_course
                .as_ref()
                .map_or_else(String::new, |course| course.title().to_owned()),
            course_image_src: view
                .active_course
                .as_ref()
                .map(|course| course.image_src().to_owned()),
            hearts: view.progress.hearts(),
            points: view.progress.points(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonButtonVm {
    pub id: LessonId,
    pub title: String,
    pub locked: bool,
    pub current: bool,
    pub completed: bool,
    pub percentage: Option<u8>,
    /// Horizontal offset that snakes the path left and right.
    pub offset_px: i32,
    pub last: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitVm {
    pub id: UnitId,
    pub title: String,
    pub description: String,
    pub lessons: Vec<LessonButtonVm>,
}

const PATH_CYCLE: usize = 8;
const PATH_STEP_PX: i32 = 40;

fn path_offset(index: usize) -> i32 {
    let step = i32::try_from(index % PATH_CYCLE).unwrap_or_default();
    let level = match step {
        0..=2 => step,
        3..=6 => 4 - step,
        _ => step - 8,
    };
    level * PATH_STEP_PX
}

/// Units with their lesson buttons, ready to render.
#[must_use]
pub fn map_units(
    units: &[UnitProgress],
    course_progress: &CourseProgress,
    active_percentage: u8,
) -> Vec<UnitVm> {
    let states = lesson_states(units, course_progress, active_percentage);
    units
        .iter()
        .zip(states)
        .map(|(unit, states)| {
            let count = unit.lessons.len();
            let lessons = unit
                .lessons
                .iter()
                .zip(states)
                .enumerate()
                .map(|(index, (status, state))| LessonButtonVm {
                    id: status.lesson.id(),
                    title: status.lesson.title().to_owned(),
                    locked: state.locked,
                    current: state.current,
                    completed: state.completed,
                    percentage: state.percentage,
                    offset_px: path_offset(index),
                    last: index + 1 == count,
                })
                .collect();
            UnitVm {
                id: unit.unit.id(),
                title: unit.unit.title().to_owned(),
                description: unit.unit.description().to_owned(),
                lessons,
            }
        })
        .collect()
}
