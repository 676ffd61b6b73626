mod courses;
mod learn;
mod lesson;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use courses::CoursesView;
pub use learn::LearnView;
pub use lesson::{ActiveLessonView, LessonView};
pub use state::{ViewError, ViewState, view_state_from_resource};
