mod course_vm;
mod learn_vm;
mod quiz_vm;

pub use course_vm::{CourseCardVm, map_course_cards};
pub use learn_vm::{LessonButtonVm, UnitVm, UserStatsVm, map_units};
pub use quiz_vm::{
    ChallengeVm, OptionState, OptionVm, QuizIntent, QuizPhase, QuizStart, QuizVm, start_quiz,
};
