mod queries;
mod scope;

pub use queries::{LearnService, LearnSnapshot, UserProgressView, lesson_states};
pub use scope::LearnScope;
