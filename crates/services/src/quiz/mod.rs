mod session;
mod workflow;

pub use crate::error::QuizError;
pub use session::{AnswerStatus, QuizAnswerResult, QuizSession};
pub use workflow::QuizLoopService;
