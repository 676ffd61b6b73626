#![forbid(unsafe_code)]

pub mod app_services;
pub mod course_service;
pub mod error;
pub mod learn;
pub mod progress_service;
pub mod quiz;

pub use lingo_core::Clock;

pub use app_services::AppServices;
pub use course_service::CourseService;
pub use error::{AppServicesError, CourseServiceError, LearnError, ProgressError, QuizError};
pub use learn::{LearnScope, LearnService, LearnSnapshot, UserProgressView, lesson_states};
pub use progress_service::{ChallengeCompletion, HeartsOutcome, ProgressService};
pub use quiz::{AnswerStatus, QuizAnswerResult, QuizLoopService, QuizSession};
