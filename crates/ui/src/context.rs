use std::sync::Arc;

use lingo_core::model::UserId;
use services::{AppServices, CourseService, LearnScope, ProgressService, QuizLoopService};

/// What the composition root hands to the UI: who is playing and the
/// services to play with.
pub trait UiApp: Send + Sync {
    fn user_id(&self) -> UserId;

    /// Display name stored on first course selection.
    fn user_name(&self) -> Option<String>;
    fn user_image_src(&self) -> Option<String>;

    fn services(&self) -> AppServices;
}

#[derive(Clone)]
pub struct AppContext {
    user_id: UserId,
    user_name: Option<String>,
    user_image_src: Option<String>,
    services: AppServices,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            user_id: app.user_id(),
            user_name: app.user_name(),
            user_image_src: app.user_image_src(),
            services: app.services(),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id.clone()
    }

    #[must_use]
    pub fn user_name(&self) -> Option<String> {
        self.user_name.clone()
    }

    #[must_use]
    pub fn user_image_src(&self) -> Option<String> {
        self.user_image_src.clone()
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseService> {
        self.services.courses()
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        self.services.progress()
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizLoopService> {
        self.services.quiz()
    }

    /// A fresh scope per resource run, so every render reads storage once.
    #[must_use]
    pub fn learn_scope(&self) -> LearnScope {
        self.services.learn_scope(self.user_id())
    }
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
