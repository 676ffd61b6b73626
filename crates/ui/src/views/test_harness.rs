use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use lingo_core::model::UserId;
use lingo_core::time::fixed_clock;
use services::AppServices;
use storage::repository::Storage;
use storage::seed::seed_sample_content;

use crate::context::{UiApp, build_app_context};
use crate::views::lesson::QuizTestHandles;
use crate::views::{ActiveLessonView, CoursesView, LearnView, LessonView};

#[derive(Clone)]
struct TestApp {
    user_id: UserId,
    services: AppServices,
}

impl UiApp for TestApp {
    fn user_id(&self) -> UserId {
        self.user_id.clone()
    }

    fn user_name(&self) -> Option<String> {
        Some("Ana".to_owned())
    }

    fn user_image_src(&self) -> Option<String> {
        None
    }

    fn services(&self) -> AppServices {
        self.services.clone()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Courses,
    Learn,
    ActiveLesson,
    Lesson(u64),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    quiz_handles: Option<QuizTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    if let Some(handles) = props.quiz_handles.clone() {
        use_context_provider(|| handles);
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Courses => rsx! { CoursesView {} },
        ViewKind::Learn => rsx! { LearnView {} },
        ViewKind::ActiveLesson => rsx! { ActiveLessonView {} },
        ViewKind::Lesson(lesson_id) => rsx! { LessonView { lesson_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub services: AppServices,
    pub user: UserId,
    pub quiz_handles: Option<QuizTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild and keep driving until pending resources settle.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..5 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn test_user() -> UserId {
    UserId::new("user_1").expect("valid user id")
}

/// Seeded in-memory storage; the user has not picked a course yet.
pub async fn setup_view_harness(view: ViewKind) -> ViewHarness {
    let storage = Storage::in_memory();
    seed_sample_content(&storage).await.expect("seed");
    setup_view_harness_with_storage(view, storage)
}

pub fn setup_view_harness_with_storage(view: ViewKind, storage: Storage) -> ViewHarness {
    let services = AppServices::from_storage(&storage, fixed_clock());
    let user = test_user();
    let quiz_handles = match view {
        ViewKind::ActiveLesson | ViewKind::Lesson(_) => Some(QuizTestHandles::default()),
        ViewKind::Courses | ViewKind::Learn => None,
    };

    let app = Arc::new(TestApp {
        user_id: user.clone(),
        services: services.clone(),
    });

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            quiz_handles: quiz_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        storage,
        services,
        user,
        quiz_handles,
    }
}
