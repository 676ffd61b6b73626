use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{ActiveLessonView, CoursesView, LearnView, LessonView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[redirect("/", || Route::Learn {})]
    #[layout(Layout)]
        #[route("/learn", LearnView)] Learn {},
        #[route("/courses", CoursesView)] Courses {},
    #[end_layout]
    // The lesson player is full screen, without the sidebar.
    #[route("/lesson", ActiveLessonView)] Lesson {},
    #[route("/lesson/:lesson_id", LessonView)] LessonById { lesson_id: u64 },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();
    let user_label = ctx
        .user_name()
        .unwrap_or_else(|| ctx.user_id().as_str().to_owned());

    rsx! {
        nav { class: "sidebar",
            h1 { class: "sidebar__logo", "Lingo" }
            ul {
                li { Link { to: Route::Learn {}, "Learn" } }
                li { Link { to: Route::Courses {}, "Courses" } }
            }
            p { class: "sidebar__user", "{user_label}" }
        }
    }
}

/// Sends the user somewhere else on mount, with a link as fallback.
#[component]
pub(crate) fn RedirectTo(to: Route, message: &'static str) -> Element {
    let navigator = dioxus_router::use_navigator();
    let target = to.clone();
    use_effect(move || {
        let _ = navigator.replace(target.clone());
    });

    rsx! {
        div { class: "redirect",
            p { "{message}" }
            Link { to, "Continue" }
        }
    }
}
