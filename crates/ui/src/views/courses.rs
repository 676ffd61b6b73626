use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{CourseCardVm, map_course_cards};

#[derive(Clone, Debug, PartialEq)]
struct CoursesData {
    cards: Vec<CourseCardVm>,
}

#[component]
pub fn CoursesView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut pending = use_signal(|| false);
    let mut action_error = use_signal(|| None::<ViewError>);

    let ctx_for_resource = ctx.clone();
    let mut resource = use_resource(move || {
        let ctx = ctx_for_resource.clone();
        async move {
            let courses = ctx
                .courses()
                .get_courses()
                .await
                .map_err(|_| ViewError::Unknown)?;
            let scope = ctx.learn_scope();
            let active = scope
                .user_progress()
                .await
                .map_err(|_| ViewError::Unknown)?
                .and_then(|view| view.progress.active_course_id());
            Ok::<_, ViewError>(CoursesData {
                cards: map_course_cards(&courses, active),
            })
        }
    });

    let state = view_state_from_resource(&resource);

    let on_select = use_callback(move |card: CourseCardVm| {
        if pending() {
            return;
        }
        if card.active {
            let _ = navigator.push(Route::Learn {});
            return;
        }
        let ctx = ctx.clone();
        spawn(async move {
            pending.set(true);
            let result = ctx
                .progress()
                .select_course(
                    &ctx.user_id(),
                    card.id,
                    ctx.user_name().as_deref(),
                    ctx.user_image_src().as_deref(),
                )
                .await;
            pending.set(false);
            match result {
                Ok(_) => {
                    action_error.set(None);
                    let _ = navigator.push(Route::Learn {});
                }
                Err(err) => action_error.set(Some(ViewError::from_progress(&err))),
            }
        });
    });

    rsx! {
        div { class: "page courses-page",
            h2 { "Language Courses" }

            if let Some(err) = action_error() {
                p { class: "notice notice--error", "{err.message()}" }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    if data.cards.is_empty() {
                        p { "No courses available yet." }
                    } else {
                        div { class: "course-grid",
                            for card in data.cards {
                                CourseCard {
                                    key: "{card.id}",
                                    card: card.clone(),
                                    disabled: pending(),
                                    on_select,
                                }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| resource.restart(),
                        "Retry"
                    }
                },
            }
        }
    }
}

#[component]
fn CourseCard(card: CourseCardVm, disabled: bool, on_select: EventHandler<CourseCardVm>) -> Element {
    let class = if card.active { "course-card active" } else { "course-card" };
    let id = card.id;
    let selected = card.clone();
    rsx! {
        button {
            class: "{class}",
            id: "course-{id}",
            r#type: "button",
            disabled,
            onclick: move |_| on_select.call(selected.clone()),
            img { class: "course-card__flag", src: "{card.image_src}", alt: "{card.title}" }
            span { class: "course-card__title", "{card.title}" }
            if card.active {
                span { class: "course-card__check", "✓" }
            }
        }
    }
}
