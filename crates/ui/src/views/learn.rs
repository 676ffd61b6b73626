use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::{RedirectTo, Route};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{LessonButtonVm, UnitVm, UserStatsVm, map_units};

#[derive(Clone, Debug, PartialEq)]
enum LearnData {
    NoCourse,
    Path { stats: UserStatsVm, units: Vec<UnitVm> },
}

#[component]
pub fn LearnView() -> Element {
    let ctx = use_context::<AppContext>();

    let mut resource = use_resource(move || {
        let scope = ctx.learn_scope();
        async move {
            let Some(view) = scope.user_progress().await.map_err(|_| ViewError::Unknown)? else {
                return Ok(LearnData::NoCourse);
            };
            let stats = UserStatsVm::from(view);
            let units = scope.units().await.map_err(|_| ViewError::Unknown)?;
            let course_progress = scope
                .course_progress()
                .await
                .map_err(|_| ViewError::Unknown)?
                .cloned()
                .unwrap_or_default();
            let percentage = scope
                .lesson_percentage()
                .await
                .map_err(|_| ViewError::Unknown)?;

            Ok::<_, ViewError>(LearnData::Path {
                stats,
                units: map_units(units, &course_progress, percentage),
            })
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page learn-page",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(LearnData::NoCourse) => rsx! {
                    RedirectTo { to: Route::Courses {}, message: "Pick a course to start learning." }
                },
                ViewState::Ready(LearnData::Path { stats, units }) => rsx! {
                    div { class: "learn-feed",
                        header { class: "learn-header",
                            Link { class: "learn-header__back", to: Route::Courses {}, "←" }
                            h2 { "{stats.course_title}" }
                        }
                        if units.is_empty() {
                            p { "This course has no units yet." }
                        }
                        for unit in units {
                            UnitSection { key: "{unit.id}", unit: unit.clone() }
                        }
                    }
                    UserStats { stats: stats.clone() }
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
fn UserStats(stats: UserStatsVm) -> Element {
    rsx! {
        aside { class: "user-stats",
            Link { class: "user-stats__course", to: Route::Courses {},
                if let Some(src) = stats.course_image_src.as_deref() {
                    img { src: "{src}", alt: "{stats.course_title}", width: "32", height: "32" }
                }
            }
            span { class: "user-stats__points", "Points: {stats.points}" }
            span { class: "user-stats__hearts", "Hearts: {stats.hearts}" }
        }
    }
}

#[component]
fn UnitSection(unit: UnitVm) -> Element {
    rsx! {
        section { class: "unit",
            div { class: "unit-banner",
                div {
                    h3 { class: "unit-banner__title", "{unit.title}" }
                    p { class: "unit-banner__description", "{unit.description}" }
                }
                Link { class: "btn unit-banner__continue", to: Route::Lesson {}, "Continue" }
            }
            div { class: "unit-path",
                for lesson in unit.lessons {
                    LessonButton { key: "{lesson.id}", lesson: lesson.clone() }
                }
            }
        }
    }
}

#[component]
fn LessonButton(lesson: LessonButtonVm) -> Element {
    let state_class = if lesson.current {
        "lesson-button current"
    } else if lesson.completed {
        "lesson-button completed"
    } else {
        "lesson-button locked"
    };
    let style = format!("right: {}px;", lesson.offset_px);
    let icon = if lesson.completed && !lesson.current {
        "✓"
    } else if lesson.last {
        "🏆"
    } else {
        "★"
    };

    rsx! {
        div { class: "lesson-slot", style: "{style}", title: "{lesson.title}",
            if lesson.locked {
                span { class: "{state_class}", aria_disabled: "true", "{icon}" }
            } else {
                Link {
                    class: "{state_class}",
                    to: Route::LessonById { lesson_id: lesson.id.value() },
                    if lesson.current {
                        span { class: "lesson-button__start", "Start" }
                    }
                    span { class: "lesson-button__icon", "{icon}" }
                    if let Some(percentage) = lesson.percentage {
                        span { class: "lesson-button__ring", "{percentage}%" }
                    }
                }
            }
        }
    }
}
