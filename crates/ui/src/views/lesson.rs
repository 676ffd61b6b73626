use dioxus::prelude::*;
use dioxus_router::use_navigator;
use lingo_core::model::{LessonId, MAX_HEARTS, POINTS_TO_REFILL};

use crate::context::AppContext;
use crate::routes::{RedirectTo, Route};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{OptionState, OptionVm, QuizIntent, QuizPhase, QuizStart, QuizVm, start_quiz};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Overlay {
    ConfirmExit,
    OutOfHearts,
}

/// `/lesson`: plays the active lesson.
#[component]
pub fn ActiveLessonView() -> Element {
    rsx! { LessonPlayer { lesson_id: None } }
}

/// `/lesson/:lesson_id`: replays or continues a specific lesson.
#[component]
pub fn LessonView(lesson_id: u64) -> Element {
    rsx! { LessonPlayer { lesson_id: Some(lesson_id) } }
}

#[component]
fn LessonPlayer(#[props(!optional)] lesson_id: Option<u64>) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let quiz = ctx.quiz();
    let progress = ctx.progress();
    let user = ctx.user_id();

    let vm = use_signal(|| None::<QuizVm>);
    let error = use_signal(|| None::<ViewError>);
    let mut overlay = use_signal(|| None::<Overlay>);

    let quiz_for_resource = quiz.clone();
    let user_for_resource = user.clone();
    let mut resource = use_resource(move || {
        let quiz = quiz_for_resource.clone();
        let user = user_for_resource.clone();
        let mut vm = vm;
        async move {
            match start_quiz(&quiz, &user, lesson_id.map(LessonId::new)).await? {
                QuizStart::Ready(started) => {
                    vm.set(Some(started));
                    Ok::<_, ViewError>(true)
                }
                QuizStart::Missing => Ok(false),
            }
        }
    });

    let state = view_state_from_resource(&resource);

    let dispatch_intent = use_callback(move |intent: QuizIntent| {
        let mut vm = vm;
        let mut error = error;
        let mut overlay = overlay;

        match intent {
            QuizIntent::Select(option_id) => {
                if let Some(vm) = vm.write().as_mut() {
                    vm.select(option_id);
                }
            }
            QuizIntent::Continue => {
                let finished = vm
                    .read()
                    .as_ref()
                    .is_none_or(|vm| vm.phase() == QuizPhase::Finished);
                if finished {
                    let _ = navigator.push(Route::Learn {});
                } else if let Some(vm) = vm.write().as_mut() {
                    vm.proceed();
                }
            }
            QuizIntent::Check => {
                let quiz = quiz.clone();
                let user = user.clone();
                spawn(async move {
                    let Some(mut local) = vm.write().take() else {
                        error.set(Some(ViewError::Unknown));
                        return;
                    };
                    let result = local.check(&quiz, &user).await;
                    // Put the quiz back so the page stays usable after errors.
                    vm.set(Some(local));
                    match result {
                        Ok(()) => error.set(None),
                        Err(ViewError::OutOfHearts) => overlay.set(Some(Overlay::OutOfHearts)),
                        Err(err) => error.set(Some(err)),
                    }
                });
            }
            QuizIntent::RefillHearts => {
                let progress = progress.clone();
                let user = user.clone();
                spawn(async move {
                    let Some(mut local) = vm.write().take() else {
                        error.set(Some(ViewError::Unknown));
                        return;
                    };
                    let result = local.refill_hearts(&progress, &user).await;
                    vm.set(Some(local));
                    match result {
                        Ok(()) => {
                            error.set(None);
                            overlay.set(None);
                        }
                        Err(err) => error.set(Some(err)),
                    }
                });
            }
        }
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<QuizTestHandles>() {
                handles.register(dispatch_intent, vm);
            }
        }
    }

    let vm_guard = vm.read();
    let phase = vm_guard.as_ref().map(QuizVm::phase);
    let challenge = vm_guard.as_ref().and_then(QuizVm::challenge);
    let percentage = vm_guard.as_ref().map_or(0, QuizVm::percentage);
    let hearts = vm_guard.as_ref().map_or(0, QuizVm::hearts);
    let practice = vm_guard.as_ref().is_some_and(QuizVm::is_practice);
    let has_selection = vm_guard.as_ref().is_some_and(QuizVm::has_selection);
    let points_earned = vm_guard.as_ref().map_or(0, QuizVm::points_earned);
    let lesson_title = vm_guard
        .as_ref()
        .map(|vm| vm.lesson_title().to_owned())
        .unwrap_or_default();
    drop(vm_guard);
    let refill_hint = format!(
        "Refill your {MAX_HEARTS} hearts for {POINTS_TO_REFILL} points, or practice a completed lesson to earn them back."
    );

    rsx! {
        div { class: "page lesson-page",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
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
                ViewState::Ready(false) => rsx! {
                    RedirectTo { to: Route::Learn {}, message: "This lesson is not available." }
                },
                ViewState::Ready(true) => rsx! {
                    header { class: "lesson-header",
                        button {
                            class: "lesson-header__exit",
                            id: "lesson-exit",
                            r#type: "button",
                            aria_label: "Exit lesson",
                            onclick: move |_| overlay.set(Some(Overlay::ConfirmExit)),
                            "✕"
                        }
                        div {
                            class: "lesson-progress",
                            role: "progressbar",
                            aria_valuenow: "{percentage}",
                            div { class: "lesson-progress__fill", style: "width: {percentage}%;" }
                        }
                        span { class: "lesson-header__hearts", "♥ {hearts}" }
                    }

                    if let Some(err) = *error.read() {
                        p { class: "notice notice--error", "{err.message()}" }
                    }

                    if phase == Some(QuizPhase::Finished) {
                        div { class: "lesson-complete",
                            h2 { "Great job! You've completed the lesson." }
                            p { class: "lesson-complete__title", "{lesson_title}" }
                            div { class: "lesson-complete__stats",
                                div { class: "result-card result-card--points",
                                    span { "Total XP" }
                                    strong { "{points_earned}" }
                                }
                                div { class: "result-card result-card--hearts",
                                    span { "Hearts left" }
                                    strong { "{hearts}" }
                                }
                            }
                        }
                    } else if let Some(challenge) = challenge {
                        div { class: "challenge",
                            if practice {
                                p { class: "challenge__practice",
                                    "Practice mode: you won't lose hearts and can earn them back."
                                }
                            }
                            h2 { class: "challenge__title", "{challenge.title}" }
                            if let Some(bubble) = challenge.bubble.as_deref() {
                                div { class: "challenge__bubble", "{bubble}" }
                            }
                            div { class: "challenge__options",
                                for option in challenge.options {
                                    OptionCard {
                                        key: "{option.id}",
                                        option: option.clone(),
                                        locked: phase != Some(QuizPhase::Choosing),
                                        on_intent: dispatch_intent,
                                    }
                                }
                            }
                        }
                    }

                    QuizFooter {
                        phase: phase.unwrap_or(QuizPhase::Choosing),
                        has_selection,
                        on_intent: dispatch_intent,
                    }
                },
            }

            match overlay() {
                Some(Overlay::ConfirmExit) => rsx! {
                    Modal {
                        title: "Wait, don't go!",
                        body: "You're about to leave the lesson. Are you sure?".to_owned(),
                        primary: "Keep learning",
                        secondary: "End session",
                        on_primary: move |()| overlay.set(None),
                        on_secondary: move |()| {
                            overlay.set(None);
                            let _ = navigator.push(Route::Learn {});
                        },
                    }
                },
                Some(Overlay::OutOfHearts) => rsx! {
                    Modal {
                        title: "You ran out of hearts!",
                        body: refill_hint.clone(),
                        primary: "Refill hearts",
                        secondary: "No thanks",
                        on_primary: move |()| dispatch_intent.call(QuizIntent::RefillHearts),
                        on_secondary: move |()| {
                            overlay.set(None);
                            let _ = navigator.push(Route::Learn {});
                        },
                    }
                },
                None => rsx! {},
            }
        }
    }
}

#[component]
fn OptionCard(option: OptionVm, locked: bool, on_intent: EventHandler<QuizIntent>) -> Element {
    let class = match option.state {
        OptionState::Idle => "option-card",
        OptionState::Selected => "option-card selected",
        OptionState::Correct => "option-card correct",
        OptionState::Wrong => "option-card wrong",
    };
    let id = option.id;

    rsx! {
        button {
            class: "{class}",
            id: "option-{id}",
            r#type: "button",
            disabled: locked,
            onclick: move |_| on_intent.call(QuizIntent::Select(id)),
            if let Some(src) = option.image_src.as_deref() {
                img { class: "option-card__image", src: "{src}", alt: "{option.text}" }
            }
            if let Some(src) = option.audio_src.as_deref() {
                audio { src: "{src}", preload: "none" }
            }
            span { class: "option-card__text", "{option.text}" }
            span { class: "option-card__shortcut", "{option.shortcut}" }
        }
    }
}

#[component]
fn QuizFooter(phase: QuizPhase, has_selection: bool, on_intent: EventHandler<QuizIntent>) -> Element {
    let (class, message, label, intent, disabled) = match phase {
        QuizPhase::Choosing => ("lesson-footer", None, "Check", QuizIntent::Check, !has_selection),
        QuizPhase::Correct => (
            "lesson-footer lesson-footer--correct",
            Some("Nicely done!"),
            "Next",
            QuizIntent::Continue,
            false,
        ),
        QuizPhase::Wrong => (
            "lesson-footer lesson-footer--wrong",
            Some("Try again."),
            "Retry",
            QuizIntent::Continue,
            false,
        ),
        QuizPhase::Finished => ("lesson-footer", None, "Continue", QuizIntent::Continue, false),
    };

    rsx! {
        footer { class: "{class}",
            if let Some(message) = message {
                p { class: "lesson-footer__message", "{message}" }
            }
            button {
                class: "btn lesson-footer__action",
                id: "lesson-action",
                r#type: "button",
                disabled,
                onclick: move |_| on_intent.call(intent),
                "{label}"
            }
        }
    }
}

#[component]
fn Modal(
    title: &'static str,
    body: String,
    primary: &'static str,
    secondary: &'static str,
    on_primary: EventHandler<()>,
    on_secondary: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "modal-overlay",
            div { class: "modal", role: "dialog", aria_modal: "true",
                h2 { class: "modal__title", "{title}" }
                if !body.is_empty() {
                    p { class: "modal__body", "{body}" }
                }
                div { class: "modal__actions",
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| on_primary.call(()),
                        "{primary}"
                    }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| on_secondary.call(()),
                        "{secondary}"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct QuizTestHandles {
    dispatch: Rc<RefCell<Option<Callback<QuizIntent>>>>,
    vm: Rc<RefCell<Option<Signal<Option<QuizVm>>>>>,
}

#[cfg(test)]
impl QuizTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<QuizIntent>, vm: Signal<Option<QuizVm>>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.vm.borrow_mut() = Some(vm);
    }

    pub(crate) fn dispatch(&self) -> Callback<QuizIntent> {
        (*self.dispatch.borrow()).expect("quiz dispatch registered")
    }

    pub(crate) fn vm(&self) -> Signal<Option<QuizVm>> {
        (*self.vm.borrow()).expect("quiz vm registered")
    }
}
