use dioxus::document::eval;
use dioxus::prelude::*;

use course_core::model::LessonId;
use services::{PlaybackCoordinator, PlaybackError};

use super::player::{PLAYER_ELEMENT_ID, PlayerMessage, YoutubeSurface, bootstrap_script};
use crate::context::AppContext;
use crate::views::ViewError;
use crate::vm::{CourseCardVm, CourseVm, LessonCardVm, map_course_vm};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CourseIntent {
    SelectLesson(String),
    DownloadCertificate,
    DismissError,
}

/// State shared by the view, its intents and the player bridge.
#[derive(Clone, Copy)]
pub(crate) struct CourseSignals {
    coordinator: Signal<Option<PlaybackCoordinator>>,
    vm: Signal<Option<CourseVm>>,
    error: Signal<Option<ViewError>>,
    notice: Signal<Option<String>>,
    /// Set once the widget script failed; the plain embed takes over.
    player_unavailable: Signal<bool>,
    /// Latest selection not yet applied to the coordinator.
    queued_selection: Signal<Option<LessonId>>,
}

impl CourseSignals {
    pub(crate) fn mark_player_unavailable(self) {
        let mut error = self.error;
        let mut player_unavailable = self.player_unavailable;
        tracing::warn!("video player script failed to load");
        player_unavailable.set(true);
        error.set(Some(ViewError::PlayerUnavailable));
    }
}

#[component]
pub fn CourseView() -> Element {
    let ctx = use_context::<AppContext>();
    let certificates = ctx.certificates();
    let recipient = ctx.recipient();

    let coordinator = use_signal(|| ctx.take_coordinator());
    let signals = CourseSignals {
        coordinator,
        vm: use_signal(|| coordinator.peek().as_ref().map(map_course_vm)),
        error: use_signal(|| None::<ViewError>),
        notice: use_signal(|| None::<String>),
        player_unavailable: use_signal(|| false),
        queued_selection: use_signal(|| None::<LessonId>),
    };
    let CourseSignals {
        vm,
        error,
        notice,
        player_unavailable,
        ..
    } = signals;

    use_future(move || async move {
        run_player_bridge(signals).await;
    });

    use_drop(move || {
        let mut coordinator = coordinator;
        if let Ok(mut guard) = coordinator.try_write()
            && let Some(value) = guard.as_mut()
        {
            value.detach_surface();
        }
    });

    let dispatch_intent = use_callback(move |intent: CourseIntent| {
        let mut error = signals.error;
        let mut notice = signals.notice;

        match intent {
            CourseIntent::SelectLesson(raw) => {
                let Ok(lesson_id) = LessonId::new(raw) else {
                    error.set(Some(ViewError::Unknown));
                    return;
                };
                let mut queued = signals.queued_selection;
                queued.set(Some(lesson_id));
                spawn(settle(signals));
            }
            CourseIntent::DownloadCertificate => {
                let ready = signals
                    .vm
                    .peek()
                    .as_ref()
                    .is_some_and(|view| view.certificate_ready);
                if !ready {
                    return;
                }
                let certificates = certificates.clone();
                let recipient = recipient.clone();
                spawn(async move {
                    let saved = match certificates.emit(recipient.as_deref()) {
                        Ok(document) => certificates.save(&document).await,
                        Err(err) => Err(err),
                    };
                    match saved {
                        Ok(path) => {
                            notice.set(Some(format!("Certificate saved to {}", path.display())));
                            if *error.peek() == Some(ViewError::CertificateFailed) {
                                error.set(None);
                            }
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "certificate failed");
                            error.set(Some(ViewError::CertificateFailed));
                        }
                    }
                });
            }
            CourseIntent::DismissError => error.set(None),
        }
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<CourseTestHandles>() {
                handles.register(dispatch_intent, signals);
            }
        }
    }

    let Some(view) = vm() else {
        return rsx! {
            div { class: "page",
                p { "Course data is unavailable." }
            }
        };
    };

    let fallback_src = if player_unavailable() {
        view.current_embed_url.clone()
    } else {
        None
    };

    rsx! {
        div { class: "page course",
            h2 { class: "course__lesson-title", "{view.current_title}" }
            div { id: PLAYER_ELEMENT_ID, class: "course__player",
                if let Some(src) = fallback_src {
                    iframe { class: "course__player-fallback", src, allowfullscreen: true }
                }
            }

            if let Some(err) = error() {
                div { class: "course__error", role: "alert",
                    p { "{err.message()}" }
                    button {
                        r#type: "button",
                        onclick: move |_| dispatch_intent.call(CourseIntent::DismissError),
                        "Dismiss"
                    }
                }
            }

            ProgressBar { view: view.clone() }

            for course in view.courses.iter().cloned() {
                CourseSection {
                    key: "{course.id}",
                    course,
                    on_select: move |lesson_id: String| dispatch_intent.call(CourseIntent::SelectLesson(lesson_id)),
                }
            }

            if view.certificate_ready {
                button {
                    class: "course__certificate",
                    r#type: "button",
                    onclick: move |_| dispatch_intent.call(CourseIntent::DownloadCertificate),
                    "Download Certificate"
                }
            }
            if let Some(text) = notice() {
                p { class: "course__notice", "{text}" }
            }
        }
    }
}

#[component]
fn ProgressBar(view: CourseVm) -> Element {
    rsx! {
        div { class: "course__progress",
            div { class: "course__progress-track",
                div { class: "course__progress-fill", style: "width: {view.percent}%" }
            }
            p { class: "course__progress-label", "{view.progress_label()} ({view.percent}%)" }
        }
    }
}

#[component]
fn CourseSection(course: CourseCardVm, on_select: EventHandler<String>) -> Element {
    rsx! {
        section { class: "course__section",
            h3 { "{course.title}" }
            p { class: "course__section-progress", "{course.completed}/{course.total}" }
            div { class: "course__lessons",
                for lesson in course.lessons.iter().cloned() {
                    LessonCard { key: "{lesson.id}", lesson, on_select }
                }
            }
        }
    }
}

#[component]
fn LessonCard(lesson: LessonCardVm, on_select: EventHandler<String>) -> Element {
    let class = if lesson.current {
        "lesson-card lesson-card--current"
    } else {
        "lesson-card"
    };
    let lesson_id = lesson.id.clone();
    rsx! {
        div {
            class,
            onclick: move |_| on_select.call(lesson_id.clone()),
            h4 { "{lesson.title}" }
            if lesson.completed {
                p { class: "lesson-card__done", "Completed" }
            }
        }
    }
}

/// Creates the widget, then forwards its messages into the coordinator until
/// the bridge closes.
async fn run_player_bridge(signals: CourseSignals) {
    let mut coordinator = signals.coordinator;
    let sink = coordinator
        .write()
        .as_mut()
        .map(|value| value.attach_surface(Box::new(YoutubeSurface)));
    let Some(sink) = sink else {
        return;
    };

    let mut bridge = eval(&bootstrap_script());
    loop {
        let message = match bridge.recv::<PlayerMessage>().await {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(error = ?err, "player bridge closed");
                break;
            }
        };
        if message == PlayerMessage::Unavailable {
            signals.mark_player_unavailable();
            continue;
        }
        let Some(event) = message.into_event() else {
            continue;
        };
        if sink.send(event).is_err() {
            break;
        }
        settle(signals).await;
    }
}

/// Apply queued selections and widget events to the coordinator.
///
/// Returns at once when another task holds the coordinator; that task settles
/// whatever was queued before it puts the coordinator back.
async fn settle(signals: CourseSignals) {
    let CourseSignals {
        mut coordinator,
        mut vm,
        mut error,
        mut queued_selection,
        ..
    } = signals;

    let taken = {
        let mut guard = coordinator.write();
        guard.take()
    };
    let Some(mut value) = taken else {
        return;
    };

    loop {
        let next = {
            let mut guard = queued_selection.write();
            guard.take()
        };
        match next {
            Some(lesson_id) => {
                if let Err(err) = value.select_lesson(&lesson_id).await {
                    tracing::warn!(error = %err, "lesson selection rejected");
                    error.set(Some(ViewError::Unknown));
                }
                vm.set(Some(map_course_vm(&value)));
            }
            None => {
                if let Err(err) = value.pump().await {
                    tracing::warn!(error = %err, "player event failed");
                    error.set(Some(match err {
                        PlaybackError::Completion(_) => ViewError::SaveFailed,
                        _ => ViewError::Unknown,
                    }));
                }
                if queued_selection.peek().is_none() {
                    break;
                }
            }
        }
    }

    // Always put the coordinator back so the view stays usable after errors.
    vm.set(Some(map_course_vm(&value)));
    coordinator.set(Some(value));
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CourseTestHandles {
    dispatch: Rc<RefCell<Option<Callback<CourseIntent>>>>,
    signals: Rc<RefCell<Option<CourseSignals>>>,
}

#[cfg(test)]
impl CourseTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<CourseIntent>, signals: CourseSignals) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.signals.borrow_mut() = Some(signals);
    }

    pub(crate) fn dispatch(&self) -> Callback<CourseIntent> {
        (*self.dispatch.borrow()).expect("course dispatch registered")
    }

    pub(crate) fn signals(&self) -> CourseSignals {
        (*self.signals.borrow()).expect("course signals registered")
    }

    pub(crate) fn vm(&self) -> Option<CourseVm> {
        self.signals().vm.peek().clone()
    }

    /// Hold the coordinator as an in-flight pump would.
    pub(crate) fn take_coordinator(&self) -> Option<PlaybackCoordinator> {
        let mut coordinator = self.signals().coordinator;
        let mut guard = coordinator.write();
        guard.take()
    }

    /// Return a held coordinator and settle what queued up meanwhile.
    pub(crate) async fn restore_coordinator(&self, value: PlaybackCoordinator) {
        let signals = self.signals();
        let mut coordinator = signals.coordinator;
        coordinator.set(Some(value));
        settle(signals).await;
    }
}
