use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use course_core::model::Catalog;
use course_core::time::fixed_clock;
use services::{AppServices, CertificateEmitter, COMPLETED_KEY, PlaybackCoordinator};
use storage::repository::{InMemoryStore, Storage};

use crate::context::{UiApp, build_app_context};
use crate::views::CourseView;
use crate::views::course::CourseTestHandles;

struct TestApp {
    coordinator: Mutex<Option<PlaybackCoordinator>>,
    certificates: Arc<CertificateEmitter>,
}

impl UiApp for TestApp {
    fn take_coordinator(&self) -> Option<PlaybackCoordinator> {
        self.coordinator.lock().ok().and_then(|mut slot| slot.take())
    }

    fn certificates(&self) -> Arc<CertificateEmitter> {
        Arc::clone(&self.certificates)
    }

    fn recipient(&self) -> Option<String> {
        None
    }
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    handles: CourseTestHandles,
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
    let handles = props.handles.clone();
    use_context_provider(|| handles);
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
    rsx! { CourseView {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub handles: CourseTestHandles,
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

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Build the course view over an in-memory store, optionally seeded with a
/// raw completion history.
pub async fn setup_view_harness(completed: Option<&str>) -> ViewHarness {
    setup_view_harness_in(completed, PathBuf::from(".")).await
}

/// Like [`setup_view_harness`], saving certificates into `out_dir`.
pub async fn setup_view_harness_in(completed: Option<&str>, out_dir: PathBuf) -> ViewHarness {
    let store = match completed {
        Some(raw) => InMemoryStore::with_entry(COMPLETED_KEY, raw),
        None => InMemoryStore::new(),
    };
    let storage = Storage::from_store(Arc::new(store));
    let services = AppServices::new(
        storage.clone(),
        Catalog::builtin(),
        fixed_clock(),
        out_dir,
    );
    let coordinator = services.load_coordinator().await;

    let app = Arc::new(TestApp {
        coordinator: Mutex::new(Some(coordinator)),
        certificates: services.certificates(),
    });
    let handles = CourseTestHandles::default();
    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            handles: handles.clone(),
        },
    );

    ViewHarness {
        dom,
        storage,
        handles,
    }
}
