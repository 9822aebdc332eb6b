use std::sync::{Arc, Mutex, PoisonError};

use services::{CertificateEmitter, PlaybackCoordinator};

pub trait UiApp: Send + Sync {
    /// Hand over the hydrated coordinator. Returns `None` once taken.
    fn take_coordinator(&self) -> Option<PlaybackCoordinator>;
    fn certificates(&self) -> Arc<CertificateEmitter>;
    fn recipient(&self) -> Option<String>;
}

#[derive(Clone)]
pub struct AppContext {
    coordinator_once: Arc<Mutex<Option<PlaybackCoordinator>>>,
    certificates: Arc<CertificateEmitter>,
    recipient: Option<String>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            coordinator_once: Arc::new(Mutex::new(app.take_coordinator())),
            certificates: app.certificates(),
            recipient: app.recipient(),
        }
    }

    /// One-shot: the first view to ask becomes the coordinator's owner.
    #[must_use]
    pub fn take_coordinator(&self) -> Option<PlaybackCoordinator> {
        self.coordinator_once
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    #[must_use]
    pub fn certificates(&self) -> Arc<CertificateEmitter> {
        Arc::clone(&self.certificates)
    }

    #[must_use]
    pub fn recipient(&self) -> Option<String> {
        self.recipient.clone()
    }
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
