#![forbid(unsafe_code)]

pub mod app_services;
pub mod certificate;
pub mod completion;
pub mod error;
pub mod playback;

pub use course_core::Clock;

pub use app_services::{AppServices, load_catalog};
pub use certificate::{
    CERTIFICATE_FILE_NAME, CertificateDocument, CertificateEmitter, CertificateRenderer,
    PdfCertificateRenderer,
};
pub use completion::{COMPLETED_KEY, CompletionTracker, MarkOutcome};
pub use error::{AppServicesError, CertificateError, CompletionError, PlaybackError, SurfaceError};
pub use playback::{Disconnected, PlaybackCoordinator, PlaybackOutcome, PlayerEventSink, VideoSurface};
