mod catalog;
mod certificate;
mod completion;
mod ids;
mod playback;

pub use ids::{CourseId, LessonId, ParseIdError, VideoRef};

pub use catalog::{Catalog, CatalogError, Course, Lesson};
pub use certificate::{CertificateContent, DEFAULT_RECIPIENT};
pub use completion::CompletionSet;
pub use playback::{PlayerEvent, PlayerState};
