#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
    /// Completion could not be saved; the lesson stays incomplete.
    SaveFailed,
    CertificateFailed,
    PlayerUnavailable,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Unknown => "Something went wrong. Please try again.",
            Self::SaveFailed => "Could not save your progress. Finish the lesson again to retry.",
            Self::CertificateFailed => "Could not create your certificate. Please try again.",
            Self::PlayerUnavailable => "The video player could not be loaded.",
        }
    }
}
