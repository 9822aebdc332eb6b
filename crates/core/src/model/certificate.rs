use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Recipient used when no name was given.
pub const DEFAULT_RECIPIENT: &str = "You";

/// Text content of a completion certificate, independent of the output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateContent {
    serial: Uuid,
    recipient: String,
    issued_on: NaiveDate,
}

impl CertificateContent {
    /// Builds the certificate for `name`, falling back to [`DEFAULT_RECIPIENT`]
    /// for a missing or blank name.
    #[must_use]
    pub fn for_recipient(name: Option<&str>, issued_at: DateTime<Utc>) -> Self {
        let recipient = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_RECIPIENT)
            .to_owned();
        Self {
            serial: Uuid::new_v4(),
            recipient,
            issued_on: issued_at.date_naive(),
        }
    }

    #[must_use]
    pub fn headline(&self) -> &'static str {
        "Certificate of Completion"
    }

    #[must_use]
    pub fn award_line(&self) -> String {
        format!("Awarded to {}", self.recipient)
    }

    #[must_use]
    pub fn reason_line(&self) -> &'static str {
        "For completing all courses!"
    }

    #[must_use]
    pub fn footer_line(&self) -> String {
        format!(
            "Issued {} - No. {}",
            self.issued_on.format("%Y-%m-%d"),
            self.serial.simple()
        )
    }

    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    #[must_use]
    pub fn issued_on(&self) -> NaiveDate {
        self.issued_on
    }

    /// Cosmetic serial; carries no uniqueness guarantee across installs.
    #[must_use]
    pub fn serial(&self) -> Uuid {
        self.serial
    }
}
