use std::path::{Path, PathBuf};
use std::sync::Arc;

use course_core::Clock;
use course_core::model::CertificateContent;
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::error::CertificateError;

/// File name used when saving a certificate.
pub const CERTIFICATE_FILE_NAME: &str = "certificate.pdf";

/// Turns certificate content into document bytes.
pub trait CertificateRenderer: Send + Sync {
    /// # Errors
    ///
    /// Returns `CertificateError::Render` if the document cannot be produced.
    fn render(&self, content: &CertificateContent) -> Result<Vec<u8>, CertificateError>;
}

/// A4 portrait PDF using the built-in Helvetica fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCertificateRenderer;

impl CertificateRenderer for PdfCertificateRenderer {
    fn render(&self, content: &CertificateContent) -> Result<Vec<u8>, CertificateError> {
        let (doc, page, layer) =
            PdfDocument::new(content.headline(), Mm(210.0), Mm(297.0), "Certificate");
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(render_err)?;
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(render_err)?;

        let layer = doc.get_page(page).get_layer(layer);
        layer.use_text(content.headline(), 22.0, Mm(20.0), Mm(267.0), &bold);
        layer.use_text(content.award_line(), 16.0, Mm(20.0), Mm(247.0), &regular);
        layer.use_text(content.reason_line(), 16.0, Mm(20.0), Mm(232.0), &regular);
        layer.use_text(content.footer_line(), 10.0, Mm(20.0), Mm(20.0), &regular);

        doc.save_to_bytes().map_err(render_err)
    }
}

/// A generated certificate ready to be saved.
#[derive(Debug, Clone)]
pub struct CertificateDocument {
    content: CertificateContent,
    bytes: Vec<u8>,
}

impl CertificateDocument {
    #[must_use]
    pub fn content(&self) -> &CertificateContent {
        &self.content
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn file_name(&self) -> &'static str {
        CERTIFICATE_FILE_NAME
    }
}

fn render_err(err: impl std::fmt::Display) -> CertificateError {
    CertificateError::Render(err.to_string())
}

/// Produces completion certificates and saves them to the download directory.
///
/// Callers decide whether a certificate is earned (see
/// [`course_core::Progress::is_complete`]); the emitter does not check.
#[derive(Clone)]
pub struct CertificateEmitter {
    clock: Clock,
    renderer: Arc<dyn CertificateRenderer>,
    out_dir: PathBuf,
}

impl CertificateEmitter {
    #[must_use]
    pub fn new(clock: Clock, renderer: Arc<dyn CertificateRenderer>, out_dir: PathBuf) -> Self {
        Self {
            clock,
            renderer,
            out_dir,
        }
    }

    /// Emitter rendering PDFs into `out_dir`.
    #[must_use]
    pub fn pdf(clock: Clock, out_dir: PathBuf) -> Self {
        Self::new(clock, Arc::new(PdfCertificateRenderer), out_dir)
    }

    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Render a certificate for `name` ("You" when missing or blank).
    ///
    /// # Errors
    ///
    /// Returns `CertificateError::Render` if generation fails. There is no
    /// retry.
    pub fn emit(&self, name: Option<&str>) -> Result<CertificateDocument, CertificateError> {
        let content = CertificateContent::for_recipient(name, self.clock.now());
        let bytes = self.renderer.render(&content)?;
        Ok(CertificateDocument { content, bytes })
    }

    /// Write `document` into the download directory, replacing any earlier
    /// certificate, and return its path.
    ///
    /// # Errors
    ///
    /// Returns `CertificateError::Io` if the directory or file cannot be
    /// written.
    pub async fn save(&self, document: &CertificateDocument) -> Result<PathBuf, CertificateError> {
        tokio::fs::create_dir_all(&self.out_dir).await?;
        let path = self.out_dir.join(document.file_name());
        tokio::fs::write(&path, document.bytes()).await?;
        tracing::info!(path = %path.display(), recipient = document.content().recipient(), "certificate saved");
        Ok(path)
    }
}
