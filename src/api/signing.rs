//! Visible digital signatures.

use crate::editor::document_editor::read_input_file;
use crate::editor::{apply_to_pages, PageRange, PdfDocument, SaveMode};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::signatures::{PdfSigner, SignOptions, SigningCredentials};
use crate::writer::{signature_field, ImageData, SignatureView};
use chrono::Utc;
use std::path::PathBuf;

/// Everything needed to place one signature.
///
/// # Example
///
/// ```ignore
/// use pdf_stamp::api::SignatureRequest;
/// use pdf_stamp::editor::PageRange;
/// use pdf_stamp::geometry::Rect;
///
/// let request = SignatureRequest::new("signer.p12", "secret", "signature.png", Rect::new(50.0, 50.0, 200.0, 60.0))
///     .pages(PageRange::span(0, 2))
///     .reason("Approved");
/// ```
#[derive(Debug, Clone)]
pub struct SignatureRequest {
    /// PKCS#12 file holding the signing key and certificate
    pub certificate: PathBuf,
    /// Password of the PKCS#12 file
    pub password: String,
    /// Image shown in each widget
    pub image: PathBuf,
    /// Widget rectangle, in page space, on every signed page
    pub boundary: Rect,
    /// Pages that show the signature
    pub pages: PageRange,
    /// Optional signature dictionary entries
    pub options: SignOptions,
}

impl SignatureRequest {
    /// Create a request that signs the first page.
    pub fn new(
        certificate: impl Into<PathBuf>,
        password: impl Into<String>,
        image: impl Into<PathBuf>,
        boundary: Rect,
    ) -> Self {
        Self {
            certificate: certificate.into(),
            password: password.into(),
            image: image.into(),
            boundary,
            pages: PageRange::First,
            options: SignOptions::default(),
        }
    }

    /// Show the signature on `pages`.
    pub fn pages(mut self, pages: PageRange) -> Self {
        self.pages = pages;
        self
    }

    /// Replace all optional signature entries.
    pub fn options(mut self, options: SignOptions) -> Self {
        self.options = options;
        self
    }

    /// Set `/Reason`.
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.options = self.options.with_reason(reason);
        self
    }

    /// Set `/Location`.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.options = self.options.with_location(location);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.certificate.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("certificate path is empty".to_string()));
        }
        if self.password.is_empty() {
            return Err(Error::InvalidArgument("certificate password is empty".to_string()));
        }
        if self.image.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("signature image path is empty".to_string()));
        }
        let corners = self.boundary.to_corners();
        if corners.iter().any(|v| !v.is_finite()) || !self.boundary.has_area() {
            return Err(Error::InvalidArgument(format!(
                "signature boundary {:?} has no area",
                self.boundary
            )));
        }
        Ok(())
    }
}

impl PdfDocument {
    /// Sign the document and show the signature on the requested pages.
    ///
    /// Every argument, file and page index is checked before the document
    /// is touched. One signature field is created; each page in the range
    /// gets a widget that belongs to it. Returns the field's name.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty path or password, or a boundary
    ///   without area
    /// - `FileNotFound` when the certificate or image file is missing
    /// - `InvalidRange` when the page range does not fit the document
    /// - `Certificate`, `Image` for unreadable inputs
    /// - `NoBackingStore`, `Io`, `Signature` from saving
    pub fn sign(&mut self, request: &SignatureRequest, mode: SaveMode<'_>) -> Result<String> {
        request.validate()?;
        let cert_data = read_input_file(&request.certificate)?;
        let image_data = read_input_file(&request.image)?;
        let page_count = self.page_count();
        request.pages.resolve(page_count)?;
        if matches!(mode, SaveMode::Incremental) && !self.has_backing_store() {
            return Err(Error::NoBackingStore);
        }

        let credentials = SigningCredentials::from_pkcs12(&cert_data, &request.password)?;
        let image = ImageData::from_bytes(&image_data)?;

        let image_id = self.register_image(&image)?;
        let resource = self.resource(&image_id)?.clone();
        let field_name = self.registry_mut().issue_id()?;

        let signer = PdfSigner::new(
            credentials,
            request.options.clone(),
            self.config().signature_reserve,
        );
        let signature_id = self
            .document_mut()
            .add_object(signer.build_signature_dictionary(Utc::now()));
        let field_id = self.document_mut().new_object_id();

        let pages = self.page_ids();
        let mut widgets = Vec::new();
        apply_to_pages(request.pages, page_count, |index| {
            let view = SignatureView::compose(request.boundary, &image_id, &resource)?;
            let widget_id =
                view.add_to_document(self.document_mut(), pages[index], field_id, &resource)?;
            self.attach_annotation(pages[index], widget_id)?;
            widgets.push(widget_id);
            Ok(())
        })?;

        self.document_mut().objects.insert(
            field_id,
            signature_field(&field_name, signature_id, &widgets).into(),
        );
        self.add_signature_field(field_id)?;
        self.queue_signature(signature_id, signer);

        self.save(mode)?;
        log::info!(
            "Signed field {} on {} page(s)",
            field_name,
            widgets.len()
        );
        Ok(field_name)
    }

    /// Sign the document and show the signature on every page.
    pub fn sign_all(&mut self, request: &SignatureRequest, mode: SaveMode<'_>) -> Result<String> {
        let request = request.clone().pages(PageRange::All);
        self.sign(&request, mode)
    }
}
