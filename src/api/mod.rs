//! High-level stamping API.
//!
//! Every operation here is a method on [`PdfDocument`](crate::editor::PdfDocument)
//! that validates its inputs, mutates the document, and saves it in one call.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pdf_stamp::api::SignatureRequest;
//! use pdf_stamp::editor::{ImageSource, PdfDocument, SaveMode};
//! use pdf_stamp::geometry::Rect;
//!
//! // Watermark in place
//! let mut doc = PdfDocument::open("contract.pdf")?;
//! doc.watermark_text("DRAFT", SaveMode::Incremental)?;
//!
//! // Watermark into a new file
//! doc.watermark_image(ImageSource::Path("logo.png".into()), SaveMode::to_path("branded.pdf"))?;
//!
//! // Sign the first page
//! let request = SignatureRequest::new("signer.p12", "secret", "signature.png", Rect::new(400.0, 40.0, 150.0, 50.0));
//! let field = doc.sign(&request, SaveMode::Incremental)?;
//! ```

mod signing;
mod watermarking;

pub use signing::SignatureRequest;
