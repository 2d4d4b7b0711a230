// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::wrong_self_convention)]

//! # PDF Stamp
//!
//! Visible digital signatures and page watermarks for existing PDF documents.
//!
//! ## Core Features
//!
//! - **Signatures**: PKCS#12 identities, detached CMS (`adbe.pkcs7.detached`),
//!   one signature field shown through a widget on each page of a range
//! - **Image watermarks**: one shared image XObject centered on every page
//! - **Text watermarks**: one shared text block laid along each page's diagonal
//! - **Saving**: incremental update of the opened file, or a full rewrite to
//!   a new file or a caller-owned stream
//!
//! ## Architecture
//!
//! ```text
//! api (sign / sign_all / watermark_image / watermark_text)
//!     ↓
//! geometry ── placement of a payload inside a page or widget box
//! editor   ── PdfDocument, resource registry, page ranges
//! writer   ── overlays, signature widgets, content streams, file output
//! signatures ── PKCS#12, ByteRange placeholder, CMS embed + verify
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use pdf_stamp::{PdfDocument, SaveMode, SignatureRequest};
//! use pdf_stamp::geometry::Rect;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = PdfDocument::open("contract.pdf")?;
//! doc.watermark_text("CONFIDENTIAL", SaveMode::Incremental)?;
//!
//! let request = SignatureRequest::new(
//!     "signer.p12",
//!     "secret",
//!     "signature.png",
//!     Rect::new(400.0, 40.0, 150.0, 50.0),
//! );
//! let field = doc.sign(&request, SaveMode::to_path("signed.pdf"))?;
//! println!("signed as {}", field);
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Placement math
pub mod geometry;

// Document handle, resources, page ranges
pub mod editor;

// Overlays, widgets and file output
pub mod writer;

// Digital signatures
pub mod signatures;

// High-level operations
pub mod api;

// Re-exports
pub use api::SignatureRequest;
pub use config::StampConfig;
pub use editor::{Destination, ImageSource, PageRange, PdfDocument, SaveMode};
pub use error::{Error, Result};
pub use lopdf;

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
