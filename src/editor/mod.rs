//! Editing existing PDF documents.
//!
//! ## Architecture
//!
//! ```text
//! PdfDocument (parsed objects + backing bytes)
//!     ↓
//! [ResourceRegistry] (shared images / text blocks, one id each)
//!     ↓
//! [apply_to_pages]   (one annotation per page in the range)
//!     ↓
//! Save:
//!   - Incremental update (append to the backing file)
//!   - Full rewrite (new file or caller stream)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use pdf_stamp::editor::{PdfDocument, SaveMode};
//!
//! let mut doc = PdfDocument::open("input.pdf")?;
//! doc.watermark_text("DRAFT", SaveMode::Incremental)?;
//! ```

pub mod document_editor;
pub mod page_range;
pub mod resource_manager;

pub use document_editor::{
    AnnotationInfo, Destination, ImageSource, PdfDocument, SaveMode, SignatureFieldInfo,
};
pub use page_range::{apply_to_pages, PageRange};
pub use resource_manager::{
    IdGenerator, RandomIds, ResourceId, ResourceKind, ResourceRegistry, SequentialIds,
    VisualResource,
};
