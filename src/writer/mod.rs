//! PDF writing module for overlays, signature widgets and output files.
//!
//! ## Architecture
//!
//! ```text
//! ImageData / TextBlock        (shared payload → XObject)
//!     ↓
//! OverlayStub / SignatureView  (per-page annotation drawing the payload)
//!     ↓
//! [ContentStreamBuilder]       (appearance stream bytes)
//!     ↓
//! [PdfWriter]                  (full file or incremental update)
//!     ↓
//! [ObjectSerializer]           (serializes PDF objects)
//!     ↓
//! PDF bytes
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use pdf_stamp::writer::{ContentStreamBuilder, PdfWriter};
//!
//! let mut content = ContentStreamBuilder::new();
//! content.save_state().paint_xobject("Im1").restore_state();
//! let bytes = content.build()?;
//!
//! let file = PdfWriter::new().write_full(&doc)?;
//! ```

pub mod content_stream;
pub mod font_manager;
pub mod image_handler;
pub mod object_serializer;
pub mod pdf_writer;
pub mod signature_appearance;
pub mod text_block;
pub mod watermark;

pub use content_stream::{format_number, Color, ContentStreamBuilder, ContentStreamOp};
pub use font_manager::StandardFont;
pub use image_handler::{ColorSpace, ImageData, ImageEncoding};
pub use object_serializer::ObjectSerializer;
pub use pdf_writer::{find_prev_xref_offset, PdfWriter, WrittenFile};
pub use signature_appearance::{signature_field, SignatureView, FLAG_PRINT_LOCKED, SIG_FLAGS};
pub use text_block::{TextBlock, TextStyle, TEXT_BLOCK_SLACK};
pub use watermark::{OverlayStub, FLAG_PRINT};
