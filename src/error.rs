//! Error types for signing and watermarking operations.
//!
//! Every failure surfaces synchronously as an [`Error`]. Precondition and
//! missing-file errors are raised before the document is touched; persistence
//! errors leave in-memory changes in place so that `save` can be retried.

use std::path::PathBuf;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while signing or watermarking a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required argument was empty or otherwise unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A file the operation needs to read does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Page range outside the document
    #[error("Invalid page range [{start}, {end}] for a document with {page_count} pages")]
    InvalidRange {
        /// First page index (0-based, inclusive)
        start: usize,
        /// Last page index (0-based, inclusive)
        end: usize,
        /// Number of pages in the document
        page_count: usize,
    },

    /// A freshly generated identifier was already in use in this document
    #[error("Identifier collision: {0}")]
    IdCollision(String),

    /// A resource identifier was referenced before being registered
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Placement requested inside a container with no usable area
    #[error("Degenerate container geometry: {width} x {height}")]
    DegenerateGeometry {
        /// Container width
        width: f64,
        /// Container height
        height: f64,
    },

    /// Incremental save requested for a document that was not opened from a file
    #[error("Document has no backing store for an incremental save")]
    NoBackingStore,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the PDF object model
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Invalid PDF structure
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Image error
    #[error("Image error: {0}")]
    Image(String),

    /// Certificate could not be loaded or unlocked
    #[error("Certificate error: {0}")]
    Certificate(String),

    /// Signature could not be produced or embedded
    #[error("Signature error: {0}")]
    Signature(String),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Pdf(err.to_string())
    }
}

impl From<openssl::error::ErrorStack> for Error {
    fn from(err: openssl::error::ErrorStack) -> Self {
        Error::Signature(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range_error() {
        let err = Error::InvalidRange {
            start: 2,
            end: 5,
            page_count: 3,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("[2, 5]"));
        assert!(msg.contains("3 pages"));
    }

    #[test]
    fn test_file_not_found_error() {
        let err = Error::FileNotFound(PathBuf::from("/tmp/missing.p12"));
        let msg = format!("{}", err);
        assert!(msg.contains("File not found"));
        assert!(msg.contains("missing.p12"));
    }

    #[test]
    fn test_degenerate_geometry_error() {
        let err = Error::DegenerateGeometry {
            width: 0.0,
            height: 100.0,
        };
        assert!(format!("{}", err).contains("0 x 100"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
