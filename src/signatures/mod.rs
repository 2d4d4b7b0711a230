//! PDF Digital Signatures module.
//!
//! Signs documents with a PKCS#12 identity and verifies the signatures the
//! crate writes.
//!
//! ## Signature Types Supported
//!
//! - PKCS#7 detached signatures (adbe.pkcs7.detached)
//!
//! ## Example
//!
//! ```ignore
//! use pdf_stamp::signatures::{PdfSigner, SigningCredentials, SignOptions};
//!
//! let credentials = SigningCredentials::from_pkcs12_file("cert.p12", "password")?;
//! let signer = PdfSigner::new(credentials, SignOptions::default(), 8192);
//! let dict = signer.build_signature_dictionary(chrono::Utc::now());
//! ```
//!
//! ## PDF Specification Reference
//!
//! - ISO 32000-1:2008 Section 12.8 - Digital Signatures

mod byterange;
mod signer;
mod types;
mod verifier;

pub use byterange::{ByteRangeCalculator, PlaceholderOffsets};
pub use signer::{format_pdf_date, EmbeddedSignature, PdfSigner};
pub use types::{
    FieldState, SignOptions, SignatureInfo, SigningCredentials, VerificationResult,
    VerificationStatus, SIGNATURE_FILTER, SIGNATURE_SUB_FILTER,
};
pub use verifier::SignatureVerifier;
