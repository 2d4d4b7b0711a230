//! Digital signature types and data structures.
//!
//! This module defines the core types used for PDF digital signatures.

use crate::error::{Error, Result};
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;

/// Signature handler written to `/Filter`.
pub const SIGNATURE_FILTER: &str = "Adobe.PPKLite";

/// Signature format written to `/SubFilter`.
pub const SIGNATURE_SUB_FILTER: &str = "adbe.pkcs7.detached";

/// Signing credentials containing certificate and private key.
#[derive(Clone)]
pub struct SigningCredentials {
    /// Signer certificate
    pub certificate: X509,
    /// Private key matching the certificate
    pub private_key: PKey<Private>,
    /// Intermediate certificates shipped alongside the signer certificate
    pub chain: Vec<X509>,
}

impl SigningCredentials {
    /// Create new signing credentials from parsed components.
    pub fn new(certificate: X509, private_key: PKey<Private>) -> Self {
        Self {
            certificate,
            private_key,
            chain: Vec::new(),
        }
    }

    /// Load credentials from PKCS#12 (.p12/.pfx) data.
    pub fn from_pkcs12(data: &[u8], password: &str) -> Result<Self> {
        let archive = Pkcs12::from_der(data)
            .map_err(|e| Error::Certificate(format!("not a PKCS#12 archive: {}", e)))?;
        let parsed = archive
            .parse2(password)
            .map_err(|e| Error::Certificate(format!("cannot unlock PKCS#12 archive: {}", e)))?;

        let private_key = parsed
            .pkey
            .ok_or_else(|| Error::Certificate("PKCS#12 archive has no private key".to_string()))?;
        let certificate = parsed
            .cert
            .ok_or_else(|| Error::Certificate("PKCS#12 archive has no certificate".to_string()))?;
        let chain = parsed
            .ca
            .map(|stack| stack.into_iter().collect())
            .unwrap_or_default();

        Ok(Self {
            certificate,
            private_key,
            chain,
        })
    }

    /// Subject common name of the signer certificate.
    pub fn common_name(&self) -> Option<String> {
        let der = self.certificate.to_der().ok()?;
        let (_, cert) = x509_parser::parse_x509_certificate(&der).ok()?;
        let name = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .map(str::to_string);
        name
    }
}

impl std::fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("certificate", &self.common_name())
            .field("private_key", &"[REDACTED]")
            .field("chain", &format!("{} certificates", self.chain.len()))
            .finish()
    }
}

/// Options for signing a PDF.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignOptions {
    /// Reason for signing
    pub reason: Option<String>,
    /// Location where the document was signed
    pub location: Option<String>,
    /// Contact information
    pub contact_info: Option<String>,
    /// Name of the signer (if different from certificate CN)
    pub name: Option<String>,
}

impl SignOptions {
    /// Set the reason for signing.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Set the signing location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set contact information.
    pub fn with_contact_info(mut self, contact: impl Into<String>) -> Self {
        self.contact_info = Some(contact.into());
        self
    }

    /// Override the signer name taken from the certificate.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Lifecycle state of a signature field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// No `/V` value yet
    Unsigned,
    /// `/V` points at a signature dictionary
    Signed,
}

/// Information about an existing signature in a PDF.
#[derive(Debug, Clone, Default)]
pub struct SignatureInfo {
    /// Name of the signer
    pub signer_name: Option<String>,
    /// Signing time
    pub signing_time: Option<String>,
    /// Reason for signing
    pub reason: Option<String>,
    /// Signing location
    pub location: Option<String>,
    /// Contact information
    pub contact_info: Option<String>,
    /// Signature format
    pub sub_filter: Option<String>,
    /// Whether the signature covers the whole document
    pub covers_whole_document: bool,
    /// Byte range of the signed data
    pub byte_range: Vec<i64>,
}

/// Result of signature verification.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// Name of the signature field
    pub field_name: String,
    /// Overall verification status
    pub status: VerificationStatus,
    /// Signature information
    pub signature_info: SignatureInfo,
    /// Verification messages (errors, warnings)
    pub messages: Vec<String>,
}

/// Verification status of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Signature is valid and covers the whole file
    Valid,
    /// Signature is invalid (cryptographically or structurally)
    Invalid,
    /// Signature is valid but later updates were appended
    ValidWithWarnings,
}

impl VerificationStatus {
    /// Check if the status indicates a valid signature.
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationStatus::Valid)
    }

    /// Check if the status indicates any form of validity (including warnings).
    pub fn is_ok(&self) -> bool {
        matches!(self, VerificationStatus::Valid | VerificationStatus::ValidWithWarnings)
    }
}
