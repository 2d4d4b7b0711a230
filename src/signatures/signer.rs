//! PDF signing implementation.
//!
//! This module handles the creation of digital signatures for PDF documents.
//! Signing happens in two passes: the signature dictionary is first written
//! with fixed-width placeholders, then, once the file bytes are final, the
//! ByteRange is patched and a detached CMS signature over the covered bytes
//! is written into `/Contents`.

use super::byterange::ByteRangeCalculator;
use super::types::{SignOptions, SigningCredentials, SIGNATURE_FILTER, SIGNATURE_SUB_FILTER};
use crate::error::Result;
use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Object, StringFormat};
use openssl::cms::{CMSOptions, CmsContentInfo};
use openssl::pkey::{PKeyRef, Private};
use openssl::stack::{Stack, StackRef};
use openssl::x509::{X509Ref, X509};

/// Values written into a signature dictionary by [`PdfSigner::embed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedSignature {
    /// Final ByteRange
    pub byte_range: [i64; 4],
    /// DER-encoded CMS signature
    pub contents: Vec<u8>,
}

/// PDF signer that creates digital signatures.
pub struct PdfSigner {
    credentials: SigningCredentials,
    options: SignOptions,
    byte_range_calc: ByteRangeCalculator,
}

impl PdfSigner {
    /// Create a signer reserving `signature_size` bytes for the CMS blob.
    pub fn new(credentials: SigningCredentials, options: SignOptions, signature_size: usize) -> Self {
        Self {
            credentials,
            options,
            byte_range_calc: ByteRangeCalculator::new(signature_size),
        }
    }

    /// Get the placeholder size for the signature.
    pub fn placeholder_size(&self) -> usize {
        self.byte_range_calc.placeholder_size()
    }

    /// Calculator sized for this signer's reserve.
    pub fn byte_range_calculator(&self) -> &ByteRangeCalculator {
        &self.byte_range_calc
    }

    /// Name recorded as the signer: the explicit option, else the certificate CN.
    pub fn signer_name(&self) -> Option<String> {
        self.options
            .name
            .clone()
            .or_else(|| self.credentials.common_name())
    }

    /// Build the signature dictionary with placeholder `/ByteRange` and `/Contents`.
    ///
    /// `/ByteRange` precedes `/Contents` and both precede any free-text entry,
    /// so the placeholders are the first matches inside the written object.
    pub fn build_signature_dictionary(&self, signing_time: DateTime<Utc>) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Sig".to_vec()));
        dict.set("Filter", Object::Name(SIGNATURE_FILTER.as_bytes().to_vec()));
        dict.set("SubFilter", Object::Name(SIGNATURE_SUB_FILTER.as_bytes().to_vec()));
        dict.set("ByteRange", ByteRangeCalculator::byte_range_placeholder());
        dict.set("Contents", self.byte_range_calc.contents_placeholder());
        dict.set("M", Object::string_literal(format_pdf_date(&signing_time)));

        if let Some(name) = self.signer_name() {
            dict.set("Name", text_string(&name));
        }
        if let Some(ref reason) = self.options.reason {
            dict.set("Reason", text_string(reason));
        }
        if let Some(ref location) = self.options.location {
            dict.set("Location", text_string(location));
        }
        if let Some(ref contact) = self.options.contact_info {
            dict.set("ContactInfo", text_string(contact));
        }

        dict
    }

    /// Produce a detached CMS signature over `signed_bytes`.
    pub fn sign(&self, signed_bytes: &[u8]) -> Result<Vec<u8>> {
        let mut certs = Stack::<X509>::new()?;
        for cert in &self.credentials.chain {
            certs.push(cert.clone())?;
        }

        let cert: &X509Ref = &self.credentials.certificate;
        let pkey: &PKeyRef<Private> = &self.credentials.private_key;
        let certs: &StackRef<X509> = &certs;
        let cms = CmsContentInfo::sign(
            Some(cert),
            Some(pkey),
            Some(certs),
            Some(signed_bytes),
            CMSOptions::DETACHED | CMSOptions::BINARY,
        )?;
        Ok(cms.to_der()?)
    }

    /// Patch the ByteRange and write the signature into a finished file.
    ///
    /// `span` is the byte span of the signature dictionary's object.
    pub fn embed(&self, data: &mut [u8], span: (usize, usize)) -> Result<EmbeddedSignature> {
        let offsets = self.byte_range_calc.locate(data, span)?;
        let byte_range = self
            .byte_range_calc
            .calculate_byte_range(data.len(), offsets.contents);
        ByteRangeCalculator::write_byte_range(data, &offsets, &byte_range)?;

        let signed_bytes = ByteRangeCalculator::extract_signed_bytes(data, &byte_range)?;
        let contents = self.sign(&signed_bytes)?;
        self.byte_range_calc
            .insert_signature(data, offsets.contents, &contents)?;

        log::debug!(
            "Embedded {} byte signature, ByteRange {}",
            contents.len(),
            ByteRangeCalculator::format_byte_range(&byte_range)
        );
        Ok(EmbeddedSignature {
            byte_range,
            contents,
        })
    }
}

impl std::fmt::Debug for PdfSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfSigner")
            .field("credentials", &self.credentials)
            .field("options", &self.options)
            .field("signature_size", &self.byte_range_calc.signature_size())
            .finish()
    }
}

/// PDF text string: literal when ASCII, UTF-16BE with a byte order mark otherwise.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::string_literal(s);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Format a time as a PDF date string (`D:YYYYMMDDHHmmSSZ`).
pub fn format_pdf_date(time: &DateTime<Utc>) -> String {
    time.format("D:%Y%m%d%H%M%SZ").to_string()
}
