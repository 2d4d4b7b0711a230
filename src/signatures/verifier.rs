//! PDF signature verification.
//!
//! Checks that a signature's ByteRange is well formed and spans the
//! `/Contents` string exactly, then verifies the detached CMS blob against
//! the covered bytes. Certificate trust is not evaluated.

use super::byterange::ByteRangeCalculator;
use super::types::{SignatureInfo, VerificationResult, VerificationStatus};
use crate::error::{Error, Result};
use lopdf::{Dictionary, Object};
use openssl::cms::{CMSOptions, CmsContentInfo};

/// PDF signature verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Create a new verifier.
    pub fn new() -> Self {
        Self
    }

    /// Extract signature information from a signature dictionary.
    pub fn extract_signature_info(&self, dict: &Dictionary) -> SignatureInfo {
        let text = |key: &[u8]| match dict.get(key) {
            Ok(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
            _ => None,
        };

        let mut info = SignatureInfo {
            signer_name: text(b"Name"),
            signing_time: text(b"M"),
            reason: text(b"Reason"),
            location: text(b"Location"),
            contact_info: text(b"ContactInfo"),
            ..SignatureInfo::default()
        };

        if let Ok(Object::Name(sub_filter)) = dict.get(b"SubFilter") {
            info.sub_filter = Some(String::from_utf8_lossy(sub_filter).into_owned());
        }

        if let Ok(Object::Array(byte_range)) = dict.get(b"ByteRange") {
            info.byte_range = byte_range
                .iter()
                .filter_map(|obj| match obj {
                    Object::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect();
        }

        info
    }

    /// Verify the signature stored in `sig_dict` against the file it came from.
    ///
    /// Structural and cryptographic failures are reported through the
    /// result's status and messages; `Err` is reserved for dictionaries that
    /// are not signatures at all.
    pub fn verify(&self, pdf_data: &[u8], field_name: &str, sig_dict: &Dictionary) -> Result<VerificationResult> {
        let contents = match sig_dict.get(b"Contents") {
            Ok(Object::String(bytes, _)) => bytes.as_slice(),
            _ => return Err(Error::InvalidPdf("signature has no /Contents string".to_string())),
        };

        let mut result = VerificationResult {
            field_name: field_name.to_string(),
            status: VerificationStatus::Invalid,
            signature_info: self.extract_signature_info(sig_dict),
            messages: Vec::new(),
        };

        let byte_range: [i64; 4] = match result.signature_info.byte_range.as_slice().try_into() {
            Ok(range) => range,
            Err(_) => {
                result
                    .messages
                    .push("Invalid ByteRange: expected 4 elements".to_string());
                return Ok(result);
            },
        };

        if byte_range.iter().any(|&v| v < 0) {
            result
                .messages
                .push("ByteRange contains a negative entry".to_string());
            return Ok(result);
        }

        // A signature over an earlier revision ends before EOF; validate it
        // against the prefix it covers.
        let covered = match byte_range[2]
            .checked_add(byte_range[3])
            .and_then(|end| usize::try_from(end).ok())
        {
            Some(covered) => covered,
            None => {
                result
                    .messages
                    .push("ByteRange end overflows".to_string());
                return Ok(result);
            },
        };
        if covered > pdf_data.len() {
            result
                .messages
                .push("ByteRange extends past end of file".to_string());
            return Ok(result);
        }
        let revision = &pdf_data[..covered];

        if let Err(e) = ByteRangeCalculator::validate_byte_range(&byte_range, revision.len()) {
            result
                .messages
                .push(format!("ByteRange validation failed: {}", e));
            return Ok(result);
        }

        let gap_start = byte_range[1] as usize;
        let gap_end = byte_range[2] as usize;
        if revision[gap_start] != b'<' || revision[gap_end - 1] != b'>' {
            result
                .messages
                .push("ByteRange gap does not match the /Contents string".to_string());
            return Ok(result);
        }

        let signed_bytes = ByteRangeCalculator::extract_signed_bytes(revision, &byte_range)?;
        match verify_cms(trim_der(contents), &signed_bytes) {
            Ok(()) => {
                result.signature_info.covers_whole_document = covered == pdf_data.len();
                if result.signature_info.covers_whole_document {
                    result.status = VerificationStatus::Valid;
                } else {
                    result.status = VerificationStatus::ValidWithWarnings;
                    result
                        .messages
                        .push("Document was updated after signing".to_string());
                }
            },
            Err(e) => {
                result
                    .messages
                    .push(format!("Signature verification failed: {}", e));
            },
        }

        Ok(result)
    }
}

fn verify_cms(der: &[u8], signed_bytes: &[u8]) -> Result<()> {
    let mut cms = CmsContentInfo::from_der(der)?;
    cms.verify(
        None,
        None,
        Some(signed_bytes),
        None,
        CMSOptions::NO_SIGNER_CERT_VERIFY | CMSOptions::BINARY,
    )?;
    Ok(())
}

/// Strip the zero padding after a DER SEQUENCE using its length header.
fn trim_der(contents: &[u8]) -> &[u8] {
    if contents.len() < 2 || contents[0] != 0x30 {
        return contents;
    }

    let first = contents[1];
    let (header, len) = if first < 0x80 {
        (2, usize::from(first))
    } else {
        let n = usize::from(first & 0x7F);
        if n == 0 || n > 4 || contents.len() < 2 + n {
            return contents;
        }
        let len = contents[2..2 + n]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | usize::from(b));
        (2 + n, len)
    };

    contents.get(..header + len).unwrap_or(contents)
}

/// Decode a PDF text string (UTF-16BE with BOM, else byte-per-char).
fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    String::from_utf8_lossy(bytes).into_owned()
}
