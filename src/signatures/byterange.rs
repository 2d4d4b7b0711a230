//! ByteRange calculation for PDF signatures.
//!
//! PDF digital signatures use a ByteRange array to specify which portions
//! of the document are covered by the signature. The signature itself is
//! stored in a placeholder that is excluded from the signed bytes.
//!
//! ## ByteRange Format
//!
//! The ByteRange is an array of four integers:
//! `[offset1, length1, offset2, length2]`
//!
//! Where:
//! - `offset1` = 0 (start of file)
//! - `length1` = byte offset where the signature value begins
//! - `offset2` = byte offset where the signature value ends
//! - `length2` = remaining bytes to end of file
//!
//! The signature value is a hex-encoded string within `<` and `>` delimiters.
//! Both the array and the string are written first as fixed-width
//! placeholders and patched in place once the file layout is final.

use crate::error::{Error, Result};
use crate::writer::pdf_writer::find;
use lopdf::{Object, StringFormat};

/// Widest value a ByteRange entry may take in the placeholder.
const BYTE_RANGE_FILLER: i64 = 9_999_999_999;

/// Where the two placeholders sit inside a written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderOffsets {
    /// Offset of the `[` opening the ByteRange array
    pub byte_range_start: usize,
    /// Offset one past the `]` closing the ByteRange array
    pub byte_range_end: usize,
    /// Offset of the `<` opening the Contents string
    pub contents: usize,
}

/// Calculator for PDF signature byte ranges.
#[derive(Debug, Clone, Copy)]
pub struct ByteRangeCalculator {
    /// Bytes reserved for the DER-encoded signature
    signature_size: usize,
}

impl Default for ByteRangeCalculator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SIGNATURE_RESERVE)
    }
}

impl ByteRangeCalculator {
    /// Create a calculator reserving `signature_size` bytes for the signature.
    pub fn new(signature_size: usize) -> Self {
        Self { signature_size }
    }

    /// Bytes reserved for the DER signature.
    pub fn signature_size(&self) -> usize {
        self.signature_size
    }

    /// Length of the serialized `/Contents` value: two hex digits per byte
    /// plus the angle brackets.
    pub fn placeholder_size(&self) -> usize {
        self.signature_size * 2 + 2
    }

    /// `/Contents` placeholder: a hex string of zero bytes.
    pub fn contents_placeholder(&self) -> Object {
        Object::String(vec![0u8; self.signature_size], StringFormat::Hexadecimal)
    }

    /// `/ByteRange` placeholder wide enough for any real range.
    pub fn byte_range_placeholder() -> Object {
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(BYTE_RANGE_FILLER),
            Object::Integer(BYTE_RANGE_FILLER),
            Object::Integer(BYTE_RANGE_FILLER),
        ])
    }

    /// Find both placeholders within the signature object's span.
    pub fn locate(&self, data: &[u8], span: (usize, usize)) -> Result<PlaceholderOffsets> {
        let (start, end) = span;
        let object = data
            .get(start..end)
            .ok_or_else(|| Error::Signature("signature object span outside file".to_string()))?;

        let key = find(object, b"/ByteRange")
            .ok_or_else(|| Error::Signature("signature dictionary has no /ByteRange".to_string()))?;
        let open = find(&object[key..], b"[")
            .map(|p| key + p)
            .ok_or_else(|| Error::Signature("malformed /ByteRange".to_string()))?;
        let close = find(&object[open..], b"]")
            .map(|p| open + p + 1)
            .ok_or_else(|| Error::Signature("malformed /ByteRange".to_string()))?;

        let key = find(&object[close..], b"/Contents")
            .map(|p| close + p)
            .ok_or_else(|| Error::Signature("signature dictionary has no /Contents".to_string()))?;
        let contents = find(&object[key..], b"<")
            .map(|p| key + p)
            .ok_or_else(|| Error::Signature("malformed /Contents".to_string()))?;

        if object.get(contents + self.placeholder_size() - 1) != Some(&b'>') {
            return Err(Error::Signature(format!(
                "/Contents placeholder is not {} bytes wide",
                self.placeholder_size()
            )));
        }

        Ok(PlaceholderOffsets {
            byte_range_start: start + open,
            byte_range_end: start + close,
            contents: start + contents,
        })
    }

    /// Calculate the ByteRange array given the position of the /Contents value.
    ///
    /// # Arguments
    ///
    /// * `file_size` - Total size of the PDF file
    /// * `contents_offset` - Byte offset where the /Contents value starts (including '<')
    pub fn calculate_byte_range(&self, file_size: usize, contents_offset: usize) -> [i64; 4] {
        let before_sig = contents_offset as i64;
        let after_sig_start = (contents_offset + self.placeholder_size()) as i64;
        let after_sig_len = file_size as i64 - after_sig_start;

        [0, before_sig, after_sig_start, after_sig_len]
    }

    /// Format a ByteRange array as a PDF array string.
    pub fn format_byte_range(byte_range: &[i64; 4]) -> String {
        format!("[{} {} {} {}]", byte_range[0], byte_range[1], byte_range[2], byte_range[3])
    }

    /// Overwrite the ByteRange placeholder, padding with spaces.
    pub fn write_byte_range(
        data: &mut [u8],
        offsets: &PlaceholderOffsets,
        byte_range: &[i64; 4],
    ) -> Result<()> {
        let formatted = Self::format_byte_range(byte_range);
        let slot = offsets.byte_range_end - offsets.byte_range_start;
        if formatted.len() > slot {
            return Err(Error::Signature(format!(
                "ByteRange {} does not fit in {} bytes",
                formatted, slot
            )));
        }

        let target = &mut data[offsets.byte_range_start..offsets.byte_range_end];
        target[..formatted.len()].copy_from_slice(formatted.as_bytes());
        target[formatted.len()..].fill(b' ');
        Ok(())
    }

    /// Extract the bytes to be signed from a PDF file.
    ///
    /// This returns the concatenation of the two ranges specified by ByteRange.
    pub fn extract_signed_bytes(pdf_data: &[u8], byte_range: &[i64; 4]) -> Result<Vec<u8>> {
        if byte_range.iter().any(|&v| v < 0) {
            return Err(Error::InvalidPdf(format!(
                "negative ByteRange entry: {}",
                Self::format_byte_range(byte_range)
            )));
        }

        let offset1 = byte_range[0] as usize;
        let length1 = byte_range[1] as usize;
        let offset2 = byte_range[2] as usize;
        let length2 = byte_range[3] as usize;

        let end1 = offset1.checked_add(length1).filter(|&end| end <= pdf_data.len());
        let end1 = end1.ok_or_else(|| {
            Error::InvalidPdf(format!(
                "ByteRange first range exceeds file size: {} + {} > {}",
                offset1,
                length1,
                pdf_data.len()
            ))
        })?;
        let end2 = offset2.checked_add(length2).filter(|&end| end <= pdf_data.len());
        let end2 = end2.ok_or_else(|| {
            Error::InvalidPdf(format!(
                "ByteRange second range exceeds file size: {} + {} > {}",
                offset2,
                length2,
                pdf_data.len()
            ))
        })?;

        let mut signed_bytes = Vec::with_capacity(length1 + length2);
        signed_bytes.extend_from_slice(&pdf_data[offset1..end1]);
        signed_bytes.extend_from_slice(&pdf_data[offset2..end2]);
        Ok(signed_bytes)
    }

    /// Check that a ByteRange starts at 0, leaves a gap, and ends at EOF.
    pub fn validate_byte_range(byte_range: &[i64; 4], file_size: usize) -> Result<()> {
        if byte_range[0] != 0 {
            return Err(Error::InvalidPdf("ByteRange must start at offset 0".to_string()));
        }
        if byte_range[1] < 0 || byte_range[2] <= byte_range[1] {
            return Err(Error::InvalidPdf(
                "ByteRange second range must start after the first ends".to_string(),
            ));
        }
        if byte_range[3] < 0 || byte_range[2].checked_add(byte_range[3]) != Some(file_size as i64) {
            return Err(Error::InvalidPdf(format!(
                "ByteRange does not end at end of file ({})",
                file_size
            )));
        }
        Ok(())
    }

    /// Write the DER signature into the /Contents placeholder.
    ///
    /// The signature is hex-encoded; unused space keeps its `0` padding.
    pub fn insert_signature(&self, pdf_data: &mut [u8], contents_offset: usize, signature: &[u8]) -> Result<()> {
        if signature.len() > self.signature_size {
            return Err(Error::Signature(format!(
                "signature of {} bytes exceeds the {} bytes reserved",
                signature.len(),
                self.signature_size
            )));
        }

        let end = contents_offset + self.placeholder_size();
        if end > pdf_data.len() || pdf_data[contents_offset] != b'<' || pdf_data[end - 1] != b'>' {
            return Err(Error::Signature("/Contents placeholder not found at offset".to_string()));
        }

        let hex = to_hex(signature);
        pdf_data[contents_offset + 1..contents_offset + 1 + hex.len()].copy_from_slice(hex.as_bytes());
        Ok(())
    }
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(hex, "{:02X}", byte);
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::object_serializer::ObjectSerializer;
    use lopdf::dictionary;

    fn signature_object(calc: &ByteRangeCalculator) -> Vec<u8> {
        let dict = dictionary! {
            "Type" => "Sig",
            "ByteRange" => ByteRangeCalculator::byte_range_placeholder(),
            "Contents" => calc.contents_placeholder(),
            "Reason" => Object::string_literal("/Contents in a reason"),
        };
        let mut data = b"%PDF-1.7\n".to_vec();
        ObjectSerializer::new()
            .write_indirect(&mut data, (4, 0), &Object::Dictionary(dict))
            .unwrap();
        data.extend_from_slice(b"trailer\n%%EOF\n");
        data
    }

    #[test]
    fn test_placeholder_size() {
        let calc = ByteRangeCalculator::new(100);
        assert_eq!(calc.placeholder_size(), 202);
        assert_eq!(ByteRangeCalculator::default().signature_size(), 8192);
    }

    #[test]
    fn test_calculate_byte_range() {
        let calc = ByteRangeCalculator::new(100);
        let byte_range = calc.calculate_byte_range(1000, 500);
        assert_eq!(byte_range, [0, 500, 702, 298]);
    }

    #[test]
    fn test_format_byte_range() {
        assert_eq!(ByteRangeCalculator::format_byte_range(&[0, 100, 200, 300]), "[0 100 200 300]");
    }

    #[test]
    fn test_locate_and_patch() {
        let calc = ByteRangeCalculator::new(4);
        let mut data = signature_object(&calc);
        let span = (9, data.len());
        let offsets = calc.locate(&data, span).unwrap();

        assert_eq!(data[offsets.byte_range_start], b'[');
        assert_eq!(data[offsets.byte_range_end - 1], b']');
        assert_eq!(&data[offsets.contents..offsets.contents + 10], b"<00000000>");

        let byte_range = calc.calculate_byte_range(data.len(), offsets.contents);
        ByteRangeCalculator::write_byte_range(&mut data, &offsets, &byte_range).unwrap();
        calc.insert_signature(&mut data, offsets.contents, &[0xAB, 0x01]).unwrap();

        let text = String::from_utf8_lossy(&data);
        assert!(text.contains(&ByteRangeCalculator::format_byte_range(&byte_range)));
        assert!(text.contains("<AB010000>"));
        ByteRangeCalculator::validate_byte_range(&byte_range, data.len()).unwrap();
    }

    #[test]
    fn test_oversized_signature_is_rejected() {
        let calc = ByteRangeCalculator::new(2);
        let mut data = b"<0000>".to_vec();
        assert!(matches!(
            calc.insert_signature(&mut data, 0, &[1, 2, 3]),
            Err(Error::Signature(_))
        ));
    }

    #[test]
    fn test_extract_signed_bytes() {
        let data = b"AAAA<00>BBBB";
        let signed = ByteRangeCalculator::extract_signed_bytes(data, &[0, 4, 8, 4]).unwrap();
        assert_eq!(signed, b"AAAABBBB");
    }

    #[test]
    fn test_extract_signed_bytes_out_of_bounds() {
        let data = b"short";
        assert!(ByteRangeCalculator::extract_signed_bytes(data, &[0, 4, 8, 40]).is_err());
        assert!(ByteRangeCalculator::extract_signed_bytes(data, &[0, -1, 2, 1]).is_err());
        assert!(ByteRangeCalculator::extract_signed_bytes(data, &[0, 1, i64::MAX, i64::MAX]).is_err());
    }

    #[test]
    fn test_validate_byte_range() {
        assert!(ByteRangeCalculator::validate_byte_range(&[0, 4, 8, 4], 12).is_ok());
        assert!(ByteRangeCalculator::validate_byte_range(&[1, 4, 8, 3], 12).is_err());
        assert!(ByteRangeCalculator::validate_byte_range(&[0, 4, 8, 2], 12).is_err());
        assert!(ByteRangeCalculator::validate_byte_range(&[0, 8, 4, 8], 12).is_err());
        assert!(ByteRangeCalculator::validate_byte_range(&[0, 1, i64::MAX, 1], 12).is_err());
    }
}
