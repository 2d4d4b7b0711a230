//! PDF file writer.
//!
//! Produces either a complete file (header, body, xref table, trailer) or an
//! incremental update section appended to the original bytes. Output is
//! assembled in memory so the byte offset of every written object is known
//! before anything reaches the destination.

use super::object_serializer::ObjectSerializer;
use crate::error::{Error, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// A serialized PDF file together with where each object landed.
#[derive(Debug, Clone)]
pub struct WrittenFile {
    /// The complete file bytes
    pub bytes: Vec<u8>,
    /// Offset of each `N G obj` header written in this pass
    pub offsets: BTreeMap<ObjectId, usize>,
}

impl WrittenFile {
    /// Byte span `(start, end)` of an object written in this pass.
    pub fn object_span(&self, id: ObjectId) -> Option<(usize, usize)> {
        let start = *self.offsets.get(&id)?;
        let end = find(&self.bytes[start..], b"endobj").map(|p| start + p)?;
        Some((start, end))
    }
}

/// Writes `lopdf` documents in full or as incremental updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter {
    serializer: ObjectSerializer,
}

impl PdfWriter {
    /// Create a new writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write every object of `doc` as a fresh file.
    ///
    /// Cross-reference streams and object streams are not carried over; the
    /// objects they held were expanded by the loader and are written inline.
    pub fn write_full(&self, doc: &Document) -> Result<WrittenFile> {
        let mut buf: Vec<u8> = Vec::new();
        let version = if doc.version.is_empty() {
            "1.7"
        } else {
            doc.version.as_str()
        };
        write!(buf, "%PDF-{}\n", version)?;
        // Binary marker: bytes > 127 flag the file as binary
        buf.write_all(b"%\xE2\xE3\xCF\xD3\n")?;

        let mut offsets = BTreeMap::new();
        for (&id, obj) in &doc.objects {
            if is_structural_stream(obj) {
                continue;
            }
            offsets.insert(id, buf.len());
            self.serializer.write_indirect(&mut buf, id, obj)?;
        }

        let size = offsets
            .keys()
            .map(|(id, _)| *id)
            .max()
            .unwrap_or(0)
            .max(doc.max_id)
            + 1;

        let xref_offset = buf.len();
        write!(buf, "xref\n0 {}\n", size)?;
        let by_number: BTreeMap<u32, (usize, u16)> = offsets
            .iter()
            .map(|(&(num, gen), &offset)| (num, (offset, gen)))
            .collect();
        for num in 0..size {
            match by_number.get(&num) {
                Some((offset, gen)) => write!(buf, "{:010} {:05} n \n", offset, gen)?,
                None => write!(buf, "{:010} {:05} f \n", 0, 65535)?,
            }
        }

        let trailer = self.build_trailer(&doc.trailer, size, None);
        self.finish(&mut buf, &trailer, xref_offset)?;

        Ok(WrittenFile { bytes: buf, offsets })
    }

    /// Append the objects named in `ids` to `original` as an update section.
    ///
    /// `original` must be the file `doc` was loaded from (or a previous
    /// incremental result); its last `startxref` becomes the new `/Prev`.
    pub fn write_incremental(
        &self,
        original: &[u8],
        doc: &Document,
        ids: &BTreeSet<ObjectId>,
    ) -> Result<WrittenFile> {
        let prev = find_prev_xref_offset(original)?;

        let mut buf = original.to_vec();
        if !buf.ends_with(b"\n") {
            buf.push(b'\n');
        }

        let mut offsets = BTreeMap::new();
        for &id in ids {
            let obj = doc
                .objects
                .get(&id)
                .ok_or_else(|| Error::InvalidPdf(format!("object {} {} R is missing", id.0, id.1)))?;
            offsets.insert(id, buf.len());
            self.serializer.write_indirect(&mut buf, id, obj)?;
        }

        let previous_size = doc
            .trailer
            .get(b"Size")
            .ok()
            .and_then(|s| s.as_i64().ok())
            .unwrap_or(0)
            .max(0) as u32;
        let size = previous_size
            .max(doc.max_id + 1)
            .max(ids.iter().map(|(n, _)| n + 1).max().unwrap_or(0));

        let xref_offset = buf.len();
        write!(buf, "xref\n")?;
        for run in consecutive_runs(&offsets) {
            write!(buf, "{} {}\n", run[0].0 .0, run.len())?;
            for ((_, gen), offset) in run {
                write!(buf, "{:010} {:05} n \n", offset, gen)?;
            }
        }

        let trailer = self.build_trailer(&doc.trailer, size, Some(prev));
        self.finish(&mut buf, &trailer, xref_offset)?;

        Ok(WrittenFile { bytes: buf, offsets })
    }

    /// Keep only the trailer keys that describe the document, never the
    /// keys of a cross-reference stream dictionary.
    fn build_trailer(&self, source: &Dictionary, size: u32, prev: Option<usize>) -> Dictionary {
        let mut trailer = Dictionary::new();
        trailer.set("Size", Object::Integer(i64::from(size)));
        if let Some(prev) = prev {
            trailer.set("Prev", Object::Integer(prev as i64));
        }
        for key in [&b"Root"[..], &b"Info"[..], &b"ID"[..]] {
            if let Ok(value) = source.get(key) {
                trailer.set(key.to_vec(), value.clone());
            }
        }
        trailer
    }

    fn finish(&self, buf: &mut Vec<u8>, trailer: &Dictionary, xref_offset: usize) -> Result<()> {
        write!(buf, "trailer\n")?;
        self.serializer.write_dictionary(buf, trailer)?;
        write!(buf, "\nstartxref\n{}\n%%EOF\n", xref_offset)?;
        Ok(())
    }
}

fn is_structural_stream(obj: &Object) -> bool {
    match obj {
        Object::Stream(stream) => matches!(
            stream.dict.get(b"Type"),
            Ok(Object::Name(name)) if name == b"XRef" || name == b"ObjStm"
        ),
        _ => false,
    }
}

/// Group written objects into xref subsections of consecutive numbers.
fn consecutive_runs(offsets: &BTreeMap<ObjectId, usize>) -> Vec<Vec<(ObjectId, usize)>> {
    let mut runs: Vec<Vec<(ObjectId, usize)>> = Vec::new();
    for (&id, &offset) in offsets {
        match runs.last_mut() {
            Some(run) if run.last().map(|(last, _)| last.0 + 1) == Some(id.0) => {
                run.push((id, offset))
            },
            _ => runs.push(vec![(id, offset)]),
        }
    }
    runs
}

/// Find the offset of the last cross-reference section in a PDF file.
pub fn find_prev_xref_offset(bytes: &[u8]) -> Result<usize> {
    let pos = rfind(bytes, b"startxref")
        .ok_or_else(|| Error::InvalidPdf("Could not find startxref in original PDF".to_string()))?;

    let digits: String = bytes[pos + b"startxref".len()..]
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| b as char)
        .collect();

    digits
        .parse::<usize>()
        .map_err(|_| Error::InvalidPdf("Malformed startxref offset".to_string()))
}

/// Position of the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Position of the last occurrence of `needle` in `haystack`.
pub(crate) fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn one_page_document() -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn test_full_write_loads_back() {
        let doc = one_page_document();
        let written = PdfWriter::new().write_full(&doc).unwrap();

        assert!(written.bytes.starts_with(b"%PDF-1.5\n"));
        assert!(written.bytes.ends_with(b"%%EOF\n"));
        assert_eq!(written.offsets.len(), 3);

        let reloaded = Document::load_mem(&written.bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
    }

    #[test]
    fn test_incremental_appends_after_original() {
        let mut doc = one_page_document();
        let original = PdfWriter::new().write_full(&doc).unwrap().bytes;
        let original_xref = find_prev_xref_offset(&original).unwrap();

        let new_id = doc.add_object(dictionary! { "Type" => "Test" });
        let ids: BTreeSet<ObjectId> = [new_id].into_iter().collect();
        let written = PdfWriter::new().write_incremental(&original, &doc, &ids).unwrap();

        assert!(written.bytes.starts_with(&original));
        let tail = String::from_utf8_lossy(&written.bytes[original.len()..]).into_owned();
        assert!(tail.contains(&format!("/Prev {}", original_xref)));
        assert!(tail.contains("4 0 obj"));

        let reloaded = Document::load_mem(&written.bytes).unwrap();
        assert!(reloaded.get_object(new_id).is_ok());
    }

    #[test]
    fn test_object_span_covers_definition() {
        let doc = one_page_document();
        let written = PdfWriter::new().write_full(&doc).unwrap();
        let (start, end) = written.object_span((1, 0)).unwrap();
        assert!(written.bytes[start..].starts_with(b"1 0 obj"));
        assert!(written.bytes[end..].starts_with(b"endobj"));
    }

    #[test]
    fn test_consecutive_runs() {
        let offsets: BTreeMap<ObjectId, usize> =
            [((3, 0), 10), ((4, 0), 20), ((9, 0), 30)].into_iter().collect();
        let runs = consecutive_runs(&offsets);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 2);
        assert_eq!(runs[1][0].0, (9, 0));
    }

    #[test]
    fn test_missing_startxref() {
        assert!(matches!(find_prev_xref_offset(b"%PDF-1.4\n"), Err(Error::InvalidPdf(_))));
    }
}
