//! Open, mutable PDF documents.
//!
//! [`PdfDocument`] wraps a parsed `lopdf` document together with what is
//! needed to write it back: the bytes of its backing file (for incremental
//! updates), the set of objects changed since that file was written, the
//! document's resource registry, and any signatures waiting to be embedded.

use crate::config::StampConfig;
use crate::editor::resource_manager::{IdGenerator, ResourceId, ResourceRegistry, VisualResource};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::signatures::{
    ByteRangeCalculator, FieldState, PdfSigner, SignatureVerifier, VerificationResult,
};
use crate::writer::{ImageData, PdfWriter, TextBlock, SIG_FLAGS};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maximum depth followed through `/Parent` links when resolving inherited
/// page attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Where a full save goes.
pub enum Destination<'a> {
    /// A new file, created or truncated
    Path(PathBuf),
    /// A caller-owned stream; flushed, never closed
    Stream(&'a mut dyn Write),
}

impl std::fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Destination::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// How an operation persists its result.
#[derive(Debug)]
pub enum SaveMode<'a> {
    /// Append an update section to the file the document was opened from
    Incremental,
    /// Write the whole document to a new destination
    WriteTo(Destination<'a>),
}

impl<'a> SaveMode<'a> {
    /// Full save to a file.
    pub fn to_path(path: impl Into<PathBuf>) -> Self {
        SaveMode::WriteTo(Destination::Path(path.into()))
    }

    /// Full save to a caller-owned stream.
    pub fn to_stream(stream: &'a mut dyn Write) -> Self {
        SaveMode::WriteTo(Destination::Stream(stream))
    }
}

/// Where image bytes come from.
pub enum ImageSource<'a> {
    /// Read from a file, opened and closed within the call
    Path(PathBuf),
    /// Read from a caller-owned stream, left open
    Reader(&'a mut dyn Read),
}

impl std::fmt::Debug for ImageSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ImageSource::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl ImageSource<'_> {
    /// Read the image bytes.
    pub(crate) fn read_bytes(self) -> Result<Vec<u8>> {
        match self {
            ImageSource::Path(path) => read_input_file(&path),
            ImageSource::Reader(reader) => {
                let mut data = Vec::new();
                reader.read_to_end(&mut data)?;
                Ok(data)
            },
        }
    }
}

/// An annotation found on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationInfo {
    /// Annotation object, if indirect
    pub object_id: Option<ObjectId>,
    /// `/Subtype` name
    pub subtype: String,
    /// `/Rect`, normalized
    pub rect: Option<Rect>,
    /// `/Parent` field of a widget
    pub parent: Option<ObjectId>,
}

/// A signature field registered in the AcroForm.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureFieldInfo {
    /// Field object
    pub object_id: ObjectId,
    /// Partial field name (`/T`)
    pub name: String,
    /// Whether the field holds a signature value
    pub state: FieldState,
    /// Number of widgets showing the field
    pub widget_count: usize,
}

#[derive(Debug)]
struct BackingStore {
    path: PathBuf,
    bytes: Vec<u8>,
}

#[derive(Debug)]
struct PendingSignature {
    signature_id: ObjectId,
    signer: PdfSigner,
}

/// An open PDF document that can be signed and watermarked.
///
/// Edits accumulate in memory; every operation ends with a save. A failed
/// save leaves the edits in place so that `save` can be retried.
#[derive(Debug)]
pub struct PdfDocument {
    /// Parsed object graph
    inner: Document,
    /// File the document was opened from, if any
    backing: Option<BackingStore>,
    /// Bytes the in-memory objects were last read from or written to
    current_bytes: Vec<u8>,
    /// Pre-existing objects modified since the last incremental base
    dirty: BTreeSet<ObjectId>,
    /// Objects numbered above this were created since the last incremental base
    base_max_id: u32,
    registry: ResourceRegistry,
    signatures: Vec<PendingSignature>,
    config: StampConfig,
}

impl PdfDocument {
    /// Open a PDF file; incremental saves append to it.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use pdf_stamp::PdfDocument;
    ///
    /// let doc = PdfDocument::open("document.pdf")?;
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = read_input_file(path)?;
        let mut doc = Self::load(bytes)?;
        doc.backing = Some(BackingStore {
            path: path.to_path_buf(),
            bytes: doc.current_bytes.clone(),
        });
        log::debug!("Opened {} ({} pages)", path.display(), doc.page_count());
        Ok(doc)
    }

    /// Parse a PDF held in memory. The document has no backing store.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::load(bytes.into())
    }

    /// Parse a PDF from a caller-owned reader. The reader is not closed.
    pub fn from_reader<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::load(bytes)
    }

    fn load(bytes: Vec<u8>) -> Result<Self> {
        let inner = Document::load_mem(&bytes)?;
        if inner.trailer.has(b"Encrypt") {
            return Err(Error::Unsupported("encrypted documents".to_string()));
        }

        let mut doc = Self {
            base_max_id: inner.max_id,
            inner,
            backing: None,
            current_bytes: bytes,
            dirty: BTreeSet::new(),
            registry: ResourceRegistry::new(),
            signatures: Vec::new(),
            config: StampConfig::default(),
        };
        doc.reserve_field_names();
        Ok(doc)
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: StampConfig) -> Self {
        self.config = config;
        self
    }

    /// Draw identifiers from `ids` instead of random UUIDs.
    ///
    /// Resources already registered keep their identifiers but are
    /// forgotten by the new registry.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.registry = ResourceRegistry::with_generator(ids);
        self.reserve_field_names();
        self
    }

    fn reserve_field_names(&mut self) {
        let names: Vec<String> = self
            .signature_fields()
            .into_iter()
            .map(|field| field.name)
            .collect();
        for name in names {
            self.registry.reserve(&name);
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &StampConfig {
        &self.config
    }

    /// The underlying object graph.
    pub fn document(&self) -> &Document {
        &self.inner
    }

    /// True when there are edits an incremental save would write.
    pub fn is_modified(&self) -> bool {
        !self.dirty.is_empty() || self.inner.max_id > self.base_max_id
    }

    /// True when the document was opened from a file.
    pub fn has_backing_store(&self) -> bool {
        self.backing.is_some()
    }

    // === Pages ===

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Page objects in page order.
    pub(crate) fn page_ids(&self) -> Vec<ObjectId> {
        self.inner.get_pages().into_values().collect()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        let pages = self.page_ids();
        pages.get(index).copied().ok_or(Error::InvalidRange {
            start: index,
            end: index,
            page_count: pages.len(),
        })
    }

    /// The page's MediaBox, inherited through the page tree if needed.
    ///
    /// Falls back to the configured page size when no usable box exists.
    pub fn page_boundary(&self, index: usize) -> Result<Rect> {
        let mut node = self.page_id(index)?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self.inner.get_object(node)?.as_dict()?;
            if let Ok(media_box) = dict.get(b"MediaBox") {
                if let Some(rect) = self.resolve(media_box).ok().and_then(rect_from_object) {
                    return Ok(rect);
                }
            }
            match dict.get(b"Parent") {
                Ok(Object::Reference(parent)) => node = *parent,
                _ => break,
            }
        }

        log::warn!(
            "Page {} has no usable MediaBox, assuming {}x{}",
            index,
            self.config.fallback_page_size.width,
            self.config.fallback_page_size.height
        );
        Ok(self.config.fallback_page_size)
    }

    /// Annotations listed on a page, in `/Annots` order.
    pub fn annotations(&self, index: usize) -> Result<Vec<AnnotationInfo>> {
        let page = self.inner.get_object(self.page_id(index)?)?.as_dict()?;
        let annots = match page.get(b"Annots") {
            Ok(annots) => self.resolve(annots)?.as_array()?,
            Err(_) => return Ok(Vec::new()),
        };

        let mut infos = Vec::with_capacity(annots.len());
        for entry in annots {
            let object_id = entry.as_reference().ok();
            let dict = match self.resolve(entry).and_then(|o| Ok(o.as_dict()?)) {
                Ok(dict) => dict,
                Err(_) => continue,
            };
            infos.push(AnnotationInfo {
                object_id,
                subtype: name_of(dict, b"Subtype").unwrap_or_default(),
                rect: dict
                    .get(b"Rect")
                    .ok()
                    .and_then(|r| self.resolve(r).ok())
                    .and_then(rect_from_object),
                parent: dict.get(b"Parent").and_then(|p| p.as_reference()).ok(),
            });
        }
        Ok(infos)
    }

    /// Append an annotation to a page's `/Annots`, creating the array if absent.
    pub(crate) fn attach_annotation(&mut self, page_id: ObjectId, annot_id: ObjectId) -> Result<()> {
        let existing = match self.inner.get_object(page_id)?.as_dict()?.get(b"Annots") {
            Ok(Object::Reference(array_id)) => Some(*array_id),
            _ => None,
        };

        match existing {
            Some(array_id) => {
                self.inner
                    .get_object_mut(array_id)?
                    .as_array_mut()?
                    .push(Object::Reference(annot_id));
                self.mark_dirty(array_id);
            },
            None => {
                let page = self.inner.get_object_mut(page_id)?.as_dict_mut()?;
                match page.get_mut(b"Annots") {
                    Ok(Object::Array(annots)) => annots.push(Object::Reference(annot_id)),
                    _ => page.set("Annots", vec![Object::Reference(annot_id)]),
                }
                self.mark_dirty(page_id);
            },
        }

        log::debug!("Attached annotation {:?} to page {:?}", annot_id, page_id);
        Ok(())
    }

    // === Forms ===

    fn catalog_id(&self) -> Result<ObjectId> {
        Ok(self.inner.trailer.get(b"Root")?.as_reference()?)
    }

    /// Add a field to the AcroForm and flag the document as signed.
    pub(crate) fn add_signature_field(&mut self, field_id: ObjectId) -> Result<()> {
        let catalog_id = self.catalog_id()?;
        let acroform = match self.inner.get_object(catalog_id)?.as_dict()?.get(b"AcroForm") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(Object::Dictionary(_)) => None,
            _ => {
                let form_id = self.inner.add_object(dictionary! {
                    "Fields" => Vec::<Object>::new(),
                });
                self.inner
                    .get_object_mut(catalog_id)?
                    .as_dict_mut()?
                    .set("AcroForm", Object::Reference(form_id));
                self.mark_dirty(catalog_id);
                Some(form_id)
            },
        };

        let (form_owner, form) = match acroform {
            Some(form_id) => (form_id, self.inner.get_object_mut(form_id)?.as_dict_mut()?),
            None => (
                catalog_id,
                self.inner
                    .get_object_mut(catalog_id)?
                    .as_dict_mut()?
                    .get_mut(b"AcroForm")?
                    .as_dict_mut()?,
            ),
        };

        form.set("SigFlags", SIG_FLAGS);
        let fields_array = match form.get_mut(b"Fields") {
            Ok(Object::Array(fields)) => {
                fields.push(Object::Reference(field_id));
                None
            },
            Ok(Object::Reference(array_id)) => Some(*array_id),
            _ => {
                form.set("Fields", vec![Object::Reference(field_id)]);
                None
            },
        };
        self.mark_dirty(form_owner);

        if let Some(array_id) = fields_array {
            self.inner
                .get_object_mut(array_id)?
                .as_array_mut()?
                .push(Object::Reference(field_id));
            self.mark_dirty(array_id);
        }
        Ok(())
    }

    fn acroform_fields(&self) -> Vec<ObjectId> {
        let fields = self
            .catalog_id()
            .and_then(|id| Ok(self.inner.get_object(id)?.as_dict()?))
            .and_then(|catalog| Ok(self.resolve(catalog.get(b"AcroForm")?)?.as_dict()?))
            .and_then(|form| Ok(self.resolve(form.get(b"Fields")?)?.as_array()?));

        match fields {
            Ok(fields) => fields.iter().filter_map(|f| f.as_reference().ok()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Signature fields in AcroForm order.
    pub fn signature_fields(&self) -> Vec<SignatureFieldInfo> {
        let mut infos = Vec::new();
        for field_id in self.acroform_fields() {
            let field = match self.inner.get_object(field_id).and_then(Object::as_dict) {
                Ok(field) => field,
                Err(_) => continue,
            };
            if name_of(field, b"FT").as_deref() != Some("Sig") {
                continue;
            }

            let name = match field.get(b"T") {
                Ok(Object::String(bytes, _)) => String::from_utf8_lossy(bytes).into_owned(),
                _ => String::new(),
            };
            let signed = field
                .get(b"V")
                .ok()
                .and_then(|v| self.resolve(v).ok())
                .and_then(|v| v.as_dict().ok())
                .map_or(false, |v| v.has(b"Contents"));
            let widget_count = match field.get(b"Kids") {
                Ok(kids) => self.resolve(kids).and_then(|k| Ok(k.as_array()?.len())).unwrap_or(0),
                Err(_) if name_of(field, b"Subtype").as_deref() == Some("Widget") => 1,
                Err(_) => 0,
            };

            infos.push(SignatureFieldInfo {
                object_id: field_id,
                name,
                state: if signed {
                    FieldState::Signed
                } else {
                    FieldState::Unsigned
                },
                widget_count,
            });
        }
        infos
    }

    /// Verify every signed field against the bytes last loaded or saved.
    pub fn verify_signatures(&self) -> Result<Vec<VerificationResult>> {
        let verifier = SignatureVerifier::new();
        let mut results = Vec::new();
        for field in self.signature_fields() {
            if field.state != FieldState::Signed {
                continue;
            }
            let value = self.inner.get_object(field.object_id)?.as_dict()?.get(b"V")?;
            let sig_dict = self.resolve(value)?.as_dict()?;
            results.push(verifier.verify(&self.current_bytes, &field.name, sig_dict)?);
        }
        Ok(results)
    }

    // === Resources ===

    /// Write an image XObject and register it.
    pub(crate) fn register_image(&mut self, image: &ImageData) -> Result<ResourceId> {
        let object_id = image.add_to_document(&mut self.inner);
        self.registry
            .register(VisualResource::image(object_id, image.size()))
    }

    /// Write a text block as a Form XObject and register it.
    pub(crate) fn register_text_block(&mut self, block: &TextBlock) -> Result<ResourceId> {
        let object_id = block.add_to_document(&mut self.inner)?;
        self.registry
            .register(VisualResource::form(object_id, block.size()))
    }

    /// Look up a registered resource.
    pub fn resource(&self, id: &ResourceId) -> Result<&VisualResource> {
        self.registry.get(id)
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.registry
    }

    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.inner
    }

    /// Queue a signature dictionary to be signed by the next save that writes it.
    pub(crate) fn queue_signature(&mut self, signature_id: ObjectId, signer: PdfSigner) {
        self.signatures.push(PendingSignature {
            signature_id,
            signer,
        });
    }

    fn mark_dirty(&mut self, id: ObjectId) {
        if id.0 <= self.base_max_id {
            self.dirty.insert(id);
        }
    }

    // === Persistence ===

    /// Persist the document.
    ///
    /// Incremental saves append only new and changed objects to the backing
    /// file and then treat the result as the new base. Full saves write every
    /// object and leave the backing file, and the pending changes relative to
    /// it, untouched.
    pub fn save(&mut self, mode: SaveMode<'_>) -> Result<()> {
        let incremental = matches!(mode, SaveMode::Incremental);
        self.reset_signature_placeholders()?;

        let writer = PdfWriter::new();
        let mut written = if incremental {
            let backing = self.backing.as_ref().ok_or(Error::NoBackingStore)?;
            let mut ids = self.dirty.clone();
            ids.extend(
                self.inner
                    .objects
                    .keys()
                    .filter(|id| id.0 > self.base_max_id)
                    .copied(),
            );
            writer.write_incremental(&backing.bytes, &self.inner, &ids)?
        } else {
            writer.write_full(&self.inner)?
        };

        let mut embedded = Vec::with_capacity(self.signatures.len());
        for pending in &self.signatures {
            let span = written.object_span(pending.signature_id).ok_or_else(|| {
                Error::Signature(format!(
                    "signature object {:?} was not written",
                    pending.signature_id
                ))
            })?;
            embedded.push((
                pending.signature_id,
                pending.signer.embed(&mut written.bytes, span)?,
            ));
        }

        match mode {
            SaveMode::Incremental => {
                let backing = self.backing.as_mut().ok_or(Error::NoBackingStore)?;
                let base_len = backing.bytes.len() as u64;
                let mut file = OpenOptions::new().write(true).open(&backing.path)?;
                // Drop anything a previously failed append left behind; the
                // new xref offsets are relative to the known base.
                if file.metadata()?.len() != base_len {
                    log::warn!(
                        "{} changed size since it was last written, truncating to {} bytes",
                        backing.path.display(),
                        base_len
                    );
                    file.set_len(base_len)?;
                }
                file.seek(SeekFrom::Start(base_len))?;
                file.write_all(&written.bytes[backing.bytes.len()..])?;
                file.flush()?;
                backing.bytes = written.bytes.clone();
                log::info!(
                    "Appended update to {} ({} bytes)",
                    backing.path.display(),
                    written.bytes.len()
                );
            },
            SaveMode::WriteTo(Destination::Path(path)) => {
                fs::write(&path, &written.bytes)?;
                log::info!("Wrote {} ({} bytes)", path.display(), written.bytes.len());
            },
            SaveMode::WriteTo(Destination::Stream(stream)) => {
                stream.write_all(&written.bytes)?;
                stream.flush()?;
                log::info!("Wrote {} bytes to stream", written.bytes.len());
            },
        }

        for (signature_id, signature) in &embedded {
            let dict = self.inner.get_object_mut(*signature_id)?.as_dict_mut()?;
            dict.set(
                "ByteRange",
                signature
                    .byte_range
                    .iter()
                    .map(|v| Object::Integer(*v))
                    .collect::<Vec<_>>(),
            );
            let mut contents = signature.contents.clone();
            if let Ok(Object::String(placeholder, _)) = dict.get(b"Contents") {
                contents.resize(placeholder.len().max(contents.len()), 0);
            }
            dict.set(
                "Contents",
                Object::String(contents, lopdf::StringFormat::Hexadecimal),
            );
        }

        if incremental {
            self.dirty.clear();
            self.base_max_id = self.inner.max_id;
            self.signatures.clear();
        }
        self.current_bytes = written.bytes;
        Ok(())
    }

    /// Put placeholder values back into queued signature dictionaries so a
    /// retried or repeated save can lay them out again.
    fn reset_signature_placeholders(&mut self) -> Result<()> {
        for pending in &self.signatures {
            let calc = pending.signer.byte_range_calculator();
            let dict = self
                .inner
                .get_object_mut(pending.signature_id)?
                .as_dict_mut()?;
            dict.set("ByteRange", ByteRangeCalculator::byte_range_placeholder());
            dict.set("Contents", calc.contents_placeholder());
        }
        Ok(())
    }

    /// Follow a reference to the object it names.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        let mut current = obj;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            match current {
                Object::Reference(id) => current = self.inner.get_object(*id)?,
                _ => return Ok(current),
            }
        }
        Err(Error::InvalidPdf("reference chain too deep".to_string()))
    }
}

/// Read a file the caller named, reporting a missing file distinctly.
pub(crate) fn read_input_file(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidArgument("empty file path".to_string()));
    }
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

fn name_of(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key) {
        Ok(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// `[x0 y0 x1 y1]` to a normalized rectangle; `None` unless four finite
/// numbers describe a box with area.
fn rect_from_object(obj: &Object) -> Option<Rect> {
    let values: Vec<f64> = obj.as_array().ok()?.iter().filter_map(number).collect();
    if values.len() != 4 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let rect = Rect::from_points(values[0], values[1], values[2], values[3]);
    rect.has_area().then_some(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_bytes(pages: &[Option<[i64; 4]>], inherited: Option<[i64; 4]>) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for media_box in pages {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
            };
            if let Some(b) = media_box {
                page.set("MediaBox", b.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>());
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }
        let mut tree = dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        };
        if let Some(b) = inherited {
            tree.set("MediaBox", b.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>());
        }
        doc.objects.insert(pages_id, Object::Dictionary(tree));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        PdfWriter::new().write_full(&doc).unwrap().bytes
    }

    #[test]
    fn test_page_boundary_direct_inherited_and_fallback() {
        let bytes = document_bytes(&[Some([0, 0, 300, 400]), None], Some([0, 0, 595, 842]));
        let doc = PdfDocument::from_bytes(bytes).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_boundary(0).unwrap(), Rect::new(0.0, 0.0, 300.0, 400.0));
        assert_eq!(doc.page_boundary(1).unwrap(), Rect::new(0.0, 0.0, 595.0, 842.0));

        let doc = PdfDocument::from_bytes(document_bytes(&[None], None)).unwrap();
        assert_eq!(doc.page_boundary(0).unwrap(), Rect::letter());
    }

    #[test]
    fn test_page_index_out_of_range() {
        let doc = PdfDocument::from_bytes(document_bytes(&[Some([0, 0, 10, 10])], None)).unwrap();
        assert!(matches!(doc.page_boundary(3), Err(Error::InvalidRange { .. })));
    }

    #[test]
    fn test_attach_annotation_creates_and_appends() {
        let mut doc = PdfDocument::from_bytes(document_bytes(&[Some([0, 0, 10, 10])], None)).unwrap();
        let page_id = doc.page_ids()[0];
        let a = doc.document_mut().add_object(dictionary! { "Type" => "Annot", "Subtype" => "Text" });
        let b = doc.document_mut().add_object(dictionary! { "Type" => "Annot", "Subtype" => "Square" });
        doc.attach_annotation(page_id, a).unwrap();
        doc.attach_annotation(page_id, b).unwrap();

        let annots = doc.annotations(0).unwrap();
        assert_eq!(annots.len(), 2);
        assert_eq!(annots[0].subtype, "Text");
        assert_eq!(annots[1].object_id, Some(b));
        assert!(doc.is_modified());
    }

    #[test]
    fn test_signature_field_registration() {
        let mut doc = PdfDocument::from_bytes(document_bytes(&[Some([0, 0, 10, 10])], None)).unwrap();
        let field_id = doc.document_mut().add_object(dictionary! {
            "FT" => "Sig",
            "T" => Object::string_literal("field-1"),
        });
        doc.add_signature_field(field_id).unwrap();

        let fields = doc.signature_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "field-1");
        assert_eq!(fields[0].state, FieldState::Unsigned);
        assert_eq!(fields[0].widget_count, 0);
    }

    #[test]
    fn test_incremental_save_without_backing_store() {
        let mut doc = PdfDocument::from_bytes(document_bytes(&[Some([0, 0, 10, 10])], None)).unwrap();
        assert!(!doc.has_backing_store());
        assert!(matches!(doc.save(SaveMode::Incremental), Err(Error::NoBackingStore)));
    }

    #[test]
    fn test_save_to_stream_leaves_stream_usable() {
        let mut doc = PdfDocument::from_bytes(document_bytes(&[Some([0, 0, 10, 10])], None)).unwrap();
        let mut out: Vec<u8> = Vec::new();
        doc.save(SaveMode::to_stream(&mut out)).unwrap();
        out.extend_from_slice(b"% still ours\n");
        assert!(out.starts_with(b"%PDF-1.7"));
    }

    #[test]
    fn test_rect_from_object() {
        let boxed = Object::Array(vec![
            Object::Integer(100),
            Object::Real(50.0),
            Object::Integer(0),
            Object::Integer(0),
        ]);
        assert_eq!(rect_from_object(&boxed), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
        assert_eq!(rect_from_object(&Object::Array(vec![Object::Integer(1)])), None);
    }

    #[test]
    fn test_missing_input_file() {
        let err = read_input_file(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
        assert!(matches!(read_input_file(Path::new("")), Err(Error::InvalidArgument(_))));
    }
}
