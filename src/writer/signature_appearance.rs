//! Signature fields and their page widgets.
//!
//! One signature field (ISO 32000-1 Section 12.7.4.5) may be shown on many
//! pages. Each page gets its own widget annotation whose appearance draws the
//! shared signature image, scaled to fit the boundary and centered in it.

use super::content_stream::ContentStreamBuilder;
use super::text_block::bbox;
use super::watermark::rect_array;
use crate::editor::resource_manager::{ResourceId, VisualResource};
use crate::error::{Error, Result};
use crate::geometry::{compute_placement, Placement, PlacementMode, Rect, Size};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Widget flags: print (4) and locked (128).
pub const FLAG_PRINT_LOCKED: i64 = 132;

/// AcroForm `/SigFlags`: signatures exist (1) and the file is append-only (2).
pub const SIG_FLAGS: i64 = 3;

/// Visible presentation of a signature field on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureView {
    /// Widget rectangle in page space
    pub boundary: Rect,
    /// Signature image drawn inside the widget
    pub resource: ResourceId,
    /// Image size after fitting to the boundary
    pub drawn: Size,
    /// Offset of the image inside the widget
    pub placement: Placement,
}

impl SignatureView {
    /// Fit the image into `boundary` and center it.
    pub fn compose(boundary: Rect, id: &ResourceId, resource: &VisualResource) -> Result<Self> {
        if !boundary.has_area() {
            return Err(Error::InvalidArgument(format!(
                "signature boundary {}x{} has no area",
                boundary.width, boundary.height
            )));
        }

        let drawn = resource.size.fit_within(boundary.size());
        let placement = compute_placement(boundary.size(), drawn, PlacementMode::Centered)?;
        Ok(Self {
            boundary,
            resource: id.clone(),
            drawn,
            placement,
        })
    }

    /// The widget's drawing program.
    pub fn content(&self) -> Result<Vec<u8>> {
        let mut builder = ContentStreamBuilder::new();
        builder
            .save_state()
            .transform(self.placement.matrix(self.drawn))
            .paint_xobject(self.resource.as_str())
            .restore_state();
        builder.build()
    }

    /// Write the appearance and the widget, returning the widget id.
    ///
    /// The widget is not yet attached to the page or the field's `/Kids`.
    pub fn add_to_document(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        field_id: ObjectId,
        resource: &VisualResource,
    ) -> Result<ObjectId> {
        let appearance = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => bbox(self.boundary.size()),
                "Resources" => dictionary! {
                    "XObject" => dictionary! {
                        self.resource.as_str() => Object::Reference(resource.object_id),
                    },
                },
            },
            self.content()?,
        );
        let appearance_id = doc.add_object(appearance);

        let widget = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Rect" => rect_array(self.boundary),
            "F" => FLAG_PRINT_LOCKED,
            "P" => Object::Reference(page_id),
            "Parent" => Object::Reference(field_id),
            "AP" => dictionary! { "N" => Object::Reference(appearance_id) },
        };

        Ok(doc.add_object(widget))
    }
}

/// Signature field dictionary with its value and widgets.
pub fn signature_field(name: &str, value: ObjectId, kids: &[ObjectId]) -> Dictionary {
    dictionary! {
        "FT" => "Sig",
        "T" => Object::string_literal(name),
        "V" => Object::Reference(value),
        "Kids" => kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
    }
}
