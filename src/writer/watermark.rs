//! Watermark overlay annotations.
//!
//! Each watermarked page owns one Watermark annotation (ISO 32000-1 Section
//! 12.5.6.22) whose appearance covers the whole page and draws the shared
//! payload at a page-specific transform. The payload itself lives once in the
//! document and is referenced by name.
//!
//! # Example
//!
//! ```ignore
//! use pdf_stamp::writer::OverlayStub;
//! use pdf_stamp::geometry::{PlacementMode, Rect};
//!
//! let stub = OverlayStub::compose(Rect::letter(), &id, &resource, PlacementMode::Centered, 0.5)?;
//! let annot_id = stub.add_to_document(&mut doc, page_id, &resource)?;
//! ```

use super::content_stream::ContentStreamBuilder;
use super::text_block::bbox;
use crate::editor::resource_manager::{ResourceId, VisualResource};
use crate::error::Result;
use crate::geometry::{compute_placement, Placement, PlacementMode, Rect};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// Annotation flag: print the annotation.
pub const FLAG_PRINT: i64 = 4;

/// Name of the transparency graphics state inside the stub's resources.
const OPACITY_GS: &str = "GS0";

/// A page-local overlay drawing one shared resource.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStub {
    /// Page box the stub covers
    pub page_box: Rect,
    /// Name of the shared resource it draws
    pub resource: ResourceId,
    /// Where the resource goes inside the stub
    pub placement: Placement,
    /// Opacity applied through an ExtGState
    pub opacity: f64,
    matrix: [f64; 6],
}

impl OverlayStub {
    /// Compute the stub for one page.
    pub fn compose(
        page_box: Rect,
        id: &ResourceId,
        resource: &VisualResource,
        mode: PlacementMode,
        opacity: f64,
    ) -> Result<Self> {
        let placement = compute_placement(page_box.size(), resource.size, mode)?;
        Ok(Self {
            page_box,
            resource: id.clone(),
            placement,
            opacity,
            matrix: placement.matrix(resource.draw_scale()),
        })
    }

    /// Matrix used to draw the resource.
    pub fn matrix(&self) -> [f64; 6] {
        self.matrix
    }

    /// The stub's drawing program.
    pub fn content(&self) -> Result<Vec<u8>> {
        let mut builder = ContentStreamBuilder::new();
        builder.save_state();
        if self.opacity < 1.0 {
            builder.set_ext_gstate(OPACITY_GS);
        }
        builder
            .transform(self.matrix)
            .paint_xobject(self.resource.as_str())
            .restore_state();
        builder.build()
    }

    /// Write the appearance and the annotation, returning the annotation id.
    ///
    /// The annotation is not yet attached to the page.
    pub fn add_to_document(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        resource: &VisualResource,
    ) -> Result<ObjectId> {
        let mut resources = dictionary! {
            "XObject" => dictionary! {
                self.resource.as_str() => Object::Reference(resource.object_id),
            },
        };
        if self.opacity < 1.0 {
            resources.set(
                "ExtGState",
                dictionary! {
                    OPACITY_GS => dictionary! {
                        "Type" => "ExtGState",
                        "CA" => self.opacity as f32,
                        "ca" => self.opacity as f32,
                    },
                },
            );
        }

        let appearance = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => bbox(self.page_box.size()),
                "Resources" => resources,
            },
            self.content()?,
        );
        let appearance_id = doc.add_object(appearance);

        let annotation = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Watermark",
            "Rect" => rect_array(self.page_box),
            "F" => FLAG_PRINT,
            "P" => Object::Reference(page_id),
            "AP" => dictionary! { "N" => Object::Reference(appearance_id) },
        };

        Ok(doc.add_object(annotation))
    }
}

/// `[x0 y0 x1 y1]` as a PDF array.
pub(crate) fn rect_array(rect: Rect) -> Vec<Object> {
    rect.to_corners()
        .iter()
        .map(|v| Object::Real(*v as f32))
        .collect()
}
