//! Watermarks on every page.

use crate::editor::{apply_to_pages, ImageSource, PageRange, PdfDocument, ResourceId, SaveMode};
use crate::error::{Error, Result};
use crate::geometry::{compute_placement, PlacementMode, Rect, Size};
use crate::writer::{ImageData, OverlayStub, TextBlock, TextStyle};

impl PdfDocument {
    /// Center an image on every page.
    ///
    /// The image is stored once; each page gets a watermark annotation that
    /// draws it at its intrinsic size (1 px = 1 pt) with the configured
    /// opacity.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use pdf_stamp::editor::{ImageSource, PdfDocument, SaveMode};
    ///
    /// let mut doc = PdfDocument::open("report.pdf")?;
    /// doc.watermark_image(ImageSource::Path("logo.png".into()), SaveMode::Incremental)?;
    /// ```
    pub fn watermark_image(&mut self, source: ImageSource<'_>, mode: SaveMode<'_>) -> Result<()> {
        let image = ImageData::from_bytes(&source.read_bytes()?)?;
        let page_boxes = self.check_overlay(image.size(), PlacementMode::Centered, &mode)?;

        let id = self.register_image(&image)?;
        let stamped = self.stamp_pages(&id, &page_boxes, PlacementMode::Centered)?;

        self.save(mode)?;
        log::info!("Image watermark {} applied to {} page(s)", id, stamped);
        Ok(())
    }

    /// Draw `text` diagonally across every page using the configured style.
    pub fn watermark_text(&mut self, text: &str, mode: SaveMode<'_>) -> Result<()> {
        let style = self.config().text_style.clone();
        self.watermark_text_styled(text, &style, mode)
    }

    /// Draw `text` diagonally across every page using `style`.
    pub fn watermark_text_styled(
        &mut self,
        text: &str,
        style: &TextStyle,
        mode: SaveMode<'_>,
    ) -> Result<()> {
        let block = TextBlock::new(text, style)?;
        let page_boxes = self.check_overlay(block.size(), PlacementMode::DiagonalRotated, &mode)?;

        let id = self.register_text_block(&block)?;
        let stamped = self.stamp_pages(&id, &page_boxes, PlacementMode::DiagonalRotated)?;

        self.save(mode)?;
        log::info!("Text watermark {} applied to {} page(s)", id, stamped);
        Ok(())
    }

    /// Resolve every page box and make sure the payload can be placed on
    /// each, before anything is written.
    fn check_overlay(&self, payload: Size, placement: PlacementMode, mode: &SaveMode<'_>) -> Result<Vec<Rect>> {
        if matches!(mode, SaveMode::Incremental) && !self.has_backing_store() {
            return Err(Error::NoBackingStore);
        }

        let page_count = self.page_count();
        let mut page_boxes = Vec::with_capacity(page_count);
        PageRange::All.resolve(page_count)?;
        for index in 0..page_count {
            let page_box = self.page_boundary(index)?;
            compute_placement(page_box.size(), payload, placement)?;
            page_boxes.push(page_box);
        }
        Ok(page_boxes)
    }

    fn stamp_pages(&mut self, id: &ResourceId, page_boxes: &[Rect], placement: PlacementMode) -> Result<usize> {
        let resource = self.resource(id)?.clone();
        let opacity = self.config().watermark_opacity;
        let pages = self.page_ids();

        apply_to_pages(PageRange::All, pages.len(), |index| {
            let stub = OverlayStub::compose(page_boxes[index], id, &resource, placement, opacity)?;
            let annot_id = stub.add_to_document(self.document_mut(), pages[index], &resource)?;
            self.attach_annotation(pages[index], annot_id)
        })
    }
}
