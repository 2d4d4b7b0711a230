//! Image handling for overlay payloads.
//!
//! Images become Image XObjects (ISO 32000-1 Section 8.9). JPEG data is
//! embedded as-is with `/DCTDecode`; every other format the `image` crate
//! understands is decoded to 8-bit samples, Flate-compressed, and given a
//! soft mask when it carries an alpha channel.
//!
//! Intrinsic size is the pixel size at 72 dpi, so one pixel is one point.

use crate::error::{Error, Result};
use crate::geometry::Size;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

/// Color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Grayscale (1 component per pixel)
    DeviceGray,
    /// RGB color (3 components per pixel)
    DeviceRGB,
    /// CMYK color (4 components per pixel)
    DeviceCMYK,
}

impl ColorSpace {
    /// Get the PDF name for this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

/// How the sample data is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    /// Baseline or progressive JPEG, embedded unchanged
    Dct,
    /// Raw samples, zlib-compressed
    Flate,
}

/// A decoded image ready to be written as an XObject.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color space
    pub color_space: ColorSpace,
    /// Encoding of `data`
    pub encoding: ImageEncoding,
    /// Encoded sample data
    pub data: Vec<u8>,
    /// Compressed alpha channel, if the source had one
    pub soft_mask: Option<Vec<u8>>,
}

impl ImageData {
    /// Decode an image from raw bytes, auto-detecting the format.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8 {
            return Self::from_jpeg(data.to_vec());
        }
        Self::from_raster(data)
    }

    /// Wrap JPEG data without transcoding.
    pub fn from_jpeg(data: Vec<u8>) -> Result<Self> {
        let (width, height, color_space) = parse_jpeg_header(&data)?;
        if width == 0 || height == 0 {
            return Err(Error::Image("JPEG has zero dimensions".to_string()));
        }

        Ok(Self {
            width,
            height,
            color_space,
            encoding: ImageEncoding::Dct,
            data,
            soft_mask: None,
        })
    }

    /// Decode PNG, TIFF or another raster format to 8-bit samples.
    pub fn from_raster(data: &[u8]) -> Result<Self> {
        use image::GenericImageView;

        let img = image::load_from_memory(data).map_err(|e| Error::Image(e.to_string()))?;
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::Image("image has zero dimensions".to_string()));
        }

        let (color_space, pixels, alpha) = if img.color().has_color() {
            if img.color().has_alpha() {
                let rgba = img.to_rgba8();
                let mut rgb = Vec::with_capacity(buffer_len(width, height, 3)?);
                let mut alpha = Vec::with_capacity(buffer_len(width, height, 1)?);
                for pixel in rgba.pixels() {
                    rgb.extend_from_slice(&pixel.0[..3]);
                    alpha.push(pixel.0[3]);
                }
                (ColorSpace::DeviceRGB, rgb, Some(alpha))
            } else {
                (ColorSpace::DeviceRGB, img.to_rgb8().into_raw(), None)
            }
        } else if img.color().has_alpha() {
            let la = img.to_luma_alpha8();
            let mut gray = Vec::with_capacity(buffer_len(width, height, 1)?);
            let mut alpha = Vec::with_capacity(buffer_len(width, height, 1)?);
            for pixel in la.pixels() {
                gray.push(pixel.0[0]);
                alpha.push(pixel.0[1]);
            }
            (ColorSpace::DeviceGray, gray, Some(alpha))
        } else {
            (ColorSpace::DeviceGray, img.to_luma8().into_raw(), None)
        };

        // An alpha channel that is fully opaque adds nothing.
        let alpha = alpha.filter(|a| a.iter().any(|&v| v != 255));

        Ok(Self {
            width,
            height,
            color_space,
            encoding: ImageEncoding::Flate,
            data: compress(&pixels)?,
            soft_mask: alpha.map(|a| compress(&a)).transpose()?,
        })
    }

    /// Display size in points.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Add the image (and its soft mask) to `doc`, returning the image object.
    pub fn add_to_document(&self, doc: &mut Document) -> ObjectId {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(self.width),
            "Height" => i64::from(self.height),
            "ColorSpace" => self.color_space.pdf_name(),
            "BitsPerComponent" => 8,
        };

        match self.encoding {
            ImageEncoding::Dct => dict.set("Filter", "DCTDecode"),
            ImageEncoding::Flate => dict.set("Filter", "FlateDecode"),
        }

        if let Some(mask) = &self.soft_mask {
            let mask_dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(self.width),
                "Height" => i64::from(self.height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            };
            let mask_id = doc.add_object(Stream::new(mask_dict, mask.clone()));
            dict.set("SMask", Object::Reference(mask_id));
        }

        doc.add_object(Stream::new(dict, self.data.clone()))
    }
}

/// Parse JPEG header to extract dimensions and color space.
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, ColorSpace)> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(Error::Image("Not a valid JPEG".to_string()));
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }

        let marker = data[pos + 1];
        pos += 2;

        if marker == 0xFF || marker == 0x00 || (0xD0..=0xD7).contains(&marker) {
            continue;
        }

        // SOF0..SOF15 except DHT (C4), JPG (C8) and DAC (CC)
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            if pos + 7 >= data.len() {
                return Err(Error::Image("Truncated JPEG header".to_string()));
            }

            let height = u32::from(u16::from_be_bytes([data[pos + 3], data[pos + 4]]));
            let width = u32::from(u16::from_be_bytes([data[pos + 5], data[pos + 6]]));
            let color_space = match data[pos + 7] {
                1 => ColorSpace::DeviceGray,
                4 => ColorSpace::DeviceCMYK,
                _ => ColorSpace::DeviceRGB,
            };

            return Ok((width, height, color_space));
        }

        if pos + 2 > data.len() {
            break;
        }
        let length = usize::from(u16::from_be_bytes([data[pos], data[pos + 1]]));
        pos += length;
    }

    Err(Error::Image("Could not find JPEG dimensions".to_string()))
}

/// zlib-compress sample data for `/FlateDecode`.
pub(crate) fn compress(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Bytes needed for `channels` samples per pixel.
fn buffer_len(width: u32, height: u32, channels: usize) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(channels))
        .ok_or_else(|| Error::Image(format!("{}x{} image is too large", width, height)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, alpha]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn minimal_jpeg_header(width: u16, height: u16, components: u8) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        // APP0 segment with 16 bytes of payload
        data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        data.extend_from_slice(&[0u8; 14]);
        // SOF0
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.push(components);
        data.extend_from_slice(&[0u8; 9]);
        data
    }

    #[test]
    fn test_png_with_alpha_gets_soft_mask() {
        let image = ImageData::from_bytes(&png_bytes(4, 3, 128)).unwrap();
        assert_eq!((image.width, image.height), (4, 3));
        assert_eq!(image.color_space, ColorSpace::DeviceRGB);
        assert_eq!(image.encoding, ImageEncoding::Flate);
        assert!(image.soft_mask.is_some());
    }

    #[test]
    fn test_opaque_png_has_no_soft_mask() {
        let image = ImageData::from_bytes(&png_bytes(2, 2, 255)).unwrap();
        assert!(image.soft_mask.is_none());
    }

    #[test]
    fn test_jpeg_header_is_parsed() {
        let image = ImageData::from_bytes(&minimal_jpeg_header(640, 480, 3)).unwrap();
        assert_eq!(image.size(), Size::new(640.0, 480.0));
        assert_eq!(image.encoding, ImageEncoding::Dct);
        assert_eq!(image.color_space, ColorSpace::DeviceRGB);
    }

    #[test]
    fn test_buffer_len() {
        assert_eq!(buffer_len(640, 480, 3).unwrap(), 921_600);
        assert!(matches!(buffer_len(u32::MAX, u32::MAX, 3), Err(Error::Image(_))));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(ImageData::from_bytes(b"not an image"), Err(Error::Image(_))));
        assert!(ImageData::from_bytes(&[0xFF, 0xD8, 0x00]).is_err());
    }

    #[test]
    fn test_add_to_document_links_soft_mask() {
        let mut doc = Document::with_version("1.7");
        let image = ImageData::from_bytes(&png_bytes(3, 3, 10)).unwrap();
        let id = image.add_to_document(&mut doc);

        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 3);
        assert!(matches!(stream.dict.get(b"SMask"), Ok(Object::Reference(_))));
        assert_eq!(doc.objects.len(), 2);
    }
}
