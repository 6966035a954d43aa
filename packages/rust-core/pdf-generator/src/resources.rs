//! Resource interning
//!
//! Every image, shading, and opacity graphics state is written once per
//! document and referenced from content streams through a stable short
//! name (`I1`, `SH2`, `GS50`). Images intern by content hash, shadings by
//! their geometry and stops, opacity states by rounded percent.

use std::collections::HashMap;
use std::io::Cursor;

use image::ImageFormat;
use pdf_writer::{dict, format_number, Dictionary, Object, ObjectId, ObjectWriter};

use crate::error::PdfError;

/// An interned resource: its symbolic name and its object id.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub name: String,
    pub id: ObjectId,
}

/// Axial (linear) or radial gradient geometry, in user-space points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    Axial { x0: f64, y0: f64, x1: f64, y1: f64 },
    Radial { x0: f64, y0: f64, r0: f64, x1: f64, y1: f64, r1: f64 },
}

/// One gradient stop: offset in 0..=1 and an RGB color in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: (f64, f64, f64),
}

/// Per-document interning tables.
#[derive(Debug, Default)]
pub struct ResourceCache {
    images: HashMap<[u8; 16], ResourceEntry>,
    shadings: HashMap<String, ResourceEntry>,
    opacities: HashMap<u8, ResourceEntry>,
    refs_by_name: HashMap<String, ObjectId>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves an interned name back to its object, for page resource
    /// dictionaries.
    pub fn lookup(&self, name: &str) -> Option<ObjectId> {
        self.refs_by_name.get(name).copied()
    }

    /// Interns an image; identical byte buffers share one XObject.
    ///
    /// PNG bodies are decoded to raw RGB samples (plus a `/DeviceGray`
    /// soft mask when an alpha channel exists); JPEG bodies embed
    /// verbatim under `/DCTDecode`.
    pub fn intern_image(
        &mut self,
        writer: &mut ObjectWriter,
        data: &[u8],
    ) -> Result<ResourceEntry, PdfError> {
        let digest = md5::compute(data).0;
        if let Some(entry) = self.images.get(&digest) {
            return Ok(entry.clone());
        }

        let format = image::guess_format(data)
            .map_err(|e| PdfError::ImageError(format!("unrecognized image data: {}", e)))?;
        let id = match format {
            ImageFormat::Png => self.add_png(writer, data)?,
            ImageFormat::Jpeg => self.add_jpeg(writer, data)?,
            other => {
                return Err(PdfError::ImageError(format!(
                    "unsupported image format: {:?}",
                    other
                )))
            }
        };

        let name = format!("I{}", self.images.len() + 1);
        let entry = ResourceEntry {
            name: name.clone(),
            id,
        };
        self.images.insert(digest, entry.clone());
        self.refs_by_name.insert(name, id);
        Ok(entry)
    }

    fn add_png(&mut self, writer: &mut ObjectWriter, data: &[u8]) -> Result<ObjectId, PdfError> {
        let decoded = image::load_from_memory(data)
            .map_err(|e| PdfError::ImageError(format!("PNG decode failed: {}", e)))?;
        let (width, height) = (decoded.width() as i64, decoded.height() as i64);

        let mut image_dict = dict! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
        };

        if decoded.color().has_alpha() {
            let rgba = decoded.to_rgba8();
            let mut rgb = Vec::with_capacity((width * height * 3) as usize);
            let mut alpha = Vec::with_capacity((width * height) as usize);
            for pixel in rgba.pixels() {
                rgb.extend_from_slice(&pixel.0[..3]);
                alpha.push(pixel.0[3]);
            }
            let smask_id = writer.add_stream(
                dict! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width,
                    "Height" => height,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8i64,
                },
                alpha,
            );
            image_dict.set("SMask", smask_id);
            Ok(writer.add_stream(image_dict, rgb))
        } else {
            let rgb = decoded.to_rgb8();
            Ok(writer.add_stream(image_dict, rgb.into_raw()))
        }
    }

    fn add_jpeg(&mut self, writer: &mut ObjectWriter, data: &[u8]) -> Result<ObjectId, PdfError> {
        let (width, height) = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| PdfError::ImageError(format!("JPEG sniff failed: {}", e)))?
            .into_dimensions()
            .map_err(|e| PdfError::ImageError(format!("JPEG dimensions unreadable: {}", e)))?;

        // DCT bodies stay as-is; the Filter entry keeps the writer from
        // deflating them again.
        let stream_dict = dict! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
            "Filter" => "DCTDecode",
        };
        Ok(writer.add_stream(stream_dict, data.to_vec()))
    }

    /// Interns a gradient; equal geometry and stops share one shading.
    ///
    /// Callers guarantee at least two stops.
    pub fn intern_shading(
        &mut self,
        writer: &mut ObjectWriter,
        kind: GradientKind,
        stops: &[GradientStop],
    ) -> ResourceEntry {
        let key = shading_key(&kind, stops);
        if let Some(entry) = self.shadings.get(&key) {
            return entry.clone();
        }

        let mut sorted = stops.to_vec();
        sorted.sort_by(|a, b| a.offset.total_cmp(&b.offset));

        let (shading_type, coords) = match kind {
            GradientKind::Axial { x0, y0, x1, y1 } => (2i64, vec![x0, y0, x1, y1]),
            GradientKind::Radial { x0, y0, r0, x1, y1, r1 } => (3i64, vec![x0, y0, r0, x1, y1, r1]),
        };

        let shading = dict! {
            "ShadingType" => shading_type,
            "ColorSpace" => "DeviceRGB",
            "Coords" => coords.into_iter().map(Object::Real).collect::<Vec<_>>(),
            "Function" => stop_function(&sorted),
            "Extend" => vec![Object::Boolean(true), Object::Boolean(true)],
        };
        let id = writer.add_dict(shading);

        let name = format!("SH{}", self.shadings.len() + 1);
        let entry = ResourceEntry {
            name: name.clone(),
            id,
        };
        self.shadings.insert(key, entry.clone());
        self.refs_by_name.insert(name, id);
        entry
    }

    /// Interns an ExtGState for an opacity value, one object per rounded
    /// percent, setting both fill (`ca`) and stroke (`CA`) alpha.
    pub fn intern_opacity(&mut self, writer: &mut ObjectWriter, opacity: f64) -> ResourceEntry {
        let percent = (opacity.clamp(0.0, 1.0) * 100.0).round() as u8;
        if let Some(entry) = self.opacities.get(&percent) {
            return entry.clone();
        }

        let alpha = percent as f64 / 100.0;
        let id = writer.add_dict(dict! {
            "Type" => "ExtGState",
            "ca" => Object::Real(alpha),
            "CA" => Object::Real(alpha),
        });

        let name = format!("GS{}", percent);
        let entry = ResourceEntry {
            name: name.clone(),
            id,
        };
        self.opacities.insert(percent, entry.clone());
        self.refs_by_name.insert(name, id);
        entry
    }
}

/// Canonical interning key for a shading.
fn shading_key(kind: &GradientKind, stops: &[GradientStop]) -> String {
    let mut key = String::new();
    match kind {
        GradientKind::Axial { x0, y0, x1, y1 } => {
            key.push_str("ax:");
            for value in [x0, y0, x1, y1] {
                key.push_str(&format_number(*value));
                key.push(',');
            }
        }
        GradientKind::Radial { x0, y0, r0, x1, y1, r1 } => {
            key.push_str("rad:");
            for value in [x0, y0, r0, x1, y1, r1] {
                key.push_str(&format_number(*value));
                key.push(',');
            }
        }
    }
    for stop in stops {
        key.push_str(&format!(
            "|{}@{},{},{}",
            format_number(stop.offset),
            format_number(stop.color.0),
            format_number(stop.color.1),
            format_number(stop.color.2)
        ));
    }
    key
}

/// Interpolation function across the stops: a single exponential ramp
/// for two stops, a stitching function for more.
fn stop_function(stops: &[GradientStop]) -> Dictionary {
    if stops.len() == 2 {
        return ramp(&stops[0], &stops[1]);
    }

    let mut functions = Vec::with_capacity(stops.len() - 1);
    let mut bounds = Vec::with_capacity(stops.len() - 2);
    let mut encode = Vec::with_capacity(2 * (stops.len() - 1));
    for pair in stops.windows(2) {
        functions.push(Object::Dictionary(ramp(&pair[0], &pair[1])));
        encode.push(Object::Integer(0));
        encode.push(Object::Integer(1));
    }
    for stop in &stops[1..stops.len() - 1] {
        bounds.push(Object::Real(stop.offset));
    }

    dict! {
        "FunctionType" => 3i64,
        "Domain" => vec![Object::Integer(0), Object::Integer(1)],
        "Functions" => functions,
        "Bounds" => bounds,
        "Encode" => encode,
    }
}

fn ramp(from: &GradientStop, to: &GradientStop) -> Dictionary {
    dict! {
        "FunctionType" => 2i64,
        "Domain" => vec![Object::Integer(0), Object::Integer(1)],
        "C0" => vec![
            Object::Real(from.color.0),
            Object::Real(from.color.1),
            Object::Real(from.color.2),
        ],
        "C1" => vec![
            Object::Real(to.color.0),
            Object::Real(to.color.1),
            Object::Real(to.color.2),
        ],
        "N" => 1i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(rgba: bool) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        if rgba {
            let img = image::RgbaImage::from_fn(2, 2, |x, _| {
                image::Rgba([200, 100, 50, if x == 0 { 255 } else { 128 }])
            });
            img.write_to(&mut buffer, ImageFormat::Png).expect("encode");
        } else {
            let img = image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]));
            img.write_to(&mut buffer, ImageFormat::Png).expect("encode");
        }
        buffer.into_inner()
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([128, 128, 128]));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Jpeg).expect("encode");
        buffer.into_inner()
    }

    #[test]
    fn test_same_image_bytes_intern_once() {
        let mut cache = ResourceCache::new();
        let mut writer = ObjectWriter::new([0u8; 16]);
        let data = png_bytes(false);

        let first = cache.intern_image(&mut writer, &data).expect("png interns");
        let second = cache.intern_image(&mut writer, &data).expect("png interns");

        assert_eq!(first.name, "I1");
        assert_eq!(first.id, second.id, "second add returns the cached object");
    }

    #[test]
    fn test_distinct_images_get_distinct_names() {
        let mut cache = ResourceCache::new();
        let mut writer = ObjectWriter::new([0u8; 16]);

        let first = cache
            .intern_image(&mut writer, &png_bytes(false))
            .expect("png interns");
        let second = cache
            .intern_image(&mut writer, &jpeg_bytes())
            .expect("jpeg interns");

        assert_eq!(first.name, "I1");
        assert_eq!(second.name, "I2");
        assert_eq!(cache.lookup("I2"), Some(second.id));
    }

    #[test]
    fn test_png_with_alpha_gets_soft_mask() {
        let mut cache = ResourceCache::new();
        let mut writer = ObjectWriter::new([0u8; 16]);

        let entry = cache
            .intern_image(&mut writer, &png_bytes(true))
            .expect("rgba png interns");
        let image_dict = writer.dict_mut(entry.id).expect("image stored");
        assert!(
            matches!(image_dict.get("SMask"), Some(Object::Reference(_))),
            "alpha channel becomes an SMask reference"
        );
        assert_eq!(
            image_dict.get("ColorSpace"),
            Some(&Object::Name("DeviceRGB".into()))
        );
    }

    #[test]
    fn test_opaque_png_has_no_mask() {
        let mut cache = ResourceCache::new();
        let mut writer = ObjectWriter::new([0u8; 16]);

        let entry = cache
            .intern_image(&mut writer, &png_bytes(false))
            .expect("rgb png interns");
        let image_dict = writer.dict_mut(entry.id).expect("image stored");
        assert!(image_dict.get("SMask").is_none());
    }

    #[test]
    fn test_jpeg_embeds_with_dct_filter_and_sniffed_dimensions() {
        let mut cache = ResourceCache::new();
        let mut writer = ObjectWriter::new([0u8; 16]);

        let entry = cache
            .intern_image(&mut writer, &jpeg_bytes())
            .expect("jpeg interns");
        let image_dict = writer.dict_mut(entry.id).expect("image stored");
        assert_eq!(
            image_dict.get("Filter"),
            Some(&Object::Name("DCTDecode".into()))
        );
        assert_eq!(image_dict.get("Width"), Some(&Object::Integer(4)));
        assert_eq!(image_dict.get("Height"), Some(&Object::Integer(3)));
    }

    #[test]
    fn test_garbage_bytes_fail_cleanly() {
        let mut cache = ResourceCache::new();
        let mut writer = ObjectWriter::new([0u8; 16]);
        let result = cache.intern_image(&mut writer, b"definitely not an image");
        assert!(matches!(result, Err(PdfError::ImageError(_))));
    }

    #[test]
    fn test_shadings_intern_by_geometry_and_stops() {
        let mut cache = ResourceCache::new();
        let mut writer = ObjectWriter::new([0u8; 16]);
        let kind = GradientKind::Axial { x0: 0.0, y0: 0.0, x1: 100.0, y1: 0.0 };
        let stops = [
            GradientStop { offset: 0.0, color: (1.0, 0.0, 0.0) },
            GradientStop { offset: 1.0, color: (0.0, 0.0, 1.0) },
        ];

        let first = cache.intern_shading(&mut writer, kind, &stops);
        let second = cache.intern_shading(&mut writer, kind, &stops);
        assert_eq!(first.id, second.id);
        assert_eq!(first.name, "SH1");

        let different = cache.intern_shading(
            &mut writer,
            GradientKind::Axial { x0: 0.0, y0: 0.0, x1: 50.0, y1: 0.0 },
            &stops,
        );
        assert_eq!(different.name, "SH2");
    }

    #[test]
    fn test_radial_shading_type() {
        let mut cache = ResourceCache::new();
        let mut writer = ObjectWriter::new([0u8; 16]);
        let entry = cache.intern_shading(
            &mut writer,
            GradientKind::Radial { x0: 50.0, y0: 50.0, r0: 0.0, x1: 50.0, y1: 50.0, r1: 40.0 },
            &[
                GradientStop { offset: 0.0, color: (1.0, 1.0, 1.0) },
                GradientStop { offset: 1.0, color: (0.0, 0.0, 0.0) },
            ],
        );
        let shading = writer.dict_mut(entry.id).expect("shading stored");
        assert_eq!(shading.get("ShadingType"), Some(&Object::Integer(3)));
    }

    #[test]
    fn test_three_stops_build_stitching_function() {
        let stops = [
            GradientStop { offset: 0.0, color: (1.0, 0.0, 0.0) },
            GradientStop { offset: 0.5, color: (0.0, 1.0, 0.0) },
            GradientStop { offset: 1.0, color: (0.0, 0.0, 1.0) },
        ];
        let function = stop_function(&stops);
        assert_eq!(function.get("FunctionType"), Some(&Object::Integer(3)));
        let Some(Object::Array(functions)) = function.get("Functions") else {
            panic!("stitching function carries sub-functions");
        };
        assert_eq!(functions.len(), 2);
        assert_eq!(
            function.get("Bounds"),
            Some(&Object::Array(vec![Object::Real(0.5)]))
        );
    }

    #[test]
    fn test_opacity_interns_by_rounded_percent() {
        let mut cache = ResourceCache::new();
        let mut writer = ObjectWriter::new([0u8; 16]);

        let a = cache.intern_opacity(&mut writer, 0.5);
        let b = cache.intern_opacity(&mut writer, 0.501);
        let c = cache.intern_opacity(&mut writer, 0.3);

        assert_eq!(a.name, "GS50");
        assert_eq!(a.id, b.id, "0.501 rounds into the same state");
        assert_eq!(c.name, "GS30");

        let state = writer.dict_mut(a.id).expect("state stored");
        assert_eq!(state.get("ca"), Some(&Object::Real(0.5)));
        assert_eq!(state.get("CA"), Some(&Object::Real(0.5)));
    }

    #[test]
    fn test_opacity_clamps_out_of_range() {
        let mut cache = ResourceCache::new();
        let mut writer = ObjectWriter::new([0u8; 16]);
        assert_eq!(cache.intern_opacity(&mut writer, 1.7).name, "GS100");
        assert_eq!(cache.intern_opacity(&mut writer, -0.2).name, "GS0");
    }
}
