//! Document lifecycle: construction, drawing surface, and save
//!
//! A [`Document`] owns the object writer, the font registry, the
//! resource caches, and the page list, and exposes the drawing surface.
//! `save` runs the fixed finalization order: page contents and link
//! destinations, the outline tree, ToUnicode CMaps, then the single
//! linear emit pass (with per-object encryption when configured).

use pdf_writer::{dict, Dictionary, Object, ObjectWriter};
use pdf_writer::{EncryptionAlgorithm, EncryptionOptions};
use rand::Rng;
use text_layout::{Align, TextPipeline};

use crate::annotations::{build_link_dict, LinkAnnotation, LinkTarget};
use crate::bookmarks::{build_outline_tree, OutlineEntry};
use crate::color::{parse_color, Color};
use crate::config::DocumentConfig;
use crate::content_stream::{
    rounded_rect_points, ContentStream, GlyphOp, PaintMode, PathPoint,
};
use crate::error::PdfError;
use crate::font_registry::FontRegistry;
use crate::page_manager::PageManager;
use crate::resources::{GradientKind, GradientStop, ResourceCache};
use crate::standard_fonts::measure_helvetica;
use crate::text::{
    layout_options, line_extent, script_adjust, TextStyle, DECORATION_LINE_WIDTH,
    STRIKETHROUGH_OFFSET_RATIO, UNDERLINE_OFFSET_RATIO,
};
use crate::timestamp::current_pdf_timestamp;

/// File identifier used in deterministic mode; exactly 16 bytes.
const DETERMINISTIC_FILE_ID: [u8; 16] = *b"deterministic-id";

/// Fill and stroke options for rectangles.
#[derive(Debug, Clone)]
pub struct RectStyle {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    /// Per-corner radii `[top-left, top-right, bottom-right, bottom-left]`.
    pub corner_radius: Option<[f64; 4]>,
}

impl Default for RectStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            corner_radius: None,
        }
    }
}

/// Fill and stroke options for free paths.
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub close: bool,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            close: false,
        }
    }
}

/// A PDF document under construction.
pub struct Document {
    writer: ObjectWriter,
    config: DocumentConfig,
    fonts: FontRegistry,
    resources: ResourceCache,
    pages: PageManager,
    outlines: Vec<OutlineEntry>,
}

impl Document {
    /// Builds a document: opens and embeds the configured fonts and, when
    /// requested, derives the encryption keys.
    pub fn new(config: DocumentConfig) -> Result<Self, PdfError> {
        let file_id: [u8; 16] = if config.deterministic {
            DETERMINISTIC_FILE_ID
        } else {
            rand::thread_rng().gen()
        };
        let mut writer = ObjectWriter::new(file_id);

        if let Some(settings) = &config.encryption {
            let algorithm = EncryptionAlgorithm::from_name(&settings.algorithm)
                .map_err(|e| PdfError::EncryptionError(e.to_string()))?;
            writer.enable_encryption(&EncryptionOptions {
                user_password: settings.user_password.clone(),
                owner_password: settings.owner_password.clone(),
                algorithm,
                permissions: settings.permissions,
                deterministic_ivs: config.deterministic,
            });
        }

        let fonts = FontRegistry::register_fonts(&mut writer, &config.fonts)?;
        let pages = PageManager::new(&mut writer);

        Ok(Self {
            writer,
            config,
            fonts,
            resources: ResourceCache::new(),
            pages,
            outlines: Vec::new(),
        })
    }

    /// Appends a page (in points, origin bottom-left) and makes it the
    /// target of subsequent drawing calls. Returns the page index.
    pub fn add_page(&mut self, width: f64, height: f64) -> usize {
        self.pages.add_page(&mut self.writer, width, height)
    }

    /// Redirects drawing calls to an existing page.
    pub fn select_page(&mut self, index: usize) -> Result<(), PdfError> {
        self.pages.select_page(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Draws text at `(x, y)` (baseline origin).
    ///
    /// With configured fonts the full pipeline runs: segmentation,
    /// fallback, shaping, optional wrapping, alignment, justification,
    /// and BiDi composition. Without fonts the text renders through the
    /// builtin Helvetica with literal strings.
    pub fn text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) -> Result<(), PdfError> {
        self.pages.current_mut()?;

        let color = style.color.as_deref().and_then(parse_color);
        let (size, rise) = script_adjust(style.size, style.script);
        let baseline = y + rise;

        if self.fonts.is_empty() {
            return self.draw_helvetica_text(text, x, baseline, size, style, color);
        }

        let font_key = match &style.font {
            Some(key) => key.clone(),
            None => match &self.config.default_font {
                Some(key) => key.clone(),
                None => self.config.fonts[0].key.clone(),
            },
        };
        if self.fonts.get(&font_key).is_none() {
            return Err(PdfError::FontError(format!(
                "'{}' is not configured",
                font_key
            )));
        }

        let options = layout_options(style, size);
        let pipeline_fonts = self.fonts.pipeline_fonts(&self.config.fallback_order);
        let pipeline = TextPipeline::new(pipeline_fonts, &font_key)
            .map_err(|e| PdfError::FontError(e.to_string()))?;
        let layout = pipeline.layout(text, &options);
        drop(pipeline);

        let line_color = style
            .line_color
            .as_deref()
            .and_then(parse_color)
            .or(color);
        let mut recorded: Vec<(String, Vec<(u16, String)>)> = Vec::new();

        for (index, line) in layout.lines.iter().enumerate() {
            let line_y = baseline - index as f64 * layout.line_height;

            for positioned in &line.runs {
                let entry = match self.fonts.get(&positioned.run.font) {
                    Some(entry) => entry,
                    None => continue,
                };
                let glyphs: Vec<GlyphOp> = positioned
                    .run
                    .glyphs
                    .iter()
                    .enumerate()
                    .map(|(at, glyph)| GlyphOp {
                        gid: glyph.glyph_id as u16,
                        x_advance: glyph.x_advance,
                        x_offset: glyph.x_offset,
                        y_offset: glyph.y_offset,
                        is_space: positioned.run.is_space_cluster(at),
                    })
                    .collect();

                let resource_name = entry.resource_name.clone();
                let units_per_em = positioned.run.units_per_em;
                let page = self.pages.current_mut()?;
                page.content.draw_shaped_run(
                    &glyphs,
                    &resource_name,
                    size,
                    units_per_em,
                    x + positioned.x,
                    line_y,
                    positioned.run.rtl,
                    positioned.word_spacing,
                    style.letter_spacing,
                    color,
                );
                recorded.push((positioned.run.font.clone(), positioned.run.cluster_pairs()));
            }

            if style.underline || style.strikethrough {
                if let Some((left, right)) = line_extent(line, size, style.letter_spacing) {
                    self.draw_decorations(x + left, x + right, line_y, size, style, line_color)?;
                }
            }
        }

        for (key, pairs) in recorded {
            self.fonts.record_pairs(&key, pairs);
        }
        Ok(())
    }

    /// Literal-string fallback path over the builtin Helvetica.
    fn draw_helvetica_text(
        &mut self,
        text: &str,
        x: f64,
        baseline: f64,
        size: f64,
        style: &TextStyle,
        color: Option<Color>,
    ) -> Result<(), PdfError> {
        let measure = |line: &str| measure_helvetica(line, size, style.letter_spacing);
        let lines = match style.width {
            Some(width) if width > 0.0 => text_layout::wrap_text(measure, text, width),
            _ => vec![text.to_string()],
        };
        let line_height = style.line_height.unwrap_or(size * 1.4);
        let (font_name, _) = self.fonts.helvetica(&mut self.writer);
        let line_color = style
            .line_color
            .as_deref()
            .and_then(parse_color)
            .or(color);

        for (index, line) in lines.iter().enumerate() {
            let measured = measure(line);
            let available = style.width.unwrap_or(measured);
            let offset = match style.align {
                Align::Left | Align::Justify => 0.0,
                Align::Right => available - measured,
                Align::Center => (available - measured) / 2.0,
            };
            let line_y = baseline - index as f64 * line_height;
            let line_x = x + offset;

            let page = self.pages.current_mut()?;
            page.content
                .draw_text_literal(line, &font_name, size, line_x, line_y, color);

            if (style.underline || style.strikethrough) && measured > 0.0 {
                self.draw_decorations(line_x, line_x + measured, line_y, size, style, line_color)?;
            }
        }
        Ok(())
    }

    /// Underline and strikethrough rules across `[left, right]`.
    fn draw_decorations(
        &mut self,
        left: f64,
        right: f64,
        baseline: f64,
        size: f64,
        style: &TextStyle,
        color: Option<Color>,
    ) -> Result<(), PdfError> {
        let page = self.pages.current_mut()?;
        let content = &mut page.content;

        content.save_gs();
        if let Some(color) = color {
            content.set_stroke_color(color);
        }
        content.set_stroke_width(DECORATION_LINE_WIDTH);
        if style.underline {
            let rule_y = baseline - size * UNDERLINE_OFFSET_RATIO;
            content.draw_path(
                &[PathPoint::MoveTo(left, rule_y), PathPoint::LineTo(right, rule_y)],
                false,
                PaintMode::Stroke,
            );
        }
        if style.strikethrough {
            let rule_y = baseline + size * STRIKETHROUGH_OFFSET_RATIO;
            content.draw_path(
                &[PathPoint::MoveTo(left, rule_y), PathPoint::LineTo(right, rule_y)],
                false,
                PaintMode::Stroke,
            );
        }
        content.restore_gs()
    }

    /// Draws a rectangle; negative dimensions are ignored with a warning.
    pub fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: &RectStyle,
    ) -> Result<(), PdfError> {
        self.pages.current_mut()?;
        if width < 0.0 || height < 0.0 {
            tracing::warn!(width, height, "rectangle with negative dimensions skipped");
            return Ok(());
        }

        let fill = style.fill.as_deref().and_then(parse_color);
        let stroke = style.stroke.as_deref().and_then(parse_color);
        let mode = match (fill.is_some(), stroke.is_some()) {
            (true, true) => PaintMode::FillStroke,
            (true, false) => PaintMode::Fill,
            (false, true) => PaintMode::Stroke,
            (false, false) => return Ok(()),
        };

        let stroke_width = style.stroke_width;
        let corner_radius = style.corner_radius;
        let page = self.pages.current_mut()?;
        let content = &mut page.content;
        content.save_gs();
        if let Some(color) = fill {
            content.set_fill_color(color);
        }
        if let Some(color) = stroke {
            content.set_stroke_color(color);
            content.set_stroke_width(stroke_width);
        }
        match corner_radius {
            Some(radii) => {
                content.draw_path(&rounded_rect_points(x, y, width, height, radii), true, mode)
            }
            None => content.draw_rect(x, y, width, height, mode),
        }
        content.restore_gs()
    }

    /// Draws a free path of move/line/curve elements.
    pub fn path(&mut self, points: &[PathPoint], style: &PathStyle) -> Result<(), PdfError> {
        self.pages.current_mut()?;
        if points.is_empty() {
            return Ok(());
        }

        let fill = style.fill.as_deref().and_then(parse_color);
        let stroke = style.stroke.as_deref().and_then(parse_color);
        let mode = match (fill.is_some(), stroke.is_some()) {
            (true, true) => PaintMode::FillStroke,
            (true, false) => PaintMode::Fill,
            (false, true) => PaintMode::Stroke,
            (false, false) => return Ok(()),
        };

        let stroke_width = style.stroke_width;
        let close = style.close;
        let page = self.pages.current_mut()?;
        let content = &mut page.content;
        content.save_gs();
        if let Some(color) = fill {
            content.set_fill_color(color);
        }
        if let Some(color) = stroke {
            content.set_stroke_color(color);
            content.set_stroke_width(stroke_width);
        }
        content.draw_path(points, close, mode);
        content.restore_gs()
    }

    /// Intersects the clip region with a rectangle. Pair with
    /// `save_gs`/`restore_gs` to scope the clip.
    pub fn clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<(), PdfError> {
        let page = self.pages.current_mut()?;
        page.content.draw_rect(x, y, width, height, PaintMode::None);
        page.content.clip_current_path();
        Ok(())
    }

    /// Intersects the clip region with a free path.
    pub fn clip_path(&mut self, points: &[PathPoint], close: bool) -> Result<(), PdfError> {
        let page = self.pages.current_mut()?;
        page.content.draw_path(points, close, PaintMode::None);
        page.content.clip_current_path();
        Ok(())
    }

    /// Places a PNG or JPEG into the given rectangle. Identical image
    /// bytes embed once per document.
    pub fn image(
        &mut self,
        data: &[u8],
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), PdfError> {
        self.pages.current_mut()?;
        if width < 0.0 || height < 0.0 {
            tracing::warn!(width, height, "image with negative dimensions skipped");
            return Ok(());
        }
        let entry = self.resources.intern_image(&mut self.writer, data)?;
        let page = self.pages.current_mut()?;
        page.content.draw_image(&entry.name, x, y, width, height);
        Ok(())
    }

    /// Paints a gradient, optionally clipped to `[x, y, width, height]`.
    ///
    /// Stops with unparseable colors are dropped; fewer than two usable
    /// stops paints nothing.
    pub fn gradient(
        &mut self,
        kind: GradientKind,
        stops: &[(f64, &str)],
        clip: Option<[f64; 4]>,
    ) -> Result<(), PdfError> {
        self.pages.current_mut()?;

        let resolved: Vec<GradientStop> = stops
            .iter()
            .filter_map(|&(offset, color)| {
                let rgb = match parse_color(color)? {
                    Color::Rgb(r, g, b) => (r, g, b),
                    Color::Cmyk(c, m, y, k) => cmyk_to_rgb(c, m, y, k),
                };
                Some(GradientStop { offset, color: rgb })
            })
            .collect();
        if resolved.len() < 2 {
            tracing::warn!("gradient needs at least two usable stops; skipped");
            return Ok(());
        }

        let entry = self
            .resources
            .intern_shading(&mut self.writer, kind, &resolved);
        let page = self.pages.current_mut()?;
        page.content.save_gs();
        if let Some([cx, cy, cw, ch]) = clip {
            page.content.draw_rect(cx, cy, cw, ch, PaintMode::None);
            page.content.clip_current_path();
        }
        page.content.draw_shading(&entry.name);
        page.content.restore_gs()
    }

    /// Applies a fill+stroke opacity through a shared ExtGState. Scope
    /// with `save_gs`/`restore_gs`.
    pub fn set_opacity(&mut self, opacity: f64) -> Result<(), PdfError> {
        self.pages.current_mut()?;
        let entry = self.resources.intern_opacity(&mut self.writer, opacity);
        let page = self.pages.current_mut()?;
        page.content.set_opacity(&entry.name);
        Ok(())
    }

    pub fn save_gs(&mut self) -> Result<(), PdfError> {
        self.pages.current_mut()?.content.save_gs();
        Ok(())
    }

    pub fn restore_gs(&mut self) -> Result<(), PdfError> {
        self.pages.current_mut()?.content.restore_gs()
    }

    /// Draws a QR module matrix as filled squares; generation of the
    /// matrix itself is the caller's concern.
    pub fn qr(
        &mut self,
        modules: &[Vec<bool>],
        x: f64,
        y: f64,
        size: f64,
        color: Option<&str>,
    ) -> Result<(), PdfError> {
        self.pages.current_mut()?;
        if modules.is_empty() {
            return Ok(());
        }
        let cell = size / modules.len() as f64;
        let fill = color.and_then(parse_color).unwrap_or(Color::Rgb(0.0, 0.0, 0.0));

        let page = self.pages.current_mut()?;
        let content = &mut page.content;
        content.save_gs();
        content.set_fill_color(fill);
        for (row, cells) in modules.iter().enumerate() {
            let row_y = y + size - (row + 1) as f64 * cell;
            let mut column = 0;
            while column < cells.len() {
                if !cells[column] {
                    column += 1;
                    continue;
                }
                let start = column;
                while column < cells.len() && cells[column] {
                    column += 1;
                }
                content.draw_rect(
                    x + start as f64 * cell,
                    row_y,
                    (column - start) as f64 * cell,
                    cell,
                    PaintMode::Fill,
                );
            }
        }
        content.restore_gs()
    }

    /// Draws a 1D barcode from a module pattern (`true` = bar), scaled
    /// into `width` x `height`.
    pub fn barcode(
        &mut self,
        modules: &[bool],
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Option<&str>,
    ) -> Result<(), PdfError> {
        self.pages.current_mut()?;
        if modules.is_empty() {
            return Ok(());
        }
        let cell = width / modules.len() as f64;
        let fill = color.and_then(parse_color).unwrap_or(Color::Rgb(0.0, 0.0, 0.0));

        let page = self.pages.current_mut()?;
        let content = &mut page.content;
        content.save_gs();
        content.set_fill_color(fill);
        let mut column = 0;
        while column < modules.len() {
            if !modules[column] {
                column += 1;
                continue;
            }
            let start = column;
            while column < modules.len() && modules[column] {
                column += 1;
            }
            content.draw_rect(
                x + start as f64 * cell,
                y,
                (column - start) as f64 * cell,
                height,
                PaintMode::Fill,
            );
        }
        content.restore_gs()
    }

    /// Adds a top-level outline entry targeting a page by index.
    pub fn add_outline(&mut self, title: &str, page_index: usize) {
        self.outlines.push(OutlineEntry {
            title: title.to_string(),
            page_index,
        });
    }

    /// Adds a URI link annotation to the current page.
    pub fn add_link(&mut self, url: &str, rect: [f64; 4]) -> Result<(), PdfError> {
        let page = self.pages.current_mut()?;
        page.annotations.push(LinkAnnotation {
            rect,
            target: LinkTarget::Uri(url.to_string()),
        });
        Ok(())
    }

    /// Adds an internal link annotation to the current page; the
    /// destination resolves to `[page /Fit]` at save.
    pub fn add_page_link(&mut self, target_page: usize, rect: [f64; 4]) -> Result<(), PdfError> {
        let page = self.pages.current_mut()?;
        page.annotations.push(LinkAnnotation {
            rect,
            target: LinkTarget::Page(target_page),
        });
        Ok(())
    }

    /// Finalizes the document and returns the PDF bytes.
    ///
    /// Runs in fixed order: page contents and annotation destinations,
    /// the outline tree, ToUnicode CMaps, then the emit pass.
    pub fn save(self) -> Result<Vec<u8>, PdfError> {
        let Document {
            mut writer,
            config,
            fonts,
            resources,
            pages,
            outlines,
        } = self;

        let pages_root = pages.pages_root();
        let page_refs = pages.page_refs();
        let compress = config.compress_content_streams;

        // 1. Finalize every page: content bytes, annotations, resources.
        for page in pages.into_pages() {
            let annots: Vec<Object> = page
                .annotations
                .iter()
                .filter_map(|annotation| build_link_dict(annotation, &page_refs))
                .map(|link| Object::Reference(writer.add_dict(link)))
                .collect();

            let resources_dict =
                page_resource_dict(&fonts, &resources, &page.content);
            let content_bytes = page.content.finalize();
            writer.set_stream_content(page.contents_ref, content_bytes, compress);

            let mut page_dict = dict! {
                "Type" => "Page",
                "Parent" => pages_root,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page.width),
                    Object::Real(page.height),
                ],
                "Contents" => page.contents_ref,
                "Resources" => resources_dict,
            };
            if !annots.is_empty() {
                page_dict.set("Annots", annots);
            }
            writer.store_dict(page.dict_ref, page_dict);
        }

        writer.store_dict(
            pages_root,
            dict! {
                "Type" => "Pages",
                "Kids" => page_refs.iter().map(|&id| Object::Reference(id)).collect::<Vec<_>>(),
                "Count" => page_refs.len() as i64,
            },
        );

        // 2. Outline tree.
        let outline_root = build_outline_tree(&mut writer, &outlines, &page_refs);

        // 3. ToUnicode CMaps from the recorded pairs.
        fonts.attach_to_unicode_cmaps(&mut writer);

        // 4. Catalog, Info, emit.
        let mut catalog = dict! {
            "Type" => "Catalog",
            "Pages" => pages_root,
        };
        if let Some(root) = outline_root {
            catalog.set("Outlines", root);
        }
        let catalog_ref = writer.add_dict(catalog);
        let info_ref = writer.add_dict(info_dict(&config));

        Ok(writer.build(catalog_ref, Some(info_ref)))
    }
}

/// The page's `Resources` dictionary, from the names its content stream
/// referenced.
fn page_resource_dict(
    fonts: &FontRegistry,
    resources: &ResourceCache,
    content: &ContentStream,
) -> Dictionary {
    let mut dict = Dictionary::new();

    if !content.fonts().is_empty() {
        let refs = fonts.resource_refs();
        let mut font_dict = Dictionary::new();
        for name in content.fonts() {
            if let Some((_, id)) = refs.iter().find(|(known, _)| known == name) {
                font_dict.set(name.clone(), *id);
            }
        }
        dict.set("Font", font_dict);
    }

    for (key, names) in [
        ("XObject", content.images()),
        ("ExtGState", content.graphics_states()),
        ("Shading", content.shadings()),
    ] {
        if names.is_empty() {
            continue;
        }
        let mut sub = Dictionary::new();
        for name in names {
            if let Some(id) = resources.lookup(name) {
                sub.set(name.clone(), id);
            }
        }
        dict.set(key, sub);
    }

    dict
}

/// The Info dictionary. `CreationDate` is omitted in deterministic mode
/// so identical drive sequences emit identical bytes.
fn info_dict(config: &DocumentConfig) -> Dictionary {
    let mut info = Dictionary::new();
    let metadata = &config.metadata;
    for (key, value) in [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
        ("Keywords", &metadata.keywords),
        ("Creator", &metadata.creator),
    ] {
        if let Some(value) = value {
            info.set(key, Object::string_literal(value.clone()));
        }
    }
    info.set("Producer", Object::string_literal("qelem-pdf"));
    if !config.deterministic {
        info.set(
            "CreationDate",
            Object::string_literal(current_pdf_timestamp()),
        );
    }
    info
}

fn cmyk_to_rgb(c: f64, m: f64, y: f64, k: f64) -> (f64, f64, f64) {
    ((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k))
}
