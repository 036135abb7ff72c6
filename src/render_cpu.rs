//! CPU rasterization of a [`Scene`] via `vello_cpu`.
//!
//! The renderer is a stateless consumer of the current scene apart from its
//! paint/font caches: no IO happens per frame except the one-time system font
//! probe for text shaping. Output pixels are premultiplied RGBA8.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use vello_cpu::kurbo::Shape as _;

use crate::{
    error::{StageError, StageResult},
    model::ImageAsset,
    scene::{DrawCmd, Rgba8, Scene, TextWeight},
};

/// Environment override pointing at a `.ttf`/`.otf` file to shape text with.
pub const FONT_PATH_ENV: &str = "ADSTAGE_FONT_PATH";

const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

#[derive(Clone, Debug)]
/// Rendered pixels in row-major premultiplied RGBA8.
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Draw-command renderer backed by `vello_cpu`.
pub struct CpuRenderer {
    text: TextEngine,
    image_cache: HashMap<usize, vello_cpu::Image>,
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuRenderer {
    pub fn new() -> Self {
        Self {
            text: TextEngine::new(),
            image_cache: HashMap::new(),
        }
    }

    /// Rasterize `scene` at a uniform `scale`.
    ///
    /// `scale` is either the export pixel density or a reduced on-screen
    /// preview factor; the scene itself stays in 1:1 canvas space.
    pub fn render(&mut self, scene: &Scene, scale: f64) -> StageResult<RasterFrame> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(StageError::render("render scale must be finite and > 0"));
        }

        let device_w = (f64::from(scene.width) * scale).round() as u32;
        let device_h = (f64::from(scene.height) * scale).round() as u32;
        if device_w == 0 || device_h == 0 {
            return Err(StageError::render("device size rounds to zero pixels"));
        }
        let width_u16: u16 = device_w
            .try_into()
            .map_err(|_| StageError::render("device width exceeds u16"))?;
        let height_u16: u16 = device_h
            .try_into()
            .map_err(|_| StageError::render("device height exceeds u16"))?;

        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        let base = vello_cpu::kurbo::Affine::scale(scale);

        for cmd in &scene.cmds {
            self.draw_cmd(&mut ctx, cmd, base)?;
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(RasterFrame {
            width: device_w,
            height: device_h,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_cmd(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        cmd: &DrawCmd,
        base: vello_cpu::kurbo::Affine,
    ) -> StageResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match cmd {
            DrawCmd::FillRect { rect, color } => {
                ctx.set_transform(base);
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_rect(&rect_to_cpu(*rect));
                Ok(())
            }
            DrawCmd::FillRoundedRect {
                rect,
                radius,
                color,
            } => {
                ctx.set_transform(base);
                ctx.set_paint(color_to_cpu(*color));
                let rounded = vello_cpu::kurbo::RoundedRect::from_rect(rect_to_cpu(*rect), *radius);
                ctx.fill_path(&rounded.to_path(0.1));
                Ok(())
            }
            DrawCmd::Text {
                content,
                origin,
                size_px,
                weight,
                color,
            } => {
                let Some((layout, font)) = self.text.layout(content, *size_px, *weight, *color)
                else {
                    // No usable font on this host; exports stay valid, just textless.
                    return Ok(());
                };

                ctx.set_transform(
                    base * vello_cpu::kurbo::Affine::translate((origin.x, origin.y)),
                );
                for line in layout.lines() {
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };

                        let brush = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            brush.r, brush.g, brush.b, brush.a,
                        ));

                        let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(&font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
                Ok(())
            }
            DrawCmd::Image { asset, dest } => {
                if asset.width == 0 || asset.height == 0 {
                    return Err(StageError::render("image asset has zero natural size"));
                }
                let paint = self.image_paint_for(asset)?;
                let sx = dest.width() / f64::from(asset.width);
                let sy = dest.height() / f64::from(asset.height);

                ctx.set_transform(
                    base * vello_cpu::kurbo::Affine::translate((dest.x0, dest.y0))
                        * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy),
                );
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(asset.width),
                    f64::from(asset.height),
                ));
                Ok(())
            }
        }
    }

    fn image_paint_for(&mut self, asset: &ImageAsset) -> StageResult<vello_cpu::Image> {
        // The Arc pointer identifies the upload; re-uploads replace the handle.
        let key = Arc::as_ptr(&asset.rgba8_premul) as usize;
        if let Some(paint) = self.image_cache.get(&key) {
            return Ok(paint.clone());
        }

        let pixmap = premul_bytes_to_pixmap(asset.rgba8_premul.as_slice(), asset.width, asset.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.image_cache.insert(key, paint.clone());
        Ok(paint)
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: kurbo::Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StageResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StageError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StageError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StageError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[derive(Clone)]
struct LoadedFont {
    family_name: String,
    cpu_font: vello_cpu::peniko::FontData,
}

/// Parley text shaping against a host font, resolved once per renderer.
struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    font: Option<LoadedFont>,
    probed: bool,
}

impl TextEngine {
    fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            font: None,
            probed: false,
        }
    }

    fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        weight: TextWeight,
        brush: Rgba8,
    ) -> Option<(parley::Layout<Rgba8>, vello_cpu::peniko::FontData)> {
        let font = self.ensure_font()?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(font.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        if weight == TextWeight::Bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        Some((layout, font.cpu_font))
    }

    fn ensure_font(&mut self) -> Option<LoadedFont> {
        if !self.probed {
            self.probed = true;
            match self.resolve_host_font() {
                Some(font) => {
                    tracing::debug!(family = %font.family_name, "text font resolved");
                    self.font = Some(font);
                }
                None => {
                    tracing::warn!(
                        "no usable font found (set {FONT_PATH_ENV} to a .ttf/.otf); \
                         text will not be drawn"
                    );
                }
            }
        }
        self.font.clone()
    }

    fn resolve_host_font(&mut self) -> Option<LoadedFont> {
        let bytes = discover_font_bytes()?;

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id)?;
        let family_name = self.font_ctx.collection.family_name(family_id)?.to_string();

        let cpu_font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        Some(LoadedFont {
            family_name,
            cpu_font,
        })
    }
}

fn discover_font_bytes() -> Option<Vec<u8>> {
    if let Ok(path) = std::env::var(FONT_PATH_ENV) {
        match std::fs::read(&path) {
            Ok(bytes) => return Some(bytes),
            Err(e) => tracing::warn!(path = %path, error = %e, "font path override is unreadable"),
        }
    }

    for dir in FONT_DIRS {
        if let Some(path) = first_font_file(Path::new(dir), 3)
            && let Ok(bytes) = std::fs::read(&path)
        {
            return Some(bytes);
        }
    }
    None
}

fn first_font_file(dir: &Path, depth: u8) -> Option<PathBuf> {
    let rd = std::fs::read_dir(dir).ok()?;

    let mut files = Vec::<PathBuf>::new();
    let mut subdirs = Vec::<PathBuf>::new();
    for entry in rd.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext == "ttf" || ext == "otf" {
            files.push(path);
        }
    }

    files.sort();
    if let Some(sans) = files.iter().find(|p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_ascii_lowercase().contains("sans"))
    }) {
        return Some(sans.clone());
    }
    if let Some(first) = files.into_iter().next() {
        return Some(first);
    }

    if depth == 0 {
        return None;
    }
    subdirs.sort();
    subdirs
        .into_iter()
        .find_map(|sub| first_font_file(&sub, depth - 1))
}
