//! Scene construction: a creative document becomes an ordered list of draw
//! commands that any render backend can consume.

use kurbo::{Point, Rect};

use crate::model::{CreativeDocument, ImageAsset, Placement};

/// Opaque white canvas background.
pub const CANVAS_FILL: Rgba8 = Rgba8::WHITE;
/// Headline text color.
pub const HEADLINE_INK: Rgba8 = Rgba8::BLACK;
/// Headline font size in canvas pixels.
pub const HEADLINE_FONT_SIZE_PX: f32 = 38.0;
/// CTA button fill (#2563eb).
pub const CTA_FILL: Rgba8 = Rgba8::new(37, 99, 235, 255);
/// CTA button corner radius in canvas pixels.
pub const CTA_CORNER_RADIUS_PX: f64 = 8.0;
/// CTA label color.
pub const CTA_INK: Rgba8 = Rgba8::WHITE;
/// CTA label font size in canvas pixels.
pub const CTA_FONT_SIZE_PX: f32 = 22.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Straight-alpha RGBA8 color. Doubles as the Parley brush type.
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TextWeight {
    Regular,
    Bold,
}

#[derive(Clone, Debug)]
/// One drawing instruction in canvas pixel space at 1:1 scale.
///
/// Commands paint in sequence; later commands cover earlier ones where they
/// overlap.
pub enum DrawCmd {
    FillRect {
        rect: Rect,
        color: Rgba8,
    },
    FillRoundedRect {
        rect: Rect,
        radius: f64,
        color: Rgba8,
    },
    Text {
        content: String,
        origin: Point,
        size_px: f32,
        weight: TextWeight,
        color: Rgba8,
    },
    /// Bitmap scaled to `dest` regardless of its natural dimensions.
    Image {
        asset: ImageAsset,
        dest: Rect,
    },
}

#[derive(Clone, Debug)]
pub struct Scene {
    /// Canvas width in pixels at 1:1 scale.
    pub width: u32,
    /// Canvas height in pixels at 1:1 scale.
    pub height: u32,
    pub cmds: Vec<DrawCmd>,
}

/// Compile `doc` into draw commands.
///
/// Order is fixed: background, headline, product image (skipped when absent —
/// the validator, not the renderer, flags the omission), CTA background, CTA
/// label.
pub fn build_scene(doc: &CreativeDocument) -> Scene {
    let w = f64::from(doc.canvas.width);
    let h = f64::from(doc.canvas.height);
    let p = &doc.placements;

    let mut cmds = Vec::with_capacity(5);
    cmds.push(DrawCmd::FillRect {
        rect: Rect::new(0.0, 0.0, w, h),
        color: CANVAS_FILL,
    });
    cmds.push(DrawCmd::Text {
        content: doc.headline.clone(),
        origin: Point::new(p.headline.x, p.headline.y),
        size_px: HEADLINE_FONT_SIZE_PX,
        weight: TextWeight::Bold,
        color: HEADLINE_INK,
    });
    if let Some(asset) = &doc.image {
        cmds.push(DrawCmd::Image {
            asset: asset.clone(),
            dest: placement_rect(&p.image, asset),
        });
    }
    cmds.push(DrawCmd::FillRoundedRect {
        rect: sized_rect(&p.cta_background),
        radius: CTA_CORNER_RADIUS_PX,
        color: CTA_FILL,
    });
    cmds.push(DrawCmd::Text {
        content: doc.cta.clone(),
        origin: Point::new(p.cta_label.x, p.cta_label.y),
        size_px: CTA_FONT_SIZE_PX,
        weight: TextWeight::Regular,
        color: CTA_INK,
    });

    Scene {
        width: doc.canvas.width,
        height: doc.canvas.height,
        cmds,
    }
}

fn sized_rect(p: &Placement) -> Rect {
    let (w, h) = p.size.map(|s| (s.width, s.height)).unwrap_or((0.0, 0.0));
    Rect::new(p.x, p.y, p.x + w, p.y + h)
}

fn placement_rect(p: &Placement, asset: &ImageAsset) -> Rect {
    // A placement without an explicit size falls back to natural dimensions.
    let (w, h) = p
        .size
        .map(|s| (s.width, s.height))
        .unwrap_or((f64::from(asset.width), f64::from(asset.height)));
    Rect::new(p.x, p.y, p.x + w, p.y + h)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::format;
    use crate::model::CreativeDocument;

    fn tiny_asset() -> ImageAsset {
        ImageAsset {
            width: 4,
            height: 2,
            rgba8_premul: Arc::new(vec![0u8; 32]),
        }
    }

    #[test]
    fn scene_without_image_skips_the_image_command() {
        let doc = CreativeDocument::new(format::default_format());
        let scene = build_scene(&doc);
        assert_eq!(scene.cmds.len(), 4);
        assert!(
            !scene
                .cmds
                .iter()
                .any(|c| matches!(c, DrawCmd::Image { .. }))
        );
    }

    #[test]
    fn draw_order_is_background_headline_image_cta() {
        let mut doc = CreativeDocument::new(format::default_format());
        doc.image = Some(tiny_asset());
        let scene = build_scene(&doc);

        assert_eq!(scene.cmds.len(), 5);
        assert!(matches!(scene.cmds[0], DrawCmd::FillRect { .. }));
        assert!(matches!(
            scene.cmds[1],
            DrawCmd::Text {
                weight: TextWeight::Bold,
                ..
            }
        ));
        assert!(matches!(scene.cmds[2], DrawCmd::Image { .. }));
        assert!(matches!(scene.cmds[3], DrawCmd::FillRoundedRect { .. }));
        assert!(matches!(
            scene.cmds[4],
            DrawCmd::Text {
                weight: TextWeight::Regular,
                ..
            }
        ));
    }

    #[test]
    fn background_covers_full_canvas() {
        let doc = CreativeDocument::new(format::find_format("Facebook").unwrap());
        let scene = build_scene(&doc);
        let DrawCmd::FillRect { rect, color } = &scene.cmds[0] else {
            panic!("first command must be the background fill");
        };
        assert_eq!(*rect, Rect::new(0.0, 0.0, 1200.0, 628.0));
        assert_eq!(*color, CANVAS_FILL);
    }

    #[test]
    fn image_dest_comes_from_placement_not_natural_size() {
        let mut doc = CreativeDocument::new(format::default_format());
        doc.image = Some(tiny_asset());
        let scene = build_scene(&doc);
        let DrawCmd::Image { dest, .. } = &scene.cmds[2] else {
            panic!("expected image command");
        };
        assert_eq!(*dest, Rect::new(200.0, 180.0, 520.0, 500.0));
    }

    #[test]
    fn cta_background_carries_fixed_style() {
        let doc = CreativeDocument::new(format::default_format());
        let scene = build_scene(&doc);
        let DrawCmd::FillRoundedRect {
            rect,
            radius,
            color,
        } = &scene.cmds[2]
        else {
            panic!("expected CTA background");
        };
        assert_eq!(*rect, Rect::new(50.0, 960.0, 290.0, 1020.0));
        assert_eq!(*radius, CTA_CORNER_RADIUS_PX);
        assert_eq!(*color, CTA_FILL);
    }
}
