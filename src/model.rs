//! The mutable creative state: text fields, image handle, canvas format and
//! element placements.

use std::sync::Arc;

use crate::format::FormatSpec;

/// Headline text a fresh document starts with.
pub const DEFAULT_HEADLINE: &str = "Your Ad Headline";
/// CTA text a fresh document starts with.
pub const DEFAULT_CTA: &str = "Shop Now";

#[derive(Clone)]
/// Decoded bitmap handle plus its natural pixel dimensions.
///
/// Produced by the external image-loading collaborator (see
/// [`decode_image`](crate::loader::decode_image)) and owned exclusively by the
/// document once loaded. Pixel bytes are row-major premultiplied RGBA8.
pub struct ImageAsset {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl std::fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAsset")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rgba8_premul_len", &self.rgba8_premul.len())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// The four draggable visual elements of a creative.
pub enum ElementId {
    Headline,
    ProductImage,
    CtaBackground,
    CtaLabel,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// An element's top-left position in canvas pixel space at 1:1 scale.
///
/// `size` is present only for the product image and the CTA background; text
/// elements auto-size. Positions are deliberately not clamped to the canvas:
/// out-of-bounds placement is permitted, free-form layout behavior.
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub size: Option<ElementSize>,
}

impl Placement {
    fn at(x: f64, y: f64) -> Self {
        Self { x, y, size: None }
    }

    fn sized(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            size: Some(ElementSize { width, height }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placements {
    pub headline: Placement,
    pub image: Placement,
    pub cta_background: Placement,
    pub cta_label: Placement,
}

impl Placements {
    /// Default layout derived from the initial canvas height. Placements are
    /// never recomputed afterwards, not even on format change.
    pub fn defaults_for(canvas: &FormatSpec) -> Self {
        let h = f64::from(canvas.height);
        Self {
            headline: Placement::at(50.0, 40.0),
            image: Placement::sized(200.0, 180.0, 320.0, 320.0),
            cta_background: Placement::sized(50.0, h - 120.0, 240.0, 60.0),
            cta_label: Placement::at(100.0, h - 102.0),
        }
    }

    pub fn get(&self, id: ElementId) -> Placement {
        match id {
            ElementId::Headline => self.headline,
            ElementId::ProductImage => self.image,
            ElementId::CtaBackground => self.cta_background,
            ElementId::CtaLabel => self.cta_label,
        }
    }

    pub fn get_mut(&mut self, id: ElementId) -> &mut Placement {
        match id {
            ElementId::Headline => &mut self.headline,
            ElementId::ProductImage => &mut self.image,
            ElementId::CtaBackground => &mut self.cta_background,
            ElementId::CtaLabel => &mut self.cta_label,
        }
    }
}

#[derive(Clone, Debug)]
/// Aggregate root for one editing session.
///
/// Mutated only by the [`Composer`](crate::composer::Composer) in response to
/// discrete user actions; the validator and render pipeline read it and never
/// write. `canvas` is always one of the catalog entries.
pub struct CreativeDocument {
    pub headline: String,
    pub cta: String,
    pub image: Option<ImageAsset>,
    pub canvas: FormatSpec,
    pub placements: Placements,
}

impl CreativeDocument {
    pub fn new(canvas: FormatSpec) -> Self {
        let placements = Placements::defaults_for(&canvas);
        Self {
            headline: DEFAULT_HEADLINE.to_string(),
            cta: DEFAULT_CTA.to_string(),
            image: None,
            canvas,
            placements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format;

    #[test]
    fn fresh_document_has_original_defaults() {
        let doc = CreativeDocument::new(format::default_format());
        assert_eq!(doc.headline, "Your Ad Headline");
        assert_eq!(doc.cta, "Shop Now");
        assert!(doc.image.is_none());
        assert_eq!(doc.canvas.width, 1080);
    }

    #[test]
    fn default_placements_follow_canvas_height() {
        let p = Placements::defaults_for(&format::default_format());
        assert_eq!((p.headline.x, p.headline.y), (50.0, 40.0));
        assert!(p.headline.size.is_none());
        assert_eq!(p.image.size.unwrap().width, 320.0);
        assert_eq!(p.cta_background.y, 1080.0 - 120.0);
        assert_eq!(p.cta_label.y, 1080.0 - 102.0);
    }

    #[test]
    fn placement_access_by_element_id() {
        let mut p = Placements::defaults_for(&format::default_format());
        p.get_mut(ElementId::ProductImage).x = -40.0; // off-canvas is allowed
        assert_eq!(p.get(ElementId::ProductImage).x, -40.0);
        assert_eq!(p.get(ElementId::CtaLabel).x, 100.0);
    }

    #[test]
    fn image_asset_debug_elides_pixels() {
        let asset = ImageAsset {
            width: 2,
            height: 1,
            rgba8_premul: Arc::new(vec![0u8; 8]),
        };
        let dbg = format!("{asset:?}");
        assert!(dbg.contains("rgba8_premul_len"));
        assert!(!dbg.contains("[0, 0"));
    }
}
