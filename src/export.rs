//! Full-resolution raster export.
//!
//! Export re-renders the scene at `canvas × pixel_density` device pixels and
//! encodes a lossless, alpha-capable PNG. The on-screen preview scale never
//! feeds into this path.

use std::io::Cursor;

use crate::{
    error::{StageError, StageResult},
    model::CreativeDocument,
    render_cpu::{CpuRenderer, RasterFrame},
    scene::build_scene,
};

/// Output-sharpness multiplier used when the caller does not pick one.
pub const DEFAULT_PIXEL_DENSITY: u32 = 2;

/// Suggested download name handed to the save sink.
pub const EXPORT_FILE_NAME: &str = "retail-media-ad.png";

/// Render `doc` at full resolution and encode PNG bytes.
///
/// Deterministic for identical input: same document and density always
/// produce the same bytes.
pub fn export_raster(doc: &CreativeDocument, pixel_density: u32) -> StageResult<Vec<u8>> {
    if pixel_density == 0 {
        return Err(StageError::export("pixel density must be >= 1"));
    }

    let scene = build_scene(doc);
    let mut renderer = CpuRenderer::new();
    let frame = renderer.render(&scene, f64::from(pixel_density))?;
    encode_png(&frame)
}

/// Encode a rendered frame as RGBA PNG.
pub fn encode_png(frame: &RasterFrame) -> StageResult<Vec<u8>> {
    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }

    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| StageError::export("frame byte length does not match dimensions"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| StageError::export(format!("png encode failed: {e}")))?;
    Ok(buf)
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format;

    #[test]
    fn zero_density_is_rejected() {
        let doc = CreativeDocument::new(format::default_format());
        let err = export_raster(&doc, 0).unwrap_err();
        assert!(err.to_string().contains("export error:"));
    }

    #[test]
    fn encode_rejects_mismatched_frame() {
        let frame = RasterFrame {
            width: 4,
            height: 4,
            data: vec![0u8; 12],
            premultiplied: true,
        };
        assert!(encode_png(&frame).is_err());
    }

    #[test]
    fn unpremultiply_inverts_opaque_and_transparent() {
        let mut px = vec![128, 64, 32, 255, 0, 0, 0, 0, 64, 64, 64, 128];
        unpremultiply_rgba8_in_place(&mut px);
        assert_eq!(&px[0..4], &[128, 64, 32, 255]);
        assert_eq!(&px[4..8], &[0, 0, 0, 0]);
        // 64/128 premultiplied corresponds to 128 straight alpha.
        assert_eq!(&px[8..12], &[128, 128, 128, 128]);
    }
}
