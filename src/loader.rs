//! Adapter for the external image-loading collaborator.
//!
//! The UI hands over the raw bytes of whatever file the user picked; this
//! module either produces a decoded [`ImageAsset`] or a decode error the
//! composer recovers from locally.

use std::sync::Arc;

use crate::{
    error::{StageError, StageResult},
    model::ImageAsset,
};

/// Decode user-supplied image bytes into a premultiplied RGBA8 bitmap handle.
pub fn decode_image(bytes: &[u8]) -> StageResult<ImageAsset> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| StageError::decode(format!("not a decodable image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(ImageAsset {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn decode_image_png_dimensions_and_premul() {
        let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
        let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let asset = decode_image(&buf).unwrap();
        assert_eq!(asset.width, 1);
        assert_eq!(asset.height, 1);
        assert_eq!(
            asset.rgba8_premul.as_slice(),
            &[
                ((100u16 * 128 + 127) / 255) as u8,
                ((50u16 * 128 + 127) / 255) as u8,
                ((200u16 * 128 + 127) / 255) as u8,
                128u8
            ]
        );
    }

    #[test]
    fn decode_rejects_non_image_bytes() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(err.to_string().contains("image decode error:"));
    }
}
