//! adstage is an ad-creative composition and export engine.
//!
//! A [`CreativeDocument`] holds one ad composition: headline, CTA, product
//! image, target [`FormatSpec`] and element placements. The engine turns it
//! into pixels via a small pipeline:
//!
//! 1. **Validate**: [`validate`] maps the document to an ordered guideline
//!    issue list (pure, deterministic, never an error).
//! 2. **Compile**: [`build_scene`] produces ordered draw commands in 1:1
//!    canvas space.
//! 3. **Render**: [`CpuRenderer`] rasterizes the scene at any uniform scale
//!    (premultiplied RGBA8).
//! 4. **Export**: [`export_raster`] re-renders at `canvas × pixel_density`
//!    and encodes lossless PNG bytes.
//!
//! The [`Composer`] owns the document for one editing session, re-runs the
//! validator after every text/image change, publishes `(document, issues)`
//! snapshots to subscribers, and guards image uploads against stale decode
//! callbacks with monotonically increasing tickets.
//!
//! UI chrome, file pickers, the interactive drag-and-drop canvas and the
//! download sink are external collaborators; no network or persistence
//! happens here.
#![forbid(unsafe_code)]

pub mod composer;
pub mod error;
pub mod export;
pub mod format;
pub mod guidelines;
pub mod loader;
pub mod model;
pub mod render_cpu;
pub mod scene;

pub use composer::{Composer, ExportArtifact, PREVIEW_SCALE, Subscriber, UploadTicket};
pub use error::{StageError, StageResult};
pub use export::{DEFAULT_PIXEL_DENSITY, EXPORT_FILE_NAME, encode_png, export_raster};
pub use format::{FormatSpec, default_format, find_format, list_formats};
pub use guidelines::{MAX_HEADLINE_CHARS, ValidationIssue, validate};
pub use loader::decode_image;
pub use model::{
    CreativeDocument, DEFAULT_CTA, DEFAULT_HEADLINE, ElementId, ElementSize, ImageAsset, Placement,
    Placements,
};
pub use render_cpu::{CpuRenderer, FONT_PATH_ENV, RasterFrame};
pub use scene::{DrawCmd, Rgba8, Scene, TextWeight, build_scene};
