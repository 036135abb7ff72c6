//! The orchestrator: owns the document, reacts to edits, re-runs the
//! guideline check and republishes snapshots, and drives preview/export.
//!
//! Everything is synchronous and single-threaded; the only asynchronous
//! boundary is image decoding, modeled as a ticketed request/response pair so
//! a stale decode can never clobber a newer upload.

use crate::{
    error::{StageError, StageResult},
    export::{self, EXPORT_FILE_NAME},
    format::{self, FormatSpec},
    guidelines::{ValidationIssue, validate},
    model::{CreativeDocument, ElementId, ImageAsset},
    render_cpu::{CpuRenderer, RasterFrame},
    scene::{Scene, build_scene},
};

/// On-screen zoom applied by the interactive preview, strictly for viewport
/// fit. Export resolution is independent of this value.
pub const PREVIEW_SCALE: f64 = 0.5;

/// Snapshot observer: called with the current document and issue list after
/// every published change.
pub type Subscriber = Box<dyn FnMut(&CreativeDocument, &[ValidationIssue])>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Handle for one in-flight image upload. Only the most recently issued
/// ticket may deliver a result.
pub struct UploadTicket(u64);

#[derive(Clone, Debug)]
/// Raster bytes plus the suggested download name, for the save sink.
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// One long-lived editing session over a single [`CreativeDocument`].
pub struct Composer {
    doc: CreativeDocument,
    issues: Vec<ValidationIssue>,
    subscribers: Vec<Subscriber>,
    upload_seq: u64,
    upload_notice: Option<String>,
    renderer: CpuRenderer,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    /// Start a session in the default format, running the guideline check
    /// once up front.
    pub fn new() -> Self {
        let doc = CreativeDocument::new(format::default_format());
        let issues = validate(&doc);
        Self {
            doc,
            issues,
            subscribers: Vec::new(),
            upload_seq: 0,
            upload_notice: None,
            renderer: CpuRenderer::new(),
        }
    }

    pub fn document(&self) -> &CreativeDocument {
        &self.doc
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Register an observer and immediately hand it the current snapshot.
    pub fn subscribe(&mut self, mut subscriber: Subscriber) {
        subscriber(&self.doc, &self.issues);
        self.subscribers.push(subscriber);
    }

    pub fn set_headline(&mut self, text: impl Into<String>) {
        self.doc.headline = text.into();
        self.revalidate_and_publish();
    }

    pub fn set_cta(&mut self, text: impl Into<String>) {
        self.doc.cta = text.into();
        self.revalidate_and_publish();
    }

    /// Switch the canvas to another catalog format.
    ///
    /// Placements are intentionally left as-is; the design does not
    /// auto-reflow on resize. Guidelines do not depend on the format, so the
    /// issue list is republished unchanged.
    pub fn set_format(&mut self, spec: FormatSpec) -> StageResult<()> {
        if !format::list_formats().contains(&spec) {
            return Err(StageError::document(format!(
                "'{}' ({}x{}) is not a catalog format",
                spec.name, spec.width, spec.height
            )));
        }
        self.doc.canvas = spec;
        self.publish();
        Ok(())
    }

    /// Drag an element to a new position. Out-of-bounds values are accepted.
    pub fn move_placement(&mut self, id: ElementId, x: f64, y: f64) {
        let placement = self.doc.placements.get_mut(id);
        placement.x = x;
        placement.y = y;
        self.publish();
    }

    /// Announce a new upload request, superseding any still in flight.
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.upload_seq += 1;
        UploadTicket(self.upload_seq)
    }

    /// Deliver the outcome of an upload's decode.
    ///
    /// A result for anything but the most recent ticket is dropped: the user
    /// already picked a different file. A decode failure leaves the current
    /// image (or its absence) untouched and records a dismissible notice.
    pub fn finish_upload(&mut self, ticket: UploadTicket, result: StageResult<ImageAsset>) {
        if ticket.0 != self.upload_seq {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.upload_seq,
                "dropping stale upload result"
            );
            return;
        }

        match result {
            Ok(asset) => {
                self.doc.image = Some(asset);
                self.upload_notice = None;
                self.revalidate_and_publish();
            }
            Err(e) => {
                tracing::debug!(error = %e, "image upload failed; document unchanged");
                self.upload_notice = Some(e.to_string());
            }
        }
    }

    /// Last upload failure, surfaced to the user until dismissed.
    pub fn upload_notice(&self) -> Option<&str> {
        self.upload_notice.as_deref()
    }

    pub fn dismiss_upload_notice(&mut self) {
        self.upload_notice = None;
    }

    /// Current draw-command list for the interactive canvas backend.
    pub fn scene(&self) -> Scene {
        build_scene(&self.doc)
    }

    /// Rasterize the current scene at [`PREVIEW_SCALE`] for hosts that want
    /// pixels instead of draw commands.
    pub fn render_preview(&mut self) -> StageResult<RasterFrame> {
        let scene = build_scene(&self.doc);
        self.renderer.render(&scene, PREVIEW_SCALE)
    }

    /// One-shot full-resolution export of the live document.
    ///
    /// Read-only with respect to the document: a failed export leaves the
    /// session valid and editable.
    #[tracing::instrument(skip(self))]
    pub fn export_current(&self, pixel_density: u32) -> StageResult<ExportArtifact> {
        let bytes = export::export_raster(&self.doc, pixel_density)?;
        Ok(ExportArtifact {
            file_name: EXPORT_FILE_NAME.to_string(),
            bytes,
        })
    }

    fn revalidate_and_publish(&mut self) {
        self.issues = validate(&self.doc);
        tracing::debug!(issues = self.issues.len(), "guidelines re-evaluated");
        self.publish();
    }

    fn publish(&mut self) {
        let Self {
            doc,
            issues,
            subscribers,
            ..
        } = self;
        for subscriber in subscribers.iter_mut() {
            subscriber(doc, issues);
        }
    }
}
