//! # printcorner
//!
//! Document preview and conversion pipeline for a four-step print-ordering
//! workflow: upload files, tune print settings, pick a shop, review the
//! order.
//!
//! ## Why this crate?
//!
//! A print flow has to show the user what their file will look like on
//! paper, and users upload whatever they have: iPhone HEIC photos, Word
//! documents, spreadsheets, PDFs, plain images. Each of those needs a
//! different path to something displayable, some of them need real CPU
//! work, and the user keeps clicking while conversions are in flight. This
//! crate owns that whole problem: classification, per-format conversion,
//! last-request-wins supersession, and the step machine that carries the
//! session from upload to order summary.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Collect   FileCollection tracks order + active selection
//!  ├─ 2. Classify  name/media-type registry picks a ConverterKind
//!  ├─ 3. Convert   HEIC → JPEG, DOCX/XLSX → sanitized HTML fragment,
//!  │               image/PDF passthrough (CPU work in spawn_blocking)
//!  ├─ 4. Preview   PreviewOrchestrator installs the result; stale
//!  │               outcomes from superseded selections are dropped
//!  ├─ 5. Style     PrintConfig derives a DisplayTransform (no reconvert)
//!  └─ 6. Order     Workflow gates Upload→Settings→Location→Summary and
//!                  persists metadata snapshots via SessionStore
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use printcorner::{
//!     ManagedFile, MemorySessionStore, PreviewOrchestrator, Workflow,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemorySessionStore::new());
//!     let mut workflow = Workflow::new(store);
//!     workflow.add_files([ManagedFile::new(
//!         "flyer.docx",
//!         "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
//!         std::fs::read("flyer.docx").unwrap(),
//!         0,
//!     )]);
//!
//!     let mut preview = PreviewOrchestrator::new();
//!     let index = workflow.files().active_index().unwrap();
//!     let file = workflow.files().active_file().unwrap().clone();
//!     if let Some(task) = preview.select(index, &file) {
//!         let outcome = task.run().await;
//!         preview.apply(outcome);
//!     }
//!     println!("{:?}", preview.state());
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `heic`  | off     | Native HEIC decoding via libheif. Without it HEIC files classify normally but conversion resolves to a recoverable failure with a download hint. |
//!
//! ## Design Notes
//!
//! * Conversion failures are never fatal: a broken file degrades to a
//!   "no preview" state with a user-facing hint, and the workflow keeps
//!   going.
//! * Raw file bytes never reach the session store. A reloaded session gets
//!   metadata placeholders that prompt for re-upload.
//! * Print settings compose visually over converted content; changing
//!   zoom, margin or colour mode never triggers reconversion.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod file;
pub mod order;
pub mod preview;
pub mod session;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    BorderStyle, ColorMode, DisplayTransform, Margin, Orientation, PrintConfig,
    CANONICAL_BACKGROUND, ZOOM_MAX, ZOOM_MIN,
};
pub use convert::{
    classify, classify_file, file_icon, ConversionResult, ConverterKind, FileIcon, ResourceHandle,
};
pub use error::{ConvertError, WorkflowError};
pub use file::{FileCollection, FileSnapshot, ManagedFile};
pub use order::OrderSummary;
pub use preview::{ConversionOutcome, ConversionTask, PreviewOrchestrator, PreviewState};
pub use session::{MemorySessionStore, SessionStore};
pub use workflow::{Workflow, WorkflowStep};
