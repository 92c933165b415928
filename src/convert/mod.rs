//! Conversion registry and converters: raw file bytes → displayable content.
//!
//! Each supported kind gets exactly one strategy. Keeping strategies
//! separate makes each independently testable and lets us swap a backend
//! (say, a different workbook parser) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! ManagedFile ──▶ classify ──▶ convert ──▶ ConversionResult
//!  (name+type)   (registry)   (per-kind)   (handle | markup | failure)
//! ```
//!
//! Classification is an ordered, total function (first match wins) with an
//! explicit `Unsupported` fallback. Extension checks back up declared
//! media types, which browsers report unreliably for HEIC and Office
//! files. Conversion never returns `Err`: every failure folds into
//! [`ConversionResult::Failed`] so a broken file degrades to "no preview"
//! instead of tearing down the workflow.
//!
//! CPU-bound parsing (DOCX, workbook, HEIC decode) runs in
//! `tokio::task::spawn_blocking`; image and PDF passthroughs are
//! synchronous since the bytes are already displayable.

pub mod document;
pub mod heic;
mod html;
pub mod spreadsheet;

use crate::error::ConvertError;
use crate::file::ManagedFile;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// The conversion strategy selected for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConverterKind {
    /// Directly displayable raster image; passthrough.
    Image,
    /// HEIC/HEIF; decoded and re-encoded as baseline JPEG.
    Heic,
    /// PDF; passthrough, the host renderer paginates.
    Pdf,
    /// Word-processing document; rendered to a markup fragment.
    Document,
    /// Workbook; first sheet rendered to an HTML table.
    Spreadsheet,
    /// No preview strategy exists. Accepted into the collection anyway.
    Unsupported,
}

impl ConverterKind {
    /// True for kinds whose conversion does real asynchronous work.
    pub fn is_async(self) -> bool {
        matches!(
            self,
            ConverterKind::Heic | ConverterKind::Document | ConverterKind::Spreadsheet
        )
    }
}

/// Icon category for the file list, derived purely from classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileIcon {
    Image,
    Document,
    Spreadsheet,
    Generic,
}

/// Classify a file by declared media type and name extension.
///
/// Ordered rules, first match wins:
/// 1. HEIC/HEIF by type or extension
/// 2. type contains `image`
/// 3. type contains `pdf`
/// 4. word-processing XML / `msword` by type, or `.docx`/`.doc` extension
/// 5. spreadsheet XML / `ms-excel` by type, or `.xlsx`/`.xls` extension
/// 6. `Unsupported`
pub fn classify(name: &str, media_type: &str) -> ConverterKind {
    let name = name.to_ascii_lowercase();
    let mt = media_type.to_ascii_lowercase();

    if mt.contains("heic")
        || mt.contains("heif")
        || name.ends_with(".heic")
        || name.ends_with(".heif")
    {
        ConverterKind::Heic
    } else if mt.contains("image") {
        ConverterKind::Image
    } else if mt.contains("pdf") {
        ConverterKind::Pdf
    } else if mt.contains("wordprocessingml")
        || mt.contains("msword")
        || name.ends_with(".docx")
        || name.ends_with(".doc")
    {
        ConverterKind::Document
    } else if mt.contains("spreadsheetml")
        || mt.contains("ms-excel")
        || name.ends_with(".xlsx")
        || name.ends_with(".xls")
    {
        ConverterKind::Spreadsheet
    } else {
        ConverterKind::Unsupported
    }
}

/// Classify a managed file.
pub fn classify_file(file: &ManagedFile) -> ConverterKind {
    classify(file.name(), file.media_type())
}

/// Icon category for the file list entry.
pub fn file_icon(file: &ManagedFile) -> FileIcon {
    match classify_file(file) {
        ConverterKind::Image | ConverterKind::Heic => FileIcon::Image,
        ConverterKind::Pdf | ConverterKind::Document => FileIcon::Document,
        ConverterKind::Spreadsheet => FileIcon::Spreadsheet,
        ConverterKind::Unsupported => FileIcon::Generic,
    }
}

/// A displayable resource: shared bytes plus their media type.
///
/// Clone-cheap. The underlying allocation is shared with the owning
/// [`ManagedFile`] where possible and released when the last clone drops;
/// supersession and file removal therefore reclaim resources through
/// ordinary RAII, with no explicit release call to forget.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    mime: String,
    bytes: Arc<Vec<u8>>,
}

impl ResourceHandle {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// Wrap already-shared bytes without copying.
    pub fn from_shared(mime: impl Into<String>, bytes: Arc<Vec<u8>>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Render as a `data:` URI for hosts that embed previews inline.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&*self.bytes))
    }
}

/// The outcome of converting one file. Exactly one result is "live" per
/// active file at a time; results are never cached across re-selection.
#[derive(Debug, Clone)]
pub enum ConversionResult {
    /// Directly displayable raster content.
    Image(ResourceHandle),
    /// PDF content; the host renderer paginates.
    Pdf(ResourceHandle),
    /// Sanitized HTML fragment (document and spreadsheet renderings).
    Markup(String),
    /// Preview not available for this file type. Permanent, not an error.
    Unsupported,
    /// Recoverable conversion failure; the file remains downloadable.
    Failed(ConvertError),
}

/// What a converter needs: the file's identity and its raw bytes.
///
/// Detached from the collection so an in-flight conversion is unaffected
/// by concurrent add/remove bookkeeping.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub name: String,
    pub media_type: String,
    pub bytes: Option<Arc<Vec<u8>>>,
}

impl ConvertRequest {
    pub fn from_file(file: &ManagedFile) -> Self {
        Self {
            name: file.name().to_string(),
            media_type: file.media_type().to_string(),
            bytes: file.shared_bytes().cloned(),
        }
    }
}

/// Resolve the kinds that need no asynchronous work.
///
/// Returns `Some` for image, PDF and unsupported files (and for any file
/// whose bytes are missing), `None` for kinds the caller must run through
/// [`convert`] as a real async task.
pub fn convert_immediate(request: &ConvertRequest, kind: ConverterKind) -> Option<ConversionResult> {
    if kind == ConverterKind::Unsupported {
        return Some(ConversionResult::Unsupported);
    }
    let Some(bytes) = request.bytes.as_ref() else {
        // Metadata-only placeholder: every kind fails the same way.
        return Some(ConversionResult::Failed(ConvertError::BytesUnavailable));
    };
    match kind {
        ConverterKind::Image => {
            let mime = image_mime(&request.media_type, bytes);
            debug!(name = %request.name, %mime, "image passthrough");
            Some(ConversionResult::Image(ResourceHandle::from_shared(
                mime,
                Arc::clone(bytes),
            )))
        }
        ConverterKind::Pdf => Some(ConversionResult::Pdf(ResourceHandle::from_shared(
            "application/pdf",
            Arc::clone(bytes),
        ))),
        _ => None,
    }
}

/// Convert a file with the given strategy. Total: failures come back as
/// [`ConversionResult::Failed`], never as `Err`.
pub async fn convert(request: ConvertRequest, kind: ConverterKind) -> ConversionResult {
    if let Some(result) = convert_immediate(&request, kind) {
        return result;
    }
    // Only async kinds remain, and convert_immediate verified bytes exist.
    let Some(bytes) = request.bytes.clone() else {
        return ConversionResult::Failed(ConvertError::BytesUnavailable);
    };

    let outcome = tokio::task::spawn_blocking(move || match kind {
        ConverterKind::Heic => heic::to_jpeg(&bytes)
            .map(|jpeg| ConversionResult::Image(ResourceHandle::new("image/jpeg", jpeg))),
        ConverterKind::Document => document::to_html(&bytes).map(ConversionResult::Markup),
        ConverterKind::Spreadsheet => spreadsheet::to_html(&bytes).map(ConversionResult::Markup),
        // convert_immediate handled the rest
        _ => Ok(ConversionResult::Unsupported),
    })
    .await;

    match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            debug!(name = %request.name, error = %e, "conversion failed");
            ConversionResult::Failed(e)
        }
        Err(join_err) => ConversionResult::Failed(ConvertError::TaskFailed {
            detail: join_err.to_string(),
        }),
    }
}

/// Pick a media type for an image passthrough: trust the declared type
/// when present, otherwise sniff the magic bytes.
fn image_mime(declared: &str, bytes: &[u8]) -> String {
    if !declared.trim().is_empty() {
        return declared.to_string();
    }
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => "application/octet-stream".to_string(),
    }
}
