//! Error types for the printcorner core.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`WorkflowError`]: caller misuse of the collection or the step
//!   machine (bad index, precondition not met, step not unlocked).
//!   Returned as `Err(WorkflowError)` from the mutating operations; the
//!   presentation layer surfaces these as disabled controls or inline
//!   messages, never as a crash.
//!
//! * [`ConvertError`]: a single file failed to convert (HEIC decode
//!   glitch, corrupt Office package). Stored inside
//!   [`crate::convert::ConversionResult::Failed`] so the preview simply
//!   stays empty while the rest of the workflow remains usable.
//!
//! Nothing here is fatal to the process. Persistence read failures are a
//! third, invisible category: they are recovered by falling back to
//! defaults inside [`crate::workflow::Workflow::restore`] and only leave a
//! `tracing::warn!` behind.

use crate::workflow::WorkflowStep;
use thiserror::Error;

/// Caller-misuse errors from the file collection and the workflow machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// An index into the file collection was invalid.
    ///
    /// This is a programmer error; it should never reach the user.
    #[error("file index {index} is out of range (collection holds {len} files)")]
    IndexOutOfRange { index: usize, len: usize },

    /// `advance()` was called while the current step's precondition fails.
    #[error("cannot advance from step {step:?}: {reason}")]
    PreconditionNotMet { step: WorkflowStep, reason: String },

    /// `jump_to()` targeted a step that has never been reached.
    ///
    /// A no-op from the caller's perspective: the machine stays where it
    /// was. The step indicator renders the target as locked.
    #[error("step {requested:?} is not unlocked yet (highest reached: {highest:?})")]
    StepNotYetUnlocked {
        requested: WorkflowStep,
        highest: WorkflowStep,
    },
}

/// A recoverable, per-file conversion failure.
///
/// Never propagated as `Err` past the converters: the preview orchestrator
/// folds it into [`crate::convert::ConversionResult::Failed`] and the file
/// stays in the collection, downloadable as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ConvertError {
    /// HEIC/HEIF decode or JPEG re-encode failed, or no codec is compiled in.
    #[error("heic conversion failed: {detail}")]
    Heic { detail: String },

    /// The word-processing package could not be parsed.
    #[error("failed to convert word document: {detail}")]
    Document { detail: String },

    /// The workbook could not be parsed, or it has no sheets.
    #[error("failed to convert spreadsheet: {detail}")]
    Spreadsheet { detail: String },

    /// The file's bytes are gone (metadata-only placeholder after a
    /// session reload). The user must re-add the file.
    #[error("file content is no longer available after reload")]
    BytesUnavailable,

    /// A conversion task panicked or was cancelled by the runtime.
    #[error("conversion task failed: {detail}")]
    TaskFailed { detail: String },
}

impl ConvertError {
    /// The inline message the preview pane shows next to the empty slot.
    ///
    /// Wording matches the download-fallback behaviour: the file itself is
    /// fine, only its preview is missing.
    pub fn user_message(&self) -> String {
        match self {
            ConvertError::Heic { .. } => {
                "Failed to convert HEIC image. Try downloading the file instead.".to_string()
            }
            ConvertError::Document { .. } => {
                "Failed to convert Word document. Try downloading the file instead.".to_string()
            }
            ConvertError::Spreadsheet { .. } => {
                "Failed to convert Excel file. Try downloading the file instead.".to_string()
            }
            ConvertError::BytesUnavailable => {
                "This file needs to be uploaded again before it can be previewed.".to_string()
            }
            ConvertError::TaskFailed { .. } => {
                "An error occurred while generating the preview.".to_string()
            }
        }
    }
}
