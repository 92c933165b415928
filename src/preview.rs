//! Preview orchestration: one live conversion result per active file.
//!
//! The orchestrator owns the "currently displayed content" slot and the
//! supersession rule around it. Per active-file change the lifecycle is
//!
//! ```text
//! Idle ─▶ (classify, synchronous) ─▶ Converting ─▶ Ready | Failed | Unsupported
//!                    │
//!                    └─▶ Ready / Failed / Unsupported directly for
//!                        image, pdf, unsupported and byte-less placeholders
//! ```
//!
//! Selecting a file hands back an optional [`ConversionTask`] the caller
//! drives to completion (spawn it, await it, feed the outcome to
//! [`PreviewOrchestrator::apply`]). Each `select` bumps a ticket; `apply`
//! drops any outcome carrying a stale ticket. That is the whole
//! concurrency story: last request wins, nothing is queued, and a
//! late-arriving result for a file that is no longer active is silently
//! ignored. There is no cancellation signal: supersession is advisory, and
//! the superseded result's resource handle is released right here when the
//! outcome is dropped.
//!
//! Display transforms are not this module's business: presentation
//! composes [`crate::config::PrintConfig::display_transform`] over
//! whatever `Ready` content exists, without reconversion.

use crate::convert::{
    self, classify_file, ConversionResult, ConvertRequest, ConverterKind,
};
use crate::file::ManagedFile;
use tracing::{debug, info};

/// The observable preview lifecycle for the active file.
///
/// The classifying phase is synchronous and therefore never observable;
/// `select` returns with the slot already in `Converting` or a final state.
#[derive(Debug, Clone, Default)]
pub enum PreviewState {
    /// Nothing selected (empty collection, or cleared).
    #[default]
    Idle,
    /// An asynchronous conversion is in flight for the file at `index`.
    Converting { index: usize, kind: ConverterKind },
    /// Conversion settled; `result` is the live displayable content.
    Ready {
        index: usize,
        kind: ConverterKind,
        result: ConversionResult,
    },
    /// Recoverable failure: preview stays empty, download still works.
    Failed {
        index: usize,
        /// Diagnostic reason, e.g. `heic conversion failed: …`.
        reason: String,
        /// User-facing hint ("Try downloading the file instead.").
        hint: String,
    },
    /// Known, permanent: no preview exists for this file type.
    Unsupported { index: usize },
}

impl PreviewState {
    /// The file index this state belongs to, if any.
    pub fn file_index(&self) -> Option<usize> {
        match self {
            PreviewState::Idle => None,
            PreviewState::Converting { index, .. }
            | PreviewState::Ready { index, .. }
            | PreviewState::Failed { index, .. }
            | PreviewState::Unsupported { index } => Some(*index),
        }
    }
}

/// A pending conversion for one specific `select` call.
///
/// Runs the format-specific converter; the embedded ticket lets
/// [`PreviewOrchestrator::apply`] recognise and discard superseded
/// outcomes.
#[derive(Debug)]
pub struct ConversionTask {
    ticket: u64,
    index: usize,
    kind: ConverterKind,
    request: ConvertRequest,
}

impl ConversionTask {
    pub fn kind(&self) -> ConverterKind {
        self.kind
    }

    /// Run the conversion to completion. Never fails outward: conversion
    /// errors are folded into the outcome's result.
    pub async fn run(self) -> ConversionOutcome {
        let result = convert::convert(self.request, self.kind).await;
        ConversionOutcome {
            ticket: self.ticket,
            index: self.index,
            kind: self.kind,
            result,
        }
    }
}

/// A settled conversion, ready to be offered back to the orchestrator.
#[derive(Debug)]
pub struct ConversionOutcome {
    ticket: u64,
    index: usize,
    kind: ConverterKind,
    result: ConversionResult,
}

/// Owner of the live preview slot. Single-timeline: all mutation happens
/// through `&mut self`, the only race to handle is the stale-outcome one.
#[derive(Debug, Default)]
pub struct PreviewOrchestrator {
    state: PreviewState,
    ticket: u64,
}

impl PreviewOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// True while an asynchronous conversion is pending.
    pub fn is_converting(&self) -> bool {
        matches!(self.state, PreviewState::Converting { .. })
    }

    /// Make the file at `index` the preview target.
    ///
    /// Resets the displayed content and any error text, then classifies.
    /// Image, PDF, unsupported and byte-less files settle synchronously
    /// and return `None`; the async kinds leave the slot `Converting` and
    /// return the task to drive.
    pub fn select(&mut self, index: usize, file: &ManagedFile) -> Option<ConversionTask> {
        self.ticket += 1;
        let kind = classify_file(file);
        let request = ConvertRequest::from_file(file);
        debug!(index, ?kind, name = %file.name(), "preview selected");

        if let Some(result) = convert::convert_immediate(&request, kind) {
            self.state = Self::settled(index, kind, result);
            return None;
        }

        self.state = PreviewState::Converting { index, kind };
        Some(ConversionTask {
            ticket: self.ticket,
            index,
            kind,
            request,
        })
    }

    /// Offer a settled conversion back. Returns `true` when it was
    /// installed, `false` when it was superseded and dropped.
    pub fn apply(&mut self, outcome: ConversionOutcome) -> bool {
        if outcome.ticket != self.ticket {
            // Stale: a different file was selected while this ran. The
            // outcome (and any resource handle inside) drops here.
            debug!(
                stale = outcome.ticket,
                current = self.ticket,
                "superseded conversion discarded"
            );
            return false;
        }
        info!(index = outcome.index, kind = ?outcome.kind, "preview settled");
        self.state = Self::settled(outcome.index, outcome.kind, outcome.result);
        true
    }

    /// Drop the live content and return to `Idle` (collection emptied or
    /// active file removed). Also invalidates any in-flight conversion.
    pub fn clear(&mut self) {
        self.ticket += 1;
        self.state = PreviewState::Idle;
    }

    fn settled(index: usize, kind: ConverterKind, result: ConversionResult) -> PreviewState {
        match result {
            ConversionResult::Unsupported => PreviewState::Unsupported { index },
            ConversionResult::Failed(e) => PreviewState::Failed {
                index,
                reason: e.to_string(),
                hint: e.user_message(),
            },
            other => PreviewState::Ready {
                index,
                kind,
                result: other,
            },
        }
    }
}
