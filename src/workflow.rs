//! The four-step ordering workflow and its persistence boundary.
//!
//! Steps are ordinal: Upload(1) → Settings(2) → Location(3) → Summary(4).
//! Forward progress is gated by per-step preconditions, backward
//! navigation is always free, and the step indicator may jump to any step
//! that has been reached at least once (tracked as `highest_reached`).
//!
//! Every successful transition persists the session snapshot (file
//! metadata but never bytes, print configuration, selected shop, current
//! and highest step) through the injected [`SessionStore`]. On restart the
//! machine rehydrates from the same keys; absent or malformed entries fall
//! back to defaults with a warning, never an error. File bytes do not
//! survive a reload, so rehydrated collections hold metadata placeholders
//! the presentation must treat as requiring re-upload.

use crate::config::PrintConfig;
use crate::error::WorkflowError;
use crate::file::{FileCollection, FileSnapshot, ManagedFile};
use crate::session::{keys, SessionStore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One of the four ordered workflow stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkflowStep {
    Upload,
    Settings,
    Location,
    Summary,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 4] = [
        WorkflowStep::Upload,
        WorkflowStep::Settings,
        WorkflowStep::Location,
        WorkflowStep::Summary,
    ];

    /// 1-based ordinal, as shown in the step indicator.
    pub fn number(self) -> u8 {
        match self {
            WorkflowStep::Upload => 1,
            WorkflowStep::Settings => 2,
            WorkflowStep::Location => 3,
            WorkflowStep::Summary => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkflowStep::Upload => "Upload",
            WorkflowStep::Settings => "Settings",
            WorkflowStep::Location => "Location",
            WorkflowStep::Summary => "Summary",
        }
    }

    fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    fn previous(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }
}

/// The workflow state machine plus the user state it shepherds between
/// steps: the file collection, print configuration, and shop choice.
pub struct Workflow {
    store: Arc<dyn SessionStore>,
    step: WorkflowStep,
    highest_reached: WorkflowStep,
    files: FileCollection,
    config: PrintConfig,
    selected_shop: Option<String>,
}

impl Workflow {
    /// Start a fresh session at the Upload step.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            step: WorkflowStep::Upload,
            highest_reached: WorkflowStep::Upload,
            files: FileCollection::new(),
            config: PrintConfig::default(),
            selected_shop: None,
        }
    }

    /// Rehydrate a session from the store, falling back to defaults for
    /// anything absent or malformed. Restored files are metadata-only
    /// placeholders; their bytes did not survive.
    pub fn restore(store: Arc<dyn SessionStore>) -> Self {
        let step = read_json::<u8>(&*store, keys::STEP)
            .and_then(WorkflowStep::from_number)
            .unwrap_or(WorkflowStep::Upload);
        let highest_reached = read_json::<u8>(&*store, keys::HIGHEST_STEP)
            .and_then(WorkflowStep::from_number)
            .unwrap_or(step)
            .max(step);
        let config = read_json::<PrintConfig>(&*store, keys::CONFIG).unwrap_or_default();
        let snapshots = read_json::<Vec<FileSnapshot>>(&*store, keys::FILES).unwrap_or_default();
        let selected_shop = read_json::<Option<String>>(&*store, keys::SHOP).unwrap_or_default();

        info!(
            step = step.number(),
            files = snapshots.len(),
            "session rehydrated"
        );
        Self {
            store,
            step,
            highest_reached,
            files: FileCollection::from_snapshots(&snapshots),
            config,
            selected_shop,
        }
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn highest_reached(&self) -> WorkflowStep {
        self.highest_reached
    }

    pub fn files(&self) -> &FileCollection {
        &self.files
    }

    /// Mutable access for the Upload/Settings screens. Collection edits
    /// must be followed by a fresh preview selection; the machine itself
    /// does not persist on collection edits, only at step transitions.
    pub fn files_mut(&mut self) -> &mut FileCollection {
        &mut self.files
    }

    /// Convenience wrapper: append uploads and activate the last one.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = ManagedFile>) {
        self.files.add(files);
    }

    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PrintConfig {
        &mut self.config
    }

    pub fn selected_shop(&self) -> Option<&str> {
        self.selected_shop.as_deref()
    }

    /// Record the shop chosen on the Location step.
    pub fn select_shop(&mut self, shop_id: impl Into<String>) {
        self.selected_shop = Some(shop_id.into());
    }

    pub fn clear_shop(&mut self) {
        self.selected_shop = None;
    }

    /// Move to the next step if its precondition holds.
    pub fn advance(&mut self) -> Result<WorkflowStep, WorkflowError> {
        let Some(next) = self.step.next() else {
            return Err(WorkflowError::PreconditionNotMet {
                step: self.step,
                reason: "already at the final step".to_string(),
            });
        };

        match self.step {
            WorkflowStep::Upload if self.files.is_empty() => {
                return Err(WorkflowError::PreconditionNotMet {
                    step: self.step,
                    reason: "at least one file must be uploaded".to_string(),
                });
            }
            WorkflowStep::Location if self.selected_shop.is_none() => {
                return Err(WorkflowError::PreconditionNotMet {
                    step: self.step,
                    reason: "a printer shop must be selected".to_string(),
                });
            }
            _ => {}
        }

        self.step = next;
        self.highest_reached = self.highest_reached.max(next);
        self.persist();
        info!(step = next.number(), "advanced");
        Ok(next)
    }

    /// Move to the immediately previous step. Never fails; a no-op at
    /// Upload.
    pub fn retreat(&mut self) -> WorkflowStep {
        if let Some(prev) = self.step.previous() {
            self.step = prev;
            self.persist();
            info!(step = prev.number(), "retreated");
        }
        self.step
    }

    /// Jump directly to a previously reached step (step-indicator clicks).
    pub fn jump_to(&mut self, step: WorkflowStep) -> Result<WorkflowStep, WorkflowError> {
        if step > self.highest_reached {
            return Err(WorkflowError::StepNotYetUnlocked {
                requested: step,
                highest: self.highest_reached,
            });
        }
        self.step = step;
        self.persist();
        debug!(step = step.number(), "jumped");
        Ok(step)
    }

    /// Write the full snapshot through the session store. Raw file bytes
    /// are deliberately not persisted; only metadata survives a reload.
    fn persist(&self) {
        write_json(&*self.store, keys::STEP, &self.step.number());
        write_json(&*self.store, keys::HIGHEST_STEP, &self.highest_reached.number());
        write_json(&*self.store, keys::CONFIG, &self.config);
        write_json(&*self.store, keys::FILES, &self.files.snapshots());
        write_json(&*self.store, keys::SHOP, &self.selected_shop);
    }
}

/// Read and deserialize one persisted value. Absent entries are normal;
/// malformed ones are logged and treated as absent (defaults win).
fn read_json<T: DeserializeOwned>(store: &dyn SessionStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "malformed session entry, using defaults");
            None
        }
    }
}

/// Serialize and store one value. Serialization of these snapshot types
/// cannot fail in practice; if it ever does we log and keep going, in
/// keeping with best-effort session persistence.
fn write_json<T: Serialize>(store: &dyn SessionStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, raw),
        Err(e) => warn!(key, error = %e, "failed to serialize session entry"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Margin;
    use crate::session::MemorySessionStore;

    fn file(name: &str) -> ManagedFile {
        ManagedFile::new(name, "application/pdf", vec![1, 2, 3], 0)
    }

    fn fresh() -> (Arc<MemorySessionStore>, Workflow) {
        let store = Arc::new(MemorySessionStore::new());
        let wf = Workflow::new(Arc::clone(&store) as Arc<dyn SessionStore>);
        (store, wf)
    }

    #[test]
    fn step_ordinals_are_stable() {
        assert_eq!(WorkflowStep::Upload.number(), 1);
        assert_eq!(WorkflowStep::Summary.number(), 4);
        assert_eq!(WorkflowStep::from_number(3), Some(WorkflowStep::Location));
        assert_eq!(WorkflowStep::from_number(9), None);
        assert_eq!(WorkflowStep::Location.label(), "Location");
    }

    #[test]
    fn advance_without_files_fails_and_stays() {
        let (_, mut wf) = fresh();
        let err = wf.advance().unwrap_err();
        assert!(matches!(err, WorkflowError::PreconditionNotMet { .. }));
        assert_eq!(wf.step(), WorkflowStep::Upload);
    }

    #[test]
    fn advance_through_all_steps() {
        let (_, mut wf) = fresh();
        wf.add_files([file("a.pdf")]);
        assert_eq!(wf.advance().unwrap(), WorkflowStep::Settings);
        assert_eq!(wf.advance().unwrap(), WorkflowStep::Location);

        // Location requires a shop
        let err = wf.advance().unwrap_err();
        assert!(matches!(err, WorkflowError::PreconditionNotMet { .. }));
        assert_eq!(wf.step(), WorkflowStep::Location);

        wf.select_shop("shop-2");
        assert_eq!(wf.advance().unwrap(), WorkflowStep::Summary);

        // No step past Summary
        assert!(wf.advance().is_err());
    }

    #[test]
    fn retreat_never_fails() {
        let (_, mut wf) = fresh();
        assert_eq!(wf.retreat(), WorkflowStep::Upload); // no-op at the first step
        wf.add_files([file("a.pdf")]);
        wf.advance().unwrap();
        assert_eq!(wf.retreat(), WorkflowStep::Upload);
    }

    #[test]
    fn jump_requires_prior_visit() {
        let (_, mut wf) = fresh();
        wf.add_files([file("a.pdf")]);

        let err = wf.jump_to(WorkflowStep::Summary).unwrap_err();
        assert!(matches!(err, WorkflowError::StepNotYetUnlocked { .. }));
        assert_eq!(wf.step(), WorkflowStep::Upload);

        wf.advance().unwrap(); // Settings
        wf.advance().unwrap(); // Location, highest = 3

        assert_eq!(wf.jump_to(WorkflowStep::Upload).unwrap(), WorkflowStep::Upload);
        assert_eq!(
            wf.jump_to(WorkflowStep::Location).unwrap(),
            WorkflowStep::Location
        );
        // Summary still locked
        assert!(wf.jump_to(WorkflowStep::Summary).is_err());
    }

    #[test]
    fn transitions_persist_and_restore() {
        let store = Arc::new(MemorySessionStore::new());
        {
            let mut wf = Workflow::new(Arc::clone(&store) as Arc<dyn SessionStore>);
            wf.add_files([ManagedFile::new("scan.heic", "image/heic", vec![0; 9], 77)]);
            wf.config_mut().set_zoom_percent(150);
            wf.config_mut().set_margin(Margin::Wide);
            wf.select_shop("shop-1");
            wf.advance().unwrap();
            wf.advance().unwrap();
        }

        let wf = Workflow::restore(Arc::clone(&store) as Arc<dyn SessionStore>);
        assert_eq!(wf.step(), WorkflowStep::Location);
        assert_eq!(wf.highest_reached(), WorkflowStep::Location);
        assert_eq!(wf.config().zoom_percent(), 150);
        assert_eq!(wf.config().margin(), Margin::Wide);
        assert_eq!(wf.selected_shop(), Some("shop-1"));

        // Files come back as placeholders: metadata intact, bytes gone
        assert_eq!(wf.files().len(), 1);
        let f = wf.files().get(0).unwrap();
        assert_eq!(f.name(), "scan.heic");
        assert_eq!(f.len(), 9);
        assert_eq!(f.modified_ms(), 77);
        assert!(f.needs_reupload());
    }

    #[test]
    fn restore_from_empty_store_yields_defaults() {
        let store = Arc::new(MemorySessionStore::new());
        let wf = Workflow::restore(store);
        assert_eq!(wf.step(), WorkflowStep::Upload);
        assert!(wf.files().is_empty());
        assert_eq!(wf.config(), &PrintConfig::default());
        assert_eq!(wf.selected_shop(), None);
    }

    #[test]
    fn restore_tolerates_malformed_entries() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(keys::STEP, "not json".into());
        store.set(keys::CONFIG, "{broken".into());
        store.set(keys::FILES, "42".into());
        let wf = Workflow::restore(store);
        assert_eq!(wf.step(), WorkflowStep::Upload);
        assert!(wf.files().is_empty());
        assert_eq!(wf.config(), &PrintConfig::default());
    }

    #[test]
    fn config_round_trips_field_for_field() {
        let store = Arc::new(MemorySessionStore::new());
        let mut wf = Workflow::new(Arc::clone(&store) as Arc<dyn SessionStore>);
        wf.add_files([file("a.pdf")]);
        wf.config_mut().set_zoom_percent(175);
        wf.config_mut()
            .set_color_mode(crate::config::ColorMode::Color);
        wf.config_mut()
            .set_orientation(crate::config::Orientation::Landscape);
        wf.advance().unwrap();

        let restored = Workflow::restore(store);
        assert_eq!(restored.config(), wf.config());
    }
}
