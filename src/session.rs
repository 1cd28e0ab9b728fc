//! Session state machine.
//!
//! The whole UI surface of the studio reduces to one small state record and
//! an explicit event alphabet, so every gating rule (generate only on
//! non-empty trimmed input, download only when idle and assets are ready,
//! all-or-nothing reset) is testable without a UI harness.

use crate::sizing;

/// Which of the two top-level views is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Form,
    Certificate,
}

/// Load status of the certificate template asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    Loading,
    Ready,
    Failed,
}

/// The complete input alphabet of the machine.
///
/// UI callbacks (text input, button clicks, the Enter keypress on the name
/// field, image load/error signals) all map onto these events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The name field content changed.
    NameChanged(String),
    /// The Generate action was triggered (button or Enter keypress).
    GenerateRequested,
    /// The Download action was triggered.
    DownloadRequested,
    /// The export pipeline finished, successfully or not.
    ExportFinished,
    /// The Create Another action was triggered.
    ResetRequested,
    /// The template asset signaled a successful load.
    AssetLoaded,
    /// The template asset signaled a load error.
    AssetFailed,
    /// The Retry action on the asset-failure path (full reload).
    RetryRequested,
}

/// Session state record.
///
/// Nothing here is persisted; a reset swaps in a fresh default record.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Free text as typed by the user.
    pub name: String,
    /// Current top-level view.
    pub stage: Stage,
    /// Busy flag; at most one export is in flight while this is set.
    pub is_exporting: bool,
    /// Derived font size in pixels, always within the sizing bounds.
    pub font_size: u32,
    /// Load status of the certificate template.
    pub asset_status: AssetStatus,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            name: String::new(),
            stage: Stage::Form,
            is_exporting: false,
            font_size: sizing::MAX_FONT_PX,
            asset_status: AssetStatus::Loading,
        }
    }
}

impl SessionState {
    /// Whether the Generate action is enabled.
    pub fn can_generate(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Whether the Download action is enabled.
    pub fn can_download(&self) -> bool {
        self.stage == Stage::Certificate
            && !self.is_exporting
            && self.asset_status == AssetStatus::Ready
    }

    /// Apply one event to the state. Events that are not enabled in the
    /// current state are ignored rather than rejected; gating surfaces as
    /// typed errors at the studio layer, not here.
    pub fn apply(&mut self, event: Event) {
        match event {
            Event::NameChanged(name) => {
                self.name = name;
            }
            Event::GenerateRequested => {
                if self.can_generate() {
                    self.stage = Stage::Certificate;
                    self.asset_status = AssetStatus::Loading;
                }
            }
            Event::DownloadRequested => {
                if self.can_download() {
                    self.is_exporting = true;
                }
            }
            Event::ExportFinished => {
                self.is_exporting = false;
            }
            Event::ResetRequested => {
                *self = Self::default();
            }
            Event::AssetLoaded => {
                if self.asset_status == AssetStatus::Loading {
                    self.asset_status = AssetStatus::Ready;
                }
            }
            Event::AssetFailed => {
                if self.asset_status == AssetStatus::Loading {
                    self.asset_status = AssetStatus::Failed;
                }
            }
            Event::RetryRequested => {
                if self.stage == Stage::Certificate && self.asset_status == AssetStatus::Failed {
                    self.asset_status = AssetStatus::Loading;
                }
            }
        }
    }
}
