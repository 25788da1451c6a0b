//! FILENAME: core/selector/src/lib.rs
//! PURPOSE: Main library entry point for the range selector.
//! CONTEXT: Ties the range parser to a live input: typed text, grid
//! selections and the multi-range dialog all end up as one canonical range
//! text. Drawing, editing and command routing stay with the host, behind the
//! traits in `collaborators`.

pub mod collaborators;
pub mod dialog;
pub mod engine;
pub mod error;
pub mod events;
pub mod highlight;
pub mod logging;
pub mod options;
pub mod scheduler;
pub mod selection;
pub mod state;

pub use collaborators::{
    Collaborators, GridSelectionSource, KeyLocale, LocaleProvider, NoopListener,
    RangeSelectorListener, SelectionClaim, TextEditorSurface, CLOSE_ALL_EDITORS_COMMAND,
    NORMAL_DOC_EDITOR_ID,
};
pub use dialog::{DialogLabels, DialogRangeRow, MultiRangeDialogController};
pub use engine::{ArrowKey, SelectionSyncEngine, SyncState};
pub use error::{SelectorError, SelectorResult};
pub use events::{EventQueue, SelectorEvent};
pub use highlight::{build_highlights, Highlights, RangeHighlight, TextRun};
pub use options::{InitialValue, SelectorOptions, Timing, DEFAULT_PALETTE};
pub use scheduler::{DeferredAction, Scheduler, TaskId, Throttle};
pub use selection::{compose_selection_text, ComposeContext, SelectionEvent};
pub use state::{sanitize_input, ParseOutcome, RangeSelectorState};
