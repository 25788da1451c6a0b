//! FILENAME: core/selector/src/engine.rs
//! PURPOSE: Keeps the range text, the grid selection and the dialog in sync.
//! CONTEXT: One engine per mounted range input. Every host event is handled to
//! completion before the next one. Each update flows one way only:
//! - text drives ranges: typed text is parsed, the ranges are highlighted;
//! - selection drives text: the grid's text is canonicalized, written to the
//!   editor and reparsed.
//! The editor echoing text the engine just wrote is recognized and dropped,
//! so the two directions never feed each other.
//!
//! STATES:
//!   Idle --(typing while focused)--> EditingText
//!   Idle/EditingText --(grid selection while syncing)--> DraggingSelection
//!   DraggingSelection --(gesture end)--> Idle, focus and caret restored later
//!   any --(dialog opens)--> SuspendedForDialog --(confirm/cancel)--> Idle
//!   any --(blur, close-all command)--> Idle

use std::rc::Rc;
use std::time::Duration;

use range_parser::{
    canonical_text, descriptors_to_text, is_range_list, tokenize, RangeDescriptor, SequenceNode,
};
use uuid::Uuid;

use crate::collaborators::{
    Collaborators, SelectionClaim, CLOSE_ALL_EDITORS_COMMAND, NORMAL_DOC_EDITOR_ID,
};
use crate::dialog::MultiRangeDialogController;
use crate::error::SelectorResult;
use crate::highlight::build_highlights;
use crate::options::SelectorOptions;
use crate::scheduler::{DeferredAction, Scheduler, Throttle};
use crate::selection::{compose_selection_text, ComposeContext, SelectionEvent};
use crate::state::{sanitize_input, ParseOutcome, RangeSelectorState};
use crate::{log_debug, log_enter, log_exit, log_info};

const EDITOR_ID_PREFIX: &str = "__INTERNAL_EDITOR__RANGE_SELECTOR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    EditingText,
    DraggingSelection,
    SuspendedForDialog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Left,
    Right,
}

pub struct SelectionSyncEngine {
    options: SelectorOptions,
    editor_id: String,
    state: RangeSelectorState,
    sync_state: SyncState,
    collaborators: Collaborators,
    scheduler: Scheduler,
    input_throttle: Throttle<String>,
    /// Held while focused or while the dialog is open.
    claim: Option<SelectionClaim>,
    dialog: Option<MultiRangeDialogController>,
    /// Sheet currently shown in the grid.
    active_sub_unit_id: String,
    caret: usize,
    /// Text last written to the editor by the engine.
    echo_text: Option<String>,
    disposed: bool,
}

impl SelectionSyncEngine {
    pub fn new(options: SelectorOptions, collaborators: Collaborators) -> SelectorResult<Self> {
        options.validate()?;

        let editor_id = format!(
            "{}-{}",
            EDITOR_ID_PREFIX,
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let initial_text = options.initial_text();
        let state = RangeSelectorState::new(
            &initial_text,
            options.only_one_range,
            options.support_across_sheet,
        );

        let mut engine = SelectionSyncEngine {
            input_throttle: Throttle::new(options.timing.input_throttle()),
            active_sub_unit_id: options.sub_unit_id.clone(),
            caret: state.text().chars().count(),
            options,
            editor_id,
            state,
            sync_state: SyncState::Idle,
            collaborators,
            scheduler: Scheduler::new(),
            claim: None,
            dialog: None,
            echo_text: None,
            disposed: false,
        };

        log_info!(
            "SYNC",
            "created {} unit={} subUnit={} text={:?}",
            engine.editor_id,
            engine.options.unit_id,
            engine.options.sub_unit_id,
            engine.state.text()
        );

        engine.write_editor_text();
        engine.refresh_highlights();
        if engine.options.auto_focus {
            engine.request_focus();
        }
        Ok(engine)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn options(&self) -> &SelectorOptions {
        &self.options
    }

    pub fn editor_id(&self) -> &str {
        &self.editor_id
    }

    pub fn state(&self) -> &RangeSelectorState {
        &self.state
    }

    pub fn text(&self) -> &str {
        self.state.text()
    }

    pub fn nodes(&self) -> &[SequenceNode] {
        self.state.nodes()
    }

    pub fn descriptors(&self) -> &[RangeDescriptor] {
        self.state.descriptors()
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync_state
    }

    pub fn is_focused(&self) -> bool {
        self.state.is_focused()
    }

    pub fn is_dialog_visible(&self) -> bool {
        self.state.is_dialog_visible()
    }

    pub fn has_selection_claim(&self) -> bool {
        self.claim.is_some()
    }

    pub fn dialog(&self) -> Option<&MultiRangeDialogController> {
        self.dialog.as_ref()
    }

    /// Row editing goes straight to the dialog controller.
    pub fn dialog_mut(&mut self) -> Option<&mut MultiRangeDialogController> {
        self.dialog.as_mut()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn pending_actions(&self) -> Vec<DeferredAction> {
        self.scheduler.pending_actions()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn placeholder_visible(&self) -> bool {
        self.options.placeholder.is_some() && self.state.text().is_empty()
    }

    pub fn set_error_text(&mut self, error_text: Option<String>) {
        self.options.error_text = error_text;
    }

    /// Builds the grid event for a freshly selected range, replacing the
    /// reference under the caret or appending to the list.
    pub fn selection_event_for(&self, selected: &RangeDescriptor, is_end: bool) -> SelectionEvent {
        let ctx = ComposeContext {
            only_one_range: self.options.only_one_range,
            support_across_sheet: self.options.support_across_sheet,
            home_sheet: &self.options.sheet_name,
        };
        let (text, caret) = compose_selection_text(self.state.nodes(), Some(self.caret), selected, ctx);
        SelectionEvent::new(
            self.options.unit_id.clone(),
            self.active_sub_unit_id.clone(),
            text,
            Some(caret),
            is_end,
        )
    }

    // ========================================================================
    // TEXT INPUT (text drives ranges)
    // ========================================================================

    /// Body-changed event from the editor.
    pub fn on_text_input(&mut self, raw: &str, caret: Option<usize>) {
        if self.disposed || self.state.is_dialog_visible() {
            return;
        }

        let text = sanitize_input(raw);
        if let Some(offset) = caret {
            self.caret = offset;
        }

        if self.echo_text.take().as_deref() == Some(text.as_str()) {
            log_debug!("SYNC", "ignoring editor echo {:?}", text);
            return;
        }
        if text != raw {
            self.collaborators.editor.set_text(&text);
            self.echo_text = Some(text.clone());
        }

        if self.state.is_focused() && self.sync_state == SyncState::Idle {
            self.transition(SyncState::EditingText);
        }

        if let Some(text) = self.input_throttle.offer(text, &mut self.scheduler) {
            self.apply_text(&text);
        }
    }

    fn apply_text(&mut self, text: &str) {
        let outcome = self.state.set_text(text);
        self.caret = self.caret.min(self.state.text().chars().count());
        self.refresh_highlights();
        self.emit(outcome, text);
    }

    /// Reports a parse attempt: always `on_verify`, and `on_change` when the
    /// text is an acceptable value.
    fn emit(&self, outcome: ParseOutcome, attempted: &str) {
        let listener = &self.collaborators.listener;
        match outcome {
            ParseOutcome::Discarded(_) => listener.on_verify(false, attempted),
            ParseOutcome::Parsed => match self.state.committed_value() {
                Some(value) => {
                    listener.on_verify(true, &value);
                    listener.on_change(&value);
                }
                None => listener.on_verify(false, self.state.text()),
            },
        }
    }

    // ========================================================================
    // GRID SELECTION (selection drives text)
    // ========================================================================

    pub fn on_grid_selection(&mut self, event: &SelectionEvent) {
        if self.disposed {
            return;
        }
        if event.unit_id != self.options.unit_id {
            log_debug!("SYNC", "selection from unit {} ignored", event.unit_id);
            return;
        }

        if self.state.is_dialog_visible() {
            if let Some(dialog) = self.dialog.as_mut() {
                dialog.on_selection_text(&event.text);
            }
            return;
        }

        if !self.state.needs_sync() || self.claim.is_none() {
            log_debug!("SYNC", "selection ignored: not syncing");
            return;
        }
        if !self.options.support_across_sheet && event.sub_unit_id != self.options.sub_unit_id {
            log_debug!("SYNC", "selection on {} ignored: across-sheet disabled", event.sub_unit_id);
            return;
        }

        // Typed text still waiting in the throttle is older than this selection
        self.input_throttle.cancel(&mut self.scheduler);
        self.transition(SyncState::DraggingSelection);

        let text = match tokenize(&event.text) {
            Ok(nodes) => canonical_text(&nodes, self.options.support_across_sheet),
            Err(e) => {
                log_debug!("SYNC", "selection text {:?} discarded: {}", event.text, e);
                String::new()
            }
        };
        let outcome = self.state.set_text(&text);
        self.write_editor_text();
        self.refresh_highlights();
        self.emit(outcome, &text);

        let len = self.state.text().chars().count();
        if let Some(offset) = event.caret_offset {
            self.caret = offset.min(len);
        }

        if event.is_end {
            self.transition(SyncState::Idle);
            let caret = event.caret_offset.map(|offset| offset.min(len));
            self.schedule_focus_restore(caret, self.options.timing.caret_delay());
        }
    }

    // ========================================================================
    // FOCUS
    // ========================================================================

    /// The input was clicked (or asked to take focus). Focus lands after the
    /// focus delay.
    pub fn request_focus(&mut self) {
        if self.disposed || self.state.is_dialog_visible() {
            return;
        }
        self.scheduler.cancel_where(|a| matches!(a, DeferredAction::Focus));
        self.scheduler
            .schedule(self.options.timing.focus_delay(), DeferredAction::Focus);
    }

    fn complete_focus(&mut self) {
        if self.disposed || self.state.is_dialog_visible() {
            return;
        }
        let was_focused = self.state.is_focused();
        self.state.set_focused(true);
        self.ensure_claim();
        self.collaborators.editor.focus();
        self.refresh_highlights();
        if !was_focused {
            log_debug!("SYNC", "focused {}", self.editor_id);
            self.collaborators.listener.on_focus();
        }
    }

    fn ensure_claim(&mut self) {
        if self.claim.is_none() {
            self.claim = Some(SelectionClaim::acquire(
                &self.collaborators.grid,
                &self.options.unit_id,
                &self.active_sub_unit_id,
                self.options.only_one_range,
            ));
        }
    }

    /// Focus returns to the input after `focus_delay`; the caret, if given,
    /// is placed after `caret_delay`.
    fn schedule_focus_restore(&mut self, caret: Option<usize>, caret_delay: Duration) {
        self.scheduler.cancel_where(|a| {
            matches!(a, DeferredAction::RestoreFocus | DeferredAction::PlaceCaret(_))
        });
        self.scheduler
            .schedule(self.options.timing.focus_delay(), DeferredAction::RestoreFocus);
        if let Some(offset) = caret {
            self.scheduler
                .schedule(caret_delay, DeferredAction::PlaceCaret(offset));
        }
    }

    fn place_caret(&mut self, offset: usize) {
        if !self.state.is_focused() {
            return;
        }
        self.caret = offset.min(self.state.text().chars().count());
        self.collaborators.editor.set_caret(self.caret);
    }

    /// External blur. Releases the grid and cancels pending focus work.
    pub fn blur(&mut self) {
        let was_active = self.state.is_focused() || self.sync_state != SyncState::Idle;
        self.blur_inner(was_active);
    }

    fn blur_inner(&mut self, notify: bool) {
        if self.disposed {
            return;
        }
        log_enter!("SYNC", "blur", "notify={}", notify);

        self.scheduler.cancel_where(|a| {
            matches!(
                a,
                DeferredAction::Focus | DeferredAction::RestoreFocus | DeferredAction::PlaceCaret(_)
            )
        });
        if let Some(text) = self.input_throttle.drain(&mut self.scheduler) {
            self.apply_text(&text);
        }

        self.claim = None;
        self.state.set_focused(false);
        self.collaborators.editor.blur();
        if !self.state.is_dialog_visible() {
            self.transition(SyncState::Idle);
        }
        if notify {
            self.collaborators.listener.on_blur();
        }

        log_exit!("SYNC", "blur");
    }

    /// A click somewhere. Outside the selector, with the dialog closed, it
    /// blurs. Returns true if it did.
    pub fn handle_outside_click(&mut self, inside: bool) -> bool {
        if self.disposed || inside || self.state.is_dialog_visible() || !self.state.is_focused() {
            return false;
        }
        self.blur();
        true
    }

    /// Left/Right while syncing move the caret in the input, not the grid
    /// selection. Returns true if the key was consumed.
    pub fn on_arrow_key(&mut self, key: ArrowKey) -> bool {
        if self.disposed || !self.state.needs_sync() {
            return false;
        }
        let len = self.state.text().chars().count();
        self.caret = match key {
            ArrowKey::Left => self.caret.min(len).saturating_sub(1),
            ArrowKey::Right => (self.caret + 1).min(len),
        };
        self.collaborators.editor.set_caret(self.caret);
        true
    }

    // ========================================================================
    // HOST SIGNALS
    // ========================================================================

    pub fn on_command_executed(&mut self, command_id: &str) {
        if self.disposed || command_id != CLOSE_ALL_EDITORS_COMMAND {
            return;
        }
        log_info!("SYNC", "close-all command: {}", command_id);
        let active = self.state.is_focused()
            || self.state.is_dialog_visible()
            || self.sync_state != SyncState::Idle;
        if self.state.is_dialog_visible() {
            self.dialog = None;
            self.close_dialog();
        }
        self.blur_inner(active);
    }

    /// The active sheet changed.
    ///
    /// With across-sheet references the grid claim follows the new sheet.
    /// Without them, ranges typed against another sheet are dropped and the
    /// inline input loses focus.
    pub fn on_sheet_switched(&mut self, unit_id: &str, sub_unit_id: &str) {
        if self.disposed || unit_id != self.options.unit_id {
            return;
        }
        let changed = self.active_sub_unit_id != sub_unit_id;
        self.active_sub_unit_id = sub_unit_id.to_string();

        if !changed || !(self.state.is_focused() || self.state.is_dialog_visible()) {
            return;
        }
        log_debug!("SYNC", "sheet switched to {}", sub_unit_id);

        if self.options.support_across_sheet {
            if self.claim.is_some() {
                // Release before re-acquiring on the new sheet
                self.claim = None;
                self.ensure_claim();
            }
            self.refresh_all_highlights();
            return;
        }

        // The dialog works on its own rows; they are filtered on confirm
        if self.state.is_dialog_visible() {
            self.refresh_all_highlights();
            return;
        }
        self.drop_foreign_ranges();
        self.blur();
    }

    fn drop_foreign_ranges(&mut self) {
        let home = self.options.sheet_name.as_str();
        let is_foreign = |d: &RangeDescriptor| !d.sheet_name.is_empty() && d.sheet_name != home;

        let foreign = self.state.descriptors().iter().filter(|d| is_foreign(d)).count();
        if foreign == 0 || !is_range_list(self.state.nodes()) {
            return;
        }

        let kept: Vec<RangeDescriptor> = self
            .state
            .descriptors()
            .iter()
            .filter(|d| !is_foreign(d))
            .cloned()
            .collect();
        let text = descriptors_to_text(&kept, self.options.support_across_sheet);
        log_info!("SYNC", "dropped {} range(s) on other sheets", foreign);

        let outcome = self.state.set_text(&text);
        self.caret = self.caret.min(self.state.text().chars().count());
        self.write_editor_text();
        self.refresh_highlights();
        self.emit(outcome, &text);
    }

    /// Another editor took focus. Foreign editors cancel an open dialog.
    pub fn on_editor_focus_changed(&mut self, editor_id: &str) {
        if self.disposed || !self.state.is_dialog_visible() {
            return;
        }
        if editor_id.is_empty() || editor_id == NORMAL_DOC_EDITOR_ID || editor_id == self.editor_id {
            return;
        }
        log_debug!("SYNC", "editor {} took focus, cancelling dialog", editor_id);
        self.dialog = None;
        self.close_dialog();
        self.blur();
    }

    // ========================================================================
    // DIALOG
    // ========================================================================

    /// Asks for the dialog. It opens after the focus delay. Refused while an
    /// error text is set or the dialog is already open.
    pub fn open_dialog(&mut self) -> bool {
        if self.disposed || self.state.is_dialog_visible() {
            return false;
        }
        if let Some(error) = &self.options.error_text {
            log_debug!("SYNC", "dialog refused: {}", error);
            return false;
        }
        self.collaborators.editor.focus();
        self.scheduler.cancel_where(|a| matches!(a, DeferredAction::OpenDialog));
        self.scheduler
            .schedule(self.options.timing.focus_delay(), DeferredAction::OpenDialog);
        true
    }

    fn show_dialog(&mut self) {
        if self.disposed || self.state.is_dialog_visible() {
            return;
        }
        log_enter!("SYNC", "show_dialog");

        // Typed text still in the throttle belongs in the dialog
        if let Some(text) = self.input_throttle.drain(&mut self.scheduler) {
            self.apply_text(&text);
        }
        self.scheduler.cancel_where(|a| {
            matches!(
                a,
                DeferredAction::Focus | DeferredAction::RestoreFocus | DeferredAction::PlaceCaret(_)
            )
        });

        self.state.set_dialog_visible(true);
        self.transition(SyncState::SuspendedForDialog);
        self.ensure_claim();
        self.dialog = Some(MultiRangeDialogController::open(
            self.state.descriptors(),
            &self.options,
            Rc::clone(&self.collaborators.grid),
            self.collaborators.locale.as_ref(),
        ));
        self.collaborators.listener.on_dialog_visibility_change(true);

        log_exit!("SYNC", "show_dialog");
    }

    /// Commits the dialog rows as the new text. Focus and the caret (at the
    /// end) come back after the focus delay.
    pub fn confirm_dialog(&mut self) -> bool {
        let Some(dialog) = self.dialog.take() else {
            return false;
        };
        log_enter!("SYNC", "confirm_dialog");

        let ranges = dialog.confirm();
        let text = descriptors_to_text(&ranges, self.options.support_across_sheet);
        let outcome = self.state.set_text(&text);
        self.close_dialog();
        self.write_editor_text();
        self.refresh_highlights();
        self.emit(outcome, &text);

        let len = self.state.text().chars().count();
        self.caret = len;
        self.schedule_focus_restore(Some(len), self.options.timing.focus_delay());

        log_exit!("SYNC", "confirm_dialog", "text={:?}", self.state.text());
        true
    }

    /// Discards the dialog rows. The text is left as it was.
    pub fn cancel_dialog(&mut self) -> bool {
        if self.dialog.take().is_none() {
            return false;
        }
        log_debug!("SYNC", "dialog cancelled");
        self.close_dialog();
        self.refresh_highlights();
        self.schedule_focus_restore(None, self.options.timing.focus_delay());
        true
    }

    fn close_dialog(&mut self) {
        self.state.set_dialog_visible(false);
        self.transition(SyncState::Idle);
        self.collaborators.listener.on_dialog_visibility_change(false);
    }

    // ========================================================================
    // TIME & LIFECYCLE
    // ========================================================================

    /// Moves the virtual clock forward, running every deferred action that
    /// falls due, in order.
    pub fn advance_time(&mut self, by: Duration) {
        let until = self.scheduler.now() + by;
        while let Some((_, action)) = self.scheduler.pop_due(until) {
            if self.disposed {
                break;
            }
            self.run_deferred(action);
        }
        self.scheduler.set_now(until);
    }

    fn run_deferred(&mut self, action: DeferredAction) {
        log_debug!("SCHED", "run {:?} at {}ms", action, self.scheduler.now().as_millis());
        match action {
            DeferredAction::Focus | DeferredAction::RestoreFocus => self.complete_focus(),
            DeferredAction::PlaceCaret(offset) => self.place_caret(offset),
            DeferredAction::OpenDialog => self.show_dialog(),
            DeferredAction::FlushInput => {
                let now = self.scheduler.now();
                if let Some(text) = self.input_throttle.flush(now) {
                    if !self.state.is_dialog_visible() {
                        self.apply_text(&text);
                    }
                }
            }
        }
    }

    /// Tears the engine down. Pending deferred work is cancelled, the grid is
    /// released and every later call is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let cancelled = self.scheduler.cancel_all();
        self.input_throttle.cancel(&mut self.scheduler);
        self.dialog = None;
        self.claim = None;
        self.state.set_dialog_visible(false);
        self.state.set_focused(false);
        self.sync_state = SyncState::Idle;
        self.disposed = true;
        log_info!("SYNC", "disposed {} ({} pending task(s) cancelled)", self.editor_id, cancelled);
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn transition(&mut self, next: SyncState) {
        if self.sync_state != next {
            log_debug!("SYNC", "{:?} -> {:?}", self.sync_state, next);
            self.sync_state = next;
        }
    }

    /// Pushes the state text to the editor and remembers it, so the editor's
    /// echo is not treated as typing.
    fn write_editor_text(&mut self) {
        let text = self.state.text().to_string();
        self.collaborators.editor.set_text(&text);
        self.echo_text = Some(text);
    }

    /// Text runs in the editor; grid highlights too unless the dialog owns them.
    fn refresh_highlights(&self) {
        let highlights = build_highlights(
            self.state.nodes(),
            &self.options.palette,
            self.options.support_across_sheet,
        );
        self.collaborators.editor.set_text_runs(&highlights.text_runs);
        if self.state.is_dialog_visible() {
            return;
        }
        if let Some(claim) = &self.claim {
            claim.highlight(&highlights.ranges);
        }
    }

    fn refresh_all_highlights(&self) {
        match &self.dialog {
            Some(dialog) => dialog.refresh_highlights(),
            None => self.refresh_highlights(),
        }
    }
}
