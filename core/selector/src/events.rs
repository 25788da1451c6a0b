//! FILENAME: core/selector/src/events.rs
//! PURPOSE: Host events as data, and a queue that feeds them to an engine.
//! CONTEXT: Hosts can call the engine's handlers directly or push events
//! here. Either way each event runs to completion before the next.

use std::collections::VecDeque;
use std::time::Duration;

use crate::engine::{ArrowKey, SelectionSyncEngine};
use crate::selection::SelectionEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEvent {
    TextInput { text: String, caret: Option<usize> },
    GridSelection(SelectionEvent),
    FocusRequested,
    Blur,
    SheetSwitched { unit_id: String, sub_unit_id: String },
    CommandExecuted(String),
    EditorFocusChanged(String),
    OutsideClick { inside: bool },
    ArrowKey(ArrowKey),
    OpenDialog,
    ConfirmDialog,
    CancelDialog,
    TimePassed(Duration),
    Dispose,
}

impl SelectionSyncEngine {
    pub fn dispatch(&mut self, event: SelectorEvent) {
        match event {
            SelectorEvent::TextInput { text, caret } => self.on_text_input(&text, caret),
            SelectorEvent::GridSelection(selection) => self.on_grid_selection(&selection),
            SelectorEvent::FocusRequested => self.request_focus(),
            SelectorEvent::Blur => self.blur(),
            SelectorEvent::SheetSwitched {
                unit_id,
                sub_unit_id,
            } => self.on_sheet_switched(&unit_id, &sub_unit_id),
            SelectorEvent::CommandExecuted(id) => self.on_command_executed(&id),
            SelectorEvent::EditorFocusChanged(id) => self.on_editor_focus_changed(&id),
            SelectorEvent::OutsideClick { inside } => {
                self.handle_outside_click(inside);
            }
            SelectorEvent::ArrowKey(key) => {
                self.on_arrow_key(key);
            }
            SelectorEvent::OpenDialog => {
                self.open_dialog();
            }
            SelectorEvent::ConfirmDialog => {
                self.confirm_dialog();
            }
            SelectorEvent::CancelDialog => {
                self.cancel_dialog();
            }
            SelectorEvent::TimePassed(by) => self.advance_time(by),
            SelectorEvent::Dispose => self.dispose(),
        }
    }
}

/// FIFO of pending host events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<SelectorEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue::default()
    }

    pub fn push(&mut self, event: SelectorEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Dispatches every queued event in order. Returns how many ran.
    pub fn run(&mut self, engine: &mut SelectionSyncEngine) -> usize {
        let mut processed = 0;
        while let Some(event) = self.events.pop_front() {
            engine.dispatch(event);
            processed += 1;
        }
        processed
    }
}
