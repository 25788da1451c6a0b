//! FILENAME: tests/common/mod.rs
//! Test harness and recording collaborators for range selector integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use range_selector::{
    Collaborators, GridSelectionSource, LocaleProvider, RangeHighlight, RangeSelectorListener,
    SelectionEvent, SelectionSyncEngine, SelectorOptions, TextEditorSurface, TextRun,
};

pub const UNIT: &str = "book1";
pub const HOME_SUB_UNIT: &str = "sheet-1";
pub const OTHER_SUB_UNIT: &str = "sheet-2";
pub const HOME_SHEET: &str = "Sheet1";

// ============================================================================
// RECORDING COLLABORATORS
// ============================================================================

#[derive(Default)]
pub struct RecordingEditor {
    pub text: RefCell<String>,
    pub caret: Cell<Option<usize>>,
    pub runs: RefCell<Vec<TextRun>>,
    pub focus_calls: Cell<usize>,
    pub blur_calls: Cell<usize>,
}

impl TextEditorSurface for RecordingEditor {
    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }
    fn set_caret(&self, offset: usize) {
        self.caret.set(Some(offset));
    }
    fn set_text_runs(&self, runs: &[TextRun]) {
        *self.runs.borrow_mut() = runs.to_vec();
    }
    fn focus(&self) {
        self.focus_calls.set(self.focus_calls.get() + 1);
    }
    fn blur(&self) {
        self.blur_calls.set(self.blur_calls.get() + 1);
    }
}

#[derive(Default)]
pub struct RecordingGrid {
    /// (unit, sub unit, single range) per begin_ref_selection
    pub claims: RefCell<Vec<(String, String, bool)>>,
    pub in_ref_selection: Cell<bool>,
    pub highlights: RefCell<Vec<RangeHighlight>>,
    pub skip_last: RefCell<Vec<bool>>,
}

impl GridSelectionSource for RecordingGrid {
    fn begin_ref_selection(&self, unit_id: &str, sub_unit_id: &str, single_range: bool) {
        self.claims
            .borrow_mut()
            .push((unit_id.to_string(), sub_unit_id.to_string(), single_range));
        self.in_ref_selection.set(true);
    }
    fn end_ref_selection(&self) {
        self.in_ref_selection.set(false);
    }
    fn set_highlights(&self, highlights: &[RangeHighlight]) {
        *self.highlights.borrow_mut() = highlights.to_vec();
    }
    fn clear_highlights(&self) {
        self.highlights.borrow_mut().clear();
    }
    fn set_skip_last_enabled(&self, enabled: bool) {
        self.skip_last.borrow_mut().push(enabled);
    }
}

impl RecordingGrid {
    pub fn highlight_count(&self) -> usize {
        self.highlights.borrow().len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Change(String),
    Verify(bool, String),
    DialogVisible(bool),
    Focus,
    Blur,
}

#[derive(Default)]
pub struct RecordingListener {
    pub notices: RefCell<Vec<Notice>>,
}

impl RangeSelectorListener for RecordingListener {
    fn on_change(&self, text: &str) {
        self.notices.borrow_mut().push(Notice::Change(text.to_string()));
    }
    fn on_verify(&self, passed: bool, text: &str) {
        self.notices
            .borrow_mut()
            .push(Notice::Verify(passed, text.to_string()));
    }
    fn on_dialog_visibility_change(&self, visible: bool) {
        self.notices.borrow_mut().push(Notice::DialogVisible(visible));
    }
    fn on_focus(&self) {
        self.notices.borrow_mut().push(Notice::Focus);
    }
    fn on_blur(&self) {
        self.notices.borrow_mut().push(Notice::Blur);
    }
}

impl RecordingListener {
    pub fn changes(&self) -> Vec<String> {
        self.notices
            .borrow()
            .iter()
            .filter_map(|n| match n {
                Notice::Change(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_verify(&self) -> Option<(bool, String)> {
        self.notices.borrow().iter().rev().find_map(|n| match n {
            Notice::Verify(passed, text) => Some((*passed, text.clone())),
            _ => None,
        })
    }

    pub fn contains(&self, notice: &Notice) -> bool {
        self.notices.borrow().contains(notice)
    }

    pub fn count(&self, notice: &Notice) -> usize {
        self.notices.borrow().iter().filter(|n| *n == notice).count()
    }

    pub fn clear(&self) {
        self.notices.borrow_mut().clear();
    }
}

/// Locale that tags every key so tests can tell it was consulted.
pub struct TaggedLocale;

impl LocaleProvider for TaggedLocale {
    fn t(&self, key: &str) -> String {
        format!("T:{}", key)
    }
}

// ============================================================================
// HARNESS
// ============================================================================

/// Test harness wiring one engine to recording collaborators.
pub struct TestHarness {
    pub engine: SelectionSyncEngine,
    pub editor: Rc<RecordingEditor>,
    pub grid: Rc<RecordingGrid>,
    pub listener: Rc<RecordingListener>,
}

impl TestHarness {
    /// Options for a selector on Sheet1 of book1, not auto-focused.
    pub fn options() -> SelectorOptions {
        SelectorOptions {
            unit_id: UNIT.to_string(),
            sub_unit_id: HOME_SUB_UNIT.to_string(),
            sheet_name: HOME_SHEET.to_string(),
            auto_focus: false,
            ..SelectorOptions::default()
        }
    }

    /// Create a harness with default options and an empty value.
    pub fn new() -> Self {
        Self::with_options(Self::options())
    }

    pub fn with_options(options: SelectorOptions) -> Self {
        let editor = Rc::new(RecordingEditor::default());
        let grid = Rc::new(RecordingGrid::default());
        let listener = Rc::new(RecordingListener::default());
        let collaborators = Collaborators::new(editor.clone(), grid.clone())
            .with_listener(listener.clone())
            .with_locale(Rc::new(TaggedLocale));
        let engine = SelectionSyncEngine::new(options, collaborators)
            .expect("test options are valid");
        TestHarness {
            engine,
            editor,
            grid,
            listener,
        }
    }

    /// Create a harness whose input already has focus.
    pub fn focused() -> Self {
        Self::focused_with(Self::options())
    }

    pub fn focused_with(options: SelectorOptions) -> Self {
        let mut harness = Self::with_options(SelectorOptions {
            auto_focus: true,
            ..options
        });
        harness.advance(30);
        harness
    }

    pub fn advance(&mut self, ms: u64) {
        self.engine.advance_time(Duration::from_millis(ms));
    }

    /// Type text with the caret at its end.
    pub fn type_text(&mut self, text: &str) {
        self.engine
            .on_text_input(text, Some(text.chars().count()));
    }

    /// Type text and let the input throttle interval pass.
    pub fn type_settled(&mut self, text: &str) {
        self.type_text(text);
        self.advance(100);
    }

    /// Grid selection on the home sheet.
    pub fn select(&mut self, text: &str, caret: Option<usize>, is_end: bool) {
        self.select_on(HOME_SUB_UNIT, text, caret, is_end);
    }

    pub fn select_on(&mut self, sub_unit_id: &str, text: &str, caret: Option<usize>, is_end: bool) {
        let event = SelectionEvent::new(UNIT, sub_unit_id, text, caret, is_end);
        self.engine.on_grid_selection(&event);
    }

    /// Open the dialog and let the open delay pass.
    pub fn open_dialog(&mut self) {
        assert!(self.engine.open_dialog());
        self.advance(30);
    }

    pub fn editor_text(&self) -> String {
        self.editor.text.borrow().clone()
    }
}
