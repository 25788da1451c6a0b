//! FILENAME: core/selector/src/collaborators.rs
//! PURPOSE: Contracts of the services the selector talks to.
//! CONTEXT: The selector does not draw, edit documents or route commands.
//! The host implements these traits and hands them over once, at
//! construction. All methods take `&self`; implementations that record state
//! use interior mutability.

use std::rc::Rc;

use crate::highlight::{RangeHighlight, TextRun};

/// Command that closes every cell editor. The selector treats it as a blur.
pub const CLOSE_ALL_EDITORS_COMMAND: &str = "sheet.operation.set-cell-edit-visible";

/// Editor id of the host's normal document editor. Focus moving there does
/// not count as another editor stealing focus from the dialog.
pub const NORMAL_DOC_EDITOR_ID: &str = "__INTERNAL_EDITOR__DOCS_NORMAL";

/// The rich-text input hosting the range text.
pub trait TextEditorSurface {
    fn set_text(&self, text: &str);
    /// Collapse the caret to a character offset.
    fn set_caret(&self, offset: usize);
    /// Colour runs over the reference tokens of the current text.
    fn set_text_runs(&self, runs: &[TextRun]);
    fn focus(&self);
    fn blur(&self);
}

/// The grid: source of selection events and target of range highlights.
pub trait GridSelectionSource {
    /// Enter reference-selection mode for a sheet. With `single_range` a new
    /// selection replaces the previous one instead of adding to it.
    fn begin_ref_selection(&self, unit_id: &str, sub_unit_id: &str, single_range: bool);
    fn end_ref_selection(&self);
    fn set_highlights(&self, highlights: &[RangeHighlight]);
    fn clear_highlights(&self);
    /// While enabled, the selection overlay does not draw the last range.
    fn set_skip_last_enabled(&self, enabled: bool);
}

/// Notifications to the owner of the selector. Every method defaults to a no-op.
pub trait RangeSelectorListener {
    fn on_change(&self, _text: &str) {}
    fn on_verify(&self, _passed: bool, _text: &str) {}
    fn on_dialog_visibility_change(&self, _visible: bool) {}
    fn on_focus(&self) {}
    fn on_blur(&self) {}
}

/// Display strings for the dialog chrome.
pub trait LocaleProvider {
    fn t(&self, key: &str) -> String;
}

/// Listener that ignores everything.
pub struct NoopListener;

impl RangeSelectorListener for NoopListener {}

/// Locale that returns the key itself.
pub struct KeyLocale;

impl LocaleProvider for KeyLocale {
    fn t(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Everything a selector needs from its host, resolved once.
#[derive(Clone)]
pub struct Collaborators {
    pub editor: Rc<dyn TextEditorSurface>,
    pub grid: Rc<dyn GridSelectionSource>,
    pub listener: Rc<dyn RangeSelectorListener>,
    pub locale: Rc<dyn LocaleProvider>,
}

impl Collaborators {
    pub fn new(editor: Rc<dyn TextEditorSurface>, grid: Rc<dyn GridSelectionSource>) -> Self {
        Collaborators {
            editor,
            grid,
            listener: Rc::new(NoopListener),
            locale: Rc::new(KeyLocale),
        }
    }

    pub fn with_listener(mut self, listener: Rc<dyn RangeSelectorListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn with_locale(mut self, locale: Rc<dyn LocaleProvider>) -> Self {
        self.locale = locale;
        self
    }
}

/// Exclusive hold on the grid's reference-selection mode.
///
/// Acquiring begins reference selection; dropping clears the highlights and
/// ends it, so the grid is released on every exit path.
pub struct SelectionClaim {
    grid: Rc<dyn GridSelectionSource>,
}

impl SelectionClaim {
    pub fn acquire(
        grid: &Rc<dyn GridSelectionSource>,
        unit_id: &str,
        sub_unit_id: &str,
        single_range: bool,
    ) -> Self {
        grid.begin_ref_selection(unit_id, sub_unit_id, single_range);
        SelectionClaim {
            grid: Rc::clone(grid),
        }
    }

    pub fn highlight(&self, highlights: &[RangeHighlight]) {
        self.grid.set_highlights(highlights);
    }
}

impl Drop for SelectionClaim {
    fn drop(&mut self) {
        self.grid.clear_highlights();
        self.grid.end_ref_selection();
    }
}
