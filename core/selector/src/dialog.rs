//! FILENAME: core/selector/src/dialog.rs
//! PURPOSE: The "edit ranges in a dialog" variant: one editable row per range.
//! CONTEXT: Created when the dialog opens, seeded from the selector's current
//! ranges, and dropped when it closes. Only `confirm` hands anything back;
//! a cancelled dialog is simply discarded. Dropping the controller turns the
//! grid's skip-last flag off.
//!
//! ROW RULES:
//! - There is always at least one row.
//! - Under only-one-range there is exactly one row, and add/remove do nothing.
//! - Row colours go by row position and wrap around the palette.
//! - While the focused row is empty the grid does not draw the range being
//!   selected for it (skip-last).

use std::rc::Rc;

use range_parser::{decode, encode_one, is_pure_range, normalize, split_ranges, tokenize, RangeDescriptor};

use crate::collaborators::{GridSelectionSource, LocaleProvider};
use crate::highlight::RangeHighlight;
use crate::options::{palette_color, SelectorOptions};
use crate::log_debug;

/// One editable row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRangeRow {
    pub text: String,
    pub color_index: usize,
}

/// Display strings for the dialog chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogLabels {
    pub title: String,
    pub confirm: String,
    pub cancel: String,
    pub add_another_range: String,
    pub placeholder: String,
}

impl DialogLabels {
    pub fn from_locale(locale: &dyn LocaleProvider) -> Self {
        DialogLabels {
            title: locale.t("rangeSelector.title"),
            confirm: locale.t("rangeSelector.confirm"),
            cancel: locale.t("rangeSelector.cancel"),
            add_another_range: locale.t("rangeSelector.addAnotherRange"),
            placeholder: locale.t("rangeSelector.placeHolder"),
        }
    }
}

pub struct MultiRangeDialogController {
    rows: Vec<DialogRangeRow>,
    focus_index: Option<usize>,
    only_one_range: bool,
    support_across_sheet: bool,
    palette: Vec<String>,
    grid: Rc<dyn GridSelectionSource>,
    labels: DialogLabels,
}

impl MultiRangeDialogController {
    /// Opens the dialog with one row per range. The last row gets focus.
    pub fn open(
        ranges: &[RangeDescriptor],
        options: &SelectorOptions,
        grid: Rc<dyn GridSelectionSource>,
        locale: &dyn LocaleProvider,
    ) -> Self {
        let mut texts: Vec<String> = ranges
            .iter()
            .map(|d| encode_one(d, options.support_across_sheet))
            .filter(|t| !t.is_empty())
            .collect();
        if options.only_one_range {
            texts.truncate(1);
        }

        let mut dialog = MultiRangeDialogController {
            rows: Vec::new(),
            focus_index: None,
            only_one_range: options.only_one_range,
            support_across_sheet: options.support_across_sheet,
            palette: options.palette.clone(),
            grid,
            labels: DialogLabels::from_locale(locale),
        };
        dialog.set_rows(texts);
        dialog.focus_index = Some(dialog.rows.len() - 1);
        log_debug!("DIALOG", "open rows={:?}", dialog.row_texts());

        dialog.sync_skip_last();
        dialog.refresh_highlights();
        dialog
    }

    /// Replaces all rows, recolouring by position. An empty list leaves one
    /// empty row.
    fn set_rows(&mut self, texts: Vec<String>) {
        let texts = if texts.is_empty() { vec![String::new()] } else { texts };
        self.rows = texts
            .into_iter()
            .enumerate()
            .map(|(color_index, text)| DialogRangeRow { text, color_index })
            .collect();
        if let Some(index) = self.focus_index {
            if index >= self.rows.len() {
                self.focus_index = Some(self.rows.len() - 1);
            }
        }
    }

    fn recolor(&mut self) {
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.color_index = index;
        }
    }

    pub fn rows(&self) -> &[DialogRangeRow] {
        &self.rows
    }

    pub fn row_texts(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.text.as_str()).collect()
    }

    pub fn row_color(&self, index: usize) -> Option<&str> {
        self.rows
            .get(index)
            .map(|row| palette_color(&self.palette, row.color_index))
    }

    pub fn focus_index(&self) -> Option<usize> {
        self.focus_index
    }

    pub fn labels(&self) -> &DialogLabels {
        &self.labels
    }

    pub fn can_add(&self) -> bool {
        !self.only_one_range
    }

    pub fn can_remove(&self) -> bool {
        !self.only_one_range && self.rows.len() > 1
    }

    /// Appends an empty row and focuses it.
    pub fn add_row(&mut self) -> bool {
        if !self.can_add() {
            log_debug!("DIALOG", "add_row ignored: only one range");
            return false;
        }
        self.rows.push(DialogRangeRow {
            text: String::new(),
            color_index: self.rows.len(),
        });
        self.focus_index = Some(self.rows.len() - 1);
        self.grid.set_skip_last_enabled(true);
        self.refresh_highlights();
        true
    }

    pub fn remove_row(&mut self, index: usize) -> bool {
        if !self.can_remove() || index >= self.rows.len() {
            log_debug!("DIALOG", "remove_row({}) ignored: rows={}", index, self.rows.len());
            return false;
        }
        self.rows.remove(index);
        self.recolor();
        self.focus_index = match self.focus_index {
            Some(focus) if focus == index => None,
            Some(focus) if focus > index => Some(focus - 1),
            other => other,
        };
        self.sync_skip_last();
        self.refresh_highlights();
        true
    }

    /// Text typed into a row.
    pub fn set_row_text(&mut self, index: usize, text: &str) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            log_debug!("DIALOG", "set_row_text({}) ignored: no such row", index);
            return false;
        };
        row.text = text.to_string();
        self.grid.set_skip_last_enabled(text.is_empty());
        self.refresh_highlights();
        true
    }

    /// Sets the text of the focused row.
    pub fn replace_focused(&mut self, text: &str) -> bool {
        match self.focus_index {
            Some(index) => self.set_row_text(index, text),
            None => false,
        }
    }

    pub fn focus_row(&mut self, index: usize) -> bool {
        if index >= self.rows.len() {
            return false;
        }
        self.focus_index = Some(index);
        self.sync_skip_last();
        true
    }

    pub fn blur_rows(&mut self) {
        self.focus_index = None;
    }

    /// A grid selection made while the dialog has a focused row.
    ///
    /// A single range goes into the focused row. A list replaces all rows
    /// (only its first entry under only-one-range).
    pub fn on_selection_text(&mut self, text: &str) {
        if self.focus_index.is_none() {
            return;
        }
        let mut ranges = split_ranges(text);
        if ranges.len() <= 1 {
            let single = ranges.pop().unwrap_or_default();
            self.replace_focused(&single);
            return;
        }
        if self.only_one_range {
            ranges.truncate(1);
        }
        self.set_rows(ranges);
        self.grid.set_skip_last_enabled(false);
        self.refresh_highlights();
    }

    /// Grid highlights for every non-empty row, coloured by row.
    pub fn highlights(&self) -> Vec<RangeHighlight> {
        let mut highlights = Vec::new();
        for row in &self.rows {
            if row.text.is_empty() {
                continue;
            }
            let Ok(nodes) = tokenize(&row.text) else {
                continue;
            };
            let color = palette_color(&self.palette, row.color_index);
            for node in nodes.iter().filter(|node| node.is_reference()) {
                let descriptor = decode(node.text());
                if descriptor.is_degenerate() {
                    continue;
                }
                let mut descriptor = normalize(&descriptor);
                descriptor.scope_qualifiers(self.support_across_sheet);
                highlights.push(RangeHighlight {
                    descriptor,
                    color: color.to_string(),
                    color_index: row.color_index,
                });
            }
        }
        highlights
    }

    pub fn refresh_highlights(&self) {
        self.grid.set_highlights(&self.highlights());
    }

    fn sync_skip_last(&self) {
        let empty = self
            .focus_index
            .and_then(|index| self.rows.get(index))
            .is_some_and(|row| row.text.is_empty());
        self.grid.set_skip_last_enabled(empty);
    }

    /// The ranges to commit: rows that are exactly one valid range, normalized,
    /// in row order. Other rows are dropped.
    pub fn confirm(self) -> Vec<RangeDescriptor> {
        let ranges: Vec<RangeDescriptor> = self
            .rows
            .iter()
            .filter_map(|row| {
                let nodes = tokenize(&row.text).ok()?;
                if !is_pure_range(&nodes) {
                    log_debug!("DIALOG", "confirm drops row {:?}", row.text);
                    return None;
                }
                let mut descriptor = normalize(&decode(&row.text));
                if !self.support_across_sheet {
                    descriptor.strip_qualifiers();
                }
                Some(descriptor)
            })
            .collect();
        log_debug!("DIALOG", "confirm ranges={}", ranges.len());
        ranges
    }
}

impl Drop for MultiRangeDialogController {
    fn drop(&mut self) {
        // However the dialog goes away, the grid draws every range again
        self.grid.set_skip_last_enabled(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::KeyLocale;
    use range_parser::CellRange;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Grid {
        skip_last: RefCell<Vec<bool>>,
        highlights: RefCell<Vec<RangeHighlight>>,
    }

    impl GridSelectionSource for Grid {
        fn begin_ref_selection(&self, _: &str, _: &str, _: bool) {}
        fn end_ref_selection(&self) {}
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

    fn open(ranges: &[RangeDescriptor], only_one_range: bool) -> (MultiRangeDialogController, Rc<Grid>) {
        let grid = Rc::new(Grid::default());
        let options = SelectorOptions {
            only_one_range,
            ..SelectorOptions::default()
        };
        let dialog = MultiRangeDialogController::open(ranges, &options, grid.clone(), &KeyLocale);
        (dialog, grid)
    }

    fn a1_b2() -> RangeDescriptor {
        RangeDescriptor::new(CellRange::block(0, 0, 1, 1))
    }

    fn c3() -> RangeDescriptor {
        RangeDescriptor::new(CellRange::cell(2, 2))
    }

    #[test]
    fn test_open_seeds_rows_and_focuses_last() {
        let (dialog, grid) = open(&[a1_b2(), c3()], false);
        assert_eq!(dialog.row_texts(), vec!["A1:B2", "C3"]);
        assert_eq!(dialog.focus_index(), Some(1));
        assert_eq!(dialog.rows()[1].color_index, 1);
        assert_eq!(grid.highlights.borrow().len(), 2);
        assert_eq!(dialog.labels().title, "rangeSelector.title");
    }

    #[test]
    fn test_open_empty_has_one_empty_row() {
        let (dialog, grid) = open(&[], false);
        assert_eq!(dialog.row_texts(), vec![""]);
        assert_eq!(dialog.focus_index(), Some(0));
        assert_eq!(grid.skip_last.borrow().last(), Some(&true));
    }

    #[test]
    fn test_only_one_range_keeps_first() {
        let (mut dialog, _) = open(&[a1_b2(), c3()], true);
        assert_eq!(dialog.row_texts(), vec!["A1:B2"]);
        assert!(!dialog.add_row());
        assert!(!dialog.remove_row(0));
        assert_eq!(dialog.rows().len(), 1);
    }

    #[test]
    fn test_add_focuses_new_row() {
        let (mut dialog, grid) = open(&[a1_b2()], false);
        assert!(dialog.add_row());
        assert_eq!(dialog.row_texts(), vec!["A1:B2", ""]);
        assert_eq!(dialog.focus_index(), Some(1));
        assert_eq!(grid.skip_last.borrow().last(), Some(&true));
    }

    #[test]
    fn test_remove_keeps_one_row() {
        let (mut dialog, _) = open(&[a1_b2(), c3()], false);
        assert!(dialog.remove_row(0));
        assert_eq!(dialog.row_texts(), vec!["C3"]);
        assert_eq!(dialog.rows()[0].color_index, 0);
        assert_eq!(dialog.focus_index(), Some(0));
        assert!(!dialog.remove_row(0));
        assert_eq!(dialog.rows().len(), 1);
    }

    #[test]
    fn test_remove_out_of_range() {
        let (mut dialog, _) = open(&[a1_b2(), c3()], false);
        assert!(!dialog.remove_row(5));
        assert_eq!(dialog.rows().len(), 2);
    }

    #[test]
    fn test_set_row_text_toggles_skip_last() {
        let (mut dialog, grid) = open(&[a1_b2()], false);
        assert!(dialog.set_row_text(0, ""));
        assert_eq!(grid.skip_last.borrow().last(), Some(&true));
        assert!(grid.highlights.borrow().is_empty());
        assert!(dialog.set_row_text(0, "D4"));
        assert_eq!(grid.skip_last.borrow().last(), Some(&false));
        assert_eq!(grid.highlights.borrow().len(), 1);
        assert!(!dialog.set_row_text(3, "A1"));
    }

    #[test]
    fn test_selection_replaces_focused_row() {
        let (mut dialog, _) = open(&[a1_b2(), c3()], false);
        dialog.focus_row(0);
        dialog.on_selection_text("E5:F6");
        assert_eq!(dialog.row_texts(), vec!["E5:F6", "C3"]);
    }

    #[test]
    fn test_selection_list_replaces_rows() {
        let (mut dialog, _) = open(&[a1_b2()], false);
        dialog.on_selection_text("A1:B2,C3,D4");
        assert_eq!(dialog.row_texts(), vec!["A1:B2", "C3", "D4"]);
        assert_eq!(dialog.rows()[2].color_index, 2);
    }

    #[test]
    fn test_selection_ignored_without_focus() {
        let (mut dialog, _) = open(&[a1_b2()], false);
        dialog.blur_rows();
        dialog.on_selection_text("C3");
        assert_eq!(dialog.row_texts(), vec!["A1:B2"]);
    }

    #[test]
    fn test_confirm_filters_and_normalizes() {
        let (mut dialog, grid) = open(&[a1_b2()], false);
        dialog.add_row();
        dialog.set_row_text(1, "=");
        dialog.add_row();
        dialog.set_row_text(2, "Sheet2!D4:C3");
        let ranges = dialog.confirm();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0], a1_b2());
        assert_eq!(ranges[1].range, CellRange::block(2, 2, 3, 3));
        assert_eq!(ranges[1].sheet_name, "");
        assert_eq!(grid.skip_last.borrow().last(), Some(&false));
    }

    #[test]
    fn test_confirm_keeps_sheet_across_sheet() {
        let grid = Rc::new(Grid::default());
        let options = SelectorOptions {
            support_across_sheet: true,
            ..SelectorOptions::default()
        };
        let mut dialog = MultiRangeDialogController::open(&[], &options, grid, &KeyLocale);
        dialog.set_row_text(0, "Sheet2!C3");
        let ranges = dialog.confirm();
        assert_eq!(ranges[0].sheet_name, "Sheet2");
    }

    #[test]
    fn test_drop_turns_skip_last_off() {
        let (dialog, grid) = open(&[], false);
        assert_eq!(grid.skip_last.borrow().last(), Some(&true));
        drop(dialog);
        assert_eq!(grid.skip_last.borrow().last(), Some(&false));
    }

    #[test]
    fn test_highlights_drop_unit_without_sheet() {
        let (mut dialog, grid) = open(&[], false);
        dialog.set_row_text(0, "[Book]A1");
        let highlights = grid.highlights.borrow();
        assert_eq!(highlights.len(), 1);
        assert!(highlights[0].descriptor.unit_id.is_empty());
    }

    #[test]
    fn test_row_colors_wrap() {
        let ranges: Vec<RangeDescriptor> =
            (0..10).map(|i| RangeDescriptor::new(CellRange::cell(i, 0))).collect();
        let (dialog, _) = open(&ranges, false);
        assert_eq!(dialog.row_color(0), dialog.row_color(8));
        assert_ne!(dialog.row_color(0), dialog.row_color(1));
    }
}
