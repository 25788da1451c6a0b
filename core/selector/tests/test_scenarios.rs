//! FILENAME: tests/test_scenarios.rs
//! End-to-end scenarios: typing, dragging and the dialog working together.

mod common;

use common::{Notice, TestHarness, HOME_SUB_UNIT, UNIT};
use range_parser::{CellRange, RangeDescriptor};
use range_selector::{DeferredAction, InitialValue, SelectionEvent, SelectorOptions, SyncState};

// ============================================================================
// CROSS-SHEET TEXT
// ============================================================================

#[test]
fn test_range_list_with_across_sheet() {
    let mut harness = TestHarness::focused_with(SelectorOptions {
        support_across_sheet: true,
        ..TestHarness::options()
    });
    harness.type_text("A1:B2,Sheet2!C3");

    let ranges = harness.engine.descriptors();
    assert_eq!(ranges.len(), 2);
    assert_eq!(ranges[0], RangeDescriptor::new(CellRange::block(0, 0, 1, 1)));
    assert_eq!(ranges[1].sheet_name, "Sheet2");
    assert_eq!(ranges[1].range, CellRange::cell(2, 2));
    assert_eq!(harness.listener.changes(), vec!["A1:B2,Sheet2!C3"]);
}

#[test]
fn test_range_list_without_across_sheet() {
    let mut harness = TestHarness::focused();
    harness.type_text("A1:B2,Sheet2!C3");

    // Parsed ranges keep the sheet; the reported value drops it
    assert_eq!(harness.engine.descriptors()[1].sheet_name, "Sheet2");
    assert_eq!(harness.listener.changes(), vec!["A1:B2,C3"]);
}

// ============================================================================
// DRAG GESTURE
// ============================================================================

#[test]
fn test_drag_end_restores_focus_and_caret() {
    let mut harness = TestHarness::focused();
    let focus_before = harness.editor.focus_calls.get();

    let event = SelectionEvent::new(UNIT, HOME_SUB_UNIT, "A1:A5", Some(5), true);
    harness.engine.on_grid_selection(&event);

    assert_eq!(harness.engine.sync_state(), SyncState::Idle);
    assert_eq!(harness.engine.text(), "A1:A5");
    assert_eq!(
        harness.engine.pending_actions(),
        vec![DeferredAction::RestoreFocus, DeferredAction::PlaceCaret(5)]
    );

    harness.advance(30);
    assert_eq!(harness.editor.focus_calls.get(), focus_before + 1);
    assert_eq!(harness.editor.caret.get(), None);

    harness.advance(20);
    assert_eq!(harness.editor.caret.get(), Some(5));
    assert!(harness.engine.pending_actions().is_empty());
}

#[test]
fn test_drag_extends_list_then_types() {
    let mut harness = TestHarness::focused();
    harness.type_settled("A1");

    // Grid appends a second range while dragging, then finishes it
    harness.select("A1,B2", Some(5), false);
    harness.select("A1,B2:C4", Some(8), true);
    assert_eq!(harness.engine.text(), "A1,B2:C4");
    assert_eq!(harness.grid.highlight_count(), 2);
    harness.advance(50);

    // The editor echoing the written text changes nothing
    harness.type_text("A1,B2:C4");
    assert_eq!(harness.engine.sync_state(), SyncState::Idle);

    harness.type_text("A1,B2:C4,D");
    assert_eq!(harness.engine.sync_state(), SyncState::EditingText);
    assert_eq!(harness.listener.last_verify(), Some((false, "A1,B2:C4,D".to_string())));

    harness.advance(100);
    harness.type_text("A1,B2:C4,D9");
    assert_eq!(
        harness.listener.changes(),
        vec!["A1", "A1,B2", "A1,B2:C4", "A1,B2:C4,D9"]
    );
}

#[test]
fn test_dispose_before_drag_settles() {
    let mut harness = TestHarness::focused();
    harness.select("A1:A5", Some(5), true);
    harness.engine.dispose();
    harness.advance(100);
    assert_eq!(harness.editor.caret.get(), None);
    assert_eq!(harness.editor.focus_calls.get(), 1);
}

// ============================================================================
// DIALOG ROUND TRIP
// ============================================================================

#[test]
fn test_only_one_range_dialog_drops_invalid_row() {
    let mut harness = TestHarness::focused_with(SelectorOptions {
        only_one_range: true,
        initial_value: InitialValue::Ranges(vec![RangeDescriptor::new(
            CellRange::block(0, 0, 1, 1),
        )]),
        ..TestHarness::options()
    });
    harness.open_dialog();
    assert_eq!(
        harness.engine.dialog().map(|d| d.row_texts().len()),
        Some(1)
    );
    assert_eq!(
        harness.engine.dialog().map(|d| d.rows()[0].text.clone()),
        Some("A1:B2".to_string())
    );

    harness
        .engine
        .dialog_mut()
        .expect("dialog open")
        .set_row_text(0, "=");
    harness.listener.clear();
    assert!(harness.engine.confirm_dialog());

    assert!(harness.engine.descriptors().is_empty());
    assert_eq!(harness.engine.text(), "");
    assert_eq!(harness.listener.changes(), vec![""]);
}

#[test]
fn test_dialog_round_trip_then_drag() {
    let mut harness = TestHarness::focused();
    harness.type_settled("A1");
    harness.open_dialog();
    harness.engine.dialog_mut().expect("dialog open").add_row();
    harness.select("C3:D4", Some(5), true);
    harness.engine.confirm_dialog();
    harness.advance(30);

    assert_eq!(harness.engine.text(), "A1,C3:D4");
    assert!(harness.engine.is_focused());
    assert_eq!(harness.engine.caret(), 8);

    // A new selection from the grid replaces the dialog's second range
    harness.select("A1,E5", Some(5), true);
    assert_eq!(harness.engine.text(), "A1,E5");
    assert_eq!(
        harness.listener.changes().last().map(String::as_str),
        Some("A1,E5")
    );
    assert_eq!(harness.listener.count(&Notice::DialogVisible(false)), 1);
}
