//! FILENAME: core/selector/src/selection.rs
//! PURPOSE: Grid selection events and the text they carry.
//! CONTEXT: The grid reports a selection as the whole new range text plus a
//! caret offset. `compose_selection_text` is the helper a grid source uses to
//! produce that text from the current sequence and the range just selected.

use range_parser::{encode_one, node_at_offset, sequence_to_text, RangeDescriptor, SequenceNode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEvent {
    pub unit_id: String,
    pub sub_unit_id: String,
    pub text: String,
    pub caret_offset: Option<usize>,
    /// The pointer was released; the gesture is over.
    pub is_end: bool,
}

impl SelectionEvent {
    pub fn new(
        unit_id: impl Into<String>,
        sub_unit_id: impl Into<String>,
        text: impl Into<String>,
        caret_offset: Option<usize>,
        is_end: bool,
    ) -> Self {
        SelectionEvent {
            unit_id: unit_id.into(),
            sub_unit_id: sub_unit_id.into(),
            text: text.into(),
            caret_offset,
            is_end,
        }
    }
}

/// What `compose_selection_text` needs to know about the selector.
#[derive(Debug, Clone, Copy)]
pub struct ComposeContext<'a> {
    pub only_one_range: bool,
    pub support_across_sheet: bool,
    /// Name of the sheet the selector belongs to.
    pub home_sheet: &'a str,
}

/// Builds the text of a selection event for a newly selected range.
///
/// Under only-one-range the new range replaces everything. Otherwise the
/// reference under the caret is replaced, or the range is appended after a
/// comma. The sheet is written only for ranges on another sheet, and only
/// when across-sheet references are supported. Returns the text and the
/// caret offset just after the inserted reference.
pub fn compose_selection_text(
    nodes: &[SequenceNode],
    caret: Option<usize>,
    selected: &RangeDescriptor,
    ctx: ComposeContext<'_>,
) -> (String, usize) {
    let foreign = !selected.sheet_name.is_empty() && selected.sheet_name != ctx.home_sheet;
    let reference = encode_one(selected, ctx.support_across_sheet && foreign);
    let reference_len = reference.chars().count();

    if ctx.only_one_range || nodes.is_empty() {
        return (reference, reference_len);
    }

    let under_caret = caret
        .and_then(|offset| node_at_offset(nodes, offset))
        .filter(|(_, node)| node.is_reference());

    if let Some((index, node)) = under_caret {
        let caret_after = node.start() + reference_len;
        let mut rebuilt = nodes.to_vec();
        rebuilt[index] = node.with_token(reference);
        return (sequence_to_text(&rebuilt), caret_after);
    }

    let mut text = sequence_to_text(nodes);
    if !text.ends_with(',') {
        text.push(',');
    }
    text.push_str(&reference);
    let caret_after = text.chars().count();
    (text, caret_after)
}
