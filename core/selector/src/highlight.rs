//! FILENAME: core/selector/src/highlight.rs
//! PURPOSE: Colours reference tokens in the text and their ranges on the grid.
//! CONTEXT: Colours go by order of appearance: the n-th reference gets palette
//! entry n (wrapping). The same index is used for the text run and the grid
//! highlight, so a token and its range always match.

use range_parser::{decode, normalize, RangeDescriptor, SequenceNode};
use serde::Serialize;

use crate::options::palette_color;

/// A coloured span of the input text. Offsets are character positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub start: usize,
    pub end: usize,
    pub color: String,
}

/// A range to outline on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeHighlight {
    pub descriptor: RangeDescriptor,
    pub color: String,
    pub color_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlights {
    pub text_runs: Vec<TextRun>,
    pub ranges: Vec<RangeHighlight>,
}

/// Builds the text runs and grid highlights for a node sequence.
/// References that do not decode get neither. A unit without a sheet is
/// dropped unless cross-sheet references are supported.
pub fn build_highlights(
    nodes: &[SequenceNode],
    palette: &[String],
    support_across_sheet: bool,
) -> Highlights {
    let mut highlights = Highlights::default();

    for node in nodes {
        let SequenceNode::Reference { token, start, end } = node else {
            continue;
        };
        let descriptor = decode(token);
        if descriptor.is_degenerate() {
            continue;
        }

        let color_index = highlights.ranges.len();
        let color = palette_color(palette, color_index).to_string();
        highlights.text_runs.push(TextRun {
            start: *start,
            end: *end,
            color: color.clone(),
        });
        let mut descriptor = normalize(&descriptor);
        descriptor.scope_qualifiers(support_across_sheet);
        highlights.ranges.push(RangeHighlight {
            descriptor,
            color,
            color_index,
        });
    }

    highlights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DEFAULT_PALETTE;
    use range_parser::{tokenize, CellRange};

    fn palette() -> Vec<String> {
        DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_colors_follow_appearance() {
        let nodes = tokenize("B2:A1,Sheet2!C3").unwrap();
        let h = build_highlights(&nodes, &palette(), false);

        assert_eq!(h.text_runs.len(), 2);
        assert_eq!((h.text_runs[0].start, h.text_runs[0].end), (0, 5));
        assert_eq!((h.text_runs[1].start, h.text_runs[1].end), (6, 15));
        assert_eq!(h.text_runs[0].color, "#4472C4");
        assert_eq!(h.text_runs[1].color, "#ED7D31");

        // Grid highlights are normalized
        assert_eq!(h.ranges[0].descriptor.range, CellRange::block(0, 0, 1, 1));
        assert_eq!(h.ranges[1].descriptor.sheet_name, "Sheet2");
        assert_eq!(h.ranges[1].color_index, 1);
    }

    #[test]
    fn test_literals_get_no_highlight() {
        let nodes = tokenize("=SUM(A1)").unwrap();
        let h = build_highlights(&nodes, &palette(), false);
        assert_eq!(h.text_runs.len(), 1);
        assert_eq!(h.text_runs[0].start, 5);
        assert_eq!(h.text_runs[0].end, 7);
    }

    #[test]
    fn test_unit_without_sheet_not_highlighted_with_unit() {
        let nodes = tokenize("[Book]A1").unwrap();
        let h = build_highlights(&nodes, &palette(), false);
        assert_eq!(h.ranges.len(), 1);
        assert!(h.ranges[0].descriptor.unit_id.is_empty());

        let h = build_highlights(&nodes, &palette(), true);
        assert_eq!(h.ranges[0].descriptor.unit_id, "Book");
    }

    #[test]
    fn test_palette_wraps() {
        let two = vec!["red".to_string(), "blue".to_string()];
        let nodes = tokenize("A1,A2,A3").unwrap();
        let h = build_highlights(&nodes, &two, false);
        let colors: Vec<&str> = h.text_runs.iter().map(|r| r.color.as_str()).collect();
        assert_eq!(colors, vec!["red", "blue", "red"]);
    }
}
