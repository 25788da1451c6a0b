//! FILENAME: core/parser/src/codec.rs
//! PURPOSE: Converts between reference token text and RangeDescriptors.
//! CONTEXT: `decode` never fails: unrecognized text yields the degenerate
//! sentinel descriptor, which the validator rejects. `encode` produces the
//! canonical text form; when qualifiers are not wanted it drops unit and sheet
//! even if the descriptor has them.
//!
//! CANONICAL FORM:
//! - Cell:      A1, $A$1, A$1
//! - Block:     A1:B10
//! - Rows:      1:5, $1:$5
//! - Columns:   A:C, $A:$C
//! - Qualified: Sheet1!A1, 'My Sheet'!A1, [Book1]Sheet1!A1
//! - Lists are joined with ','.

use crate::coord::index_to_col;
use crate::descriptor::{Absolute, RangeDescriptor, RangeKind};
use crate::normalize::normalize;
use crate::scan::{is_sheet_char, scan_reference};
use crate::sequence::{sequence_to_text, SequenceNode};

/// Separator between ranges in a range list.
pub const RANGE_SEPARATOR: &str = ",";

/// Parses one reference token. Surrounding whitespace is ignored; anything
/// else that is not a complete reference yields `RangeDescriptor::default()`.
pub fn decode(token: &str) -> RangeDescriptor {
    let chars: Vec<char> = token.trim().chars().collect();
    match scan_reference(&chars, 0) {
        Ok(Some(scanned)) if scanned.end == chars.len() => scanned.into_descriptor(),
        _ => RangeDescriptor::default(),
    }
}

/// Encodes each descriptor to its canonical text, one string per descriptor.
/// Degenerate and unencodable descriptors (see `RangeDescriptor::is_encodable`)
/// encode to an empty string.
pub fn encode(descriptors: &[RangeDescriptor], include_unit_and_sheet: bool) -> Vec<String> {
    descriptors
        .iter()
        .map(|d| encode_one(d, include_unit_and_sheet))
        .collect()
}

/// Encodes a single descriptor. See `encode`.
pub fn encode_one(descriptor: &RangeDescriptor, include_unit_and_sheet: bool) -> String {
    if !descriptor.is_encodable() {
        return String::new();
    }
    let range = &descriptor.range;
    let body = match range.kind {
        RangeKind::Unknown => return String::new(),
        RangeKind::Normal => {
            let start = cell_text(range.start_row, range.start_col, range.start_absolute);
            if range.is_single_cell() && range.start_absolute == range.end_absolute {
                start
            } else {
                let end = cell_text(range.end_row, range.end_col, range.end_absolute);
                format!("{}:{}", start, end)
            }
        }
        RangeKind::Rows => format!(
            "{}{}:{}{}",
            dollar(range.start_absolute.row),
            range.start_row + 1,
            dollar(range.end_absolute.row),
            range.end_row + 1
        ),
        RangeKind::Columns => format!(
            "{}{}:{}{}",
            dollar(range.start_absolute.col),
            index_to_col(range.start_col),
            dollar(range.end_absolute.col),
            index_to_col(range.end_col)
        ),
    };

    // A unit is only expressible together with its sheet
    if !include_unit_and_sheet || descriptor.sheet_name.is_empty() {
        return body;
    }

    let unit = if descriptor.unit_id.is_empty() {
        String::new()
    } else {
        format!("[{}]", descriptor.unit_id)
    };
    format!("{}{}!{}", unit, quote_sheet_name(&descriptor.sheet_name), body)
}

fn dollar(absolute: bool) -> &'static str {
    if absolute { "$" } else { "" }
}

fn cell_text(row: u32, col: u32, absolute: Absolute) -> String {
    format!(
        "{}{}{}{}",
        dollar(absolute.col),
        index_to_col(col),
        dollar(absolute.row),
        row + 1
    )
}

/// Quotes a sheet name when it could not be read back unquoted.
/// Single quotes inside the name are doubled.
pub fn quote_sheet_name(name: &str) -> String {
    let plain = name.chars().all(is_sheet_char)
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && decode(name).is_degenerate();
    if plain {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// Joins encoded ranges into a range list, skipping empty entries.
pub fn join_ranges<S: AsRef<str>>(texts: &[S]) -> String {
    texts
        .iter()
        .map(AsRef::as_ref)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(RANGE_SEPARATOR)
}

/// Splits a range list on commas that are outside quotes and brackets.
/// Empty entries are dropped.
pub fn split_ranges(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut bracket_depth = 0usize;

    for ch in text.chars() {
        match ch {
            '\'' => in_quote = !in_quote,
            '[' if !in_quote => bracket_depth += 1,
            ']' if !in_quote => bracket_depth = bracket_depth.saturating_sub(1),
            ',' if !in_quote && bracket_depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    parts.push(current);

    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Encodes a descriptor list straight to range list text.
pub fn descriptors_to_text(descriptors: &[RangeDescriptor], include_unit_and_sheet: bool) -> String {
    join_ranges(&encode(descriptors, include_unit_and_sheet))
}

/// Decodes every entry of a range list.
pub fn text_to_descriptors(text: &str) -> Vec<RangeDescriptor> {
    split_ranges(text).iter().map(|t| decode(t)).collect()
}

/// Rebuilds text with every reference in canonical, normalized form.
///
/// Each reference node is cloned before its token is replaced, so a shared
/// (cached) sequence is never modified. Literal nodes are kept verbatim.
/// Without across-sheet support the unit and sheet are dropped.
pub fn canonical_text(nodes: &[SequenceNode], support_across_sheet: bool) -> String {
    let rebuilt: Vec<SequenceNode> = nodes
        .iter()
        .map(|node| match node {
            SequenceNode::Reference { token, .. } => {
                let mut descriptor = decode(token);
                if descriptor.is_degenerate() {
                    return node.clone();
                }
                descriptor = normalize(&descriptor);
                if !support_across_sheet {
                    descriptor.strip_qualifiers();
                }
                node.with_token(encode_one(&descriptor, support_across_sheet))
            }
            literal => literal.clone(),
        })
        .collect();
    sequence_to_text(&rebuilt)
}
