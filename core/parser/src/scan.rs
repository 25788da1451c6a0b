//! FILENAME: core/parser/src/scan.rs
//! PURPOSE: Character-level grammar for a single range reference.
//! CONTEXT: Shared by the lexer (to cut reference tokens out of free text) and by
//! the codec (to decode one token). Works on a char slice so all offsets are
//! character positions, matching the offsets stored in sequence nodes.
//!
//! GRAMMAR:
//!   reference  --> [unit] [sheet "!"] part [":" part]
//!   unit       --> "[" any-but-"]" "]"
//!   sheet      --> QUOTED | SHEET_CHARS+
//!   part       --> ["$"] LETTERS ["$"] DIGITS     // cell, A1 / $A$1
//!                | ["$"] LETTERS                  // column, only inside A:B
//!                | ["$"] DIGITS                   // row, only inside 1:5
//!
//! A reference must end on a boundary: the next char may not continue an
//! identifier or open a call, so "SUM(" and "AB12C" are never references.

use crate::coord::{col_to_index, row_to_index};
use crate::descriptor::{Absolute, CellRange, RangeDescriptor};
use crate::lexer::LexError;

/// One side of a reference after the optional qualifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Part {
    Cell {
        row: u32,
        col: u32,
        row_abs: bool,
        col_abs: bool,
    },
    Column {
        col: u32,
        abs: bool,
    },
    Row {
        row: u32,
        abs: bool,
    },
}

/// A reference recognized at some offset, with its exclusive end offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScannedReference {
    pub end: usize,
    pub unit: Option<String>,
    pub sheet: Option<String>,
    pub first: Part,
    pub second: Option<Part>,
}

impl ScannedReference {
    pub(crate) fn into_descriptor(self) -> RangeDescriptor {
        let range = match (self.first, self.second) {
            (
                Part::Cell {
                    row,
                    col,
                    row_abs,
                    col_abs,
                },
                None,
            ) => {
                let abs = Absolute::new(row_abs, col_abs);
                CellRange::cell(row, col).with_absolute(abs, abs)
            }
            (
                Part::Cell {
                    row: r1,
                    col: c1,
                    row_abs: ra1,
                    col_abs: ca1,
                },
                Some(Part::Cell {
                    row: r2,
                    col: c2,
                    row_abs: ra2,
                    col_abs: ca2,
                }),
            ) => CellRange::block(r1, c1, r2, c2)
                .with_absolute(Absolute::new(ra1, ca1), Absolute::new(ra2, ca2)),
            (Part::Column { col: c1, abs: a1 }, Some(Part::Column { col: c2, abs: a2 })) => {
                CellRange::columns(c1, c2)
                    .with_absolute(Absolute::new(false, a1), Absolute::new(false, a2))
            }
            (Part::Row { row: r1, abs: a1 }, Some(Part::Row { row: r2, abs: a2 })) => {
                CellRange::rows(r1, r2)
                    .with_absolute(Absolute::new(a1, false), Absolute::new(a2, false))
            }
            // scan_reference never pairs mismatched parts
            _ => return RangeDescriptor::default(),
        };

        RangeDescriptor {
            unit_id: self.unit.unwrap_or_default(),
            sheet_name: self.sheet.unwrap_or_default(),
            range,
        }
    }
}

/// Characters allowed in an unquoted sheet name.
pub(crate) fn is_sheet_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.'
}

/// Characters that would continue an identifier right after a reference.
fn continues_identifier(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.' || ch == '(' || ch == '$'
}

/// Reads a single-quoted name starting at `start` (which must be `'`).
/// Doubled quotes are an escaped quote. Returns the unescaped name and the
/// offset just past the closing quote.
pub(crate) fn read_quoted(chars: &[char], start: usize) -> Result<(String, usize), LexError> {
    let mut name = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                name.push('\'');
                i += 2;
                continue;
            }
            return Ok((name, i + 1));
        }
        name.push(chars[i]);
        i += 1;
    }
    Err(LexError::UnterminatedQuote { offset: start })
}

/// Reads a `[unit]` prefix starting at `start` (which must be `[`).
pub(crate) fn read_unit(chars: &[char], start: usize) -> Result<(String, usize), LexError> {
    let close = chars[start + 1..]
        .iter()
        .position(|&c| c == ']')
        .map(|p| start + 1 + p)
        .ok_or(LexError::UnbalancedBracket { offset: start })?;
    let unit: String = chars[start + 1..close].iter().collect();
    if unit.contains('[') {
        return Err(LexError::UnbalancedBracket { offset: start });
    }
    Ok((unit, close + 1))
}

/// Reads one part (cell, column or row) starting at `start`.
fn scan_part(chars: &[char], start: usize) -> Option<(Part, usize)> {
    let mut i = start;
    let leading_abs = chars.get(i) == Some(&'$');
    if leading_abs {
        i += 1;
    }

    let letters_start = i;
    while i < chars.len() && chars[i].is_ascii_alphabetic() {
        i += 1;
    }
    let letters: String = chars[letters_start..i].iter().collect();

    let row_abs = !letters.is_empty() && chars.get(i) == Some(&'$');
    let digits_start = if row_abs { i + 1 } else { i };
    let mut j = digits_start;
    while j < chars.len() && chars[j].is_ascii_digit() {
        j += 1;
    }
    let digits: String = chars[digits_start..j].iter().collect();

    match (letters.is_empty(), digits.is_empty()) {
        (false, false) => Some((
            Part::Cell {
                row: row_to_index(&digits)?,
                col: col_to_index(&letters)?,
                row_abs,
                col_abs: leading_abs,
            },
            j,
        )),
        // "A$" without a row is not a column
        (false, true) if !row_abs => Some((
            Part::Column {
                col: col_to_index(&letters)?,
                abs: leading_abs,
            },
            i,
        )),
        (true, false) => Some((
            Part::Row {
                row: row_to_index(&digits)?,
                abs: leading_abs,
            },
            j,
        )),
        _ => None,
    }
}

fn parts_compatible(first: &Part, second: &Part) -> bool {
    matches!(
        (first, second),
        (Part::Cell { .. }, Part::Cell { .. })
            | (Part::Column { .. }, Part::Column { .. })
            | (Part::Row { .. }, Part::Row { .. })
    )
}

/// Tries to read a reference starting at `start`.
///
/// Returns `Ok(None)` when the text at `start` is not a reference, and an error
/// only for lexically broken input (an unterminated quote or unclosed bracket
/// that a reference prefix would have to consume).
pub(crate) fn scan_reference(
    chars: &[char],
    start: usize,
) -> Result<Option<ScannedReference>, LexError> {
    let mut i = start;

    let mut unit = None;
    if chars.get(i) == Some(&'[') {
        let (name, after) = read_unit(chars, i)?;
        unit = Some(name);
        i = after;
    }

    let mut sheet = None;
    if chars.get(i) == Some(&'\'') {
        let (mut name, after) = read_quoted(chars, i)?;
        if chars.get(after) != Some(&'!') {
            return Ok(None);
        }
        // Excel style '[Book]Sheet'!A1 keeps the unit inside the quotes
        if unit.is_none() && name.starts_with('[') {
            if let Some(close) = name.find(']') {
                unit = Some(name[1..close].to_string());
                name = name[close + 1..].to_string();
            }
        }
        sheet = Some(name);
        i = after + 1;
    } else {
        let mut j = i;
        while j < chars.len() && is_sheet_char(chars[j]) {
            j += 1;
        }
        if j > i && chars.get(j) == Some(&'!') {
            sheet = Some(chars[i..j].iter().collect());
            i = j + 1;
        }
    }

    let Some((first, after_first)) = scan_part(chars, i) else {
        return Ok(None);
    };

    let mut end = after_first;
    let mut second = None;
    if chars.get(after_first) == Some(&':') {
        if let Some((part, after_second)) = scan_part(chars, after_first + 1) {
            if parts_compatible(&first, &part) {
                second = Some(part);
                end = after_second;
            }
        }
    }

    // Bare columns and rows are only references as the two ends of A:B / 1:5
    if second.is_none() && !matches!(first, Part::Cell { .. }) {
        return Ok(None);
    }

    if chars.get(end).is_some_and(|&c| continues_identifier(c)) {
        return Ok(None);
    }

    Ok(Some(ScannedReference {
        end,
        unit,
        sheet,
        first,
        second,
    }))
}
