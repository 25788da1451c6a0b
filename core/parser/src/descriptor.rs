//! FILENAME: core/parser/src/descriptor.rs
//! PURPOSE: Structured form of a (possibly sheet/unit qualified) range reference.
//! CONTEXT: The codec decodes reference tokens into these descriptors and encodes
//! them back to canonical text. Indices are 0-based; row 0 is "1" and column 0 is "A".

use serde::{Deserialize, Serialize};

use crate::coord::{MAX_COLUMNS, MAX_ROWS};

/// Shape of a referenced range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeKind {
    /// Decode failure sentinel. All indices are zero and the descriptor is degenerate.
    #[default]
    Unknown,
    /// A rectangular block of cells: A1, A1:B10.
    Normal,
    /// Entire rows: 1:1, $2:$5. Column indices are unused and kept at 0.
    Rows,
    /// Entire columns: A:A, $B:D. Row indices are unused and kept at 0.
    Columns,
}

/// `$` markers for one corner of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Absolute {
    pub row: bool,
    pub col: bool,
}

impl Absolute {
    pub fn new(row: bool, col: bool) -> Self {
        Absolute { row, col }
    }
}

/// Rectangular bounds plus per-corner absolute flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
    #[serde(default)]
    pub start_absolute: Absolute,
    #[serde(default)]
    pub end_absolute: Absolute,
    #[serde(default)]
    pub kind: RangeKind,
}

impl CellRange {
    /// A single cell at (row, col) with relative markers.
    pub fn cell(row: u32, col: u32) -> Self {
        CellRange {
            start_row: row,
            start_col: col,
            end_row: row,
            end_col: col,
            kind: RangeKind::Normal,
            ..Default::default()
        }
    }

    /// A cell block between two corners, as given (not normalized).
    pub fn block(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        CellRange {
            start_row,
            start_col,
            end_row,
            end_col,
            kind: RangeKind::Normal,
            ..Default::default()
        }
    }

    /// Entire rows `start_row..=end_row` (0-based).
    pub fn rows(start_row: u32, end_row: u32) -> Self {
        CellRange {
            start_row,
            end_row,
            kind: RangeKind::Rows,
            ..Default::default()
        }
    }

    /// Entire columns `start_col..=end_col` (0-based).
    pub fn columns(start_col: u32, end_col: u32) -> Self {
        CellRange {
            start_col,
            end_col,
            kind: RangeKind::Columns,
            ..Default::default()
        }
    }

    pub fn with_absolute(mut self, start: Absolute, end: Absolute) -> Self {
        self.start_absolute = start;
        self.end_absolute = end;
        self
    }

    pub fn is_single_cell(&self) -> bool {
        self.kind == RangeKind::Normal
            && self.start_row == self.end_row
            && self.start_col == self.end_col
    }
}

/// A range reference with optional workbook (unit) and sheet qualification.
/// Empty `unit_id` means the current workbook; empty `sheet_name` means the current sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeDescriptor {
    #[serde(default)]
    pub unit_id: String,
    #[serde(default)]
    pub sheet_name: String,
    pub range: CellRange,
}

impl RangeDescriptor {
    pub fn new(range: CellRange) -> Self {
        RangeDescriptor {
            unit_id: String::new(),
            sheet_name: String::new(),
            range,
        }
    }

    pub fn on_sheet(sheet_name: impl Into<String>, range: CellRange) -> Self {
        RangeDescriptor {
            unit_id: String::new(),
            sheet_name: sheet_name.into(),
            range,
        }
    }

    pub fn with_unit(mut self, unit_id: impl Into<String>) -> Self {
        self.unit_id = unit_id.into();
        self
    }

    /// True for the decode failure sentinel.
    pub fn is_degenerate(&self) -> bool {
        self.range.kind == RangeKind::Unknown
    }

    /// Whether every bound the kind uses fits the sheet: rows below
    /// `MAX_ROWS`, columns below `MAX_COLUMNS`. Rows ranges ignore columns and
    /// columns ranges ignore rows.
    pub fn in_bounds(&self) -> bool {
        let rows = self.range.start_row < MAX_ROWS && self.range.end_row < MAX_ROWS;
        let cols = self.range.start_col < MAX_COLUMNS && self.range.end_col < MAX_COLUMNS;
        match self.range.kind {
            RangeKind::Unknown => false,
            RangeKind::Normal => rows && cols,
            RangeKind::Rows => rows,
            RangeKind::Columns => cols,
        }
    }

    /// Whether the descriptor has a text form that reads back as itself.
    /// Out of bounds ranges and unit ids with brackets have none.
    pub fn is_encodable(&self) -> bool {
        self.in_bounds() && !self.unit_id.contains(['[', ']'])
    }

    /// Clears a unit that has no sheet next to it, unless cross-sheet
    /// references are supported.
    pub fn scope_qualifiers(&mut self, support_across_sheet: bool) {
        if !support_across_sheet && self.sheet_name.is_empty() {
            self.unit_id.clear();
        }
    }

    /// Drops sheet and unit qualification together. A descriptor never keeps a
    /// unit without its sheet.
    pub fn strip_qualifiers(&mut self) {
        self.sheet_name.clear();
        self.unit_id.clear();
    }

    /// Same rows, columns, kind and absolute flags, ignoring qualifiers.
    pub fn same_bounds(&self, other: &RangeDescriptor) -> bool {
        self.range == other.range
    }
}
