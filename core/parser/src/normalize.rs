//! FILENAME: core/parser/src/normalize.rs
//! PURPOSE: Canonicalizes decoded range descriptors.
//! CONTEXT: A drag from B5 up to A1 decodes as B5:A1. Normalizing swaps the
//! corners per axis so start <= end, carrying the `$` markers along with the
//! coordinate they belong to. Full-row and full-column ranges only have one
//! meaningful axis; the other stays at its 0 sentinel.

use crate::descriptor::{CellRange, RangeDescriptor, RangeKind};

/// Returns a normalized copy of `descriptor`. Idempotent.
pub fn normalize(descriptor: &RangeDescriptor) -> RangeDescriptor {
    let mut normalized = descriptor.clone();
    normalized.range = normalize_range(&descriptor.range);
    normalized
}

/// Normalizes bare bounds. See `normalize`.
pub fn normalize_range(range: &CellRange) -> CellRange {
    let mut r = *range;

    match r.kind {
        RangeKind::Unknown => return r,
        RangeKind::Normal => {
            order_rows(&mut r);
            order_cols(&mut r);
            // A single cell has one set of markers
            if r.start_row == r.end_row && r.start_col == r.end_col {
                r.end_absolute = r.start_absolute;
            }
        }
        RangeKind::Rows => {
            order_rows(&mut r);
            r.start_col = 0;
            r.end_col = 0;
            r.start_absolute.col = false;
            r.end_absolute.col = false;
        }
        RangeKind::Columns => {
            order_cols(&mut r);
            r.start_row = 0;
            r.end_row = 0;
            r.start_absolute.row = false;
            r.end_absolute.row = false;
        }
    }

    r
}

fn order_rows(r: &mut CellRange) {
    if r.start_row > r.end_row {
        std::mem::swap(&mut r.start_row, &mut r.end_row);
        std::mem::swap(&mut r.start_absolute.row, &mut r.end_absolute.row);
    }
}

fn order_cols(r: &mut CellRange) {
    if r.start_col > r.end_col {
        std::mem::swap(&mut r.start_col, &mut r.end_col);
        std::mem::swap(&mut r.start_absolute.col, &mut r.end_absolute.col);
    }
}
