//! FILENAME: core/parser/src/coord.rs
//! PURPOSE: Utilities for converting between A1-style axis labels and indices.
//! CONTEXT: Range descriptors store 0-based (row, col) indices. Reference text
//! uses column letters ("A", "AA") and 1-based row numbers.
//! Column "A" = 0, "B" = 1, ..., "Z" = 25, "AA" = 26, etc.
//! Row 1 in A1 notation = row 0 internally.

/// Largest sheet height accepted in a reference (rows 1..=1048576).
pub const MAX_ROWS: u32 = 1_048_576;

/// Largest sheet width accepted in a reference (columns A..=XFD).
pub const MAX_COLUMNS: u32 = 16_384;

/// Converts a column string (e.g., "A", "aa", "XFD") to a 0-based column index.
/// Returns None for empty input, non-letters, or columns past XFD.
pub fn col_to_index(col_str: &str) -> Option<u32> {
    if col_str.is_empty() || col_str.len() > 3 {
        return None;
    }
    let mut result: u32 = 0;
    for c in col_str.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result * 26 + digit;
    }
    if result > MAX_COLUMNS {
        return None;
    }
    Some(result - 1)
}

/// Converts a 0-based column index to a column string.
/// 0 -> "A", 1 -> "B", ..., 25 -> "Z", 26 -> "AA", 27 -> "AB", etc.
pub fn index_to_col(mut col_index: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col_index % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }
    result
}

/// Converts a 1-based row number string ("1", "100") to a 0-based row index.
/// Returns None for row 0, non-digits, overflow, or rows past the sheet height.
pub fn row_to_index(row_str: &str) -> Option<u32> {
    if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let row: u32 = row_str.parse().ok()?;
    if row == 0 || row > MAX_ROWS {
        return None;
    }
    Some(row - 1)
}
