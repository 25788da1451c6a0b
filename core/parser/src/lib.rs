//! FILENAME: core/parser/src/lib.rs
//! PURPOSE: Library root for the range reference lexer and codec.
//! CONTEXT: This crate turns free text typed into a range input into an ordered
//! sequence of literal runs and reference tokens, and converts reference tokens
//! to and from structured range descriptors.
//!
//! PIPELINE: Input Text --> Lexer --> Tokens --> SequenceNodes --> decode --> normalize --> RangeDescriptor
//!           RangeDescriptor --> encode --> Canonical Text
//!
//! SUPPORTED REFERENCES:
//! - Cells and blocks: A1, $A$1, A1:B10
//! - Entire columns and rows: A:A, $B:$D, 1:1, $2:5
//! - Sheet qualified: Sheet1!A1, 'My Sheet'!A1:B2
//! - Unit (workbook) qualified: [Book1]Sheet1!A1, '[Book1]My Sheet'!A1

pub mod codec;
pub mod coord;
pub mod descriptor;
pub mod lexer;
pub mod normalize;
mod scan;
pub mod sequence;
pub mod token;
pub mod validate;


// Re-export commonly used types for convenience
pub use codec::{
    canonical_text, decode, descriptors_to_text, encode, encode_one, join_ranges, split_ranges,
    text_to_descriptors, RANGE_SEPARATOR,
};
pub use descriptor::{Absolute, CellRange, RangeDescriptor, RangeKind};
pub use lexer::{LexError, Lexer};
pub use normalize::{normalize, normalize_range};
pub use sequence::{node_at_offset, sequence_to_text, tokenize, SequenceCache, SequenceNode};
pub use token::{SpannedToken, Token};
pub use validate::{is_pure_range, is_range_list, range_count};
