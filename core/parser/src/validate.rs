//! FILENAME: core/parser/src/validate.rs
//! PURPOSE: Decides whether a node sequence is a plain range value.
//! CONTEXT: The selector accepts typed text only when it is made of references
//! and nothing else. Operators, function calls and stray text all fail here.

use crate::codec::{decode, RANGE_SEPARATOR};
use crate::sequence::SequenceNode;

/// True iff the sequence is exactly one Reference node whose token decodes
/// to a non-degenerate descriptor.
pub fn is_pure_range(nodes: &[SequenceNode]) -> bool {
    match nodes {
        [SequenceNode::Reference { token, .. }] => !decode(token).is_degenerate(),
        _ => false,
    }
}

/// True iff the sequence is one or more pure ranges separated by single
/// comma literals ("A1:B2,Sheet2!C3"). A leading, trailing or doubled comma
/// fails.
pub fn is_range_list(nodes: &[SequenceNode]) -> bool {
    !nodes.is_empty() && range_groups(nodes).all(is_pure_range)
}

/// Number of comma-separated groups in the sequence.
pub fn range_count(nodes: &[SequenceNode]) -> usize {
    if nodes.is_empty() {
        return 0;
    }
    range_groups(nodes).count()
}

fn range_groups(nodes: &[SequenceNode]) -> impl Iterator<Item = &[SequenceNode]> {
    nodes.split(|node| {
        matches!(node, SequenceNode::Literal { text, .. } if text == RANGE_SEPARATOR)
    })
}
