//! FILENAME: core/parser/src/sequence.rs
//! PURPOSE: Groups lexer tokens into literal runs and reference nodes.
//! CONTEXT: This is what the selector works with. A node sequence always
//! concatenates back to the exact input: nodes are contiguous, non-overlapping
//! and in source order. Adjacent non-reference tokens are merged into one
//! literal run.
//!
//! PIPELINE: Input Text --> Lexer --> Spanned Tokens --> tokenize --> SequenceNodes

use std::collections::HashMap;
use std::rc::Rc;

use crate::lexer::{LexError, Lexer};
use crate::token::Token;

/// One segment of the input. Offsets are character positions `[start, end)`
/// in the text the node was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceNode {
    Literal {
        text: String,
        start: usize,
        end: usize,
    },
    Reference {
        token: String,
        start: usize,
        end: usize,
    },
}

impl SequenceNode {
    pub fn literal(text: impl Into<String>, start: usize, end: usize) -> Self {
        SequenceNode::Literal {
            text: text.into(),
            start,
            end,
        }
    }

    pub fn reference(token: impl Into<String>, start: usize, end: usize) -> Self {
        SequenceNode::Reference {
            token: token.into(),
            start,
            end,
        }
    }

    /// The source text of this node.
    pub fn text(&self) -> &str {
        match self {
            SequenceNode::Literal { text, .. } => text,
            SequenceNode::Reference { token, .. } => token,
        }
    }

    pub fn start(&self) -> usize {
        match self {
            SequenceNode::Literal { start, .. } | SequenceNode::Reference { start, .. } => *start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            SequenceNode::Literal { end, .. } | SequenceNode::Reference { end, .. } => *end,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, SequenceNode::Reference { .. })
    }

    /// Returns a copy of this reference carrying a different token text.
    /// Offsets are left as they were; the copy is meant for rebuilding text
    /// with `sequence_to_text`, not for offset lookups.
    pub fn with_token(&self, new_token: impl Into<String>) -> SequenceNode {
        match self {
            SequenceNode::Reference { start, end, .. } => SequenceNode::Reference {
                token: new_token.into(),
                start: *start,
                end: *end,
            },
            literal => literal.clone(),
        }
    }
}

/// Splits `text` into literal and reference nodes.
///
/// Returns an error when the text is not lexically well formed (unterminated
/// quoting, unbalanced brackets). Identical text always yields an identical
/// sequence.
pub fn tokenize(text: &str) -> Result<Vec<SequenceNode>, LexError> {
    let tokens = Lexer::new(text).tokenize()?;
    let chars: Vec<char> = text.chars().collect();

    let mut nodes = Vec::new();
    let mut literal_start: Option<usize> = None;

    for spanned in tokens {
        match spanned.token {
            Token::Reference(token) => {
                if let Some(start) = literal_start.take() {
                    let run: String = chars[start..spanned.start].iter().collect();
                    nodes.push(SequenceNode::literal(run, start, spanned.start));
                }
                nodes.push(SequenceNode::reference(token, spanned.start, spanned.end));
            }
            _ => {
                literal_start.get_or_insert(spanned.start);
            }
        }
    }

    if let Some(start) = literal_start {
        let run: String = chars[start..].iter().collect();
        nodes.push(SequenceNode::literal(run, start, chars.len()));
    }

    Ok(nodes)
}

/// Concatenates node texts back into a single string.
pub fn sequence_to_text(nodes: &[SequenceNode]) -> String {
    nodes.iter().map(SequenceNode::text).collect()
}

/// Returns the node covering character `offset`. An offset sitting exactly
/// between two nodes belongs to the node on its left, so a caret placed right
/// after "A1" finds the "A1" reference.
pub fn node_at_offset(nodes: &[SequenceNode], offset: usize) -> Option<(usize, &SequenceNode)> {
    nodes
        .iter()
        .enumerate()
        .find(|(_, node)| node.start() < offset && offset <= node.end())
        .or_else(|| nodes.first().filter(|n| n.start() == offset).map(|n| (0, n)))
}

/// Default number of distinct texts a `SequenceCache` remembers.
const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Memoizes `tokenize`. Cached sequences are handed out as shared immutable
/// slices; a caller that needs to change a node must clone it first.
#[derive(Debug)]
pub struct SequenceCache {
    entries: HashMap<String, Rc<[SequenceNode]>>,
    capacity: usize,
}

impl Default for SequenceCache {
    fn default() -> Self {
        SequenceCache::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl SequenceCache {
    pub fn new() -> Self {
        SequenceCache::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        SequenceCache {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Tokenizes `text`, reusing a previous result for the same text.
    /// Lex errors are not cached.
    pub fn get(&mut self, text: &str) -> Result<Rc<[SequenceNode]>, LexError> {
        if let Some(nodes) = self.entries.get(text) {
            return Ok(Rc::clone(nodes));
        }
        let nodes: Rc<[SequenceNode]> = tokenize(text)?.into();
        if self.entries.len() >= self.capacity {
            self.entries.clear();
        }
        self.entries.insert(text.to_string(), Rc::clone(&nodes));
        Ok(nodes)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
