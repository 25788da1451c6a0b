//! FILENAME: core/selector/src/state.rs
//! PURPOSE: The selector's value: canonical text plus what is derived from it.
//! CONTEXT: The text is the single source of truth. The node sequence and
//! the descriptor list are recomputed from it on every `set_text` and are
//! never edited on their own.

use std::rc::Rc;

use once_cell::sync::Lazy;
use range_parser::{
    canonical_text, decode, is_pure_range, is_range_list, normalize, LexError, RangeDescriptor,
    SequenceCache, SequenceNode,
};
use regex::Regex;

use crate::log_debug;

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]").expect("valid line break pattern"));
static REPEATED_COMMAS: Lazy<Regex> = Lazy::new(|| Regex::new(r",{2,}").expect("valid comma pattern"));
static LEADING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^,").expect("valid leading comma pattern"));

/// Cleans raw editor text: line breaks removed, comma runs collapsed to one
/// comma, a leading comma dropped.
pub fn sanitize_input(raw: &str) -> String {
    let text = LINE_BREAKS.replace_all(raw, "");
    let text = REPEATED_COMMAS.replace_all(&text, ",");
    LEADING_COMMA.replace(&text, "").into_owned()
}

/// Result of handing new text to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed,
    /// The text was not lexically valid; the state was cleared to empty.
    Discarded(LexError),
}

#[derive(Debug)]
pub struct RangeSelectorState {
    text: String,
    nodes: Rc<[SequenceNode]>,
    descriptors: Vec<RangeDescriptor>,
    focused: bool,
    dialog_visible: bool,
    only_one_range: bool,
    support_across_sheet: bool,
    cache: SequenceCache,
}

impl RangeSelectorState {
    pub fn new(initial_text: &str, only_one_range: bool, support_across_sheet: bool) -> Self {
        let mut state = RangeSelectorState {
            text: String::new(),
            nodes: Rc::from(Vec::new()),
            descriptors: Vec::new(),
            focused: false,
            dialog_visible: false,
            only_one_range,
            support_across_sheet,
            cache: SequenceCache::new(),
        };
        state.set_text(initial_text);
        state
    }

    /// Replaces the text and recomputes nodes and descriptors.
    pub fn set_text(&mut self, text: &str) -> ParseOutcome {
        match self.cache.get(text) {
            Ok(nodes) => {
                self.descriptors = derive_descriptors(&nodes, self.support_across_sheet);
                self.nodes = nodes;
                self.text = text.to_string();
                log_debug!(
                    "STATE",
                    "text={:?} nodes={} ranges={}",
                    self.text,
                    self.nodes.len(),
                    self.descriptors.len()
                );
                ParseOutcome::Parsed
            }
            Err(e) => {
                log_debug!("STATE", "discarding {:?}: {}", text, e);
                self.clear();
                ParseOutcome::Discarded(e)
            }
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.nodes = Rc::from(Vec::new());
        self.descriptors.clear();
    }

    /// Tokenizes other text through the same cache, without touching the
    /// state. Unlexable text gives an empty sequence.
    pub fn nodes_for(&mut self, text: &str) -> Rc<[SequenceNode]> {
        self.cache.get(text).unwrap_or_else(|_| Rc::from(Vec::new()))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn nodes(&self) -> &[SequenceNode] {
        &self.nodes
    }

    pub fn shared_nodes(&self) -> Rc<[SequenceNode]> {
        Rc::clone(&self.nodes)
    }

    /// Normalized descriptors of the references in the text, in order.
    pub fn descriptors(&self) -> &[RangeDescriptor] {
        &self.descriptors
    }

    /// Whether the text is an acceptable value. Empty text is; otherwise it
    /// must be one range under only-one-range, or a comma-separated list of
    /// ranges.
    pub fn verify(&self) -> bool {
        if self.text.is_empty() {
            return true;
        }
        if self.only_one_range {
            is_pure_range(&self.nodes)
        } else {
            is_range_list(&self.nodes)
        }
    }

    /// The value to report to the owner, if the text is acceptable.
    pub fn committed_value(&self) -> Option<String> {
        if !self.verify() {
            return None;
        }
        Some(canonical_text(&self.nodes, self.support_across_sheet))
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_dialog_visible(&self) -> bool {
        self.dialog_visible
    }

    pub fn set_dialog_visible(&mut self, visible: bool) {
        self.dialog_visible = visible;
    }

    pub fn only_one_range(&self) -> bool {
        self.only_one_range
    }

    pub fn support_across_sheet(&self) -> bool {
        self.support_across_sheet
    }

    /// Focused with the dialog closed: grid selections drive the text.
    pub fn needs_sync(&self) -> bool {
        self.focused && !self.dialog_visible
    }
}

fn derive_descriptors(nodes: &[SequenceNode], support_across_sheet: bool) -> Vec<RangeDescriptor> {
    nodes
        .iter()
        .filter(|node| node.is_reference())
        .map(|node| decode(node.text()))
        .filter(|descriptor| !descriptor.is_degenerate())
        .map(|descriptor| {
            let mut descriptor = normalize(&descriptor);
            descriptor.scope_qualifiers(support_across_sheet);
            descriptor
        })
        .collect()
}
