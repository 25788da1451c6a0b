//! FILENAME: core/selector/src/options.rs
//! PURPOSE: Construction-time configuration of a range selector.
//! CONTEXT: Hosts usually hand these over as JSON, so every field is
//! camelCase and defaulted. Validation happens once, in `from_json` or
//! `SelectionSyncEngine::new`; the engine never re-checks at runtime.

use std::time::Duration;

use range_parser::{descriptors_to_text, RangeDescriptor};
use serde::{Deserialize, Serialize};

use crate::error::{SelectorError, SelectorResult};

/// Reference colours, assigned in order of appearance and recycled.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#4472C4", // Blue
    "#ED7D31", // Orange
    "#9B59B6", // Purple
    "#70AD47", // Green
    "#00B0F0", // Cyan
    "#FFC000", // Gold
    "#FF6B9D", // Pink
    "#00B294", // Teal
];

/// Value the selector starts with: raw text, or ranges to encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialValue {
    Text(String),
    Ranges(Vec<RangeDescriptor>),
}

impl Default for InitialValue {
    fn default() -> Self {
        InitialValue::Text(String::new())
    }
}

impl InitialValue {
    /// Text form of the value. Ranges keep their sheet and unit only when
    /// across-sheet references are supported.
    pub fn to_text(&self, support_across_sheet: bool) -> String {
        match self {
            InitialValue::Text(text) => text.clone(),
            InitialValue::Ranges(ranges) => descriptors_to_text(ranges, support_across_sheet),
        }
    }
}

/// Delays of the deferred work, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timing {
    /// Minimum spacing between two applications of live text input.
    pub input_throttle_ms: u64,
    /// Delay before focus moves back to the input (drag end, dialog close).
    pub focus_delay_ms: u64,
    /// Delay before the caret is placed after a drag ends.
    pub caret_delay_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            input_throttle_ms: 100,
            focus_delay_ms: 30,
            caret_delay_ms: 50,
        }
    }
}

impl Timing {
    pub fn input_throttle(&self) -> Duration {
        Duration::from_millis(self.input_throttle_ms)
    }

    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }

    pub fn caret_delay(&self) -> Duration {
        Duration::from_millis(self.caret_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectorOptions {
    /// Workbook whose grid selections feed this selector.
    pub unit_id: String,
    /// Sheet the selector was opened on.
    pub sub_unit_id: String,
    /// Display name of that sheet, used to tell home ranges from foreign ones.
    pub sheet_name: String,
    pub initial_value: InitialValue,
    pub only_one_range: bool,
    pub support_across_sheet: bool,
    /// Request focus right after construction.
    pub auto_focus: bool,
    pub placeholder: Option<String>,
    /// While set, the dialog cannot be opened.
    pub error_text: Option<String>,
    pub timing: Timing,
    pub palette: Vec<String>,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        SelectorOptions {
            unit_id: String::new(),
            sub_unit_id: String::new(),
            sheet_name: String::new(),
            initial_value: InitialValue::default(),
            only_one_range: false,
            support_across_sheet: false,
            auto_focus: true,
            placeholder: None,
            error_text: None,
            timing: Timing::default(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl SelectorOptions {
    /// Parse and validate options from a JSON document.
    pub fn from_json(json: &str) -> SelectorResult<Self> {
        let options: SelectorOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> SelectorResult<()> {
        if self.palette.is_empty() {
            return Err(SelectorError::InvalidOptions(
                "palette must contain at least one colour".to_string(),
            ));
        }
        if self.timing.input_throttle_ms == 0 {
            return Err(SelectorError::InvalidOptions(
                "inputThrottleMs must be greater than zero".to_string(),
            ));
        }
        if let InitialValue::Ranges(ranges) = &self.initial_value {
            // Degenerate entries are skipped when encoding; anything else must fit
            if let Some(bad) = ranges.iter().find(|d| !d.is_degenerate() && !d.is_encodable()) {
                return Err(SelectorError::InvalidOptions(format!(
                    "initialValue range out of bounds or with an invalid unit id: {:?}",
                    bad
                )));
            }
        }
        Ok(())
    }

    /// Palette colour for the n-th highlighted range.
    pub fn color(&self, index: usize) -> &str {
        palette_color(&self.palette, index)
    }

    /// Text the selector starts with.
    pub fn initial_text(&self) -> String {
        self.initial_value.to_text(self.support_across_sheet)
    }
}

/// Colour at `index`, wrapping around the palette.
pub fn palette_color(palette: &[String], index: usize) -> &str {
    if palette.is_empty() {
        return "";
    }
    &palette[index % palette.len()]
}
