//! Text redaction renderer

use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{RedactionZone, RenderError, Result, ZoneSet};

lazy_static! {
    static ref WORD_CHAR: Regex = Regex::new(r"\w").unwrap();
}

/// How the text of a zone is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionStyle {
    /// Every character becomes the replacement character
    #[default]
    ReplaceAll,
    /// Only letters, digits and underscores become the replacement character
    ReplaceAlphanumeric,
    /// The zone becomes a literal string
    FixedText,
    /// The zone is kept and wrapped in `<tag>...</tag>`
    TagWrap,
}

/// Style plus its parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRedactionOptions {
    #[serde(default)]
    pub style: RedactionStyle,
    /// `None` deletes the characters that would have been replaced
    #[serde(default = "default_replacement_char")]
    pub replacement_char: Option<char>,
    /// Upper bound of random extra replacement characters (`ReplaceAll` only)
    #[serde(default)]
    pub extra_chars: Option<usize>,
    #[serde(default = "default_fixed_text")]
    pub fixed_text: String,
    #[serde(default = "default_tag")]
    pub tag: String,
}

fn default_replacement_char() -> Option<char> {
    Some('X')
}

fn default_fixed_text() -> String {
    "[REDACTED]".to_string()
}

fn default_tag() -> String {
    "Redacted".to_string()
}

impl Default for TextRedactionOptions {
    fn default() -> Self {
        Self {
            style: RedactionStyle::ReplaceAll,
            replacement_char: default_replacement_char(),
            extra_chars: None,
            fixed_text: default_fixed_text(),
            tag: default_tag(),
        }
    }
}

impl TextRedactionOptions {
    pub fn replace_all(replacement_char: Option<char>) -> Self {
        Self {
            style: RedactionStyle::ReplaceAll,
            replacement_char,
            ..Default::default()
        }
    }

    pub fn replace_alphanumeric(replacement_char: Option<char>) -> Self {
        Self {
            style: RedactionStyle::ReplaceAlphanumeric,
            replacement_char,
            ..Default::default()
        }
    }

    pub fn fixed_text(text: impl Into<String>) -> Self {
        Self {
            style: RedactionStyle::FixedText,
            fixed_text: text.into(),
            ..Default::default()
        }
    }

    pub fn tag_wrap(tag: impl Into<String>) -> Self {
        Self {
            style: RedactionStyle::TagWrap,
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_extra_chars(mut self, max_extra: usize) -> Self {
        self.extra_chars = Some(max_extra);
        self
    }
}

/// Maps character indices of the original text to positions in the text
/// being rewritten. Indices inside an already rewritten zone map to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRemap {
    positions: Vec<Option<usize>>,
}

impl IndexRemap {
    pub fn new(len: usize) -> Self {
        Self {
            positions: (0..len).map(Some).collect(),
        }
    }

    /// Current position of an original index
    pub fn position(&self, original: usize) -> Option<usize> {
        self.positions.get(original).copied().flatten()
    }

    /// Record that `zone` was replaced by `replacement_len` characters
    pub fn replace(&mut self, zone: RedactionZone, replacement_len: usize) {
        let removed = zone.len();
        for index in zone.start..=zone.end.min(self.positions.len().saturating_sub(1)) {
            self.positions[index] = None;
        }
        for position in self.positions.iter_mut().skip(zone.end + 1).flatten() {
            *position = *position + replacement_len - removed;
        }
    }
}

/// Applies a redaction style to zones of a text
pub struct TextRedactor<R = StdRng> {
    options: TextRedactionOptions,
    rng: R,
}

impl TextRedactor<StdRng> {
    pub fn new(options: TextRedactionOptions) -> Self {
        Self::with_rng(options, StdRng::from_entropy())
    }

    /// Redactor whose padding is reproducible
    pub fn seeded(options: TextRedactionOptions, seed: u64) -> Self {
        Self::with_rng(options, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TextRedactor<R> {
    pub fn with_rng(options: TextRedactionOptions, rng: R) -> Self {
        Self { options, rng }
    }

    pub fn options(&self) -> &TextRedactionOptions {
        &self.options
    }

    /// Merge `zones` and rewrite each of them in `text`
    pub fn redact(&mut self, text: &str, zones: &[RedactionZone]) -> Result<String> {
        let merged: ZoneSet = zones.iter().copied().collect();
        self.redact_merged(text, &merged)
    }

    /// Rewrite already merged zones; zones are processed in set order
    pub fn redact_merged(&mut self, text: &str, zones: &ZoneSet) -> Result<String> {
        let mut buffer: Vec<char> = text.chars().collect();
        let mut remap = IndexRemap::new(buffer.len());

        for zone in zones.zones() {
            let start = remap
                .position(zone.start)
                .ok_or(RenderError::MissingIndex { index: zone.start })?;
            let end = remap
                .position(zone.end)
                .ok_or(RenderError::MissingIndex { index: zone.end })?;

            let original: String = buffer[start..=end].iter().collect();
            let replacement: Vec<char> = self.replacement(&original).chars().collect();
            let replacement_len = replacement.len();

            buffer.splice(start..=end, replacement);
            remap.replace(*zone, replacement_len);
        }

        debug!(
            zones = zones.len(),
            style = ?self.options.style,
            "redacted text"
        );
        Ok(buffer.into_iter().collect())
    }

    fn replacement(&mut self, original: &str) -> String {
        let options = &self.options;
        match options.style {
            RedactionStyle::ReplaceAll => match options.replacement_char {
                Some(c) => {
                    let extra = match options.extra_chars {
                        Some(max) => self.rng.gen_range(0..=max),
                        None => 0,
                    };
                    std::iter::repeat_n(c, original.chars().count() + extra).collect()
                }
                None => String::new(),
            },
            RedactionStyle::ReplaceAlphanumeric => {
                let with = options
                    .replacement_char
                    .map(String::from)
                    .unwrap_or_default();
                WORD_CHAR
                    .replace_all(original, NoExpand(&with))
                    .into_owned()
            }
            RedactionStyle::FixedText => options.fixed_text.clone(),
            RedactionStyle::TagWrap => {
                format!("<{tag}>{original}</{tag}>", tag = options.tag)
            }
        }
    }
}
