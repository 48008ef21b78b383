//! Structured response decoder
//!
//! Recovers one JSON value (object, array, or bare scalar) from free-form text
//! returned by a text-generation provider. Providers tend to wrap the JSON in
//! code fences, surround it with prose, or emit raw line breaks inside string
//! values; the decoder tolerates all three.
//!
//! # Pipeline
//! 1. Strip code fences (`` ```json `` and `` ``` ``)
//! 2. Locate the outermost container: the earlier of the first `{` / `[`
//!    picks the bracket family, the slice runs to the last matching closer
//! 3. Parse the slice as-is
//! 4. Escape raw line breaks inside string literals, re-parse
//!
//! Stage 4 only runs when stage 3 fails. When both fail the caller receives a
//! [`DecodeError`] holding the original raw text.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use thiserror::Error;

/// Provider text could not be turned into JSON
#[derive(Debug, Clone, Error)]
#[error("Failed to decode provider response: {reason}")]
pub struct DecodeError {
    /// Original provider text, before any cleanup or repair
    pub raw: String,
    /// Parser message from the last attempted stage
    pub reason: String,
}

impl DecodeError {
    fn new(raw: &str, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parse attempts, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// Parse the located slice unchanged
    Direct,
    /// Parse after escaping raw line breaks inside strings
    LineBreakRepair,
}

impl DecodeStage {
    /// All parse stages in fallback order
    pub const ORDER: [DecodeStage; 2] = [DecodeStage::Direct, DecodeStage::LineBreakRepair];

    fn prepare<'a>(&self, candidate: &'a str) -> Cow<'a, str> {
        match self {
            DecodeStage::Direct => Cow::Borrowed(candidate),
            DecodeStage::LineBreakRepair => Cow::Owned(repair_line_breaks(candidate)),
        }
    }
}

/// Decoder for JSON embedded in generated text
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredResponseDecoder;

impl StructuredResponseDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode raw provider text into an untyped JSON value
    ///
    /// # Errors
    /// Returns [`DecodeError`] carrying `raw` when no stage yields valid JSON.
    pub fn decode_value(&self, raw: &str) -> Result<Value, DecodeError> {
        let cleaned = strip_code_fences(raw);
        let candidate = locate_container(&cleaned);

        let mut last_error = String::from("empty response");
        for stage in DecodeStage::ORDER {
            let prepared = stage.prepare(candidate);
            match serde_json::from_str::<Value>(&prepared) {
                Ok(value) => {
                    tracing::debug!(?stage, raw_len = raw.len(), "Decoded provider response");
                    return Ok(value);
                }
                Err(e) => {
                    tracing::debug!(?stage, error = %e, "Decode stage failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(DecodeError::new(raw, last_error))
    }

    /// Decode raw provider text straight into `T`
    ///
    /// A value that parses as JSON but does not fit `T` is also a
    /// [`DecodeError`].
    pub fn decode<T: DeserializeOwned>(&self, raw: &str) -> Result<T, DecodeError> {
        let value = self.decode_value(raw)?;
        serde_json::from_value(value).map_err(|e| DecodeError::new(raw, e.to_string()))
    }
}

/// Remove `` ```json `` (any case) and bare `` ``` `` markers
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        if rest
            .get(..4)
            .map(|tag| tag.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
        {
            rest = &rest[4..];
        }
    }
    out.push_str(rest);
    out
}

/// Slice out the outermost JSON object or array
///
/// Falls back to the trimmed text when neither `{` nor `[` occurs, so bare
/// scalars still reach the parser. A missing closer leaves the slice open to
/// the end of the text.
pub fn locate_container(text: &str) -> &str {
    let (start, closer) = match (text.find('{'), text.find('[')) {
        (Some(obj), Some(arr)) if arr < obj => (arr, ']'),
        (Some(obj), _) => (obj, '}'),
        (None, Some(arr)) => (arr, ']'),
        (None, None) => return text.trim(),
    };

    match text.rfind(closer) {
        Some(end) if end > start => &text[start..=end],
        _ => &text[start..],
    }
}

/// Escape raw line breaks found inside JSON string literals
///
/// Each `\n`, `\r\n` or `\r` inside a string becomes the two-character escape
/// `\n`, and the spaces/tabs that follow it are dropped. Line breaks between
/// tokens are valid JSON whitespace and are left alone.
pub fn repair_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }

        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
                while matches!(chars.peek(), Some(' ') | Some('\t')) {
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }

    out
}
