//! Inbound SMS from the provider webhook: decode the raw form body into an [`InboundMessage`].
//!
//! Decoding never fails. Segments that cannot be used are skipped one at a time and reported
//! as [`SkippedSegment`] diagnostics alongside the message.

use crate::channels::field::{Field, FIELDS, FIELD_COUNT};
use percent_encoding::percent_decode_str;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One decoded webhook payload. Every field is optional; unset means "not in the payload".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    fields: [Option<String>; FIELD_COUNT],
}

/// Why a payload segment was dropped during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentSkip {
    /// No `=` in the segment.
    MissingSeparator,
    /// Key is not part of the webhook vocabulary.
    UnknownField,
    /// Value has a `%` not followed by two hex digits.
    MalformedEncoding,
}

/// A payload segment that was not applied to the message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkippedSegment {
    pub segment: String,
    pub reason: SegmentSkip,
}

/// Result of decoding a webhook body: the message and the segments that were skipped.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Decoded {
    pub message: InboundMessage,
    pub skipped: Vec<SkippedSegment>,
}

impl InboundMessage {
    /// Decode an `&`-joined `key=value` body. `None` yields an empty message.
    pub fn decode(raw: Option<&str>) -> Decoded {
        let mut decoded = Decoded::default();
        let Some(raw) = raw else {
            return decoded;
        };
        for segment in raw.split('&') {
            if segment.is_empty() {
                continue;
            }
            match decode_segment(segment) {
                Ok((field, value)) => decoded.message.fields[field.slot()] = Some(value),
                Err(reason) => decoded.skipped.push(SkippedSegment {
                    segment: segment.to_string(),
                    reason,
                }),
            }
        }
        decoded
    }

    /// Value of a field, if it was present in the payload.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields[field.slot()].as_deref()
    }

    /// Sender number (`From`).
    pub fn from(&self) -> Option<&str> {
        self.get(Field::From)
    }

    /// Destination number (`To`).
    pub fn destination(&self) -> Option<&str> {
        self.get(Field::To)
    }

    /// Message text (`Body`).
    pub fn body(&self) -> Option<&str> {
        self.get(Field::Body)
    }

    pub fn message_sid(&self) -> Option<&str> {
        self.get(Field::MessageSid)
    }

    /// Present fields in vocabulary order, as (wire name, value).
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        FIELDS
            .iter()
            .filter_map(move |(name, field)| self.get(*field).map(|v| (*name, v)))
    }
}

impl Serialize for InboundMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn decode_segment(segment: &str) -> Result<(Field, String), SegmentSkip> {
    let (key, value) = segment
        .split_once('=')
        .ok_or(SegmentSkip::MissingSeparator)?;
    let field = Field::from_name(key).ok_or(SegmentSkip::UnknownField)?;
    Ok((field, url_decode(value)?))
}

/// Form-decode a value: `+` is a space, `%XX` is a byte; bytes are read as UTF-8 (lossy).
fn url_decode(value: &str) -> Result<String, SegmentSkip> {
    if has_malformed_escape(value) {
        return Err(SegmentSkip::MalformedEncoding);
    }
    let spaced = value.replace('+', " ");
    Ok(percent_decode_str(&spaced).decode_utf8_lossy().into_owned())
}

fn has_malformed_escape(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3);
            match hex {
                Some(h) if h.iter().all(u8::is_ascii_hexdigit) => i += 3,
                _ => return true,
            }
        } else {
            i += 1;
        }
    }
    false
}
