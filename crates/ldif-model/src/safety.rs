//! Value safety rules: when a value must be written base64-encoded.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Configured encoding rules for attribute values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingRules {
    /// Values longer than this many bytes are always encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_plain_length: Option<usize>,
}

impl EncodingRules {
    /// Rules with a safety length limit.
    pub fn with_max_plain_length(max: usize) -> Self {
        Self {
            max_plain_length: Some(max),
        }
    }

    /// Returns `true` if `value` cannot be written as a plain LDIF string.
    ///
    /// A value must be encoded when it starts with a space, `:` or `<`, ends
    /// with a space, contains a byte outside printable ASCII, or exceeds the
    /// configured length. Empty values are always written plain.
    pub fn must_encode(&self, value: &[u8]) -> bool {
        let (first, last) = match (value.first(), value.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return false,
        };

        if matches!(first, b' ' | b':' | b'<') || last == b' ' {
            return true;
        }
        if let Some(max) = self.max_plain_length {
            if value.len() > max {
                return true;
            }
        }
        value.iter().any(|b| !(0x20..=0x7e).contains(b))
    }
}

/// Check a value against the default rules.
pub fn must_encode(value: &[u8]) -> bool {
    EncodingRules::default().must_encode(value)
}

/// Base64-encode a value for a `::` line.
pub fn encode_base64(value: &[u8]) -> String {
    STANDARD.encode(value)
}

/// Decode the payload of a `::` line.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded.trim_end())
}
