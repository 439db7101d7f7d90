//! Serialization style options for LDIF output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Line terminator written after every physical line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSeparator {
    /// `"\n"`
    #[default]
    Lf,
    /// `"\r\n"`
    CrLf,
}

impl LineSeparator {
    /// The terminator bytes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Recognize a raw terminator as found at the end of a parsed line.
    pub fn detect(raw: &str) -> Option<Self> {
        match raw {
            "\n" => Some(Self::Lf),
            "\r\n" => Some(Self::CrLf),
            _ => None,
        }
    }
}

impl fmt::Display for LineSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lf => "lf",
            Self::CrLf => "crlf",
        };
        write!(f, "{s}")
    }
}

impl FromStr for LineSeparator {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lf" | "LF" | "\n" => Ok(Self::Lf),
            "crlf" | "CRLF" | "\r\n" => Ok(Self::CrLf),
            other => Err(ModelError::UnknownLineSeparator(other.to_string())),
        }
    }
}

/// Formatting options applied when serializing lines and records.
///
/// Created once per serialize call from the configuration source and never
/// mutated by the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatParameters {
    /// Whether to write a space after the `:` / `::` / `:<` separator.
    pub space_after_separator: bool,
    /// Maximum characters per physical line; longer lines are folded.
    /// `0` disables folding.
    pub wrap_width: usize,
    /// Terminator appended to every physical line.
    pub line_separator: LineSeparator,
}

impl FormatParameters {
    /// Line width recommended by RFC 2849 tooling.
    pub const DEFAULT_WRAP_WIDTH: usize = 76;

    /// Create a new set of format parameters.
    pub fn new(space_after_separator: bool, wrap_width: usize, line_separator: LineSeparator) -> Self {
        Self {
            space_after_separator,
            wrap_width,
            line_separator,
        }
    }

    /// Parameters that never fold lines.
    pub fn unfolded() -> Self {
        Self {
            wrap_width: 0,
            ..Default::default()
        }
    }

    /// The line terminator string.
    pub fn terminator(&self) -> &'static str {
        self.line_separator.as_str()
    }

    /// Check the parameters for values the folding rule cannot honor.
    pub fn validate(&self) -> ModelResult<()> {
        if self.wrap_width == 1 {
            return Err(ModelError::InvalidWrapWidth(self.wrap_width));
        }
        Ok(())
    }
}

impl Default for FormatParameters {
    fn default() -> Self {
        Self {
            space_after_separator: true,
            wrap_width: Self::DEFAULT_WRAP_WIDTH,
            line_separator: LineSeparator::Lf,
        }
    }
}
