use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of digits in a rendered sequence suffix
pub const SEQUENCE_WIDTH: usize = 3;

/// Unique identifier for a Zone, rendered as `Z001`, `Z002`, ...
///
/// Only the numeric suffix is stored; the textual form is derived on display so
/// an id can never drift from the sequence value it was allocated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZoneId(u32);

impl ZoneId {
    pub const PREFIX: char = 'Z';

    /// Build the id for an allocated sequence value
    pub fn from_sequence(value: u32) -> Self {
        Self(value)
    }

    /// Parse the canonical textual form, rejecting anything else
    ///
    /// `Z001` and `Z1000` are accepted; `Z1`, `z001` and `Z0001` are not.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw.strip_prefix(Self::PREFIX)?;
        let value = parse_suffix(digits)?;
        Some(Self(value))
    }

    /// The numeric suffix this id was allocated from
    pub fn sequence(&self) -> u32 {
        self.0
    }
}

/// Parse a zero-padded suffix, accepting only its canonical rendering
pub(crate) fn parse_suffix(digits: &str) -> Option<u32> {
    if digits.len() < SEQUENCE_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = digits.parse().ok()?;
    (format!("{:0width$}", value, width = SEQUENCE_WIDTH) == digits).then_some(value)
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:0width$}", Self::PREFIX, self.0, width = SEQUENCE_WIDTH)
    }
}

impl FromStr for ZoneId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("'{}' is not a zone identifier", s))
    }
}

impl TryFrom<String> for ZoneId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ZoneId> for String {
    fn from(id: ZoneId) -> Self {
        id.to_string()
    }
}
