use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::zone::ids::{parse_suffix, SEQUENCE_WIDTH};
use crate::zone::ZoneId;

/// Unique identifier for a Route, rendered as `{zoneId}-R001`
///
/// The owning zone is part of the identifier, which is what makes route
/// sequences independent per zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RouteId {
    zone: ZoneId,
    sequence: u32,
}

impl RouteId {
    pub const SEPARATOR: &'static str = "-R";

    /// Build the id for a sequence value allocated inside `zone`
    pub fn new(zone: ZoneId, sequence: u32) -> Self {
        Self { zone, sequence }
    }

    /// Parse the canonical textual form, e.g. `Z001-R003`
    pub fn parse(raw: &str) -> Option<Self> {
        let (zone, digits) = raw.rsplit_once(Self::SEPARATOR)?;
        Some(Self {
            zone: ZoneId::parse(zone)?,
            sequence: parse_suffix(digits)?,
        })
    }

    /// The zone this route was allocated in
    pub fn zone(&self) -> &ZoneId {
        &self.zone
    }

    /// The numeric suffix within the zone
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{:0width$}",
            self.zone,
            Self::SEPARATOR,
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

impl FromStr for RouteId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("'{}' is not a route identifier", s))
    }
}

impl TryFrom<String> for RouteId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RouteId> for String {
    fn from(id: RouteId) -> Self {
        id.to_string()
    }
}
