//! No-op update detection
//!
//! An update request is compared field by field against the persisted entity.
//! Services refuse to write when nothing differs, and use the change set to
//! decide whether the uniqueness guard must run before anything is applied.

use std::collections::BTreeSet;
use std::fmt;

/// A mutable field of a zone or route
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    AreaCoverage,
    PickupPoints,
    EstimatedTime,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::AreaCoverage => "areaCoverage",
            Field::PickupPoints => "pickupPoints",
            Field::EstimatedTime => "estimatedTime",
        };
        f.write_str(name)
    }
}

/// The set of fields an update would change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    fields: BTreeSet<Field>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `field` when `changed` holds
    pub fn track(mut self, field: Field, changed: bool) -> Self {
        if changed {
            self.fields.insert(field);
        }
        self
    }

    pub fn is_changed(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().copied()
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.fields().map(|field| field.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Compare an update request against the persisted entity `T`
pub trait ChangeDetector<T> {
    fn diff(&self, existing: &T) -> ChangeSet;
}
