//! Region identifiers and the state code ↔ display-name table.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Serialize, Serializer};

use crate::CoreError;

/// Code of the whole-nation sentinel region.
pub const NATION_CODE: &str = "US";

const NATION_NAME: &str = "United States";

const STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

static GLOBAL_TABLE: LazyLock<RegionTable> = LazyLock::new(RegionTable::new);

/// A geographic partition: one state, or the nation as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Region {
    Nation,
    /// Upper-cased state code. Codes outside the table are kept as-is.
    State(String),
}

impl Region {
    /// The region's code (`"US"` for the nation).
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Region::Nation => NATION_CODE,
            Region::State(code) => code,
        }
    }

    #[must_use]
    pub fn is_nation(&self) -> bool {
        matches!(self, Region::Nation)
    }

    /// True when a record's state code belongs to this region.
    ///
    /// The nation contains everything, including records with no state code.
    #[must_use]
    pub fn contains_code(&self, state: Option<&str>) -> bool {
        match self {
            Region::Nation => true,
            Region::State(code) => state.is_some_and(|s| s.trim().eq_ignore_ascii_case(code)),
        }
    }
}

impl std::str::FromStr for Region {
    type Err = CoreError;

    /// Accepts `"US"` and the legacy `"all"` as the nation sentinel.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::InvalidRegion(s.to_string()));
        }
        if trimmed.eq_ignore_ascii_case(NATION_CODE) || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Region::Nation);
        }
        Ok(Region::State(trimmed.to_ascii_uppercase()))
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Bidirectional lookup between state codes and display names.
#[derive(Debug, Clone)]
pub struct RegionTable {
    by_code: HashMap<&'static str, &'static str>,
    by_name: HashMap<String, &'static str>,
}

impl RegionTable {
    #[must_use]
    pub fn new() -> Self {
        let by_code = STATES.iter().copied().collect();
        let by_name = STATES
            .iter()
            .map(|(code, name)| (name.to_uppercase(), *code))
            .collect();
        Self { by_code, by_name }
    }

    /// Process-wide table, built on first use.
    #[must_use]
    pub fn global() -> &'static RegionTable {
        &GLOBAL_TABLE
    }

    /// Full display name for a region.
    ///
    /// Codes absent from the table fall back to the code itself.
    #[must_use]
    pub fn display_name<'a>(&self, region: &'a Region) -> &'a str {
        match region {
            Region::Nation => NATION_NAME,
            Region::State(code) => match self.by_code.get(code.as_str()) {
                Some(&name) => name,
                None => code.as_str(),
            },
        }
    }

    /// State code for a full name, case-insensitively. The nation is not
    /// reverse-mapped.
    #[must_use]
    pub fn code_for_name(&self, name: &str) -> Option<&'static str> {
        self.by_name.get(&name.trim().to_uppercase()).copied()
    }

    /// True for codes present in the table (the nation sentinel included).
    #[must_use]
    pub fn is_known(&self, region: &Region) -> bool {
        match region {
            Region::Nation => true,
            Region::State(code) => self.by_code.contains_key(code.as_str()),
        }
    }

    /// Number of state-level entries (50 states + DC).
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "regions_test.rs"]
mod tests;
