use serde::{Serialize, Serializer};

use crate::normalize::normalize;

/// Calendar month. Ordering is calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Jan = 1,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

const ABBREVIATIONS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

const FULL_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

impl Month {
    pub const ALL: [Month; 12] = [
        Self::Jan,
        Self::Feb,
        Self::Mar,
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
    ];

    pub fn number(self) -> u32 {
        self as u32
    }

    pub fn from_number(n: i64) -> Option<Self> {
        if (1..=12).contains(&n) {
            Some(Self::ALL[(n - 1) as usize])
        } else {
            None
        }
    }

    /// Three-letter label used in headers ("Ene", "Feb", ...).
    pub fn abbrev(self) -> &'static str {
        ABBREVIATIONS[self as usize - 1]
    }

    pub fn full_name(self) -> &'static str {
        FULL_NAMES[self as usize - 1]
    }

    /// Look up a three-letter prefix, case-insensitively.
    pub fn from_abbrev(prefix: &str) -> Option<Self> {
        let prefix = prefix.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.abbrev().to_lowercase() == prefix)
    }

    /// Accept a matrix header label naming a month: abbreviation or full name.
    pub fn from_header(label: &str) -> Option<Self> {
        let norm = normalize(label);
        let norm = norm.trim_end_matches('.');
        if norm.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|m| m.abbrev().to_lowercase() == norm || m.full_name() == norm)
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.abbrev())
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.abbrev())
    }
}
