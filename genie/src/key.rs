use std::fmt;

/// Cache key for location searches.
///
/// Only constructible through [`SearchKey::normalize`], so every key that
/// reaches the store has been trimmed and case-folded. Place-detail lookups
/// deliberately do not go through this type: place names come from our own
/// generated output and are matched exactly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchKey(String);

impl SearchKey {
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
