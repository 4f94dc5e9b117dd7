use serde::{Deserialize, Serialize};

/// Ordered set of trigger keywords.
///
/// Entries are trimmed and lower-cased on insert, so two inputs that differ
/// only in case or surrounding whitespace map to the same keyword. Insertion
/// order is preserved. Deserializing goes through [`KeywordSet::add`], so a
/// stored list gets the same normalization as typed input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Adds `raw` after normalizing it. Returns `false` when the input was
    /// blank or already present.
    pub fn add(&mut self, raw: &str) -> bool {
        let keyword = Self::normalize(raw);
        if keyword.is_empty() || self.contains(&keyword) {
            return false;
        }
        self.keywords.push(keyword);
        true
    }

    /// Removes the keyword at `index`. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.keywords.len() {
            Some(self.keywords.remove(index))
        } else {
            None
        }
    }

    pub fn contains(&self, raw: &str) -> bool {
        let keyword = Self::normalize(raw);
        self.keywords.iter().any(|k| *k == keyword)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.keywords
    }
}

impl<'a> FromIterator<&'a str> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for raw in iter {
            set.add(raw);
        }
        set
    }
}

impl From<Vec<String>> for KeywordSet {
    fn from(raw: Vec<String>) -> Self {
        raw.iter().map(String::as_str).collect()
    }
}

impl From<KeywordSet> for Vec<String> {
    fn from(set: KeywordSet) -> Self {
        set.keywords
    }
}
