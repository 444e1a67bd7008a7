//! Display-name to engine-code mapping for the selectable target languages.

use std::collections::HashMap;

/// Languages offered out of the box, in display order.
const BUILTIN_LANGUAGES: &[(&str, &str)] = &[
    ("English", "en"),
    ("Hindi", "hi"),
    ("Arabic", "ar"),
    ("Spanish", "es"),
    ("Bengali", "bn"),
    ("French", "fr"),
];

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    pub name: String,
    pub code: String,
}

/// Read-only language catalog.
///
/// Built once at startup and shared behind an `Arc`; there is no interior
/// mutability, so concurrent lookups need no locking.
#[derive(Debug, Clone, Default)]
pub struct LanguageCatalog {
    entries: Vec<LanguageEntry>,
    by_name: HashMap<String, usize>,
}

impl LanguageCatalog {
    /// The catalog shipped with the application.
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_LANGUAGES.iter().copied())
    }

    /// Build a catalog from `(display_name, engine_code)` pairs.
    ///
    /// A later pair with an already-seen name replaces the earlier code but
    /// keeps its original position.
    pub fn from_pairs<I, N, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        Self::default().with_extra(pairs)
    }

    /// Extend the catalog, overriding codes for names that already exist.
    pub fn with_extra<I, N, C>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        for (name, code) in pairs {
            let name = name.into();
            let code = code.into();
            match self.by_name.get(&name) {
                Some(&idx) => self.entries[idx].code = code,
                None => {
                    self.by_name.insert(name.clone(), self.entries.len());
                    self.entries.push(LanguageEntry { name, code });
                }
            }
        }
        self
    }

    /// Resolve a display name to its engine code.
    pub fn lookup(&self, display_name: &str) -> Option<&str> {
        self.by_name
            .get(display_name)
            .map(|&idx| self.entries[idx].code.as_str())
    }

    /// Reverse lookup: first display name registered for `code`.
    pub fn name_for_code(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.code.eq_ignore_ascii_case(code))
            .map(|e| e.name.as_str())
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.by_name.contains_key(display_name)
    }

    /// Display names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn entries(&self) -> &[LanguageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
