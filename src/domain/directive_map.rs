use std::collections::HashMap;

/// Directives known to name a log file, with the 1-based argument position
/// that holds the file name.
pub const BUILTIN_DIRECTIVES: &[(&str, usize)] = &[
    ("ErrorLog", 1),
    ("CustomLog", 1),
    ("CookieLog", 1),
    ("TransferLog", 1),
    ("ForensicLog", 1),
    ("RewriteLog", 1),
    ("ScriptLog", 1),
];

/// Ordered directive-name to argument-position mapping.
///
/// Names match case-insensitively. Registering a name twice keeps the first
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveMap {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl DirectiveMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_builtins() -> Self {
        let mut map = Self::new();
        for (name, position) in BUILTIN_DIRECTIVES {
            map.register(*name, *position);
        }
        map
    }

    /// Returns `false` when the name was already registered.
    pub fn register(&mut self, name: impl Into<String>, position: usize) -> bool {
        let name = name.into();
        let key = name.to_ascii_lowercase();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push((name, position));
        true
    }

    #[must_use]
    pub fn position(&self, directive: &str) -> Option<usize> {
        self.index
            .get(&directive.to_ascii_lowercase())
            .map(|&i| self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, pos)| (name.as_str(), *pos))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
