use std::path::{Path, PathBuf};

/// Ordered, de-duplicated list of log files under rotation.
///
/// Relative entries are resolved against the server root, mirroring how the
/// host interprets its own log directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFileSet {
    root: Option<PathBuf>,
    paths: Vec<PathBuf>,
}

impl LogFileSet {
    #[must_use]
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            paths: Vec::new(),
        }
    }

    /// Append a path, returning `false` when it was already present.
    pub fn push(&mut self, path: impl AsRef<Path>) -> bool {
        let resolved = self.resolve(path.as_ref());
        if self.paths.contains(&resolved) {
            return false;
        }
        self.paths.push(resolved);
        true
    }

    pub fn extend<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            self.push(path);
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<'a> IntoIterator for &'a LogFileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_deduplicates_and_keeps_order() {
        let mut set = LogFileSet::new(None);
        assert!(set.push("/var/log/b.log"));
        assert!(set.push("/var/log/a.log"));
        assert!(!set.push("/var/log/b.log"));
        assert_eq!(
            set.paths(),
            &[PathBuf::from("/var/log/b.log"), PathBuf::from("/var/log/a.log")]
        );
    }

    #[test]
    fn test_relative_paths_resolve_against_root() {
        let mut set = LogFileSet::new(Some(PathBuf::from("/etc/httpd")));
        set.extend(["logs/access_log", "/var/log/error_log"]);
        assert_eq!(set.paths()[0], PathBuf::from("/etc/httpd/logs/access_log"));
        assert_eq!(set.paths()[1], PathBuf::from("/var/log/error_log"));
    }

    #[test]
    fn test_relative_and_absolute_forms_of_same_file_dedupe() {
        let mut set = LogFileSet::new(Some(PathBuf::from("/srv")));
        set.push("access.log");
        assert!(!set.push("/srv/access.log"));
        assert_eq!(set.len(), 1);
    }
}
