use super::host_config::{ConfigNode, nth_word};
use crate::domain::DirectiveMap;
use crate::port::DirectiveScanner;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Walks the whole host configuration tree collecting log file arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeScanner;

impl DirectiveScanner for TreeScanner {
    fn scan(&self, root: &ConfigNode, directives: &DirectiveMap) -> Vec<PathBuf> {
        let mut found = Vec::new();
        visit(root, directives, &mut found);
        found
    }
}

fn visit(node: &ConfigNode, directives: &DirectiveMap, found: &mut Vec<PathBuf>) {
    for child in &node.children {
        if let Some(position) = directives.position(&child.name) {
            match nth_word(&child.args, position) {
                Some(word) if word.starts_with('|') => {
                    debug!("Ignoring piped log {word}");
                }
                Some(word) => {
                    info!("Log file for directive [{}] found: [{word}]", child.name);
                    let path = PathBuf::from(word);
                    if !found.contains(&path) {
                        found.push(path);
                    }
                }
                None => warn!("No filename found for directive {}", child.name),
            }
        }
        visit(child, directives, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::host_config::parse_host_config;
    use tracing_test::traced_test;

    const HOST_CONFIG: &str = r#"
ErrorLog logs/error_log
CustomLog "|/usr/sbin/rotatelogs /var/log/access 86400" common
transferlog /var/log/transfer.log
<VirtualHost *:443>
    CustomLog /var/log/ssl_access.log combined
    JkLogFile /var/log/mod_jk.log
    ErrorLog logs/error_log
</VirtualHost>
ScriptLog
"#;

    #[traced_test]
    #[test]
    fn test_scan_collects_builtin_directives_recursively() {
        let root = parse_host_config(HOST_CONFIG).unwrap();
        let found = TreeScanner.scan(&root, &DirectiveMap::with_builtins());

        assert_eq!(
            found,
            vec![
                PathBuf::from("logs/error_log"),
                PathBuf::from("/var/log/transfer.log"),
                PathBuf::from("/var/log/ssl_access.log"),
            ]
        );
        assert!(logs_contain("No filename found for directive ScriptLog"));
    }

    #[test]
    fn test_registered_directive_uses_its_position() {
        let root = parse_host_config(HOST_CONFIG).unwrap();
        let mut directives = DirectiveMap::new();
        directives.register("JkLogFile", 1);
        directives.register("CustomLog", 2);

        let found = TreeScanner.scan(&root, &directives);

        assert_eq!(
            found,
            vec![
                PathBuf::from("common"),
                PathBuf::from("combined"),
                PathBuf::from("/var/log/mod_jk.log"),
            ]
        );
    }
}
