//! Minimal reader for Apache-style host configuration files.
//!
//! Produces a directive tree; argument strings are kept raw and split on
//! demand with [`nth_word`].

use crate::config::ConfigError;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigNode {
    pub name: String,
    pub args: String,
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    fn new(name: &str, args: &str) -> Self {
        Self {
            name: name.to_string(),
            args: args.to_string(),
            children: Vec::new(),
        }
    }
}

pub fn load_host_config<P: AsRef<Path>>(path: P) -> Result<ConfigNode, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_host_config(&content)
}

/// Parse configuration text into a tree rooted at an unnamed node.
pub fn parse_host_config(content: &str) -> Result<ConfigNode, ConfigError> {
    let mut stack = vec![ConfigNode::default()];

    for (line_no, line) in logical_lines(content) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("</") {
            let name = rest.trim_end_matches('>').trim();
            if stack.len() < 2 {
                return Err(ConfigError::InvalidConfig(format!(
                    "line {line_no}: </{name}> without matching section"
                )));
            }
            let node = stack.pop().unwrap_or_default();
            if !node.name.eq_ignore_ascii_case(name) {
                return Err(ConfigError::InvalidConfig(format!(
                    "line {line_no}: </{name}> closes <{}>",
                    node.name
                )));
            }
            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix('<') {
            let Some(inner) = rest.strip_suffix('>') else {
                return Err(ConfigError::InvalidConfig(format!(
                    "line {line_no}: section opening lacks a closing '>'"
                )));
            };
            let (name, args) = split_directive(inner);
            stack.push(ConfigNode::new(name, args));
            continue;
        }

        let (name, args) = split_directive(line);
        if let Some(parent) = stack.last_mut() {
            parent.children.push(ConfigNode::new(name, args));
        }
    }

    if stack.len() > 1 {
        let open = stack.last().map(|n| n.name.clone()).unwrap_or_default();
        return Err(ConfigError::InvalidConfig(format!(
            "section <{open}> is never closed"
        )));
    }
    Ok(stack.pop().unwrap_or_default())
}

/// Joins backslash-continued lines. Yields the 1-based number of the first
/// physical line of each logical one.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let (start, mut buf) = pending.take().unwrap_or((idx + 1, String::new()));
        match raw.strip_suffix('\\') {
            Some(head) => {
                buf.push_str(head);
                buf.push(' ');
                pending = Some((start, buf));
            }
            None => {
                buf.push_str(raw);
                lines.push((start, buf));
            }
        }
    }
    if let Some(last) = pending {
        lines.push(last);
    }
    lines
}

fn split_directive(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (line, ""),
    }
}

/// The 1-based `n`th word of a directive's arguments.
///
/// Words are separated by whitespace; single or double quotes group a word
/// and a backslash escapes the quote character inside them.
#[must_use]
pub fn nth_word(args: &str, n: usize) -> Option<String> {
    if n == 0 {
        return None;
    }
    words(args).into_iter().nth(n - 1)
}

fn words(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut chars = args.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };

        let mut word = String::new();
        if first == '"' || first == '\'' {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '\\' && chars.peek() == Some(&first) {
                    word.push(first);
                    chars.next();
                } else if c == first {
                    break;
                } else {
                    word.push(c);
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                word.push(c);
            }
        }
        out.push(word);
    }

    out
}
