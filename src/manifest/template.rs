//! Placeholder substitution for manifest templates
//!
//! Templates are plain YAML text with two kinds of substitution points:
//!
//! - scalar placeholders (`{NAME}`) are replaced verbatim wherever they occur
//! - block placeholders are a line holding only `{KEY}`; the line is replaced by
//!   the block's lines, indented to the placeholder's column, or dropped when the
//!   block is empty
//!
//! Values are never escaped or quoted. Callers are expected to pass
//! identifier-safe strings; anything else produces text that will not parse.

use std::collections::HashMap;

use super::{Labels, OwnerRef};

/// A manifest template being rendered
///
/// Values are collected first and substituted in a single pass over the
/// template text, so inserted text is never scanned for markers again.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    scalars: HashMap<String, String>,
    blocks: HashMap<String, Vec<String>>,
}

impl Template {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            scalars: HashMap::new(),
            blocks: HashMap::new(),
        }
    }

    /// Replace every `{key}` with `value`
    pub fn set(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.scalars.insert(key.to_string(), value.as_ref().to_string());
        self
    }

    /// Replace each line consisting only of `{key}` with `lines`
    pub fn block(mut self, key: &str, lines: &[String]) -> Self {
        self.blocks.insert(key.to_string(), lines.to_vec());
        self
    }

    /// Shorthand for the `{LABELS}` and `{OWNER_REF}` blocks every object carries
    pub fn metadata(self, labels: &Labels, owner_ref: &OwnerRef) -> Self {
        self.block("LABELS", &mapping_block("labels", labels))
            .block("OWNER_REF", &owner_ref_block(owner_ref))
    }

    pub fn render(self) -> String {
        let mut out = String::with_capacity(self.source.len());

        for line in self.source.split_inclusive('\n') {
            if let Some(block) = self.block_for(line) {
                let indent = &line[..line.len() - line.trim_start().len()];
                for block_line in block {
                    out.push_str(indent);
                    out.push_str(block_line);
                    out.push('\n');
                }
                continue;
            }
            self.substitute_into(line, &mut out);
        }

        out
    }

    fn block_for(&self, line: &str) -> Option<&Vec<String>> {
        let key = line.trim().strip_prefix('{')?.strip_suffix('}')?;
        self.blocks.get(key)
    }

    fn substitute_into(&self, line: &str, out: &mut String) {
        let mut rest = line;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let value = after
                .find('}')
                .and_then(|close| Some((close, self.scalars.get(&after[..close])?)));

            match value {
                Some((close, value)) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
    }
}

/// `field:` followed by one indented `key: value` line per entry
pub fn mapping_block(field: &str, entries: &Labels) -> Vec<String> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(format!("{}:", field));
    for (key, value) in entries {
        lines.push(format!("  {}: {}", key, value));
    }
    lines
}

/// A single `ownerReferences` entry built from the owner map
pub fn owner_ref_block(owner_ref: &OwnerRef) -> Vec<String> {
    if owner_ref.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::with_capacity(owner_ref.len() + 1);
    lines.push("ownerReferences:".to_string());
    for (i, (key, value)) in owner_ref.iter().enumerate() {
        let prefix = if i == 0 { "- " } else { "  " };
        lines.push(format!("{}{}: {}", prefix, key, value));
    }
    lines
}

/// `field:` followed by a `- name: <n>` entry per name (secrets, pull secrets)
pub fn name_list_block(field: &str, names: &[String]) -> Vec<String> {
    if names.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::with_capacity(names.len() + 1);
    lines.push(format!("{}:", field));
    for name in names {
        lines.push(format!("- name: {}", name));
    }
    lines
}

/// One `- "<arg>"` sequence entry per argument
pub fn args_block<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter()
        .map(|arg| format!("- \"{}\"", arg.as_ref()))
        .collect()
}

/// Split rendered text into block lines
pub fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
