//! Generated type names for resolved tools.

use std::collections::BTreeSet;

/// `buffer_analysis` -> `BufferAnalysisTool`.
///
/// Letters after a non-letter start a word and are upper-cased, the rest are
/// lower-cased; separators (anything not alphanumeric) are dropped.
pub fn generated_name(tool_name: &str) -> String {
    let mut name = String::with_capacity(tool_name.len() + 4);
    let mut word_started = false;
    for c in tool_name.chars() {
        if c.is_alphabetic() {
            if word_started {
                name.extend(c.to_lowercase());
            } else {
                name.extend(c.to_uppercase());
            }
            word_started = true;
        } else {
            if c.is_alphanumeric() {
                name.push(c);
            }
            word_started = false;
        }
    }
    name.push_str("Tool");
    name
}

/// Hands out unique generated names within one toolbox
#[derive(Debug, Default)]
pub struct NameAllocator {
    taken: BTreeSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The generated name for `tool_name`, with a numeric suffix (`FooTool2`)
    /// if an earlier tool already holds it
    pub fn allocate(&mut self, tool_name: &str) -> String {
        let base = generated_name(tool_name);
        if self.taken.insert(base.clone()) {
            return base;
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.taken.insert(candidate.clone()) {
                log::warn!(
                    "Generated name '{}' already in use; tool '{}' registered as '{}'",
                    base,
                    tool_name,
                    candidate
                );
                return candidate;
            }
            n += 1;
        }
    }
}
