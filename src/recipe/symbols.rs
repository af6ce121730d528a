// src/recipe/symbols.rs

//! Recipe symbol table and variable substitution
//!
//! Assignments are stored raw while the recipe is read. Once the whole
//! recipe has been seen, `resolve` expands `$name` and `${name}` in every
//! value against the table, so a reference may point at a variable that is
//! assigned later in the file. Expansion is recursive: the text substituted
//! for a reference is itself expanded. Unknown names expand to the empty
//! string.
//!
//! Recursion is bounded. A reference back to a symbol that is already
//! being expanded is a `SubstitutionCycle`; nesting deeper than the
//! configured limit is a `SubstitutionDepth` error.

use crate::error::{Error, Result};
use crate::recipe::tokenizer::{AssignedValue, Assignment};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::sync::LazyLock;
use tracing::trace;

static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)\}|\$(\w+)").unwrap());

/// Value of a recipe variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SymbolValue {
    Scalar(String),
    Array(Vec<String>),
}

impl SymbolValue {
    /// The scalar, or the first array element (what `$name` expands to)
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Array(items) => items.first().map(String::as_str),
        }
    }

    /// Convert to a list; a scalar becomes a one-element list
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Scalar(s) => vec![s],
            Self::Array(items) => items,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }
}

impl From<AssignedValue> for SymbolValue {
    fn from(value: AssignedValue) -> Self {
        match value {
            AssignedValue::Scalar(s) => Self::Scalar(s),
            AssignedValue::Array(items) => Self::Array(items),
        }
    }
}

/// Variables assigned at the top level of one recipe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: BTreeMap<String, SymbolValue>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an assignment; a later plain assignment replaces an earlier one
    pub fn assign(&mut self, assignment: Assignment) {
        let Assignment {
            name,
            append,
            value,
            line,
        } = assignment;
        trace!("line {}: {}{}", line, name, if append { "+=" } else { "=" });

        let value = SymbolValue::from(value);
        if !append {
            self.symbols.insert(name, value);
            return;
        }

        match self.symbols.entry(name) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(value);
            }
            btree_map::Entry::Occupied(mut entry) => {
                match (entry.get_mut(), value) {
                    (SymbolValue::Array(items), SymbolValue::Array(more)) => items.extend(more),
                    // Appending a scalar to an array appends to its first element
                    (SymbolValue::Array(items), SymbolValue::Scalar(more)) => {
                        match items.first_mut() {
                            Some(first) => first.push_str(&more),
                            None => items.push(more),
                        }
                    }
                    (SymbolValue::Scalar(s), SymbolValue::Scalar(more)) => s.push_str(&more),
                    (current, SymbolValue::Array(more)) => {
                        let mut items = std::mem::replace(current, SymbolValue::Array(Vec::new()))
                            .into_vec();
                        items.extend(more);
                        *current = SymbolValue::Array(items);
                    }
                }
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&SymbolValue> {
        self.symbols.get(name)
    }

    /// Expand variable references in every value, in place
    ///
    /// All expansions read the raw values, so the result does not depend on
    /// iteration order. On error the table is left untouched.
    pub fn resolve(&mut self, max_depth: usize) -> Result<()> {
        let mut resolved = BTreeMap::new();

        for (name, value) in &self.symbols {
            let mut stack = vec![name.clone()];
            let value = match value {
                SymbolValue::Scalar(s) => SymbolValue::Scalar(self.expand(s, &mut stack, max_depth)?),
                SymbolValue::Array(items) => SymbolValue::Array(
                    items
                        .iter()
                        .map(|item| self.expand(item, &mut stack, max_depth))
                        .collect::<Result<Vec<_>>>()?,
                ),
            };
            resolved.insert(name.clone(), value);
        }

        self.symbols = resolved;
        Ok(())
    }

    /// Expand references in `text`; `stack` holds the symbols being expanded
    fn expand(&self, text: &str, stack: &mut Vec<String>, max_depth: usize) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in REFERENCE_RE.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let Some(name) = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()) else {
                continue;
            };

            out.push_str(&text[last..whole.start()]);
            last = whole.end();

            if stack.iter().any(|s| s == name) {
                return Err(Error::SubstitutionCycle(format!(
                    "{} -> {}",
                    stack.join(" -> "),
                    name
                )));
            }

            let Some(value) = self.symbols.get(name) else {
                continue;
            };

            if stack.len() > max_depth {
                return Err(Error::SubstitutionDepth {
                    symbol: stack[0].clone(),
                    limit: max_depth,
                });
            }

            stack.push(name.to_string());
            let expanded = self.expand(value.first().unwrap_or_default(), stack, max_depth)?;
            stack.pop();
            out.push_str(&expanded);
        }

        out.push_str(&text[last..]);
        Ok(out)
    }
}

impl IntoIterator for SymbolTable {
    type Item = (String, SymbolValue);
    type IntoIter = btree_map::IntoIter<String, SymbolValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.into_iter()
    }
}
