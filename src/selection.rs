//! Chosen-tool tracking with toggle semantics.

use serde::{Deserialize, Serialize};

/// An ordered, duplicate-free set of tool names chosen by the user.
///
/// Mutated only through [`SelectionSet::toggle`]: toggling an absent
/// name appends it, toggling a present name removes it. Names that no
/// longer appear in the current recommendation text are kept as-is;
/// feedback submission sends whatever is selected verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet(Vec<String>);

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `name` if present, otherwise append it at the end.
    pub fn toggle(&mut self, name: &str) {
        if let Some(pos) = self.0.iter().position(|n| n == name) {
            self.0.remove(pos);
        } else {
            self.0.push(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}
