use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Stop at the first error.
    FailFast,
    /// Keep going, resynchronising the stack to each offending line.
    #[default]
    CollectAll,
}

/// Knobs for one validation run.
///
/// Deserializable so collaborators can load it from a config file; missing
/// fields fall back to [`ValidatorOptions::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    pub mode: RunMode,
    /// Accept a bare sequence as the whole document (`- a` at indent 0).
    pub allow_top_level_sequence: bool,
    /// Reject nodes whose children mix mapping entries and sequence items.
    pub strict_sibling_homogeneity: bool,
    /// Keep every closed node in the tree. When false, a node and its subtree
    /// are released as soon as it has been validated, so memory follows the
    /// open path rather than the document size.
    pub retain_tree: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            mode: RunMode::CollectAll,
            allow_top_level_sequence: false,
            strict_sibling_homogeneity: true,
            retain_tree: true,
        }
    }
}

impl ValidatorOptions {
    pub fn fail_fast() -> Self {
        Self {
            mode: RunMode::FailFast,
            ..Self::default()
        }
    }

    pub fn is_fail_fast(&self) -> bool {
        self.mode == RunMode::FailFast
    }
}
