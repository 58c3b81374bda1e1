//! Engine configuration.

use serde::Deserialize;

/// Default bound on tree depth accepted by the evaluator
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Settings for [`crate::expression::Evaluator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// Deepest tree the evaluator will walk. The root is at depth 1.
    pub max_depth: usize,
}

impl EvaluatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
