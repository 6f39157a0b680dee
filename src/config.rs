/// Knobs that influence traversal planning.
///
/// The planner itself holds no global state; callers construct one of these
/// at startup and pass it into every planning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Whether the underlying matrix store keeps a transposed copy of every
    /// relationship matrix. When it does, flipping an expression is free and
    /// the transpose penalty is skipped entirely.
    pub maintain_transpose: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            maintain_transpose: false,
        }
    }
}

impl PlannerConfig {
    /// Configuration for stores that maintain transposed relationship
    /// matrices alongside the primary ones.
    pub fn with_transpose_matrices() -> Self {
        Self {
            maintain_transpose: true,
        }
    }
}
