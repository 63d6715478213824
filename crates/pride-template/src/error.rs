//! Error types for the template layer.

/// Errors from building a catalog or rendering a template.
///
/// The catalog variants are startup-time defects: they mean the
/// template definitions shipped with the deployment are inconsistent.
/// [`ArgumentCount`](TemplateError::ArgumentCount) is a caller error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// Two catalog entries share an identifier.
    #[error("duplicate template id: {0}")]
    DuplicateId(String),

    /// The declared parameter count disagrees with the placeholders
    /// actually present in the body.
    #[error("template {id} declares {declared} parameters but its body uses {found}")]
    ParamCountMismatch {
        id: String,
        declared: usize,
        found: usize,
    },

    /// The body's placeholder indices don't run `1..=n` without gaps.
    #[error("template {id} placeholders are not contiguous from 1 (found {indices:?})")]
    NonContiguous { id: String, indices: Vec<usize> },

    /// A render request supplied the wrong number of values.
    #[error("template {id} expects {expected} parameters, got {got}")]
    ArgumentCount {
        id: String,
        expected: usize,
        got: usize,
    },
}
