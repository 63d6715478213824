//! The template catalog: every outbound message the app can send.
//!
//! WhatsApp only delivers business-initiated messages from templates
//! that were approved ahead of time, so the set is fixed per deployment.
//! The catalog is built once at startup, validated, and read-only after.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::{TemplateError, expand, placeholders};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// WhatsApp template category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Marketing,
    Utility,
    Authentication,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marketing => write!(f, "MARKETING"),
            Self::Utility => write!(f, "UTILITY"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
        }
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// A single message template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique key, also the template name registered with WhatsApp.
    pub id: String,
    /// Human-friendly name for the dashboard.
    pub name: String,
    pub category: Category,
    /// What the message is for, shown to recruiters when picking one.
    pub description: String,
    /// Message text with `{{1}}`, `{{2}}`, … placeholders.
    pub body: String,
    /// How many values [`render`](Self::render) expects.
    pub param_count: usize,
}

impl Template {
    /// Creates a template. Consistency is checked when it's added to a
    /// [`TemplateCatalog`], not here.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        description: impl Into<String>,
        body: impl Into<String>,
        param_count: usize,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            description: description.into(),
            body: body.into(),
            param_count,
        }
    }

    /// Expands this template with exactly `param_count` values.
    ///
    /// # Errors
    /// [`TemplateError::ArgumentCount`] if `values.len()` differs from the
    /// declared count.
    pub fn render<V: AsRef<str>>(&self, values: &[V]) -> Result<String, TemplateError> {
        if values.len() != self.param_count {
            return Err(TemplateError::ArgumentCount {
                id: self.id.clone(),
                expected: self.param_count,
                got: values.len(),
            });
        }
        Ok(expand(&self.body, values))
    }

    /// Checks the declared count against the body's placeholders.
    fn validate(&self) -> Result<(), TemplateError> {
        let indices: Vec<usize> = placeholders(&self.body).into_iter().collect();

        if indices.len() != self.param_count {
            return Err(TemplateError::ParamCountMismatch {
                id: self.id.clone(),
                declared: self.param_count,
                found: indices.len(),
            });
        }

        // Sorted and distinct, so contiguous-from-1 means indices[i] == i + 1.
        let contiguous = indices.iter().enumerate().all(|(i, &n)| n == i + 1);
        if !contiguous {
            return Err(TemplateError::NonContiguous {
                id: self.id.clone(),
                indices,
            });
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TemplateCatalog
// ---------------------------------------------------------------------------

/// A validated, immutable set of templates keyed by id.
///
/// Shared read-only between request handlers (no locking needed).
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    /// Templates in definition order, for listing.
    templates: Vec<Template>,
    /// Index into `templates` by id.
    by_id: HashMap<String, usize>,
}

impl TemplateCatalog {
    /// Builds a catalog, rejecting it if any entry is inconsistent.
    ///
    /// # Errors
    /// - [`TemplateError::DuplicateId`]: two entries share an id
    /// - [`TemplateError::ParamCountMismatch`]: declared count is wrong
    /// - [`TemplateError::NonContiguous`]: placeholders skip an index
    pub fn new(templates: Vec<Template>) -> Result<Self, TemplateError> {
        let mut by_id = HashMap::with_capacity(templates.len());

        for (i, template) in templates.iter().enumerate() {
            template.validate()?;
            if by_id.insert(template.id.clone(), i).is_some() {
                return Err(TemplateError::DuplicateId(template.id.clone()));
            }
        }

        tracing::debug!(count = templates.len(), "template catalog loaded");
        Ok(Self { templates, by_id })
    }

    /// The catalog shipped with this deployment.
    ///
    /// # Errors
    /// Only if the built-in definitions are inconsistent, which the test
    /// suite guards against.
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::new(crate::builtin::templates())
    }

    /// Looks a template up by id. Unknown ids return `None`.
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.by_id.get(id).map(|&i| &self.templates[i])
    }

    /// Iterates templates in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` if the catalog has no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: &str, body: &str, param_count: usize) -> Template {
        Template::new(id, id, Category::Utility, "test", body, param_count)
    }

    // =====================================================================
    // TemplateCatalog::new()
    // =====================================================================

    #[test]
    fn test_new_accepts_consistent_templates() {
        let catalog = TemplateCatalog::new(vec![
            template("greet", "Hi {{1}}", 1),
            template("plain", "No params here", 0),
            template("repeat", "{{1}} {{2}} {{1}}", 2),
        ])
        .expect("valid catalog");

        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_new_rejects_param_count_mismatch() {
        let err = TemplateCatalog::new(vec![template("greet", "Hi {{1}} {{2}}", 1)])
            .unwrap_err();

        assert_eq!(
            err,
            TemplateError::ParamCountMismatch {
                id: "greet".into(),
                declared: 1,
                found: 2,
            }
        );
    }

    #[test]
    fn test_new_rejects_gap_in_placeholders() {
        let err = TemplateCatalog::new(vec![template("gap", "{{1}} {{3}}", 2)])
            .unwrap_err();

        assert_eq!(
            err,
            TemplateError::NonContiguous {
                id: "gap".into(),
                indices: vec![1, 3],
            }
        );
    }

    #[test]
    fn test_new_rejects_placeholders_not_starting_at_one() {
        let err = TemplateCatalog::new(vec![template("late", "{{2}}", 1)]).unwrap_err();

        assert!(matches!(err, TemplateError::NonContiguous { .. }));
    }

    #[test]
    fn test_new_rejects_duplicate_id() {
        let err = TemplateCatalog::new(vec![
            template("greet", "Hi {{1}}", 1),
            template("greet", "Hello {{1}}", 1),
        ])
        .unwrap_err();

        assert_eq!(err, TemplateError::DuplicateId("greet".into()));
    }

    // =====================================================================
    // get() / iter()
    // =====================================================================

    #[test]
    fn test_get_unknown_id_returns_none() {
        let catalog = TemplateCatalog::new(vec![template("greet", "Hi {{1}}", 1)]).unwrap();

        assert!(catalog.get("nope").is_none());
        assert!(catalog.get("").is_none());
    }

    #[test]
    fn test_get_known_id_returns_template() {
        let catalog = TemplateCatalog::new(vec![template("greet", "Hi {{1}}", 1)]).unwrap();

        let t = catalog.get("greet").unwrap();

        assert_eq!(t.body, "Hi {{1}}");
        assert_eq!(t.param_count, 1);
    }

    #[test]
    fn test_iter_preserves_definition_order() {
        let catalog = TemplateCatalog::new(vec![
            template("b", "x", 0),
            template("a", "y", 0),
        ])
        .unwrap();

        let ids: Vec<&str> = catalog.iter().map(|t| t.id.as_str()).collect();

        assert_eq!(ids, vec!["b", "a"]);
    }

    // =====================================================================
    // Template::render()
    // =====================================================================

    #[test]
    fn test_render_with_matching_count() {
        let t = template("ready", "Hello {{1}}, your {{2}} is ready", 2);

        assert_eq!(
            t.render(&["Maria", "visa"]).unwrap(),
            "Hello Maria, your visa is ready"
        );
    }

    #[test]
    fn test_render_with_wrong_count_is_error() {
        let t = template("ready", "Hello {{1}}, your {{2}} is ready", 2);

        let err = t.render(&["Maria"]).unwrap_err();

        assert_eq!(
            err,
            TemplateError::ArgumentCount {
                id: "ready".into(),
                expected: 2,
                got: 1,
            }
        );
        assert!(t.render(&["a", "b", "c"]).is_err());
    }

    #[test]
    fn test_template_serializes_camel_case() {
        let t = template("greet", "Hi {{1}}", 1);

        let json = serde_json::to_value(&t).unwrap();

        assert_eq!(json["paramCount"], 1);
        assert_eq!(json["category"], "UTILITY");
    }
}
