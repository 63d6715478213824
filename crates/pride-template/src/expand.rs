//! Numbered-placeholder expansion.
//!
//! Placeholders look like `{{1}}`, `{{2}}`, … (1-indexed, decimal, no
//! padding). [`expand`] substitutes values one index at a time, in
//! ascending order. Substitution is purely textual and sequential: a
//! value that itself contains `{{3}}` will be replaced when pass 3 runs.
//! That is observable behavior and callers may rely on it.

use std::collections::BTreeSet;

/// Renders the placeholder token for `index`, e.g. `{{2}}`.
pub fn placeholder(index: usize) -> String {
    format!("{{{{{index}}}}}")
}

/// Substitutes `values` into `body`.
///
/// For each `i` in `1..=values.len()`, in ascending order, every
/// occurrence of `{{i}}` is replaced with `values[i - 1]` verbatim. No
/// escaping is done. Placeholders beyond `values.len()` are left as-is.
///
/// ```
/// use pride_template::expand;
///
/// let out = expand("Hello {{1}}, your {{2}} is ready", &["Maria", "visa"]);
/// assert_eq!(out, "Hello Maria, your visa is ready");
///
/// assert_eq!(expand("{{1}} and {{2}}", &["X"]), "X and {{2}}");
/// ```
pub fn expand<V: AsRef<str>>(body: &str, values: &[V]) -> String {
    let mut out = body.to_string();
    for (i, value) in values.iter().enumerate() {
        let token = placeholder(i + 1);
        if out.contains(&token) {
            out = out.replace(&token, value.as_ref());
        }
    }
    out
}

/// Returns the distinct placeholder indices appearing in `body`.
///
/// Only canonical tokens count: `{{01}}` or `{{ 1 }}` are plain text,
/// since [`expand`] would never replace them.
pub fn placeholders(body: &str) -> BTreeSet<usize> {
    let mut found = BTreeSet::new();
    let mut rest = body;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let digits = after
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after.len());
        let (number, tail) = after.split_at(digits);

        let canonical = !number.is_empty() && !number.starts_with('0');
        if canonical && tail.starts_with("}}") {
            if let Ok(index) = number.parse::<usize>() {
                found.insert(index);
            }
        }

        // Resume one past the opening brace so `{{{1}}` still finds `{{1}}`.
        rest = &rest[start + 1..];
    }

    found
}
