//! Values captured by a matched route.

use std::fmt;

use smallvec::SmallVec;

/// `name = value` pairs in the order the placeholders appear in the template.
///
/// Templates rarely carry more than a few placeholders; up to four captures
/// live inline.
///
/// ```rust
/// use hyperdrive_router::Params;
///
/// let mut params = Params::new();
/// params.push("orgId", "acme");
/// params.push("id", "7");
///
/// assert_eq!(params.get("id"), Some("7"));
/// assert_eq!(params.get("missing"), None);
/// assert_eq!(params.to_string(), "orgId=acme, id=7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    captures: SmallVec<[(String, String); 4]>,
}

impl Params {
    /// No captures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Room for `capacity` captures.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            captures: SmallVec::with_capacity(capacity),
        }
    }

    /// Records a capture. Template validation guarantees unique names.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.captures.push((name.into(), value.into()));
    }

    /// The raw string captured for `name`, before any coercion.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter().find_map(|(key, value)| (key == name).then_some(value))
    }

    /// Pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.captures.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of captures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// `true` for a template without placeholders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let mut params = Params::with_capacity(2);
        params.push("year", "2024");
        params.push("slug", "hello-world");

        assert_eq!(params.get("slug"), Some("hello-world"));
        assert_eq!(params.get("Slug"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_template_order_kept() {
        let mut params = Params::new();
        params.push("z", "1");
        params.push("a", "2");

        let names: Vec<_> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["z", "a"]);
    }

    #[test]
    fn test_grows_past_inline_storage() {
        let mut params = Params::new();
        for i in 0..6 {
            params.push(format!("p{i}"), i.to_string());
        }
        assert_eq!(params.len(), 6);
        assert_eq!(params.get("p5"), Some("5"));
    }
}
