//! Route template compilation.
//!
//! A template such as `/users/{id}/posts/{slug}` compiles to an anchored
//! regular expression in which every `{name}` becomes a named capture of one
//! or more non-slash characters and everything else is matched literally.

use regex::Regex;

use crate::error::{RouteError, RouteResult};
use crate::params::Params;

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    template: String,
    regex: Regex,
    names: Vec<String>,
}

impl RoutePattern {
    /// Compiles a template.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hyperdrive_router::RoutePattern;
    ///
    /// let pattern = RoutePattern::compile("/users/{id}").unwrap();
    /// let params = pattern.captures("/users/42").unwrap();
    /// assert_eq!(params.get("id"), Some("42"));
    /// assert!(pattern.captures("/users/42/posts").is_none());
    /// ```
    pub fn compile(template: &str) -> RouteResult<Self> {
        let mut source = String::with_capacity(template.len() + 16);
        let mut names: Vec<String> = Vec::new();
        source.push('^');

        let mut rest = template;
        while let Some(open) = rest.find(['{', '}']) {
            if rest.as_bytes()[open] == b'}' {
                return Err(unbalanced(template));
            }
            source.push_str(&regex::escape(&rest[..open]));

            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| unbalanced(template))?;
            let name = &after[..close];
            if name.contains('{') {
                return Err(unbalanced(template));
            }
            if !is_identifier(name) {
                return Err(RouteError::InvalidPlaceholder {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            if names.iter().any(|n| n == name) {
                return Err(RouteError::DuplicatePlaceholder {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }

            source.push_str("(?P<");
            source.push_str(name);
            source.push_str(">[^/]+)");
            names.push(name.to_string());
            rest = &after[close + 1..];
        }
        source.push_str(&regex::escape(rest));
        source.push('$');

        let regex = Regex::new(&source).map_err(|source| RouteError::Pattern {
            template: template.to_string(),
            source,
        })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            names,
        })
    }

    /// Matches the whole path, returning the named captures.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;
        let mut params = Params::with_capacity(self.names.len());
        for name in &self.names {
            if let Some(value) = caps.name(name) {
                params.push(name.as_str(), value.as_str());
            }
        }
        Some(params)
    }

    /// Returns `true` if the path matches.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The original template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in order of appearance.
    #[must_use]
    pub fn placeholders(&self) -> &[String] {
        &self.names
    }

    /// Returns `true` if the template has no placeholders.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.names.is_empty()
    }
}

fn unbalanced(template: &str) -> RouteError {
    RouteError::UnbalancedBraces {
        template: template.to_string(),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_template() {
        let pattern = RoutePattern::compile("/health").unwrap();
        assert!(pattern.is_static());
        assert!(pattern.is_match("/health"));
        assert!(!pattern.is_match("/healthz"));
        assert!(!pattern.is_match("/api/health"));
    }

    #[test]
    fn test_multiple_placeholders() {
        let pattern = RoutePattern::compile("/orgs/{orgId}/users/{user_id}").unwrap();
        let params = pattern.captures("/orgs/acme/users/123").unwrap();

        assert_eq!(pattern.placeholders(), ["orgId", "user_id"]);
        assert_eq!(params.get("orgId"), Some("acme"));
        assert_eq!(params.get("user_id"), Some("123"));
    }

    #[test]
    fn test_placeholder_does_not_cross_slash() {
        let pattern = RoutePattern::compile("/files/{name}").unwrap();
        assert!(pattern.captures("/files/a/b").is_none());
        assert!(pattern.captures("/files/").is_none());
    }

    #[test]
    fn test_literal_characters_are_escaped() {
        let pattern = RoutePattern::compile("/v1.0/items/{id}.json").unwrap();
        assert!(pattern.is_match("/v1.0/items/7.json"));
        assert!(!pattern.is_match("/v1x0/items/7.json"));
        assert!(!pattern.is_match("/v1.0/items/7xjson"));
    }

    #[test]
    fn test_placeholder_inside_segment() {
        let pattern = RoutePattern::compile("/reports/{year}-{month}").unwrap();
        let params = pattern.captures("/reports/2024-05").unwrap();
        assert_eq!(params.get("year"), Some("2024"));
        assert_eq!(params.get("month"), Some("05"));
    }

    #[test]
    fn test_invalid_placeholder_name() {
        assert!(matches!(
            RoutePattern::compile("/users/{1st}"),
            Err(RouteError::InvalidPlaceholder { .. })
        ));
        assert!(matches!(
            RoutePattern::compile("/users/{}"),
            Err(RouteError::InvalidPlaceholder { .. })
        ));
    }

    #[test]
    fn test_duplicate_placeholder() {
        assert!(matches!(
            RoutePattern::compile("/a/{id}/b/{id}"),
            Err(RouteError::DuplicatePlaceholder { .. })
        ));
    }

    #[test]
    fn test_unbalanced_braces() {
        for template in ["/users/{id", "/users/id}", "/users/{{id}}"] {
            assert!(
                matches!(
                    RoutePattern::compile(template),
                    Err(RouteError::UnbalancedBraces { .. })
                ),
                "{template} should be rejected"
            );
        }
    }
}
