//! Validation rule vocabulary.
//!
//! Rules are written either as a pipe-delimited string such as
//! `"required|min:3|max:50"` or as a list of [`Rule`] values. Strings are
//! parsed once, when the [`RuleSet`] is built.
//!
//! A `regex:` rule containing `|` cannot be written in the pipe form; use
//! [`RuleSet::field_rules`] for it.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::RuleError;

/// A numeric rule argument, keeping its written form for messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    value: f64,
    raw: String,
}

impl Bound {
    /// The numeric value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

impl From<u32> for Bound {
    fn from(value: u32) -> Self {
        Self {
            value: f64::from(value),
            raw: value.to_string(),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One validation rule.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Must be present and non-empty.
    Required,
    /// May be explicitly `null`.
    Nullable,
    /// Minimum length, value or item count.
    Min(Bound),
    /// Maximum length, value or item count.
    Max(Bound),
    /// Exact length, value or item count.
    Size(Bound),
    /// An email address.
    Email,
    /// A number, or a string holding one.
    Numeric,
    /// An integer, or a string holding one.
    Integer,
    /// One of `true`, `false`, `0`, `1`, `"0"`, `"1"`.
    Boolean,
    /// One of `"yes"`, `"on"`, `1`, `true`, `"1"`.
    Accepted,
    /// One of the listed values.
    In(Vec<String>),
    /// None of the listed values.
    NotIn(Vec<String>),
    /// An absolute URL with a host.
    Url,
    /// A parseable date.
    Date,
    /// A date in the given PHP-style format, e.g. `Y-m-d`.
    DateFormat(String),
    /// Equal to another field.
    Same(String),
    /// Different from another field.
    Different(String),
    /// Equal to `<field>_confirmation`.
    Confirmed,
    /// Matches the pattern.
    Regex(Regex),
    /// A date before the given date or field.
    Before(String),
    /// A date after the given date or field.
    After(String),
    /// Exactly N decimal digits.
    Digits(usize),
    /// An array or object.
    Array,
    /// A string.
    String,
}

impl Rule {
    /// Shorthand for [`Rule::Min`].
    #[must_use]
    pub fn min(value: u32) -> Self {
        Self::Min(value.into())
    }

    /// Shorthand for [`Rule::Max`].
    #[must_use]
    pub fn max(value: u32) -> Self {
        Self::Max(value.into())
    }

    /// Shorthand for [`Rule::In`].
    #[must_use]
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::In(values.into_iter().map(Into::into).collect())
    }

    /// The rule name used in pipe strings and in `field.rule` message keys.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Nullable => "nullable",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Size(_) => "size",
            Self::Email => "email",
            Self::Numeric => "numeric",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Accepted => "accepted",
            Self::In(_) => "in",
            Self::NotIn(_) => "not_in",
            Self::Url => "url",
            Self::Date => "date",
            Self::DateFormat(_) => "date_format",
            Self::Same(_) => "same",
            Self::Different(_) => "different",
            Self::Confirmed => "confirmed",
            Self::Regex(_) => "regex",
            Self::Before(_) => "before",
            Self::After(_) => "after",
            Self::Digits(_) => "digits",
            Self::Array => "array",
            Self::String => "string",
        }
    }
}

impl FromStr for Rule {
    type Err = RuleError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match spec.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg)),
            None => (spec.trim(), None),
        };

        let rule = match name {
            "required" => Self::Required,
            "nullable" => Self::Nullable,
            "email" => Self::Email,
            "numeric" => Self::Numeric,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "accepted" => Self::Accepted,
            "url" => Self::Url,
            "date" => Self::Date,
            "confirmed" => Self::Confirmed,
            "array" => Self::Array,
            "string" => Self::String,
            "min" => Self::Min(bound(name, arg)?),
            "max" => Self::Max(bound(name, arg)?),
            "size" => Self::Size(bound(name, arg)?),
            "in" => Self::In(list(name, arg)?),
            "not_in" => Self::NotIn(list(name, arg)?),
            "date_format" => Self::DateFormat(required_arg(name, arg)?.to_string()),
            "same" => Self::Same(required_arg(name, arg)?.trim().to_string()),
            "different" => Self::Different(required_arg(name, arg)?.trim().to_string()),
            "before" => Self::Before(required_arg(name, arg)?.trim().to_string()),
            "after" => Self::After(required_arg(name, arg)?.trim().to_string()),
            "regex" => Self::Regex(pattern(name, required_arg(name, arg)?)?),
            "digits" => {
                let raw = required_arg(name, arg)?.trim();
                Self::Digits(raw.parse().map_err(|_| invalid(name, "expects a digit count"))?)
            }
            other => {
                return Err(RuleError::Unknown {
                    rule: other.to_string(),
                })
            }
        };
        Ok(rule)
    }
}

fn invalid(rule: &str, reason: &str) -> RuleError {
    RuleError::InvalidArgument {
        rule: rule.to_string(),
        reason: reason.to_string(),
    }
}

fn required_arg<'a>(rule: &str, arg: Option<&'a str>) -> Result<&'a str, RuleError> {
    arg.filter(|a| !a.trim().is_empty())
        .ok_or_else(|| invalid(rule, "requires an argument"))
}

fn bound(rule: &str, arg: Option<&str>) -> Result<Bound, RuleError> {
    let raw = required_arg(rule, arg)?.trim();
    let value = raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(rule, "expects a number"))?;
    Ok(Bound {
        value,
        raw: raw.to_string(),
    })
}

fn list(rule: &str, arg: Option<&str>) -> Result<Vec<String>, RuleError> {
    Ok(required_arg(rule, arg)?
        .split(',')
        .map(|v| v.trim().to_string())
        .collect())
}

/// Parses `/pattern/flags`; a bare pattern without delimiters is also accepted.
fn pattern(rule: &str, arg: &str) -> Result<Regex, RuleError> {
    let arg = arg.trim();
    let (body, flags) = match arg.strip_prefix('/').and_then(|rest| rest.rsplit_once('/')) {
        Some((body, flags)) => (body, flags),
        None => (arg, ""),
    };

    let mut source = String::new();
    let inline: String = flags.chars().filter(|c| matches!(c, 'i' | 'm' | 's' | 'x')).collect();
    if !inline.is_empty() {
        source.push_str("(?");
        source.push_str(&inline);
        source.push(')');
    }
    source.push_str(body);

    Regex::new(&source).map_err(|e| invalid(rule, &e.to_string()))
}

/// Rules per field, in declaration order.
///
/// # Example
///
/// ```rust
/// use hyperdrive_extract::{Rule, RuleSet};
///
/// let rules = RuleSet::new()
///     .field("name", "required|min:3")
///     .field_rules("role", [Rule::Required, Rule::one_of(["admin", "member"])]);
///
/// assert!(rules.check().is_ok());
/// assert_eq!(rules.get("name").map(<[Rule]>::len), Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: IndexMap<String, Vec<Rule>>,
    errors: Vec<(String, RuleError)>,
}

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds rules for `field` from a pipe-delimited string.
    ///
    /// Parse failures are kept and reported by [`RuleSet::check`].
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, spec: &str) -> Self {
        let field = field.into();
        let mut rules = Vec::new();
        for part in spec.split('|').map(str::trim).filter(|p| !p.is_empty()) {
            match part.parse::<Rule>() {
                Ok(rule) => rules.push(rule),
                Err(error) => self.errors.push((field.clone(), error)),
            }
        }
        self.fields.entry(field).or_default().extend(rules);
        self
    }

    /// Adds already-built rules for `field`.
    #[must_use]
    pub fn field_rules(mut self, field: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.entry(field.into()).or_default().extend(rules);
        self
    }

    /// Returns the first parse failure, if any.
    pub fn check(&self) -> Result<(), (&str, &RuleError)> {
        match self.errors.first() {
            Some((field, error)) => Err((field.as_str(), error)),
            None => Ok(()),
        }
    }

    /// Rules declared for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[Rule]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Iterates over `(field, rules)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.fields.iter().map(|(f, r)| (f.as_str(), r.as_slice()))
    }

    /// Returns `true` if no field has rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
