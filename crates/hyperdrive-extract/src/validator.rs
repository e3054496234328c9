//! Evaluating a [`RuleSet`] against input data.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use hyperdrive_core::FieldErrors;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DtoError;
use crate::rules::{Bound, Rule, RuleSet};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .unwrap_or_else(|_| unreachable!("email pattern is valid"))
});

/// Field-keyed validation messages, in the order fields were declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(FieldErrors);

impl ValidationErrors {
    /// The message for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns `true` if `field` failed.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(field, message)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// Unwraps the underlying map.
    #[must_use]
    pub fn into_inner(self) -> FieldErrors {
        self.0
    }
}

impl From<FieldErrors> for ValidationErrors {
    fn from(errors: FieldErrors) -> Self {
        Self(errors)
    }
}

/// Checks input data against a rule set.
///
/// For each field, the first failing rule produces the message; later rules
/// for that field are not evaluated. A field that is absent or `null` and not
/// `required` is skipped entirely.
///
/// # Example
///
/// ```rust
/// use hyperdrive_extract::{RuleSet, Validator};
/// use serde_json::json;
///
/// let rules = RuleSet::new().field("name", "required|min:3");
/// let data = json!({ "name": "Al" });
/// let data = data.as_object().unwrap();
///
/// let err = Validator::new(data, &rules).validate().unwrap_err();
/// let errors = err.validation_errors().unwrap();
/// assert_eq!(errors.get("name"), Some("name must be at least 3 characters"));
/// ```
#[derive(Debug)]
pub struct Validator<'a> {
    data: &'a Map<String, Value>,
    rules: &'a RuleSet,
    messages: HashMap<String, String>,
    field_names: HashMap<String, String>,
}

impl<'a> Validator<'a> {
    /// Creates a validator for `data`.
    #[must_use]
    pub fn new(data: &'a Map<String, Value>, rules: &'a RuleSet) -> Self {
        Self {
            data,
            rules,
            messages: HashMap::new(),
            field_names: HashMap::new(),
        }
    }

    /// Custom messages keyed `field.rule`.
    #[must_use]
    pub fn with_messages(mut self, messages: HashMap<String, String>) -> Self {
        self.messages = messages;
        self
    }

    /// Display names used in default messages.
    #[must_use]
    pub fn with_field_names(mut self, field_names: HashMap<String, String>) -> Self {
        self.field_names = field_names;
        self
    }

    /// Runs every rule.
    pub fn validate(&self) -> Result<(), DtoError> {
        if let Err((field, source)) = self.rules.check() {
            return Err(DtoError::Rules {
                field: field.to_string(),
                source: source.clone(),
            });
        }

        let mut errors = FieldErrors::new();
        for (field, rules) in self.rules.iter() {
            if let Some(message) = self.validate_field(field, rules) {
                errors.insert(field.to_string(), message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DtoError::Validation(ValidationErrors(errors)))
        }
    }

    fn validate_field(&self, field: &str, rules: &[Rule]) -> Option<String> {
        let value = self.data.get(field);
        let required = rules.iter().any(|r| matches!(r, Rule::Required));
        let nullable = rules.iter().any(|r| matches!(r, Rule::Nullable));
        let is_null = matches!(value, Some(Value::Null));

        if required {
            let allowed_null = nullable && is_null;
            if !allowed_null && value.map_or(true, is_empty) {
                return Some(self.message(field, &Rule::Required, &[]));
            }
        }

        let value = match value {
            None | Some(Value::Null) => return None,
            Some(value) => value,
        };

        rules
            .iter()
            .filter(|rule| !matches!(rule, Rule::Required | Rule::Nullable))
            .find_map(|rule| self.check(field, value, rule))
    }

    fn check(&self, field: &str, value: &Value, rule: &Rule) -> Option<String> {
        let passes = match rule {
            Rule::Required | Rule::Nullable => true,
            Rule::Min(bound) => {
                return measure(value)
                    .filter(|(size, _)| *size >= bound.value())
                    .map_or_else(|| Some(self.sized_message(field, rule, value, bound)), |_| None)
            }
            Rule::Max(bound) => {
                return measure(value)
                    .filter(|(size, _)| *size <= bound.value())
                    .map_or_else(|| Some(self.sized_message(field, rule, value, bound)), |_| None)
            }
            Rule::Size(bound) => {
                return measure(value)
                    .filter(|(size, _)| (*size - bound.value()).abs() < f64::EPSILON)
                    .map_or_else(|| Some(self.sized_message(field, rule, value, bound)), |_| None)
            }
            Rule::Email => value.as_str().is_some_and(|s| EMAIL.is_match(s)),
            Rule::Numeric => is_numeric(value),
            Rule::Integer => is_integer(value),
            Rule::Boolean => matches!(value, Value::Bool(_))
                || matches!(value.as_i64(), Some(0 | 1))
                || matches!(value.as_str(), Some("0" | "1")),
            Rule::Accepted => matches!(value, Value::Bool(true))
                || value.as_i64() == Some(1)
                || matches!(value.as_str(), Some("yes" | "on" | "1")),
            Rule::In(options) => scalar_string(value).is_some_and(|s| options.contains(&s)),
            Rule::NotIn(options) => scalar_string(value).map_or(true, |s| !options.contains(&s)),
            Rule::Url => value
                .as_str()
                .and_then(|s| url::Url::parse(s).ok())
                .is_some_and(|u| u.has_host()),
            Rule::Date => value.as_str().and_then(parse_date).is_some(),
            Rule::DateFormat(format) => value.as_str().is_some_and(|s| matches_date_format(s, format)),
            Rule::Same(other) => self.data.get(other).unwrap_or(&Value::Null) == value,
            Rule::Different(other) => self.data.get(other).unwrap_or(&Value::Null) != value,
            Rule::Confirmed => {
                let key = format!("{field}_confirmation");
                self.data.get(&key).unwrap_or(&Value::Null) == value
            }
            Rule::Regex(re) => scalar_string(value).is_some_and(|s| re.is_match(&s)),
            Rule::Before(limit) => self.compare_dates(value, limit).is_some_and(|o| o.is_lt()),
            Rule::After(limit) => self.compare_dates(value, limit).is_some_and(|o| o.is_gt()),
            Rule::Digits(count) => scalar_string(value)
                .is_some_and(|s| s.len() == *count && s.bytes().all(|b| b.is_ascii_digit())),
            Rule::Array => value.is_array() || value.is_object(),
            Rule::String => value.is_string(),
        };

        if passes {
            None
        } else {
            Some(self.message(field, rule, &self.replacements(rule)))
        }
    }

    /// Compares a date value with a literal date or another field's date.
    fn compare_dates(&self, value: &Value, limit: &str) -> Option<std::cmp::Ordering> {
        let value = parse_date(value.as_str()?)?;
        let limit = match self.data.get(limit).and_then(Value::as_str) {
            Some(other) => parse_date(other)?,
            None => parse_date(limit)?,
        };
        Some(value.cmp(&limit))
    }

    fn replacements(&self, rule: &Rule) -> Vec<(&'static str, String)> {
        match rule {
            Rule::In(values) | Rule::NotIn(values) => vec![("values", values.join(", "))],
            Rule::DateFormat(format) => vec![("format", format.clone())],
            Rule::Same(other) | Rule::Different(other) => {
                vec![("other", self.display_name(other).to_string())]
            }
            Rule::Before(date) | Rule::After(date) => vec![("date", date.clone())],
            Rule::Digits(count) => vec![("digits", count.to_string())],
            _ => Vec::new(),
        }
    }

    fn sized_message(&self, field: &str, rule: &Rule, value: &Value, bound: &Bound) -> String {
        let unit = measure(value).map_or(" characters", |(_, unit)| unit);
        self.message(field, rule, &[("bound", bound.to_string()), ("unit", unit.to_string())])
    }

    fn display_name<'f>(&'f self, field: &'f str) -> &'f str {
        self.field_names.get(field).map_or(field, String::as_str)
    }

    fn message(&self, field: &str, rule: &Rule, replace: &[(&str, String)]) -> String {
        if let Some(custom) = self.messages.get(&format!("{field}.{}", rule.name())) {
            return custom.clone();
        }

        let name = self.display_name(field);
        let arg = |key: &str| {
            replace
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
                .unwrap_or_default()
        };

        match rule {
            Rule::Required => format!("{name} is required"),
            Rule::Min(_) => format!("{name} must be at least {}{}", arg("bound"), arg("unit")),
            Rule::Max(_) => format!("{name} must be no more than {}{}", arg("bound"), arg("unit")),
            Rule::Size(_) => format!("{name} must be exactly {}{}", arg("bound"), arg("unit")),
            Rule::Email => format!("{name} must be a valid email address"),
            Rule::Numeric => format!("{name} must be a number"),
            Rule::Integer => format!("{name} must be an integer"),
            Rule::Boolean => format!("{name} must be true or false"),
            Rule::Accepted => format!("{name} must be accepted"),
            Rule::In(_) => format!("{name} must be one of: {}", arg("values")),
            Rule::NotIn(_) => format!("{name} must not be one of: {}", arg("values")),
            Rule::Url => format!("{name} must be a valid URL"),
            Rule::Date => format!("{name} must be a valid date"),
            Rule::DateFormat(_) => format!("{name} must match the format {}", arg("format")),
            Rule::Same(_) => format!("{name} must match {}", arg("other")),
            Rule::Different(_) => format!("{name} must be different from {}", arg("other")),
            Rule::Confirmed => format!("{name} confirmation does not match"),
            Rule::Before(_) => format!("{name} must be a date before {}", arg("date")),
            Rule::After(_) => format!("{name} must be a date after {}", arg("date")),
            Rule::Digits(_) => format!("{name} must be {} digits", arg("digits")),
            Rule::Array => format!("{name} must be an array"),
            Rule::String => format!("{name} must be a string"),
            Rule::Regex(_) | Rule::Nullable => format!("Validation failed for {name}"),
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Size of a value and the unit used in messages: characters for strings,
/// the value itself for numbers, the item count for arrays and objects.
fn measure(value: &Value) -> Option<(f64, &'static str)> {
    match value {
        Value::String(s) => Some((s.chars().count() as f64, " characters")),
        Value::Number(n) => n.as_f64().map(|v| (v, "")),
        Value::Array(items) => Some((items.len() as f64, " items")),
        Value::Object(map) => Some((map.len() as f64, " items")),
        Value::Null | Value::Bool(_) => None,
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
        _ => false,
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parses the common date and date-time shapes, plus relative expressions
/// such as `today`, `+2 weeks` or `next friday` resolved against local time.
pub(crate) fn parse_date(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Some(relative) = parse_relative(input, Local::now().naive_local()) {
        return Some(relative);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt);
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%B %d, %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Relative expressions. Named days resolve to midnight, offsets keep the time of day.
fn parse_relative(input: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let lowered = input.to_ascii_lowercase();
    let midnight = now.date().and_time(NaiveTime::MIN);

    match lowered.as_str() {
        "now" => return Some(now),
        "today" | "midnight" => return Some(midnight),
        "tomorrow" => return midnight.checked_add_signed(Duration::try_days(1)?),
        "yesterday" => return midnight.checked_sub_signed(Duration::try_days(1)?),
        _ => {}
    }

    let words: Vec<&str> = lowered.split_whitespace().collect();
    match words.as_slice() {
        [direction @ ("next" | "last"), day] => {
            let target = weekday(day)?;
            let current = i64::from(now.weekday().num_days_from_monday());
            let wanted = i64::from(target.num_days_from_monday());
            let distance = if *direction == "next" {
                (wanted - current).rem_euclid(7)
            } else {
                (current - wanted).rem_euclid(7)
            };
            let days = if distance == 0 { 7 } else { distance };
            let step = Duration::try_days(days)?;
            if *direction == "next" {
                midnight.checked_add_signed(step)
            } else {
                midnight.checked_sub_signed(step)
            }
        }
        [amount, unit] => offset(now, amount.parse().ok()?, unit),
        [amount, unit, "ago"] => offset(now, -amount.trim_start_matches('+').parse::<i64>().ok()?, unit),
        _ => None,
    }
}

fn offset(now: NaiveDateTime, amount: i64, unit: &str) -> Option<NaiveDateTime> {
    let unit = unit.strip_suffix('s').unwrap_or(unit);
    let step = match unit {
        "sec" | "second" => Duration::try_seconds(amount)?,
        "min" | "minute" => Duration::try_minutes(amount)?,
        "hour" => Duration::try_hours(amount)?,
        "day" => Duration::try_days(amount)?,
        "week" => Duration::try_weeks(amount)?,
        "month" | "year" => {
            let months = if unit == "year" { amount.checked_mul(12)? } else { amount };
            let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
            return if months < 0 {
                now.checked_sub_months(magnitude)
            } else {
                now.checked_add_months(magnitude)
            };
        }
        _ => return None,
    };
    now.checked_add_signed(step)
}

fn weekday(name: &str) -> Option<Weekday> {
    match name {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Converts a PHP `date()` format into a chrono format string.
pub(crate) fn php_to_chrono_format(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        let mapped = match c {
            'd' => "%d",
            'j' => "%-d",
            'D' => "%a",
            'l' => "%A",
            'm' => "%m",
            'n' => "%-m",
            'M' => "%b",
            'F' => "%B",
            'Y' => "%Y",
            'y' => "%y",
            'H' => "%H",
            'G' => "%-H",
            'h' => "%I",
            'g' => "%-I",
            'i' => "%M",
            's' => "%S",
            'A' => "%p",
            'a' => "%P",
            'U' => "%s",
            'O' => "%z",
            'P' => "%:z",
            '%' => "%%",
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
                continue;
            }
            other => {
                out.push(other);
                continue;
            }
        };
        out.push_str(mapped);
    }
    out
}

/// True when `input` parses with `format` and formats back to itself.
fn matches_date_format(input: &str, format: &str) -> bool {
    let format = php_to_chrono_format(format);

    if let Ok(dt) = DateTime::parse_from_str(input, &format) {
        return dt.format(&format).to_string() == input;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, &format) {
        return dt.format(&format).to_string() == input;
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, &format) {
        return date.format(&format).to_string() == input;
    }
    if let Ok(time) = NaiveTime::parse_from_str(input, &format) {
        return time.format(&format).to_string() == input;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn errors(data: Value, rules: &RuleSet) -> ValidationErrors {
        let data = data.as_object().cloned().unwrap_or_default();
        match Validator::new(&data, rules).validate() {
            Ok(()) => ValidationErrors::default(),
            Err(DtoError::Validation(errors)) => errors,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    fn message(data: Value, field: &str, spec: &str) -> Option<String> {
        let rules = RuleSet::new().field(field, spec);
        errors(data, &rules).get(field).map(str::to_string)
    }

    #[test]
    fn test_required() {
        assert_eq!(message(json!({}), "name", "required").as_deref(), Some("name is required"));
        assert!(message(json!({"name": ""}), "name", "required").is_some());
        assert!(message(json!({"name": []}), "name", "required").is_some());
        assert!(message(json!({"name": "Ada"}), "name", "required").is_none());
        assert!(message(json!({"count": 0}), "count", "required").is_none());
    }

    #[test]
    fn test_required_nullable_allows_explicit_null() {
        assert!(message(json!({"bio": null}), "bio", "required|nullable").is_none());
        assert!(message(json!({}), "bio", "required|nullable").is_some());
    }

    #[test]
    fn test_optional_absent_fields_are_skipped() {
        assert!(message(json!({}), "email", "email|min:5").is_none());
        assert!(message(json!({"email": null}), "email", "email").is_none());
    }

    #[test]
    fn test_first_failure_wins() {
        assert_eq!(
            message(json!({"name": "x"}), "name", "min:3|email").as_deref(),
            Some("name must be at least 3 characters")
        );
    }

    #[test]
    fn test_min_max_size_by_type() {
        assert_eq!(
            message(json!({"age": 15}), "age", "min:18").as_deref(),
            Some("age must be at least 18")
        );
        assert_eq!(
            message(json!({"tags": [1, 2, 3]}), "tags", "max:2").as_deref(),
            Some("tags must be no more than 2 items")
        );
        assert_eq!(
            message(json!({"code": "ab"}), "code", "size:3").as_deref(),
            Some("code must be exactly 3 characters")
        );
        assert!(message(json!({"name": "ééé"}), "name", "size:3").is_none());
    }

    #[test]
    fn test_format_rules() {
        assert!(message(json!({"e": "ada@example.com"}), "e", "email").is_none());
        assert!(message(json!({"e": "not-an-email"}), "e", "email").is_some());
        assert!(message(json!({"u": "https://example.com/x"}), "u", "url").is_none());
        assert!(message(json!({"u": "example"}), "u", "url").is_some());
        assert!(message(json!({"n": "12.5"}), "n", "numeric").is_none());
        assert!(message(json!({"n": "twelve"}), "n", "numeric").is_some());
        assert!(message(json!({"i": "42"}), "i", "integer").is_none());
        assert!(message(json!({"i": 4.5}), "i", "integer").is_some());
        assert!(message(json!({"d": "1234"}), "d", "digits:4").is_none());
        assert!(message(json!({"d": "12a4"}), "d", "digits:4").is_some());
        assert!(message(json!({"s": 5}), "s", "string").is_some());
        assert!(message(json!({"a": {"k": 1}}), "a", "array").is_none());
    }

    #[test]
    fn test_boolean_and_accepted() {
        for ok in [json!(true), json!(0), json!("1")] {
            assert!(message(json!({"b": ok}), "b", "boolean").is_none());
        }
        assert!(message(json!({"b": "yes"}), "b", "boolean").is_some());

        for ok in [json!("yes"), json!("on"), json!(1), json!(true)] {
            assert!(message(json!({"t": ok}), "t", "accepted").is_none());
        }
        assert_eq!(
            message(json!({"t": "no"}), "t", "accepted").as_deref(),
            Some("t must be accepted")
        );
    }

    #[test]
    fn test_in_and_not_in() {
        assert!(message(json!({"r": "admin"}), "r", "in:admin,member").is_none());
        assert_eq!(
            message(json!({"r": "root"}), "r", "in:admin,member").as_deref(),
            Some("r must be one of: admin, member")
        );
        assert_eq!(
            message(json!({"r": "root"}), "r", "not_in:root").as_deref(),
            Some("r must not be one of: root")
        );
        assert!(message(json!({"n": 2}), "n", "in:1,2,3").is_none());
    }

    #[test]
    fn test_sibling_field_rules() {
        let data = json!({"password": "s3cret", "password_confirmation": "s3cret", "old": "s3cret"});
        assert!(message(data.clone(), "password", "confirmed").is_none());
        assert!(message(data.clone(), "password", "same:old").is_none());
        assert_eq!(
            message(data, "password", "different:old").as_deref(),
            Some("password must be different from old")
        );

        assert_eq!(
            message(json!({"password": "a"}), "password", "confirmed").as_deref(),
            Some("password confirmation does not match")
        );
    }

    #[test]
    fn test_dates() {
        assert!(message(json!({"d": "2024-02-29"}), "d", "date").is_none());
        assert!(message(json!({"d": "2023-02-29"}), "d", "date").is_some());
        assert!(message(json!({"d": "25/12/2024"}), "d", "date_format:d/m/Y").is_none());
        assert_eq!(
            message(json!({"d": "2024-12-25"}), "d", "date_format:d/m/Y").as_deref(),
            Some("d must match the format d/m/Y")
        );
        assert!(message(json!({"d": "2024-01-01"}), "d", "before:2025-01-01").is_none());
        assert!(message(json!({"d": "2024-01-01"}), "d", "after:2025-01-01").is_some());

        let data = json!({"start": "2024-01-01", "end": "2024-06-01"});
        assert!(message(data, "end", "after:start").is_none());
    }

    #[test]
    fn test_relative_dates_in_rules() {
        assert!(message(json!({"d": "tomorrow"}), "d", "date").is_none());
        assert!(message(json!({"d": "+3 days"}), "d", "date").is_none());
        assert!(message(json!({"d": "someday"}), "d", "date").is_some());

        assert!(message(json!({"d": "2999-01-01"}), "d", "after:today").is_none());
        assert!(message(json!({"d": "tomorrow"}), "d", "after:today").is_none());
        assert!(message(json!({"d": "2000-01-01"}), "d", "after:today").is_some());
        assert!(message(json!({"d": "2000-01-01"}), "d", "before:tomorrow").is_none());
    }

    #[test]
    fn test_relative_expressions() {
        // Wednesday
        let now = NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN);

        assert_eq!(parse_relative("now", now), Some(now));
        assert_eq!(parse_relative("Today", now), Some(day(2024, 5, 15)));
        assert_eq!(parse_relative("tomorrow", now), Some(day(2024, 5, 16)));
        assert_eq!(parse_relative("yesterday", now), Some(day(2024, 5, 14)));
        assert_eq!(parse_relative("next monday", now), Some(day(2024, 5, 20)));
        assert_eq!(parse_relative("next wednesday", now), Some(day(2024, 5, 22)));
        assert_eq!(parse_relative("last friday", now), Some(day(2024, 5, 10)));

        let at = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(14, 30, 0).unwrap();
        assert_eq!(parse_relative("+1 day", now), Some(at(2024, 5, 16)));
        assert_eq!(parse_relative("-2 weeks", now), Some(at(2024, 5, 1)));
        assert_eq!(parse_relative("+1 month", now), Some(at(2024, 6, 15)));
        assert_eq!(parse_relative("3 days ago", now), Some(at(2024, 5, 12)));
        assert_eq!(parse_relative("1 year", now), Some(at(2025, 5, 15)));

        assert_eq!(parse_relative("2024-05-15", now), None);
        assert_eq!(parse_relative("+1 fortnight", now), None);
    }

    #[test]
    fn test_regex_rule() {
        let rules = RuleSet::new().field_rules(
            "slug",
            [Rule::Regex(Regex::new("^[a-z]+(-[a-z]+)*$").unwrap())],
        );
        assert!(errors(json!({"slug": "hello-world"}), &rules).is_empty());
        assert_eq!(
            errors(json!({"slug": "Hello World"}), &rules).get("slug"),
            Some("Validation failed for slug")
        );
    }

    #[test]
    fn test_custom_messages_and_field_names() {
        let rules = RuleSet::new()
            .field("email", "required")
            .field("name", "required");
        let data = Map::new();
        let messages = HashMap::from([("email.required".to_string(), "We need your email".to_string())]);
        let names = HashMap::from([("name".to_string(), "Full name".to_string())]);

        let Err(DtoError::Validation(errors)) = Validator::new(&data, &rules)
            .with_messages(messages)
            .with_field_names(names)
            .validate()
        else {
            panic!("expected validation errors");
        };

        assert_eq!(errors.get("email"), Some("We need your email"));
        assert_eq!(errors.get("name"), Some("Full name is required"));
        let order: Vec<_> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(order, ["email", "name"]);
    }

    #[test]
    fn test_unknown_rule_is_setup_error() {
        let rules = RuleSet::new().field("name", "required|shiny");
        let data = Map::new();
        assert!(matches!(
            Validator::new(&data, &rules).validate(),
            Err(DtoError::Rules { .. })
        ));
    }

    #[test]
    fn test_php_format_conversion() {
        assert_eq!(php_to_chrono_format("Y-m-d H:i:s"), "%Y-%m-%d %H:%M:%S");
        assert_eq!(php_to_chrono_format("j/n/y"), "%-d/%-m/%y");
        assert_eq!(php_to_chrono_format(r"\Y Y"), "Y %Y");
    }
}
