use std::any::type_name;
use std::borrow::Cow;
use std::fmt;

/// Identifier a service is registered and resolved under.
///
/// Usually the Rust type name of the service (see [`ServiceId::of`]), but any
/// string works, which is how interface-like abstract identifiers and named
/// bindings are expressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(Cow<'static, str>);

impl ServiceId {
    /// Creates an identifier from an arbitrary name.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Returns the identifier for type `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Cow::Borrowed(type_name::<T>()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ServiceId {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for ServiceId {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&ServiceId> for ServiceId {
    fn from(id: &ServiceId) -> Self {
        id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mailer;

    #[test]
    fn test_of_uses_type_name() {
        let id = ServiceId::of::<Mailer>();
        assert!(id.as_str().ends_with("Mailer"));
        assert_eq!(id, ServiceId::of::<Mailer>());
    }

    #[test]
    fn test_borrowed_and_owned_compare_equal() {
        assert_eq!(ServiceId::from("cache"), ServiceId::from("cache".to_string()));
    }
}
