//! Action parameter declarations and the values resolved for them.
//!
//! Each action declares its parameters in order with [`Param`]. For every
//! request the dispatcher walks that list and picks the first rule that
//! applies:
//!
//! 1. [`Param::request`] receives the current [`Request`]
//! 2. [`Param::dto`] receives a DTO built and validated from the request data
//! 3. a parameter whose name matches a route placeholder receives the
//!    capture, coerced to its [`ParamType`] (services receive the raw string)
//! 4. a parameter with a default receives the default
//! 5. a [`Param::service`] receives the service from the container
//!
//! Anything else fails with an unresolvable-parameter error.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use hyperdrive_core::di::{Instance, ServiceId};
use hyperdrive_core::{HyperdriveError, HyperdriveResult, Request};
use hyperdrive_extract::{Dto, DtoError, ParamType};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) type DtoExtractor = fn(&Request) -> Result<Box<dyn Any + Send>, DtoError>;

/// One declared action parameter.
///
/// # Example
///
/// ```
/// use hyperdrive::{Param, ParamType};
///
/// let params = [
///     Param::value("id", ParamType::Int),
///     Param::value("page", ParamType::Int).with_default(1),
/// ];
/// assert_eq!(params[1].name(), "page");
/// ```
#[derive(Clone)]
pub struct Param {
    name: String,
    kind: ParamKind,
    default: Option<Value>,
}

#[derive(Clone)]
pub(crate) enum ParamKind {
    Request,
    Dto {
        type_name: &'static str,
        extract: DtoExtractor,
    },
    Value(ParamType),
    Service(ServiceId),
}

impl Param {
    /// The current request.
    #[must_use]
    pub fn request(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::Request)
    }

    /// A DTO built from the request data and validated with [`Dto::rules`].
    #[must_use]
    pub fn dto<D: Dto>(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            ParamKind::Dto {
                type_name: type_name::<D>(),
                extract: extract_dto::<D>,
            },
        )
    }

    /// A scalar, normally bound to a route placeholder of the same name.
    #[must_use]
    pub fn value(name: impl Into<String>, ty: ParamType) -> Self {
        Self::with_kind(name, ParamKind::Value(ty))
    }

    /// The service registered for type `T`.
    #[must_use]
    pub fn service<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::service_id(name, ServiceId::of::<T>())
    }

    /// The service registered under `id`.
    #[must_use]
    pub fn service_id(name: impl Into<String>, id: impl Into<ServiceId>) -> Self {
        Self::with_kind(name, ParamKind::Service(id.into()))
    }

    /// Used when no route placeholder matches the name.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// The parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) const fn kind(&self) -> &ParamKind {
        &self.kind
    }

    pub(crate) const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn with_kind(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            ParamKind::Request => "request".to_string(),
            ParamKind::Dto { type_name, .. } => format!("dto({type_name})"),
            ParamKind::Value(ty) => format!("{ty:?}"),
            ParamKind::Service(id) => format!("service({id})"),
        };
        f.debug_struct("Param")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("default", &self.default)
            .finish()
    }
}

fn extract_dto<D: Dto>(request: &Request) -> Result<Box<dyn Any + Send>, DtoError> {
    D::from_request(request).map(|dto| Box::new(dto) as Box<dyn Any + Send>)
}

/// A value resolved for one parameter.
pub(crate) enum Argument {
    Request(Box<Request>),
    Dto(Box<dyn Any + Send>),
    Value(Value),
    Service(Instance),
}

impl Argument {
    const fn label(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Dto(_) => "dto",
            Self::Value(_) => "value",
            Self::Service(_) => "service",
        }
    }
}

/// The resolved parameters passed to an action handler, by name.
///
/// Accessors fail with an internal error when the name was not declared or
/// was declared with a different kind; the dispatcher renders that as a 500.
#[derive(Default)]
pub struct Arguments {
    values: IndexMap<String, Argument>,
}

impl Arguments {
    pub(crate) fn insert(&mut self, name: impl Into<String>, argument: Argument) {
        self.values.insert(name.into(), argument);
    }

    /// The request declared with [`Param::request`].
    pub fn request(&self, name: &str) -> HyperdriveResult<&Request> {
        match self.values.get(name) {
            Some(Argument::Request(request)) => Ok(&**request),
            other => Err(mismatch(name, "request", other)),
        }
    }

    /// Takes the DTO declared with [`Param::dto`].
    pub fn dto<D: Dto>(&mut self, name: &str) -> HyperdriveResult<D> {
        match self.values.swap_remove(name) {
            Some(Argument::Dto(dto)) => dto
                .downcast::<D>()
                .map(|dto| *dto)
                .map_err(|_| HyperdriveError::internal(format!("Argument ${name} is not a {}", type_name::<D>()))),
            other => Err(mismatch(name, "dto", other.as_ref())),
        }
    }

    /// The raw JSON value of a scalar parameter.
    pub fn value(&self, name: &str) -> HyperdriveResult<&Value> {
        match self.values.get(name) {
            Some(Argument::Value(value)) => Ok(value),
            other => Err(mismatch(name, "value", other)),
        }
    }

    /// A scalar parameter deserialized as `T`.
    ///
    /// # Example
    ///
    /// ```
    /// # use hyperdrive::Arguments;
    /// # fn show(args: &Arguments) -> hyperdrive::HyperdriveResult<()> {
    /// let id: i64 = args.get("id")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> HyperdriveResult<T> {
        let value = self.value(name)?;
        serde_json::from_value(value.clone()).map_err(|e| {
            HyperdriveError::internal_with_source(format!("Argument ${name} is not a {}", type_name::<T>()), e)
        })
    }

    /// A service declared with [`Param::service`].
    pub fn service<T: Send + Sync + 'static>(&self, name: &str) -> HyperdriveResult<Arc<T>> {
        match self.values.get(name) {
            Some(Argument::Service(instance)) => Arc::clone(instance)
                .downcast::<T>()
                .map_err(|_| HyperdriveError::internal(format!("Argument ${name} is not a {}", type_name::<T>()))),
            other => Err(mismatch(name, "service", other)),
        }
    }

    /// Returns `true` if a value was resolved for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of resolved parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the action declared no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.iter().map(|(name, argument)| (name, argument.label())))
            .finish()
    }
}

fn mismatch(name: &str, expected: &str, found: Option<&Argument>) -> HyperdriveError {
    match found {
        Some(argument) => HyperdriveError::internal(format!(
            "Argument ${name} is a {}, not a {expected}",
            argument.label()
        )),
        None => HyperdriveError::internal(format!("Argument ${name} was not declared")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Search {
        term: String,
    }

    impl Dto for Search {}

    #[test]
    fn test_get_deserializes_value() {
        let mut args = Arguments::default();
        args.insert("id", Argument::Value(json!(42)));

        assert_eq!(args.get::<i64>("id").unwrap(), 42);
        assert!(args.get::<String>("id").is_err());
    }

    #[test]
    fn test_missing_and_mismatched_names() {
        let mut args = Arguments::default();
        args.insert("id", Argument::Value(json!(1)));

        let missing = args.request("request").unwrap_err();
        assert!(missing.to_string().contains("was not declared"));

        let wrong = args.service::<String>("id").unwrap_err();
        assert!(wrong.to_string().contains("is a value, not a service"));
    }

    #[test]
    fn test_dto_is_taken_once() {
        let request = Request::new(Method::POST, "/search").with_data(json!({"term": "rust"}));
        let extract = extract_dto::<Search>;

        let mut args = Arguments::default();
        args.insert("search", Argument::Dto(extract(&request).unwrap()));

        let search: Search = args.dto("search").unwrap();
        assert_eq!(search.term, "rust");
        assert!(args.dto::<Search>("search").is_err());
    }

    #[test]
    fn test_service_downcast() {
        let mut args = Arguments::default();
        let instance: Instance = Arc::new("shared".to_string());
        args.insert("name", Argument::Service(instance));

        assert_eq!(args.service::<String>("name").unwrap().as_str(), "shared");
        assert!(args.service::<u32>("name").is_err());
    }

    #[test]
    fn test_param_debug_and_default() {
        let param = Param::value("page", ParamType::Int).with_default(1);
        assert_eq!(param.default_value(), Some(&json!(1)));
        assert!(format!("{param:?}").contains("Int"));

        let dto = Param::dto::<Search>("search");
        assert!(format!("{dto:?}").contains("Search"));
    }

    #[test]
    fn test_names_keep_declaration_order() {
        let mut args = Arguments::default();
        args.insert("b", Argument::Value(json!(2)));
        args.insert("a", Argument::Value(json!(1)));
        assert_eq!(args.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(format!("{args:?}"), r#"{"b": "value", "a": "value"}"#);
    }
}
