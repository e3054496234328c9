//! Turning a matched route into a response.

use std::collections::HashMap;
use std::sync::Arc;

use hyperdrive_core::di::Container;
use hyperdrive_core::{ActionResult, HyperdriveError, Request, Response};
use hyperdrive_extract::{coerce, ParamType};
use hyperdrive_router::{Params, Route};
use http::StatusCode;

use crate::arguments::{Argument, Arguments, ParamKind};
use crate::controller::ActionEntry;
use crate::error::{BuildError, DispatchError, DispatchResult};

/// Resolves controllers and action parameters, invokes actions, and
/// normalizes what they return.
///
/// Dispatch never fails outright: every error becomes a response.
#[derive(Debug)]
pub struct Dispatcher {
    container: Arc<Container>,
    actions: HashMap<String, HashMap<String, Arc<ActionEntry>>>,
    expose_error_details: bool,
}

impl Dispatcher {
    pub(crate) fn new(container: Arc<Container>, expose_error_details: bool) -> Self {
        Self {
            container,
            actions: HashMap::new(),
            expose_error_details,
        }
    }

    pub(crate) fn insert(
        actions: &mut HashMap<String, HashMap<String, Arc<ActionEntry>>>,
        entry: ActionEntry,
    ) -> Result<(), BuildError> {
        let by_action = actions.entry(entry.controller.as_str().to_string()).or_default();
        if by_action.contains_key(&entry.action) {
            return Err(BuildError::DuplicateAction {
                controller: entry.controller.to_string(),
                action: entry.action,
            });
        }
        by_action.insert(entry.action.clone(), Arc::new(entry));
        Ok(())
    }

    pub(crate) fn with_actions(mut self, actions: HashMap<String, HashMap<String, Arc<ActionEntry>>>) -> Self {
        self.actions = actions;
        self
    }

    /// Runs the action behind `route` and renders the outcome.
    pub async fn dispatch(&self, route: &Route, params: &Params, request: Request) -> Response {
        match self.try_dispatch(route, params, request).await {
            Ok(result) => result.into_response(),
            Err(error) => self.render_error(route, error),
        }
    }

    /// Runs the action behind `route` without rendering errors.
    pub async fn try_dispatch(&self, route: &Route, params: &Params, request: Request) -> DispatchResult<ActionResult> {
        let entry = self.entry(route)?;

        let controller = self
            .container
            .get(&entry.controller)
            .map_err(|source| DispatchError::Controller {
                controller: entry.controller.to_string(),
                source,
            })?;

        let arguments = self.resolve_arguments(&entry, params, request)?;
        Ok((entry.handler)(controller, arguments).await?)
    }

    fn entry(&self, route: &Route) -> DispatchResult<Arc<ActionEntry>> {
        self.actions
            .get(route.controller())
            .and_then(|by_action| by_action.get(route.action()))
            .cloned()
            .ok_or_else(|| DispatchError::UnknownAction {
                controller: route.controller().to_string(),
                action: route.action().to_string(),
            })
    }

    fn resolve_arguments(&self, entry: &ActionEntry, params: &Params, request: Request) -> DispatchResult<Arguments> {
        let mut arguments = Arguments::default();

        for param in &entry.params {
            let name = param.name();
            let argument = match param.kind() {
                ParamKind::Request => Argument::Request(Box::new(request.clone())),
                ParamKind::Dto { extract, .. } => Argument::Dto(extract(&request)?),
                kind => {
                    if let Some(raw) = params.get(name) {
                        let ty = match kind {
                            ParamKind::Value(ty) => *ty,
                            _ => ParamType::Raw,
                        };
                        Argument::Value(coerce(name, raw, ty)?)
                    } else if let Some(default) = param.default_value() {
                        Argument::Value(default.clone())
                    } else if let ParamKind::Service(id) = kind {
                        let instance = self.container.get(id).map_err(|source| DispatchError::UnresolvableParameter {
                            parameter: name.to_string(),
                            controller: entry.controller.to_string(),
                            action: entry.action.clone(),
                            source: Some(source),
                        })?;
                        Argument::Service(instance)
                    } else {
                        return Err(DispatchError::UnresolvableParameter {
                            parameter: name.to_string(),
                            controller: entry.controller.to_string(),
                            action: entry.action.clone(),
                            source: None,
                        });
                    }
                }
            };
            arguments.insert(name, argument);
        }

        Ok(arguments)
    }

    fn render_error(&self, route: &Route, error: DispatchError) -> Response {
        let error = HyperdriveError::from(error);
        let status = error.status_code();

        if status.is_server_error() {
            tracing::error!(
                controller = route.controller(),
                action = route.action(),
                error = %error,
                "action failed"
            );
            if !self.expose_error_details {
                return Response::text("Server Error").with_status(StatusCode::INTERNAL_SERVER_ERROR);
            }
        } else {
            tracing::debug!(
                controller = route.controller(),
                action = route.action(),
                status = status.as_u16(),
                "action rejected request"
            );
        }

        error.into_response()
    }

    /// Number of dispatchable actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.values().map(HashMap::len).sum()
    }

    /// Returns `true` if no actions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
