//! Request dispatcher for registered module routes.

use std::sync::Arc;

use http::Method;
use tracing::{debug, trace, Instrument};
use uuid::Uuid;

use crate::{
    bootstrap::Bootstrapper,
    di::ServiceScope,
    error::EngineError,
    module::RouteTable,
    transport::{EngineRequest, EngineResponse},
};

/// Outcome of handing one request to the engine.
#[derive(Debug)]
pub enum Dispatch {
    /// A route matched and produced this response.
    Handled(EngineResponse),
    /// No route matched; the caller should continue its own pipeline.
    NotMatched,
}

/// The engine: a route table bound to the application scope it was
/// bootstrapped from.
pub struct Engine {
    routes: RouteTable,
    scope: Arc<ServiceScope>,
}

impl Engine {
    /// Build an engine from a bootstrapper: capture its application scope
    /// and register every module's routes against it.
    ///
    /// # Errors
    /// Returns [`EngineError::ServiceMissing`] if any module requires a
    /// service the scope does not hold. The failure surfaces here, at
    /// startup, rather than on the first request.
    pub fn from_bootstrapper(bootstrapper: &dyn Bootstrapper) -> Result<Self, EngineError> {
        let scope = bootstrapper.application_scope();
        let mut routes = RouteTable::new();
        for module in bootstrapper.modules() {
            module.register(&mut routes, &scope)?;
        }
        debug!(routes = routes.len(), "engine bootstrapped");
        Ok(Self { routes, scope })
    }

    /// The scope captured at bootstrap. Always the same handle; the engine
    /// never constructs or swaps in a scope of its own.
    #[must_use]
    pub fn scope(&self) -> &Arc<ServiceScope> {
        &self.scope
    }

    /// Return `true` if a route exists for the method/path pair. Lets the
    /// caller decide on pass-through before paying for body translation.
    #[must_use]
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.routes.find(method, path).is_some()
    }

    /// Dispatch one request to its matching route.
    ///
    /// # Errors
    /// Any error from the matched handler propagates unmodified.
    pub async fn dispatch(&self, request: EngineRequest) -> Result<Dispatch, EngineError> {
        let Some(route) = self.routes.find(request.method(), request.path()) else {
            trace!(method = %request.method(), path = request.path(), "no engine route");
            return Ok(Dispatch::NotMatched);
        };

        let dispatch_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "engine_dispatch",
            %dispatch_id,
            method = %request.method(),
            path = request.path(),
        );
        let response = route.handler.handle(request).instrument(span).await?;
        Ok(Dispatch::Handled(response))
    }
}
