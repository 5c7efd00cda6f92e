//! Module and route model for the engine.
//!
//! A module contributes routes to the engine's table at bootstrap time,
//! resolving whatever services its handlers need from the shared scope.

use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use http::Method;

use crate::{
    di::ServiceScope,
    error::EngineError,
    transport::{EngineRequest, EngineResponse},
};

/// A request handler owned by a route.
///
/// Implemented for any async closure taking an [`EngineRequest`] and
/// returning `Result<EngineResponse, EngineError>`.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Produce the response for one request.
    ///
    /// # Errors
    /// Any error returned here propagates unmodified through the dispatcher
    /// to the host's error handling.
    async fn handle(&self, request: EngineRequest) -> Result<EngineResponse, EngineError>;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(EngineRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<EngineResponse, EngineError>> + Send + 'static,
{
    async fn handle(&self, request: EngineRequest) -> Result<EngineResponse, EngineError> {
        (self)(request).await
    }
}

/// One registered route: method, exact path, handler.
pub struct Route {
    method: Method,
    path: String,
    pub(crate) handler: Arc<dyn Handler>,
}

impl Route {
    /// The method this route answers.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The exact path this route answers.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Ordered collection of routes. Matching is exact on method and path;
/// the first registered match wins.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    pub fn add(
        &mut self,
        method: Method,
        path: impl Into<String>,
        handler: impl Handler + 'static,
    ) {
        self.routes.push(Route {
            method,
            path: path.into(),
            handler: Arc::new(handler),
        });
    }

    /// Register a `GET` route.
    pub fn get(&mut self, path: impl Into<String>, handler: impl Handler + 'static) {
        self.add(Method::GET, path, handler);
    }

    /// Register a `POST` route.
    pub fn post(&mut self, path: impl Into<String>, handler: impl Handler + 'static) {
        self.add(Method::POST, path, handler);
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Return `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn find(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| route.method == *method && route.path == path)
    }
}

/// A unit of route registration, analogous to a controller.
///
/// Registration runs once at engine bootstrap. Services the handlers need
/// are resolved from the shared scope here, so a missing registration
/// surfaces as a startup error rather than a per-request failure.
pub trait Module: Send + Sync {
    /// Contribute routes to the table.
    ///
    /// # Errors
    /// Returns [`EngineError::ServiceMissing`] if a required service is not
    /// registered in the scope.
    fn register(&self, routes: &mut RouteTable, scope: &Arc<ServiceScope>)
        -> Result<(), EngineError>;
}
