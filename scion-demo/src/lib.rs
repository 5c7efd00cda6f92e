//! Demonstration application for the Scion bridge.
//!
//! One module, one route, one injected service — enough to prove that the
//! engine runs inside the axum pipeline and resolves services from the
//! host's scope.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use scion_axum::{add_engine, attach, BridgeError, HostBootstrapper};
use scion_core::{EngineError, EngineRequest, EngineResponse, Module, RouteTable, ServiceScope};
use tower_http::trace::TraceLayer;

/// Body returned by `GET /`.
pub const GREETING: &str = "Hello from Scion and Axum!";

/// Application log sink, resolved from the host scope.
///
/// `tracing` is a global facade; routing the module's log line through a
/// scope-resolved service is what demonstrates cross-framework injection,
/// and it lets tests substitute a recording implementation.
pub trait EventLog: Send + Sync {
    /// Record one informational entry.
    fn info(&self, message: &str);
}

/// Production [`EventLog`] that forwards to `tracing`.
pub struct TracingLog;

impl EventLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// The demonstration module: `GET /` logs one line through the injected
/// [`EventLog`] and answers with [`GREETING`].
pub struct HomeModule;

impl Module for HomeModule {
    fn register(
        &self,
        routes: &mut RouteTable,
        scope: &Arc<ServiceScope>,
    ) -> Result<(), EngineError> {
        let log = scope.require::<Arc<dyn EventLog>>()?;
        routes.get("/", move |_req: EngineRequest| {
            let log = Arc::clone(&log);
            async move {
                log.info("It works!");
                Ok(EngineResponse::text(GREETING))
            }
        });
        Ok(())
    }
}

/// Build the host scope with the services the modules expect.
#[must_use]
pub fn build_scope() -> Arc<ServiceScope> {
    let scope = Arc::new(ServiceScope::new());
    let log: Arc<dyn EventLog> = Arc::new(TracingLog);
    scope.set(log);
    scope
}

/// Assemble the host application: register the bootstrapper in the scope,
/// graft the engine onto a bare router (host default not-found applies to
/// everything the engine does not route), and trace every request.
///
/// # Errors
/// Returns [`BridgeError`] if the engine cannot bootstrap — in this app,
/// when the scope is missing the [`EventLog`] service.
pub fn create_app(scope: &Arc<ServiceScope>) -> Result<Router, BridgeError> {
    add_engine(
        scope,
        HostBootstrapper::new(Arc::clone(scope)).with_module(HomeModule),
    );
    let bridged = attach(Router::new(), scope)?;
    Ok(bridged.layer(TraceLayer::new_for_http()))
}
