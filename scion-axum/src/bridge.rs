//! Scope capture, engine registration, and the middleware stages.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use http_body_util::BodyExt;
use scion_core::{
    BodyControl, Bootstrapper, Dispatch, Engine, EngineRequest, EngineResponse, Module,
    ServiceScope,
};
use tracing::debug;

use crate::{
    error::BridgeError,
    options::{EngineOptions, RegisteredBootstrapper},
};

// ── Scope capture ─────────────────────────────────────────────────────────────

/// A bootstrapper that answers with the host's own scope.
///
/// The scope handle is captured at construction and never replaced; the
/// engine resolves its services from the identical container the host
/// registers into.
pub struct HostBootstrapper {
    scope: Arc<ServiceScope>,
    modules: Vec<Arc<dyn Module>>,
}

impl HostBootstrapper {
    /// Capture the host scope. Modules are added with
    /// [`with_module`](Self::with_module).
    #[must_use]
    pub fn new(scope: Arc<ServiceScope>) -> Self {
        Self {
            scope,
            modules: Vec::new(),
        }
    }

    /// Add a module whose routes the engine will serve.
    #[must_use]
    pub fn with_module(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Arc::new(module));
        self
    }
}

impl Bootstrapper for HostBootstrapper {
    fn application_scope(&self) -> Arc<ServiceScope> {
        // Hand back the captured host scope, never an engine-private one.
        Arc::clone(&self.scope)
    }

    fn modules(&self) -> Vec<Arc<dyn Module>> {
        self.modules.clone()
    }
}

// ── Registration ──────────────────────────────────────────────────────────────

/// Register the engine's bootstrapper as a singleton in the host scope.
///
/// [`attach`] later resolves it from there, so the bootstrapper participates
/// in the same container the rest of the application uses.
pub fn add_engine(scope: &ServiceScope, bootstrapper: impl Bootstrapper + 'static) {
    scope.set(RegisteredBootstrapper(Arc::new(bootstrapper)));
}

/// Graft the engine onto the router with default options.
///
/// # Errors
/// Returns [`BridgeError::BootstrapperMissing`] if no bootstrapper was
/// registered via [`add_engine`], or the engine's own error if a module
/// fails to bootstrap.
pub fn attach(router: Router, scope: &Arc<ServiceScope>) -> Result<Router, BridgeError> {
    attach_with(router, scope, |_options| {})
}

/// Graft the engine onto the router, letting the caller adjust the options
/// before they are finalized.
///
/// Installs three pipeline stages, outermost first: provision the request's
/// [`BodyControl`] if the host has not, force-enable synchronous body
/// access, and delegate to the engine. Requests the engine does not route
/// fall through to the router's own handlers and fallback.
///
/// # Errors
/// Returns [`BridgeError::BootstrapperMissing`] if the finalized options
/// carry no bootstrapper, or the engine's own error if a module fails to
/// bootstrap.
pub fn attach_with(
    router: Router,
    scope: &Arc<ServiceScope>,
    configure: impl FnOnce(&mut EngineOptions),
) -> Result<Router, BridgeError> {
    let mut options = EngineOptions {
        bootstrapper: scope
            .get::<RegisteredBootstrapper>()
            .map(|registered| Arc::clone(&registered.0)),
    };
    configure(&mut options);

    let bootstrapper = options
        .bootstrapper
        .ok_or(BridgeError::BootstrapperMissing)?;
    let engine = Arc::new(Engine::from_bootstrapper(bootstrapper.as_ref())?);
    debug!("engine grafted onto host router");

    Ok(router
        .layer(middleware::from_fn_with_state(engine, dispatch_to_engine))
        .layer(middleware::from_fn(allow_blocking_io))
        .layer(middleware::from_fn(provide_body_control)))
}

// ── Pipeline stages ───────────────────────────────────────────────────────────

/// Ensure every request carries a [`BodyControl`] extension.
///
/// Hosts that manage their own body-control policy can insert the extension
/// earlier in the pipeline; this stage only fills the gap.
async fn provide_body_control(mut request: Request, next: Next) -> Response {
    if request.extensions().get::<BodyControl>().is_none() {
        request.extensions_mut().insert(BodyControl::new());
    }
    next.run(request).await
}

/// Force-enable synchronous body access for engine compatibility.
///
/// Never short-circuits: with or without the extension present, the request
/// continues down the chain.
async fn allow_blocking_io(request: Request, next: Next) -> Response {
    if let Some(control) = request.extensions().get::<BodyControl>() {
        control.allow();
    }
    next.run(request).await
}

/// Offer the request to the engine; pass it through untouched when no
/// engine route matches.
async fn dispatch_to_engine(
    State(engine): State<Arc<Engine>>,
    request: Request,
    next: Next,
) -> Response {
    if !engine.matches(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let control = request
        .extensions()
        .get::<BodyControl>()
        .cloned()
        .unwrap_or_default();

    let (parts, body) = request.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => return BridgeError::BodyRead(e.to_string()).into_response(),
    };

    let engine_request = EngineRequest::new(
        parts.method.clone(),
        parts.uri.path().to_owned(),
        parts.headers.clone(),
        bytes.clone(),
        control,
    );

    match engine.dispatch(engine_request).await {
        Ok(Dispatch::Handled(response)) => into_host_response(response),
        // The probe above said yes, so this arm should not run; restore the
        // buffered body and let the host finish rather than assert.
        Ok(Dispatch::NotMatched) => next.run(Request::from_parts(parts, Body::from(bytes))).await,
        Err(e) => BridgeError::Engine(e).into_response(),
    }
}

// ── Response translation ──────────────────────────────────────────────────────

fn into_host_response(response: EngineResponse) -> Response {
    let (status, headers, body) = response.into_parts();
    let mut host_response = Response::new(Body::from(body));
    *host_response.status_mut() = status;
    *host_response.headers_mut() = headers;
    host_response
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use axum::http::{Request as HttpRequest, StatusCode};
    use scion_core::{EngineError, EngineRequest, EngineResponse, RouteTable};
    use tower::ServiceExt;

    use super::*;

    struct HelloModule;

    impl Module for HelloModule {
        fn register(
            &self,
            routes: &mut RouteTable,
            scope: &Arc<ServiceScope>,
        ) -> Result<(), EngineError> {
            let greeting = scope.require::<String>()?;
            routes.get("/hello", move |_req: EngineRequest| {
                let greeting = Arc::clone(&greeting);
                async move { Ok(EngineResponse::text(greeting.as_str())) }
            });
            routes.post("/echo-blocking", |req: EngineRequest| async move {
                let mut reader = req.blocking_reader()?;
                let mut body = String::new();
                reader
                    .read_to_string(&mut body)
                    .map_err(|e| EngineError::Handler {
                        route: "POST /echo-blocking".to_owned(),
                        message: e.to_string(),
                    })?;
                Ok(EngineResponse::text(body))
            });
            routes.get("/fail", |_req: EngineRequest| async {
                Err(EngineError::Handler {
                    route: "GET /fail".to_owned(),
                    message: "kaboom".to_owned(),
                })
            });
            Ok(())
        }
    }

    fn scope_with_greeting() -> Arc<ServiceScope> {
        let scope = Arc::new(ServiceScope::new());
        scope.set("hello from the scope".to_owned());
        scope
    }

    fn bridged_app(scope: &Arc<ServiceScope>) -> Router {
        add_engine(
            scope,
            HostBootstrapper::new(Arc::clone(scope)).with_module(HelloModule),
        );
        match attach(Router::new(), scope) {
            Ok(router) => router,
            Err(e) => panic!("attach must succeed: {e}"),
        }
    }

    async fn send(app: Router, request: HttpRequest<Body>) -> Response {
        match app.oneshot(request).await {
            Ok(response) => response,
            Err(e) => panic!("router error: {e}"),
        }
    }

    async fn body_string(response: Response) -> String {
        let bytes = match axum::body::to_bytes(response.into_body(), 64 * 1024).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn host_bootstrapper_returns_the_identical_scope_every_call() {
        let scope = Arc::new(ServiceScope::new());
        let bootstrapper = HostBootstrapper::new(Arc::clone(&scope));
        let first = bootstrapper.application_scope();
        let second = bootstrapper.application_scope();
        assert!(Arc::ptr_eq(&first, &scope));
        assert!(
            Arc::ptr_eq(&second, &scope),
            "repeat calls must return the same captured scope"
        );
    }

    #[test]
    fn attach_without_registration_reports_missing_bootstrapper() {
        let scope = Arc::new(ServiceScope::new());
        let err = match attach(Router::new(), &scope) {
            Ok(_) => panic!("attach must fail without a bootstrapper"),
            Err(e) => e,
        };
        assert!(matches!(err, BridgeError::BootstrapperMissing));
    }

    #[test]
    fn attach_with_callback_can_supply_the_bootstrapper() {
        let scope = scope_with_greeting();
        let replacement = HostBootstrapper::new(Arc::clone(&scope)).with_module(HelloModule);
        // Nothing registered in the scope; the callback provides the engine
        // entry point instead.
        let result = attach_with(Router::new(), &scope, |options| {
            options.bootstrapper = Some(Arc::new(replacement));
        });
        assert!(result.is_ok(), "callback-supplied bootstrapper must be used");
    }

    #[test]
    fn attach_surfaces_module_bootstrap_failures_at_startup() {
        // Scope lacks the greeting the module requires.
        let scope = Arc::new(ServiceScope::new());
        add_engine(
            &scope,
            HostBootstrapper::new(Arc::clone(&scope)).with_module(HelloModule),
        );
        let err = match attach(Router::new(), &scope) {
            Ok(_) => panic!("attach must fail when the module's service is missing"),
            Err(e) => e,
        };
        assert!(matches!(
            err,
            BridgeError::Engine(EngineError::ServiceMissing { .. })
        ));
    }

    #[tokio::test]
    async fn engine_route_is_served_through_the_host_pipeline() {
        let app = bridged_app(&scope_with_greeting());
        let request = match HttpRequest::builder().uri("/hello").body(Body::empty()) {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let response = send(app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "hello from the scope");
    }

    #[tokio::test]
    async fn unrouted_requests_fall_through_to_the_host_default() {
        let app = bridged_app(&scope_with_greeting());
        let request = match HttpRequest::builder().uri("/nowhere").body(Body::empty()) {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let response = send(app, request).await;
        assert_eq!(
            response.status(),
            StatusCode::NOT_FOUND,
            "unknown paths must get the host's default not-found"
        );
    }

    #[tokio::test]
    async fn wrong_method_on_engine_path_falls_through() {
        let app = bridged_app(&scope_with_greeting());
        let request = match HttpRequest::builder()
            .method("POST")
            .uri("/hello")
            .body(Body::empty())
        {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let response = send(app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sync_io_flag_is_enabled_for_host_provided_controls() {
        let app = bridged_app(&scope_with_greeting());
        let control = BodyControl::new();
        let request = match HttpRequest::builder()
            .uri("/hello")
            .extension(control.clone())
            .body(Body::empty())
        {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let response = send(app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            control.is_blocking_allowed(),
            "the enablement stage must have flipped the host's flag"
        );
    }

    #[tokio::test]
    async fn handlers_can_read_the_body_synchronously_under_the_bridge() {
        let app = bridged_app(&scope_with_greeting());
        let request = match HttpRequest::builder()
            .method("POST")
            .uri("/echo-blocking")
            .body(Body::from("grafted"))
        {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let response = send(app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "grafted");
    }

    #[tokio::test]
    async fn handler_failures_surface_as_server_errors() {
        let app = bridged_app(&scope_with_greeting());
        let request = match HttpRequest::builder().uri("/fail").body(Body::empty()) {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let response = send(app, request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert!(
            body.contains("kaboom"),
            "error payload must carry the handler message, got: {body}"
        );
    }
}
