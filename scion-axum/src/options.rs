//! Bridge configuration finalized at attach time.

use std::sync::Arc;

use scion_core::Bootstrapper;

/// Options controlling how the engine is grafted onto the host router.
///
/// [`attach_with`](crate::bridge::attach_with) constructs this with the
/// bootstrapper resolved from the host scope, hands it to the caller's
/// configuration callback, then finalizes it. Options are configured once at
/// startup and never mutated per-request.
#[derive(Default)]
pub struct EngineOptions {
    /// The engine entry point. Defaults to the bootstrapper registered in
    /// the host scope via [`add_engine`](crate::bridge::add_engine); the
    /// callback may override it.
    pub bootstrapper: Option<Arc<dyn Bootstrapper>>,
}

/// Wrapper under which the bootstrapper singleton lives in the host scope.
pub(crate) struct RegisteredBootstrapper(pub(crate) Arc<dyn Bootstrapper>);
