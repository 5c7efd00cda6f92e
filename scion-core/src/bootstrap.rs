//! Bootstrapper abstraction — the engine's view of its root container.

use std::sync::Arc;

use crate::{di::ServiceScope, module::Module};

/// Supplies the engine with its application scope and modules.
///
/// Implementations bridging a host server must return the host's own scope
/// from [`application_scope`](Bootstrapper::application_scope) rather than
/// constructing one; scope sharing, not duplication, is the contract. The
/// accessor is pure: every call returns a handle to the identical scope.
pub trait Bootstrapper: Send + Sync {
    /// The application-wide scope the engine resolves services from.
    fn application_scope(&self) -> Arc<ServiceScope>;

    /// The modules whose routes the engine serves.
    fn modules(&self) -> Vec<Arc<dyn Module>>;
}
