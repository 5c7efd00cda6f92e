//! Error types for the engine crate.

/// Errors that can occur while bootstrapping or dispatching the engine.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// A module asked the scope for a service nobody registered.
    #[error("service not registered in scope: {service}")]
    ServiceMissing { service: &'static str },

    /// Synchronous body access was attempted without the capability flag.
    #[error("synchronous body access is disabled for this request")]
    BlockingIoDisabled,

    /// A registered handler failed while producing its response.
    #[error("handler for {route} failed: {message}")]
    Handler { route: String, message: String },
}
