//! Axum bridge for the Scion engine.
//!
//! Registers the engine's bootstrapper as a singleton in the host's service
//! scope, then grafts the engine onto an axum `Router` as middleware: every
//! request gets its synchronous-I/O capability enabled and is offered to the
//! engine first; requests the engine does not route continue through the
//! host pipeline untouched.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod bridge;
pub mod error;
pub mod options;

pub use bridge::{add_engine, attach, attach_with, HostBootstrapper};
pub use error::BridgeError;
pub use options::EngineOptions;
