//! Core engine for the Scion bridge.
//!
//! Defines the module/route model, the transport abstraction, the shared
//! service scope, and the dispatcher that a host pipeline delegates
//! requests to.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod bootstrap;
pub mod di;
pub mod engine;
pub mod error;
pub mod module;
pub mod transport;

pub use bootstrap::Bootstrapper;
pub use di::ServiceScope;
pub use engine::{Dispatch, Engine};
pub use error::EngineError;
pub use module::{Handler, Module, Route, RouteTable};
pub use transport::{BodyControl, EngineRequest, EngineResponse};
