//! Shared service scope resolved by both the host and the engine.
//!
//! The scope is owned by the host application; the engine borrows a handle
//! at bootstrap time and resolves its services from the identical instance.

use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::error::EngineError;

/// Thread-safe registry of services keyed by type.
///
/// Services are stored as `Arc`s and handed out by cloning the `Arc`, so
/// every resolution of a type yields a handle to the same instance. To
/// register a service behind a trait, store the `Arc<dyn Trait>` itself as
/// the value; production and test implementations then resolve under one key.
#[derive(Debug, Default)]
pub struct ServiceScope {
    entries: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl ServiceScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service instance, replacing any previous one of the same type.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned (a previous thread panicked
    /// while holding the write lock).
    pub fn set<T: Any + Send + Sync>(&self, value: T) {
        self.set_arc(Arc::new(value));
    }

    /// Register a pre-wrapped `Arc<T>`, replacing any previous entry of the
    /// same type.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    pub fn set_arc<T: Any + Send + Sync>(&self, value: Arc<T>) {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.entries
            .write()
            .expect("service scope write lock poisoned")
            .insert(TypeId::of::<T>(), value);
    }

    /// Resolve a service by type. Returns `None` if nothing of type `T` is
    /// registered.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.entries
            .read()
            .expect("service scope read lock poisoned")
            .get(&TypeId::of::<T>())
            .and_then(|entry| Arc::clone(entry).downcast::<T>().ok())
    }

    /// Resolve a service by type, or fail with the type name of the missing
    /// service.
    ///
    /// # Errors
    /// Returns [`EngineError::ServiceMissing`] if nothing of type `T` is
    /// registered.
    pub fn require<T: Any + Send + Sync>(&self) -> Result<Arc<T>, EngineError> {
        self.get::<T>().ok_or(EngineError::ServiceMissing {
            service: type_name::<T>(),
        })
    }

    /// Return `true` if a service of type `T` is registered.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.entries
            .read()
            .expect("service scope read lock poisoned")
            .contains_key(&TypeId::of::<T>())
    }
}
