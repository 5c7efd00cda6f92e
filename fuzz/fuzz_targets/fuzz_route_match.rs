//! Fuzz target: route matching over arbitrary request paths.
//!
//! Verifies that arbitrary byte sequences used as paths never panic the
//! matcher, and that nothing but the registered path ever matches.

#![no_main]

use std::sync::Arc;

use http::Method;
use libfuzzer_sys::fuzz_target;
use scion_core::{
    Bootstrapper, Engine, EngineError, EngineRequest, EngineResponse, Module, RouteTable,
    ServiceScope,
};

struct OneRoute;

impl Module for OneRoute {
    fn register(
        &self,
        routes: &mut RouteTable,
        _scope: &Arc<ServiceScope>,
    ) -> Result<(), EngineError> {
        routes.get("/only", |_req: EngineRequest| async {
            Ok(EngineResponse::text("ok"))
        });
        Ok(())
    }
}

struct Boot(Arc<ServiceScope>);

impl Bootstrapper for Boot {
    fn application_scope(&self) -> Arc<ServiceScope> {
        Arc::clone(&self.0)
    }

    fn modules(&self) -> Vec<Arc<dyn Module>> {
        vec![Arc::new(OneRoute)]
    }
}

fuzz_target!(|data: &[u8]| {
    let path = String::from_utf8_lossy(data);
    let engine = match Engine::from_bootstrapper(&Boot(Arc::new(ServiceScope::new()))) {
        Ok(e) => e,
        Err(_) => return,
    };
    if engine.matches(&Method::GET, &path) {
        assert_eq!(&*path, "/only");
    }
});
