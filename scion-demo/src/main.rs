//! Entry point for the `scion-demo` HTTP server.

use scion_demo::{build_scope, create_app};
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let addr = std::env::var("SCION_LISTEN_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_owned());

    let scope = build_scope();
    let app = match create_app(&scope) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "failed to graft engine onto the host router");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "scion-demo listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
