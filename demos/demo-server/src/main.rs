use std::path::Path;
use std::sync::Arc;

use routier::{register_routes, AxumApplication, ModuleCatalog, RegisterOptions};

mod controllers {
    pub mod health_controller;
    pub mod user_controller;
}
mod middleware;

use controllers::health_controller::HealthController;
use controllers::user_controller::UserController;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    tracing::info!("🚀 Starting demo server...");

    // The explicit registration step: every controller is listed with the
    // source file it lives in, which the loader then discovers on disk.
    let catalog = Arc::new(ModuleCatalog::new());
    catalog
        .controller::<HealthController>("controllers/health_controller.rs")
        .controller::<UserController>("controllers/user_controller.rs");

    let mut app = AxumApplication::new();
    let controllers_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/controllers");
    if let Err(error) = register_routes(RegisterOptions::new(&mut app, controllers_dir, catalog)).await
    {
        tracing::error!("Failed to register routes: {error}");
        std::process::exit(1);
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{host}:{port}");

    tracing::info!("✅ Server running on http://127.0.0.1:{port}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app.into_router()).await.unwrap();
}
