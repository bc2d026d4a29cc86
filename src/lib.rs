//! # Routier
//!
//! Annotation-driven controller routing for axum with filesystem route
//! discovery.
//!
//! Routier lets you group related endpoints into controller structs, declare
//! routes with attribute macros instead of manual registration calls, and
//! have a loader walk a directory tree, find every controller source file,
//! and register its routes on the host application — in declaration order,
//! with readable diagnostics when a controller file is malformed.
//!
//! ## Features
//!
//! - **Controller classes**: `#[controller(path = "...")]` structs with
//!   `#[get]`/`#[post]`/`#[put]`/`#[patch]`/`#[delete]` handler methods
//! - **Middleware chains**: controller-level and route-level middlewares,
//!   run ahead of the handler in declaration order
//! - **Filesystem discovery**: point the loader at a folder; controller
//!   files anywhere under it are found and registered
//! - **Forgiving loading**: a malformed controller file is reported and
//!   skipped instead of taking the whole application down
//! - **Host-framework agnostic core**: routes are handed to anything
//!   implementing [`HttpApplication`]; an axum adapter ships in the box
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use routier::prelude::*;
//!
//! #[controller(path = "/users")]
//! #[derive(Default)]
//! pub struct UserController;
//!
//! #[routes]
//! impl UserController {
//!     #[get("/")]
//!     async fn list(&self) -> Json<Vec<String>> {
//!         Json(vec!["amelia".to_string(), "bo".to_string()])
//!     }
//!
//!     #[post("/")]
//!     async fn create(&self, request: Request) -> StatusCode {
//!         let _ = request;
//!         StatusCode::CREATED
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> routier::Result<()> {
//!     // The catalog is the compile-time stand-in for dynamic imports:
//!     // each controller is listed with the source file it lives in.
//!     let catalog = Arc::new(ModuleCatalog::new());
//!     catalog.controller::<UserController>("controllers/user_controller.rs");
//!
//!     let mut app = AxumApplication::new();
//!     register_routes(RegisterOptions::new(&mut app, "src/controllers", catalog)).await?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app.into_router()).await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod controller;
pub mod error;
pub mod handler;
pub mod loader;
pub mod logger;
pub mod metadata;
pub mod module;

// Re-export core types
pub use app::{AxumApplication, HttpApplication};
pub use controller::{Controller, ControllerClass};
pub use error::{Result, RouterError};
pub use handler::{Next, Request, RequestHandler, Response};
pub use loader::{register_routes, RegisterOptions, SOURCE_EXTENSIONS};
pub use logger::Logger;
pub use metadata::{ControllerOptions, HttpMethod, MetadataRegistry, RouteDescriptor};
pub use module::{ClassExport, Export, ModuleCatalog, ModuleExports, ModuleSource};

// Re-export macros
pub use routier_macro::{controller, delete, get, patch, post, put, routes};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use routier::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::{AxumApplication, HttpApplication};
    pub use crate::controller::{Controller, ControllerClass};
    pub use crate::error::{Result, RouterError};
    pub use crate::handler::{Next, Request, RequestHandler, Response};
    pub use crate::loader::{register_routes, RegisterOptions};
    pub use crate::logger::Logger;
    pub use crate::metadata::{ControllerOptions, HttpMethod, MetadataRegistry, RouteDescriptor};
    pub use crate::module::{ModuleCatalog, ModuleExports, ModuleSource};
    pub use crate::{controller, delete, get, patch, post, put, routes};
    pub use async_trait::async_trait;
    pub use axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response as AxumResponse},
    };
    pub use std::sync::Arc;
}
