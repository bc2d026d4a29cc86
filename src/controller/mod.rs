// Controller functionality is primarily authored through macros:
// - #[controller(path = "...", middlewares = [...])] on the struct
// - #[routes] on the impl block, with #[get]/#[post]/#[put]/#[patch]/#[delete]
//   on the handler methods
//
// The macros generate the two trait impls below; both can also be written by
// hand when a controller needs a shape the macros do not cover.

use std::sync::Arc;

use crate::handler::RequestHandler;
use crate::metadata::MetadataRegistry;

/// A class whose methods can be bound as request handlers.
///
/// `bind` resolves an annotated method by name into a handler that captures
/// the controller instance by shared ownership, so every registered route of
/// a class dispatches onto the same instance.
pub trait Controller: Send + Sync + 'static {
    /// Bind the named method to this instance, or `None` when the class has
    /// no method under that name.
    fn bind(self: Arc<Self>, method_name: &str) -> Option<RequestHandler>;
}

/// The annotation-evaluation half of a controller class.
///
/// `annotate` writes the class's controller options and route descriptors
/// into a [`MetadataRegistry`], in declaration order. It runs once per class
/// during the explicit registration step at startup — the static-Rust
/// counterpart of decorator evaluation at import time.
pub trait ControllerClass: Controller + Sized {
    fn annotate(registry: &MetadataRegistry);
}
