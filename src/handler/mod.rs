use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Request type handed to handlers, as axum hands it to us.
pub type Request = axum::extract::Request;

/// Response type produced by handlers.
pub type Response = axum::response::Response;

/// Boxed future returned by handler invocations.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// A handler-shaped callable.
///
/// Both middlewares and final route handlers share this shape: they receive
/// the request plus the continuation into the rest of the chain. Middlewares
/// decide whether to call [`Next::run`]; final handlers simply ignore it.
///
/// Cloning is cheap — the callable is reference counted, so the same handler
/// can appear in any number of registered chains.
#[derive(Clone)]
pub struct RequestHandler {
    f: Arc<dyn Fn(Request, Next) -> HandlerFuture + Send + Sync>,
}

impl RequestHandler {
    /// Build a handler from an async closure.
    ///
    /// # Example
    /// ```
    /// use routier::handler::{Next, Request, RequestHandler};
    ///
    /// let logging = RequestHandler::from_fn(|req: Request, next: Next| async move {
    ///     tracing::info!("{} {}", req.method(), req.uri().path());
    ///     next.run(req).await
    /// });
    /// ```
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self {
            f: Arc::new(move |request, next| Box::pin(f(request, next))),
        }
    }

    /// Invoke the handler.
    pub fn call(&self, request: Request, next: Next) -> HandlerFuture {
        (self.f)(request, next)
    }
}

impl fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestHandler")
    }
}

/// The continuation into the remainder of a handler chain.
pub struct Next {
    run: Box<dyn FnOnce(Request) -> HandlerFuture + Send>,
}

impl Next {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Request) -> HandlerFuture + Send + 'static,
    {
        Self { run: Box::new(f) }
    }

    /// Hand the request to the next handler in the chain.
    pub async fn run(self, request: Request) -> Response {
        (self.run)(request).await
    }
}
