use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::handler::{HandlerFuture, Next, Request, RequestHandler};
use crate::metadata::HttpMethod;

/// The host framework's registration surface.
///
/// One method per supported HTTP verb, each taking the path and the ordered
/// handler chain for that route. The loader drives this trait and nothing
/// else — dispatch, matching precedence, and connection handling all belong
/// to the implementation behind it.
pub trait HttpApplication {
    fn get(&mut self, path: &str, chain: Vec<RequestHandler>);
    fn post(&mut self, path: &str, chain: Vec<RequestHandler>);
    fn put(&mut self, path: &str, chain: Vec<RequestHandler>);
    fn patch(&mut self, path: &str, chain: Vec<RequestHandler>);
    fn delete(&mut self, path: &str, chain: Vec<RequestHandler>);
}

/// Run `request` through `chain` starting at `index`.
///
/// Each handler receives a [`Next`] that advances the chain by one; running
/// off the end answers 404, mirroring a middleware stack with no terminal
/// handler.
pub(crate) fn dispatch(
    chain: Arc<[RequestHandler]>,
    index: usize,
    request: Request,
) -> HandlerFuture {
    match chain.get(index) {
        Some(handler) => {
            let handler = handler.clone();
            let rest = chain.clone();
            handler.call(
                request,
                Next::new(move |req| dispatch(rest, index + 1, req)),
            )
        }
        None => Box::pin(async { StatusCode::NOT_FOUND.into_response() }),
    }
}

/// [`HttpApplication`] adapter over an [`axum::Router`].
///
/// Every registered chain is folded into a single axum handler and attached
/// with the routing constructor matching its verb. Note that axum itself
/// rejects a second registration of the same method-and-path pair, so
/// feeding one folder to the loader twice against the same adapter inherits
/// that behavior.
#[derive(Default)]
pub struct AxumApplication {
    router: axum::Router,
}

impl AxumApplication {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand the finished router back for serving.
    pub fn into_router(self) -> axum::Router {
        self.router
    }

    fn route(&mut self, method: HttpMethod, path: &str, chain: Vec<RequestHandler>) {
        let chain: Arc<[RequestHandler]> = chain.into();
        let service = move |request: Request| {
            let chain = chain.clone();
            async move { dispatch(chain, 0, request).await }
        };
        let method_router = match method {
            HttpMethod::Get => axum::routing::get(service),
            HttpMethod::Post => axum::routing::post(service),
            HttpMethod::Put => axum::routing::put(service),
            HttpMethod::Patch => axum::routing::patch(service),
            HttpMethod::Delete => axum::routing::delete(service),
        };
        self.router = std::mem::take(&mut self.router).route(path, method_router);
    }
}

impl HttpApplication for AxumApplication {
    fn get(&mut self, path: &str, chain: Vec<RequestHandler>) {
        self.route(HttpMethod::Get, path, chain);
    }

    fn post(&mut self, path: &str, chain: Vec<RequestHandler>) {
        self.route(HttpMethod::Post, path, chain);
    }

    fn put(&mut self, path: &str, chain: Vec<RequestHandler>) {
        self.route(HttpMethod::Put, path, chain);
    }

    fn patch(&mut self, path: &str, chain: Vec<RequestHandler>) {
        self.route(HttpMethod::Patch, path, chain);
    }

    fn delete(&mut self, path: &str, chain: Vec<RequestHandler>) {
        self.route(HttpMethod::Delete, path, chain);
    }
}
