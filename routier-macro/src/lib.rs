use proc_macro::TokenStream;

mod controller;
mod http_methods;

/// Attribute macro declaring a struct as a controller.
///
/// Takes the base path shared by every route of the class and, optionally,
/// middlewares that run ahead of every route's own chain.
///
/// # Example
/// ```ignore
/// use routier::controller;
///
/// #[controller(path = "/users", middlewares = [require_auth()])]
/// #[derive(Default)]
/// pub struct UserController;
/// ```
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::controller_attribute(attr, item)
}

/// Attribute macro collecting routes from an impl block.
///
/// Methods annotated with a verb attribute become bindable route handlers;
/// the route list is recorded in declaration order, top to bottom.
///
/// # Example
/// ```ignore
/// #[routes]
/// impl UserController {
///     #[get("/")]
///     async fn list(&self) -> Json<Vec<User>> {
///         // ...
///     }
///
///     #[post("/", middlewares = [audit_log()])]
///     async fn create(&self, request: Request) -> StatusCode {
///         // ...
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn routes(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::routes_attribute(attr, item)
}

/// HTTP GET route attribute for controller methods
#[proc_macro_attribute]
pub fn get(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("GET", attr, item)
}

/// HTTP POST route attribute for controller methods
#[proc_macro_attribute]
pub fn post(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("POST", attr, item)
}

/// HTTP PUT route attribute for controller methods
#[proc_macro_attribute]
pub fn put(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("PUT", attr, item)
}

/// HTTP PATCH route attribute for controller methods
#[proc_macro_attribute]
pub fn patch(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("PATCH", attr, item)
}

/// HTTP DELETE route attribute for controller methods
#[proc_macro_attribute]
pub fn delete(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("DELETE", attr, item)
}
