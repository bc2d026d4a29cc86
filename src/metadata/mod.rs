use std::any::TypeId;

use dashmap::DashMap;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::handler::RequestHandler;

/// HTTP verbs supported for route registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// Controller-level routing options: the base path shared by every route of
/// the class, plus middlewares that run ahead of every route's own chain.
///
/// Attached once per controller class; setting options again replaces the
/// previous value wholesale.
#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    base_path: String,
    middlewares: Vec<RequestHandler>,
}

impl ControllerOptions {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            middlewares: Vec::new(),
        }
    }

    pub fn with_middleware(mut self, middleware: RequestHandler) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn middlewares(&self) -> &[RequestHandler] {
        &self.middlewares
    }
}

/// Metadata for a single endpoint: which instance method to bind, the verb,
/// the sub-path under the controller's base path, and per-route middlewares.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    method_name: String,
    http_method: HttpMethod,
    sub_path: String,
    middlewares: Vec<RequestHandler>,
}

impl RouteDescriptor {
    pub fn new(
        http_method: HttpMethod,
        sub_path: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            http_method,
            sub_path: sub_path.into(),
            middlewares: Vec::new(),
        }
    }

    pub fn with_middleware(mut self, middleware: RequestHandler) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    pub fn sub_path(&self) -> &str {
        &self.sub_path
    }

    pub fn middlewares(&self) -> &[RequestHandler] {
        &self.middlewares
    }

    /// The path the route registers under: base path plus sub-path, where a
    /// bare `/` sub-path is dropped so the base path keeps a single
    /// trailing-separator-free form.
    pub fn full_path(&self, base_path: &str) -> String {
        if self.sub_path == "/" {
            base_path.to_string()
        } else {
            format!("{}{}", base_path, self.sub_path)
        }
    }
}

#[derive(Clone, Default)]
struct ControllerMetadata {
    options: Option<ControllerOptions>,
    routes: Vec<RouteDescriptor>,
}

/// Routing metadata keyed by controller class identity.
///
/// This is the inspectable form of "metadata attached to the class": an
/// explicit map from [`TypeId`] to controller options and the ordered route
/// list, written by the annotation step at startup and read by the loader.
/// Entries are never cleared; each class is annotated once per process.
#[derive(Default)]
pub struct MetadataRegistry {
    controllers: DashMap<TypeId, ControllerMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach controller options to class `C`, replacing any previous value.
    pub fn set_controller_options<C: 'static>(&self, options: ControllerOptions) {
        self.controllers
            .entry(TypeId::of::<C>())
            .or_default()
            .options = Some(options);
    }

    /// Append a route descriptor to class `C`'s route list.
    ///
    /// Descriptors are kept in insertion order and never deduplicated: a
    /// route added twice registers twice downstream.
    pub fn add_route<C: 'static>(&self, route: RouteDescriptor) {
        self.controllers
            .entry(TypeId::of::<C>())
            .or_default()
            .routes
            .push(route);
    }

    pub fn controller_options(&self, class: TypeId) -> Option<ControllerOptions> {
        self.controllers
            .get(&class)
            .and_then(|meta| meta.options.clone())
    }

    /// The route descriptors attached to `class`, in insertion order.
    /// Empty when the class has none.
    pub fn routes(&self, class: TypeId) -> Vec<RouteDescriptor> {
        self.controllers
            .get(&class)
            .map(|meta| meta.routes.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UserController;
    struct OrderController;

    #[test]
    fn options_overwrite_previous_value() {
        let registry = MetadataRegistry::new();
        registry.set_controller_options::<UserController>(ControllerOptions::new("/v1/users"));
        registry.set_controller_options::<UserController>(ControllerOptions::new("/users"));

        let options = registry
            .controller_options(TypeId::of::<UserController>())
            .unwrap();
        assert_eq!(options.base_path(), "/users");
    }

    #[test]
    fn routes_accumulate_in_order_and_allow_duplicates() {
        let registry = MetadataRegistry::new();
        registry.add_route::<UserController>(RouteDescriptor::new(HttpMethod::Get, "/", "list"));
        registry.add_route::<UserController>(RouteDescriptor::new(HttpMethod::Post, "/", "create"));
        registry.add_route::<UserController>(RouteDescriptor::new(HttpMethod::Get, "/", "list"));

        let routes = registry.routes(TypeId::of::<UserController>());
        let names: Vec<&str> = routes.iter().map(|r| r.method_name()).collect();
        assert_eq!(names, ["list", "create", "list"]);
    }

    #[test]
    fn classes_are_isolated() {
        let registry = MetadataRegistry::new();
        registry.set_controller_options::<UserController>(ControllerOptions::new("/users"));

        assert!(registry
            .controller_options(TypeId::of::<OrderController>())
            .is_none());
        assert!(registry.routes(TypeId::of::<OrderController>()).is_empty());
    }

    #[test]
    fn full_path_drops_bare_slash_sub_path() {
        let index = RouteDescriptor::new(HttpMethod::Get, "/", "index");
        assert_eq!(index.full_path("/users"), "/users");

        let detail = RouteDescriptor::new(HttpMethod::Get, "/detail", "detail");
        assert_eq!(detail.full_path("/users"), "/users/detail");
    }

    #[test]
    fn http_method_string_forms() {
        assert_eq!(HttpMethod::Get.as_ref(), "get");
        assert_eq!(HttpMethod::Delete.to_string(), "delete");
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
    }
}
