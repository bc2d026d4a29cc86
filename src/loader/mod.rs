use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app::HttpApplication;
use crate::error::{Result, RouterError};
use crate::logger::Logger;
use crate::metadata::HttpMethod;
use crate::module::{Export, ModuleSource};

/// File extensions the loader recognizes as controller source files.
pub const SOURCE_EXTENSIONS: &[&str] = &["rs"];

/// Configuration for [`register_routes`].
pub struct RegisterOptions<'a> {
    app: &'a mut dyn HttpApplication,
    root_folder: PathBuf,
    source: Arc<dyn ModuleSource>,
    quiet: bool,
}

impl<'a> RegisterOptions<'a> {
    /// * `app` — the host application to register routes on.
    /// * `root_folder` — directory tree to scan for controller files.
    /// * `source` — resolves discovered files to their module exports,
    ///   usually a [`ModuleCatalog`](crate::module::ModuleCatalog).
    pub fn new(
        app: &'a mut dyn HttpApplication,
        root_folder: impl Into<PathBuf>,
        source: Arc<dyn ModuleSource>,
    ) -> Self {
        Self {
            app,
            root_folder: root_folder.into(),
            source,
            quiet: false,
        }
    }

    /// Suppress informational and error console output. Defaults to false.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Discover controller files under the root folder and register their routes.
///
/// Files are processed strictly sequentially, in the order the filesystem
/// lists them (platform-dependent; not sorted). Authoring mistakes in one
/// file — nothing exported, a non-class export, a class missing its
/// controller annotation, an annotated class with no routes — are logged
/// with the file's path relative to the root folder and the file is
/// skipped. Any other failure propagates immediately; routes registered
/// before the failure stay registered on the application.
pub async fn register_routes(options: RegisterOptions<'_>) -> Result<()> {
    let RegisterOptions {
        app,
        root_folder,
        source,
        quiet,
    } = options;

    let files = collect_source_files(&root_folder)?;

    for file in files {
        if let Err(error) = register_file(app, source.as_ref(), &file, quiet).await {
            if !error.is_authoring_error() {
                return Err(error);
            }
            if !quiet {
                let relative = file.strip_prefix(&root_folder).unwrap_or(&file);
                Logger::new(relative.display().to_string()).error(&error);
            }
        }
    }

    Ok(())
}

/// Recursively collect files with a recognized source extension, preserving
/// the directory-listing order within each directory.
fn collect_source_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_file() && has_source_extension(&path) {
            files.push(path);
        } else if file_type.is_dir() {
            files.extend(collect_source_files(&path)?);
        }
    }

    Ok(files)
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| SOURCE_EXTENSIONS.contains(&extension))
}

/// Load one file, validate its controller, and register every declared
/// route. Validation failures come back as authoring errors for the caller
/// to classify.
async fn register_file(
    app: &mut dyn HttpApplication,
    source: &dyn ModuleSource,
    file: &Path,
    quiet: bool,
) -> Result<()> {
    let exports = source.load(file).await?;

    let export = exports
        .default_export()
        .ok_or(RouterError::NoDefaultExport)?;
    let class = match export {
        Export::Class(class) => class,
        Export::Value(_) => return Err(RouterError::NotAClass),
    };

    let registry = source.metadata();
    let options = registry
        .controller_options(class.class_id())
        .ok_or(RouterError::MissingControllerAttribute)?;
    let routes = registry.routes(class.class_id());
    if routes.is_empty() {
        return Err(RouterError::NoRoutesFound);
    }

    let instance = class.construct();

    for route in routes {
        let full_path = route.full_path(options.base_path());

        let handler = instance.clone().bind(route.method_name()).ok_or_else(|| {
            RouterError::HandlerBinding {
                controller: class.name().to_string(),
                method: route.method_name().to_string(),
            }
        })?;

        let mut chain = Vec::with_capacity(
            options.middlewares().len() + route.middlewares().len() + 1,
        );
        chain.extend_from_slice(options.middlewares());
        chain.extend_from_slice(route.middlewares());
        chain.push(handler);

        match route.http_method() {
            HttpMethod::Get => app.get(&full_path, chain),
            HttpMethod::Post => app.post(&full_path, chain),
            HttpMethod::Put => app.put(&full_path, chain),
            HttpMethod::Patch => app.patch(&full_path, chain),
            HttpMethod::Delete => app.delete(&full_path, chain),
        }

        if !quiet {
            Logger::new(class.name()).log(format!(
                "{} {}",
                route.http_method().as_ref().to_uppercase(),
                full_path
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::response::IntoResponse;
    use tempfile::TempDir;
    use tracing_subscriber::layer::SubscriberExt;

    use crate::app::dispatch;
    use crate::controller::{Controller, ControllerClass};
    use crate::handler::{Request, RequestHandler};
    use crate::metadata::{ControllerOptions, MetadataRegistry, RouteDescriptor};
    use crate::module::{ClassExport, ModuleCatalog, ModuleExports};

    // -- test doubles ------------------------------------------------------

    #[derive(Default)]
    struct RecordingApp {
        calls: Vec<(HttpMethod, String, Vec<RequestHandler>)>,
    }

    impl RecordingApp {
        fn record(&mut self, method: HttpMethod, path: &str, chain: Vec<RequestHandler>) {
            self.calls.push((method, path.to_string(), chain));
        }

        fn routes(&self) -> Vec<(HttpMethod, &str, usize)> {
            self.calls
                .iter()
                .map(|(method, path, chain)| (*method, path.as_str(), chain.len()))
                .collect()
        }
    }

    impl HttpApplication for RecordingApp {
        fn get(&mut self, path: &str, chain: Vec<RequestHandler>) {
            self.record(HttpMethod::Get, path, chain);
        }

        fn post(&mut self, path: &str, chain: Vec<RequestHandler>) {
            self.record(HttpMethod::Post, path, chain);
        }

        fn put(&mut self, path: &str, chain: Vec<RequestHandler>) {
            self.record(HttpMethod::Put, path, chain);
        }

        fn patch(&mut self, path: &str, chain: Vec<RequestHandler>) {
            self.record(HttpMethod::Patch, path, chain);
        }

        fn delete(&mut self, path: &str, chain: Vec<RequestHandler>) {
            self.record(HttpMethod::Delete, path, chain);
        }
    }

    /// Collects every tracing event emitted on the current thread.
    #[derive(Clone, Default)]
    struct CaptureLayer {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl CaptureLayer {
        fn lines(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn error_lines(&self) -> Vec<String> {
            self.lines()
                .into_iter()
                .filter(|line| line.starts_with("ERROR"))
                .collect()
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::layer::Layer<S> for CaptureLayer {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            struct Collect(String);

            impl tracing::field::Visit for Collect {
                fn record_debug(
                    &mut self,
                    field: &tracing::field::Field,
                    value: &dyn std::fmt::Debug,
                ) {
                    use std::fmt::Write;
                    let _ = write!(self.0, "{}={:?} ", field.name(), value);
                }
            }

            let mut collect = Collect(String::new());
            event.record(&mut collect);
            self.events
                .lock()
                .unwrap()
                .push(format!("{} {}", event.metadata().level(), collect.0));
        }
    }

    fn capture() -> (CaptureLayer, tracing::subscriber::DefaultGuard) {
        let layer = CaptureLayer::default();
        let guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(layer.clone()));
        (layer, guard)
    }

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "").unwrap();
        path
    }

    fn request() -> Request {
        axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap()
    }

    fn ok_handler() -> RequestHandler {
        RequestHandler::from_fn(|_req, _next| async move { "ok".into_response() })
    }

    // -- test controllers --------------------------------------------------

    #[derive(Default)]
    struct UserController;

    impl Controller for UserController {
        fn bind(self: Arc<Self>, method_name: &str) -> Option<RequestHandler> {
            match method_name {
                "list" | "create" => Some(ok_handler()),
                _ => None,
            }
        }
    }

    impl ControllerClass for UserController {
        fn annotate(registry: &MetadataRegistry) {
            registry.set_controller_options::<Self>(ControllerOptions::new("/users"));
            registry.add_route::<Self>(RouteDescriptor::new(HttpMethod::Get, "/", "list"));
            registry.add_route::<Self>(RouteDescriptor::new(HttpMethod::Post, "/create", "create"));
        }
    }

    #[derive(Default)]
    struct NestedController;

    impl Controller for NestedController {
        fn bind(self: Arc<Self>, method_name: &str) -> Option<RequestHandler> {
            (method_name == "index").then(ok_handler)
        }
    }

    impl ControllerClass for NestedController {
        fn annotate(registry: &MetadataRegistry) {
            registry.set_controller_options::<Self>(ControllerOptions::new("/nested"));
            registry.add_route::<Self>(RouteDescriptor::new(HttpMethod::Get, "/", "index"));
        }
    }

    static CHAIN_LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

    fn chain_middleware(tag: &'static str) -> RequestHandler {
        RequestHandler::from_fn(move |req, next: crate::handler::Next| async move {
            CHAIN_LOG.lock().unwrap().push(tag);
            next.run(req).await
        })
    }

    #[derive(Default)]
    struct AuditedController;

    impl Controller for AuditedController {
        fn bind(self: Arc<Self>, method_name: &str) -> Option<RequestHandler> {
            match method_name {
                "submit" => Some(RequestHandler::from_fn(|_req, _next| async move {
                    CHAIN_LOG.lock().unwrap().push("handler");
                    "done".into_response()
                })),
                _ => None,
            }
        }
    }

    impl ControllerClass for AuditedController {
        fn annotate(registry: &MetadataRegistry) {
            registry.set_controller_options::<Self>(
                ControllerOptions::new("/audited")
                    .with_middleware(chain_middleware("controller-1"))
                    .with_middleware(chain_middleware("controller-2")),
            );
            registry.add_route::<Self>(
                RouteDescriptor::new(HttpMethod::Post, "/submit", "submit")
                    .with_middleware(chain_middleware("route")),
            );
        }
    }

    /// Controller only implementing the binding half; registered without
    /// annotations to model a class whose author forgot `#[controller]`.
    #[derive(Default)]
    struct BareController;

    impl Controller for BareController {
        fn bind(self: Arc<Self>, _method_name: &str) -> Option<RequestHandler> {
            None
        }
    }

    #[derive(Default)]
    struct OptionsOnlyController;

    impl Controller for OptionsOnlyController {
        fn bind(self: Arc<Self>, _method_name: &str) -> Option<RequestHandler> {
            None
        }
    }

    impl ControllerClass for OptionsOnlyController {
        fn annotate(registry: &MetadataRegistry) {
            registry.set_controller_options::<Self>(ControllerOptions::new("/empty"));
        }
    }

    #[derive(Default)]
    struct MisboundController;

    impl Controller for MisboundController {
        fn bind(self: Arc<Self>, _method_name: &str) -> Option<RequestHandler> {
            None
        }
    }

    impl ControllerClass for MisboundController {
        fn annotate(registry: &MetadataRegistry) {
            registry.set_controller_options::<Self>(ControllerOptions::new("/misbound"));
            registry.add_route::<Self>(RouteDescriptor::new(HttpMethod::Get, "/", "missing"));
        }
    }

    /// Module source whose every load fails, as a module that blows up
    /// during evaluation would.
    #[derive(Default)]
    struct ExplodingSource {
        metadata: MetadataRegistry,
    }

    #[async_trait]
    impl ModuleSource for ExplodingSource {
        async fn load(&self, file: &Path) -> Result<ModuleExports> {
            Err(RouterError::module_load(
                file,
                anyhow::anyhow!("panicked during module evaluation"),
            ))
        }

        fn metadata(&self) -> &MetadataRegistry {
            &self.metadata
        }
    }

    // -- tests -------------------------------------------------------------

    #[tokio::test]
    async fn registers_one_call_per_descriptor_with_composed_paths() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "user_controller.rs");

        let catalog = Arc::new(ModuleCatalog::new());
        catalog.controller::<UserController>(&file);

        let mut app = RecordingApp::default();
        register_routes(RegisterOptions::new(&mut app, dir.path(), catalog).quiet(true))
            .await
            .unwrap();

        assert_eq!(
            app.routes(),
            [
                (HttpMethod::Get, "/users", 1),
                (HttpMethod::Post, "/users/create", 1)
            ]
        );
    }

    #[tokio::test]
    async fn chain_is_controller_then_route_middlewares_then_handler() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "audited_controller.rs");

        let catalog = Arc::new(ModuleCatalog::new());
        catalog.controller::<AuditedController>(&file);

        let mut app = RecordingApp::default();
        register_routes(RegisterOptions::new(&mut app, dir.path(), catalog).quiet(true))
            .await
            .unwrap();

        assert_eq!(app.routes(), [(HttpMethod::Post, "/audited/submit", 4)]);

        CHAIN_LOG.lock().unwrap().clear();
        let (_, _, chain) = app.calls.into_iter().next().unwrap();
        dispatch(chain.into(), 0, request()).await;
        assert_eq!(
            *CHAIN_LOG.lock().unwrap(),
            ["controller-1", "controller-2", "route", "handler"]
        );
    }

    #[tokio::test]
    async fn discovery_descends_into_nested_directories() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "a/b/nested_controller.rs");

        let catalog = Arc::new(ModuleCatalog::new());
        catalog.controller::<NestedController>(&file);

        let mut app = RecordingApp::default();
        register_routes(RegisterOptions::new(&mut app, dir.path(), catalog).quiet(true))
            .await
            .unwrap();

        assert_eq!(app.routes(), [(HttpMethod::Get, "/nested", 1)]);
    }

    #[tokio::test]
    async fn files_without_source_extension_are_ignored() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "README.md");
        touch(dir.path(), "notes/todo.txt");

        let (layer, _guard) = capture();
        let mut app = RecordingApp::default();
        register_routes(RegisterOptions::new(
            &mut app,
            dir.path(),
            Arc::new(ModuleCatalog::new()),
        ))
        .await
        .unwrap();

        assert!(app.calls.is_empty());
        assert!(layer.lines().is_empty());
    }

    #[tokio::test]
    async fn broken_file_is_skipped_and_reported_with_relative_path() {
        let dir = TempDir::new().unwrap();
        let valid = touch(dir.path(), "user_controller.rs");
        let broken = touch(dir.path(), "broken/broken_controller.rs");

        let catalog = Arc::new(ModuleCatalog::new());
        catalog.controller::<UserController>(&valid);
        catalog.register_module(&broken, ModuleExports::class(ClassExport::of::<BareController>()));

        let (layer, _guard) = capture();
        let mut app = RecordingApp::default();
        register_routes(RegisterOptions::new(&mut app, dir.path(), catalog))
            .await
            .unwrap();

        assert_eq!(
            app.routes(),
            [
                (HttpMethod::Get, "/users", 1),
                (HttpMethod::Post, "/users/create", 1)
            ]
        );

        let errors = layer.error_lines();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("broken/broken_controller.rs"));
        assert!(errors[0].contains("missing `#[controller]` attribute"));
    }

    #[tokio::test]
    async fn module_without_default_export_is_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "helpers.rs");

        let (layer, _guard) = capture();
        let mut app = RecordingApp::default();
        register_routes(RegisterOptions::new(
            &mut app,
            dir.path(),
            Arc::new(ModuleCatalog::new()),
        ))
        .await
        .unwrap();

        assert!(app.calls.is_empty());
        let errors = layer.error_lines();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("helpers.rs"));
        assert!(errors[0].contains("no default export"));
    }

    #[tokio::test]
    async fn non_class_default_export_is_skipped() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "config.rs");

        let catalog = Arc::new(ModuleCatalog::new());
        catalog.register_module(&file, ModuleExports::value("just a string"));

        let (layer, _guard) = capture();
        let mut app = RecordingApp::default();
        register_routes(RegisterOptions::new(&mut app, dir.path(), catalog))
            .await
            .unwrap();

        assert!(app.calls.is_empty());
        assert!(layer.error_lines()[0].contains("not a class"));
    }

    #[tokio::test]
    async fn controller_without_routes_is_skipped() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "options_only_controller.rs");

        let catalog = Arc::new(ModuleCatalog::new());
        catalog.controller::<OptionsOnlyController>(&file);

        let (layer, _guard) = capture();
        let mut app = RecordingApp::default();
        register_routes(RegisterOptions::new(&mut app, dir.path(), catalog))
            .await
            .unwrap();

        assert!(app.calls.is_empty());
        assert!(layer.error_lines()[0].contains("no routes found"));
    }

    #[tokio::test]
    async fn module_load_failure_aborts_registration() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "exploding_controller.rs");

        let mut app = RecordingApp::default();
        let error = register_routes(
            RegisterOptions::new(&mut app, dir.path(), Arc::new(ExplodingSource::default()))
                .quiet(true),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, RouterError::ModuleLoad { .. }));
        assert!(app.calls.is_empty());
    }

    #[tokio::test]
    async fn unbindable_route_method_is_fatal() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "misbound_controller.rs");

        let catalog = Arc::new(ModuleCatalog::new());
        catalog.controller::<MisboundController>(&file);

        let mut app = RecordingApp::default();
        let error = register_routes(
            RegisterOptions::new(&mut app, dir.path(), catalog).quiet(true),
        )
        .await
        .unwrap_err();

        match error {
            RouterError::HandlerBinding { controller, method } => {
                assert_eq!(controller, "MisboundController");
                assert_eq!(method, "missing");
            }
            other => panic!("expected HandlerBinding, got {other:?}"),
        }
        assert!(app.calls.is_empty());
    }

    #[tokio::test]
    async fn registering_twice_registers_every_route_twice() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "user_controller.rs");

        let catalog = Arc::new(ModuleCatalog::new());
        catalog.controller::<UserController>(&file);

        let mut app = RecordingApp::default();
        register_routes(RegisterOptions::new(&mut app, dir.path(), catalog.clone()).quiet(true))
            .await
            .unwrap();
        register_routes(RegisterOptions::new(&mut app, dir.path(), catalog).quiet(true))
            .await
            .unwrap();

        assert_eq!(app.calls.len(), 4);
    }

    #[tokio::test]
    async fn registration_logs_one_line_per_route() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "user_controller.rs");

        let catalog = Arc::new(ModuleCatalog::new());
        catalog.controller::<UserController>(&file);

        let (layer, _guard) = capture();
        let mut app = RecordingApp::default();
        register_routes(RegisterOptions::new(&mut app, dir.path(), catalog))
            .await
            .unwrap();

        let lines = layer.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("UserController"));
        assert!(lines[0].contains("GET /users"));
        assert!(lines[1].contains("POST /users/create"));
    }

    #[tokio::test]
    async fn quiet_suppresses_all_console_output() {
        let dir = TempDir::new().unwrap();
        let valid = touch(dir.path(), "user_controller.rs");
        touch(dir.path(), "unregistered.rs");

        let catalog = Arc::new(ModuleCatalog::new());
        catalog.controller::<UserController>(&valid);

        let (layer, _guard) = capture();
        let mut app = RecordingApp::default();
        register_routes(RegisterOptions::new(&mut app, dir.path(), catalog).quiet(true))
            .await
            .unwrap();

        assert_eq!(app.calls.len(), 2);
        assert!(layer.lines().is_empty());
    }
}
