use std::any::{Any, TypeId};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::controller::{Controller, ControllerClass};
use crate::error::Result;
use crate::metadata::MetadataRegistry;

/// A controller class exported from a module: its identity, display name,
/// and zero-argument constructor.
#[derive(Clone)]
pub struct ClassExport {
    class_id: TypeId,
    name: &'static str,
    construct: Arc<dyn Fn() -> Arc<dyn Controller> + Send + Sync>,
}

impl ClassExport {
    pub fn of<C>() -> Self
    where
        C: Controller + Default,
    {
        Self {
            class_id: TypeId::of::<C>(),
            name: short_type_name::<C>(),
            construct: Arc::new(|| Arc::new(C::default()) as Arc<dyn Controller>),
        }
    }

    /// The class identity the metadata registry is keyed by.
    pub fn class_id(&self) -> TypeId {
        self.class_id
    }

    /// The unqualified class name, used as the log context for its routes.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Instantiate the class with no constructor arguments.
    pub fn construct(&self) -> Arc<dyn Controller> {
        (self.construct)()
    }
}

fn short_type_name<C>() -> &'static str {
    let full = std::any::type_name::<C>();
    full.rsplit("::").next().unwrap_or(full)
}

/// A module's default export: a constructible class, or any other value.
#[derive(Clone)]
pub enum Export {
    Class(ClassExport),
    Value(Arc<dyn Any + Send + Sync>),
}

/// What a loaded module exposes to the loader.
#[derive(Clone, Default)]
pub struct ModuleExports {
    default: Option<Export>,
}

impl ModuleExports {
    /// A module that exports nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A module whose default export is a controller class.
    pub fn class(export: ClassExport) -> Self {
        Self {
            default: Some(Export::Class(export)),
        }
    }

    /// A module whose default export is some non-class value.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            default: Some(Export::Value(Arc::new(value))),
        }
    }

    pub fn default_export(&self) -> Option<&Export> {
        self.default.as_ref()
    }
}

/// Resolves a discovered source file to its module exports.
///
/// Loading is asynchronous and is the loader's only suspension point; the
/// loader awaits each file's load before touching the next one. Custom
/// sources may fail with any error (wrap it with
/// [`RouterError::module_load`](crate::RouterError::module_load)); such
/// failures abort the whole registration pass.
#[async_trait]
pub trait ModuleSource: Send + Sync {
    async fn load(&self, file: &Path) -> Result<ModuleExports>;

    /// The registry holding the routing metadata for classes this source
    /// exports.
    fn metadata(&self) -> &MetadataRegistry;
}

/// The compile-time-registered module set.
///
/// A statically compiled program cannot import arbitrary files at runtime,
/// so the application lists its controllers up front, keyed by the source
/// path each one lives in. The loader still walks the real directory tree;
/// each discovered file resolves here to the exports registered for it, and
/// files nobody registered resolve to an empty module.
///
/// Registered paths match a discovered file either exactly or as a trailing
/// sequence of whole path components, so catalogs keyed by project-relative
/// paths work no matter where the scanned root lives.
#[derive(Default)]
pub struct ModuleCatalog {
    modules: DashMap<PathBuf, ModuleExports>,
    metadata: MetadataRegistry,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller class as the default export of `path`, and
    /// evaluate its annotations into the catalog's metadata registry.
    ///
    /// This is the explicit registration step a decorator runtime performs
    /// implicitly at import time.
    pub fn controller<C>(&self, path: impl Into<PathBuf>) -> &Self
    where
        C: ControllerClass + Default,
    {
        C::annotate(&self.metadata);
        self.register_module(path, ModuleExports::class(ClassExport::of::<C>()))
    }

    /// Register raw module exports for `path`.
    pub fn register_module(&self, path: impl Into<PathBuf>, exports: ModuleExports) -> &Self {
        self.modules.insert(path.into(), exports);
        self
    }

    fn lookup(&self, file: &Path) -> Option<ModuleExports> {
        if let Some(exports) = self.modules.get(file) {
            return Some(exports.clone());
        }
        self.modules
            .iter()
            .find(|entry| file.ends_with(entry.key()))
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl ModuleSource for ModuleCatalog {
    async fn load(&self, file: &Path) -> Result<ModuleExports> {
        Ok(self.lookup(file).unwrap_or_else(ModuleExports::empty))
    }

    fn metadata(&self) -> &MetadataRegistry {
        &self.metadata
    }
}
