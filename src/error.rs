use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RouterError>;

/// Errors produced while loading and registering controllers.
///
/// The first four variants are authoring mistakes scoped to a single
/// controller file. The loader logs them and moves on to the next file.
/// Every other variant aborts the whole registration pass.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no default export found. Please export your controller class as the module's default export.")]
    NoDefaultExport,

    #[error("default export is not a class.")]
    NotAClass,

    #[error("missing `#[controller]` attribute. Please mark your class as a controller.")]
    MissingControllerAttribute,

    #[error("no routes found. Please add `#[get]`/`#[post]` attributes to your handler methods.")]
    NoRoutesFound,

    #[error("no method `{method}` to bind on controller `{controller}`")]
    HandlerBinding { controller: String, method: String },

    #[error("failed to load module `{}`", .file.display())]
    ModuleLoad {
        file: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RouterError {
    /// Wrap an arbitrary module-source failure for `file`.
    pub fn module_load(file: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        RouterError::ModuleLoad {
            file: file.into(),
            source: source.into(),
        }
    }

    /// Whether this error is a per-file authoring mistake.
    ///
    /// Authoring errors are recoverable: the loader reports them and skips
    /// the offending file instead of aborting startup.
    pub fn is_authoring_error(&self) -> bool {
        matches!(
            self,
            RouterError::NoDefaultExport
                | RouterError::NotAClass
                | RouterError::MissingControllerAttribute
                | RouterError::NoRoutesFound
        )
    }
}
