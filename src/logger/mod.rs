use std::fmt;

/// Context-tagged console logger.
///
/// Every line carries the context it was emitted for — a controller class
/// name for route registrations, a file path for authoring errors. Rendering
/// goes through `tracing`, so color and formatting follow whatever
/// subscriber the application installed (the demo server uses
/// `tracing_subscriber::fmt`).
pub struct Logger {
    context: String,
}

impl Logger {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Emit an informational line.
    pub fn log(&self, message: impl fmt::Display) {
        tracing::info!(context = %self.context, "{message}");
    }

    /// Emit an error line, followed by the error's source chain.
    pub fn error(&self, error: &(dyn std::error::Error + 'static)) {
        tracing::error!(context = %self.context, "{error}");

        let mut source = error.source();
        while let Some(cause) = source {
            tracing::error!(context = %self.context, "caused by: {cause}");
            source = cause.source();
        }
    }
}
