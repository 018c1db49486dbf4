/// Development diagnostics for the request pipeline.
///
/// Records go to `tracing` under the `rest_client` target, and only when the
/// logger was built enabled. Recording never fails and never blocks the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticLogger {
    enabled: bool,
}

impl DiagnosticLogger {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Production default: records nothing
    #[must_use]
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn info(&self, record: impl std::fmt::Display) {
        if self.enabled {
            tracing::info!(target: "rest_client", "{record}");
        }
    }

    pub fn debug(&self, record: impl std::fmt::Display) {
        if self.enabled {
            tracing::debug!(target: "rest_client", "{record}");
        }
    }

    pub fn warning(&self, record: impl std::fmt::Display) {
        if self.enabled {
            tracing::warn!(target: "rest_client", "{record}");
        }
    }

    pub fn error(&self, record: impl std::fmt::Display) {
        if self.enabled {
            tracing::error!(target: "rest_client", "{record}");
        }
    }
}
