/// Engine-wide settings chosen by the embedder or the command line.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Treat top-level script code as strict mode code.
    pub script_strict: bool,
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            script_strict: false,
            log_filter: "warn".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn strict(mut self, script_strict: bool) -> Self {
        self.script_strict = script_strict;
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}
