use serde::{Deserialize, Serialize};

pub const DEFAULT_GENERATOR_THREAD_NAME: &str = "pullkit-generator";

/// Producer thread settings for a generator bridge.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Defaults to [`DEFAULT_GENERATOR_THREAD_NAME`].
    pub thread_name: Option<String>,
    /// Stack size in bytes; platform default when unset.
    pub stack_size: Option<usize>,
}

impl GeneratorConfig {
    pub fn thread_name(&self) -> &str {
        self.thread_name
            .as_deref()
            .unwrap_or(DEFAULT_GENERATOR_THREAD_NAME)
    }
}
