//! External engine configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wall-clock bound for one engine run
pub const DEFAULT_ENGINE_TIMEOUT: Duration = Duration::from_secs(15);

/// Default number of characters kept from captured engine streams
pub const DEFAULT_OUTPUT_LIMIT: usize = 4000;

/// Default engine name, also the temp artifact prefix
pub const DEFAULT_ENGINE_NAME: &str = "javafo";

/// Default engine program
pub const DEFAULT_ENGINE_PROGRAM: &str = "java";

/// Default JaVaFo jar location
pub const DEFAULT_ENGINE_JAR: &str = "/app/javafo.jar";

/// Pairing system identifier passed to the engine
pub const PAIRING_SYSTEM: &str = "fide-dutch";

/// How to launch the external pairing engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Engine name reported in responses
    pub name: String,
    /// Executable to spawn
    pub program: PathBuf,
    /// Arguments placed before the pairing arguments (e.g. `-jar <path>`)
    pub args: Vec<String>,
    /// Wall-clock bound for one run
    pub timeout: Duration,
    /// Directory for temporary input/output artifacts
    pub temp_dir: PathBuf,
    /// Characters kept from stdout/stderr in diagnostics
    pub output_limit: usize,
}

impl EngineConfig {
    /// Launch a JaVaFo jar through a JVM
    pub fn javafo(java: impl Into<PathBuf>, jar: impl AsRef<Path>) -> Self {
        Self::command(
            DEFAULT_ENGINE_NAME,
            java,
            vec!["-jar".to_string(), jar.as_ref().display().to_string()],
        )
    }

    /// Launch an arbitrary executable
    pub fn command(name: impl Into<String>, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            timeout: DEFAULT_ENGINE_TIMEOUT,
            temp_dir: std::env::temp_dir(),
            output_limit: DEFAULT_OUTPUT_LIMIT,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn with_output_limit(mut self, output_limit: usize) -> Self {
        self.output_limit = output_limit;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::javafo(DEFAULT_ENGINE_PROGRAM, DEFAULT_ENGINE_JAR)
    }
}
