//! Emitter configuration.

use glint_ast::error::ErrorConfig;

/// Module name used when none is configured.
pub const DEFAULT_MODULE_NAME: &str = "irgen.bc";

/// Configuration for a single emission run.
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Name given to the emitted module
    pub module_name: String,
    /// Diagnostic limits; emission stops after `errors.max_errors` errors
    pub errors: ErrorConfig,
    /// Report statements skipped after a terminator
    pub warn_unreachable: bool,
    /// Run the IR verifier after emission
    pub verify: bool,
}

impl EmitterConfig {
    pub fn new() -> Self {
        Self {
            module_name: DEFAULT_MODULE_NAME.to_string(),
            errors: ErrorConfig::new(),
            warn_unreachable: true,
            verify: true,
        }
    }

    /// Stop at the first error.
    pub fn strict() -> Self {
        let mut config = Self::new();
        config.errors.max_errors = 1;
        config
    }

    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.errors.max_errors = max_errors;
        self
    }

    pub fn max_errors(&self) -> usize {
        self.errors.max_errors
    }
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EmitterConfig::default();
        assert_eq!(config.module_name, "irgen.bc");
        assert_eq!(config.max_errors(), 100);
        assert!(config.warn_unreachable);
        assert!(config.verify);
    }

    #[test]
    fn test_strict_stops_at_first_error() {
        let config = EmitterConfig::strict().with_module_name("shader.bc");
        assert_eq!(config.max_errors(), 1);
        assert_eq!(config.module_name, "shader.bc");
    }
}
