//! Shared configuration loader for the bloc toolchain.
//!
//! `defaults/bloc.default.toml` is embedded into every binary, so the documented
//! defaults and the runtime ones cannot drift apart. Tools layer user files and
//! command-line overrides on top with [`Loader`] and deserialize into [`BlocConfig`].

use bloc_analysis::CheckerOptions;
use bloc_syntax::{EngineOptions, SyntaxOptions};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_TOML: &str = include_str!("../defaults/bloc.default.toml");

/// Top-level configuration consumed by bloc tools.
#[derive(Debug, Clone, Deserialize)]
pub struct BlocConfig {
    pub syntax: SyntaxOptions,
    pub engine: EngineOptions,
    pub checker: CheckerConfig,
}

/// The external linter as written in the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckerConfig {
    pub program: String,
    pub args: Vec<String>,
    /// 0 disables the timeout.
    pub timeout_ms: u64,
}

impl CheckerConfig {
    pub fn options(&self) -> CheckerOptions {
        CheckerOptions {
            program: self.program.clone(),
            args: self.args.clone(),
            timeout: (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms)),
        }
    }
}

/// Builds a [`BlocConfig`] from sources stacked on the embedded defaults. Later sources
/// override earlier ones key by key.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Stack a TOML file; [`Loader::build`] fails if it cannot be read.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Like [`Loader::with_file`], but an absent file is skipped.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Pin a dotted key such as `engine.indent_width`, above every file.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<BlocConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<BlocConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn embedded_defaults_match_the_option_types() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.syntax, SyntaxOptions::default());
        assert_eq!(config.engine, EngineOptions::default());
        assert_eq!(config.checker.options(), CheckerOptions::default());
    }

    #[test]
    fn overrides_win() {
        let config = Loader::new()
            .set_override("engine.indent_width", 2)
            .expect("override to apply")
            .set_override("checker.timeout_ms", 1500)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.engine.indent_width, 2);
        assert!(!config.engine.use_tabs);
        assert_eq!(
            config.checker.options().timeout,
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn user_file_is_layered_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bloc.toml");
        std::fs::write(
            &path,
            "[syntax]\ncomment_start = \"'\"\n\n[engine]\nuse_tabs = true\n",
        )
        .unwrap();

        let config = Loader::new().with_file(&path).build().unwrap();
        assert_eq!(config.syntax.comment_start, "'");
        assert!(config.syntax.case_insensitive);
        assert!(config.engine.use_tabs);
        assert_eq!(config.engine.indent_width, 4);
    }

    #[test]
    fn missing_files() {
        assert!(Loader::new()
            .with_optional_file("/nonexistent/bloc.toml")
            .build()
            .is_ok());
        assert!(Loader::new()
            .with_file("/nonexistent/bloc.toml")
            .build()
            .is_err());
    }
}
