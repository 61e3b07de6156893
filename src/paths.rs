//! Project directory layout
//!
//! ```text
//! <root>/
//!   config/logger_config.toml
//!   logs/
//!   res/  tests/  tools/  utils/
//! ```

use crate::core::error::{LoggerError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the project root
pub const ROOT_ENV: &str = "TOMLOG_ROOT";

pub const LOGGER_CONFIG_FILE: &str = "logger_config.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$TOMLOG_ROOT` when set, otherwise the current directory
    pub fn discover() -> Self {
        let root = std::env::var_os(ROOT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn res_dir(&self) -> PathBuf {
        self.root.join("res")
    }

    pub fn tests_dir(&self) -> PathBuf {
        self.root.join("tests")
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.root.join("tools")
    }

    pub fn utils_dir(&self) -> PathBuf {
        self.root.join("utils")
    }

    /// Default logging configuration file
    pub fn logger_config(&self) -> PathBuf {
        self.config_dir().join(LOGGER_CONFIG_FILE)
    }

    /// Every directory of the layout except the root itself
    pub fn directories(&self) -> [PathBuf; 6] {
        [
            self.config_dir(),
            self.logs_dir(),
            self.res_dir(),
            self.tests_dir(),
            self.tools_dir(),
            self.utils_dir(),
        ]
    }

    /// Create the layout below an existing root
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::IoOperation`] naming the directory that failed.
    pub fn setup_directories(&self) -> Result<()> {
        for dir in self.directories() {
            fs::create_dir_all(&dir).map_err(|e| {
                LoggerError::io_operation(
                    "creating project directories",
                    format!("cannot create '{}'", dir.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self::discover()
    }
}
