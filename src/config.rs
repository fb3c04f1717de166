//! Generator configuration (dtsgen.toml) parsing and types.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::check::CompilerCheck;
use crate::emit::Flavor;
use crate::error::ConfigError;
use crate::postprocess::CommandFormatter;

/// Default name of the configuration file.
pub const CONFIG_FILE: &str = "dtsgen.toml";

/// Root configuration structure for dtsgen.toml.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GeneratorConfig {
    /// The library to generate declarations for.
    pub library: Option<LibraryConfig>,
    /// Libraries the primary library references.
    #[serde(default)]
    pub dependency: Vec<DependencyConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub symbols: SymbolsConfig,
    /// Directory that relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// The primary library section.
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    /// Library name, e.g. `sap.m`.
    pub name: String,
    /// Path to the API description JSON.
    pub api: String,
    /// Directive files, earlier files win on conflicts.
    #[serde(default)]
    pub directives: Vec<String>,
}

/// A dependency library entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyConfig {
    pub name: String,
    pub api: String,
    #[serde(default)]
    pub directives: Vec<String>,
    /// Previously generated module-flavor declarations, passed to the
    /// compiler check.
    pub declarations: Option<String>,
    /// Previously generated globals-flavor declarations.
    pub globals_declarations: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputConfig {
    /// Output directory.
    pub dir: Option<String>,
    /// Flavors to emit: "modules" and/or "globals".
    pub flavors: Option<Vec<Flavor>>,
    /// Create `<lib>.augment.d.ts` stubs.
    pub augmentation_stubs: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FormatConfig {
    /// Formatter command line; the text is piped through stdin/stdout.
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CheckConfig {
    pub enabled: Option<bool>,
    /// Compiler command line.
    pub command: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SymbolsConfig {
    /// Abort when two definitions share a fully-qualified name.
    pub fail_on_collision: Option<bool>,
}

impl GeneratorConfig {
    /// Load configuration from a specific path. Relative paths inside the
    /// file are resolved against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Load `dtsgen.toml` from `dir` if it exists.
    pub fn discover(dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve a path from the file against the config's directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn resolve_all(&self, paths: &[String]) -> Vec<PathBuf> {
        paths.iter().map(|p| self.resolve(p)).collect()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(self.output.dir())
    }
}

impl OutputConfig {
    /// Get the output directory, defaulting to "out".
    pub fn dir(&self) -> &str {
        self.dir.as_deref().unwrap_or("out")
    }

    /// Get the flavors to emit (default: both).
    pub fn flavors(&self) -> Vec<Flavor> {
        match &self.flavors {
            Some(flavors) if !flavors.is_empty() => flavors.clone(),
            _ => Flavor::ALL.to_vec(),
        }
    }

    /// Get whether augmentation stubs are created (default: true).
    pub fn augmentation_stubs(&self) -> bool {
        self.augmentation_stubs.unwrap_or(true)
    }
}

impl FormatConfig {
    /// The configured formatter, if any.
    pub fn formatter(&self) -> Option<CommandFormatter> {
        self.command.as_deref().and_then(CommandFormatter::new)
    }
}

impl CheckConfig {
    /// Get whether the compiler check runs (default: false).
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    /// Get the compiler command (default: "tsc").
    pub fn command(&self) -> &str {
        self.command.as_deref().unwrap_or("tsc")
    }

    pub fn compiler(&self) -> Option<CompilerCheck> {
        CompilerCheck::new(self.command())
    }
}

impl SymbolsConfig {
    pub fn fail_on_collision(&self) -> bool {
        self.fail_on_collision.unwrap_or(false)
    }
}
